//! Verify Visitor Token Handler

use std::{string::ToString, sync::Arc};

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use gatehouse_app::domain::visitors::TokenState;

use crate::{
    extensions::*,
    observability::{GateOperation, record_gate_decision},
    state::State,
    visitors::{
        errors::{into_status_error, outcome},
        responses::{AccountSummaryResponse, VisitTypeParam, VisitorEntryResponse, VisitorResponse},
    },
};

/// Verify Visitor Token Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VerifyTokenRequest {
    /// Code presented at the gate
    pub token: String,
}

/// Classification of a presented token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum TokenStatus {
    NotFound,
    Expired,
    ValidUnused,
    GrantedActive,
    UsedAndExited,
}

/// Verify Visitor Token Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VerifyTokenResponse {
    pub status: TokenStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<Uuid>,

    /// Resident who issued the token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<AccountSummaryResponse>,

    /// Visitor as named at issuance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor: Option<VisitorResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_type: Option<VisitTypeParam>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,

    /// Seconds since expiry, for expired tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_for_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<String>,

    /// Active entry, or the most recent one once the visitor has left
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<VisitorEntryResponse>,

    /// Guard who granted the entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<AccountSummaryResponse>,
}

impl From<TokenState> for VerifyTokenResponse {
    fn from(state: TokenState) -> Self {
        let (status, token, entry, expired_for) = match state {
            TokenState::NotFound => (TokenStatus::NotFound, None, None, None),
            TokenState::Expired { token, expired_for } => (
                TokenStatus::Expired,
                Some(token),
                None,
                Some(expired_for.as_secs()),
            ),
            TokenState::ValidUnused { token } => {
                (TokenStatus::ValidUnused, Some(token), None, None)
            }
            TokenState::GrantedActive { token, entry } => {
                (TokenStatus::GrantedActive, Some(token), Some(entry), None)
            }
            TokenState::UsedAndExited { token, last_entry } => {
                (TokenStatus::UsedAndExited, Some(token), last_entry, None)
            }
        };

        let guard = entry.as_ref().map(|entry| entry.guard.clone().into());

        Self {
            status,
            token_id: token.as_ref().map(|token| token.uuid.into()),
            used_at: token
                .as_ref()
                .and_then(|token| token.used_at())
                .as_ref()
                .map(ToString::to_string),
            expires_at: token.as_ref().map(|token| token.expires_at.to_string()),
            visit_type: token.as_ref().map(|token| token.visit_type.into()),
            issuer: token
                .as_ref()
                .map(|token| token.resident.clone().into()),
            visitor: token.map(|token| VisitorResponse {
                name: token.issued_for_name,
                phone: token.issued_for_phone,
            }),
            expired_for_seconds: expired_for,
            entry: entry.map(Into::into),
            guard,
        }
    }
}

/// Verify Visitor Token Handler
///
/// Reports what a presented code is good for without consuming it.
#[endpoint(
    tags("visitor-tokens"),
    summary = "Verify Visitor Token",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Token classified"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing token"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not a guard"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<VerifyTokenRequest>,
    depot: &mut Depot,
) -> Result<Json<VerifyTokenResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let guard = depot.guard_or_403()?.uuid;

    let token_state = match state
        .app
        .visitors
        .verify_token(&json.into_inner().token, Timestamp::now())
        .await
    {
        Ok(token_state) => token_state,
        Err(error) => {
            record_gate_decision(GateOperation::Verify, outcome(&error));

            return Err(into_status_error(error));
        }
    };

    record_gate_decision(GateOperation::Verify, token_state.status());

    info!(guard = %guard, status = token_state.status(), "visitor token verified");

    Ok(Json(token_state.into()))
}
