//! Grant Visitor Entry Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use gatehouse_app::domain::{
    accounts::records::AccountUuid,
    visitors::{GrantedEntry, data::EntryGrant},
};

use crate::{
    extensions::*,
    observability::{GateOperation, record_gate_decision},
    state::State,
    visitors::{
        errors::{into_status_error, outcome},
        responses::{VisitorEntryResponse, VisitorTokenResponse},
    },
};

/// Grant Visitor Entry Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct GrantEntryRequest {
    /// Code presented at the gate
    pub token: String,

    /// Overrides the name captured at issuance
    #[serde(default)]
    pub visitor_name: Option<String>,

    /// Overrides the phone captured at issuance
    #[serde(default)]
    pub visitor_phone: Option<String>,

    #[serde(default)]
    pub gate_id: Option<String>,

    #[serde(default)]
    pub note: Option<String>,
}

impl GrantEntryRequest {
    fn into_parts(self, guard: AccountUuid) -> (String, EntryGrant) {
        (
            self.token,
            EntryGrant {
                guard,
                visitor_name: self.visitor_name,
                visitor_phone: self.visitor_phone,
                gate_id: self.gate_id,
                note: self.note,
            },
        )
    }
}

/// Granted Entry Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct GrantedEntryResponse {
    pub entry: VisitorEntryResponse,

    /// The consumed token
    pub token: VisitorTokenResponse,
}

impl From<GrantedEntry> for GrantedEntryResponse {
    fn from(granted: GrantedEntry) -> Self {
        Self {
            entry: granted.entry.into(),
            token: granted.token.into(),
        }
    }
}

/// Grant Visitor Entry Handler
///
/// Consumes the presented token and opens an entry. A token can be granted once.
#[endpoint(
    tags("visitor-entries"),
    summary = "Grant Visitor Entry",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Entry granted"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not a guard"),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown token"),
        (status_code = StatusCode::CONFLICT, description = "Token already used"),
        (status_code = StatusCode::GONE, description = "Token expired"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<GrantEntryRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<GrantedEntryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let guard = depot.guard_or_403()?.uuid;

    let (secret, grant) = json.into_inner().into_parts(guard);

    let granted = match state
        .app
        .visitors
        .grant_entry(&secret, grant, Timestamp::now())
        .await
    {
        Ok(granted) => granted,
        Err(error) => {
            record_gate_decision(GateOperation::Grant, outcome(&error));

            return Err(into_status_error(error));
        }
    };

    record_gate_decision(GateOperation::Grant, "granted");

    info!(
        guard = %guard,
        entry = %granted.entry.uuid,
        token = %granted.token.uuid,
        "visitor entry granted"
    );

    res.add_header(
        LOCATION,
        format!("/visitor-entries/{}", granted.entry.uuid),
        true,
    )
    .or_500("failed to set location header")?
    .status_code(StatusCode::CREATED);

    Ok(Json(granted.into()))
}
