//! Issue Visitor Token Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_app::domain::{
    accounts::records::AccountUuid,
    visitors::{IssuedVisitorToken, data::NewVisitorToken},
};

use crate::{
    extensions::*,
    state::State,
    visitors::{
        errors::into_status_error,
        responses::{AccountSummaryResponse, VisitTypeParam},
    },
};

/// Issue Visitor Token Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct IssueTokenRequest {
    pub issued_for_name: String,
    pub issued_for_phone: Option<String>,
    pub visit_type: VisitTypeParam,

    /// Hours for `short` visits, days otherwise
    pub duration: u32,

    pub note: Option<String>,
}

impl IssueTokenRequest {
    fn into_new_token(self, resident: AccountUuid) -> NewVisitorToken {
        NewVisitorToken {
            resident,
            visitor_name: self.issued_for_name,
            visitor_phone: self.issued_for_phone,
            visit_type: self.visit_type.into(),
            duration: self.duration,
            note: self.note,
        }
    }
}

/// Issued Visitor Token Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct IssuedTokenResponse {
    /// Code to share with the visitor; it is not shown again once used
    pub token: String,

    pub token_id: Uuid,
    pub expires_at: String,
    pub visitor_name: String,
    pub visitor_phone: Option<String>,
    pub visit_type: VisitTypeParam,
    pub duration: u32,
    pub issuer: AccountSummaryResponse,
}

impl From<IssuedVisitorToken> for IssuedTokenResponse {
    fn from(issued: IssuedVisitorToken) -> Self {
        let IssuedVisitorToken { secret, token } = issued;

        Self {
            token: secret.expose().to_string(),
            token_id: token.uuid.into(),
            expires_at: token.expires_at.to_string(),
            visitor_name: token.issued_for_name,
            visitor_phone: token.issued_for_phone,
            visit_type: token.visit_type.into(),
            duration: token.duration,
            issuer: token.resident.into(),
        }
    }
}

/// Issue Visitor Token Handler
#[endpoint(
    tags("visitor-tokens"),
    summary = "Issue Visitor Token",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Visitor token issued"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not a resident"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<IssueTokenRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<IssuedTokenResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let resident = depot.resident_or_403()?.uuid;

    let issued = state
        .app
        .visitors
        .issue_token(json.into_inner().into_new_token(resident), Timestamp::now())
        .await
        .map_err(into_status_error)?;

    res.add_header(
        LOCATION,
        format!("/visitor-tokens/{}", issued.token.uuid),
        true,
    )
    .or_500("failed to set location header")?
    .status_code(StatusCode::CREATED);

    Ok(Json(issued.into()))
}
