//! Checkout Visitor By Token Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    extensions::*,
    observability::{GateOperation, record_gate_decision},
    state::State,
    visitors::{
        errors::{into_status_error, outcome},
        responses::VisitorEntryResponse,
    },
};

/// Checkout Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutRequest {
    /// Code the visitor entered with
    pub token: String,

    #[serde(default)]
    pub note: Option<String>,
}

/// Checkout Visitor By Token Handler
///
/// Closes the open entry for a code. Expired codes can still check out.
#[endpoint(
    tags("visitor-entries"),
    summary = "Checkout Visitor By Token",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Exit recorded"),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown token"),
        (status_code = StatusCode::CONFLICT, description = "No active entry for token"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutRequest>,
    depot: &mut Depot,
) -> Result<Json<VisitorEntryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let guard = depot.guard_or_403()?.uuid;

    let CheckoutRequest { token, note } = json.into_inner();

    let entry = match state
        .app
        .visitors
        .checkout_by_token(&token, note, Timestamp::now())
        .await
    {
        Ok(entry) => entry,
        Err(error) => {
            record_gate_decision(GateOperation::Checkout, outcome(&error));

            return Err(into_status_error(error));
        }
    };

    record_gate_decision(GateOperation::Checkout, "exited");

    info!(guard = %guard, entry = %entry.uuid, "visitor checked out");

    Ok(Json(entry.into()))
}
