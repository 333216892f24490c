//! Record Visitor Exit Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    extensions::*,
    observability::{GateOperation, record_gate_decision},
    state::State,
    visitors::{
        errors::{into_status_error, outcome},
        responses::VisitorEntryResponse,
    },
};

/// Record Visitor Exit Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct RecordExitRequest {
    /// Appended to the entry note
    #[serde(default)]
    pub note: Option<String>,
}

impl RecordExitRequest {
    /// Read an optional JSON body; an empty body means no note.
    async fn from_request(req: &mut Request) -> Result<Self, StatusError> {
        let payload = req
            .payload()
            .await
            .map_err(|error| StatusError::bad_request().brief(error.to_string()))?;

        if payload.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(payload)
            .map_err(|error| StatusError::bad_request().brief(format!("invalid exit body: {error}")))
    }
}

/// Record Visitor Exit Handler
///
/// The body is optional; send `{"note": ...}` to append to the entry note.
#[endpoint(
    tags("visitor-entries"),
    summary = "Record Visitor Exit",
    security(("bearer_auth" = [])),
    request_body = Option<RecordExitRequest>,
    responses(
        (status_code = StatusCode::OK, description = "Exit recorded"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed body"),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown entry"),
        (status_code = StatusCode::CONFLICT, description = "Visitor already exited"),
    ),
)]
pub(crate) async fn handler(
    entry: PathParam<Uuid>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<VisitorEntryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let guard = depot.guard_or_403()?.uuid;
    let body = RecordExitRequest::from_request(req).await?;

    let entry = match state
        .app
        .visitors
        .record_exit(entry.into_inner().into(), body.note, Timestamp::now())
        .await
    {
        Ok(entry) => entry,
        Err(error) => {
            record_gate_decision(GateOperation::Exit, outcome(&error));

            return Err(into_status_error(error));
        }
    };

    record_gate_decision(GateOperation::Exit, "exited");

    info!(guard = %guard, entry = %entry.uuid, "visitor exit recorded");

    Ok(Json(entry.into()))
}
