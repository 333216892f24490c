//! List Active Visitor Entries Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    visitors::{errors::into_status_error, responses::VisitorEntryResponse},
};

/// List Active Visitor Entries Handler
///
/// Visitors currently on the premises, longest stay first.
#[endpoint(
    tags("visitor-entries"),
    summary = "List Active Visitor Entries",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<VisitorEntryResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.guard_or_403()?;

    let entries = state
        .app
        .visitors
        .list_active_entries()
        .await
        .map_err(into_status_error)?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
