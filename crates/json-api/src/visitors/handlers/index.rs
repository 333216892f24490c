//! List Visitor Tokens Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    visitors::{errors::into_status_error, responses::VisitorTokenResponse},
};

/// List Visitor Tokens Handler
///
/// Returns the caller's tokens, newest first.
#[endpoint(
    tags("visitor-tokens"),
    summary = "List Visitor Tokens",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<VisitorTokenResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let resident = depot.resident_or_403()?.uuid;

    let tokens = state
        .app
        .visitors
        .list_tokens(resident)
        .await
        .map_err(into_status_error)?;

    Ok(Json(tokens.into_iter().map(Into::into).collect()))
}
