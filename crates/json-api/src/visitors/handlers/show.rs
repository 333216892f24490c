//! Get Visitor Token Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    state::State,
    visitors::{errors::into_status_error, responses::VisitorTokenResponse},
};

/// Get Visitor Token Handler
///
/// Returns one of the caller's tokens. The code is included until the token is used.
#[endpoint(
    tags("visitor-tokens"),
    summary = "Get Visitor Token",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    token: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<VisitorTokenResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let resident = depot.resident_or_403()?.uuid;

    let token = state
        .app
        .visitors
        .get_token(resident, token.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(VisitorTokenResponse::with_secret(token)))
}

#[cfg(test)]
mod tests {
    use gatehouse_app::domain::{
        accounts::records::AccountRole,
        visitors::{MockVisitorsService, VisitorsServiceError, records::VisitorTokenUuid},
    };
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{TEST_SECRET, make_account, make_token, visitors_service};

    use super::*;

    fn route() -> Router {
        Router::with_path("visitor-tokens/{token}").get(handler)
    }

    #[tokio::test]
    async fn show_unused_token_includes_secret() -> TestResult {
        let resident = make_account(AccountRole::Resident);
        let token = make_token(&resident);
        let token_uuid = token.uuid;

        let mut visitors = MockVisitorsService::new();

        visitors
            .expect_get_token()
            .once()
            .withf(move |_, uuid| *uuid == token_uuid)
            .return_once(move |_, _| Ok(token));

        let mut res = TestClient::get(format!("http://example.com/visitor-tokens/{token_uuid}"))
            .send(&visitors_service(visitors, &resident, route()))
            .await;

        let body: VisitorTokenResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.token.as_deref(), Some(TEST_SECRET));

        Ok(())
    }

    #[tokio::test]
    async fn show_used_token_omits_secret() -> TestResult {
        let resident = make_account(AccountRole::Resident);
        let mut token = make_token(&resident);
        let token_uuid = token.uuid;

        token.mark_used(Timestamp::UNIX_EPOCH);

        let mut visitors = MockVisitorsService::new();

        visitors
            .expect_get_token()
            .once()
            .return_once(move |_, _| Ok(token));

        let mut res = TestClient::get(format!("http://example.com/visitor-tokens/{token_uuid}"))
            .send(&visitors_service(visitors, &resident, route()))
            .await;

        let body: VisitorTokenResponse = res.take_json().await?;

        assert_eq!(body.token, None);
        assert!(body.used_at.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn show_missing_token_returns_404() -> TestResult {
        let mut visitors = MockVisitorsService::new();

        visitors
            .expect_get_token()
            .once()
            .return_once(|_, _| Err(VisitorsServiceError::NotFound));

        let res = TestClient::get(format!(
            "http://example.com/visitor-tokens/{}",
            VisitorTokenUuid::new()
        ))
        .send(&visitors_service(
            visitors,
            &make_account(AccountRole::Resident),
            route(),
        ))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
