//! App Router

use salvo::Router;

use crate::{auth, visitors::handlers};

pub fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("visitor-tokens")
                .get(handlers::index::handler)
                .post(handlers::issue::handler)
                .push(Router::with_path("verify").post(handlers::verify::handler))
                .push(Router::with_path("{token}").get(handlers::show::handler)),
        )
        .push(
            Router::with_path("visitor-entries")
                .post(handlers::grant::handler)
                .push(Router::with_path("active").get(handlers::active::handler))
                .push(Router::with_path("checkout").post(handlers::checkout::handler))
                .push(Router::with_path("{entry}/exit").post(handlers::exit::handler)),
        )
}
