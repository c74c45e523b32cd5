use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::config::ServiceKind;
use crate::store::traits::DocumentStore;

/// Router for one service variant. Unknown paths and wrong methods get a 404.
///
/// `get` would also answer HEAD, so HEAD is routed to the 404 explicitly.
pub fn create_router<S: DocumentStore + 'static>(kind: ServiceKind) -> Router<AppState<S>> {
    let router = match kind {
        ServiceKind::DealershipSearch => Router::new().route(
            "/api/dealership",
            get(handlers::search_dealerships::<S>)
                .head(handlers::not_found)
                .fallback(handlers::not_found),
        ),
        ServiceKind::DealershipList => Router::new().route(
            "/api/dealership",
            get(handlers::list_dealerships::<S>)
                .head(handlers::not_found)
                .fallback(handlers::not_found),
        ),
        ServiceKind::Reviews => Router::new()
            .route(
                "/api/get_reviews",
                get(handlers::get_reviews::<S>)
                    .head(handlers::not_found)
                    .fallback(handlers::not_found),
            )
            .route(
                "/api/post_review",
                post(handlers::post_review::<S>).fallback(handlers::not_found),
            ),
    };

    router.fallback(handlers::not_found)
}
