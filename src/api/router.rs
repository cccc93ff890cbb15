//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::AppContext;

/// Build the API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7). The
/// static `/products/top` route takes priority over `/products/:id/...`.
pub fn api_router(ctx: AppContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/patients", post(endpoints::patients::register))
        .route("/patients/:id", delete(endpoints::patients::delete))
        .route("/patients/:id/checkins", get(endpoints::patients::history))
        .route("/products", post(endpoints::products::register))
        .route("/products/top", get(endpoints::products::top))
        .route("/products/:id/aggregate", get(endpoints::products::aggregate))
        .route("/products/:id/stats", get(endpoints::products::stats))
        .route("/checkins", post(endpoints::checkins::submit))
        .route("/checkins/:id/attributions", get(endpoints::checkins::attributions))
        .route("/checkins/:id/feedback", get(endpoints::checkins::feedback))
        .route("/admin/consistency", get(endpoints::admin::consistency))
        .route("/admin/consistency/repair", post(endpoints::admin::repair))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(TraceLayer::new_for_http())
}
