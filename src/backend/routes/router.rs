/**
 * Router Configuration
 *
 * Combines the socket endpoint and the API routes into one router, then
 * adds request tracing, permissive CORS and a JSON 404 fallback.
 */

use axum::{http::Uri, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::error::BackendError;
use crate::backend::realtime::handle_socket_upgrade;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/ws", get(handle_socket_upgrade));

    let router = configure_api_routes(router, app_state.clone());

    let router = router.fallback(|uri: Uri| async move { BackendError::not_found("Route", uri.path()) });

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
