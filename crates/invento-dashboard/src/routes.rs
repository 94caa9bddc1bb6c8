//! Route definitions for the dashboard.

use axum::routing::{get, post};
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{assets, auth, csrf, handlers, session};

/// Create the dashboard router.
///
/// Layers, outermost first: request tracing, session cookie, CSRF check.
/// Pages other than login, logout, static files and the health probe also
/// pass the login gate.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/", get(handlers::index))
        .route("/items", post(handlers::add_item))
        .route("/items/{id}/delete", post(handlers::delete_item))
        .route("/requests", post(handlers::submit_request))
        .route("/requests/{id}/{action}", post(handlers::decide_request))
        .route("/activity", get(handlers::activity_log))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_login,
        ));

    Router::new()
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/healthz", get(handlers::healthz))
        .route("/static/{*path}", get(assets::static_asset))
        .merge(protected)
        .layer(middleware::from_fn(csrf::csrf_protect))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_layer,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
