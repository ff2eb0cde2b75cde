pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod moderation;
pub mod preferences;
pub mod state;

#[cfg(test)]
mod test_support;

use axum::{
    Router,
    routing::{delete, get, post},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// All `/api` routes. Preference and inbox routes sit behind the session
/// resolver; sign-up, sign-in, anonymous sending and the AI helpers are public.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/sign-up", post(auth::sign_up))
        .route("/api/sign-in", post(auth::sign_in))
        .route("/api/send-message", post(messages::send_message))
        .route("/api/check-message", post(moderation::check_message))
        .route("/api/suggest-messages", post(moderation::suggest_messages));

    let protected_routes = Router::new()
        .route(
            "/api/accept-messages",
            get(preferences::get_accept_messages).post(preferences::update_accept_messages),
        )
        .route(
            "/api/safe-mode",
            get(preferences::get_safe_mode).post(preferences::update_safe_mode),
        )
        .route("/api/get-messages", get(messages::get_messages))
        .route("/api/delete-message/{message_id}", delete(messages::delete_message))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
