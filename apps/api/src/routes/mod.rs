pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::chat::handlers as chat;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        // Onboarding
        .route(
            "/api/v1/sessions/:id/onboarding/cv",
            post(session::handle_upload_cv).layer(upload_limit),
        )
        .route(
            "/api/v1/sessions/:id/onboarding/skip",
            post(session::handle_skip_upload),
        )
        .route("/api/v1/sessions/:id/onboarding/next", post(session::handle_next))
        .route("/api/v1/sessions/:id/onboarding/back", post(session::handle_back))
        .route(
            "/api/v1/sessions/:id/onboarding/submit",
            post(session::handle_submit),
        )
        // Profile edits
        .route(
            "/api/v1/sessions/:id/profile",
            patch(session::handle_update_profile),
        )
        .route(
            "/api/v1/sessions/:id/profile/skills",
            post(session::handle_add_skill),
        )
        .route(
            "/api/v1/sessions/:id/profile/skills/:skill",
            delete(session::handle_remove_skill),
        )
        .route(
            "/api/v1/sessions/:id/profile/learning-styles/toggle",
            post(session::handle_toggle_learning_style),
        )
        // Dashboard
        .route("/api/v1/sessions/:id/view", put(session::handle_set_view))
        .route(
            "/api/v1/sessions/:id/dashboard",
            get(session::handle_dashboard),
        )
        // Consultant chat
        .route("/api/v1/sessions/:id/chat", get(chat::handle_get_chat))
        .route(
            "/api/v1/sessions/:id/chat/messages",
            post(chat::handle_send_message),
        )
        .route("/api/v1/sessions/:id/chat/reset", post(chat::handle_reset_chat))
        .with_state(state)
}
