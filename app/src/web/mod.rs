pub mod handlers;
pub mod session;
pub mod templates;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use domain::Portal;
use tower_http::{services::ServeDir, trace::TraceLayer};

use handlers::{
    auth_page, contact_page, contact_submit, home, login_submit, logout, newsletter_submit,
    register_submit,
};

// App state type
pub type AppState = Arc<Portal>;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Static file serving
        .nest_service("/static", ServeDir::new("static"))
        // Pages
        .route("/", get(home))
        .route("/auth", get(auth_page))
        .route("/auth/login", post(login_submit))
        .route("/auth/register", post(register_submit))
        .route("/contact", get(contact_page).post(contact_submit))
        .route("/newsletter", post(newsletter_submit))
        .route("/logout", post(logout))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add state
        .with_state(state)
}
