use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a credential: the public entry itself and the session
/// flows that create, dispatch and destroy a credential.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET / and GET /login
        // The public entry. Guards redirect here on denial.
        .route("/", get(handlers::login_page))
        .route("/login", get(handlers::login_page))
        // POST /session
        // Stores the credential issued by the backend login and forwards to /change-route.
        .route("/session", post(handlers::create_session))
        // GET /change-route
        // Role-based dispatch: students to /dashboard, teachers to /Topics.
        .route("/change-route", get(handlers::change_route))
        // GET /logout
        .route("/logout", get(handlers::logout))
}
