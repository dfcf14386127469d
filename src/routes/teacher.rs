use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Teacher Router Module
///
/// Pages for principals holding the `teacher` role.
///
/// Access Control:
/// Wrapped in the teacher Role Guard layer, then the teacher profile layer, so every
/// handler receives the resolved `TeacherProfile` as an extension.
pub fn teacher_routes() -> Router<AppState> {
    Router::new()
        // GET /Topics
        // Teacher landing page: submitted topics awaiting approval or rejection.
        .route("/Topics", get(handlers::topics_page))
        // GET /my-teams
        .route("/my-teams", get(handlers::my_teams_page))
        // GET /my-teams/{team_id}
        .route("/my-teams/{team_id}", get(handlers::team_page))
        // GET /my-teams/teams_dashboard/{team_id}
        .route(
            "/my-teams/teams_dashboard/{team_id}",
            get(handlers::team_dashboard_page),
        )
}
