//! Student Router Module
//!
//! Pages for principals holding the `student` role, split by whether the student's
//! team must already have a registered project topic.
//!
//! Access Control:
//! Both routers sit behind the student Role Guard. Inside it, each one gets a
//! Topic-Existence Gate with the matching requirement.

use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Pages that require a registered topic (the topic gate's `Present` side).
/// Teams without one are sent to `/new-topic`.
pub fn have_topic_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard
        // Student landing page: task completion, hours and suggestions.
        .route("/dashboard", get(handlers::dashboard_page))
        // GET /dashboard/individual_performance
        .route(
            "/dashboard/individual_performance",
            get(handlers::individual_performance_page),
        )
        // GET /my-project
        .route("/my-project", get(handlers::my_project_page))
}

/// The topic-creation flow (the topic gate's `Absent` side).
/// Teams that already have a topic are sent to the dashboard.
pub fn new_topic_routes() -> Router<AppState> {
    Router::new().route("/new-topic", get(handlers::new_topic_page))
}
