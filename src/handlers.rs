use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    AppConfig, AppState,
    api::{StudentProfile, TeacherProfile},
    auth::Claims,
    config::Env,
    credential::{CREDENTIAL_KEY, CookieCredentialStore, CredentialStore},
    navigation::RecordingNavigator,
    pages::{self, Page, escape},
    session,
};

/// SessionForm
///
/// Body of `POST /session`, as posted by the sign-in form.
#[derive(Deserialize)]
pub struct SessionForm {
    pub username: String,
    pub password: String,
}

/// The credential cookie is HTTPS-only outside local development.
fn cookie_store(config: &AppConfig, jar: CookieJar) -> CookieCredentialStore {
    CookieCredentialStore::new(jar).secure(config.env == Env::Production)
}

// --- Public Handlers ---

/// login_page
///
/// [Public Route] The public entry. Every Role Guard denial ends up here.
pub async fn login_page() -> Html<String> {
    pages::login_page()
}

/// create_session
///
/// [Public Route] Signs in with the backend's login endpoint, stores the issued
/// credential as the `access_token` cookie and forwards to the landing route.
/// Rejected logins and undecodable tokens go back to the sign-in page.
pub async fn create_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SessionForm>,
) -> Response {
    let store = cookie_store(&state.config, jar);
    let routes = &state.config.routes;

    let signed_in = session::sign_in(
        state.api.as_ref(),
        &store,
        form.username.trim(),
        &form.password,
        routes,
    )
    .await;

    match signed_in {
        Ok(next) => {
            tracing::info!(username = %form.username.trim(), "signed in");
            (store.into_jar(), Redirect::to(&next)).into_response()
        }
        Err(reason) => {
            tracing::debug!(%reason, "sign-in rejected");
            Redirect::to(&routes.login).into_response()
        }
    }
}

/// change_route
///
/// [Public Route] Dispatches a principal to the home page of their role.
pub async fn change_route(State(config): State<AppConfig>, jar: CookieJar) -> Redirect {
    let store = CookieCredentialStore::new(jar);
    let destination =
        session::landing_route(store.get(CREDENTIAL_KEY).as_deref(), &config.routes);
    Redirect::to(&destination)
}

/// logout
///
/// [Public Route] Removes the credential cookie and returns to the public entry.
pub async fn logout(State(config): State<AppConfig>, jar: CookieJar) -> Response {
    let store = cookie_store(&config, jar);
    let navigator = RecordingNavigator::new();
    let routes = &config.routes;

    session::logout(&store, &navigator, routes);

    let destination = navigator.last().unwrap_or_else(|| routes.public_entry.clone());
    (store.into_jar(), Redirect::to(&destination)).into_response()
}

// --- Teacher Handlers ---
// Reached only through the teacher Role Guard and the teacher profile layer.

/// topics_page
///
/// [Teacher Route] Topic proposals awaiting review.
pub async fn topics_page(Extension(teacher): Extension<TeacherProfile>) -> Html<String> {
    Page {
        title: "Topics",
        viewer: Some(&teacher.name),
        body: "<section id=\"topic-review\"></section>",
    }
    .render()
}

/// my_teams_page
///
/// [Teacher Route] Teams advised by the teacher.
pub async fn my_teams_page(Extension(teacher): Extension<TeacherProfile>) -> Html<String> {
    Page {
        title: "My Teams",
        viewer: Some(&teacher.name),
        body: "<section id=\"teams\"></section>",
    }
    .render()
}

/// team_page
///
/// [Teacher Route] Documents and milestones of one team.
pub async fn team_page(
    Extension(teacher): Extension<TeacherProfile>,
    Path(team_id): Path<String>,
) -> Html<String> {
    let body = format!(
        "<section id=\"team\" data-team=\"{}\"></section>",
        escape(&team_id)
    );
    Page {
        title: "Team",
        viewer: Some(&teacher.name),
        body: &body,
    }
    .render()
}

/// team_dashboard_page
///
/// [Teacher Route] Progress dashboard of one team.
pub async fn team_dashboard_page(
    Extension(teacher): Extension<TeacherProfile>,
    Path(team_id): Path<String>,
) -> Html<String> {
    let body = format!(
        "<section id=\"team-dashboard\" data-team=\"{}\"></section>",
        escape(&team_id)
    );
    Page {
        title: "Team Dashboard",
        viewer: Some(&teacher.name),
        body: &body,
    }
    .render()
}

// --- Student Handlers ---
// Reached only through the student Role Guard and a Topic-Existence Gate, which
// attaches the student's profile whenever it resolved one.

/// new_topic_page
///
/// [Student Route] Topic submission, for teams without a registered project.
pub async fn new_topic_page(
    Extension(claims): Extension<Claims>,
    profile: Option<Extension<StudentProfile>>,
) -> Html<String> {
    let viewer = profile.map_or(claims.sub, |Extension(profile)| profile.name);
    Page {
        title: "New Topic",
        viewer: Some(&viewer),
        body: "<section id=\"topic-form\"></section>",
    }
    .render()
}

/// dashboard_page
///
/// [Student Route] Team progress dashboard.
pub async fn dashboard_page(Extension(student): Extension<StudentProfile>) -> Html<String> {
    let body = format!(
        "<section id=\"dashboard\" data-team=\"{}\"></section>",
        escape(student.teamid.as_deref().unwrap_or_default())
    );
    Page {
        title: "Dashboard",
        viewer: Some(&student.name),
        body: &body,
    }
    .render()
}

/// individual_performance_page
pub async fn individual_performance_page(
    Extension(student): Extension<StudentProfile>,
) -> Html<String> {
    Page {
        title: "Individual Performance",
        viewer: Some(&student.name),
        body: "<section id=\"individual-performance\"></section>",
    }
    .render()
}

/// my_project_page
///
/// [Student Route] The team's registered project.
pub async fn my_project_page(Extension(student): Extension<StudentProfile>) -> Html<String> {
    Page {
        title: "My Project",
        viewer: Some(&student.name),
        body: "<section id=\"my-project\"></section>",
    }
    .render()
}
