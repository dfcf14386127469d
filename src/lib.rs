use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::{HeaderName, header::LOCATION},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::time::Duration;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

// --- Module Structure ---

// Guard core: decoding, credential storage, navigation and the two gates.
pub mod auth;
pub mod credential;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod topic_gate;

// Collaborators, session flows and the HTTP surface.
pub mod api;
pub mod config;
pub mod handlers;
pub mod pages;
pub mod session;

// Module for routing segregation (Public, Teacher, Student).
pub mod routes;
use routes::{public, student, teacher};

// --- Public Re-exports ---

pub use api::{ApiState, BackendApi, HttpBackendApi, MockBackendApi};
pub use config::{AppConfig, RoutePaths};
pub use credential::{CREDENTIAL_KEY, CookieCredentialStore, CredentialStore, InMemoryCredentialStore};
pub use guard::{AccessDecision, AllowedRoles, GuardState, RoleGuard};
pub use navigation::{Navigator, RecordingNavigator};
pub use topic_gate::{GateOutcome, TopicCheck, TopicGate, TopicRequirement};

/// AppState
///
/// The single shared container for the gateway: the backend collaborator and the
/// loaded configuration.
#[derive(Clone)]
pub struct AppState {
    /// Backend lookups (profiles, topic existence).
    pub api: ApiState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// RoleGuardLayer
///
/// State of one Role Guard middleware instance: the roles it admits and where it
/// sends everyone else.
#[derive(Clone)]
pub struct RoleGuardLayer {
    pub allowed: AllowedRoles,
    pub routes: RoutePaths,
}

/// role_guard_middleware
///
/// Mounts a fresh `RoleGuard` for the request against the cookie-backed credential
/// store. Authorized requests continue with the decoded `Claims` attached as an
/// extension; denied ones get the guard's redirect.
async fn role_guard_middleware(
    State(layer): State<RoleGuardLayer>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let decision = {
        let store = CookieCredentialStore::new(jar);
        let navigator = RecordingNavigator::new();
        let mut guard = RoleGuard::new(layer.allowed, layer.routes.public_entry.clone());

        match guard.mount(&store, &navigator) {
            GuardState::Authorized(claims) => AccessDecision::Render(claims.clone()),
            _ => AccessDecision::Redirect(
                navigator
                    .last()
                    .unwrap_or_else(|| layer.routes.public_entry.clone()),
            ),
        }
    };

    match decision {
        AccessDecision::Render(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        AccessDecision::Redirect(destination) => Redirect::to(&destination).into_response(),
    }
}

/// topic_gate_middleware
///
/// Runs a Topic-Existence Gate in front of the wrapped pages and attaches the
/// student's profile to allowed requests when one was resolved. If the client goes
/// away while the lookups are in flight, hyper drops this future and the lookups
/// with it.
async fn topic_gate_middleware(
    State(gate): State<TopicGate>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let credential = CookieCredentialStore::new(jar).get(CREDENTIAL_KEY);

    match gate.admit(credential.as_deref()).await {
        (GateOutcome::Allow, profile) => {
            if let Some(profile) = profile {
                request.extensions_mut().insert(profile);
            }
            next.run(request).await
        }
        (GateOutcome::Redirect(destination), _) => Redirect::to(&destination).into_response(),
    }
}

/// teacher_profile_middleware
///
/// Resolves the teacher profile for teacher pages and attaches it as an extension.
/// Any failure sends the principal to the public entry.
async fn teacher_profile_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let credential = CookieCredentialStore::new(jar).get(CREDENTIAL_KEY);

    match session::resolve_teacher_profile(credential.as_deref(), state.api.as_ref()).await {
        Ok(profile) => {
            request.extensions_mut().insert(profile);
            next.run(request).await
        }
        Err(reason) => {
            tracing::warn!(%reason, "teacher profile unavailable");
            Redirect::to(&state.config.routes.public_entry).into_response()
        }
    }
}

/// create_router
///
/// Assembles the gateway: public pages, then each protected module wrapped in its
/// guard layers, then the observability layers.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let routes = state.config.routes.clone();
    let guard_state = |allowed: AllowedRoles| RoleGuardLayer {
        allowed,
        routes: routes.clone(),
    };
    let gate_state = |requirement: TopicRequirement| {
        TopicGate::new(state.api.clone(), requirement, routes.clone())
    };

    // 2. Protected modules. `route_layer` wraps outward, so the layer added last runs
    // first: the Role Guard always runs before the module-specific layer.
    let teacher_router = teacher::teacher_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            teacher_profile_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            guard_state(AllowedRoles::teachers()),
            role_guard_middleware,
        ));

    let have_topic_router = student::have_topic_routes()
        .route_layer(middleware::from_fn_with_state(
            gate_state(TopicRequirement::Present),
            topic_gate_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            guard_state(AllowedRoles::students()),
            role_guard_middleware,
        ));

    let new_topic_router = student::new_topic_routes()
        .route_layer(middleware::from_fn_with_state(
            gate_state(TopicRequirement::Absent),
            topic_gate_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            guard_state(AllowedRoles::students()),
            role_guard_middleware,
        ));

    // 3. Base Router Assembly
    let base_router = Router::new()
        .merge(public::public_routes())
        .merge(teacher_router)
        .merge(have_topic_router)
        .merge(new_topic_router)
        .with_state(state);

    // 4. Observability: a request id per page request, echoed back to the client, and
    // one span plus one outcome line per request.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(page_span)
                        .on_response(log_page_outcome),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// page_span
///
/// Span for one page request. Guard decisions logged while serving it inherit the
/// request id and whether the client presented a credential at all. Only the path is
/// recorded; query strings stay out of the logs.
fn page_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");
    let has_credential = CookieJar::from_headers(request.headers())
        .get(CREDENTIAL_KEY)
        .is_some();

    tracing::info_span!(
        "page_request",
        method = %request.method(),
        path = %request.uri().path(),
        req_id = %request_id,
        has_credential,
    )
}

/// log_page_outcome
///
/// Logs whether the page was served or where the client was redirected.
fn log_page_outcome(response: &Response, latency: Duration, _span: &Span) {
    let status = response.status();
    let latency_ms = latency.as_millis() as u64;

    match response.headers().get(LOCATION).and_then(|value| value.to_str().ok()) {
        Some(location) => tracing::info!(%status, location, latency_ms, "redirected"),
        None => tracing::info!(%status, latency_ms, "served"),
    }
}
