mod common;

use common::{create_token, token_with_payload};
use siam_portal::{
    CREDENTIAL_KEY, CredentialStore, InMemoryCredentialStore, MockBackendApi, RecordingNavigator,
    RoutePaths,
    error::AuthError,
    session::{landing_route, logout, resolve_teacher_profile, sign_in, store_credential},
};

#[test]
fn test_landing_route_dispatches_by_role() {
    let routes = RoutePaths::default();
    let student = create_token("s-01", "student", 3600);
    let teacher = create_token("t-01", "teacher", 3600);

    assert_eq!(landing_route(Some(&student), &routes), "/dashboard");
    assert_eq!(landing_route(Some(&teacher), &routes), "/Topics");
}

#[test]
fn test_landing_route_falls_back_to_login() {
    let routes = RoutePaths::default();
    let unknown_role = token_with_payload(r#"{"sub":"x","role":"admin","exp":1900000000}"#);

    assert_eq!(landing_route(None, &routes), "/login");
    assert_eq!(landing_route(Some("garbage"), &routes), "/login");
    assert_eq!(landing_route(Some(&unknown_role), &routes), "/login");
}

#[test]
fn test_landing_route_leaves_expiry_to_the_destination_guard() {
    let expired = create_token("s-01", "student", -60);
    assert_eq!(
        landing_route(Some(&expired), &RoutePaths::default()),
        "/dashboard"
    );
}

#[test]
fn test_logout_deletes_credential_and_returns_to_public_entry() {
    let store = InMemoryCredentialStore::with_credential(&create_token("s-01", "student", 3600));
    let navigator = RecordingNavigator::new();

    logout(&store, &navigator, &RoutePaths::default());

    assert_eq!(store.get(CREDENTIAL_KEY), None);
    assert_eq!(navigator.visits(), vec!["/".to_string()]);
}

#[test]
fn test_store_credential_only_persists_decodable_tokens() {
    let routes = RoutePaths::default();
    let store = InMemoryCredentialStore::new();

    let rejected = store_credential(&store, "not.a.token", &routes);
    assert!(matches!(rejected, Err(AuthError::MalformedCredential(_))));
    assert_eq!(store.get(CREDENTIAL_KEY), None);

    let token = create_token("t-01", "teacher", 3600);
    let next = store_credential(&store, &token, &routes).unwrap();
    assert_eq!(next, "/change-route");
    assert_eq!(store.get(CREDENTIAL_KEY), Some(token));
}

#[tokio::test]
async fn test_sign_in_stores_issued_credential() {
    let token = create_token("s-01", "student", 3600);
    let api = MockBackendApi::new().with_account("64070001", "hunter2", &token);
    let store = InMemoryCredentialStore::new();

    let next = sign_in(&api, &store, "64070001", "hunter2", &RoutePaths::default())
        .await
        .unwrap();

    assert_eq!(next, "/change-route");
    assert_eq!(store.get(CREDENTIAL_KEY), Some(token));
    assert_eq!(api.calls(), vec!["login:64070001"]);
}

#[tokio::test]
async fn test_sign_in_failures_store_nothing() {
    let routes = RoutePaths::default();
    let api = MockBackendApi::new()
        .with_account("64070001", "hunter2", &create_token("s-01", "student", 3600))
        .with_account("broken", "pw", "not-a-token");
    let store = InMemoryCredentialStore::new();

    assert!(matches!(
        sign_in(&api, &store, "64070001", "wrong", &routes).await,
        Err(AuthError::LookupFailure(_))
    ));
    assert!(matches!(
        sign_in(&api, &store, "nobody", "hunter2", &routes).await,
        Err(AuthError::LookupFailure(_))
    ));
    assert!(matches!(
        sign_in(&api, &store, "broken", "pw", &routes).await,
        Err(AuthError::MalformedCredential(_))
    ));
    assert_eq!(store.get(CREDENTIAL_KEY), None);
    assert_eq!(store.mutations(), 0);
}

#[tokio::test]
async fn test_teacher_profile_is_resolved_from_subject() {
    let api = MockBackendApi::new().with_teacher("t-01", "Dr. Somchai");
    let token = create_token("t-01", "teacher", 3600);

    let profile = resolve_teacher_profile(Some(&token), &api).await.unwrap();

    assert_eq!(profile.tid, "t-01");
    assert_eq!(profile.name, "Dr. Somchai");
    assert_eq!(api.calls(), vec!["teacher:t-01"]);
}

#[tokio::test]
async fn test_teacher_profile_failures() {
    let api = MockBackendApi::new();

    assert_eq!(
        resolve_teacher_profile(None, &api).await,
        Err(AuthError::MissingCredential)
    );
    assert!(matches!(
        resolve_teacher_profile(Some("bad"), &api).await,
        Err(AuthError::MalformedCredential(_))
    ));

    let unknown = create_token("t-99", "teacher", 3600);
    assert!(matches!(
        resolve_teacher_profile(Some(&unknown), &api).await,
        Err(AuthError::LookupFailure(_))
    ));
}
