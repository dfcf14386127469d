use crate::{
    api::{BackendApi, TeacherProfile},
    auth::{Role, decode_credential},
    config::RoutePaths,
    credential::{CREDENTIAL_KEY, CredentialStore},
    error::AuthError,
    navigation::Navigator,
};

/// landing_route
///
/// Where a freshly logged-in principal should go. Students land on their dashboard,
/// teachers on the topic review list. A missing or undecodable credential goes back
/// to login. Expiry is left to the destination's Role Guard.
pub fn landing_route(credential: Option<&str>, routes: &RoutePaths) -> String {
    let Some(credential) = credential else {
        return routes.login.clone();
    };

    match decode_credential(credential) {
        Ok(claims) => match claims.role {
            Role::Student => routes.student_home.clone(),
            Role::Teacher => routes.teacher_home.clone(),
        },
        Err(reason) => {
            tracing::debug!(%reason, "landing route falling back to login");
            routes.login.clone()
        }
    }
}

/// logout
///
/// Deletes the credential and sends the principal to the public entry.
pub fn logout(store: &dyn CredentialStore, navigator: &dyn Navigator, routes: &RoutePaths) {
    store.delete(CREDENTIAL_KEY);
    navigator.push(&routes.public_entry);
}

/// store_credential
///
/// Accepts a credential issued by the external login endpoint. It is only persisted
/// if it decodes; the returned route is the next stop for the principal.
pub fn store_credential(
    store: &dyn CredentialStore,
    credential: &str,
    routes: &RoutePaths,
) -> Result<String, AuthError> {
    decode_credential(credential)?;
    store.set(CREDENTIAL_KEY, credential);
    Ok(routes.landing.clone())
}

/// sign_in
///
/// Exchanges a username and password for a credential at the backend's login endpoint,
/// then stores it like [`store_credential`]. Nothing is stored on failure.
pub async fn sign_in(
    api: &dyn BackendApi,
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
    routes: &RoutePaths,
) -> Result<String, AuthError> {
    let credential = api.login(username, password).await?;
    store_credential(store, &credential, routes)
}

/// resolve_teacher_profile
///
/// Loads the profile of the teacher behind the credential. Callers redirect to the
/// public entry on any error.
pub async fn resolve_teacher_profile(
    credential: Option<&str>,
    api: &dyn BackendApi,
) -> Result<TeacherProfile, AuthError> {
    let credential = credential.ok_or(AuthError::MissingCredential)?;
    let claims = decode_credential(credential)?;
    Ok(api.get_teacher_profile(&claims.sub).await?)
}
