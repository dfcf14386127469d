use thiserror::Error;

/// AuthError
///
/// Every way a guarded navigation can fail. None of these reach the user as text:
/// guards translate each kind into a redirect and log the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential under the well-known storage key.
    #[error("no credential in store")]
    MissingCredential,
    /// The credential failed structural or payload decoding.
    #[error("malformed credential: {0}")]
    MalformedCredential(String),
    /// The credential decoded but its `exp` instant has passed.
    #[error("credential expired")]
    ExpiredCredential,
    /// The credential is valid but its role is not in the allowed set.
    #[error("role `{0}` is not allowed here")]
    InsufficientRole(crate::auth::Role),
    /// A backend lookup rejected or answered with a non-success status.
    #[error("lookup failed: {0}")]
    LookupFailure(String),
}

impl From<LookupError> for AuthError {
    fn from(err: LookupError) -> Self {
        AuthError::LookupFailure(err.to_string())
    }
}

/// LookupError
///
/// Failure of a single call to the project backend.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("no record for `{0}`")]
    NotFound(String),
    #[error("student `{0}` has no team")]
    MissingTeam(String),
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}
