use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::{
    auth::{Claims, Role, decode_credential},
    credential::{CREDENTIAL_KEY, CredentialStore},
    error::AuthError,
    navigation::Navigator,
};

/// AllowedRoles
///
/// The immutable role set a guard admits. Cloning shares the same allocation, which
/// gives the set an identity: a guard only re-evaluates when it is handed a set that
/// is not the one it already holds.
#[derive(Debug, Clone)]
pub struct AllowedRoles(Arc<[Role]>);

impl AllowedRoles {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self(roles.into_iter().collect())
    }

    pub fn students() -> Self {
        Self::new([Role::Student])
    }

    pub fn teachers() -> Self {
        Self::new([Role::Teacher])
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// True when both handles point at the same configured set.
    pub fn same_identity(&self, other: &AllowedRoles) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// AccessDecision
///
/// The outcome of one guard evaluation. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Render(Claims),
    Redirect(String),
}

/// check_access
///
/// The pure core of the Role Guard. Checks run in a fixed order: presence, decoding,
/// expiry, then role membership, so an expired credential is reported as expired even
/// when its role would be admitted.
pub fn check_access(
    credential: Option<&str>,
    allowed: &AllowedRoles,
    now: DateTime<Utc>,
) -> Result<Claims, AuthError> {
    let credential = credential.ok_or(AuthError::MissingCredential)?;
    let claims = decode_credential(credential)?;

    if claims.is_expired_at(now) {
        return Err(AuthError::ExpiredCredential);
    }
    if !allowed.contains(claims.role) {
        return Err(AuthError::InsufficientRole(claims.role));
    }

    Ok(claims)
}

/// decide
///
/// Maps [`check_access`] onto an [`AccessDecision`]. Every failure kind sends the
/// principal to `public_entry`.
pub fn decide(
    credential: Option<&str>,
    allowed: &AllowedRoles,
    now: DateTime<Utc>,
    public_entry: &str,
) -> AccessDecision {
    match check_access(credential, allowed, now) {
        Ok(claims) => AccessDecision::Render(claims),
        Err(_) => AccessDecision::Redirect(public_entry.to_string()),
    }
}

/// GuardState
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Unevaluated,
    Checking,
    Authorized(Claims),
    Denied { reason: AuthError, redirect: String },
}

/// RoleGuard
///
/// Gates a subtree on "valid credential whose role is in the allowed set".
///
/// `mount` performs the check once and caches the terminal state; later calls (the
/// equivalent of re-renders) return the cached state without touching the store or
/// the navigator. Only [`RoleGuard::set_allowed_roles`] with a different set resets it.
#[derive(Debug)]
pub struct RoleGuard {
    allowed: AllowedRoles,
    public_entry: String,
    state: GuardState,
}

impl RoleGuard {
    pub fn new(allowed: AllowedRoles, public_entry: impl Into<String>) -> Self {
        Self {
            allowed,
            public_entry: public_entry.into(),
            state: GuardState::Unevaluated,
        }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Whether the protected children should be rendered.
    pub fn renders_children(&self) -> bool {
        matches!(self.state, GuardState::Authorized(_))
    }

    pub fn allowed_roles(&self) -> &AllowedRoles {
        &self.allowed
    }

    pub fn mount(
        &mut self,
        store: &dyn CredentialStore,
        navigator: &dyn Navigator,
    ) -> &GuardState {
        self.mount_at(store, navigator, Utc::now())
    }

    /// Same as [`RoleGuard::mount`] with an explicit clock reading.
    pub fn mount_at(
        &mut self,
        store: &dyn CredentialStore,
        navigator: &dyn Navigator,
        now: DateTime<Utc>,
    ) -> &GuardState {
        if self.state != GuardState::Unevaluated {
            return &self.state;
        }

        self.state = GuardState::Checking;
        let credential = store.get(CREDENTIAL_KEY);

        self.state = match check_access(credential.as_deref(), &self.allowed, now) {
            Ok(claims) => {
                tracing::debug!(sub = %claims.sub, role = %claims.role, "role guard authorized");
                GuardState::Authorized(claims)
            }
            Err(reason) => {
                tracing::debug!(%reason, "role guard denied access");
                navigator.push(&self.public_entry);
                GuardState::Denied {
                    reason,
                    redirect: self.public_entry.clone(),
                }
            }
        };

        &self.state
    }

    /// Replaces the allowed role set. A set with a different identity resets the
    /// guard so the next `mount` checks again.
    pub fn set_allowed_roles(&mut self, allowed: AllowedRoles) {
        if !self.allowed.same_identity(&allowed) {
            self.allowed = allowed;
            self.state = GuardState::Unevaluated;
        }
    }
}
