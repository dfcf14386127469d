use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// The well-known key the credential is stored under.
pub const CREDENTIAL_KEY: &str = "access_token";

// 1. CredentialStore Contract
/// CredentialStore
///
/// A small key-value contract over client-side storage. Guards only ever `get` the
/// credential; the hand-off flow `set`s it and logout `delete`s it.
///
/// Implementations use interior mutability so one store can be shared by every
/// guard of a page through `&dyn CredentialStore`.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn delete(&self, key: &str);
}

// 2. In-memory implementation
/// InMemoryCredentialStore
///
/// A process-local store. Used by component-style callers and tests; it also counts
/// writes so callers can assert that the guards never mutate it.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
    mutations: Mutex<usize>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `credential` under [`CREDENTIAL_KEY`].
    pub fn with_credential(credential: &str) -> Self {
        let store = Self::default();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(CREDENTIAL_KEY.to_string(), credential.to_string());
        store
    }

    /// Number of `set`/`delete` calls observed so far.
    pub fn mutations(&self) -> usize {
        *self.mutations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_mutation(&self) {
        *self.mutations.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self.record_mutation();
    }

    fn delete(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        self.record_mutation();
    }
}

// 3. Cookie-backed implementation
/// CookieCredentialStore
///
/// Wraps the request's `CookieJar`, the gateway's stand-in for browser storage.
/// Writes are recorded as cookie deltas; hand the jar back to axum with
/// [`CookieCredentialStore::into_jar`] so they reach the client as `Set-Cookie` headers.
///
/// The credential cookie is `HttpOnly` and `SameSite=Lax`, and `Secure` when built
/// with [`CookieCredentialStore::secure`].
pub struct CookieCredentialStore {
    jar: Mutex<CookieJar>,
    secure: bool,
}

impl CookieCredentialStore {
    pub fn new(jar: CookieJar) -> Self {
        Self {
            jar: Mutex::new(jar),
            secure: false,
        }
    }

    /// Marks written cookies `Secure` (HTTPS only). Enabled in production.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(CookieJar) -> CookieJar) {
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        *jar = f(jar.clone());
    }
}

impl CredentialStore for CookieCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|cookie| cookie.value().to_string())
    }

    fn set(&self, key: &str, value: &str) {
        let mut cookie = Cookie::new(key.to_string(), value.to_string());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(self.secure);
        self.update(|jar| jar.add(cookie));
    }

    fn delete(&self, key: &str) {
        let mut cookie = Cookie::new(key.to_string(), "");
        cookie.set_path("/");
        self.update(|jar| jar.remove(cookie));
    }
}
