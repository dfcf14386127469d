use axum::http::{HeaderMap, HeaderValue, header};
use axum_extra::extract::cookie::{CookieJar, SameSite};
use siam_portal::{CREDENTIAL_KEY, CookieCredentialStore, CredentialStore, InMemoryCredentialStore};

#[cfg(test)]
mod in_memory_tests {
    use super::*;

    #[test]
    fn test_get_set_delete() {
        let store = InMemoryCredentialStore::new();
        assert_eq!(store.get(CREDENTIAL_KEY), None);

        store.set(CREDENTIAL_KEY, "token-1");
        assert_eq!(store.get(CREDENTIAL_KEY).as_deref(), Some("token-1"));

        store.set(CREDENTIAL_KEY, "token-2");
        assert_eq!(store.get(CREDENTIAL_KEY).as_deref(), Some("token-2"));

        store.delete(CREDENTIAL_KEY);
        assert_eq!(store.get(CREDENTIAL_KEY), None);
        assert_eq!(store.mutations(), 3);
    }

    #[test]
    fn test_reads_are_not_mutations() {
        let store = InMemoryCredentialStore::with_credential("token");
        for _ in 0..5 {
            assert!(store.get(CREDENTIAL_KEY).is_some());
        }
        assert_eq!(store.mutations(), 0);
    }
}

#[cfg(test)]
mod cookie_tests {
    use super::*;

    fn jar_with(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn test_reads_credential_cookie() {
        let store = CookieCredentialStore::new(jar_with("theme=dark; access_token=abc.def.ghi"));
        assert_eq!(store.get(CREDENTIAL_KEY).as_deref(), Some("abc.def.ghi"));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_set_is_visible_and_emitted() {
        let store = CookieCredentialStore::new(CookieJar::new());
        store.set(CREDENTIAL_KEY, "abc.def.ghi");
        assert_eq!(store.get(CREDENTIAL_KEY).as_deref(), Some("abc.def.ghi"));

        let jar = store.into_jar();
        let cookie = jar.get(CREDENTIAL_KEY).unwrap();
        assert_eq!(cookie.value(), "abc.def.ghi");
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_credential_cookie_is_same_site_lax() {
        let store = CookieCredentialStore::new(CookieJar::new());
        store.set(CREDENTIAL_KEY, "abc.def.ghi");

        let jar = store.into_jar();
        let cookie = jar.get(CREDENTIAL_KEY).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_ne!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_secure_store_marks_cookie_secure() {
        let store = CookieCredentialStore::new(CookieJar::new()).secure(true);
        store.set(CREDENTIAL_KEY, "abc.def.ghi");

        let jar = store.into_jar();
        let cookie = jar.get(CREDENTIAL_KEY).unwrap();
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn test_delete_removes_credential() {
        let store = CookieCredentialStore::new(jar_with("access_token=abc.def.ghi"));
        store.delete(CREDENTIAL_KEY);

        assert_eq!(store.get(CREDENTIAL_KEY), None);
        assert!(store.into_jar().get(CREDENTIAL_KEY).is_none());
    }
}
