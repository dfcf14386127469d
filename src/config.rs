use std::env;

/// AppConfig
///
/// Holds the gateway's entire configuration state. This struct is immutable once loaded
/// and is pulled into the application state via FromRef, so every guard layer and page
/// handler sees the same backend address and route table.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and which settings are mandatory.
    pub env: Env,
    // Base URL of the project backend (profile and topic lookups).
    pub api_base_url: String,
    // Socket address the gateway listens on.
    pub bind_addr: String,
    // Well-known destinations used by guards and session flows.
    pub routes: RoutePaths,
}

/// Env
///
/// Defines the runtime context: local development (pretty logs, local backend fallback)
/// or production (JSON logs, every setting explicit).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// RoutePaths
///
/// The small closed set of destinations that guards may redirect to, plus the
/// role-specific landing pages used after login.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePaths {
    /// Public entry point. Every Role Guard denial lands here.
    pub public_entry: String,
    /// Login page, used by the landing route when no usable credential exists.
    pub login: String,
    /// Topic-creation flow. The Topic-Existence Gate falls back here.
    pub no_topic: String,
    /// Landing page for principals with the `student` role.
    pub student_home: String,
    /// Landing page for principals with the `teacher` role.
    pub teacher_home: String,
    /// Role-based dispatcher reached right after login.
    pub landing: String,
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self {
            public_entry: "/".to_string(),
            login: "/login".to_string(),
            no_topic: "/new-topic".to_string(),
            student_home: "/dashboard".to_string(),
            teacher_home: "/Topics".to_string(),
            landing: "/change-route".to_string(),
        }
    }
}

const LOCAL_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

impl Default for AppConfig {
    /// default
    ///
    /// Provides a non-panicking AppConfig for test setup, pointing at the local backend.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: LOCAL_API_BASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            routes: RoutePaths::default(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables, following the **fail-fast**
    /// principle for production.
    ///
    /// # Panics
    /// Panics in `Env::Production` when `BACKEND_API_URL` is not set.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => env::var("BACKEND_API_URL")
                .expect("FATAL: BACKEND_API_URL must be set in production."),
            Env::Local => {
                env::var("BACKEND_API_URL").unwrap_or_else(|_| LOCAL_API_BASE_URL.to_string())
            }
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Self {
            env,
            api_base_url,
            bind_addr,
            routes: RoutePaths::default(),
        }
    }
}
