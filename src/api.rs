use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::LookupError;

/// StudentProfile
///
/// Row from the backend's `student` table as served by `get-student-profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub sid: String,
    pub name: String,
    // A student who has not joined a team yet has no team id.
    pub teamid: Option<String>,
}

/// TeacherProfile
///
/// Row from the backend's `teacher` table as served by `get-teacher-profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub tid: String,
    pub name: String,
}

// 1. BackendApi Contract
/// BackendApi
///
/// The external lookups the guards depend on. Handlers and gates only see this trait,
/// so tests swap the HTTP client for [`MockBackendApi`].
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Resolves a principal to its student profile (and through it, the team).
    async fn get_student_profile(&self, subject: &str) -> Result<StudentProfile, LookupError>;

    /// Whether the team already has a registered project topic.
    async fn check_topic_for_team(&self, team_id: &str) -> Result<bool, LookupError>;

    async fn get_teacher_profile(&self, subject: &str) -> Result<TeacherProfile, LookupError>;

    /// Exchanges a username and password for a credential. Rejected logins surface as
    /// `LookupError::Status(401)`.
    async fn login(&self, username: &str, password: &str) -> Result<String, LookupError>;
}

/// Body of a successful `POST /permission/login`. `token_type` is always `bearer`.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// ApiState
///
/// The shared handle to the backend collaborator.
pub type ApiState = Arc<dyn BackendApi>;

// 2. The Real Implementation
/// HttpBackendApi
///
/// Talks to the project backend over HTTP. No timeout is configured; reqwest's
/// defaults apply.
#[derive(Clone)]
pub struct HttpBackendApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackendApi {
    pub fn new(base_url: &str) -> Result<Self, LookupError> {
        let base_url =
            Url::parse(base_url).map_err(|e| LookupError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(LookupError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET + status check + JSON decode.
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        key: &str,
    ) -> Result<T, LookupError> {
        let url = self.endpoint(segments)?;
        let response = self.client.get(url).send().await?;
        Self::read_json(response, key).await
    }

    /// Status check + JSON decode. A JSON `null` body becomes `NotFound`.
    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        key: &str,
    ) -> Result<T, LookupError> {
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        response
            .json::<Option<T>>()
            .await?
            .ok_or_else(|| LookupError::NotFound(key.to_string()))
    }
}

#[async_trait]
impl BackendApi for HttpBackendApi {
    async fn get_student_profile(&self, subject: &str) -> Result<StudentProfile, LookupError> {
        self.get_json(&["permission", "get-student-profile", subject], subject)
            .await
    }

    async fn check_topic_for_team(&self, team_id: &str) -> Result<bool, LookupError> {
        self.get_json(&["api", "topics", "check-topic-for-team", team_id], team_id)
            .await
    }

    async fn get_teacher_profile(&self, subject: &str) -> Result<TeacherProfile, LookupError> {
        self.get_json(&["permission", "get-teacher-profile", subject], subject)
            .await
    }

    async fn login(&self, username: &str, password: &str) -> Result<String, LookupError> {
        let url = self.endpoint(&["permission", "login"])?;
        let response = self
            .client
            .post(url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let body: LoginResponse = Self::read_json(response, username).await?;
        Ok(body.access_token)
    }
}

// 3. The Mock Implementation (For Tests)
/// MockBackendApi
///
/// Canned answers keyed by subject / team id. Every call is logged as
/// `"<operation>:<key>"` so tests can assert on ordering.
#[derive(Default)]
pub struct MockBackendApi {
    students: HashMap<String, StudentProfile>,
    topics: HashMap<String, bool>,
    teachers: HashMap<String, TeacherProfile>,
    // username -> (password, issued credential)
    accounts: HashMap<String, (String, String)>,
    /// When true, student profile lookups fail with a 500.
    pub fail_profiles: bool,
    /// When true, topic lookups fail with a 500.
    pub fail_topics: bool,
    /// Artificial latency applied before every answer.
    pub delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockBackendApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_student(mut self, sid: &str, teamid: Option<&str>) -> Self {
        self.students.insert(
            sid.to_string(),
            StudentProfile {
                sid: sid.to_string(),
                name: format!("Student {sid}"),
                teamid: teamid.map(str::to_string),
            },
        );
        self
    }

    pub fn with_topic(mut self, team_id: &str, has_topic: bool) -> Self {
        self.topics.insert(team_id.to_string(), has_topic);
        self
    }

    pub fn with_teacher(mut self, tid: &str, name: &str) -> Self {
        self.teachers.insert(
            tid.to_string(),
            TeacherProfile {
                tid: tid.to_string(),
                name: name.to_string(),
            },
        );
        self
    }

    /// Registers an account whose login returns `credential`.
    pub fn with_account(mut self, username: &str, password: &str, credential: &str) -> Self {
        self.accounts.insert(
            username.to_string(),
            (password.to_string(), credential.to_string()),
        );
        self
    }

    pub fn failing_profiles(mut self) -> Self {
        self.fail_profiles = true;
        self
    }

    pub fn failing_topics(mut self) -> Self {
        self.fail_topics = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn record(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl BackendApi for MockBackendApi {
    async fn get_student_profile(&self, subject: &str) -> Result<StudentProfile, LookupError> {
        self.record(format!("student:{subject}")).await;
        if self.fail_profiles {
            return Err(LookupError::Status(StatusCode::INTERNAL_SERVER_ERROR));
        }
        self.students
            .get(subject)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(subject.to_string()))
    }

    async fn check_topic_for_team(&self, team_id: &str) -> Result<bool, LookupError> {
        self.record(format!("topic:{team_id}")).await;
        if self.fail_topics {
            return Err(LookupError::Status(StatusCode::INTERNAL_SERVER_ERROR));
        }
        // The backend answers `false` for teams it has never seen.
        Ok(self.topics.get(team_id).copied().unwrap_or(false))
    }

    async fn get_teacher_profile(&self, subject: &str) -> Result<TeacherProfile, LookupError> {
        self.record(format!("teacher:{subject}")).await;
        self.teachers
            .get(subject)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(subject.to_string()))
    }

    async fn login(&self, username: &str, password: &str) -> Result<String, LookupError> {
        self.record(format!("login:{username}")).await;
        match self.accounts.get(username) {
            Some((expected, credential)) if expected == password => Ok(credential.clone()),
            _ => Err(LookupError::Status(StatusCode::UNAUTHORIZED)),
        }
    }
}
