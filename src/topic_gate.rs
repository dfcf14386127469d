use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::{
    api::{ApiState, StudentProfile},
    auth::decode_credential,
    config::RoutePaths,
    credential::{CREDENTIAL_KEY, CredentialStore},
    error::{AuthError, LookupError},
    navigation::Navigator,
};

/// TopicRequirement
///
/// Which side of the "team has a topic" check a subtree belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicRequirement {
    /// Pages that only make sense once the team has a registered project.
    Present,
    /// The topic-creation flow, which is pointless once a topic exists.
    Absent,
}

/// GateOutcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Allow,
    Redirect(String),
}

/// TopicCheck
///
/// What the gate learned about the principal: the profile the team id came from and
/// whether that team has a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicCheck {
    pub profile: StudentProfile,
    pub has_topic: bool,
}

/// TopicGate
///
/// Secondary gate that asks the backend whether the principal's team already has a
/// project and routes accordingly. It does not look at `exp`: it is always mounted
/// inside a Role Guard that has already rejected expired credentials.
///
/// Only a missing credential leads back to the public entry. Decode and lookup
/// failures fall toward the topic-creation flow, never toward login.
#[derive(Clone)]
pub struct TopicGate {
    api: ApiState,
    requirement: TopicRequirement,
    routes: RoutePaths,
}

impl TopicGate {
    pub fn new(api: ApiState, requirement: TopicRequirement, routes: RoutePaths) -> Self {
        Self {
            api,
            requirement,
            routes,
        }
    }

    pub fn requirement(&self) -> TopicRequirement {
        self.requirement
    }

    /// check
    ///
    /// Decodes the credential and runs the two lookups in order: subject → team,
    /// then team → has-topic. The second call is never issued if the first fails.
    pub async fn check(&self, credential: Option<&str>) -> Result<TopicCheck, AuthError> {
        let credential = credential.ok_or(AuthError::MissingCredential)?;
        let claims = decode_credential(credential)?;

        let profile = self.api.get_student_profile(&claims.sub).await?;
        let team_id = profile
            .teamid
            .as_deref()
            .ok_or_else(|| LookupError::MissingTeam(claims.sub.clone()))?;

        let has_topic = self.api.check_topic_for_team(team_id).await?;
        Ok(TopicCheck { profile, has_topic })
    }

    /// evaluate
    ///
    /// Runs the check and maps the result onto an outcome for this gate's requirement.
    pub async fn evaluate(&self, credential: Option<&str>) -> GateOutcome {
        self.admit(credential).await.0
    }

    /// admit
    ///
    /// Like [`TopicGate::evaluate`], and also hands back the student profile when the
    /// page is allowed and the profile lookup succeeded.
    pub async fn admit(&self, credential: Option<&str>) -> (GateOutcome, Option<StudentProfile>) {
        let result = self.check(credential).await;
        let profile = result.as_ref().ok().map(|check| check.profile.clone());

        match self.outcome_for(result.map(|check| check.has_topic)) {
            GateOutcome::Allow => (GateOutcome::Allow, profile),
            redirect => (redirect, None),
        }
    }

    fn outcome_for(&self, result: Result<bool, AuthError>) -> GateOutcome {
        match (self.requirement, result) {
            (_, Err(AuthError::MissingCredential)) => {
                GateOutcome::Redirect(self.routes.public_entry.clone())
            }
            (TopicRequirement::Present, Ok(true)) => GateOutcome::Allow,
            (TopicRequirement::Present, Ok(false)) => {
                tracing::debug!("team has no topic yet");
                GateOutcome::Redirect(self.routes.no_topic.clone())
            }
            (TopicRequirement::Present, Err(reason)) => {
                tracing::warn!(%reason, "topic check failed");
                GateOutcome::Redirect(self.routes.no_topic.clone())
            }
            (TopicRequirement::Absent, Ok(true)) => {
                GateOutcome::Redirect(self.routes.student_home.clone())
            }
            (TopicRequirement::Absent, Ok(false)) => GateOutcome::Allow,
            (TopicRequirement::Absent, Err(reason)) => {
                tracing::warn!(%reason, "topic check failed, staying on topic creation");
                GateOutcome::Allow
            }
        }
    }

    /// mount
    ///
    /// Reads the credential and starts the check on the Tokio runtime. The redirect,
    /// if any, is issued from the task once the lookups settle. Dropping the returned
    /// handle aborts the task, so an unmounted gate never navigates.
    pub fn mount(
        &self,
        store: &dyn CredentialStore,
        navigator: Arc<dyn Navigator>,
    ) -> GateHandle {
        let credential = store.get(CREDENTIAL_KEY);
        let gate = self.clone();

        let task = tokio::spawn(async move {
            let outcome = gate.evaluate(credential.as_deref()).await;
            if let GateOutcome::Redirect(destination) = &outcome {
                navigator.push(destination);
            }
            outcome
        });

        GateHandle {
            task,
            settled: None,
        }
    }
}

/// GateHandle
///
/// Owns a mounted gate's in-flight check.
pub struct GateHandle {
    task: JoinHandle<GateOutcome>,
    // A JoinHandle must not be polled after it completes.
    settled: Option<Option<GateOutcome>>,
}

impl GateHandle {
    /// True while the lookups are pending; callers show a loading indicator meanwhile.
    pub fn is_loading(&self) -> bool {
        !self.task.is_finished()
    }

    /// Waits for the gate to settle. Returns `None` if the check was aborted.
    pub async fn outcome(&mut self) -> Option<GateOutcome> {
        if let Some(settled) = &self.settled {
            return settled.clone();
        }
        let settled = (&mut self.task).await.ok();
        self.settled = Some(settled.clone());
        settled
    }

    /// Unmount: abort the check without waiting for it.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for GateHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
