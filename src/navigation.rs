use std::sync::{Mutex, PoisonError};

/// Navigator
///
/// The navigation collaborator. Guards call `push` as a fire-and-forget side effect;
/// nothing waits for the navigation to complete.
pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}

/// RecordingNavigator
///
/// Records every navigation request in order. The gateway uses it to turn a guard's
/// redirect into an HTTP response, and tests use it to count redirects.
#[derive(Default, Debug)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, path: &str) {
        tracing::debug!(destination = %path, "navigation requested");
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}
