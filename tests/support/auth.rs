//! Scripted authenticators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use coffer::{AuthOutcome, Authenticator};

/// Returns queued outcomes in order, then `Authenticated` forever.
///
/// Records every prompt it was shown.
#[derive(Default)]
pub struct ScriptedAuthenticator {
    outcomes: Mutex<VecDeque<AuthOutcome>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcomes(outcomes: impl IntoIterator<Item = AuthOutcome>) -> Self {
        let auth = Self::new();
        auth.outcomes.lock().unwrap().extend(outcomes);
        auth
    }

    pub fn push(&self, outcome: AuthOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Authenticator for ScriptedAuthenticator {
    fn authenticate(&self, prompt: &str) -> AuthOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(AuthOutcome::Authenticated)
    }
}
