//! Interactive authentication.
//!
//! Stores on user-presence tiers ask an [`Authenticator`] before reading.
//! The call blocks until the user responds or the platform gives up.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::StoreError;

/// Result of one authentication prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    /// The user dismissed the prompt.
    Cancelled,
    /// The user picked the fallback option (e.g. "Enter Password").
    Fallback,
    /// Authentication was attempted and failed, or timed out.
    Failed(String),
}

impl AuthOutcome {
    /// Map a non-authenticated outcome to its store error.
    pub(crate) fn into_result(self) -> Result<(), StoreError> {
        match self {
            Self::Authenticated => Ok(()),
            Self::Cancelled => Err(StoreError::UserCancelled),
            Self::Fallback => Err(StoreError::UserFallback),
            Self::Failed(reason) => Err(StoreError::AuthenticationFailed(reason)),
        }
    }
}

/// Blocking user-presence prompt.
pub trait Authenticator: Send + Sync {
    /// Show `prompt` and wait for the user.
    fn authenticate(&self, prompt: &str) -> AuthOutcome;
}

/// One-shot "prompt on next read" flag.
///
/// `arm` is idempotent; `consume` returns `true` at most once per `arm`,
/// even when several threads race for it.
#[derive(Debug, Default)]
pub struct PromptLatch {
    forced: AtomicBool,
}

impl PromptLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Idle -> PromptForced`.
    pub fn arm(&self) {
        self.forced.store(true, Ordering::Release);
    }

    /// `PromptForced -> Idle`; true if this call observed the forced state.
    pub fn consume(&self) -> bool {
        self.forced.swap(false, Ordering::AcqRel)
    }

    pub fn is_armed(&self) -> bool {
        self.forced.load(Ordering::Acquire)
    }
}

/// Authenticated session reused by single-prompt stores.
#[derive(Debug, Default)]
pub(crate) struct Session {
    valid: AtomicBool,
}

impl Session {
    pub(crate) fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    pub(crate) fn establish(&self) {
        self.valid.store(true, Ordering::Release);
    }

    pub(crate) fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }
}
