//! Terminal user-presence prompt.

use dialoguer::Confirm;
use tracing::debug;

use crate::core::auth::{AuthOutcome, Authenticator};

/// Asks the user to confirm presence on the terminal.
///
/// Fails instead of blocking when stdin is not a terminal.
#[derive(Debug, Default)]
pub struct TerminalAuthenticator;

impl Authenticator for TerminalAuthenticator {
    fn authenticate(&self, prompt: &str) -> AuthOutcome {
        debug!("asking for user presence");
        match Confirm::new().with_prompt(prompt).default(false).interact_opt() {
            Ok(Some(true)) => AuthOutcome::Authenticated,
            Ok(Some(false)) | Ok(None) => AuthOutcome::Cancelled,
            Err(e) => AuthOutcome::Failed(e.to_string()),
        }
    }
}
