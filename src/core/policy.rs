//! Access policies.
//!
//! An [`AccessPolicy`] says when a stored item can be reached: its
//! accessibility tier, whether it stays on this device, whether it syncs,
//! and whether reading it requires the user to authenticate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// When an item can be read relative to the device lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accessibility {
    /// Readable regardless of lock state. Only kept so older data can be
    /// migrated out of it.
    #[serde(rename = "always")]
    AlwaysAccessible,
    /// Readable once the device has been unlocked after a restart.
    AfterFirstUnlock,
    /// Readable only while the device is unlocked.
    WhenUnlocked,
    /// Readable only while unlocked and only if a passcode is set. Removing
    /// the passcode deletes these items.
    WhenPasscodeSet,
}

impl Accessibility {
    /// Every tier, in declaration order.
    pub const ALL: [Accessibility; 4] = [
        Self::AlwaysAccessible,
        Self::AfterFirstUnlock,
        Self::WhenUnlocked,
        Self::WhenPasscodeSet,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::AlwaysAccessible => "always",
            Self::AfterFirstUnlock => "after-first-unlock",
            Self::WhenUnlocked => "when-unlocked",
            Self::WhenPasscodeSet => "when-passcode-set",
        }
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Accessibility {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidArgument(format!("unknown accessibility '{}'", s)))
    }
}

/// Whether items may leave the device through encrypted backups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Locality {
    DeviceLocal,
    Migratable,
}

/// The tiers that can sync across a user's devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudAccessibility {
    AfterFirstUnlock,
    WhenUnlocked,
}

impl CloudAccessibility {
    pub fn accessibility(self) -> Accessibility {
        match self {
            Self::AfterFirstUnlock => Accessibility::AfterFirstUnlock,
            Self::WhenUnlocked => Accessibility::WhenUnlocked,
        }
    }
}

/// How the user proves presence on a user-presence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessControl {
    /// Biometrics or device passcode.
    UserPresence,
    /// Any enrolled biometric; survives enrollment changes.
    BiometricAny,
    /// The currently enrolled biometric set; enrollment changes make items
    /// unreadable.
    BiometricCurrentSet,
    /// Device passcode only.
    DevicePasscode,
}

impl AccessControl {
    pub const ALL: [AccessControl; 4] = [
        Self::UserPresence,
        Self::BiometricAny,
        Self::BiometricCurrentSet,
        Self::DevicePasscode,
    ];

    /// Attribute value stored with each item.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserPresence => "user-presence",
            Self::BiometricAny => "biometric-any",
            Self::BiometricCurrentSet => "biometric-current-set",
            Self::DevicePasscode => "device-passcode",
        }
    }

    /// Suffix appended to the service attribute. `UserPresence` has none so
    /// stores created before access-control flavours existed stay reachable.
    fn service_suffix(self) -> &'static str {
        match self {
            Self::UserPresence => "",
            Self::BiometricAny => ".biometric-any",
            Self::BiometricCurrentSet => ".biometric-current-set",
            Self::DevicePasscode => ".device-passcode",
        }
    }
}

impl std::str::FromStr for AccessControl {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidArgument(format!("unknown access control '{}'", s)))
    }
}

/// How often a user-presence store authenticates reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptMode {
    /// Every read authenticates.
    EveryAccess,
    /// One authenticated session is reused until the prompt latch is armed.
    SinglePrompt,
}

/// User-presence requirement of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserPresence {
    pub control: AccessControl,
    pub mode: PromptMode,
}

/// Immutable description of how stored items may be reached.
///
/// Invariants, checked by [`AccessPolicy::new`]:
/// - user presence excludes sync
/// - sync excludes device-local items and the passcode tier
/// - the passcode tier is always device-local
/// - user presence always uses the passcode tier, device-local
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessPolicy {
    accessibility: Accessibility,
    locality: Locality,
    syncable: bool,
    user_presence: Option<UserPresence>,
}

impl AccessPolicy {
    /// Build a policy, rejecting combinations the vault cannot honour.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPolicy` describing the violated rule.
    pub fn new(
        accessibility: Accessibility,
        locality: Locality,
        syncable: bool,
        user_presence: Option<UserPresence>,
    ) -> Result<Self> {
        if user_presence.is_some() && syncable {
            return invalid_policy("user-presence items cannot be syncable");
        }
        if syncable && locality == Locality::DeviceLocal {
            return invalid_policy("syncable items cannot be device-local");
        }
        if syncable && accessibility == Accessibility::WhenPasscodeSet {
            return invalid_policy("passcode-gated items cannot be syncable");
        }
        if accessibility == Accessibility::WhenPasscodeSet && locality == Locality::Migratable {
            return invalid_policy("passcode-gated items are always device-local");
        }
        if user_presence.is_some()
            && (accessibility != Accessibility::WhenPasscodeSet || locality != Locality::DeviceLocal)
        {
            return invalid_policy("user-presence items must be passcode-gated and device-local");
        }

        Ok(Self {
            accessibility,
            locality,
            syncable,
            user_presence,
        })
    }

    /// A device-local policy for any tier.
    pub fn device_local(accessibility: Accessibility) -> Self {
        Self {
            accessibility,
            locality: Locality::DeviceLocal,
            syncable: false,
            user_presence: None,
        }
    }

    /// A policy whose items follow encrypted backups to a new device.
    ///
    /// # Errors
    ///
    /// Fails for `WhenPasscodeSet`, which is always device-local.
    pub fn migratable(accessibility: Accessibility) -> Result<Self> {
        Self::new(accessibility, Locality::Migratable, false, None)
    }

    /// A policy whose items sync across the user's devices.
    pub fn cloud(accessibility: CloudAccessibility) -> Self {
        Self {
            accessibility: accessibility.accessibility(),
            locality: Locality::Migratable,
            syncable: true,
            user_presence: None,
        }
    }

    /// An enclave-backed policy that authenticates every read.
    pub fn secure_enclave(control: AccessControl) -> Self {
        Self::user_presence_gated(control, PromptMode::EveryAccess)
    }

    /// An enclave-backed policy that authenticates once per session.
    pub fn single_prompt(control: AccessControl) -> Self {
        Self::user_presence_gated(control, PromptMode::SinglePrompt)
    }

    fn user_presence_gated(control: AccessControl, mode: PromptMode) -> Self {
        Self {
            accessibility: Accessibility::WhenPasscodeSet,
            locality: Locality::DeviceLocal,
            syncable: false,
            user_presence: Some(UserPresence { control, mode }),
        }
    }

    pub fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    pub fn locality(&self) -> Locality {
        self.locality
    }

    pub fn is_device_local(&self) -> bool {
        self.locality == Locality::DeviceLocal
    }

    pub fn syncable(&self) -> bool {
        self.syncable
    }

    pub fn requires_user_presence(&self) -> bool {
        self.user_presence.is_some()
    }

    pub fn user_presence(&self) -> Option<UserPresence> {
        self.user_presence
    }

    /// The same tier and locality without any user-presence requirement.
    ///
    /// Used to probe vault access without prompting the user.
    pub fn without_user_presence(&self) -> Self {
        Self {
            user_presence: None,
            ..*self
        }
    }

    /// The same policy under a different tier, keeping every other field.
    ///
    /// Only meaningful for policies without user presence; used to address
    /// items written under an older tier.
    pub(crate) fn retiered(&self, accessibility: Accessibility) -> Self {
        Self {
            accessibility,
            ..*self
        }
    }

    /// Stable accessibility attribute stored with each item.
    pub fn tier_attribute(&self) -> String {
        match self.locality {
            Locality::DeviceLocal => format!("{}-this-device-only", self.accessibility),
            Locality::Migratable => self.accessibility.to_string(),
        }
    }

    /// Store flavour used when naming the service attribute.
    pub(crate) fn flavour(&self) -> &'static str {
        match (self.syncable, self.user_presence) {
            (true, _) => "cloud",
            (false, None) => "standard",
            (false, Some(UserPresence { mode: PromptMode::EveryAccess, .. })) => "enclave",
            (false, Some(UserPresence { mode: PromptMode::SinglePrompt, .. })) => "single-prompt",
        }
    }

    /// Suffix contributed by the access-control flavour, if any.
    pub(crate) fn service_suffix(&self) -> &'static str {
        self.user_presence
            .map(|up| up.control.service_suffix())
            .unwrap_or("")
    }
}

fn invalid_policy(reason: &str) -> Result<AccessPolicy> {
    Err(ValidationError::InvalidPolicy(reason.to_string()).into())
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.tier_attribute(), self.flavour())
    }
}
