//! Migrate command.

use tracing::info;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::identity::StoreIdentity;
use crate::core::policy::{AccessPolicy, Accessibility, Locality};
use crate::core::store::SecureStore;
use crate::error::Result;

/// Move every item of the store `from` into the configured store.
///
/// The source shares the configured vault and shared group.
pub fn execute(
    ctx: &Context,
    from: &str,
    from_accessibility: Option<Accessibility>,
    from_device_local: bool,
    remove: bool,
) -> Result<()> {
    let destination = ctx.target()?;
    let identity = destination.store().identity();

    let locality = if from_device_local {
        Locality::DeviceLocal
    } else {
        Locality::Migratable
    };
    let accessibility = from_accessibility.unwrap_or(identity.policy().accessibility());
    let policy = AccessPolicy::new(accessibility, locality, false, None)?;

    let mut source_identity = StoreIdentity::named(from, policy)?;
    if let Some(group) = identity.shared_group() {
        source_identity = StoreIdentity::shared(source_identity.identifier().clone(), group.clone(), policy);
    }
    info!(source = %source_identity, destination = %identity, remove, "migrating");

    let source = SecureStore::new(source_identity, ctx.vault.clone());
    let report = destination.store().migrate_from_store(&source, remove)?;

    output::success(&format!(
        "migrated {} item{} from {}",
        report.migrated.len(),
        if report.migrated.len() == 1 { "" } else { "s" },
        from
    ));
    for key in &report.migrated {
        output::list_item(key);
    }
    if report.removed_from_source {
        output::dimmed("source items removed");
    }

    Ok(())
}
