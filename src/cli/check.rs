//! Check command: show the configured store and probe access.

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::query::QueryBuilder;
use crate::error::Result;

/// Show the configured store and whether it is reachable right now.
pub fn execute(ctx: &Context) -> Result<()> {
    let identity = ctx.identity()?;
    let policy = identity.policy();

    output::section("Coffer Store");
    output::kv("config", output::path(&ctx.config_path));
    output::kv("vault", output::path(ctx.vault.path()));
    output::kv("identifier", identity.identifier());
    if let Some(group) = identity.shared_group() {
        output::kv("group", group);
    }
    output::kv("tier", policy.tier_attribute());
    output::kv("service", QueryBuilder::service(&identity));
    match policy.user_presence() {
        Some(up) => output::kv("presence", format!("{} ({:?})", up.control.as_str(), up.mode)),
        None => output::kv("presence", "not required"),
    }

    let target = ctx.target_for(identity)?;
    println!();
    if target.store().can_access() {
        output::success("store is accessible");
    } else {
        output::warn("store is not accessible");
        output::hint("unlock the device, or pick a tier this vault supports");
    }

    Ok(())
}
