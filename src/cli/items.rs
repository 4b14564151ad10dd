//! Item commands (set, get, rm, list, contains, clear).

use dialoguer::Confirm;
use tracing::info;

use crate::cli::context::Context;
use crate::cli::output;
use crate::error::{Result, StoreError};

fn read_prompt(key: &str) -> String {
    format!("Allow access to '{}'?", key)
}

fn write_prompt(key: &str) -> String {
    format!("Allow saving '{}'?", key)
}

/// Store a value.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    info!(key = %key, "setting item");
    let target = ctx.target()?;
    target.set(key, value.as_bytes(), &write_prompt(key))?;
    output::success(&format!("set {}", output::key(key)));
    Ok(())
}

/// Print a stored value.
pub fn get(ctx: &Context, key: &str, prompt: Option<&str>) -> Result<()> {
    let target = ctx.target()?;
    let prompt = prompt.map(str::to_string).unwrap_or_else(|| read_prompt(key));
    let value = target
        .get(key, &prompt)?
        .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

    // Plain output for scripting - no decoration
    match String::from_utf8(value) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            use std::io::Write;
            std::io::stdout().write_all(e.as_bytes())?;
        }
    }
    Ok(())
}

/// Remove a value.
pub fn rm(ctx: &Context, key: &str) -> Result<()> {
    info!(key = %key, "removing item");
    ctx.target()?.store().remove(key)?;
    output::success(&format!("removed {}", output::key(key)));
    Ok(())
}

/// List stored keys.
pub fn list(ctx: &Context, json: bool) -> Result<()> {
    let keys = ctx.target()?.enumerate_keys()?;

    if json {
        let result = serde_json::json!({
            "keys": keys,
            "count": keys.len()
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if keys.is_empty() {
        output::dimmed("no items stored");
    } else {
        output::section(&format!("{} items", keys.len()));
        for key in &keys {
            output::list_item(key);
        }
    }

    Ok(())
}

/// Print `true` or `false`.
pub fn contains(ctx: &Context, key: &str) -> Result<()> {
    let present = ctx.target()?.store().contains(key)?;
    println!("{}", present);
    Ok(())
}

/// Remove every item in the store.
pub fn clear(ctx: &Context, yes: bool) -> Result<()> {
    let target = ctx.target()?;
    let identity = target.store().identity().clone();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove every item in {}?", identity.identifier()))
            .default(false)
            .interact_opt()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?
            .unwrap_or(false);
        if !confirmed {
            output::warn("nothing removed");
            return Ok(());
        }
    }

    info!(identifier = %identity.identifier(), "clearing store");
    target.store().remove_all()?;
    output::success(&format!("cleared {}", identity.identifier()));
    Ok(())
}
