pub mod context;
pub mod create;
pub mod delete;
pub mod export;
pub mod list;
pub mod roles;
pub mod search;
pub mod show;
pub mod update;

use anyhow::Result;
use serde::Serialize;

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
