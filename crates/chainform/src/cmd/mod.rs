pub mod check;
pub mod lint;
pub mod replay;
pub mod schema;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chainform_spec::FieldSet;
use serde::de::DeserializeOwned;

pub(crate) fn load_fields(path: &Path) -> Result<FieldSet> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read field configuration {}", path.display()))?;
    FieldSet::from_json_str(&raw)
        .with_context(|| format!("invalid field configuration {}", path.display()))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
