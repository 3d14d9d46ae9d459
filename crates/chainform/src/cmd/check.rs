use std::path::PathBuf;

use anyhow::{Result, bail};
use chainform_spec::{FieldId, SubmittedValues, ValidationResult, validate_submission};
use clap::Args;
use serde_json::Value as JsonValue;
use tracing::info;

use crate::config::Config;

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[arg(value_name = "fields.json")]
    pub fields: PathBuf,
    /// Submitted values keyed by field id
    #[arg(value_name = "submission.json")]
    pub submission: PathBuf,
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

pub fn run(args: &CheckArgs, config: &Config) -> Result<ValidationResult> {
    let fields = super::load_fields(&args.fields)?;
    let raw: JsonValue = super::read_json(&args.submission)?;
    if !raw.is_object() {
        bail!(
            "submission {} must be a JSON object keyed by field id",
            args.submission.display()
        );
    }

    let submitted = SubmittedValues::from_json(&raw);
    let result = validate_submission(&config.mirror(&fields), &submitted);
    info!(
        valid = result.valid,
        hidden = result.hidden.len(),
        errors = result.errors.len(),
        "submission checked"
    );
    Ok(result)
}

pub fn render(result: &ValidationResult) -> String {
    let mut lines = vec![if result.valid {
        "submission is valid".to_string()
    } else {
        "submission is invalid".to_string()
    }];
    if !result.hidden.is_empty() {
        lines.push(format!("hidden: {}", join_ids(&result.hidden)));
    }
    if !result.missing_required.is_empty() {
        lines.push(format!(
            "missing required: {}",
            join_ids(&result.missing_required)
        ));
    }
    for error in &result.errors {
        let code = error.code.as_deref().unwrap_or("invalid");
        lines.push(format!("field {}: {} [{code}]", error.field_id, error.message));
    }
    for key in &result.unknown_fields {
        lines.push(format!("unknown field: {key}"));
    }
    lines.join("\n")
}

fn join_ids(ids: &[FieldId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn emit(result: &ValidationResult, json: bool) -> Result<()> {
    if json {
        return super::print_json(result);
    }
    println!("{}", render(result));
    Ok(())
}
