use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use chainform_spec::{FieldId, FieldSet};
use clap::Args;
use serde::Serialize;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct LintArgs {
    /// Field configuration (a list of fields or `{ "user_fields": [...] }`)
    #[arg(value_name = "fields.json")]
    pub fields: PathBuf,
    /// Fail when any warning is reported
    #[arg(long = "strict")]
    pub strict: bool,
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LintWarning {
    UnresolvedTarget { parent_id: FieldId, target_id: FieldId },
    SelfTarget { field_id: FieldId },
    LiteralNullToken { field_id: FieldId },
    InertRules { field_id: FieldId },
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedTarget {
                parent_id,
                target_id,
            } => write!(f, "field {parent_id} targets unknown field {target_id}"),
            Self::SelfTarget { field_id } => write!(f, "field {field_id} targets itself"),
            Self::LiteralNullToken { field_id } => write!(
                f,
                "field {field_id} shows on \"null\", which also matches an empty value"
            ),
            Self::InertRules { field_id } => write!(
                f,
                "field {field_id} has rules but no custom validation; they are never evaluated"
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    pub fields: usize,
    pub parents: usize,
    pub warnings: Vec<LintWarning>,
}

pub fn run(args: &LintArgs) -> Result<LintReport> {
    let fields = super::load_fields(&args.fields)?;
    let report = LintReport {
        fields: fields.len(),
        parents: fields.custom_validation_fields().count(),
        warnings: lint(&fields),
    };
    info!(
        fields = report.fields,
        warnings = report.warnings.len(),
        "lint finished"
    );
    Ok(report)
}

pub fn lint(fields: &FieldSet) -> Vec<LintWarning> {
    let mut warnings = fields
        .unresolved_references()
        .into_iter()
        .map(|reference| LintWarning::UnresolvedTarget {
            parent_id: reference.parent_id,
            target_id: reference.target_id,
        })
        .collect::<Vec<_>>();

    for field in fields.iter() {
        let targets = field.candidate_targets();
        if targets.is_empty() {
            continue;
        }
        if targets.contains(&field.id) {
            warnings.push(LintWarning::SelfTarget { field_id: field.id });
        }
        if field
            .rules
            .show_value_sets()
            .iter()
            .any(|values| values.contains_null_token())
        {
            warnings.push(LintWarning::LiteralNullToken { field_id: field.id });
        }
        if !field.has_custom_validation {
            warnings.push(LintWarning::InertRules { field_id: field.id });
        }
    }
    warnings
}

pub fn emit(report: &LintReport, json: bool) -> Result<()> {
    if json {
        return super::print_json(report);
    }
    println!(
        "{} field(s), {} with conditional rules",
        report.fields, report.parents
    );
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}
