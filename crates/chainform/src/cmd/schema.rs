use anyhow::Result;
use clap::{Args, ValueEnum};

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    #[arg(value_enum)]
    pub kind: SchemaKind,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// Stored field configuration document
    Fields,
    /// Submitted signup values
    Submission,
}

pub fn run(args: &SchemaArgs) -> Result<()> {
    let schema = match args.kind {
        SchemaKind::Fields => chainform_spec::field_config_schema(),
        SchemaKind::Submission => chainform_spec::submission_schema(),
    };
    super::print_json(&schema)
}
