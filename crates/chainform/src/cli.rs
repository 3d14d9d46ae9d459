use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{ArgAction, Parser, Subcommand};

use crate::cmd::{
    self, check::CheckArgs, lint::LintArgs, replay::ReplayArgs, schema::SchemaArgs,
};
use crate::config::Config;
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "chainform",
    about = "Conditional signup-field chains: lint, check and replay",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Config file (defaults to ./chainform.toml when present)
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Only a real null matches the "null" show value
    #[arg(long = "strict-null", global = true)]
    strict_null: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a field configuration and report suspicious rules
    Lint(LintArgs),
    /// Validate a submission against a field configuration
    Check(CheckArgs),
    /// Drive the cascade controller with a scripted session
    Replay(ReplayArgs),
    /// Print the JSON schema of an input document
    Schema(SchemaArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load(cli.config.as_deref())?.with_strict_null(cli.strict_null);
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Lint(args) => {
            let report = cmd::lint::run(&args)?;
            cmd::lint::emit(&report, args.json)?;
            if args.strict && !report.warnings.is_empty() {
                bail!(
                    "lint: {} warning(s) treated as errors (--strict)",
                    report.warnings.len()
                );
            }
            Ok(())
        }
        Commands::Check(args) => {
            let result = cmd::check::run(&args, &config)?;
            cmd::check::emit(&result, args.json)?;
            if !result.valid {
                bail!("submission rejected");
            }
            Ok(())
        }
        Commands::Replay(args) => {
            let report = cmd::replay::run(&args, &config)?;
            cmd::replay::emit(&report, args.json)
        }
        Commands::Schema(args) => cmd::schema::run(&args),
    }
}
