mod artifact;
mod config;
mod declarations;
mod diagnostics;
mod error;
mod generate;
mod logging;
mod normalize;
mod parsing;
mod repair;
mod schema;
mod skeleton;
mod toolchain;
mod types;
mod versions;

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;
use tracing::{info, warn};

use crate::artifact::{write_artifact, VERSIONS_TF};
use crate::config::ToolConfig;
use crate::error::Error;
use crate::generate::Generator;
use crate::parsing::{parse_providers, parse_resources};
use crate::schema::ProviderSchemas;
use crate::toolchain::{Terraform, Toolchain};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to tool config file (default: ./tfmodgen.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate main.tf, variables.tf and versions.tf for a set of resources
    Generate(GenerateArgs),
    /// Print a shell completion script to stdout
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Resource type, optionally with mode: aws_instance[:single|multiple]
    #[arg(short = 'r', long = "resource", required = true)]
    resources: Vec<String>,
    /// Provider source, optionally with version: hashicorp/aws[:>=5.0]
    #[arg(short = 'p', long = "provider", required = true)]
    providers: Vec<String>,
    /// Output directory
    #[arg(short = 'd', long)]
    directory: Option<PathBuf>,
    /// Terraform or OpenTofu binary
    #[arg(short = 'b', long)]
    binary: Option<String>,
    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'l', long)]
    log_level: Option<String>,
    /// Render attribute descriptions as comments in variables.tf
    #[arg(long)]
    desc_as_comment: bool,
    /// Read provider schemas from this file instead of `providers schema -json`
    #[arg(long)]
    schema_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let tool_config = ToolConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate(args) => run_generate(args, tool_config),
        Commands::Completion { shell } => {
            write_completion(shell, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn run_generate(args: GenerateArgs, tool_config: ToolConfig) -> Result<()> {
    let level = logging::parse_level(args.log_level.as_deref().unwrap_or(&tool_config.log_level))?;
    logging::init(level);
    eprintln!(
        "tfmodgen v{} (built {}, commit {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_DATE"),
        env!("GIT_COMMIT")
    );
    let start = Instant::now();

    let providers = parse_providers(&args.providers)?;
    let resources = parse_resources(&args.resources, &providers)?;
    let directory = args.directory.unwrap_or(tool_config.directory);
    let binary = args.binary.unwrap_or(tool_config.binary);
    let desc_as_comment = args.desc_as_comment || tool_config.desc_as_comment;

    fs::create_dir_all(&directory).map_err(|source| Error::CreateDir {
        path: directory.clone(),
        source,
    })?;

    let terraform = Terraform::new(binary, &directory);
    terraform.ensure_available()?;

    write_artifact(&directory, VERSIONS_TF, &versions::render(&providers)?)?;
    terraform.init()?;

    let schemas = match &args.schema_file {
        Some(path) => {
            info!("Reading provider schemas from {}", path.display());
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read schema file {}", path.display()))?;
            ProviderSchemas::from_json(&content)?
        }
        None => terraform.providers_schema()?,
    };

    let mut schemas = schemas.filter_resources(&resources);
    schemas.prune_computed_only();

    let generator = Generator::new(&resources, &tool_config.registry_host, desc_as_comment);
    let outcome = repair::run(&terraform, &mut schemas, &generator)?;

    for (address, attributes) in &outcome.remaining {
        for attribute in attributes {
            warn!("Validation still rejects {} on {}", attribute, address);
        }
    }

    terraform.format()?;
    info!(
        "Generated module in {} ({:.2?})",
        directory.display(),
        start.elapsed()
    );
    Ok(())
}

/// Writes the completion script for `shell` to `out`.
fn write_completion(shell: CompletionShell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin_name, out);
}
