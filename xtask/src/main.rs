use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::Command;
use std::env;

const BINARY: &str = "tfmodgen";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for tfmodgen", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build release binary and install to /usr/local/bin (requires sudo)
    Install {
        /// Install directory
        #[arg(long, default_value = "/usr/local/bin")]
        prefix: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Install { prefix } => {
            install(&prefix)?;
        }
    }

    Ok(())
}

fn install(prefix: &str) -> Result<()> {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").context("CARGO_MANIFEST_DIR not set")?;
    let workspace_root = std::path::Path::new(&manifest_dir).parent().context("Failed to find workspace root")?;

    std::env::set_current_dir(workspace_root).context("Failed to change directory to workspace root")?;

    let cargo = env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());

    println!("Building release binary...");
    let status = Command::new(&cargo)
        .arg("build")
        .arg("--release")
        .arg("--bin")
        .arg(BINARY)
        .status()
        .context("Failed to run cargo build")?;

    if !status.success() {
        anyhow::bail!("Cargo build failed");
    }

    let binary = std::path::Path::new("target/release").join(BINARY);
    if !binary.exists() {
        anyhow::bail!("{} was not produced by the release build", binary.display());
    }

    println!("Installing {} to {} (sudo required)...", BINARY, prefix);
    let status = Command::new("sudo")
        .arg("install")
        .arg("-m")
        .arg("755")
        .arg(&binary)
        .arg(prefix)
        .status()
        .context("Failed to run sudo install")?;

    if !status.success() {
        anyhow::bail!("Installation failed");
    }

    println!("Successfully installed {} to {}", BINARY, prefix);
    Ok(())
}
