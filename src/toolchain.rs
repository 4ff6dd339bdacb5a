use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::schema::ProviderSchemas;

/// The external operations the repair loop needs.
pub trait Toolchain {
    /// Directory the generated artifacts are written to and validated in.
    fn working_dir(&self) -> &Path;

    /// Raw `validate -json` output.
    fn validate(&self) -> Result<String>;

    fn format(&self) -> Result<()>;
}

/// A Terraform (or OpenTofu) binary operating on one directory.
#[derive(Debug, Clone)]
pub struct Terraform {
    binary: String,
    working_dir: PathBuf,
}

impl Terraform {
    pub fn new(binary: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Terraform {
            binary: binary.into(),
            working_dir: working_dir.into(),
        }
    }

    pub fn ensure_available(&self) -> Result<()> {
        let output = Command::new(&self.binary)
            .arg("version")
            .output()
            .map_err(|e| Error::BinaryNotFound(format!("{}: {}", self.binary, e)))?;
        if !output.status.success() {
            return Err(Error::BinaryNotFound(format!(
                "{}: {}",
                self.binary,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let version = String::from_utf8_lossy(&output.stdout);
        info!("Using {}", version.lines().next().unwrap_or(&self.binary));
        Ok(())
    }

    pub fn init(&self) -> Result<()> {
        info!("Initializing {}", self.working_dir.display());
        let output = self.run(&["init", "-upgrade", "-input=false"])?;
        self.check("init", &output)
    }

    pub fn providers_schema(&self) -> Result<ProviderSchemas> {
        info!("Fetching provider schemas");
        let output = self.run(&["providers", "schema", "-json"])?;
        self.check("providers schema -json", &output)?;
        let schemas = ProviderSchemas::from_json(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            "Schema format {} with {} providers",
            schemas.format_version,
            schemas.provider_schemas.len()
        );
        Ok(schemas)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!("Running {} {}", self.binary, args.join(" "));
        Command::new(&self.binary)
            .current_dir(&self.working_dir)
            .args(args)
            .output()
            .map_err(|e| Error::Toolchain {
                command: format!("{} {}", self.binary, args.join(" ")),
                message: e.to_string(),
            })
    }

    fn check(&self, subcommand: &str, output: &Output) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }
        Err(Error::Toolchain {
            command: format!("{} {}", self.binary, subcommand),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Toolchain for Terraform {
    fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn validate(&self) -> Result<String> {
        let output = self.run(&["validate", "-json"])?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        // An invalid configuration exits non-zero but still prints its diagnostics.
        if stdout.is_empty() {
            return Err(Error::Toolchain {
                command: format!("{} validate -json", self.binary),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(stdout)
    }

    fn format(&self) -> Result<()> {
        info!("Formatting {}", self.working_dir.display());
        let output = self.run(&["fmt"])?;
        self.check("fmt", &output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let terraform = Terraform::new("tfmodgen-no-such-binary", dir.path());
        assert!(matches!(terraform.ensure_available(), Err(Error::BinaryNotFound(_))));
        assert!(matches!(terraform.validate(), Err(Error::Toolchain { .. })));
        assert_eq!(terraform.working_dir(), dir.path());
    }
}
