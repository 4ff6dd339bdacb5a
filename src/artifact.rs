use std::fs;
use std::path::{Path, PathBuf};

use inflector::string::pluralize::to_plural;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub const MAIN_TF: &str = "main.tf";
pub const VARIABLES_TF: &str = "variables.tf";
pub const VERSIONS_TF: &str = "versions.tf";

/// Name of the aggregate variable for a resource in multiple mode:
/// `aws_instance` becomes `instances`. Names without a provider prefix are
/// used unchanged.
pub fn derive_variable_name(resource: &str) -> String {
    match resource.split_once('_') {
        Some((_, rest)) if !rest.is_empty() => to_plural(rest),
        _ => resource.to_string(),
    }
}

/// Collapses runs of blank lines to one and drops blank lines that sit
/// directly before a closing brace. Applying it twice changes nothing.
pub fn cleanup(content: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if lines.last().map_or(false, |last| last.is_empty()) {
                continue;
            }
            lines.push("");
            continue;
        }
        if trimmed.starts_with('}') {
            while lines.last().map_or(false, |last| last.is_empty()) {
                lines.pop();
            }
        }
        lines.push(line);
    }

    while lines.last().map_or(false, |last| last.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Parses an artifact with the HCL parser. Failures are only reported: the
/// external validator has the final word on generated configuration.
pub fn check_syntax(file_name: &str, content: &str) -> bool {
    match hcl::parse(content) {
        Ok(_) => {
            debug!("{} parses as HCL", file_name);
            true
        }
        Err(e) => {
            warn!("Generated {} does not parse as HCL: {}", file_name, e);
            false
        }
    }
}

pub fn write_artifact(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    info!("Writing {}", path.display());
    fs::write(&path, content).map_err(|source| Error::WriteArtifact {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
