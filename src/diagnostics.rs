//! Heuristic extraction of rejected attribute names from `terraform validate -json`.
//!
//! The validator reports free-text diagnostics, so the attribute behind each
//! error is recovered with an ordered chain of patterns. The first pattern
//! that matches wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::normalize::Rejections;

static CONTEXT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"resource\s+"([^"]+)"\s+"([^"]+)""#).unwrap());
static CANNOT_CONFIGURE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"Can't configure a value for "(.*?)""#).unwrap());
static CANNOT_BE_SET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""(.*?)": this field cannot be set"#).unwrap());
static UNKNOWN_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"invalid or unknown key: (\w+)").unwrap());

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ValidateOutput {
    pub valid: bool,
    pub error_count: u64,
    pub warning_count: u64,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Diagnostic {
    pub severity: String,
    pub address: String,
    pub summary: String,
    pub detail: String,
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Snippet {
    pub context: Option<String>,
    pub code: String,
}

impl ValidateOutput {
    pub fn from_json(content: &str) -> Result<Self> {
        let de = &mut serde_json::Deserializer::from_str(content);
        serde_path_to_error::deserialize(de).map_err(|e| Error::DiagnosticsParse {
            path: e.path().to_string(),
            message: e.into_inner().to_string(),
        })
    }
}

impl Diagnostic {
    /// Resource address of the diagnostic, recovered from the snippet context
    /// when the validator left `address` empty.
    fn resource_address(&self) -> Option<String> {
        if !self.address.is_empty() {
            return Some(self.address.clone());
        }
        let context = self.snippet.as_ref()?.context.as_deref()?;
        let caps = CONTEXT_RE.captures(context)?;
        Some(format!("{}.{}", &caps[1], &caps[2]))
    }

    fn rejected_attribute(&self) -> Option<String> {
        if let Some(caps) = CANNOT_CONFIGURE_RE.captures(&self.detail) {
            return Some(caps[1].to_string());
        }
        if let Some(caps) = CANNOT_BE_SET_RE.captures(&self.summary) {
            return Some(caps[1].to_string());
        }
        if let Some(caps) = UNKNOWN_KEY_RE.captures(&self.summary) {
            return Some(caps[1].to_string());
        }

        let code = self.snippet.as_ref()?.code.trim();
        let (left, _) = code.split_once('=')?;
        let name = left.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

/// Maps resource addresses to the attribute names the validator rejected.
///
/// Only error diagnostics count. Names are appended in diagnostic order, so
/// a name may appear more than once for the same address.
pub fn extract_rejections(output: &ValidateOutput) -> Rejections {
    let mut rejections = Rejections::new();

    for diag in output.diagnostics.iter().filter(|d| d.severity == "error") {
        let Some(address) = diag.resource_address() else {
            warn!("Could not determine resource address for diagnostic: {}", diag.summary);
            continue;
        };
        match diag.rejected_attribute() {
            Some(attribute) => {
                debug!("Validator rejected {} on {}", attribute, address);
                rejections.entry(address).or_default().push(attribute);
            }
            None => debug!("No attribute found in diagnostic for {}: {}", address, diag.summary),
        }
    }

    rejections
}
