use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_REGISTRY_HOST: &str = "registry.terraform.io";
const DEFAULT_VERSION: &str = ">= 0";

static PROVIDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+/[a-zA-Z0-9_-]+(:[a-zA-Z0-9.<>=~_, -]+)?$").unwrap());
static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(>=|<=|>|<|!=|~>|=)?\s*\d+(\.\d+){0,2}(\s*,\s*(>=|<=|>|<|!=|~>|=)?\s*\d+(\.\d+){0,2})*\s*$").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub namespace: String,
    pub name: String,
    pub version: String,
}

impl Provider {
    /// Parses `namespace/name[:constraints]`.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidProvider {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if !PROVIDER_RE.is_match(input) {
            return Err(invalid("expected 'namespace/name[:version]'"));
        }

        let (source, version) = match input.split_once(':') {
            Some((source, version)) => (source, Some(version.trim())),
            None => (input, None),
        };
        let (namespace, name) = source
            .split_once('/')
            .ok_or_else(|| invalid("expected 'namespace/name'"))?;

        let version = match version {
            Some(v) if v.is_empty() || !VERSION_RE.is_match(v) => {
                return Err(invalid(&format!("invalid version constraint '{}'", v)));
            }
            Some(v) => v.to_string(),
            None => DEFAULT_VERSION.to_string(),
        };

        Ok(Provider {
            namespace: namespace.trim().to_lowercase(),
            name: name.trim().to_lowercase(),
            version,
        })
    }

    /// `namespace/name`, the key used for deduplication and `source`.
    pub fn source(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// Address used in the schema JSON, e.g. `registry.terraform.io/hashicorp/aws`.
    pub fn schema_key(&self, registry_host: &str) -> String {
        format!("{}/{}/{}", registry_host, self.namespace, self.name)
    }
}

/// Parses all provider arguments, rejecting duplicates.
pub fn parse_providers(inputs: &[String]) -> Result<BTreeMap<String, Provider>> {
    let mut providers = BTreeMap::new();
    for input in inputs {
        let provider = Provider::parse(input)?;
        let key = provider.source();
        if providers.contains_key(&key) {
            return Err(Error::InvalidProvider {
                input: input.clone(),
                reason: format!("duplicate provider {}", key),
            });
        }
        debug!("Parsed provider: {} ({})", key, provider.version);
        providers.insert(key, provider);
    }
    Ok(providers)
}

/// Whether a resource is generated once or as a keyed collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Multiple,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => write!(f, "single"),
            Mode::Multiple => write!(f, "multiple"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub mode: Mode,
    pub provider: Provider,
}

/// Parses `type_name[:single|multiple]` arguments and associates each with
/// the provider whose name prefixes the resource type.
pub fn parse_resources(inputs: &[String], providers: &BTreeMap<String, Provider>) -> Result<Vec<Resource>> {
    let mut resources = Vec::with_capacity(inputs.len());
    let mut single_seen = false;

    for input in inputs {
        let (name, mode) = match input.split_once(':') {
            Some((name, mode)) => (name.trim(), mode.trim()),
            None => (input.trim(), "multiple"),
        };
        let invalid = |reason: String| Error::InvalidResource {
            input: input.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("missing resource type".to_string()));
        }

        let mode = match mode {
            "single" => Mode::Single,
            "multiple" | "collection" => Mode::Multiple,
            other => return Err(invalid(format!("unknown mode '{}', use 'single' or 'multiple'", other))),
        };

        if mode == Mode::Single {
            if single_seen {
                return Err(invalid(
                    "only one resource may use 'single' mode, variable names would conflict".to_string(),
                ));
            }
            single_seen = true;
        }

        let provider = providers
            .values()
            .filter(|p| name.starts_with(&p.name))
            .max_by_key(|p| p.name.len())
            .cloned()
            .ok_or_else(|| invalid("no matching provider".to_string()))?;

        debug!("Parsed resource: {} mode={} provider={}", name, mode, provider.source());
        resources.push(Resource {
            name: name.to_string(),
            mode,
            provider,
        });
    }

    Ok(resources)
}
