//! Narrowing of a fetched schema set down to what the generators may emit.
//!
//! All passes mutate or consume the schema tree owned by the current run;
//! nothing is ever added back.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::parsing::Resource;
use crate::schema::{Block, ProviderSchemas};

/// Rejected attribute names keyed by the validator's resource address.
pub type Rejections = BTreeMap<String, Vec<String>>;

impl ProviderSchemas {
    /// Keeps only the requested resource types, dropping providers that end
    /// up with no resources.
    pub fn filter_resources(mut self, requested: &[Resource]) -> Self {
        info!("Filtering provider schemas for {} requested resources", requested.len());
        let wanted: BTreeSet<&str> = requested.iter().map(|r| r.name.as_str()).collect();

        for (provider_key, provider) in self.provider_schemas.iter_mut() {
            provider.resource_schemas.retain(|name, _| {
                let keep = wanted.contains(name.as_str());
                if keep {
                    debug!("Included resource {} from {}", name, provider_key);
                }
                keep
            });
        }
        self.provider_schemas
            .retain(|_, provider| !provider.resource_schemas.is_empty());

        info!(
            "Kept {} resources across {} providers",
            self.resource_count(),
            self.provider_schemas.len()
        );
        self
    }

    /// Deletes computed-only attributes at every nesting depth.
    pub fn prune_computed_only(&mut self) {
        let mut removed = 0;
        for provider in self.provider_schemas.values_mut() {
            for (resource_name, resource) in provider.resource_schemas.iter_mut() {
                removed += prune_block(&mut resource.block, resource_name);
            }
        }
        info!("Removed {} computed-only attributes", removed);
    }

    /// Deletes attributes the validator refused.
    ///
    /// A resource matches every rejection key addressing its type, since
    /// validator addresses carry the resource label and instance key
    /// (`aws_instance.this["web"]`) while schema keys do not.
    pub fn remove_rejected(&mut self, rejections: &Rejections) {
        info!("Removing rejected attributes from the schema");

        for (provider_key, provider) in self.provider_schemas.iter_mut() {
            for (resource_name, resource) in provider.resource_schemas.iter_mut() {
                let mut rejected: Vec<&str> = Vec::new();
                for (address, names) in rejections {
                    if addresses_resource(address, resource_name) {
                        for name in names {
                            if !rejected.contains(&name.as_str()) {
                                rejected.push(name.as_str());
                            }
                        }
                    }
                }

                if rejected.is_empty() {
                    debug!("No rejected attributes for {} ({})", resource_name, provider_key);
                    continue;
                }

                for name in rejected {
                    if resource.block.attributes.remove(name).is_some() {
                        info!("Removed rejected attribute {} from {}", name, resource_name);
                    } else {
                        warn!("Attribute {} not found in resource {}, cannot remove", name, resource_name);
                    }
                }
            }
        }
    }
}

/// `aws_lb.this` addresses `aws_lb`; `aws_lb_listener.this` does not.
fn addresses_resource(address: &str, resource_name: &str) -> bool {
    address
        .strip_prefix(resource_name)
        .map_or(false, |rest| rest.is_empty() || rest.starts_with('.'))
}

fn prune_block(block: &mut Block, path: &str) -> usize {
    let before = block.attributes.len();
    block.attributes.retain(|name, attr| {
        let computed_only = attr.is_computed_only();
        if computed_only {
            debug!("Removed computed-only attribute {}.{}", path, name);
        }
        !computed_only
    });
    let mut removed = before - block.attributes.len();

    for (name, nested) in block.nested_blocks.iter_mut() {
        if let Some(inner) = nested.block.as_mut() {
            removed += prune_block(inner, &format!("{}.{}", path, name));
        }
    }
    removed
}
