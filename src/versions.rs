use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Result;
use crate::parsing::Provider;

/// Builds the `terraform { required_providers { ... } }` block pinning every
/// requested provider to its source and version constraint.
pub fn render(providers: &BTreeMap<String, Provider>) -> Result<String> {
    let mut rp_builder = hcl::Block::builder("required_providers");
    for provider in providers.values() {
        let mut p_map = hcl::Map::new();
        p_map.insert("source".to_string(), hcl::Value::from(provider.source()));
        p_map.insert("version".to_string(), hcl::Value::from(provider.version.clone()));
        rp_builder = rp_builder.add_attribute((provider.name.as_str(), hcl::Value::from(p_map)));
        debug!("Pinned provider {} to {}", provider.source(), provider.version);
    }

    let tf_block = hcl::Block::builder("terraform")
        .add_block(rp_builder.build())
        .build();
    let body = hcl::Body::builder().add_block(tf_block).build();
    Ok(hcl::to_string(&body)?)
}
