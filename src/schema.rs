use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::TypeExpr;

/// Output of `terraform providers schema -json`, keyed by provider address
/// (`registry.terraform.io/<namespace>/<name>`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSchemas {
    #[serde(default)]
    pub format_version: String,
    #[serde(default)]
    pub provider_schemas: BTreeMap<String, ProviderSchema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSchema {
    #[serde(default)]
    pub resource_schemas: BTreeMap<String, ResourceSchema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceSchema {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub block: Block,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
    #[serde(default, rename = "block_types")]
    pub nested_blocks: BTreeMap<String, NestedBlock>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attribute {
    #[serde(default, rename = "type")]
    pub attribute_type: Option<TypeExpr>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NestedBlock {
    #[serde(default)]
    pub nesting_mode: NestingMode,
    #[serde(default)]
    pub min_items: u64,
    #[serde(default)]
    pub max_items: u64,
    /// Absent in malformed schemas; such blocks are skipped during generation.
    #[serde(default)]
    pub block: Option<Block>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestingMode {
    Single,
    List,
    Set,
    Map,
    Group,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One entry of a block in generation order.
#[derive(Debug, Clone, Copy)]
pub enum BlockItem<'a> {
    Attribute(&'a Attribute),
    Nested(&'a NestedBlock),
}

impl Attribute {
    /// Computed attributes that are neither required nor optional are set by
    /// the provider and cannot appear in configuration.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }
}

impl NestingMode {
    /// Modes with an object, list or set declaration shape. Blocks in any
    /// other mode are left out of both artifacts.
    pub fn is_supported(self) -> bool {
        matches!(self, NestingMode::Single | NestingMode::List | NestingMode::Set)
    }
}

impl NestedBlock {
    /// A block that holds at most one element is declared as a plain object
    /// instead of a collection of objects.
    pub fn is_single_object(&self) -> bool {
        self.nesting_mode == NestingMode::Single || self.max_items == 1
    }

    pub fn is_optional(&self) -> bool {
        self.min_items == 0
    }
}

impl Block {
    /// Attributes and nested blocks merged and sorted by name.
    ///
    /// Both generated artifacts walk a block in this order so that skeleton
    /// references and declarations line up position by position.
    pub fn sorted_items(&self) -> Vec<(&str, BlockItem<'_>)> {
        let mut items: Vec<(&str, BlockItem<'_>)> = self
            .attributes
            .iter()
            .map(|(name, attr)| (name.as_str(), BlockItem::Attribute(attr)))
            .chain(
                self.nested_blocks
                    .iter()
                    .map(|(name, nested)| (name.as_str(), BlockItem::Nested(nested))),
            )
            .collect();
        items.sort_by(|a, b| a.0.cmp(b.0));
        items
    }
}

impl ProviderSchemas {
    pub fn from_json(content: &str) -> Result<Self> {
        let de = &mut serde_json::Deserializer::from_str(content);
        serde_path_to_error::deserialize(de).map_err(|e| Error::SchemaParse {
            path: e.path().to_string(),
            message: e.into_inner().to_string(),
        })
    }

    pub fn resource(&self, provider_key: &str, resource_name: &str) -> Option<&ResourceSchema> {
        self.provider_schemas
            .get(provider_key)?
            .resource_schemas
            .get(resource_name)
    }

    pub fn resource_count(&self) -> usize {
        self.provider_schemas
            .values()
            .map(|p| p.resource_schemas.len())
            .sum()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const AWS: &str = "registry.terraform.io/hashicorp/aws";

    /// Builds a single-provider schema set from `(resource_name, block)` pairs.
    pub(crate) fn schemas_with(resources: Vec<(&str, Block)>) -> ProviderSchemas {
        let resource_schemas = resources
            .into_iter()
            .map(|(name, block)| (name.to_string(), ResourceSchema { version: 0, block }))
            .collect();
        let mut provider_schemas = BTreeMap::new();
        provider_schemas.insert(AWS.to_string(), ProviderSchema { resource_schemas });
        ProviderSchemas {
            format_version: "1.0".to_string(),
            provider_schemas,
        }
    }

    pub(crate) fn attr(ty: TypeExpr, required: bool, optional: bool, computed: bool) -> Attribute {
        Attribute {
            attribute_type: Some(ty),
            required,
            optional,
            computed,
            ..Default::default()
        }
    }

    pub(crate) fn nested(mode: NestingMode, min_items: u64, max_items: u64, block: Block) -> NestedBlock {
        NestedBlock {
            nesting_mode: mode,
            min_items,
            max_items,
            block: Some(block),
        }
    }

    const SAMPLE: &str = r#"{
        "format_version": "1.0",
        "provider_schemas": {
            "registry.terraform.io/hashicorp/aws": {
                "provider": { "version": 0, "block": {} },
                "resource_schemas": {
                    "aws_instance": {
                        "version": 1,
                        "block": {
                            "attributes": {
                                "ami": { "type": "string", "required": true, "description_kind": "plain" },
                                "arn": { "type": "string", "computed": true },
                                "tags": { "type": ["map", "string"], "optional": true }
                            },
                            "block_types": {
                                "root_block_device": {
                                    "nesting_mode": "list",
                                    "max_items": 1,
                                    "block": {
                                        "attributes": {
                                            "volume_size": { "type": "number", "optional": true, "computed": true }
                                        }
                                    }
                                },
                                "timeouts": { "nesting_mode": "single" },
                                "weird": { "nesting_mode": "tuple", "block": {} }
                            }
                        }
                    }
                }
            }
        }
    }"#;

    #[test]
    fn parses_terraform_schema_json() {
        let schemas = ProviderSchemas::from_json(SAMPLE).unwrap();
        let instance = schemas.resource(AWS, "aws_instance").unwrap();
        assert_eq!(instance.version, 1);

        let block = &instance.block;
        assert_eq!(block.attributes["ami"].attribute_type, Some(TypeExpr::String));
        assert!(block.attributes["ami"].required);
        assert!(block.attributes["arn"].is_computed_only());
        assert!(!block.attributes["tags"].is_computed_only());

        let root = &block.nested_blocks["root_block_device"];
        assert_eq!(root.nesting_mode, NestingMode::List);
        assert!(root.is_single_object());
        assert!(root.is_optional());
        assert!(root.block.is_some());

        assert!(block.nested_blocks["timeouts"].block.is_none());
        assert_eq!(block.nested_blocks["weird"].nesting_mode, NestingMode::Unknown);
        assert!(!block.nested_blocks["weird"].nesting_mode.is_supported());
        assert!(root.nesting_mode.is_supported());
    }

    #[test]
    fn sorted_items_interleaves_attributes_and_blocks() {
        let schemas = ProviderSchemas::from_json(SAMPLE).unwrap();
        let block = &schemas.resource(AWS, "aws_instance").unwrap().block;
        let names: Vec<&str> = block.sorted_items().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["ami", "arn", "root_block_device", "tags", "timeouts", "weird"]);
    }

    #[test]
    fn reports_json_path_on_parse_failure() {
        let err = ProviderSchemas::from_json(
            r#"{ "provider_schemas": { "p": { "resource_schemas": { "r": { "block": { "attributes": { "a": { "required": "yes" } } } } } } } }"#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("provider_schemas.p.resource_schemas.r.block.attributes.a.required"), "{}", message);
    }
}
