use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::artifact::{check_syntax, cleanup, derive_variable_name, write_artifact, MAIN_TF, VARIABLES_TF};
use crate::declarations;
use crate::error::Result;
use crate::parsing::Resource;
use crate::schema::ProviderSchemas;
use crate::skeleton;

/// The two coupled artifacts of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedModule {
    pub main_tf: String,
    pub variables_tf: String,
}

/// Walks each requested resource once, emitting its skeleton and its
/// declarations side by side so both artifacts share one traversal order.
pub struct Generator<'a> {
    resources: &'a [Resource],
    registry_host: &'a str,
    desc_as_comments: bool,
}

impl<'a> Generator<'a> {
    pub fn new(resources: &'a [Resource], registry_host: &'a str, desc_as_comments: bool) -> Self {
        Self {
            resources,
            registry_host,
            desc_as_comments,
        }
    }

    pub fn generate(&self, schemas: &ProviderSchemas) -> GeneratedModule {
        let mut main_tf = String::new();
        let mut variables_tf = String::new();

        for resource in self.resources {
            let provider_key = resource.provider.schema_key(self.registry_host);
            if !schemas.provider_schemas.contains_key(&provider_key) {
                warn!("Provider {} not found in schema, skipping {}", provider_key, resource.name);
                continue;
            }
            let Some(schema) = schemas.resource(&provider_key, &resource.name) else {
                warn!("Resource {} not found in provider {}, skipping", resource.name, provider_key);
                continue;
            };

            info!("Generating {} ({} mode, schema version {})", resource.name, resource.mode, schema.version);
            let variable_name = derive_variable_name(&resource.name);
            skeleton::render_resource(&mut main_tf, &resource.name, &schema.block, resource.mode, &variable_name);
            declarations::render_resource(
                &mut variables_tf,
                &schema.block,
                resource.mode,
                &variable_name,
                self.desc_as_comments,
            );
        }

        GeneratedModule {
            main_tf: cleanup(&main_tf),
            variables_tf: cleanup(&variables_tf),
        }
    }

    /// Generates and writes `main.tf` and `variables.tf` into `dir`. Returns
    /// the written paths, or nothing when no resources were requested.
    pub fn write(&self, schemas: &ProviderSchemas, dir: &Path) -> Result<Vec<PathBuf>> {
        if self.resources.is_empty() {
            warn!("No resources requested, nothing to generate");
            return Ok(Vec::new());
        }

        let module = self.generate(schemas);
        check_syntax(MAIN_TF, &module.main_tf);
        check_syntax(VARIABLES_TF, &module.variables_tf);

        Ok(vec![
            write_artifact(dir, MAIN_TF, &module.main_tf)?,
            write_artifact(dir, VARIABLES_TF, &module.variables_tf)?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{parse_providers, parse_resources, DEFAULT_REGISTRY_HOST};
    use crate::schema::tests::{attr, nested, schemas_with};
    use crate::schema::{Block, NestingMode};
    use crate::types::TypeExpr;
    use std::fs;
    use tracing_test::traced_test;

    fn resources(args: &[&str]) -> Vec<Resource> {
        let providers = parse_providers(&["hashicorp/aws".to_string()]).unwrap();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        parse_resources(&args, &providers).unwrap()
    }

    fn instance_block() -> Block {
        let mut root = Block::default();
        root.attributes
            .insert("block_attribute".into(), attr(TypeExpr::Number, false, true, false));

        let mut block = Block::default();
        block.attributes.insert("ami".into(), attr(TypeExpr::String, true, false, false));
        block.attributes.insert(
            "tags".into(),
            attr(TypeExpr::Map(Box::new(TypeExpr::String)), false, true, false),
        );
        block.attributes.insert("arn".into(), attr(TypeExpr::String, false, false, true));
        block
            .nested_blocks
            .insert("root_block".into(), nested(NestingMode::Single, 0, 1, root));
        block
    }

    /// Names referenced at the top level of the resource body, in order.
    fn skeleton_names(main_tf: &str) -> Vec<String> {
        main_tf
            .lines()
            .filter(|l| l.starts_with("  ") && !l.starts_with("   "))
            .filter_map(|l| {
                let l = l.trim();
                if l.starts_with('}') {
                    None
                } else if let Some(rest) = l.strip_prefix("dynamic \"") {
                    rest.split('"').next().map(str::to_string)
                } else {
                    l.split(" = ").next().filter(|n| *n != "for_each").map(str::to_string)
                }
            })
            .collect()
    }

    fn declared_names(variables_tf: &str) -> Vec<String> {
        variables_tf
            .lines()
            .filter_map(|l| l.strip_prefix("variable \""))
            .filter_map(|rest| rest.split('"').next().map(str::to_string))
            .collect()
    }

    #[test]
    fn single_mode_artifacts_line_up() {
        let mut schemas = schemas_with(vec![("aws_instance", instance_block())]);
        schemas.prune_computed_only();
        let resources = resources(&["aws_instance:single"]);

        let module = Generator::new(&resources, DEFAULT_REGISTRY_HOST, false).generate(&schemas);

        assert!(module.main_tf.contains("  ami = var.ami\n"));
        assert!(module.main_tf.contains("  tags = var.tags\n"));
        assert!(!module.main_tf.contains("arn"));
        assert!(!module.variables_tf.contains("arn"));

        let expected = vec!["ami", "root_block", "tags"];
        assert_eq!(skeleton_names(&module.main_tf), expected);
        assert_eq!(declared_names(&module.variables_tf), expected);
    }

    #[test]
    fn multiple_mode_uses_pluralized_collection() {
        let mut schemas = schemas_with(vec![("aws_instance", instance_block())]);
        schemas.prune_computed_only();
        let resources = resources(&["aws_instance"]);

        let module = Generator::new(&resources, DEFAULT_REGISTRY_HOST, false).generate(&schemas);

        assert!(module
            .main_tf
            .contains("  for_each = { for i in coalesce(var.instances, []) : i.name => i }\n"));
        assert!(module.main_tf.contains("  ami = each.value.ami\n"));
        assert!(module.main_tf.contains(
            "    for_each = can(coalesce(each.value.root_block)) ? flatten([each.value.root_block]) : []\n"
        ));
        assert_eq!(declared_names(&module.variables_tf), vec!["instances"]);
        assert!(module.variables_tf.contains("  type = list(object({\n"));
        assert!(hcl::parse(&module.main_tf).is_ok());
        assert!(hcl::parse(&module.variables_tf).is_ok());
    }

    #[test]
    #[traced_test]
    fn missing_resource_schema_is_skipped() {
        let schemas = schemas_with(vec![("aws_instance", instance_block())]);
        let resources = resources(&["aws_instance", "aws_vpc"]);

        let module = Generator::new(&resources, DEFAULT_REGISTRY_HOST, false).generate(&schemas);

        assert!(module.main_tf.contains("resource \"aws_instance\" \"this\""));
        assert!(!module.main_tf.contains("aws_vpc"));
        assert!(logs_contain("Resource aws_vpc not found in provider"));
    }

    #[test]
    #[traced_test]
    fn missing_provider_schema_is_skipped() {
        let schemas = schemas_with(vec![("aws_instance", instance_block())]);
        let resources = resources(&["aws_instance"]);

        let module = Generator::new(&resources, "registry.opentofu.org", false).generate(&schemas);

        assert_eq!(module, GeneratedModule::default());
        assert!(logs_contain("Provider registry.opentofu.org/hashicorp/aws not found in schema"));
    }

    #[test]
    fn writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let schemas = schemas_with(vec![("aws_instance", instance_block())]);
        let resources = resources(&["aws_instance"]);

        let written = Generator::new(&resources, DEFAULT_REGISTRY_HOST, false)
            .write(&schemas, dir.path())
            .unwrap();

        assert_eq!(written, vec![dir.path().join(MAIN_TF), dir.path().join(VARIABLES_TF)]);
        let main_tf = fs::read_to_string(dir.path().join(MAIN_TF)).unwrap();
        assert!(main_tf.starts_with("resource \"aws_instance\" \"this\" {\n"));
    }

    #[test]
    #[traced_test]
    fn no_resources_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let schemas = schemas_with(vec![("aws_instance", instance_block())]);

        let written = Generator::new(&[], DEFAULT_REGISTRY_HOST, false)
            .write(&schemas, dir.path())
            .unwrap();

        assert!(written.is_empty());
        assert!(!dir.path().join(MAIN_TF).exists());
        assert!(logs_contain("No resources requested"));
    }
}
