use tracing::{debug, info};

use crate::diagnostics::{extract_rejections, ValidateOutput};
use crate::error::Result;
use crate::generate::Generator;
use crate::normalize::Rejections;
use crate::schema::ProviderSchemas;
use crate::toolchain::Toolchain;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RepairOutcome {
    /// Rejections from the first validation, removed from the schema.
    pub rejected: Rejections,
    /// Rejections still reported after regeneration.
    pub remaining: Rejections,
}

/// Generates the module, validates it, and when the validator rejects
/// attributes removes them and regenerates once. The second validation is
/// only reported.
pub fn run(toolchain: &dyn Toolchain, schemas: &mut ProviderSchemas, generator: &Generator) -> Result<RepairOutcome> {
    generator.write(schemas, toolchain.working_dir())?;

    let rejected = validate(toolchain)?;
    if rejected.is_empty() {
        info!("No rejected attributes, configuration is complete");
        return Ok(RepairOutcome::default());
    }

    info!("Validator rejected attributes on {} resources, regenerating", rejected.len());
    schemas.remove_rejected(&rejected);
    generator.write(schemas, toolchain.working_dir())?;

    let remaining = validate(toolchain)?;
    Ok(RepairOutcome { rejected, remaining })
}

fn validate(toolchain: &dyn Toolchain) -> Result<Rejections> {
    info!("Validating {}", toolchain.working_dir().display());
    let raw = toolchain.validate()?;
    debug!("Validation output: {}", raw);

    let output = ValidateOutput::from_json(&raw)?;
    info!(
        "Validation result: valid={} errors={} warnings={}",
        output.valid, output.error_count, output.warning_count
    );
    Ok(extract_rejections(&output))
}
