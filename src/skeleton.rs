use tracing::{debug, warn};

use crate::parsing::Mode;
use crate::schema::{Block, BlockItem};

const INDENT: &str = "  ";

/// Emits the `resource` block for one resource type.
///
/// In single mode every attribute reads `var.<name>`; in multiple mode the
/// resource iterates `var.<plural>` keyed by each element's `name`, and every
/// reference reads from `each.value`.
pub fn render_resource(out: &mut String, resource_name: &str, block: &Block, mode: Mode, variable_name: &str) {
    out.push_str(&format!("resource \"{}\" \"this\" {{\n", resource_name));

    let root = match mode {
        Mode::Single => "var",
        Mode::Multiple => {
            let for_each = format!("{{ for i in coalesce(var.{}, []) : i.name => i }}", variable_name);
            debug!("Added for_each expression: {}", for_each);
            out.push_str(&format!("{}for_each = {}\n", INDENT, for_each));
            "each.value"
        }
    };

    render_items(out, block, root, 1);
    out.push_str("}\n\n");
}

/// Writes attribute references and dynamic blocks of `block`, all rooted at
/// `prefix` (`var`, `each.value`, or `<block>.value` inside a dynamic).
fn render_items(out: &mut String, block: &Block, prefix: &str, depth: usize) {
    let pad = INDENT.repeat(depth);

    for (name, item) in block.sorted_items() {
        match item {
            BlockItem::Attribute(_) => {
                out.push_str(&format!("{}{} = {}.{}\n", pad, name, prefix, name));
                debug!("Added attribute: {} = {}.{}", name, prefix, name);
            }
            BlockItem::Nested(nested) => {
                let Some(inner) = nested.block.as_ref() else {
                    warn!("Skipping invalid nested block {} under {}", name, prefix);
                    continue;
                };
                if !nested.nesting_mode.is_supported() {
                    warn!("Unknown nesting mode {:?} for block {}, skipping", nested.nesting_mode, name);
                    continue;
                }

                let source = format!("{}.{}", prefix, name);
                out.push('\n');
                out.push_str(&format!("{}dynamic \"{}\" {{\n", pad, name));
                out.push_str(&format!(
                    "{}{}for_each = can(coalesce({})) ? flatten([{}]) : []\n",
                    pad, INDENT, source, source
                ));
                out.push_str(&format!("{}{}content {{\n", pad, INDENT));
                render_items(out, inner, &format!("{}.value", name), depth + 2);
                out.push_str(&format!("{}{}}}\n", pad, INDENT));
                out.push_str(&format!("{}}}\n", pad));
                out.push('\n');
                debug!("Added dynamic block for nested block {}", name);
            }
        }
    }
}
