use tracing::{debug, warn};

use crate::parsing::Mode;
use crate::schema::{Attribute, Block, BlockItem, NestedBlock, NestingMode};
use crate::types::render_type;

const INDENT: &str = "  ";

/// Emits the variable declarations backing one resource's skeleton.
///
/// Multiple mode yields a single `list(object({...}))` variable mirroring the
/// whole block; single mode yields one variable per top-level attribute and
/// nested block, in the same order the skeleton references them.
pub fn render_resource(out: &mut String, block: &Block, mode: Mode, variable_name: &str, desc_as_comments: bool) {
    match mode {
        Mode::Multiple => {
            out.push_str(&format!("variable \"{}\" {{\n", variable_name));
            out.push_str(&format!("{}type = list(object({{\n", INDENT));
            render_fields(out, block, 2, desc_as_comments);
            out.push_str(&format!("{}}}))\n", INDENT));
            out.push_str(&format!("{}default = null\n", INDENT));
            out.push_str("}\n\n");
        }
        Mode::Single => {
            for (name, item) in block.sorted_items() {
                match item {
                    BlockItem::Attribute(attr) => render_attribute_variable(out, name, attr, desc_as_comments),
                    BlockItem::Nested(nested) => render_block_variable(out, name, nested, desc_as_comments),
                }
            }
        }
    }
}

fn render_attribute_variable(out: &mut String, name: &str, attr: &Attribute, desc_as_comments: bool) {
    if desc_as_comments && !attr.description.is_empty() {
        out.push_str(&format!("// {}\n", comment_text(&attr.description)));
    }
    out.push_str(&format!("variable \"{}\" {{\n", name));
    if !attr.description.is_empty() {
        let description = hcl::Expression::from(single_line(&attr.description));
        out.push_str(&format!("{}description = {}\n", INDENT, description));
    }
    out.push_str(&format!("{}type = {}\n", INDENT, render_type(attr.attribute_type.as_ref(), 1)));
    if attr.optional {
        out.push_str(&format!("{}default = null\n", INDENT));
    }
    out.push_str("}\n\n");
    debug!("Added variable {}", name);
}

fn render_block_variable(out: &mut String, name: &str, nested: &NestedBlock, desc_as_comments: bool) {
    let Some(inner) = nested.block.as_ref() else {
        warn!("Skipping invalid nested block {}", name);
        return;
    };
    if !nested.nesting_mode.is_supported() {
        warn!("Unknown nesting mode {:?} for block {}, skipping", nested.nesting_mode, name);
        return;
    }

    let (open, close) = if nested.is_single_object() {
        ("object({", "})")
    } else {
        ("list(object({", "}))")
    };

    if desc_as_comments && !inner.description.is_empty() {
        out.push_str(&format!("// {}\n", comment_text(&inner.description)));
    }
    out.push_str(&format!("variable \"{}\" {{\n", name));
    out.push_str(&format!("{}type = {}\n", INDENT, open));
    render_fields(out, inner, 2, desc_as_comments);
    out.push_str(&format!("{}{}\n", INDENT, close));
    if nested.is_optional() {
        out.push_str(&format!("{}default = null\n", INDENT));
    }
    out.push_str("}\n\n");
    debug!("Added variable {} for nested block", name);
}

/// Writes the fields of an object type mirroring `block`. Every field that
/// is not required is wrapped in `optional(...)`.
fn render_fields(out: &mut String, block: &Block, depth: usize, desc_as_comments: bool) {
    let pad = INDENT.repeat(depth);

    for (name, item) in block.sorted_items() {
        match item {
            BlockItem::Attribute(attr) => {
                if desc_as_comments && !attr.description.is_empty() {
                    out.push_str(&format!("{}// {}\n", pad, comment_text(&attr.description)));
                }
                let ty = render_type(attr.attribute_type.as_ref(), depth);
                if attr.required {
                    out.push_str(&format!("{}{} = {}\n", pad, name, ty));
                } else {
                    out.push_str(&format!("{}{} = optional({})\n", pad, name, ty));
                }
                debug!("Added field {} = {}", name, ty);
            }
            BlockItem::Nested(nested) => {
                let Some(inner) = nested.block.as_ref() else {
                    warn!("Skipping invalid nested block {}", name);
                    continue;
                };
                let (open, close) = match nested.nesting_mode {
                    NestingMode::Single => ("object({", "})"),
                    NestingMode::List => ("list(object({", "}))"),
                    NestingMode::Set => ("set(object({", "}))"),
                    other => {
                        warn!("Unknown nesting mode {:?} for block {}, skipping", other, name);
                        continue;
                    }
                };

                out.push('\n');
                if desc_as_comments && !inner.description.is_empty() {
                    out.push_str(&format!("{}// {}\n", pad, comment_text(&inner.description)));
                }
                if nested.is_optional() {
                    out.push_str(&format!("{}{} = optional({}\n", pad, name, open));
                } else {
                    out.push_str(&format!("{}{} = {}\n", pad, name, open));
                }
                render_fields(out, inner, depth + 1, desc_as_comments);
                let suffix = if nested.is_optional() { ")" } else { "" };
                out.push_str(&format!("{}{}{}\n", pad, close, suffix));
                out.push('\n');
                debug!("Added nested object field {}", name);
            }
        }
    }
}

fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn comment_text(text: &str) -> String {
    single_line(&text.replace('"', "\\\""))
}
