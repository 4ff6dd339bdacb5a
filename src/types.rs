use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Attribute type as encoded by `terraform providers schema -json`.
///
/// Primitives arrive as bare strings (`"string"`), collections as two-element
/// arrays (`["list", "string"]`), objects as `["object", { "k": <type> }]`.
/// Anything else (tuples, `"dynamic"`, malformed input) collapses to `Any`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum TypeExpr {
    String,
    Number,
    Bool,
    List(Box<TypeExpr>),
    Set(Box<TypeExpr>),
    Map(Box<TypeExpr>),
    Object(BTreeMap<String, TypeExpr>),
    Any,
}

impl From<Value> for TypeExpr {
    fn from(value: Value) -> Self {
        TypeExpr::from_json(&value)
    }
}

impl TypeExpr {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => match s.as_str() {
                "string" => TypeExpr::String,
                "number" => TypeExpr::Number,
                "bool" => TypeExpr::Bool,
                _ => TypeExpr::Any,
            },
            Value::Array(parts) if parts.len() == 2 => {
                let inner = &parts[1];
                match parts[0].as_str() {
                    Some("list") => TypeExpr::List(Box::new(TypeExpr::from_json(inner))),
                    Some("set") => TypeExpr::Set(Box::new(TypeExpr::from_json(inner))),
                    Some("map") => TypeExpr::Map(Box::new(TypeExpr::from_json(inner))),
                    Some("object") => match inner.as_object() {
                        Some(fields) => TypeExpr::Object(
                            fields
                                .iter()
                                .map(|(k, v)| (k.clone(), TypeExpr::from_json(v)))
                                .collect(),
                        ),
                        None => TypeExpr::Any,
                    },
                    _ => TypeExpr::Any,
                }
            }
            _ => TypeExpr::Any,
        }
    }

    /// Renders the type in variable-declaration syntax.
    pub fn render(&self) -> String {
        self.render_at(0)
    }

    /// Renders with object field lines indented for a declaration nested
    /// `depth` levels deep, so multi-line objects line up with their field.
    pub fn render_at(&self, depth: usize) -> String {
        match self {
            TypeExpr::String => "string".to_string(),
            TypeExpr::Number => "number".to_string(),
            TypeExpr::Bool => "bool".to_string(),
            TypeExpr::List(inner) => format!("list({})", inner.render_at(depth)),
            TypeExpr::Set(inner) => format!("set({})", inner.render_at(depth)),
            TypeExpr::Map(inner) => format!("map({})", inner.render_at(depth)),
            TypeExpr::Object(fields) => {
                let pad = "  ".repeat(depth);
                let mut out = String::from("object({\n");
                for (name, field_type) in fields {
                    out.push_str(&format!("{}  {} = {}\n", pad, name, field_type.render_at(depth + 1)));
                }
                out.push_str(&pad);
                out.push_str("})");
                out
            }
            TypeExpr::Any => "any".to_string(),
        }
    }
}

/// Renders an optional attribute type; a missing type is `any`.
pub fn render_type(ty: Option<&TypeExpr>, depth: usize) -> String {
    ty.map(|t| t.render_at(depth)).unwrap_or_else(|| TypeExpr::Any.render())
}
