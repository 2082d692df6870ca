//! Display typing for interpreter variables.
//!
//! The engine reports bare JSON values, so the CFPL type shown next to each variable is
//! inferred from the value's shape rather than taken from its declaration.

use std::fmt;

use serde_json::Value;

use crate::engine::VariableSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeLabel {
    Int,
    Float,
    Char,
    String,
    Bool,
    Unknown,
}

impl TypeLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeLabel::Int => "INT",
            TypeLabel::Float => "FLOAT",
            TypeLabel::Char => "CHAR",
            TypeLabel::String => "STRING",
            TypeLabel::Bool => "BOOL",
            TypeLabel::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    pub name: String,
    pub type_label: TypeLabel,
    pub value: String,
}

pub fn classify(value: &Value) -> TypeLabel {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => TypeLabel::Int,
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 => TypeLabel::Int,
            Some(_) => TypeLabel::Float,
            None => TypeLabel::Unknown,
        },
        // One Unicode scalar, not one byte.
        Value::String(s) if s.chars().count() == 1 => TypeLabel::Char,
        Value::String(_) => TypeLabel::String,
        Value::Bool(_) => TypeLabel::Bool,
        _ => TypeLabel::Unknown,
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => format_float(f),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Plain decimal inside [1e-6, 1e21), exponent form with an explicit sign
/// outside it (`1e+21`, `1e-7`). Display already drops a zero fraction.
fn format_float(f: f64) -> String {
    let magnitude = f.abs();
    if f == 0.0 || (1e-6..1e21).contains(&magnitude) {
        return f.to_string();
    }
    let exp = format!("{f:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

pub fn display_entries(snapshot: &VariableSnapshot) -> Vec<DisplayEntry> {
    snapshot
        .iter()
        .map(|(name, value)| DisplayEntry {
            name: name.clone(),
            type_label: classify(value),
            value: format_value(value),
        })
        .collect()
}
