use std::fmt::Write;

use crate::metadata::MetadataObject;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Object(MetadataObject),
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<MetadataObject> for Value {
    fn from(value: MetadataObject) -> Self {
        Value::Object(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&MetadataObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    /// True for null, whitespace-only strings and empty lists.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// True when the value is a list whose elements are all objects.
    pub fn is_object_list(&self) -> bool {
        matches!(self, Value::List(items) if !items.is_empty() && items.iter().all(|v| matches!(v, Value::Object(_))))
    }

    /// Render the value as a node attribute string.
    ///
    /// Non-string scalars carry a literal-type prefix (`{Boolean}true`,
    /// `{Long}5`, `{Double}1.5`); lists render as `[a,b]` with the prefix of
    /// their element type. Null, objects and lists containing objects have no
    /// attribute form.
    pub fn to_attribute(&self) -> Option<String> {
        match self {
            Value::Null | Value::Object(_) => None,
            Value::Bool(b) => Some(format!("{{Boolean}}{b}")),
            Value::Int(n) => Some(format!("{{Long}}{n}")),
            Value::Float(f) => Some(format!("{{Double}}{}", render_float(*f))),
            Value::String(s) => Some(s.clone()),
            Value::List(items) => render_list(items),
        }
    }
}

fn render_float(f: f64) -> String {
    let s = f.to_string();
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{s}.0")
    }
}

fn literal_prefix(items: &[Value]) -> &'static str {
    let Some(first) = items.first() else {
        return "";
    };
    let same = |pred: fn(&Value) -> bool| items.iter().all(pred);
    match first {
        Value::Bool(_) if same(|v| matches!(v, Value::Bool(_))) => "{Boolean}",
        Value::Int(_) if same(|v| matches!(v, Value::Int(_))) => "{Long}",
        Value::Float(_) if same(|v| matches!(v, Value::Float(_))) => "{Double}",
        _ => "",
    }
}

fn render_list(items: &[Value]) -> Option<String> {
    let mut out = String::from(literal_prefix(items));
    out.push('[');
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        match item {
            Value::Null => {}
            Value::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            Value::Int(n) => {
                let _ = write!(out, "{n}");
            }
            Value::Float(f) => out.push_str(&render_float(*f)),
            Value::String(s) => out.push_str(s),
            Value::List(_) | Value::Object(_) => return None,
        }
    }
    out.push(']');
    Some(out)
}

/// Values accepted by the typed `attribute` setters of [`crate::Document`].
pub trait AttributeValue {
    fn to_attribute(&self) -> String;
}

impl AttributeValue for str {
    fn to_attribute(&self) -> String {
        self.to_string()
    }
}

impl AttributeValue for String {
    fn to_attribute(&self) -> String {
        self.clone()
    }
}

impl AttributeValue for bool {
    fn to_attribute(&self) -> String {
        format!("{{Boolean}}{self}")
    }
}

impl AttributeValue for i64 {
    fn to_attribute(&self) -> String {
        format!("{{Long}}{self}")
    }
}

impl AttributeValue for i32 {
    fn to_attribute(&self) -> String {
        format!("{{Long}}{self}")
    }
}

impl AttributeValue for f64 {
    fn to_attribute(&self) -> String {
        format!("{{Double}}{}", render_float(*self))
    }
}

impl AttributeValue for [&str] {
    fn to_attribute(&self) -> String {
        format!("[{}]", self.join(","))
    }
}

impl AttributeValue for [String] {
    fn to_attribute(&self) -> String {
        format!("[{}]", self.join(","))
    }
}

impl AttributeValue for Vec<String> {
    fn to_attribute(&self) -> String {
        self.as_slice().to_attribute()
    }
}

impl<T: AttributeValue + ?Sized> AttributeValue for &T {
    fn to_attribute(&self) -> String {
        (**self).to_attribute()
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributeValue, Value};

    #[test]
    fn scalars_carry_literal_prefixes() {
        assert_eq!(Value::Bool(true).to_attribute().as_deref(), Some("{Boolean}true"));
        assert_eq!(Value::Int(5).to_attribute().as_deref(), Some("{Long}5"));
        assert_eq!(Value::Float(2.0).to_attribute().as_deref(), Some("{Double}2.0"));
        assert_eq!(Value::from("plain").to_attribute().as_deref(), Some("plain"));
        assert_eq!(Value::Null.to_attribute(), None);
    }

    #[test]
    fn lists_render_bracketed() {
        let strings = Value::from(vec!["a", "b"]);
        assert_eq!(strings.to_attribute().as_deref(), Some("[a,b]"));

        let flags = Value::from(vec![true, false]);
        assert_eq!(flags.to_attribute().as_deref(), Some("{Boolean}[true,false]"));

        assert_eq!(Value::List(vec![]).to_attribute().as_deref(), Some("[]"));
    }

    #[test]
    fn typed_overloads_match_value_rendering() {
        assert_eq!(true.to_attribute(), "{Boolean}true");
        assert_eq!(7i64.to_attribute(), "{Long}7");
        assert_eq!(["x", "y"][..].to_attribute(), "[x,y]");
        assert_eq!("text".to_attribute(), "text");
    }

    #[test]
    fn numeric_accessors_widen_integers() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::from("3").as_f64(), None);
        assert_eq!(Value::Int(3).type_name(), "int");
        assert_eq!(Value::List(vec![]).type_name(), "list");
    }
}
