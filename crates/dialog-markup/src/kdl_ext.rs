//! Read helpers over `kdl` nodes shared by the config and descriptor loaders.

use kdl::{KdlNode, KdlValue};

use crate::error::DescriptorError;
use crate::value::Value;

pub(crate) trait KdlNodeExt {
    fn name_str(&self) -> &str;
    fn args(&self) -> Vec<&KdlValue>;
    fn arg(&self, index: usize) -> Option<&KdlValue>;
    fn attr(&self, key: &str) -> Option<&KdlValue>;
    fn attrs(&self) -> Vec<(&str, &KdlValue)>;
    fn child_nodes(&self) -> Vec<&KdlNode>;

    fn string_arg(&self, index: usize) -> Option<&str> {
        self.arg(index).and_then(KdlValue::as_string)
    }

    fn string_attr(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(KdlValue::as_string)
    }

    fn bool_attr(&self, key: &str) -> Option<bool> {
        self.attr(key).and_then(KdlValue::as_bool)
    }

    /// First positional argument as a string, or an error naming the node.
    fn required_string_arg(&self) -> Result<&str, DescriptorError> {
        self.string_arg(0).ok_or_else(|| {
            DescriptorError::invalid(self.name_str(), "expected a string argument")
        })
    }
}

impl KdlNodeExt for KdlNode {
    fn name_str(&self) -> &str {
        self.name().value()
    }

    fn args(&self) -> Vec<&KdlValue> {
        self.entries()
            .iter()
            .filter(|entry| entry.name().is_none())
            .map(|entry| entry.value())
            .collect()
    }

    fn arg(&self, index: usize) -> Option<&KdlValue> {
        self.entries()
            .iter()
            .filter(|entry| entry.name().is_none())
            .nth(index)
            .map(|entry| entry.value())
    }

    fn attr(&self, key: &str) -> Option<&KdlValue> {
        self.entries()
            .iter()
            .rev()
            .find(|entry| entry.name().is_some_and(|name| name.value() == key))
            .map(|entry| entry.value())
    }

    fn attrs(&self) -> Vec<(&str, &KdlValue)> {
        self.entries()
            .iter()
            .filter_map(|entry| entry.name().map(|name| (name.value(), entry.value())))
            .collect()
    }

    fn child_nodes(&self) -> Vec<&KdlNode> {
        self.iter_children().collect()
    }
}

pub(crate) fn kdl_value_to_value(value: &KdlValue) -> Value {
    match value {
        KdlValue::String(s) => Value::String(s.clone()),
        KdlValue::Integer(i) => match i64::try_from(*i) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Float(*i as f64),
        },
        KdlValue::Float(f) => Value::Float(*f),
        KdlValue::Bool(b) => Value::Bool(*b),
        KdlValue::Null => Value::Null,
    }
}

pub(crate) fn kdl_integer(value: &KdlValue) -> Option<i64> {
    value.as_integer().and_then(|i| i64::try_from(i).ok())
}
