//! Metadata objects and the kinds (shapes) they conform to.
//!
//! A [`MetadataKind`] plays the role of an annotation type: it declares the
//! properties an object of that kind may carry, their defaults and the
//! rendering directives that steer the property mapper. A [`MetadataObject`]
//! is one instance attached to a class or a member.

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(String);

impl KindId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for KindId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KindId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for KindId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for KindId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for KindId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Rendering pass a property applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    #[default]
    Dialog,
    DesignDialog,
}

impl Scope {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dialog" => Some(Scope::Dialog),
            "design-dialog" | "design_dialog" => Some(Scope::DesignDialog),
            _ => None,
        }
    }
}

/// One declared property of a metadata kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub name: String,
    pub default: Option<Value>,
    /// Attribute name used instead of the (prefixed) property name.
    pub rename: Option<String>,
    pub ignore_default: bool,
    pub skip_prefix: bool,
    pub allow_blank: bool,
    pub mappable: bool,
    /// Passes the property is rendered in. Empty means every pass.
    pub scopes: Vec<Scope>,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            rename: None,
            ignore_default: false,
            skip_prefix: false,
            allow_blank: false,
            mappable: true,
            scopes: Vec::new(),
        }
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Declares a default and drops the property from output when it equals it.
    pub fn sparse(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.ignore_default = true;
        self
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    pub fn ignore_default(mut self) -> Self {
        self.ignore_default = true;
        self
    }

    pub fn skip_prefix(mut self) -> Self {
        self.skip_prefix = true;
        self
    }

    pub fn allow_blank(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    pub fn unmapped(mut self) -> Self {
        self.mappable = false;
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        if !self.scopes.contains(&scope) {
            self.scopes.push(scope);
        }
        self
    }

    pub fn applies_in(&self, scope: Scope) -> bool {
        self.scopes.is_empty() || self.scopes.contains(&scope)
    }
}

/// Prefix and eligibility rules for generic property mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyMapping {
    /// `path/to/node/namePrefix`: everything before the last `/` is a node
    /// path under the target, the remainder prefixes attribute names.
    pub prefix: String,
    /// When non-empty, only these properties are mapped.
    pub mappings: Vec<String>,
    pub excluded: Vec<String>,
}

impl PropertyMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mappings = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn except<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn admits(&self, name: &str) -> bool {
        if !self.mappings.is_empty() && !self.mappings.iter().any(|m| m == name) {
            return false;
        }
        !self.excluded.iter().any(|e| e == name)
    }
}

/// The shape a metadata object conforms to.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataKind {
    pub id: KindId,
    pub resource_type: Option<String>,
    /// Kinds with a mapping take part in generic property mapping.
    pub mapping: Option<PropertyMapping>,
    pub properties: Vec<PropertySpec>,
    /// Marks a kind as a widget supplied outside the registry's handler table.
    pub custom_widget: bool,
    /// Whether members rendered with this kind as their widget get a `name`.
    pub renders_name: bool,
}

impl MetadataKind {
    pub fn new(id: impl Into<KindId>) -> Self {
        Self {
            id: id.into(),
            resource_type: None,
            mapping: None,
            properties: Vec::new(),
            custom_widget: false,
            renders_name: true,
        }
    }

    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn mapped(mut self, mapping: PropertyMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn property(mut self, spec: PropertySpec) -> Self {
        self.properties.push(spec);
        self
    }

    pub fn custom_widget(mut self) -> Self {
        self.custom_widget = true;
        self
    }

    pub fn unnamed(mut self) -> Self {
        self.renders_name = false;
        self
    }

    pub fn spec(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.spec(name).is_some()
    }

    /// Value of `name` on `object`, falling back to the declared default.
    pub fn value_of<'a>(&'a self, object: &'a MetadataObject, name: &str) -> Option<&'a Value> {
        object
            .get(name)
            .or_else(|| self.spec(name).and_then(|spec| spec.default.as_ref()))
    }
}

/// A bag of named values attached to a class or member.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataObject {
    kind: KindId,
    values: IndexMap<String, Value>,
}

impl MetadataObject {
    pub fn new(kind: impl Into<KindId>) -> Self {
        Self {
            kind: kind.into(),
            values: IndexMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn kind(&self) -> &KindId {
        &self.kind
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == *kind
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn get_list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` onto this object: values present in `other` win.
    pub fn overlay(&self, other: &MetadataObject) -> MetadataObject {
        let mut merged = self.clone();
        for (key, value) in &other.values {
            merged.values.insert(key.clone(), value.clone());
        }
        merged
    }
}
