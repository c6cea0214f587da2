//! KDL descriptor files: metadata kinds and annotated classes without Rust
//! code.
//!
//! ```kdl
//! kind "hero-image" resource-type="acme/components/image" widget=#true prefix="./image/" {
//!     property "fileReference" skip-prefix=#true
//!     property "alt" default="" sparse=#true
//! }
//!
//! class "Hero" extends="Base" {
//!     meta "dialog" title="Hero"
//!     member "title" {
//!         meta "text-field" emptyText="Title"
//!         meta "place" "Main"
//!     }
//!     nested "Hero.Main" {
//!         meta "tab" title="Main"
//!     }
//! }
//! ```
//!
//! Inside a `meta` node, properties become values; a child with arguments is
//! a scalar list, a child with children is a list of objects whose kinds are
//! the grandchild names, and a child annotated `(object)` is a single nested
//! object whose kind is its first argument.

use kdl::{KdlDocument, KdlNode};

use crate::error::{DescriptorError, suggest_similar};
use crate::kdl_ext::{KdlNodeExt, kdl_value_to_value};
use crate::metadata::{MetadataKind, MetadataObject, PropertyMapping, PropertySpec, Scope};
use crate::registry::Registry;
use crate::source::{ClassCatalog, ClassDescriptor, MemberDescriptor};
use crate::value::Value;
use crate::widgets::PlainWidget;

const TOP_LEVEL: &[&str] = &["kind", "class", "assembly"];
const KIND_CHILDREN: &[&str] = &["property", "allow", "deny"];
const CLASS_CHILDREN: &[&str] = &["meta", "member", "nested"];

/// A descriptor kind and whether it renders as a widget.
#[derive(Debug, Clone)]
pub struct KindDescriptor {
    pub kind: MetadataKind,
    pub widget: bool,
}

/// Everything declared by one descriptor document.
#[derive(Debug, Clone, Default)]
pub struct Descriptors {
    pub kinds: Vec<KindDescriptor>,
    pub classes: Vec<ClassDescriptor>,
}

impl Descriptors {
    /// Register the declared kinds and classes. Widget kinds get a handler
    /// that leaves rendering to generic property mapping.
    pub fn install(self, registry: &mut Registry, catalog: &mut ClassCatalog) {
        for KindDescriptor { kind, widget } in self.kinds {
            if widget {
                registry.register_widget(kind, PlainWidget);
            } else {
                registry.register_kind(kind);
            }
        }
        for class in self.classes {
            catalog.insert(class);
        }
    }
}

/// Parse a descriptor document. An `assembly` node is left to
/// [`AssemblyConfig::from_kdl`](crate::AssemblyConfig::from_kdl).
pub fn load_descriptors(text: &str) -> Result<Descriptors, DescriptorError> {
    let document: KdlDocument = text.parse()?;
    let mut descriptors = Descriptors::default();

    for node in document.nodes() {
        match node.name_str() {
            "kind" => descriptors.kinds.push(parse_kind(node)?),
            "class" => descriptors.classes.push(parse_class(node)?),
            "assembly" => {}
            other => return Err(unexpected(other, "top level", TOP_LEVEL)),
        }
    }

    tracing::debug!(
        kinds = descriptors.kinds.len(),
        classes = descriptors.classes.len(),
        "loaded descriptors"
    );
    Ok(descriptors)
}

fn unexpected(name: &str, context: &str, expected: &[&str]) -> DescriptorError {
    let hint = match suggest_similar(name, expected) {
        Some(suggestion) => format!("; did you mean '{suggestion}'?"),
        None => format!("; expected one of: {}", expected.join(", ")),
    };
    DescriptorError::invalid(name, format!("unexpected node at {context}{hint}"))
}

fn parse_kind(node: &KdlNode) -> Result<KindDescriptor, DescriptorError> {
    let id = node.required_string_arg()?;
    let mut kind = MetadataKind::new(id);
    let mut mapping = node.string_attr("prefix").map(PropertyMapping::prefixed);
    if mapping.is_none() && node.bool_attr("mapped").unwrap_or(false) {
        mapping = Some(PropertyMapping::new());
    }

    if let Some(resource_type) = node.string_attr("resource-type") {
        kind = kind.resource_type(resource_type);
    }
    if node.bool_attr("unnamed").unwrap_or(false) {
        kind = kind.unnamed();
    }
    if node.bool_attr("custom-widget").unwrap_or(false) {
        kind = kind.custom_widget();
    }

    for child in node.child_nodes() {
        match child.name_str() {
            "property" => kind = kind.property(parse_property(child)?),
            "allow" => {
                let names = string_args(child)?;
                mapping = Some(mapping.unwrap_or_default().only(names));
            }
            "deny" => {
                let names = string_args(child)?;
                mapping = Some(mapping.unwrap_or_default().except(names));
            }
            other => return Err(unexpected(other, &format!("kind '{id}'"), KIND_CHILDREN)),
        }
    }

    if let Some(mapping) = mapping {
        kind = kind.mapped(mapping);
    }
    Ok(KindDescriptor {
        kind,
        widget: node.bool_attr("widget").unwrap_or(false),
    })
}

fn parse_property(node: &KdlNode) -> Result<PropertySpec, DescriptorError> {
    let mut spec = PropertySpec::new(node.required_string_arg()?);

    if let Some(default) = node.attr("default") {
        spec = spec.default_value(kdl_value_to_value(default));
    }
    if let Some(sparse) = node.attr("sparse") {
        spec = match sparse.as_bool() {
            Some(true) => spec.ignore_default(),
            Some(false) => spec,
            None => spec.sparse(kdl_value_to_value(sparse)),
        };
    }
    if node.bool_attr("ignore-default").unwrap_or(false) {
        spec = spec.ignore_default();
    }
    if let Some(rename) = node.string_attr("rename") {
        spec = spec.rename(rename);
    }
    if node.bool_attr("skip-prefix").unwrap_or(false) {
        spec = spec.skip_prefix();
    }
    if node.bool_attr("allow-blank").unwrap_or(false) {
        spec = spec.allow_blank();
    }
    if node.bool_attr("unmapped").unwrap_or(false) {
        spec = spec.unmapped();
    }
    if let Some(raw) = node.string_attr("scope") {
        let scope = Scope::parse(raw).ok_or_else(|| {
            DescriptorError::invalid("property", format!("unknown scope '{raw}'"))
        })?;
        spec = spec.scope(scope);
    }
    Ok(spec)
}

fn parse_class(node: &KdlNode) -> Result<ClassDescriptor, DescriptorError> {
    let name = node.required_string_arg()?;
    let mut class = ClassDescriptor::new(name);
    if let Some(parent) = node.string_attr("extends") {
        class = class.extends(parent);
    }

    for child in node.child_nodes() {
        match child.name_str() {
            "meta" => class = class.meta(parse_meta(child)?),
            "member" => class = class.member(parse_member(child)?),
            "nested" => class = class.nested(parse_class(child)?),
            other => return Err(unexpected(other, &format!("class '{name}'"), CLASS_CHILDREN)),
        }
    }
    Ok(class)
}

fn parse_member(node: &KdlNode) -> Result<MemberDescriptor, DescriptorError> {
    let mut member = MemberDescriptor::new(node.required_string_arg()?);
    if let Some(value_class) = node.string_attr("value-class") {
        member = member.value_class(value_class);
    }

    for child in node.child_nodes() {
        match child.name_str() {
            "meta" => member = member.meta(parse_meta(child)?),
            other => {
                return Err(unexpected(other, &format!("member '{}'", member.name), &["meta"]));
            }
        }
    }
    Ok(member)
}

/// `meta "kind" [value] key=value... { ... }`.
fn parse_meta(node: &KdlNode) -> Result<MetadataObject, DescriptorError> {
    let kind = node.required_string_arg()?;
    let mut object = parse_object(node, kind)?;
    if let Some(value) = node.arg(1) {
        object.set("value", kdl_value_to_value(value));
    }
    Ok(object)
}

fn parse_object(node: &KdlNode, kind: &str) -> Result<MetadataObject, DescriptorError> {
    let mut object = MetadataObject::new(kind);
    for (key, value) in node.attrs() {
        object.set(key, kdl_value_to_value(value));
    }
    for child in node.child_nodes() {
        object.set(child.name_str(), child_value(child)?);
    }
    Ok(object)
}

fn child_value(node: &KdlNode) -> Result<Value, DescriptorError> {
    if node.ty().is_some_and(|ty| ty.value() == "object") {
        let kind = node.required_string_arg()?;
        return Ok(Value::Object(parse_object(node, kind)?));
    }

    let children = node.child_nodes();
    if !children.is_empty() {
        return children
            .into_iter()
            .map(|item| parse_object(item, item.name_str()).map(Value::Object))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List);
    }

    Ok(Value::List(node.args().into_iter().map(kdl_value_to_value).collect()))
}

fn string_args(node: &KdlNode) -> Result<Vec<String>, DescriptorError> {
    node.args()
        .into_iter()
        .map(|arg| {
            arg.as_string().map(str::to_string).ok_or_else(|| {
                DescriptorError::invalid(node.name_str(), "expected string arguments")
            })
        })
        .collect()
}
