use crate::context::AssemblyContext;
use crate::error::Diagnostic;
use crate::handlers::Handler;
use crate::merge::MergePolicy;
use crate::metadata::MetadataObject;
use crate::node_path::split_prefix;
use crate::source::{MemberSource, MetadataSource};
use crate::tree::{Document, NodeId};
use crate::value::Value;
use crate::widgets::{attrs, kinds};

const DEFAULT_DEPENDS_ON_ACTION: &str = "visibility";
const DEFAULT_DEPENDS_ON_REF_TYPE: &str = "auto";

/// `attribute` metadata: `granite:id`, `granite:class` and `granite:data`
/// entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeAnnotationStage;

impl Handler for AttributeAnnotationStage {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        _cx: &AssemblyContext<'_>,
    ) {
        for attribute in source.all_metadata_of(kinds::ATTRIBUTE) {
            if let Some(id) = attribute.get_str("id").filter(|s| !s.trim().is_empty()) {
                doc.set_attribute(node, attrs::GRANITE_ID, id);
            }
            if let Some(class) = attribute.get("class").and_then(class_list) {
                doc.merge_attribute(node, attrs::GRANITE_CLASS, &class, MergePolicy::Union);
            }
            let entries = attribute
                .get_list("data")
                .unwrap_or_default()
                .iter()
                .filter_map(Value::as_object);
            for entry in entries {
                let (Some(name), Some(value)) = (entry.get_str("name"), entry.get("value")) else {
                    continue;
                };
                let Some(value) = value.to_attribute() else {
                    continue;
                };
                let data = doc.get_or_create_child(node, attrs::GRANITE_DATA);
                doc.set_attribute(data, name, value);
            }
        }
    }
}

/// Space separated CSS classes from a string or a list of strings.
fn class_list(value: &Value) -> Option<String> {
    let joined = match value {
        Value::String(s) => s.trim().to_string(),
        Value::List(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    (!joined.is_empty()).then_some(joined)
}

/// `depends-on` and `depends-on-ref` metadata as `granite:data` entries.
///
/// Repeated `depends-on` entries are joined with `;`. A single entry with the
/// default action omits `dependsOnAction`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyAnnotationStage;

impl Handler for DependencyAnnotationStage {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        let rules: Vec<&MetadataObject> = source
            .all_metadata_of(kinds::DEPENDS_ON)
            .filter(|rule| {
                let has_query = rule.get_str("query").is_some_and(|q| !q.trim().is_empty());
                if !has_query {
                    cx.report(Diagnostic::property_resolution(
                        source.declaring_class(),
                        Some(&source.member.name),
                        kinds::DEPENDS_ON,
                        "query",
                    ));
                }
                has_query
            })
            .collect();

        if !rules.is_empty() {
            let queries: Vec<&str> = rules.iter().filter_map(|r| r.get_str("query")).collect();
            let actions: Vec<&str> = rules
                .iter()
                .map(|r| r.get_str("action").unwrap_or(DEFAULT_DEPENDS_ON_ACTION))
                .collect();
            let data = doc.get_or_create_child(node, attrs::GRANITE_DATA);
            doc.set_attribute(data, attrs::DEPENDS_ON, queries.join(";"));
            let only_default = actions.len() == 1 && actions[0] == DEFAULT_DEPENDS_ON_ACTION;
            if !only_default {
                doc.set_attribute(data, attrs::DEPENDS_ON_ACTION, actions.join(";"));
            }
        }

        if let Some(reference) = source.metadata_of(kinds::DEPENDS_ON_REF) {
            let name = reference
                .get_str("name")
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(&source.member.name);
            let data = doc.get_or_create_child(node, attrs::GRANITE_DATA);
            doc.set_attribute(data, attrs::DEPENDS_ON_REF, name);
            if let Some(ref_type) = reference
                .get_str("type")
                .filter(|t| *t != DEFAULT_DEPENDS_ON_REF_TYPE)
            {
                doc.set_attribute(data, attrs::DEPENDS_ON_REF_TYPE, ref_type);
            }
        }
    }
}

/// `property` metadata: arbitrary `name`/`value` pairs written with strict
/// override. The name may be a relative path (`granite:data/key`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyAnnotationStage;

impl Handler for PropertyAnnotationStage {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        for property in source.all_metadata_of(kinds::PROPERTY) {
            let Some(path) = property.get_str("name").filter(|n| !n.trim().is_empty()) else {
                cx.report(Diagnostic::property_resolution(
                    source.declaring_class(),
                    Some(&source.member.name),
                    kinds::PROPERTY,
                    "name",
                ));
                continue;
            };
            let value = property
                .get("value")
                .and_then(Value::to_attribute)
                .unwrap_or_default();
            let (node_path, name) = split_prefix(path);
            let target = match node_path {
                Some(node_path) => doc.resolve_or_create(node, &node_path),
                None => node,
            };
            doc.merge_attribute(target, name, &value, MergePolicy::Override);
        }
    }
}
