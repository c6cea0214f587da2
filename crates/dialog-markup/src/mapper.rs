//! Projection of metadata objects onto tree nodes.

use crate::context::AssemblyContext;
use crate::error::Diagnostic;
use crate::merge::MergePolicy;
use crate::metadata::{MetadataKind, MetadataObject, PropertyMapping};
use crate::naming::FALLBACK_NODE_NAME;
use crate::node_path::split_prefix;
use crate::tree::{Document, NodeId};
use crate::value::Value;

/// Writes metadata objects as attributes and child nodes.
///
/// Diagnostics are attributed to `class` and, when set, `member`.
#[derive(Debug, Clone, Copy)]
pub struct PropertyMapper<'c, 'a> {
    cx: &'c AssemblyContext<'a>,
    class: &'c str,
    member: Option<&'c str>,
}

impl<'c, 'a> PropertyMapper<'c, 'a> {
    pub fn new(cx: &'c AssemblyContext<'a>, class: &'c str) -> Self {
        Self {
            cx,
            class,
            member: None,
        }
    }

    pub fn for_member(mut self, member: &'c str) -> Self {
        self.member = Some(member);
        self
    }

    /// Map every eligible property of `object` onto `target`.
    ///
    /// The kind's mapping prefix may carry a node path (`image/file`), in
    /// which case writes land on that descendant of `target`. Properties
    /// named in `skip` are left alone.
    pub fn map(&self, object: &MetadataObject, doc: &mut Document, target: NodeId, skip: &[&str]) {
        let Some(kind) = self.cx.registry.kind(object.kind().as_str()) else {
            self.cx.report(Diagnostic::instantiation(
                self.class,
                self.member,
                object.kind().as_str(),
                "metadata kind is not registered",
            ));
            return;
        };
        self.map_with_kind(kind, object, doc, target, skip);
    }

    pub fn map_with_kind(
        &self,
        kind: &MetadataKind,
        object: &MetadataObject,
        doc: &mut Document,
        target: NodeId,
        skip: &[&str],
    ) {
        let default_mapping = PropertyMapping::default();
        let mapping = kind.mapping.as_ref().unwrap_or(&default_mapping);
        self.check_names(kind, mapping, object);

        let (path, name_prefix) = split_prefix(&mapping.prefix);
        let target = match path {
            Some(path) => doc.resolve_or_create(target, &path),
            None => target,
        };

        for spec in &kind.properties {
            let name = spec.name.as_str();
            if skip.contains(&name)
                || !mapping.admits(name)
                || !spec.mappable
                || !spec.applies_in(self.cx.config.scope)
            {
                continue;
            }

            let Some(value) = kind.value_of(object, name) else {
                continue;
            };
            if spec.ignore_default && spec.default.as_ref() == Some(value) {
                continue;
            }

            let attribute = match (&spec.rename, spec.skip_prefix) {
                (Some(rename), _) => rename.clone(),
                (None, true) => name.to_string(),
                (None, false) => format!("{name_prefix}{name}"),
            };

            match value {
                Value::Object(nested) => {
                    let child = doc.get_or_create_child(target, &attribute);
                    self.map(nested, doc, child, &[]);
                }
                list if list.is_object_list() => {
                    let holder = doc.get_or_create_child(target, &attribute);
                    for item in list.as_list().unwrap_or_default() {
                        if let Value::Object(nested) = item {
                            let node = doc.create_child(holder, FALLBACK_NODE_NAME);
                            self.map(nested, doc, node, &[]);
                        }
                    }
                }
                scalar => {
                    if scalar.is_blank() && !spec.allow_blank {
                        continue;
                    }
                    let Some(rendered) = scalar.to_attribute() else {
                        continue;
                    };
                    tracing::trace!(kind = %kind.id, %attribute, value = %rendered, "mapped property");
                    doc.merge_attribute(target, &attribute, &rendered, MergePolicy::Union);
                }
            }
        }
    }

    /// Values and allowlist entries must name declared properties.
    fn check_names(&self, kind: &MetadataKind, mapping: &PropertyMapping, object: &MetadataObject) {
        let undeclared_values = object.values().map(|(name, _)| name);
        let undeclared_allowed = mapping.mappings.iter().map(String::as_str);
        for name in undeclared_values.chain(undeclared_allowed) {
            if !kind.declares(name) {
                self.cx.report(Diagnostic::property_resolution(
                    self.class,
                    self.member,
                    kind.id.as_str(),
                    name,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyMapper;
    use crate::config::AssemblyConfig;
    use crate::context::AssemblyContext;
    use crate::error::{CollectingSink, DiagnosticKind};
    use crate::metadata::{MetadataKind, MetadataObject, PropertyMapping, PropertySpec, Scope};
    use crate::registry::Registry;
    use crate::source::ClassCatalog;
    use crate::tree::Document;
    use crate::value::Value;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_kind(
                MetadataKind::new("image")
                    .mapped(PropertyMapping::prefixed("./file/ui_").except(["secret"]))
                    .property(PropertySpec::new("alt"))
                    .property(PropertySpec::new("title").rename("jcr:title"))
                    .property(PropertySpec::new("raw").skip_prefix())
                    .property(PropertySpec::new("secret"))
                    .property(PropertySpec::new("design").scope(Scope::DesignDialog))
                    .property(PropertySpec::new("zoom").sparse(1i64))
                    .property(PropertySpec::new("blank").allow_blank())
                    .property(PropertySpec::new("crop").default_value(false)),
            )
            .register_kind(
                MetadataKind::new("crop")
                    .mapped(PropertyMapping::new())
                    .property(PropertySpec::new("ratio")),
            );
        registry
    }

    #[test]
    fn writes_prefixed_renamed_and_sparse_properties() {
        let registry = registry();
        let config = AssemblyConfig::default();
        let catalog = ClassCatalog::new();
        let sink = CollectingSink::new();
        let cx = AssemblyContext::new(&registry, &config, &catalog, &sink, "Hero");

        let object = MetadataObject::new("image")
            .with("alt", "Alt text")
            .with("title", "Picture")
            .with("raw", "x")
            .with("secret", "hidden")
            .with("design", "only in design")
            .with("zoom", 1i64)
            .with("blank", "");

        let mut doc = Document::new("root");
        let root = doc.root();
        PropertyMapper::new(&cx, "Hero").map(&object, &mut doc, root, &["raw"]);

        let file = doc.get(root, "file").unwrap();
        let attrs: Vec<(&str, &str)> = doc
            .attributes(file)
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            attrs,
            vec![
                ("ui_alt", "Alt text"),
                ("jcr:title", "Picture"),
                ("ui_blank", ""),
                ("ui_crop", "{Boolean}false"),
            ]
        );
        assert!(doc.attributes(root).is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn nested_objects_become_children() {
        let registry = registry();
        let config = AssemblyConfig::default();
        let catalog = ClassCatalog::new();
        let sink = CollectingSink::new();
        let cx = AssemblyContext::new(&registry, &config, &catalog, &sink, "Hero");

        let object = MetadataObject::new("image").with(
            "crop",
            Value::from(vec![
                MetadataObject::new("crop").with("ratio", "16:9"),
                MetadataObject::new("crop").with("ratio", "4:3"),
            ]),
        );
        let mut doc = Document::new("root");
        let root = doc.root();
        PropertyMapper::new(&cx, "Hero").map(&object, &mut doc, root, &[]);

        let holder = doc.get(root, "file/ui_crop").unwrap();
        assert_eq!(doc.list_children(holder), vec!["item", "item1"]);
        let second = doc.get(holder, "item1").unwrap();
        assert_eq!(doc.attribute(second, "ratio"), Some("4:3"));
    }

    #[test]
    fn undeclared_values_are_reported_and_mapping_continues() {
        let registry = registry();
        let config = AssemblyConfig::default();
        let catalog = ClassCatalog::new();
        let sink = CollectingSink::new();
        let cx = AssemblyContext::new(&registry, &config, &catalog, &sink, "Hero");

        let object = MetadataObject::new("image")
            .with("alt", "ok")
            .with("colour", "red");
        let mut doc = Document::new("root");
        let root = doc.root();
        PropertyMapper::new(&cx, "Hero")
            .for_member("picture")
            .map(&object, &mut doc, root, &[]);

        let diagnostics = sink.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].member.as_deref(), Some("picture"));
        assert_eq!(
            diagnostics[0].kind,
            DiagnosticKind::PropertyResolutionFailure {
                kind: "image".to_string(),
                property: "colour".to_string(),
            }
        );
        assert_eq!(doc.get(root, "file").and_then(|f| doc.attribute(f, "ui_alt")), Some("ok"));
    }
}
