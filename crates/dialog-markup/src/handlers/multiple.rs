use crate::context::AssemblyContext;
use crate::handlers::Handler;
use crate::source::{MemberSource, MetadataSource};
use crate::tree::{Document, NodeId};
use crate::widgets::{attrs, kinds};

/// Turns a fully rendered member into a multifield repeating it.
///
/// The node's final state is copied into a `field` child; the node itself
/// becomes the multifield wrapper and keeps only the label and description.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultipleInstanceStage;

impl Handler for MultipleInstanceStage {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        if !source.has_metadata(kinds::MULTIPLE) {
            return;
        }

        let field = doc.copy_subtree(node, node, attrs::FIELD);
        let originals: Vec<NodeId> = doc
            .children(node)
            .iter()
            .copied()
            .filter(|child| *child != field)
            .collect();
        for child in originals {
            doc.detach(child);
        }
        doc.rename(field, attrs::FIELD);

        let mut wrapper = doc.take_attributes(node);
        let kept = [attrs::FIELD_LABEL, attrs::FIELD_DESCRIPTION];
        for key in kept {
            doc.remove_attribute(field, key);
        }
        doc.set_attribute(
            node,
            attrs::SLING_RESOURCE_TYPE,
            cx.config.resource_types.multifield.as_str(),
        );
        for key in kept {
            if let Some(value) = wrapper.shift_remove(key) {
                doc.set_attribute(node, key, value);
            }
        }
        tracing::debug!(member = %source.member.name, "wrapped member in multifield");
    }
}

#[cfg(test)]
mod tests {
    use super::MultipleInstanceStage;
    use crate::config::AssemblyConfig;
    use crate::context::AssemblyContext;
    use crate::error::CollectingSink;
    use crate::handlers::Handler;
    use crate::metadata::MetadataObject;
    use crate::registry::Registry;
    use crate::source::{ClassCatalog, MemberDescriptor, MemberSource};
    use crate::tree::Document;

    #[test]
    fn wraps_the_rendered_node() {
        let registry = Registry::with_builtins();
        let config = AssemblyConfig::default();
        let catalog = ClassCatalog::new();
        let sink = CollectingSink::new();
        let cx = AssemblyContext::new(&registry, &config, &catalog, &sink, "Hero");

        let member = MemberDescriptor::new("links").meta(MetadataObject::new("multiple"));
        let mut doc = Document::new("root");
        let node = doc.create_child(doc.root(), "links");
        doc.set_attribute(node, "sling:resourceType", "form/textfield");
        doc.set_attribute(node, "fieldLabel", "Links");
        doc.set_attribute(node, "name", "./links");
        doc.create_child(node, "granite:data");
        doc.create_child(node, "field");

        let mut source = MemberSource::new(&member, "Hero");
        MultipleInstanceStage.handle(&mut source, &mut doc, node, &cx);

        assert_eq!(doc.list_children(node), vec!["field"]);
        assert_eq!(
            doc.attribute(node, "sling:resourceType"),
            Some("granite/ui/components/coral/foundation/form/multifield")
        );
        assert_eq!(doc.attribute(node, "fieldLabel"), Some("Links"));
        assert!(!doc.has_attribute(node, "name"));

        let field = doc.child(node, "field").unwrap();
        assert_eq!(doc.attribute(field, "name"), Some("./links"));
        assert_eq!(doc.attribute(field, "sling:resourceType"), Some("form/textfield"));
        assert!(!doc.has_attribute(field, "fieldLabel"));
        assert_eq!(doc.list_children(field), vec!["granite:data", "field"]);
    }
}
