use crate::collector::collect_members;
use crate::context::AssemblyContext;
use crate::handlers::{Handler, render_members, scratch};
use crate::mapper::PropertyMapper;
use crate::source::{MemberSource, MetadataSource};
use crate::tree::{Document, NodeId};
use crate::value::Value;
use crate::widgets::{attrs, kinds, value_class_scope};

/// Renders the members of the value class under `items`.
///
/// Field names inside the set get the fieldset's `namePrefix` appended to the
/// inherited prefix and its `namePostfix` prepended to the inherited postfix.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldSetWidget;

impl Handler for FieldSetWidget {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        let Some((hierarchy, mut values)) = value_class_scope(source, kinds::FIELDSET, cx) else {
            return;
        };

        let fieldset = source.metadata_of(kinds::FIELDSET);
        let own = |key: &str| fieldset.and_then(|f| f.get_str(key)).unwrap_or("");
        let prefix = format!(
            "{}{}",
            source.value(scratch::NAME_PREFIX).unwrap_or(""),
            own("namePrefix")
        );
        let postfix = format!(
            "{}{}",
            own("namePostfix"),
            source.value(scratch::NAME_POSTFIX).unwrap_or("")
        );
        values.insert(scratch::NAME_PREFIX.to_string(), prefix);
        values.insert(scratch::NAME_POSTFIX.to_string(), postfix);

        let Some(class) = hierarchy.last() else {
            return;
        };
        let members = collect_members(&hierarchy);
        let items = doc.get_or_create_child(node, attrs::ITEMS);
        render_members(&members, &class.name, &values, doc, items, cx);
    }
}

/// Renders the repeated field of a multifield.
///
/// With a value class the multifield is composite: a `field` container
/// holding the value class members, whose names restart relative to each
/// item. Without one, the `field` property describes a single widget.
/// Either way the member's `name` moves to the `field` node.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiFieldWidget;

impl Handler for MultiFieldWidget {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        let single = source
            .metadata_of(kinds::MULTIFIELD)
            .and_then(|m| m.get("field"))
            .and_then(Value::as_object);

        if source.value_class().is_none()
            && let Some(widget) = single
        {
            let field = doc.get_or_create_child(node, attrs::FIELD);
            let resource_type = cx
                .registry
                .kind(widget.kind().as_str())
                .and_then(|kind| kind.resource_type.as_deref());
            if let Some(resource_type) = resource_type {
                doc.set_attribute(field, attrs::SLING_RESOURCE_TYPE, resource_type);
            }
            PropertyMapper::new(cx, source.declaring_class())
                .for_member(&source.member.name)
                .map(widget, doc, field, &[]);
            move_name(doc, node, field);
            return;
        }

        let Some((hierarchy, mut values)) = value_class_scope(source, kinds::MULTIFIELD, cx) else {
            return;
        };
        values.shift_remove(scratch::NAME_PREFIX);
        values.shift_remove(scratch::NAME_POSTFIX);

        doc.set_attribute(node, attrs::COMPOSITE, true);
        let field = doc.get_or_create_child(node, attrs::FIELD);
        doc.set_attribute(
            field,
            attrs::SLING_RESOURCE_TYPE,
            cx.config.resource_types.container.as_str(),
        );
        move_name(doc, node, field);

        let Some(class) = hierarchy.last() else {
            return;
        };
        let members = collect_members(&hierarchy);
        let items = doc.get_or_create_child(field, attrs::ITEMS);
        render_members(&members, &class.name, &values, doc, items, cx);
    }
}

fn move_name(doc: &mut Document, from: NodeId, to: NodeId) {
    if let Some(name) = doc.remove_attribute(from, attrs::NAME) {
        doc.set_attribute(to, attrs::NAME, name);
    }
}
