use crate::context::AssemblyContext;
use crate::handlers::Handler;
use crate::mapper::PropertyMapper;
use crate::naming::valid_node_name;
use crate::source::{MemberSource, MetadataSource};
use crate::tree::{Document, NodeId};
use crate::value::Value;
use crate::widgets::{attrs, kinds};

/// Renders `select.options` as `items/<option>` children.
///
/// Option nodes are named after the option value, or its text when the value
/// is blank. Options rendering to the same name share one node.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectWidget;

impl Handler for SelectWidget {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        let Some(select) = source.metadata_of(kinds::SELECT) else {
            return;
        };
        let options: Vec<_> = select
            .get_list("options")
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_object)
            .collect();
        if options.is_empty() {
            return;
        }

        let mapper = PropertyMapper::new(cx, source.declaring_class()).for_member(&source.member.name);
        let items = doc.get_or_create_child(node, attrs::ITEMS);
        for option in options {
            let raw = option
                .get("value")
                .and_then(Value::to_attribute)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| option.get_str("text").map(str::to_string))
                .unwrap_or_default();
            let name = valid_node_name(&raw, &cx.config.fallback_node_name);
            let child = doc.get_or_create_child(items, &name);
            mapper.map(option, doc, child, &[]);
        }
    }
}
