use crate::container::{SectionKind, render_sections};
use crate::context::AssemblyContext;
use crate::handlers::Handler;
use crate::source::MemberSource;
use crate::tree::{Document, NodeId};
use crate::widgets::{attrs, value_class_scope};

/// A `tabs` or `accordion` member: its value class is resolved into
/// sections rendered under the member's `items`.
#[derive(Debug, Clone, Copy)]
pub struct ContainerWidget {
    kind: SectionKind,
}

impl ContainerWidget {
    pub fn new(kind: SectionKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }
}

impl Handler for ContainerWidget {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        let Some((hierarchy, values)) = value_class_scope(source, self.kind.container_kind(), cx)
        else {
            return;
        };
        let items = doc.get_or_create_child(node, attrs::ITEMS);
        render_sections(&hierarchy, self.kind, &values, doc, items, cx);
    }
}
