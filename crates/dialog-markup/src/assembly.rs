//! One assembly run per component class.

use indexmap::IndexMap;

use crate::collector::collect_members;
use crate::config::AssemblyConfig;
use crate::container::{SectionKind, render_sections};
use crate::context::AssemblyContext;
use crate::error::{AssemblyError, Diagnostic, ErrorSink};
use crate::handlers::render_members;
use crate::mapper::PropertyMapper;
use crate::metadata::MetadataObject;
use crate::registry::Registry;
use crate::source::{ClassCatalog, ClassDescriptor, MetadataSource};
use crate::tree::{Document, NodeId};
use crate::widgets::{attrs, kinds};

/// How the top-level fields of a dialog are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Sections(SectionKind),
    FixedColumns,
}

impl Layout {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tabs" => Some(Layout::Sections(SectionKind::Tab)),
            "accordion" => Some(Layout::Sections(SectionKind::AccordionPanel)),
            "fixed-columns" => Some(Layout::FixedColumns),
            _ => None,
        }
    }

    /// Tabs when any class in the hierarchy declares a tab, accordion panels
    /// likewise, fixed columns otherwise.
    pub fn detect(hierarchy: &[&ClassDescriptor]) -> Self {
        [SectionKind::Tab, SectionKind::AccordionPanel]
            .into_iter()
            .find(|kind| hierarchy.iter().any(|class| kind.declared_by(class)))
            .map_or(Layout::FixedColumns, Layout::Sections)
    }
}

/// Builds dialog documents from a [`ClassCatalog`].
///
/// An assembler only borrows shared state, so one instance can serve
/// concurrent runs over different classes.
#[derive(Clone, Copy)]
pub struct Assembler<'a> {
    registry: &'a Registry,
    config: &'a AssemblyConfig,
    sink: &'a dyn ErrorSink,
}

impl<'a> Assembler<'a> {
    pub fn new(registry: &'a Registry, config: &'a AssemblyConfig, sink: &'a dyn ErrorSink) -> Self {
        Self {
            registry,
            config,
            sink,
        }
    }

    /// Assemble the dialog of `class`.
    ///
    /// Recoverable problems go to the error sink and still produce a tree.
    /// Only a broken hierarchy aborts the run.
    pub fn assemble(&self, catalog: &ClassCatalog, class: &str) -> Result<Document, AssemblyError> {
        let hierarchy = catalog.hierarchy(class)?;
        let cx = AssemblyContext::new(self.registry, self.config, catalog, self.sink, class);
        tracing::debug!(class, depth = hierarchy.len(), "assembling dialog");

        let mut doc = Document::new(&self.config.root_name);
        let root = doc.root();
        doc.set_attribute(
            root,
            attrs::SLING_RESOURCE_TYPE,
            self.config.resource_types.dialog.as_str(),
        );
        let dialog = dialog_metadata(&hierarchy);
        if let Some(dialog) = &dialog {
            PropertyMapper::new(&cx, class).map(dialog, &mut doc, root, &[]);
        }

        let content = doc.create_child(root, attrs::CONTENT);
        doc.set_attribute(
            content,
            attrs::SLING_RESOURCE_TYPE,
            self.config.resource_types.container.as_str(),
        );
        let items = doc.create_child(content, attrs::ITEMS);

        let layout = dialog
            .as_ref()
            .and_then(|dialog| dialog.get_str("layout"))
            .and_then(|raw| {
                let layout = Layout::parse(raw);
                if layout.is_none() {
                    cx.report(Diagnostic::instantiation(
                        class,
                        None,
                        kinds::DIALOG,
                        format!("unknown layout '{raw}'"),
                    ));
                }
                layout
            })
            .unwrap_or_else(|| Layout::detect(&hierarchy));

        let values = IndexMap::new();
        match layout {
            Layout::Sections(kind) => {
                let holder = self.section_container(&mut doc, items, kind);
                render_sections(&hierarchy, kind, &values, &mut doc, holder, &cx);
            }
            Layout::FixedColumns => {
                let holder = self.fixed_columns(&mut doc, items);
                let members = collect_members(&hierarchy);
                render_members(&members, class, &values, &mut doc, holder, &cx);
            }
        }

        tracing::debug!(class, nodes = doc.walk(root).len(), "assembled dialog");
        Ok(doc)
    }

    /// Assemble every class carrying `dialog` metadata. A failing class does
    /// not affect the others.
    pub fn assemble_all(&self, catalog: &ClassCatalog) -> Vec<(String, Result<Document, AssemblyError>)> {
        catalog
            .components()
            .map(|class| (class.name.clone(), self.assemble(catalog, &class.name)))
            .collect()
    }

    fn section_container(&self, doc: &mut Document, items: NodeId, kind: SectionKind) -> NodeId {
        let resource_type = match kind {
            SectionKind::Tab => &self.config.resource_types.tabs,
            SectionKind::AccordionPanel => &self.config.resource_types.accordion,
        };
        let container = doc.create_child(items, kind.container_kind());
        doc.set_attribute(container, attrs::SLING_RESOURCE_TYPE, resource_type.as_str());
        doc.create_child(container, attrs::ITEMS)
    }

    fn fixed_columns(&self, doc: &mut Document, items: NodeId) -> NodeId {
        let types = &self.config.resource_types;
        let columns = doc.create_child(items, "columns");
        doc.set_attribute(columns, attrs::SLING_RESOURCE_TYPE, types.fixed_columns.as_str());
        let column = doc.get_or_create(columns, "items/column");
        doc.set_attribute(column, attrs::SLING_RESOURCE_TYPE, types.container.as_str());
        doc.create_child(column, attrs::ITEMS)
    }
}

impl std::fmt::Debug for Assembler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembler")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// `dialog` metadata of the hierarchy, nearer classes overriding ancestors.
fn dialog_metadata(hierarchy: &[&ClassDescriptor]) -> Option<MetadataObject> {
    hierarchy
        .iter()
        .filter_map(|class| class.metadata_of(kinds::DIALOG))
        .fold(None, |merged: Option<MetadataObject>, next| match merged {
            Some(merged) => Some(merged.overlay(next)),
            None => Some(next.clone()),
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Assembler, Layout};
    use crate::config::AssemblyConfig;
    use crate::container::SectionKind;
    use crate::error::{AssemblyError, CollectingSink};
    use crate::metadata::MetadataObject;
    use crate::registry::Registry;
    use crate::source::{ClassCatalog, ClassDescriptor, MemberDescriptor};

    fn text(name: &str) -> MemberDescriptor {
        MemberDescriptor::new(name).meta(MetadataObject::new("text-field"))
    }

    #[test]
    fn fixed_column_layout_without_sections() {
        let catalog = ClassCatalog::new().with(
            ClassDescriptor::new("Teaser")
                .meta(MetadataObject::new("dialog").with("title", "Teaser"))
                .member(text("heading"))
                .member(text("body")),
        );
        let registry = Registry::with_builtins();
        let config = AssemblyConfig::default();
        let sink = CollectingSink::new();
        let doc = Assembler::new(&registry, &config, &sink)
            .assemble(&catalog, "Teaser")
            .unwrap();

        let root = doc.root();
        assert_eq!(doc.name(root), "jcr:root");
        assert_eq!(doc.attribute(root, "jcr:title"), Some("Teaser"));
        assert_eq!(
            doc.attribute(root, "sling:resourceType"),
            Some("cq/gui/components/authoring/dialog")
        );
        let fields = doc.get(root, "content/items/columns/items/column/items").unwrap();
        assert_eq!(doc.list_children(fields), vec!["heading", "body"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn layout_detection_and_override() {
        let tabbed = ClassDescriptor::new("Tabbed").nested(
            ClassDescriptor::new("Tabbed.Main").meta(MetadataObject::new("tab").with("title", "Main")),
        );
        let plain = ClassDescriptor::new("Plain");
        assert_eq!(Layout::detect(&[&tabbed]), Layout::Sections(SectionKind::Tab));
        assert_eq!(Layout::detect(&[&plain]), Layout::FixedColumns);

        let catalog = ClassCatalog::new().with(
            ClassDescriptor::new("Forced")
                .meta(MetadataObject::new("dialog").with("layout", "accordion"))
                .member(text("heading")),
        );
        let registry = Registry::with_builtins();
        let config = AssemblyConfig::default();
        let sink = CollectingSink::new();
        let doc = Assembler::new(&registry, &config, &sink)
            .assemble(&catalog, "Forced")
            .unwrap();
        let panel = doc.get(doc.root(), "content/items/accordion/items/Untitled").unwrap();
        assert_eq!(doc.list_children(panel), vec!["items"]);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn broken_hierarchies_fail_only_their_class() {
        let catalog = ClassCatalog::new()
            .with(ClassDescriptor::new("Good").meta(MetadataObject::new("dialog")))
            .with(
                ClassDescriptor::new("Bad")
                    .extends("Missing")
                    .meta(MetadataObject::new("dialog")),
            );
        let registry = Registry::with_builtins();
        let config = AssemblyConfig::default();
        let sink = CollectingSink::new();
        let results = Assembler::new(&registry, &config, &sink).assemble_all(&catalog);

        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(matches!(
            &results[1].1,
            Err(AssemblyError::UnknownClass { name, .. }) if name == "Missing"
        ));
    }
}
