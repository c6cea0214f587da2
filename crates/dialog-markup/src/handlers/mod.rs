//! The per-member handler chain.
//!
//! Every rendered member gets its own node, which the stages below enrich in
//! a fixed order. Later stages see everything earlier ones wrote. A stage
//! only touches the subtree rooted at the member's node.

mod annotations;
mod inheritance;
mod multiple;
mod stages;

pub use annotations::{AttributeAnnotationStage, DependencyAnnotationStage, PropertyAnnotationStage};
pub use inheritance::{InheritanceStage, inheritance_chain, overlay_metadata};
pub use multiple::MultipleInstanceStage;
pub use stages::{
    CustomOverrideStage, FieldMetadataStage, GenericPropertyMappingStage, KindSpecificStage,
    ResourceTypeStage,
};

use indexmap::IndexMap;

use crate::context::AssemblyContext;
use crate::error::Diagnostic;
use crate::registry::WidgetKind;
use crate::source::{MemberDescriptor, MemberSource, MetadataSource};
use crate::tree::{Document, NodeId};

/// Keys of the pipeline-local scratch values carried by a [`MemberSource`].
pub mod scratch {
    pub const NAME_PREFIX: &str = "namePrefix";
    pub const NAME_POSTFIX: &str = "namePostfix";
    /// Kind id of the detected widget.
    pub const WIDGET: &str = "widget";
    /// Nesting depth of fieldset, multifield and container recursion.
    pub const DEPTH: &str = "depth";
}

/// One mutation step applied to a member's node.
pub trait Handler: Send + Sync {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    );
}

impl<F> Handler for F
where
    F: Fn(&mut MemberSource<'_>, &mut Document, NodeId, &AssemblyContext<'_>) + Send + Sync,
{
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        self(source, doc, node, cx)
    }
}

static INHERITANCE: InheritanceStage = InheritanceStage;
static RESOURCE_TYPE: ResourceTypeStage = ResourceTypeStage;
static GENERIC_MAPPING: GenericPropertyMappingStage = GenericPropertyMappingStage;
static ATTRIBUTE: AttributeAnnotationStage = AttributeAnnotationStage;
static FIELD_METADATA: FieldMetadataStage = FieldMetadataStage;
static KIND_SPECIFIC: KindSpecificStage = KindSpecificStage;
static DEPENDENCY: DependencyAnnotationStage = DependencyAnnotationStage;
static CUSTOM_OVERRIDE: CustomOverrideStage = CustomOverrideStage;
static PROPERTY: PropertyAnnotationStage = PropertyAnnotationStage;
static MULTIPLE: MultipleInstanceStage = MultipleInstanceStage;

/// An ordered list of named stages.
pub struct HandlerChain {
    stages: Vec<(&'static str, &'static dyn Handler)>,
}

impl HandlerChain {
    /// The complete chain applied to a declared member.
    pub fn full() -> Self {
        Self {
            stages: vec![
                ("inheritance", &INHERITANCE as &dyn Handler),
                ("resource-type", &RESOURCE_TYPE as &dyn Handler),
                ("generic-mapping", &GENERIC_MAPPING as &dyn Handler),
                ("attribute", &ATTRIBUTE as &dyn Handler),
                ("field-metadata", &FIELD_METADATA as &dyn Handler),
                ("kind-specific", &KIND_SPECIFIC as &dyn Handler),
                ("dependency", &DEPENDENCY as &dyn Handler),
                ("custom-override", &CUSTOM_OVERRIDE as &dyn Handler),
                ("property", &PROPERTY as &dyn Handler),
                ("multiple", &MULTIPLE as &dyn Handler),
            ],
        }
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|(name, _)| *name)
    }

    pub fn run(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        for (name, stage) in &self.stages {
            tracing::debug!(stage = name, member = %source.member.name, "running stage");
            stage.handle(source, doc, node, cx);
        }
    }
}

impl std::fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.stage_names()).finish()
    }
}

/// Render `member` as a new child of `parent`.
///
/// The widget is detected from the member's own metadata, then from the
/// members it extends. A member without any widget is reported and no node
/// is emitted. Returns the member's node.
pub fn render_member<'a>(
    member: &'a MemberDescriptor,
    container_class: &'a str,
    values: IndexMap<String, String>,
    doc: &mut Document,
    parent: NodeId,
    cx: &AssemblyContext<'a>,
) -> Option<NodeId> {
    let mut source = MemberSource::new(member, container_class).with_values(values);

    let depth = crate::widgets::depth_of(&source);
    if depth > cx.config.max_depth {
        cx.report(Diagnostic::instantiation(
            &member.declaring_class,
            Some(&member.name),
            source.value(scratch::WIDGET).unwrap_or("member"),
            format!("nesting deeper than {} levels", cx.config.max_depth),
        ));
        return None;
    }

    let Some(widget) = detect_widget(member, cx) else {
        let carried: Vec<&str> = member.metadata().iter().map(|m| m.kind().as_str()).collect();
        let known: Vec<&str> = cx.registry.kind_ids().collect();
        cx.report(Diagnostic::unknown_metadata_kind(
            &member.declaring_class,
            &member.name,
            &carried,
            &known,
        ));
        return None;
    };

    let node = doc.create_child(parent, &member.name);
    source.set_value(scratch::WIDGET, widget.kind().id.as_str());
    HandlerChain::full().run(&mut source, doc, node, cx);
    Some(node)
}

/// Render `members` in order as children of `parent`.
pub fn render_members<'a>(
    members: &[&'a MemberDescriptor],
    container_class: &'a str,
    values: &IndexMap<String, String>,
    doc: &mut Document,
    parent: NodeId,
    cx: &AssemblyContext<'a>,
) {
    for &member in members {
        render_member(member, container_class, values.clone(), doc, parent, cx);
    }
}

/// Widget of `member`, falling back to the members it extends nearest first.
pub fn detect_widget<'r>(
    member: &MemberDescriptor,
    cx: &AssemblyContext<'r>,
) -> Option<WidgetKind<'r>> {
    let registry = cx.registry;
    registry.detect_widget(member.metadata()).or_else(|| {
        inheritance_chain(member, cx, false)
            .into_iter()
            .rev()
            .find_map(|inherited| registry.detect_widget(inherited.metadata()))
    })
}
