use crate::context::AssemblyContext;
use crate::handlers::{Handler, scratch};
use crate::mapper::PropertyMapper;
use crate::metadata::MetadataKind;
use crate::source::{MemberSource, MetadataSource};
use crate::tree::{Document, NodeId};
use crate::widgets::{attrs, kinds};

fn widget_kind<'r>(source: &MemberSource<'_>, cx: &AssemblyContext<'r>) -> Option<&'r MetadataKind> {
    source
        .value(scratch::WIDGET)
        .and_then(|id| cx.registry.kind(id))
}

/// Writes `sling:resourceType` from an explicit `resource-type` metadata or
/// the widget kind's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceTypeStage;

impl Handler for ResourceTypeStage {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        let explicit = source
            .metadata_of(kinds::RESOURCE_TYPE)
            .and_then(|m| m.get_str("value"))
            .filter(|v| !v.trim().is_empty());
        let resource_type = explicit.or_else(|| {
            widget_kind(source, cx).and_then(|kind| kind.resource_type.as_deref())
        });
        if let Some(resource_type) = resource_type {
            doc.set_attribute(node, attrs::SLING_RESOURCE_TYPE, resource_type);
        }
    }
}

/// Maps every member metadata object whose kind declares a property mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericPropertyMappingStage;

impl Handler for GenericPropertyMappingStage {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        let mapper = PropertyMapper::new(cx, source.declaring_class()).for_member(&source.member.name);
        for object in source.metadata() {
            let Some(kind) = cx.registry.kind(object.kind().as_str()) else {
                continue;
            };
            if kind.mapping.is_some() {
                mapper.map_with_kind(kind, object, doc, node, &[]);
            }
        }
    }
}

/// Writes the `name` attribute of form fields.
///
/// `./` + scratch prefix + explicit name (or the member name) + scratch
/// postfix.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMetadataStage;

impl Handler for FieldMetadataStage {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        if !widget_kind(source, cx).is_some_and(|kind| kind.renders_name) {
            return;
        }
        let explicit = source
            .metadata_of(kinds::DIALOG_FIELD)
            .and_then(|m| m.get_str("name"))
            .map(|name| name.trim_start_matches("./"))
            .filter(|name| !name.is_empty());
        let base = explicit.unwrap_or(&source.member.name);
        let prefix = source.value(scratch::NAME_PREFIX).unwrap_or("");
        let postfix = source.value(scratch::NAME_POSTFIX).unwrap_or("");
        doc.set_attribute(node, attrs::NAME, format!("./{prefix}{base}{postfix}"));
    }
}

/// Runs the registered widget handler of the detected widget kind. Custom
/// marked kinds have no handler and are left to later stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct KindSpecificStage;

impl Handler for KindSpecificStage {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        let Some(widget) = source.value(scratch::WIDGET).map(str::to_string) else {
            return;
        };
        match cx.registry.widget_handler(&widget) {
            Some(handler) => handler.handle(source, doc, node, cx),
            None => tracing::trace!(%widget, member = %source.member.name, "custom widget"),
        }
    }
}

/// Applies registered custom handlers whose kind the member carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomOverrideStage;

impl Handler for CustomOverrideStage {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        doc: &mut Document,
        node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        for (kind, handler) in cx.registry.custom_handlers() {
            if source.has_metadata(kind) {
                handler.handle(source, doc, node, cx);
            }
        }
    }
}
