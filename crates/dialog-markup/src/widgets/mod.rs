//! The built-in widget catalog.

mod composite;
mod container;
mod select;

pub use composite::{FieldSetWidget, MultiFieldWidget};
pub use container::ContainerWidget;
pub use select::SelectWidget;

use indexmap::IndexMap;

use crate::container::SectionKind;
use crate::context::AssemblyContext;
use crate::error::Diagnostic;
use crate::handlers::{Handler, scratch};
use crate::metadata::{MetadataKind, PropertyMapping, PropertySpec};
use crate::registry::Registry;
use crate::source::{ClassDescriptor, MemberSource};
use crate::tree::{Document, NodeId};

/// Identifiers of the built-in metadata kinds.
pub mod kinds {
    pub const DIALOG: &str = "dialog";
    pub const DIALOG_FIELD: &str = "dialog-field";
    pub const TEXT_FIELD: &str = "text-field";
    pub const TEXT_AREA: &str = "text-area";
    pub const CHECKBOX: &str = "checkbox";
    pub const NUMBER_FIELD: &str = "number-field";
    pub const HIDDEN: &str = "hidden";
    pub const SELECT: &str = "select";
    pub const OPTION: &str = "option";
    pub const FIELDSET: &str = "fieldset";
    pub const MULTIFIELD: &str = "multifield";
    pub const TABS: &str = "tabs";
    pub const ACCORDION: &str = "accordion";
    pub const TAB: &str = "tab";
    pub const ACCORDION_PANEL: &str = "accordion-panel";
    pub const PLACE: &str = "place";
    pub const ATTRIBUTE: &str = "attribute";
    pub const DATA: &str = "data";
    pub const DEPENDS_ON: &str = "depends-on";
    pub const DEPENDS_ON_REF: &str = "depends-on-ref";
    pub const PROPERTY: &str = "property";
    pub const MULTIPLE: &str = "multiple";
    pub const EXTENDS: &str = "extends";
    pub const IGNORE: &str = "ignore";
    pub const CLASS_MEMBER: &str = "class-member";
    pub const IGNORE_SECTIONS: &str = "ignore-sections";
    pub const RESOURCE_TYPE: &str = "resource-type";
}

/// Attribute and node names written by the assembler.
pub mod attrs {
    pub const SLING_RESOURCE_TYPE: &str = "sling:resourceType";
    pub const JCR_PRIMARY_TYPE: &str = "jcr:primaryType";
    pub const JCR_TITLE: &str = "jcr:title";
    pub const NAME: &str = "name";
    pub const FIELD_LABEL: &str = "fieldLabel";
    pub const FIELD_DESCRIPTION: &str = "fieldDescription";
    pub const COMPOSITE: &str = "composite";
    pub const GRANITE_ID: &str = "granite:id";
    pub const GRANITE_CLASS: &str = "granite:class";
    pub const GRANITE_DATA: &str = "granite:data";
    pub const DEPENDS_ON: &str = "dependsOn";
    pub const DEPENDS_ON_ACTION: &str = "dependsOnAction";
    pub const DEPENDS_ON_REF: &str = "dependsOnRef";
    pub const DEPENDS_ON_REF_TYPE: &str = "dependsOnRefType";
    pub const CONTENT: &str = "content";
    pub const ITEMS: &str = "items";
    pub const FIELD: &str = "field";
}

const FORM: &str = "granite/ui/components/coral/foundation/form";

/// Widget handler for kinds rendered entirely by generic mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainWidget;

impl Handler for PlainWidget {
    fn handle(&self, _: &mut MemberSource<'_>, _: &mut Document, _: NodeId, _: &AssemblyContext<'_>) {}
}

fn mapped(id: &str) -> MetadataKind {
    MetadataKind::new(id).mapped(PropertyMapping::new())
}

fn form(widget: &str) -> String {
    format!("{FORM}/{widget}")
}

/// Register every built-in kind and widget handler.
pub fn install(registry: &mut Registry) {
    registry
        .register_kind(
            mapped(kinds::DIALOG)
                .property(PropertySpec::new("title").rename(attrs::JCR_TITLE))
                .property(PropertySpec::new("helpPath"))
                .property(PropertySpec::new("width"))
                .property(PropertySpec::new("height"))
                .property(PropertySpec::new("extraClientlibs"))
                .property(PropertySpec::new("layout").unmapped()),
        )
        .register_kind(
            mapped(kinds::DIALOG_FIELD)
                .property(PropertySpec::new("name").unmapped())
                .property(PropertySpec::new("label").rename(attrs::FIELD_LABEL))
                .property(PropertySpec::new("description").rename(attrs::FIELD_DESCRIPTION))
                .property(PropertySpec::new("required").sparse(false))
                .property(PropertySpec::new("disabled").sparse(false))
                .property(PropertySpec::new("renderHidden").sparse(false))
                .property(PropertySpec::new("wrapperClass"))
                .property(PropertySpec::new("ranking").unmapped()),
        )
        .register_widget(
            mapped(kinds::TEXT_FIELD)
                .resource_type(form("textfield"))
                .property(PropertySpec::new("emptyText"))
                .property(PropertySpec::new("maxlength"))
                .property(PropertySpec::new("value")),
            PlainWidget,
        )
        .register_widget(
            mapped(kinds::TEXT_AREA)
                .resource_type(form("textarea"))
                .property(PropertySpec::new("emptyText"))
                .property(PropertySpec::new("rows"))
                .property(PropertySpec::new("cols"))
                .property(PropertySpec::new("resize").sparse("none")),
            PlainWidget,
        )
        .register_widget(
            mapped(kinds::CHECKBOX)
                .resource_type(form("checkbox"))
                .property(PropertySpec::new("text"))
                .property(PropertySpec::new("value").sparse("true"))
                .property(PropertySpec::new("uncheckedValue").sparse("false"))
                .property(PropertySpec::new("checked").sparse(false)),
            PlainWidget,
        )
        .register_widget(
            mapped(kinds::NUMBER_FIELD)
                .resource_type(form("numberfield"))
                .property(PropertySpec::new("min"))
                .property(PropertySpec::new("max"))
                .property(PropertySpec::new("step").sparse(1i64))
                .property(PropertySpec::new("value")),
            PlainWidget,
        )
        .register_widget(
            mapped(kinds::HIDDEN)
                .resource_type(form("hidden"))
                .property(PropertySpec::new("value")),
            PlainWidget,
        )
        .register_widget(
            mapped(kinds::SELECT)
                .resource_type(form("select"))
                .property(PropertySpec::new("multiple").sparse(false))
                .property(PropertySpec::new("emptyOption").sparse(false))
                .property(PropertySpec::new("options").unmapped()),
            SelectWidget,
        )
        .register_kind(
            mapped(kinds::OPTION)
                .property(PropertySpec::new("text"))
                .property(PropertySpec::new("value"))
                .property(PropertySpec::new("selected").sparse(false)),
        )
        .register_widget(
            mapped(kinds::FIELDSET)
                .resource_type(form("fieldset"))
                .unnamed()
                .property(PropertySpec::new("title").rename(attrs::JCR_TITLE))
                .property(PropertySpec::new("namePrefix").unmapped())
                .property(PropertySpec::new("namePostfix").unmapped()),
            FieldSetWidget,
        )
        .register_widget(
            mapped(kinds::MULTIFIELD)
                .resource_type(form("multifield"))
                .property(PropertySpec::new("deleteHint").sparse(true))
                .property(PropertySpec::new("typeHint"))
                .property(PropertySpec::new("field").unmapped()),
            MultiFieldWidget,
        )
        .register_widget(
            mapped(kinds::TABS)
                .resource_type("granite/ui/components/coral/foundation/tabs")
                .unnamed()
                .property(PropertySpec::new("maximized").sparse(false))
                .property(PropertySpec::new("tabs").unmapped()),
            ContainerWidget::new(SectionKind::Tab),
        )
        .register_widget(
            mapped(kinds::ACCORDION)
                .resource_type("granite/ui/components/coral/foundation/accordion")
                .unnamed()
                .property(PropertySpec::new("variant"))
                .property(PropertySpec::new("multiple").sparse(false))
                .property(PropertySpec::new("panels").unmapped()),
            ContainerWidget::new(SectionKind::AccordionPanel),
        )
        .register_kind(
            mapped(kinds::TAB)
                .property(PropertySpec::new("title").unmapped())
                .property(PropertySpec::new("icon"))
                .property(PropertySpec::new("margin").sparse(false))
                .property(PropertySpec::new("disabled").sparse(false)),
        )
        .register_kind(
            mapped(kinds::ACCORDION_PANEL)
                .property(PropertySpec::new("title").unmapped())
                .property(PropertySpec::new("icon"))
                .property(PropertySpec::new("disabled").sparse(false))
                .property(PropertySpec::new("active").sparse(false)),
        )
        .register_kind(MetadataKind::new(kinds::PLACE).property(PropertySpec::new("value")))
        .register_kind(
            MetadataKind::new(kinds::ATTRIBUTE)
                .property(PropertySpec::new("id"))
                .property(PropertySpec::new("class"))
                .property(PropertySpec::new("data")),
        )
        .register_kind(
            MetadataKind::new(kinds::DATA)
                .property(PropertySpec::new("name"))
                .property(PropertySpec::new("value")),
        )
        .register_kind(
            MetadataKind::new(kinds::DEPENDS_ON)
                .property(PropertySpec::new("query"))
                .property(PropertySpec::new("action").default_value("visibility")),
        )
        .register_kind(
            MetadataKind::new(kinds::DEPENDS_ON_REF)
                .property(PropertySpec::new("name"))
                .property(PropertySpec::new("type").default_value("auto")),
        )
        .register_kind(
            MetadataKind::new(kinds::PROPERTY)
                .property(PropertySpec::new("name"))
                .property(PropertySpec::new("value")),
        )
        .register_kind(MetadataKind::new(kinds::MULTIPLE))
        .register_kind(
            MetadataKind::new(kinds::EXTENDS)
                .property(PropertySpec::new("class"))
                .property(PropertySpec::new("member")),
        )
        .register_kind(MetadataKind::new(kinds::IGNORE).property(PropertySpec::new("members")))
        .register_kind(
            MetadataKind::new(kinds::CLASS_MEMBER)
                .property(PropertySpec::new("class"))
                .property(PropertySpec::new("member")),
        )
        .register_kind(
            MetadataKind::new(kinds::IGNORE_SECTIONS).property(PropertySpec::new("value")),
        )
        .register_kind(
            MetadataKind::new(kinds::RESOURCE_TYPE).property(PropertySpec::new("value")),
        );
}

/// Recursion depth carried in a member's scratch values.
pub(crate) fn depth_of(source: &MemberSource<'_>) -> usize {
    source
        .value(scratch::DEPTH)
        .and_then(|d| d.parse().ok())
        .unwrap_or(0)
}

/// Hierarchy of the member's value class, plus the scratch values its
/// members render with one level deeper.
///
/// A missing or unknown value class, and recursion past the configured
/// depth, are reported against `kind`.
pub(crate) fn value_class_scope<'r>(
    source: &MemberSource<'_>,
    kind: &str,
    cx: &AssemblyContext<'r>,
) -> Option<(Vec<&'r ClassDescriptor>, IndexMap<String, String>)> {
    let report = |reason: String| {
        cx.report(Diagnostic::instantiation(
            source.declaring_class(),
            Some(&source.member.name),
            kind,
            reason,
        ))
    };

    let Some(value_class) = source.value_class() else {
        report("no value class to render".to_string());
        return None;
    };
    let depth = depth_of(source) + 1;
    if depth > cx.config.max_depth {
        report(format!("nesting deeper than {} levels", cx.config.max_depth));
        return None;
    }
    let hierarchy = match cx.catalog.hierarchy(value_class) {
        Ok(hierarchy) => hierarchy,
        Err(err) => {
            report(err.to_string());
            return None;
        }
    };

    let mut values = source.values().clone();
    values.shift_remove(scratch::WIDGET);
    values.insert(scratch::DEPTH.to_string(), depth.to_string());
    Some((hierarchy, values))
}
