//! Tab and accordion section resolution across a class hierarchy.
//!
//! Sections are declared by nested section classes and by inline lists on a
//! class-level container declaration. Declarations are merged by title into
//! one ordered registry, members are distributed over it and every section is
//! rendered exactly once.

use indexmap::IndexMap;

use crate::collector::{by_ranking, collect_members};
use crate::context::AssemblyContext;
use crate::error::Diagnostic;
use crate::handlers::render_member;
use crate::mapper::PropertyMapper;
use crate::metadata::MetadataObject;
use crate::source::{ClassDescriptor, MemberDescriptor, MetadataSource};
use crate::tree::{Document, NodeId};
use crate::value::Value;
use crate::widgets::{attrs, kinds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Tab,
    AccordionPanel,
}

impl SectionKind {
    /// Kind of the metadata describing one section.
    pub fn section_kind(self) -> &'static str {
        match self {
            SectionKind::Tab => kinds::TAB,
            SectionKind::AccordionPanel => kinds::ACCORDION_PANEL,
        }
    }

    /// Kind of the class-level container declaration.
    pub fn container_kind(self) -> &'static str {
        match self {
            SectionKind::Tab => kinds::TABS,
            SectionKind::AccordionPanel => kinds::ACCORDION,
        }
    }

    /// Property of the container declaration listing inline sections.
    pub fn list_property(self) -> &'static str {
        match self {
            SectionKind::Tab => "tabs",
            SectionKind::AccordionPanel => "panels",
        }
    }

    /// Whether `class` declares any section of this kind, nested or inline.
    pub fn declared_by(self, class: &ClassDescriptor) -> bool {
        class.has_metadata(self.container_kind())
            || class
                .nested
                .iter()
                .any(|nested| nested.has_metadata(self.section_kind()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    Declared,
    /// Merged with `n` later declarations of the same title.
    Merged(usize),
    Consumed,
}

#[derive(Debug, Clone)]
pub struct SectionRecord<'r> {
    pub title: String,
    /// Rendering properties of the section itself; the latest declaration
    /// carrying any wins.
    pub attributes: Option<MetadataObject>,
    pub members: IndexMap<String, &'r MemberDescriptor>,
    pub state: SectionState,
}

impl<'r> SectionRecord<'r> {
    fn new(title: String, attributes: Option<MetadataObject>) -> Self {
        Self {
            title,
            attributes,
            members: IndexMap::new(),
            state: SectionState::Declared,
        }
    }

    fn absorb(&mut self, later: SectionRecord<'r>) {
        if later.attributes.is_some() {
            self.attributes = later.attributes;
        }
        for (name, member) in later.members {
            self.members.insert(name, member);
        }
        self.state = match self.state {
            SectionState::Declared => SectionState::Merged(1),
            SectionState::Merged(n) => SectionState::Merged(n + 1),
            SectionState::Consumed => SectionState::Consumed,
        };
    }
}

/// A member whose placement names no section.
#[derive(Debug, Clone, PartialEq)]
pub struct Orphan<'r> {
    pub member: &'r MemberDescriptor,
    pub reference: String,
}

/// Sections in final order plus the members that could not be placed.
#[derive(Debug, Clone)]
pub struct Resolution<'r> {
    records: Vec<SectionRecord<'r>>,
    order: Vec<SectionId>,
    pub orphans: Vec<Orphan<'r>>,
}

impl<'r> Resolution<'r> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            order: Vec::new(),
            orphans: Vec::new(),
        }
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionRecord<'r>> {
        self.order.iter().map(|id| &self.records[id.0])
    }

    pub fn titles(&self) -> Vec<&str> {
        self.sections().map(|s| s.title.as_str()).collect()
    }

    pub fn section(&self, title: &str) -> Option<&SectionRecord<'r>> {
        self.find(title).map(|id| &self.records[id.0])
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn find(&self, title: &str) -> Option<SectionId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.records[id.0].title == title)
    }

    fn push(&mut self, record: SectionRecord<'r>) -> SectionId {
        let id = SectionId(self.records.len());
        self.records.push(record);
        self.order.push(id);
        id
    }

    /// Merge one class's own sections into the registry.
    ///
    /// When any own title is already registered the class's order wins: its
    /// sections come first and the remaining registered ones follow.
    /// Otherwise the own sections are appended.
    fn merge_class(&mut self, own: Vec<SectionRecord<'r>>) {
        let overrides = own.iter().any(|record| self.find(&record.title).is_some());
        if !overrides {
            for record in own {
                match self.find(&record.title) {
                    Some(id) => self.records[id.0].absorb(record),
                    None => {
                        self.push(record);
                    }
                }
            }
            return;
        }

        let mut reordered: Vec<SectionId> = Vec::with_capacity(self.order.len() + own.len());
        for record in own {
            let existing = reordered
                .iter()
                .copied()
                .find(|id| self.records[id.0].title == record.title)
                .or_else(|| self.find(&record.title));
            match existing {
                Some(id) => {
                    self.records[id.0].absorb(record);
                    if !reordered.contains(&id) {
                        reordered.push(id);
                    }
                }
                None => {
                    let id = SectionId(self.records.len());
                    self.records.push(record);
                    reordered.push(id);
                }
            }
        }
        for id in &self.order {
            if !reordered.contains(id) {
                reordered.push(*id);
            }
        }
        self.order = reordered;
    }
}

/// Sections declared directly by `class`, in declaration order.
fn own_sections<'r>(class: &'r ClassDescriptor, kind: SectionKind) -> Vec<SectionRecord<'r>> {
    let mut own: Vec<SectionRecord<'r>> = Vec::new();
    let mut add = |record: SectionRecord<'r>| match own.iter_mut().find(|r| r.title == record.title) {
        Some(existing) => existing.absorb(record),
        None => own.push(record),
    };

    for nested in &class.nested {
        let Some(section) = nested.metadata_of(kind.section_kind()) else {
            continue;
        };
        let title = section.get_str("title").unwrap_or(&nested.name).to_string();
        let mut record = SectionRecord::new(title, Some(section.clone()));
        for member in nested.members.iter().filter(|m| !m.metadata.is_empty()) {
            record.members.insert(member.name.clone(), member);
        }
        add(record);
    }

    if let Some(container) = class.metadata_of(kind.container_kind()) {
        let inline = container
            .get_list(kind.list_property())
            .unwrap_or_default()
            .iter();
        for entry in inline {
            let (title, attributes) = match entry {
                Value::String(title) => (title.clone(), None),
                Value::Object(object) => match object.get_str("title") {
                    Some(title) => (title.to_string(), Some(object.clone())),
                    None => continue,
                },
                _ => continue,
            };
            add(SectionRecord::new(title, attributes));
        }
    }

    own
}

/// Placement reference of a member, if any.
pub fn placement(member: &MemberDescriptor) -> Option<&str> {
    member
        .metadata_of(kinds::PLACE)
        .and_then(|place| place.get_str("value"))
        .map(str::trim)
        .filter(|title| !title.is_empty())
}

/// Build the section registry for `hierarchy` and distribute `members`.
///
/// `members` are the members not consumed by nested section classes. An
/// empty registry with members to place gets an untitled section and an
/// `InvalidContainer` diagnostic; members naming a missing section are
/// reported once each and left out.
pub fn resolve_container<'r>(
    hierarchy: &[&'r ClassDescriptor],
    kind: SectionKind,
    members: &[&'r MemberDescriptor],
    cx: &AssemblyContext<'_>,
) -> Resolution<'r> {
    let mut resolution = Resolution::new();
    for &class in hierarchy {
        let own = own_sections(class, kind);
        if !own.is_empty() {
            tracing::debug!(
                class = %class.name,
                sections = ?own.iter().map(|s| s.title.as_str()).collect::<Vec<_>>(),
                "collected sections"
            );
        }
        resolution.merge_class(own);
    }

    let class_name = hierarchy.last().map_or(cx.class_name, |c| c.name.as_str());
    if resolution.is_empty() && !members.is_empty() {
        cx.report(Diagnostic::invalid_container(class_name));
        resolution.push(SectionRecord::new(cx.config.untitled_section.clone(), None));
    }

    let populated: Vec<bool> = resolution
        .records
        .iter()
        .map(|record| !record.members.is_empty())
        .collect();
    let mut appended = vec![false; resolution.records.len()];

    for &member in members {
        let target = match placement(member) {
            Some(reference) => match resolution.find(reference) {
                Some(id) => id,
                None => {
                    cx.report(Diagnostic::invalid_placement(
                        &member.declaring_class,
                        &member.name,
                        reference,
                    ));
                    resolution.orphans.push(Orphan {
                        member,
                        reference: reference.to_string(),
                    });
                    continue;
                }
            },
            None => match resolution.order.first() {
                Some(first) => *first,
                None => continue,
            },
        };
        resolution.records[target.0]
            .members
            .insert(member.name.clone(), member);
        appended[target.0] = true;
    }

    for (idx, record) in resolution.records.iter_mut().enumerate() {
        if populated[idx] && appended[idx] {
            record.members.sort_by(|_, a, _, b| by_ranking(a, b));
        }
    }

    resolution
}

/// Render every section of `resolution` under `holder`.
///
/// Titles listed by the current class's own `ignore-sections` declaration are
/// skipped. `values` seeds the scratch values of every rendered member.
pub fn render_container<'r>(
    resolution: &mut Resolution<'r>,
    current: &'r ClassDescriptor,
    values: &IndexMap<String, String>,
    doc: &mut Document,
    holder: NodeId,
    cx: &AssemblyContext<'r>,
) {
    let ignored: Vec<&str> = current
        .metadata_of(kinds::IGNORE_SECTIONS)
        .and_then(|ignore| ignore.get_list("value"))
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .collect();

    let order = resolution.order.clone();
    for id in order {
        let record = &mut resolution.records[id.0];
        if record.state == SectionState::Consumed {
            continue;
        }
        record.state = SectionState::Consumed;
        if ignored.contains(&record.title.as_str()) {
            tracing::debug!(section = %record.title, "section ignored");
            continue;
        }

        let section = doc.create_child(holder, &record.title);
        doc.set_attribute(section, attrs::JCR_TITLE, record.title.as_str());
        doc.set_attribute(
            section,
            attrs::SLING_RESOURCE_TYPE,
            cx.config.resource_types.container.as_str(),
        );
        if let Some(attributes) = &record.attributes {
            PropertyMapper::new(cx, &current.name).map(attributes, doc, section, &["title"]);
        }

        let items = doc.get_or_create_child(section, attrs::ITEMS);
        for member in record.members.values().copied() {
            render_member(member, &current.name, values.clone(), doc, items, cx);
        }
    }
}

/// Resolve and render the sections of `hierarchy` under `holder`.
pub fn render_sections<'r>(
    hierarchy: &[&'r ClassDescriptor],
    kind: SectionKind,
    values: &IndexMap<String, String>,
    doc: &mut Document,
    holder: NodeId,
    cx: &AssemblyContext<'r>,
) {
    let Some(current) = hierarchy.last().copied() else {
        return;
    };
    let members = collect_members(hierarchy);
    let mut resolution = resolve_container(hierarchy, kind, &members, cx);
    render_container(&mut resolution, current, values, doc, holder, cx);
}

#[cfg(test)]
mod tests {
    use super::{SectionKind, SectionState, resolve_container};
    use crate::collector::collect_members;
    use crate::config::AssemblyConfig;
    use crate::context::AssemblyContext;
    use crate::error::{CollectingSink, DiagnosticKind};
    use crate::metadata::MetadataObject;
    use crate::registry::Registry;
    use crate::source::{ClassCatalog, ClassDescriptor, MemberDescriptor};
    use crate::value::Value;

    fn tabs(titles: &[&str]) -> MetadataObject {
        let entries: Vec<Value> = titles
            .iter()
            .map(|t| Value::from(MetadataObject::new("tab").with("title", *t)))
            .collect();
        MetadataObject::new("tabs").with("tabs", Value::List(entries))
    }

    fn field(name: &str) -> MemberDescriptor {
        MemberDescriptor::new(name).meta(MetadataObject::new("text-field"))
    }

    fn placed(name: &str, title: &str) -> MemberDescriptor {
        field(name).meta(MetadataObject::new("place").with("value", title))
    }

    #[test]
    fn colliding_titles_put_own_order_first() {
        let catalog = ClassCatalog::new()
            .with(ClassDescriptor::new("Base").meta(tabs(&["A", "B"])))
            .with(
                ClassDescriptor::new("Child")
                    .extends("Base")
                    .meta(tabs(&["B", "C"])),
            );
        let registry = Registry::with_builtins();
        let config = AssemblyConfig::default();
        let sink = CollectingSink::new();
        let cx = AssemblyContext::new(&registry, &config, &catalog, &sink, "Child");

        let hierarchy = catalog.hierarchy("Child").unwrap();
        let resolution = resolve_container(&hierarchy, SectionKind::Tab, &[], &cx);
        assert_eq!(resolution.titles(), vec!["B", "C", "A"]);
        assert_eq!(resolution.section("B").unwrap().state, SectionState::Merged(1));
        assert!(sink.is_empty());
    }

    #[test]
    fn nested_sections_carry_their_members_and_default_placement_is_first() {
        let catalog = ClassCatalog::new().with(
            ClassDescriptor::new("Hero")
                .nested(
                    ClassDescriptor::new("Hero.Main")
                        .meta(MetadataObject::new("tab").with("title", "Main"))
                        .member(field("inner")),
                )
                .meta(tabs(&["Style"]))
                .member(field("loose"))
                .member(placed("styled", "Style"))
                .member(placed("lost", "Nope")),
        );
        let registry = Registry::with_builtins();
        let config = AssemblyConfig::default();
        let sink = CollectingSink::new();
        let cx = AssemblyContext::new(&registry, &config, &catalog, &sink, "Hero");

        let hierarchy = catalog.hierarchy("Hero").unwrap();
        let members = collect_members(&hierarchy);
        let resolution = resolve_container(&hierarchy, SectionKind::Tab, &members, &cx);

        assert_eq!(resolution.titles(), vec!["Main", "Style"]);
        let main: Vec<&str> = resolution.section("Main").unwrap().members.keys().map(String::as_str).collect();
        assert_eq!(main, vec!["inner", "loose"]);
        let style: Vec<&str> = resolution.section("Style").unwrap().members.keys().map(String::as_str).collect();
        assert_eq!(style, vec!["styled"]);

        assert_eq!(resolution.orphans.len(), 1);
        let diagnostics = sink.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].kind,
            DiagnosticKind::InvalidPlacement {
                reference: "Nope".to_string()
            }
        );
    }

    #[test]
    fn appending_to_a_populated_section_resorts_by_ranking() {
        let ranked = |name: &str, rank: i64| {
            field(name).meta(MetadataObject::new("dialog-field").with("ranking", rank))
        };
        let catalog = ClassCatalog::new().with(
            ClassDescriptor::new("Hero")
                .nested(
                    ClassDescriptor::new("Hero.Main")
                        .meta(MetadataObject::new("tab").with("title", "Main"))
                        .member(field("late"))
                        .member(ranked("second", 2)),
                )
                .member(ranked("first", 1)),
        );
        let registry = Registry::with_builtins();
        let config = AssemblyConfig::default();
        let sink = CollectingSink::new();
        let cx = AssemblyContext::new(&registry, &config, &catalog, &sink, "Hero");

        let hierarchy = catalog.hierarchy("Hero").unwrap();
        let members = collect_members(&hierarchy);
        let resolution = resolve_container(&hierarchy, SectionKind::Tab, &members, &cx);
        let main: Vec<&str> = resolution.section("Main").unwrap().members.keys().map(String::as_str).collect();
        assert_eq!(main, vec!["first", "second", "late"]);
    }

    #[test]
    fn missing_sections_synthesize_untitled() {
        let catalog = ClassCatalog::new().with(ClassDescriptor::new("Bare").member(field("only")));
        let registry = Registry::with_builtins();
        let config = AssemblyConfig::default();
        let sink = CollectingSink::new();
        let cx = AssemblyContext::new(&registry, &config, &catalog, &sink, "Bare");

        let hierarchy = catalog.hierarchy("Bare").unwrap();
        let members = collect_members(&hierarchy);
        let resolution = resolve_container(&hierarchy, SectionKind::Tab, &members, &cx);
        assert_eq!(resolution.titles(), vec!["Untitled"]);
        assert_eq!(resolution.section("Untitled").unwrap().members.len(), 1);
        assert!(matches!(
            sink.diagnostics()[0].kind,
            DiagnosticKind::InvalidContainer { .. }
        ));
    }
}
