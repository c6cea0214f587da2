use dialog_markup::{
    Assembler, AssemblyConfig, ClassCatalog, ClassDescriptor, CollectingSink, Document,
    MemberDescriptor, MetadataObject, Registry, Value, to_xml,
};
use pretty_assertions::assert_eq;

fn field(name: &str) -> MemberDescriptor {
    MemberDescriptor::new(name)
        .meta(MetadataObject::new("text-field"))
        .meta(MetadataObject::new("dialog-field").with("label", name.to_uppercase()))
}

fn placed(name: &str, section: &str) -> MemberDescriptor {
    field(name).meta(MetadataObject::new("place").with("value", section))
}

fn section(class: &str, title: &str) -> ClassDescriptor {
    ClassDescriptor::new(format!("{class}.{title}")).meta(MetadataObject::new("tab").with("title", title))
}

fn base() -> ClassDescriptor {
    ClassDescriptor::new("Base")
        .meta(MetadataObject::new("dialog").with("title", "Base"))
        .nested(section("Base", "Main").member(field("f1")))
}

fn assemble(catalog: &ClassCatalog, class: &str) -> (Document, CollectingSink) {
    let registry = Registry::with_builtins();
    let config = AssemblyConfig::default();
    let sink = CollectingSink::new();
    let doc = Assembler::new(&registry, &config, &sink)
        .assemble(catalog, class)
        .unwrap();
    (doc, sink)
}

fn section_fields<'d>(doc: &'d Document, title: &str) -> Vec<&'d str> {
    let path = format!("content/items/tabs/items/{title}/items");
    let items = doc.get(doc.root(), &path).unwrap();
    doc.list_children(items)
}

// Section order is decided for the whole registry: "Extra" collides with no
// inherited title, so it is appended and "Main" stays the default section.
#[test]
fn appended_section_receives_placed_fields_and_default_stays_first() {
    let catalog = ClassCatalog::new().with(base()).with(
        ClassDescriptor::new("Child")
            .extends("Base")
            .nested(section("Child", "Extra"))
            .member(placed("f2", "Extra"))
            .member(field("f3")),
    );
    let (doc, sink) = assemble(&catalog, "Child");

    let tabs = doc.get(doc.root(), "content/items/tabs/items").unwrap();
    assert_eq!(doc.list_children(tabs), vec!["Main", "Extra"]);
    assert_eq!(section_fields(&doc, "Main"), vec!["f1", "f3"]);
    assert_eq!(section_fields(&doc, "Extra"), vec!["f2"]);
    assert!(sink.is_empty(), "{:?}", sink.diagnostics());
}

// Any title shared with the inherited registry puts the child's own order
// first, with the ancestor remainder after it.
#[test]
fn redeclaring_an_inherited_section_puts_child_order_first() {
    let catalog = ClassCatalog::new().with(base()).with(
        ClassDescriptor::new("Child")
            .extends("Base")
            .meta(MetadataObject::new("tabs").with(
                "tabs",
                Value::List(vec![Value::from("Extra"), Value::from("Main")]),
            ))
            .member(placed("f2", "Extra"))
            .member(field("f3")),
    );
    let (doc, sink) = assemble(&catalog, "Child");

    let tabs = doc.get(doc.root(), "content/items/tabs/items").unwrap();
    assert_eq!(doc.list_children(tabs), vec!["Extra", "Main"]);
    assert_eq!(section_fields(&doc, "Extra"), vec!["f2", "f3"]);
    assert_eq!(section_fields(&doc, "Main"), vec!["f1"]);

    let extra = doc.get(tabs, "Extra").unwrap();
    assert_eq!(doc.attribute(extra, "jcr:title"), Some("Extra"));
    assert_eq!(
        doc.attribute(extra, "sling:resourceType"),
        Some("granite/ui/components/coral/foundation/container")
    );
    let f3 = doc.get(extra, "items/f3").unwrap();
    assert_eq!(doc.attribute(f3, "name"), Some("./f3"));
    assert_eq!(doc.attribute(f3, "fieldLabel"), Some("F3"));
    assert!(sink.is_empty(), "{:?}", sink.diagnostics());
}

#[test]
fn rendering_is_idempotent() {
    let catalog = ClassCatalog::new().with(base()).with(
        ClassDescriptor::new("Child")
            .extends("Base")
            .meta(MetadataObject::new("dialog").with("title", "Child"))
            .nested(section("Child", "Extra"))
            .member(placed("f2", "Extra"))
            .member(placed("lost", "Nope")),
    );
    let config = AssemblyConfig::default();
    let (first, first_sink) = assemble(&catalog, "Child");
    let (second, second_sink) = assemble(&catalog, "Child");

    assert_eq!(to_xml(&first, &config).unwrap(), to_xml(&second, &config).unwrap());
    assert_eq!(first_sink.diagnostics(), second_sink.diagnostics());
    assert_eq!(doc_title(&first), Some("Child"));
}

fn doc_title(doc: &Document) -> Option<&str> {
    doc.attribute(doc.root(), "jcr:title")
}

#[test]
fn classes_assemble_in_parallel_with_a_shared_sink() {
    let mut catalog = ClassCatalog::new().with(base());
    for n in 0..8 {
        catalog.insert(
            ClassDescriptor::new(format!("Child{n}"))
                .extends("Base")
                .meta(MetadataObject::new("dialog").with("title", format!("Child {n}")))
                .member(placed("orphan", "Nope")),
        );
    }
    let registry = Registry::with_builtins();
    let config = AssemblyConfig::default();
    let sink = CollectingSink::new();
    let assembler = Assembler::new(&registry, &config, &sink);

    let xml: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let (catalog, config) = (&catalog, &config);
                scope.spawn(move || {
                    let doc = assembler.assemble(catalog, &format!("Child{n}")).unwrap();
                    to_xml(&doc, config).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(xml.len(), 8);
    assert!(xml[3].contains("jcr:title=\"Child 3\""));
    assert_eq!(sink.len(), 8);
}

#[test]
fn xml_output_for_a_small_dialog() {
    let catalog = ClassCatalog::new().with(
        ClassDescriptor::new("Teaser")
            .meta(MetadataObject::new("dialog").with("title", "Teaser"))
            .member(
                MemberDescriptor::new("heading")
                    .meta(MetadataObject::new("text-field"))
                    .meta(
                        MetadataObject::new("dialog-field")
                            .with("label", "Heading")
                            .with("required", true),
                    ),
            ),
    );
    let (doc, _) = assemble(&catalog, "Teaser");
    let mut config = AssemblyConfig::default();
    config.namespaces.retain(|(prefix, _)| prefix == "jcr");
    let xml = to_xml(&doc, &config).unwrap();

    let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<jcr:root xmlns:jcr="http://www.jcp.org/jcr/1.0" jcr:primaryType="nt:unstructured" sling:resourceType="cq/gui/components/authoring/dialog" jcr:title="Teaser">
    <content jcr:primaryType="nt:unstructured" sling:resourceType="granite/ui/components/coral/foundation/container">
        <items jcr:primaryType="nt:unstructured">
            <columns jcr:primaryType="nt:unstructured" sling:resourceType="granite/ui/components/coral/foundation/fixedcolumns">
                <items jcr:primaryType="nt:unstructured">
                    <column jcr:primaryType="nt:unstructured" sling:resourceType="granite/ui/components/coral/foundation/container">
                        <items jcr:primaryType="nt:unstructured">
                            <heading jcr:primaryType="nt:unstructured" sling:resourceType="granite/ui/components/coral/foundation/form/textfield" fieldLabel="Heading" required="{Boolean}true" name="./heading"/>
                        </items>
                    </column>
                </items>
            </columns>
        </items>
    </content>
</jcr:root>
"#;
    assert_eq!(xml, expected);
}
