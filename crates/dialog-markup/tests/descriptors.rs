use dialog_markup::{
    Assembler, AssemblyConfig, ClassCatalog, CollectingSink, Document, Registry, load_descriptors,
    to_kdl, to_xml,
};
use kdl::KdlDocument;
use pretty_assertions::assert_eq;

const TEASER: &str = include_str!("fixtures/teaser.kdl");

fn load() -> (Registry, ClassCatalog, AssemblyConfig) {
    let config = AssemblyConfig::from_kdl(TEASER).unwrap();
    let mut registry = Registry::with_builtins();
    let mut catalog = ClassCatalog::new();
    load_descriptors(TEASER)
        .unwrap()
        .install(&mut registry, &mut catalog);
    (registry, catalog, config)
}

fn tab_items<'d>(doc: &'d Document, tab: &str) -> Vec<&'d str> {
    let path = format!("content/items/tabs/items/{tab}/items");
    doc.list_children(doc.get(doc.root(), &path).unwrap())
}

#[test]
fn descriptor_file_configures_and_declares_everything() {
    let (registry, catalog, config) = load();

    assert_eq!(config.untitled_section, "General");
    assert_eq!(config.max_depth, 4);
    assert!(registry.widget_handler("rich-text").is_some());
    assert!(registry.widget_handler("link").is_some());
    let names: Vec<&str> = catalog.components().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Teaser", "Card"]);
}

#[test]
fn teaser_assembles_from_descriptors() {
    let (registry, catalog, config) = load();
    let sink = CollectingSink::new();
    let doc = Assembler::new(&registry, &config, &sink)
        .assemble(&catalog, "Teaser")
        .unwrap();
    let root = doc.root();

    assert_eq!(doc.attribute(root, "jcr:title"), Some("Teaser"));
    assert_eq!(
        doc.attribute(root, "helpPath"),
        Some("https://acme.example/help/teaser")
    );
    assert_eq!(tab_items(&doc, "Content"), vec!["heading", "body"]);
    assert_eq!(tab_items(&doc, "Link"), vec!["cta", "variant"]);

    let body = doc.get(root, "content/items/tabs/items/Content/items/body").unwrap();
    assert_eq!(doc.attribute(body, "sling:resourceType"), Some("acme/components/richtext"));
    assert_eq!(doc.attribute(body, "toolbar"), Some("basic"));
    assert_eq!(doc.attribute(body, "name"), Some("./body"));
    assert!(!doc.has_attribute(body, "inline"));
    assert!(!doc.has_attribute(body, "styles"));

    let cta = doc.get(root, "content/items/tabs/items/Link/items/cta").unwrap();
    let link = doc.child(cta, "link").unwrap();
    assert_eq!(doc.attribute(link, "url"), Some("/content/home"));
    assert_eq!(doc.attribute(link, "target"), Some("_blank"));
    assert_eq!(doc.attribute(cta, "fieldLabel"), Some("Call to action"));

    let options = doc
        .get(root, "content/items/tabs/items/Link/items/variant/items")
        .unwrap();
    assert_eq!(doc.list_children(options), vec!["light", "dark"]);
    let dark = doc.child(options, "dark").unwrap();
    assert_eq!(doc.attribute(dark, "text"), Some("Dark"));
    assert!(sink.is_empty(), "{:?}", sink.diagnostics());
}

#[test]
fn subclass_drops_ignored_sections_and_renders_to_both_formats() {
    let (registry, catalog, config) = load();
    let sink = CollectingSink::new();
    let results = Assembler::new(&registry, &config, &sink).assemble_all(&catalog);
    assert_eq!(results.len(), 2);

    let (name, card) = &results[1];
    assert_eq!(name, "Card");
    let card = card.as_ref().unwrap();
    let tabs = card.get(card.root(), "content/items/tabs/items").unwrap();
    assert_eq!(card.list_children(tabs), vec!["Content"]);
    assert!(sink.is_empty(), "{:?}", sink.diagnostics());

    let xml = to_xml(card, &config).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("xmlns:acme=\"http://acme.example/jcr/1.0\""));
    assert!(xml.contains("jcr:title=\"Card\""));
    assert!(!xml.contains("<Link"));

    let kdl = to_kdl(card).unwrap();
    let parsed: KdlDocument = kdl.parse().unwrap();
    let root = parsed.get("jcr:root").unwrap();
    assert_eq!(
        root.get("jcr:title").and_then(|value| value.as_string()),
        Some("Card")
    );
}
