#![allow(dead_code)]

use dialog_markup::{
    Assembler, AssemblyConfig, ClassCatalog, CollectingSink, Component, MetadataSource, Registry,
    Value,
};
use pretty_assertions::assert_eq;

#[derive(Component)]
#[meta("tab", title = "Main")]
struct HeroMain {
    #[meta("text-field", emptyText = "Title")]
    #[meta("dialog-field", label = "Title", required = true)]
    title: String,
}

#[derive(Component)]
#[component(name = "acme.Link")]
struct Link {
    #[meta("text-field")]
    url: String,
    #[meta("text-field", emptyText = "Link text")]
    #[component(rename = "text")]
    label: String,
}

#[derive(Component)]
#[meta("dialog", title = "Base")]
struct BaseComponent {
    #[meta("hidden", value = "base")]
    marker: String,
}

#[derive(Component)]
#[component(extends = BaseComponent, nested(HeroMain))]
#[meta("dialog", title = "Hero", width = 800)]
#[meta("tabs", tabs = [tab(title = "Links", disabled = false)])]
struct Hero {
    #[component(value_class = Link)]
    #[meta("multifield")]
    #[meta("dialog-field", label = "Links")]
    #[meta("place", value = "Links")]
    links: Vec<Link>,
    #[meta("number-field", min = -5, step = 1)]
    #[meta("dialog-field", ranking = 1)]
    offset: i64,
    #[meta("select", options = [option(text = "Left", value = "left"), option(text = "Right", value = "right")])]
    r#align: String,
    #[component(skip)]
    cache: Option<String>,
    untouched: bool,
}

#[derive(Component)]
#[meta("dialog")]
struct Empty;

#[test]
fn class_names_default_to_the_struct_name() {
    assert_eq!(Hero::class_name(), "Hero");
    assert_eq!(Link::class_name(), "acme.Link");
    assert_eq!(Empty::class_name(), "Empty");
}

#[test]
fn descriptors_follow_the_attributes() {
    let hero = Hero::class_descriptor();
    assert_eq!(hero.extends.as_deref(), Some("BaseComponent"));
    let names: Vec<&str> = hero.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["links", "offset", "align", "untouched"]);

    let links = hero.find_member("links").unwrap();
    assert_eq!(links.value_class.as_deref(), Some("acme.Link"));
    assert_eq!(links.declaring_class, "Hero");

    let offset = hero.find_member("offset").unwrap();
    let number = offset.metadata_of("number-field").unwrap();
    assert_eq!(number.get("min"), Some(&Value::Int(-5)));

    let tabs = hero.metadata_of("tabs").unwrap().get_list("tabs").unwrap();
    let links_tab = tabs[0].as_object().unwrap();
    assert!(links_tab.is("tab"));
    assert_eq!(links_tab.get_str("title"), Some("Links"));
    assert_eq!(links_tab.get_bool("disabled"), Some(false));

    assert_eq!(hero.nested.len(), 1);
    assert_eq!(hero.nested[0].name, "HeroMain");

    let link = Link::class_descriptor();
    assert!(link.find_member("text").is_some());
    assert!(link.find_member("label").is_none());
}

#[test]
fn register_pulls_in_every_referenced_class() {
    let mut catalog = ClassCatalog::new();
    Hero::register(&mut catalog);
    Empty::register(&mut catalog);
    Hero::register(&mut catalog);

    for name in ["Hero", "BaseComponent", "HeroMain", "acme.Link", "Empty"] {
        assert!(catalog.contains(name), "{name} missing");
    }
    assert_eq!(catalog.len(), 5);
}

#[test]
fn derived_component_assembles() {
    let mut catalog = ClassCatalog::new();
    Hero::register(&mut catalog);
    let registry = Registry::with_builtins();
    let config = AssemblyConfig::default();
    let sink = CollectingSink::new();
    let doc = Assembler::new(&registry, &config, &sink)
        .assemble(&catalog, Hero::class_name())
        .unwrap();
    let root = doc.root();

    assert_eq!(doc.attribute(root, "jcr:title"), Some("Hero"));
    assert_eq!(doc.attribute(root, "width"), Some("{Long}800"));

    let tabs = doc.get(root, "content/items/tabs/items").unwrap();
    assert_eq!(doc.list_children(tabs), vec!["Main", "Links"]);
    let main = doc.get(tabs, "Main/items").unwrap();
    assert_eq!(doc.list_children(main), vec!["offset", "title", "marker", "align"]);

    let offset = doc.child(main, "offset").unwrap();
    assert_eq!(doc.attribute(offset, "min"), Some("{Long}-5"));
    assert!(!doc.has_attribute(offset, "step"));

    let align = doc.get(main, "align/items").unwrap();
    assert_eq!(doc.list_children(align), vec!["left", "right"]);

    let links = doc.get(tabs, "Links/items/links").unwrap();
    assert_eq!(doc.attribute(links, "composite"), Some("{Boolean}true"));
    assert!(!doc.has_attribute(links, "name"));
    let field = doc.child(links, "field").unwrap();
    assert_eq!(doc.attribute(field, "name"), Some("./links"));
    let items = doc.child(field, "items").unwrap();
    assert_eq!(doc.list_children(items), vec!["url", "text"]);
    let text = doc.child(items, "text").unwrap();
    assert_eq!(doc.attribute(text, "name"), Some("./text"));
    assert_eq!(doc.attribute(text, "emptyText"), Some("Link text"));

    assert!(sink.is_empty(), "{:?}", sink.diagnostics());
}
