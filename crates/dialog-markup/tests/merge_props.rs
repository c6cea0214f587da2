use std::collections::HashSet;

use dialog_markup::{Document, MergePolicy, is_valid_node_name, merge_values, valid_node_name};
use proptest::prelude::*;

fn list(items: &[String]) -> String {
    format!("[{}]", items.join(","))
}

fn items(list: &str) -> Vec<String> {
    list.trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

proptest! {
    #[test]
    fn list_merge_is_a_set_union(
        existing in prop::collection::vec("[a-z0-9]{1,6}", 0..6),
        incoming in prop::collection::vec("[a-z0-9]{1,6}", 0..6)
    ) {
        let merged = items(&merge_values(&list(&existing), &list(&incoming)));
        let expected: HashSet<&String> = existing.iter().chain(&incoming).collect();
        let actual: HashSet<&String> = merged.iter().collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(merged.len(), expected_len(&existing, &incoming));
    }

    #[test]
    fn list_merge_keeps_existing_items_first(
        existing in prop::collection::hash_set("[a-z]{1,6}", 1..6)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>()),
        incoming in prop::collection::vec("[a-z]{1,6}", 0..6)
    ) {
        let merged = items(&merge_values(&list(&existing), &list(&incoming)));
        prop_assert_eq!(&merged[..existing.len()], &existing[..]);
    }

    #[test]
    fn non_blank_scalars_replace_and_blank_ones_keep(
        existing in "[a-z]{1,8}",
        incoming in "[a-z]{1,8}",
        blank in "[ \t]{0,3}"
    ) {
        prop_assert_eq!(merge_values(&existing, &incoming), incoming.clone());
        prop_assert_eq!(merge_values(&existing, &blank), existing.clone());
        prop_assert_eq!(MergePolicy::Override.apply(Some(&existing), &blank), blank);
    }

    #[test]
    fn coerced_names_are_always_valid(raw in ".{0,16}") {
        let name = valid_node_name(&raw, "item");
        prop_assert!(is_valid_node_name(&name), "{:?} -> {:?}", raw, name);
    }

    #[test]
    fn sibling_names_stay_unique(titles in prop::collection::vec(".{0,10}", 0..12)) {
        let mut doc = Document::new("root");
        let root = doc.root();
        for title in &titles {
            doc.create_child(root, title);
        }
        let names = doc.list_children(root);
        let unique: HashSet<&str> = names.iter().copied().collect();
        prop_assert_eq!(names.len(), titles.len());
        prop_assert_eq!(unique.len(), names.len());
        prop_assert!(names.iter().all(|name| is_valid_node_name(name)));
    }
}

fn expected_len(existing: &[String], incoming: &[String]) -> usize {
    existing.iter().chain(incoming).collect::<HashSet<_>>().len()
}
