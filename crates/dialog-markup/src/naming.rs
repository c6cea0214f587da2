/// Name used when a requested node name cannot be coerced into a valid one.
pub const FALLBACK_NODE_NAME: &str = "item";

/// Returns `true` for XML-name shaped node names.
///
/// Letters, digits, `_`, `-`, `.` and `:` are accepted; the first character
/// must be a letter or `_`. Path separators are never valid.
pub fn is_valid_node_name(s: &str) -> bool {
    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

/// Coerce an arbitrary title into a node name.
///
/// Valid names are returned unchanged. Anything else is split into ASCII
/// alphanumeric words and joined as lowerCamelCase (`"Main Tab"` becomes
/// `mainTab`). Input that still does not form a valid name yields `fallback`.
pub fn valid_node_name(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if is_valid_node_name(trimmed) {
        return trimmed.to_string();
    }

    let mut out = String::with_capacity(trimmed.len());
    for word in trimmed
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        if out.is_empty() {
            out.push_str(&word.to_ascii_lowercase());
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(&chars.as_str().to_ascii_lowercase());
        }
    }

    if is_valid_node_name(&out) {
        out
    } else {
        fallback.to_string()
    }
}

/// First of `base`, `base1`, `base2`, ... for which `taken` returns `false`.
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1usize..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::{FALLBACK_NODE_NAME, is_valid_node_name, unique_name, valid_node_name};

    #[test]
    fn accepts_xml_shaped_names() {
        assert!(is_valid_node_name("jcr:root"));
        assert!(is_valid_node_name("_hidden"));
        assert!(is_valid_node_name("field-1.x"));
        assert!(!is_valid_node_name(""));
        assert!(!is_valid_node_name("1st"));
        assert!(!is_valid_node_name("a/b"));
        assert!(!is_valid_node_name("two words"));
    }

    #[test]
    fn titles_become_lower_camel_case() {
        assert_eq!(valid_node_name("Main Tab", FALLBACK_NODE_NAME), "mainTab");
        assert_eq!(valid_node_name("URL settings!", FALLBACK_NODE_NAME), "urlSettings");
        assert_eq!(valid_node_name("items", FALLBACK_NODE_NAME), "items");
    }

    #[test]
    fn unusable_titles_fall_back() {
        assert_eq!(valid_node_name("", FALLBACK_NODE_NAME), "item");
        assert_eq!(valid_node_name("***", FALLBACK_NODE_NAME), "item");
        assert_eq!(valid_node_name("42 things", "section"), "section");
    }

    #[test]
    fn unique_name_appends_counter() {
        let taken = ["a", "a1"];
        assert_eq!(unique_name("a", |n| taken.contains(&n)), "a2");
        assert_eq!(unique_name("b", |n| taken.contains(&n)), "b");
    }
}
