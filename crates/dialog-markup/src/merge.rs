/// How a written attribute combines with a value already on the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Bracketed lists are unioned; any other value replaces the existing one
    /// only when it is non-blank.
    #[default]
    Union,
    /// Strict overwrite.
    Override,
}

impl MergePolicy {
    pub fn apply(self, existing: Option<&str>, incoming: &str) -> String {
        match (self, existing) {
            (MergePolicy::Override, _) | (MergePolicy::Union, None) => incoming.to_string(),
            (MergePolicy::Union, Some(existing)) => merge_values(existing, incoming),
        }
    }
}

/// The default conflict merge.
///
/// Both values bracketed lists with the same literal prefix: existing items
/// first, then unseen incoming items. Otherwise a blank incoming value keeps
/// the existing one.
pub fn merge_values(existing: &str, incoming: &str) -> String {
    if let (Some(old), Some(new)) = (parse_list(existing), parse_list(incoming))
        && old.prefix == new.prefix
    {
        let mut items: Vec<&str> = Vec::with_capacity(old.items.len() + new.items.len());
        for item in old.items.into_iter().chain(new.items) {
            if !items.contains(&item) {
                items.push(item);
            }
        }
        return format!("{}[{}]", old.prefix, items.join(","));
    }

    if incoming.trim().is_empty() {
        existing.to_string()
    } else {
        incoming.to_string()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ListLiteral<'a> {
    pub prefix: &'a str,
    pub items: Vec<&'a str>,
}

/// Parse `[a,b]` or `{Type}[a,b]`.
pub(crate) fn parse_list(value: &str) -> Option<ListLiteral<'_>> {
    let value = value.trim();
    let (prefix, rest) = if value.starts_with('{') {
        let end = value.find('}')?;
        value.split_at(end + 1)
    } else {
        ("", value)
    };
    let inner = rest.strip_prefix('[')?.strip_suffix(']')?;
    let items = inner
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect();
    Some(ListLiteral { prefix, items })
}
