use std::cmp::Ordering;

use crate::source::{ClassDescriptor, MemberDescriptor, MetadataSource};
use crate::value::Value;
use crate::widgets::kinds;

/// Members of a class hierarchy that take part in rendering.
///
/// Ancestors' members come first. Members without metadata and members named
/// by an `ignore` declaration anywhere in the hierarchy are dropped. The
/// result is stable-sorted by ranking.
pub fn collect_members<'r>(hierarchy: &[&'r ClassDescriptor]) -> Vec<&'r MemberDescriptor> {
    let ignored: Vec<(Option<&str>, &str)> = hierarchy
        .iter()
        .flat_map(|class| class.all_metadata_of(kinds::IGNORE))
        .flat_map(|ignore| ignore.get_list("members").unwrap_or_default())
        .filter_map(Value::as_object)
        .filter_map(|entry| Some((entry.get_str("class"), entry.get_str("member")?)))
        .collect();

    let mut members: Vec<&'r MemberDescriptor> = hierarchy
        .iter()
        .flat_map(|class| class.members.iter())
        .filter(|member| !member.metadata.is_empty())
        .filter(|member| {
            !ignored.iter().any(|(class, name)| {
                *name == member.name && class.is_none_or(|c| c == member.declaring_class)
            })
        })
        .collect();

    members.sort_by(|a, b| by_ranking(a, b));
    members
}

/// Explicit ranking from `dialog-field` metadata.
pub fn ranking(member: &MemberDescriptor) -> Option<i64> {
    member
        .metadata_of(kinds::DIALOG_FIELD)
        .and_then(|field| field.get_i64("ranking"))
}

/// Lower rank first; unranked members after ranked ones. Ties keep their
/// relative order under a stable sort.
pub fn by_ranking(a: &MemberDescriptor, b: &MemberDescriptor) -> Ordering {
    match (ranking(a), ranking(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
