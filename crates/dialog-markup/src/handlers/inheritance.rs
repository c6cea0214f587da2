use crate::context::AssemblyContext;
use crate::error::Diagnostic;
use crate::handlers::Handler;
use crate::metadata::MetadataObject;
use crate::source::{MemberDescriptor, MemberSource, MetadataSource};
use crate::tree::{Document, NodeId};
use crate::widgets::kinds;

/// Overlays the metadata of members referenced through `extends`.
///
/// The farthest referenced member is the base, nearer ones and finally the
/// member itself overlay it. Later stages then see one effective metadata
/// list, and a value class when the member declares none.
#[derive(Debug, Clone, Copy, Default)]
pub struct InheritanceStage;

impl Handler for InheritanceStage {
    fn handle(
        &self,
        source: &mut MemberSource<'_>,
        _doc: &mut Document,
        _node: NodeId,
        cx: &AssemblyContext<'_>,
    ) {
        let chain = inheritance_chain(source.member, cx, true);
        if chain.is_empty() {
            return;
        }
        let mut effective: Vec<MetadataObject> = Vec::new();
        let mut value_class = None;
        for inherited in chain {
            tracing::debug!(
                member = %source.member.name,
                from = %format!("{}.{}", inherited.declaring_class, inherited.name),
                "inheriting member metadata"
            );
            let reusable: Vec<MetadataObject> = inherited
                .metadata()
                .iter()
                .filter(|object| !object.is(kinds::EXTENDS) && !object.is(kinds::MULTIPLE))
                .cloned()
                .collect();
            effective = overlay_metadata(&effective, &reusable);
            if inherited.value_class.is_some() {
                value_class = inherited.value_class.clone();
            }
        }
        let effective = overlay_metadata(&effective, source.member.metadata());
        source.inherit(effective, value_class);
    }
}

/// Lay `top` over `base`, kind by kind.
///
/// A kind present once on both sides is merged value by value with `top`
/// winning. A kind `top` repeats replaces every inherited object of that
/// kind. Kinds only `base` carries come first, in their order.
pub fn overlay_metadata(base: &[MetadataObject], top: &[MetadataObject]) -> Vec<MetadataObject> {
    let mut merged: Vec<MetadataObject> = base
        .iter()
        .filter(|object| !top.iter().any(|own| own.kind() == object.kind()))
        .cloned()
        .collect();
    for object in top {
        let repeated = top.iter().filter(|own| own.kind() == object.kind()).count() > 1;
        let inherited: Vec<&MetadataObject> =
            base.iter().filter(|b| b.kind() == object.kind()).collect();
        match inherited.as_slice() {
            [single] if !repeated => merged.push(single.overlay(object)),
            _ => merged.push(object.clone()),
        }
    }
    merged
}

/// Members reachable through `extends` references, farthest first.
///
/// A reference names a `member` and optionally a `class`; either defaults to
/// the referencing member's own. Missing targets and cycles end the chain and,
/// when `report` is set, are reported as instantiation failures.
pub fn inheritance_chain<'r>(
    member: &MemberDescriptor,
    cx: &AssemblyContext<'r>,
    report: bool,
) -> Vec<&'r MemberDescriptor> {
    let mut chain: Vec<&'r MemberDescriptor> = Vec::new();
    let mut visited = vec![(member.declaring_class.clone(), member.name.clone())];
    let mut current_class = member.declaring_class.clone();
    let mut current_name = member.name.clone();
    let mut current_meta = member.metadata_of(kinds::EXTENDS).cloned();

    while let Some(reference) = current_meta {
        let class = reference
            .get_str("class")
            .map(str::to_string)
            .unwrap_or_else(|| current_class.clone());
        let target_name = reference.get_str("member").unwrap_or(current_name.as_str());

        let fail = |reason: String| {
            if report {
                cx.report(Diagnostic::instantiation(
                    &member.declaring_class,
                    Some(&member.name),
                    kinds::EXTENDS,
                    reason,
                ));
            }
        };

        let Some(target) = cx.catalog.find_member(&class, target_name) else {
            fail(format!("no member '{target_name}' on '{class}'"));
            break;
        };
        let key = (target.declaring_class.clone(), target.name.clone());
        if visited.contains(&key) {
            fail(format!("cyclic reference to '{}.{}'", key.0, key.1));
            break;
        }
        visited.push(key);
        chain.push(target);
        current_class = target.declaring_class.clone();
        current_name = target.name.clone();
        current_meta = target.metadata_of(kinds::EXTENDS).cloned();
    }

    chain.reverse();
    chain
}
