//! Statically constructed views over classes, members and their metadata.
//!
//! Nothing here discovers classes on its own: descriptors are built with the
//! builder API, the `Component` derive, or a KDL descriptor file, and then
//! collected into a [`ClassCatalog`].

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::error::{AssemblyError, suggest_similar};
use crate::metadata::MetadataObject;

/// Read access to the metadata declared on a class or a member.
pub trait MetadataSource {
    fn name(&self) -> &str;

    /// Every attached metadata object, in declaration order.
    fn metadata(&self) -> &[MetadataObject];

    fn metadata_of(&self, kind: &str) -> Option<&MetadataObject> {
        self.metadata().iter().find(|m| m.is(kind))
    }

    fn all_metadata_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a MetadataObject> + 'a {
        self.metadata().iter().filter(move |m| m.is(kind))
    }

    fn has_metadata(&self, kind: &str) -> bool {
        self.metadata_of(kind).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    pub name: String,
    pub declaring_class: String,
    pub metadata: Vec<MetadataObject>,
    /// Type the member holds; recursed into by fieldsets, multifields and
    /// container widgets.
    pub value_class: Option<String>,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaring_class: String::new(),
            metadata: Vec::new(),
            value_class: None,
        }
    }

    pub fn meta(mut self, object: MetadataObject) -> Self {
        self.metadata.push(object);
        self
    }

    pub fn value_class(mut self, class: impl Into<String>) -> Self {
        self.value_class = Some(class.into());
        self
    }
}

impl MetadataSource for MemberDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> &[MetadataObject] {
        &self.metadata
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    pub name: String,
    pub extends: Option<String>,
    pub metadata: Vec<MetadataObject>,
    pub members: Vec<MemberDescriptor>,
    /// Section types declared inside this class, in source order.
    pub nested: Vec<ClassDescriptor>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            metadata: Vec::new(),
            members: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn meta(mut self, object: MetadataObject) -> Self {
        self.metadata.push(object);
        self
    }

    pub fn member(mut self, mut member: MemberDescriptor) -> Self {
        member.declaring_class = self.name.clone();
        self.members.push(member);
        self
    }

    pub fn nested(mut self, class: ClassDescriptor) -> Self {
        self.nested.push(class);
        self
    }

    pub fn find_member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }
}

impl MetadataSource for ClassDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> &[MetadataObject] {
        &self.metadata
    }
}

/// All known classes by name. Nested section classes are indexed as well.
#[derive(Debug, Clone, Default)]
pub struct ClassCatalog {
    classes: IndexMap<String, ClassDescriptor>,
}

impl ClassCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: ClassDescriptor) {
        for nested in &class.nested {
            self.insert(nested.clone());
        }
        self.classes.insert(class.name.clone(), class);
    }

    pub fn with(mut self, class: ClassDescriptor) -> Self {
        self.insert(class);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// `name` and its ancestors, farthest ancestor first.
    pub fn hierarchy(&self, name: &str) -> Result<Vec<&ClassDescriptor>, AssemblyError> {
        let mut chain: Vec<&ClassDescriptor> = Vec::new();
        let mut next = Some(name);
        while let Some(current) = next {
            if chain.iter().any(|c| c.name == current) {
                let mut names: Vec<String> = chain.iter().map(|c| c.name.clone()).collect();
                names.push(current.to_string());
                return Err(AssemblyError::InheritanceCycle { chain: names });
            }
            let class = self.get(current).ok_or_else(|| self.unknown_class(current))?;
            chain.push(class);
            next = class.extends.as_deref();
        }
        chain.reverse();
        Ok(chain)
    }

    fn unknown_class(&self, name: &str) -> AssemblyError {
        let known: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        AssemblyError::UnknownClass {
            name: name.to_string(),
            suggestion: suggest_similar(name, &known).map(String::from),
        }
    }

    /// Look `member` up on `class`, then on its ancestors nearest first.
    pub fn find_member(&self, class: &str, member: &str) -> Option<&MemberDescriptor> {
        let hierarchy = self.hierarchy(class).ok()?;
        hierarchy.iter().rev().find_map(|c| c.find_member(member))
    }

    /// Classes that carry `dialog` metadata, in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes
            .values()
            .filter(|c| c.has_metadata(crate::widgets::kinds::DIALOG))
    }
}

/// The per-pipeline view of one member being rendered.
///
/// Starts out as the member's own metadata and value class; inheritance may
/// replace both with an effective view overlaid from referenced members.
#[derive(Debug, Clone)]
pub struct MemberSource<'a> {
    pub member: &'a MemberDescriptor,
    /// Class whose members are being rendered. Differs from the declaring
    /// class when a fieldset or multifield recurses into another type.
    pub container_class: &'a str,
    metadata: Cow<'a, [MetadataObject]>,
    value_class: Option<Cow<'a, str>>,
    values: IndexMap<String, String>,
}

impl<'a> MemberSource<'a> {
    pub fn new(member: &'a MemberDescriptor, container_class: &'a str) -> Self {
        Self {
            member,
            container_class,
            metadata: Cow::Borrowed(member.metadata.as_slice()),
            value_class: member.value_class.as_deref().map(Cow::Borrowed),
            values: IndexMap::new(),
        }
    }

    pub fn with_values(mut self, values: IndexMap<String, String>) -> Self {
        self.values = values;
        self
    }

    /// Replace the metadata seen by later stages. An inherited value class
    /// only applies when the member declares none.
    pub fn inherit(&mut self, metadata: Vec<MetadataObject>, value_class: Option<String>) {
        self.metadata = Cow::Owned(metadata);
        if self.value_class.is_none() {
            self.value_class = value_class.map(Cow::Owned);
        }
    }

    /// Class whose members a fieldset or multifield renders.
    pub fn value_class(&self) -> Option<&str> {
        self.value_class.as_deref()
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn values(&self) -> &IndexMap<String, String> {
        &self.values
    }

    pub fn declaring_class(&self) -> &str {
        &self.member.declaring_class
    }
}

impl MetadataSource for MemberSource<'_> {
    fn name(&self) -> &str {
        &self.member.name
    }

    fn metadata(&self) -> &[MetadataObject] {
        &self.metadata
    }
}

/// Implemented by `#[derive(Component)]`.
pub trait Component {
    fn class_name() -> &'static str;

    fn class_descriptor() -> ClassDescriptor;

    /// Add this class and every class it references to `catalog`.
    fn register(catalog: &mut ClassCatalog) {
        if catalog.contains(Self::class_name()) {
            return;
        }
        catalog.insert(Self::class_descriptor());
        Self::register_dependencies(catalog);
    }

    fn register_dependencies(_catalog: &mut ClassCatalog) {}
}
