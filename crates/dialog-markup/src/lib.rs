//! Assembles attributed dialog markup from metadata attached to class
//! members.
//!
//! Classes are described statically ([`ClassDescriptor`], the
//! [`Component`](macro@Component) derive, or KDL descriptor files), collected into a
//! [`ClassCatalog`], and turned into one [`Document`] per class by an
//! [`Assembler`] running every member through the handler chain.

extern crate self as dialog_markup;

pub mod assembly;
pub mod collector;
pub mod config;
pub mod container;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod handlers;
mod kdl_ext;
pub mod mapper;
pub mod merge;
pub mod metadata;
pub mod naming;
pub mod node_path;
pub mod registry;
pub mod render;
pub mod source;
pub mod tree;
pub mod value;
pub mod widgets;

pub use assembly::{Assembler, Layout};
pub use collector::collect_members;
pub use config::{AssemblyConfig, ResourceTypes};
pub use container::{Resolution, SectionKind, SectionRecord, SectionState, resolve_container};
pub use context::AssemblyContext;
pub use descriptor::{Descriptors, KindDescriptor, load_descriptors};
pub use error::{
    AssemblyError, CollectingSink, DescriptorError, Diagnostic, DiagnosticKind, ErrorSink,
    RenderError, TracingSink,
};
pub use handlers::{Handler, HandlerChain};
pub use mapper::PropertyMapper;
pub use merge::{MergePolicy, merge_values};
pub use metadata::{KindId, MetadataKind, MetadataObject, PropertyMapping, PropertySpec, Scope};
pub use naming::{is_valid_node_name, unique_name, valid_node_name};
pub use node_path::NodePath;
pub use registry::{Registry, WidgetKind};
pub use render::{DocumentSink, KdlSink, XmlSink, to_kdl, to_xml};
pub use source::{
    ClassCatalog, ClassDescriptor, Component, MemberDescriptor, MemberSource, MetadataSource,
};
pub use tree::{Document, NodeId};
pub use value::{AttributeValue, Value};

// Re-export the derive so users only need to depend on `dialog-markup`.
pub use dialog_markup_derive::Component;
