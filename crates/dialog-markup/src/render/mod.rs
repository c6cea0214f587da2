//! Serialization of a [`Document`](crate::Document) into external formats.

mod kdl;
mod xml;

pub use kdl::{KdlSink, to_kdl};
pub use xml::{XmlSink, to_xml};

/// Receives a document depth first.
///
/// Every `start_node` is matched by one `end_node` after the node's children.
pub trait DocumentSink {
    type Error;

    fn start_node(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        has_children: bool,
    ) -> Result<(), Self::Error>;

    fn end_node(&mut self, name: &str) -> Result<(), Self::Error>;
}
