use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::config::AssemblyConfig;
use crate::error::RenderError;
use crate::render::DocumentSink;
use crate::tree::Document;
use crate::widgets::attrs;

/// Writes `.content.xml` style markup.
///
/// The root element carries the configured `xmlns:` declarations, every
/// element without a primary type gets the configured default, and nodes
/// without children are written self-closing.
pub struct XmlSink<W: Write> {
    writer: Writer<W>,
    namespaces: Vec<(String, String)>,
    primary_type: Option<String>,
    started: bool,
    open: Vec<bool>,
}

impl XmlSink<Vec<u8>> {
    pub fn new(config: &AssemblyConfig) -> Self {
        Self::with_writer(Vec::new(), config)
    }
}

impl<W: Write> XmlSink<W> {
    pub fn with_writer(inner: W, config: &AssemblyConfig) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', 4),
            namespaces: config.namespaces.clone(),
            primary_type: config.default_primary_type.clone(),
            started: false,
            open: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> DocumentSink for XmlSink<W> {
    type Error = RenderError;

    fn start_node(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        has_children: bool,
    ) -> Result<(), RenderError> {
        let mut element = BytesStart::new(name);
        if !self.started {
            self.started = true;
            self.writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            for (prefix, uri) in &self.namespaces {
                element.push_attribute((format!("xmlns:{prefix}").as_str(), uri.as_str()));
            }
        }

        let has_primary_type = attributes.iter().any(|(key, _)| *key == attrs::JCR_PRIMARY_TYPE);
        if let Some(primary_type) = self.primary_type.as_deref().filter(|_| !has_primary_type) {
            element.push_attribute((attrs::JCR_PRIMARY_TYPE, primary_type));
        }
        for &(key, value) in attributes {
            element.push_attribute((key, value));
        }

        if has_children {
            self.writer.write_event(Event::Start(element))?;
        } else {
            self.writer.write_event(Event::Empty(element))?;
        }
        self.open.push(has_children);
        Ok(())
    }

    fn end_node(&mut self, name: &str) -> Result<(), RenderError> {
        if self.open.pop() == Some(true) {
            self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Ok(())
    }
}

impl<W: Write> std::fmt::Debug for XmlSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlSink")
            .field("started", &self.started)
            .field("depth", &self.open.len())
            .finish_non_exhaustive()
    }
}

/// Render `doc` as an XML document string.
pub fn to_xml(doc: &Document, config: &AssemblyConfig) -> Result<String, RenderError> {
    let mut sink = XmlSink::new(config);
    doc.render(&mut sink)?;
    let mut bytes = sink.into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8(bytes)?)
}
