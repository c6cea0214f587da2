use std::fmt::{self, Write};

use crate::error::RenderError;
use crate::render::DocumentSink;
use crate::tree::Document;

const INDENT: &str = "    ";

pub fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');

    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(result, "\\u{{{:x}}}", c as u32);
            }
            c => result.push(c),
        }
    }

    result.push('"');
    result
}

/// Bare KDL identifiers; keywords and anything outside `[A-Za-z_][A-Za-z0-9_-]*`
/// are quoted.
pub fn is_valid_identifier(s: &str) -> bool {
    if matches!(s, "true" | "false" | "null" | "inf" | "nan") {
        return false;
    }

    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub fn render_key(key: &str) -> String {
    if is_valid_identifier(key) {
        key.to_string()
    } else {
        escape_string(key)
    }
}

/// Renders a document as KDL: one node per tree node, attributes as string
/// properties.
#[derive(Debug, Default)]
pub struct KdlSink {
    out: String,
    open: Vec<bool>,
}

impl KdlSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn indent(&mut self) {
        let depth = self.open.iter().filter(|open| **open).count();
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }
}

impl DocumentSink for KdlSink {
    type Error = fmt::Error;

    fn start_node(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        has_children: bool,
    ) -> Result<(), fmt::Error> {
        self.indent();
        self.out.push_str(&render_key(name));
        for (key, value) in attributes {
            write!(self.out, " {}={}", render_key(key), escape_string(value))?;
        }
        self.out.push_str(if has_children { " {\n" } else { "\n" });
        self.open.push(has_children);
        Ok(())
    }

    fn end_node(&mut self, _name: &str) -> Result<(), fmt::Error> {
        if self.open.pop() == Some(true) {
            self.indent();
            self.out.push_str("}\n");
        }
        Ok(())
    }
}

/// Render `doc` as a KDL document string.
pub fn to_kdl(doc: &Document) -> Result<String, RenderError> {
    let mut sink = KdlSink::new();
    doc.render(&mut sink)?;
    Ok(sink.into_string())
}
