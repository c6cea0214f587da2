use std::fmt;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Find the closest match from `candidates` using Levenshtein distance.
/// Returns `None` if no candidate is close enough (max distance 2, and
/// distance must be strictly less than `input.len()` to avoid nonsense
/// suggestions for very short inputs).
pub fn suggest_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for &candidate in candidates {
        let d = levenshtein(input, candidate);
        if d == 0 || d > 2 || d >= input.len() {
            continue;
        }
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((candidate, d));
        }
    }
    best.map(|(s, _)| s)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let n = b.len();
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// A recoverable problem found while assembling one class.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub class: String,
    pub member: Option<String>,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    #[error("no sections declared for dialog at {class}")]
    InvalidContainer { class: String },
    #[error("placement '{reference}' does not name a declared section")]
    InvalidPlacement { reference: String },
    #[error("no recognized widget metadata{}", suggestion_suffix(.suggestion))]
    UnknownMetadataKind { suggestion: Option<String> },
    #[error("'{property}' is not a declared property of '{kind}'")]
    PropertyResolutionFailure { kind: String, property: String },
    #[error("cannot instantiate '{kind}': {reason}")]
    InstantiationFailure { kind: String, reason: String },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(", did you mean '{s}'?"),
        None => String::new(),
    }
}

impl Diagnostic {
    pub fn new(class: impl Into<String>, member: Option<&str>, kind: DiagnosticKind) -> Self {
        Self {
            class: class.into(),
            member: member.map(str::to_string),
            kind,
        }
    }

    pub fn invalid_container(class: impl Into<String>) -> Self {
        let class = class.into();
        Self {
            kind: DiagnosticKind::InvalidContainer {
                class: class.clone(),
            },
            class,
            member: None,
        }
    }

    pub fn invalid_placement(
        class: impl Into<String>,
        member: &str,
        reference: impl Into<String>,
    ) -> Self {
        Self::new(
            class,
            Some(member),
            DiagnosticKind::InvalidPlacement {
                reference: reference.into(),
            },
        )
    }

    pub fn unknown_metadata_kind(
        class: impl Into<String>,
        member: &str,
        carried: &[&str],
        known: &[&str],
    ) -> Self {
        let suggestion = carried
            .iter()
            .find_map(|kind| suggest_similar(kind, known))
            .map(String::from);
        Self::new(
            class,
            Some(member),
            DiagnosticKind::UnknownMetadataKind { suggestion },
        )
    }

    pub fn property_resolution(
        class: impl Into<String>,
        member: Option<&str>,
        kind: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Self::new(
            class,
            member,
            DiagnosticKind::PropertyResolutionFailure {
                kind: kind.into(),
                property: property.into(),
            },
        )
    }

    pub fn instantiation(
        class: impl Into<String>,
        member: Option<&str>,
        kind: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            class,
            member,
            DiagnosticKind::InstantiationFailure {
                kind: kind.into(),
                reason: reason.into(),
            },
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error assembling {}", self.class)?;

        if let Some(ref member) = self.member {
            write!(f, " member '{member}'")?;
        }

        write!(f, ": {}", self.kind)
    }
}

impl std::error::Error for Diagnostic {}

/// Receiver of recoverable diagnostics. Shared by every assembly run, so
/// implementations must accept concurrent appends.
pub trait ErrorSink: Send + Sync {
    fn handle(&self, diagnostic: Diagnostic);
}

/// Append-only in-memory sink.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ErrorSink for CollectingSink {
    fn handle(&self, diagnostic: Diagnostic) {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}

/// Logs every diagnostic at `warn` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn handle(&self, diagnostic: Diagnostic) {
        tracing::warn!(
            class = %diagnostic.class,
            member = diagnostic.member.as_deref().unwrap_or(""),
            error = %diagnostic.kind,
            "dialog assembly diagnostic"
        );
    }
}

impl<T: ErrorSink + ?Sized> ErrorSink for &T {
    fn handle(&self, diagnostic: Diagnostic) {
        (**self).handle(diagnostic);
    }
}

/// Failures that abort the assembly of one class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("unknown class '{name}'{}", suggestion_suffix(.suggestion))]
    UnknownClass {
        name: String,
        suggestion: Option<String>,
    },
    #[error("inheritance cycle: {}", .chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },
}

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("invalid KDL: {0}")]
    Kdl(#[from] kdl::KdlError),
    #[error("invalid descriptor at '{node}': {message}")]
    Invalid { node: String, message: String },
}

impl DescriptorError {
    pub fn invalid(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            node: node.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("xml write failed: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("rendered output is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("{0}")]
    Fmt(#[from] fmt::Error),
}
