use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::context::AssemblyContext;
use crate::handlers::Handler;
use crate::metadata::{KindId, MetadataKind, MetadataObject};
use crate::source::MemberSource;
use crate::tree::{Document, NodeId};
use crate::widgets;

/// The widget a member renders as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetKind<'r> {
    /// A kind with a registered widget handler.
    Known(&'r MetadataKind),
    /// A kind marked as a custom widget; its rendering is left to custom
    /// handlers and generic mapping.
    Custom(&'r MetadataKind),
}

impl<'r> WidgetKind<'r> {
    pub fn kind(&self) -> &'r MetadataKind {
        match self {
            WidgetKind::Known(kind) | WidgetKind::Custom(kind) => kind,
        }
    }
}

/// Metadata kinds and the handlers bound to them.
///
/// Built once and shared by reference across assembly runs.
#[derive(Default, Clone)]
pub struct Registry {
    kinds: IndexMap<KindId, MetadataKind>,
    widgets: IndexMap<KindId, Arc<dyn Handler>>,
    custom: Vec<(KindId, Arc<dyn Handler>)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in widget catalog.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        widgets::install(&mut registry);
        registry
    }

    /// Register (or replace) a metadata kind.
    pub fn register_kind(&mut self, kind: MetadataKind) -> &mut Self {
        self.kinds.insert(kind.id.clone(), kind);
        self
    }

    /// Register a kind together with the handler that renders it as a widget.
    pub fn register_widget(&mut self, kind: MetadataKind, handler: impl Handler + 'static) -> &mut Self {
        self.widgets.insert(kind.id.clone(), Arc::new(handler));
        self.register_kind(kind)
    }

    /// Add a handler run for every member carrying `kind`, after the widget
    /// handler. Handlers run in registration order.
    pub fn register_custom_handler(
        &mut self,
        kind: impl Into<KindId>,
        handler: impl Handler + 'static,
    ) -> &mut Self {
        self.custom.push((kind.into(), Arc::new(handler)));
        self
    }

    pub fn register_custom_fn<F>(&mut self, kind: impl Into<KindId>, handler: F) -> &mut Self
    where
        F: Fn(&mut MemberSource<'_>, &mut Document, NodeId, &AssemblyContext<'_>) + Send + Sync + 'static,
    {
        self.register_custom_handler(kind, handler)
    }

    pub fn kind(&self, id: &str) -> Option<&MetadataKind> {
        self.kinds.get(id)
    }

    pub fn kind_ids(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(KindId::as_str)
    }

    pub fn widget_handler(&self, id: &str) -> Option<&dyn Handler> {
        self.widgets.get(id).map(|handler| handler.as_ref())
    }

    /// Custom handlers with the kind they are bound to, in registration order.
    pub fn custom_handlers(&self) -> impl Iterator<Item = (&str, &dyn Handler)> {
        self.custom
            .iter()
            .map(|(kind, handler)| (kind.as_str(), handler.as_ref()))
    }

    /// Widget for a metadata list: the first object whose kind has a widget
    /// handler, otherwise the first whose kind is custom-widget-marked.
    pub fn detect_widget(&self, metadata: &[MetadataObject]) -> Option<WidgetKind<'_>> {
        metadata
            .iter()
            .find_map(|m| {
                self.widgets
                    .contains_key(m.kind().as_str())
                    .then(|| self.kind(m.kind().as_str()))
                    .flatten()
                    .map(WidgetKind::Known)
            })
            .or_else(|| {
                metadata.iter().find_map(|m| {
                    self.kind(m.kind().as_str())
                        .filter(|kind| kind.custom_widget)
                        .map(WidgetKind::Custom)
                })
            })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.kinds.keys().collect::<Vec<_>>())
            .field("widgets", &self.widgets.keys().collect::<Vec<_>>())
            .field(
                "custom",
                &self.custom.iter().map(|(kind, _)| kind).collect::<Vec<_>>(),
            )
            .finish()
    }
}
