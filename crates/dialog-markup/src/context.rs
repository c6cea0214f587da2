use crate::config::AssemblyConfig;
use crate::error::{Diagnostic, ErrorSink};
use crate::registry::Registry;
use crate::source::ClassCatalog;

/// Shared, read-only state for one class's assembly run.
#[derive(Clone, Copy)]
pub struct AssemblyContext<'a> {
    pub registry: &'a Registry,
    pub config: &'a AssemblyConfig,
    pub catalog: &'a ClassCatalog,
    pub sink: &'a dyn ErrorSink,
    /// The top-level class being assembled.
    pub class_name: &'a str,
}

impl<'a> AssemblyContext<'a> {
    pub fn new(
        registry: &'a Registry,
        config: &'a AssemblyConfig,
        catalog: &'a ClassCatalog,
        sink: &'a dyn ErrorSink,
        class_name: &'a str,
    ) -> Self {
        Self {
            registry,
            config,
            catalog,
            sink,
            class_name,
        }
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        tracing::debug!(class = %diagnostic.class, error = %diagnostic.kind, "reporting diagnostic");
        self.sink.handle(diagnostic);
    }
}

impl std::fmt::Debug for AssemblyContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssemblyContext")
            .field("class_name", &self.class_name)
            .field("scope", &self.config.scope)
            .finish_non_exhaustive()
    }
}
