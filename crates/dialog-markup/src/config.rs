use kdl::KdlDocument;

use crate::error::DescriptorError;
use crate::kdl_ext::{KdlNodeExt, kdl_integer};
use crate::metadata::Scope;

/// Resource types written by the assembler itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTypes {
    pub dialog: String,
    pub container: String,
    pub tabs: String,
    pub accordion: String,
    pub fixed_columns: String,
    pub multifield: String,
}

impl Default for ResourceTypes {
    fn default() -> Self {
        Self {
            dialog: "cq/gui/components/authoring/dialog".to_string(),
            container: "granite/ui/components/coral/foundation/container".to_string(),
            tabs: "granite/ui/components/coral/foundation/tabs".to_string(),
            accordion: "granite/ui/components/coral/foundation/accordion".to_string(),
            fixed_columns: "granite/ui/components/coral/foundation/fixedcolumns".to_string(),
            multifield: "granite/ui/components/coral/foundation/form/multifield".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyConfig {
    /// Rendering pass; properties scoped to other passes are skipped.
    pub scope: Scope,
    pub root_name: String,
    pub fallback_node_name: String,
    pub untitled_section: String,
    pub resource_types: ResourceTypes,
    /// `xmlns:` declarations written on the root element.
    pub namespaces: Vec<(String, String)>,
    pub default_primary_type: Option<String>,
    /// Nesting limit for fieldsets, multifields and container widgets.
    pub max_depth: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            scope: Scope::Dialog,
            root_name: "jcr:root".to_string(),
            fallback_node_name: "item".to_string(),
            untitled_section: "Untitled".to_string(),
            resource_types: ResourceTypes::default(),
            namespaces: default_namespaces(),
            default_primary_type: Some("nt:unstructured".to_string()),
            max_depth: 8,
        }
    }
}

fn default_namespaces() -> Vec<(String, String)> {
    [
        ("sling", "http://sling.apache.org/jcr/sling/1.0"),
        ("granite", "http://www.adobe.com/jcr/granite/1.0"),
        ("cq", "http://www.day.com/jcr/cq/1.0"),
        ("jcr", "http://www.jcp.org/jcr/1.0"),
        ("nt", "http://www.jcp.org/jcr/nt/1.0"),
    ]
    .into_iter()
    .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
    .collect()
}

impl AssemblyConfig {
    pub fn for_scope(scope: Scope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Load overrides from the `assembly` node of a KDL document.
    ///
    /// ```kdl
    /// assembly {
    ///     scope "design-dialog"
    ///     untitled-section "General"
    ///     max-depth 4
    ///     resource-type tabs="my/tabs"
    ///     namespace "acme" "http://acme.example/1.0"
    /// }
    /// ```
    ///
    /// A document without an `assembly` node yields the defaults.
    pub fn from_kdl(text: &str) -> Result<Self, DescriptorError> {
        let document: KdlDocument = text.parse()?;
        let mut config = Self::default();
        let Some(assembly) = document.get("assembly") else {
            return Ok(config);
        };

        for child in assembly.child_nodes() {
            match child.name_str() {
                "scope" => {
                    let raw = child.required_string_arg()?;
                    config.scope = Scope::parse(raw).ok_or_else(|| {
                        DescriptorError::invalid("scope", format!("unknown scope '{raw}'"))
                    })?;
                }
                "root-name" => config.root_name = child.required_string_arg()?.to_string(),
                "fallback-node-name" => {
                    config.fallback_node_name = child.required_string_arg()?.to_string();
                }
                "untitled-section" => {
                    config.untitled_section = child.required_string_arg()?.to_string();
                }
                "primary-type" => {
                    config.default_primary_type = child.string_arg(0).map(str::to_string);
                }
                "max-depth" => {
                    let depth = child
                        .arg(0)
                        .and_then(kdl_integer)
                        .and_then(|n| usize::try_from(n).ok())
                        .ok_or_else(|| {
                            DescriptorError::invalid("max-depth", "expected a non-negative integer")
                        })?;
                    config.max_depth = depth;
                }
                "resource-type" => {
                    for (key, value) in child.attrs() {
                        let Some(value) = value.as_string() else {
                            return Err(DescriptorError::invalid(
                                "resource-type",
                                format!("'{key}' must be a string"),
                            ));
                        };
                        let slot = match key {
                            "dialog" => &mut config.resource_types.dialog,
                            "container" => &mut config.resource_types.container,
                            "tabs" => &mut config.resource_types.tabs,
                            "accordion" => &mut config.resource_types.accordion,
                            "fixed-columns" => &mut config.resource_types.fixed_columns,
                            "multifield" => &mut config.resource_types.multifield,
                            other => {
                                return Err(DescriptorError::invalid(
                                    "resource-type",
                                    format!("unknown resource type '{other}'"),
                                ));
                            }
                        };
                        *slot = value.to_string();
                    }
                }
                "namespace" => {
                    let (Some(prefix), Some(uri)) = (child.string_arg(0), child.string_arg(1))
                    else {
                        return Err(DescriptorError::invalid(
                            "namespace",
                            "expected a prefix and a uri",
                        ));
                    };
                    match config.namespaces.iter_mut().find(|(p, _)| p == prefix) {
                        Some(existing) => existing.1 = uri.to_string(),
                        None => config.namespaces.push((prefix.to_string(), uri.to_string())),
                    }
                }
                other => {
                    return Err(DescriptorError::invalid(
                        other,
                        "unknown assembly setting",
                    ));
                }
            }
        }

        Ok(config)
    }
}
