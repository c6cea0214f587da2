use std::fmt;

/// Slash-separated path relative to some node.
///
/// Empty and `.` segments are dropped while parsing; `..` is kept and
/// resolved against the parent when the path is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != ".")
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Split a mapping prefix into its node-path part and its name part.
///
/// Everything before the last `/` names a node below the target; the
/// remainder is prepended to attribute names. `"./image/file"` yields
/// `(Some("image"), "file")`, `"ui_"` yields `(None, "ui_")`.
pub fn split_prefix(prefix: &str) -> (Option<NodePath>, &str) {
    match prefix.rsplit_once('/') {
        Some((head, name)) => {
            let path = NodePath::parse(head);
            ((!path.is_empty()).then_some(path), name)
        }
        None => (None, prefix),
    }
}

#[cfg(test)]
mod tests {
    use super::{NodePath, split_prefix};

    #[test]
    fn parse_drops_empty_and_current_segments() {
        let path = NodePath::parse("./a//b/../c/");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["a", "b", "..", "c"]);
        assert_eq!(path.to_string(), "a/b/../c");
    }

    #[test]
    fn split_prefix_separates_path_from_name() {
        let (path, name) = split_prefix("./image/file");
        assert_eq!(path.map(|p| p.to_string()).as_deref(), Some("image"));
        assert_eq!(name, "file");

        let (path, name) = split_prefix("ui_");
        assert!(path.is_none());
        assert_eq!(name, "ui_");

        let (path, name) = split_prefix("./");
        assert!(path.is_none());
        assert_eq!(name, "");
    }
}
