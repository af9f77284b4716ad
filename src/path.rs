//! Structural paths and path matching.
//!
//! A structural path is the ordered list of field names, map keys and
//! stringified indices leading from the document root to a node, e.g.
//! `components:schemas:Pet:properties:name`.

use std::fmt;
use std::sync::Arc;

/// Separator used when rendering or parsing a path as a single string.
pub const PATH_SEPARATOR: char = ':';

/// Returns true if `path` and `pattern` have exactly the same segments.
pub fn is_exact_match<A: AsRef<str>, B: AsRef<str>>(path: &[A], pattern: &[B]) -> bool {
    path.len() == pattern.len() && is_prefix_match(path, pattern)
}

/// Returns true if `prefix` is a prefix of `path`.
///
/// An empty prefix matches every path.
pub fn is_prefix_match<A: AsRef<str>, B: AsRef<str>>(path: &[A], prefix: &[B]) -> bool {
    prefix.len() <= path.len()
        && path
            .iter()
            .zip(prefix)
            .all(|(segment, expected)| segment.as_ref() == expected.as_ref())
}

/// Immutable path to a node in a document.
///
/// Extending a path always allocates a new one, so a path handed to a
/// visitor can be kept without being affected by later traversal steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructuralPath(Arc<[String]>);

impl StructuralPath {
    /// The empty path of the document root.
    pub fn root() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Parse a `:` separated path. Empty segments are ignored.
    pub fn parse(s: &str) -> Self {
        s.split(PATH_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .map(String::from)
            .collect::<Vec<_>>()
            .into()
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.to_vec();
        segments.push(segment.into());
        Self(segments.into())
    }

    /// Returns a new path with a list index appended.
    pub fn index(&self, index: usize) -> Self {
        self.child(index.to_string())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The final segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Returns true if `prefix` is a prefix of this path.
    pub fn starts_with<S: AsRef<str>>(&self, prefix: &[S]) -> bool {
        is_prefix_match(&self.0, prefix)
    }

    /// Returns true if this path equals `pattern` segment for segment.
    pub fn matches<S: AsRef<str>>(&self, pattern: &[S]) -> bool {
        is_exact_match(&self.0, pattern)
    }
}

impl From<Vec<String>> for StructuralPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments.into())
    }
}

impl fmt::Display for StructuralPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", PATH_SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_requires_same_length() {
        assert!(is_exact_match(&["a", "b"], &["a", "b"]));
        assert!(!is_exact_match(&["a", "b"], &["a"]));
        assert!(!is_exact_match(&["a"], &["a", "b"]));
        assert!(!is_exact_match(&["a", "c"], &["a", "b"]));
    }

    #[test]
    fn prefix_match() {
        assert!(is_prefix_match(&["a", "b", "c"], &["a", "b"]));
        assert!(is_prefix_match(&["a", "b"], &["a", "b"]));
        assert!(!is_prefix_match(&["a"], &["a", "b"]));
        assert!(!is_prefix_match(&["a", "x", "c"], &["a", "b"]));
    }

    #[test]
    fn empty_prefix_matches_everything() {
        let empty: [&str; 0] = [];
        assert!(is_prefix_match(&["a"], &empty));
        assert!(is_prefix_match(&empty, &empty));
    }

    #[test]
    fn child_does_not_alias_parent() {
        let parent = StructuralPath::root().child("components");
        let schemas = parent.child("schemas");
        let responses = parent.child("responses");

        assert_eq!(parent.segments(), ["components"]);
        assert_eq!(schemas.segments(), ["components", "schemas"]);
        assert_eq!(responses.segments(), ["components", "responses"]);
    }

    #[test]
    fn display_joins_with_colons() {
        let path = StructuralPath::root().child("paths").child("/pets").index(0);
        assert_eq!(path.to_string(), "paths:/pets:0");
        assert_eq!(StructuralPath::root().to_string(), "");
    }

    #[test]
    fn parse_ignores_empty_segments() {
        let path = StructuralPath::parse(":components::schemas:Pet");
        assert_eq!(path.segments(), ["components", "schemas", "Pet"]);
        assert!(StructuralPath::parse("").is_empty());
    }

    #[test]
    fn starts_with_and_matches() {
        let path = StructuralPath::parse("components:schemas:Pet");
        assert!(path.starts_with(&["components", "schemas"]));
        assert!(!path.starts_with(&["paths"]));
        assert!(path.matches(&["components", "schemas", "Pet"]));
        assert!(!path.matches(&["components", "schemas"]));
        assert_eq!(path.last(), Some("Pet"));
        assert_eq!(path.len(), 3);
    }
}
