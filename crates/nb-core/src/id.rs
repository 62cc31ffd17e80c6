use serde::{Deserialize, Serialize};
use std::fmt;

/// What an identifier names. Used as the readable prefix of generated ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Section,
    Subsection,
    Page,
    Sticky,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Section => "section",
            IdKind::Subsection => "subsection",
            IdKind::Page => "page",
            IdKind::Sticky => "sticky",
        }
    }
}

/// Opaque identifier for every tree node and overlay object.
///
/// Generated ids are `<kind>-<uuid v7>`: the UUID carries a millisecond
/// timestamp in its high bits, so ids of the same kind sort by creation.
/// Ids read from storage are kept verbatim, whatever their format.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generate a fresh identifier for `kind`.
    pub fn generate(kind: IdKind) -> Self {
        Self::with_prefix(kind.prefix())
    }

    /// Generate a fresh identifier with an arbitrary prefix.
    pub fn with_prefix(prefix: &str) -> Self {
        let uuid = uuid::Uuid::now_v7();
        NodeId(format!("{prefix}-{}", uuid.simple()))
    }

    /// Wrap an existing identifier string (e.g. from storage or the UI).
    pub fn from_raw(s: impl Into<String>) -> Self {
        NodeId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<NodeId> = (0..500).map(|_| NodeId::generate(IdKind::Page)).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn generated_ids_carry_kind_prefix() {
        let id = NodeId::generate(IdKind::Subsection);
        assert!(id.as_str().starts_with("subsection-"));
    }

    #[test]
    fn later_ids_sort_after_earlier_ones() {
        let a = NodeId::generate(IdKind::Section);
        std::thread::sleep(Duration::from_millis(3));
        let b = NodeId::generate(IdKind::Section);
        assert!(a < b, "{a} should sort before {b}");
    }

    #[test]
    fn raw_ids_roundtrip_through_json() {
        let id = NodeId::from_raw("page-legacy-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"page-legacy-1\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
