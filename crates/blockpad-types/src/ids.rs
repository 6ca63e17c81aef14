//! Typed identifiers for pages, blocks, table rows, and table cells.
//!
//! Every id is an opaque string. Fresh ids are minted from UUIDv7 (time-ordered,
//! simple hex form); ids read back from a snapshot are kept verbatim so that a
//! surface which already rendered an element can keep addressing it. The
//! `short()` form is for human-facing output only — never used as a lookup key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A page identifier.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

/// A block identifier, unique across every page.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

/// A table row identifier.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

/// A table cell identifier.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(String);

// ── Shared behavior ─────────────────────────────────────────────────────────

macro_rules! impl_typed_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Mint a new time-ordered id (UUIDv7, 32 hex chars).
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().as_simple().to_string())
            }

            /// Wrap an existing id string. Empty strings are rejected.
            pub fn parse(s: impl Into<String>) -> Option<Self> {
                let s = s.into();
                if s.is_empty() { None } else { Some(Self(s)) }
            }

            /// The raw id string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// First 8 characters — for human display only, not lookup.
            pub fn short(&self) -> String {
                self.0.chars().take(8).collect()
            }

            /// Check if a query string matches this id by prefix.
            pub fn matches_prefix(&self, prefix: &str) -> bool {
                self.0.starts_with(prefix)
            }
        }

        impl Default for $T {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<&str> for $T {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $T {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $T {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $name, self.short())
            }
        }
    };
}

impl_typed_id!(PageId, "PageId");
impl_typed_id!(BlockId, "BlockId");
impl_typed_id!(RowId, "RowId");
impl_typed_id!(CellId, "CellId");

// ── Prefix resolution ───────────────────────────────────────────────────────

/// Error from ambiguous prefix resolution.
#[derive(Debug, thiserror::Error)]
pub enum PrefixError {
    #[error("no match for prefix '{0}'")]
    NoMatch(String),
    #[error("ambiguous prefix '{prefix}': matches {candidates:?}")]
    Ambiguous {
        prefix: String,
        candidates: Vec<String>,
    },
}

/// Resolve a query string against a set of page ids and titles.
///
/// Resolution order:
/// 1. Exact title match
/// 2. Unique title prefix match
/// 3. Unique id prefix match
/// 4. Error (no match or ambiguous)
pub fn resolve_page_prefix<'a>(
    pages: impl Iterator<Item = (&'a PageId, &'a str)>,
    query: &str,
) -> Result<PageId, PrefixError> {
    let entries: Vec<(&PageId, &str)> = pages.collect();

    if let Some((id, _)) = entries.iter().find(|(_, title)| *title == query) {
        return Ok((*id).clone());
    }

    let title_matches: Vec<(&PageId, &str)> = entries
        .iter()
        .filter(|(_, title)| title.starts_with(query))
        .copied()
        .collect();

    if title_matches.len() == 1 {
        return Ok(title_matches[0].0.clone());
    }
    if title_matches.len() > 1 {
        return Err(PrefixError::Ambiguous {
            prefix: query.to_string(),
            candidates: title_matches.iter().map(|(_, t)| t.to_string()).collect(),
        });
    }

    let id_matches: Vec<&PageId> = entries
        .iter()
        .filter(|(id, _)| id.matches_prefix(query))
        .map(|(id, _)| *id)
        .collect();

    match id_matches.len() {
        0 => Err(PrefixError::NoMatch(query.to_string())),
        1 => Ok(id_matches[0].clone()),
        _ => Err(PrefixError::Ambiguous {
            prefix: query.to_string(),
            candidates: id_matches.iter().map(|id| id.short()).collect(),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ── Basic ID operations ─────────────────────────────────────────────

    #[test]
    fn test_new_is_unique() {
        let a = BlockId::new();
        let b = BlockId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_is_32_hex_chars() {
        let id = PageId::new();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_short_is_8_chars() {
        assert_eq!(CellId::new().short().len(), 8);
        assert_eq!(RowId::from("r1").short(), "r1");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(BlockId::parse("").is_none());
        assert_eq!(BlockId::parse("b-1").unwrap().as_str(), "b-1");
    }

    #[test]
    fn test_legacy_ids_kept_verbatim() {
        let id = BlockId::from("1699999999999-abc");
        assert_eq!(id.to_string(), "1699999999999-abc");
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = PageId::from("page-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"page-1\"");
        let parsed: PageId = serde_json::from_str("\"page-1\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_debug_uses_type_name() {
        let id = BlockId::from("abcdefghijkl");
        assert_eq!(format!("{id:?}"), "BlockId(abcdefgh)");
    }

    // ── Prefix resolution ───────────────────────────────────────────────

    fn pages() -> Vec<(PageId, String)> {
        vec![
            (PageId::from("aaaa1111"), "Inbox".to_string()),
            (PageId::from("aaaa2222"), "Ideas".to_string()),
            (PageId::from("bbbb3333"), "Reading list".to_string()),
        ]
    }

    fn resolve(query: &str) -> Result<PageId, PrefixError> {
        let pages = pages();
        resolve_page_prefix(pages.iter().map(|(id, t)| (id, t.as_str())), query)
    }

    #[test]
    fn test_resolve_exact_title() {
        assert_eq!(resolve("Inbox").unwrap(), PageId::from("aaaa1111"));
    }

    #[test]
    fn test_resolve_unique_title_prefix() {
        assert_eq!(resolve("Read").unwrap(), PageId::from("bbbb3333"));
    }

    #[test]
    fn test_resolve_ambiguous_title_prefix() {
        assert!(matches!(resolve("I"), Err(PrefixError::Ambiguous { .. })));
    }

    #[test]
    fn test_resolve_id_prefix() {
        assert_eq!(resolve("bbbb").unwrap(), PageId::from("bbbb3333"));
        assert!(matches!(resolve("aaaa"), Err(PrefixError::Ambiguous { .. })));
        assert!(matches!(resolve("zzzz"), Err(PrefixError::NoMatch(_))));
    }
}
