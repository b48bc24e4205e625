//! Friendly peer names.
//!
//! Peers are only identified by public key, which makes dashboards hard to
//! read. [`PeerNames`] maps public keys to display names and is built once at
//! startup from up to two sources:
//!
//! 1. an inline list, `"keyA:alice,keyB:bob"`;
//! 2. a TOML document, which takes priority on conflicting keys:
//!
//! ```toml
//! ["keyA"]
//! name = "alice"
//!
//! [[peer]]
//! public_key = "keyB"
//! name = "bob"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::io::Read;

use serde::Deserialize;
use tracing::warn;
use wireguard_device::PublicKey;

use crate::error::PeerNamesError;

/// Immutable mapping from base64 public key to display name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeerNames {
    names: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct PeerDocument {
    #[serde(default)]
    peer: Vec<PeerEntry>,
    #[serde(flatten)]
    sections: BTreeMap<String, PeerSection>,
}

#[derive(Debug, Deserialize)]
struct PeerEntry {
    public_key: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct PeerSection {
    name: String,
}

impl PeerNames {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list of `key:name` pairs.
    ///
    /// An empty string yields an empty mapping. Later duplicates win.
    ///
    /// # Errors
    ///
    /// Returns [`PeerNamesError::InvalidEntry`] for the first element that
    /// does not split into exactly two colon-separated fields.
    pub fn parse_inline(list: &str) -> Result<Self, PeerNamesError> {
        let mut names = Self::new();
        if list.is_empty() {
            return Ok(names);
        }

        for entry in list.split(',') {
            let mut fields = entry.split(':');
            let (Some(key), Some(name), None) = (fields.next(), fields.next(), fields.next()) else {
                return Err(PeerNamesError::InvalidEntry {
                    entry: entry.to_string(),
                });
            };
            names.insert(key, name);
        }

        Ok(names)
    }

    /// Parses a TOML peer names document from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader fails or the document is malformed.
    pub fn parse_document<R: Read>(mut reader: R) -> Result<Self, PeerNamesError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse_document_str(&text)
    }

    /// Parses a TOML peer names document.
    ///
    /// `[[peer]]` entries are applied first, then keyed sections.
    ///
    /// # Errors
    ///
    /// Returns [`PeerNamesError::Document`] if the document is not valid TOML
    /// or an entry lacks a string `name`.
    pub fn parse_document_str(document: &str) -> Result<Self, PeerNamesError> {
        let parsed: PeerDocument = toml::from_str(document)?;

        let mut names = Self::new();
        for entry in parsed.peer {
            names.insert(entry.public_key, entry.name);
        }
        for (key, section) in parsed.sections {
            names.insert(key, section.name);
        }
        Ok(names)
    }

    /// Builds the final mapping from the inline list and the document.
    ///
    /// Entries from the document override inline entries with the same key.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error from either source.
    pub fn resolve(
        inline: Option<&str>,
        document: Option<&mut dyn Read>,
    ) -> Result<Self, PeerNamesError> {
        let mut names = match inline {
            Some(list) => Self::parse_inline(list)?,
            None => Self::new(),
        };
        if let Some(reader) = document {
            names.extend(Self::parse_document(reader)?);
        }

        for key in names.names.keys() {
            if PublicKey::from_base64(key).is_err() {
                warn!(key = %key, "peer name mapping key is not a valid WireGuard public key");
            }
        }

        Ok(names)
    }

    /// Adds or replaces a mapping.
    pub fn insert(&mut self, key: impl Into<String>, name: impl Into<String>) {
        self.names.insert(key.into(), name.into());
    }

    /// Merges `other` into `self`; entries of `other` win.
    pub fn extend(&mut self, other: Self) {
        self.names.extend(other.names);
    }

    /// Looks up the name for a base64 public key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    /// Number of mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PeerNames
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut names = Self::new();
        for (key, name) in iter {
            names.insert(key, name);
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod inline_tests {
        use super::*;
        use test_case::test_case;

        #[test]
        fn parses_pairs() {
            let names = PeerNames::parse_inline("abc:alice,def:bob").expect("valid list");
            assert_eq!(names.len(), 2);
            assert_eq!(names.get("abc"), Some("alice"));
            assert_eq!(names.get("def"), Some("bob"));
        }

        #[test]
        fn empty_string_is_empty_mapping() {
            let names = PeerNames::parse_inline("").expect("empty list");
            assert!(names.is_empty());
        }

        #[test]
        fn last_duplicate_wins() {
            let names = PeerNames::parse_inline("abc:alice,abc:carol").expect("valid list");
            assert_eq!(names.len(), 1);
            assert_eq!(names.get("abc"), Some("carol"));
        }

        #[test]
        fn values_are_not_trimmed() {
            let names = PeerNames::parse_inline("abc: alice").expect("valid list");
            assert_eq!(names.get("abc"), Some(" alice"));
        }

        #[test_case("abc" ; "no colon")]
        #[test_case("abc:alice:extra" ; "two colons")]
        #[test_case("abc:alice," ; "trailing comma")]
        #[test_case("abc:alice,,def:bob" ; "empty element")]
        #[test_case("abc:alice,def" ; "second element invalid")]
        fn malformed_entry_is_an_error(list: &str) {
            let result = PeerNames::parse_inline(list);
            assert!(matches!(result, Err(PeerNamesError::InvalidEntry { .. })));
        }

        #[test]
        fn error_names_offending_entry() {
            let err = PeerNames::parse_inline("abc:alice,broken").unwrap_err();
            assert!(err.to_string().contains("\"broken\""));
        }
    }

    mod document_tests {
        use super::*;
        use test_case::test_case;

        #[test]
        fn keyed_sections() {
            let doc = r#"
                ["abc"]
                name = "alice"

                ["def"]
                name = "bob"
                comment = "extra fields are ignored"
            "#;
            let names = PeerNames::parse_document_str(doc).expect("valid document");
            assert_eq!(names.len(), 2);
            assert_eq!(names.get("abc"), Some("alice"));
            assert_eq!(names.get("def"), Some("bob"));
        }

        #[test]
        fn peer_array() {
            let doc = r#"
                [[peer]]
                public_key = "abc"
                name = "alice"

                [[peer]]
                public_key = "abc"
                name = "carol"
            "#;
            let names = PeerNames::parse_document_str(doc).expect("valid document");
            assert_eq!(names.len(), 1);
            assert_eq!(names.get("abc"), Some("carol"));
        }

        #[test]
        fn sections_override_peer_array() {
            let doc = r#"
                ["abc"]
                name = "from-section"

                [[peer]]
                public_key = "abc"
                name = "from-array"
            "#;
            let names = PeerNames::parse_document_str(doc).expect("valid document");
            assert_eq!(names.get("abc"), Some("from-section"));
        }

        #[test]
        fn base64_keys_need_quoting() {
            let doc = r#"
                ["xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg="]
                name = "laptop"
            "#;
            let names = PeerNames::parse_document_str(doc).expect("valid document");
            assert_eq!(
                names.get("xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg="),
                Some("laptop")
            );
        }

        #[test]
        fn empty_document_is_empty_mapping() {
            let names = PeerNames::parse_document_str("").expect("empty document");
            assert!(names.is_empty());
        }

        #[test_case("[abc" ; "unterminated table")]
        #[test_case("[\"abc\"]\nlabel = \"alice\"" ; "missing name")]
        #[test_case("[\"abc\"]\nname = 42" ; "name not a string")]
        #[test_case("abc = \"alice\"" ; "bare value")]
        fn malformed_document_is_an_error(doc: &str) {
            let result = PeerNames::parse_document_str(doc);
            assert!(matches!(result, Err(PeerNamesError::Document { .. })));
        }

        #[test]
        fn reader_input() {
            let doc = b"[\"abc\"]\nname = \"alice\"\n";
            let names = PeerNames::parse_document(&doc[..]).expect("valid document");
            assert_eq!(names.get("abc"), Some("alice"));
        }

        #[test]
        fn failing_reader_is_io_error() {
            struct Broken;
            impl Read for Broken {
                fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                    Err(std::io::Error::other("disk on fire"))
                }
            }
            let result = PeerNames::parse_document(Broken);
            assert!(matches!(result, Err(PeerNamesError::Io(_))));
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn inline_only() {
            let names = PeerNames::resolve(Some("abc:alice,def:bob"), None).expect("resolve");
            let expected: PeerNames = [("abc", "alice"), ("def", "bob")].into_iter().collect();
            assert_eq!(names, expected);
        }

        #[test]
        fn document_wins_over_inline() {
            let mut doc: &[u8] = b"[\"abc\"]\nname = \"from-file\"\n";
            let names = PeerNames::resolve(Some("abc:from-flag,def:bob"), Some(&mut doc))
                .expect("resolve");

            assert_eq!(names.get("abc"), Some("from-file"));
            assert_eq!(names.get("def"), Some("bob"));
        }

        #[test]
        fn neither_source() {
            let names = PeerNames::resolve(None, None).expect("resolve");
            assert!(names.is_empty());
        }

        #[test]
        fn inline_error_aborts() {
            let mut doc: &[u8] = b"";
            let result = PeerNames::resolve(Some("nocolon"), Some(&mut doc));
            assert!(result.is_err());
        }

        #[test]
        fn document_error_aborts() {
            let mut doc: &[u8] = b"[broken";
            let result = PeerNames::resolve(Some("abc:alice"), Some(&mut doc));
            assert!(matches!(result, Err(PeerNamesError::Document { .. })));
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn valid_lists_yield_one_entry_per_distinct_key(
                pairs in prop::collection::vec(("[A-Za-z0-9+/=]{1,12}", "[a-z0-9 _-]{0,12}"), 1..16)
            ) {
                let list = pairs
                    .iter()
                    .map(|(k, v)| format!("{k}:{v}"))
                    .collect::<Vec<_>>()
                    .join(",");
                let names = PeerNames::parse_inline(&list).unwrap();

                let mut expected = HashMap::new();
                for (k, v) in &pairs {
                    expected.insert(k.clone(), v.clone());
                }
                prop_assert_eq!(names.len(), expected.len());
                for (k, v) in &expected {
                    prop_assert_eq!(names.get(k), Some(v.as_str()));
                }
            }

            #[test]
            fn entries_without_exactly_one_colon_fail(
                prefix in "[a-z]{1,8}:[a-z]{1,8}",
                bad in "[a-z]{0,8}|[a-z]{1,4}:[a-z]{1,4}:[a-z]{1,4}",
            ) {
                let list = format!("{prefix},{bad}");
                prop_assert!(PeerNames::parse_inline(&list).is_err());
            }
        }
    }
}
