//! Metadata record
//!
//! The canonical in-memory representation of a collection's metadata. It is
//! filled from two sources (the collection's AVUs and its `metadata.xml`)
//! and read by the downstream publishing logic.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Namespace prefix stripped from collection attribute names by default
pub const DEFAULT_ATTRIBUTE_PREFIX: &str = "dcat:";

/// Ontology reference resolved from an XML element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OntologyTerm {
    /// Vocabulary prefix (e.g. `NCBITaxon`), empty for free text
    pub vocabulary: String,

    /// Class URI, empty for free text
    pub uri: String,

    /// Element text
    pub name: String,
}

impl OntologyTerm {
    /// Free-text term without an ontology reference
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            vocabulary: String::new(),
            uri: String::new(),
            name: name.into(),
        }
    }
}

/// Value of an ontology-taggable field (`tissue`, `technology`, `organism`)
///
/// Serializes as `[]` when absent and as a `{vocabulary, uri, name}` object
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TaggedField {
    /// Element missing or without text
    #[default]
    Absent,
    /// Element with text
    Term(OntologyTerm),
}

impl TaggedField {
    /// Returns the term, if any
    pub fn term(&self) -> Option<&OntologyTerm> {
        match self {
            TaggedField::Absent => None,
            TaggedField::Term(term) => Some(term),
        }
    }

    /// Whether the field has no value
    pub fn is_absent(&self) -> bool {
        matches!(self, TaggedField::Absent)
    }
}

impl Serialize for TaggedField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TaggedField::Absent => serializer.serialize_seq(Some(0))?.end(),
            TaggedField::Term(term) => term.serialize(serializer),
        }
    }
}

/// Collection attributes copied from the collection's AVUs
///
/// Recognized attribute names (after lower-casing and stripping the
/// namespace prefix) map to typed fields: `title`, `creator`, `publisher`,
/// `identifier`, `license`, `version`. Everything else is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionAttributes {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub publisher: Option<String>,
    pub identifier: Option<String>,
    pub license: Option<String>,
    pub version: Option<String>,

    /// Unrecognized attributes, keyed by normalized name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl CollectionAttributes {
    /// Normalizes an attribute name: lower-case, namespace prefix removed
    ///
    /// ```
    /// use irods_exporter::domain::metadata::CollectionAttributes;
    ///
    /// assert_eq!(CollectionAttributes::normalize_name("DCAT:Title", "dcat:"), "title");
    /// assert_eq!(CollectionAttributes::normalize_name("projectId", "dcat:"), "projectid");
    /// ```
    pub fn normalize_name(name: &str, prefix: &str) -> String {
        let lowered = name.to_lowercase();
        let prefix = prefix.to_lowercase();
        if !prefix.is_empty() {
            if let Some(stripped) = lowered.strip_prefix(prefix.as_str()) {
                return stripped.to_string();
            }
        }
        lowered
    }

    /// Stores one attribute; a repeated name overwrites the earlier value
    ///
    /// Returns `true` when the name is one of the recognized fields.
    pub fn set(&mut self, name: &str, value: &str, prefix: &str) -> bool {
        let key = Self::normalize_name(name, prefix);
        let value = value.to_string();
        let slot = match key.as_str() {
            "title" => &mut self.title,
            "creator" => &mut self.creator,
            "publisher" => &mut self.publisher,
            "identifier" => &mut self.identifier,
            "license" => &mut self.license,
            "version" => &mut self.version,
            _ => {
                self.extra.insert(key, value);
                return false;
            }
        };
        *slot = Some(value);
        true
    }
}

/// Canonical metadata record for one collection export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    /// Attributes copied from the collection
    #[serde(flatten)]
    pub attributes: CollectionAttributes,

    /// Email of the user named by the `creator` attribute
    pub creator_email: Option<String>,

    /// Required `date` element
    pub date: Option<String>,

    /// Optional `description` element
    pub description: Option<String>,

    pub tissue: TaggedField,
    pub technology: TaggedField,
    pub organism: TaggedField,

    /// Text of each child of the `factors` elements
    pub factors: Vec<String>,

    /// One child-tag to child-text map per `protocol` element
    pub protocol: Vec<BTreeMap<String, String>>,

    /// One child-tag to child-text map per `contact` element
    pub contact: Vec<BTreeMap<String, String>>,

    /// Every text value found under the `article` elements
    pub articles: Vec<String>,
}

impl MetadataRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the creating user, if the collection carries one
    pub fn creator(&self) -> Option<&str> {
        self.attributes.creator.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_name() {
        assert_eq!(CollectionAttributes::normalize_name("DCAT:title", "dcat:"), "title");
        assert_eq!(CollectionAttributes::normalize_name("dcat:Creator", "DCAT:"), "creator");
        assert_eq!(CollectionAttributes::normalize_name("Title", ""), "title");
        // only a leading prefix is stripped
        assert_eq!(
            CollectionAttributes::normalize_name("foo:dcat:title", "dcat:"),
            "foo:dcat:title"
        );
    }

    #[test]
    fn test_set_recognized_and_extra() {
        let mut attributes = CollectionAttributes::default();
        assert!(attributes.set("DCAT:title", "Liver study", DEFAULT_ATTRIBUTE_PREFIX));
        assert!(!attributes.set("projectId", "P000000001", DEFAULT_ATTRIBUTE_PREFIX));

        assert_eq!(attributes.title.as_deref(), Some("Liver study"));
        assert_eq!(
            attributes.extra.get("projectid").map(String::as_str),
            Some("P000000001")
        );
    }

    #[test]
    fn test_set_last_value_wins() {
        let mut attributes = CollectionAttributes::default();
        attributes.set("creator", "alice", DEFAULT_ATTRIBUTE_PREFIX);
        attributes.set("dcat:creator", "bob", DEFAULT_ATTRIBUTE_PREFIX);
        assert_eq!(attributes.creator.as_deref(), Some("bob"));
    }

    #[test]
    fn test_tagged_field_serialization() {
        assert_eq!(serde_json::to_value(TaggedField::Absent).unwrap(), json!([]));
        assert_eq!(
            serde_json::to_value(TaggedField::Term(OntologyTerm::plain("Liver"))).unwrap(),
            json!({"vocabulary": "", "uri": "", "name": "Liver"})
        );
    }

    #[test]
    fn test_record_serialization_flattens_attributes() {
        let mut record = MetadataRecord::new();
        record.attributes.title = Some("Study".to_string());
        record.date = Some("2020-01-01".to_string());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["title"], json!("Study"));
        assert_eq!(value["date"], json!("2020-01-01"));
        assert_eq!(value["tissue"], json!([]));
        assert!(value.get("extra").is_none());
    }
}
