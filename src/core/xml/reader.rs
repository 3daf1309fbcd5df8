//! Tag reader
//!
//! Pure functions that pull scalars, lists and lists of maps out of a parsed
//! `metadata.xml` tree. Only [`read_scalar_or_tagged`] and
//! [`read_required_text`] fail on a missing element; every other reader
//! resolves absence to an empty value.

use super::document::Element;
use crate::domain::errors::ParseError;
use crate::domain::metadata::{MetadataRecord, OntologyTerm, TaggedField};
use std::collections::BTreeMap;

/// Substring marking an `id` attribute as an ontology reference
pub const ONTOLOGY_MARKER: &str = ":http:";

/// Attribute carrying the ontology reference
pub const ID_ATTRIBUTE: &str = "id";

/// Literal removed from the class URI of an ontology reference
const CLASS_PREFIX: &str = "class:";

/// Reads an ontology-taggable element
///
/// - element without text: [`TaggedField::Absent`]
/// - `id` attribute containing `:http:`: split on the first `:` into
///   vocabulary and URI, with `class:` removed from the URI
/// - otherwise: a plain term carrying only the text
///
/// # Errors
///
/// Returns [`ParseError::ElementNotFound`] when no element matches `tag`.
/// Use [`read_optional_tagged`] for optional fields.
///
/// # Examples
///
/// ```
/// use irods_exporter::core::xml::{parse_document, read_scalar_or_tagged};
/// use irods_exporter::domain::TaggedField;
///
/// let root = parse_document(
///     br#"<meta><organism id="NCBITaxon:http://purl.obolibrary.org/obo/class:NCBITaxon_9606">Homo sapiens</organism></meta>"#,
/// ).unwrap();
///
/// let TaggedField::Term(term) = read_scalar_or_tagged(&root, "organism").unwrap() else {
///     panic!("expected a term");
/// };
/// assert_eq!(term.vocabulary, "NCBITaxon");
/// assert_eq!(term.uri, "http://purl.obolibrary.org/obo/NCBITaxon_9606");
/// assert_eq!(term.name, "Homo sapiens");
/// ```
pub fn read_scalar_or_tagged(root: &Element, tag: &str) -> Result<TaggedField, ParseError> {
    let element = root
        .find(tag)
        .ok_or_else(|| ParseError::ElementNotFound(tag.to_string()))?;

    let Some(name) = element.text() else {
        return Ok(TaggedField::Absent);
    };

    let reference = element
        .get(ID_ATTRIBUTE)
        .filter(|id| id.contains(ONTOLOGY_MARKER))
        .and_then(|id| id.split_once(':'));

    let term = match reference {
        Some((vocabulary, uri)) => OntologyTerm {
            vocabulary: vocabulary.to_string(),
            uri: uri.replacen(CLASS_PREFIX, "", 1),
            name: name.to_string(),
        },
        None => OntologyTerm::plain(name),
    };

    Ok(TaggedField::Term(term))
}

/// Reads an optional ontology-taggable element; absence yields
/// [`TaggedField::Absent`]
pub fn read_optional_tagged(root: &Element, tag: &str) -> TaggedField {
    match read_scalar_or_tagged(root, tag) {
        Ok(field) => field,
        Err(_) => TaggedField::Absent,
    }
}

/// Collects every non-null text under each element matching `tag`
///
/// The matched element's own text is included; order is document order.
pub fn read_flat_text_list(root: &Element, tag: &str) -> Vec<String> {
    root.find_all(tag)
        .into_iter()
        .flat_map(|element| element.iter())
        .filter_map(|node| node.text().map(str::to_string))
        .collect()
}

/// Collects the non-null text of each direct child of the elements
/// matching `tag`, flattened across matches
pub fn read_child_text_list(root: &Element, tag: &str) -> Vec<String> {
    root.find_all(tag)
        .into_iter()
        .flat_map(|element| element.children.iter())
        .filter_map(|child| child.text().map(str::to_string))
        .collect()
}

/// Builds one child-tag to child-text map per element matching `tag`
///
/// Children without text are skipped; a repeated child tag overwrites the
/// earlier value.
pub fn read_child_text_maps(root: &Element, tag: &str) -> Vec<BTreeMap<String, String>> {
    root.find_all(tag)
        .into_iter()
        .map(|element| {
            let mut map = BTreeMap::new();
            for child in &element.children {
                if let Some(text) = child.text() {
                    map.insert(child.tag.clone(), text.to_string());
                }
            }
            map
        })
        .collect()
}

/// Text of a required element
///
/// # Errors
///
/// [`ParseError::ElementNotFound`] when the element is missing,
/// [`ParseError::MissingText`] when it has no text.
pub fn read_required_text(root: &Element, tag: &str) -> Result<String, ParseError> {
    let element = root
        .find(tag)
        .ok_or_else(|| ParseError::ElementNotFound(tag.to_string()))?;
    element
        .text()
        .map(str::to_string)
        .ok_or_else(|| ParseError::MissingText(tag.to_string()))
}

/// Text of an optional element
pub fn read_optional_text(root: &Element, tag: &str) -> Option<String> {
    root.find(tag)
        .and_then(Element::text)
        .map(str::to_string)
}

/// Fills the XML-backed fields of `record` from the document root
///
/// # Errors
///
/// Fails only when the required `date` element is missing or empty.
pub fn parse_record_fields(root: &Element, record: &mut MetadataRecord) -> Result<(), ParseError> {
    record.date = Some(read_required_text(root, "date")?);
    record.description = read_optional_text(root, "description");

    record.tissue = read_optional_tagged(root, "tissue");
    record.technology = read_optional_tagged(root, "technology");
    record.organism = read_optional_tagged(root, "organism");

    record.factors = read_child_text_list(root, "factors");
    record.protocol = read_child_text_maps(root, "protocol");
    record.contact = read_child_text_maps(root, "contact");

    record.articles = read_flat_text_list(root, "article");

    tracing::debug!(
        factors = record.factors.len(),
        protocols = record.protocol.len(),
        contacts = record.contact.len(),
        articles = record.articles.len(),
        "Parsed metadata document"
    );

    Ok(())
}
