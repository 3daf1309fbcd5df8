//! `metadata.xml` parsing
//!
//! - [`document`] - element tree built from the raw bytes
//! - [`reader`] - tag readers that normalize the tree into record fields

pub mod document;
pub mod reader;

pub use document::{parse_document, Element};
pub use reader::{
    parse_record_fields, read_child_text_list, read_child_text_maps, read_flat_text_list,
    read_optional_tagged, read_optional_text, read_required_text, read_scalar_or_tagged,
};
