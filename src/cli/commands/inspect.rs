//! Inspect command implementation
//!
//! Parses a local `metadata.xml` without touching the repository and prints
//! the fields it contributes to the metadata record.

use crate::core::xml::{parse_document, parse_record_fields};
use crate::domain::metadata::{MetadataRecord, TaggedField};
use crate::domain::ExporterError;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path of the XML document
    pub file: PathBuf,

    /// Print compact JSON instead of pretty JSON
    #[arg(long)]
    pub compact: bool,
}

/// The XML-backed part of a metadata record
#[derive(Debug, Serialize)]
pub struct DocumentFields<'a> {
    pub date: Option<&'a str>,
    pub description: Option<&'a str>,
    pub tissue: &'a TaggedField,
    pub technology: &'a TaggedField,
    pub organism: &'a TaggedField,
    pub factors: &'a [String],
    pub protocol: &'a [BTreeMap<String, String>],
    pub contact: &'a [BTreeMap<String, String>],
    pub articles: &'a [String],
}

impl<'a> From<&'a MetadataRecord> for DocumentFields<'a> {
    fn from(record: &'a MetadataRecord) -> Self {
        Self {
            date: record.date.as_deref(),
            description: record.description.as_deref(),
            tissue: &record.tissue,
            technology: &record.technology,
            organism: &record.organism,
            factors: &record.factors,
            protocol: &record.protocol,
            contact: &record.contact,
            articles: &record.articles,
        }
    }
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self) -> anyhow::Result<i32> {
        let record = match inspect_file(&self.file) {
            Ok(record) => record,
            Err(e) => {
                eprintln!("❌ Failed to inspect {}", self.file.display());
                eprintln!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        let fields = DocumentFields::from(&record);
        let json = if self.compact {
            serde_json::to_string(&fields)?
        } else {
            serde_json::to_string_pretty(&fields)?
        };
        println!("{json}");
        Ok(0)
    }
}

/// Reads and parses a local XML document into a fresh record
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read and a parse error if the
/// document is malformed or lacks `date`.
pub fn inspect_file(path: &std::path::Path) -> crate::domain::Result<MetadataRecord> {
    let bytes = std::fs::read(path)
        .map_err(|e| ExporterError::Io(format!("{}: {e}", path.display())))?;
    let root = parse_document(&bytes)?;

    let mut record = MetadataRecord::new();
    parse_record_fields(&root, &mut record)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParseError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_inspect_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("metadata.xml");
        fs::write(
            &file,
            "<metadata><date>2019-05-01</date><factors><f>dose</f></factors></metadata>",
        )
        .unwrap();

        let record = inspect_file(&file).unwrap();
        let json = serde_json::to_value(DocumentFields::from(&record)).unwrap();
        assert_eq!(json["date"], "2019-05-01");
        assert_eq!(json["factors"], serde_json::json!(["dose"]));
        assert_eq!(json["tissue"], serde_json::json!([]));
        assert!(json.get("title").is_none());
    }

    #[test]
    fn test_inspect_file_errors() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.xml");
        assert!(matches!(inspect_file(&missing), Err(ExporterError::Io(_))));

        let undated = temp.path().join("undated.xml");
        fs::write(&undated, "<metadata/>").unwrap();
        assert!(matches!(
            inspect_file(&undated),
            Err(ExporterError::Parse(ParseError::ElementNotFound(_)))
        ));
    }
}
