//! Export lifecycle tags
//!
//! The lifecycle of an export is stored on the collection as AVUs under
//! [`STATE_ATTRIBUTE`], each value a [`TaggedValue`] of the form
//! `"<repository>:<state>"`. The store is a multimap, so several tags can be
//! attached at once; the set of known tags is closed and listed in
//! [`ExporterState::ALL`].

use crate::domain::ids::RepositoryName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Attribute name under which export-state tags are stored
pub const STATE_ATTRIBUTE: &str = "exporterState";

/// Export lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExporterState {
    /// Export requested, waiting for an exporter
    InQueueForExport,
    /// An exporter picked the collection up
    CreateExporter,
    /// Collection metadata is being mapped
    PrepareCollection,
    /// Dataset is being created on the publishing platform
    CreateDataset,
    /// Collection content is being archived
    ZipCollection,
    /// Archive is being uploaded
    UploadZippedCollection,
    /// Upload done, finishing up
    Finalize,
    /// Export completed successfully
    Exported,
    /// Dataset could not be created
    FailedDatasetCreation,
    /// Upload failed
    UploadFailed,
    /// Archiving failed
    ZipFailed,
}

impl ExporterState {
    /// Every known state, in lifecycle order
    pub const ALL: [ExporterState; 11] = [
        ExporterState::InQueueForExport,
        ExporterState::CreateExporter,
        ExporterState::PrepareCollection,
        ExporterState::CreateDataset,
        ExporterState::ZipCollection,
        ExporterState::UploadZippedCollection,
        ExporterState::Finalize,
        ExporterState::Exported,
        ExporterState::FailedDatasetCreation,
        ExporterState::UploadFailed,
        ExporterState::ZipFailed,
    ];

    /// The tag string stored in the repository
    pub fn as_str(&self) -> &'static str {
        match self {
            ExporterState::InQueueForExport => "in-queue-for-export",
            ExporterState::CreateExporter => "create-exporter",
            ExporterState::PrepareCollection => "prepare-collection",
            ExporterState::CreateDataset => "create-dataset",
            ExporterState::ZipCollection => "zip-collection",
            ExporterState::UploadZippedCollection => "upload-zipped-collection",
            ExporterState::Finalize => "finalize",
            ExporterState::Exported => "exported",
            ExporterState::FailedDatasetCreation => "failed-dataset-creation",
            ExporterState::UploadFailed => "upload-failed",
            ExporterState::ZipFailed => "zip-failed",
        }
    }

    /// Whether this state records a failed export
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ExporterState::FailedDatasetCreation
                | ExporterState::UploadFailed
                | ExporterState::ZipFailed
        )
    }

    /// Whether the export ended in this state
    pub fn is_terminal(&self) -> bool {
        self.is_failure() || *self == ExporterState::Exported
    }
}

impl fmt::Display for ExporterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExporterState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExporterState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("Unknown exporter state: {s}"))
    }
}

/// A `"<repository>:<state>"` value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaggedValue {
    pub repository: RepositoryName,
    pub state: ExporterState,
}

impl TaggedValue {
    /// Creates a tagged value
    pub fn new(repository: &RepositoryName, state: ExporterState) -> Self {
        Self {
            repository: repository.clone(),
            state,
        }
    }

    /// Parses a stored value; `None` for values that are not known tags
    ///
    /// State tags never contain `:`, so the split happens at the last one.
    /// The repository part must be stored exactly as [`Display`](fmt::Display)
    /// writes it; a padded name is not a known tag.
    ///
    /// ```
    /// use irods_exporter::core::state::{ExporterState, TaggedValue};
    ///
    /// let tag = TaggedValue::parse("Dataverse:upload-failed").unwrap();
    /// assert_eq!(tag.repository.as_str(), "Dataverse");
    /// assert_eq!(tag.state, ExporterState::UploadFailed);
    /// assert!(TaggedValue::parse("Dataverse:unknown").is_none());
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        let (repository, state) = value.rsplit_once(':')?;
        if repository.trim() != repository {
            return None;
        }
        Some(Self {
            repository: RepositoryName::new(repository).ok()?,
            state: state.parse().ok()?,
        })
    }
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tags_are_distinct_and_round_trip() {
        let tags: HashSet<&str> = ExporterState::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(tags.len(), ExporterState::ALL.len());

        for state in ExporterState::ALL {
            assert_eq!(state.as_str().parse::<ExporterState>().unwrap(), state);
            assert!(!state.as_str().contains(':'));
        }
    }

    #[test]
    fn test_unknown_state() {
        assert!("queued".parse::<ExporterState>().is_err());
    }

    #[test]
    fn test_failure_and_terminal() {
        assert!(ExporterState::UploadFailed.is_failure());
        assert!(ExporterState::FailedDatasetCreation.is_terminal());
        assert!(ExporterState::Exported.is_terminal());
        assert!(!ExporterState::Exported.is_failure());
        assert!(!ExporterState::CreateExporter.is_terminal());
    }

    #[test]
    fn test_serde_uses_tag_strings() {
        let json = serde_json::to_string(&ExporterState::InQueueForExport).unwrap();
        assert_eq!(json, "\"in-queue-for-export\"");
        let state: ExporterState = serde_json::from_str("\"upload-zipped-collection\"").unwrap();
        assert_eq!(state, ExporterState::UploadZippedCollection);
    }

    #[test]
    fn test_tagged_value_format() {
        let repo = RepositoryName::new("repoA").unwrap();
        let tag = TaggedValue::new(&repo, ExporterState::CreateExporter);
        assert_eq!(tag.to_string(), "repoA:create-exporter");
    }

    #[test]
    fn test_tagged_value_parse_repository_with_colon() {
        let tag = TaggedValue::parse("ns:repo:finalize").unwrap();
        assert_eq!(tag.repository.as_str(), "ns:repo");
        assert_eq!(tag.state, ExporterState::Finalize);
    }

    #[test]
    fn test_tagged_value_parse_invalid() {
        assert!(TaggedValue::parse("no-separator").is_none());
        assert!(TaggedValue::parse(":finalize").is_none());
    }

    #[test]
    fn test_tagged_value_parse_rejects_padded_repository() {
        assert!(TaggedValue::parse(" Dataverse:upload-failed").is_none());
        assert!(TaggedValue::parse("Dataverse :upload-failed").is_none());
        assert!(TaggedValue::parse("Dataverse: upload-failed").is_none());
    }
}
