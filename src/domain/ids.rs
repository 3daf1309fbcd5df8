//! Domain identifier types with validation
//!
//! Newtype wrappers for the names the exporter passes around, so a
//! repository name cannot be confused with a collection path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the publishing platform a collection is exported to
///
/// Used as the prefix of every tagged export-state value
/// (`"<repository>:<state>"`).
///
/// # Examples
///
/// ```
/// use irods_exporter::domain::ids::RepositoryName;
/// use std::str::FromStr;
///
/// let repo = RepositoryName::from_str("Dataverse").unwrap();
/// assert_eq!(repo.as_str(), "Dataverse");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Creates a new RepositoryName
    ///
    /// Returns `Err` if the name is empty or only whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err("Repository name cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the repository name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RepositoryName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RepositoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Absolute path of a collection inside the repository
///
/// Trailing slashes are removed, so `/zone/home/P000/C000/` and
/// `/zone/home/P000/C000` are the same collection.
///
/// # Examples
///
/// ```
/// use irods_exporter::domain::ids::CollectionPath;
/// use std::str::FromStr;
///
/// let path = CollectionPath::from_str("/nlmumc/projects/P000000001/C000000001/").unwrap();
/// assert_eq!(path.as_str(), "/nlmumc/projects/P000000001/C000000001");
/// assert_eq!(path.join("metadata.xml"), "/nlmumc/projects/P000000001/C000000001/metadata.xml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Creates a new CollectionPath
    ///
    /// Returns `Err` if the path is empty or not absolute.
    pub fn new(path: impl Into<String>) -> Result<Self, String> {
        let path = path.into();
        let path = path.trim();
        if path.is_empty() {
            return Err("Collection path cannot be empty".to_string());
        }
        if !path.starts_with('/') {
            return Err(format!("Collection path must be absolute, got: {path}"));
        }

        let normalized = path.trim_end_matches('/');
        if normalized.is_empty() {
            return Err("Collection path cannot be the repository root".to_string());
        }

        Ok(Self(normalized.to_string()))
    }

    /// Returns the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of a data object directly inside this collection
    pub fn join(&self, name: &str) -> String {
        format!("{}/{}", self.0, name.trim_start_matches('/'))
    }

    /// Path segments without the leading slash
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CollectionPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
