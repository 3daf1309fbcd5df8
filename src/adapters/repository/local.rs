//! Filesystem-backed repository
//!
//! Maps repository collections onto directories below a root:
//!
//! ```text
//! <root>/.users.json                    user name -> AVU list
//! <root>/<collection path>/             the collection
//! <root>/<collection path>/.avus.json   collection AVUs
//! <root>/<collection path>/.avus.json.tmp staged rewrite of .avus.json
//! <root>/<collection path>/metadata.xml data objects are plain files
//! ```
//!
//! Used for dry runs and demos. Rule invocations are only logged.

use super::traits::{
    Collection, ConnectionSettings, Connector, RepositoryResult, RuleInvoker, Session,
    CLOSE_COLLECTION_RULE, OPEN_COLLECTION_RULE,
};
use crate::domain::avu::{self, Avu, UserProfile};
use crate::domain::errors::RepositoryError;
use crate::domain::ids::CollectionPath;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

/// File holding a collection's AVUs
pub const AVU_FILE: &str = ".avus.json";

/// Staging file an AVU update is written to before it replaces [`AVU_FILE`]
pub const AVU_STAGING_FILE: &str = ".avus.json.tmp";

/// File holding the user table
pub const USERS_FILE: &str = ".users.json";

/// Connector for a repository rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalConnector {
    root: PathBuf,
}

impl LocalConnector {
    /// Creates a connector for `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Repository root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Connector for LocalConnector {
    fn connect(&self, settings: &ConnectionSettings) -> RepositoryResult<Box<dyn Session>> {
        if !self.root.is_dir() {
            return Err(RepositoryError::ConnectionFailed(format!(
                "repository root {} is not a directory",
                self.root.display()
            )));
        }

        tracing::info!(
            root = %self.root.display(),
            user = %settings.user,
            zone = %settings.zone,
            "Opened local repository session"
        );

        Ok(Box::new(LocalSession {
            root: self.root.clone(),
        }))
    }
}

struct LocalSession {
    root: PathBuf,
}

impl LocalSession {
    fn collection_dir(&self, path: &CollectionPath) -> RepositoryResult<PathBuf> {
        let mut dir = self.root.clone();
        for segment in path.segments() {
            if segment == "." || segment == ".." {
                return Err(RepositoryError::CollectionNotFound(path.to_string()));
            }
            dir.push(segment);
        }
        Ok(dir)
    }
}

impl Session for LocalSession {
    fn collection(&self, path: &CollectionPath) -> RepositoryResult<Box<dyn Collection>> {
        let dir = self.collection_dir(path)?;
        if !dir.is_dir() {
            return Err(RepositoryError::CollectionNotFound(path.to_string()));
        }
        Ok(Box::new(LocalCollection {
            dir,
            path: path.clone(),
        }))
    }

    fn user(&self, name: &str) -> RepositoryResult<UserProfile> {
        let users_path = self.root.join(USERS_FILE);
        let users: BTreeMap<String, Vec<Avu>> = match read_json(&users_path)? {
            Some(users) => users,
            None => return Err(RepositoryError::UserNotFound(name.to_string())),
        };

        users
            .get(name)
            .map(|metadata| UserProfile {
                name: name.to_string(),
                metadata: metadata.clone(),
            })
            .ok_or_else(|| RepositoryError::UserNotFound(name.to_string()))
    }

    fn rules(&self, collection: &CollectionPath) -> Box<dyn RuleInvoker> {
        Box::new(LocalRules {
            collection: collection.clone(),
        })
    }
}

struct LocalCollection {
    dir: PathBuf,
    path: CollectionPath,
}

impl LocalCollection {
    fn avu_file(&self) -> PathBuf {
        self.dir.join(AVU_FILE)
    }

    fn update(
        &self,
        f: impl FnOnce(&mut Vec<Avu>) -> RepositoryResult<()>,
    ) -> RepositoryResult<()> {
        let mut avus = self.metadata()?;
        f(&mut avus)?;
        let json = serde_json::to_string_pretty(&avus)
            .map_err(|e| RepositoryError::Io(e.to_string()))?;

        // .avus.json is only ever replaced whole
        let staged = self.dir.join(AVU_STAGING_FILE);
        fs::write(&staged, json).map_err(|e| RepositoryError::Io(e.to_string()))?;
        fs::rename(&staged, self.avu_file()).map_err(|e| RepositoryError::Io(e.to_string()))
    }
}

impl Collection for LocalCollection {
    fn path(&self) -> &CollectionPath {
        &self.path
    }

    fn metadata(&self) -> RepositoryResult<Vec<Avu>> {
        Ok(read_json(&self.avu_file())?.unwrap_or_default())
    }

    fn add_metadata(&self, avu: Avu) -> RepositoryResult<()> {
        self.update(|avus| avu::attach(avus, avu))
    }

    fn remove_metadata(&self, name: &str, value: &str) -> RepositoryResult<()> {
        self.update(|avus| avu::detach(avus, name, value))
    }

    fn open_document(&self, name: &str) -> RepositoryResult<Box<dyn Read + '_>> {
        let relative = Path::new(name);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(RepositoryError::DocumentNotFound(self.path.join(name)));
        }

        match File::open(self.dir.join(relative)) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(RepositoryError::DocumentNotFound(self.path.join(name)))
            }
            Err(e) => Err(RepositoryError::Io(e.to_string())),
        }
    }
}

struct LocalRules {
    collection: CollectionPath,
}

impl RuleInvoker for LocalRules {
    fn open_collection(&self) -> RepositoryResult<()> {
        tracing::info!(
            rule = OPEN_COLLECTION_RULE,
            collection = %self.collection,
            "Invoking rule"
        );
        Ok(())
    }

    fn close_collection(&self) -> RepositoryResult<()> {
        tracing::info!(
            rule = CLOSE_COLLECTION_RULE,
            collection = %self.collection,
            "Invoking rule"
        );
        Ok(())
    }
}

/// Reads a JSON file, `None` when it does not exist
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> RepositoryResult<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(RepositoryError::Io(e.to_string())),
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| RepositoryError::Io(format!("{}: {e}", path.display())))
}
