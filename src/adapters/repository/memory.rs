//! In-process repository
//!
//! A [`Connector`] whose collections, users and documents live in memory.
//! It enforces the same multimap rules as a real store (duplicate pairs are
//! rejected, removing an unattached pair fails) and records every rule
//! invocation, which makes it the backend of choice for tests.

use super::traits::{
    Collection, ConnectionSettings, Connector, RepositoryResult, RuleInvoker, Session,
    CLOSE_COLLECTION_RULE, OPEN_COLLECTION_RULE,
};
use crate::config::secret_string;
use crate::domain::avu::{self, Avu, UserProfile};
use crate::domain::errors::RepositoryError;
use crate::domain::ids::CollectionPath;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A recorded rule invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCall {
    /// Rule name
    pub rule: String,
    /// Collection the rule ran for
    pub collection: CollectionPath,
}

#[derive(Debug, Default)]
struct CollectionData {
    avus: Vec<Avu>,
    documents: BTreeMap<String, Vec<u8>>,
}

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<CollectionPath, CollectionData>,
    users: BTreeMap<String, UserProfile>,
    rule_calls: Vec<RuleCall>,
    connection_failure: Option<String>,
    failing_rules: Vec<String>,
    connections: usize,
}

/// Shared in-memory repository; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<State>>,
}

impl MemoryRepository {
    /// Creates an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection settings accepted by this backend
    pub fn settings() -> ConnectionSettings {
        ConnectionSettings {
            host: "localhost".to_string(),
            port: 1247,
            user: "rods".to_string(),
            password: secret_string("rods".to_string()),
            zone: "tempZone".to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates (or replaces) a collection with the given AVUs
    pub fn add_collection(&self, path: &CollectionPath, avus: Vec<Avu>) {
        let mut state = self.lock();
        let data = state.collections.entry(path.clone()).or_default();
        data.avus = avus;
    }

    /// Stores a data object inside a collection
    pub fn add_document(&self, path: &CollectionPath, name: &str, content: impl Into<Vec<u8>>) {
        let mut state = self.lock();
        let data = state.collections.entry(path.clone()).or_default();
        data.documents.insert(name.to_string(), content.into());
    }

    /// Registers a user
    pub fn add_user(&self, user: UserProfile) {
        self.lock().users.insert(user.name.clone(), user);
    }

    /// Makes every following `connect` fail with `message`
    pub fn fail_connections(&self, message: impl Into<String>) {
        self.lock().connection_failure = Some(message.into());
    }

    /// Makes every following invocation of `rule` fail
    pub fn fail_rule(&self, rule: &str) {
        self.lock().failing_rules.push(rule.to_string());
    }

    /// Snapshot of a collection's AVUs (empty for unknown collections)
    pub fn avus(&self, path: &CollectionPath) -> Vec<Avu> {
        self.lock()
            .collections
            .get(path)
            .map(|data| data.avus.clone())
            .unwrap_or_default()
    }

    /// Rule invocations in call order
    pub fn rule_calls(&self) -> Vec<RuleCall> {
        self.lock().rule_calls.clone()
    }

    /// Number of sessions opened so far
    pub fn connections(&self) -> usize {
        self.lock().connections
    }
}

impl Connector for MemoryRepository {
    fn connect(&self, settings: &ConnectionSettings) -> RepositoryResult<Box<dyn Session>> {
        let mut state = self.lock();
        if let Some(message) = &state.connection_failure {
            return Err(RepositoryError::ConnectionFailed(format!(
                "{}:{}: {message}",
                settings.host, settings.port
            )));
        }
        state.connections += 1;
        Ok(Box::new(MemorySession { repo: self.clone() }))
    }
}

struct MemorySession {
    repo: MemoryRepository,
}

impl Session for MemorySession {
    fn collection(&self, path: &CollectionPath) -> RepositoryResult<Box<dyn Collection>> {
        if !self.repo.lock().collections.contains_key(path) {
            return Err(RepositoryError::CollectionNotFound(path.to_string()));
        }
        Ok(Box::new(MemoryCollection {
            repo: self.repo.clone(),
            path: path.clone(),
        }))
    }

    fn user(&self, name: &str) -> RepositoryResult<UserProfile> {
        self.repo
            .lock()
            .users
            .get(name)
            .cloned()
            .ok_or_else(|| RepositoryError::UserNotFound(name.to_string()))
    }

    fn rules(&self, collection: &CollectionPath) -> Box<dyn RuleInvoker> {
        Box::new(MemoryRules {
            repo: self.repo.clone(),
            collection: collection.clone(),
        })
    }
}

struct MemoryCollection {
    repo: MemoryRepository,
    path: CollectionPath,
}

impl MemoryCollection {
    fn with_data<T>(
        &self,
        f: impl FnOnce(&mut CollectionData) -> RepositoryResult<T>,
    ) -> RepositoryResult<T> {
        let mut state = self.repo.lock();
        let data = state
            .collections
            .get_mut(&self.path)
            .ok_or_else(|| RepositoryError::CollectionNotFound(self.path.to_string()))?;
        f(data)
    }
}

impl Collection for MemoryCollection {
    fn path(&self) -> &CollectionPath {
        &self.path
    }

    fn metadata(&self) -> RepositoryResult<Vec<Avu>> {
        self.with_data(|data| Ok(data.avus.clone()))
    }

    fn add_metadata(&self, avu: Avu) -> RepositoryResult<()> {
        self.with_data(|data| avu::attach(&mut data.avus, avu))
    }

    fn remove_metadata(&self, name: &str, value: &str) -> RepositoryResult<()> {
        self.with_data(|data| avu::detach(&mut data.avus, name, value))
    }

    fn open_document(&self, name: &str) -> RepositoryResult<Box<dyn Read + '_>> {
        let content = self.with_data(|data| {
            data.documents
                .get(name)
                .cloned()
                .ok_or_else(|| RepositoryError::DocumentNotFound(self.path.join(name)))
        })?;
        Ok(Box::new(Cursor::new(content)))
    }
}

struct MemoryRules {
    repo: MemoryRepository,
    collection: CollectionPath,
}

impl MemoryRules {
    fn invoke(&self, rule: &str) -> RepositoryResult<()> {
        let mut state = self.repo.lock();
        state.rule_calls.push(RuleCall {
            rule: rule.to_string(),
            collection: self.collection.clone(),
        });
        if state.failing_rules.iter().any(|failing| failing == rule) {
            return Err(RepositoryError::RuleFailed {
                rule: rule.to_string(),
                message: "rule configured to fail".to_string(),
            });
        }
        Ok(())
    }
}

impl RuleInvoker for MemoryRules {
    fn open_collection(&self) -> RepositoryResult<()> {
        self.invoke(OPEN_COLLECTION_RULE)
    }

    fn close_collection(&self) -> RepositoryResult<()> {
        self.invoke(CLOSE_COLLECTION_RULE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> CollectionPath {
        CollectionPath::new("/zone/P1/C1").unwrap()
    }

    #[test]
    fn test_connect_and_fetch_collection() {
        let repo = MemoryRepository::new();
        repo.add_collection(&path(), vec![Avu::new("title", "Study")]);

        let session = repo.connect(&MemoryRepository::settings()).unwrap();
        let collection = session.collection(&path()).unwrap();
        assert_eq!(collection.metadata().unwrap(), vec![Avu::new("title", "Study")]);
        assert_eq!(repo.connections(), 1);
    }

    #[test]
    fn test_connection_failure() {
        let repo = MemoryRepository::new();
        repo.fail_connections("refused");
        let err = repo.connect(&MemoryRepository::settings()).err().unwrap();
        assert!(matches!(err, RepositoryError::ConnectionFailed(_)));
    }

    #[test]
    fn test_unknown_collection_and_user() {
        let repo = MemoryRepository::new();
        let session = repo.connect(&MemoryRepository::settings()).unwrap();
        assert!(matches!(
            session.collection(&path()).err().unwrap(),
            RepositoryError::CollectionNotFound(_)
        ));
        assert!(matches!(
            session.user("nobody").unwrap_err(),
            RepositoryError::UserNotFound(_)
        ));
    }

    #[test]
    fn test_documents() {
        let repo = MemoryRepository::new();
        repo.add_document(&path(), "metadata.xml", "<meta/>");
        let session = repo.connect(&MemoryRepository::settings()).unwrap();
        let collection = session.collection(&path()).unwrap();

        let mut content = String::new();
        collection
            .open_document("metadata.xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<meta/>");

        assert!(matches!(
            collection.open_document("missing.xml").err().unwrap(),
            RepositoryError::DocumentNotFound(_)
        ));
    }

    #[test]
    fn test_rules_recorded_and_failing() {
        let repo = MemoryRepository::new();
        repo.fail_rule(CLOSE_COLLECTION_RULE);
        let session = repo.connect(&MemoryRepository::settings()).unwrap();
        let rules = session.rules(&path());

        rules.open_collection().unwrap();
        assert!(rules.close_collection().is_err());

        let calls = repo.rule_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].rule, OPEN_COLLECTION_RULE);
        assert_eq!(calls[1].rule, CLOSE_COLLECTION_RULE);
        assert_eq!(calls[1].collection, path());
    }
}
