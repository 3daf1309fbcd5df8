//! Metadata store adapter
//!
//! The only place the exporter writes collection metadata. Both operations
//! are idempotent from the caller's point of view: a duplicate add or a
//! missing remove is logged and reported as [`AvuOutcome::Rejected`] instead
//! of failing, so a single stale or already-present value never aborts an
//! export.

use super::traits::Collection;
use crate::domain::avu::Avu;
use crate::domain::Result;
use tracing::Span;

/// What happened to a single add/remove request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvuOutcome {
    /// The store accepted the change
    Applied,
    /// Empty value, the store was not called
    Skipped,
    /// The store refused the change; carries the reason
    Rejected(String),
}

impl AvuOutcome {
    /// Whether the store was changed
    pub fn is_applied(&self) -> bool {
        matches!(self, AvuOutcome::Applied)
    }
}

/// Idempotent add/remove over a collection's AVUs
pub struct MetadataStore<'a> {
    collection: &'a dyn Collection,
    span: Span,
}

impl<'a> MetadataStore<'a> {
    /// Wraps a collection; events are recorded inside `span`
    pub fn new(collection: &'a dyn Collection, span: Span) -> Self {
        Self { collection, span }
    }

    /// The wrapped collection
    pub fn collection(&self) -> &'a dyn Collection {
        self.collection
    }

    /// Span the store logs into
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Attaches `key = value [unit]`
    pub fn add(&self, key: &str, value: &str, unit: Option<&str>) -> AvuOutcome {
        let _entered = self.span.enter();
        if value.is_empty() {
            return AvuOutcome::Skipped;
        }

        let mut avu = Avu::new(key, value);
        if let Some(unit) = unit {
            avu = avu.with_units(unit);
        }

        match self.collection.add_metadata(avu) {
            Ok(()) => {
                tracing::debug!(key = %key, value = %value, "Metadata added");
                AvuOutcome::Applied
            }
            Err(e) => {
                crate::log_store_rejection!("add", key, value, e);
                AvuOutcome::Rejected(e.to_string())
            }
        }
    }

    /// Detaches `key = value`
    pub fn remove(&self, key: &str, value: &str) -> AvuOutcome {
        let _entered = self.span.enter();
        if value.is_empty() {
            return AvuOutcome::Skipped;
        }

        match self.collection.remove_metadata(key, value) {
            Ok(()) => {
                tracing::debug!(key = %key, value = %value, "Metadata removed");
                AvuOutcome::Applied
            }
            Err(e) => {
                crate::log_store_rejection!("remove", key, value, e);
                AvuOutcome::Rejected(e.to_string())
            }
        }
    }

    /// AVUs currently attached under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the collection metadata cannot be read.
    pub fn list(&self, key: &str) -> Result<Vec<Avu>> {
        let avus = self.collection.metadata()?;
        Ok(avus.into_iter().filter(|avu| avu.name == key).collect())
    }

    /// Values currently attached under `key`
    pub fn values(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.list(key)?.into_iter().map(|avu| avu.value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::repository::memory::MemoryRepository;
    use crate::adapters::repository::traits::{Connector, Session};
    use crate::domain::ids::CollectionPath;

    fn fixture() -> (MemoryRepository, Box<dyn Collection>) {
        let repo = MemoryRepository::new();
        let path = CollectionPath::new("/zone/P1/C1").unwrap();
        repo.add_collection(&path, vec![Avu::new("exporterState", "other:finalize")]);
        let session = repo.connect(&MemoryRepository::settings()).unwrap();
        let collection = session.collection(&path).unwrap();
        (repo, collection)
    }

    #[test]
    fn test_add_and_duplicate() {
        let (_repo, collection) = fixture();
        let store = MetadataStore::new(collection.as_ref(), Span::none());

        assert_eq!(store.add("exporterState", "a:finalize", None), AvuOutcome::Applied);
        assert!(matches!(
            store.add("exporterState", "a:finalize", None),
            AvuOutcome::Rejected(_)
        ));
        assert_eq!(
            store.values("exporterState").unwrap(),
            vec!["other:finalize", "a:finalize"]
        );
    }

    #[test]
    fn test_add_with_unit() {
        let (repo, collection) = fixture();
        let store = MetadataStore::new(collection.as_ref(), Span::none());

        assert!(store.add("size", "42", Some("GB")).is_applied());
        let avus = repo.avus(collection.path());
        assert!(avus.contains(&Avu::new("size", "42").with_units("GB")));
    }

    #[test]
    fn test_empty_value_skipped() {
        let (repo, collection) = fixture();
        let store = MetadataStore::new(collection.as_ref(), Span::none());

        assert_eq!(store.add("exporterState", "", None), AvuOutcome::Skipped);
        assert_eq!(store.remove("exporterState", ""), AvuOutcome::Skipped);
        assert_eq!(repo.avus(collection.path()).len(), 1);
    }

    #[test]
    fn test_remove_missing_leaves_other_values() {
        let (repo, collection) = fixture();
        let store = MetadataStore::new(collection.as_ref(), Span::none());

        assert!(matches!(
            store.remove("exporterState", "a:upload-failed"),
            AvuOutcome::Rejected(_)
        ));
        assert_eq!(
            repo.avus(collection.path()),
            vec![Avu::new("exporterState", "other:finalize")]
        );
    }

    #[test]
    fn test_list_filters_by_key() {
        let (_repo, collection) = fixture();
        let store = MetadataStore::new(collection.as_ref(), Span::none());

        store.add("size", "42", Some("GB"));
        assert_eq!(
            store.list("size").unwrap(),
            vec![Avu::new("size", "42").with_units("GB")]
        );
        assert!(store.list("missing").unwrap().is_empty());
    }

    #[test]
    fn test_remove_existing() {
        let (repo, collection) = fixture();
        let store = MetadataStore::new(collection.as_ref(), Span::none());

        assert!(store.remove("exporterState", "other:finalize").is_applied());
        assert!(repo.avus(collection.path()).is_empty());
    }
}
