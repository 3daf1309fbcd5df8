//! Core business logic for the exporter.
//!
//! # Modules
//!
//! - [`xml`] - `metadata.xml` parsing and tag readers
//! - [`state`] - export lifecycle tags and the state machine writing them
//! - [`collection`] - orchestration of one collection export
//!
//! # Preparation Workflow
//!
//! 1. **Connect**: open a repository session
//! 2. **Fetch**: get the collection handle
//! 3. **Read**: copy collection attributes, look up the creator's email and
//!    parse `metadata.xml` into a [`MetadataRecord`](crate::domain::MetadataRecord)
//! 4. **Open**: run the remote open-collection rule
//! 5. **Initialize**: reset the export state to `create-exporter`
//!
//! On failure the caller runs
//! [`status_cleanup`](collection::CollectionOrchestrator::status_cleanup),
//! which removes every export tag and runs the close-collection rule.
//!
//! # Example
//!
//! ```rust
//! use irods_exporter::adapters::repository::MemoryRepository;
//! use irods_exporter::core::collection::CollectionOrchestrator;
//! use irods_exporter::domain::{Avu, CollectionPath, RepositoryName, UserProfile};
//!
//! let repo = MemoryRepository::new();
//! let path = CollectionPath::new("/nlmumc/projects/P000000001/C000000001").unwrap();
//! repo.add_collection(&path, vec![Avu::new("creator", "jdoe")]);
//! repo.add_document(&path, "metadata.xml", "<metadata><date>2020-01-01</date></metadata>");
//! repo.add_user(UserProfile {
//!     name: "jdoe".to_string(),
//!     metadata: vec![Avu::new("email", "j.doe@example.org")],
//! });
//!
//! let mut orchestrator =
//!     CollectionOrchestrator::new(Box::new(repo.clone()), MemoryRepository::settings());
//! let record = orchestrator
//!     .prepare(&path, &RepositoryName::new("Dataverse").unwrap())
//!     .unwrap();
//! assert_eq!(record.date.as_deref(), Some("2020-01-01"));
//! ```

pub mod collection;
pub mod state;
pub mod xml;
