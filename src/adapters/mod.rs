//! External system integrations.
//!
//! - [`repository`] - repository capabilities (session, collection, metadata
//!   store, remote rules) and their backends
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate the repository
//! transport and enable testing with the in-memory backend:
//!
//! ```rust
//! use irods_exporter::adapters::repository::{Connector, MemoryRepository};
//! use irods_exporter::domain::{Avu, CollectionPath};
//!
//! let repo = MemoryRepository::new();
//! let path = CollectionPath::new("/nlmumc/projects/P000000001/C000000001").unwrap();
//! repo.add_collection(&path, vec![Avu::new("title", "Liver study")]);
//!
//! let session = repo.connect(&MemoryRepository::settings()).unwrap();
//! let collection = session.collection(&path).unwrap();
//! assert_eq!(collection.metadata().unwrap().len(), 1);
//! ```

pub mod repository;
