//! Repository access
//!
//! - [`traits`] - capability traits a backend implements
//! - [`store`] - idempotent metadata store adapter over a collection
//! - [`memory`] - in-process backend
//! - [`local`] - filesystem backend

pub mod local;
pub mod memory;
pub mod store;
pub mod traits;

pub use local::LocalConnector;
pub use memory::MemoryRepository;
pub use store::{AvuOutcome, MetadataStore};
pub use traits::{
    Collection, ConnectionSettings, Connector, RepositoryResult, RuleInvoker, Session,
};
