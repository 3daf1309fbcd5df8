//! Domain models and types for the exporter.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`RepositoryName`], [`CollectionPath`])
//! - **Repository metadata** ([`Avu`], [`UserProfile`])
//! - **The metadata record** ([`MetadataRecord`], [`TaggedField`], [`OntologyTerm`])
//! - **Error types** ([`ExporterError`], [`RepositoryError`], [`ParseError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ExporterError>`]:
//!
//! ```rust
//! use irods_exporter::domain::{CollectionPath, ExporterError, Result};
//!
//! fn example() -> Result<CollectionPath> {
//!     CollectionPath::new("/nlmumc/projects/P000000001/C000000001")
//!         .map_err(ExporterError::Validation)
//! }
//! ```

pub mod avu;
pub mod errors;
pub mod ids;
pub mod metadata;
pub mod result;

// Re-export commonly used types for convenience
pub use avu::{Avu, UserProfile};
pub use errors::{ExporterError, ParseError, RepositoryError};
pub use ids::{CollectionPath, RepositoryName};
pub use metadata::{CollectionAttributes, MetadataRecord, OntologyTerm, TaggedField};
pub use result::Result;
