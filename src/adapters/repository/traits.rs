//! Repository capability traits
//!
//! The exporter never talks to a repository transport directly. It goes
//! through these traits, which a backend implements: a [`Connector`] opens a
//! [`Session`], a session hands out [`Collection`] handles, user profiles and
//! a [`RuleInvoker`] for the server-side open/close procedures.
//!
//! All calls are blocking. Handles are released when dropped.

use crate::config::SecretString;
use crate::domain::avu::{Avu, UserProfile};
use crate::domain::errors::RepositoryError;
use crate::domain::ids::CollectionPath;
use std::io::Read;

/// Result type for backend calls
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Server-side rule run before an export starts
pub const OPEN_COLLECTION_RULE: &str = "openProjectCollection";

/// Server-side rule run when an export ends or crashes
pub const CLOSE_COLLECTION_RULE: &str = "closeProjectCollection";

/// Connection parameters for a repository session
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Server host name
    pub host: String,

    /// Server port
    pub port: u16,

    /// User to authenticate as
    pub user: String,

    /// Password, zeroized on drop
    pub password: SecretString,

    /// Repository zone
    pub zone: String,
}

/// Opens sessions against a repository
pub trait Connector {
    /// Opens a new session
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ConnectionFailed`] when the repository
    /// cannot be reached or refuses the credentials.
    fn connect(&self, settings: &ConnectionSettings) -> RepositoryResult<Box<dyn Session>>;
}

/// An open repository session
pub trait Session {
    /// Fetches a collection handle
    fn collection(&self, path: &CollectionPath) -> RepositoryResult<Box<dyn Collection>>;

    /// Looks up a user and its metadata
    fn user(&self, name: &str) -> RepositoryResult<UserProfile>;

    /// Rule invoker scoped to one collection
    fn rules(&self, collection: &CollectionPath) -> Box<dyn RuleInvoker>;
}

/// A collection handle with its AVU multimap
pub trait Collection {
    /// Path of the collection
    fn path(&self) -> &CollectionPath;

    /// All AVUs attached to the collection
    fn metadata(&self) -> RepositoryResult<Vec<Avu>>;

    /// Attaches an AVU
    ///
    /// Fails with [`RepositoryError::DuplicateValue`] when the same
    /// `(name, value)` pair is already attached.
    fn add_metadata(&self, avu: Avu) -> RepositoryResult<()>;

    /// Detaches one `(name, value)` pair
    ///
    /// Fails with [`RepositoryError::ValueNotFound`] when the pair is not
    /// attached. Other values of the same attribute are left alone.
    fn remove_metadata(&self, name: &str, value: &str) -> RepositoryResult<()>;

    /// Opens a data object inside the collection for reading
    fn open_document(&self, name: &str) -> RepositoryResult<Box<dyn Read + '_>>;
}

/// Invokes the server-side procedures bracketing an export
pub trait RuleInvoker {
    /// Runs [`OPEN_COLLECTION_RULE`]
    fn open_collection(&self) -> RepositoryResult<()>;

    /// Runs [`CLOSE_COLLECTION_RULE`]
    fn close_collection(&self) -> RepositoryResult<()>;
}
