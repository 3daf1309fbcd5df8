//! CLI command implementations
//!
//! Commands return the process exit code: 0 ok, 2 configuration,
//! 3 parse or lookup, 4 connection, 5 fatal.

pub mod cleanup;
pub mod init;
pub mod inspect;
pub mod prepare;
pub mod status;
pub mod validate;

use crate::adapters::repository::{Connector, LocalConnector};
use crate::config::{ExporterConfig, RepositoryBackend};
use crate::core::collection::CollectionOrchestrator;
use crate::domain::ids::{CollectionPath, RepositoryName};
use clap::Args;

/// Collection selection shared by the collection commands
#[derive(Args, Debug, Clone)]
pub struct CollectionArgs {
    /// Absolute path of the collection
    #[arg(short, long)]
    pub path: String,

    /// Target repository (defaults to export.repository_name)
    #[arg(short, long)]
    pub repository: Option<String>,
}

impl CollectionArgs {
    /// Resolves the collection path and repository name
    ///
    /// # Errors
    ///
    /// Returns a message if the path is not absolute or the repository name
    /// is empty.
    pub fn resolve(
        &self,
        config: &ExporterConfig,
    ) -> Result<(CollectionPath, RepositoryName), String> {
        let path = CollectionPath::new(self.path.as_str())?;
        let repository = match &self.repository {
            Some(name) => RepositoryName::new(name.as_str())?,
            None => config.export.repository()?,
        };
        Ok((path, repository))
    }
}

/// Builds an orchestrator for the configured backend
pub fn build_orchestrator(config: &ExporterConfig) -> CollectionOrchestrator {
    let connector: Box<dyn Connector> = match config.repository.backend {
        RepositoryBackend::Local => Box::new(LocalConnector::new(&config.repository.root)),
    };

    CollectionOrchestrator::new(connector, config.repository.connection_settings())
        .with_options(config.export.prepare_options())
}
