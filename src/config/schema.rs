//! Configuration schema types
//!
//! This module defines the configuration structure for the exporter.

use crate::adapters::repository::traits::ConnectionSettings;
use crate::config::SecretString;
use crate::core::collection::{PrepareOptions, DEFAULT_METADATA_DOCUMENT};
use crate::domain::ids::RepositoryName;
use crate::domain::metadata::DEFAULT_ATTRIBUTE_PREFIX;
use serde::{Deserialize, Serialize};

/// Repository backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryBackend {
    /// Collections are directories below `repository.root`
    #[default]
    Local,
}

/// Main exporter configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Repository connection
    pub repository: RepositoryConfig,

    /// Export settings
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ExporterConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.repository.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Repository connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Backend implementation
    #[serde(default)]
    pub backend: RepositoryBackend,

    /// Server host name
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// User to connect as
    pub user: String,

    /// Password
    /// Stored securely in memory and automatically zeroized on drop
    pub password: SecretString,

    /// Repository zone
    pub zone: String,

    /// Root directory of the local backend
    #[serde(default = "default_root")]
    pub root: String,
}

impl RepositoryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("repository.host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("repository.port must be > 0".to_string());
        }

        if self.user.trim().is_empty() {
            return Err("repository.user cannot be empty".to_string());
        }

        if self.zone.trim().is_empty() {
            return Err("repository.zone cannot be empty".to_string());
        }

        if self.backend == RepositoryBackend::Local && self.root.trim().is_empty() {
            return Err("repository.root is required for the local backend".to_string());
        }

        Ok(())
    }

    /// Connection settings handed to the backend
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            zone: self.zone.clone(),
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Name of the publishing repository used in state tags
    pub repository_name: String,

    /// Data object holding the descriptive metadata
    #[serde(default = "default_metadata_document")]
    pub metadata_document: String,

    /// Namespace prefix stripped from collection attribute names
    #[serde(default = "default_attribute_prefix")]
    pub attribute_prefix: String,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        self.repository()
            .map_err(|e| format!("export.repository_name: {e}"))?;

        if self.metadata_document.trim().is_empty() {
            return Err("export.metadata_document cannot be empty".to_string());
        }

        if self.metadata_document.contains('/') {
            return Err(format!(
                "export.metadata_document must be a plain file name, got '{}'",
                self.metadata_document
            ));
        }

        Ok(())
    }

    /// The configured repository name
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty.
    pub fn repository(&self) -> Result<RepositoryName, String> {
        RepositoryName::new(self.repository_name.as_str())
    }

    /// Options for reading collections
    pub fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions {
            metadata_document: self.metadata_document.clone(),
            attribute_prefix: self.attribute_prefix.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err(
                "logging.local_path cannot be empty when local logging is enabled".to_string(),
            );
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    1247
}

fn default_root() -> String {
    "./repository".to_string()
}

fn default_metadata_document() -> String {
    DEFAULT_METADATA_DOCUMENT.to_string()
}

fn default_attribute_prefix() -> String {
    DEFAULT_ATTRIBUTE_PREFIX.to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use secrecy::ExposeSecret;

    fn repository_config() -> RepositoryConfig {
        RepositoryConfig {
            backend: RepositoryBackend::Local,
            host: "irods.example.org".to_string(),
            port: 1247,
            user: "rods".to_string(),
            password: secret_string("rods".to_string()),
            zone: "nlmumc".to_string(),
            root: "./repository".to_string(),
        }
    }

    fn export_config() -> ExportConfig {
        ExportConfig {
            repository_name: "Dataverse".to_string(),
            metadata_document: default_metadata_document(),
            attribute_prefix: default_attribute_prefix(),
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_repository_config_validation() {
        let mut config = repository_config();
        assert!(config.validate().is_ok());

        config.port = 0;
        assert!(config.validate().is_err());

        config = repository_config();
        config.zone = " ".to_string();
        assert!(config.validate().is_err());

        config = repository_config();
        config.root = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connection_settings() {
        let settings = repository_config().connection_settings();
        assert_eq!(settings.host, "irods.example.org");
        assert_eq!(settings.port, 1247);
        assert_eq!(settings.zone, "nlmumc");
        assert_eq!(settings.password.expose_secret(), "rods");
    }

    #[test]
    fn test_export_config_validation() {
        let mut config = export_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.repository().unwrap().as_str(), "Dataverse");

        config.repository_name = "  ".to_string();
        assert!(config.validate().is_err());

        config = export_config();
        config.metadata_document = "../metadata.xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prepare_options() {
        let mut config = export_config();
        config.attribute_prefix = "schema:".to_string();
        let options = config.prepare_options();
        assert_eq!(options.metadata_document, "metadata.xml");
        assert_eq!(options.attribute_prefix, "schema:");
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert_eq!(config.local_path, "./logs");
        assert_eq!(config.local_rotation, "daily");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_logging_config_invalid_rotation() {
        let config = LoggingConfig {
            local_rotation: "size".to_string(),
            ..LoggingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_port(), 1247);
        assert_eq!(default_metadata_document(), "metadata.xml");
        assert_eq!(default_attribute_prefix(), "dcat:");
    }
}
