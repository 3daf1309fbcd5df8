//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ExporterConfig;
use crate::config::secret_string;
use crate::domain::errors::ExporterError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of environment variables overriding configuration values
pub const ENV_PREFIX: &str = "EXPORTER";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ExporterConfig
/// 4. Applies environment variable overrides (EXPORTER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`ExporterError::Configuration`] if the file cannot be read or
/// parsed, a referenced variable is not set, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use irods_exporter::config::loader::load_config;
///
/// let config = load_config("exporter.toml").expect("Failed to load config");
/// println!("Exporting to {}", config.export.repository_name);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ExporterConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExporterError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExporterError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML text
///
/// Same pipeline as [`load_config`] without the file access.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_from_str(contents: &str) -> Result<ExporterConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: ExporterConfig = toml::from_str(&contents)
        .map_err(|e| ExporterError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ExporterError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. Every missing variable is reported in a
/// single error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ExporterError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&cap[0], &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|missing| missing == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(ExporterError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_var(section: &str, key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{section}_{key}")).ok()
}

fn parse_override<T: std::str::FromStr>(section: &str, key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        ExporterError::Configuration(format!(
            "Invalid value '{value}' for {ENV_PREFIX}_{section}_{key}"
        ))
    })
}

/// Applies environment variable overrides using EXPORTER_* prefix
///
/// Environment variables follow the pattern: EXPORTER_<SECTION>_<KEY>
/// For example: EXPORTER_REPOSITORY_HOST, EXPORTER_EXPORT_REPOSITORY_NAME
fn apply_env_overrides(config: &mut ExporterConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_var("APPLICATION", "LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Repository overrides
    if let Some(val) = env_var("REPOSITORY", "HOST") {
        config.repository.host = val;
    }
    if let Some(val) = env_var("REPOSITORY", "PORT") {
        config.repository.port = parse_override("REPOSITORY", "PORT", &val)?;
    }
    if let Some(val) = env_var("REPOSITORY", "USER") {
        config.repository.user = val;
    }
    if let Some(val) = env_var("REPOSITORY", "PASSWORD") {
        config.repository.password = secret_string(val);
    }
    if let Some(val) = env_var("REPOSITORY", "ZONE") {
        config.repository.zone = val;
    }
    if let Some(val) = env_var("REPOSITORY", "ROOT") {
        config.repository.root = val;
    }

    // Export overrides
    if let Some(val) = env_var("EXPORT", "REPOSITORY_NAME") {
        config.export.repository_name = val;
    }
    if let Some(val) = env_var("EXPORT", "METADATA_DOCUMENT") {
        config.export.metadata_document = val;
    }
    if let Some(val) = env_var("EXPORT", "ATTRIBUTE_PREFIX") {
        config.export.attribute_prefix = val;
    }

    // Logging overrides
    if let Some(val) = env_var("LOGGING", "LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("LOGGING", "LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = env_var("LOGGING", "LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env_var("LOGGING", "LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
