//! Logging and observability
//!
//! Structured logging with:
//! - Console output
//! - JSON-formatted local files with rotation
//! - Configurable log levels
//!
//! Components do not log into the global context on their own: the
//! orchestrator opens one `export_run` span per run and hands it to the
//! metadata store and the state machine, which enter it for every event.
//!
//! # Example
//!
//! ```no_run
//! use irods_exporter::logging::init_logging;
//! use irods_exporter::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Exporter started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log an export state transition
///
/// `$old` and `$new` are `Option<ExporterState>`; `None` is logged as `-`.
///
/// # Example
///
/// ```
/// use irods_exporter::log_transition;
/// use irods_exporter::core::state::ExporterState;
///
/// log_transition!(
///     "Dataverse",
///     Some(ExporterState::InQueueForExport),
///     Some(ExporterState::CreateExporter)
/// );
/// ```
#[macro_export]
macro_rules! log_transition {
    ($repository:expr, $old:expr, $new:expr) => {
        tracing::info!(
            repository = %$repository,
            from = $old.as_ref().map_or("-", |state| state.as_str()),
            to = $new.as_ref().map_or("-", |state| state.as_str()),
            "Export state transition"
        );
    };
}

/// Log a metadata change the store refused
///
/// # Example
///
/// ```
/// use irods_exporter::log_store_rejection;
/// use irods_exporter::domain::RepositoryError;
///
/// let error = RepositoryError::ValueNotFound {
///     key: "exporterState".to_string(),
///     value: "Dataverse:finalize".to_string(),
/// };
/// log_store_rejection!("remove", "exporterState", "Dataverse:finalize", error);
/// ```
#[macro_export]
macro_rules! log_store_rejection {
    ($operation:expr, $key:expr, $value:expr, $error:expr) => {
        tracing::error!(
            operation = $operation,
            key = %$key,
            value = %$value,
            error = %$error,
            "Metadata store rejected change"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```
/// use irods_exporter::log_error_with_context;
/// use irods_exporter::domain::ExporterError;
///
/// let error = ExporterError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
