// irods-exporter - iRODS collection metadata exporter
// Copyright (c) 2025 irods-exporter Contributors
// Licensed under the MIT License

//! # irods-exporter
//!
//! Prepares research-data repository collections for export to a publishing
//! platform.
//!
//! ## Overview
//!
//! For one collection the exporter:
//! - **Reads** the attribute-value-unit metadata attached to the collection
//! - **Parses** the companion `metadata.xml` document
//! - **Normalizes** both into a [`domain::MetadataRecord`]
//! - **Tracks** the export lifecycle as `"<repository>:<state>"` tags under the
//!   `exporterState` attribute
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (XML reading, export state, orchestration)
//! - [`adapters`] - Repository capabilities and their backends
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use irods_exporter::cli::commands::build_orchestrator;
//! use irods_exporter::config::load_config;
//! use irods_exporter::domain::CollectionPath;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("exporter.toml")?;
//!     let repository = config.export.repository()?;
//!     let path = CollectionPath::new("/nlmumc/projects/P000000001/C000000001")?;
//!
//!     let mut orchestrator = build_orchestrator(&config);
//!     match orchestrator.prepare(&path, &repository) {
//!         Ok(record) => println!("{}", serde_json::to_string_pretty(record)?),
//!         Err(e) => {
//!             eprintln!("{e}");
//!             orchestrator.status_cleanup(&repository)?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! The crate uses [`domain::ExporterError`] for all errors; repository
//! backends report [`domain::RepositoryError`] and XML problems
//! [`domain::ParseError`], both convertible with `?`.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
