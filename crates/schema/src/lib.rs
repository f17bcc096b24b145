#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Validation error tree (`ValidationError`) and domain errors (`SchemaError`)
//! - [`version`]: Schema version gate (`SchemaVersionGate`, `CURRENT_SCHEMA_VERSION`)
//! - [`cpe`]: CPE 2.3 / 2.2 syntax parser (`Cpe`, `validate_cpe`)
//! - [`package_version`]: Distribution package version check (`validate_with_epoch`)
//! - [`event`]: Advisory lifecycle events (`Event`, `EventKind`, `Fixed`, ...)
//! - [`advisory`]: Single advisory record (`Advisory`)
//! - [`advisories`]: Ordered advisory collection (`Advisories`)
//! - [`package_advisory`]: Advisory decorated with its package name (`PackageAdvisory`)
//! - [`document`]: Root document, decode/encode (`Document`, `decode_document`)
//! - [`config`]: Loader configuration (`SchemaConfig`, builder)
//! - [`loader`]: File and directory loading (`DocumentLoader`)
//!
//! # Architecture
//!
//! ```text
//! bytes --> decode_document (strict) --> Document
//!                                           |
//!                        Document::validate_with(&SchemaVersionGate)
//!                                           |
//!              +----------------------------+---------------------------+
//!              |                            |                           |
//!      SchemaVersionGate            Package::validate           Advisories::validate
//!                                                                       |
//!                                                     uniqueness scan + Advisory::validate
//!                                                                       |
//!                                                            Event::validate (CPE, Fixed)
//! ```

pub mod advisories;
pub mod advisory;
pub mod config;
pub mod cpe;
pub mod document;
pub mod error;
pub mod event;
pub mod loader;
pub mod package_advisory;
pub mod package_version;
pub mod version;

// --- Public API Re-exports ---

// Document model
pub use advisories::Advisories;
pub use advisory::Advisory;
pub use document::{DEFAULT_DOCUMENT_SCHEMA_VERSION, Document, Package, decode_document};
pub use event::{Detection, Event, EventKind, FalsePositiveType, Fixed};
pub use package_advisory::PackageAdvisory;

// Validation
pub use cpe::{Cpe, validate_cpe};
pub use error::{SchemaError, ValidationError};
pub use package_version::validate_with_epoch;
pub use version::{CURRENT_SCHEMA_VERSION, SchemaVersion, SchemaVersionGate, check_compatible};

// Configuration & loading
pub use config::{SchemaConfig, SchemaConfigBuilder};
pub use loader::{DocumentLoader, LoadedDocument};
