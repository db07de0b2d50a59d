//! BOE Harvester - Extract judicial appointments from the Spanish official gazette.
//!
//! This crate downloads the daily summary of the Boletín Oficial del Estado
//! (BOE), selects the items published by the Consejo General del Poder
//! Judicial, and turns their titles and documents into structured
//! appointment and situation records.
//!
//! # Example
//!
//! ```
//! use boe_harvester::config;
//! use boe_harvester::patterns::appointment_patterns;
//!
//! assert!(config::validate_date("2019-05-31").is_ok());
//!
//! let patterns = appointment_patterns().unwrap();
//! let found = patterns
//!     .match_title("Real Decreto 368/2019, de 31 de mayo, por el que se nombra Magistrado de la Sala Primera del Tribunal Supremo a don José Luis Seoane Spiegelberg.")
//!     .unwrap();
//! assert_eq!(found.get("court"), Some("Tribunal Supremo"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, validation and run configuration
//! - [`error`]: Error types and Result alias
//! - [`http`]: Document fetching with retries
//! - [`xml`]: XML utilities
//! - [`summary`]: Item listing from the daily summary
//! - [`document`]: Item document parsing
//! - [`patterns`]: Ordered title patterns
//! - [`date`]: Spanish prose date resolution
//! - [`types`]: Item and record types
//! - [`pipeline`]: Extractors and the shared batch driver
//! - [`harvester`]: Main harvester service
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod date;
pub mod document;
pub mod error;
pub mod harvester;
pub mod http;
pub mod patterns;
pub mod pipeline;
pub mod summary;
pub mod types;
pub mod xml;

// Re-export main functions
pub use harvester::{
    harvest_appointments, harvest_appointments_from, harvest_situations, harvest_situations_from,
    list_bulletin_items, list_bulletin_items_from,
};

// Re-export commonly used items
pub use config::{validate_date, FetchConfig, HarvestConfig, RetryPolicy, UndatedPolicy};
pub use error::{HarvesterError, Result};
pub use http::{BoeClient, DocumentSource};
pub use pipeline::{ExtractionReport, SkipReason, SkippedItem};
pub use summary::ItemFilter;
pub use types::{Appointment, Item, Situation};
