//! Error types for the harvester.
//!
//! `HarvesterError` covers everything a library consumer can see. Date
//! resolution failures get their own `DateParseError` so pipelines can decide
//! per record whether a bad date drops the record or not.

use thiserror::Error;

/// Failure to turn a piece of text into a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    /// Month word not present in the Spanish month table.
    #[error("Unknown month name '{0}'")]
    UnknownMonth(String),

    /// Day, month and year do not form a real calendar date.
    #[error("Invalid calendar date: day {day}, month {month}, year {year}")]
    InvalidDate { day: u32, month: u32, year: i32 },

    /// Structured date field not in YYYYMMDD form.
    #[error("Invalid compact date '{0}'. Expected YYYYMMDD (e.g., 20190531)")]
    InvalidCompactDate(String),
}

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Invalid bulletin date format.
    #[error("Invalid date format: '{0}'. Expected YYYY-MM-DD (e.g., 2019-05-31)")]
    InvalidDate(String),

    /// Invalid BOE document identifier.
    #[error("Invalid document ID: '{0}'. Expected BOE-S-YYYYMMDD or BOE-A-YYYY-N")]
    InvalidDocumentId(String),

    /// Invalid section code in an item filter.
    #[error("Invalid section code: '{0}'. Expected a digit optionally followed by a letter (e.g., 2A)")]
    InvalidSection(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Request for {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Retries exhausted on transient transport failures.
    #[error("Giving up after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// Date resolution failed.
    #[error("Date parsing failed: {0}")]
    DateParse(#[from] DateParseError),

    /// No date could be found where the record expects one.
    #[error("No date found for item {id}")]
    Undated { id: String },

    /// A matched title lacked a field the record requires.
    #[error("Missing required field '{field}' for item {id}")]
    MissingCapture { id: String, field: &'static str },

    /// A title pattern does not compile.
    #[error("Invalid pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// Pattern file could not be read as YAML.
    #[error("Invalid pattern file: {0}")]
    PatternFile(#[source] serde_yaml_ng::Error),

    /// Records could not be rendered as YAML.
    #[error("Failed to render output: {0}")]
    Output(#[source] serde_yaml_ng::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
