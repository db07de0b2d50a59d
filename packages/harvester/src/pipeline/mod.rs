//! Extraction pipelines.
//!
//! Both pipelines share one driver: list candidate items from the summary,
//! match each title against an ordered pattern set, fetch the item document
//! only for matched titles, and build a validated record. Failures are local
//! to the item; the batch always runs to the end.

mod engine;
mod extractor;

pub use engine::{run_extraction, ExtractionReport, SkipReason, SkippedItem};
pub use extractor::{AppointmentExtractor, Extractor, SituationExtractor};
