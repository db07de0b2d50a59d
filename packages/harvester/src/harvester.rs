//! Main harvester service that ties all components together.

use chrono::NaiveDate;
use roxmltree::Document;

use crate::config::{summary_id, HarvestConfig};
use crate::error::Result;
use crate::http::{BoeClient, DocumentSource};
use crate::patterns::{PatternFile, PatternTables};
use crate::pipeline::{
    run_extraction, AppointmentExtractor, ExtractionReport, SituationExtractor,
};
use crate::summary::{list_items, ItemFilter};
use crate::types::{Appointment, Item, Situation};

/// Fetch the raw summary XML for a bulletin date.
///
/// Failing here is fatal for the whole batch: without a summary there is
/// nothing to iterate over.
pub fn fetch_summary(source: &dyn DocumentSource, date: NaiveDate) -> Result<String> {
    let id = summary_id(date);
    tracing::info!(id = %id, "Fetching summary");
    source.fetch(&id)
}

/// Build the pattern tables for a run, including any pattern file.
pub fn load_patterns(config: &HarvestConfig) -> Result<PatternTables> {
    let tables = PatternTables::builtin()?;
    match &config.pattern_file {
        Some(path) => {
            let file = PatternFile::load(path)?;
            tracing::info!(
                path = %path.display(),
                appointments = file.appointments.len(),
                situations = file.situations.len(),
                "Loaded extra patterns"
            );
            tables.with_file(&file)
        }
        None => Ok(tables),
    }
}

/// Extract the appointments of a bulletin from any document source.
pub fn harvest_appointments_from(
    source: &dyn DocumentSource,
    date: NaiveDate,
    config: &HarvestConfig,
) -> Result<ExtractionReport<Appointment>> {
    let patterns = load_patterns(config)?;
    let xml = fetch_summary(source, date)?;
    let summary = Document::parse(&xml)?;
    let extractor = AppointmentExtractor::new(patterns.appointments);
    run_extraction(&summary, source, &extractor)
}

/// Extract the situations of a bulletin from any document source.
pub fn harvest_situations_from(
    source: &dyn DocumentSource,
    date: NaiveDate,
    config: &HarvestConfig,
) -> Result<ExtractionReport<Situation>> {
    let patterns = load_patterns(config)?;
    let xml = fetch_summary(source, date)?;
    let summary = Document::parse(&xml)?;
    let extractor = SituationExtractor::new(patterns.situations, config.undated_situations);
    run_extraction(&summary, source, &extractor)
}

/// List the items of a bulletin that pass `filter`.
pub fn list_bulletin_items_from(
    source: &dyn DocumentSource,
    date: NaiveDate,
    filter: &ItemFilter,
) -> Result<Vec<Item>> {
    filter.compile()?;
    let xml = fetch_summary(source, date)?;
    let summary = Document::parse(&xml)?;
    list_items(&summary, filter)
}

/// Download a bulletin from the BOE and extract its appointments.
pub fn harvest_appointments(
    date: NaiveDate,
    config: &HarvestConfig,
) -> Result<ExtractionReport<Appointment>> {
    let client = BoeClient::new(config.fetch.clone())?;
    harvest_appointments_from(&client, date, config)
}

/// Download a bulletin from the BOE and extract its situations.
pub fn harvest_situations(
    date: NaiveDate,
    config: &HarvestConfig,
) -> Result<ExtractionReport<Situation>> {
    let client = BoeClient::new(config.fetch.clone())?;
    harvest_situations_from(&client, date, config)
}

/// Download a bulletin from the BOE and list its items.
pub fn list_bulletin_items(
    date: NaiveDate,
    filter: &ItemFilter,
    config: &HarvestConfig,
) -> Result<Vec<Item>> {
    let client = BoeClient::new(config.fetch.clone())?;
    list_bulletin_items_from(&client, date, filter)
}
