//! Per-category extraction rules.

use crate::config::{
    UndatedPolicy, APPOINTMENTS_EPIGRAPH, CGPJ_DEPARTMENT, CGPJ_SECTION, SITUATIONS_EPIGRAPH,
};
use crate::date::{parse_compact_date, parse_date};
use crate::document::ItemDocument;
use crate::error::{HarvesterError, Result};
use crate::patterns::{PatternSet, TitleMatch};
use crate::summary::ItemFilter;
use crate::types::{Appointment, Item, Situation};

/// Body paragraph (1-indexed) that states the effective date in prose.
const DATE_PARAGRAPH: usize = 2;

/// What a pipeline looks for and how it turns a match into a record.
pub trait Extractor {
    type Record;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Which summary items are candidates.
    fn filter(&self) -> ItemFilter;

    /// Ordered title patterns.
    fn patterns(&self) -> &PatternSet;

    /// Build a record from a matched title and its fetched document.
    fn build(&self, item: &Item, found: &TitleMatch, document: &ItemDocument)
        -> Result<Self::Record>;
}

/// Appointments of the CGPJ ("Nombramientos").
///
/// The date comes from the structured `fecha_disposicion` field.
pub struct AppointmentExtractor {
    patterns: PatternSet,
}

impl AppointmentExtractor {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }
}

impl Extractor for AppointmentExtractor {
    type Record = Appointment;

    fn name(&self) -> &'static str {
        "appointments"
    }

    fn filter(&self) -> ItemFilter {
        ItemFilter::new()
            .section(CGPJ_SECTION)
            .department(CGPJ_DEPARTMENT)
            .epigraph(APPOINTMENTS_EPIGRAPH)
    }

    fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn build(&self, item: &Item, found: &TitleMatch, document: &ItemDocument) -> Result<Appointment> {
        let date = document
            .fecha_disposicion
            .as_deref()
            .map(parse_compact_date)
            .transpose()?;

        if date.is_none() {
            tracing::warn!(id = %item.id, "Item document has no fecha_disposicion");
        }
        if let Some(paragraph) = document.paragraph(DATE_PARAGRAPH) {
            tracing::debug!(id = %item.id, paragraph, "Appointment body");
        }

        Appointment::from_match(&item.id, date, found)
    }
}

/// Status changes of CGPJ judges ("Situaciones").
///
/// No structured date exists for these, so the date is read from the prose
/// of the second body paragraph.
pub struct SituationExtractor {
    patterns: PatternSet,
    undated: UndatedPolicy,
}

impl SituationExtractor {
    pub fn new(patterns: PatternSet, undated: UndatedPolicy) -> Self {
        Self { patterns, undated }
    }
}

impl Extractor for SituationExtractor {
    type Record = Situation;

    fn name(&self) -> &'static str {
        "situations"
    }

    fn filter(&self) -> ItemFilter {
        ItemFilter::new()
            .section(CGPJ_SECTION)
            .department(CGPJ_DEPARTMENT)
            .epigraph(SITUATIONS_EPIGRAPH)
    }

    fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn build(&self, item: &Item, found: &TitleMatch, document: &ItemDocument) -> Result<Situation> {
        let paragraph = document.paragraph(DATE_PARAGRAPH);
        tracing::debug!(id = %item.id, paragraph, "Situation body");

        let resolved = paragraph.map(parse_date).transpose().map(Option::flatten);

        let date = match (resolved, self.undated) {
            (Ok(Some(date)), _) => Some(date),
            (Ok(None), UndatedPolicy::Drop) => {
                return Err(HarvesterError::Undated {
                    id: item.id.clone(),
                })
            }
            (Err(e), UndatedPolicy::Drop) => return Err(e.into()),
            (Ok(None), UndatedPolicy::Keep) => {
                tracing::warn!(id = %item.id, "No date in situation body, keeping undated");
                None
            }
            (Err(e), UndatedPolicy::Keep) => {
                tracing::warn!(id = %item.id, error = %e, "Unparseable situation date, keeping undated");
                None
            }
        };

        Situation::from_match(&item.id, date, found)
    }
}
