//! Batch driver shared by all extractors.

use roxmltree::Document;
use thiserror::Error;

use super::extractor::Extractor;
use crate::document::fetch_item_document;
use crate::error::Result;
use crate::http::DocumentSource;
use crate::summary::list_items;
use crate::types::Item;

/// Why an item produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The title matched none of the patterns.
    #[error("no pattern matches the title")]
    NoPatternMatch,

    /// The item document could not be fetched or parsed.
    #[error("document unavailable: {0}")]
    Document(String),

    /// The document was fetched but no valid record could be built.
    #[error("extraction failed: {0}")]
    Extraction(String),
}

/// An item that was listed but skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub id: String,
    pub title: String,
    pub reason: SkipReason,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport<R> {
    /// Records in summary order.
    pub records: Vec<R>,

    pub skipped: Vec<SkippedItem>,
}

impl<R> Default for ExtractionReport<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Run `extractor` over every candidate item of `summary`.
///
/// Only an invalid item filter fails the batch. Every per-item failure is
/// logged with the item id and title and recorded in the report.
pub fn run_extraction<E: Extractor>(
    summary: &Document<'_>,
    source: &dyn DocumentSource,
    extractor: &E,
) -> Result<ExtractionReport<E::Record>> {
    let items = list_items(summary, &extractor.filter())?;
    tracing::info!(
        pipeline = extractor.name(),
        candidates = items.len(),
        "Listed candidate items"
    );

    let mut report = ExtractionReport::default();

    for item in items {
        match extract_item(&item, source, extractor) {
            Ok(record) => report.records.push(record),
            Err(reason) => {
                tracing::error!(
                    pipeline = extractor.name(),
                    id = %item.id,
                    title = %item.title,
                    reason = %reason,
                    "Skipping item"
                );
                report.skipped.push(SkippedItem {
                    id: item.id,
                    title: item.title,
                    reason,
                });
            }
        }
    }

    tracing::info!(
        pipeline = extractor.name(),
        records = report.records.len(),
        skipped = report.skipped.len(),
        "Extraction finished"
    );

    Ok(report)
}

fn extract_item<E: Extractor>(
    item: &Item,
    source: &dyn DocumentSource,
    extractor: &E,
) -> std::result::Result<E::Record, SkipReason> {
    let found = extractor
        .patterns()
        .match_title(&item.title)
        .ok_or(SkipReason::NoPatternMatch)?;
    tracing::debug!(id = %item.id, pattern = %found.pattern_name, "Title matched");

    let document = fetch_item_document(source, &item.id)
        .map_err(|e| SkipReason::Document(e.to_string()))?;

    extractor
        .build(item, &found, &document)
        .map_err(|e| SkipReason::Extraction(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::config::UndatedPolicy;
    use crate::error::HarvesterError;
    use crate::patterns::{appointment_patterns, situation_patterns};
    use crate::pipeline::{AppointmentExtractor, SituationExtractor};

    /// In-memory source that records which IDs were requested.
    struct MapSource {
        documents: HashMap<&'static str, &'static str>,
        requested: RefCell<Vec<String>>,
    }

    impl MapSource {
        fn new(documents: &[(&'static str, &'static str)]) -> Self {
            Self {
                documents: documents.iter().copied().collect(),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl DocumentSource for MapSource {
        fn fetch(&self, id: &str) -> Result<String> {
            self.requested.borrow_mut().push(id.to_string());
            self.documents
                .get(id)
                .map(|xml| xml.to_string())
                .ok_or_else(|| HarvesterError::Status {
                    url: id.to_string(),
                    status: 404,
                })
        }
    }

    const SUMMARY: &str = r#"<sumario><diario>
  <seccion num="2A">
    <departamento nombre="CONSEJO GENERAL DEL PODER JUDICIAL">
      <epigrafe nombre="Nombramientos">
        <item id="BOE-A-2019-8117"><titulo>Real Decreto 368/2019, de 31 de mayo, por el que se nombra Magistrado de la Sala Primera del Tribunal Supremo a don José Luis Seoane Spiegelberg.</titulo></item>
        <item id="BOE-A-2019-4000"><titulo>Acuerdo de 28 de marzo de 2019, del Pleno del Consejo General del Poder Judicial, por el que se nombra Vicesecretario General del Consejo a don Gervasio Martín Martín.</titulo></item>
        <item id="BOE-A-2018-9999"><titulo>Real Decreto 899/2018, de 13 de julio, por el que se nombra a don Javier María Calderón González, Magistrado de la Audiencia Provincial de Madrid correspondiente al orden penal.</titulo></item>
        <item id="BOE-A-2019-0404"><titulo>Real Decreto 1/2019, de 4 de enero, por el que se nombra Presidente de la Audiencia Provincial de Zamora a don Jesús Pérez Serna.</titulo></item>
      </epigrafe>
      <epigrafe nombre="Situaciones">
        <item id="BOE-A-2019-15361"><titulo>Acuerdo de 22 de octubre de 2019, de la Comisión Permanente del Consejo General del Poder Judicial, por el que se declara la jubilación forzosa del Magistrado don Alberto Gumersindo Jorge Barreiro, al cumplir la edad legalmente establecida.</titulo></item>
      </epigrafe>
    </departamento>
  </seccion>
</diario></sumario>"#;

    const SUPREME_DOC: &str = "<documento><metadatos><fecha_disposicion>20190531</fecha_disposicion></metadatos></documento>";
    const PROVINCIAL_DOC: &str = "<documento><metadatos><fecha_disposicion>20180713</fecha_disposicion></metadatos></documento>";
    const RETIREMENT_DOC: &str = "<documento><texto><p>Acuerdo:</p><p>con efectos del día 27 de\u{a0}octubre de\u{a0}2019.</p></texto></documento>";

    #[test]
    fn test_appointments_skip_and_continue() {
        let doc = Document::parse(SUMMARY).unwrap();
        let source = MapSource::new(&[
            ("BOE-A-2019-8117", SUPREME_DOC),
            ("BOE-A-2018-9999", PROVINCIAL_DOC),
        ]);
        let extractor = AppointmentExtractor::new(appointment_patterns().unwrap());

        let report = run_extraction(&doc, &source, &extractor).unwrap();

        let ids: Vec<_> = report.records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["BOE-A-2019-8117", "BOE-A-2018-9999"]);

        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].id, "BOE-A-2019-4000");
        assert_eq!(report.skipped[0].reason, SkipReason::NoPatternMatch);
        assert_eq!(report.skipped[1].id, "BOE-A-2019-0404");
        assert!(matches!(report.skipped[1].reason, SkipReason::Document(_)));
    }

    #[test]
    fn test_documents_only_fetched_for_matched_titles() {
        let doc = Document::parse(SUMMARY).unwrap();
        let source = MapSource::new(&[
            ("BOE-A-2019-8117", SUPREME_DOC),
            ("BOE-A-2018-9999", PROVINCIAL_DOC),
        ]);
        let extractor = AppointmentExtractor::new(appointment_patterns().unwrap());

        run_extraction(&doc, &source, &extractor).unwrap();

        assert_eq!(
            *source.requested.borrow(),
            vec!["BOE-A-2019-8117", "BOE-A-2018-9999", "BOE-A-2019-0404"]
        );
    }

    #[test]
    fn test_appointments_are_idempotent() {
        let doc = Document::parse(SUMMARY).unwrap();
        let source = MapSource::new(&[
            ("BOE-A-2019-8117", SUPREME_DOC),
            ("BOE-A-2018-9999", PROVINCIAL_DOC),
        ]);
        let extractor = AppointmentExtractor::new(appointment_patterns().unwrap());

        let first = run_extraction(&doc, &source, &extractor).unwrap();
        let second = run_extraction(&doc, &source, &extractor).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_situations_pipeline() {
        let doc = Document::parse(SUMMARY).unwrap();
        let source = MapSource::new(&[("BOE-A-2019-15361", RETIREMENT_DOC)]);
        let extractor = SituationExtractor::new(situation_patterns().unwrap(), UndatedPolicy::Drop);

        let report = run_extraction(&doc, &source, &extractor).unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].person(), "Alberto Gumersindo Jorge Barreiro");
        assert_eq!(
            report.records[0].date(),
            chrono::NaiveDate::from_ymd_opt(2019, 10, 27)
        );
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_situation_without_date_is_reported() {
        let doc = Document::parse(SUMMARY).unwrap();
        let source = MapSource::new(&[(
            "BOE-A-2019-15361",
            "<documento><texto><p>Acuerdo:</p></texto></documento>",
        )]);
        let extractor = SituationExtractor::new(situation_patterns().unwrap(), UndatedPolicy::Drop);

        let report = run_extraction(&doc, &source, &extractor).unwrap();

        assert!(report.records.is_empty());
        assert!(matches!(report.skipped[0].reason, SkipReason::Extraction(_)));
    }

    #[test]
    fn test_empty_summary_is_empty_report() {
        let doc = Document::parse("<sumario><diario/></sumario>").unwrap();
        let source = MapSource::new(&[]);
        let extractor = AppointmentExtractor::new(appointment_patterns().unwrap());

        let report = run_extraction(&doc, &source, &extractor).unwrap();
        assert_eq!(report, ExtractionReport::default());
        assert!(source.requested.borrow().is_empty());
    }

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_unmatched_title_logged_as_error() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::ERROR)
            .finish();

        let doc = Document::parse(SUMMARY).unwrap();
        let source = MapSource::new(&[
            ("BOE-A-2019-8117", SUPREME_DOC),
            ("BOE-A-2018-9999", PROVINCIAL_DOC),
        ]);
        let extractor = AppointmentExtractor::new(appointment_patterns().unwrap());

        tracing::subscriber::with_default(subscriber, || {
            run_extraction(&doc, &source, &extractor).unwrap();
        });

        let output = logs.contents();
        let unmatched = output
            .lines()
            .find(|line| line.contains("BOE-A-2019-4000"))
            .expect("unmatched item logged at error level");
        assert!(unmatched.contains("ERROR"));
        assert!(unmatched.contains("Vicesecretario General"));
        assert!(unmatched.contains("no pattern matches the title"));
    }
}
