//! Configuration constants, validation functions and runtime settings.

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{HarvesterError, Result};

/// Base URL of the Boletín Oficial del Estado.
pub const BOE_BASE_URL: &str = "https://www.boe.es";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Politeness delay before every request (milliseconds).
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

/// Extra delay added per retry (milliseconds).
pub const DEFAULT_BACKOFF_STEP_MS: u64 = 1000;

/// Maximum number of attempts per document.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Section holding "Autoridades y personal" announcements.
pub const CGPJ_SECTION: &str = "2A";

/// Department publishing judicial appointments and situations.
pub const CGPJ_DEPARTMENT: &str = "CONSEJO GENERAL DEL PODER JUDICIAL";

/// Epigraph grouping appointments.
pub const APPOINTMENTS_EPIGRAPH: &str = "Nombramientos";

/// Epigraph grouping status changes.
pub const SITUATIONS_EPIGRAPH: &str = "Situaciones";

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Summary IDs (BOE-S-20190531) and item IDs (BOE-A-2019-8117).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOCUMENT_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^BOE-(?:S-\d{8}|[A-Z]-\d{4}-\d+)$").expect("valid regex")
});

/// Section codes: a digit with an optional letter suffix.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SECTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d[A-Z]?$").expect("valid regex"));

/// Validate a bulletin date (YYYY-MM-DD) and return it.
///
/// Rejects dates in the future since no bulletin exists for them yet.
///
/// # Examples
/// ```
/// use boe_harvester::config::validate_date;
///
/// assert!(validate_date("2019-05-31").is_ok());
/// assert!(validate_date("31/05/2019").is_err());
/// assert!(validate_date("2019-02-30").is_err());
/// ```
pub fn validate_date(date_str: &str) -> Result<NaiveDate> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(HarvesterError::InvalidDate(date_str.to_string()));
    }

    let parsed_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| HarvesterError::InvalidDate(date_str.to_string()))?;

    let today = chrono::Local::now().date_naive();
    if parsed_date > today {
        return Err(HarvesterError::InvalidDate(format!(
            "{date_str} is in the future (today is {today})"
        )));
    }

    Ok(parsed_date)
}

/// Validate a BOE document identifier.
///
/// # Examples
/// ```
/// use boe_harvester::config::validate_document_id;
///
/// assert!(validate_document_id("BOE-S-20190531").is_ok());
/// assert!(validate_document_id("BOE-A-2019-8117").is_ok());
/// assert!(validate_document_id("BOE-S-2019053").is_err());
/// ```
pub fn validate_document_id(id: &str) -> Result<()> {
    if DOCUMENT_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(HarvesterError::InvalidDocumentId(id.to_string()))
    }
}

/// Validate a section code and return its leading digit.
pub fn validate_section(section: &str) -> Result<u32> {
    if !SECTION_PATTERN.is_match(section) {
        return Err(HarvesterError::InvalidSection(section.to_string()));
    }
    section
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| HarvesterError::InvalidSection(section.to_string()))
}

/// Build the summary identifier for a bulletin date.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use boe_harvester::config::summary_id;
///
/// let date = NaiveDate::from_ymd_opt(2019, 5, 31).unwrap();
/// assert_eq!(summary_id(date), "BOE-S-20190531");
/// ```
pub fn summary_id(date: NaiveDate) -> String {
    format!("BOE-S-{}", date.format("%Y%m%d"))
}

/// Build the XML URL for a document.
pub fn document_url(base_url: &str, id: &str) -> String {
    format!(
        "{}/diario_boe/xml.php?id={id}",
        base_url.trim_end_matches('/')
    )
}

/// Which transport failures are worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Only TLS handshake and transport-security failures.
    #[default]
    TlsOnly,

    /// TLS failures plus connection errors, timeouts and 5xx responses.
    Transient,
}

/// What to do with a situation whose date cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndatedPolicy {
    /// Log and drop the record.
    #[default]
    Drop,

    /// Log and emit the record without a date.
    Keep,
}

/// Settings for the document fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub request_delay: Duration,
    pub backoff_step: Duration,
    pub max_retries: u32,
    pub retry_policy: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: BOE_BASE_URL.to_string(),
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            backoff_step: Duration::from_millis(DEFAULT_BACKOFF_STEP_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl FetchConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Delay before the given zero-based attempt.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use boe_harvester::config::FetchConfig;
    ///
    /// let config = FetchConfig::default();
    /// assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
    /// assert_eq!(config.delay_for_attempt(2), Duration::from_secs(3));
    /// ```
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.request_delay + self.backoff_step * attempt
    }
}

/// Settings for a harvest run.
#[derive(Debug, Clone, Default)]
pub struct HarvestConfig {
    pub fetch: FetchConfig,
    pub undated_situations: UndatedPolicy,
    pub pattern_file: Option<PathBuf>,
}

impl HarvestConfig {
    pub fn new(fetch: FetchConfig) -> Self {
        Self {
            fetch,
            ..Self::default()
        }
    }

    pub fn with_undated_situations(mut self, policy: UndatedPolicy) -> Self {
        self.undated_situations = policy;
        self
    }

    pub fn with_pattern_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.pattern_file = Some(path.into());
        self
    }
}
