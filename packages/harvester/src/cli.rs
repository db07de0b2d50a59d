//! Command-line interface for the harvester.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::{
    validate_date, FetchConfig, HarvestConfig, RetryPolicy, UndatedPolicy, BOE_BASE_URL,
    DEFAULT_BACKOFF_STEP_MS, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_DELAY_MS,
};
use crate::error::{HarvesterError, Result};
use crate::harvester::{harvest_appointments, harvest_situations, list_bulletin_items};
use crate::pipeline::{ExtractionReport, SkippedItem};
use crate::summary::ItemFilter;
use crate::types::{Appointment, Item, Situation};

/// BOE Harvester - Extract judicial appointments and situations from the BOE.
#[derive(Parser)]
#[command(name = "boe-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Fetch and pattern options shared by every subcommand.
#[derive(Args)]
pub struct GlobalOptions {
    /// Base URL of the bulletin site
    #[arg(long, global = true, default_value = BOE_BASE_URL)]
    pub base_url: String,

    /// Pause before every request, in milliseconds
    #[arg(long, global = true, default_value_t = DEFAULT_REQUEST_DELAY_MS)]
    pub delay_ms: u64,

    /// Extra pause added per retry, in milliseconds
    #[arg(long, global = true, default_value_t = DEFAULT_BACKOFF_STEP_MS)]
    pub backoff_ms: u64,

    /// Maximum attempts per document
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Also retry connection errors, timeouts and 5xx responses (default: TLS errors only)
    #[arg(long, global = true)]
    pub retry_transient: bool,

    /// YAML file with extra title patterns
    #[arg(long, global = true)]
    pub patterns: Option<PathBuf>,
}

impl GlobalOptions {
    fn harvest_config(&self) -> HarvestConfig {
        let retry_policy = if self.retry_transient {
            RetryPolicy::Transient
        } else {
            RetryPolicy::TlsOnly
        };
        let fetch = FetchConfig::default()
            .with_base_url(&self.base_url)
            .with_request_delay(Duration::from_millis(self.delay_ms))
            .with_backoff_step(Duration::from_millis(self.backoff_ms))
            .with_max_retries(self.max_retries)
            .with_retry_policy(retry_policy);

        let config = HarvestConfig::new(fetch);
        match &self.patterns {
            Some(path) => config.with_pattern_file(path),
            None => config,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract CGPJ appointments (Nombramientos) from a bulletin.
    Appointments {
        /// Bulletin date in YYYY-MM-DD format (default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Print records as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Extract CGPJ status changes (Situaciones) from a bulletin.
    Situations {
        /// Bulletin date in YYYY-MM-DD format (default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Keep situations whose date cannot be resolved, without a date
        #[arg(long)]
        keep_undated: bool,

        /// Print records as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// List the items of a bulletin under a section/department/epigraph.
    Items {
        /// Bulletin date in YYYY-MM-DD format (default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Section code (e.g., 2A)
        #[arg(long)]
        section: Option<String>,

        /// Department name (matched uppercased)
        #[arg(long)]
        department: Option<String>,

        /// Epigraph name (ignored for sections 4 and up)
        #[arg(long)]
        epigraph: Option<String>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.options.harvest_config();

    match cli.command {
        Commands::Appointments { date, yaml } => appointments_command(date.as_deref(), yaml, &config),
        Commands::Situations {
            date,
            keep_undated,
            yaml,
        } => {
            let policy = if keep_undated {
                UndatedPolicy::Keep
            } else {
                UndatedPolicy::Drop
            };
            let config = config.with_undated_situations(policy);
            situations_command(date.as_deref(), yaml, &config)
        }
        Commands::Items {
            date,
            section,
            department,
            epigraph,
        } => {
            let filter = ItemFilter {
                section,
                department,
                epigraph,
            };
            items_command(date.as_deref(), &filter, &config)
        }
    }
}

/// Resolve the bulletin date, defaulting to today.
fn bulletin_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(d) => validate_date(d),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Run `work` behind a spinner that is cleared whatever the outcome.
fn with_spinner<T>(message: &str, work: impl FnOnce() -> Result<T>) -> Result<T> {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = work();
    pb.finish_and_clear();
    result
}

fn announce(what: &str, date: NaiveDate) {
    println!(
        "{} {} for {}",
        style("Harvesting").bold(),
        style(what).cyan(),
        style(date).green()
    );
    println!();
}

fn appointments_command(date: Option<&str>, yaml: bool, config: &HarvestConfig) -> Result<()> {
    let date = bulletin_date(date)?;
    if !yaml {
        announce("appointments", date);
    }

    let report = with_spinner("Extracting appointments...", || {
        harvest_appointments(date, config)
    })?;

    if yaml {
        return print_yaml(&report.records);
    }

    for appointment in &report.records {
        print_appointment(appointment);
    }
    print_summary(&report);
    Ok(())
}

fn situations_command(date: Option<&str>, yaml: bool, config: &HarvestConfig) -> Result<()> {
    let date = bulletin_date(date)?;
    if !yaml {
        announce("situations", date);
    }

    let report = with_spinner("Extracting situations...", || {
        harvest_situations(date, config)
    })?;

    if yaml {
        return print_yaml(&report.records);
    }

    for situation in &report.records {
        print_situation(situation);
    }
    print_summary(&report);
    Ok(())
}

fn items_command(date: Option<&str>, filter: &ItemFilter, config: &HarvestConfig) -> Result<()> {
    let date = bulletin_date(date)?;
    announce("items", date);

    let items = with_spinner("Listing items...", || {
        list_bulletin_items(date, filter, config)
    })?;

    for item in &items {
        print_item(item);
    }
    println!("  Items: {}", items.len());
    Ok(())
}

fn render_yaml<T: Serialize>(records: &[T]) -> Result<String> {
    serde_yaml_ng::to_string(records).map_err(HarvesterError::Output)
}

fn print_yaml<T: Serialize>(records: &[T]) -> Result<()> {
    print!("{}", render_yaml(records)?);
    Ok(())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string())
        .unwrap_or_else(|| "undated".to_string())
}

fn print_appointment(appointment: &Appointment) {
    let court = match appointment.chamber() {
        Some(chamber) => format!("{chamber}, {}", appointment.court()),
        None => appointment.court().to_string(),
    };
    println!(
        "  {} {}: {}, {} ({})",
        style(format_date(appointment.date())).dim(),
        style(appointment.person()).green(),
        appointment.position(),
        court,
        style(appointment.id()).cyan()
    );
}

fn print_situation(situation: &Situation) {
    println!(
        "  {} {} ({})",
        style(format_date(situation.date())).dim(),
        style(situation.person()).green(),
        style(situation.id()).cyan()
    );
}

fn print_item(item: &Item) {
    println!("  {} {}", style(&item.id).cyan(), item.title);
}

fn print_skipped(skipped: &SkippedItem) {
    println!(
        "  {} {}: {}",
        style("Skipped").yellow(),
        style(&skipped.id).cyan(),
        skipped.reason
    );
}

fn print_summary<R>(report: &ExtractionReport<R>) {
    println!();
    println!("  Records: {}", style(report.records.len()).green().bold());
    if !report.skipped.is_empty() {
        println!("  Skipped: {}", style(report.skipped.len()).yellow().bold());
        for skipped in &report.skipped {
            print_skipped(skipped);
        }
    }
}
