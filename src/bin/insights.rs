//! Insights CLI - Command-line interface for moodscope
//!
//! Commands:
//! - classify: Classify free text into an emotion and intensity
//! - validate: Validate raw storage rows and report rejections
//! - snapshot: Compute a windowed wellness snapshot
//! - series: Compute a gap-filled chart series
//! - streak: Compute the engagement streak
//!
//! All computing commands accept `--today` to freeze the clock, which
//! makes output reproducible in scripts and tests.

use chrono::{FixedOffset, Local, NaiveDate, Offset};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use moodscope::normalizer::{AssessmentRow, EntryRow, RecordNormalizer, RejectedRow};
use moodscope::{
    compute_series, compute_snapshot, compute_streak, CalendarUnit, EmotionClassifier, RawEntry,
    ValueKey, WindowSpec, ENGINE_VERSION,
};

/// Insights - windowed statistics over mood journals and assessments
#[derive(Parser)]
#[command(name = "insights")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Aggregate mood journals and assessment scores", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify free text into an emotion and intensity
    Classify {
        /// Text to classify
        text: String,
    },

    /// Validate raw rows and report which would be dropped
    Validate {
        /// Input file with a JSON array of rows (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Row kind contained in the input
        #[arg(long, default_value = "entries")]
        kind: RowKind,
    },

    /// Compute a windowed wellness snapshot
    Snapshot {
        /// Journal rows, JSON array (use - for stdin)
        #[arg(short, long)]
        entries: PathBuf,

        /// Assessment rows, JSON array
        #[arg(short, long)]
        assessments: Option<PathBuf>,

        /// Window to aggregate over
        #[arg(long, default_value = "week")]
        window: WindowArg,

        /// Day count when --window rolling
        #[arg(long, default_value = "30")]
        days: u32,

        /// Freeze "today" (YYYY-MM-DD); defaults to the local date
        #[arg(long)]
        today: Option<NaiveDate>,

        /// User UTC offset for day truncation (e.g. "-05:00")
        #[arg(long)]
        offset: Option<FixedOffset>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Compute a gap-filled day series for charting
    Series {
        /// Input rows, JSON array (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Which numeric field to chart
        #[arg(long, default_value = "intensity")]
        key: KeyArg,

        /// Number of day buckets
        #[arg(long, default_value = "7")]
        days: u32,

        /// Freeze "today" (YYYY-MM-DD); defaults to the local date
        #[arg(long)]
        today: Option<NaiveDate>,

        /// User UTC offset for day truncation (e.g. "-05:00")
        #[arg(long)]
        offset: Option<FixedOffset>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Compute the engagement streak over the full journal history
    Streak {
        /// Journal rows, JSON array (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Freeze "today" (YYYY-MM-DD); defaults to the local date
        #[arg(long)]
        today: Option<NaiveDate>,

        /// User UTC offset for day truncation (e.g. "-05:00")
        #[arg(long)]
        offset: Option<FixedOffset>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum RowKind {
    /// Journal entry rows
    Entries,
    /// Assessment rows
    Assessments,
}

#[derive(Clone, ValueEnum)]
enum WindowArg {
    Day,
    Week,
    Month,
    Year,
    Rolling,
}

#[derive(Clone, ValueEnum)]
enum KeyArg {
    /// Journal intensity (0-10)
    Intensity,
    /// Assessment score (0-100)
    Score,
}

#[derive(Serialize)]
struct CliError {
    error: String,
}

#[derive(Serialize)]
struct ValidationReport {
    accepted: usize,
    rejected: Vec<RejectedRow>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let envelope = CliError {
                error: e.to_string(),
            };
            eprintln!(
                "{}",
                serde_json::to_string(&envelope).unwrap_or_else(|_| e.to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Classify { text } => {
            let classification = EmotionClassifier::classify(&text);
            println!("{}", serde_json::to_string(&classification)?);
            Ok(())
        }

        Commands::Validate { input, kind } => cmd_validate(&input, kind),

        Commands::Snapshot {
            entries,
            assessments,
            window,
            days,
            today,
            offset,
            pretty,
        } => cmd_snapshot(
            &entries,
            assessments.as_deref(),
            window,
            days,
            today,
            offset,
            pretty,
        ),

        Commands::Series {
            input,
            key,
            days,
            today,
            offset,
            pretty,
        } => cmd_series(&input, key, days, today, offset, pretty),

        Commands::Streak {
            input,
            today,
            offset,
            pretty,
        } => cmd_streak(&input, today, offset, pretty),
    }
}

fn cmd_validate(input: &Path, kind: RowKind) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_input(input)?;

    let report = match kind {
        RowKind::Entries => {
            let rows: Vec<EntryRow> = serde_json::from_str(&data)?;
            let normalized = RecordNormalizer::normalize_entries(rows);
            ValidationReport {
                accepted: normalized.records.len(),
                rejected: normalized.rejected,
            }
        }
        RowKind::Assessments => {
            let rows: Vec<AssessmentRow> = serde_json::from_str(&data)?;
            let normalized = RecordNormalizer::normalize_assessments(rows);
            ValidationReport {
                accepted: normalized.records.len(),
                rejected: normalized.rejected,
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_snapshot(
    entries_path: &Path,
    assessments_path: Option<&Path>,
    window: WindowArg,
    days: u32,
    today: Option<NaiveDate>,
    offset: Option<FixedOffset>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = load_entries(entries_path)?;

    let assessments = match assessments_path {
        Some(path) => {
            let rows: Vec<AssessmentRow> = serde_json::from_str(&read_input(path)?)?;
            RecordNormalizer::normalize_assessments(rows).records
        }
        None => Vec::new(),
    };

    let spec = match window {
        WindowArg::Day => WindowSpec::Calendar {
            unit: CalendarUnit::Day,
        },
        WindowArg::Week => WindowSpec::Calendar {
            unit: CalendarUnit::Week,
        },
        WindowArg::Month => WindowSpec::Calendar {
            unit: CalendarUnit::Month,
        },
        WindowArg::Year => WindowSpec::Calendar {
            unit: CalendarUnit::Year,
        },
        WindowArg::Rolling => WindowSpec::Rolling { days },
    };

    let snapshot = compute_snapshot(
        &entries,
        &assessments,
        &spec,
        resolve_today(today),
        resolve_offset(offset),
    );
    print_json(&snapshot, pretty)
}

fn cmd_series(
    input: &Path,
    key: KeyArg,
    days: u32,
    today: Option<NaiveDate>,
    offset: Option<FixedOffset>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let today = resolve_today(today);
    let offset = resolve_offset(offset);

    let buckets = match key {
        KeyArg::Intensity => {
            let entries = load_entries(input)?;
            compute_series(&entries, ValueKey::Intensity, days, today, offset)
        }
        KeyArg::Score => {
            let rows: Vec<AssessmentRow> = serde_json::from_str(&read_input(input)?)?;
            let assessments = RecordNormalizer::normalize_assessments(rows).records;
            compute_series(&assessments, ValueKey::Score, days, today, offset)
        }
    };

    print_json(&buckets, pretty)
}

fn cmd_streak(
    input: &Path,
    today: Option<NaiveDate>,
    offset: Option<FixedOffset>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = load_entries(input)?;
    let state = compute_streak(&entries, resolve_today(today), resolve_offset(offset));
    print_json(&state, pretty)
}

fn load_entries(path: &Path) -> Result<Vec<RawEntry>, Box<dyn std::error::Error>> {
    let rows: Vec<EntryRow> = serde_json::from_str(&read_input(path)?)?;
    Ok(RecordNormalizer::normalize_entries(rows).records)
}

fn read_input(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if path.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err("no input on stdin (use a file path or pipe data)".into());
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

fn resolve_offset(offset: Option<FixedOffset>) -> FixedOffset {
    offset.unwrap_or_else(|| Local::now().offset().fix())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}
