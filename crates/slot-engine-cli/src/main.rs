use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use slot_engine::{
    normalize_windows, resolve_date_range, resolve_effective_template_detailed,
    AvailabilityService, NegotiationOptions, ProposedInterval, ScheduleTemplate,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slots", version, about = "Inspect venue schedule templates and negotiate booking ranges")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which template governs a date (or every date in a range)
    Resolve {
        #[command(flatten)]
        source: TemplateSource,
        /// Date to resolve (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        /// Resolve every day up to and including this date
        #[arg(long)]
        until: Option<NaiveDate>,
    },
    /// Show a template's windows after sorting and merging
    Normalize {
        #[command(flatten)]
        source: TemplateSource,
        /// Template id
        #[arg(long)]
        id: u64,
    },
    /// Show the bookable day: governing template, windows, and limits
    Day {
        #[command(flatten)]
        source: TemplateSource,
        #[arg(short, long)]
        date: NaiveDate,
    },
    /// Negotiate a proposed booking interval on a date
    Negotiate {
        #[command(flatten)]
        source: TemplateSource,
        #[arg(short, long)]
        date: NaiveDate,
        /// Proposed start, minutes since midnight
        #[arg(long, allow_negative_numbers = true)]
        start: i32,
        /// Proposed end, minutes since midnight
        #[arg(long, allow_negative_numbers = true)]
        end: i32,
        #[command(flatten)]
        tuning: Tuning,
    },
}

#[derive(Args)]
struct TemplateSource {
    /// JSON file holding an array of templates (use '-' for stdin)
    #[arg(short, long, default_value = "-")]
    templates: PathBuf,
}

#[derive(Args)]
struct Tuning {
    /// Round proposed ends up to a multiple of this many minutes
    #[arg(long, default_value_t = 15)]
    granularity: i32,
    /// Snap a start this many minutes early onto the window start
    #[arg(long, default_value_t = 30)]
    snap_threshold: i32,
    /// Move an earlier start forward by this many minutes
    #[arg(long, default_value_t = 60)]
    shift: i32,
}

impl From<&Tuning> for NegotiationOptions {
    fn from(t: &Tuning) -> Self {
        NegotiationOptions {
            granularity_minutes: t.granularity,
            snap_threshold_minutes: t.snap_threshold,
            shift_minutes: t.shift,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Resolve {
            source,
            date,
            until,
        } => {
            let templates = load_templates(source)?;
            match until {
                Some(until) => {
                    let days: Vec<_> = resolve_date_range(*date, *until, &templates)?
                        .into_iter()
                        .map(|(date, resolution)| DayResolution { date, resolution })
                        .collect();
                    emit(&days, cli.pretty)
                }
                None => emit(&resolve_effective_template_detailed(*date, &templates), cli.pretty),
            }
        }
        Commands::Normalize { source, id } => {
            let templates = load_templates(source)?;
            let template = templates
                .iter()
                .find(|t| t.id == *id)
                .with_context(|| format!("no template with id {id}"))?;
            let windows = normalize_windows(template)?;
            emit(&windows, cli.pretty)
        }
        Commands::Day { source, date } => {
            let templates = load_templates(source)?;
            let day = AvailabilityService::default().day_availability(*date, &templates)?;
            emit(&day, cli.pretty)
        }
        Commands::Negotiate {
            source,
            date,
            start,
            end,
            tuning,
        } => {
            let templates = load_templates(source)?;
            let service = AvailabilityService::new(tuning.into());
            let resolved =
                service.negotiate_booking(*date, &templates, ProposedInterval::new(*start, *end))?;
            emit(&resolved, cli.pretty)
        }
    }
}

#[derive(Serialize)]
struct DayResolution<'a> {
    date: NaiveDate,
    resolution: slot_engine::Resolution<'a>,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_templates(source: &TemplateSource) -> Result<Vec<ScheduleTemplate>> {
    let raw = if source.templates.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read templates from stdin")?;
        buf
    } else {
        fs::read_to_string(&source.templates)
            .with_context(|| format!("Failed to read {}", source.templates.display()))?
    };

    let templates: Vec<ScheduleTemplate> =
        serde_json::from_str(&raw).context("Invalid template JSON")?;
    tracing::debug!(count = templates.len(), "loaded templates");
    Ok(templates)
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}
