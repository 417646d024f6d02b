//! `shifts` CLI — generate shift schedules from an agenda document.
//!
//! ## Usage
//!
//! ```sh
//! # Shift starts for a date range, one per line (agenda on stdin)
//! shifts schedule --from 2016-01-04 --to 2016-01-08 < agenda.json
//!
//! # Read the agenda from a file, write a JSON array to another
//! shifts schedule -i agenda.json --from 2016-01-01 --to 2016-03-31 --format json -o out.json
//!
//! # Check an agenda document without generating anything
//! shifts validate -i agenda.json
//!
//! # Export each rule's recurrence as an RFC 5545 DTSTART + RRULE
//! shifts rrule -i agenda.json --from 2016-01-07
//!
//! # More logging (or set RUST_LOG)
//! shifts -vv schedule -i agenda.json --from 2016-01-04 --to 2016-01-08
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use shift_engine::{ical, Agenda, ScheduleQuery};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shifts",
    version,
    about = "Shift schedules from recurring availability rules"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log to stderr; repeat for more detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the shift starts inside a date range
    Schedule {
        /// Agenda JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// First day of the range, YYYY-MM-DD (inclusive)
        #[arg(long)]
        from: String,
        /// Last day of the range, YYYY-MM-DD (inclusive)
        #[arg(long)]
        to: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Lines)]
        format: OutputFormat,
    },
    /// Load and validate an agenda document
    Validate {
        /// Agenda JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Print each rule's recurrence as an RFC 5545 DTSTART and RRULE
    Rrule {
        /// Agenda JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Start the recurrence at or after this day, YYYY-MM-DD
        /// (defaults to each rule's validity.from)
        #[arg(long)]
        from: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One `YYYY-MM-DD HH:MM:SS` timestamp per line
    Lines,
    /// A JSON array of timestamp strings
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Schedule {
            input,
            output,
            from,
            to,
            format,
        } => {
            let agenda = load_agenda(input.as_deref())?;
            let query = ScheduleQuery::parse(&from, &to).context("Invalid --from/--to range")?;
            let shifts = agenda
                .get_schedule(&query)
                .context("Failed to generate schedule")?;
            tracing::info!(shifts = shifts.len(), %from, %to, "schedule ready");

            let starts: Vec<String> = shifts.iter().map(|s| s.to_string()).collect();
            let rendered = match format {
                OutputFormat::Lines => starts.iter().map(|s| format!("{}\n", s)).collect(),
                OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&starts)?),
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Validate { input } => {
            let agenda = load_agenda(input.as_deref())?;
            println!(
                "Availability rules:     {}",
                agenda.availability().count()
            );
            println!(
                "Unavailability entries: {}",
                agenda.unavailability().count()
            );
        }
        Commands::Rrule { input, from } => {
            let from = from
                .map(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d"))
                .transpose()
                .context("Invalid --from date, expected YYYY-MM-DD")?;
            let agenda = load_agenda(input.as_deref())?;
            for (id, rule) in agenda.availability() {
                let Some(rrule) = ical::to_rrule(rule) else {
                    println!("{} (custom weeks have no RRULE form)", id);
                    continue;
                };
                match from.or(rule.anchor()).map(|start| ical::dtstart(rule, start)) {
                    Some(Some(dtstart)) => println!("{} DTSTART:{} RRULE:{}", id, dtstart, rrule),
                    Some(None) => println!("{} (no occurrence on or after the start day)", id),
                    None => println!("{} RRULE:{}", id, rrule),
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn load_agenda(path: Option<&str>) -> Result<Agenda> {
    let json = read_input(path)?;
    let agenda = Agenda::from_json(&json).context("Failed to load agenda")?;
    tracing::debug!(
        rules = agenda.availability().count(),
        unavailability = agenda.unavailability().count(),
        "agenda loaded"
    );
    Ok(agenda)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
