use anyhow::Result;
use clap::{Parser, Subcommand};
use osadka_schemas::{project::ReportLimits, units::Unit};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod plotting;
mod workflow;

#[derive(Debug, Parser)]
#[command(name = "osadka", version, about = "Settlement survey reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build general and relative reports, tables and charts.
    Report {
        /// YAML run configuration; defaults are used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Project file, overrides the configuration.
        #[arg(short, long)]
        project: Option<PathBuf>,
        /// Output directory, overrides the configuration.
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Objects to report (repeatable).
        #[arg(long = "object")]
        objects: Vec<i32>,
        /// Cycles to report (repeatable).
        #[arg(long = "cycle")]
        cycles: Vec<i32>,
        #[arg(long)]
        no_charts: bool,
    },
    /// Create a project file from normalized CSV tables.
    Import {
        #[arg(short, long)]
        measurements: PathBuf,
        #[arg(short, long)]
        coordinates: Option<PathBuf>,
        /// Unit of the coordinate table (mm, cm, dm, m).
        #[arg(long, default_value = "m")]
        coord_unit: Unit,
        #[arg(long)]
        max_nomen: Option<f64>,
        #[arg(long)]
        max_calculated: Option<f64>,
        #[arg(long)]
        rel_nomen: Option<f64>,
        #[arg(long)]
        rel_calculated: Option<f64>,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Show the per-point cycle-state timeline of one object.
    Timeline {
        #[arg(short, long)]
        project: PathBuf,
        #[arg(long)]
        object: i32,
        /// Directory for the timeline table and chart.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("osadka=info".parse()?)
                .add_directive("osadka_core=info".parse()?),
        )
        .init();

    match Cli::parse().command {
        Command::Report {
            config,
            project,
            out,
            objects,
            cycles,
            no_charts,
        } => {
            let mut cfg = match config {
                Some(path) => config::ReportConfig::load(path)?,
                None => config::ReportConfig::default(),
            };
            if let Some(project) = project {
                cfg.project = project;
            }
            if let Some(out) = out {
                cfg.output_dir = out;
            }
            if !objects.is_empty() {
                cfg.objects = objects;
            }
            if !cycles.is_empty() {
                cfg.cycles = cycles;
            }
            if no_charts {
                cfg.charts = false;
            }

            let run_dir = workflow::run_report(&cfg)?;
            println!("\nReport run complete. Results are in {:?}", run_dir);
        }
        Command::Import {
            measurements,
            coordinates,
            coord_unit,
            max_nomen,
            max_calculated,
            rel_nomen,
            rel_calculated,
            out,
        } => {
            let limits = ReportLimits {
                max_nomen: max_nomen.unwrap_or(f64::NAN),
                max_calculated: max_calculated.unwrap_or(f64::NAN),
                rel_nomen: rel_nomen.unwrap_or(f64::NAN),
                rel_calculated: rel_calculated.unwrap_or(f64::NAN),
            };
            workflow::run_import(&measurements, coordinates.as_deref(), coord_unit, limits, &out)?;
        }
        Command::Timeline {
            project,
            object,
            out,
        } => workflow::run_timeline(&project, object, out.as_deref())?,
    }

    Ok(())
}
