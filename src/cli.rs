use crate::models::IrrigationSource;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sigir",
    version,
    about = "Irrigation decisions for rice fields"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the irrigation journal directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print the report as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate config and query every data source
    Check,
    /// Record water applied to the field
    Irrigate {
        /// Net depth applied, mm
        #[arg(short, long)]
        amount: f64,
        /// Day of application (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// manual, rain or auto
        #[arg(long, default_value = "manual", value_parser = parse_source)]
        source: IrrigationSource,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List recorded irrigation events
    Journal {
        /// Only events on or after this day
        #[arg(long)]
        since: Option<NaiveDate>,
        /// Remove the event with this id
        #[arg(long)]
        delete: Option<i64>,
    },
}

fn parse_source(s: &str) -> Result<IrrigationSource, String> {
    IrrigationSource::from_str(s).ok_or_else(|| format!("unknown irrigation source '{}'", s))
}
