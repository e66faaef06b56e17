use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::models::chart_range::ChartRange;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the settings file (ohlcv_source.toml). Defaults are used when absent.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch series for one or more symbols and print a JSON summary line per series
    Fetch {
        /// Comma-separated list of symbols (e.g. "AAPL,MSFT")
        #[arg(long)]
        symbols: String,

        /// First day of the window (e.g. "2021-01-01"); overrides the settings file
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day of the window (e.g. "2021-12-31"); overrides the settings file
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Check whether the chart endpoint answers
    Probe,

    /// Validate and save query-window settings
    Settings {
        #[arg(long)]
        from: Option<NaiveDate>,

        #[arg(long)]
        to: Option<NaiveDate>,

        /// Range size: 5y, 2y, 1y, ytd, 6m, 3m, 1m, 5d, 1d or dynamic
        #[arg(long)]
        range: Option<ChartRange>,

        /// Where to write the settings; defaults to --config
        #[arg(long)]
        path: Option<PathBuf>,
    },
}
