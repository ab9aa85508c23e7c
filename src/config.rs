use std::path::PathBuf;

use chrono::TimeDelta;
use clap::Parser;

use crate::monitor::{DEFAULT_INTERVAL_SECS, MAX_INTERVAL_SECS};

/// Terminal deforestation-monitoring dashboard (synthetic data)
#[derive(Debug, Clone, Parser)]
#[command(name = "deforest-watch", version, about)]
pub struct Args {
    /// Directory of Natural Earth GeoJSON coastlines (built-in outline if omitted)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Seed for the synthetic data generator (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Seconds between monitoring cycles (at most one day)
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS as u64, value_parser = clap::value_parser!(u64).range(1..=MAX_INTERVAL_SECS as u64))]
    pub interval_secs: u64,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, default_value = "deforest-watch.log")]
    pub log_file: PathBuf,

    /// Begin in monitoring mode
    #[arg(long)]
    pub start_monitoring: bool,
}

impl Args {
    pub fn interval(&self) -> TimeDelta {
        TimeDelta::seconds(self.interval_secs as i64)
    }
}
