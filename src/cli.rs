//! Deployment-time CLI surface (spec §6 "CLI / deployment surface"): two
//! idempotent commands, `train` and `learn-thresholds`.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "football-predict")]
#[command(author, version, about = "Dixon-Coles football outcome prediction core")]
pub struct Cli {
    /// Base directory for the JSON-file repository.
    #[arg(long, global = true, env = "FOOTBALL_PREDICT_DATA_DIR", default_value = "./data")]
    pub data_dir: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit a new ModelVersion for one league and print its id.
    Train(TrainArgs),
    /// Re-fit the learned decision thresholds from outcome-closed tickets.
    LearnThresholds(LearnThresholdsArgs),
}

#[derive(Parser)]
pub struct TrainArgs {
    #[arg(long)]
    pub league: String,

    #[arg(long)]
    pub from: Option<NaiveDate>,

    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[arg(long)]
    pub xi: Option<f64>,

    #[arg(long)]
    pub rho: Option<f64>,

    #[arg(long = "home-adv")]
    pub home_adv: Option<f64>,

    /// Atomically activate the new version once fit succeeds.
    #[arg(long)]
    pub activate: bool,
}

#[derive(Parser)]
pub struct LearnThresholdsArgs {
    #[arg(long)]
    pub since: NaiveDate,
}
