//! CLI entry point: wires the JSON-file repository into the two
//! deployment-time commands (spec §6).

use std::collections::HashMap;
use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use football_predict_core::cli::{Cli, Commands, LearnThresholdsArgs, TrainArgs};
use football_predict_core::config::Hyperparameters;
use football_predict_core::decision::thresholds::{self, ThresholdLearningResult, TicketOutcomeRecord};
use football_predict_core::ports::{MatchFilters, MatchRepository, ModelRepository, SystemClock, ThresholdsRepository};
use football_predict_core::storage::JsonFileRepository;
use football_predict_core::strength;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "football_predict_core=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn run_train(repo: &JsonFileRepository, args: TrainArgs) -> Result<()> {
    let filters = MatchFilters { league_code: Some(args.league.clone()), from: args.from, to: args.to };
    let matches = repo.historical(&filters).context("loading historical matches")?;

    let mut hyperparams = Hyperparameters::default();
    if let Some(xi) = args.xi {
        hyperparams.xi = xi;
    }
    if let Some(rho) = args.rho {
        hyperparams.rho = Hyperparameters::clamp_rho(rho);
    }
    if let Some(home_adv) = args.home_adv {
        hyperparams.home_advantage_prior = Hyperparameters::clamp_gamma(home_adv);
    }

    let version = repo
        .with_training_lock(|| strength::fit(&args.league, &matches, hyperparams, None, &SystemClock))
        .context("fitting strength estimator")?;

    ModelRepository::save(repo, &version).context("saving new model version")?;
    if args.activate {
        repo.activate(&version.id).context("activating new model version")?;
        info!(version_id = %version.id, "activated new model version");
    }

    println!("{}", version.id);
    Ok(())
}

#[derive(serde::Deserialize)]
struct OutcomeRecord {
    ticket_id: String,
    correct: u32,
    total: u32,
}

fn run_learn_thresholds(repo: &JsonFileRepository, args: LearnThresholdsArgs, base_dir: &str) -> Result<()> {
    let tickets_path = format!("{base_dir}/tickets.jsonl");
    let outcomes_path = format!("{base_dir}/outcomes.jsonl");

    let mut uds_by_id: HashMap<String, (f64, String)> = HashMap::new();
    if let Ok(text) = fs::read_to_string(&tickets_path) {
        for line in text.lines() {
            if let Ok(ticket) = serde_json::from_str::<football_predict_core::domain::Ticket>(line) {
                uds_by_id.insert(ticket.id.clone(), (ticket.uds, ticket.decision_version.clone()));
            }
        }
    }

    let mut records = Vec::new();
    if let Ok(text) = fs::read_to_string(&outcomes_path) {
        for line in text.lines() {
            if let Ok(outcome) = serde_json::from_str::<OutcomeRecord>(line) {
                if let Some((uds, decision_version)) = uds_by_id.get(&outcome.ticket_id) {
                    if decision_version == thresholds::DECISION_VERSION {
                        records.push(TicketOutcomeRecord {
                            uds: *uds,
                            decision_version: thresholds::DECISION_VERSION,
                            correct: outcome.correct * 2 >= outcome.total,
                        });
                    }
                }
            }
        }
    }

    let prior = repo.current().context("loading prior thresholds")?;
    match thresholds::learn_ev_threshold(&records, &prior) {
        ThresholdLearningResult::Updated(updated) => {
            ThresholdsRepository::save(repo, &updated).context("saving updated thresholds")?;
            info!(ev_threshold = updated.ev_threshold, since = %args.since, "learned new ev_threshold");
        }
        ThresholdLearningResult::Insufficient { reason } => {
            warn!(reason, "threshold learning insufficient, keeping prior thresholds");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let repo = JsonFileRepository::new(&cli.data_dir).context("opening JSON-file repository")?;

    match cli.command {
        Commands::Train(args) => run_train(&repo, args),
        Commands::LearnThresholds(args) => {
            let data_dir = cli.data_dir.clone();
            run_learn_thresholds(&repo, args, &data_dir)
        }
    }
}
