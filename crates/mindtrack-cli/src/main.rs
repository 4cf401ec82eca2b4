use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use eyre::Result;
use mindtrack_cli::batch::{Batch, check_formula, summarize};
use mindtrack_cli::config::{
    MindtrackConfig, default_config_path, default_ledger_path, init_config, resolve_config,
};
use mindtrack_core::ids::ScoringSystemId;
use mindtrack_scoring::config::PopulationMode;
use mindtrack_scoring::engine::ScoringEngine;
use mindtrack_storage::JsonFileScoreStore;
use mindtrack_storage::inputs::{load_catalog, load_responses};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mindtrack", about = "Score questionnaire responses", version)]
struct Cli {
    /// Config file (default: <config dir>/mindtrack/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Score ledger, overriding the config file
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,
    /// Write logs to stderr as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score responses and store the results
    Score(ScoreArgs),
    /// Rescore every stored response of one scoring system
    Recalculate(RecalculateArgs),
    /// Describe the stored scores of one scoring system
    Summary(SummaryArgs),
    /// Parse and evaluate a custom formula
    CheckFormula(CheckFormulaArgs),
    /// Write the config file with every setting, migrating an existing one
    InitConfig,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Catalog JSON (questionnaires and scoring systems)
    #[arg(long)]
    catalog: PathBuf,
    /// Responses JSON (an array of responses)
    #[arg(long)]
    responses: PathBuf,
    /// Only score with this system instead of every active one
    #[arg(long)]
    system: Option<ScoringSystemId>,
    /// Population used for z-scores and percentiles
    #[arg(long, value_enum)]
    population_mode: Option<PopulationModeArg>,
}

#[derive(Args, Debug)]
struct RecalculateArgs {
    #[arg(long)]
    catalog: PathBuf,
    #[arg(long)]
    responses: PathBuf,
    #[arg(long)]
    system: ScoringSystemId,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[arg(long)]
    catalog: PathBuf,
    #[arg(long)]
    system: ScoringSystemId,
}

#[derive(Args, Debug)]
struct CheckFormulaArgs {
    #[arg(long)]
    formula: String,
    /// Variable binding, repeatable (e.g. --var q_1=3)
    #[arg(long = "var", value_parser = parse_var)]
    vars: Vec<(String, f64)>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum PopulationModeArg {
    Live,
    Snapshot,
}

impl From<PopulationModeArg> for PopulationMode {
    fn from(arg: PopulationModeArg) -> Self {
        match arg {
            PopulationModeArg::Live => PopulationMode::Live,
            PopulationModeArg::Snapshot => PopulationMode::Snapshot,
        }
    }
}

fn parse_var(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for {name}: {e}"))?;
    Ok((name.trim().to_string(), value))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Score(args) => {
            let mut config = setup(cli.config.as_deref(), cli.json_logs)?;
            if let Some(mode) = args.population_mode {
                config.engine.population_mode = mode.into();
            }
            let store = open_ledger(cli.ledger.as_deref(), &config)?;
            let catalog = load_catalog(&args.catalog)?;
            let responses = load_responses(&args.responses)?;
            let engine = ScoringEngine::new(config.engine.clone());
            let scores = Batch::new(&catalog, &store, &engine).score(&responses, args.system)?;
            print_json(&scores)
        }
        Command::Recalculate(args) => {
            let config = setup(cli.config.as_deref(), cli.json_logs)?;
            let store = open_ledger(cli.ledger.as_deref(), &config)?;
            let catalog = load_catalog(&args.catalog)?;
            let responses = load_responses(&args.responses)?;
            let engine = ScoringEngine::new(config.engine.clone());
            let scores =
                Batch::new(&catalog, &store, &engine).recalculate(&responses, args.system)?;
            print_json(&scores)
        }
        Command::Summary(args) => {
            let config = setup(cli.config.as_deref(), cli.json_logs)?;
            let store = open_ledger(cli.ledger.as_deref(), &config)?;
            let catalog = load_catalog(&args.catalog)?;
            print_json(&summarize(&catalog, &store, args.system)?)
        }
        Command::CheckFormula(args) => {
            let config = setup(cli.config.as_deref(), cli.json_logs)?;
            let variables: BTreeMap<String, f64> = args.vars.into_iter().collect();
            let check = check_formula(&args.formula, &variables, &config.engine);
            print_json(&check)?;
            if !check.is_ok() {
                return Err(eyre::eyre!("formula check failed"));
            }
            Ok(())
        }
        Command::InitConfig => {
            init_tracing(cli.json_logs);
            let path = match cli.config {
                Some(path) => path,
                None => default_config_path()?,
            };
            print_json(&init_config(&path)?)
        }
    }
}

/// Every command but `init-config` needs its config to exist and load.
fn setup(config: Option<&Path>, json_logs: bool) -> Result<MindtrackConfig> {
    let config = resolve_config(config)?;
    init_tracing(json_logs || config.json_logs);
    Ok(config)
}

/// Logs go to stderr so stdout stays valid JSON.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_ledger(flag: Option<&Path>, config: &MindtrackConfig) -> Result<JsonFileScoreStore> {
    let path = match flag.or(config.ledger.as_deref()) {
        Some(path) => path.to_path_buf(),
        None => default_ledger_path()?,
    };
    tracing::debug!(path = %path.display(), "opening score ledger");
    Ok(JsonFileScoreStore::open(path)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
