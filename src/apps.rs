use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::aggregates::add_aggregation_columns;
use crate::config::PrepConfig;
use crate::constants::artifacts::{HOLDOUT_FILENAME, INDEX_FILENAME, TRAIN_FILENAME};
use crate::ingestion::get_transactions;
use crate::remap::{IdentifierIndex, IdentifierRemapper};
use crate::splits::EvaluationSplitter;
use crate::transport::fs::{write_evaluation_csv, write_interactions_csv};

#[derive(Debug, Parser)]
#[command(
    name = "prepare_holdouts",
    disable_help_subcommand = true,
    about = "Build leave-last-k-out evaluation artifacts from transaction logs",
    long_about = "Normalize the inventory and purchases logs, split each user's purchase history into training rows and holdout scenarios, remap item identifiers to dense indices, and write train/holdout CSV files.",
    after_help = "Without --index, identifiers are indexed in inventory order followed by purchase-only identifiers, and the index is written next to the outputs."
)]
struct PrepareCli {
    #[arg(long, value_name = "PATH", help = "Inventory (item additions) CSV log")]
    inventory: PathBuf,
    #[arg(long, value_name = "PATH", help = "Purchases CSV log, one row per basket item")]
    purchases: PathBuf,
    #[arg(long = "out-dir", value_name = "DIR", help = "Directory for generated artifacts")]
    out_dir: PathBuf,
    #[arg(
        long,
        value_name = "PATH",
        help = "Optional JSON identifier index ({\"id\": index}) built upstream"
    )]
    index: Option<PathBuf>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Optional JSON pipeline configuration (field names, threshold)"
    )]
    config: Option<PathBuf>,
    #[arg(
        long,
        value_parser = parse_positive_usize,
        help = "Rows held out per user (overrides the configuration file)"
    )]
    threshold: Option<usize>,
    #[arg(long = "display-stats", help = "Log per-column statistics after ingestion")]
    display_stats: bool,
    #[arg(
        long = "no-aggregates",
        help = "Skip the n_baskets/n_items aggregation columns"
    )]
    no_aggregates: bool,
}

/// Counts reported after a successful `prepare_holdouts` run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrepareSummary {
    pub inventory_rows: usize,
    pub baskets: usize,
    pub train_rows: usize,
    pub holdout_scenarios: usize,
    pub indexed_items: usize,
    pub out_dir: PathBuf,
}

/// Parse `args_iter` (without the program name) and run the full pipeline.
///
/// Returns `Ok(None)` when help or version output was requested.
pub fn run_prepare<I>(args_iter: I) -> Result<Option<PrepareSummary>, Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) = parse_cli::<PrepareCli, _>(
        std::iter::once("prepare_holdouts".to_string()).chain(args_iter),
    )?
    else {
        return Ok(None);
    };

    let mut config = match &cli.config {
        Some(path) => serde_json::from_str::<PrepConfig>(&fs::read_to_string(path)?)?,
        None => PrepConfig::default(),
    };
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    config.display_stats |= cli.display_stats;
    let config = config.validated()?;

    let (inventory, purchases) = get_transactions(&cli.inventory, &cli.purchases, &config)?;
    let purchases = if cli.no_aggregates {
        purchases
    } else {
        add_aggregation_columns(purchases)?
    };

    fs::create_dir_all(&cli.out_dir)?;
    let index = match &cli.index {
        Some(path) => IdentifierIndex::from_json_path(path)?,
        None => {
            let mut index = IdentifierIndex::from_vocabulary(inventory.item_id.iter_ids());
            index.extend_vocabulary(purchases.item_id.iter_ids());
            index.to_json_path(cli.out_dir.join(INDEX_FILENAME))?;
            index
        }
    };

    let baskets = purchases.len();
    let splitter = EvaluationSplitter::new(config.threshold)?;
    let (holdout, train) = splitter.split(purchases)?;

    let remapper = IdentifierRemapper::new(&index);
    let train = remapper.remap_interactions(train)?;
    let holdout = remapper.remap_holdout(holdout)?;

    write_interactions_csv(cli.out_dir.join(TRAIN_FILENAME), &train)?;
    let holdout_scenarios = holdout.len();
    write_evaluation_csv(
        cli.out_dir.join(HOLDOUT_FILENAME),
        &holdout.into_evaluation_table(),
    )?;

    let summary = PrepareSummary {
        inventory_rows: inventory.len(),
        baskets,
        train_rows: train.len(),
        holdout_scenarios,
        indexed_items: index.len(),
        out_dir: cli.out_dir,
    };
    println!("=== prepare_holdouts ===");
    println!("threshold: {}", config.threshold);
    println!("inventory rows: {}", summary.inventory_rows);
    println!("purchase baskets: {}", summary.baskets);
    println!("train rows: {}", summary.train_rows);
    println!("holdout scenarios: {}", summary.holdout_scenarios);
    println!("indexed items: {}", summary.indexed_items);
    println!("output dir: {}", summary.out_dir.display());
    Ok(Some(summary))
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw.parse::<usize>().map_err(|_| {
        format!(
            "Could not parse --threshold value '{}' as a positive integer",
            raw
        )
    })?;
    if parsed == 0 {
        return Err("--threshold must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
