use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use tombola_db::db::{count_observations, db_path, fetch_all_observations, fetch_last_days, migrate, open_db};
use tombola_db::ledger::DrawLedger;

use tombola_backtest::display::{display_days, display_import_summary, display_results};
use tombola_backtest::export::export_results;
use tombola_backtest::harness::{BacktestConfig, DEFAULT_K, run_backtest};
use tombola_backtest::import::import_csv;
use tombola_backtest::strategies::PredictionStrategy;
use tombola_backtest::strategies::classifier::{ClassifierStrategy, DEFAULT_MAX_DEPTH, DEFAULT_TREES};
use tombola_backtest::strategies::cluster::{ClusterStrategy, DEFAULT_CLUSTERS};
use tombola_backtest::strategies::frequency::FrequencyStrategy;
use tombola_backtest::strategies::markov::{DEFAULT_MIN_SUCCESSORS, MarkovStrategy};
use tombola_backtest::windows::week_windows;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum StrategyKind {
    #[default]
    Frequency,
    Markov,
    Cluster,
    Classifier,
}

#[derive(Parser)]
#[command(name = "tombola-backtest", about = "Backtest hebdomadaire de prédictions de tombola")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les observations depuis un fichier CSV
    Import {
        /// Chemin vers le fichier CSV (colonnes Fecha, Numero)
        #[arg(short, long, default_value = "data/tombola.csv")]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers jours de tirage
    List {
        /// Nombre de jours à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Lancer le backtest semaine par semaine avec une stratégie
    Run {
        /// Stratégie de prédiction
        #[arg(short, long, value_enum, default_value_t = StrategyKind::Frequency)]
        strategy: StrategyKind,

        /// Taille du classement hebdomadaire
        #[arg(short, long, default_value_t = DEFAULT_K)]
        k: usize,

        /// Fichier CSV de sortie
        #[arg(short, long, default_value = "data/resultats_backtest.csv")]
        output: PathBuf,

        /// Markov : successeurs distincts minimum avant repli sur la fréquence
        #[arg(long, default_value_t = DEFAULT_MIN_SUCCESSORS)]
        min_successors: usize,

        /// Cluster : nombre de clusters
        #[arg(long, default_value_t = DEFAULT_CLUSTERS)]
        clusters: usize,

        /// Classifier : nombre d'arbres de la forêt
        #[arg(long, default_value_t = DEFAULT_TREES)]
        trees: usize,

        /// Classifier : profondeur maximale des arbres
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        depth: usize,

        /// Graine des algorithmes aléatoires (cluster, classifier)
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Run {
            strategy,
            k,
            output,
            min_successors,
            clusters,
            trees,
            depth,
            seed,
        } => cmd_run(&conn, strategy, k, &output, min_successors, clusters, trees, depth, seed),
    }
}

fn cmd_import(conn: &tombola_db::rusqlite::Connection, file: &PathBuf) -> Result<()> {
    let summary = import_csv(conn, file)?;
    display_import_summary(&summary);
    Ok(())
}

fn cmd_list(conn: &tombola_db::rusqlite::Connection, last: u32) -> Result<()> {
    let days = fetch_last_days(conn, last)?;
    display_days(&days);
    Ok(())
}

fn build_strategy(
    kind: StrategyKind,
    min_successors: usize,
    clusters: usize,
    trees: usize,
    depth: usize,
    seed: u64,
) -> Result<Box<dyn PredictionStrategy>> {
    match kind {
        StrategyKind::Frequency => Ok(Box::new(FrequencyStrategy::new())),
        StrategyKind::Markov => Ok(Box::new(MarkovStrategy::new(min_successors))),
        StrategyKind::Cluster => {
            if clusters == 0 {
                bail!("Nombre de clusters invalide : 0");
            }
            Ok(Box::new(ClusterStrategy::new(clusters, seed)))
        }
        StrategyKind::Classifier => {
            if trees == 0 || depth == 0 {
                bail!("Paramètres de forêt invalides : trees={}, depth={}", trees, depth);
            }
            Ok(Box::new(ClassifierStrategy::new(trees, depth, seed)))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    conn: &tombola_db::rusqlite::Connection,
    kind: StrategyKind,
    k: usize,
    output: &PathBuf,
    min_successors: usize,
    clusters: usize,
    trees: usize,
    depth: usize,
    seed: u64,
) -> Result<()> {
    let n = count_observations(conn)?;
    if n == 0 {
        bail!("Base vide. Lancez d'abord : tombola-backtest import");
    }

    // Toute la configuration est validée avant de toucher aux fenêtres
    let strategy = build_strategy(kind, min_successors, clusters, trees, depth, seed)?;
    let config = BacktestConfig { k };

    let ledger = DrawLedger::from_observations(fetch_all_observations(conn)?);
    let n_windows = week_windows(&ledger).count();

    println!(
        "Backtest {} sur {} observations, {} semaines...",
        strategy.name(),
        ledger.len(),
        n_windows
    );

    let pb = ProgressBar::new(n_windows as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap()
            .progress_chars("=> "),
    );

    let results = run_backtest(&ledger, strategy.as_ref(), &config, Some(&pb))?;
    pb.finish_with_message("Backtest terminé");

    export_results(&results, output)?;
    display_results(&results, 5);
    println!("\nRésultats écrits dans : {}", output.display());

    Ok(())
}
