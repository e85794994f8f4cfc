use anyhow::{Result, bail};
use chrono::NaiveDate;
use indicatif::ProgressBar;
use rayon::prelude::*;

use tombola_db::ledger::DrawLedger;
use tombola_db::models::UNIVERSE_SIZE;

use crate::fallback::{complete, global_frequency_rank};
use crate::strategies::PredictionStrategy;
use crate::windows::{WeekWindow, week_windows};

pub const DEFAULT_K: usize = 10;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// Taille du classement hebdomadaire (1..=100).
    pub k: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self { k: DEFAULT_K }
    }
}

impl BacktestConfig {
    /// Validation avant le lancement : aucune fenêtre n'est traitée
    /// si la configuration est invalide.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 || self.k > UNIVERSE_SIZE {
            bail!("k invalide : {} (attendu entre 1 et {})", self.k, UNIVERSE_SIZE);
        }
        Ok(())
    }
}

/// Prédiction retenue pour une semaine. `prediction` vide signifie
/// « aucune donnée avant la fin de cette semaine ».
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyResult {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub prediction: Vec<u8>,
}

/// Parcourt les semaines dans l'ordre chronologique et interroge la
/// stratégie avec la seule tranche d'historique antérieure à la fin de
/// chaque semaine. Le complètement par fréquence globale est appliqué
/// ici, sur la même tranche, jamais sur le registre entier.
///
/// Les fenêtres sont indépendantes les unes des autres : elles sont
/// évaluées en parallèle, et l'ordre du registre de résultats reste
/// l'ordre des semaines quel que soit l'ordonnancement des workers.
pub fn run_backtest(
    ledger: &DrawLedger,
    strategy: &dyn PredictionStrategy,
    config: &BacktestConfig,
    progress: Option<&ProgressBar>,
) -> Result<Vec<WeeklyResult>> {
    config.validate()?;

    let windows: Vec<WeekWindow> = week_windows(ledger).collect();
    let results = windows
        .par_iter()
        .map(|window| {
            let result = evaluate_window(ledger, strategy, *window, config.k);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            result
        })
        .collect();
    Ok(results)
}

fn evaluate_window(
    ledger: &DrawLedger,
    strategy: &dyn PredictionStrategy,
    window: WeekWindow,
    k: usize,
) -> WeeklyResult {
    let history = ledger.as_of(window.end);
    let prediction = if history.is_empty() {
        // Rien à compléter non plus : pas de fréquence globale sans données
        Vec::new()
    } else {
        let partial = strategy.predict(history, window.end, k);
        complete(partial, k, &global_frequency_rank(history))
    };

    WeeklyResult {
        week_start: window.start,
        week_end: window.end,
        prediction,
    }
}
