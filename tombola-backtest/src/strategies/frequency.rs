use chrono::NaiveDate;

use tombola_db::models::Observation;

use super::PredictionStrategy;
use crate::fallback::global_frequency_rank;

/// Classe les 100 numéros par nombre d'occurrences historiques décroissant.
/// Égalités : occurrence la plus récente d'abord, puis numéro croissant.
/// Sans historique, aucune confiance : classement vide.
pub struct FrequencyStrategy;

impl FrequencyStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FrequencyStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionStrategy for FrequencyStrategy {
    fn name(&self) -> &str {
        "Frequency"
    }

    fn predict(&self, history: &[Observation], _as_of: NaiveDate, k: usize) -> Vec<u8> {
        if history.is_empty() {
            return Vec::new();
        }
        let mut ranking = global_frequency_rank(history);
        ranking.truncate(k);
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::{make_test_observations, ranking_is_valid};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_daily_number_ranks_first() {
        // 42 sort tous les jours dans l'historique synthétique
        let history = make_test_observations(14);
        let ranking = FrequencyStrategy::new().predict(&history, d("2024-01-14"), 10);
        assert_eq!(ranking[0], 42);
        assert_eq!(ranking.len(), 10);
        assert!(ranking_is_valid(&ranking, 10));
    }

    #[test]
    fn test_empty_history_returns_empty() {
        let ranking = FrequencyStrategy::new().predict(&[], d("2024-01-01"), 10);
        assert!(ranking.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let history = make_test_observations(30);
        let strategy = FrequencyStrategy::new();
        let first = strategy.predict(&history, d("2024-02-01"), 10);
        let second = strategy.predict(&history, d("2024-02-01"), 10);
        assert_eq!(first, second);
    }

    #[test]
    fn test_truncates_to_k() {
        let history = make_test_observations(14);
        let ranking = FrequencyStrategy::new().predict(&history, d("2024-01-14"), 3);
        assert_eq!(ranking.len(), 3);
    }
}
