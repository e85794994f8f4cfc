pub mod classifier;
pub mod cluster;
pub mod frequency;
pub mod markov;

use chrono::NaiveDate;

use tombola_db::models::{Observation, UNIVERSE_SIZE};

/// Stratégie de prédiction hebdomadaire.
///
/// Le contrat est strict : fonction pure de `history` (trié par date
/// croissante, borné par `as_of`) et de `as_of`, aucun état conservé
/// entre deux fenêtres. Une stratégie qui ne peut pas se prononcer
/// (données trop rares, ajustement dégénéré) retourne un classement
/// court ou vide — jamais une erreur. Le harnais se charge du
/// complètement par fréquence globale.
pub trait PredictionStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Retourne au plus `k` numéros distincts dans [0, 99],
    /// du plus confiant au moins confiant.
    fn predict(&self, history: &[Observation], as_of: NaiveDate, k: usize) -> Vec<u8>;
}

pub fn ranking_is_valid(ranking: &[u8], k: usize) -> bool {
    if ranking.len() > k.min(UNIVERSE_SIZE) {
        return false;
    }
    if ranking.iter().any(|&n| n as usize >= UNIVERSE_SIZE) {
        return false;
    }
    let mut seen = [false; UNIVERSE_SIZE];
    for &n in ranking {
        if seen[n as usize] {
            return false;
        }
        seen[n as usize] = true;
    }
    true
}

/// Historique synthétique : `n_days` jours consécutifs depuis le 2024-01-01,
/// 10 numéros par jour. Le 42 sort tous les jours, le reste varie avec le jour.
pub fn make_test_observations(n_days: usize) -> Vec<Observation> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut observations = Vec::with_capacity(n_days * 10);
    for day in 0..n_days {
        let date = start + chrono::Days::new(day as u64);
        observations.push(Observation { date, number: 42 });
        for slot in 0..9u8 {
            let number = ((day as u8).wrapping_mul(7).wrapping_add(slot * 11)) % 100;
            if number != 42 {
                observations.push(Observation { date, number });
            }
        }
    }
    observations
}
