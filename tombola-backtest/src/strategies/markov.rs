use std::collections::HashMap;

use chrono::NaiveDate;

use tombola_db::models::Observation;

use super::PredictionStrategy;
use crate::fallback::global_frequency_rank;

pub const DEFAULT_MIN_SUCCESSORS: usize = 3;

/// Chaîne de Markov d'ordre 1 sur l'ordre du tirage intra-journée :
/// pour chaque numéro, l'histogramme des numéros sortis juste après lui
/// le même jour. La prédiction part du dernier numéro observé.
///
/// Si ce numéro a moins de `min_successors` successeurs distincts,
/// on retombe sur le classement par fréquence, restreint aux numéros
/// pas encore classés.
pub struct MarkovStrategy {
    min_successors: usize,
}

impl MarkovStrategy {
    pub fn new(min_successors: usize) -> Self {
        Self { min_successors }
    }
}

impl Default for MarkovStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SUCCESSORS)
    }
}

/// Table de transitions, reconstruite intégralement pour chaque tranche
/// d'historique — aucun état ne survit à la fenêtre.
fn build_transitions(history: &[Observation]) -> HashMap<u8, HashMap<u8, u32>> {
    let mut transitions: HashMap<u8, HashMap<u8, u32>> = HashMap::new();
    for pair in history.windows(2) {
        if pair[0].date == pair[1].date {
            *transitions
                .entry(pair[0].number)
                .or_default()
                .entry(pair[1].number)
                .or_insert(0) += 1;
        }
    }
    transitions
}

impl PredictionStrategy for MarkovStrategy {
    fn name(&self) -> &str {
        "Markov"
    }

    fn predict(&self, history: &[Observation], _as_of: NaiveDate, k: usize) -> Vec<u8> {
        let current = match history.last() {
            Some(obs) => obs.number,
            None => return Vec::new(),
        };

        let transitions = build_transitions(history);
        let mut ranking: Vec<u8> = match transitions.get(&current) {
            Some(successors) => {
                let mut targets: Vec<(u8, u32)> =
                    successors.iter().map(|(&n, &c)| (n, c)).collect();
                targets.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
                targets.into_iter().map(|(n, _)| n).collect()
            }
            None => Vec::new(),
        };

        if ranking.len() < self.min_successors {
            for n in global_frequency_rank(history) {
                if ranking.len() >= k {
                    break;
                }
                if !ranking.contains(&n) {
                    ranking.push(n);
                }
            }
        }

        ranking.truncate(k);
        ranking
    }
}
