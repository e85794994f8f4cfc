use chrono::{Days, NaiveDate};
use rand::SeedableRng;
use rand::prelude::*;
use rand::rngs::StdRng;

use tombola_db::models::{Observation, UNIVERSE_SIZE, weekday_index};

use super::PredictionStrategy;

pub const DEFAULT_TREES: usize = 100;
pub const DEFAULT_MAX_DEPTH: usize = 5;
pub const DEFAULT_SEED: u64 = 42;

const N_FEATURES: usize = 3;

/// Forêt aléatoire binaire : une ligne d'entraînement par (date, numéro),
/// caractéristiques {numéro, jour de semaine, compte cumulé strictement
/// avant la date}, étiquette 1 si le numéro est sorti ce jour-là.
/// On score les 100 numéros pour le jour suivant `as_of` et on classe
/// par probabilité décroissante.
///
/// Ajustement impossible (une seule journée d'historique, une seule
/// classe d'étiquettes) : classement vide, jamais d'erreur.
pub struct ClassifierStrategy {
    n_trees: usize,
    max_depth: usize,
    seed: u64,
}

impl ClassifierStrategy {
    pub fn new(n_trees: usize, max_depth: usize, seed: u64) -> Self {
        Self { n_trees, max_depth, seed }
    }
}

impl Default for ClassifierStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_TREES, DEFAULT_MAX_DEPTH, DEFAULT_SEED)
    }
}

impl PredictionStrategy for ClassifierStrategy {
    fn name(&self) -> &str {
        "ClassifierProbability"
    }

    fn predict(&self, history: &[Observation], as_of: NaiveDate, k: usize) -> Vec<u8> {
        let (samples, labels, final_counts) = match build_training_set(history) {
            Some(set) => set,
            None => return Vec::new(),
        };

        let mut rng = StdRng::seed_from_u64(self.seed);
        let sample_refs: Vec<&[f64; N_FEATURES]> = samples.iter().collect();
        let mut forest = Vec::with_capacity(self.n_trees);
        for _ in 0..self.n_trees {
            let indices: Vec<usize> = (0..sample_refs.len())
                .map(|_| rng.random_range(0..sample_refs.len()))
                .collect();
            let boot_samples: Vec<&[f64; N_FEATURES]> =
                indices.iter().map(|&i| sample_refs[i]).collect();
            let boot_labels: Vec<f64> = indices.iter().map(|&i| labels[i]).collect();
            forest.push(build_tree(&boot_samples, &boot_labels, self.max_depth, &mut rng));
        }

        // Jour visé : le lendemain de la fin de fenêtre (début de la semaine suivante)
        let target_weekday = weekday_index(as_of + Days::new(1)) as f64;
        let mut scored: Vec<(u8, f64)> = (0..UNIVERSE_SIZE as u8)
            .map(|n| {
                let features = [n as f64, target_weekday, final_counts[n as usize] as f64];
                let sum: f64 = forest.iter().map(|tree| predict_tree(tree, &features)).sum();
                (n, sum / self.n_trees as f64)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.into_iter().map(|(n, _)| n).take(k).collect()
    }
}

type TrainingSet = (Vec<[f64; N_FEATURES]>, Vec<f64>, [u32; UNIVERSE_SIZE]);

/// Construit le jeu binaire complet (une ligne par date x numéro) avec le
/// compte cumulé strictement antérieur à chaque date. `None` si l'historique
/// ne permet pas un ajustement : moins de deux journées distinctes, ou une
/// seule classe d'étiquettes.
fn build_training_set(history: &[Observation]) -> Option<TrainingSet> {
    if history.is_empty() {
        return None;
    }

    let mut samples = Vec::new();
    let mut labels = Vec::new();
    let mut cumulative = [0u32; UNIVERSE_SIZE];
    let mut n_dates = 0usize;

    let mut start = 0;
    while start < history.len() {
        let date = history[start].date;
        let end = start + history[start..].iter().take_while(|o| o.date == date).count();
        n_dates += 1;

        let mut drawn = [false; UNIVERSE_SIZE];
        for obs in &history[start..end] {
            drawn[obs.number as usize] = true;
        }

        let weekday = weekday_index(date) as f64;
        for n in 0..UNIVERSE_SIZE {
            samples.push([n as f64, weekday, cumulative[n] as f64]);
            labels.push(if drawn[n] { 1.0 } else { 0.0 });
        }

        for obs in &history[start..end] {
            cumulative[obs.number as usize] += 1;
        }
        start = end;
    }

    let has_positive = labels.iter().any(|&l| l > 0.5);
    let has_negative = labels.iter().any(|&l| l < 0.5);
    if n_dates < 2 || !has_positive || !has_negative {
        return None;
    }
    Some((samples, labels, cumulative))
}

enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

fn mean_label(labels: &[f64]) -> f64 {
    labels.iter().sum::<f64>() / labels.len().max(1) as f64
}

fn gini_impurity(labels: &[f64]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let p = mean_label(labels);
    2.0 * p * (1.0 - p)
}

fn split_gini(
    samples: &[&[f64; N_FEATURES]],
    labels: &[f64],
    feature: usize,
    threshold: f64,
) -> f64 {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (sample, &label) in samples.iter().zip(labels) {
        if sample[feature] <= threshold {
            left.push(label);
        } else {
            right.push(label);
        }
    }
    if left.is_empty() || right.is_empty() {
        return f64::MAX;
    }
    let n = labels.len() as f64;
    (left.len() as f64 / n) * gini_impurity(&left)
        + (right.len() as f64 / n) * gini_impurity(&right)
}

fn build_tree(
    samples: &[&[f64; N_FEATURES]],
    labels: &[f64],
    depth: usize,
    rng: &mut StdRng,
) -> TreeNode {
    if depth == 0 || labels.len() < 4 {
        return TreeNode::Leaf { value: mean_label(labels) };
    }
    let first = labels[0];
    if labels.iter().all(|&l| (l - first).abs() < 1e-10) {
        return TreeNode::Leaf { value: first };
    }

    // Sous-ensemble aléatoire de caractéristiques (sqrt(3) arrondi = 2)
    let mut candidates: Vec<usize> = (0..N_FEATURES).collect();
    candidates.shuffle(rng);
    candidates.truncate(2);

    let mut best = (f64::MAX, 0usize, 0.0f64);
    for &feature in &candidates {
        let mut values: Vec<f64> = samples.iter().map(|s| s[feature]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values.dedup();
        if values.len() < 2 {
            continue;
        }
        let step = (values.len() / 10).max(1);
        for i in (0..values.len() - 1).step_by(step) {
            let threshold = (values[i] + values[i + 1]) / 2.0;
            let gini = split_gini(samples, labels, feature, threshold);
            if gini < best.0 {
                best = (gini, feature, threshold);
            }
        }
    }

    let (best_gini, feature, threshold) = best;
    if best_gini >= gini_impurity(labels) {
        return TreeNode::Leaf { value: mean_label(labels) };
    }

    let mut left_samples = Vec::new();
    let mut left_labels = Vec::new();
    let mut right_samples = Vec::new();
    let mut right_labels = Vec::new();
    for (i, &sample) in samples.iter().enumerate() {
        if sample[feature] <= threshold {
            left_samples.push(sample);
            left_labels.push(labels[i]);
        } else {
            right_samples.push(sample);
            right_labels.push(labels[i]);
        }
    }
    if left_samples.is_empty() || right_samples.is_empty() {
        return TreeNode::Leaf { value: mean_label(labels) };
    }

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(build_tree(&left_samples, &left_labels, depth - 1, rng)),
        right: Box::new(build_tree(&right_samples, &right_labels, depth - 1, rng)),
    }
}

fn predict_tree(node: &TreeNode, features: &[f64; N_FEATURES]) -> f64 {
    match node {
        TreeNode::Leaf { value } => *value,
        TreeNode::Split { feature, threshold, left, right } => {
            if features[*feature] <= *threshold {
                predict_tree(left, features)
            } else {
                predict_tree(right, features)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::{make_test_observations, ranking_is_valid};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn small_strategy() -> ClassifierStrategy {
        // forêt réduite pour des tests rapides
        ClassifierStrategy::new(10, 4, DEFAULT_SEED)
    }

    #[test]
    fn test_empty_history_returns_empty() {
        let ranking = small_strategy().predict(&[], d("2024-01-01"), 10);
        assert!(ranking.is_empty());
    }

    #[test]
    fn test_single_day_returns_empty() {
        let history: Vec<Observation> = [1u8, 2, 3]
            .iter()
            .map(|&n| Observation { date: d("2024-01-01"), number: n })
            .collect();
        let ranking = small_strategy().predict(&history, d("2024-01-07"), 10);
        assert!(ranking.is_empty());
    }

    #[test]
    fn test_full_ranking_on_rich_history() {
        let history = make_test_observations(14);
        let ranking = small_strategy().predict(&history, d("2024-01-14"), 10);
        assert_eq!(ranking.len(), 10);
        assert!(ranking_is_valid(&ranking, 10));
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let history = make_test_observations(10);
        let strategy = small_strategy();
        let first = strategy.predict(&history, d("2024-01-10"), 10);
        let second = strategy.predict(&history, d("2024-01-10"), 10);
        assert_eq!(first, second);
    }

    #[test]
    fn test_training_set_cumulative_counts_are_strictly_past() {
        let history = vec![
            Observation { date: d("2024-01-01"), number: 5 },
            Observation { date: d("2024-01-02"), number: 5 },
        ];
        let (samples, labels, final_counts) = build_training_set(&history).unwrap();
        assert_eq!(samples.len(), 200);
        // jour 1 : compte cumulé de 5 encore à zéro
        assert_eq!(samples[5], [5.0, 0.0, 0.0]);
        assert_eq!(labels[5], 1.0);
        // jour 2 : une occurrence passée
        assert_eq!(samples[105], [5.0, 1.0, 1.0]);
        assert_eq!(final_counts[5], 2);
    }
}
