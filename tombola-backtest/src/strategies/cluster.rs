use chrono::NaiveDate;
use ndarray::{Array1, Array2, Axis};
use rand::SeedableRng;
use rand::prelude::*;
use rand::rngs::StdRng;

use tombola_db::models::{Observation, UNIVERSE_SIZE, weekday_index};

use super::PredictionStrategy;

pub const DEFAULT_CLUSTERS: usize = 3;
pub const DEFAULT_SEED: u64 = 42;
const MAX_ITERATIONS: usize = 100;

/// Partitionne les numéros selon leur profil hebdomadaire : une ligne par
/// numéro observé, une colonne par jour de la semaine, valeurs = comptes
/// d'occurrences, standardisées en z-score. Le cluster retenu est celui
/// qui concentre la plus grande masse d'occurrences ; ses membres sont
/// classés par compte total décroissant.
pub struct ClusterStrategy {
    n_clusters: usize,
    seed: u64,
}

impl ClusterStrategy {
    pub fn new(n_clusters: usize, seed: u64) -> Self {
        Self { n_clusters, seed }
    }
}

impl Default for ClusterStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_CLUSTERS, DEFAULT_SEED)
    }
}

impl PredictionStrategy for ClusterStrategy {
    fn name(&self) -> &str {
        "Cluster"
    }

    fn predict(&self, history: &[Observation], _as_of: NaiveDate, k: usize) -> Vec<u8> {
        // Table numéro x jour de semaine
        let mut weekday_counts = [[0u32; 7]; UNIVERSE_SIZE];
        for obs in history {
            weekday_counts[obs.number as usize][weekday_index(obs.date) as usize] += 1;
        }

        let numbers: Vec<u8> = (0..UNIVERSE_SIZE as u8)
            .filter(|&n| weekday_counts[n as usize].iter().any(|&c| c > 0))
            .collect();
        if numbers.is_empty() {
            return Vec::new();
        }

        let n_rows = numbers.len();
        let mut table = Array2::<f64>::zeros((n_rows, 7));
        for (i, &n) in numbers.iter().enumerate() {
            for j in 0..7 {
                table[[i, j]] = weekday_counts[n as usize][j] as f64;
            }
        }

        let scaled = standardize(&table);
        let n_clusters = self.n_clusters.min(n_rows);
        let assignments = kmeans(&scaled, n_clusters, self.seed);

        // Masse totale d'occurrences par cluster
        let totals: Vec<u32> = numbers
            .iter()
            .map(|&n| weekday_counts[n as usize].iter().sum())
            .collect();
        let mut cluster_mass = vec![0u64; n_clusters];
        for (i, &c) in assignments.iter().enumerate() {
            cluster_mass[c] += totals[i] as u64;
        }
        let best_cluster = cluster_mass
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(c, _)| c)
            .unwrap_or(0);

        let mut members: Vec<(u8, u32)> = numbers
            .iter()
            .zip(totals.iter())
            .zip(assignments.iter())
            .filter(|(_, &c)| c == best_cluster)
            .map(|((&n, &total), _)| (n, total))
            .collect();
        members.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        members.into_iter().map(|(n, _)| n).take(k).collect()
    }
}

/// Z-score par colonne, écart-type plancher à 1e-10 pour les colonnes constantes.
fn standardize(table: &Array2<f64>) -> Array2<f64> {
    let n_rows = table.nrows() as f64;
    let means = table.mean_axis(Axis(0)).unwrap();
    let stds: Array1<f64> = table
        .axis_iter(Axis(0))
        .fold(Array1::zeros(table.ncols()), |acc, row| {
            let diff = &row - &means;
            acc + &diff.mapv(|v| v * v)
        })
        / n_rows;
    let stds = stds.mapv(|v| v.sqrt().max(1e-10));

    let mut scaled = table.clone();
    for mut row in scaled.rows_mut() {
        for j in 0..row.len() {
            row[j] = (row[j] - means[j]) / stds[j];
        }
    }
    scaled
}

/// K-means à graine fixe : premier centre tiré au sort, les suivants par
/// point-le-plus-éloigné, puis itérations affectation/re-centrage jusqu'à
/// stabilité. Déterministe pour une graine et des données identiques.
fn kmeans(data: &Array2<f64>, n_clusters: usize, seed: u64) -> Vec<usize> {
    let n_rows = data.nrows();
    if n_clusters <= 1 {
        return vec![0; n_rows];
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut center_rows = vec![rng.random_range(0..n_rows)];
    while center_rows.len() < n_clusters {
        let farthest = (0..n_rows)
            .max_by(|&a, &b| {
                let da = min_distance(data, a, &center_rows);
                let db = min_distance(data, b, &center_rows);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(0);
        center_rows.push(farthest);
    }

    let mut centers: Vec<Array1<f64>> = center_rows
        .iter()
        .map(|&i| data.row(i).to_owned())
        .collect();
    let mut assignments = vec![0usize; n_rows];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for i in 0..n_rows {
            let row = data.row(i);
            let nearest = centers
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    let da = (&row - *a).mapv(|v| v * v).sum();
                    let db = (&row - *b).mapv(|v| v * v).sum();
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(c, _)| c)
                .unwrap_or(0);
            if assignments[i] != nearest {
                assignments[i] = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        for (c, center) in centers.iter_mut().enumerate() {
            let members: Vec<usize> = (0..n_rows).filter(|&i| assignments[i] == c).collect();
            if members.is_empty() {
                continue; // cluster vide, on garde l'ancien centre
            }
            let mut mean = Array1::<f64>::zeros(data.ncols());
            for &i in &members {
                mean = mean + &data.row(i);
            }
            *center = mean / members.len() as f64;
        }
    }

    assignments
}

fn min_distance(data: &Array2<f64>, row: usize, centers: &[usize]) -> f64 {
    centers
        .iter()
        .map(|&c| (&data.row(row) - &data.row(c)).mapv(|v| v * v).sum())
        .fold(f64::MAX, f64::min)
}
