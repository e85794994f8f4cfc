use tombola_db::models::{Observation, UNIVERSE_SIZE};

/// Classement des 100 numéros par fréquence décroissante dans l'historique.
/// Égalités départagées par l'occurrence la plus récente, puis par numéro
/// croissant ; les numéros jamais vus ferment la marche, par valeur
/// croissante. Le même ordre que la stratégie Frequency, pour que le
/// complètement reste cohérent avec elle.
pub fn global_frequency_rank(history: &[Observation]) -> Vec<u8> {
    let mut counts = [0u32; UNIVERSE_SIZE];
    let mut last_seen = [0usize; UNIVERSE_SIZE];

    for (i, obs) in history.iter().enumerate() {
        let idx = obs.number as usize;
        counts[idx] += 1;
        last_seen[idx] = i;
    }

    let mut ranked: Vec<u8> = (0..UNIVERSE_SIZE as u8).collect();
    ranked.sort_by(|&a, &b| {
        let (a, b) = (a as usize, b as usize);
        counts[b]
            .cmp(&counts[a])
            .then(last_seen[b].cmp(&last_seen[a]))
            .then(a.cmp(&b))
    });
    ranked
}

/// Complète un classement trop court avec le classement global de fréquence,
/// en sautant les numéros déjà présents, jusqu'à `min(k, 100)` éléments.
pub fn complete(partial: Vec<u8>, k: usize, frequency_rank: &[u8]) -> Vec<u8> {
    let target = k.min(UNIVERSE_SIZE);
    let mut ranking = partial;
    ranking.truncate(target);

    for &n in frequency_rank {
        if ranking.len() >= target {
            break;
        }
        if !ranking.contains(&n) {
            ranking.push(n);
        }
    }
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::make_test_observations;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn obs(date: &str, number: u8) -> Observation {
        Observation { date: d(date), number }
    }

    #[test]
    fn test_rank_by_count_then_recency_then_number() {
        // 8 vu deux fois, 3 et 5 une fois chacun, 5 vu en dernier
        let history = vec![
            obs("2024-01-01", 8),
            obs("2024-01-01", 3),
            obs("2024-01-02", 8),
            obs("2024-01-02", 5),
        ];
        let rank = global_frequency_rank(&history);
        assert_eq!(&rank[..3], &[8, 5, 3]);
        assert_eq!(rank.len(), UNIVERSE_SIZE);
        // les jamais-vus suivent, par valeur croissante
        assert_eq!(&rank[3..7], &[0, 1, 2, 4]);
    }

    #[test]
    fn test_rank_tie_broken_by_ascending_number() {
        let history = vec![obs("2024-01-01", 9), obs("2024-01-01", 9), obs("2024-01-01", 4), obs("2024-01-01", 4)];
        // même compte, même jour : 4 vu après 9 dans l'ordre du tirage
        assert_eq!(&global_frequency_rank(&history)[..2], &[4, 9]);
    }

    #[test]
    fn test_rank_covers_whole_universe() {
        let rank = global_frequency_rank(&[]);
        assert_eq!(rank.len(), UNIVERSE_SIZE);
        // sans historique, ordre purement croissant
        assert_eq!(rank[0], 0);
        assert_eq!(rank[99], 99);
    }

    #[test]
    fn test_complete_fills_to_k_without_duplicates() {
        let history = make_test_observations(20);
        let rank = global_frequency_rank(&history);
        let partial = vec![rank[2], rank[0]];
        let full = complete(partial.clone(), 10, &rank);
        assert_eq!(full.len(), 10);
        assert_eq!(&full[..2], &partial[..]);
        let mut dedup = full.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), full.len());
    }

    #[test]
    fn test_complete_truncates_oversized_partial() {
        let rank = vec![1, 2, 3];
        let full = complete(vec![9, 8, 7, 6], 2, &rank);
        assert_eq!(full, vec![9, 8]);
    }

    #[test]
    fn test_complete_stops_when_rank_exhausted() {
        let rank = vec![1, 2];
        let full = complete(vec![], 10, &rank);
        assert_eq!(full, vec![1, 2]);
    }

    #[test]
    fn test_complete_caps_k_at_universe_size() {
        let rank = global_frequency_rank(&make_test_observations(5));
        let full = complete(vec![], 500, &rank);
        assert_eq!(full.len(), UNIVERSE_SIZE);
    }
}
