use chrono::NaiveDate;

use crate::models::Observation;

/// Historique normalisé des tirages, trié par date croissante.
/// Les observations d'un même jour conservent leur ordre d'insertion
/// (l'ordre du tirage), indispensable au modèle de transitions.
#[derive(Debug, Clone, Default)]
pub struct DrawLedger {
    observations: Vec<Observation>,
}

impl DrawLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut ledger = Self::new();
        ledger.ingest(observations);
        ledger
    }

    /// Ajoute des observations déjà validées et rétablit l'ordre chronologique.
    /// Le tri est stable : l'ordre intra-journée des nouvelles lignes est conservé.
    pub fn ingest(&mut self, observations: impl IntoIterator<Item = Observation>) {
        self.observations.extend(observations);
        self.observations.sort_by_key(|obs| obs.date);
    }

    /// Vue pure sur le sous-historique `date <= cutoff`. Aucune copie,
    /// aucune mutation ; une tranche vide est un résultat valide.
    pub fn as_of(&self, cutoff: NaiveDate) -> &[Observation] {
        let end = self.observations.partition_point(|obs| obs.date <= cutoff);
        &self.observations[..end]
    }

    /// Numéros tirés à une date donnée, dans l'ordre du registre.
    pub fn numbers_on(&self, date: NaiveDate) -> Vec<u8> {
        self.observations
            .iter()
            .filter(|obs| obs.date == date)
            .map(|obs| obs.number)
            .collect()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|obs| obs.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|obs| obs.date)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn obs(date: &str, number: u8) -> Observation {
        Observation { date: d(date), number }
    }

    #[test]
    fn test_ingest_sorts_by_date() {
        let ledger = DrawLedger::from_observations(vec![
            obs("2024-01-03", 7),
            obs("2024-01-01", 3),
            obs("2024-01-02", 5),
        ]);
        let dates: Vec<_> = ledger.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-03")]);
    }

    #[test]
    fn test_ingest_preserves_intraday_order() {
        let ledger = DrawLedger::from_observations(vec![
            obs("2024-01-02", 9),
            obs("2024-01-01", 3),
            obs("2024-01-01", 1),
            obs("2024-01-01", 2),
        ]);
        assert_eq!(ledger.numbers_on(d("2024-01-01")), vec![3, 1, 2]);
    }

    #[test]
    fn test_as_of_excludes_future() {
        let ledger = DrawLedger::from_observations(vec![
            obs("2024-01-01", 1),
            obs("2024-01-05", 2),
            obs("2024-01-10", 3),
        ]);
        let slice = ledger.as_of(d("2024-01-05"));
        assert_eq!(slice.len(), 2);
        assert!(slice.iter().all(|o| o.date <= d("2024-01-05")));
    }

    #[test]
    fn test_as_of_before_first_date_is_empty() {
        let ledger = DrawLedger::from_observations(vec![obs("2024-01-05", 1)]);
        assert!(ledger.as_of(d("2024-01-01")).is_empty());
    }

    #[test]
    fn test_as_of_empty_ledger() {
        let ledger = DrawLedger::new();
        assert!(ledger.as_of(d("2024-01-01")).is_empty());
    }

    #[test]
    fn test_numbers_on_missing_date() {
        let ledger = DrawLedger::from_observations(vec![obs("2024-01-01", 1)]);
        assert!(ledger.numbers_on(d("2024-01-02")).is_empty());
    }
}
