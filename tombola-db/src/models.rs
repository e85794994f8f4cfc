use anyhow::{Result, bail};
use chrono::{Datelike, NaiveDate};

/// La tombola tire chaque jour une dizaine de numéros entre 0 et 99.
pub const UNIVERSE_SIZE: usize = 100;

/// Un numéro observé à une date donnée. Un même jour produit plusieurs
/// observations, une par numéro tiré, dans l'ordre du tirage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub date: NaiveDate,
    pub number: u8,
}

impl Observation {
    pub fn new(date: NaiveDate, number: i64) -> Result<Self> {
        let number = validate_number(number)?;
        Ok(Self { date, number })
    }
}

pub fn validate_number(number: i64) -> Result<u8> {
    if !(0..UNIVERSE_SIZE as i64).contains(&number) {
        bail!("Numéro hors plage [0, 99] : {}", number);
    }
    Ok(number as u8)
}

/// Indice du jour de la semaine, 0 = lundi ... 6 = dimanche.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_validate_number_bounds() {
        assert_eq!(validate_number(0).unwrap(), 0);
        assert_eq!(validate_number(99).unwrap(), 99);
        assert!(validate_number(100).is_err());
        assert!(validate_number(-1).is_err());
    }

    #[test]
    fn test_observation_new_rejects_out_of_range() {
        assert!(Observation::new(d("2024-01-01"), 150).is_err());
        let obs = Observation::new(d("2024-01-01"), 42).unwrap();
        assert_eq!(obs.number, 42);
    }

    #[test]
    fn test_weekday_index() {
        // 2024-01-01 était un lundi
        assert_eq!(weekday_index(d("2024-01-01")), 0);
        assert_eq!(weekday_index(d("2024-01-07")), 6);
    }
}
