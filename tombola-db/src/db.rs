use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::Path;

use crate::models::Observation;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS observations (
    date    TEXT NOT NULL,
    seq     INTEGER NOT NULL,
    number  INTEGER NOT NULL,
    PRIMARY KEY (date, seq)
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("tombola.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

/// Insère une observation à sa position `seq` dans le tirage du jour.
/// Retourne `false` si la ligne (date, seq) existe déjà (ré-import).
pub fn insert_observation(
    conn: &Connection,
    date: NaiveDate,
    seq: u32,
    number: u8,
) -> Result<bool> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO observations (date, seq, number) VALUES (?1, ?2, ?3)",
            rusqlite::params![date.format("%Y-%m-%d").to_string(), seq, number],
        )
        .context("Échec de l'insertion")?;
    Ok(changed > 0)
}

/// Toutes les observations, par date croissante puis ordre du tirage.
pub fn fetch_all_observations(conn: &Connection) -> Result<Vec<Observation>> {
    let mut stmt = conn.prepare(
        "SELECT date, number FROM observations ORDER BY date ASC, seq ASC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(date, number)| {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("Date invalide en base : '{}'", date))?;
            Observation::new(date, number)
        })
        .collect()
}

/// Les `limit` derniers jours de tirage, du plus récent au plus ancien.
pub fn fetch_last_days(conn: &Connection, limit: u32) -> Result<Vec<(NaiveDate, Vec<u8>)>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT date FROM observations ORDER BY date DESC LIMIT ?1",
    )?;
    let dates = stmt
        .query_map([limit], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut days = Vec::with_capacity(dates.len());
    for raw in dates {
        let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .with_context(|| format!("Date invalide en base : '{}'", raw))?;
        let mut stmt = conn.prepare(
            "SELECT number FROM observations WHERE date = ?1 ORDER BY seq ASC",
        )?;
        let numbers = stmt
            .query_map([raw], |row| row.get::<_, u8>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        days.push((date, numbers));
    }
    Ok(days)
}

pub fn count_observations(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM observations", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_fetch_roundtrip() {
        let conn = test_conn();
        assert!(insert_observation(&conn, d("2024-01-02"), 0, 7).unwrap());
        assert!(insert_observation(&conn, d("2024-01-01"), 0, 3).unwrap());
        assert!(insert_observation(&conn, d("2024-01-01"), 1, 5).unwrap());

        let observations = fetch_all_observations(&conn).unwrap();
        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].date, d("2024-01-01"));
        assert_eq!(observations[0].number, 3);
        assert_eq!(observations[1].number, 5);
        assert_eq!(observations[2].date, d("2024-01-02"));
    }

    #[test]
    fn test_insert_duplicate_ignored() {
        let conn = test_conn();
        assert!(insert_observation(&conn, d("2024-01-01"), 0, 3).unwrap());
        assert!(!insert_observation(&conn, d("2024-01-01"), 0, 3).unwrap());
        assert_eq!(count_observations(&conn).unwrap(), 1);
    }

    #[test]
    fn test_fetch_last_days() {
        let conn = test_conn();
        insert_observation(&conn, d("2024-01-01"), 0, 1).unwrap();
        insert_observation(&conn, d("2024-01-02"), 0, 4).unwrap();
        insert_observation(&conn, d("2024-01-02"), 1, 2).unwrap();

        let days = fetch_last_days(&conn, 1).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].0, d("2024-01-02"));
        assert_eq!(days[0].1, vec![4, 2]);
    }

    #[test]
    fn test_count_empty() {
        let conn = test_conn();
        assert_eq!(count_observations(&conn).unwrap(), 0);
    }
}
