use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

use tombola_db::db::insert_observation;
use tombola_db::models::validate_number;
use tombola_db::rusqlite::Connection;

/// Le fichier source garde les entêtes du jeu de données d'origine.
const DATE_COLUMN: &str = "fecha";
const NUMBER_COLUMN: &str = "numero";

pub struct ImportSummary {
    pub total_records: u32,
    pub inserted: u32,
    pub duplicates: u32,
    pub dropped: u32,
    pub errors: u32,
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .with_context(|| format!("Format de date invalide : '{}'", raw))
}

fn column_indices(headers: &csv::StringRecord) -> Result<(usize, usize)> {
    let mut date_idx = None;
    let mut number_idx = None;
    for (i, name) in headers.iter().enumerate() {
        match name.trim().to_lowercase().as_str() {
            DATE_COLUMN => date_idx = Some(i),
            NUMBER_COLUMN => number_idx = Some(i),
            _ => {}
        }
    }
    match (date_idx, number_idx) {
        (Some(d), Some(n)) => Ok((d, n)),
        _ => bail!("Colonnes attendues absentes : '{}' et '{}'", DATE_COLUMN, NUMBER_COLUMN),
    }
}

/// Une ligne sans numéro est écartée sans faire échouer le lot ;
/// une date ou un numéro malformé compte comme une erreur, le lot continue.
pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportSummary> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let (date_idx, number_idx) = column_indices(reader.headers()?)?;

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut summary = ImportSummary {
        total_records: 0,
        inserted: 0,
        duplicates: 0,
        dropped: 0,
        errors: 0,
    };
    let mut seq_by_date: HashMap<NaiveDate, u32> = HashMap::new();

    for record_result in reader.records() {
        summary.total_records += 1;
        let record = match record_result {
            Ok(record) => record,
            Err(e) => {
                eprintln!("Erreur lecture ligne {}: {}", summary.total_records, e);
                summary.errors += 1;
                continue;
            }
        };

        let raw_number = record.get(number_idx).unwrap_or("").trim();
        if raw_number.is_empty() {
            summary.dropped += 1;
            continue;
        }

        let parsed = parse_date(record.get(date_idx).unwrap_or("")).and_then(|date| {
            let number = raw_number
                .parse::<f64>()
                .with_context(|| format!("Numéro illisible : '{}'", raw_number))?;
            let number = validate_number(number as i64)?;
            Ok((date, number))
        });

        match parsed {
            Ok((date, number)) => {
                let seq = seq_by_date.entry(date).or_insert(0);
                match insert_observation(&tx, date, *seq, number) {
                    Ok(true) => summary.inserted += 1,
                    Ok(false) => summary.duplicates += 1,
                    Err(e) => {
                        eprintln!("Erreur insertion ligne {}: {}", summary.total_records, e);
                        summary.errors += 1;
                    }
                }
                *seq += 1;
            }
            Err(e) => {
                eprintln!("Erreur parsing ligne {}: {}", summary.total_records, e);
                summary.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(summary)
}
