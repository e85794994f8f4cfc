use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::harness::WeeklyResult;

#[derive(Debug, Serialize)]
struct ResultRow {
    week_start: String,
    week_end: String,
    prediction: String,
}

/// Rendu textuel d'un classement : `[3, 47, 12]`, chaîne vide si vide.
pub fn render_prediction(prediction: &[u8]) -> String {
    if prediction.is_empty() {
        return String::new();
    }
    let inner = prediction
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", inner)
}

/// Écrit le registre de résultats en CSV, une ligne par semaine dans
/// l'ordre des fenêtres. Un fichier existant est écrasé.
pub fn export_results(results: &[WeeklyResult], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Impossible d'écrire {:?}", path))?;
    for result in results {
        writer.serialize(ResultRow {
            week_start: result.week_start.format("%Y-%m-%d").to_string(),
            week_end: result.week_end.format("%Y-%m-%d").to_string(),
            prediction: render_prediction(&result.prediction),
        })?;
    }
    writer.flush().context("Échec de l'écriture du CSV")?;
    Ok(())
}
