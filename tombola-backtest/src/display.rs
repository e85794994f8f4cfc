use chrono::NaiveDate;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};

use crate::export::render_prediction;
use crate::harness::WeeklyResult;
use crate::import::ImportSummary;

pub fn display_import_summary(summary: &ImportSummary) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", summary.total_records);
    println!("  Insérées          : {}", summary.inserted);
    println!("  Doublons ignorés  : {}", summary.duplicates);
    println!("  Sans numéro       : {}", summary.dropped);
    if summary.errors > 0 {
        println!("  Erreurs           : {}", summary.errors);
    }
}

pub fn display_days(days: &[(NaiveDate, Vec<u8>)]) {
    if days.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Date", "Numéros tirés"]);

    for (date, numbers) in days {
        let numbers_str = numbers
            .iter()
            .map(|n| format!("{:2}", n))
            .collect::<Vec<_>>()
            .join(" - ");
        table.add_row(vec![date.format("%Y-%m-%d").to_string(), numbers_str]);
    }

    println!("{table}");
}

/// Les `last` dernières semaines du backtest, puis un bilan global.
pub fn display_results(results: &[WeeklyResult], last: usize) {
    if results.is_empty() {
        println!("Aucune semaine traitée (registre vide).");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Semaine du", "au", "Prédiction"]);

    let skip = results.len().saturating_sub(last);
    for result in &results[skip..] {
        let rendered = render_prediction(&result.prediction);
        let cell = if rendered.is_empty() { "—".to_string() } else { rendered };
        table.add_row(vec![
            result.week_start.format("%Y-%m-%d").to_string(),
            result.week_end.format("%Y-%m-%d").to_string(),
            cell,
        ]);
    }

    println!("{table}");

    let empty_weeks = results.iter().filter(|r| r.prediction.is_empty()).count();
    println!("\n{} semaines traitées, dont {} sans prédiction.", results.len(), empty_weeks);
}
