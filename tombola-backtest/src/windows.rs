use chrono::{Days, NaiveDate};

use tombola_db::ledger::DrawLedger;
use tombola_db::models::weekday_index;

/// Semaine calendaire [start, end], end = start + 6 jours, start un lundi.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Itérateur fini et rejouable sur les semaines couvrant l'historique.
/// Première semaine : le lundi précédant (ou égal à) la première date observée ;
/// dernière semaine : celle dont le lundi est encore <= la dernière date.
#[derive(Debug, Clone)]
pub struct WeekWindows {
    next_start: Option<NaiveDate>,
    last_date: NaiveDate,
}

impl Iterator for WeekWindows {
    type Item = WeekWindow;

    fn next(&mut self) -> Option<WeekWindow> {
        let start = self.next_start?;
        if start > self.last_date {
            self.next_start = None;
            return None;
        }
        self.next_start = start.checked_add_days(Days::new(7));
        Some(WeekWindow {
            start,
            end: start + Days::new(6),
        })
    }
}

/// Aucune fenêtre si le registre est vide.
pub fn week_windows(ledger: &DrawLedger) -> WeekWindows {
    match (ledger.first_date(), ledger.last_date()) {
        (Some(first), Some(last)) => {
            let first_monday = first - Days::new(weekday_index(first) as u64);
            WeekWindows {
                next_start: Some(first_monday),
                last_date: last,
            }
        }
        _ => WeekWindows {
            next_start: None,
            last_date: NaiveDate::MIN,
        },
    }
}
