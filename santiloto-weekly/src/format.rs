use chrono::{Datelike, NaiveDate};

use crate::bets::EuroCombination;
use crate::weekly::WeeklyResult;

const DAYS_ES: [&str; 7] = ["Lunes", "Martes", "Miércoles", "Jueves", "Viernes", "Sábado", "Domingo"];

pub fn day_name_es(date: NaiveDate) -> &'static str {
    DAYS_ES[date.weekday().num_days_from_monday() as usize]
}

fn fmt_day(date: NaiveDate) -> String {
    format!("{} {}", day_name_es(date), date)
}

fn fmt_numbers(numbers: &[u8]) -> String {
    numbers.iter().map(|n| format!("{:02}", n)).collect::<Vec<_>>().join(" ")
}

fn fmt_euro(combination: &EuroCombination) -> String {
    format!(
        "{} ⭐ {:02} {:02}",
        fmt_numbers(&combination.numbers),
        combination.stars[0],
        combination.stars[1]
    )
}

/// Texto legible del resultado semanal, agrupado por juego y fecha.
pub fn format_weekly(result: &WeeklyResult) -> String {
    let mut lines = vec![format!("🗓 Semana {} → {}", result.week_start, result.week_end), String::new()];

    lines.push("🎯 PRIMITIVA (Madrid)".to_string());
    if result.primitiva_bets.is_empty() {
        lines.push("  (sin apuestas generadas)".to_string());
        lines.push(String::new());
    }
    for (date, bet) in &result.primitiva_bets {
        lines.push(format!("📌 {}  |  Reintegro: {}", fmt_day(*date), bet.reintegro));
        for (i, combination) in bet.combinations.iter().enumerate() {
            lines.push(format!("  {}) {}", i + 1, fmt_numbers(combination)));
        }
        lines.push(String::new());
    }

    lines.push("🎯 EUROMILLONES (París)".to_string());
    if result.euromillones_bets.is_empty() {
        lines.push("  (sin apuestas generadas)".to_string());
        lines.push(String::new());
    }
    for (date, bet) in &result.euromillones_bets {
        lines.push(format!("📌 {}", fmt_day(*date)));
        for (i, combination) in bet.combinations.iter().enumerate() {
            lines.push(format!("  {}) {}", i + 1, fmt_euro(combination)));
        }
        lines.push(String::new());
    }

    lines.join("\n").trim_end().to_string()
}
