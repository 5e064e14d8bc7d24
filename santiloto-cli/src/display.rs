use chrono::NaiveDate;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use crate::import::ImportResult;
use santiloto_db::models::{EuroResult, PrimitivaResult};
use santiloto_weekly::format::day_name_es;
use santiloto_weekly::lunar::{PhaseQuarter, phase_bin};
use santiloto_weekly::quarters::{EuroLine, PrimitivaLine, QuarterDay};

fn joined(values: &[u8]) -> String {
    let mut sorted = values.to_vec();
    sorted.sort();
    sorted
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_primitiva(results: &[PrimitivaResult]) {
    if results.is_empty() {
        println!("No hay sorteos que mostrar.");
        return;
    }

    let mut table = new_table(vec!["Fecha", "Día", "Números", "Compl.", "Reintegro"]);
    for r in results {
        table.add_row(vec![
            r.date.to_string(),
            day_name_es(r.date).to_string(),
            joined(&r.numbers),
            r.complementary.map(|c| c.to_string()).unwrap_or_else(|| "—".to_string()),
            r.reintegro.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_euro(results: &[EuroResult]) {
    if results.is_empty() {
        println!("No hay sorteos que mostrar.");
        return;
    }

    let mut table = new_table(vec!["Fecha", "Día", "Números", "Estrellas"]);
    for r in results {
        table.add_row(vec![
            r.date.to_string(),
            day_name_es(r.date).to_string(),
            joined(&r.numbers),
            joined(&r.stars),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Importación terminada:");
    println!("  Líneas leídas      : {}", result.total_records);
    println!("  Insertados         : {}", result.inserted);
    println!("  Duplicados omitidos: {}", result.skipped);
    if result.errors > 0 {
        println!("  Errores            : {}", result.errors);
    }
}

pub fn display_moon(date: NaiveDate, value: f64) {
    let quarter = PhaseQuarter::from_value(value);
    let color = match quarter {
        PhaseQuarter::Full => Color::Yellow,
        PhaseQuarter::New => Color::DarkGrey,
        _ => Color::White,
    };

    let mut table = new_table(vec!["Fecha", "Valor (0-28)", "Bin", "Fase"]);
    table.add_row(vec![
        Cell::new(format!("{} {}", day_name_es(date), date)),
        Cell::new(format!("{:.3}", value)),
        Cell::new(phase_bin(value)),
        Cell::new(quarter.to_string()).fg(color),
    ]);
    println!("{table}");
}

fn display_quarter_days<L>(game: &str, days: &[QuarterDay<L>], header: Vec<&str>, row: impl Fn(&L) -> Vec<String>) {
    if days.is_empty() {
        println!("{}: sin sorteos pendientes esta semana.", game);
        return;
    }
    for day in days {
        println!("\n{} · {} {} · {}", game, day_name_es(day.date), day.date, day.quarter);
        if day.lines.is_empty() {
            println!("Sin sorteos históricos en este cuarto lunar.");
            continue;
        }
        let mut table = new_table(header.clone());
        for line in &day.lines {
            table.add_row(row(line));
        }
        println!("{table}");
    }
}

pub fn display_quarters_primitiva(days: &[QuarterDay<PrimitivaLine>]) {
    display_quarter_days(
        "Primitiva",
        days,
        vec!["Rango", "N1", "N2", "N3", "N4", "N5", "N6", "Reintegro"],
        |line| {
            let mut row = vec![line.rank.to_string()];
            row.extend(line.numbers.iter().map(|n| n.to_string()));
            row.push(line.reintegro.to_string());
            row
        },
    );
}

pub fn display_quarters_euro(days: &[QuarterDay<EuroLine>]) {
    display_quarter_days(
        "Euromillones",
        days,
        vec!["Rango", "N1", "N2", "N3", "N4", "N5", "E1", "E2"],
        |line| {
            let mut row = vec![line.rank.to_string()];
            row.extend(line.numbers.iter().chain(line.stars.iter()).map(|n| n.to_string()));
            row
        },
    );
}

pub fn display_saved(primitiva: usize, euromillones: usize) {
    println!("💾 Guardadas {} apuestas de Primitiva y {} de Euromillones.", primitiva, euromillones);
}
