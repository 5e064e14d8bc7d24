use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use santiloto_db::rusqlite::Connection;
use std::path::Path;

use santiloto_db::db::{insert_euro_result, insert_primitiva_result, upsert_conditions};
use santiloto_db::models::{
    Conditions, DrawConditions, EuroResult, Game, PrimitivaResult, validate_euro, validate_primitiva,
};
use santiloto_weekly::atmosphere::absolute_humidity;
use santiloto_weekly::lunar::PhaseSource;

/// Acepta coma o punto decimal ("21,4" y "21.4").
pub fn parse_decimal(s: &str) -> Result<f64> {
    let s = s.trim();
    if s.is_empty() {
        bail!("Valor decimal vacío");
    }
    s.replace(',', ".")
        .parse::<f64>()
        .with_context(|| format!("No se pudo interpretar el número '{}'", s))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y")
        .with_context(|| format!("Fecha no válida: '{}' (se espera dd/mm/aaaa)", raw))
}

struct Fields<'a> {
    record: &'a csv::StringRecord,
}

impl Fields<'_> {
    fn get(&self, idx: usize) -> Result<&str> {
        self.record
            .get(idx)
            .map(str::trim)
            .with_context(|| format!("Falta el campo de la columna {}", idx))
    }

    fn get_u8(&self, idx: usize) -> Result<u8> {
        let s = self.get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("No se pudo interpretar '{}' (columna {})", s, idx))
    }

    fn get_opt_u8(&self, idx: usize) -> Result<Option<u8>> {
        match self.record.get(idx).map(str::trim) {
            None | Some("") => Ok(None),
            Some(_) => self.get_u8(idx).map(Some),
        }
    }

    fn get_f64(&self, idx: usize) -> Result<f64> {
        parse_decimal(self.get(idx)?)
            .with_context(|| format!("Columna {}", idx))
    }
}

/// fecha;n1..n6;complementario;reintegro;temp;hr
fn parse_primitiva(record: &csv::StringRecord) -> Result<(PrimitivaResult, f64, f64)> {
    let f = Fields { record };
    let date = parse_date(f.get(0)?)?;
    let numbers = [f.get_u8(1)?, f.get_u8(2)?, f.get_u8(3)?, f.get_u8(4)?, f.get_u8(5)?, f.get_u8(6)?];
    let complementary = f.get_opt_u8(7)?;
    let reintegro = f.get_u8(8)?;
    validate_primitiva(&numbers, reintegro)?;
    let result = PrimitivaResult { date, numbers, complementary, reintegro };
    Ok((result, f.get_f64(9)?, f.get_f64(10)?))
}

/// fecha;n1..n5;e1;e2;temp;hr
fn parse_euro(record: &csv::StringRecord) -> Result<(EuroResult, f64, f64)> {
    let f = Fields { record };
    let date = parse_date(f.get(0)?)?;
    let numbers = [f.get_u8(1)?, f.get_u8(2)?, f.get_u8(3)?, f.get_u8(4)?, f.get_u8(5)?];
    let stars = [f.get_u8(6)?, f.get_u8(7)?];
    validate_euro(&numbers, &stars)?;
    Ok((EuroResult { date, numbers, stars }, f.get_f64(8)?, f.get_f64(9)?))
}

fn conditions_for(
    game: Game,
    date: NaiveDate,
    temp_c: f64,
    rh_pct: f64,
    phase: &dyn PhaseSource,
    source: &str,
) -> Result<DrawConditions> {
    let abs_humidity = absolute_humidity(temp_c, rh_pct)?;
    Ok(DrawConditions {
        game,
        date,
        city: game.city(),
        conditions: Conditions {
            temp_c,
            rh_pct,
            abs_humidity: (abs_humidity * 100.0).round() / 100.0,
            moon_value: phase.phase_value(date),
        },
        source: source.to_string(),
    })
}

/// Inserta el resultado y sus condiciones; `Ok(false)` si el sorteo ya existía.
/// Un duplicado no toca las condiciones ya guardadas.
fn import_record(
    conn: &Connection,
    game: Game,
    record: &csv::StringRecord,
    phase: &dyn PhaseSource,
    source: &str,
) -> Result<bool> {
    let (inserted, conditions) = match game {
        Game::Primitiva => {
            let (result, temp, rh) = parse_primitiva(record)?;
            let conditions = conditions_for(game, result.date, temp, rh, phase, source)?;
            (insert_primitiva_result(conn, &result)?, conditions)
        }
        Game::Euromillones => {
            let (result, temp, rh) = parse_euro(record)?;
            let conditions = conditions_for(game, result.date, temp, rh, phase, source)?;
            (insert_euro_result(conn, &result)?, conditions)
        }
    };
    if inserted {
        upsert_conditions(conn, &conditions)?;
    }
    Ok(inserted)
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, game: Game, path: &Path, phase: &dyn PhaseSource) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir {:?}", path))?;

    let source = format!(
        "csv:{}",
        path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
    );

    let tx = conn.unchecked_transaction()
        .context("No se pudo iniciar la transacción")?;

    let mut result = ImportResult::default();

    for record_result in reader.records() {
        result.total_records += 1;
        let line = result.total_records;
        let record = match record_result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Error leyendo la línea {}: {}", line, e);
                result.errors += 1;
                continue;
            }
        };
        match import_record(&tx, game, &record, phase, &source) {
            Ok(true) => result.inserted += 1,
            Ok(false) => result.skipped += 1,
            Err(e) => {
                log::warn!("Línea {} descartada: {:#}", line, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Fallo en el commit")?;
    log::info!("{}: {} sorteos nuevos desde {:?}", game, result.inserted, path);
    Ok(result)
}
