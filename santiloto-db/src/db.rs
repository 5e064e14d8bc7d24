use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};
use std::path::Path;

use crate::models::{
    Conditions, DrawConditions, EuroDraw, EuroResult, Game, PrimitivaDraw, PrimitivaResult,
    Recommendation,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS primitiva_draws (
    date          TEXT PRIMARY KEY,
    n1            INTEGER NOT NULL,
    n2            INTEGER NOT NULL,
    n3            INTEGER NOT NULL,
    n4            INTEGER NOT NULL,
    n5            INTEGER NOT NULL,
    n6            INTEGER NOT NULL,
    complementary INTEGER,
    reintegro     INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS euromillones_draws (
    date          TEXT PRIMARY KEY,
    n1            INTEGER NOT NULL,
    n2            INTEGER NOT NULL,
    n3            INTEGER NOT NULL,
    n4            INTEGER NOT NULL,
    n5            INTEGER NOT NULL,
    s1            INTEGER NOT NULL,
    s2            INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS draw_conditions (
    game          TEXT NOT NULL,
    date          TEXT NOT NULL,
    city          TEXT NOT NULL,
    temp_mean     REAL NOT NULL,
    rh_mean       REAL NOT NULL,
    ah_mean       REAL NOT NULL,
    moon_value    REAL NOT NULL,
    source        TEXT NOT NULL DEFAULT '',
    ingested_at   TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (game, date)
);

CREATE TABLE IF NOT EXISTS recommendations (
    game           TEXT NOT NULL,
    target_date    TEXT NOT NULL,
    signature      TEXT NOT NULL,
    week_start     TEXT NOT NULL,
    week_end       TEXT NOT NULL,
    tol_frac       REAL NOT NULL,
    method_version TEXT NOT NULL,
    city           TEXT NOT NULL,
    reintegro      INTEGER,
    combinations   TEXT NOT NULL,
    generated_at   TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (target_date, signature)
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("santiloto.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("No se pudo crear el directorio {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("No se pudo abrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Fallo en la migración")?;
    Ok(())
}

pub fn insert_primitiva_result(conn: &Connection, result: &PrimitivaResult) -> Result<bool> {
    let n = &result.numbers;
    let changed = conn.execute(
        "INSERT OR IGNORE INTO primitiva_draws (date, n1, n2, n3, n4, n5, n6, complementary, reintegro)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![result.date, n[0], n[1], n[2], n[3], n[4], n[5], result.complementary, result.reintegro],
    ).context("Fallo al insertar el sorteo de Primitiva")?;
    Ok(changed > 0)
}

pub fn insert_euro_result(conn: &Connection, result: &EuroResult) -> Result<bool> {
    let n = &result.numbers;
    let changed = conn.execute(
        "INSERT OR IGNORE INTO euromillones_draws (date, n1, n2, n3, n4, n5, s1, s2)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![result.date, n[0], n[1], n[2], n[3], n[4], result.stars[0], result.stars[1]],
    ).context("Fallo al insertar el sorteo de Euromillones")?;
    Ok(changed > 0)
}

pub fn upsert_conditions(conn: &Connection, row: &DrawConditions) -> Result<()> {
    let c = &row.conditions;
    conn.execute(
        "INSERT INTO draw_conditions (game, date, city, temp_mean, rh_mean, ah_mean, moon_value, source)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(game, date) DO UPDATE SET
           city = excluded.city,
           temp_mean = excluded.temp_mean,
           rh_mean = excluded.rh_mean,
           ah_mean = excluded.ah_mean,
           moon_value = excluded.moon_value,
           source = excluded.source,
           ingested_at = datetime('now')",
        params![
            row.game.label(),
            row.date,
            row.city.name(),
            c.temp_c,
            c.rh_pct,
            c.abs_humidity,
            c.moon_value,
            row.source,
        ],
    ).with_context(|| format!("Fallo al guardar las condiciones de {} {}", row.game, row.date))?;
    Ok(())
}

/// Fecha del último resultado almacenado para el juego, si hay alguno.
pub fn latest_draw_date(conn: &Connection, game: Game) -> Result<Option<NaiveDate>> {
    let sql = format!("SELECT MAX(date) FROM {}", game.draws_table());
    let date: Option<NaiveDate> = conn.query_row(&sql, [], |row| row.get(0))
        .with_context(|| format!("No se pudo leer la última fecha de {}", game))?;
    Ok(date)
}

pub fn count_draws(conn: &Connection, game: Game) -> Result<u32> {
    let sql = format!("SELECT COUNT(*) FROM {}", game.draws_table());
    let count: u32 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count)
}

/// Sorteos guardados sin fila en `draw_conditions`. El histórico los omite,
/// pero sí cuentan para `latest_draw_date`.
pub fn draws_missing_conditions(conn: &Connection, game: Game) -> Result<Vec<NaiveDate>> {
    let sql = format!(
        "SELECT d.date FROM {} d
         LEFT JOIN draw_conditions c ON c.date = d.date AND c.game = ?1
         WHERE c.date IS NULL
         ORDER BY d.date",
        game.draws_table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let dates = stmt.query_map([game.label()], |row| row.get(0))?
        .collect::<Result<Vec<NaiveDate>, _>>()
        .with_context(|| format!("No se pudieron listar los sorteos de {} sin condiciones", game))?;
    Ok(dates)
}

fn conditions_at(row: &Row<'_>, first: usize) -> rusqlite::Result<Conditions> {
    Ok(Conditions {
        temp_c: row.get(first)?,
        rh_pct: row.get(first + 1)?,
        abs_humidity: row.get(first + 2)?,
        moon_value: row.get(first + 3)?,
    })
}

/// Histórico de Primitiva con sus condiciones, en orden cronológico.
/// Sólo aparecen los sorteos que tienen fila en `draw_conditions`.
pub fn load_primitiva_history(conn: &Connection) -> Result<Vec<PrimitivaDraw>> {
    let mut stmt = conn.prepare(
        "SELECT p.date, p.n1, p.n2, p.n3, p.n4, p.n5, p.n6, p.reintegro,
                c.temp_mean, c.rh_mean, c.ah_mean, c.moon_value
         FROM primitiva_draws p
         JOIN draw_conditions c ON c.date = p.date AND c.game = 'Primitiva'
         ORDER BY p.date"
    )?;
    let draws = stmt.query_map([], |row| {
        Ok(PrimitivaDraw {
            date: row.get(0)?,
            numbers: [
                row.get::<_, u8>(1)?,
                row.get::<_, u8>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, u8>(4)?,
                row.get::<_, u8>(5)?,
                row.get::<_, u8>(6)?,
            ],
            reintegro: row.get(7)?,
            conditions: conditions_at(row, 8)?,
        })
    })?.collect::<Result<Vec<_>, _>>()
        .context("No se pudo cargar el histórico de Primitiva")?;
    Ok(draws)
}

pub fn load_euro_history(conn: &Connection) -> Result<Vec<EuroDraw>> {
    let mut stmt = conn.prepare(
        "SELECT e.date, e.n1, e.n2, e.n3, e.n4, e.n5, e.s1, e.s2,
                c.temp_mean, c.rh_mean, c.ah_mean, c.moon_value
         FROM euromillones_draws e
         JOIN draw_conditions c ON c.date = e.date AND c.game = 'Euromillones'
         ORDER BY e.date"
    )?;
    let draws = stmt.query_map([], |row| {
        Ok(EuroDraw {
            date: row.get(0)?,
            numbers: [
                row.get::<_, u8>(1)?,
                row.get::<_, u8>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, u8>(4)?,
                row.get::<_, u8>(5)?,
            ],
            stars: [
                row.get::<_, u8>(6)?,
                row.get::<_, u8>(7)?,
            ],
            conditions: conditions_at(row, 8)?,
        })
    })?.collect::<Result<Vec<_>, _>>()
        .context("No se pudo cargar el histórico de Euromillones")?;
    Ok(draws)
}

pub fn fetch_last_primitiva(conn: &Connection, limit: u32) -> Result<Vec<PrimitivaResult>> {
    let mut stmt = conn.prepare(
        "SELECT date, n1, n2, n3, n4, n5, n6, complementary, reintegro
         FROM primitiva_draws ORDER BY date DESC LIMIT ?1"
    )?;
    let rows = stmt.query_map([limit], |row| {
        Ok(PrimitivaResult {
            date: row.get(0)?,
            numbers: [
                row.get::<_, u8>(1)?,
                row.get::<_, u8>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, u8>(4)?,
                row.get::<_, u8>(5)?,
                row.get::<_, u8>(6)?,
            ],
            complementary: row.get(7)?,
            reintegro: row.get(8)?,
        })
    })?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_last_euro(conn: &Connection, limit: u32) -> Result<Vec<EuroResult>> {
    let mut stmt = conn.prepare(
        "SELECT date, n1, n2, n3, n4, n5, s1, s2
         FROM euromillones_draws ORDER BY date DESC LIMIT ?1"
    )?;
    let rows = stmt.query_map([limit], |row| {
        Ok(EuroResult {
            date: row.get(0)?,
            numbers: [
                row.get::<_, u8>(1)?,
                row.get::<_, u8>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, u8>(4)?,
                row.get::<_, u8>(5)?,
            ],
            stars: [
                row.get::<_, u8>(6)?,
                row.get::<_, u8>(7)?,
            ],
        })
    })?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn upsert_recommendation(conn: &Connection, rec: &Recommendation) -> Result<()> {
    conn.execute(
        "INSERT INTO recommendations (game, target_date, signature, week_start, week_end, tol_frac,
                                      method_version, city, reintegro, combinations)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(target_date, signature) DO UPDATE SET
           game = excluded.game,
           week_start = excluded.week_start,
           week_end = excluded.week_end,
           tol_frac = excluded.tol_frac,
           method_version = excluded.method_version,
           city = excluded.city,
           reintegro = excluded.reintegro,
           combinations = excluded.combinations,
           generated_at = datetime('now')",
        params![
            rec.game.label(),
            rec.target_date,
            rec.signature,
            rec.week_start,
            rec.week_end,
            rec.tol_frac,
            rec.method_version,
            rec.city.name(),
            rec.reintegro,
            rec.combinations,
        ],
    ).with_context(|| format!("Fallo al guardar la apuesta {}", rec.signature))?;
    Ok(())
}

pub fn count_recommendations(conn: &Connection, game: Game) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM recommendations WHERE game = ?1",
        [game.label()],
        |row| row.get(0),
    )?;
    Ok(count)
}
