use anyhow::Result;
use chrono::NaiveDate;
use santiloto_db::models::Game;
use santiloto_db::rusqlite::Connection;
use santiloto_weekly::lunar::PhaseSource;
use santiloto_weekly::quarters::{EuroLine, PrimitivaLine, QuarterDay, euro_by_day, primitiva_by_day};
use santiloto_weekly::weekly::pending_draw_dates;

use crate::weekly::load_history;

pub struct QuarterReport {
    pub primitiva: Vec<QuarterDay<PrimitivaLine>>,
    pub euromillones: Vec<QuarterDay<EuroLine>>,
}

/// Combinaciones por cuarto lunar para los sorteos pendientes de la semana.
pub fn run_quarters(conn: &Connection, today: NaiveDate, top: usize, phase: &dyn PhaseSource) -> Result<QuarterReport> {
    let history = load_history(conn)?;
    let primitiva_dates = pending_draw_dates(Game::Primitiva, today, history.last_primitiva);
    let euromillones_dates = pending_draw_dates(Game::Euromillones, today, history.last_euromillones);
    log::info!(
        "Cuartos lunares: {} fechas de Primitiva, {} de Euromillones",
        primitiva_dates.len(),
        euromillones_dates.len()
    );

    Ok(QuarterReport {
        primitiva: primitiva_by_day(&history.primitiva, &primitiva_dates, phase, top),
        euromillones: euro_by_day(&history.euromillones, &euromillones_dates, phase, top),
    })
}
