use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use santiloto_db::db::{draws_missing_conditions, latest_draw_date, load_euro_history, load_primitiva_history};
use santiloto_db::models::{City, Game};
use santiloto_db::rusqlite::Connection;
use santiloto_weekly::config::WeeklyConfig;
use santiloto_weekly::forecast::{ForecastMap, HourlySeries, daily_window_means, forecast_map};
use santiloto_weekly::lunar::PhaseSource;
use santiloto_weekly::{History, WeeklyResult, compute_weekly};

pub fn load_config(path: Option<&Path>) -> Result<WeeklyConfig> {
    let Some(path) = path else {
        return Ok(WeeklyConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("No se pudo leer la configuración {:?}", path))?;
    let config: WeeklyConfig = serde_json::from_str(&content)
        .with_context(|| format!("Configuración no válida en {:?}", path))?;
    Ok(config)
}

/// Lee `<dir>/<ciudad>.json` (serie horaria) y la agrega por día.
/// Un fichero ausente da un mapa vacío.
pub fn load_forecast(dir: &Path, city: City, config: &WeeklyConfig) -> Result<ForecastMap> {
    let path = dir.join(format!("{}.json", city.key()));
    if !path.exists() {
        log::warn!("Sin previsión para {}: {:?} no existe", city.name(), path);
        return Ok(ForecastMap::new());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("No se pudo leer {:?}", path))?;
    let series: HourlySeries = serde_json::from_str(&content)
        .with_context(|| format!("Previsión horaria no válida en {:?}", path))?;
    let days = daily_window_means(&series, config.window_start_hour, config.window_end_hour)
        .with_context(|| format!("No se pudo agregar la previsión de {}", city.name()))?;
    log::debug!("{}: {} días de previsión", city.name(), days.len());
    Ok(forecast_map(days))
}

/// Carga el histórico de ambos juegos. Los sorteos sin condiciones quedan
/// fuera del ranking y se avisan por el log.
pub fn load_history(conn: &Connection) -> Result<History> {
    for game in [Game::Primitiva, Game::Euromillones] {
        let missing = draws_missing_conditions(conn, game)?;
        if let (Some(first), Some(last)) = (missing.first(), missing.last()) {
            log::warn!(
                "{}: {} sorteos sin condiciones meteorológicas ({} → {}), excluidos del ranking",
                game,
                missing.len(),
                first,
                last
            );
        }
    }
    Ok(History {
        primitiva: load_primitiva_history(conn)?,
        euromillones: load_euro_history(conn)?,
        last_primitiva: latest_draw_date(conn, Game::Primitiva)?,
        last_euromillones: latest_draw_date(conn, Game::Euromillones)?,
    })
}

pub fn run_weekly(
    conn: &Connection,
    today: NaiveDate,
    forecast_dir: &Path,
    config: &WeeklyConfig,
    phase: &dyn PhaseSource,
) -> Result<WeeklyResult> {
    let history = load_history(conn)?;
    log::info!(
        "Histórico: {} sorteos de Primitiva, {} de Euromillones",
        history.primitiva.len(),
        history.euromillones.len()
    );
    let madrid = load_forecast(forecast_dir, Game::Primitiva.city(), config)?;
    let paris = load_forecast(forecast_dir, Game::Euromillones.city(), config)?;
    let result = compute_weekly(today, &history, &madrid, &paris, config, phase)?;
    Ok(result)
}
