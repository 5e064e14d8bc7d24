use chrono::NaiveDate;
use santiloto_db::models::Game;

#[derive(Debug, thiserror::Error)]
pub enum WeeklyError {
    #[error("no hay previsión 18-23 para {game} el {date}")]
    MissingForecastContext { game: Game, date: NaiveDate },

    #[error("condiciones atmosféricas fuera de rango: T={temp_c} °C, RH={rh_pct} %")]
    InvalidAtmosphere { temp_c: f64, rh_pct: f64 },

    #[error("series horarias desalineadas (time={times}, temperature={temps}, humidity={humidities})")]
    MisalignedForecast {
        times: usize,
        temps: usize,
        humidities: usize,
    },

    #[error("instante de previsión no reconocido: '{0}'")]
    InvalidForecastTime(String),
}
