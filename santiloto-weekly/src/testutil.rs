use chrono::{Duration, NaiveDate};
use santiloto_db::models::{Conditions, EuroDraw, PrimitivaDraw};

use crate::lunar::PhaseSource;

/// Fase lunar constante, para fijar el bin en los tests.
pub struct FixedPhase(pub f64);

impl PhaseSource for FixedPhase {
    fn phase_value(&self, _date: NaiveDate) -> f64 {
        self.0
    }
}

fn history_date(index: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(index as i64)
}

pub fn primitiva_draw(
    index: u32,
    numbers: [u8; 6],
    reintegro: u8,
    temp_c: f64,
    rh_pct: f64,
    abs_humidity: f64,
    moon_value: f64,
) -> PrimitivaDraw {
    PrimitivaDraw {
        date: history_date(index),
        numbers,
        reintegro,
        conditions: Conditions { temp_c, rh_pct, abs_humidity, moon_value },
    }
}

pub fn euro_draw(
    index: u32,
    numbers: [u8; 5],
    stars: [u8; 2],
    temp_c: f64,
    rh_pct: f64,
    abs_humidity: f64,
    moon_value: f64,
) -> EuroDraw {
    EuroDraw {
        date: history_date(index),
        numbers,
        stars,
        conditions: Conditions { temp_c, rh_pct, abs_humidity, moon_value },
    }
}

/// `count` sorteos de Primitiva que recorren 1..=49 sin repetir dentro de cada sorteo.
pub fn spread_primitiva(count: u32, moon_value: f64) -> Vec<PrimitivaDraw> {
    (0..count)
        .map(|i| {
            let base = (i * 6) % 48;
            let numbers = std::array::from_fn(|k| ((base + k as u32) % 49 + 1) as u8);
            primitiva_draw(i, numbers, (i % 10) as u8, 20.0, 50.0, 8.6, moon_value)
        })
        .collect()
}

/// Equivalente para Euromillones sobre 1..=50 y estrellas 1..=12.
pub fn spread_euro(count: u32, moon_value: f64) -> Vec<EuroDraw> {
    (0..count)
        .map(|i| {
            let base = (i * 5) % 50;
            let numbers = std::array::from_fn(|k| ((base + k as u32) % 50 + 1) as u8);
            let s = (i * 2) % 12;
            euro_draw(i, numbers, [(s + 1) as u8, ((s + 1) % 12 + 1) as u8], 12.0, 70.0, 7.4, moon_value)
        })
        .collect()
}
