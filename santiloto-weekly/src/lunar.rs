use chrono::{Datelike, NaiveDate};

/// Longitud de la escala de fase: 0 = luna nueva, 14 = luna llena.
pub const PHASE_CYCLE: f64 = 28.0;
pub const BIN_COUNT: u8 = 8;
const BIN_WIDTH: f64 = PHASE_CYCLE / BIN_COUNT as f64;

/// Fuente del valor de fase lunar de una fecha, en [0, 28).
pub trait PhaseSource {
    fn phase_value(&self, date: NaiveDate) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AstronomicalPhase;

impl PhaseSource for AstronomicalPhase {
    fn phase_value(&self, date: NaiveDate) -> f64 {
        phase_value(date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseQuarter {
    New,
    FirstQuarter,
    Full,
    LastQuarter,
}

impl PhaseQuarter {
    pub fn from_value(value: f64) -> Self {
        if value < 7.0 {
            PhaseQuarter::New
        } else if value < 14.0 {
            PhaseQuarter::FirstQuarter
        } else if value < 21.0 {
            PhaseQuarter::Full
        } else {
            PhaseQuarter::LastQuarter
        }
    }
}

impl std::fmt::Display for PhaseQuarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseQuarter::New => write!(f, "Luna Nueva"),
            PhaseQuarter::FirstQuarter => write!(f, "Cuarto Creciente"),
            PhaseQuarter::Full => write!(f, "Luna Llena"),
            PhaseQuarter::LastQuarter => write!(f, "Cuarto Menguante"),
        }
    }
}

/// Día juliano a las 00:00 de `date` (Meeus, calendario gregoriano).
fn julian_day(date: NaiveDate) -> f64 {
    let (mut year, mut month) = (date.year() as f64, date.month() as f64);
    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }
    let a = (year / 100.0).trunc();
    let b = 2.0 - a + (a / 4.0).trunc();
    (365.25 * (year + 4716.0)).trunc() + (30.6001 * (month + 1.0)).trunc()
        + date.day() as f64 + b - 1524.5
}

/// Valor de fase lunar al comienzo de `date`, redondeado a 3 decimales.
///
/// Serie truncada de la elongación lunar, redondeada a grados enteros y
/// llevada a la escala de 28 días.
pub fn phase_value(date: NaiveDate) -> f64 {
    let jd = julian_day(date);
    let delta_t = (jd - 2_382_148.0).powi(2) / (41_048_480.0 * 86_400.0);
    let t = (jd + delta_t - 2_451_545.0) / 36_525.0;
    let t2 = t * t;
    let t3 = t2 * t;

    let d = (297.85 + 445_267.1115 * t - 0.0016300 * t2 + t3 / 545_868.0)
        .rem_euclid(360.0)
        .to_radians();
    let m = (357.53 + 35_999.0503 * t).rem_euclid(360.0).to_radians();
    let m1 = (134.96 + 477_198.8676 * t + 0.0089970 * t2 + t3 / 69_699.0)
        .rem_euclid(360.0)
        .to_radians();

    let elongation = d.to_degrees()
        + 6.29 * m1.sin()
        - 2.10 * m.sin()
        + 1.27 * (2.0 * d - m1).sin()
        + 0.66 * (2.0 * d).sin();
    let elongation = elongation.rem_euclid(360.0).round_ties_even();

    let mut value = (elongation + 6.43) / 360.0 * PHASE_CYCLE;
    if value >= PHASE_CYCLE {
        value -= PHASE_CYCLE;
    }
    (value * 1000.0).round() / 1000.0
}

/// Bin uniforme de ancho 3.5 sobre [0, 28): 0..=7.
pub fn phase_bin(value: f64) -> u8 {
    if value >= PHASE_CYCLE {
        return BIN_COUNT - 1;
    }
    if value < 0.0 || value.is_nan() {
        return 0;
    }
    ((value / BIN_WIDTH) as u8).min(BIN_COUNT - 1)
}
