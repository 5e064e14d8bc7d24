use crate::error::WeeklyError;

const TEMP_FLOOR: f64 = 1.5;
const RH_FLOOR: f64 = 5.0;
const AH_FLOOR: f64 = 0.5;

pub fn tol_temp(target_temp: f64, frac: f64) -> f64 {
    TEMP_FLOOR.max(frac * target_temp.abs())
}

pub fn tol_rh(target_rh: f64, frac: f64) -> f64 {
    RH_FLOOR.max(frac * target_rh)
}

pub fn tol_ah(target_ah: f64, frac: f64) -> f64 {
    AH_FLOOR.max(frac * target_ah.abs())
}

/// Anchos de tolerancia para un día objetivo y una fracción dada.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub temp: f64,
    pub rh: f64,
    pub ah: f64,
}

impl Tolerances {
    pub fn for_target(temp_c: f64, rh_pct: f64, abs_humidity: f64, frac: f64) -> Self {
        Self {
            temp: tol_temp(temp_c, frac),
            rh: tol_rh(rh_pct, frac),
            ah: tol_ah(abs_humidity, frac),
        }
    }
}

/// Humedad absoluta en g/m³ a partir de la temperatura (°C) y la humedad
/// relativa (%), con la presión de saturación de Magnus-Tetens.
pub fn absolute_humidity(temp_c: f64, rh_pct: f64) -> Result<f64, WeeklyError> {
    if !(0.0..=100.0).contains(&rh_pct) || !(-80.0..=60.0).contains(&temp_c) {
        return Err(WeeklyError::InvalidAtmosphere { temp_c, rh_pct });
    }
    let saturation = 6.112 * ((17.67 * temp_c) / (temp_c + 243.5)).exp();
    let vapour = rh_pct / 100.0 * saturation;
    Ok(216.7 * vapour / (temp_c + 273.15))
}
