use chrono::NaiveDate;
use santiloto_db::models::{Conditions, Game};

use crate::atmosphere::{Tolerances, absolute_humidity};
use crate::error::WeeklyError;
use crate::forecast::ForecastMap;
use crate::lunar::{PhaseSource, phase_bin};

/// `exp(-(delta/tol)^2)`; 0 si la tolerancia no es positiva.
pub fn gauss_score(delta: f64, tol: f64) -> f64 {
    if tol <= 0.0 {
        return 0.0;
    }
    let z = delta / tol;
    (-(z * z)).exp()
}

/// Condiciones previstas para un sorteo futuro.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetContext {
    pub date: NaiveDate,
    pub temp_c: f64,
    pub rh_pct: f64,
    pub abs_humidity: f64,
    pub moon_bin: u8,
}

impl TargetContext {
    /// Contexto de `date` a partir de la previsión de la ciudad. Es un error
    /// que el día falte en el mapa o no tenga media de temperatura o humedad.
    pub fn from_forecast(
        game: Game,
        date: NaiveDate,
        forecast: &ForecastMap,
        phase: &dyn PhaseSource,
    ) -> Result<Self, WeeklyError> {
        let day = forecast.get(&date);
        let (temp_c, rh_pct) = match day.and_then(|d| d.temp_mean_c.zip(d.rh_mean_pct)) {
            Some(means) => means,
            None => return Err(WeeklyError::MissingForecastContext { game, date }),
        };
        Ok(Self {
            date,
            temp_c,
            rh_pct,
            abs_humidity: absolute_humidity(temp_c, rh_pct)?,
            moon_bin: phase_bin(phase.phase_value(date)),
        })
    }

    pub fn tolerances(&self, frac: f64) -> Tolerances {
        Tolerances::for_target(self.temp_c, self.rh_pct, self.abs_humidity, frac)
    }

    /// Similitud conjunta de un día histórico. `None` si el bin lunar no
    /// coincide o el producto se queda en cero.
    pub fn joint_score(&self, conditions: &Conditions, tol: &Tolerances) -> Option<f64> {
        if phase_bin(conditions.moon_value) != self.moon_bin {
            return None;
        }
        let score = gauss_score(conditions.temp_c - self.temp_c, tol.temp)
            * gauss_score(conditions.rh_pct - self.rh_pct, tol.rh)
            * gauss_score(conditions.abs_humidity - self.abs_humidity, tol.ah);
        (score > 0.0).then_some(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{DailyForecast, forecast_map};
    use crate::testutil::FixedPhase;

    fn context(moon_bin: u8) -> TargetContext {
        TargetContext {
            date: NaiveDate::from_ymd_opt(2026, 2, 9).unwrap(),
            temp_c: 20.0,
            rh_pct: 50.0,
            abs_humidity: 8.0,
            moon_bin,
        }
    }

    fn conditions(temp_c: f64, moon_value: f64) -> Conditions {
        Conditions { temp_c, rh_pct: 50.0, abs_humidity: 8.0, moon_value }
    }

    #[test]
    fn test_gauss_score_peak() {
        for tol in [0.1, 1.0, 5.0, 100.0] {
            assert!((gauss_score(0.0, tol) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_gauss_score_decreasing() {
        let mut previous = gauss_score(0.0, 2.0);
        for i in 1..50 {
            let s = gauss_score(i as f64 * 0.1, 2.0);
            assert!(s < previous);
            assert!((s - gauss_score(-(i as f64) * 0.1, 2.0)).abs() < 1e-15);
            previous = s;
        }
    }

    #[test]
    fn test_gauss_score_zero_tolerance() {
        assert_eq!(gauss_score(0.0, 0.0), 0.0);
        assert_eq!(gauss_score(3.0, 0.0), 0.0);
        assert_eq!(gauss_score(3.0, -1.0), 0.0);
    }

    #[test]
    fn test_joint_score_identical_day() {
        let ctx = context(2);
        let tol = ctx.tolerances(0.10);
        let score = ctx.joint_score(&conditions(20.0, 8.0), &tol).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_joint_score_lunar_filter() {
        let ctx = context(2);
        let tol = ctx.tolerances(0.10);
        assert!(ctx.joint_score(&conditions(20.0, 3.4), &tol).is_none());
        assert!(ctx.joint_score(&conditions(20.0, 10.5), &tol).is_none());
    }

    #[test]
    fn test_joint_score_product() {
        let ctx = context(0);
        let tol = ctx.tolerances(0.10);
        // Sólo difiere la temperatura: 2 °C de delta con tolerancia 2.0 → e^-1.
        let score = ctx.joint_score(&conditions(22.0, 1.0), &tol).unwrap();
        assert!((score - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_joint_score_underflow_skipped() {
        let ctx = context(0);
        let tol = ctx.tolerances(0.10);
        assert!(ctx.joint_score(&conditions(500.0, 1.0), &tol).is_none());
    }

    #[test]
    fn test_context_from_forecast() {
        let d = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        let map = forecast_map(vec![DailyForecast {
            date: d,
            temp_mean_c: Some(20.0),
            rh_mean_pct: Some(50.0),
            hours_sampled: 6,
        }]);
        let ctx = TargetContext::from_forecast(Game::Primitiva, d, &map, &FixedPhase(8.0)).unwrap();
        assert_eq!(ctx.moon_bin, 2);
        assert!((ctx.abs_humidity - 8.6375).abs() < 1e-3);
    }

    #[test]
    fn test_context_missing_day() {
        let d = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        let map = forecast_map(vec![DailyForecast {
            date: d,
            temp_mean_c: None,
            rh_mean_pct: Some(50.0),
            hours_sampled: 6,
        }]);
        let err = TargetContext::from_forecast(Game::Euromillones, d, &map, &FixedPhase(8.0)).unwrap_err();
        assert!(matches!(err, WeeklyError::MissingForecastContext { game: Game::Euromillones, .. }));

        let other = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        assert!(TargetContext::from_forecast(Game::Euromillones, other, &map, &FixedPhase(8.0)).is_err());
    }
}
