use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::WeeklyError;

/// Previsión horaria en arrays paralelos (formato `hourly` de Open-Meteo).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub relative_humidity_2m: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_mean_c: Option<f64>,
    pub rh_mean_pct: Option<f64>,
    pub hours_sampled: usize,
}

pub type ForecastMap = BTreeMap<NaiveDate, DailyForecast>;

#[derive(Default)]
struct DayBucket {
    temps: Vec<f64>,
    rhs: Vec<f64>,
    hours: BTreeSet<u32>,
}

fn parse_instant(raw: &str) -> Result<NaiveDateTime, WeeklyError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| WeeklyError::InvalidForecastTime(raw.to_string()))
}

fn rounded_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

/// Medias diarias de temperatura y humedad en las horas `start_hour..=end_hour`,
/// ordenadas por fecha. Las muestras nulas se ignoran.
pub fn daily_window_means(
    series: &HourlySeries,
    start_hour: u32,
    end_hour: u32,
) -> Result<Vec<DailyForecast>, WeeklyError> {
    let n = series.time.len();
    if series.temperature_2m.len() != n || series.relative_humidity_2m.len() != n {
        return Err(WeeklyError::MisalignedForecast {
            times: n,
            temps: series.temperature_2m.len(),
            humidities: series.relative_humidity_2m.len(),
        });
    }

    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for i in 0..n {
        let instant = parse_instant(&series.time[i])?;
        let hour = instant.hour();
        if hour < start_hour || hour > end_hour {
            continue;
        }
        let bucket = buckets.entry(instant.date()).or_default();
        if let Some(t) = series.temperature_2m[i] {
            bucket.temps.push(t);
        }
        if let Some(rh) = series.relative_humidity_2m[i] {
            bucket.rhs.push(rh);
        }
        bucket.hours.insert(hour);
    }

    Ok(buckets
        .into_iter()
        .map(|(date, bucket)| DailyForecast {
            date,
            temp_mean_c: rounded_mean(&bucket.temps),
            rh_mean_pct: rounded_mean(&bucket.rhs),
            hours_sampled: bucket.hours.len(),
        })
        .collect())
}

pub fn forecast_map(days: impl IntoIterator<Item = DailyForecast>) -> ForecastMap {
    days.into_iter().map(|d| (d.date, d)).collect()
}
