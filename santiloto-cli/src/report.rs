use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use santiloto_weekly::WeeklyResult;
use santiloto_weekly::bets::{EuroBet, PrimitivaBet};

#[derive(Debug, Serialize)]
pub struct WeeklyMetaV1 {
    pub generated_at: DateTime<Utc>,
    pub source: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BetEntryV1<'a, B: Serialize> {
    pub draw_date: NaiveDate,
    pub payload: &'a B,
}

/// Contrato JSON público del resultado semanal. Cambiarlo exige nueva versión.
#[derive(Debug, Serialize)]
pub struct WeeklyResponseV1<'a> {
    pub version: &'static str,
    pub method_version: &'a str,
    pub primitiva_dates: &'a [NaiveDate],
    pub euromillones_dates: &'a [NaiveDate],
    pub primitiva_bets: Vec<BetEntryV1<'a, PrimitivaBet>>,
    pub euromillones_bets: Vec<BetEntryV1<'a, EuroBet>>,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub tol_primitiva: Option<f64>,
    pub tol_euromillones: Option<f64>,
    pub meta: WeeklyMetaV1,
}

impl<'a> WeeklyResponseV1<'a> {
    pub fn new(result: &'a WeeklyResult, generated_at: DateTime<Utc>) -> Self {
        Self {
            version: "v1",
            method_version: &result.method_version,
            primitiva_dates: &result.primitiva_dates,
            euromillones_dates: &result.euromillones_dates,
            primitiva_bets: result
                .primitiva_bets
                .iter()
                .map(|(draw_date, payload)| BetEntryV1 { draw_date: *draw_date, payload })
                .collect(),
            euromillones_bets: result
                .euromillones_bets
                .iter()
                .map(|(draw_date, payload)| BetEntryV1 { draw_date: *draw_date, payload })
                .collect(),
            week_start: result.week_start,
            week_end: result.week_end,
            tol_primitiva: result.tol_primitiva,
            tol_euromillones: result.tol_euromillones,
            meta: WeeklyMetaV1 { generated_at, source: "runtime" },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_response_json_shape() {
        let result = WeeklyResult {
            primitiva_dates: vec![date(2026, 2, 14)],
            euromillones_dates: vec![],
            primitiva_bets: vec![(
                date(2026, 2, 14),
                PrimitivaBet {
                    combinations: [
                        [1, 2, 3, 4, 5, 6],
                        [7, 8, 9, 10, 11, 12],
                        [13, 14, 15, 16, 17, 18],
                        [19, 20, 21, 22, 23, 24],
                        [25, 26, 27, 28, 29, 30],
                    ],
                    reintegro: 0,
                },
            )],
            euromillones_bets: vec![],
            week_start: date(2026, 2, 14),
            week_end: date(2026, 2, 14),
            tol_primitiva: Some(0.10),
            tol_euromillones: None,
            method_version: "v1".to_string(),
        };
        let generated_at = Utc.with_ymd_and_hms(2026, 2, 14, 9, 30, 0).unwrap();
        let json = serde_json::to_value(WeeklyResponseV1::new(&result, generated_at)).unwrap();

        assert_eq!(json["version"], "v1");
        assert_eq!(json["method_version"], "v1");
        assert_eq!(json["primitiva_dates"][0], "2026-02-14");
        assert_eq!(json["primitiva_bets"][0]["draw_date"], "2026-02-14");
        assert_eq!(json["primitiva_bets"][0]["payload"]["reintegro"], 0);
        assert_eq!(json["primitiva_bets"][0]["payload"]["combinations"][4][5], 30);
        assert!(json["euromillones_bets"].as_array().unwrap().is_empty());
        assert!(json["tol_euromillones"].is_null());
        assert_eq!(json["meta"]["source"], "runtime");
        assert_eq!(json["meta"]["generated_at"], "2026-02-14T09:30:00Z");
    }
}
