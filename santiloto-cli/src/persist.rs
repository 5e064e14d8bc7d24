use anyhow::{Context, Result};
use santiloto_db::db::upsert_recommendation;
use santiloto_db::models::{Game, Recommendation};
use santiloto_db::rusqlite::Connection;
use santiloto_weekly::WeeklyResult;

/// Filas de `recommendations` para cada apuesta del resultado semanal.
pub fn recommendations(result: &WeeklyResult) -> Result<Vec<Recommendation>> {
    let mut rows = Vec::with_capacity(result.primitiva_bets.len() + result.euromillones_bets.len());

    for (date, bet) in &result.primitiva_bets {
        rows.push(Recommendation {
            game: Game::Primitiva,
            target_date: *date,
            signature: bet.signature(*date),
            week_start: result.week_start,
            week_end: result.week_end,
            tol_frac: result.tol_primitiva.context("Resultado de Primitiva sin tolerancia")?,
            method_version: result.method_version.clone(),
            city: Game::Primitiva.city(),
            reintegro: Some(bet.reintegro),
            combinations: serde_json::to_string(&bet.combinations)?,
        });
    }

    for (date, bet) in &result.euromillones_bets {
        rows.push(Recommendation {
            game: Game::Euromillones,
            target_date: *date,
            signature: bet.signature(*date),
            week_start: result.week_start,
            week_end: result.week_end,
            tol_frac: result.tol_euromillones.context("Resultado de Euromillones sin tolerancia")?,
            method_version: result.method_version.clone(),
            city: Game::Euromillones.city(),
            reintegro: None,
            combinations: serde_json::to_string(&bet.combinations)?,
        });
    }

    Ok(rows)
}

/// Upsert de todas las apuestas en una transacción. Devuelve cuántas filas se escribieron.
pub fn save_weekly(conn: &Connection, result: &WeeklyResult) -> Result<usize> {
    let rows = recommendations(result)?;
    let tx = conn.unchecked_transaction()
        .context("No se pudo iniciar la transacción")?;
    for row in &rows {
        upsert_recommendation(&tx, row)?;
    }
    tx.commit().context("Fallo en el commit")?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use santiloto_db::db::{count_recommendations, migrate};
    use santiloto_weekly::bets::{EuroBet, EuroCombination, PrimitivaBet};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly() -> WeeklyResult {
        WeeklyResult {
            primitiva_dates: vec![date(2026, 2, 12), date(2026, 2, 14)],
            euromillones_dates: vec![date(2026, 2, 13)],
            primitiva_bets: vec![(
                date(2026, 2, 12),
                PrimitivaBet {
                    combinations: [
                        [1, 2, 3, 4, 5, 6],
                        [7, 8, 9, 10, 11, 12],
                        [13, 14, 15, 16, 17, 18],
                        [19, 20, 21, 22, 23, 24],
                        [25, 26, 27, 28, 29, 30],
                    ],
                    reintegro: 2,
                },
            )],
            euromillones_bets: vec![(
                date(2026, 2, 13),
                EuroBet {
                    combinations: [
                        EuroCombination { numbers: [1, 2, 3, 4, 5], stars: [1, 2] },
                        EuroCombination { numbers: [6, 7, 8, 9, 10], stars: [3, 4] },
                    ],
                },
            )],
            week_start: date(2026, 2, 11),
            week_end: date(2026, 2, 14),
            tol_primitiva: Some(0.10),
            tol_euromillones: Some(0.15),
            method_version: "v1".to_string(),
        }
    }

    #[test]
    fn test_recommendation_rows() {
        let rows = recommendations(&weekly()).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].game, Game::Primitiva);
        assert!(rows[0].signature.starts_with("P|2026-02-12|R2|01-02-03-04-05-06"));
        assert_eq!(rows[0].reintegro, Some(2));
        assert!(rows[0].combinations.starts_with("[[1,2,3,4,5,6],"));

        assert_eq!(rows[1].game, Game::Euromillones);
        assert_eq!(rows[1].signature, "E|2026-02-13|01-02-03-04-05-S01-S02|06-07-08-09-10-S03-S04");
        assert_eq!(rows[1].reintegro, None);
        assert!((rows[1].tol_frac - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_save_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let result = weekly();

        assert_eq!(save_weekly(&conn, &result).unwrap(), 2);
        assert_eq!(save_weekly(&conn, &result).unwrap(), 2);
        assert_eq!(count_recommendations(&conn, Game::Primitiva).unwrap(), 1);
        assert_eq!(count_recommendations(&conn, Game::Euromillones).unwrap(), 1);
    }

    #[test]
    fn test_empty_result_saves_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let mut result = weekly();
        result.primitiva_bets.clear();
        result.euromillones_bets.clear();
        assert_eq!(save_weekly(&conn, &result).unwrap(), 0);
    }
}
