use chrono::NaiveDate;
use santiloto_db::models::{EuroDraw, PrimitivaDraw};

use crate::lunar::{PhaseQuarter, PhaseSource};
use crate::ranking::{RankTable, ScoreAccumulator};

/// Combinaciones por día cuando no se pide otra cantidad.
pub const QUARTER_LINES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitivaLine {
    pub rank: usize,
    pub numbers: [u8; 6],
    pub reintegro: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EuroLine {
    pub rank: usize,
    pub numbers: [u8; 5],
    pub stars: [u8; 2],
}

/// Cuarto lunar de una fecha de sorteo y las combinaciones de ese cuarto.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterDay<L> {
    pub date: NaiveDate,
    pub quarter: PhaseQuarter,
    pub lines: Vec<L>,
}

/// Un ranking de frecuencias por columna (n1, n2, ...).
fn column_ranks<const N: usize>(rows: impl Iterator<Item = [u8; N]>) -> [RankTable; N] {
    let mut columns: [ScoreAccumulator; N] = std::array::from_fn(|_| ScoreAccumulator::new());
    for row in rows {
        for (column, value) in columns.iter_mut().zip(row) {
            column.add(value, 1.0);
        }
    }
    columns.map(ScoreAccumulator::into_table)
}

/// Línea `rank` (base 0): cada columna aporta su primer valor libre desde esa
/// posición del ranking. `None` si alguna columna se agota.
fn fill_line<const N: usize>(columns: &[RankTable; N], rank: usize) -> Option<[u8; N]> {
    let mut taken = Vec::with_capacity(N);
    for column in columns {
        let value = column.values().skip(rank).find(|v| !taken.contains(v))?;
        taken.push(value);
    }
    taken.try_into().ok()
}

fn in_quarter(moon_value: f64, quarter: PhaseQuarter) -> bool {
    PhaseQuarter::from_value(moon_value) == quarter
}

/// Hasta `count` combinaciones de Primitiva con los números más frecuentes
/// por columna entre los sorteos del cuarto lunar dado.
pub fn quarter_primitiva(history: &[PrimitivaDraw], quarter: PhaseQuarter, count: usize) -> Vec<PrimitivaLine> {
    let draws: Vec<&PrimitivaDraw> = history
        .iter()
        .filter(|d| in_quarter(d.conditions.moon_value, quarter))
        .collect();
    let numbers = column_ranks(draws.iter().map(|d| d.numbers));
    let [reintegro] = column_ranks(draws.iter().map(|d| [d.reintegro]));

    (0..count)
        .filter_map(|i| {
            let numbers = fill_line(&numbers, i)?;
            let reintegro = reintegro.values().nth(i)?;
            Some(PrimitivaLine { rank: i + 1, numbers, reintegro })
        })
        .collect()
}

pub fn quarter_euro(history: &[EuroDraw], quarter: PhaseQuarter, count: usize) -> Vec<EuroLine> {
    let draws: Vec<&EuroDraw> = history
        .iter()
        .filter(|d| in_quarter(d.conditions.moon_value, quarter))
        .collect();
    let numbers = column_ranks(draws.iter().map(|d| d.numbers));
    let stars = column_ranks(draws.iter().map(|d| d.stars));

    (0..count)
        .filter_map(|i| {
            let numbers = fill_line(&numbers, i)?;
            let stars = fill_line(&stars, i)?;
            Some(EuroLine { rank: i + 1, numbers, stars })
        })
        .collect()
}

fn by_day<L>(
    dates: &[NaiveDate],
    phase: &dyn PhaseSource,
    lines: impl Fn(PhaseQuarter) -> Vec<L>,
) -> Vec<QuarterDay<L>> {
    dates
        .iter()
        .map(|&date| {
            let quarter = PhaseQuarter::from_value(phase.phase_value(date));
            log::debug!("{}: {}", date, quarter);
            QuarterDay { date, quarter, lines: lines(quarter) }
        })
        .collect()
}

pub fn primitiva_by_day(
    history: &[PrimitivaDraw],
    dates: &[NaiveDate],
    phase: &dyn PhaseSource,
    count: usize,
) -> Vec<QuarterDay<PrimitivaLine>> {
    by_day(dates, phase, |quarter| quarter_primitiva(history, quarter, count))
}

pub fn euro_by_day(
    history: &[EuroDraw],
    dates: &[NaiveDate],
    phase: &dyn PhaseSource,
    count: usize,
) -> Vec<QuarterDay<EuroLine>> {
    by_day(dates, phase, |quarter| quarter_euro(history, quarter, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FixedPhase, euro_draw, primitiva_draw};

    fn new_moon(index: u32, numbers: [u8; 6], reintegro: u8) -> PrimitivaDraw {
        primitiva_draw(index, numbers, reintegro, 20.0, 50.0, 8.0, 3.0)
    }

    #[test]
    fn test_column_ranks_are_positional() {
        let columns = column_ranks([[1, 2], [1, 3], [2, 1]].into_iter());
        assert_eq!(columns[0].entries(), &[(1, 2.0), (2, 1.0)]);
        assert_eq!(columns[1].values().collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    #[test]
    fn test_quarter_primitiva_lines() {
        let history = vec![
            new_moon(0, [1, 2, 3, 4, 5, 6], 1),
            new_moon(1, [1, 2, 3, 4, 5, 7], 1),
            new_moon(2, [2, 8, 9, 10, 11, 12], 2),
            primitiva_draw(3, [40, 41, 42, 43, 44, 45], 9, 20.0, 50.0, 8.0, 20.0),
        ];
        let lines = quarter_primitiva(&history, PhaseQuarter::New, QUARTER_LINES);
        assert_eq!(
            lines,
            vec![
                PrimitivaLine { rank: 1, numbers: [1, 2, 3, 4, 5, 6], reintegro: 1 },
                PrimitivaLine { rank: 2, numbers: [2, 8, 9, 10, 11, 7], reintegro: 2 },
            ]
        );

        let full = quarter_primitiva(&history, PhaseQuarter::Full, QUARTER_LINES);
        assert_eq!(full, vec![PrimitivaLine { rank: 1, numbers: [40, 41, 42, 43, 44, 45], reintegro: 9 }]);
    }

    #[test]
    fn test_line_skips_values_already_taken() {
        let history = vec![
            new_moon(0, [7, 8, 10, 11, 12, 13], 0),
            new_moon(1, [7, 8, 10, 11, 12, 13], 0),
            new_moon(2, [1, 7, 20, 21, 22, 23], 0),
            new_moon(3, [2, 7, 24, 25, 26, 27], 0),
            new_moon(4, [3, 7, 28, 29, 30, 31], 0),
        ];
        let lines = quarter_primitiva(&history, PhaseQuarter::New, 1);
        assert_eq!(lines[0].numbers, [7, 8, 10, 11, 12, 13]);
    }

    #[test]
    fn test_line_without_reintegro_is_dropped() {
        let history = vec![
            new_moon(0, [1, 2, 3, 4, 5, 6], 4),
            new_moon(1, [7, 8, 9, 10, 11, 12], 4),
        ];
        let lines = quarter_primitiva(&history, PhaseQuarter::New, QUARTER_LINES);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].reintegro, 4);
    }

    #[test]
    fn test_empty_quarter() {
        let history = vec![new_moon(0, [1, 2, 3, 4, 5, 6], 1)];
        assert!(quarter_primitiva(&history, PhaseQuarter::LastQuarter, QUARTER_LINES).is_empty());
        assert!(quarter_euro(&[], PhaseQuarter::New, QUARTER_LINES).is_empty());
    }

    #[test]
    fn test_quarter_euro_lines() {
        let history = vec![
            euro_draw(0, [1, 2, 3, 4, 5], [1, 2], 12.0, 70.0, 7.4, 10.0),
            euro_draw(1, [1, 2, 3, 4, 6], [1, 3], 12.0, 70.0, 7.4, 10.0),
            euro_draw(2, [10, 20, 30, 40, 50], [2, 1], 12.0, 70.0, 7.4, 10.0),
        ];
        let lines = quarter_euro(&history, PhaseQuarter::FirstQuarter, QUARTER_LINES);
        assert_eq!(
            lines,
            vec![
                EuroLine { rank: 1, numbers: [1, 2, 3, 4, 5], stars: [1, 2] },
                EuroLine { rank: 2, numbers: [10, 20, 30, 40, 6], stars: [2, 3] },
            ]
        );
    }

    #[test]
    fn test_by_day_uses_quarter_of_each_date() {
        let history = vec![
            new_moon(0, [1, 2, 3, 4, 5, 6], 1),
            primitiva_draw(1, [40, 41, 42, 43, 44, 45], 9, 20.0, 50.0, 8.0, 15.0),
        ];
        let dates = [NaiveDate::from_ymd_opt(2026, 2, 12).unwrap(), NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()];

        let days = primitiva_by_day(&history, &dates, &FixedPhase(15.0), QUARTER_LINES);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, dates[0]);
        assert!(days.iter().all(|d| d.quarter == PhaseQuarter::Full));
        assert_eq!(days[1].lines[0].numbers, [40, 41, 42, 43, 44, 45]);

        let euro = euro_by_day(&[], &dates[..1], &FixedPhase(1.0), QUARTER_LINES);
        assert_eq!(euro[0].quarter, PhaseQuarter::New);
        assert!(euro[0].lines.is_empty());
    }
}
