use std::cmp::Ordering;

use santiloto_db::models::{EuroDraw, PrimitivaDraw};
use serde::Serialize;

use crate::scoring::TargetContext;

/// Valores candidatos con su puntuación acumulada, de mayor a menor.
/// A igual puntuación se conserva el orden en que apareció cada valor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankTable {
    entries: Vec<(u8, f64)>,
}

impl RankTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(u8, f64)] {
        &self.entries
    }

    pub fn values(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.iter().map(|(v, _)| *v)
    }

    pub fn score(&self, value: u8) -> Option<f64> {
        self.entries.iter().find(|(v, _)| *v == value).map(|(_, s)| *s)
    }
}

/// Suma puntuaciones por valor conservando el orden de primera aparición.
#[derive(Debug)]
pub(crate) struct ScoreAccumulator {
    slots: [Option<usize>; 256],
    entries: Vec<(u8, f64)>,
}

impl ScoreAccumulator {
    pub(crate) fn new() -> Self {
        Self { slots: [None; 256], entries: Vec::new() }
    }

    pub(crate) fn add(&mut self, value: u8, score: f64) {
        match self.slots[value as usize] {
            Some(i) => self.entries[i].1 += score,
            None => {
                self.slots[value as usize] = Some(self.entries.len());
                self.entries.push((value, score));
            }
        }
    }

    pub(crate) fn into_table(self) -> RankTable {
        let mut entries = self.entries;
        // sort_by es estable: los empates conservan el orden de inserción.
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        RankTable { entries }
    }
}

/// Rankings de un sorteo de Primitiva: números y reintegro.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrimitivaRanks {
    pub numbers: RankTable,
    pub reintegro: RankTable,
}

/// Rankings de un sorteo de Euromillones: números y estrellas.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EuroRanks {
    pub numbers: RankTable,
    pub stars: RankTable,
}

pub fn score_primitiva(history: &[PrimitivaDraw], ctx: &TargetContext, frac: f64) -> PrimitivaRanks {
    let tol = ctx.tolerances(frac);
    let mut numbers = ScoreAccumulator::new();
    let mut reintegro = ScoreAccumulator::new();

    for draw in history {
        let Some(score) = ctx.joint_score(&draw.conditions, &tol) else {
            continue;
        };
        for &n in &draw.numbers {
            numbers.add(n, score);
        }
        reintegro.add(draw.reintegro, score);
    }

    PrimitivaRanks {
        numbers: numbers.into_table(),
        reintegro: reintegro.into_table(),
    }
}

pub fn score_euro(history: &[EuroDraw], ctx: &TargetContext, frac: f64) -> EuroRanks {
    let tol = ctx.tolerances(frac);
    let mut numbers = ScoreAccumulator::new();
    let mut stars = ScoreAccumulator::new();

    for draw in history {
        let Some(score) = ctx.joint_score(&draw.conditions, &tol) else {
            continue;
        };
        for &n in &draw.numbers {
            numbers.add(n, score);
        }
        for &s in &draw.stars {
            stars.add(s, score);
        }
    }

    EuroRanks {
        numbers: numbers.into_table(),
        stars: stars.into_table(),
    }
}

/// Ranking por frecuencia sobre todo el histórico, sin meteorología ni luna.
pub fn global_primitiva(history: &[PrimitivaDraw]) -> PrimitivaRanks {
    let mut numbers = ScoreAccumulator::new();
    let mut reintegro = ScoreAccumulator::new();
    for draw in history {
        for &n in &draw.numbers {
            numbers.add(n, 1.0);
        }
        reintegro.add(draw.reintegro, 1.0);
    }
    PrimitivaRanks {
        numbers: numbers.into_table(),
        reintegro: reintegro.into_table(),
    }
}

pub fn global_euro(history: &[EuroDraw]) -> EuroRanks {
    let mut numbers = ScoreAccumulator::new();
    let mut stars = ScoreAccumulator::new();
    for draw in history {
        for &n in &draw.numbers {
            numbers.add(n, 1.0);
        }
        for &s in &draw.stars {
            stars.add(s, 1.0);
        }
    }
    EuroRanks {
        numbers: numbers.into_table(),
        stars: stars.into_table(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{euro_draw, primitiva_draw};
    use chrono::NaiveDate;

    fn context(moon_bin: u8) -> TargetContext {
        TargetContext {
            date: NaiveDate::from_ymd_opt(2026, 2, 9).unwrap(),
            temp_c: 20.0,
            rh_pct: 50.0,
            abs_humidity: 8.0,
            moon_bin,
        }
    }

    #[test]
    fn test_accumulator_sorted_and_stable() {
        let mut acc = ScoreAccumulator::new();
        acc.add(5, 1.0);
        acc.add(9, 2.0);
        acc.add(3, 1.0);
        acc.add(5, 0.5);
        acc.add(7, 1.0);
        let table = acc.into_table();
        assert_eq!(table.values().collect::<Vec<_>>(), vec![9, 5, 3, 7]);
        assert_eq!(table.score(5), Some(1.5));
        assert_eq!(table.score(42), None);
    }

    #[test]
    fn test_scenario_identical_history() {
        // 40 sorteos idénticos al objetivo: cada número y el reintegro suman 40.
        let history: Vec<_> = (0..40)
            .map(|i| primitiva_draw(i, [1, 2, 3, 4, 5, 6], 3, 20.0, 50.0, 8.0, 8.0))
            .collect();
        let ranks = score_primitiva(&history, &context(2), 0.10);
        assert_eq!(ranks.numbers.len(), 6);
        for n in 1..=6 {
            assert!((ranks.numbers.score(n).unwrap() - 40.0).abs() < 1e-9);
        }
        assert_eq!(ranks.reintegro.len(), 1);
        assert!((ranks.reintegro.score(3).unwrap() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_primitiva_filters_moon_bin() {
        let history = vec![
            primitiva_draw(0, [1, 2, 3, 4, 5, 6], 1, 20.0, 50.0, 8.0, 8.0),
            primitiva_draw(1, [7, 8, 9, 10, 11, 12], 2, 20.0, 50.0, 8.0, 20.0),
        ];
        let ranks = score_primitiva(&history, &context(2), 0.10);
        assert_eq!(ranks.numbers.values().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(ranks.reintegro.values().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_score_primitiva_closer_day_ranks_higher() {
        let history = vec![
            primitiva_draw(0, [1, 2, 3, 4, 5, 6], 1, 23.0, 50.0, 8.0, 8.0),
            primitiva_draw(1, [7, 8, 9, 10, 11, 12], 2, 20.5, 50.0, 8.0, 8.0),
        ];
        let ranks = score_primitiva(&history, &context(2), 0.10);
        assert_eq!(ranks.numbers.entries()[0].0, 7);
        assert_eq!(ranks.reintegro.values().collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_score_euro() {
        let history = vec![
            euro_draw(0, [1, 2, 3, 4, 5], [1, 2], 20.0, 50.0, 8.0, 8.0),
            euro_draw(1, [1, 20, 30, 40, 50], [2, 12], 20.0, 50.0, 8.0, 8.0),
        ];
        let ranks = score_euro(&history, &context(2), 0.10);
        assert_eq!(ranks.numbers.entries()[0].0, 1);
        assert!((ranks.numbers.score(1).unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(ranks.stars.values().collect::<Vec<_>>(), vec![2, 1, 12]);
    }

    #[test]
    fn test_global_rankings_are_counts() {
        let history = vec![
            primitiva_draw(0, [1, 2, 3, 4, 5, 6], 1, 0.0, 0.0, 0.0, 0.0),
            primitiva_draw(1, [6, 7, 8, 9, 10, 11], 1, 30.0, 90.0, 20.0, 20.0),
        ];
        let ranks = global_primitiva(&history);
        assert_eq!(ranks.numbers.entries()[0], (6, 2.0));
        assert_eq!(ranks.numbers.len(), 11);
        assert_eq!(ranks.reintegro.entries(), &[(1, 2.0)]);
    }

    #[test]
    fn test_global_rankings_idempotent() {
        let history: Vec<_> = (0..25)
            .map(|i| euro_draw(i, [1 + i as u8, 2, 3, 4, 50 - i as u8], [1, 2 + (i % 10) as u8], 10.0, 60.0, 6.0, 3.0))
            .collect();
        assert_eq!(global_euro(&history), global_euro(&history));
    }
}
