use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::ranking::{EuroRanks, PrimitivaRanks};
use crate::select::select_top_unique;

pub const PRIMITIVA_COMBINATIONS: usize = 5;
pub const PRIMITIVA_NUMBERS: usize = 6;
pub const EURO_COMBINATIONS: usize = 2;
pub const EURO_NUMBERS: usize = 5;
pub const EURO_STARS: usize = 2;

/// 5 combinaciones de 6 números con un reintegro común.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimitivaBet {
    pub combinations: [[u8; PRIMITIVA_NUMBERS]; PRIMITIVA_COMBINATIONS],
    pub reintegro: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EuroCombination {
    pub numbers: [u8; EURO_NUMBERS],
    pub stars: [u8; EURO_STARS],
}

/// 2 combinaciones de 5 números + 2 estrellas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EuroBet {
    pub combinations: [EuroCombination; EURO_COMBINATIONS],
}

fn sorted_block<const N: usize>(values: &[u8]) -> [u8; N] {
    let mut block = [0u8; N];
    block.copy_from_slice(&values[..N]);
    block.sort_unstable();
    block
}

fn join_numbers(values: &[u8]) -> String {
    values.iter().map(|n| format!("{:02}", n)).collect::<Vec<_>>().join("-")
}

impl PrimitivaBet {
    /// `P|fecha|R<reintegro>|c1|...|c5`, combinaciones ordenadas.
    pub fn signature(&self, target_date: NaiveDate) -> String {
        let mut combos: Vec<[u8; PRIMITIVA_NUMBERS]> = self.combinations
            .iter()
            .map(|c| {
                let mut c = *c;
                c.sort_unstable();
                c
            })
            .collect();
        combos.sort();

        let mut parts = vec![
            "P".to_string(),
            target_date.format("%Y-%m-%d").to_string(),
            format!("R{}", self.reintegro),
        ];
        parts.extend(combos.iter().map(|c| join_numbers(c)));
        parts.join("|")
    }
}

impl EuroBet {
    /// `E|fecha|n1-..-n5-Sxx-Syy|...`, combinaciones ordenadas.
    pub fn signature(&self, target_date: NaiveDate) -> String {
        let mut combos: Vec<([u8; EURO_NUMBERS], [u8; EURO_STARS])> = self.combinations
            .iter()
            .map(|c| {
                let (mut n, mut s) = (c.numbers, c.stars);
                n.sort_unstable();
                s.sort_unstable();
                (n, s)
            })
            .collect();
        combos.sort();

        let mut parts = vec!["E".to_string(), target_date.format("%Y-%m-%d").to_string()];
        parts.extend(combos.iter().map(|(n, s)| {
            format!("{}-S{:02}-S{:02}", join_numbers(n), s[0], s[1])
        }));
        parts.join("|")
    }
}

/// Construye tantas apuestas de Primitiva como permitan los rankings sin
/// repetir número. Cada apuesta consume 30 números y un resto menor se
/// descarta. Sin reintegro disponible no hay apuestas.
pub fn build_primitiva_bets(ranks: &PrimitivaRanks, global: &PrimitivaRanks) -> Vec<PrimitivaBet> {
    let per_bet = PRIMITIVA_COMBINATIONS * PRIMITIVA_NUMBERS;
    let mut bets = Vec::new();

    let reintegro = match select_top_unique(&ranks.reintegro, &global.reintegro, 1, &mut HashSet::new())
        .first()
    {
        Some(&r) => r,
        None => return bets,
    };

    let mut used = HashSet::new();
    loop {
        let numbers = select_top_unique(&ranks.numbers, &global.numbers, per_bet, &mut used);
        if numbers.len() < per_bet {
            break;
        }
        let mut combinations = [[0u8; PRIMITIVA_NUMBERS]; PRIMITIVA_COMBINATIONS];
        for (combination, chunk) in combinations.iter_mut().zip(numbers.chunks(PRIMITIVA_NUMBERS)) {
            *combination = sorted_block(chunk);
        }
        bets.push(PrimitivaBet { combinations, reintegro });
    }
    bets
}

/// Igual que Primitiva pero sin campo común: cada apuesta consume 10 números
/// y 4 estrellas, y se para en cuanto falte cualquiera de los dos.
pub fn build_euro_bets(ranks: &EuroRanks, global: &EuroRanks) -> Vec<EuroBet> {
    let numbers_per_bet = EURO_COMBINATIONS * EURO_NUMBERS;
    let stars_per_bet = EURO_COMBINATIONS * EURO_STARS;
    let mut bets = Vec::new();
    let mut used_numbers = HashSet::new();
    let mut used_stars = HashSet::new();

    loop {
        let numbers = select_top_unique(&ranks.numbers, &global.numbers, numbers_per_bet, &mut used_numbers);
        let stars = select_top_unique(&ranks.stars, &global.stars, stars_per_bet, &mut used_stars);
        if numbers.len() < numbers_per_bet || stars.len() < stars_per_bet {
            break;
        }

        let combinations = std::array::from_fn(|i| EuroCombination {
            numbers: sorted_block(&numbers[i * EURO_NUMBERS..]),
            stars: sorted_block(&stars[i * EURO_STARS..]),
        });
        bets.push(EuroBet { combinations });
    }
    bets
}
