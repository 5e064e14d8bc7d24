use anyhow::{Result, bail};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    Primitiva,
    Euromillones,
}

impl Game {
    pub fn label(&self) -> &'static str {
        match self {
            Game::Primitiva => "Primitiva",
            Game::Euromillones => "Euromillones",
        }
    }

    pub fn draw_weekdays(&self) -> &'static [Weekday] {
        match self {
            Game::Primitiva => &[Weekday::Mon, Weekday::Thu, Weekday::Sat],
            Game::Euromillones => &[Weekday::Tue, Weekday::Fri],
        }
    }

    /// Ciudad cuya meteorología acompaña a los sorteos del juego.
    pub fn city(&self) -> City {
        match self {
            Game::Primitiva => City::Madrid,
            Game::Euromillones => City::Paris,
        }
    }

    pub(crate) fn draws_table(&self) -> &'static str {
        match self {
            Game::Primitiva => "primitiva_draws",
            Game::Euromillones => "euromillones_draws",
        }
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum City {
    Madrid,
    Paris,
}

impl City {
    /// Identificador estable (nombre de fichero de previsión, columna `city`).
    pub fn key(&self) -> &'static str {
        match self {
            City::Madrid => "madrid",
            City::Paris => "paris",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            City::Madrid => "Madrid",
            City::Paris => "Paris",
        }
    }
}

/// Medias meteorológicas de la franja 18-23h y valor lunar de la fecha de un sorteo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub temp_c: f64,
    pub rh_pct: f64,
    pub abs_humidity: f64,
    pub moon_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitivaDraw {
    pub date: NaiveDate,
    pub numbers: [u8; 6],
    pub reintegro: u8,
    pub conditions: Conditions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EuroDraw {
    pub date: NaiveDate,
    pub numbers: [u8; 5],
    pub stars: [u8; 2],
    pub conditions: Conditions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitivaResult {
    pub date: NaiveDate,
    pub numbers: [u8; 6],
    pub complementary: Option<u8>,
    pub reintegro: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EuroResult {
    pub date: NaiveDate,
    pub numbers: [u8; 5],
    pub stars: [u8; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawConditions {
    pub game: Game,
    pub date: NaiveDate,
    pub city: City,
    pub conditions: Conditions,
    pub source: String,
}

/// Una apuesta recomendada lista para persistir, identificada por (target_date, signature).
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub game: Game,
    pub target_date: NaiveDate,
    pub signature: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub tol_frac: f64,
    pub method_version: String,
    pub city: City,
    pub reintegro: Option<u8>,
    pub combinations: String,
}

fn check_distinct(values: &[u8], what: &str) -> Result<()> {
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            if values[i] == values[j] {
                bail!("{} repetido: {}", what, values[i]);
            }
        }
    }
    Ok(())
}

pub fn validate_primitiva(numbers: &[u8; 6], reintegro: u8) -> Result<()> {
    for &n in numbers {
        if !(1..=49).contains(&n) {
            bail!("Número {} fuera de rango (1-49)", n);
        }
    }
    if reintegro > 9 {
        bail!("Reintegro {} fuera de rango (0-9)", reintegro);
    }
    check_distinct(numbers, "Número")
}

pub fn validate_euro(numbers: &[u8; 5], stars: &[u8; 2]) -> Result<()> {
    for &n in numbers {
        if !(1..=50).contains(&n) {
            bail!("Número {} fuera de rango (1-50)", n);
        }
    }
    for &s in stars {
        if !(1..=12).contains(&s) {
            bail!("Estrella {} fuera de rango (1-12)", s);
        }
    }
    check_distinct(numbers, "Número")?;
    check_distinct(stars, "Estrella")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_primitiva_ok() {
        assert!(validate_primitiva(&[1, 2, 3, 4, 5, 6], 0).is_ok());
        assert!(validate_primitiva(&[49, 48, 47, 46, 45, 44], 9).is_ok());
    }

    #[test]
    fn test_validate_primitiva_out_of_range() {
        assert!(validate_primitiva(&[0, 2, 3, 4, 5, 6], 1).is_err());
        assert!(validate_primitiva(&[1, 2, 3, 4, 5, 50], 1).is_err());
        assert!(validate_primitiva(&[1, 2, 3, 4, 5, 6], 10).is_err());
    }

    #[test]
    fn test_validate_primitiva_duplicates() {
        assert!(validate_primitiva(&[7, 7, 3, 4, 5, 6], 1).is_err());
    }

    #[test]
    fn test_validate_euro() {
        assert!(validate_euro(&[1, 2, 3, 4, 50], &[1, 12]).is_ok());
        assert!(validate_euro(&[1, 2, 3, 4, 51], &[1, 2]).is_err());
        assert!(validate_euro(&[1, 2, 3, 4, 5], &[0, 2]).is_err());
        assert!(validate_euro(&[1, 2, 3, 4, 5], &[3, 3]).is_err());
        assert!(validate_euro(&[1, 1, 3, 4, 5], &[1, 2]).is_err());
    }

    #[test]
    fn test_game_weekdays() {
        assert_eq!(Game::Primitiva.draw_weekdays(), &[Weekday::Mon, Weekday::Thu, Weekday::Sat]);
        assert_eq!(Game::Euromillones.draw_weekdays(), &[Weekday::Tue, Weekday::Fri]);
    }

    #[test]
    fn test_game_city() {
        assert_eq!(Game::Primitiva.city(), City::Madrid);
        assert_eq!(Game::Euromillones.city().key(), "paris");
    }
}
