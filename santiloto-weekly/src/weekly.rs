use chrono::{Datelike, Duration, NaiveDate, Weekday};
use santiloto_db::models::{EuroDraw, Game, PrimitivaDraw};
use serde::Serialize;

use crate::bets::{EuroBet, PrimitivaBet, build_euro_bets, build_primitiva_bets};
use crate::config::WeeklyConfig;
use crate::error::WeeklyError;
use crate::forecast::ForecastMap;
use crate::lunar::PhaseSource;
use crate::ranking::{EuroRanks, PrimitivaRanks, global_euro, global_primitiva, score_euro, score_primitiva};
use crate::scoring::TargetContext;

/// Histórico ya cargado y validado, más la fecha del último resultado guardado.
#[derive(Debug, Clone, Default)]
pub struct History {
    pub primitiva: Vec<PrimitivaDraw>,
    pub euromillones: Vec<EuroDraw>,
    pub last_primitiva: Option<NaiveDate>,
    pub last_euromillones: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyResult {
    pub primitiva_dates: Vec<NaiveDate>,
    pub euromillones_dates: Vec<NaiveDate>,
    pub primitiva_bets: Vec<(NaiveDate, PrimitivaBet)>,
    pub euromillones_bets: Vec<(NaiveDate, EuroBet)>,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub tol_primitiva: Option<f64>,
    pub tol_euromillones: Option<f64>,
    pub method_version: String,
}

/// En domingo la semana objetivo es el lunes..sábado siguiente; cualquier
/// otro día va de hoy al sábado de la semana en curso.
pub fn target_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = if today.weekday() == Weekday::Sun {
        today + Duration::days(1)
    } else {
        today
    };
    let to_saturday = 5 - start.weekday().num_days_from_monday() as i64;
    (start, start + Duration::days(to_saturday))
}

/// Fechas de sorteo de `game` dentro de la semana objetivo posteriores al
/// último resultado guardado.
pub fn pending_draw_dates(game: Game, today: NaiveDate, last_stored: Option<NaiveDate>) -> Vec<NaiveDate> {
    let (start, end) = target_week(today);
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| game.draw_weekdays().contains(&d.weekday()))
        .filter(|d| last_stored.is_none_or(|last| *d > last))
        .collect()
}

/// Un paso de la escalera de tolerancias.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Attempt {
    /// Ranking contextual con la fracción dada, completado con el global.
    Contextual { frac: f64 },
    /// Solo ranking global; se anota la fracción más ancha.
    GlobalOnly { recorded_frac: f64 },
}

impl Attempt {
    fn recorded_frac(&self) -> f64 {
        match *self {
            Attempt::Contextual { frac } => frac,
            Attempt::GlobalOnly { recorded_frac } => recorded_frac,
        }
    }
}

fn ladder(config: &WeeklyConfig) -> Vec<Attempt> {
    let mut attempts: Vec<Attempt> = config
        .tolerance_ladder
        .iter()
        .map(|&frac| Attempt::Contextual { frac })
        .collect();
    if let Some(recorded_frac) = config.widest_fraction() {
        attempts.push(Attempt::GlobalOnly { recorded_frac });
    }
    attempts
}

/// Lo que cambia entre juegos: tipo de sorteo, rankings y forma de apuesta.
trait GameStrategy {
    const GAME: Game;
    type Draw;
    type Ranks: Default;
    type Bet;

    fn score(history: &[Self::Draw], ctx: &TargetContext, frac: f64) -> Self::Ranks;
    fn global(history: &[Self::Draw]) -> Self::Ranks;
    fn build(ranks: &Self::Ranks, global: &Self::Ranks) -> Vec<Self::Bet>;
}

struct PrimitivaStrategy;

impl GameStrategy for PrimitivaStrategy {
    const GAME: Game = Game::Primitiva;
    type Draw = PrimitivaDraw;
    type Ranks = PrimitivaRanks;
    type Bet = PrimitivaBet;

    fn score(history: &[PrimitivaDraw], ctx: &TargetContext, frac: f64) -> PrimitivaRanks {
        score_primitiva(history, ctx, frac)
    }

    fn global(history: &[PrimitivaDraw]) -> PrimitivaRanks {
        global_primitiva(history)
    }

    fn build(ranks: &PrimitivaRanks, global: &PrimitivaRanks) -> Vec<PrimitivaBet> {
        build_primitiva_bets(ranks, global)
    }
}

struct EuroStrategy;

impl GameStrategy for EuroStrategy {
    const GAME: Game = Game::Euromillones;
    type Draw = EuroDraw;
    type Ranks = EuroRanks;
    type Bet = EuroBet;

    fn score(history: &[EuroDraw], ctx: &TargetContext, frac: f64) -> EuroRanks {
        score_euro(history, ctx, frac)
    }

    fn global(history: &[EuroDraw]) -> EuroRanks {
        global_euro(history)
    }

    fn build(ranks: &EuroRanks, global: &EuroRanks) -> Vec<EuroBet> {
        build_euro_bets(ranks, global)
    }
}

struct GameOutcome<B> {
    bets: Vec<(NaiveDate, B)>,
    tolerance: Option<f64>,
}

fn run_game<S: GameStrategy>(
    dates: &[NaiveDate],
    history: &[S::Draw],
    forecast: &ForecastMap,
    config: &WeeklyConfig,
    phase: &dyn PhaseSource,
) -> Result<GameOutcome<S::Bet>, WeeklyError> {
    let mut outcome = GameOutcome {
        bets: Vec::with_capacity(dates.len()),
        tolerance: None,
    };
    if dates.is_empty() {
        return Ok(outcome);
    }
    outcome.tolerance = config.tolerance_ladder.first().copied();

    let global = S::global(history);
    let attempts = ladder(config);
    let empty = S::Ranks::default();

    for &date in dates {
        let ctx = TargetContext::from_forecast(S::GAME, date, forecast, phase)?;
        log::debug!(
            "{} {}: T={:.2} RH={:.2} AH={:.2} bin={}",
            S::GAME, date, ctx.temp_c, ctx.rh_pct, ctx.abs_humidity, ctx.moon_bin
        );

        let mut retained = None;
        for attempt in &attempts {
            let bets = match *attempt {
                Attempt::Contextual { frac } => S::build(&S::score(history, &ctx, frac), &global),
                Attempt::GlobalOnly { .. } => {
                    log::warn!("{} {}: sin candidatos contextuales, usando ranking global", S::GAME, date);
                    S::build(&empty, &global)
                }
            };
            if let Some(first) = bets.into_iter().next() {
                retained = Some((first, attempt.recorded_frac()));
                break;
            }
        }

        match retained {
            Some((bet, frac)) => {
                log::info!("{} {}: apuesta generada con tolerancia {:.2}", S::GAME, date, frac);
                outcome.tolerance = Some(outcome.tolerance.map_or(frac, |t| t.max(frac)));
                outcome.bets.push((date, bet));
            }
            None => log::warn!("{} {}: histórico insuficiente, sin apuesta", S::GAME, date),
        }
    }
    Ok(outcome)
}

/// Calcula una apuesta por cada fecha de sorteo pendiente de la semana objetivo.
///
/// `madrid` alimenta Primitiva y `paris` Euromillones. Una fecha pendiente sin
/// previsión aborta el cálculo completo; un histórico demasiado corto para
/// llenar una apuesta sólo deja esa fecha sin ella.
pub fn compute_weekly(
    today: NaiveDate,
    history: &History,
    madrid: &ForecastMap,
    paris: &ForecastMap,
    config: &WeeklyConfig,
    phase: &dyn PhaseSource,
) -> Result<WeeklyResult, WeeklyError> {
    let (week_start, week_end) = target_week(today);
    let primitiva_dates = pending_draw_dates(Game::Primitiva, today, history.last_primitiva);
    let euromillones_dates = pending_draw_dates(Game::Euromillones, today, history.last_euromillones);
    log::info!("Semana {} → {}", week_start, week_end);
    log::info!("Pendientes Primitiva: {:?}", primitiva_dates);
    log::info!("Pendientes Euromillones: {:?}", euromillones_dates);

    let primitiva = run_game::<PrimitivaStrategy>(&primitiva_dates, &history.primitiva, madrid, config, phase)?;
    let euromillones = run_game::<EuroStrategy>(&euromillones_dates, &history.euromillones, paris, config, phase)?;

    Ok(WeeklyResult {
        primitiva_dates,
        euromillones_dates,
        primitiva_bets: primitiva.bets,
        euromillones_bets: euromillones.bets,
        week_start,
        week_end,
        tol_primitiva: primitiva.tolerance,
        tol_euromillones: euromillones.tolerance,
        method_version: config.method_version.clone(),
    })
}
