mod display;
mod import;
mod persist;
mod quarters;
mod report;
mod weekly;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};

use crate::display::{
    display_euro, display_import_summary, display_moon, display_primitiva, display_quarters_euro,
    display_quarters_primitiva, display_saved,
};
use crate::report::WeeklyResponseV1;
use santiloto_db::db::{count_draws, db_path, fetch_last_euro, fetch_last_primitiva, migrate, open_db};
use santiloto_db::models::Game;
use santiloto_db::rusqlite::Connection;
use santiloto_weekly::format::format_weekly;
use santiloto_weekly::lunar::{AstronomicalPhase, PhaseSource};
use santiloto_weekly::quarters::QUARTER_LINES;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GameArg {
    Primitiva,
    Euromillones,
}

impl From<GameArg> for Game {
    fn from(arg: GameArg) -> Self {
        match arg {
            GameArg::Primitiva => Game::Primitiva,
            GameArg::Euromillones => Game::Euromillones,
        }
    }
}

#[derive(Parser)]
#[command(name = "santiloto", about = "Ranking semanal de Primitiva y Euromillones por meteorología y fase lunar")]
struct Cli {
    /// Ruta de la base SQLite (por defecto data/santiloto.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importar sorteos y condiciones desde un CSV separado por ';'
    Import {
        #[arg(short, long)]
        game: GameArg,

        /// Ruta del fichero CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Mostrar la ruta de la base de datos
    DbPath,

    /// Listar los últimos sorteos
    List {
        #[arg(short, long)]
        game: GameArg,

        /// Número de sorteos a mostrar
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Calcular las apuestas de la semana
    Weekly {
        /// Fecha de referencia (AAAA-MM-DD); por defecto hoy
        #[arg(long, env = "SANTILOTO_TODAY")]
        today: Option<NaiveDate>,

        /// Directorio con madrid.json y paris.json (previsión horaria)
        #[arg(long, default_value = "data/forecast")]
        forecast_dir: PathBuf,

        /// Configuración JSON (escalera de tolerancias, ventana horaria)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Salida JSON versionada en lugar de texto
        #[arg(long)]
        json: bool,

        /// Guardar las apuestas en la base
        #[arg(long)]
        save: bool,
    },

    /// Combinaciones más frecuentes por cuarto lunar para los sorteos pendientes
    Quarters {
        /// Fecha de referencia (AAAA-MM-DD); por defecto hoy
        #[arg(long, env = "SANTILOTO_TODAY")]
        today: Option<NaiveDate>,

        /// Combinaciones por sorteo
        #[arg(short, long, default_value_t = QUARTER_LINES)]
        top: usize,
    },

    /// Fase lunar de una fecha
    Moon {
        /// Fecha (AAAA-MM-DD); por defecto hoy
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let path = cli.db.unwrap_or_else(db_path);

    match cli.command {
        Command::Import { game, file } => cmd_import(&connect(&path)?, game.into(), &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { game, last } => cmd_list(&connect(&path)?, game.into(), last),
        Command::Weekly { today: date, forecast_dir, config, json, save } => cmd_weekly(
            &connect(&path)?,
            date.unwrap_or_else(today),
            &forecast_dir,
            config.as_deref(),
            json,
            save,
        ),
        Command::Quarters { today: date, top } => cmd_quarters(&connect(&path)?, date.unwrap_or_else(today), top),
        Command::Moon { date } => {
            let date = date.unwrap_or_else(today);
            display_moon(date, AstronomicalPhase.phase_value(date));
            Ok(())
        }
    }
}

fn connect(path: &Path) -> Result<Connection> {
    let conn = open_db(path)?;
    migrate(&conn)?;
    Ok(conn)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn cmd_import(conn: &Connection, game: Game, file: &Path) -> Result<()> {
    let result = import::import_csv(conn, game, file, &AstronomicalPhase)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, game: Game, last: u32) -> Result<()> {
    if count_draws(conn, game)? == 0 {
        println!("Base vacía. Ejecute primero: santiloto import --game {} --file <csv>", game.label().to_lowercase());
        return Ok(());
    }
    match game {
        Game::Primitiva => display_primitiva(&fetch_last_primitiva(conn, last)?),
        Game::Euromillones => display_euro(&fetch_last_euro(conn, last)?),
    }
    Ok(())
}

fn cmd_quarters(conn: &Connection, today: NaiveDate, top: usize) -> Result<()> {
    let report = quarters::run_quarters(conn, today, top, &AstronomicalPhase)?;
    display_quarters_primitiva(&report.primitiva);
    display_quarters_euro(&report.euromillones);
    Ok(())
}

fn cmd_weekly(
    conn: &Connection,
    today: NaiveDate,
    forecast_dir: &Path,
    config: Option<&Path>,
    json: bool,
    save: bool,
) -> Result<()> {
    let config = weekly::load_config(config)?;
    let result = weekly::run_weekly(conn, today, forecast_dir, &config, &AstronomicalPhase)?;

    if json {
        let response = WeeklyResponseV1::new(&result, Utc::now());
        let out = serde_json::to_string_pretty(&response).context("No se pudo serializar el resultado")?;
        println!("{out}");
    } else {
        println!("{}", format_weekly(&result));
    }

    if save {
        let written = persist::save_weekly(conn, &result)?;
        if json {
            log::info!("{} apuestas guardadas", written);
        } else {
            display_saved(result.primitiva_bets.len(), result.euromillones_bets.len());
        }
    }
    Ok(())
}
