pub mod atmosphere;
pub mod bets;
pub mod config;
pub mod error;
pub mod forecast;
pub mod format;
pub mod lunar;
pub mod quarters;
pub mod ranking;
pub mod scoring;
pub mod select;
pub mod weekly;

#[cfg(test)]
mod testutil;

pub use error::WeeklyError;
pub use weekly::{History, WeeklyResult, compute_weekly};
