/// Typed errors for user-supplied values.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HydrateError {
    #[error("unknown drink type '{0}' (expected water, coffee, tea or juice)")]
    UnknownDrinkType(String),
    #[error("unknown unit '{0}' (expected ml or oz)")]
    UnknownUnit(String),
    #[error("unknown period '{0}' (expected today, week or month)")]
    UnknownPeriod(String),
    #[error("reminder interval must be 1, 2, 3 or 4 hours, got {0}")]
    InvalidInterval(i64),
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
}
