/// Runtime configuration resolved from flags and environment.
use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::cli::Cli;
use crate::clock::{Clock, OffsetClock, SystemClock};
use crate::db;

#[derive(Clone, Debug)]
pub struct Config {
    pub db_path: PathBuf,
    /// Overrides the host time zone when set.
    pub zone: Option<OffsetClock>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let zone = match cli.utc_offset {
            Some(minutes) => Some(
                OffsetClock::from_minutes(minutes)
                    .ok_or_else(|| anyhow!("UTC offset of {minutes} minutes is out of range"))?,
            ),
            None => None,
        };
        let db_path = cli.db.clone().unwrap_or_else(db::default_db_path);
        Ok(Self { db_path, zone })
    }

    pub fn clock(&self) -> Box<dyn Clock> {
        match &self.zone {
            Some(zone) => Box::new(zone.clone()),
            None => Box::new(SystemClock),
        }
    }
}
