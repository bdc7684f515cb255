/// JSON snapshot of the store and the key-value storage it is written to.
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ledger::Ledger;
use crate::types::{
    DEFAULT_DAILY_GOAL, Drink, ReminderInterval, Settings, Unit, clamp_goal,
};

/// Namespace the snapshot is stored under.
pub const STORAGE_KEY: &str = "hydrate-storage";
pub const SCHEMA_VERSION: u32 = 1;

/// Device key-value storage.
pub trait SnapshotStorage {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Everything that survives a restart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub ledger: Ledger,
    pub settings: Settings,
    pub last_date: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    // Decoded one by one so a single bad record doesn't discard the history.
    #[serde(default)]
    drinks: Vec<serde_json::Value>,
    #[serde(default = "default_goal")]
    daily_goal: i64,
    #[serde(default)]
    last_date: Option<NaiveDate>,
    #[serde(default)]
    unit: Unit,
    #[serde(default)]
    reminders_enabled: bool,
    #[serde(default = "default_start_time")]
    reminder_start_time: String,
    #[serde(default = "default_end_time")]
    reminder_end_time: String,
    #[serde(default = "default_interval")]
    reminder_interval: i64,
}

fn default_goal() -> i64 {
    i64::from(DEFAULT_DAILY_GOAL)
}

fn default_start_time() -> String {
    Settings::default().reminder_start_time
}

fn default_end_time() -> String {
    Settings::default().reminder_end_time
}

fn default_interval() -> i64 {
    i64::from(ReminderInterval::default().hours())
}

pub fn encode(snapshot: &Snapshot) -> Result<String> {
    let settings = &snapshot.settings;
    let drinks = snapshot
        .ledger
        .drinks()
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    let envelope = Envelope {
        state: PersistedState {
            drinks,
            daily_goal: i64::from(settings.daily_goal),
            last_date: snapshot.last_date,
            unit: settings.unit,
            reminders_enabled: settings.reminders_enabled,
            reminder_start_time: settings.reminder_start_time.clone(),
            reminder_end_time: settings.reminder_end_time.clone(),
            reminder_interval: i64::from(settings.reminder_interval.hours()),
        },
        version: SCHEMA_VERSION,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a stored snapshot, repairing legacy values on the way in.
/// The flag reports whether anything had to be repaired.
pub fn decode(json: &str) -> Result<(Snapshot, bool)> {
    let mut envelope: Envelope =
        serde_json::from_str(json).context("Stored snapshot is not valid JSON")?;
    let migrated = migrate(&mut envelope.state, envelope.version);
    let state = envelope.state;

    let mut records = Vec::with_capacity(state.drinks.len());
    for value in state.drinks {
        match serde_json::from_value::<Drink>(value) {
            Ok(drink) => records.push(drink),
            Err(err) => warn!(error = %err, "Skipping unreadable stored drink"),
        }
    }

    let reminder_interval = ReminderInterval::try_from(state.reminder_interval)
        .context("Reminder interval out of range after migration")?;
    let settings = Settings {
        daily_goal: clamp_goal(state.daily_goal),
        unit: state.unit,
        reminders_enabled: state.reminders_enabled,
        reminder_start_time: state.reminder_start_time,
        reminder_end_time: state.reminder_end_time,
        reminder_interval,
    };

    Ok((
        Snapshot {
            ledger: Ledger::from_records(records),
            settings,
            last_date: state.last_date,
        },
        migrated,
    ))
}

fn migrate(state: &mut PersistedState, version: u32) -> bool {
    let mut migrated = false;
    if !(ReminderInterval::MIN..=ReminderInterval::MAX).contains(&state.reminder_interval) {
        info!(
            version,
            stored = state.reminder_interval,
            "Resetting invalid reminder interval to default"
        );
        state.reminder_interval = default_interval();
        migrated = true;
    }
    let clamped = i64::from(clamp_goal(state.daily_goal));
    if clamped != state.daily_goal {
        info!(version, stored = state.daily_goal, clamped, "Clamping stored daily goal");
        state.daily_goal = clamped;
        migrated = true;
    }
    migrated
}
