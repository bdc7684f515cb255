/// The application state container: ledger + settings, persisted on every
/// mutation, with observers notified after each change.
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::history;
use crate::ledger::Ledger;
use crate::persistence::{self, STORAGE_KEY, Snapshot, SnapshotStorage};
use crate::types::{
    DayGroup, Drink, DrinkId, DrinkType, Millilitres, Period, ReminderInterval, Settings, Unit,
    clamp_goal,
};
use crate::units;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    DrinkAdded(Drink),
    DrinkRemoved(DrinkId),
    TodayReset { removed: usize },
    GoalChanged(Millilitres),
    UnitChanged(Unit),
    RemindersChanged,
}

impl StoreEvent {
    /// Whether the reminder schedule has to be regenerated.
    pub fn affects_reminders(&self) -> bool {
        matches!(self, StoreEvent::RemindersChanged)
    }
}

pub type Observer = Box<dyn Fn(&StoreEvent)>;

pub struct HydrateStore<S: SnapshotStorage> {
    ledger: Ledger,
    settings: Settings,
    last_date: NaiveDate,
    clock: Box<dyn Clock>,
    storage: S,
    observers: Vec<Observer>,
}

impl<S: SnapshotStorage> HydrateStore<S> {
    /// Load the persisted snapshot once. Missing or unreadable data falls back
    /// to defaults; the defaults (or a migrated snapshot) are written back.
    pub fn load(storage: S, clock: Box<dyn Clock>) -> Self {
        let (snapshot, write_back) = match storage.load(STORAGE_KEY) {
            Ok(Some(json)) => match persistence::decode(&json) {
                Ok((snapshot, migrated)) => {
                    debug!(drinks = snapshot.ledger.len(), "Loaded stored state");
                    (snapshot, migrated)
                }
                Err(err) => {
                    warn!(error = %err, "Stored state unreadable, starting from defaults");
                    (Snapshot::default(), false)
                }
            },
            Ok(None) => {
                info!("No stored state, creating defaults");
                (Snapshot::default(), true)
            }
            Err(err) => {
                warn!(error = %err, "Unable to read stored state, starting from defaults");
                (Snapshot::default(), false)
            }
        };

        let last_date = snapshot.last_date.unwrap_or_else(|| clock.today());
        let mut store = Self {
            ledger: snapshot.ledger,
            settings: snapshot.settings,
            last_date,
            clock,
            storage,
            observers: Vec::new(),
        };
        if write_back {
            store.persist();
        }
        store
    }

    pub fn subscribe(&mut self, observer: impl Fn(&StoreEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn add_drink(&mut self, drink_type: DrinkType, amount: Millilitres) -> Option<Drink> {
        let drink = self
            .ledger
            .add_drink(drink_type, amount, self.clock.as_ref())?
            .clone();
        info!(id = %drink.id, %drink_type, amount, "Drink added");
        self.last_date = self.clock.today();
        self.commit(StoreEvent::DrinkAdded(drink.clone()));
        Some(drink)
    }

    pub fn remove_drink(&mut self, id: &str) -> bool {
        if !self.ledger.remove_drink(id) {
            debug!(id, "No drink with this id");
            return false;
        }
        info!(id, "Drink removed");
        self.commit(StoreEvent::DrinkRemoved(id.to_string()));
        true
    }

    /// Clear today's drinks; earlier days are kept.
    pub fn reset(&mut self) -> usize {
        let removed = self.ledger.reset(self.clock.as_ref());
        info!(removed, "Reset today's drinks");
        self.last_date = self.clock.today();
        self.commit(StoreEvent::TodayReset { removed });
        removed
    }

    pub fn set_unit(&mut self, unit: Unit) {
        self.settings.unit = unit;
        self.commit(StoreEvent::UnitChanged(unit));
    }

    /// Stores the goal clamped to 2000..=4000 ml and returns what was stored.
    pub fn set_daily_goal(&mut self, goal: i64) -> Millilitres {
        let clamped = clamp_goal(goal);
        if i64::from(clamped) != goal {
            debug!(requested = goal, clamped, "Daily goal clamped");
        }
        self.settings.daily_goal = clamped;
        self.commit(StoreEvent::GoalChanged(clamped));
        clamped
    }

    pub fn set_reminders_enabled(&mut self, enabled: bool) {
        self.settings.reminders_enabled = enabled;
        self.commit(StoreEvent::RemindersChanged);
    }

    pub fn set_reminder_start_time(&mut self, time: impl Into<String>) {
        self.settings.reminder_start_time = time.into();
        self.commit(StoreEvent::RemindersChanged);
    }

    pub fn set_reminder_end_time(&mut self, time: impl Into<String>) {
        self.settings.reminder_end_time = time.into();
        self.commit(StoreEvent::RemindersChanged);
    }

    pub fn set_reminder_interval(&mut self, interval: ReminderInterval) {
        self.settings.reminder_interval = interval;
        self.commit(StoreEvent::RemindersChanged);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn today_drinks(&self) -> Vec<&Drink> {
        self.ledger.today_drinks(self.clock.as_ref()).collect()
    }

    pub fn total_ml(&self) -> Millilitres {
        self.ledger.total_ml(self.clock.as_ref())
    }

    pub fn percentage(&self) -> f64 {
        self.ledger
            .percentage(self.settings.daily_goal, self.clock.as_ref())
    }

    pub fn history(&self, period: Period) -> Vec<DayGroup> {
        let clock = self.clock.as_ref();
        let drinks = history::filter_by_period(self.ledger.drinks(), period, clock);
        history::group_by_date(drinks, clock)
    }

    pub fn format_amount(&self, ml: Millilitres) -> String {
        units::format_amount(ml, self.settings.unit)
    }

    pub fn format_goal(&self) -> String {
        units::format_goal(self.settings.daily_goal, self.settings.unit)
    }

    fn commit(&mut self, event: StoreEvent) {
        self.persist();
        for observer in &self.observers {
            observer(&event);
        }
    }

    /// Failures are logged only; the in-memory state stays authoritative.
    fn persist(&mut self) {
        let snapshot = Snapshot {
            ledger: self.ledger.clone(),
            settings: self.settings.clone(),
            last_date: Some(self.last_date),
        };
        let result = persistence::encode(&snapshot)
            .and_then(|json| self.storage.save(STORAGE_KEY, &json));
        if let Err(err) = result {
            warn!(error = %err, "Failed to persist state");
        }
    }
}
