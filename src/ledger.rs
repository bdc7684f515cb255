/// The drink ledger: append, delete by id, and today's derived totals.
use std::collections::HashSet;

use chrono::DateTime;
use rand::RngExt;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::types::{Drink, DrinkId, DrinkType, Millilitres, Timestamp};

const ID_SUFFIX_LEN: u32 = 8;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    drinks: Vec<Drink>,
}

impl Ledger {
    /// Rebuild a ledger from stored records. Records with a zero amount, an
    /// unrepresentable timestamp or an id seen earlier are dropped.
    pub fn from_records(records: Vec<Drink>) -> Self {
        let mut seen = HashSet::new();
        let mut drinks = Vec::with_capacity(records.len());
        for drink in records {
            if drink.amount == 0 {
                warn!(id = %drink.id, "Dropping stored drink with zero amount");
                continue;
            }
            if DateTime::from_timestamp_millis(drink.timestamp).is_none() {
                warn!(id = %drink.id, timestamp = drink.timestamp, "Dropping stored drink with invalid timestamp");
                continue;
            }
            if !seen.insert(drink.id.clone()) {
                warn!(id = %drink.id, "Dropping stored drink with duplicate id");
                continue;
            }
            drinks.push(drink);
        }
        Self { drinks }
    }

    pub fn drinks(&self) -> &[Drink] {
        &self.drinks
    }

    pub fn len(&self) -> usize {
        self.drinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drinks.is_empty()
    }

    /// Log a drink now. A zero amount is ignored and yields `None`.
    pub fn add_drink(
        &mut self,
        drink_type: DrinkType,
        amount: Millilitres,
        clock: &dyn Clock,
    ) -> Option<&Drink> {
        if amount == 0 {
            debug!(%drink_type, "Ignoring drink with zero amount");
            return None;
        }
        let timestamp = clock.now_millis();
        let mut id = generate_id(timestamp);
        while self.contains(&id) {
            id = generate_id(timestamp);
        }
        self.drinks.push(Drink {
            id,
            drink_type,
            amount,
            timestamp,
        });
        self.drinks.last()
    }

    /// Returns whether a drink was removed; unknown ids are not an error.
    pub fn remove_drink(&mut self, id: &str) -> bool {
        let before = self.drinks.len();
        self.drinks.retain(|drink| drink.id != id);
        before != self.drinks.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.drinks.iter().any(|drink| drink.id == id)
    }

    /// Drinks whose local date is today. Re-evaluated on every call.
    pub fn today_drinks<'a>(&'a self, clock: &'a dyn Clock) -> impl Iterator<Item = &'a Drink> + 'a {
        let today = clock.today();
        self.drinks
            .iter()
            .filter(move |drink| clock.date_of(drink.timestamp) == Some(today))
    }

    /// Saturates at `Millilitres::MAX` instead of overflowing.
    pub fn total_ml(&self, clock: &dyn Clock) -> Millilitres {
        sum_amounts(self.today_drinks(clock))
    }

    /// Progress toward `goal`, capped at 100.
    pub fn percentage(&self, goal: Millilitres, clock: &dyn Clock) -> f64 {
        let total = f64::from(self.total_ml(clock));
        (total / f64::from(goal.max(1)) * 100.0).min(100.0)
    }

    /// Remove today's drinks only; earlier days stay. Returns how many went.
    pub fn reset(&mut self, clock: &dyn Clock) -> usize {
        let today = clock.today();
        let before = self.drinks.len();
        self.drinks
            .retain(|drink| clock.date_of(drink.timestamp) != Some(today));
        before - self.drinks.len()
    }

    pub fn latest(&self) -> Option<&Drink> {
        self.drinks.iter().max_by_key(|drink| drink.timestamp)
    }
}

pub fn sum_amounts<'a>(drinks: impl IntoIterator<Item = &'a Drink>) -> Millilitres {
    drinks
        .into_iter()
        .fold(0, |total: Millilitres, drink| total.saturating_add(drink.amount))
}

/// Base-36 timestamp followed by a random base-36 suffix.
pub fn generate_id(timestamp: Timestamp) -> DrinkId {
    let mut rng = rand::rng();
    let suffix = rng.random_range(0..36u64.pow(ID_SUFFIX_LEN));
    let mut id = to_base36(timestamp.max(0) as u64);
    let suffix = to_base36(suffix);
    for _ in suffix.len()..ID_SUFFIX_LEN as usize {
        id.push('0');
    }
    id.push_str(&suffix);
    id
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
