/// History views: period filters, per-day grouping and display labels.
use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Timelike};

use crate::clock::Clock;
use crate::ledger::sum_amounts;
use crate::types::{DayGroup, Drink, Period, Timestamp};

/// Inclusive lower bound for `period`, as epoch milliseconds.
///
/// Week goes back a fixed seven days while month goes back one calendar
/// month. A day that does not exist in the previous month rolls over into
/// the following one (March 31st -> March 2nd in a leap year).
pub fn period_start(period: Period, clock: &dyn Clock) -> Timestamp {
    let today = clock.today();
    let first_day = match period {
        Period::Today => Some(today),
        Period::Week => today.checked_sub_days(Days::new(7)),
        Period::Month => month_before(today),
    }
    .unwrap_or(NaiveDate::MIN);
    clock.start_of_day(first_day).timestamp_millis()
}

fn month_before(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_sub_months(Months::new(1))?
        .checked_add_days(Days::new(u64::from(date.day0())))
}

/// Drinks at or after the period's start. There is no upper bound.
pub fn filter_by_period<'a>(drinks: &'a [Drink], period: Period, clock: &dyn Clock) -> Vec<&'a Drink> {
    let start = period_start(period, clock);
    drinks
        .iter()
        .filter(|drink| drink.timestamp >= start)
        .collect()
}

/// Bucket drinks by local date, newest day first and newest drink first
/// within each day. Drinks with equal timestamps keep their input order.
pub fn group_by_date<'a, I>(drinks: I, clock: &dyn Clock) -> Vec<DayGroup>
where
    I: IntoIterator<Item = &'a Drink>,
{
    let mut buckets: BTreeMap<NaiveDate, Vec<Drink>> = BTreeMap::new();
    for drink in drinks {
        if let Some(date) = clock.date_of(drink.timestamp) {
            buckets.entry(date).or_default().push(drink.clone());
        }
    }

    buckets
        .into_iter()
        .rev()
        .map(|(date, mut drinks)| {
            drinks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            let total = sum_amounts(&drinks);
            DayGroup {
                date,
                drinks,
                total,
            }
        })
        .collect()
}

pub fn date_header(date: NaiveDate, clock: &dyn Clock) -> String {
    let today = clock.today();
    if date == today {
        return "Today".to_string();
    }
    if today.pred_opt() == Some(date) {
        return "Yesterday".to_string();
    }
    date.format("%b %-d, %Y").to_string()
}

/// 12-hour local time, e.g. "9:05 AM".
pub fn format_clock_time(timestamp: Timestamp, clock: &dyn Clock) -> String {
    let Some(instant) = DateTime::from_timestamp_millis(timestamp) else {
        return "--:--".to_string();
    };
    let local = clock.local_datetime(instant);
    let (pm, hour) = local.hour12();
    format!(
        "{}:{:02} {}",
        hour,
        local.minute(),
        if pm { "PM" } else { "AM" }
    )
}
