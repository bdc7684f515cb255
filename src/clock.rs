/// Time source and local time zone, injected wherever calendar dates matter.
use std::cell::Cell;
use std::rc::Rc;

use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone, Utc,
};

use crate::types::Timestamp;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Wall-clock reading of `instant` in this clock's time zone.
    fn local_datetime(&self, instant: DateTime<Utc>) -> NaiveDateTime;

    /// The instant local midnight begins on `date`.
    fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc>;

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local_datetime(instant).date()
    }

    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }

    fn now_millis(&self) -> Timestamp {
        self.now().timestamp_millis()
    }

    /// Local date of an epoch-millisecond timestamp, `None` if out of range.
    fn date_of(&self, timestamp: Timestamp) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(timestamp).map(|dt| self.local_date(dt))
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn local_datetime(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        (**self).local_datetime(instant)
    }

    fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        (**self).start_of_day(date)
    }
}

/// Wall clock in the host's time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_datetime(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&Local).naive_local()
    }

    fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        midnight_in(&Local, date)
    }
}

/// Clock with a fixed UTC offset. When pinned, `now()` always returns the
/// pinned instant until moved with [`OffsetClock::set_now`].
#[derive(Clone, Debug)]
pub struct OffsetClock {
    offset: FixedOffset,
    pinned: Cell<Option<DateTime<Utc>>>,
}

impl OffsetClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            pinned: Cell::new(None),
        }
    }

    pub fn from_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
    }

    pub fn pinned(offset: FixedOffset, now: DateTime<Utc>) -> Self {
        Self {
            offset,
            pinned: Cell::new(Some(now)),
        }
    }

    pub fn set_now(&self, now: DateTime<Utc>) {
        self.pinned.set(Some(now));
    }
}

impl Clock for OffsetClock {
    fn now(&self) -> DateTime<Utc> {
        self.pinned.get().unwrap_or_else(Utc::now)
    }

    fn local_datetime(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }

    fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        midnight_in(&self.offset, date)
    }
}

fn midnight_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Midnight skipped by a DST jump: the day starts at the first valid minute.
        LocalResult::None => (1..=180)
            .find_map(|minutes| {
                tz.from_local_datetime(&(midnight + TimeDelta::minutes(minutes)))
                    .earliest()
            })
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| midnight.and_utc()),
    }
}
