/// Daily reminder schedule: hour generation and the cancel-then-schedule
/// state machine in front of a notification dispatcher.
use anyhow::Result;
use rand::RngExt;
use tracing::{debug, info, warn};

use crate::types::{ReminderInterval, Settings};

/// Upper bound on triggers generated for one day.
pub const MAX_TRIGGERS: usize = 24;

const MESSAGES: &[(&str, &str)] = &[
    (
        "Time to hydrate!",
        "Don't forget to drink water and stay healthy.",
    ),
    ("Water break!", "Stay hydrated, stay healthy."),
    ("Drink some water!", "Your body needs hydration."),
    (
        "Hydration reminder",
        "Time for a refreshing glass of water.",
    ),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub sound: bool,
}

/// Fires every day at `hour:minute` local time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailyTrigger {
    pub hour: u32,
    pub minute: u32,
    pub notification: Notification,
}

/// The OS-facing side of reminders.
pub trait NotificationDispatcher {
    fn cancel_all(&mut self) -> Result<()>;
    fn schedule_daily(&mut self, trigger: &DailyTrigger) -> Result<()>;
    fn scheduled(&self) -> Result<Vec<DailyTrigger>>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ReminderState {
    #[default]
    Disabled,
    /// Hours that currently have a trigger; may be empty.
    Scheduled(Vec<u32>),
}

/// Pick one of the fixed message templates at random.
pub fn random_message() -> Notification {
    let mut rng = rand::rng();
    let (title, body) = MESSAGES[rng.random_range(0..MESSAGES.len())];
    Notification {
        title: title.to_string(),
        body: body.to_string(),
        sound: true,
    }
}

/// Hour component of an "HH:MM" string. Minutes are not inspected.
pub fn parse_hour(time: &str) -> Option<u32> {
    time.split(':')
        .next()?
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|hour| *hour < 24)
}

/// Hours from `start` to `end` inclusive, stepping by `interval`.
///
/// Returns an empty list when the interval is outside 1..=4, either hour is
/// unparsable, or the start hour is after the end hour. Windows that wrap
/// past midnight are not supported.
pub fn generate_hours(start: &str, end: &str, interval: i64) -> Vec<u32> {
    let Ok(interval) = ReminderInterval::try_from(interval) else {
        warn!(interval, "Invalid reminder interval");
        return Vec::new();
    };
    let (Some(start_hour), Some(end_hour)) = (parse_hour(start), parse_hour(end)) else {
        warn!(start, end, "Invalid reminder time format");
        return Vec::new();
    };
    if start_hour > end_hour {
        warn!(start_hour, end_hour, "Reminder start must not be after end");
        return Vec::new();
    }

    let mut hours = Vec::new();
    let mut hour = start_hour;
    while hour <= end_hour && hours.len() < MAX_TRIGGERS {
        hours.push(hour);
        hour += interval.hours();
    }
    hours
}

/// Keeps the dispatcher's triggers in line with the reminder settings.
pub struct ReminderScheduler<D: NotificationDispatcher> {
    dispatcher: D,
    state: ReminderState,
}

impl<D: NotificationDispatcher> ReminderScheduler<D> {
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher,
            state: ReminderState::Disabled,
        }
    }

    pub fn state(&self) -> &ReminderState {
        &self.state
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Replace every scheduled trigger according to `settings`.
    ///
    /// All existing triggers are cancelled before anything new is created.
    pub fn sync(&mut self, settings: &Settings) -> Result<&ReminderState> {
        self.dispatcher.cancel_all()?;
        debug!("Cancelled all scheduled reminders");

        if !settings.reminders_enabled {
            info!("Reminders disabled");
            self.state = ReminderState::Disabled;
            return Ok(&self.state);
        }

        let hours = generate_hours(
            &settings.reminder_start_time,
            &settings.reminder_end_time,
            i64::from(settings.reminder_interval.hours()),
        );
        if hours.is_empty() {
            info!("No reminders to schedule");
        }
        for &hour in &hours {
            let trigger = DailyTrigger {
                hour,
                minute: 0,
                notification: random_message(),
            };
            self.dispatcher.schedule_daily(&trigger)?;
            debug!(hour, title = %trigger.notification.title, "Scheduled reminder");
        }
        info!(count = hours.len(), "Scheduled daily reminders");

        self.state = ReminderState::Scheduled(hours);
        Ok(&self.state)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        CancelAll,
        Schedule(u32),
    }

    #[derive(Default)]
    pub(crate) struct RecordingDispatcher {
        pub calls: Vec<Call>,
        pub triggers: Vec<DailyTrigger>,
    }

    impl NotificationDispatcher for RecordingDispatcher {
        fn cancel_all(&mut self) -> Result<()> {
            self.calls.push(Call::CancelAll);
            self.triggers.clear();
            Ok(())
        }

        fn schedule_daily(&mut self, trigger: &DailyTrigger) -> Result<()> {
            self.calls.push(Call::Schedule(trigger.hour));
            self.triggers.push(trigger.clone());
            Ok(())
        }

        fn scheduled(&self) -> Result<Vec<DailyTrigger>> {
            Ok(self.triggers.clone())
        }
    }

    fn settings(start: &str, end: &str, interval: i64, enabled: bool) -> Settings {
        Settings {
            reminders_enabled: enabled,
            reminder_start_time: start.to_string(),
            reminder_end_time: end.to_string(),
            reminder_interval: ReminderInterval::try_from(interval).unwrap(),
            ..Settings::default()
        }
    }

    #[test]
    fn every_three_hours_from_eight_to_twenty() {
        assert_eq!(generate_hours("08:00", "20:00", 3), vec![8, 11, 14, 17, 20]);
    }

    #[test]
    fn start_after_end_yields_nothing() {
        assert!(generate_hours("09:00", "08:00", 1).is_empty());
        assert!(generate_hours("22:00", "06:00", 2).is_empty());
    }

    #[test]
    fn invalid_interval_or_time_yields_nothing() {
        assert!(generate_hours("08:00", "20:00", 0).is_empty());
        assert!(generate_hours("08:00", "20:00", 5).is_empty());
        assert!(generate_hours("eight", "20:00", 2).is_empty());
        assert!(generate_hours("08:00", "", 2).is_empty());
    }

    #[test]
    fn minutes_are_ignored() {
        assert_eq!(generate_hours("08:45", "10:59", 1), vec![8, 9, 10]);
        assert_eq!(parse_hour("7"), Some(7));
        assert_eq!(parse_hour("24:00"), None);
    }

    #[test]
    fn single_hour_window() {
        assert_eq!(generate_hours("12:00", "12:30", 4), vec![12]);
    }

    #[test]
    fn full_day_never_exceeds_cap() {
        let hours = generate_hours("00:00", "23:00", 1);
        assert_eq!(hours.len(), MAX_TRIGGERS);
        assert_eq!(hours.last(), Some(&23));
    }

    #[test]
    fn sync_cancels_before_scheduling() {
        let mut scheduler = ReminderScheduler::new(RecordingDispatcher::default());
        scheduler.sync(&settings("08:00", "12:00", 2, true)).unwrap();
        scheduler.sync(&settings("09:00", "11:00", 1, true)).unwrap();

        assert_eq!(
            scheduler.dispatcher().calls,
            vec![
                Call::CancelAll,
                Call::Schedule(8),
                Call::Schedule(10),
                Call::Schedule(12),
                Call::CancelAll,
                Call::Schedule(9),
                Call::Schedule(10),
                Call::Schedule(11),
            ]
        );
        let hours: Vec<_> = scheduler.dispatcher().triggers.iter().map(|t| t.hour).collect();
        assert_eq!(hours, vec![9, 10, 11]);
        assert_eq!(scheduler.state(), &ReminderState::Scheduled(vec![9, 10, 11]));
    }

    #[test]
    fn disabling_clears_everything() {
        let mut scheduler = ReminderScheduler::new(RecordingDispatcher::default());
        scheduler.sync(&settings("08:00", "20:00", 4, true)).unwrap();
        let state = scheduler.sync(&settings("08:00", "20:00", 4, false)).unwrap();

        assert_eq!(state, &ReminderState::Disabled);
        assert!(scheduler.dispatcher().triggers.is_empty());
    }

    #[test]
    fn invalid_window_leaves_no_stale_triggers() {
        let mut scheduler = ReminderScheduler::new(RecordingDispatcher::default());
        scheduler.sync(&settings("08:00", "20:00", 2, true)).unwrap();
        let state = scheduler.sync(&settings("21:00", "07:00", 2, true)).unwrap();

        assert_eq!(state, &ReminderState::Scheduled(Vec::new()));
        assert!(scheduler.dispatcher().triggers.is_empty());
    }

    #[test]
    fn triggers_fire_on_the_hour_with_a_known_message() {
        let mut scheduler = ReminderScheduler::new(RecordingDispatcher::default());
        scheduler.sync(&settings("08:00", "10:00", 1, true)).unwrap();
        for trigger in &scheduler.dispatcher().triggers {
            assert_eq!(trigger.minute, 0);
            assert!(trigger.notification.sound);
            assert!(
                MESSAGES
                    .iter()
                    .any(|(title, body)| *title == trigger.notification.title
                        && *body == trigger.notification.body)
            );
        }
    }
}
