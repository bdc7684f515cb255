/// CLI argument parsing and command handling.
use std::cell::Cell;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::error::HydrateError;
use crate::history::{date_header, format_clock_time};
use crate::persistence::SnapshotStorage;
use crate::reminders::{self, NotificationDispatcher, ReminderScheduler, ReminderState};
use crate::store::HydrateStore;
use crate::types::{DrinkType, Millilitres, Period, ReminderInterval, Unit};
use crate::units;

/// Amount logged when `add` is given no amount.
pub const DEFAULT_AMOUNT_ML: Millilitres = 250;

#[derive(Parser)]
#[command(
    name = "hydrate",
    version,
    about = "Hydrate - A terminal-based hydration tracker"
)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, env = "HYDRATE_DB", global = true)]
    pub db: Option<PathBuf>,
    /// Use a fixed UTC offset in minutes instead of the system time zone
    #[arg(long, env = "HYDRATE_UTC_OFFSET", global = true, allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log a drink
    Add {
        drink_type: DrinkType,
        /// Defaults to 250 ml
        amount: Option<f64>,
        /// Unit of AMOUNT; also becomes the display unit
        #[arg(short = 'u', long = "unit")]
        unit: Option<Unit>,
    },
    /// Delete a logged drink by id
    Remove { id: String },
    /// Today's progress
    Status,
    History {
        #[arg(short = 'p', long = "period", default_value = "today")]
        period: Period,
    },
    /// Clear today's drinks
    Reset,
    /// Set the daily goal in ml (2000-4000)
    Goal { ml: i64 },
    Unit { unit: Unit },
    Reminders {
        #[command(subcommand)]
        command: ReminderCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ReminderCommand {
    On,
    Off,
    /// Set the reminder window, e.g. `window 08:00 20:00`
    Window { start: String, end: String },
    /// Hours between reminders (1-4)
    Interval { hours: i64 },
    List,
    /// Show a sample reminder now
    Test,
}

/// Execute a CLI command against the store, resyncing reminders when their
/// settings changed.
pub fn run<S, D>(
    command: Command,
    store: &mut HydrateStore<S>,
    scheduler: &mut ReminderScheduler<D>,
) -> Result<()>
where
    S: SnapshotStorage,
    D: NotificationDispatcher,
{
    let reminders_dirty = Rc::new(Cell::new(false));
    let flag = reminders_dirty.clone();
    store.subscribe(move |event| {
        if event.affects_reminders() {
            flag.set(true);
        }
    });

    match command {
        Command::Add {
            drink_type,
            amount,
            unit,
        } => handle_add(drink_type, amount, unit, store),
        Command::Remove { id } => handle_remove(&id, store),
        Command::Status => print!("{}", render_status(store)),
        Command::History { period } => print!("{}", render_history(store, period)),
        Command::Reset => {
            let removed = store.reset();
            println!("Removed {removed} drink(s) logged today.");
        }
        Command::Goal { ml } => {
            let stored = store.set_daily_goal(ml);
            println!("{}", goal_confirmation(stored, store.settings().unit));
        }
        Command::Unit { unit } => {
            store.set_unit(unit);
            println!("Amounts are now shown in {unit}.");
        }
        Command::Reminders { command } => handle_reminders(command, store, scheduler)?,
    }

    if reminders_dirty.get() {
        debug!("Reminder settings changed, rescheduling");
        scheduler.sync(store.settings())?;
        println!("{}", describe_state(scheduler.state()));
    }
    Ok(())
}

fn handle_add<S: SnapshotStorage>(
    drink_type: DrinkType,
    amount: Option<f64>,
    unit: Option<Unit>,
    store: &mut HydrateStore<S>,
) {
    if let Some(unit) = unit.filter(|unit| *unit != store.settings().unit) {
        store.set_unit(unit);
    }
    let ml = match amount {
        Some(amount) => units::to_ml(amount, store.settings().unit),
        None => DEFAULT_AMOUNT_ML,
    };
    match store.add_drink(drink_type, ml) {
        Some(drink) => println!(
            "Logged {} of {} ({}). Today: {}{}",
            store.format_amount(drink.amount),
            drink.drink_type,
            drink.id,
            store.format_amount(store.total_ml()),
            store.format_goal()
        ),
        None => println!("Amount must be greater than zero."),
    }
}

fn handle_remove<S: SnapshotStorage>(id: &str, store: &mut HydrateStore<S>) {
    if store.remove_drink(id) {
        println!("Removed drink '{id}'.");
    } else {
        println!("Drink '{id}' not found.");
    }
}

fn handle_reminders<S, D>(
    command: ReminderCommand,
    store: &mut HydrateStore<S>,
    scheduler: &mut ReminderScheduler<D>,
) -> Result<()>
where
    S: SnapshotStorage,
    D: NotificationDispatcher,
{
    match command {
        ReminderCommand::On => store.set_reminders_enabled(true),
        ReminderCommand::Off => store.set_reminders_enabled(false),
        ReminderCommand::Window { start, end } => {
            for time in [&start, &end] {
                if reminders::parse_hour(time).is_none() {
                    println!("{}", HydrateError::InvalidTime(time.clone()));
                    return Ok(());
                }
            }
            store.set_reminder_start_time(start);
            store.set_reminder_end_time(end);
        }
        ReminderCommand::Interval { hours } => match ReminderInterval::try_from(hours) {
            Ok(interval) => store.set_reminder_interval(interval),
            Err(err) => println!("{err}"),
        },
        ReminderCommand::List => print!("{}", render_scheduled(store, scheduler)?),
        ReminderCommand::Test => {
            let message = reminders::random_message();
            println!("{}\n{}", message.title, message.body);
        }
    }
    Ok(())
}

fn describe_state(state: &ReminderState) -> String {
    match state {
        ReminderState::Disabled => "Reminders are off.".to_string(),
        ReminderState::Scheduled(hours) if hours.is_empty() => {
            "No reminders fall inside this window; overnight windows are not supported."
                .to_string()
        }
        ReminderState::Scheduled(hours) => {
            let times: Vec<_> = hours.iter().map(|hour| format!("{hour:02}:00")).collect();
            format!("Reminders scheduled daily at {}.", times.join(", "))
        }
    }
}

fn goal_confirmation(goal: Millilitres, unit: Unit) -> String {
    format!("Daily goal set to {}.", units::format_goal_value(goal, unit))
}

pub fn render_status<S: SnapshotStorage>(store: &HydrateStore<S>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Today: {}{} ({:.0}%)",
        store.format_amount(store.total_ml()),
        store.format_goal(),
        store.percentage()
    );
    let mut drinks = store.today_drinks();
    drinks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if drinks.is_empty() {
        let _ = writeln!(out, "  Nothing logged yet.");
    }
    for drink in drinks {
        let _ = writeln!(
            out,
            "  {:>8}  {:<6}  {:>8}  {}",
            format_clock_time(drink.timestamp, store.clock()),
            drink.drink_type,
            store.format_amount(drink.amount),
            drink.id
        );
    }
    if let Some(latest) = store.ledger().latest() {
        if let Some(date) = store.clock().date_of(latest.timestamp) {
            let _ = writeln!(
                out,
                "Last drink: {} {}",
                date_header(date, store.clock()),
                format_clock_time(latest.timestamp, store.clock())
            );
        }
    }
    out
}

pub fn render_history<S: SnapshotStorage>(store: &HydrateStore<S>, period: Period) -> String {
    let groups = store.history(period);
    let mut out = String::new();
    if groups.is_empty() {
        let ledger = store.ledger();
        if ledger.is_empty() {
            let _ = writeln!(out, "No drinks logged yet.");
        } else {
            let _ = writeln!(out, "No drinks in this period ({} logged overall).", ledger.len());
        }
        return out;
    }
    for group in groups {
        let _ = writeln!(
            out,
            "{} - {}",
            date_header(group.date, store.clock()),
            store.format_amount(group.total)
        );
        for drink in &group.drinks {
            let _ = writeln!(
                out,
                "  {:>8}  {:<6}  {:>8}  {}",
                format_clock_time(drink.timestamp, store.clock()),
                drink.drink_type,
                store.format_amount(drink.amount),
                drink.id
            );
        }
    }
    out
}

fn render_scheduled<S, D>(store: &HydrateStore<S>, scheduler: &ReminderScheduler<D>) -> Result<String>
where
    S: SnapshotStorage,
    D: NotificationDispatcher,
{
    let settings = store.settings();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Reminders {} - window {}-{}, every {}",
        if settings.reminders_enabled { "on" } else { "off" },
        settings.reminder_start_time,
        settings.reminder_end_time,
        settings.reminder_interval
    );
    let triggers = scheduler.dispatcher().scheduled()?;
    if triggers.is_empty() {
        let _ = writeln!(out, "  No reminders scheduled.");
    }
    for trigger in triggers {
        let _ = writeln!(
            out,
            "  {:02}:{:02}  {}",
            trigger.hour, trigger.minute, trigger.notification.title
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};

    use super::*;
    use crate::clock::OffsetClock;
    use crate::persistence::tests::MemoryStorage;
    use crate::reminders::tests::RecordingDispatcher;

    fn store() -> HydrateStore<MemoryStorage> {
        let clock = Rc::new(OffsetClock::pinned(
            FixedOffset::east_opt(0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 10, 9, 5, 0).unwrap(),
        ));
        HydrateStore::load(MemoryStorage::default(), Box::new(clock))
    }

    #[test]
    fn parses_add_with_unit() {
        let cli = Cli::try_parse_from(["hydrate", "add", "coffee", "8", "--unit", "oz"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Add {
                drink_type: DrinkType::Coffee,
                amount: Some(8.0),
                unit: Some(Unit::Oz),
            })
        );
    }

    #[test]
    fn add_defaults_to_a_glass_and_keeps_chosen_unit() {
        let mut store = store();
        let mut scheduler = ReminderScheduler::new(RecordingDispatcher::default());
        let cli = Cli::try_parse_from(["hydrate", "add", "water", "--unit", "oz"]).unwrap();
        run(cli.command.unwrap(), &mut store, &mut scheduler).unwrap();

        assert_eq!(store.total_ml(), DEFAULT_AMOUNT_ML);
        assert_eq!(store.settings().unit, Unit::Oz);
        assert!(scheduler.dispatcher().calls.is_empty());
    }

    #[test]
    fn rejects_unknown_drink_type() {
        assert!(Cli::try_parse_from(["hydrate", "add", "soda", "250"]).is_err());
    }

    #[test]
    fn history_period_defaults_to_today() {
        let cli = Cli::try_parse_from(["hydrate", "history"]).unwrap();
        assert_eq!(cli.command, Some(Command::History { period: Period::Today }));
    }

    #[test]
    fn add_converts_ounces() {
        let mut store = store();
        let mut scheduler = ReminderScheduler::new(RecordingDispatcher::default());
        let command = Command::Add {
            drink_type: DrinkType::Water,
            amount: Some(8.0),
            unit: Some(Unit::Oz),
        };
        run(command, &mut store, &mut scheduler).unwrap();
        assert_eq!(store.total_ml(), 237);
    }

    #[test]
    fn reminder_changes_resync_the_scheduler() {
        let mut store = store();
        let mut scheduler = ReminderScheduler::new(RecordingDispatcher::default());
        run(
            Command::Reminders {
                command: ReminderCommand::On,
            },
            &mut store,
            &mut scheduler,
        )
        .unwrap();
        assert_eq!(
            scheduler.state(),
            &ReminderState::Scheduled(vec![8, 10, 12, 14, 16, 18, 20, 22])
        );

        run(
            Command::Reminders {
                command: ReminderCommand::Window {
                    start: "08:00".to_string(),
                    end: "20:00".to_string(),
                },
            },
            &mut store,
            &mut scheduler,
        )
        .unwrap();
        run(
            Command::Reminders {
                command: ReminderCommand::Interval { hours: 3 },
            },
            &mut store,
            &mut scheduler,
        )
        .unwrap();
        assert_eq!(
            scheduler.state(),
            &ReminderState::Scheduled(vec![8, 11, 14, 17, 20])
        );
    }

    #[test]
    fn invalid_window_is_not_stored() {
        let mut store = store();
        let mut scheduler = ReminderScheduler::new(RecordingDispatcher::default());
        run(
            Command::Reminders {
                command: ReminderCommand::Window {
                    start: "late".to_string(),
                    end: "20:00".to_string(),
                },
            },
            &mut store,
            &mut scheduler,
        )
        .unwrap();
        assert_eq!(store.settings().reminder_start_time, "08:00");
        assert!(scheduler.dispatcher().calls.is_empty());
    }

    #[test]
    fn non_reminder_commands_leave_schedule_alone() {
        let mut store = store();
        let mut scheduler = ReminderScheduler::new(RecordingDispatcher::default());
        run(Command::Goal { ml: 2500 }, &mut store, &mut scheduler).unwrap();
        assert!(scheduler.dispatcher().calls.is_empty());
        assert_eq!(store.settings().daily_goal, 2500);
    }

    #[test]
    fn goal_confirmation_uses_whole_ounces() {
        let mut store = store();
        store.set_unit(Unit::Oz);
        let stored = store.set_daily_goal(3000);
        assert_eq!(goal_confirmation(stored, store.settings().unit), "Daily goal set to 101 oz.");
        assert_eq!(goal_confirmation(2500, Unit::Ml), "Daily goal set to 2500 ml.");
    }

    #[test]
    fn status_lists_todays_drinks() {
        let mut store = store();
        store.add_drink(DrinkType::Tea, 300);
        let status = render_status(&store);
        assert!(status.starts_with("Today: 300 ml/3000 ml (10%)"));
        assert!(status.contains("9:05 AM"));
        assert!(status.contains("tea"));
        assert!(status.ends_with("Last drink: Today 9:05 AM\n"));
    }

    #[test]
    fn history_uses_day_headers() {
        let mut store = store();
        assert_eq!(render_history(&store, Period::Week), "No drinks logged yet.\n");
        store.add_drink(DrinkType::Water, 250);
        assert!(render_history(&store, Period::Week).starts_with("Today - 250 ml"));
    }

    #[test]
    fn describes_empty_schedule() {
        assert!(describe_state(&ReminderState::Scheduled(Vec::new())).contains("overnight"));
        assert_eq!(
            describe_state(&ReminderState::Scheduled(vec![8, 12])),
            "Reminders scheduled daily at 08:00, 12:00."
        );
    }
}
