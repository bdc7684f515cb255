use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::HydrateError;

pub type DrinkId = String;
/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;
pub type Millilitres = u32;

pub const MIN_DAILY_GOAL: Millilitres = 2000;
pub const MAX_DAILY_GOAL: Millilitres = 4000;
pub const DEFAULT_DAILY_GOAL: Millilitres = 3000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrinkType {
    Water,
    Coffee,
    Tea,
    Juice,
}

impl DrinkType {
    pub const ALL: [DrinkType; 4] = [
        DrinkType::Water,
        DrinkType::Coffee,
        DrinkType::Tea,
        DrinkType::Juice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DrinkType::Water => "water",
            DrinkType::Coffee => "coffee",
            DrinkType::Tea => "tea",
            DrinkType::Juice => "juice",
        }
    }
}

impl fmt::Display for DrinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DrinkType {
    type Err = HydrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        DrinkType::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| HydrateError::UnknownDrinkType(s.to_string()))
    }
}

/// A single logged drink. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drink {
    pub id: DrinkId,
    #[serde(rename = "type")]
    pub drink_type: DrinkType,
    pub amount: Millilitres,
    pub timestamp: Timestamp,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Ml,
    Oz,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Ml => f.write_str("ml"),
            Unit::Oz => f.write_str("oz"),
        }
    }
}

impl FromStr for Unit {
    type Err = HydrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ml" => Ok(Unit::Ml),
            "oz" => Ok(Unit::Oz),
            _ => Err(HydrateError::UnknownUnit(s.to_string())),
        }
    }
}

/// Hours between two reminders; always 1, 2, 3 or 4.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReminderInterval(u8);

impl ReminderInterval {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 4;

    pub fn hours(self) -> u32 {
        u32::from(self.0)
    }
}

impl Default for ReminderInterval {
    fn default() -> Self {
        ReminderInterval(2)
    }
}

impl TryFrom<i64> for ReminderInterval {
    type Error = HydrateError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(ReminderInterval(value as u8))
        } else {
            Err(HydrateError::InvalidInterval(value))
        }
    }
}

impl fmt::Display for ReminderInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub daily_goal: Millilitres,
    pub unit: Unit,
    pub reminders_enabled: bool,
    /// "HH:MM"; only the hour is used for scheduling.
    pub reminder_start_time: String,
    pub reminder_end_time: String,
    pub reminder_interval: ReminderInterval,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL,
            unit: Unit::Ml,
            reminders_enabled: false,
            reminder_start_time: "08:00".to_string(),
            reminder_end_time: "22:00".to_string(),
            reminder_interval: ReminderInterval::default(),
        }
    }
}

pub fn clamp_goal(goal: i64) -> Millilitres {
    goal.clamp(i64::from(MIN_DAILY_GOAL), i64::from(MAX_DAILY_GOAL)) as Millilitres
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Period {
    #[default]
    Today,
    Week,
    Month,
}

impl FromStr for Period {
    type Err = HydrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            _ => Err(HydrateError::UnknownPeriod(s.to_string())),
        }
    }
}

/// All drinks of one local calendar day, most recent first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub drinks: Vec<Drink>,
    pub total: Millilitres,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drink_type_parses_case_insensitively() {
        assert_eq!("Coffee".parse::<DrinkType>(), Ok(DrinkType::Coffee));
        assert_eq!(" tea ".parse::<DrinkType>(), Ok(DrinkType::Tea));
        assert!("soda".parse::<DrinkType>().is_err());
    }

    #[test]
    fn reminder_interval_rejects_out_of_range() {
        assert!(ReminderInterval::try_from(0).is_err());
        assert!(ReminderInterval::try_from(5).is_err());
        assert_eq!(ReminderInterval::try_from(3).map(|i| i.hours()), Ok(3));
    }

    #[test]
    fn goal_is_clamped_to_range() {
        assert_eq!(clamp_goal(500), 2000);
        assert_eq!(clamp_goal(9999), 4000);
        assert_eq!(clamp_goal(2500), 2500);
    }

    #[test]
    fn drink_serializes_with_type_key() {
        let drink = Drink {
            id: "abc".to_string(),
            drink_type: DrinkType::Juice,
            amount: 200,
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&drink).unwrap();
        assert_eq!(json["type"], "juice");
        assert_eq!(json["amount"], 200);
    }
}
