/// Millilitre / fluid ounce conversion and display formatting.
use crate::types::{Millilitres, Unit};

pub const ML_TO_OZ: f64 = 0.033814;
pub const OZ_TO_ML: f64 = 29.5735;

/// Ounces rounded to one decimal place.
pub fn ml_to_oz(ml: Millilitres) -> f64 {
    (f64::from(ml) * ML_TO_OZ * 10.0).round() / 10.0
}

/// Millilitres rounded to the nearest integer. Negative input saturates to 0.
pub fn oz_to_ml(oz: f64) -> Millilitres {
    (oz * OZ_TO_ML).round() as Millilitres
}

/// Whole ounces. Goals are shown without a decimal, unlike amounts.
pub fn goal_ml_to_oz(ml: Millilitres) -> f64 {
    (f64::from(ml) * ML_TO_OZ).round()
}

/// Convert a value entered in `unit` to millilitres.
pub fn to_ml(value: f64, unit: Unit) -> Millilitres {
    match unit {
        Unit::Ml => value.round() as Millilitres,
        Unit::Oz => oz_to_ml(value),
    }
}

pub fn format_amount(ml: Millilitres, unit: Unit) -> String {
    match unit {
        Unit::Ml => format!("{ml} ml"),
        Unit::Oz => format!("{} oz", ml_to_oz(ml)),
    }
}

/// The goal on its own, in whole ounces when the unit is oz.
pub fn format_goal_value(goal: Millilitres, unit: Unit) -> String {
    match unit {
        Unit::Ml => format!("{goal} ml"),
        Unit::Oz => format!("{} oz", goal_ml_to_oz(goal)),
    }
}

pub fn format_goal(goal: Millilitres, unit: Unit) -> String {
    format!("/{}", format_goal_value(goal, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ml_to_oz_keeps_one_decimal() {
        assert_eq!(ml_to_oz(250), 8.5);
        assert_eq!(ml_to_oz(500), 16.9);
        assert_eq!(ml_to_oz(0), 0.0);
    }

    #[test]
    fn oz_to_ml_rounds_to_integer() {
        assert_eq!(oz_to_ml(8.0), 237);
        assert_eq!(oz_to_ml(16.9), 500);
        assert_eq!(oz_to_ml(-3.0), 0);
    }

    #[test]
    fn round_trip_error_is_within_a_tenth_of_an_ounce() {
        let tolerance = 0.1 * OZ_TO_ML;
        for ml in (1..=5000).step_by(7) {
            let back = oz_to_ml(ml_to_oz(ml));
            let diff = (f64::from(back) - f64::from(ml)).abs();
            assert!(diff <= tolerance, "{ml} ml came back as {back} ml");
        }
    }

    #[test]
    fn goal_and_amount_use_different_precision() {
        assert_eq!(goal_ml_to_oz(3000), 101.0);
        assert_eq!(ml_to_oz(3000), 101.4);
        assert_eq!(format_goal(3000, Unit::Oz), "/101 oz");
        assert_eq!(format_amount(3000, Unit::Oz), "101.4 oz");
        assert_eq!(format_goal_value(3000, Unit::Oz), "101 oz");
    }

    #[test]
    fn formats_millilitres_verbatim() {
        assert_eq!(format_amount(250, Unit::Ml), "250 ml");
        assert_eq!(format_goal(2500, Unit::Ml), "/2500 ml");
    }

    #[test]
    fn to_ml_converts_from_selected_unit() {
        assert_eq!(to_ml(330.0, Unit::Ml), 330);
        assert_eq!(to_ml(12.0, Unit::Oz), 355);
    }
}
