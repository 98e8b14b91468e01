//! Weekly duty rotation.
//!
//! Week 1 starts on the epoch date. Odd weeks put the first adult on duty
//! and unlock the first child's bonus chore; even weeks hand both to the
//! second pair.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::UserId;

/// `1 + floor((today - epoch) / 7 days)`. Dates before the epoch give
/// week 0 and below.
pub fn week_number(epoch: NaiveDate, today: NaiveDate) -> i64 {
    1 + (today - epoch).num_days().div_euclid(7)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekInfo {
    pub week: i64,
    pub on_duty_adult: UserId,
    pub unlocked_child: UserId,
}

impl WeekInfo {
    pub fn is_on_duty(&self, user: &str) -> bool {
        self.on_duty_adult == user
    }

    pub fn is_unlocked(&self, user: &str) -> bool {
        self.unlocked_child == user
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rotation {
    epoch: NaiveDate,
    adults: [UserId; 2],
    children: [UserId; 2],
}

impl Rotation {
    pub fn new(epoch: NaiveDate, adults: [UserId; 2], children: [UserId; 2]) -> Self {
        Self {
            epoch,
            adults,
            children,
        }
    }

    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    pub fn week_info(&self, today: NaiveDate) -> WeekInfo {
        let week = week_number(self.epoch, today);
        let slot = usize::from(week.rem_euclid(2) == 0);
        WeekInfo {
            week,
            on_duty_adult: self.adults[slot].clone(),
            unlocked_child: self.children[slot].clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rotation() -> Rotation {
        Rotation::new(
            date(2026, 2, 2),
            ["Rob".into(), "Lauren".into()],
            ["Eva".into(), "Noah".into()],
        )
    }

    #[test]
    fn week_increments_every_seven_days() {
        let epoch = date(2026, 2, 2);
        assert_eq!(week_number(epoch, epoch), 1);
        assert_eq!(week_number(epoch, date(2026, 2, 8)), 1);
        assert_eq!(week_number(epoch, date(2026, 2, 9)), 2);
        assert_eq!(week_number(epoch, date(2026, 2, 16)), 3);
        assert_eq!(week_number(epoch, date(2026, 10, 16)), 37);
    }

    #[test]
    fn days_before_epoch_floor_downwards() {
        let epoch = date(2026, 2, 2);
        assert_eq!(week_number(epoch, date(2026, 2, 1)), 0);
        assert_eq!(week_number(epoch, date(2026, 1, 26)), 0);
        assert_eq!(week_number(epoch, date(2026, 1, 25)), -1);
    }

    #[test]
    fn parity_picks_duty_pair() {
        let rotation = rotation();
        let odd = rotation.week_info(date(2026, 2, 4));
        assert_eq!(odd.week, 1);
        assert_eq!(odd.on_duty_adult, "Rob");
        assert_eq!(odd.unlocked_child, "Eva");

        let even = rotation.week_info(date(2026, 2, 10));
        assert_eq!(even.week, 2);
        assert!(even.is_on_duty("Lauren"));
        assert!(even.is_unlocked("Noah"));
        assert!(!even.is_unlocked("Eva"));

        let before = rotation.week_info(date(2026, 1, 25));
        assert_eq!(before.week, -1);
        assert_eq!(before.on_duty_adult, "Rob");
    }

    #[test]
    fn same_date_same_answer() {
        let rotation = rotation();
        let today = date(2026, 10, 16);
        assert_eq!(rotation.week_info(today), rotation.week_info(today));
    }
}
