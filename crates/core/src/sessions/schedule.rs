//! Course day schedules.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A course's schedule for one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    /// Session start time.
    pub start: NaiveTime,
    /// Session end time.
    pub end: NaiveTime,
}

impl DaySchedule {
    /// Session duration in whole minutes.
    ///
    /// Schedules never span midnight; a schedule with `end <= start` is
    /// reported as zero minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_duration() {
        let schedule = DaySchedule {
            start: at(14, 0),
            end: at(15, 30),
        };
        assert_eq!(schedule.duration_minutes(), 90);
    }

    #[test]
    fn test_inverted_schedule_is_zero() {
        let schedule = DaySchedule {
            start: at(16, 0),
            end: at(15, 0),
        };
        assert_eq!(schedule.duration_minutes(), 0);
    }
}
