use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identity of one ISO-8601 calendar week. Week 1 is the week containing the
/// year's first Thursday; weeks run Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekId {
    pub year: i32,
    pub week_num: u32,
}

impl WeekId {
    pub fn new(year: i32, week_num: u32) -> Self {
        Self { year, week_num }
    }

    /// Numeric key for chronological comparison (`year * 100 + week_num`).
    /// String comparison would order "W9" after "W10".
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 100 + self.week_num as i64
    }

    /// Display form, e.g. "2020, W09". Week numbers below 10 are zero-padded.
    pub fn week_string(&self) -> String {
        format!("{}, W{:02}", self.year, self.week_num)
    }

    /// The Monday this week starts on. `None` if the identity does not name a
    /// real ISO week (e.g. week 53 of a 52-week year).
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week_num, Weekday::Mon)
    }
}

impl Ord for WeekId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl PartialOrd for WeekId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.week_string())
    }
}

/// ISO week identity of a date. Single source of truth for the date-to-week
/// mapping; nothing else in the crate re-derives week numbers.
pub fn week_identity(date: NaiveDate) -> WeekId {
    let iso = date.iso_week();
    WeekId::new(iso.year(), iso.week())
}

/// Total chronological order on week identities.
pub fn compare_weeks(a: WeekId, b: WeekId) -> Ordering {
    a.ordinal().cmp(&b.ordinal())
}

/// All week identities from `first`'s week through `last`'s week inclusive,
/// advancing seven days at a time. A reversed range yields an empty sequence;
/// start/end validation belongs to the assignment layer.
pub fn enumerate_weeks(first: NaiveDate, last: NaiveDate) -> Vec<WeekId> {
    let last_week = week_identity(last);
    let mut date = first;
    let mut week = week_identity(date);
    let mut weeks = Vec::new();
    while week.ordinal() <= last_week.ordinal() {
        weeks.push(week);
        date += Duration::weeks(1);
        week = week_identity(date);
    }
    weeks
}

/// The Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Whether `week` falls inside the reporting window anchored at `today`.
/// A non-negative `filter_weeks` looks that many weeks into the future,
/// a negative one that many weeks into the past; the current week is always
/// inside the window.
pub fn week_in_window(week: WeekId, today: NaiveDate, filter_weeks: i32) -> bool {
    let this_week = week_start(today);
    let Some(start_of_week) = week.start_date() else {
        return false;
    };
    if filter_weeks >= 0 {
        this_week <= start_of_week
            && start_of_week <= this_week + Duration::weeks(filter_weeks as i64)
    } else {
        this_week + Duration::weeks(filter_weeks as i64) <= start_of_week
            && start_of_week <= this_week
    }
}

/// Default date pair for a new assignment: the coming Monday (today, when
/// today already is a Monday) through that week's Friday. Convenience for
/// form prefills, not part of any invariant.
pub fn upcoming_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let mut monday = today;
    while monday.weekday() != Weekday::Mon {
        monday += Duration::days(1);
    }
    (monday, monday + Duration::days(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn ordinal_orders_numerically_not_lexicographically() {
        let w9 = WeekId::new(2020, 9);
        let w10 = WeekId::new(2020, 10);
        assert_eq!(compare_weeks(w9, w10), Ordering::Less);
        assert!(w9 < w10);
    }

    #[test]
    fn week_string_pads_single_digits_only() {
        assert_eq!(WeekId::new(2020, 2).week_string(), "2020, W02");
        assert_eq!(WeekId::new(2020, 11).week_string(), "2020, W11");
    }

    #[test]
    fn first_days_of_january_belong_to_previous_iso_year() {
        // 2021-01-01 is a Friday, still ISO week 53 of 2020.
        assert_eq!(week_identity(d(2021, 1, 1)), WeekId::new(2020, 53));
    }
}
