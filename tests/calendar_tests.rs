use chrono::NaiveDate;
use resource_planner::{
    WeekId, compare_weeks, enumerate_weeks, upcoming_week, week_identity, week_in_window,
};
use std::cmp::Ordering;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn week_identity_matches_iso_8601() {
    // 2020-03-02 is the Monday of ISO week 10.
    assert_eq!(week_identity(d(2020, 3, 2)), WeekId::new(2020, 10));
    // 2019-12-30 already belongs to week 1 of 2020.
    assert_eq!(week_identity(d(2019, 12, 30)), WeekId::new(2020, 1));
    // 2021-01-01 is still week 53 of 2020.
    assert_eq!(week_identity(d(2021, 1, 1)), WeekId::new(2020, 53));
}

#[test]
fn enumerate_weeks_crosses_year_boundary() {
    let weeks = enumerate_weeks(d(2019, 12, 27), d(2020, 1, 17));
    assert_eq!(
        weeks,
        vec![
            WeekId::new(2019, 52),
            WeekId::new(2020, 1),
            WeekId::new(2020, 2),
            WeekId::new(2020, 3),
        ]
    );
}

#[test]
fn enumerate_weeks_reversed_range_is_empty() {
    assert!(enumerate_weeks(d(2020, 1, 17), d(2019, 12, 27)).is_empty());
}

#[test]
fn enumerate_weeks_single_day_round_trips() {
    let date = d(2021, 4, 7);
    let weeks = enumerate_weeks(date, date);
    assert_eq!(weeks, vec![week_identity(date)]);
}

#[test]
fn enumerate_weeks_is_ordered_distinct_and_gap_free() {
    let weeks = enumerate_weeks(d(2020, 11, 2), d(2021, 2, 26));
    assert_eq!(weeks.first().copied(), Some(week_identity(d(2020, 11, 2))));
    assert_eq!(weeks.last().copied(), Some(week_identity(d(2021, 2, 26))));
    for pair in weeks.windows(2) {
        assert_eq!(compare_weeks(pair[0], pair[1]), Ordering::Less);
        // Consecutive weeks: same year +1 week, or a rollover to week 1.
        if pair[0].year == pair[1].year {
            assert_eq!(pair[1].week_num, pair[0].week_num + 1);
        } else {
            assert_eq!(pair[1].year, pair[0].year + 1);
            assert_eq!(pair[1].week_num, 1);
        }
    }
}

#[test]
fn week_string_formatting() {
    assert_eq!(WeekId::new(2020, 2).week_string(), "2020, W02");
    assert_eq!(WeekId::new(2020, 9).week_string(), "2020, W09");
    assert_eq!(WeekId::new(2020, 11).week_string(), "2020, W11");
}

#[test]
fn week_comparison_is_numeric() {
    assert_eq!(
        compare_weeks(WeekId::new(2020, 9), WeekId::new(2020, 10)),
        Ordering::Less
    );
    assert_eq!(
        compare_weeks(WeekId::new(2019, 52), WeekId::new(2020, 1)),
        Ordering::Less
    );
    assert_eq!(
        compare_weeks(WeekId::new(2020, 14), WeekId::new(2020, 14)),
        Ordering::Equal
    );
}

#[test]
fn window_looks_forward_for_positive_filter() {
    // Today is Wednesday of 2021 week 14.
    let today = d(2021, 4, 7);
    assert!(week_in_window(WeekId::new(2021, 14), today, 2));
    assert!(week_in_window(WeekId::new(2021, 16), today, 2));
    assert!(!week_in_window(WeekId::new(2021, 13), today, 2));
    assert!(!week_in_window(WeekId::new(2021, 17), today, 2));
}

#[test]
fn window_looks_backward_for_negative_filter() {
    let today = d(2021, 4, 7);
    assert!(week_in_window(WeekId::new(2021, 14), today, -2));
    assert!(week_in_window(WeekId::new(2021, 12), today, -2));
    assert!(!week_in_window(WeekId::new(2021, 15), today, -2));
    assert!(!week_in_window(WeekId::new(2021, 11), today, -2));
}

#[test]
fn upcoming_week_prefers_the_coming_monday() {
    // Wednesday rolls forward to the next Monday.
    assert_eq!(
        upcoming_week(d(2021, 4, 7)),
        (d(2021, 4, 12), d(2021, 4, 16))
    );
    // A Monday stays put.
    assert_eq!(
        upcoming_week(d(2021, 4, 5)),
        (d(2021, 4, 5), d(2021, 4, 9))
    );
}
