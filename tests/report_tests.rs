use chrono::{NaiveDate, NaiveDateTime};
use resource_planner::{
    AssignmentDraft, EmployeeRef, Planner, PlanningReport, ProjectRef, WeekId, WeekRange,
};

fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn sample_planner() -> Planner {
    let mut planner = Planner::new();
    // Ada on the website, W14..W16 at 50%.
    planner
        .create_assignment(AssignmentDraft::new(
            ProjectRef::new("P1", "Website"),
            EmployeeRef::new("E1", "Ada"),
            50,
            dt(2021, 4, 5),
            dt(2021, 4, 23),
        ))
        .unwrap();
    // Grace on the migration, W15 only at 30%.
    planner
        .create_assignment(AssignmentDraft::new(
            ProjectRef::new("P2", "Data Migration"),
            EmployeeRef::new("E2", "Grace"),
            30,
            dt(2021, 4, 12),
            dt(2021, 4, 16),
        ))
        .unwrap();
    planner
}

fn range(start_week: u32, end_week: u32) -> WeekRange {
    WeekRange::new(WeekId::new(2021, start_week), WeekId::new(2021, end_week)).unwrap()
}

#[test]
fn breakdown_lists_rows_week_first() {
    let planner = sample_planner();
    let rows = planner.weekly_breakdown(None, None, &range(14, 16));

    let summary: Vec<(String, String, i32)> = rows
        .into_iter()
        .map(|row| (row.week_string, row.employee_name, row.workload))
        .collect();
    // Within one week, rows come out sorted by project name.
    assert_eq!(
        summary,
        vec![
            ("2021, W14".into(), "Ada".into(), 50),
            ("2021, W15".into(), "Grace".into(), 30),
            ("2021, W15".into(), "Ada".into(), 50),
            ("2021, W16".into(), "Ada".into(), 50),
        ]
    );
}

#[test]
fn breakdown_honors_project_and_employee_filters() {
    let planner = sample_planner();

    let rows = planner.weekly_breakdown(Some("P2"), None, &range(14, 16));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].project_name, "Data Migration");

    let rows = planner.weekly_breakdown(None, Some("E1"), &range(14, 16));
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.employee_name == "Ada"));
}

#[test]
fn totals_are_zero_filled_over_the_whole_range() {
    let planner = sample_planner();
    let totals = planner.total_per_week(&range(13, 17));

    let values: Vec<(String, i32)> = totals
        .into_iter()
        .map(|t| (t.week_string, t.total_workload))
        .collect();
    assert_eq!(
        values,
        vec![
            ("2021, W13".into(), 0),
            ("2021, W14".into(), 50),
            ("2021, W15".into(), 80),
            ("2021, W16".into(), 50),
            ("2021, W17".into(), 0),
        ]
    );
}

#[test]
fn report_zero_fills_cells_and_appends_totals() {
    let planner = sample_planner();
    let report = PlanningReport::build(&planner, &range(14, 16));

    assert_eq!(report.weeks, vec!["2021, W14", "2021, W15", "2021, W16"]);
    assert_eq!(report.lines.len(), 2);

    let grace = report
        .lines
        .iter()
        .find(|line| line.employee_name == "Grace")
        .unwrap();
    let cells: Vec<i32> = grace.cells.iter().map(|c| c.workload).collect();
    assert_eq!(cells, vec![0, 30, 0]);

    let totals: Vec<i32> = report.totals.iter().map(|t| t.total_workload).collect();
    assert_eq!(totals, vec![50, 80, 50]);
}

#[test]
fn report_drops_pairs_without_workload_in_range() {
    let planner = sample_planner();
    // Grace's only allocation is W15; a W16..W17 report has no line for her.
    let report = PlanningReport::build(&planner, &range(16, 17));

    assert_eq!(report.lines.len(), 1);
    assert_eq!(report.lines[0].employee_name, "Ada");
}

#[test]
fn report_weeks_sort_chronologically_across_years() {
    let mut planner = Planner::new();
    // 2020-12-28 (W53 of 2020) through 2021-01-08 (W1 of 2021).
    planner
        .create_assignment(AssignmentDraft::new(
            ProjectRef::new("P1", "Website"),
            EmployeeRef::new("E1", "Ada"),
            40,
            dt(2020, 12, 28),
            dt(2021, 1, 8),
        ))
        .unwrap();

    let range = WeekRange::new(WeekId::new(2020, 53), WeekId::new(2021, 1)).unwrap();
    let report = PlanningReport::build(&planner, &range);
    assert_eq!(report.weeks, vec!["2020, W53", "2021, W01"]);
}
