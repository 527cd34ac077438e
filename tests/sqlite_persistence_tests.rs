#![cfg(feature = "sqlite")]

use chrono::{NaiveDate, NaiveDateTime};
use resource_planner::{
    AssignmentDraft, EmployeeRef, PlanStore, Planner, ProjectRef, SqlitePlanStore, WeekId,
};
use tempfile::tempdir;

fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn build_sample_plan() -> Planner {
    let mut planner = Planner::new();
    let id = planner
        .create_assignment(AssignmentDraft::new(
            ProjectRef::new("P1", "Website"),
            EmployeeRef::new("E1", "Ada"),
            50,
            dt(2021, 4, 5),
            dt(2021, 4, 23),
        ))
        .unwrap();
    planner
        .set_effective_workload(id, WeekId::new(2021, 15), 20)
        .unwrap();
    planner.refresh_week_windows(NaiveDate::from_ymd_opt(2021, 4, 7).unwrap());
    planner
}

#[test]
fn empty_store_loads_nothing() {
    let dir = tempdir().unwrap();
    let store = SqlitePlanStore::new(dir.path().join("plan.db")).unwrap();
    assert!(store.load_plan().unwrap().is_none());
}

#[test]
fn save_and_load_round_trips_the_plan() {
    let dir = tempdir().unwrap();
    let store = SqlitePlanStore::new(dir.path().join("plan.db")).unwrap();

    let planner = build_sample_plan();
    store.save_plan(&planner).unwrap();

    let loaded = store.load_plan().unwrap().expect("plan stored");
    assert_eq!(loaded.config(), planner.config());

    let original: Vec<_> = planner.assignments().cloned().collect();
    let restored: Vec<_> = loaded.assignments().cloned().collect();
    assert_eq!(original, restored);

    let original: Vec<_> = planner.allocations().cloned().collect();
    let restored: Vec<_> = loaded.allocations().cloned().collect();
    assert_eq!(original, restored);

    let row = loaded
        .allocation(restored[0].assignment_id, WeekId::new(2021, 15))
        .unwrap();
    assert_eq!(row.effective_workload, 20);
    assert!(row.manually_changed);
}

#[test]
fn saving_again_replaces_the_stored_plan() {
    let dir = tempdir().unwrap();
    let store = SqlitePlanStore::new(dir.path().join("plan.db")).unwrap();

    let mut planner = build_sample_plan();
    store.save_plan(&planner).unwrap();

    let id = planner
        .assignments()
        .next()
        .map(|assignment| assignment.id)
        .unwrap();
    planner.delete_assignment(id).unwrap();
    store.save_plan(&planner).unwrap();

    let loaded = store.load_plan().unwrap().expect("plan stored");
    assert_eq!(loaded.assignments().count(), 0);
    assert_eq!(loaded.allocations().count(), 0);
    // Weeks are append-only and survive the delete.
    assert_eq!(loaded.weeks().count(), 3);
}

#[test]
fn store_survives_reopening() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plan.db");

    {
        let store = SqlitePlanStore::new(&path).unwrap();
        store.save_plan(&build_sample_plan()).unwrap();
    }

    let reopened = SqlitePlanStore::new(&path).unwrap();
    let loaded = reopened.load_plan().unwrap().expect("plan stored");
    assert_eq!(loaded.assignments().count(), 1);
    assert_eq!(loaded.allocations().count(), 3);
}
