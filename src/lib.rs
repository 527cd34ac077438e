pub mod allocation;
pub mod assignment;
pub mod calendar;
pub mod config;
pub mod directory;
pub mod error;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod planner;
pub mod report;
pub mod week;

pub use allocation::WeeklyAllocation;
pub use assignment::{Assignment, AssignmentDraft};
pub use calendar::{
    WeekId, compare_weeks, enumerate_weeks, upcoming_week, week_identity, week_in_window,
};
pub use config::PlannerConfig;
pub use directory::{EmployeeRef, ProjectRef};
pub use error::PlanningError;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use persistence::{
    PersistenceError, PlanStore, load_plan_from_json, save_plan_to_json, save_report_to_csv,
};
pub use planner::Planner;
pub use report::{BreakdownRow, PlanningReport, ReportCell, ReportLine, WeekRange, WeekTotal};
pub use week::Week;
