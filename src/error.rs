use chrono::NaiveDateTime;
use std::fmt;

/// Validation failures raised by planner operations. Every mutation is
/// all-or-nothing: when one of these is returned, no allocation row has been
/// created, updated, or deleted. Messages are meant for direct display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    /// A required start or end date was not provided.
    MissingDate,
    /// Start date falls after end date (also raised when shrinking an
    /// assignment would push its end before its start).
    DateOrder {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// A workload percentage outside 0..=100.
    WorkloadRange { value: i32 },
    /// An employee's summed effective workload for one week would exceed 100%.
    WorkloadConservation { week_string: String },
    /// A week number outside 1..=53.
    WeekNumberRange { week_num: u32 },
    /// A report range whose start week lies after its end week.
    WeekOrder {
        start_week: String,
        end_week: String,
    },
    AssignmentNotFound { id: u32 },
    AllocationNotFound { assignment_id: u32, week_string: String },
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanningError::MissingDate => {
                write!(f, "both start and end dates must be filled out")
            }
            PlanningError::DateOrder { start, end } => write!(
                f,
                "start date {start} must be on or before end date {end}"
            ),
            PlanningError::WorkloadRange { value } => write!(
                f,
                "workload {value} % must be between 0 and 100"
            ),
            PlanningError::WorkloadConservation { week_string } => {
                write!(f, "the workload in week {week_string} is too high")
            }
            PlanningError::WeekNumberRange { week_num } => write!(
                f,
                "week number {week_num} must be between 1 and 53"
            ),
            PlanningError::WeekOrder {
                start_week,
                end_week,
            } => write!(
                f,
                "start week {start_week} must not be after end week {end_week}"
            ),
            PlanningError::AssignmentNotFound { id } => {
                write!(f, "assignment {id} not found")
            }
            PlanningError::AllocationNotFound {
                assignment_id,
                week_string,
            } => write!(
                f,
                "assignment {assignment_id} has no allocation in week {week_string}"
            ),
        }
    }
}

impl std::error::Error for PlanningError {}
