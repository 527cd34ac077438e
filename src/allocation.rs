use crate::calendar::WeekId;
use serde::{Deserialize, Serialize};

/// The allocation of one assignment to one week. Holds the workload that is
/// effective for that specific week, which tracks the owning assignment's
/// base workload until the user overrides it for this week alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAllocation {
    pub assignment_id: u32,
    pub week: WeekId,
    pub effective_workload: i32,
    /// Set once `effective_workload` was explicitly given a value different
    /// from the assignment's base workload. While false, base workload edits
    /// re-sync this row; once true, the row keeps its value until it is set
    /// back to the base or leaves the assignment's span.
    #[serde(default)]
    pub manually_changed: bool,
}

impl WeeklyAllocation {
    pub fn new(assignment_id: u32, week: WeekId, effective_workload: i32) -> Self {
        Self {
            assignment_id,
            week,
            effective_workload,
            manually_changed: false,
        }
    }

    pub fn week_string(&self) -> String {
        self.week.week_string()
    }
}
