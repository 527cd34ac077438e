use crate::calendar::WeekId;
use crate::error::PlanningError;
use serde::{Deserialize, Serialize};

/// One calendar week as tracked by the planner. Weeks are shared value
/// objects: a single record exists per (year, week_num) identity, created
/// lazily the first time an assignment's span touches it and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub id: WeekId,
    /// Display flag: the week lies inside the configured reporting window.
    /// Recomputed by [`crate::Planner::refresh_week_windows`].
    #[serde(default)]
    pub in_window: bool,
}

impl Week {
    pub fn new(year: i32, week_num: u32) -> Result<Self, PlanningError> {
        validate_week_num(week_num)?;
        Ok(Self {
            id: WeekId::new(year, week_num),
            in_window: false,
        })
    }

    pub fn week_string(&self) -> String {
        self.id.week_string()
    }
}

/// Week numbers run 1 through 53; ISO years occasionally have 53 weeks.
/// Week 0 is rejected outright, never clamped.
pub fn validate_week_num(week_num: u32) -> Result<(), PlanningError> {
    if !(1..=53).contains(&week_num) {
        return Err(PlanningError::WeekNumberRange { week_num });
    }
    Ok(())
}
