use crate::calendar::{WeekId, enumerate_weeks};
use crate::directory::{EmployeeRef, ProjectRef};
use crate::error::PlanningError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Assigns an employee a workload percentage on a project for a date range.
/// The range is tracked per calendar week: one weekly allocation row exists
/// for every week the span covers, owned exclusively by this assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u32,
    pub project: ProjectRef,
    pub employee: EmployeeRef,
    /// Default workload per week in percent, propagated to weeks the user has
    /// not manually overridden.
    pub base_workload: i32,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    /// Net number of weeks added to (or, when negative, removed from) the end
    /// date via the one-week extend/shrink conveniences.
    #[serde(default)]
    pub weeks_added: i32,
}

impl Assignment {
    /// Ordered sequence of weeks covered by `[start_date, end_date]`,
    /// inclusive of both endpoints' weeks.
    pub fn week_span(&self) -> Vec<WeekId> {
        enumerate_weeks(self.start_date.date(), self.end_date.date())
    }

    /// Editable view of the current values, the input shape for `update`.
    pub fn to_draft(&self) -> AssignmentDraft {
        AssignmentDraft {
            project: self.project.clone(),
            employee: self.employee.clone(),
            base_workload: self.base_workload,
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
        }
    }
}

/// User-supplied values for creating or updating an assignment. Dates are
/// optional here so an unfilled form field surfaces as `MissingDate` instead
/// of a type error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentDraft {
    pub project: ProjectRef,
    pub employee: EmployeeRef,
    pub base_workload: i32,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

impl AssignmentDraft {
    pub fn new(
        project: ProjectRef,
        employee: EmployeeRef,
        base_workload: i32,
        start_date: NaiveDateTime,
        end_date: NaiveDateTime,
    ) -> Self {
        Self {
            project,
            employee,
            base_workload,
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }

    /// Field validation shared by create and update. Returns the confirmed
    /// date pair; comparisons are datetime-exact.
    pub fn validate(&self) -> Result<(NaiveDateTime, NaiveDateTime), PlanningError> {
        let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
            return Err(PlanningError::MissingDate);
        };
        if start > end {
            return Err(PlanningError::DateOrder { start, end });
        }
        validate_workload(self.base_workload)?;
        Ok((start, end))
    }
}

pub(crate) fn validate_workload(value: i32) -> Result<(), PlanningError> {
    if !(0..=100).contains(&value) {
        return Err(PlanningError::WorkloadRange { value });
    }
    Ok(())
}
