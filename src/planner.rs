use crate::allocation::WeeklyAllocation;
use crate::assignment::{Assignment, AssignmentDraft, validate_workload};
use crate::calendar::{WeekId, week_in_window};
use crate::config::PlannerConfig;
use crate::error::PlanningError;
use crate::report::{BreakdownRow, WeekRange, WeekTotal};
use crate::week::{Week, validate_week_num};
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate root of the planning engine. Owns the shared week set, the
/// assignment table, and the weekly allocation ledger, and is the single
/// writer for all of them: every mutation goes through `&mut self`, validates
/// completely (including the 100% conservation check per employee and week)
/// before touching any row, and therefore commits all-or-nothing. Wrap the
/// planner in a lock to serialize operations across threads.
#[derive(Debug, Clone)]
pub struct Planner {
    config: PlannerConfig,
    weeks: BTreeMap<WeekId, Week>,
    assignments: BTreeMap<u32, Assignment>,
    allocations: BTreeMap<(u32, WeekId), WeeklyAllocation>,
    next_assignment_id: u32,
    /// `today` of the last window refresh; lazily created weeks use it so
    /// their flag is not stale until the next refresh.
    window_anchor: Option<NaiveDate>,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner {
    pub fn new() -> Self {
        Self::with_config(PlannerConfig::default())
    }

    pub fn with_config(config: PlannerConfig) -> Self {
        Self {
            config,
            weeks: BTreeMap::new(),
            assignments: BTreeMap::new(),
            allocations: BTreeMap::new(),
            next_assignment_id: 1,
            window_anchor: None,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Changes the reporting-window horizon and recomputes every week's flag
    /// against the last refresh date, matching the settings-page behavior.
    pub fn set_filter_weeks(&mut self, filter_weeks: i32) {
        self.config.filter_weeks = filter_weeks;
        if let Some(today) = self.window_anchor {
            self.refresh_week_windows(today);
        }
    }

    pub fn weeks(&self) -> impl Iterator<Item = &Week> {
        self.weeks.values()
    }

    pub fn week(&self, id: WeekId) -> Option<&Week> {
        self.weeks.get(&id)
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    pub fn assignment(&self, id: u32) -> Option<&Assignment> {
        self.assignments.get(&id)
    }

    pub fn allocations(&self) -> impl Iterator<Item = &WeeklyAllocation> {
        self.allocations.values()
    }

    /// The materialized weekly rows of one assignment, chronologically.
    pub fn allocations_for(&self, assignment_id: u32) -> Vec<&WeeklyAllocation> {
        let low = WeekId::new(i32::MIN, u32::MIN);
        let high = WeekId::new(i32::MAX, u32::MAX);
        self.allocations
            .range((assignment_id, low)..=(assignment_id, high))
            .map(|(_, allocation)| allocation)
            .collect()
    }

    pub fn allocation(&self, assignment_id: u32, week: WeekId) -> Option<&WeeklyAllocation> {
        self.allocations.get(&(assignment_id, week))
    }

    /// Sum of effective workload over all of one employee's allocations in
    /// one week, across every assignment.
    pub fn total_workload(&self, employee_id: &str, week: WeekId) -> i32 {
        self.employee_workload(employee_id, week, None)
    }

    fn employee_workload(&self, employee_id: &str, week: WeekId, exclude: Option<u32>) -> i32 {
        self.assignments
            .iter()
            .filter(|(id, assignment)| {
                assignment.employee.id == employee_id && Some(**id) != exclude
            })
            .filter_map(|(id, _)| self.allocations.get(&(*id, week)))
            .map(|allocation| allocation.effective_workload)
            .sum()
    }

    /// Conservation check: `candidate` is the workload this operation wants
    /// to record for the employee in `week`; the employee's other rows plus
    /// the candidate must stay at or below 100%. Exactly 100 is allowed.
    fn ensure_capacity(
        &self,
        employee_id: &str,
        week: WeekId,
        candidate: i32,
        exclude: Option<u32>,
    ) -> Result<(), PlanningError> {
        let others = self.employee_workload(employee_id, week, exclude);
        if others + candidate > 100 {
            return Err(PlanningError::WorkloadConservation {
                week_string: week.week_string(),
            });
        }
        Ok(())
    }

    fn upsert_week(&mut self, id: WeekId) {
        let in_window = match self.window_anchor {
            Some(today) => week_in_window(id, today, self.config.filter_weeks),
            None => false,
        };
        self.weeks.entry(id).or_insert(Week { id, in_window });
    }

    /// Creates an assignment and materializes one allocation row per week of
    /// its span at the base workload. Fails without creating anything when
    /// validation or the conservation check rejects any week.
    pub fn create_assignment(&mut self, draft: AssignmentDraft) -> Result<u32, PlanningError> {
        let (start, end) = draft.validate()?;
        let assignment = Assignment {
            id: self.next_assignment_id,
            project: draft.project,
            employee: draft.employee,
            base_workload: draft.base_workload,
            start_date: start,
            end_date: end,
            weeks_added: 0,
        };
        let span = assignment.week_span();

        for week in &span {
            self.ensure_capacity(&assignment.employee.id, *week, assignment.base_workload, None)?;
        }

        let id = assignment.id;
        for week in &span {
            self.upsert_week(*week);
            self.allocations.insert(
                (id, *week),
                WeeklyAllocation::new(id, *week, assignment.base_workload),
            );
        }
        self.assignments.insert(id, assignment);
        self.next_assignment_id += 1;
        tracing::debug!(assignment_id = id, weeks = span.len(), "assignment created");
        Ok(id)
    }

    /// Applies new values to an existing assignment and reconciles its
    /// allocation rows against the recomputed week span:
    ///
    /// - weeks newly covered get a fresh row at the new base workload;
    /// - weeks still covered are re-synced to the new base workload unless
    ///   manually overridden, in which case their value is left alone;
    /// - weeks no longer covered lose their row unconditionally.
    ///
    /// The conservation check runs for every retained or added week before
    /// any row is written; a violation aborts the whole update.
    pub fn update_assignment(
        &mut self,
        id: u32,
        draft: AssignmentDraft,
    ) -> Result<(), PlanningError> {
        let current = self
            .assignments
            .get(&id)
            .ok_or(PlanningError::AssignmentNotFound { id })?
            .clone();
        let (start, end) = draft.validate()?;

        let updated = Assignment {
            id,
            project: draft.project,
            employee: draft.employee,
            base_workload: draft.base_workload,
            start_date: start,
            end_date: end,
            weeks_added: current.weeks_added,
        };
        let new_span = updated.week_span();
        let new_weeks: BTreeSet<WeekId> = new_span.iter().copied().collect();
        let old_weeks: BTreeSet<WeekId> = self
            .allocations_for(id)
            .iter()
            .map(|allocation| allocation.week)
            .collect();

        // Validate every touched week first; rows leaving the span free
        // capacity and are not checked.
        for week in &new_span {
            let own = match self.allocations.get(&(id, *week)) {
                Some(row) if row.manually_changed => row.effective_workload,
                _ => updated.base_workload,
            };
            self.ensure_capacity(&updated.employee.id, *week, own, Some(id))?;
        }

        for week in &new_span {
            self.upsert_week(*week);
            match self.allocations.get_mut(&(id, *week)) {
                Some(row) => {
                    if !row.manually_changed {
                        row.effective_workload = updated.base_workload;
                    }
                }
                None => {
                    self.allocations.insert(
                        (id, *week),
                        WeeklyAllocation::new(id, *week, updated.base_workload),
                    );
                }
            }
        }
        for week in old_weeks.difference(&new_weeks) {
            self.allocations.remove(&(id, *week));
        }
        self.assignments.insert(id, updated);
        tracing::debug!(assignment_id = id, weeks = new_span.len(), "assignment updated");
        Ok(())
    }

    /// Moves the end date one week later, adding an allocation row for the
    /// newly covered week.
    pub fn extend_by_one_week(&mut self, id: u32) -> Result<(), PlanningError> {
        self.shift_end_date(id, Duration::days(7), 1)
    }

    /// Moves the end date one week earlier, deleting the departed week's
    /// row. A single-week assignment cannot shrink: the attempt fails with
    /// `DateOrder` and leaves dates and rows untouched.
    pub fn shrink_by_one_week(&mut self, id: u32) -> Result<(), PlanningError> {
        self.shift_end_date(id, Duration::days(-7), -1)
    }

    fn shift_end_date(
        &mut self,
        id: u32,
        delta: Duration,
        weeks_delta: i32,
    ) -> Result<(), PlanningError> {
        let current = self
            .assignments
            .get(&id)
            .ok_or(PlanningError::AssignmentNotFound { id })?;
        let mut draft = current.to_draft();
        draft.end_date = Some(current.end_date + delta);
        self.update_assignment(id, draft)?;
        if let Some(assignment) = self.assignments.get_mut(&id) {
            assignment.weeks_added += weeks_delta;
        }
        Ok(())
    }

    /// Deletes an assignment, cascading to all of its allocation rows. Weeks
    /// stay behind; removal only frees capacity, so no conservation re-check.
    pub fn delete_assignment(&mut self, id: u32) -> Result<(), PlanningError> {
        if self.assignments.remove(&id).is_none() {
            return Err(PlanningError::AssignmentNotFound { id });
        }
        self.allocations
            .retain(|(assignment_id, _), _| *assignment_id != id);
        tracing::debug!(assignment_id = id, "assignment deleted");
        Ok(())
    }

    /// Overrides one week's effective workload. A value different from the
    /// owning assignment's base workload marks the row as manually changed,
    /// exempting it from re-sync; setting it back to the base clears the
    /// mark. The conservation check runs before the value is committed.
    pub fn set_effective_workload(
        &mut self,
        assignment_id: u32,
        week: WeekId,
        value: i32,
    ) -> Result<(), PlanningError> {
        validate_workload(value)?;
        let assignment = self
            .assignments
            .get(&assignment_id)
            .ok_or(PlanningError::AssignmentNotFound { id: assignment_id })?;
        let employee_id = assignment.employee.id.clone();
        let base_workload = assignment.base_workload;
        if !self.allocations.contains_key(&(assignment_id, week)) {
            return Err(PlanningError::AllocationNotFound {
                assignment_id,
                week_string: week.week_string(),
            });
        }
        self.ensure_capacity(&employee_id, week, value, Some(assignment_id))?;
        if let Some(row) = self.allocations.get_mut(&(assignment_id, week)) {
            row.effective_workload = value;
            row.manually_changed = value != base_workload;
        }
        Ok(())
    }

    /// Flat reporting query: one row per (project, employee) pair and week
    /// it has allocations for inside the range, ordered week first.
    pub fn weekly_breakdown(
        &self,
        project_id: Option<&str>,
        employee_id: Option<&str>,
        range: &WeekRange,
    ) -> Vec<BreakdownRow> {
        let mut rows = Vec::new();
        for week in range.weeks() {
            let mut per_pair: BTreeMap<(String, String), i32> = BTreeMap::new();
            for (id, assignment) in &self.assignments {
                if let Some(project) = project_id {
                    if assignment.project.id != project {
                        continue;
                    }
                }
                if let Some(employee) = employee_id {
                    if assignment.employee.id != employee {
                        continue;
                    }
                }
                if let Some(allocation) = self.allocations.get(&(*id, week)) {
                    let key = (
                        assignment.project.name.clone(),
                        assignment.employee.name.clone(),
                    );
                    *per_pair.entry(key).or_insert(0) += allocation.effective_workload;
                }
            }
            for ((project_name, employee_name), workload) in per_pair {
                rows.push(BreakdownRow {
                    project_name,
                    employee_name,
                    week_string: week.week_string(),
                    workload,
                });
            }
        }
        rows
    }

    /// Per-week totals across all employees and projects, zero-filled over
    /// the whole range. Feeds the report's "Total" row.
    pub fn total_per_week(&self, range: &WeekRange) -> Vec<WeekTotal> {
        range
            .weeks()
            .into_iter()
            .map(|week| {
                let total_workload = self
                    .allocations
                    .values()
                    .filter(|allocation| allocation.week == week)
                    .map(|allocation| allocation.effective_workload)
                    .sum();
                WeekTotal {
                    week_string: week.week_string(),
                    total_workload,
                }
            })
            .collect()
    }

    /// Recomputes every week's reporting-window flag against `today` and the
    /// configured horizon. Idempotent; reads but never writes workloads, so
    /// it is safe to run on a timer alongside allocation edits.
    pub fn refresh_week_windows(&mut self, today: NaiveDate) {
        self.window_anchor = Some(today);
        let filter_weeks = self.config.filter_weeks;
        for week in self.weeks.values_mut() {
            week.in_window = week_in_window(week.id, today, filter_weeks);
        }
    }

    /// Rebuilds a planner from stored records, re-validating everything the
    /// live operations enforce: week numbers, workload ranges, referential
    /// integrity, uniqueness per (assignment, week), and conservation.
    pub fn from_records(
        config: PlannerConfig,
        weeks: Vec<Week>,
        assignments: Vec<Assignment>,
        allocations: Vec<WeeklyAllocation>,
    ) -> Result<Self, PlanningError> {
        let mut planner = Self::with_config(config);

        for week in weeks {
            validate_week_num(week.id.week_num)?;
            planner.weeks.insert(week.id, week);
        }

        for assignment in assignments {
            validate_workload(assignment.base_workload)?;
            if assignment.start_date > assignment.end_date {
                return Err(PlanningError::DateOrder {
                    start: assignment.start_date,
                    end: assignment.end_date,
                });
            }
            planner.next_assignment_id = planner.next_assignment_id.max(assignment.id + 1);
            planner.assignments.insert(assignment.id, assignment);
        }

        for allocation in allocations {
            validate_week_num(allocation.week.week_num)?;
            validate_workload(allocation.effective_workload)?;
            let employee_id = planner
                .assignments
                .get(&allocation.assignment_id)
                .ok_or(PlanningError::AssignmentNotFound {
                    id: allocation.assignment_id,
                })?
                .employee
                .id
                .clone();
            planner.ensure_capacity(
                &employee_id,
                allocation.week,
                allocation.effective_workload,
                None,
            )?;
            planner.upsert_week(allocation.week);
            planner
                .allocations
                .insert((allocation.assignment_id, allocation.week), allocation);
        }

        Ok(planner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{EmployeeRef, ProjectRef};
    use chrono::{NaiveDate, NaiveDateTime};

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn draft(workload: i32, start: NaiveDateTime, end: NaiveDateTime) -> AssignmentDraft {
        AssignmentDraft::new(
            ProjectRef::new("P1", "Website"),
            EmployeeRef::new("E1", "Ada"),
            workload,
            start,
            end,
        )
    }

    #[test]
    fn create_materializes_one_row_per_week() {
        let mut planner = Planner::new();
        // 2021-04-05 (Mon, W14) through 2021-04-23 (Fri, W16)
        let id = planner
            .create_assignment(draft(50, dt(2021, 4, 5), dt(2021, 4, 23)))
            .unwrap();
        let rows = planner.allocations_for(id);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].week, WeekId::new(2021, 14));
        assert_eq!(rows[2].week, WeekId::new(2021, 16));
        assert!(rows.iter().all(|r| r.effective_workload == 50));
        assert!(rows.iter().all(|r| !r.manually_changed));
    }

    #[test]
    fn weeks_are_shared_not_duplicated() {
        let mut planner = Planner::new();
        planner
            .create_assignment(draft(40, dt(2021, 4, 5), dt(2021, 4, 16)))
            .unwrap();
        planner
            .create_assignment(draft(40, dt(2021, 4, 5), dt(2021, 4, 16)))
            .unwrap();
        assert_eq!(planner.weeks().count(), 2);
    }

    #[test]
    fn exactly_one_hundred_percent_is_allowed() {
        let mut planner = Planner::new();
        planner
            .create_assignment(draft(60, dt(2021, 4, 5), dt(2021, 4, 9)))
            .unwrap();
        planner
            .create_assignment(draft(40, dt(2021, 4, 5), dt(2021, 4, 9)))
            .unwrap();
        assert_eq!(planner.total_workload("E1", WeekId::new(2021, 14)), 100);
    }
}
