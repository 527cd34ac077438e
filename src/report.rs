use crate::calendar::{WeekId, enumerate_weeks};
use crate::error::PlanningError;
use crate::planner::Planner;
use crate::week::validate_week_num;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive span of report weeks, validated so the start week is not after
/// the end week. Ordering uses the numeric week comparison, never strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    start: WeekId,
    end: WeekId,
}

impl WeekRange {
    pub fn new(start: WeekId, end: WeekId) -> Result<Self, PlanningError> {
        validate_week_num(start.week_num)?;
        validate_week_num(end.week_num)?;
        if start.ordinal() > end.ordinal() {
            return Err(PlanningError::WeekOrder {
                start_week: start.week_string(),
                end_week: end.week_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> WeekId {
        self.start
    }

    pub fn end(&self) -> WeekId {
        self.end
    }

    /// Every week in the range, chronologically.
    pub fn weeks(&self) -> Vec<WeekId> {
        match (self.start.start_date(), self.end.start_date()) {
            (Some(first), Some(last)) => enumerate_weeks(first, last),
            _ => Vec::new(),
        }
    }
}

/// One flat reporting row: a (project, employee) pair's workload in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub project_name: String,
    pub employee_name: String,
    pub week_string: String,
    pub workload: i32,
}

/// One entry of the report's "Total" row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekTotal {
    pub week_string: String,
    pub total_workload: i32,
}

/// One cell of a report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCell {
    pub week_string: String,
    pub workload: i32,
}

/// One grid line of the report: a (project, employee) pair with one cell per
/// week of the requested range, zero-filled where nothing is allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    pub project_name: String,
    pub employee_name: String,
    pub cells: Vec<ReportCell>,
}

/// The weekly staffing report: header weeks, one line per relevant
/// (project, employee) pair, and the per-week totals across all lines.
/// Pairs whose cells are all zero within the range are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningReport {
    pub weeks: Vec<String>,
    pub lines: Vec<ReportLine>,
    pub totals: Vec<WeekTotal>,
}

impl PlanningReport {
    pub fn build(planner: &Planner, range: &WeekRange) -> Self {
        let week_ids = range.weeks();
        let weeks: Vec<String> = week_ids.iter().map(|w| w.week_string()).collect();

        // Workload per (project name, employee name) pair and week. Multiple
        // assignments of the same pair in the same week are summed.
        let mut pairs: BTreeMap<(String, String), BTreeMap<WeekId, i32>> = BTreeMap::new();
        for assignment in planner.assignments() {
            let key = (
                assignment.project.name.clone(),
                assignment.employee.name.clone(),
            );
            let per_week = pairs.entry(key).or_default();
            for allocation in planner.allocations_for(assignment.id) {
                if week_ids.contains(&allocation.week) {
                    *per_week.entry(allocation.week).or_insert(0) +=
                        allocation.effective_workload;
                }
            }
        }

        let mut lines = Vec::new();
        for ((project_name, employee_name), per_week) in pairs {
            let cells: Vec<ReportCell> = week_ids
                .iter()
                .map(|week| ReportCell {
                    week_string: week.week_string(),
                    workload: per_week.get(week).copied().unwrap_or(0),
                })
                .collect();
            if cells.iter().all(|cell| cell.workload == 0) {
                continue;
            }
            lines.push(ReportLine {
                project_name,
                employee_name,
                cells,
            });
        }

        let totals = week_ids
            .iter()
            .map(|week| {
                let total_workload = lines
                    .iter()
                    .flat_map(|line| &line.cells)
                    .filter(|cell| cell.week_string == week.week_string())
                    .map(|cell| cell.workload)
                    .sum();
                WeekTotal {
                    week_string: week.week_string(),
                    total_workload,
                }
            })
            .collect();

        Self {
            weeks,
            lines,
            totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_range_is_rejected() {
        let err = WeekRange::new(WeekId::new(2021, 20), WeekId::new(2021, 14)).unwrap_err();
        assert!(matches!(err, PlanningError::WeekOrder { .. }));
    }

    #[test]
    fn range_crosses_year_boundary_in_order() {
        let range = WeekRange::new(WeekId::new(2019, 52), WeekId::new(2020, 2)).unwrap();
        let weeks = range.weeks();
        assert_eq!(
            weeks,
            vec![
                WeekId::new(2019, 52),
                WeekId::new(2020, 1),
                WeekId::new(2020, 2),
            ]
        );
    }

    #[test]
    fn range_validates_week_numbers() {
        assert!(WeekRange::new(WeekId::new(2021, 0), WeekId::new(2021, 2)).is_err());
    }
}
