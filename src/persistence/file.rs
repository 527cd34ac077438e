use super::PersistenceResult;
use crate::allocation::WeeklyAllocation;
use crate::assignment::Assignment;
use crate::config::PlannerConfig;
use crate::planner::Planner;
use crate::report::PlanningReport;
use crate::week::Week;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct PlanSnapshot {
    #[serde(default)]
    config: PlannerConfig,
    weeks: Vec<Week>,
    assignments: Vec<Assignment>,
    allocations: Vec<WeeklyAllocation>,
}

impl PlanSnapshot {
    fn from_planner(planner: &Planner) -> Self {
        Self {
            config: *planner.config(),
            weeks: planner.weeks().cloned().collect(),
            assignments: planner.assignments().cloned().collect(),
            allocations: planner.allocations().cloned().collect(),
        }
    }

    fn into_planner(self) -> PersistenceResult<Planner> {
        let planner =
            Planner::from_records(self.config, self.weeks, self.assignments, self.allocations)?;
        Ok(planner)
    }
}

pub fn save_plan_to_json<P: AsRef<Path>>(planner: &Planner, path: P) -> PersistenceResult<()> {
    let snapshot = PlanSnapshot::from_planner(planner);
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Planner> {
    let file = File::open(path)?;
    let snapshot: PlanSnapshot = serde_json::from_reader(file)?;
    snapshot.into_planner()
}

/// Writes a built report as CSV: a header of week strings, one row per
/// (project, employee) line, and the closing "Total" row.
pub fn save_report_to_csv<P: AsRef<Path>>(
    report: &PlanningReport,
    path: P,
) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["project".to_string(), "employee".to_string()];
    header.extend(report.weeks.iter().cloned());
    writer.write_record(&header)?;

    for line in &report.lines {
        let mut record = vec![line.project_name.clone(), line.employee_name.clone()];
        record.extend(line.cells.iter().map(|cell| cell.workload.to_string()));
        writer.write_record(&record)?;
    }

    let mut total_record = vec![String::new(), "Total".to_string()];
    total_record.extend(
        report
            .totals
            .iter()
            .map(|total| total.total_workload.to_string()),
    );
    writer.write_record(&total_record)?;

    writer.flush()?;
    Ok(())
}
