use super::{PersistenceError, PersistenceResult, PlanStore};
use crate::allocation::WeeklyAllocation;
use crate::assignment::Assignment;
use crate::calendar::WeekId;
use crate::config::PlannerConfig;
use crate::directory::{EmployeeRef, ProjectRef};
use crate::planner::Planner;
use crate::week::Week;
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS planner_config (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                filter_weeks INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS weeks (
                year INTEGER NOT NULL,
                week_num INTEGER NOT NULL CHECK (week_num BETWEEN 1 AND 53),
                in_window INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (year, week_num)
            );
            CREATE TABLE IF NOT EXISTS assignments (
                id INTEGER PRIMARY KEY,
                project_id TEXT NOT NULL,
                project_name TEXT NOT NULL,
                employee_id TEXT NOT NULL,
                employee_name TEXT NOT NULL,
                base_workload INTEGER NOT NULL CHECK (base_workload BETWEEN 0 AND 100),
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                weeks_added INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS weekly_allocations (
                assignment_id INTEGER NOT NULL
                    REFERENCES assignments(id) ON DELETE CASCADE,
                year INTEGER NOT NULL,
                week_num INTEGER NOT NULL,
                effective_workload INTEGER NOT NULL
                    CHECK (effective_workload BETWEEN 0 AND 100),
                manually_changed INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (assignment_id, year, week_num),
                FOREIGN KEY (year, week_num) REFERENCES weeks(year, week_num)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_config(tx: &rusqlite::Transaction, config: &PlannerConfig) -> PersistenceResult<()> {
        tx.execute("DELETE FROM planner_config", [])?;
        tx.execute(
            "INSERT INTO planner_config (id, filter_weeks) VALUES (1, ?1)",
            params![config.filter_weeks],
        )?;
        Ok(())
    }

    fn save_weeks<'a>(
        tx: &rusqlite::Transaction,
        weeks: impl Iterator<Item = &'a Week>,
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM weeks", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO weeks (year, week_num, in_window) VALUES (?1, ?2, ?3)")?;
        for week in weeks {
            stmt.execute(params![week.id.year, week.id.week_num, week.in_window])?;
        }
        Ok(())
    }

    fn save_assignments<'a>(
        tx: &rusqlite::Transaction,
        assignments: impl Iterator<Item = &'a Assignment>,
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM assignments", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO assignments (id, project_id, project_name, employee_id, \
             employee_name, base_workload, start_date, end_date, weeks_added) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for assignment in assignments {
            stmt.execute(params![
                assignment.id,
                assignment.project.id,
                assignment.project.name,
                assignment.employee.id,
                assignment.employee.name,
                assignment.base_workload,
                assignment.start_date.format(DATETIME_FORMAT).to_string(),
                assignment.end_date.format(DATETIME_FORMAT).to_string(),
                assignment.weeks_added,
            ])?;
        }
        Ok(())
    }

    fn save_allocations<'a>(
        tx: &rusqlite::Transaction,
        allocations: impl Iterator<Item = &'a WeeklyAllocation>,
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM weekly_allocations", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO weekly_allocations (assignment_id, year, week_num, \
             effective_workload, manually_changed) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for allocation in allocations {
            stmt.execute(params![
                allocation.assignment_id,
                allocation.week.year,
                allocation.week.week_num,
                allocation.effective_workload,
                allocation.manually_changed,
            ])?;
        }
        Ok(())
    }

    fn parse_datetime(raw: &str) -> PersistenceResult<NaiveDateTime> {
        NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
            .map_err(|err| PersistenceError::InvalidData(format!("bad datetime '{raw}': {err}")))
    }
}

impl PlanStore for SqlitePlanStore {
    fn save_plan(&self, planner: &Planner) -> PersistenceResult<()> {
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        Self::save_config(&tx, planner.config())?;
        Self::save_weeks(&tx, planner.weeks())?;
        Self::save_assignments(&tx, planner.assignments())?;
        Self::save_allocations(&tx, planner.allocations())?;
        tx.commit()?;
        tracing::debug!("plan saved to sqlite");
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<Option<Planner>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT filter_weeks FROM planner_config WHERE id = 1")?;
        let filter_weeks: Option<i32> = stmt.query_row([], |row| row.get(0)).optional()?;
        let Some(filter_weeks) = filter_weeks else {
            return Ok(None);
        };
        let config = PlannerConfig { filter_weeks };

        let mut stmt = conn.prepare("SELECT year, week_num, in_window FROM weeks")?;
        let weeks = stmt
            .query_map([], |row| {
                Ok(Week {
                    id: WeekId::new(row.get(0)?, row.get(1)?),
                    in_window: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT id, project_id, project_name, employee_id, employee_name, \
             base_workload, start_date, end_date, weeks_added FROM assignments ORDER BY id",
        )?;
        let raw_assignments = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i32>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, i32>(8)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut assignments = Vec::with_capacity(raw_assignments.len());
        for (id, project_id, project_name, employee_id, employee_name, base, start, end, added) in
            raw_assignments
        {
            assignments.push(Assignment {
                id,
                project: ProjectRef::new(project_id, project_name),
                employee: EmployeeRef::new(employee_id, employee_name),
                base_workload: base,
                start_date: Self::parse_datetime(&start)?,
                end_date: Self::parse_datetime(&end)?,
                weeks_added: added,
            });
        }

        let mut stmt = conn.prepare(
            "SELECT assignment_id, year, week_num, effective_workload, manually_changed \
             FROM weekly_allocations ORDER BY assignment_id, year, week_num",
        )?;
        let allocations = stmt
            .query_map([], |row| {
                Ok(WeeklyAllocation {
                    assignment_id: row.get(0)?,
                    week: WeekId::new(row.get(1)?, row.get(2)?),
                    effective_workload: row.get(3)?,
                    manually_changed: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let planner = Planner::from_records(config, weeks, assignments, allocations)?;
        Ok(Some(planner))
    }
}
