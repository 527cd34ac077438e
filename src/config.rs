use serde::{Deserialize, Serialize};

/// Module-wide settings, the analog of a settings page. `filter_weeks`
/// controls the reporting-window flag on weeks: positive values look that
/// many weeks into the future, negative values that many weeks into the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub filter_weeks: i32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { filter_weeks: 8 }
    }
}
