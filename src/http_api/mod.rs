use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    Assignment, AssignmentDraft, BreakdownRow, PlannerConfig, PlanningError, PlanningReport,
    WeekId, WeekRange, WeekTotal, WeeklyAllocation, planner::Planner,
};

/// Shared planner handle. The `RwLock` is the serialization point required by
/// the conservation invariant: writers hold it exclusively for the whole
/// validate-then-commit sequence, so two concurrent edits cannot both pass
/// the check and jointly exceed 100%.
#[derive(Clone)]
pub struct AppState {
    planner: Arc<RwLock<Planner>>,
}

impl AppState {
    pub fn new(planner: Planner) -> Self {
        Self {
            planner: Arc::new(RwLock::new(planner)),
        }
    }

    pub fn with_shared(planner: Arc<RwLock<Planner>>) -> Self {
        Self { planner }
    }

    fn planner(&self) -> Arc<RwLock<Planner>> {
        self.planner.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl From<PlanningError> for ApiError {
    fn from(value: PlanningError) -> Self {
        match value {
            PlanningError::WorkloadConservation { .. } => ApiError::Conflict(value.to_string()),
            PlanningError::AssignmentNotFound { .. }
            | PlanningError::AllocationNotFound { .. } => ApiError::NotFound(value.to_string()),
            _ => ApiError::Invalid(value.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                let body = Json(ErrorBody {
                    error: "not_found",
                    message,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Conflict(message) => {
                let body = Json(ErrorBody {
                    error: "conflict",
                    message,
                });
                (StatusCode::CONFLICT, body).into_response()
            }
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SetWorkloadPayload {
    workload: i32,
}

#[derive(Debug, Default, Deserialize)]
struct RefreshWindowsPayload {
    today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    start_year: i32,
    start_week: u32,
    end_year: i32,
    end_week: u32,
    project: Option<String>,
    employee: Option<String>,
}

impl ReportQuery {
    fn range(&self) -> Result<WeekRange, ApiError> {
        let range = WeekRange::new(
            WeekId::new(self.start_year, self.start_week),
            WeekId::new(self.end_year, self.end_week),
        )?;
        Ok(range)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(get_config).put(update_config))
        .route("/assignments", get(list_assignments).post(create_assignment))
        .route(
            "/assignments/:id",
            get(get_assignment)
                .put(update_assignment)
                .delete(delete_assignment),
        )
        .route("/assignments/:id/extend", post(extend_assignment))
        .route("/assignments/:id/shrink", post(shrink_assignment))
        .route("/assignments/:id/weeks", get(list_allocations))
        .route(
            "/assignments/:id/weeks/:year/:week_num",
            put(set_weekly_workload),
        )
        .route("/report", get(build_report))
        .route("/report/breakdown", get(report_breakdown))
        .route("/report/totals", get(report_totals))
        .route("/refresh_windows", post(refresh_windows))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, planner: Planner) -> std::io::Result<()> {
    let state = AppState::new(planner);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "resource-planner HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_config(State(state): State<AppState>) -> Json<PlannerConfig> {
    let planner = state.planner();
    let config = *planner.read().config();
    Json(config)
}

async fn update_config(
    State(state): State<AppState>,
    Json(config): Json<PlannerConfig>,
) -> Json<PlannerConfig> {
    let planner = state.planner();
    let mut guard = planner.write();
    guard.set_filter_weeks(config.filter_weeks);
    Json(*guard.config())
}

async fn list_assignments(State(state): State<AppState>) -> Json<Vec<Assignment>> {
    let planner = state.planner();
    let assignments = planner.read().assignments().cloned().collect();
    Json(assignments)
}

async fn create_assignment(
    State(state): State<AppState>,
    Json(draft): Json<AssignmentDraft>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    let planner = state.planner();
    let created = {
        let mut guard = planner.write();
        let id = guard.create_assignment(draft)?;
        guard
            .assignment(id)
            .cloned()
            .ok_or_else(|| ApiError::Invalid("assignment missing after creation".into()))?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_assignment(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Assignment>, ApiError> {
    let planner = state.planner();
    let assignment = planner
        .read()
        .assignment(id)
        .cloned()
        .ok_or(PlanningError::AssignmentNotFound { id })?;
    Ok(Json(assignment))
}

async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(draft): Json<AssignmentDraft>,
) -> Result<Json<Assignment>, ApiError> {
    let planner = state.planner();
    let updated = {
        let mut guard = planner.write();
        guard.update_assignment(id, draft)?;
        guard
            .assignment(id)
            .cloned()
            .ok_or(PlanningError::AssignmentNotFound { id })?
    };
    Ok(Json(updated))
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    let planner = state.planner();
    planner.write().delete_assignment(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn extend_assignment(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Assignment>, ApiError> {
    let planner = state.planner();
    let updated = {
        let mut guard = planner.write();
        guard.extend_by_one_week(id)?;
        guard
            .assignment(id)
            .cloned()
            .ok_or(PlanningError::AssignmentNotFound { id })?
    };
    Ok(Json(updated))
}

async fn shrink_assignment(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Assignment>, ApiError> {
    let planner = state.planner();
    let updated = {
        let mut guard = planner.write();
        guard.shrink_by_one_week(id)?;
        guard
            .assignment(id)
            .cloned()
            .ok_or(PlanningError::AssignmentNotFound { id })?
    };
    Ok(Json(updated))
}

async fn list_allocations(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Vec<WeeklyAllocation>>, ApiError> {
    let planner = state.planner();
    let guard = planner.read();
    if guard.assignment(id).is_none() {
        return Err(PlanningError::AssignmentNotFound { id }.into());
    }
    let allocations = guard.allocations_for(id).into_iter().cloned().collect();
    Ok(Json(allocations))
}

async fn set_weekly_workload(
    State(state): State<AppState>,
    Path((id, year, week_num)): Path<(u32, i32, u32)>,
    Json(payload): Json<SetWorkloadPayload>,
) -> Result<Json<WeeklyAllocation>, ApiError> {
    let week = WeekId::new(year, week_num);
    let planner = state.planner();
    let updated = {
        let mut guard = planner.write();
        guard.set_effective_workload(id, week, payload.workload)?;
        guard
            .allocation(id, week)
            .cloned()
            .ok_or(PlanningError::AllocationNotFound {
                assignment_id: id,
                week_string: week.week_string(),
            })?
    };
    Ok(Json(updated))
}

async fn build_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<PlanningReport>, ApiError> {
    let range = query.range()?;
    let planner = state.planner();
    let report = PlanningReport::build(&planner.read(), &range);
    Ok(Json(report))
}

async fn report_breakdown(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<BreakdownRow>>, ApiError> {
    let range = query.range()?;
    let planner = state.planner();
    let rows = planner.read().weekly_breakdown(
        query.project.as_deref(),
        query.employee.as_deref(),
        &range,
    );
    Ok(Json(rows))
}

async fn report_totals(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<WeekTotal>>, ApiError> {
    let range = query.range()?;
    let planner = state.planner();
    let totals = planner.read().total_per_week(&range);
    Ok(Json(totals))
}

async fn refresh_windows(
    State(state): State<AppState>,
    payload: Option<Json<RefreshWindowsPayload>>,
) -> StatusCode {
    let today = payload
        .and_then(|Json(body)| body.today)
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let planner = state.planner();
    planner.write().refresh_week_windows(today);
    StatusCode::NO_CONTENT
}
