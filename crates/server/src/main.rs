// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use clap::Parser;
use coachline_api::{
    AddExpenseRequest, AddExpenseResponse, ApiError, ApplySeatStatusRequest,
    ApplySeatTierRequest, BusResponse, CreateBusRequest, CreateCompanyRequest,
    CreateCompanyResponse, CreateDriverRequest, CreateRouteRequest, CreateRouteResponse,
    CreateRouteScheduleRequest, CreateRouteScheduleResponse, CreateSettlementRequest,
    CreateTemplateRequest, DriverResponse, ListSchedulesResponse, ListSettlementsResponse,
    ReserveScheduleRequest, ScheduleResponse, SetDriverActiveRequest, SetSeatsEmptyRequest,
    SettlementSummaryResponse, StatusFilter, TemplateResponse, TransitionSettlementRequest,
    UpdateBusStatusRequest, UpdateScheduleRequest, UpdateScheduleStatusRequest,
    UpdateSettlementIncomeRequest, add_expense, apply_seat_status, apply_seat_tier, create_bus,
    create_company, create_driver, create_route, create_route_schedule, create_settlement,
    create_template, delete_expense, get_bus, get_schedule, get_settlement, get_template,
    list_schedules, list_settlements, reserve_schedule, set_driver_active, set_seats_empty,
    transition_settlement, update_bus_status, update_schedule, update_schedule_status,
    update_settlement_income,
};
use coachline_domain::SettlementView;
use coachline_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Coachline Server - HTTP server for coach fleet operations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,
}

/// Application state shared across handlers.
///
/// The single connection sits behind a mutex; every handler holds the lock
/// for the whole operation.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidInput { .. } | ApiError::DomainRuleViolation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %err, "Request failed");
        } else {
            warn!(error = %err, status = status.as_u16(), "Request rejected");
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Companies, routes & drivers
// ============================================================================

/// Handler for POST `/companies`.
async fn handle_create_company(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<Json<CreateCompanyResponse>, HttpError> {
    info!(name = %req.name, "Handling create_company request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(create_company(&mut persistence, &req)?))
}

/// Handler for POST `/routes`.
async fn handle_create_route(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateRouteRequest>,
) -> Result<Json<CreateRouteResponse>, HttpError> {
    info!(origin = %req.origin, destination = %req.destination, "Handling create_route request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(create_route(&mut persistence, &req)?))
}

/// Handler for POST `/route_schedules`.
async fn handle_create_route_schedule(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateRouteScheduleRequest>,
) -> Result<Json<CreateRouteScheduleResponse>, HttpError> {
    info!(route_id = req.route_id, "Handling create_route_schedule request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(create_route_schedule(&mut persistence, &req)?))
}

/// Handler for POST `/drivers`.
async fn handle_create_driver(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateDriverRequest>,
) -> Result<Json<DriverResponse>, HttpError> {
    info!("Handling create_driver request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(create_driver(&mut persistence, &req)?))
}

/// Handler for PATCH `/drivers/{id}/active`.
async fn handle_set_driver_active(
    AxumState(app_state): AxumState<AppState>,
    Path(driver_id): Path<i64>,
    Json(req): Json<SetDriverActiveRequest>,
) -> Result<Json<DriverResponse>, HttpError> {
    info!(driver_id, is_active = req.is_active, "Handling set_driver_active request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(set_driver_active(&mut persistence, driver_id, &req)?))
}

// ============================================================================
// Templates & buses
// ============================================================================

/// Handler for POST `/templates`.
async fn handle_create_template(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<Json<TemplateResponse>, HttpError> {
    info!(name = %req.name, "Handling create_template request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(create_template(&mut persistence, &req)?))
}

/// Handler for GET `/templates/{id}`.
async fn handle_get_template(
    AxumState(app_state): AxumState<AppState>,
    Path(template_id): Path<i64>,
) -> Result<Json<TemplateResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_template(&mut persistence, template_id)?))
}

/// Handler for POST `/buses`.
///
/// Copies the template's matrix onto the bus and creates one seat record per
/// sellable seat.
async fn handle_create_bus(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateBusRequest>,
) -> Result<Json<BusResponse>, HttpError> {
    info!(
        plate_number = %req.plate_number,
        template_id = req.template_id,
        "Handling create_bus request"
    );
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(create_bus(&mut persistence, &req)?))
}

/// Handler for GET `/buses/{id}`.
async fn handle_get_bus(
    AxumState(app_state): AxumState<AppState>,
    Path(bus_id): Path<i64>,
) -> Result<Json<BusResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_bus(&mut persistence, bus_id)?))
}

/// Handler for PATCH `/buses/{id}/status`.
async fn handle_update_bus_status(
    AxumState(app_state): AxumState<AppState>,
    Path(bus_id): Path<i64>,
    Json(req): Json<UpdateBusStatusRequest>,
) -> Result<Json<BusResponse>, HttpError> {
    info!(bus_id, "Handling update_bus_status request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_bus_status(&mut persistence, bus_id, &req)?))
}

/// Handler for POST `/buses/{id}/seats/empty`.
async fn handle_set_seats_empty(
    AxumState(app_state): AxumState<AppState>,
    Path(bus_id): Path<i64>,
    Json(req): Json<SetSeatsEmptyRequest>,
) -> Result<Json<BusResponse>, HttpError> {
    info!(bus_id, is_empty = req.is_empty, "Handling set_seats_empty request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(set_seats_empty(&mut persistence, bus_id, &req)?))
}

/// Handler for POST `/buses/{id}/seats/tier`.
async fn handle_apply_seat_tier(
    AxumState(app_state): AxumState<AppState>,
    Path(bus_id): Path<i64>,
    Json(req): Json<ApplySeatTierRequest>,
) -> Result<Json<BusResponse>, HttpError> {
    info!(bus_id, tier_id = %req.tier_id, "Handling apply_seat_tier request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(apply_seat_tier(&mut persistence, bus_id, &req)?))
}

/// Handler for POST `/buses/{id}/seats/status`.
async fn handle_apply_seat_status(
    AxumState(app_state): AxumState<AppState>,
    Path(bus_id): Path<i64>,
    Json(req): Json<ApplySeatStatusRequest>,
) -> Result<Json<BusResponse>, HttpError> {
    info!(bus_id, status = %req.status, "Handling apply_seat_status request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(apply_seat_status(&mut persistence, bus_id, &req)?))
}

// ============================================================================
// Schedules
// ============================================================================

/// Handler for POST `/schedules`.
///
/// The conflict check and the insert share one write transaction, so of two
/// racing overlapping reservations only the first succeeds.
async fn handle_reserve_schedule(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ReserveScheduleRequest>,
) -> Result<Json<ScheduleResponse>, HttpError> {
    info!(
        bus_id = req.bus_id,
        primary_driver_id = req.primary_driver_id,
        "Handling reserve_schedule request"
    );
    let mut persistence = app_state.persistence.lock().await;
    let response: ScheduleResponse = reserve_schedule(&mut persistence, &req)?;
    drop(persistence);

    info!(schedule_id = response.schedule_id, "Reserved schedule");
    Ok(Json(response))
}

/// Handler for GET `/schedules`.
async fn handle_list_schedules(
    AxumState(app_state): AxumState<AppState>,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<ListSchedulesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_schedules(&mut persistence, &filter)?))
}

/// Handler for GET `/schedules/{id}`.
async fn handle_get_schedule(
    AxumState(app_state): AxumState<AppState>,
    Path(schedule_id): Path<i64>,
) -> Result<Json<ScheduleResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_schedule(&mut persistence, schedule_id)?))
}

/// Handler for PATCH `/schedules/{id}`.
async fn handle_update_schedule(
    AxumState(app_state): AxumState<AppState>,
    Path(schedule_id): Path<i64>,
    Json(req): Json<UpdateScheduleRequest>,
) -> Result<Json<ScheduleResponse>, HttpError> {
    info!(schedule_id, "Handling update_schedule request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_schedule(&mut persistence, schedule_id, &req)?))
}

/// Handler for PATCH `/schedules/{id}/status`.
async fn handle_update_schedule_status(
    AxumState(app_state): AxumState<AppState>,
    Path(schedule_id): Path<i64>,
    Json(req): Json<UpdateScheduleStatusRequest>,
) -> Result<Json<ScheduleResponse>, HttpError> {
    info!(schedule_id, status = %req.status, "Handling update_schedule_status request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_schedule_status(&mut persistence, schedule_id, &req)?))
}

// ============================================================================
// Settlements
// ============================================================================

/// Handler for POST `/settlements`.
async fn handle_create_settlement(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateSettlementRequest>,
) -> Result<Json<SettlementSummaryResponse>, HttpError> {
    info!(schedule_id = req.schedule_id, "Handling create_settlement request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(create_settlement(&mut persistence, &req)?))
}

/// Handler for GET `/settlements`.
async fn handle_list_settlements(
    AxumState(app_state): AxumState<AppState>,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<ListSettlementsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_settlements(&mut persistence, &filter)?))
}

/// Handler for GET `/settlements/{id}`.
async fn handle_get_settlement(
    AxumState(app_state): AxumState<AppState>,
    Path(settlement_id): Path<i64>,
) -> Result<Json<SettlementView>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_settlement(&mut persistence, settlement_id)?))
}

/// Handler for PATCH `/settlements/{id}/income`.
async fn handle_update_settlement_income(
    AxumState(app_state): AxumState<AppState>,
    Path(settlement_id): Path<i64>,
    Json(req): Json<UpdateSettlementIncomeRequest>,
) -> Result<Json<SettlementSummaryResponse>, HttpError> {
    info!(settlement_id, "Handling update_settlement_income request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_settlement_income(
        &mut persistence,
        settlement_id,
        &req,
    )?))
}

/// Handler for POST `/settlements/{id}/expenses`.
async fn handle_add_expense(
    AxumState(app_state): AxumState<AppState>,
    Path(settlement_id): Path<i64>,
    Json(req): Json<AddExpenseRequest>,
) -> Result<Json<AddExpenseResponse>, HttpError> {
    info!(settlement_id, category = %req.category, "Handling add_expense request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(add_expense(&mut persistence, settlement_id, &req)?))
}

/// Handler for DELETE `/settlements/{id}/expenses/{expense_id}`.
async fn handle_delete_expense(
    AxumState(app_state): AxumState<AppState>,
    Path((settlement_id, expense_id)): Path<(i64, i64)>,
) -> Result<Json<SettlementSummaryResponse>, HttpError> {
    info!(settlement_id, expense_id, "Handling delete_expense request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(delete_expense(&mut persistence, settlement_id, expense_id)?))
}

/// Handler for POST `/settlements/{id}/status`.
async fn handle_transition_settlement(
    AxumState(app_state): AxumState<AppState>,
    Path(settlement_id): Path<i64>,
    Json(req): Json<TransitionSettlementRequest>,
) -> Result<Json<SettlementView>, HttpError> {
    info!(settlement_id, status = %req.status, "Handling transition_settlement request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(transition_settlement(
        &mut persistence,
        settlement_id,
        &req,
    )?))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/companies", post(handle_create_company))
        .route("/routes", post(handle_create_route))
        .route("/route_schedules", post(handle_create_route_schedule))
        .route("/drivers", post(handle_create_driver))
        .route("/drivers/{id}/active", patch(handle_set_driver_active))
        .route("/templates", post(handle_create_template))
        .route("/templates/{id}", get(handle_get_template))
        .route("/buses", post(handle_create_bus))
        .route("/buses/{id}", get(handle_get_bus))
        .route("/buses/{id}/status", patch(handle_update_bus_status))
        .route("/buses/{id}/seats/empty", post(handle_set_seats_empty))
        .route("/buses/{id}/seats/tier", post(handle_apply_seat_tier))
        .route("/buses/{id}/seats/status", post(handle_apply_seat_status))
        .route(
            "/schedules",
            post(handle_reserve_schedule).get(handle_list_schedules),
        )
        .route(
            "/schedules/{id}",
            get(handle_get_schedule).patch(handle_update_schedule),
        )
        .route("/schedules/{id}/status", patch(handle_update_schedule_status))
        .route(
            "/settlements",
            post(handle_create_settlement).get(handle_list_settlements),
        )
        .route("/settlements/{id}", get(handle_get_settlement))
        .route(
            "/settlements/{id}/income",
            patch(handle_update_settlement_income),
        )
        .route("/settlements/{id}/expenses", post(handle_add_expense))
        .route(
            "/settlements/{id}/expenses/{expense_id}",
            delete(handle_delete_expense),
        )
        .route("/settlements/{id}/status", post(handle_transition_settlement))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Coachline Server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
