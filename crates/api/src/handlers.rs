// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Each handler validates its request, calls the persistence layer and maps
//! the outcome to a response DTO. Errors are translated explicitly; nothing
//! from the storage layer reaches the caller unfiltered.

use coachline_domain::{
    Bus, BusSeat, BusTypeTemplate, DomainError, Driver, ExpenseCategory, MaintenanceStatus,
    Schedule, ScheduleStatus, SeatStatus, SettlementRecord, SettlementStatus, SettlementView,
    format_settlement,
};
use coachline_persistence::{
    BusLayout, BusStatusUpdate, NewBus, NewExpense, NewSchedule, Persistence,
    ScheduleAssignment, SettlementSummary,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    AddExpenseRequest, AddExpenseResponse, ApplySeatStatusRequest, ApplySeatTierRequest,
    BusResponse, BusSeatInfo, CreateBusRequest, CreateCompanyRequest, CreateCompanyResponse,
    CreateDriverRequest, CreateRouteRequest, CreateRouteResponse, CreateRouteScheduleRequest,
    CreateRouteScheduleResponse, CreateSettlementRequest, CreateTemplateRequest,
    DriverResponse, ListSchedulesResponse, ListSettlementsResponse, ReserveScheduleRequest,
    ScheduleResponse, SetDriverActiveRequest, SetSeatsEmptyRequest, SettlementSummaryResponse,
    StatusFilter, TemplateResponse, TransitionSettlementRequest, UpdateBusStatusRequest,
    UpdateScheduleRequest, UpdateScheduleStatusRequest, UpdateSettlementIncomeRequest,
};

/// Parses a status or category string from a request field.
fn parse_field<T>(field: &str, value: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    T::from_str(value.trim()).map_err(|err| ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    })
}

fn driver_response(driver: Driver) -> DriverResponse {
    DriverResponse {
        driver_id: driver.driver_id,
        full_name: driver.full_name,
        license_number: driver.license_number,
        is_active: driver.is_active,
    }
}

fn bus_response(layout: BusLayout) -> BusResponse {
    let BusLayout { bus, bus_seats } = layout;
    let Bus {
        bus_id,
        plate_number,
        template_id,
        company_id,
        is_active,
        maintenance_status,
        seat_matrix,
    } = bus;

    BusResponse {
        bus_id,
        plate_number,
        template_id,
        company_id,
        is_active,
        maintenance_status: maintenance_status.as_str().to_string(),
        seat_count: seat_matrix.seat_count(),
        sellable_count: seat_matrix.sellable_count(),
        seat_matrix,
        bus_seats: bus_seats.into_iter().map(bus_seat_info).collect(),
    }
}

fn bus_seat_info(seat: BusSeat) -> BusSeatInfo {
    BusSeatInfo {
        bus_seat_id: seat.bus_seat_id,
        seat_number: seat.seat_number,
        tier_id: seat.tier_id,
        status: seat.status.as_str().to_string(),
        is_active: seat.is_active,
    }
}

fn schedule_response(schedule: Schedule) -> ScheduleResponse {
    ScheduleResponse {
        schedule_id: schedule.schedule_id,
        route_id: schedule.route_id,
        route_schedule_id: schedule.route_schedule_id,
        bus_id: schedule.bus_id,
        primary_driver_id: schedule.primary_driver_id,
        secondary_driver_id: schedule.secondary_driver_id,
        departure_date: schedule.window.start(),
        estimated_arrival_time: schedule.window.end(),
        actual_departure_time: schedule.actual_departure_time,
        actual_arrival_time: schedule.actual_arrival_time,
        price: schedule.price.to_string(),
        status: schedule.status.as_str().to_string(),
    }
}

fn summary_response(summary: SettlementSummary, message: String) -> SettlementSummaryResponse {
    SettlementSummaryResponse {
        settlement_id: summary.settlement_id,
        schedule_id: summary.schedule_id,
        status: summary.status.as_str().to_string(),
        total_income: summary.totals.total_income.to_string(),
        total_expenses: summary.totals.total_expenses.to_string(),
        net_amount: summary.totals.net_amount.to_string(),
        message,
    }
}

// ============================================================================
// Companies, routes & drivers
// ============================================================================

/// Creates a bus owner company.
///
/// # Errors
///
/// Returns `InvalidInput` for a blank name, or `Internal` if the write fails.
pub fn create_company(
    persistence: &mut Persistence,
    request: &CreateCompanyRequest,
) -> Result<CreateCompanyResponse, ApiError> {
    let company_id: i64 = persistence
        .create_company(&request.name)
        .map_err(translate_persistence_error)?;

    info!(company_id, "Created company");
    Ok(CreateCompanyResponse {
        company_id,
        name: request.name.trim().to_string(),
        message: format!("Created company {company_id}"),
    })
}

/// Creates a route.
///
/// # Errors
///
/// Returns `InvalidInput` for a blank endpoint, or `Internal` if the write fails.
pub fn create_route(
    persistence: &mut Persistence,
    request: &CreateRouteRequest,
) -> Result<CreateRouteResponse, ApiError> {
    let route_id: i64 = persistence
        .create_route(&request.origin, &request.destination)
        .map_err(translate_persistence_error)?;

    info!(route_id, "Created route");
    Ok(CreateRouteResponse {
        route_id,
        origin: request.origin.trim().to_string(),
        destination: request.destination.trim().to_string(),
        message: format!("Created route {route_id}"),
    })
}

/// Adds a recurring departure slot to a route.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown route or `InvalidInput` for a
/// malformed time.
pub fn create_route_schedule(
    persistence: &mut Persistence,
    request: &CreateRouteScheduleRequest,
) -> Result<CreateRouteScheduleResponse, ApiError> {
    let route_schedule_id: i64 = persistence
        .create_route_schedule(request.route_id, &request.departure_time)
        .map_err(translate_persistence_error)?;

    info!(route_schedule_id, route_id = request.route_id, "Created route schedule");
    Ok(CreateRouteScheduleResponse {
        route_schedule_id,
        route_id: request.route_id,
        departure_time: request.departure_time.trim().to_string(),
        message: format!("Created route schedule {route_schedule_id}"),
    })
}

/// Registers an active driver.
///
/// # Errors
///
/// Returns `InvalidInput` for a blank field or `Conflict` for a reused
/// license number.
pub fn create_driver(
    persistence: &mut Persistence,
    request: &CreateDriverRequest,
) -> Result<DriverResponse, ApiError> {
    let driver_id: i64 = persistence
        .create_driver(&request.full_name, &request.license_number)
        .map_err(translate_persistence_error)?;

    info!(driver_id, "Created driver");
    get_driver(persistence, driver_id)
}

/// Retrieves a driver.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the driver does not exist.
pub fn get_driver(persistence: &mut Persistence, driver_id: i64) -> Result<DriverResponse, ApiError> {
    persistence
        .get_driver(driver_id)
        .map_err(translate_persistence_error)?
        .map(driver_response)
        .ok_or_else(|| translate_domain_error(DomainError::DriverNotFound(driver_id)))
}

/// Activates or deactivates a driver.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the driver does not exist.
pub fn set_driver_active(
    persistence: &mut Persistence,
    driver_id: i64,
    request: &SetDriverActiveRequest,
) -> Result<DriverResponse, ApiError> {
    persistence
        .set_driver_active(driver_id, request.is_active)
        .map_err(translate_persistence_error)?;

    info!(driver_id, is_active = request.is_active, "Changed driver activation");
    get_driver(persistence, driver_id)
}

// ============================================================================
// Templates & buses
// ============================================================================

/// Creates a bus type template.
///
/// # Errors
///
/// Returns `InvalidInput` if the name is blank or the seat matrix is malformed.
pub fn create_template(
    persistence: &mut Persistence,
    request: &CreateTemplateRequest,
) -> Result<TemplateResponse, ApiError> {
    let template_id: i64 = persistence
        .create_template(&request.name, &request.seat_matrix)
        .map_err(translate_persistence_error)?;

    info!(template_id, "Created bus type template");
    get_template(persistence, template_id)
}

/// Retrieves a bus type template.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the template does not exist.
pub fn get_template(
    persistence: &mut Persistence,
    template_id: i64,
) -> Result<TemplateResponse, ApiError> {
    let template: BusTypeTemplate = persistence
        .get_template(template_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::TemplateNotFound(template_id)))?;

    Ok(TemplateResponse {
        template_id: template.template_id,
        name: template.name,
        seat_count: template.seat_matrix.seat_count(),
        sellable_count: template.seat_matrix.sellable_count(),
        seat_matrix: template.seat_matrix,
    })
}

/// Registers a bus and copies its template's seating onto it.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown template or company,
/// `InvalidInput` for a malformed plate, or `Conflict` for a taken plate.
pub fn create_bus(
    persistence: &mut Persistence,
    request: &CreateBusRequest,
) -> Result<BusResponse, ApiError> {
    let bus_id: i64 = persistence
        .create_bus(&NewBus {
            plate_number: request.plate_number.clone(),
            template_id: request.template_id,
            company_id: request.company_id,
        })
        .map_err(translate_persistence_error)?;

    info!(bus_id, template_id = request.template_id, "Created bus");
    get_bus(persistence, bus_id)
}

/// Retrieves a bus with its overlaid seat layout and seat records.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the bus does not exist.
pub fn get_bus(persistence: &mut Persistence, bus_id: i64) -> Result<BusResponse, ApiError> {
    persistence
        .get_bus_layout(bus_id)
        .map_err(translate_persistence_error)?
        .map(bus_response)
        .ok_or_else(|| translate_domain_error(DomainError::BusNotFound(bus_id)))
}

/// Changes a bus's active flag and maintenance status.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the bus does not exist or `InvalidInput`
/// for an unknown maintenance status.
pub fn update_bus_status(
    persistence: &mut Persistence,
    bus_id: i64,
    request: &UpdateBusStatusRequest,
) -> Result<BusResponse, ApiError> {
    let maintenance_status: Option<MaintenanceStatus> = request
        .maintenance_status
        .as_deref()
        .map(|value| parse_field("maintenance_status", value))
        .transpose()?;

    persistence
        .update_bus_status(
            bus_id,
            BusStatusUpdate {
                is_active: request.is_active,
                maintenance_status,
            },
        )
        .map_err(translate_persistence_error)?;

    get_bus(persistence, bus_id)
}

/// Marks seats as empty slots or sellable seats and reconciles the records.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the bus does not exist.
pub fn set_seats_empty(
    persistence: &mut Persistence,
    bus_id: i64,
    request: &SetSeatsEmptyRequest,
) -> Result<BusResponse, ApiError> {
    debug!(bus_id, seats = request.seat_ids.len(), "Setting empty flag");
    persistence
        .set_seats_empty(bus_id, &request.seat_ids, request.is_empty)
        .map(bus_response)
        .map_err(translate_persistence_error)
}

/// Assigns a pricing tier to seats.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the bus does not exist or `InvalidInput`
/// for a blank tier.
pub fn apply_seat_tier(
    persistence: &mut Persistence,
    bus_id: i64,
    request: &ApplySeatTierRequest,
) -> Result<BusResponse, ApiError> {
    debug!(bus_id, seats = request.seat_ids.len(), "Applying seat tier");
    persistence
        .apply_seat_tier(bus_id, &request.seat_ids, &request.tier_id)
        .map(bus_response)
        .map_err(translate_persistence_error)
}

/// Sets the operational status of seats.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the bus does not exist or `InvalidInput`
/// for an unknown status.
pub fn apply_seat_status(
    persistence: &mut Persistence,
    bus_id: i64,
    request: &ApplySeatStatusRequest,
) -> Result<BusResponse, ApiError> {
    let status: SeatStatus = parse_field("status", &request.status)?;

    debug!(bus_id, seats = request.seat_ids.len(), %status, "Applying seat status");
    persistence
        .apply_seat_status(bus_id, &request.seat_ids, status)
        .map(bus_response)
        .map_err(translate_persistence_error)
}

// ============================================================================
// Schedules
// ============================================================================

/// Reserves a trip.
///
/// The conflict check and the insert run in one transaction.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown route, bus or driver,
/// `InvalidInput` or `DomainRuleViolation` for an unusable request, or
/// `Conflict` if the bus or a driver is already booked.
pub fn reserve_schedule(
    persistence: &mut Persistence,
    request: &ReserveScheduleRequest,
) -> Result<ScheduleResponse, ApiError> {
    let schedule_id: i64 = persistence
        .reserve_schedule(&NewSchedule {
            route_id: request.route_id,
            route_schedule_id: request.route_schedule_id,
            bus_id: request.bus_id,
            primary_driver_id: request.primary_driver_id,
            secondary_driver_id: request.secondary_driver_id,
            departure: request.departure_date,
            estimated_arrival: request.estimated_arrival_time,
            price: request.price,
        })
        .map_err(translate_persistence_error)?;

    get_schedule(persistence, schedule_id)
}

/// Retrieves a trip.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the trip does not exist.
pub fn get_schedule(
    persistence: &mut Persistence,
    schedule_id: i64,
) -> Result<ScheduleResponse, ApiError> {
    persistence
        .get_schedule(schedule_id)
        .map_err(translate_persistence_error)?
        .map(schedule_response)
        .ok_or_else(|| translate_domain_error(DomainError::ScheduleNotFound(schedule_id)))
}

/// Lists trips by departure.
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown status filter.
pub fn list_schedules(
    persistence: &mut Persistence,
    filter: &StatusFilter,
) -> Result<ListSchedulesResponse, ApiError> {
    let status: Option<ScheduleStatus> = filter
        .status
        .as_deref()
        .map(|value| parse_field("status", value))
        .transpose()?;

    let schedules: Vec<Schedule> = persistence
        .list_schedules(status)
        .map_err(translate_persistence_error)?;

    Ok(ListSchedulesResponse {
        schedules: schedules.into_iter().map(schedule_response).collect(),
    })
}

/// Changes a trip's bus, drivers, times or price.
///
/// # Errors
///
/// Returns the same errors as [`reserve_schedule`], plus `ResourceNotFound`
/// for an unknown trip.
pub fn update_schedule(
    persistence: &mut Persistence,
    schedule_id: i64,
    request: &UpdateScheduleRequest,
) -> Result<ScheduleResponse, ApiError> {
    persistence
        .update_schedule(
            schedule_id,
            &ScheduleAssignment {
                bus_id: request.bus_id,
                primary_driver_id: request.primary_driver_id,
                secondary_driver_id: request.secondary_driver_id,
                departure: request.departure_date,
                estimated_arrival: request.estimated_arrival_time,
                price: request.price,
            },
        )
        .map(schedule_response)
        .map_err(translate_persistence_error)
}

/// Sets a trip's status.
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown status, `ResourceNotFound` for an
/// unknown trip, or `Conflict` if a reactivated trip is double-booked.
pub fn update_schedule_status(
    persistence: &mut Persistence,
    schedule_id: i64,
    request: &UpdateScheduleStatusRequest,
) -> Result<ScheduleResponse, ApiError> {
    let status: ScheduleStatus = parse_field("status", &request.status)?;

    persistence
        .update_schedule_status(schedule_id, status)
        .map(schedule_response)
        .map_err(translate_persistence_error)
}

// ============================================================================
// Settlements
// ============================================================================

/// Opens a settlement for a trip.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown trip, `Conflict` if the trip is
/// already settled, or `InvalidInput` for a negative income.
pub fn create_settlement(
    persistence: &mut Persistence,
    request: &CreateSettlementRequest,
) -> Result<SettlementSummaryResponse, ApiError> {
    let summary: SettlementSummary = persistence
        .create_settlement(
            request.schedule_id,
            request.total_income.unwrap_or(Decimal::ZERO),
        )
        .map_err(translate_persistence_error)?;

    let message: String = format!(
        "Created settlement {} for schedule {}",
        summary.settlement_id, summary.schedule_id
    );
    Ok(summary_response(summary, message))
}

/// Retrieves a settlement formatted for display.
///
/// Missing relations render as placeholders rather than failing.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the settlement does not exist.
pub fn get_settlement(
    persistence: &mut Persistence,
    settlement_id: i64,
) -> Result<SettlementView, ApiError> {
    let record: SettlementRecord = persistence
        .get_settlement(settlement_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::SettlementNotFound(settlement_id)))?;

    Ok(format_settlement(&record))
}

/// Lists settlements formatted for display, newest first.
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown status filter.
pub fn list_settlements(
    persistence: &mut Persistence,
    filter: &StatusFilter,
) -> Result<ListSettlementsResponse, ApiError> {
    let status: Option<SettlementStatus> = filter
        .status
        .as_deref()
        .map(|value| parse_field("status", value))
        .transpose()?;

    let records: Vec<SettlementRecord> = persistence
        .list_settlements(status)
        .map_err(translate_persistence_error)?;

    Ok(ListSettlementsResponse {
        settlements: records.iter().map(format_settlement).collect(),
    })
}

/// Replaces a settlement's income.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown settlement, `Conflict` if its
/// figures are locked, or `InvalidInput` for a negative income.
pub fn update_settlement_income(
    persistence: &mut Persistence,
    settlement_id: i64,
    request: &UpdateSettlementIncomeRequest,
) -> Result<SettlementSummaryResponse, ApiError> {
    let summary: SettlementSummary = persistence
        .update_settlement_income(settlement_id, request.total_income)
        .map_err(translate_persistence_error)?;

    Ok(summary_response(
        summary,
        format!("Updated income of settlement {settlement_id}"),
    ))
}

/// Records an expense.
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown category or negative amount,
/// `ResourceNotFound` for an unknown settlement, or `Conflict` if its figures
/// are locked.
pub fn add_expense(
    persistence: &mut Persistence,
    settlement_id: i64,
    request: &AddExpenseRequest,
) -> Result<AddExpenseResponse, ApiError> {
    let category: ExpenseCategory = parse_field("category", &request.category)?;

    let (expense_id, summary) = persistence
        .add_expense(
            settlement_id,
            &NewExpense {
                category,
                amount: request.amount,
                description: request.description.clone(),
            },
        )
        .map_err(translate_persistence_error)?;

    Ok(AddExpenseResponse {
        expense_id,
        settlement: summary_response(
            summary,
            format!("Added expense {expense_id} to settlement {settlement_id}"),
        ),
    })
}

/// Deletes an expense.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown settlement or expense, or
/// `Conflict` if the settlement's figures are locked.
pub fn delete_expense(
    persistence: &mut Persistence,
    settlement_id: i64,
    expense_id: i64,
) -> Result<SettlementSummaryResponse, ApiError> {
    let summary: SettlementSummary = persistence
        .delete_expense(settlement_id, expense_id)
        .map_err(translate_persistence_error)?;

    Ok(summary_response(
        summary,
        format!("Deleted expense {expense_id} from settlement {settlement_id}"),
    ))
}

/// Moves a settlement to a new status.
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown status, `ResourceNotFound` for an
/// unknown settlement, or `DomainRuleViolation` for a disallowed transition.
pub fn transition_settlement(
    persistence: &mut Persistence,
    settlement_id: i64,
    request: &TransitionSettlementRequest,
) -> Result<SettlementView, ApiError> {
    let status: SettlementStatus = parse_field("status", &request.status)?;

    persistence
        .transition_settlement(settlement_id, status)
        .map_err(translate_persistence_error)?;

    get_settlement(persistence, settlement_id)
}
