// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Field names are snake_case. Seat matrices keep their stored camelCase
//! form. Timestamps are RFC 3339 and money is carried as decimal strings in
//! responses.

use coachline_domain::{SeatMatrix, SettlementView};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ============================================================================
// Companies, routes & drivers
// ============================================================================

/// API request to create a company.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
}

/// API response for a successful company creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCompanyResponse {
    pub company_id: i64,
    pub name: String,
    /// A success message.
    pub message: String,
}

/// API request to create a route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateRouteRequest {
    pub origin: String,
    pub destination: String,
}

/// API response for a successful route creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRouteResponse {
    pub route_id: i64,
    pub origin: String,
    pub destination: String,
    pub message: String,
}

/// API request to add a recurring departure slot to a route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateRouteScheduleRequest {
    pub route_id: i64,
    /// Local departure time, `HH:MM`.
    pub departure_time: String,
}

/// API response for a successful route schedule creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRouteScheduleResponse {
    pub route_schedule_id: i64,
    pub route_id: i64,
    pub departure_time: String,
    pub message: String,
}

/// API request to register a driver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateDriverRequest {
    pub full_name: String,
    pub license_number: String,
}

/// API request to activate or deactivate a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SetDriverActiveRequest {
    pub is_active: bool,
}

/// A driver as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverResponse {
    pub driver_id: i64,
    pub full_name: String,
    pub license_number: String,
    pub is_active: bool,
}

// ============================================================================
// Templates & buses
// ============================================================================

/// API request to create a bus type template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub seat_matrix: SeatMatrix,
}

/// A bus type template as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub template_id: i64,
    pub name: String,
    /// Cells described by the matrix, empty slots included.
    pub seat_count: usize,
    pub sellable_count: usize,
    pub seat_matrix: SeatMatrix,
}

/// API request to register a bus from a template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateBusRequest {
    pub plate_number: String,
    pub template_id: i64,
    #[serde(default)]
    pub company_id: Option<i64>,
}

/// API request to change a bus's service state. Absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateBusStatusRequest {
    #[serde(default)]
    pub is_active: Option<bool>,
    /// `active`, `in_maintenance` or `out_of_service`.
    #[serde(default)]
    pub maintenance_status: Option<String>,
}

/// One seat record of a bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusSeatInfo {
    pub bus_seat_id: Option<i64>,
    pub seat_number: String,
    pub tier_id: Option<String>,
    pub status: String,
    pub is_active: bool,
}

/// A bus with its seat layout and seat records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusResponse {
    pub bus_id: i64,
    pub plate_number: String,
    pub template_id: i64,
    pub company_id: Option<i64>,
    pub is_active: bool,
    pub maintenance_status: String,
    pub seat_count: usize,
    pub sellable_count: usize,
    /// Layout with the seat records' tier and status overlaid.
    pub seat_matrix: SeatMatrix,
    pub bus_seats: Vec<BusSeatInfo>,
}

/// API request to mark seats as empty slots or as sellable seats.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetSeatsEmptyRequest {
    pub seat_ids: Vec<String>,
    pub is_empty: bool,
}

/// API request to assign a pricing tier to seats.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplySeatTierRequest {
    pub seat_ids: Vec<String>,
    pub tier_id: String,
}

/// API request to set the operational status of seats.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplySeatStatusRequest {
    pub seat_ids: Vec<String>,
    /// `available` or `maintenance`.
    pub status: String,
}

// ============================================================================
// Schedules
// ============================================================================

/// API request to reserve a trip.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReserveScheduleRequest {
    pub route_id: i64,
    pub route_schedule_id: i64,
    pub bus_id: i64,
    pub primary_driver_id: i64,
    #[serde(default)]
    pub secondary_driver_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub departure_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub estimated_arrival_time: OffsetDateTime,
    pub price: Decimal,
}

/// API request to change a trip's assignment. Absent fields are kept; an
/// explicit `null` secondary driver removes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateScheduleRequest {
    #[serde(default)]
    pub bus_id: Option<i64>,
    #[serde(default)]
    pub primary_driver_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub secondary_driver_id: Option<Option<i64>>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub departure_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub estimated_arrival_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// API request to set a trip's status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateScheduleStatusRequest {
    /// `scheduled`, `in_progress`, `completed`, `cancelled` or `delayed`.
    pub status: String,
}

/// A trip as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub schedule_id: i64,
    pub route_id: i64,
    pub route_schedule_id: i64,
    pub bus_id: i64,
    pub primary_driver_id: i64,
    pub secondary_driver_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub departure_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub estimated_arrival_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub actual_departure_time: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub actual_arrival_time: Option<OffsetDateTime>,
    pub price: String,
    pub status: String,
}

/// Optional status filter for list operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusFilter {
    #[serde(default)]
    pub status: Option<String>,
}

/// API response listing trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSchedulesResponse {
    pub schedules: Vec<ScheduleResponse>,
}

// ============================================================================
// Settlements
// ============================================================================

/// API request to open a settlement for a trip.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateSettlementRequest {
    pub schedule_id: i64,
    /// Defaults to zero.
    #[serde(default)]
    pub total_income: Option<Decimal>,
}

/// API request to replace a settlement's income.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateSettlementIncomeRequest {
    pub total_income: Decimal,
}

/// API request to record an expense.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddExpenseRequest {
    /// `fuel`, `tolls`, `maintenance`, `driver_allowance`, `cleaning` or `other`.
    pub category: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

/// API request to move a settlement to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransitionSettlementRequest {
    /// `pending`, `approved`, `finalized` or `cancelled`.
    pub status: String,
}

/// A settlement's figures after a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummaryResponse {
    pub settlement_id: i64,
    pub schedule_id: i64,
    pub status: String,
    pub total_income: String,
    pub total_expenses: String,
    pub net_amount: String,
    pub message: String,
}

/// API response for a recorded expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddExpenseResponse {
    pub expense_id: i64,
    pub settlement: SettlementSummaryResponse,
}

/// API response listing settlements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSettlementsResponse {
    pub settlements: Vec<SettlementView>,
}
