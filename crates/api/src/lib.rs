// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the coach operations backend.
//!
//! Handlers take request DTOs, call into persistence and return response
//! DTOs. Domain, core and persistence errors are translated into
//! [`ApiError`] here; the HTTP layer only maps categories to status codes.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use error::{ApiError, translate_core_error, translate_domain_error, translate_persistence_error};
pub use handlers::{
    add_expense, apply_seat_status, apply_seat_tier, create_bus, create_company, create_driver,
    create_route, create_route_schedule, create_settlement, create_template, delete_expense,
    get_bus, get_driver, get_schedule, get_settlement, get_template, list_schedules,
    list_settlements, reserve_schedule, set_driver_active, set_seats_empty,
    transition_settlement, update_bus_status, update_schedule, update_schedule_status,
    update_settlement_income,
};
pub use request_response::{
    AddExpenseRequest, AddExpenseResponse, ApplySeatStatusRequest, ApplySeatTierRequest,
    BusResponse, BusSeatInfo, CreateBusRequest, CreateCompanyRequest, CreateCompanyResponse,
    CreateDriverRequest, CreateRouteRequest, CreateRouteResponse, CreateRouteScheduleRequest,
    CreateRouteScheduleResponse, CreateSettlementRequest, CreateTemplateRequest,
    DriverResponse, ListSchedulesResponse, ListSettlementsResponse, ReserveScheduleRequest,
    ScheduleResponse, SetDriverActiveRequest, SetSeatsEmptyRequest, SettlementSummaryResponse,
    StatusFilter, TemplateResponse, TransitionSettlementRequest, UpdateBusStatusRequest,
    UpdateScheduleRequest, UpdateScheduleStatusRequest, UpdateSettlementIncomeRequest,
};
