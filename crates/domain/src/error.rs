// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::schedule::ScheduleConflict;
use crate::types::{MaintenanceStatus, SettlementStatus};
use time::OffsetDateTime;

/// Broad classification of a domain error.
///
/// Callers map these onto transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A referenced record does not exist.
    NotFound,
    /// Input is malformed or references an unusable record.
    Validation,
    /// The request collides with existing state.
    Conflict,
}

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bus type template does not exist.
    TemplateNotFound(i64),
    /// Bus does not exist.
    BusNotFound(i64),
    /// Driver does not exist.
    DriverNotFound(i64),
    /// Company does not exist.
    CompanyNotFound(i64),
    /// Route does not exist.
    RouteNotFound(i64),
    /// Route schedule does not exist.
    RouteScheduleNotFound(i64),
    /// Schedule does not exist.
    ScheduleNotFound(i64),
    /// Settlement does not exist.
    SettlementNotFound(i64),
    /// Expense does not exist on the given settlement.
    ExpenseNotFound {
        /// The settlement searched.
        settlement_id: i64,
        /// The missing expense.
        expense_id: i64,
    },
    /// Seat matrix shape is malformed.
    InvalidSeatMatrix(String),
    /// Arrival is not after departure.
    InvalidTimeWindow {
        /// Proposed departure.
        start: OffsetDateTime,
        /// Proposed estimated arrival.
        end: OffsetDateTime,
    },
    /// Bus exists but is deactivated.
    BusInactive(i64),
    /// Bus exists but is not in service.
    BusUnavailable {
        /// The bus.
        bus_id: i64,
        /// Its current maintenance state.
        maintenance_status: MaintenanceStatus,
    },
    /// Driver exists but is deactivated.
    DriverInactive(i64),
    /// The same driver was proposed as both primary and secondary.
    DuplicateDriverAssignment(i64),
    /// A required text field is empty or malformed.
    InvalidField {
        /// The field name.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },
    /// A status or category string is not recognized.
    InvalidStatus {
        /// What kind of status was being parsed.
        kind: &'static str,
        /// The rejected value.
        value: String,
    },
    /// Monetary amount is malformed or negative.
    InvalidAmount(String),
    /// Settlement status change is not allowed.
    InvalidSettlementTransition {
        /// Current status.
        from: SettlementStatus,
        /// Requested status.
        to: SettlementStatus,
    },
    /// The bus or a driver is already booked for an overlapping window.
    ScheduleConflict(ScheduleConflict),
    /// A bus with this plate number already exists.
    DuplicatePlateNumber(String),
    /// The schedule already has a settlement.
    SettlementExists {
        /// The schedule.
        schedule_id: i64,
    },
    /// Settlement figures are frozen by its status.
    SettlementLocked {
        /// The settlement.
        settlement_id: i64,
        /// Its current status.
        status: SettlementStatus,
    },
}

impl DomainError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateNotFound(_)
            | Self::BusNotFound(_)
            | Self::DriverNotFound(_)
            | Self::CompanyNotFound(_)
            | Self::RouteNotFound(_)
            | Self::RouteScheduleNotFound(_)
            | Self::ScheduleNotFound(_)
            | Self::SettlementNotFound(_)
            | Self::ExpenseNotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidSeatMatrix(_)
            | Self::InvalidTimeWindow { .. }
            | Self::BusInactive(_)
            | Self::BusUnavailable { .. }
            | Self::DriverInactive(_)
            | Self::DuplicateDriverAssignment(_)
            | Self::InvalidField { .. }
            | Self::InvalidStatus { .. }
            | Self::InvalidAmount(_)
            | Self::InvalidSettlementTransition { .. } => ErrorCategory::Validation,
            Self::ScheduleConflict(_)
            | Self::DuplicatePlateNumber(_)
            | Self::SettlementExists { .. }
            | Self::SettlementLocked { .. } => ErrorCategory::Conflict,
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TemplateNotFound(id) => write!(f, "Bus type template {id} not found"),
            Self::BusNotFound(id) => write!(f, "Bus {id} not found"),
            Self::DriverNotFound(id) => write!(f, "Driver {id} not found"),
            Self::CompanyNotFound(id) => write!(f, "Company {id} not found"),
            Self::RouteNotFound(id) => write!(f, "Route {id} not found"),
            Self::RouteScheduleNotFound(id) => write!(f, "Route schedule {id} not found"),
            Self::ScheduleNotFound(id) => write!(f, "Schedule {id} not found"),
            Self::SettlementNotFound(id) => write!(f, "Settlement {id} not found"),
            Self::ExpenseNotFound {
                settlement_id,
                expense_id,
            } => {
                write!(
                    f,
                    "Expense {expense_id} not found on settlement {settlement_id}"
                )
            }
            Self::InvalidSeatMatrix(msg) => write!(f, "Invalid seat matrix: {msg}"),
            Self::InvalidTimeWindow { start, end } => {
                write!(
                    f,
                    "Estimated arrival {end} must be after departure {start}"
                )
            }
            Self::BusInactive(id) => write!(f, "Bus {id} is not active"),
            Self::BusUnavailable {
                bus_id,
                maintenance_status,
            } => {
                write!(
                    f,
                    "Bus {bus_id} is not in service (maintenance status: {maintenance_status})"
                )
            }
            Self::DriverInactive(id) => write!(f, "Driver {id} is not active"),
            Self::DuplicateDriverAssignment(id) => {
                write!(
                    f,
                    "Driver {id} cannot be both primary and secondary driver of the same trip"
                )
            }
            Self::InvalidField { field, message } => write!(f, "Invalid {field}: {message}"),
            Self::InvalidStatus { kind, value } => write!(f, "Unrecognized {kind} value: '{value}'"),
            Self::InvalidAmount(msg) => write!(f, "Invalid amount: {msg}"),
            Self::InvalidSettlementTransition { from, to } => {
                write!(f, "Cannot move settlement from {from} to {to}")
            }
            Self::ScheduleConflict(conflict) => write!(f, "{conflict}"),
            Self::DuplicatePlateNumber(plate) => {
                write!(f, "A bus with plate number '{plate}' already exists")
            }
            Self::SettlementExists { schedule_id } => {
                write!(f, "Schedule {schedule_id} already has a settlement")
            }
            Self::SettlementLocked {
                settlement_id,
                status,
            } => {
                write!(
                    f,
                    "Settlement {settlement_id} is {status}; its figures can no longer change"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
