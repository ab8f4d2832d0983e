// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use coachline::CoreError;
use coachline_domain::{DomainError, ErrorCategory};
use coachline_persistence::PersistenceError;
use thiserror::Error;
use tracing::error;

/// API-level errors.
///
/// These are distinct from domain, core and persistence errors and represent
/// the API contract. Messages never carry storage internals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A business rule rejected the request as given.
    #[error("Domain rule violation ({rule}): {message}")]
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// The request clashes with the current state of a resource.
    #[error("Conflict ({rule}): {message}")]
    Conflict {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the clash.
        message: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description safe to show to callers.
        message: String,
    },
}

const fn resource_type(err: &DomainError) -> &'static str {
    match err {
        DomainError::TemplateNotFound(_) => "Bus type template",
        DomainError::BusNotFound(_) => "Bus",
        DomainError::DriverNotFound(_) => "Driver",
        DomainError::CompanyNotFound(_) => "Company",
        DomainError::RouteNotFound(_) => "Route",
        DomainError::RouteScheduleNotFound(_) => "Route schedule",
        DomainError::ScheduleNotFound(_) => "Schedule",
        DomainError::SettlementNotFound(_) => "Settlement",
        DomainError::ExpenseNotFound { .. } => "Expense",
        _ => "Resource",
    }
}

/// Names the rule a validation or conflict error stands for.
const fn rule_name(err: &DomainError) -> &'static str {
    match err {
        DomainError::BusInactive(_) => "bus_active",
        DomainError::BusUnavailable { .. } => "bus_in_service",
        DomainError::DriverInactive(_) => "driver_active",
        DomainError::DuplicateDriverAssignment(_) => "distinct_drivers",
        DomainError::InvalidSettlementTransition { .. } => "settlement_transition",
        DomainError::ScheduleConflict(_) => "schedule_overlap",
        DomainError::DuplicatePlateNumber(_) => "unique_plate_number",
        DomainError::SettlementExists { .. } => "one_settlement_per_schedule",
        DomainError::SettlementLocked { .. } => "settlement_locked",
        _ => "domain_rule",
    }
}

/// Names the input field a validation error is about, if it is one.
fn input_field(err: &DomainError) -> Option<String> {
    match err {
        DomainError::InvalidField { field, .. } => Some((*field).to_string()),
        DomainError::InvalidStatus { kind, .. } => Some(kind.replace(' ', "_")),
        DomainError::InvalidAmount(_) => Some(String::from("amount")),
        DomainError::InvalidSeatMatrix(_) => Some(String::from("seat_matrix")),
        DomainError::InvalidTimeWindow { .. } => Some(String::from("estimated_arrival_time")),
        _ => None,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = match &err {
        DomainError::InvalidField { message, .. } => message.clone(),
        other => other.to_string(),
    };

    match err.category() {
        ErrorCategory::NotFound => ApiError::ResourceNotFound {
            resource_type: resource_type(&err).to_string(),
            message,
        },
        ErrorCategory::Validation => match input_field(&err) {
            Some(field) => ApiError::InvalidInput { field, message },
            None => ApiError::DomainRuleViolation {
                rule: rule_name(&err).to_string(),
                message,
            },
        },
        ErrorCategory::Conflict => ApiError::Conflict {
            rule: rule_name(&err).to_string(),
            message,
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Storage(msg) => {
            error!(error = %msg, "Storage lookup failed during rule check");
            ApiError::Internal {
                message: String::from("Storage lookup failed"),
            }
        }
    }
}

/// Translates a persistence error into an API error.
///
/// Rule violations keep their meaning; every other failure is logged and
/// reported as an opaque internal error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Rejected(core_err) => translate_core_error(core_err),
        PersistenceError::UniqueViolation(msg) => ApiError::Conflict {
            rule: String::from("unique_constraint"),
            message: unique_violation_message(&msg),
        },
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message: msg,
        },
        other => {
            error!(error = %other, "Persistence operation failed");
            ApiError::Internal {
                message: String::from("Database operation failed"),
            }
        }
    }
}

/// Turns `SQLite`'s "UNIQUE constraint failed: table.column" into a caller-facing message.
fn unique_violation_message(msg: &str) -> String {
    msg.rsplit_once('.').map_or_else(
        || String::from("A record with the same unique value already exists"),
        |(_, column)| format!("A record with the same {} already exists", column.trim()),
    )
}
