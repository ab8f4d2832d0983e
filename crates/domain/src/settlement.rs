// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trip settlement figures and their presentation.
//!
//! A settlement is loaded together with whatever part of its relation chain
//! exists (schedule, route schedule, route, bus, template, company, primary
//! driver). Formatting never fails on a missing link; it substitutes
//! `"N/A"` or `"Unknown"` instead.

use crate::error::DomainError;
use crate::types::{ExpenseCategory, SettlementStatus};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use time::OffsetDateTime;

/// Placeholder for a relation that is absent altogether.
const NOT_AVAILABLE: &str = "N/A";
/// Placeholder for a detail missing from a relation that exists.
const UNKNOWN: &str = "Unknown";

/// A route's endpoints as loaded for a settlement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRelation {
    pub origin: Option<String>,
    pub destination: Option<String>,
}

/// A route schedule and, if found, its route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteScheduleRelation {
    pub route: Option<RouteRelation>,
}

/// A bus and, if found, its template and owner names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusRelation {
    pub plate_number: String,
    pub template_name: Option<String>,
    pub company_name: Option<String>,
}

/// The primary driver of a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverRelation {
    pub full_name: String,
}

/// The trip a settlement belongs to, with its optional relations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleRelations {
    pub departure_time: Option<OffsetDateTime>,
    pub route_schedule: Option<RouteScheduleRelation>,
    pub bus: Option<BusRelation>,
    pub primary_driver: Option<DriverRelation>,
}

/// A stored expense line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord {
    pub expense_id: i64,
    pub category: ExpenseCategory,
    /// Decimal text as stored.
    pub amount: Option<String>,
    pub description: Option<String>,
}

/// A settlement as loaded from storage.
///
/// Amounts are kept as the stored decimal text; they are only interpreted
/// when formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementRecord {
    pub settlement_id: i64,
    pub schedule_id: i64,
    pub total_income: Option<String>,
    pub total_expenses: Option<String>,
    pub net_amount: Option<String>,
    pub status: SettlementStatus,
    pub settled_at: Option<OffsetDateTime>,
    pub schedule: Option<ScheduleRelations>,
    pub expenses: Vec<ExpenseRecord>,
}

/// One expense line of a settlement view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseView {
    pub expense_id: i64,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub description: Option<String>,
}

/// A settlement flattened for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementView {
    pub settlement_id: i64,
    pub schedule_id: i64,
    /// `"Origin - Destination"`.
    pub route_name: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub departure_time: Option<OffsetDateTime>,
    pub plate_number: String,
    pub bus_type: String,
    pub owner_name: String,
    pub driver_name: Option<String>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_amount: f64,
    pub status: SettlementStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub settled_at: Option<OffsetDateTime>,
    pub expenses: Vec<ExpenseView>,
}

/// Flattens a settlement and its relations into a view.
///
/// # Arguments
///
/// * `record` - The settlement with whatever relations could be loaded
///
/// # Returns
///
/// The view. Missing relations render as placeholders, and missing or
/// unparseable amounts as zero.
#[must_use]
pub fn format_settlement(record: &SettlementRecord) -> SettlementView {
    let schedule: Option<&ScheduleRelations> = record.schedule.as_ref();
    let bus: Option<&BusRelation> = schedule.and_then(|s| s.bus.as_ref());

    let route_name: String = schedule
        .and_then(|s| s.route_schedule.as_ref())
        .and_then(|rs| rs.route.as_ref())
        .map_or_else(
            || NOT_AVAILABLE.to_string(),
            |route| {
                format!(
                    "{} - {}",
                    route.origin.as_deref().unwrap_or(UNKNOWN),
                    route.destination.as_deref().unwrap_or(UNKNOWN)
                )
            },
        );

    let (plate_number, bus_type, owner_name) = bus.map_or_else(
        || {
            (
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
            )
        },
        |bus| {
            (
                bus.plate_number.clone(),
                bus.template_name.as_deref().unwrap_or(UNKNOWN).to_string(),
                bus.company_name.as_deref().unwrap_or(UNKNOWN).to_string(),
            )
        },
    );

    SettlementView {
        settlement_id: record.settlement_id,
        schedule_id: record.schedule_id,
        route_name,
        departure_time: schedule.and_then(|s| s.departure_time),
        plate_number,
        bus_type,
        owner_name,
        driver_name: schedule
            .and_then(|s| s.primary_driver.as_ref())
            .map(|driver| driver.full_name.clone()),
        total_income: normalize_amount(record.total_income.as_deref()),
        total_expenses: normalize_amount(record.total_expenses.as_deref()),
        net_amount: normalize_amount(record.net_amount.as_deref()),
        status: record.status,
        settled_at: record.settled_at,
        expenses: record
            .expenses
            .iter()
            .map(|expense| ExpenseView {
                expense_id: expense.expense_id,
                category: expense.category,
                amount: normalize_amount(expense.amount.as_deref()),
                description: expense.description.clone(),
            })
            .collect(),
    }
}

/// Converts stored decimal text to a plain number.
///
/// Returns `0.0` for absent, unparseable or non-finite input.
#[must_use]
pub fn normalize_amount(value: Option<&str>) -> f64 {
    let Some(text) = value.map(str::trim) else {
        return 0.0;
    };

    Decimal::from_str(text)
        .ok()
        .and_then(|amount| amount.to_f64())
        .or_else(|| text.parse::<f64>().ok())
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

/// Income, expense and net figures of a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementTotals {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_amount: Decimal,
}

/// Sums expense amounts and derives the net amount.
#[must_use]
pub fn compute_totals(total_income: Decimal, expense_amounts: &[Decimal]) -> SettlementTotals {
    let total_expenses: Decimal = expense_amounts.iter().copied().sum();
    SettlementTotals {
        total_income,
        total_expenses,
        net_amount: total_income - total_expenses,
    }
}

/// Checks a settlement status change.
///
/// # Errors
///
/// Returns `DomainError::InvalidSettlementTransition` if the transition is
/// not allowed.
pub const fn validate_settlement_transition(
    from: SettlementStatus,
    to: SettlementStatus,
) -> Result<(), DomainError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(DomainError::InvalidSettlementTransition { from, to })
    }
}

/// Checks that a settlement's income and expenses may still change.
///
/// # Errors
///
/// Returns `DomainError::SettlementLocked` for approved or finalized settlements.
pub const fn ensure_figures_editable(
    settlement_id: i64,
    status: SettlementStatus,
) -> Result<(), DomainError> {
    if status.locks_figures() {
        Err(DomainError::SettlementLocked {
            settlement_id,
            status,
        })
    } else {
        Ok(())
    }
}
