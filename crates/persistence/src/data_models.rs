// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use coachline_domain::{
    Bus, BusSeat, ExpenseCategory, MaintenanceStatus, SettlementStatus, SettlementTotals,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;

/// Input for registering a bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBus {
    /// Normalized to uppercase before storage.
    pub plate_number: String,
    pub template_id: i64,
    pub company_id: Option<i64>,
}

/// Partial update of a bus's service state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStatusUpdate {
    pub is_active: Option<bool>,
    pub maintenance_status: Option<MaintenanceStatus>,
}

/// A bus together with its seat records.
///
/// The bus's seat matrix has the records' tier and status overlaid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusLayout {
    pub bus: Bus,
    pub bus_seats: Vec<BusSeat>,
}

/// Input for reserving a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchedule {
    pub route_id: i64,
    pub route_schedule_id: i64,
    pub bus_id: i64,
    pub primary_driver_id: i64,
    pub secondary_driver_id: Option<i64>,
    pub departure: OffsetDateTime,
    pub estimated_arrival: OffsetDateTime,
    pub price: Decimal,
}

/// Partial update of a trip's assignment. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleAssignment {
    pub bus_id: Option<i64>,
    pub primary_driver_id: Option<i64>,
    /// `Some(None)` removes the secondary driver.
    pub secondary_driver_id: Option<Option<i64>>,
    pub departure: Option<OffsetDateTime>,
    pub estimated_arrival: Option<OffsetDateTime>,
    pub price: Option<Decimal>,
}

/// Input for recording a trip expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// A settlement's stored figures after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementSummary {
    pub settlement_id: i64,
    pub schedule_id: i64,
    pub status: SettlementStatus,
    pub totals: SettlementTotals,
}
