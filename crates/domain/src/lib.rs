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
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod schedule;
mod seat_builder;
mod seat_editor;
mod seat_matrix;
mod settlement;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::{DomainError, ErrorCategory};
pub use schedule::{
    ConflictResource, DriverRole, ScheduleConflict, ScheduleProposal, ScheduleSlot, TimeWindow,
    check_schedule_conflicts, find_bus_conflict, find_driver_conflict, overlaps,
};
pub use seat_builder::{SeatInstantiation, instantiate_from_template};
pub use seat_editor::{
    SeatEdit, SeatReconciliation, apply_status, apply_tier, overlay_bus_seats,
    reconcile_bus_seats, set_empty_flag,
};
pub use seat_matrix::{Dimensions, Floor, Seat, SeatMatrix};
pub use settlement::{
    BusRelation, DriverRelation, ExpenseRecord, ExpenseView, RouteRelation, RouteScheduleRelation,
    ScheduleRelations, SettlementRecord, SettlementTotals, SettlementView, compute_totals,
    ensure_figures_editable, format_settlement, normalize_amount, validate_settlement_transition,
};

// Re-export public types
pub use types::{
    Bus, BusAvailability, BusSeat, BusTypeTemplate, Driver, ExpenseCategory, FloorTag,
    MaintenanceStatus, Schedule, ScheduleStatus, SeatStatus, SettlementStatus,
};
pub use validation::{
    normalize_plate_number, parse_amount, validate_amount, validate_required,
    validate_seat_matrix,
};
