// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::schedule::{ScheduleSlot, TimeWindow};
use crate::seat_matrix::SeatMatrix;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Operational status of a single seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    /// The seat can be sold.
    #[default]
    Available,
    /// The seat is out of service.
    Maintenance,
}

impl SeatStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Maintenance => "maintenance",
        }
    }
}

impl FromStr for SeatStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "maintenance" => Ok(Self::Maintenance),
            _ => Err(DomainError::InvalidStatus {
                kind: "seat status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies which deck of a bus a seat sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorTag {
    /// The lower (or only) deck.
    First,
    /// The upper deck of a double-decker.
    Second,
}

impl FloorTag {
    /// Converts this tag to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
        }
    }
}

impl std::fmt::Display for FloorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a trip instance.
///
/// Transitions are not enforced: any status may be set on any schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Planned and not yet departed.
    #[default]
    Scheduled,
    /// On the road.
    InProgress,
    /// Arrived.
    Completed,
    /// Called off.
    Cancelled,
    /// Running late.
    Delayed,
}

impl ScheduleStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Delayed => "delayed",
        }
    }

    /// Returns whether a schedule in this status occupies its bus and drivers.
    ///
    /// Only scheduled and in-progress trips take part in conflict detection.
    #[must_use]
    pub const fn occupies_resources(&self) -> bool {
        matches!(self, Self::Scheduled | Self::InProgress)
    }
}

impl FromStr for ScheduleStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "delayed" => Ok(Self::Delayed),
            _ => Err(DomainError::InvalidStatus {
                kind: "schedule status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a trip settlement.
///
/// Valid transitions are:
/// - Pending → Approved
/// - Approved → Finalized
/// - Pending → Cancelled
/// - Approved → Cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    /// Open for income and expense changes.
    #[default]
    Pending,
    /// Reviewed; figures are frozen.
    Approved,
    /// Closed for good.
    Finalized,
    /// Abandoned.
    Cancelled,
}

impl SettlementStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Finalized => "finalized",
            Self::Cancelled => "cancelled",
        }
    }

    /// Checks if a transition from this state to another is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Approved | Self::Cancelled)
                | (Self::Approved, Self::Finalized | Self::Cancelled)
        )
    }

    /// Returns whether expenses and income are frozen in this state.
    #[must_use]
    pub const fn locks_figures(&self) -> bool {
        matches!(self, Self::Approved | Self::Finalized)
    }
}

impl FromStr for SettlementStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "finalized" => Ok(Self::Finalized),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidStatus {
                kind: "settlement status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maintenance state of a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    /// In service.
    #[default]
    Active,
    /// Temporarily in the workshop.
    InMaintenance,
    /// Withdrawn from service.
    OutOfService,
}

impl MaintenanceStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InMaintenance => "in_maintenance",
            Self::OutOfService => "out_of_service",
        }
    }
}

impl FromStr for MaintenanceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "in_maintenance" => Ok(Self::InMaintenance),
            "out_of_service" => Ok(Self::OutOfService),
            _ => Err(DomainError::InvalidStatus {
                kind: "maintenance status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of a trip expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Fuel,
    Tolls,
    Maintenance,
    DriverAllowance,
    Cleaning,
    Other,
}

impl ExpenseCategory {
    /// Converts this category to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fuel => "fuel",
            Self::Tolls => "tolls",
            Self::Maintenance => "maintenance",
            Self::DriverAllowance => "driver_allowance",
            Self::Cleaning => "cleaning",
            Self::Other => "other",
        }
    }
}

impl FromStr for ExpenseCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fuel" => Ok(Self::Fuel),
            "tolls" => Ok(Self::Tolls),
            "maintenance" => Ok(Self::Maintenance),
            "driver_allowance" => Ok(Self::DriverAllowance),
            "cleaning" => Ok(Self::Cleaning),
            "other" => Ok(Self::Other),
            _ => Err(DomainError::InvalidStatus {
                kind: "expense category",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reusable seating layout for a model of bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusTypeTemplate {
    /// The canonical identifier assigned by the database.
    pub template_id: i64,
    /// Display name of the bus type (e.g. "Sleeper 40").
    pub name: String,
    /// Design-time seating layout.
    pub seat_matrix: SeatMatrix,
}

/// A physical bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bus {
    /// The canonical identifier assigned by the database.
    pub bus_id: i64,
    /// Registration plate, normalized to uppercase.
    pub plate_number: String,
    /// The template this bus was instantiated from.
    pub template_id: i64,
    /// The owning company, if recorded.
    pub company_id: Option<i64>,
    /// Whether the bus may be assigned to trips.
    pub is_active: bool,
    /// Workshop state.
    pub maintenance_status: MaintenanceStatus,
    /// The bus's own copy of its seating layout.
    pub seat_matrix: SeatMatrix,
}

impl Bus {
    /// Returns the fields relevant to trip assignment.
    #[must_use]
    pub const fn availability(&self) -> BusAvailability {
        BusAvailability {
            bus_id: self.bus_id,
            is_active: self.is_active,
            maintenance_status: self.maintenance_status,
        }
    }
}

/// The subset of a bus needed to decide whether it can take a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusAvailability {
    pub bus_id: i64,
    pub is_active: bool,
    pub maintenance_status: MaintenanceStatus,
}

/// A sellable seat record, keyed by `(bus_id, seat_number)`.
///
/// `seat_number` matches the `name` of a non-empty seat in the bus's seat matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusSeat {
    /// The canonical identifier. `None` until persisted.
    pub bus_seat_id: Option<i64>,
    pub bus_id: i64,
    pub seat_number: String,
    pub tier_id: Option<String>,
    pub status: SeatStatus,
    pub is_active: bool,
}

impl BusSeat {
    /// Creates a new, unpersisted, available and active seat record.
    #[must_use]
    pub const fn new(bus_id: i64, seat_number: String, tier_id: Option<String>) -> Self {
        Self {
            bus_seat_id: None,
            bus_id,
            seat_number,
            tier_id,
            status: SeatStatus::Available,
            is_active: true,
        }
    }
}

/// A person who can drive trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub driver_id: i64,
    pub full_name: String,
    pub license_number: String,
    pub is_active: bool,
}

/// A concrete trip instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_id: i64,
    pub route_id: i64,
    pub route_schedule_id: i64,
    pub bus_id: i64,
    pub primary_driver_id: i64,
    pub secondary_driver_id: Option<i64>,
    /// Planned departure and estimated arrival.
    pub window: TimeWindow,
    #[serde(with = "time::serde::rfc3339::option")]
    pub actual_departure_time: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub actual_arrival_time: Option<OffsetDateTime>,
    pub price: Decimal,
    pub status: ScheduleStatus,
}

impl Schedule {
    /// Projects this schedule onto the fields used by conflict detection.
    #[must_use]
    pub const fn slot(&self) -> ScheduleSlot {
        ScheduleSlot {
            schedule_id: self.schedule_id,
            bus_id: self.bus_id,
            primary_driver_id: self.primary_driver_id,
            secondary_driver_id: self.secondary_driver_id,
            window: self.window,
            status: self.status,
        }
    }
}
