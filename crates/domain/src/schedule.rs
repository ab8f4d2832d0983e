// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time windows and overlap rules for trip assignment.
//!
//! A bus or driver is busy for the closed interval
//! `[departure, estimated_arrival]` of every scheduled or in-progress trip.
//! Two closed intervals overlap when `s1 <= e2 && s2 <= e1`; touching
//! endpoints therefore conflict.
//!
//! Drivers are pooled across roles: a driver who is secondary on one trip
//! cannot be primary (or secondary) on an overlapping trip.

use crate::error::DomainError;
use crate::types::ScheduleStatus;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A closed interval `[start, end]` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "time::serde::rfc3339")]
    start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    end: OffsetDateTime,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimeWindow` if `end` is not after `start`.
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::InvalidTimeWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the departure instant.
    #[must_use]
    pub const fn start(&self) -> OffsetDateTime {
        self.start
    }

    /// Returns the estimated arrival instant.
    #[must_use]
    pub const fn end(&self) -> OffsetDateTime {
        self.end
    }

    /// Returns whether two windows share at least one instant.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        overlaps(self, other)
    }
}

/// Inclusive interval overlap test.
///
/// Symmetric in its arguments.
#[must_use]
pub fn overlaps(a: &TimeWindow, b: &TimeWindow) -> bool {
    a.start <= b.end && b.start <= a.end
}

/// Role a driver plays on a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverRole {
    Primary,
    Secondary,
}

impl DriverRole {
    /// Returns the role as a lowercase word.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for DriverRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An existing trip as seen by the conflict detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub schedule_id: i64,
    pub bus_id: i64,
    pub primary_driver_id: i64,
    pub secondary_driver_id: Option<i64>,
    pub window: TimeWindow,
    pub status: ScheduleStatus,
}

impl ScheduleSlot {
    /// Returns whether the driver appears on this trip in either role.
    #[must_use]
    pub fn involves_driver(&self, driver_id: i64) -> bool {
        self.primary_driver_id == driver_id || self.secondary_driver_id == Some(driver_id)
    }
}

/// A trip assignment awaiting validation.
///
/// `schedule_id` is set when an existing trip is being updated so that the
/// trip does not conflict with itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleProposal {
    pub schedule_id: Option<i64>,
    pub bus_id: i64,
    pub primary_driver_id: i64,
    pub secondary_driver_id: Option<i64>,
    pub window: TimeWindow,
}

impl ScheduleProposal {
    /// Returns the proposed drivers in check order: primary, then secondary.
    #[must_use]
    pub fn driver_assignments(&self) -> Vec<(DriverRole, i64)> {
        let mut assignments: Vec<(DriverRole, i64)> =
            vec![(DriverRole::Primary, self.primary_driver_id)];
        if let Some(secondary) = self.secondary_driver_id {
            assignments.push((DriverRole::Secondary, secondary));
        }
        assignments
    }

    fn collides_with(&self, slot: &ScheduleSlot) -> bool {
        slot.status.occupies_resources()
            && self.schedule_id != Some(slot.schedule_id)
            && self.window.overlaps(&slot.window)
    }
}

/// The resource that is double-booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resource", rename_all = "snake_case")]
pub enum ConflictResource {
    Bus {
        bus_id: i64,
    },
    Driver {
        driver_id: i64,
        /// The role the driver was proposed for.
        role: DriverRole,
    },
}

/// Details of a rejected assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub resource: ConflictResource,
    /// The existing trip that holds the resource.
    pub conflicting_schedule_id: i64,
}

impl std::fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.resource {
            ConflictResource::Bus { bus_id } => write!(
                f,
                "Bus {bus_id} is already assigned to schedule {} during this time window",
                self.conflicting_schedule_id
            ),
            ConflictResource::Driver { driver_id, role } => write!(
                f,
                "Driver {driver_id} (proposed as {role} driver) is already assigned to schedule {} during this time window",
                self.conflicting_schedule_id
            ),
        }
    }
}

/// Finds an existing trip holding the proposal's bus during an overlapping window.
#[must_use]
pub fn find_bus_conflict(
    proposal: &ScheduleProposal,
    existing: &[ScheduleSlot],
) -> Option<ScheduleConflict> {
    existing
        .iter()
        .find(|slot| slot.bus_id == proposal.bus_id && proposal.collides_with(slot))
        .map(|slot| ScheduleConflict {
            resource: ConflictResource::Bus {
                bus_id: proposal.bus_id,
            },
            conflicting_schedule_id: slot.schedule_id,
        })
}

/// Finds an existing trip on which the driver is busy, in either role,
/// during an overlapping window.
#[must_use]
pub fn find_driver_conflict(
    proposal: &ScheduleProposal,
    role: DriverRole,
    driver_id: i64,
    existing: &[ScheduleSlot],
) -> Option<ScheduleConflict> {
    existing
        .iter()
        .find(|slot| slot.involves_driver(driver_id) && proposal.collides_with(slot))
        .map(|slot| ScheduleConflict {
            resource: ConflictResource::Driver { driver_id, role },
            conflicting_schedule_id: slot.schedule_id,
        })
}

/// Checks a proposal against a set of existing trips.
///
/// Checks run bus, primary driver, secondary driver; the first conflict found
/// is reported.
///
/// # Errors
///
/// Returns `DomainError::ScheduleConflict` describing the first collision.
pub fn check_schedule_conflicts(
    proposal: &ScheduleProposal,
    existing: &[ScheduleSlot],
) -> Result<(), DomainError> {
    if let Some(conflict) = find_bus_conflict(proposal, existing) {
        return Err(DomainError::ScheduleConflict(conflict));
    }

    for (role, driver_id) in proposal.driver_assignments() {
        if let Some(conflict) = find_driver_conflict(proposal, role, driver_id, existing) {
            return Err(DomainError::ScheduleConflict(conflict));
        }
    }

    Ok(())
}
