// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trip assignment checks.
//!
//! A proposal is checked in a fixed order and the first failure is reported:
//!
//! 1. The bus exists, is active and is in service
//! 2. The primary driver exists and is active
//! 3. The secondary driver, if any, exists, is active and is not the primary
//! 4. The bus is free for the window
//! 5. The primary driver is free for the window
//! 6. The secondary driver is free for the window
//!
//! The window itself (arrival after departure) is checked when the
//! [`TimeWindow`](coachline_domain::TimeWindow) is built.

use crate::error::CoreError;
use crate::store::FleetStore;
use coachline_domain::{
    BusAvailability, DomainError, Driver, DriverRole, MaintenanceStatus, ScheduleProposal,
    ScheduleSlot, find_bus_conflict, find_driver_conflict,
};

/// Validates a trip assignment against the fleet.
///
/// # Arguments
///
/// * `store` - Access to buses, drivers and existing trips
/// * `proposal` - The assignment to check; set `schedule_id` when updating
///
/// # Errors
///
/// Returns `CoreError::DomainViolation` with:
/// - `BusNotFound` / `DriverNotFound` for a missing record
/// - `BusInactive`, `BusUnavailable`, `DriverInactive` or
///   `DuplicateDriverAssignment` for an unusable record
/// - `ScheduleConflict` for the first double-booking found
///
/// Returns `CoreError::Storage` if a lookup fails.
pub fn validate_schedule_proposal<S>(
    store: &mut S,
    proposal: &ScheduleProposal,
) -> Result<(), CoreError>
where
    S: FleetStore + ?Sized,
{
    ensure_bus_assignable(store, proposal.bus_id)?;
    ensure_driver_assignable(store, proposal.primary_driver_id)?;
    if let Some(secondary) = proposal.secondary_driver_id {
        if secondary == proposal.primary_driver_id {
            return Err(DomainError::DuplicateDriverAssignment(secondary).into());
        }
        ensure_driver_assignable(store, secondary)?;
    }

    let bus_schedules: Vec<ScheduleSlot> =
        store.active_schedules_for_bus(proposal.bus_id, proposal.schedule_id)?;
    if let Some(conflict) = find_bus_conflict(proposal, &bus_schedules) {
        return Err(DomainError::ScheduleConflict(conflict).into());
    }

    for (role, driver_id) in proposal.driver_assignments() {
        check_driver_free(store, proposal, role, driver_id)?;
    }

    Ok(())
}

fn check_driver_free<S>(
    store: &mut S,
    proposal: &ScheduleProposal,
    role: DriverRole,
    driver_id: i64,
) -> Result<(), CoreError>
where
    S: FleetStore + ?Sized,
{
    let driver_schedules: Vec<ScheduleSlot> =
        store.active_schedules_for_driver(driver_id, proposal.schedule_id)?;
    match find_driver_conflict(proposal, role, driver_id, &driver_schedules) {
        Some(conflict) => Err(DomainError::ScheduleConflict(conflict).into()),
        None => Ok(()),
    }
}

/// Checks that a bus can take a trip.
///
/// # Errors
///
/// Returns `BusNotFound`, `BusInactive` or `BusUnavailable` as a domain
/// violation, or `CoreError::Storage` if the lookup fails.
pub fn ensure_bus_assignable<S>(store: &mut S, bus_id: i64) -> Result<BusAvailability, CoreError>
where
    S: FleetStore + ?Sized,
{
    let bus: BusAvailability = store
        .find_bus_availability(bus_id)?
        .ok_or(DomainError::BusNotFound(bus_id))?;

    if !bus.is_active {
        return Err(DomainError::BusInactive(bus_id).into());
    }
    if bus.maintenance_status != MaintenanceStatus::Active {
        return Err(DomainError::BusUnavailable {
            bus_id,
            maintenance_status: bus.maintenance_status,
        }
        .into());
    }
    Ok(bus)
}

/// Checks that a driver can take a trip.
///
/// # Errors
///
/// Returns `DriverNotFound` or `DriverInactive` as a domain violation, or
/// `CoreError::Storage` if the lookup fails.
pub fn ensure_driver_assignable<S>(store: &mut S, driver_id: i64) -> Result<Driver, CoreError>
where
    S: FleetStore + ?Sized,
{
    let driver: Driver = store
        .find_driver(driver_id)?
        .ok_or(DomainError::DriverNotFound(driver_id))?;

    if !driver.is_active {
        return Err(DomainError::DriverInactive(driver_id).into());
    }
    Ok(driver)
}
