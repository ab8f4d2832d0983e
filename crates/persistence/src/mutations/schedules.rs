// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trip reservation and updates.
//!
//! The conflict check and the write share one `BEGIN IMMEDIATE`
//! transaction: two concurrent reservations for the same bus cannot both see
//! the bus as free.

use coachline::validate_schedule_proposal;
use coachline_domain::{
    DomainError, Schedule, ScheduleProposal, ScheduleStatus, TimeWindow, validate_amount,
};
use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Text;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewSchedule, ScheduleAssignment};
use crate::diesel_schema::schedules;
use crate::encoding::{format_optional_timestamp, format_timestamp};
use crate::error::PersistenceError;
use crate::queries::fleet::{
    get_bus_availability, get_driver, get_route_endpoints, get_route_schedule_route_id,
};
use crate::queries::schedules::get_schedule;
use crate::store::ConnectionStore;

fn check_proposal(
    conn: &mut SqliteConnection,
    proposal: &ScheduleProposal,
) -> Result<(), PersistenceError> {
    let mut store = ConnectionStore::new(conn);
    validate_schedule_proposal(&mut store, proposal)?;
    Ok(())
}

fn ensure_route_schedule(
    conn: &mut SqliteConnection,
    route_id: i64,
    route_schedule_id: i64,
) -> Result<(), PersistenceError> {
    if get_route_endpoints(conn, route_id)?.is_none() {
        return Err(DomainError::RouteNotFound(route_id).into());
    }
    match get_route_schedule_route_id(conn, route_schedule_id)? {
        None => Err(DomainError::RouteScheduleNotFound(route_schedule_id).into()),
        Some(owner) if owner != route_id => Err(DomainError::InvalidField {
            field: "route_schedule_id",
            message: format!(
                "Route schedule {route_schedule_id} belongs to route {owner}, not route {route_id}"
            ),
        }
        .into()),
        Some(_) => Ok(()),
    }
}

/// Reserves a trip after checking the bus and drivers are free.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `new_schedule` - The trip to reserve
///
/// # Returns
///
/// The new schedule id.
///
/// # Errors
///
/// Returns `Rejected` if the window, price, route, bus or drivers fail
/// validation or a conflicting trip exists, or a database error. Nothing is
/// written on error.
pub fn reserve_schedule(
    conn: &mut SqliteConnection,
    new_schedule: &NewSchedule,
) -> Result<i64, PersistenceError> {
    let window: TimeWindow =
        TimeWindow::new(new_schedule.departure, new_schedule.estimated_arrival)?;
    validate_amount(new_schedule.price)?;

    conn.immediate_transaction(|conn| {
        ensure_route_schedule(conn, new_schedule.route_id, new_schedule.route_schedule_id)?;

        let proposal: ScheduleProposal = ScheduleProposal {
            schedule_id: None,
            bus_id: new_schedule.bus_id,
            primary_driver_id: new_schedule.primary_driver_id,
            secondary_driver_id: new_schedule.secondary_driver_id,
            window,
        };
        check_proposal(conn, &proposal)?;

        diesel::insert_into(schedules::table)
            .values((
                schedules::route_id.eq(new_schedule.route_id),
                schedules::route_schedule_id.eq(new_schedule.route_schedule_id),
                schedules::bus_id.eq(new_schedule.bus_id),
                schedules::primary_driver_id.eq(new_schedule.primary_driver_id),
                schedules::secondary_driver_id.eq(new_schedule.secondary_driver_id),
                schedules::departure_date.eq(format_timestamp(window.start())?),
                schedules::estimated_arrival_time.eq(format_timestamp(window.end())?),
                schedules::price.eq(new_schedule.price.to_string()),
                schedules::status.eq(ScheduleStatus::Scheduled.as_str()),
            ))
            .execute(conn)?;
        let schedule_id: i64 = get_last_insert_rowid(conn)?;

        info!(
            schedule_id,
            bus_id = new_schedule.bus_id,
            primary_driver_id = new_schedule.primary_driver_id,
            secondary_driver_id = ?new_schedule.secondary_driver_id,
            "Reserved schedule"
        );
        Ok(schedule_id)
    })
}

fn load_schedule(
    conn: &mut SqliteConnection,
    schedule_id: i64,
) -> Result<Schedule, PersistenceError> {
    get_schedule(conn, schedule_id)?.ok_or_else(|| DomainError::ScheduleNotFound(schedule_id).into())
}

/// Checks that the records of a trip that holds no resources still exist.
fn ensure_assignment_exists(
    conn: &mut SqliteConnection,
    schedule: &Schedule,
) -> Result<(), PersistenceError> {
    if get_bus_availability(conn, schedule.bus_id)?.is_none() {
        return Err(DomainError::BusNotFound(schedule.bus_id).into());
    }
    for driver_id in std::iter::once(schedule.primary_driver_id).chain(schedule.secondary_driver_id)
    {
        if get_driver(conn, driver_id)?.is_none() {
            return Err(DomainError::DriverNotFound(driver_id).into());
        }
    }
    Ok(())
}

fn write_schedule(conn: &mut SqliteConnection, schedule: &Schedule) -> Result<(), PersistenceError> {
    diesel::update(schedules::table.filter(schedules::schedule_id.eq(schedule.schedule_id)))
        .set((
            schedules::bus_id.eq(schedule.bus_id),
            schedules::primary_driver_id.eq(schedule.primary_driver_id),
            schedules::secondary_driver_id.eq(schedule.secondary_driver_id),
            schedules::departure_date.eq(format_timestamp(schedule.window.start())?),
            schedules::estimated_arrival_time.eq(format_timestamp(schedule.window.end())?),
            schedules::actual_departure_time
                .eq(format_optional_timestamp(schedule.actual_departure_time)?),
            schedules::actual_arrival_time
                .eq(format_optional_timestamp(schedule.actual_arrival_time)?),
            schedules::price.eq(schedule.price.to_string()),
            schedules::status.eq(schedule.status.as_str()),
            schedules::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;
    Ok(())
}

fn proposal_for(schedule: &Schedule) -> ScheduleProposal {
    ScheduleProposal {
        schedule_id: Some(schedule.schedule_id),
        bus_id: schedule.bus_id,
        primary_driver_id: schedule.primary_driver_id,
        secondary_driver_id: schedule.secondary_driver_id,
        window: schedule.window,
    }
}

/// Changes the bus, drivers, times or price of a trip.
///
/// When the bus, a driver or the time window changes, a scheduled or
/// in-progress trip is re-checked for conflicts against every other trip;
/// its own current booking is ignored. A price-only change runs no checks.
///
/// # Errors
///
/// Returns `Rejected` with `ScheduleNotFound`, a window or price error, an
/// assignment error or a conflict, or a database error.
pub fn update_schedule_assignment(
    conn: &mut SqliteConnection,
    schedule_id: i64,
    assignment: &ScheduleAssignment,
) -> Result<Schedule, PersistenceError> {
    if let Some(price) = assignment.price {
        validate_amount(price)?;
    }

    conn.immediate_transaction(|conn| {
        let current: Schedule = load_schedule(conn, schedule_id)?;

        let mut updated: Schedule = current.clone();
        updated.bus_id = assignment.bus_id.unwrap_or(current.bus_id);
        updated.primary_driver_id = assignment
            .primary_driver_id
            .unwrap_or(current.primary_driver_id);
        updated.secondary_driver_id = assignment
            .secondary_driver_id
            .unwrap_or(current.secondary_driver_id);
        updated.window = TimeWindow::new(
            assignment.departure.unwrap_or_else(|| current.window.start()),
            assignment
                .estimated_arrival
                .unwrap_or_else(|| current.window.end()),
        )?;
        updated.price = assignment.price.unwrap_or(current.price);

        let reassigned: bool = updated.bus_id != current.bus_id
            || updated.primary_driver_id != current.primary_driver_id
            || updated.secondary_driver_id != current.secondary_driver_id
            || updated.window != current.window;

        match (reassigned, updated.status.occupies_resources()) {
            (false, _) => {
                debug!(schedule_id, "Assignment unchanged, skipping conflict check");
            }
            (true, true) => check_proposal(conn, &proposal_for(&updated))?,
            (true, false) => {
                if updated.secondary_driver_id == Some(updated.primary_driver_id) {
                    return Err(
                        DomainError::DuplicateDriverAssignment(updated.primary_driver_id).into(),
                    );
                }
                ensure_assignment_exists(conn, &updated)?;
            }
        }

        write_schedule(conn, &updated)?;

        info!(
            schedule_id,
            bus_id = updated.bus_id,
            primary_driver_id = updated.primary_driver_id,
            secondary_driver_id = ?updated.secondary_driver_id,
            "Updated schedule assignment"
        );
        Ok(updated)
    })
}

/// Sets the status of a trip.
///
/// Any status may follow any other. Moving a trip from a status that holds
/// no resources back to scheduled or in progress re-runs the conflict check.
/// Entering in progress stamps the actual departure, and entering completed
/// the actual arrival, unless already recorded.
///
/// # Errors
///
/// Returns `Rejected` with `ScheduleNotFound` or, on reactivation, an
/// assignment error or conflict; or a database error.
pub fn update_schedule_status(
    conn: &mut SqliteConnection,
    schedule_id: i64,
    status: ScheduleStatus,
) -> Result<Schedule, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let mut schedule: Schedule = load_schedule(conn, schedule_id)?;
        let previous: ScheduleStatus = schedule.status;

        if status.occupies_resources() && !previous.occupies_resources() {
            debug!(schedule_id, %previous, %status, "Re-checking reactivated schedule");
            check_proposal(conn, &proposal_for(&schedule))?;
        }

        let now: OffsetDateTime = OffsetDateTime::now_utc();
        match status {
            ScheduleStatus::InProgress => {
                schedule.actual_departure_time.get_or_insert(now);
            }
            ScheduleStatus::Completed => {
                schedule.actual_arrival_time.get_or_insert(now);
            }
            ScheduleStatus::Scheduled | ScheduleStatus::Cancelled | ScheduleStatus::Delayed => {}
        }
        schedule.status = status;

        write_schedule(conn, &schedule)?;

        info!(schedule_id, %previous, %status, "Updated schedule status");
        Ok(schedule)
    })
}
