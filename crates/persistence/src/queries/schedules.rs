// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use coachline_domain::{Schedule, ScheduleSlot, ScheduleStatus, TimeWindow};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::diesel_schema::schedules;
use crate::encoding::{parse_decimal, parse_optional_timestamp, parse_stored, parse_timestamp};
use crate::error::PersistenceError;

/// Statuses whose trips hold their bus and drivers.
const OCCUPYING_STATUSES: [&str; 2] = [
    ScheduleStatus::Scheduled.as_str(),
    ScheduleStatus::InProgress.as_str(),
];

/// Diesel Queryable struct for schedule rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = schedules)]
struct ScheduleRow {
    schedule_id: i64,
    route_id: i64,
    route_schedule_id: i64,
    bus_id: i64,
    primary_driver_id: i64,
    secondary_driver_id: Option<i64>,
    departure_date: String,
    estimated_arrival_time: String,
    actual_departure_time: Option<String>,
    actual_arrival_time: Option<String>,
    price: String,
    status: String,
}

/// Diesel Queryable struct for the columns used by conflict detection.
#[derive(Queryable, Selectable)]
#[diesel(table_name = schedules)]
struct SlotRow {
    schedule_id: i64,
    bus_id: i64,
    primary_driver_id: i64,
    secondary_driver_id: Option<i64>,
    departure_date: String,
    estimated_arrival_time: String,
    status: String,
}

fn stored_window(departure: &str, arrival: &str) -> Result<TimeWindow, PersistenceError> {
    let start = parse_timestamp("schedules.departure_date", departure)?;
    let end = parse_timestamp("schedules.estimated_arrival_time", arrival)?;
    TimeWindow::new(start, end).map_err(|_| PersistenceError::CorruptValue {
        column: "schedules.estimated_arrival_time",
        value: arrival.to_string(),
    })
}

impl ScheduleRow {
    fn into_schedule(self) -> Result<Schedule, PersistenceError> {
        Ok(Schedule {
            schedule_id: self.schedule_id,
            route_id: self.route_id,
            route_schedule_id: self.route_schedule_id,
            bus_id: self.bus_id,
            primary_driver_id: self.primary_driver_id,
            secondary_driver_id: self.secondary_driver_id,
            window: stored_window(&self.departure_date, &self.estimated_arrival_time)?,
            actual_departure_time: parse_optional_timestamp(
                "schedules.actual_departure_time",
                self.actual_departure_time.as_deref(),
            )?,
            actual_arrival_time: parse_optional_timestamp(
                "schedules.actual_arrival_time",
                self.actual_arrival_time.as_deref(),
            )?,
            price: parse_decimal("schedules.price", &self.price)?,
            status: parse_stored("schedules.status", &self.status)?,
        })
    }
}

impl SlotRow {
    fn into_slot(self) -> Result<ScheduleSlot, PersistenceError> {
        Ok(ScheduleSlot {
            schedule_id: self.schedule_id,
            bus_id: self.bus_id,
            primary_driver_id: self.primary_driver_id,
            secondary_driver_id: self.secondary_driver_id,
            window: stored_window(&self.departure_date, &self.estimated_arrival_time)?,
            status: parse_stored("schedules.status", &self.status)?,
        })
    }
}

/// Retrieves a schedule.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value cannot be decoded.
pub fn get_schedule(
    conn: &mut SqliteConnection,
    schedule_id: i64,
) -> Result<Option<Schedule>, PersistenceError> {
    debug!(schedule_id, "Loading schedule");

    let row: Option<ScheduleRow> = schedules::table
        .filter(schedules::schedule_id.eq(schedule_id))
        .select(ScheduleRow::as_select())
        .first(conn)
        .optional()?;

    row.map(ScheduleRow::into_schedule).transpose()
}

/// Lists schedules ordered by departure.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value cannot be decoded.
pub fn list_schedules(
    conn: &mut SqliteConnection,
    status: Option<ScheduleStatus>,
) -> Result<Vec<Schedule>, PersistenceError> {
    let mut query = schedules::table
        .select(ScheduleRow::as_select())
        .order((schedules::departure_date.asc(), schedules::schedule_id.asc()))
        .into_boxed();

    if let Some(status) = status {
        query = query.filter(schedules::status.eq(status.as_str()));
    }

    query
        .load(conn)?
        .into_iter()
        .map(ScheduleRow::into_schedule)
        .collect()
}

/// Checks whether a schedule exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn schedule_exists(
    conn: &mut SqliteConnection,
    schedule_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = schedules::table
        .filter(schedules::schedule_id.eq(schedule_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Lists the scheduled or in-progress trips assigned to a bus.
///
/// # Arguments
///
/// * `bus_id` - The bus
/// * `exclude_schedule_id` - A trip to leave out, normally the one being edited
///
/// # Errors
///
/// Returns an error if the query fails or a stored value cannot be decoded.
pub fn active_slots_for_bus(
    conn: &mut SqliteConnection,
    bus_id: i64,
    exclude_schedule_id: Option<i64>,
) -> Result<Vec<ScheduleSlot>, PersistenceError> {
    let mut query = schedules::table
        .filter(schedules::bus_id.eq(bus_id))
        .filter(schedules::status.eq_any(OCCUPYING_STATUSES))
        .select(SlotRow::as_select())
        .into_boxed();

    if let Some(excluded) = exclude_schedule_id {
        query = query.filter(schedules::schedule_id.ne(excluded));
    }

    query.load(conn)?.into_iter().map(SlotRow::into_slot).collect()
}

/// Lists the scheduled or in-progress trips a driver works in either role.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value cannot be decoded.
pub fn active_slots_for_driver(
    conn: &mut SqliteConnection,
    driver_id: i64,
    exclude_schedule_id: Option<i64>,
) -> Result<Vec<ScheduleSlot>, PersistenceError> {
    let mut query = schedules::table
        .filter(
            schedules::primary_driver_id
                .eq(driver_id)
                .or(schedules::secondary_driver_id.eq(driver_id)),
        )
        .filter(schedules::status.eq_any(OCCUPYING_STATUSES))
        .select(SlotRow::as_select())
        .into_boxed();

    if let Some(excluded) = exclude_schedule_id {
        query = query.filter(schedules::schedule_id.ne(excluded));
    }

    query.load(conn)?.into_iter().map(SlotRow::into_slot).collect()
}
