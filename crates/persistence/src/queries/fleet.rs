// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use coachline_domain::{
    Bus, BusAvailability, BusSeat, BusTypeTemplate, Driver, MaintenanceStatus, SeatMatrix,
    overlay_bus_seats,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::BusLayout;
use crate::diesel_schema::{
    bus_seats, bus_type_templates, buses, companies, drivers, route_schedules, routes,
};
use crate::encoding::{is_set, parse_stored};
use crate::error::PersistenceError;

/// Diesel Queryable struct for template rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = bus_type_templates)]
struct TemplateRow {
    template_id: i64,
    name: String,
    seat_matrix_json: String,
}

/// Diesel Queryable struct for bus rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = buses)]
struct BusRow {
    bus_id: i64,
    plate_number: String,
    template_id: i64,
    company_id: Option<i64>,
    is_active: i32,
    maintenance_status: String,
    seat_matrix_json: String,
}

/// Diesel Queryable struct for seat record rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = bus_seats)]
struct BusSeatRow {
    bus_seat_id: i64,
    bus_id: i64,
    seat_number: String,
    tier_id: Option<String>,
    status: String,
    is_active: i32,
}

/// Diesel Queryable struct for driver rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = drivers)]
struct DriverRow {
    driver_id: i64,
    full_name: String,
    license_number: String,
    is_active: i32,
}

impl BusRow {
    fn into_bus(self) -> Result<Bus, PersistenceError> {
        let seat_matrix: SeatMatrix = serde_json::from_str(&self.seat_matrix_json)?;
        Ok(Bus {
            bus_id: self.bus_id,
            plate_number: self.plate_number,
            template_id: self.template_id,
            company_id: self.company_id,
            is_active: is_set(self.is_active),
            maintenance_status: parse_stored("buses.maintenance_status", &self.maintenance_status)?,
            seat_matrix,
        })
    }
}

impl BusSeatRow {
    fn into_bus_seat(self) -> Result<BusSeat, PersistenceError> {
        Ok(BusSeat {
            bus_seat_id: Some(self.bus_seat_id),
            bus_id: self.bus_id,
            seat_number: self.seat_number,
            tier_id: self.tier_id,
            status: parse_stored("bus_seats.status", &self.status)?,
            is_active: is_set(self.is_active),
        })
    }
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Self {
            driver_id: row.driver_id,
            full_name: row.full_name,
            license_number: row.license_number,
            is_active: is_set(row.is_active),
        }
    }
}

/// Retrieves a bus type template.
///
/// # Errors
///
/// Returns an error if the query fails or the stored matrix cannot be decoded.
pub fn get_template(
    conn: &mut SqliteConnection,
    template_id: i64,
) -> Result<Option<BusTypeTemplate>, PersistenceError> {
    debug!(template_id, "Loading bus type template");

    let row: Option<TemplateRow> = bus_type_templates::table
        .filter(bus_type_templates::template_id.eq(template_id))
        .select(TemplateRow::as_select())
        .first(conn)
        .optional()?;

    row.map(|row| {
        Ok(BusTypeTemplate {
            template_id: row.template_id,
            name: row.name,
            seat_matrix: serde_json::from_str(&row.seat_matrix_json)?,
        })
    })
    .transpose()
}

/// Retrieves a bus with its stored seat matrix.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value cannot be decoded.
pub fn get_bus(conn: &mut SqliteConnection, bus_id: i64) -> Result<Option<Bus>, PersistenceError> {
    debug!(bus_id, "Loading bus");

    let row: Option<BusRow> = buses::table
        .filter(buses::bus_id.eq(bus_id))
        .select(BusRow::as_select())
        .first(conn)
        .optional()?;

    row.map(BusRow::into_bus).transpose()
}

/// Retrieves the fields of a bus that decide whether it can take a trip.
///
/// # Errors
///
/// Returns an error if the query fails or the stored status is invalid.
pub fn get_bus_availability(
    conn: &mut SqliteConnection,
    bus_id: i64,
) -> Result<Option<BusAvailability>, PersistenceError> {
    let row: Option<(i32, String)> = buses::table
        .filter(buses::bus_id.eq(bus_id))
        .select((buses::is_active, buses::maintenance_status))
        .first(conn)
        .optional()?;

    row.map(|(is_active, maintenance_status)| {
        let maintenance_status: MaintenanceStatus =
            parse_stored("buses.maintenance_status", &maintenance_status)?;
        Ok(BusAvailability {
            bus_id,
            is_active: is_set(is_active),
            maintenance_status,
        })
    })
    .transpose()
}

/// Lists the seat records of a bus in creation order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored status is invalid.
pub fn list_bus_seats(
    conn: &mut SqliteConnection,
    bus_id: i64,
) -> Result<Vec<BusSeat>, PersistenceError> {
    bus_seats::table
        .filter(bus_seats::bus_id.eq(bus_id))
        .order(bus_seats::bus_seat_id.asc())
        .select(BusSeatRow::as_select())
        .load(conn)?
        .into_iter()
        .map(BusSeatRow::into_bus_seat)
        .collect()
}

/// Checks whether a plate number is already registered.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn plate_number_exists(
    conn: &mut SqliteConnection,
    plate_number: &str,
) -> Result<bool, PersistenceError> {
    let count: i64 = buses::table
        .filter(buses::plate_number.eq(plate_number))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Retrieves a driver.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_driver(
    conn: &mut SqliteConnection,
    driver_id: i64,
) -> Result<Option<Driver>, PersistenceError> {
    let row: Option<DriverRow> = drivers::table
        .filter(drivers::driver_id.eq(driver_id))
        .select(DriverRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Driver::from))
}

/// Retrieves a company's name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_company_name(
    conn: &mut SqliteConnection,
    company_id: i64,
) -> Result<Option<String>, PersistenceError> {
    Ok(companies::table
        .filter(companies::company_id.eq(company_id))
        .select(companies::name)
        .first(conn)
        .optional()?)
}

/// Retrieves a route's origin and destination.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_route_endpoints(
    conn: &mut SqliteConnection,
    route_id: i64,
) -> Result<Option<(String, String)>, PersistenceError> {
    Ok(routes::table
        .filter(routes::route_id.eq(route_id))
        .select((routes::origin, routes::destination))
        .first(conn)
        .optional()?)
}

/// Retrieves the route a route schedule belongs to.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_route_schedule_route_id(
    conn: &mut SqliteConnection,
    route_schedule_id: i64,
) -> Result<Option<i64>, PersistenceError> {
    Ok(route_schedules::table
        .filter(route_schedules::route_schedule_id.eq(route_schedule_id))
        .select(route_schedules::route_id)
        .first(conn)
        .optional()?)
}

/// Retrieves a bus type template's name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_template_name(
    conn: &mut SqliteConnection,
    template_id: i64,
) -> Result<Option<String>, PersistenceError> {
    Ok(bus_type_templates::table
        .filter(bus_type_templates::template_id.eq(template_id))
        .select(bus_type_templates::name)
        .first(conn)
        .optional()?)
}

/// Loads a bus with its seat records and the records overlaid on its layout.
///
/// # Errors
///
/// Returns an error if a query fails or a stored value cannot be decoded.
pub fn get_bus_layout(
    conn: &mut SqliteConnection,
    bus_id: i64,
) -> Result<Option<BusLayout>, PersistenceError> {
    let Some(mut bus) = get_bus(conn, bus_id)? else {
        return Ok(None);
    };
    let bus_seats: Vec<BusSeat> = list_bus_seats(conn, bus_id)?;
    bus.seat_matrix = overlay_bus_seats(&bus.seat_matrix, &bus_seats);
    Ok(Some(BusLayout { bus, bus_seats }))
}
