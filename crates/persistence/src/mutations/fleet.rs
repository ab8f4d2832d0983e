// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Companies, routes, drivers, templates and buses.

use coachline::instantiate_bus_seating;
use coachline_domain::{
    BusSeat, DomainError, SeatInstantiation, SeatMatrix, normalize_plate_number,
    validate_required, validate_seat_matrix,
};
use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Text;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{BusStatusUpdate, NewBus};
use crate::diesel_schema::{
    bus_seats, bus_type_templates, buses, companies, drivers, route_schedules, routes,
};
use crate::encoding::flag;
use crate::error::PersistenceError;
use crate::queries::fleet::{get_company_name, get_route_endpoints, plate_number_exists};
use crate::store::ConnectionStore;

/// Inserts a company.
///
/// # Errors
///
/// Returns an error if the name is blank or the insert fails.
pub fn insert_company(conn: &mut SqliteConnection, name: &str) -> Result<i64, PersistenceError> {
    validate_required("name", name)?;
    let name: &str = name.trim();

    diesel::insert_into(companies::table)
        .values(companies::name.eq(name))
        .execute(conn)?;
    let company_id: i64 = get_last_insert_rowid(conn)?;

    debug!(company_id, name, "Inserted company");
    Ok(company_id)
}

/// Inserts a route.
///
/// # Errors
///
/// Returns an error if an endpoint is blank or the insert fails.
pub fn insert_route(
    conn: &mut SqliteConnection,
    origin: &str,
    destination: &str,
) -> Result<i64, PersistenceError> {
    validate_required("origin", origin)?;
    let origin: &str = origin.trim();
    validate_required("destination", destination)?;
    let destination: &str = destination.trim();

    diesel::insert_into(routes::table)
        .values((routes::origin.eq(origin), routes::destination.eq(destination)))
        .execute(conn)?;
    let route_id: i64 = get_last_insert_rowid(conn)?;

    debug!(route_id, origin, destination, "Inserted route");
    Ok(route_id)
}

/// Checks that a departure time reads as `HH:MM`.
fn validate_departure_time(value: &str) -> Result<String, DomainError> {
    let trimmed: &str = value.trim();
    let valid: bool = trimmed.split_once(':').is_some_and(|(hours, minutes)| {
        hours.len() == 2
            && minutes.len() == 2
            && hours.parse::<u8>().is_ok_and(|h| h < 24)
            && minutes.parse::<u8>().is_ok_and(|m| m < 60)
    });

    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(DomainError::InvalidField {
            field: "departure_time",
            message: format!("'{trimmed}' is not a HH:MM time"),
        })
    }
}

/// Inserts a recurring departure slot of a route.
///
/// # Errors
///
/// Returns an error if the route does not exist, the time is malformed or
/// the insert fails.
pub fn insert_route_schedule(
    conn: &mut SqliteConnection,
    route_id: i64,
    departure_time: &str,
) -> Result<i64, PersistenceError> {
    let departure_time: String = validate_departure_time(departure_time)?;

    conn.immediate_transaction(|conn| {
        if get_route_endpoints(conn, route_id)?.is_none() {
            return Err(DomainError::RouteNotFound(route_id).into());
        }

        diesel::insert_into(route_schedules::table)
            .values((
                route_schedules::route_id.eq(route_id),
                route_schedules::departure_time.eq(&departure_time),
                route_schedules::is_active.eq(flag(true)),
            ))
            .execute(conn)?;
        let route_schedule_id: i64 = get_last_insert_rowid(conn)?;

        debug!(route_schedule_id, route_id, departure_time, "Inserted route schedule");
        Ok(route_schedule_id)
    })
}

/// Inserts an active driver.
///
/// # Errors
///
/// Returns an error if a field is blank or the insert fails. A reused
/// license number violates the unique index.
pub fn insert_driver(
    conn: &mut SqliteConnection,
    full_name: &str,
    license_number: &str,
) -> Result<i64, PersistenceError> {
    validate_required("full_name", full_name)?;
    let full_name: &str = full_name.trim();
    validate_required("license_number", license_number)?;
    let license_number: &str = license_number.trim();

    diesel::insert_into(drivers::table)
        .values((
            drivers::full_name.eq(full_name),
            drivers::license_number.eq(license_number),
            drivers::is_active.eq(flag(true)),
        ))
        .execute(conn)?;
    let driver_id: i64 = get_last_insert_rowid(conn)?;

    debug!(driver_id, full_name, "Inserted driver");
    Ok(driver_id)
}

/// Activates or deactivates a driver.
///
/// # Errors
///
/// Returns `DriverNotFound` if no row was updated, or a database error.
pub fn set_driver_active(
    conn: &mut SqliteConnection,
    driver_id: i64,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(drivers::table.filter(drivers::driver_id.eq(driver_id)))
        .set((
            drivers::is_active.eq(flag(is_active)),
            drivers::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(DomainError::DriverNotFound(driver_id).into());
    }

    debug!(driver_id, is_active, "Updated driver activation");
    Ok(())
}

/// Inserts a bus type template after validating its seat matrix.
///
/// # Errors
///
/// Returns an error if the name is blank, the matrix is malformed or the
/// insert fails.
pub fn insert_template(
    conn: &mut SqliteConnection,
    name: &str,
    seat_matrix: &SeatMatrix,
) -> Result<i64, PersistenceError> {
    validate_required("name", name)?;
    let name: &str = name.trim();
    validate_seat_matrix(seat_matrix)?;
    let seat_matrix_json: String = serde_json::to_string(seat_matrix)?;

    diesel::insert_into(bus_type_templates::table)
        .values((
            bus_type_templates::name.eq(name),
            bus_type_templates::seat_matrix_json.eq(&seat_matrix_json),
        ))
        .execute(conn)?;
    let template_id: i64 = get_last_insert_rowid(conn)?;

    info!(
        template_id,
        name,
        seats = seat_matrix.seat_count(),
        sellable = seat_matrix.sellable_count(),
        "Inserted bus type template"
    );
    Ok(template_id)
}

/// Inserts seat records for a bus.
pub(crate) fn insert_bus_seats(
    conn: &mut SqliteConnection,
    records: &[BusSeat],
) -> Result<(), PersistenceError> {
    for record in records {
        diesel::insert_into(bus_seats::table)
            .values((
                bus_seats::bus_id.eq(record.bus_id),
                bus_seats::seat_number.eq(&record.seat_number),
                bus_seats::tier_id.eq(record.tier_id.as_deref()),
                bus_seats::status.eq(record.status.as_str()),
                bus_seats::is_active.eq(flag(record.is_active)),
            ))
            .execute(conn)?;
    }
    Ok(())
}

/// Registers a bus and instantiates its seating from the template.
///
/// The bus row, its seat matrix and its seat records are written in one
/// transaction.
///
/// # Errors
///
/// Returns `Rejected` with `TemplateNotFound`, `CompanyNotFound`,
/// `DuplicatePlateNumber` or a plate validation error, or a database error.
pub fn create_bus(conn: &mut SqliteConnection, new_bus: &NewBus) -> Result<i64, PersistenceError> {
    let plate_number: String = normalize_plate_number(&new_bus.plate_number)?;

    conn.immediate_transaction(|conn| {
        // Records are stamped with the real id once the bus row exists
        let mut seating: SeatInstantiation = {
            let mut store = ConnectionStore::new(conn);
            instantiate_bus_seating(&mut store, new_bus.template_id, 0)
        }
        .map_err(PersistenceError::from)?;

        if let Some(company_id) = new_bus.company_id
            && get_company_name(conn, company_id)?.is_none()
        {
            return Err(DomainError::CompanyNotFound(company_id).into());
        }

        if plate_number_exists(conn, &plate_number)? {
            return Err(DomainError::DuplicatePlateNumber(plate_number.clone()).into());
        }

        diesel::insert_into(buses::table)
            .values((
                buses::plate_number.eq(&plate_number),
                buses::template_id.eq(new_bus.template_id),
                buses::company_id.eq(new_bus.company_id),
                buses::is_active.eq(flag(true)),
                buses::seat_matrix_json.eq(serde_json::to_string(&seating.seat_matrix)?),
            ))
            .execute(conn)?;
        let bus_id: i64 = get_last_insert_rowid(conn)?;

        seating.assign_to_bus(bus_id);
        insert_bus_seats(conn, &seating.bus_seats)?;

        info!(
            bus_id,
            plate_number,
            template_id = new_bus.template_id,
            bus_seats = seating.bus_seats.len(),
            "Created bus"
        );
        Ok(bus_id)
    })
}

/// Applies a partial service state update to a bus.
///
/// # Errors
///
/// Returns `BusNotFound` if the bus does not exist, or a database error.
pub fn update_bus_status(
    conn: &mut SqliteConnection,
    bus_id: i64,
    update: BusStatusUpdate,
) -> Result<(), PersistenceError> {
    conn.immediate_transaction(|conn| {
        let exists: i64 = buses::table
            .filter(buses::bus_id.eq(bus_id))
            .count()
            .get_result(conn)?;
        if exists == 0 {
            return Err(DomainError::BusNotFound(bus_id).into());
        }

        if let Some(is_active) = update.is_active {
            diesel::update(buses::table.filter(buses::bus_id.eq(bus_id)))
                .set(buses::is_active.eq(flag(is_active)))
                .execute(conn)?;
        }
        if let Some(maintenance_status) = update.maintenance_status {
            diesel::update(buses::table.filter(buses::bus_id.eq(bus_id)))
                .set(buses::maintenance_status.eq(maintenance_status.as_str()))
                .execute(conn)?;
        }
        diesel::update(buses::table.filter(buses::bus_id.eq(bus_id)))
            .set(buses::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")))
            .execute(conn)?;

        info!(
            bus_id,
            is_active = ?update.is_active,
            maintenance_status = ?update.maintenance_status,
            "Updated bus status"
        );
        Ok(())
    })
}
