// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use coachline_domain::{
    BusRelation, DriverRelation, ExpenseRecord, RouteRelation, RouteScheduleRelation,
    ScheduleRelations, SettlementRecord, SettlementStatus,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use rust_decimal::Decimal;
use tracing::debug;

use crate::diesel_schema::{buses, schedules, trip_expenses, trip_settlements};
use crate::encoding::{parse_decimal, parse_optional_timestamp, parse_stored, parse_timestamp};
use crate::error::PersistenceError;
use crate::queries::fleet::{
    get_company_name, get_driver, get_route_endpoints, get_route_schedule_route_id,
    get_template_name,
};

/// Diesel Queryable struct for settlement rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = trip_settlements)]
struct SettlementRow {
    settlement_id: i64,
    schedule_id: i64,
    total_income: String,
    total_expenses: String,
    net_amount: String,
    status: String,
    settled_at: Option<String>,
}

/// Diesel Queryable struct for expense rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = trip_expenses)]
struct ExpenseRow {
    expense_id: i64,
    category: String,
    amount: String,
    description: Option<String>,
}

/// The stored state of a settlement needed before changing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementState {
    pub settlement_id: i64,
    pub schedule_id: i64,
    pub status: SettlementStatus,
    pub total_income: Decimal,
}

/// Finds the settlement recorded for a schedule.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_settlement_for_schedule(
    conn: &mut SqliteConnection,
    schedule_id: i64,
) -> Result<Option<i64>, PersistenceError> {
    Ok(trip_settlements::table
        .filter(trip_settlements::schedule_id.eq(schedule_id))
        .select(trip_settlements::settlement_id)
        .first(conn)
        .optional()?)
}

/// Retrieves the status and income of a settlement.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value cannot be decoded.
pub fn get_settlement_state(
    conn: &mut SqliteConnection,
    settlement_id: i64,
) -> Result<Option<SettlementState>, PersistenceError> {
    let row: Option<(i64, String, String)> = trip_settlements::table
        .filter(trip_settlements::settlement_id.eq(settlement_id))
        .select((
            trip_settlements::schedule_id,
            trip_settlements::status,
            trip_settlements::total_income,
        ))
        .first(conn)
        .optional()?;

    row.map(|(schedule_id, status, total_income)| {
        Ok(SettlementState {
            settlement_id,
            schedule_id,
            status: parse_stored("trip_settlements.status", &status)?,
            total_income: parse_decimal("trip_settlements.total_income", &total_income)?,
        })
    })
    .transpose()
}

/// Lists the amounts of a settlement's expenses.
///
/// # Errors
///
/// Returns an error if the query fails or a stored amount is not a decimal.
pub fn list_expense_amounts(
    conn: &mut SqliteConnection,
    settlement_id: i64,
) -> Result<Vec<Decimal>, PersistenceError> {
    trip_expenses::table
        .filter(trip_expenses::settlement_id.eq(settlement_id))
        .select(trip_expenses::amount)
        .load::<String>(conn)?
        .iter()
        .map(|amount| parse_decimal("trip_expenses.amount", amount))
        .collect()
}

/// Checks whether an expense belongs to a settlement.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn expense_exists(
    conn: &mut SqliteConnection,
    settlement_id: i64,
    expense_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = trip_expenses::table
        .filter(trip_expenses::settlement_id.eq(settlement_id))
        .filter(trip_expenses::expense_id.eq(expense_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

fn load_schedule_relations(
    conn: &mut SqliteConnection,
    schedule_id: i64,
) -> Result<Option<ScheduleRelations>, PersistenceError> {
    let row: Option<(i64, i64, i64, String)> = schedules::table
        .filter(schedules::schedule_id.eq(schedule_id))
        .select((
            schedules::route_schedule_id,
            schedules::bus_id,
            schedules::primary_driver_id,
            schedules::departure_date,
        ))
        .first(conn)
        .optional()?;

    let Some((route_schedule_id, bus_id, primary_driver_id, departure_date)) = row else {
        return Ok(None);
    };

    let route_schedule: Option<RouteScheduleRelation> =
        match get_route_schedule_route_id(conn, route_schedule_id)? {
            Some(route_id) => Some(RouteScheduleRelation {
                route: get_route_endpoints(conn, route_id)?.map(|(origin, destination)| {
                    RouteRelation {
                        origin: Some(origin).filter(|value| !value.trim().is_empty()),
                        destination: Some(destination).filter(|value| !value.trim().is_empty()),
                    }
                }),
            }),
            None => None,
        };

    let bus_row: Option<(String, i64, Option<i64>)> = buses::table
        .filter(buses::bus_id.eq(bus_id))
        .select((buses::plate_number, buses::template_id, buses::company_id))
        .first(conn)
        .optional()?;

    let bus: Option<BusRelation> = match bus_row {
        Some((plate_number, template_id, company_id)) => {
            let company_name: Option<String> = match company_id {
                Some(company_id) => get_company_name(conn, company_id)?,
                None => None,
            };
            Some(BusRelation {
                plate_number,
                template_name: get_template_name(conn, template_id)?,
                company_name,
            })
        }
        None => None,
    };

    let primary_driver: Option<DriverRelation> =
        get_driver(conn, primary_driver_id)?.map(|driver| DriverRelation {
            full_name: driver.full_name,
        });

    Ok(Some(ScheduleRelations {
        departure_time: Some(parse_timestamp("schedules.departure_date", &departure_date)?),
        route_schedule,
        bus,
        primary_driver,
    }))
}

fn settlement_record(
    conn: &mut SqliteConnection,
    row: SettlementRow,
) -> Result<SettlementRecord, PersistenceError> {
    let expenses: Vec<ExpenseRecord> = trip_expenses::table
        .filter(trip_expenses::settlement_id.eq(row.settlement_id))
        .order(trip_expenses::expense_id.asc())
        .select(ExpenseRow::as_select())
        .load(conn)?
        .into_iter()
        .map(|expense| {
            Ok(ExpenseRecord {
                expense_id: expense.expense_id,
                category: parse_stored("trip_expenses.category", &expense.category)?,
                amount: Some(expense.amount),
                description: expense.description,
            })
        })
        .collect::<Result<_, PersistenceError>>()?;

    Ok(SettlementRecord {
        settlement_id: row.settlement_id,
        schedule_id: row.schedule_id,
        total_income: Some(row.total_income),
        total_expenses: Some(row.total_expenses),
        net_amount: Some(row.net_amount),
        status: parse_stored("trip_settlements.status", &row.status)?,
        settled_at: parse_optional_timestamp(
            "trip_settlements.settled_at",
            row.settled_at.as_deref(),
        )?,
        schedule: load_schedule_relations(conn, row.schedule_id)?,
        expenses,
    })
}

/// Loads a settlement with its expenses and whatever relations exist.
///
/// # Errors
///
/// Returns an error if a query fails or a stored status cannot be decoded.
pub fn load_settlement_record(
    conn: &mut SqliteConnection,
    settlement_id: i64,
) -> Result<Option<SettlementRecord>, PersistenceError> {
    debug!(settlement_id, "Loading settlement");

    let row: Option<SettlementRow> = trip_settlements::table
        .filter(trip_settlements::settlement_id.eq(settlement_id))
        .select(SettlementRow::as_select())
        .first(conn)
        .optional()?;

    row.map(|row| settlement_record(conn, row)).transpose()
}

/// Loads all settlements, newest first, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if a query fails or a stored status cannot be decoded.
pub fn list_settlement_records(
    conn: &mut SqliteConnection,
    status: Option<SettlementStatus>,
) -> Result<Vec<SettlementRecord>, PersistenceError> {
    let mut query = trip_settlements::table
        .select(SettlementRow::as_select())
        .order(trip_settlements::settlement_id.desc())
        .into_boxed();

    if let Some(status) = status {
        query = query.filter(trip_settlements::status.eq(status.as_str()));
    }

    let rows: Vec<SettlementRow> = query.load(conn)?;
    rows.into_iter()
        .map(|row| settlement_record(conn, row))
        .collect()
}
