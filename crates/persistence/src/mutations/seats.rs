// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Seat editing on a live bus.
//!
//! Each operation reads the bus's matrix and seat records, applies a pure
//! editor function and writes both back in the same transaction. The
//! returned layout is re-read after the write.

use coachline_domain::{
    Bus, BusSeat, DomainError, SeatEdit, SeatMatrix, SeatReconciliation, SeatStatus, apply_status,
    apply_tier, reconcile_bus_seats, set_empty_flag, validate_required, validate_seat_matrix,
};
use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Text;
use tracing::{debug, info};

use crate::data_models::BusLayout;
use crate::diesel_schema::{bus_seats, buses};
use crate::error::PersistenceError;
use crate::mutations::fleet::insert_bus_seats;
use crate::queries::fleet::{get_bus, get_bus_layout, list_bus_seats};

fn load_bus(conn: &mut SqliteConnection, bus_id: i64) -> Result<Bus, PersistenceError> {
    get_bus(conn, bus_id)?.ok_or_else(|| DomainError::BusNotFound(bus_id).into())
}

fn reload_layout(conn: &mut SqliteConnection, bus_id: i64) -> Result<BusLayout, PersistenceError> {
    get_bus_layout(conn, bus_id)?.ok_or_else(|| DomainError::BusNotFound(bus_id).into())
}

fn write_seat_matrix(
    conn: &mut SqliteConnection,
    bus_id: i64,
    seat_matrix: &SeatMatrix,
) -> Result<(), PersistenceError> {
    diesel::update(buses::table.filter(buses::bus_id.eq(bus_id)))
        .set((
            buses::seat_matrix_json.eq(serde_json::to_string(seat_matrix)?),
            buses::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;
    Ok(())
}

/// Writes an edited record list: changed existing records are updated and
/// records without an id are inserted.
fn write_seat_edit(
    conn: &mut SqliteConnection,
    before: &[BusSeat],
    edit: &SeatEdit,
) -> Result<usize, PersistenceError> {
    let mut changed: usize = 0;
    let mut created: Vec<BusSeat> = Vec::new();

    for record in &edit.bus_seats {
        let Some(bus_seat_id) = record.bus_seat_id else {
            created.push(record.clone());
            continue;
        };
        if before.iter().any(|original| original == record) {
            continue;
        }
        diesel::update(bus_seats::table.filter(bus_seats::bus_seat_id.eq(bus_seat_id)))
            .set((
                bus_seats::tier_id.eq(record.tier_id.as_deref()),
                bus_seats::status.eq(record.status.as_str()),
                bus_seats::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
            ))
            .execute(conn)?;
        changed += 1;
    }

    insert_bus_seats(conn, &created)?;
    Ok(changed + created.len())
}

/// Marks seats empty or sellable and brings the seat records in line.
///
/// Records of seats that became empty are deleted; seats that became
/// sellable get new available records.
///
/// # Errors
///
/// Returns `BusNotFound` if the bus does not exist, `InvalidSeatMatrix` if
/// the edited matrix no longer validates, or a database error.
pub fn set_seats_empty(
    conn: &mut SqliteConnection,
    bus_id: i64,
    seat_ids: &[String],
    is_empty: bool,
) -> Result<BusLayout, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let bus: Bus = load_bus(conn, bus_id)?;
        let records: Vec<BusSeat> = list_bus_seats(conn, bus_id)?;

        let seat_matrix: SeatMatrix = set_empty_flag(&bus.seat_matrix, seat_ids, is_empty);
        validate_seat_matrix(&seat_matrix)?;
        let reconciliation: SeatReconciliation =
            reconcile_bus_seats(&seat_matrix, &records, bus_id);

        write_seat_matrix(conn, bus_id, &seat_matrix)?;

        let removed_ids: Vec<i64> = reconciliation
            .removed
            .iter()
            .filter_map(|record| record.bus_seat_id)
            .collect();
        if !removed_ids.is_empty() {
            diesel::delete(bus_seats::table.filter(bus_seats::bus_seat_id.eq_any(&removed_ids)))
                .execute(conn)?;
        }
        insert_bus_seats(conn, &reconciliation.created)?;

        info!(
            bus_id,
            selected = seat_ids.len(),
            is_empty,
            created = reconciliation.created.len(),
            removed = reconciliation.removed.len(),
            "Updated empty seats"
        );
        reload_layout(conn, bus_id)
    })
}

/// Assigns a pricing tier to seats of a bus.
///
/// # Errors
///
/// Returns `BusNotFound` if the bus does not exist, an `InvalidField` error
/// for a blank tier, or a database error.
pub fn apply_seat_tier(
    conn: &mut SqliteConnection,
    bus_id: i64,
    seat_ids: &[String],
    tier_id: &str,
) -> Result<BusLayout, PersistenceError> {
    validate_required("tier_id", tier_id)?;
    let tier_id: &str = tier_id.trim();

    conn.immediate_transaction(|conn| {
        let bus: Bus = load_bus(conn, bus_id)?;
        let records: Vec<BusSeat> = list_bus_seats(conn, bus_id)?;

        let edit: SeatEdit = apply_tier(&bus.seat_matrix, &records, bus_id, seat_ids, tier_id);
        write_seat_matrix(conn, bus_id, &edit.seat_matrix)?;
        let written: usize = write_seat_edit(conn, &records, &edit)?;

        info!(bus_id, tier_id, selected = seat_ids.len(), written, "Applied seat tier");
        reload_layout(conn, bus_id)
    })
}

/// Sets the operational status of seats of a bus.
///
/// # Errors
///
/// Returns `BusNotFound` if the bus does not exist, or a database error.
pub fn apply_seat_status(
    conn: &mut SqliteConnection,
    bus_id: i64,
    seat_ids: &[String],
    status: SeatStatus,
) -> Result<BusLayout, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let bus: Bus = load_bus(conn, bus_id)?;
        let records: Vec<BusSeat> = list_bus_seats(conn, bus_id)?;

        let edit: SeatEdit = apply_status(&bus.seat_matrix, &records, bus_id, seat_ids, status);
        write_seat_matrix(conn, bus_id, &edit.seat_matrix)?;
        let written: usize = write_seat_edit(conn, &records, &edit)?;

        debug!(bus_id, %status, selected = seat_ids.len(), written, "Applied seat status");
        reload_layout(conn, bus_id)
    })
}
