// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk edits over a bus's seat matrix and its seat records.
//!
//! All operations are pure: they take the current state and return the new
//! state. Seats are located by id, first floor before second. Seat records
//! are matched to matrix seats by `seat_number == seat.name`.
//!
//! Selecting an unknown id, or an empty slot for a tier or status change, is a
//! silent no-op for that id.

use crate::seat_matrix::{Seat, SeatMatrix};
use crate::types::{BusSeat, SeatStatus};
use std::collections::{HashMap, HashSet};

/// Result of a tier or status edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatEdit {
    pub seat_matrix: SeatMatrix,
    /// The full seat record list after the edit, existing records first.
    pub bus_seats: Vec<BusSeat>,
}

/// Marks the selected cells as empty slots or as seats.
///
/// Marking a cell empty clears its tier. Seat records are not touched; run
/// [`reconcile_bus_seats`] afterwards to bring them in line.
#[must_use]
pub fn set_empty_flag(matrix: &SeatMatrix, seat_ids: &[String], is_empty: bool) -> SeatMatrix {
    let mut updated: SeatMatrix = matrix.clone();
    for seat_id in seat_ids {
        if let Some(seat) = updated.find_seat_mut(seat_id) {
            seat.is_empty = is_empty;
            if is_empty {
                seat.tier_id = None;
            }
        }
    }
    updated
}

/// Assigns a pricing tier to the selected seats.
///
/// The matrix seat's tier is updated together with its seat record; a seat
/// without a record gets a new available, active one.
#[must_use]
pub fn apply_tier(
    matrix: &SeatMatrix,
    bus_seats: &[BusSeat],
    bus_id: i64,
    seat_ids: &[String],
    tier_id: &str,
) -> SeatEdit {
    let mut seat_matrix: SeatMatrix = matrix.clone();
    let mut records: Vec<BusSeat> = bus_seats.to_vec();

    for seat_id in seat_ids {
        let Some(seat) = seat_matrix.find_seat_mut(seat_id) else {
            continue;
        };
        if seat.is_empty {
            continue;
        }
        seat.tier_id = Some(tier_id.to_string());

        match records
            .iter_mut()
            .find(|record| record.seat_number == seat.name)
        {
            Some(record) => record.tier_id = Some(tier_id.to_string()),
            None => records.push(BusSeat::new(
                bus_id,
                seat.name.clone(),
                Some(tier_id.to_string()),
            )),
        }
    }

    SeatEdit {
        seat_matrix,
        bus_seats: records,
    }
}

/// Sets the operational status of the selected seats.
///
/// A seat without a record gets one only if the matrix already assigns it a
/// tier; seats with neither a record nor a tier are skipped.
#[must_use]
pub fn apply_status(
    matrix: &SeatMatrix,
    bus_seats: &[BusSeat],
    bus_id: i64,
    seat_ids: &[String],
    status: SeatStatus,
) -> SeatEdit {
    let mut seat_matrix: SeatMatrix = matrix.clone();
    let mut records: Vec<BusSeat> = bus_seats.to_vec();

    for seat_id in seat_ids {
        let Some(seat) = seat_matrix.find_seat_mut(seat_id) else {
            continue;
        };
        if seat.is_empty {
            continue;
        }

        if let Some(record) = records
            .iter_mut()
            .find(|record| record.seat_number == seat.name)
        {
            record.status = status;
            seat.status = status;
        } else if let Some(tier_id) = seat.tier_id.clone() {
            let mut record: BusSeat = BusSeat::new(bus_id, seat.name.clone(), Some(tier_id));
            record.status = status;
            records.push(record);
            seat.status = status;
        }
    }

    SeatEdit {
        seat_matrix,
        bus_seats: records,
    }
}

/// How the seat records must change to match a matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatReconciliation {
    /// Records whose seat is still sellable.
    pub retained: Vec<BusSeat>,
    /// New records for sellable seats that had none.
    pub created: Vec<BusSeat>,
    /// Records whose seat became empty or no longer exists.
    pub removed: Vec<BusSeat>,
}

impl SeatReconciliation {
    /// Returns whether the records already match the matrix.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty()
    }
}

/// Compares seat records against the sellable seats of a matrix.
///
/// New records carry the matrix seat's tier and are available and active.
#[must_use]
pub fn reconcile_bus_seats(
    matrix: &SeatMatrix,
    bus_seats: &[BusSeat],
    bus_id: i64,
) -> SeatReconciliation {
    let sellable: HashMap<&str, &Seat> = matrix
        .seats()
        .filter(|seat| seat.is_sellable())
        .map(|seat| (seat.name.as_str(), seat))
        .collect();

    let mut reconciliation: SeatReconciliation = SeatReconciliation::default();
    let mut covered: HashSet<&str> = HashSet::new();

    for record in bus_seats {
        if sellable.contains_key(record.seat_number.as_str())
            && covered.insert(record.seat_number.as_str())
        {
            reconciliation.retained.push(record.clone());
        } else {
            reconciliation.removed.push(record.clone());
        }
    }

    reconciliation.created = matrix
        .seats()
        .filter(|seat| seat.is_sellable() && !covered.contains(seat.name.as_str()))
        .map(|seat| BusSeat::new(bus_id, seat.name.clone(), seat.tier_id.clone()))
        .collect();

    reconciliation
}

/// Projects seat records onto the layout for display.
///
/// Each sellable seat with a record takes that record's tier and status;
/// other cells are returned unchanged.
#[must_use]
pub fn overlay_bus_seats(matrix: &SeatMatrix, bus_seats: &[BusSeat]) -> SeatMatrix {
    let by_number: HashMap<&str, &BusSeat> = bus_seats
        .iter()
        .map(|record| (record.seat_number.as_str(), record))
        .collect();

    let mut overlaid: SeatMatrix = matrix.clone();
    let floors = std::iter::once(&mut overlaid.first_floor).chain(overlaid.second_floor.as_mut());
    for floor in floors {
        for seat in floor.seats.iter_mut().filter(|seat| seat.is_sellable()) {
            if let Some(record) = by_number.get(seat.name.as_str()) {
                seat.tier_id.clone_from(&record.tier_id);
                seat.status = record.status;
            }
        }
    }
    overlaid
}
