// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Physical seating layout of a bus.
//!
//! A seat matrix has a mandatory first floor and an optional second floor.
//! Each floor is a grid of `rows × seats_per_row` cells; every cell that is
//! described by a [`Seat`] is either a sellable seat or an empty slot (aisle,
//! stairwell, toilet).
//!
//! ## Invariants
//!
//! - `seat.row < dimensions.rows` and `seat.column < dimensions.seats_per_row`
//! - Seat ids are unique across both floors
//! - Empty seats carry no tier and are never sellable
//!
//! The serialized form uses camelCase keys; it is stored verbatim on bus and
//! template records.

use crate::types::{FloorTag, SeatStatus};
use serde::{Deserialize, Serialize};

/// Grid size of one floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub rows: u32,
    pub seats_per_row: u32,
}

/// One cell of a floor grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    /// Identifier, unique within the matrix.
    pub id: String,
    /// Display label printed on the seat (e.g. "1A").
    pub name: String,
    pub row: u32,
    pub column: u32,
    /// Pricing tier. Always `None` for empty slots.
    #[serde(default)]
    pub tier_id: Option<String>,
    /// Whether this cell is an empty slot rather than a seat.
    #[serde(default)]
    pub is_empty: bool,
    #[serde(default)]
    pub status: SeatStatus,
    /// Deck tag, stamped when a bus is instantiated from a template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<FloorTag>,
}

impl Seat {
    /// Returns whether this seat can be sold.
    #[must_use]
    pub const fn is_sellable(&self) -> bool {
        !self.is_empty
    }
}

/// One deck of a bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub dimensions: Dimensions,
    #[serde(default)]
    pub seats: Vec<Seat>,
}

impl Floor {
    /// Partitions the seats by row for rendering.
    ///
    /// The result always has `dimensions.rows` entries; each row is ordered
    /// by column. Seats outside the grid are omitted.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<&Seat>> {
        (0..self.dimensions.rows)
            .map(|row| {
                let mut seats: Vec<&Seat> =
                    self.seats.iter().filter(|seat| seat.row == row).collect();
                seats.sort_by_key(|seat| seat.column);
                seats
            })
            .collect()
    }

    /// Returns the seat at a grid position, if the cell is described.
    #[must_use]
    pub fn seat_at(&self, row: u32, column: u32) -> Option<&Seat> {
        self.seats
            .iter()
            .find(|seat| seat.row == row && seat.column == column)
    }

    /// Number of sellable (non-empty) seats on this floor.
    #[must_use]
    pub fn sellable_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_sellable()).count()
    }
}

/// The full seating layout of a bus or template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMatrix {
    pub first_floor: Floor,
    #[serde(default)]
    pub second_floor: Option<Floor>,
}

impl SeatMatrix {
    /// Iterates the present floors with their tags, first floor first.
    pub fn floors(&self) -> impl Iterator<Item = (FloorTag, &Floor)> {
        std::iter::once((FloorTag::First, &self.first_floor)).chain(
            self.second_floor
                .as_ref()
                .map(|floor| (FloorTag::Second, floor)),
        )
    }

    /// Iterates every seat on every floor, first floor first.
    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.floors().flat_map(|(_, floor)| floor.seats.iter())
    }

    /// Total number of described cells, empty slots included.
    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.floors().map(|(_, floor)| floor.seats.len()).sum()
    }

    /// Number of sellable seats across both floors.
    #[must_use]
    pub fn sellable_count(&self) -> usize {
        self.floors().map(|(_, floor)| floor.sellable_count()).sum()
    }

    /// Finds a seat by id, searching the first floor before the second.
    #[must_use]
    pub fn find_seat(&self, seat_id: &str) -> Option<&Seat> {
        self.seats().find(|seat| seat.id == seat_id)
    }

    pub(crate) fn find_seat_mut(&mut self, seat_id: &str) -> Option<&mut Seat> {
        if let Some(index) = self
            .first_floor
            .seats
            .iter()
            .position(|seat| seat.id == seat_id)
        {
            return self.first_floor.seats.get_mut(index);
        }

        self.second_floor
            .as_mut()
            .and_then(|floor| floor.seats.iter_mut().find(|seat| seat.id == seat_id))
    }
}
