// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::seat_matrix::{Floor, Seat, SeatMatrix};
use crate::types::{BusSeat, BusTypeTemplate, FloorTag, SeatStatus};
use crate::validation::validate_seat_matrix;

/// The seating of a freshly created bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatInstantiation {
    /// The bus's own copy of the template layout.
    pub seat_matrix: SeatMatrix,
    /// One unpersisted record per sellable seat, in matrix order.
    pub bus_seats: Vec<BusSeat>,
}

impl SeatInstantiation {
    /// Points every seat record at `bus_id`.
    pub fn assign_to_bus(&mut self, bus_id: i64) {
        for seat in &mut self.bus_seats {
            seat.bus_id = bus_id;
        }
    }
}

/// Builds a bus seating layout from a template.
///
/// Every floor's dimensions are copied, every seat is stamped with its floor
/// tag and reset to `available`, and a seat record is produced for each
/// sellable seat carrying over its tier.
///
/// # Arguments
///
/// * `template` - The bus type template to copy
/// * `bus_id` - The bus the seat records belong to
///
/// # Errors
///
/// Returns `DomainError::InvalidSeatMatrix` if the template layout is malformed.
pub fn instantiate_from_template(
    template: &BusTypeTemplate,
    bus_id: i64,
) -> Result<SeatInstantiation, DomainError> {
    validate_seat_matrix(&template.seat_matrix)?;

    let seat_matrix: SeatMatrix = SeatMatrix {
        first_floor: copy_floor(&template.seat_matrix.first_floor, FloorTag::First),
        second_floor: template
            .seat_matrix
            .second_floor
            .as_ref()
            .map(|floor| copy_floor(floor, FloorTag::Second)),
    };

    let bus_seats: Vec<BusSeat> = seat_matrix
        .seats()
        .filter(|seat| seat.is_sellable())
        .map(|seat| BusSeat::new(bus_id, seat.name.clone(), seat.tier_id.clone()))
        .collect();

    Ok(SeatInstantiation {
        seat_matrix,
        bus_seats,
    })
}

fn copy_floor(floor: &Floor, tag: FloorTag) -> Floor {
    Floor {
        dimensions: floor.dimensions,
        seats: floor
            .seats
            .iter()
            .map(|seat| Seat {
                status: SeatStatus::Available,
                floor: Some(tag),
                ..seat.clone()
            })
            .collect(),
    }
}
