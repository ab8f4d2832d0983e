// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BusTypeTemplate, Dimensions, Floor, ScheduleSlot, ScheduleStatus, Seat, SeatMatrix,
    SeatStatus, TimeWindow,
};
use time::{Date, Month, OffsetDateTime};

const COLUMN_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Builds a sellable seat named after its position ("1A", "1B", ...).
pub fn create_test_seat(prefix: &str, row: u32, column: u32, tier_id: Option<&str>) -> Seat {
    let letter: char = COLUMN_LETTERS[column as usize % COLUMN_LETTERS.len()];
    Seat {
        id: format!("{prefix}-{row}-{column}"),
        name: format!("{prefix}{}{letter}", row + 1),
        row,
        column,
        tier_id: tier_id.map(String::from),
        is_empty: false,
        status: SeatStatus::Available,
        floor: None,
    }
}

/// Builds an empty slot; it keeps its positional name.
pub fn create_test_empty_slot(prefix: &str, row: u32, column: u32) -> Seat {
    Seat {
        tier_id: None,
        is_empty: true,
        ..create_test_seat(prefix, row, column, None)
    }
}

/// A fully populated floor; every cell in `empty_cells` is an empty slot.
pub fn create_test_floor(
    prefix: &str,
    rows: u32,
    seats_per_row: u32,
    empty_cells: &[(u32, u32)],
) -> Floor {
    let mut seats: Vec<Seat> = Vec::new();
    for row in 0..rows {
        for column in 0..seats_per_row {
            if empty_cells.contains(&(row, column)) {
                seats.push(create_test_empty_slot(prefix, row, column));
            } else {
                seats.push(create_test_seat(prefix, row, column, Some("economy")));
            }
        }
    }
    Floor {
        dimensions: Dimensions {
            rows,
            seats_per_row,
        },
        seats,
    }
}

/// A single-deck 10x4 template with two empty slots: 40 cells, 38 seats.
pub fn create_test_template() -> BusTypeTemplate {
    BusTypeTemplate {
        template_id: 1,
        name: String::from("Coach 40"),
        seat_matrix: SeatMatrix {
            first_floor: create_test_floor("", 10, 4, &[(9, 1), (9, 2)]),
            second_floor: None,
        },
    }
}

/// A double-decker template: 3x4 lower deck, 4x4 upper deck with one empty slot.
pub fn create_test_double_decker() -> BusTypeTemplate {
    BusTypeTemplate {
        template_id: 2,
        name: String::from("Double Decker"),
        seat_matrix: SeatMatrix {
            first_floor: create_test_floor("L", 3, 4, &[]),
            second_floor: Some(create_test_floor("U", 4, 4, &[(0, 0)])),
        },
    }
}

/// An instant on the test day.
pub fn at(hour: u8, minute: u8) -> OffsetDateTime {
    Date::from_calendar_date(2026, Month::March, 1)
        .unwrap()
        .with_hms(hour, minute, 0)
        .unwrap()
        .assume_utc()
}

pub fn window(start: (u8, u8), end: (u8, u8)) -> TimeWindow {
    TimeWindow::new(at(start.0, start.1), at(end.0, end.1)).unwrap()
}

pub fn create_test_slot(
    schedule_id: i64,
    bus_id: i64,
    primary_driver_id: i64,
    secondary_driver_id: Option<i64>,
    window: TimeWindow,
    status: ScheduleStatus,
) -> ScheduleSlot {
    ScheduleSlot {
        schedule_id,
        bus_id,
        primary_driver_id,
        secondary_driver_id,
        window,
        status,
    }
}
