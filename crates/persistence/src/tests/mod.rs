// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod fleet_tests;
mod initialization_tests;
mod schedule_tests;
mod seat_tests;
mod settlement_tests;

use crate::{NewBus, NewSchedule, Persistence};
use coachline_domain::{Dimensions, Floor, Seat, SeatMatrix, SeatStatus};
use rust_decimal::Decimal;
use time::{Date, Month, OffsetDateTime};

const COLUMN_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Ids of the records created by [`create_test_fleet`].
pub struct TestFleet {
    pub company_id: i64,
    pub route_id: i64,
    pub route_schedule_id: i64,
    pub template_id: i64,
    pub bus_a: i64,
    pub bus_b: i64,
    pub driver_x: i64,
    pub driver_y: i64,
    pub driver_z: i64,
}

/// Seat ids read `r{row}c{column}`; names read "1A", "1B", ...
pub fn seat_id(row: u32, column: u32) -> String {
    format!("r{row}c{column}")
}

pub fn seat_name(row: u32, column: u32) -> String {
    format!("{}{}", row + 1, COLUMN_LETTERS[column as usize])
}

/// A 10x4 single deck with empty slots at 10B and 10C: 40 cells, 38 seats.
pub fn create_test_seat_matrix() -> SeatMatrix {
    let mut seats: Vec<Seat> = Vec::new();
    for row in 0..10 {
        for column in 0..4 {
            let is_empty: bool = row == 9 && (column == 1 || column == 2);
            seats.push(Seat {
                id: seat_id(row, column),
                name: seat_name(row, column),
                row,
                column,
                tier_id: if is_empty {
                    None
                } else {
                    Some(String::from("standard"))
                },
                is_empty,
                status: SeatStatus::Available,
                floor: None,
            });
        }
    }
    SeatMatrix {
        first_floor: Floor {
            dimensions: Dimensions {
                rows: 10,
                seats_per_row: 4,
            },
            seats,
        },
        second_floor: None,
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

/// A company, a route with one departure slot, a 40-cell template, two buses
/// and three drivers.
pub fn create_test_fleet(persistence: &mut Persistence) -> TestFleet {
    let company_id: i64 = persistence.create_company("Phuong Trang").unwrap();
    let route_id: i64 = persistence.create_route("Saigon", "Da Lat").unwrap();
    let route_schedule_id: i64 = persistence.create_route_schedule(route_id, "08:00").unwrap();
    let template_id: i64 = persistence
        .create_template("Coach 40", &create_test_seat_matrix())
        .unwrap();
    let bus_a: i64 = persistence
        .create_bus(&NewBus {
            plate_number: String::from("51B-11111"),
            template_id,
            company_id: Some(company_id),
        })
        .unwrap();
    let bus_b: i64 = persistence
        .create_bus(&NewBus {
            plate_number: String::from("51B-22222"),
            template_id,
            company_id: None,
        })
        .unwrap();

    TestFleet {
        company_id,
        route_id,
        route_schedule_id,
        template_id,
        bus_a,
        bus_b,
        driver_x: persistence.create_driver("Nguyen Van X", "LIC-X").unwrap(),
        driver_y: persistence.create_driver("Tran Thi Y", "LIC-Y").unwrap(),
        driver_z: persistence.create_driver("Le Van Z", "LIC-Z").unwrap(),
    }
}

/// A trip on the fleet's route between two times of the test day.
pub fn create_test_schedule(
    fleet: &TestFleet,
    bus_id: i64,
    primary_driver_id: i64,
    secondary_driver_id: Option<i64>,
    departure: (u8, u8),
    arrival: (u8, u8),
) -> NewSchedule {
    NewSchedule {
        route_id: fleet.route_id,
        route_schedule_id: fleet.route_schedule_id,
        bus_id,
        primary_driver_id,
        secondary_driver_id,
        departure: at(departure.0, departure.1),
        estimated_arrival: at(arrival.0, arrival.1),
        price: Decimal::new(250_000, 0),
    }
}
