// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use coachline_domain::{Dimensions, Floor, Seat, SeatMatrix, SeatStatus};
use coachline_persistence::Persistence;
use rust_decimal::Decimal;
use time::{Date, Month, OffsetDateTime};

use crate::{
    CreateBusRequest, CreateDriverRequest, CreateRouteRequest, CreateRouteScheduleRequest,
    CreateTemplateRequest, ReserveScheduleRequest, create_bus, create_driver, create_route,
    create_route_schedule, create_template,
};

pub struct Fleet {
    pub route_id: i64,
    pub route_schedule_id: i64,
    pub template_id: i64,
    pub bus_id: i64,
    pub driver_a: i64,
    pub driver_b: i64,
}

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

/// Three rows of two seats; the last row's right cell is an empty slot.
pub fn create_small_matrix() -> SeatMatrix {
    let mut seats: Vec<Seat> = Vec::new();
    for row in 0..3 {
        for column in 0..2 {
            let is_empty: bool = row == 2 && column == 1;
            seats.push(Seat {
                id: format!("s{row}{column}"),
                name: format!("{}{}", row + 1, if column == 0 { 'A' } else { 'B' }),
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
                rows: 3,
                seats_per_row: 2,
            },
            seats,
        },
        second_floor: None,
    }
}

pub fn at(hour: u8, minute: u8) -> OffsetDateTime {
    Date::from_calendar_date(2026, Month::April, 12)
        .unwrap()
        .with_hms(hour, minute, 0)
        .unwrap()
        .assume_utc()
}

pub fn create_test_fleet(persistence: &mut Persistence) -> Fleet {
    let route_id: i64 = create_route(
        persistence,
        &CreateRouteRequest {
            origin: String::from("Hanoi"),
            destination: String::from("Hai Phong"),
        },
    )
    .unwrap()
    .route_id;
    let route_schedule_id: i64 = create_route_schedule(
        persistence,
        &CreateRouteScheduleRequest {
            route_id,
            departure_time: String::from("07:30"),
        },
    )
    .unwrap()
    .route_schedule_id;
    let template_id: i64 = create_template(
        persistence,
        &CreateTemplateRequest {
            name: String::from("Mini 5"),
            seat_matrix: create_small_matrix(),
        },
    )
    .unwrap()
    .template_id;
    let bus_id: i64 = create_bus(
        persistence,
        &CreateBusRequest {
            plate_number: String::from("29b-12345"),
            template_id,
            company_id: None,
        },
    )
    .unwrap()
    .bus_id;
    let driver_a: i64 = create_driver(
        persistence,
        &CreateDriverRequest {
            full_name: String::from("Pham Van A"),
            license_number: String::from("DL-001"),
        },
    )
    .unwrap()
    .driver_id;
    let driver_b: i64 = create_driver(
        persistence,
        &CreateDriverRequest {
            full_name: String::from("Hoang Thi B"),
            license_number: String::from("DL-002"),
        },
    )
    .unwrap()
    .driver_id;

    Fleet {
        route_id,
        route_schedule_id,
        template_id,
        bus_id,
        driver_a,
        driver_b,
    }
}

pub fn create_reserve_request(
    fleet: &Fleet,
    driver_id: i64,
    departure: (u8, u8),
    arrival: (u8, u8),
) -> ReserveScheduleRequest {
    ReserveScheduleRequest {
        route_id: fleet.route_id,
        route_schedule_id: fleet.route_schedule_id,
        bus_id: fleet.bus_id,
        primary_driver_id: driver_id,
        secondary_driver_id: None,
        departure_date: at(departure.0, departure.1),
        estimated_arrival_time: at(arrival.0, arrival.1),
        price: Decimal::new(180_000, 0),
    }
}
