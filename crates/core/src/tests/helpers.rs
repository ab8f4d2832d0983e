// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::InMemoryFleetStore;
use coachline_domain::{
    BusAvailability, BusTypeTemplate, Dimensions, Driver, Floor, MaintenanceStatus,
    ScheduleProposal, ScheduleSlot, ScheduleStatus, Seat, SeatMatrix, SeatStatus, TimeWindow,
};
use time::{Date, Month, OffsetDateTime};

pub const BUS_A: i64 = 1;
pub const BUS_B: i64 = 2;
pub const DRIVER_X: i64 = 10;
pub const DRIVER_Y: i64 = 11;
pub const DRIVER_Z: i64 = 12;

pub fn at(hour: u8, minute: u8) -> OffsetDateTime {
    Date::from_calendar_date(2026, Month::April, 12)
        .unwrap()
        .with_hms(hour, minute, 0)
        .unwrap()
        .assume_utc()
}

pub fn window(start: (u8, u8), end: (u8, u8)) -> TimeWindow {
    TimeWindow::new(at(start.0, start.1), at(end.0, end.1)).unwrap()
}

pub fn create_test_bus(bus_id: i64) -> BusAvailability {
    BusAvailability {
        bus_id,
        is_active: true,
        maintenance_status: MaintenanceStatus::Active,
    }
}

pub fn create_test_driver(driver_id: i64) -> Driver {
    Driver {
        driver_id,
        full_name: format!("Driver {driver_id}"),
        license_number: format!("LIC-{driver_id}"),
        is_active: true,
    }
}

pub fn create_test_template(template_id: i64) -> BusTypeTemplate {
    let seats: Vec<Seat> = (0..2)
        .flat_map(|row| {
            (0..3).map(move |column| Seat {
                id: format!("s{row}{column}"),
                name: format!("{}{}", row + 1, ['A', 'B', 'C'][column as usize]),
                row,
                column,
                tier_id: None,
                is_empty: column == 1,
                status: SeatStatus::Maintenance,
                floor: None,
            })
        })
        .collect();

    BusTypeTemplate {
        template_id,
        name: String::from("Minibus"),
        seat_matrix: SeatMatrix {
            first_floor: Floor {
                dimensions: Dimensions {
                    rows: 2,
                    seats_per_row: 3,
                },
                seats,
            },
            second_floor: None,
        },
    }
}

/// Two in-service buses and three active drivers, no trips.
pub fn create_test_store() -> InMemoryFleetStore {
    let mut store: InMemoryFleetStore = InMemoryFleetStore::new();
    store.insert_bus(create_test_bus(BUS_A));
    store.insert_bus(create_test_bus(BUS_B));
    for driver_id in [DRIVER_X, DRIVER_Y, DRIVER_Z] {
        store.insert_driver(create_test_driver(driver_id));
    }
    store.insert_template(create_test_template(1));
    store
}

pub fn create_test_slot(
    schedule_id: i64,
    bus_id: i64,
    primary_driver_id: i64,
    secondary_driver_id: Option<i64>,
    window: TimeWindow,
) -> ScheduleSlot {
    ScheduleSlot {
        schedule_id,
        bus_id,
        primary_driver_id,
        secondary_driver_id,
        window,
        status: ScheduleStatus::Scheduled,
    }
}

pub fn create_test_proposal(
    bus_id: i64,
    primary_driver_id: i64,
    secondary_driver_id: Option<i64>,
    window: TimeWindow,
) -> ScheduleProposal {
    ScheduleProposal {
        schedule_id: None,
        bus_id,
        primary_driver_id,
        secondary_driver_id,
        window,
    }
}
