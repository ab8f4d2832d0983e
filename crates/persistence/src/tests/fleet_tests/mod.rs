// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{TestFleet, create_test_fleet, create_test_seat_matrix, seat_id};
use crate::{BusLayout, BusStatusUpdate, NewBus, Persistence, PersistenceError};
use coachline_domain::{
    BusTypeTemplate, DomainError, FloorTag, MaintenanceStatus, SeatMatrix, SeatStatus,
};

#[test]
fn test_create_bus_copies_template_seating() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let layout: BusLayout = persistence.get_bus_layout(fleet.bus_a).unwrap().unwrap();

    assert_eq!(layout.bus.seat_matrix.seat_count(), 40);
    assert_eq!(layout.bus.seat_matrix.sellable_count(), 38);
    assert_eq!(layout.bus_seats.len(), 38);
    assert!(
        layout
            .bus_seats
            .iter()
            .all(|seat| seat.status == SeatStatus::Available && seat.is_active)
    );
    assert!(
        layout
            .bus
            .seat_matrix
            .seats()
            .all(|seat| seat.floor == Some(FloorTag::First))
    );
    assert_eq!(layout.bus.template_id, fleet.template_id);
    assert_eq!(layout.bus.company_id, Some(fleet.company_id));
    assert!(layout.bus_seats.iter().all(|seat| seat.bus_id == fleet.bus_a));

    let other: BusLayout = persistence.get_bus_layout(fleet.bus_b).unwrap().unwrap();
    assert_eq!(other.bus_seats.len(), 38);
    assert!(other.bus_seats.iter().all(|seat| seat.bus_id == fleet.bus_b));
}

#[test]
fn test_create_bus_normalizes_plate_number() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let bus_id: i64 = persistence
        .create_bus(&NewBus {
            plate_number: String::from("  29c-55555 "),
            template_id: fleet.template_id,
            company_id: None,
        })
        .unwrap();

    let layout: BusLayout = persistence.get_bus_layout(bus_id).unwrap().unwrap();
    assert_eq!(layout.bus.plate_number, "29C-55555");
    assert!(layout.bus.is_active);
    assert_eq!(layout.bus.maintenance_status, MaintenanceStatus::Active);
}

#[test]
fn test_duplicate_plate_number_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let result: Result<i64, PersistenceError> = persistence.create_bus(&NewBus {
        plate_number: String::from("51b-11111"),
        template_id: fleet.template_id,
        company_id: None,
    });

    let err: PersistenceError = result.unwrap_err();
    assert_eq!(
        err.domain_violation(),
        Some(&DomainError::DuplicatePlateNumber(String::from("51B-11111")))
    );
}

#[test]
fn test_create_bus_with_unknown_company_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let err: PersistenceError = persistence
        .create_bus(&NewBus {
            plate_number: String::from("60A-00001"),
            template_id: fleet.template_id,
            company_id: Some(404),
        })
        .unwrap_err();

    assert_eq!(
        err.domain_violation(),
        Some(&DomainError::CompanyNotFound(404))
    );
}

#[test]
fn test_create_bus_with_unknown_template_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let err: PersistenceError = persistence
        .create_bus(&NewBus {
            plate_number: String::from("60A-00001"),
            template_id: 7,
            company_id: None,
        })
        .unwrap_err();

    assert_eq!(err.domain_violation(), Some(&DomainError::TemplateNotFound(7)));
}

#[test]
fn test_template_round_trips_through_storage() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let matrix: SeatMatrix = create_test_seat_matrix();

    let template_id: i64 = persistence.create_template("Coach 40", &matrix).unwrap();
    let template: BusTypeTemplate = persistence.get_template(template_id).unwrap().unwrap();

    assert_eq!(template.name, "Coach 40");
    assert_eq!(template.seat_matrix, matrix);
    assert!(persistence.get_template(template_id + 1).unwrap().is_none());
}

#[test]
fn test_create_template_rejects_seat_outside_grid() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let mut matrix: SeatMatrix = create_test_seat_matrix();
    matrix.first_floor.seats[0].row = 10;

    let err: PersistenceError = persistence.create_template("Broken", &matrix).unwrap_err();

    assert!(matches!(
        err.domain_violation(),
        Some(DomainError::InvalidSeatMatrix(_))
    ));
}

#[test]
fn test_route_schedule_requires_existing_route() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let err: PersistenceError = persistence.create_route_schedule(3, "07:30").unwrap_err();

    assert_eq!(err.domain_violation(), Some(&DomainError::RouteNotFound(3)));
}

#[test]
fn test_route_schedule_rejects_malformed_time() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let route_id: i64 = persistence.create_route("Hue", "Da Nang").unwrap();

    let err: PersistenceError = persistence
        .create_route_schedule(route_id, "25:00")
        .unwrap_err();

    assert!(matches!(
        err.domain_violation(),
        Some(DomainError::InvalidField {
            field: "departure_time",
            ..
        })
    ));
}

#[test]
fn test_driver_deactivation() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let driver_id: i64 = persistence.create_driver("Pham Van A", "LIC-A").unwrap();

    persistence.set_driver_active(driver_id, false).unwrap();

    assert!(!persistence.get_driver(driver_id).unwrap().unwrap().is_active);
}

#[test]
fn test_deactivating_unknown_driver_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let err: PersistenceError = persistence.set_driver_active(12, false).unwrap_err();

    assert_eq!(err.domain_violation(), Some(&DomainError::DriverNotFound(12)));
}

#[test]
fn test_blank_company_name_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let err: PersistenceError = persistence.create_company("   ").unwrap_err();

    assert!(matches!(
        err.domain_violation(),
        Some(DomainError::InvalidField { field: "name", .. })
    ));
}

#[test]
fn test_update_bus_status_partial() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    persistence
        .update_bus_status(
            fleet.bus_b,
            BusStatusUpdate {
                is_active: None,
                maintenance_status: Some(MaintenanceStatus::InMaintenance),
            },
        )
        .unwrap();

    let layout: BusLayout = persistence.get_bus_layout(fleet.bus_b).unwrap().unwrap();
    assert!(layout.bus.is_active);
    assert_eq!(
        layout.bus.maintenance_status,
        MaintenanceStatus::InMaintenance
    );
    assert!(layout.bus.seat_matrix.find_seat(&seat_id(0, 0)).is_some());
}

#[test]
fn test_update_status_of_unknown_bus_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let err: PersistenceError = persistence
        .update_bus_status(
            9,
            BusStatusUpdate {
                is_active: Some(false),
                maintenance_status: None,
            },
        )
        .unwrap_err();

    assert_eq!(err.domain_violation(), Some(&DomainError::BusNotFound(9)));
}

#[test]
fn test_reused_license_number_is_unique_violation() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence.create_driver("Pham Van A", "LIC-A").unwrap();

    let result: Result<i64, PersistenceError> = persistence.create_driver("Pham Van B", "LIC-A");

    assert!(matches!(result, Err(PersistenceError::UniqueViolation(_))));
}
