// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{TestFleet, at, create_test_fleet, create_test_schedule};
use crate::{BusStatusUpdate, NewSchedule, Persistence, PersistenceError, ScheduleAssignment};
use coachline_domain::{
    ConflictResource, DomainError, DriverRole, MaintenanceStatus, Schedule, ScheduleConflict,
    ScheduleStatus,
};
use rust_decimal::Decimal;

fn conflict_of(err: &PersistenceError) -> ScheduleConflict {
    match err.domain_violation() {
        Some(DomainError::ScheduleConflict(conflict)) => *conflict,
        other => panic!("expected a schedule conflict, got {other:?}"),
    }
}

#[test]
fn test_reserve_schedule_stores_trip() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let schedule_id: i64 = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_x,
            Some(fleet.driver_y),
            (10, 0),
            (12, 0),
        ))
        .unwrap();

    let schedule: Schedule = persistence.get_schedule(schedule_id).unwrap().unwrap();
    assert_eq!(schedule.status, ScheduleStatus::Scheduled);
    assert_eq!(schedule.bus_id, fleet.bus_a);
    assert_eq!(schedule.secondary_driver_id, Some(fleet.driver_y));
    assert_eq!(schedule.window.start(), at(10, 0));
    assert_eq!(schedule.window.end(), at(12, 0));
    assert_eq!(schedule.price, Decimal::new(250_000, 0));
    assert_eq!(schedule.actual_departure_time, None);
}

#[test]
fn test_second_overlapping_reservation_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let first: i64 = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_x,
            None,
            (10, 0),
            (12, 0),
        ))
        .unwrap();

    let err: PersistenceError = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_y,
            None,
            (12, 0),
            (14, 0),
        ))
        .unwrap_err();

    assert_eq!(
        conflict_of(&err),
        ScheduleConflict {
            resource: ConflictResource::Bus {
                bus_id: fleet.bus_a
            },
            conflicting_schedule_id: first,
        }
    );
    assert_eq!(persistence.list_schedules(None).unwrap().len(), 1);
}

#[test]
fn test_reservation_one_minute_after_arrival_allowed() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_x,
            None,
            (10, 0),
            (12, 0),
        ))
        .unwrap();
    let result: Result<i64, PersistenceError> = persistence.reserve_schedule(
        &create_test_schedule(&fleet, fleet.bus_a, fleet.driver_y, None, (12, 1), (14, 0)),
    );

    assert!(result.is_ok());
    assert_eq!(persistence.list_schedules(None).unwrap().len(), 2);
}

#[test]
fn test_driver_busy_as_primary_cannot_be_secondary_elsewhere() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let first: i64 = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_x,
            None,
            (9, 0),
            (11, 0),
        ))
        .unwrap();

    let err: PersistenceError = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_b,
            fleet.driver_y,
            Some(fleet.driver_x),
            (10, 0),
            (12, 0),
        ))
        .unwrap_err();

    assert_eq!(
        conflict_of(&err),
        ScheduleConflict {
            resource: ConflictResource::Driver {
                driver_id: fleet.driver_x,
                role: DriverRole::Secondary,
            },
            conflicting_schedule_id: first,
        }
    );
}

#[test]
fn test_cancelled_trip_frees_bus_and_reactivation_is_rechecked() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let first: i64 = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_x,
            None,
            (10, 0),
            (12, 0),
        ))
        .unwrap();
    persistence
        .update_schedule_status(first, ScheduleStatus::Cancelled)
        .unwrap();

    let second: i64 = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_y,
            None,
            (11, 0),
            (13, 0),
        ))
        .unwrap();

    let err: PersistenceError = persistence
        .update_schedule_status(first, ScheduleStatus::Scheduled)
        .unwrap_err();
    assert_eq!(conflict_of(&err).conflicting_schedule_id, second);

    let stored: Schedule = persistence.get_schedule(first).unwrap().unwrap();
    assert_eq!(stored.status, ScheduleStatus::Cancelled);
}

#[test]
fn test_bus_in_maintenance_cannot_be_reserved() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);
    persistence
        .update_bus_status(
            fleet.bus_b,
            BusStatusUpdate {
                is_active: None,
                maintenance_status: Some(MaintenanceStatus::OutOfService),
            },
        )
        .unwrap();

    let err: PersistenceError = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_b,
            fleet.driver_x,
            None,
            (10, 0),
            (12, 0),
        ))
        .unwrap_err();

    assert_eq!(
        err.domain_violation(),
        Some(&DomainError::BusUnavailable {
            bus_id: fleet.bus_b,
            maintenance_status: MaintenanceStatus::OutOfService,
        })
    );
}

#[test]
fn test_inactive_driver_cannot_be_reserved() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);
    persistence.set_driver_active(fleet.driver_z, false).unwrap();

    let err: PersistenceError = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_x,
            Some(fleet.driver_z),
            (10, 0),
            (12, 0),
        ))
        .unwrap_err();

    assert_eq!(
        err.domain_violation(),
        Some(&DomainError::DriverInactive(fleet.driver_z))
    );
}

#[test]
fn test_arrival_before_departure_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let err: PersistenceError = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_x,
            None,
            (12, 0),
            (10, 0),
        ))
        .unwrap_err();

    assert!(matches!(
        err.domain_violation(),
        Some(DomainError::InvalidTimeWindow { .. })
    ));
}

#[test]
fn test_route_schedule_of_another_route_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);
    let other_route: i64 = persistence.create_route("Saigon", "Vung Tau").unwrap();

    let mut new_schedule: NewSchedule = create_test_schedule(
        &fleet,
        fleet.bus_a,
        fleet.driver_x,
        None,
        (10, 0),
        (12, 0),
    );
    new_schedule.route_id = other_route;

    let err: PersistenceError = persistence.reserve_schedule(&new_schedule).unwrap_err();

    assert!(matches!(
        err.domain_violation(),
        Some(DomainError::InvalidField {
            field: "route_schedule_id",
            ..
        })
    ));
}

#[test]
fn test_update_schedule_ignores_its_own_booking() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);
    let schedule_id: i64 = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_x,
            None,
            (10, 0),
            (12, 0),
        ))
        .unwrap();

    let updated: Schedule = persistence
        .update_schedule(
            schedule_id,
            &ScheduleAssignment {
                estimated_arrival: Some(at(12, 30)),
                secondary_driver_id: Some(Some(fleet.driver_y)),
                ..ScheduleAssignment::default()
            },
        )
        .unwrap();

    assert_eq!(updated.window.end(), at(12, 30));
    assert_eq!(updated.secondary_driver_id, Some(fleet.driver_y));
    assert_eq!(
        persistence.get_schedule(schedule_id).unwrap().unwrap(),
        updated
    );
}

#[test]
fn test_update_schedule_into_conflict_leaves_row_unchanged() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);
    persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_x,
            None,
            (10, 0),
            (12, 0),
        ))
        .unwrap();
    let second: i64 = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_b,
            fleet.driver_y,
            None,
            (11, 0),
            (13, 0),
        ))
        .unwrap();
    let before: Schedule = persistence.get_schedule(second).unwrap().unwrap();

    let err: PersistenceError = persistence
        .update_schedule(
            second,
            &ScheduleAssignment {
                bus_id: Some(fleet.bus_a),
                ..ScheduleAssignment::default()
            },
        )
        .unwrap_err();

    assert!(matches!(
        conflict_of(&err).resource,
        ConflictResource::Bus { .. }
    ));
    assert_eq!(persistence.get_schedule(second).unwrap().unwrap(), before);
}

#[test]
fn test_price_change_allowed_after_bus_enters_maintenance() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);
    let schedule_id: i64 = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_x,
            None,
            (10, 0),
            (12, 0),
        ))
        .unwrap();
    persistence
        .update_schedule_status(schedule_id, ScheduleStatus::InProgress)
        .unwrap();
    persistence
        .update_bus_status(
            fleet.bus_a,
            BusStatusUpdate {
                is_active: None,
                maintenance_status: Some(MaintenanceStatus::InMaintenance),
            },
        )
        .unwrap();

    let updated: Schedule = persistence
        .update_schedule(
            schedule_id,
            &ScheduleAssignment {
                price: Some(Decimal::new(99, 0)),
                ..ScheduleAssignment::default()
            },
        )
        .unwrap();
    assert_eq!(updated.price, Decimal::new(99, 0));
    assert_eq!(updated.status, ScheduleStatus::InProgress);

    // Moving the window still re-checks the bus
    let err: PersistenceError = persistence
        .update_schedule(
            schedule_id,
            &ScheduleAssignment {
                estimated_arrival: Some(at(12, 30)),
                ..ScheduleAssignment::default()
            },
        )
        .unwrap_err();
    assert_eq!(
        err.domain_violation(),
        Some(&DomainError::BusUnavailable {
            bus_id: fleet.bus_a,
            maintenance_status: MaintenanceStatus::InMaintenance,
        })
    );
}

#[test]
fn test_update_unknown_schedule_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let err: PersistenceError = persistence
        .update_schedule_status(77, ScheduleStatus::Completed)
        .unwrap_err();

    assert_eq!(err.domain_violation(), Some(&DomainError::ScheduleNotFound(77)));
}

#[test]
fn test_status_changes_stamp_actual_times() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);
    let schedule_id: i64 = persistence
        .reserve_schedule(&create_test_schedule(
            &fleet,
            fleet.bus_a,
            fleet.driver_x,
            None,
            (10, 0),
            (12, 0),
        ))
        .unwrap();

    let departed: Schedule = persistence
        .update_schedule_status(schedule_id, ScheduleStatus::InProgress)
        .unwrap();
    assert!(departed.actual_departure_time.is_some());
    assert!(departed.actual_arrival_time.is_none());

    let arrived: Schedule = persistence
        .update_schedule_status(schedule_id, ScheduleStatus::Completed)
        .unwrap();
    assert!(arrived.actual_arrival_time.is_some());

    let listed: Vec<Schedule> = persistence
        .list_schedules(Some(ScheduleStatus::Completed))
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert!(
        persistence
            .list_schedules(Some(ScheduleStatus::Scheduled))
            .unwrap()
            .is_empty()
    );
}
