// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{TestFleet, create_test_fleet, create_test_seat_matrix, seat_id, seat_name};
use crate::diesel_schema::buses;
use crate::{BusLayout, Persistence, PersistenceError};
use coachline_domain::{BusSeat, DomainError, Seat, SeatMatrix, SeatStatus};
use diesel::prelude::*;

fn record<'a>(layout: &'a BusLayout, seat_number: &str) -> Option<&'a BusSeat> {
    layout
        .bus_seats
        .iter()
        .find(|seat| seat.seat_number == seat_number)
}

fn matrix_seat<'a>(layout: &'a BusLayout, id: &str) -> &'a Seat {
    layout.bus.seat_matrix.find_seat(id).unwrap()
}

#[test]
fn test_marking_seat_empty_removes_its_record() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let layout: BusLayout = persistence
        .set_seats_empty(fleet.bus_a, &[seat_id(0, 0)], true)
        .unwrap();

    assert_eq!(layout.bus_seats.len(), 37);
    assert!(record(&layout, &seat_name(0, 0)).is_none());
    let seat: &Seat = matrix_seat(&layout, &seat_id(0, 0));
    assert!(seat.is_empty);
    assert_eq!(seat.tier_id, None);
}

#[test]
fn test_marking_slot_sellable_creates_record() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let layout: BusLayout = persistence
        .set_seats_empty(fleet.bus_a, &[seat_id(9, 1)], false)
        .unwrap();

    assert_eq!(layout.bus_seats.len(), 39);
    let created: &BusSeat = record(&layout, &seat_name(9, 1)).unwrap();
    assert_eq!(created.status, SeatStatus::Available);
    assert!(created.bus_seat_id.is_some());
}

#[test]
fn test_template_with_empty_slot_reusing_a_seat_name_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let mut matrix: SeatMatrix = create_test_seat_matrix();
    if let Some(slot) = matrix.first_floor.seats.iter_mut().find(|s| s.is_empty) {
        slot.name = seat_name(0, 0);
    }

    let err: PersistenceError = persistence.create_template("Clash", &matrix).unwrap_err();

    assert!(matches!(
        err.domain_violation(),
        Some(DomainError::InvalidSeatMatrix(_))
    ));
}

#[test]
fn test_opening_slot_that_would_duplicate_a_seat_name_writes_nothing() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    // A stored layout whose empty slots carry a reused and a blank name
    let mut stored: SeatMatrix = create_test_seat_matrix();
    for slot in stored.first_floor.seats.iter_mut().filter(|s| s.is_empty) {
        slot.name = if slot.column == 1 {
            seat_name(0, 0)
        } else {
            String::new()
        };
    }
    diesel::update(buses::table.filter(buses::bus_id.eq(fleet.bus_a)))
        .set(buses::seat_matrix_json.eq(serde_json::to_string(&stored).unwrap()))
        .execute(&mut persistence.conn)
        .unwrap();

    let err: PersistenceError = persistence
        .set_seats_empty(fleet.bus_a, &[seat_id(9, 1), seat_id(9, 2)], false)
        .unwrap_err();

    assert!(matches!(
        err.domain_violation(),
        Some(DomainError::InvalidSeatMatrix(_))
    ));
    let layout: BusLayout = persistence.get_bus_layout(fleet.bus_a).unwrap().unwrap();
    assert_eq!(layout.bus.seat_matrix.sellable_count(), 38);
    assert_eq!(layout.bus_seats.len(), 38);
    assert!(layout.bus_seats.iter().all(|seat| !seat.seat_number.is_empty()));
}

#[test]
fn test_opened_slots_keep_one_record_per_sellable_seat() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let layout: BusLayout = persistence
        .set_seats_empty(fleet.bus_a, &[seat_id(9, 1), seat_id(9, 2)], false)
        .unwrap();

    assert_eq!(layout.bus.seat_matrix.sellable_count(), 40);
    assert_eq!(layout.bus_seats.len(), 40);
    assert!(record(&layout, &seat_name(9, 2)).is_some());
}

#[test]
fn test_empty_toggle_round_trip_restores_record_count() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);
    let seats: Vec<String> = vec![seat_id(2, 0), seat_id(2, 1)];

    persistence.set_seats_empty(fleet.bus_a, &seats, true).unwrap();
    let layout: BusLayout = persistence.set_seats_empty(fleet.bus_a, &seats, false).unwrap();

    assert_eq!(layout.bus_seats.len(), 38);
    assert_eq!(layout.bus.seat_matrix.sellable_count(), 38);
}

#[test]
fn test_seat_edits_are_scoped_to_one_bus() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    persistence
        .set_seats_empty(fleet.bus_a, &[seat_id(0, 0)], true)
        .unwrap();

    let other: BusLayout = persistence.get_bus_layout(fleet.bus_b).unwrap().unwrap();
    assert_eq!(other.bus_seats.len(), 38);
    assert!(!matrix_seat(&other, &seat_id(0, 0)).is_empty);
}

#[test]
fn test_apply_tier_updates_records_and_layout() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let layout: BusLayout = persistence
        .apply_seat_tier(fleet.bus_a, &[seat_id(0, 0), seat_id(0, 1)], "vip")
        .unwrap();

    assert_eq!(layout.bus_seats.len(), 38);
    for (row, column) in [(0, 0), (0, 1)] {
        assert_eq!(
            record(&layout, &seat_name(row, column)).unwrap().tier_id.as_deref(),
            Some("vip")
        );
        assert_eq!(
            matrix_seat(&layout, &seat_id(row, column)).tier_id.as_deref(),
            Some("vip")
        );
    }
    assert_eq!(
        record(&layout, &seat_name(0, 2)).unwrap().tier_id.as_deref(),
        Some("standard")
    );
}

#[test]
fn test_apply_tier_to_empty_slot_changes_nothing() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);
    let before: BusLayout = persistence.get_bus_layout(fleet.bus_a).unwrap().unwrap();

    let after: BusLayout = persistence
        .apply_seat_tier(fleet.bus_a, &[seat_id(9, 1)], "vip")
        .unwrap();

    assert_eq!(after.bus_seats, before.bus_seats);
    assert_eq!(matrix_seat(&after, &seat_id(9, 1)).tier_id, None);
}

#[test]
fn test_apply_tier_rejects_blank_tier() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let err: PersistenceError = persistence
        .apply_seat_tier(fleet.bus_a, &[seat_id(0, 0)], " ")
        .unwrap_err();

    assert!(matches!(
        err.domain_violation(),
        Some(DomainError::InvalidField {
            field: "tier_id",
            ..
        })
    ));
}

#[test]
fn test_apply_status_marks_seats_for_maintenance() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fleet: TestFleet = create_test_fleet(&mut persistence);

    let layout: BusLayout = persistence
        .apply_seat_status(
            fleet.bus_a,
            &[seat_id(1, 3), String::from("no-such-seat")],
            SeatStatus::Maintenance,
        )
        .unwrap();

    assert_eq!(
        record(&layout, &seat_name(1, 3)).unwrap().status,
        SeatStatus::Maintenance
    );
    assert_eq!(
        matrix_seat(&layout, &seat_id(1, 3)).status,
        SeatStatus::Maintenance
    );
    let maintained: usize = layout
        .bus_seats
        .iter()
        .filter(|seat| seat.status == SeatStatus::Maintenance)
        .count();
    assert_eq!(maintained, 1);
}

#[test]
fn test_seat_edit_on_unknown_bus_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let err: PersistenceError = persistence
        .set_seats_empty(42, &[seat_id(0, 0)], true)
        .unwrap_err();

    assert_eq!(err.domain_violation(), Some(&DomainError::BusNotFound(42)));
}
