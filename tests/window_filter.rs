#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveTime};
use groundplan::{
    Advisory, DutySlot, EngineConfig, FilterError, Flight, LeaveType, SkillTag, Staff, Station,
    ValidationError,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn station() -> Station {
    let mut s = Station::new();
    s.directory.add(Staff::local("Marie Sorel", "MS").unwrap());
    s.directory.add(
        Staff::roster("Luc Martin", "LM", Some(d(2024, 1, 10)), Some(d(2024, 1, 20))).unwrap(),
    );
    s.directory.add(
        Staff::roster("Ana Pires", "AP", Some(d(2024, 1, 21)), Some(d(2024, 1, 31))).unwrap(),
    );
    s
}

fn add_slot(s: &mut Station, date: NaiveDate, pickup: NaiveTime) -> groundplan::SlotId {
    let release = date.succ_opt().unwrap();
    s.duties
        .create(DutySlot::new(date, pickup, release, t(6, 0), 1, 3).unwrap())
        .unwrap()
}

#[test]
fn compute_filters_shifts_and_staff() {
    let mut s = station();
    let late = add_slot(&mut s, d(2024, 1, 16), t(22, 0));
    let early = add_slot(&mut s, d(2024, 1, 15), t(22, 0));
    add_slot(&mut s, d(2024, 1, 30), t(22, 0));

    let input = s
        .window_filter(EngineConfig::default())
        .compute(d(2024, 1, 15), d(2024, 1, 20))
        .unwrap();

    assert_eq!(input.shift_ids(), vec![&early, &late]);
    assert_eq!(input.active_shifts[0].day_offset, 0);
    assert_eq!(input.active_shifts[1].day_offset, 1);
    assert_eq!(input.active_shifts[0].duration_minutes, 480);
    assert_eq!(input.active_shifts[0].roles, "duty-only");

    let staff: Vec<&str> = input.eligible_staff.iter().map(|s| s.initials.as_str()).collect();
    assert_eq!(staff, vec!["MS", "LM"]);
}

#[test]
fn empty_window_is_an_explicit_failure() {
    let mut s = station();
    add_slot(&mut s, d(2024, 2, 1), t(6, 0));
    let err = s
        .window_filter(EngineConfig::default())
        .compute(d(2024, 1, 15), d(2024, 1, 20))
        .unwrap_err();
    assert!(matches!(err, FilterError::EmptyWindow { .. }));

    let empty = Station::new();
    assert!(matches!(
        empty
            .window_filter(EngineConfig::default())
            .compute(d(2024, 1, 15), d(2024, 1, 20)),
        Err(FilterError::EmptyWindow { .. })
    ));
}

#[test]
fn reversed_period_is_malformed() {
    let s = station();
    let err = s
        .window_filter(EngineConfig::default())
        .compute(d(2024, 1, 20), d(2024, 1, 15))
        .unwrap_err();
    assert!(matches!(err, FilterError::Validation(ValidationError::DateRange { .. })));
}

#[test]
fn incomplete_contracts_are_advisory_unless_strict() {
    let mut s = station();
    s.directory
        .add(Staff::roster("Draft Agent", "DA", None, Some(d(2024, 1, 31))).unwrap());
    add_slot(&mut s, d(2024, 1, 15), t(6, 0));

    let lenient = s
        .window_filter(EngineConfig::default())
        .compute(d(2024, 1, 15), d(2024, 1, 15))
        .unwrap();
    assert!(lenient.eligible_staff.iter().any(|st| st.initials == "DA"));
    assert!(lenient
        .advisories
        .iter()
        .any(|a| matches!(a, Advisory::IncompleteContract { .. })));

    let strict = EngineConfig {
        strict_contracts: true,
        ..EngineConfig::default()
    };
    match s.window_filter(strict).compute(d(2024, 1, 15), d(2024, 1, 15)) {
        Err(FilterError::Invalid(errors)) => {
            assert_eq!(
                errors,
                vec![ValidationError::MissingContract {
                    staff: "DA".into()
                }]
            );
        }
        other => panic!("expected invalid records, got {other:?}"),
    }
}

#[test]
fn flights_and_absences_travel_with_the_program() {
    let mut s = station();
    let slot = add_slot(&mut s, d(2024, 1, 15), t(6, 0));
    let near = s.add_flight(Flight::new("af1", "cdg", "lys", d(2024, 1, 14), None, Some(t(7, 0))).unwrap());
    let far = s.add_flight(Flight::new("af2", "cdg", "lys", d(2024, 1, 25), None, Some(t(7, 0))).unwrap());
    s.add_flight(Flight::new("af3", "cdg", "lys", d(2024, 2, 25), None, Some(t(7, 0))).unwrap());
    s.duties.toggle_engagement(&slot, &near).unwrap();
    s.duties.toggle_engagement(&slot, &far).unwrap();

    let ms = s.directory.find_by_initials("MS").unwrap().id.clone();
    s.ledger
        .add_leave(&[ms.clone()], d(2024, 1, 10), d(2024, 1, 15), LeaveType::DayOff)
        .unwrap();
    s.ledger
        .add_rest_log(&[ms], d(2024, 1, 14), d(2024, 1, 16), t(23, 0))
        .unwrap();

    let input = s
        .window_filter(EngineConfig::default())
        .compute(d(2024, 1, 15), d(2024, 1, 15))
        .unwrap();

    let numbers: Vec<&str> = input.flights.iter().map(|f| f.flight_number.as_str()).collect();
    assert_eq!(numbers, vec!["AF1", "AF2"]);
    assert_eq!(input.absences.leaves.len(), 1);
    assert_eq!(input.absences.rest_logs.len(), 2);

    let outside: Vec<&Advisory> = input
        .advisories
        .iter()
        .filter(|a| matches!(a, Advisory::FlightOutsideWindow { .. }))
        .collect();
    assert_eq!(outside.len(), 2);
    assert!(outside.contains(&&Advisory::FlightOutsideWindow {
        flight: far,
        day_offset: 10
    }));
}

#[test]
fn generation_input_serializes_with_derived_fields() {
    let mut s = station();
    let id = s
        .duties
        .create(
            DutySlot::new(d(2024, 1, 15), t(6, 0), d(2024, 1, 15), t(14, 0), 1, 2)
                .unwrap()
                .with_role(SkillTag::Ramp, 2),
        )
        .unwrap();

    let input = s
        .window_filter(EngineConfig::default())
        .compute(d(2024, 1, 15), d(2024, 1, 21))
        .unwrap();
    let mut out = Vec::new();
    groundplan::io::write_generation_input(&mut out, &input).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

    let shift = &json["active_shifts"][0];
    assert_eq!(shift["id"], id.as_str());
    assert_eq!(shift["pickup_time"], "06:00");
    assert_eq!(shift["duration_minutes"], 480);
    assert_eq!(shift["roles"], "2x Ramp");
    assert_eq!(json["eligible_staff"][1]["category"], "Roster");
}
