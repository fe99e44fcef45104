#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveTime};
use groundplan::{
    Dataset, DatasetStore, DutySlot, Flight, FlightKind, JsonFileStore, LeaveType,
    MemoryRepository, Repository, SkillTag, Staff, Station,
};
use tempfile::tempdir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn flight_identifiers_are_uppercased_and_kind_is_derived() {
    let arr = Flight::new(" af123 ", "cdg", "nce", d(2024, 1, 1), Some(t(9, 0)), None).unwrap();
    assert_eq!(arr.flight_number, "AF123");
    assert_eq!(arr.origin, "CDG");
    assert_eq!(arr.kind(), FlightKind::Arrival);

    let dep = Flight::new("af124", "nce", "cdg", d(2024, 1, 1), None, Some(t(10, 0))).unwrap();
    assert_eq!(dep.kind(), FlightKind::Departure);
    let both = Flight::new("af125", "nce", "nce", d(2024, 1, 1), Some(t(9, 0)), Some(t(10, 0))).unwrap();
    assert_eq!(both.kind(), FlightKind::Turnaround);
    let none = Flight::new("af126", "nce", "cdg", d(2024, 1, 1), None, None).unwrap();
    assert_eq!(none.kind(), FlightKind::Turnaround);

    assert!(Flight::new("  ", "nce", "cdg", d(2024, 1, 1), None, None).is_err());
}

#[test]
fn memory_repository_crud() {
    let mut repo: MemoryRepository<Staff> = MemoryRepository::default();
    let a = Staff::local("Marie Sorel", "MS").unwrap();
    let b = Staff::local("Jean Dupont", "JD").unwrap();
    repo.insert(a.clone());
    repo.insert(b.clone());
    assert_eq!(repo.list().len(), 2);

    let mut renamed = a.clone();
    renamed.name = "Marie Sorel-Durand".into();
    repo.update(renamed).unwrap();
    assert_eq!(repo.get(&a.id).unwrap().name, "Marie Sorel-Durand");

    assert!(repo.remove(&a.id).is_some());
    assert!(repo.remove(&a.id).is_none());
    assert!(repo.update(a).is_err());
    assert_eq!(repo.list()[0].id, b.id);
}

#[test]
fn missing_dataset_file_loads_empty() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("station.json")).unwrap();
    assert_eq!(store.load().unwrap(), Dataset::default());
}

#[test]
fn save_and_load_dataset_roundtrip() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("station.json")).unwrap();

    let mut station = Station::new();
    let flight = station.add_flight(Flight::new("af1", "cdg", "nce", d(2024, 1, 1), Some(t(9, 5)), None).unwrap());
    let ms = station.directory.add(
        Staff::roster("Marie Sorel", "MS", Some(d(2024, 1, 1)), None)
            .unwrap()
            .with_skills([SkillTag::Ramp]),
    );
    let slot = station
        .duties
        .create(
            DutySlot::new(d(2024, 1, 1), t(22, 0), d(2024, 1, 2), t(6, 0), 1, 2)
                .unwrap()
                .with_role(SkillTag::Ramp, 1),
        )
        .unwrap();
    station.duties.toggle_engagement(&slot, &flight).unwrap();
    station
        .ledger
        .add_leave(&[ms.clone()], d(2024, 1, 3), d(2024, 1, 4), LeaveType::DayOff)
        .unwrap();
    station
        .ledger
        .add_rest_log(&[ms], d(2024, 1, 1), d(2024, 1, 2), t(23, 30))
        .unwrap();

    let dataset = Dataset::from(station);
    store.save(&dataset).unwrap();
    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"pickup_time\": \"22:00\""));
    assert!(raw.contains("\"category\": \"Roster\""));

    let loaded = store.load().unwrap();
    assert_eq!(loaded, dataset);
    let station = Station::from(loaded);
    assert_eq!(station.ledger.rest_logs().len(), 2);
}
