#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveTime};
use groundplan::{
    io::{read_flights, read_staff},
    SkillTag, StaffCategory,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn flights_import_decodes_serials_and_reports_bad_rows() {
    let csv = "\
flight_number,origin,destination,date,arrival,departure
af100,cdg,nce,45292,0930,
af101,nce,cdg,2024-01-02,,6:45
,nce,cdg,2024-01-02,,
af103,nce,cdg,someday,,
af104,nce,cdg,2024-01-03,25h99,
";
    let report = read_flights(csv.as_bytes()).unwrap();
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.records[0].date, d(2024, 1, 1));
    assert_eq!(report.records[0].flight_number, "AF100");
    assert_eq!(
        report.records[0].scheduled_arrival,
        NaiveTime::from_hms_opt(9, 30, 0)
    );
    assert_eq!(
        report.records[1].scheduled_departure,
        NaiveTime::from_hms_opt(6, 45, 0)
    );

    // 25h99 est reformaté en 23:59 par la saisie assistée
    assert_eq!(report.records[2].scheduled_arrival, NaiveTime::from_hms_opt(23, 59, 0));
    assert_eq!(report.errors.len(), 2);
    let lines: Vec<u64> = report.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![4, 5]);
    assert!(!report.is_clean());
}

#[test]
fn staff_import_builds_categories_and_skills() {
    let csv = "\
name,initials,category,capacity,skills,contract_from,contract_to
Marie Sorel,MS-ATZ,local,80,Ramp;LC,,
Luc Martin,LM,roster,100,ops|gate,45292,2024-03-31
Ana Pires,AP,roster,,,,
Bad Rate,BR,local,abc,,,
Odd Rate,OR,local,72,,,
Nobody,,local,,,,
";
    let report = read_staff(csv.as_bytes()).unwrap();
    assert_eq!(report.records.len(), 3);

    let ms = &report.records[0];
    assert_eq!(ms.capacity_rate, 80);
    assert!(ms.skills.contains(&SkillTag::Ramp));
    assert!(ms.skills.contains(&SkillTag::LoadControl));

    let lm = &report.records[1];
    assert_eq!(lm.category.contract_window(), Some((d(2024, 1, 1), d(2024, 3, 31))));
    assert!(lm.skills.contains(&SkillTag::GateCheckIn));

    assert_eq!(
        report.records[2].category,
        StaffCategory::Roster {
            contract_from: None,
            contract_to: None
        }
    );

    let messages: Vec<&str> = report.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "not a number: abc",
            "capacity rate must be 50..=100 by steps of 5, got 72",
            "initials cannot be empty",
        ]
    );
}

#[test]
fn undecodable_row_is_reported_and_import_continues() {
    let mut bytes = b"flight_number,origin,destination,date,arrival,departure\n".to_vec();
    bytes.extend_from_slice(b"af200,cdg,nce,2024-01-02,,\n");
    bytes.extend_from_slice(b"af201,cdg,\xFF\xFE,2024-01-02,,\n");
    bytes.extend_from_slice(b"af202,nce,cdg,2024-01-03,,\n");

    let report = read_flights(&bytes[..]).unwrap();
    let numbers: Vec<&str> = report.records.iter().map(|f| f.flight_number.as_str()).collect();
    assert_eq!(numbers, vec!["AF200", "AF202"]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].line, 3);
    assert!(report.errors[0].message.contains("utf-8"));
}
