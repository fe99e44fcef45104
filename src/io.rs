use crate::duty::{role_summary, slot_day_offset, slot_duration};
use crate::error::ValidationError;
use crate::model::{DutySlot, Flight, SkillTag, Staff};
use crate::time_window::{self, excel_serial_to_date};
use crate::window_filter::GenerationInput;
use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Ligne rejetée lors d'un import ; l'import continue sur les lignes suivantes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

/// Résultat d'un import en masse : enregistrements valides et lignes rejetées.
#[derive(Debug, Clone)]
pub struct ImportReport<T> {
    pub records: Vec<T>,
    pub errors: Vec<RowError>,
}

impl<T> Default for ImportReport<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> ImportReport<T> {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

fn read_rows<R, T, F>(rdr: R, mut parse: F) -> anyhow::Result<ImportReport<T>>
where
    R: Read,
    F: FnMut(&StringRecord) -> Result<T, ValidationError>,
{
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(rdr);
    let mut report = ImportReport::default();
    for rec in csv.records() {
        let rec = match rec {
            Ok(rec) => rec,
            Err(err) if err.is_io_error() => return Err(err).context("reading csv row"),
            // ligne illisible (UTF-8 invalide...) : signalée, l'import continue
            Err(err) => {
                let line = err.position().map_or(0, |p| p.line());
                tracing::warn!(line, %err, "import row unreadable");
                report.errors.push(RowError {
                    line,
                    message: err.to_string(),
                });
                continue;
            }
        };
        let line = rec.position().map_or(0, |p| p.line());
        if rec.iter().all(str::is_empty) {
            continue;
        }
        match parse(&rec) {
            Ok(item) => report.records.push(item),
            Err(err) => {
                tracing::warn!(line, %err, "import row rejected");
                report.errors.push(RowError {
                    line,
                    message: err.to_string(),
                });
            }
        }
    }
    Ok(report)
}

fn field<'r>(rec: &'r StringRecord, idx: usize) -> &'r str {
    rec.get(idx).unwrap_or("")
}

fn required<'r>(rec: &'r StringRecord, idx: usize, name: &'static str) -> Result<&'r str, ValidationError> {
    let v = field(rec, idx);
    if v.is_empty() {
        return Err(ValidationError::EmptyField(name));
    }
    Ok(v)
}

/// Heure saisie librement (`6:30`, `0630`, `06h30`) ; vide = absente.
fn optional_time(raw: &str) -> Result<Option<NaiveTime>, ValidationError> {
    if raw.is_empty() {
        return Ok(None);
    }
    if time_window::is_valid_time(raw) {
        return time_window::parse_time(raw).map(Some);
    }
    time_window::parse_time(&time_window::parse_time_input(raw))
        .map(Some)
        .map_err(|_| ValidationError::InvalidTime(raw.to_owned()))
}

fn optional_date(raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    if raw.is_empty() {
        return Ok(None);
    }
    excel_serial_to_date(raw).map(Some)
}

/// Vols : header `flight_number,origin,destination,date,arrival,departure`.
/// La date accepte un numéro de série tableur à 5 chiffres.
pub fn read_flights<R: Read>(rdr: R) -> anyhow::Result<ImportReport<Flight>> {
    read_rows(rdr, |rec| {
        let number = required(rec, 0, "flight number")?;
        let date = excel_serial_to_date(required(rec, 3, "date")?)?;
        Flight::new(
            number,
            field(rec, 1),
            field(rec, 2),
            date,
            optional_time(field(rec, 4))?,
            optional_time(field(rec, 5))?,
        )
    })
}

pub fn import_flights_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<ImportReport<Flight>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_flights(file)
}

/// Personnel : header `name,initials,category,capacity,skills,contract_from,contract_to`.
pub fn read_staff<R: Read>(rdr: R) -> anyhow::Result<ImportReport<Staff>> {
    read_rows(rdr, |rec| {
        let name = required(rec, 0, "name")?;
        let initials = required(rec, 1, "initials")?;
        let mut staff = match field(rec, 2).to_ascii_lowercase().as_str() {
            "" | "local" => Staff::local(name, initials)?,
            "roster" => Staff::roster(
                name,
                initials,
                optional_date(field(rec, 5))?,
                optional_date(field(rec, 6))?,
            )?,
            other => return Err(ValidationError::UnknownRecord(format!("category {other}"))),
        };
        let capacity = field(rec, 3);
        if !capacity.is_empty() {
            let rate: u8 = capacity
                .trim_end_matches('%')
                .parse()
                .map_err(|_| ValidationError::InvalidNumber(capacity.to_owned()))?;
            staff = staff.with_capacity_rate(rate)?;
        }
        let skills = field(rec, 4)
            .split(|c: char| c == ';' || c == '|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<SkillTag>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(staff.with_skills(skills))
    })
}

pub fn import_staff_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<ImportReport<Staff>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_staff(file)
}

/// Export CSV des vacations (déjà triées) avec leurs champs dérivés.
pub fn write_slots_csv<W: Write>(
    out: W,
    slots: &[&DutySlot],
    program_start: NaiveDate,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(out);
    w.write_record([
        "id",
        "pickup_date",
        "pickup_time",
        "release_date",
        "release_time",
        "day_offset",
        "duration",
        "min_staff",
        "max_staff",
        "target_capacity",
        "flights",
        "roles",
    ])?;
    for s in slots {
        let flights: Vec<&str> = s.engaged_flights.iter().map(|f| f.as_str()).collect();
        w.write_record([
            s.id.as_str().to_owned(),
            s.pickup_date.to_string(),
            time_window::format_time(s.pickup_time),
            s.release_date.to_string(),
            time_window::format_time(s.release_time),
            slot_day_offset(s, program_start).to_string(),
            slot_duration(s).hours_minutes(),
            s.min_staff.to_string(),
            s.max_staff.to_string(),
            s.target_capacity.to_string(),
            flights.join(" "),
            role_summary(s).to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_slots_csv<P: AsRef<Path>>(
    path: P,
    slots: &[&DutySlot],
    program_start: NaiveDate,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_slots_csv(file, slots, program_start)
}

/// Export JSON de l'entrée du générateur (jolie mise en forme).
pub fn write_generation_input<W: Write>(out: W, input: &GenerationInput) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(out, input).context("serializing generation input")?;
    Ok(())
}
