#![forbid(unsafe_code)]
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Duration, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use groundplan::{
    duty::{self, candidate_flights, role_summary},
    io,
    model::{Dataset, DutySlot, Flight, FlightId, LeaveId, LeaveType, RestLogId, SkillTag, SlotId, Staff, StaffId},
    storage::{DatasetStore, JsonFileStore, Repository},
    time_window::{self, excel_serial_to_date},
    tokens::{resolve_tokens, Resolution},
    EngineConfig, FilterError, Station,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planning d'escale (vols, personnel, vacations, absences)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du jeu de données
    #[arg(long, global = true, default_value = "station.json")]
    dataset: String,

    /// Fichier JSON de configuration du moteur
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter un vol
    AddFlight {
        #[arg(long)]
        number: String,
        #[arg(long)]
        origin: String,
        #[arg(long)]
        destination: String,
        /// YYYY-MM-DD ou numéro de série tableur
        #[arg(long)]
        date: String,
        #[arg(long)]
        arrival: Option<String>,
        #[arg(long)]
        departure: Option<String>,
    },

    /// Importer des vols depuis un CSV
    ImportFlights {
        #[arg(long)]
        csv: String,
    },

    /// Ajouter un agent
    AddStaff {
        #[arg(long)]
        name: String,
        #[arg(long)]
        initials: String,
        /// Agent sous contrat (Roster) plutôt que Local
        #[arg(long)]
        roster: bool,
        #[arg(long)]
        contract_from: Option<String>,
        #[arg(long)]
        contract_to: Option<String>,
        #[arg(long, default_value_t = 100)]
        capacity: u8,
        /// liste "Ramp;LoadControl;..."
        #[arg(long)]
        skills: Option<String>,
    },

    /// Importer du personnel depuis un CSV
    ImportStaff {
        #[arg(long)]
        csv: String,
    },

    /// Créer une vacation
    AddSlot {
        #[arg(long)]
        pickup_date: String,
        #[arg(long)]
        pickup_time: String,
        /// Par défaut : jour de prise, ou lendemain si la fin précède la prise
        #[arg(long)]
        release_date: Option<String>,
        #[arg(long)]
        release_time: String,
        #[arg(long, default_value_t = 1)]
        min_staff: u32,
        #[arg(long, default_value_t = 1)]
        max_staff: u32,
        #[arg(long)]
        target_capacity: Option<u8>,
        /// exigence "Ramp=2", répétable
        #[arg(long = "role")]
        roles: Vec<String>,
    },

    /// Engager / désengager un vol sur une vacation
    Engage {
        #[arg(long)]
        slot_id: String,
        /// Identifiant ou numéro de vol (parmi les vols rattachables)
        #[arg(long)]
        flight: String,
    },

    /// Saisir une absence pour une liste libre d'initiales
    AddLeave {
        #[arg(long)]
        staff: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "day-off")]
        kind: String,
    },

    /// Saisir une fin de service précédent, un enregistrement par jour
    AddRestLog {
        #[arg(long)]
        staff: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        end_time: String,
    },

    /// Résoudre une liste libre d'initiales
    Resolve {
        #[arg(long)]
        text: String,
    },

    /// Lister les vacations triées et optionnellement exporter
    ListSlots {
        /// Début du programme (pour les décalages de jours)
        #[arg(long)]
        start: String,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Supprimer un enregistrement par identifiant (sans cascade)
    Delete {
        #[arg(long, value_enum)]
        kind: RecordKind,
        #[arg(long)]
        id: String,
    },

    /// Calculer l'entrée du générateur pour une période
    Compute {
        #[arg(long)]
        start: String,
        /// Par défaut : début + longueur du programme - 1
        #[arg(long)]
        end: Option<String>,
        /// Fichier JSON de sortie (sinon stdout)
        #[arg(long)]
        out: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RecordKind {
    Flight,
    Staff,
    Slot,
    Leave,
    RestLog,
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    excel_serial_to_date(raw).with_context(|| format!("invalid date: {raw}"))
}

fn parse_opt_date(raw: Option<String>) -> Result<Option<NaiveDate>> {
    raw.as_deref().map(parse_date).transpose()
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    let formatted = time_window::parse_time_input(raw);
    time_window::parse_time(raw)
        .or_else(|_| time_window::parse_time(&formatted))
        .with_context(|| format!("invalid time: {raw}"))
}

fn parse_role(raw: &str) -> Result<(SkillTag, u32)> {
    let (tag, count) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected SKILL=COUNT, got {raw}"))?;
    let tag: SkillTag = tag.parse()?;
    let count: u32 = count.trim().parse().with_context(|| format!("invalid count in {raw}"))?;
    Ok((tag, count))
}

/// Résout la liste libre ; les jetons non reconnus sont remontés sur stderr.
fn resolve_staff(station: &Station, text: &str) -> (Vec<StaffId>, Resolution) {
    let res = resolve_tokens(text, station.directory.list());
    if !res.unmatched.is_empty() {
        eprintln!("Unmatched: {}", res.unmatched_text());
    }
    for adv in &res.ambiguous {
        eprintln!("Warning: {adv}");
    }
    (res.matched.clone(), res)
}

fn initials_of<'a>(station: &'a Station, id: &StaffId) -> &'a str {
    station
        .directory
        .get(id)
        .map(|s| s.initials.as_str())
        .unwrap_or("?")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let store = JsonFileStore::open(&cli.dataset)?;
    let mut station = Station::from(store.load()?);

    let (code, dirty) = match cli.cmd {
        Commands::AddFlight {
            number,
            origin,
            destination,
            date,
            arrival,
            departure,
        } => {
            let arrival = arrival.as_deref().map(parse_time).transpose()?;
            let departure = departure.as_deref().map(parse_time).transpose()?;
            let flight = Flight::new(&number, &origin, &destination, parse_date(&date)?, arrival, departure)?;
            println!("{}", flight.id.as_str());
            station.add_flight(flight);
            (0, true)
        }
        Commands::ImportFlights { csv } => {
            let report = io::import_flights_csv(csv)?;
            for err in &report.errors {
                eprintln!("line {}: {}", err.line, err.message);
            }
            println!("{} flight(s) imported", report.records.len());
            let code = if report.is_clean() { 0 } else { 2 };
            for flight in report.records {
                station.add_flight(flight);
            }
            (code, true)
        }
        Commands::AddStaff {
            name,
            initials,
            roster,
            contract_from,
            contract_to,
            capacity,
            skills,
        } => {
            let staff = if roster {
                Staff::roster(&name, &initials, parse_opt_date(contract_from)?, parse_opt_date(contract_to)?)?
            } else {
                Staff::local(&name, &initials)?
            };
            let skills = skills
                .as_deref()
                .unwrap_or("")
                .split(|c: char| c == ';' || c == ',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<SkillTag>)
                .collect::<Result<Vec<_>, _>>()?;
            let staff = staff.with_capacity_rate(capacity)?.with_skills(skills);
            println!("{}", staff.id.as_str());
            station.directory.add(staff);
            (0, true)
        }
        Commands::ImportStaff { csv } => {
            let report = io::import_staff_csv(csv)?;
            for err in &report.errors {
                eprintln!("line {}: {}", err.line, err.message);
            }
            println!("{} staff imported", report.records.len());
            let code = if report.is_clean() { 0 } else { 2 };
            for staff in report.records {
                station.directory.add(staff);
            }
            (code, true)
        }
        Commands::AddSlot {
            pickup_date,
            pickup_time,
            release_date,
            release_time,
            min_staff,
            max_staff,
            target_capacity,
            roles,
        } => {
            let pickup_date = parse_date(&pickup_date)?;
            let pickup_time = parse_time(&pickup_time)?;
            let release_time = parse_time(&release_time)?;
            let release_date = match release_date {
                Some(raw) => parse_date(&raw)?,
                None if release_time <= pickup_time => pickup_date + Duration::days(1),
                None => pickup_date,
            };
            let mut slot = DutySlot::new(
                pickup_date,
                pickup_time,
                release_date,
                release_time,
                min_staff,
                max_staff,
            )?
            .with_target_capacity(target_capacity.unwrap_or(config.default_target_capacity))?;
            for raw in &roles {
                let (tag, count) = parse_role(raw)?;
                slot = slot.with_role(tag, count);
            }
            let d = duty::slot_duration(&slot);
            if d.is_multi_day() {
                eprintln!(
                    "Warning: slot lasts {} over {} day(s), duration assumes one overnight wrap",
                    d.hours_minutes(),
                    d.day_span
                );
            }
            let id = station.duties.create(slot)?;
            println!("{}", id.as_str());
            (0, true)
        }
        Commands::Engage { slot_id, flight } => {
            let sid = SlotId::new(slot_id);
            let slot = station
                .duties
                .get(&sid)
                .ok_or_else(|| anyhow!("unknown duty slot: {}", sid.as_str()))?;
            let wanted = flight.trim().to_uppercase();
            let candidates = candidate_flights(slot, station.flights.list(), config.flight_link_days);
            let matches: Vec<&Flight> = candidates
                .into_iter()
                .filter(|f| f.id.as_str() == flight || f.flight_number == wanted)
                .collect();
            let fid = match matches.as_slice() {
                [one] => one.id.clone(),
                [] => bail!("no candidate flight matches {flight}"),
                _ => bail!("{} candidate flights match {flight}; use the flight id", matches.len()),
            };
            let engaged = station.duties.toggle_engagement(&sid, &fid)?;
            let others = station.duties.engaged_elsewhere(&sid, &fid);
            println!("{} {}", if engaged { "engaged" } else { "released" }, fid.as_str());
            if engaged && !others.is_empty() {
                eprintln!("Warning: flight handled by another slot ({})", others.len());
            }
            (0, true)
        }
        Commands::AddLeave { staff, from, to, kind } => {
            let (ids, res) = resolve_staff(&station, &staff);
            let kind: LeaveType = kind.parse()?;
            let created = station
                .ledger
                .add_leave(&ids, parse_date(&from)?, parse_date(&to)?, kind)?;
            println!("{} leave record(s) created", created.len());
            (if res.is_complete() { 0 } else { 2 }, true)
        }
        Commands::AddRestLog {
            staff,
            from,
            to,
            end_time,
        } => {
            let (ids, res) = resolve_staff(&station, &staff);
            let created = station.ledger.add_rest_log(
                &ids,
                parse_date(&from)?,
                parse_date(&to)?,
                parse_time(&end_time)?,
            )?;
            println!("{} rest log entr(ies) created", created.len());
            (if res.is_complete() { 0 } else { 2 }, true)
        }
        Commands::Resolve { text } => {
            let (ids, res) = resolve_staff(&station, &text);
            for id in &ids {
                println!("{} {}", initials_of(&station, id), id.as_str());
            }
            (if res.is_complete() { 0 } else { 2 }, false)
        }
        Commands::ListSlots { start, out_csv } => {
            let start = parse_date(&start)?;
            let sorted = station.duties.sorted();
            if let Some(path) = out_csv {
                io::export_slots_csv(path, &sorted, start)?;
            }
            for s in &sorted {
                println!(
                    "{} | D{:+} {} {} → {} {} | {}..{} | {}",
                    s.id.as_str(),
                    duty::slot_day_offset(s, start),
                    s.pickup_date,
                    time_window::format_time(s.pickup_time),
                    s.release_date,
                    time_window::format_time(s.release_time),
                    s.min_staff,
                    s.max_staff,
                    role_summary(s)
                );
            }
            let mut advisories = station.duties.window_advisories(start, config.program_length_days);
            advisories.extend(station.duties.flight_day_advisories(
                station.flights.list(),
                start,
                config.program_length_days,
            ));
            for adv in &advisories {
                eprintln!("Warning: {adv}");
            }
            (0, false)
        }
        Commands::Delete { kind, id } => {
            match kind {
                RecordKind::Flight => {
                    station.delete_flight(&FlightId::new(&id))?;
                }
                RecordKind::Staff => {
                    station.directory.remove(&StaffId::new(&id))?;
                }
                RecordKind::Slot => {
                    station.duties.delete(&SlotId::new(&id))?;
                }
                RecordKind::Leave => {
                    station.ledger.delete_leave(&LeaveId::new(&id))?;
                }
                RecordKind::RestLog => {
                    station.ledger.delete_rest_log(&RestLogId::new(&id))?;
                }
            }
            println!("deleted {id}");
            (0, true)
        }
        Commands::Compute { start, end, out } => {
            let start = parse_date(&start)?;
            let end = match end {
                Some(raw) => parse_date(&raw)?,
                None => start + Duration::days(i64::from(config.program_length_days) - 1),
            };
            match station.window_filter(config).compute(start, end) {
                Ok(input) => {
                    for adv in &input.advisories {
                        eprintln!("Warning: {adv}");
                    }
                    match out {
                        Some(path) => {
                            let file = std::fs::File::create(&path)
                                .with_context(|| format!("creating {path}"))?;
                            io::write_generation_input(file, &input)?;
                        }
                        None => io::write_generation_input(std::io::stdout().lock(), &input)?,
                    }
                    (0, false)
                }
                Err(FilterError::EmptyWindow { start, end }) => {
                    eprintln!("No active duty slot between {start} and {end}: nothing to staff");
                    // Code 2 = WARNING/INCOMPLETE
                    (2, false)
                }
                Err(FilterError::Invalid(errors)) => {
                    for err in &errors {
                        eprintln!("Invalid: {err}");
                    }
                    bail!("{} invalid record(s); generation aborted", errors.len());
                }
                Err(err) => return Err(err.into()),
            }
        }
    };

    if dirty {
        store.save(&Dataset::from(station))?;
    }

    std::process::exit(code);
}
