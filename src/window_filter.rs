//! Filtrage d'une période de programme : produit l'entrée complète du générateur
//! externe (vols, personnel éligible, vacations actives, absences).

use crate::absence::{AbsenceLedger, LedgerSnapshot};
use crate::config::EngineConfig;
use crate::duty::{self, DutyRegistry};
use crate::error::{Advisory, FilterError, ValidationError};
use crate::model::{DutySlot, Flight, LeaveRecord, RestLogEntry, SlotId, Staff};
use crate::personnel::PersonnelDirectory;
use crate::storage::{MemoryRepository, Repository};
use crate::time_window;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;

/// Vacation active, accompagnée de ses champs dérivés.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveShift {
    #[serde(flatten)]
    pub slot: DutySlot,
    pub day_offset: i64,
    pub duration_minutes: i64,
    pub roles: String,
}

/// Contrat d'entrée du générateur de programme.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationInput {
    pub program_start: NaiveDate,
    pub program_end: NaiveDate,
    pub flights: Vec<Flight>,
    pub eligible_staff: Vec<Staff>,
    pub active_shifts: Vec<ActiveShift>,
    pub absences: LedgerSnapshot,
    pub advisories: Vec<Advisory>,
}

impl GenerationInput {
    pub fn shift_ids(&self) -> Vec<&SlotId> {
        self.active_shifts.iter().map(|s| &s.slot.id).collect()
    }
}

pub struct ScheduleWindowFilter<
    'a,
    S = MemoryRepository<Staff>,
    D = MemoryRepository<DutySlot>,
    L = MemoryRepository<LeaveRecord>,
    E = MemoryRepository<RestLogEntry>,
> {
    flights: &'a [Flight],
    directory: &'a PersonnelDirectory<S>,
    duties: &'a DutyRegistry<D>,
    ledger: &'a AbsenceLedger<L, E>,
    config: EngineConfig,
}

impl<'a, S, D, L, E> ScheduleWindowFilter<'a, S, D, L, E>
where
    S: Repository<Staff>,
    D: Repository<DutySlot>,
    L: Repository<LeaveRecord>,
    E: Repository<RestLogEntry>,
{
    pub fn new(
        flights: &'a [Flight],
        directory: &'a PersonnelDirectory<S>,
        duties: &'a DutyRegistry<D>,
        ledger: &'a AbsenceLedger<L, E>,
        config: EngineConfig,
    ) -> Self {
        Self {
            flights,
            directory,
            duties,
            ledger,
            config,
        }
    }

    /// Vacations dont la date de prise est dans `[start, end]`, triées.
    pub fn active_shifts(&self, start: NaiveDate, end: NaiveDate) -> Vec<&'a DutySlot> {
        let mut out: Vec<&'a DutySlot> = self
            .duties
            .list()
            .iter()
            .filter(|s| s.pickup_date >= start && s.pickup_date <= end)
            .collect();
        duty::sort_slots(&mut out);
        out
    }

    pub fn eligible_staff(&self, start: NaiveDate, end: NaiveDate) -> Vec<&'a Staff> {
        self.directory.eligible_staff(start, end)
    }

    /// Calcule l'entrée du générateur pour `[start, end]`.
    ///
    /// Échoue avec `EmptyWindow` s'il n'y a aucune vacation à pourvoir, et avec
    /// `Invalid` (toutes les erreurs regroupées) si des enregistrements sont inutilisables.
    pub fn compute(&self, start: NaiveDate, end: NaiveDate) -> Result<GenerationInput, FilterError> {
        if end < start {
            return Err(ValidationError::DateRange { start, end }.into());
        }

        let active = self.active_shifts(start, end);
        if active.is_empty() {
            tracing::warn!(%start, %end, "no active duty slot in program window");
            return Err(FilterError::EmptyWindow { start, end });
        }

        let mut errors: Vec<ValidationError> =
            active.iter().filter_map(|s| s.validate().err()).collect();
        if self.config.strict_contracts {
            errors.extend(self.directory.validate_for_generation());
        }
        if !errors.is_empty() {
            return Err(FilterError::Invalid(errors));
        }

        let eligible = self.eligible_staff(start, end);
        let flights = self.window_flights(&active, start, end);
        let advisories = self.advisories(&active, start, end);
        for adv in &advisories {
            tracing::warn!(advisory = %adv, "program advisory");
        }

        let active_shifts: Vec<ActiveShift> = active
            .iter()
            .map(|slot| ActiveShift {
                day_offset: duty::slot_day_offset(slot, start),
                duration_minutes: duty::slot_duration(slot).minutes,
                roles: duty::role_summary(slot).to_string(),
                slot: (*slot).clone(),
            })
            .collect();

        tracing::info!(
            %start,
            %end,
            shifts = active_shifts.len(),
            staff = eligible.len(),
            flights = flights.len(),
            "program window computed"
        );

        Ok(GenerationInput {
            program_start: start,
            program_end: end,
            flights,
            eligible_staff: eligible.into_iter().cloned().collect(),
            active_shifts,
            absences: self.ledger.snapshot(start, end),
            advisories,
        })
    }

    /// Vols rattachables aux vacations actives, plus ceux déjà engagés.
    fn window_flights(&self, active: &[&DutySlot], start: NaiveDate, end: NaiveDate) -> Vec<Flight> {
        let margin = Duration::days(i64::from(self.config.flight_link_days));
        let (lo, hi) = (start - margin, end + margin);
        let engaged: HashSet<_> = active.iter().flat_map(|s| s.engaged_flights.iter()).collect();
        self.flights
            .iter()
            .filter(|f| (f.date >= lo && f.date <= hi) || engaged.contains(&f.id))
            .cloned()
            .collect()
    }

    fn advisories(&self, active: &[&DutySlot], start: NaiveDate, end: NaiveDate) -> Vec<Advisory> {
        let ids: HashSet<&SlotId> = active.iter().map(|s| &s.id).collect();
        let window_days = time_window::day_offset(end, start) + 1;
        let mut out = duty::flights_outside_window(active.iter().copied(), self.flights, start, window_days);

        let related = |adv: &Advisory| match adv {
            Advisory::DanglingFlight { slot, .. }
            | Advisory::FlightEngagedElsewhere { slot, .. }
            | Advisory::MultiDayDuration { slot, .. } => ids.contains(slot),
            _ => false,
        };
        out.extend(
            self.duties
                .engagement_advisories(self.flights)
                .into_iter()
                .filter(|a| related(a)),
        );
        out.extend(
            self.duties
                .duration_advisories()
                .into_iter()
                .filter(|a| related(a)),
        );
        if !self.config.strict_contracts {
            out.extend(
                self.directory
                    .contract_advisories()
                    .into_iter()
                    .filter(|a| match a {
                        Advisory::IncompleteContract { staff } => self
                            .directory
                            .get(staff)
                            .is_some_and(|s| crate::personnel::eligibility(s, start, end)),
                        _ => false,
                    }),
            );
        }
        out
    }
}
