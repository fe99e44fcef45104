//! Registre des vacations : création, tri, durée et rattachement aux vols.

mod linkage;
mod summary;

pub use linkage::{candidate_flights, flights_outside_window, toggle_engagement};
pub use summary::{role_summary, sort_slots, RoleSummary};

use crate::error::{Advisory, ValidationError};
use crate::model::{DutySlot, Flight, FlightId, SlotId};
use crate::storage::{MemoryRepository, Repository};
use crate::time_window::{self, DutyDuration};
use chrono::NaiveDate;

/// Décalage de jour de la vacation, recalculé à chaque lecture.
pub fn slot_day_offset(slot: &DutySlot, program_start: NaiveDate) -> i64 {
    time_window::day_offset(slot.pickup_date, program_start)
}

pub fn slot_duration(slot: &DutySlot) -> DutyDuration {
    time_window::duration(
        slot.pickup_date.and_time(slot.pickup_time),
        slot.release_date.and_time(slot.release_time),
    )
}

#[derive(Debug, Clone, Default)]
pub struct DutyRegistry<R = MemoryRepository<DutySlot>> {
    repo: R,
}

impl<R: Repository<DutySlot>> DutyRegistry<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn into_repo(self) -> R {
        self.repo
    }

    pub fn list(&self) -> &[DutySlot] {
        self.repo.list()
    }

    pub fn get(&self, id: &SlotId) -> Option<&DutySlot> {
        self.repo.get(id)
    }

    /// Enregistre une vacation validée.
    pub fn create(&mut self, slot: DutySlot) -> Result<SlotId, ValidationError> {
        slot.validate()?;
        let id = slot.id.clone();
        tracing::debug!(slot = %id.as_str(), pickup = %slot.pickup_date, "duty slot created");
        self.repo.insert(slot);
        Ok(id)
    }

    pub fn update(&mut self, slot: DutySlot) -> Result<(), ValidationError> {
        slot.validate()?;
        self.repo.update(slot)
    }

    /// Suppression par identifiant, sans effet sur les autres enregistrements.
    pub fn delete(&mut self, id: &SlotId) -> Result<DutySlot, ValidationError> {
        let removed = self
            .repo
            .remove(id)
            .ok_or_else(|| ValidationError::UnknownSlot(id.as_str().to_owned()))?;
        tracing::debug!(slot = %id.as_str(), "duty slot deleted");
        Ok(removed)
    }

    /// Durée d'une vacation enregistrée.
    pub fn duration(&self, id: &SlotId) -> Result<DutyDuration, ValidationError> {
        self.repo
            .get(id)
            .map(slot_duration)
            .ok_or_else(|| ValidationError::UnknownSlot(id.as_str().to_owned()))
    }

    /// Vacations triées par date puis heure de prise.
    pub fn sorted(&self) -> Vec<&DutySlot> {
        let mut out: Vec<&DutySlot> = self.repo.list().iter().collect();
        sort_slots(&mut out);
        out
    }

    /// Bascule l'engagement d'un vol ; renvoie `true` si le vol est désormais engagé.
    pub fn toggle_engagement(
        &mut self,
        slot_id: &SlotId,
        flight_id: &FlightId,
    ) -> Result<bool, ValidationError> {
        let slot = self
            .repo
            .get_mut(slot_id)
            .ok_or_else(|| ValidationError::UnknownSlot(slot_id.as_str().to_owned()))?;
        let engaged = toggle_engagement(slot, flight_id);
        tracing::debug!(slot = %slot_id.as_str(), flight = %flight_id.as_str(), engaged, "engagement toggled");
        Ok(engaged)
    }

    /// Autres vacations engageant déjà ce vol (avertissement, jamais bloquant).
    pub fn engaged_elsewhere(&self, slot_id: &SlotId, flight_id: &FlightId) -> Vec<SlotId> {
        linkage::engaged_elsewhere(self.repo.list(), slot_id, flight_id)
    }

    /// Vols engagés existants ; les références pendantes sont ignorées.
    pub fn engaged_flights<'f>(&self, slot: &DutySlot, flights: &'f [Flight]) -> Vec<&'f Flight> {
        flights
            .iter()
            .filter(|f| slot.engaged_flights.contains(&f.id))
            .collect()
    }

    /// Avertissements d'engagement : vols partagés et références pendantes.
    pub fn engagement_advisories(&self, flights: &[Flight]) -> Vec<Advisory> {
        let mut out = linkage::dangling_references(self.repo.list(), flights);
        out.extend(linkage::shared_engagements(self.repo.list()));
        out
    }

    /// Vacations de plus de 24 h.
    pub fn duration_advisories(&self) -> Vec<Advisory> {
        self.repo
            .list()
            .iter()
            .filter_map(|slot| {
                let d = slot_duration(slot);
                d.is_multi_day().then(|| Advisory::MultiDayDuration {
                    slot: slot.id.clone(),
                    days: d.day_span,
                    minutes: d.minutes,
                })
            })
            .collect()
    }
}

impl<R: Repository<DutySlot>> DutyRegistry<R> {
    /// Vacations dont la prise tombe hors du programme glissant.
    pub fn window_advisories(&self, program_start: NaiveDate, program_length_days: u32) -> Vec<Advisory> {
        self.repo
            .list()
            .iter()
            .filter_map(|slot| {
                let offset = slot_day_offset(slot, program_start);
                (!time_window::in_program(offset, program_length_days)).then(|| {
                    Advisory::SlotOutsideWindow {
                        slot: slot.id.clone(),
                        day_offset: offset,
                    }
                })
            })
            .collect()
    }

    /// Vols engagés dont la date tombe hors du programme glissant.
    pub fn flight_day_advisories(
        &self,
        flights: &[Flight],
        program_start: NaiveDate,
        program_length_days: u32,
    ) -> Vec<Advisory> {
        flights_outside_window(
            self.repo.list(),
            flights,
            program_start,
            i64::from(program_length_days),
        )
    }
}
