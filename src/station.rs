use crate::absence::AbsenceLedger;
use crate::config::EngineConfig;
use crate::duty::DutyRegistry;
use crate::error::ValidationError;
use crate::model::{Dataset, Flight, FlightId};
use crate::personnel::PersonnelDirectory;
use crate::storage::{MemoryRepository, Repository};
use crate::window_filter::ScheduleWindowFilter;

/// Jeu de données opérationnel de l'escale, chaque entité derrière son dépôt.
#[derive(Debug, Clone, Default)]
pub struct Station {
    pub flights: MemoryRepository<Flight>,
    pub directory: PersonnelDirectory,
    pub duties: DutyRegistry,
    pub ledger: AbsenceLedger,
}

impl Station {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_flight(&mut self, flight: Flight) -> FlightId {
        let id = flight.id.clone();
        tracing::debug!(flight = %flight.flight_number, date = %flight.date, "flight added");
        self.flights.insert(flight);
        id
    }

    /// Supprime un vol ; les vacations qui l'engagent gardent la référence.
    pub fn delete_flight(&mut self, id: &FlightId) -> Result<Flight, ValidationError> {
        self.flights
            .remove(id)
            .ok_or_else(|| ValidationError::UnknownRecord(id.as_str().to_owned()))
    }

    pub fn window_filter(&self, config: EngineConfig) -> ScheduleWindowFilter<'_> {
        ScheduleWindowFilter::new(
            self.flights.list(),
            &self.directory,
            &self.duties,
            &self.ledger,
            config,
        )
    }
}

impl From<Dataset> for Station {
    fn from(d: Dataset) -> Self {
        Self {
            flights: MemoryRepository::from_vec(d.flights),
            directory: PersonnelDirectory::new(MemoryRepository::from_vec(d.staff)),
            duties: DutyRegistry::new(MemoryRepository::from_vec(d.slots)),
            ledger: AbsenceLedger::new(
                MemoryRepository::from_vec(d.leaves),
                MemoryRepository::from_vec(d.rest_logs),
            ),
        }
    }
}

impl From<Station> for Dataset {
    fn from(s: Station) -> Self {
        let (leaves, rest_logs) = s.ledger.into_parts();
        Self {
            flights: s.flights.into_vec(),
            staff: s.directory.into_repo().into_vec(),
            slots: s.duties.into_repo().into_vec(),
            leaves: leaves.into_vec(),
            rest_logs: rest_logs.into_vec(),
        }
    }
}
