#![forbid(unsafe_code)]
//! Groundplan : moteur temporel et d'éligibilité pour le planning d'une escale.
//!
//! - Décalages de jours relatifs au programme glissant, durées avec passage de minuit.
//! - Éligibilité du personnel (Local / Roster) sur une période.
//! - Résolution des listes libres d'initiales.
//! - Vacations, rattachement aux vols, absences et repos.
//! - Calcul de l'entrée du générateur de programme (externe).

pub mod absence;
pub mod config;
pub mod duty;
pub mod error;
pub mod io;
pub mod model;
pub mod personnel;
pub mod station;
pub mod storage;
pub mod time_window;
pub mod tokens;
pub mod window_filter;

pub use absence::{AbsenceLedger, LedgerSnapshot};
pub use config::EngineConfig;
pub use duty::{candidate_flights, role_summary, DutyRegistry, RoleSummary};
pub use error::{Advisory, FilterError, ValidationError};
pub use model::{
    Dataset, DutySlot, Flight, FlightId, FlightKind, LeaveId, LeaveRecord, LeaveType,
    RestLogEntry, RestLogId, SkillTag, SlotId, Staff, StaffCategory, StaffId,
};
pub use personnel::{eligibility, PersonnelDirectory};
pub use station::Station;
pub use storage::{DatasetStore, JsonFileStore, MemoryRepository, Record, Repository};
pub use time_window::{day_offset, duration, excel_serial_to_date, parse_time_input, DutyDuration};
pub use tokens::{ambiguous_tokens, resolve_candidates, resolve_tokens, Resolution, StreamingResolver};
pub use window_filter::{ActiveShift, GenerationInput, ScheduleWindowFilter};
