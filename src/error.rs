use crate::model::{FlightId, SlotId, StaffId};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Entrée mal formée, rejetée à la frontière et jamais stockée.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("min staff {min} exceeds max staff {max}")]
    StaffBounds { min: u32, max: u32 },
    #[error("invalid date range: {end} is before {start}")]
    DateRange { start: NaiveDate, end: NaiveDate },
    #[error("release is before pickup")]
    ReleaseBeforePickup,
    #[error("invalid time: {0}")]
    InvalidTime(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("not a number: {0}")]
    InvalidNumber(String),
    #[error("capacity rate must be 50..=100 by steps of 5, got {0}")]
    CapacityRate(u8),
    #[error("target capacity must be 0..=100, got {0}")]
    TargetCapacity(u8),
    #[error("roster staff {staff} has no complete contract window")]
    MissingContract { staff: String },
    #[error("{0} is local staff; contract windows apply to roster staff only")]
    NotRoster(String),
    #[error("unknown skill: {0}")]
    UnknownSkill(String),
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
    #[error("unknown staff: {0}")]
    UnknownStaff(String),
    #[error("unknown duty slot: {0}")]
    UnknownSlot(String),
    #[error("unknown record: {0}")]
    UnknownRecord(String),
}

/// Avertissement non bloquant remonté à l'appelant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Advisory {
    /// Vol dont le décalage de jour sort de la fenêtre du programme.
    FlightOutsideWindow { flight: FlightId, day_offset: i64 },
    /// Vacation dont la date de prise sort de la fenêtre du programme.
    SlotOutsideWindow { slot: SlotId, day_offset: i64 },
    /// Vol déjà engagé par une autre vacation ("handled by another slot").
    FlightEngagedElsewhere { flight: FlightId, slot: SlotId, others: Vec<SlotId> },
    /// Référence vers un vol supprimé.
    DanglingFlight { slot: SlotId, flight: FlightId },
    /// Vacation couvrant plus d'un jour : la durée n'applique qu'un seul repli.
    MultiDayDuration { slot: SlotId, days: i64, minutes: i64 },
    /// Personnel Roster sans bornes de contrat, retenu par tolérance.
    IncompleteContract { staff: StaffId },
    /// Jeton libre correspondant à plusieurs initiales.
    AmbiguousInitials { token: String, candidates: Vec<StaffId> },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::FlightOutsideWindow { flight, day_offset } => write!(
                f,
                "flight {} is outside the program window (day offset {day_offset})",
                flight.as_str()
            ),
            Advisory::SlotOutsideWindow { slot, day_offset } => write!(
                f,
                "duty slot {} is outside the program window (day offset {day_offset})",
                slot.as_str()
            ),
            Advisory::FlightEngagedElsewhere { flight, slot, others } => write!(
                f,
                "flight {} engaged by slot {} is handled by {} other slot(s)",
                flight.as_str(),
                slot.as_str(),
                others.len()
            ),
            Advisory::DanglingFlight { slot, flight } => write!(
                f,
                "duty slot {} references missing flight {}",
                slot.as_str(),
                flight.as_str()
            ),
            Advisory::MultiDayDuration { slot, days, minutes } => write!(
                f,
                "duty slot {} lasts {minutes} min over {days} day(s); duration assumes a single overnight wrap",
                slot.as_str()
            ),
            Advisory::IncompleteContract { staff } => write!(
                f,
                "roster staff {} has an incomplete contract window",
                staff.as_str()
            ),
            Advisory::AmbiguousInitials { token, candidates } => write!(
                f,
                "token {token} matches {} staff members",
                candidates.len()
            ),
        }
    }
}

/// Échec de calcul de la fenêtre de programme.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("no active duty slot between {start} and {end}")]
    EmptyWindow { start: NaiveDate, end: NaiveDate },
    #[error("{} invalid record(s) for generation", .0.len())]
    Invalid(Vec<ValidationError>),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
