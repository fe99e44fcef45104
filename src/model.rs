use crate::error::ValidationError;
use crate::time_window::hhmm;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! strong_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

strong_id!(
    /// Identifiant fort pour Flight
    FlightId
);
strong_id!(
    /// Identifiant fort pour Staff
    StaffId
);
strong_id!(
    /// Identifiant fort pour DutySlot
    SlotId
);
strong_id!(
    /// Identifiant fort pour LeaveRecord
    LeaveId
);
strong_id!(
    /// Identifiant fort pour RestLogEntry
    RestLogId
);

/// Nature d'un vol, dérivée des horaires renseignés.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightKind {
    Arrival,
    Departure,
    Turnaround,
}

/// Vol traité par l'escale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub id: FlightId,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    #[serde(default, with = "hhmm::option", skip_serializing_if = "Option::is_none")]
    pub scheduled_arrival: Option<NaiveTime>,
    #[serde(default, with = "hhmm::option", skip_serializing_if = "Option::is_none")]
    pub scheduled_departure: Option<NaiveTime>,
    pub date: NaiveDate,
}

impl Flight {
    /// Crée un vol ; numéro, origine et destination sont stockés en majuscules.
    pub fn new(
        flight_number: &str,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        scheduled_arrival: Option<NaiveTime>,
        scheduled_departure: Option<NaiveTime>,
    ) -> Result<Self, ValidationError> {
        let flight_number = flight_number.trim().to_uppercase();
        if flight_number.is_empty() {
            return Err(ValidationError::EmptyField("flight number"));
        }
        Ok(Self {
            id: FlightId::random(),
            flight_number,
            origin: origin.trim().to_uppercase(),
            destination: destination.trim().to_uppercase(),
            scheduled_arrival,
            scheduled_departure,
            date,
        })
    }

    pub fn kind(&self) -> FlightKind {
        match (self.scheduled_arrival, self.scheduled_departure) {
            (Some(_), None) => FlightKind::Arrival,
            (None, Some(_)) => FlightKind::Departure,
            _ => FlightKind::Turnaround,
        }
    }
}

/// Compétence métier d'un agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillTag {
    ShiftLeader,
    Operations,
    Ramp,
    LoadControl,
    LostAndFound,
    GateCheckIn,
}

impl SkillTag {
    pub fn label(self) -> &'static str {
        match self {
            SkillTag::ShiftLeader => "Shift leader",
            SkillTag::Operations => "Operations",
            SkillTag::Ramp => "Ramp",
            SkillTag::LoadControl => "Load control",
            SkillTag::LostAndFound => "Lost & found",
            SkillTag::GateCheckIn => "Gate/check-in",
        }
    }
}

impl fmt::Display for SkillTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SkillTag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "shiftleader" | "sl" | "leader" => Ok(SkillTag::ShiftLeader),
            "operations" | "ops" | "op" => Ok(SkillTag::Operations),
            "ramp" | "rmp" => Ok(SkillTag::Ramp),
            "loadcontrol" | "lc" | "load" => Ok(SkillTag::LoadControl),
            "lostandfound" | "lostfound" | "lnf" | "lf" => Ok(SkillTag::LostAndFound),
            "gatecheckin" | "gate" | "checkin" | "gc" => Ok(SkillTag::GateCheckIn),
            _ => Err(ValidationError::UnknownSkill(s.trim().to_owned())),
        }
    }
}

/// Catégorie du personnel. Seul le personnel Roster porte une fenêtre de contrat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum StaffCategory {
    Local,
    Roster {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        contract_from: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        contract_to: Option<NaiveDate>,
    },
}

impl StaffCategory {
    pub fn is_roster(&self) -> bool {
        matches!(self, StaffCategory::Roster { .. })
    }

    /// Fenêtre complète `(from, to)`, ou `None` pour Local ou contrat incomplet.
    pub fn contract_window(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            StaffCategory::Roster {
                contract_from: Some(from),
                contract_to: Some(to),
            } => Some((*from, *to)),
            _ => None,
        }
    }
}

/// Agent de l'escale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub initials: String,
    #[serde(flatten)]
    pub category: StaffCategory,
    pub capacity_rate: u8,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub skills: BTreeSet<SkillTag>,
}

impl Staff {
    pub fn local(name: &str, initials: &str) -> Result<Self, ValidationError> {
        Self::build(name, initials, StaffCategory::Local)
    }

    /// Crée un agent Roster ; les bornes peuvent manquer à la création.
    pub fn roster(
        name: &str,
        initials: &str,
        contract_from: Option<NaiveDate>,
        contract_to: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        if let (Some(start), Some(end)) = (contract_from, contract_to) {
            if end < start {
                return Err(ValidationError::DateRange { start, end });
            }
        }
        Self::build(
            name,
            initials,
            StaffCategory::Roster {
                contract_from,
                contract_to,
            },
        )
    }

    fn build(name: &str, initials: &str, category: StaffCategory) -> Result<Self, ValidationError> {
        let name = name.trim();
        let initials = initials.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if initials.is_empty() {
            return Err(ValidationError::EmptyField("initials"));
        }
        Ok(Self {
            id: StaffId::random(),
            name: name.to_owned(),
            initials: initials.to_owned(),
            category,
            capacity_rate: 100,
            skills: BTreeSet::new(),
        })
    }

    pub fn with_capacity_rate(mut self, rate: u8) -> Result<Self, ValidationError> {
        if !(50..=100).contains(&rate) || rate % 5 != 0 {
            return Err(ValidationError::CapacityRate(rate));
        }
        self.capacity_rate = rate;
        Ok(self)
    }

    pub fn with_skills<I: IntoIterator<Item = SkillTag>>(mut self, skills: I) -> Self {
        self.skills.extend(skills);
        self
    }

    /// Change de catégorie. Roster → Local efface le contrat ;
    /// Local → Roster laisse les bornes vides, à compléter avant génération.
    pub fn set_category(&mut self, roster: bool) {
        if roster {
            self.set_category_roster();
        } else {
            self.set_category_local();
        }
    }

    pub fn set_category_roster(&mut self) {
        if !self.category.is_roster() {
            self.category = StaffCategory::Roster {
                contract_from: None,
                contract_to: None,
            };
        }
    }

    pub fn set_category_local(&mut self) {
        self.category = StaffCategory::Local;
    }

    /// Renseigne la fenêtre de contrat d'un agent Roster.
    pub fn set_contract(&mut self, from: NaiveDate, to: NaiveDate) -> Result<(), ValidationError> {
        if to < from {
            return Err(ValidationError::DateRange { start: from, end: to });
        }
        match &mut self.category {
            StaffCategory::Roster {
                contract_from,
                contract_to,
            } => {
                *contract_from = Some(from);
                *contract_to = Some(to);
                Ok(())
            }
            StaffCategory::Local => Err(ValidationError::NotRoster(self.initials.clone())),
        }
    }
}

/// Vacation (créneau de service au sol).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutySlot {
    pub id: SlotId,
    pub pickup_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub pickup_time: NaiveTime,
    pub release_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub release_time: NaiveTime,
    pub min_staff: u32,
    pub max_staff: u32,
    pub target_capacity: u8,
    #[serde(default)]
    pub engaged_flights: BTreeSet<FlightId>,
    #[serde(default)]
    pub role_requirements: BTreeMap<SkillTag, u32>,
}

impl DutySlot {
    /// Crée une vacation en validant `min_staff <= max_staff` et la date de fin.
    pub fn new(
        pickup_date: NaiveDate,
        pickup_time: NaiveTime,
        release_date: NaiveDate,
        release_time: NaiveTime,
        min_staff: u32,
        max_staff: u32,
    ) -> Result<Self, ValidationError> {
        let slot = Self {
            id: SlotId::random(),
            pickup_date,
            pickup_time,
            release_date,
            release_time,
            min_staff,
            max_staff,
            target_capacity: 100,
            engaged_flights: BTreeSet::new(),
            role_requirements: BTreeMap::new(),
        };
        slot.validate()?;
        Ok(slot)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_staff > self.max_staff {
            return Err(ValidationError::StaffBounds {
                min: self.min_staff,
                max: self.max_staff,
            });
        }
        if self.release_date < self.pickup_date {
            return Err(ValidationError::ReleaseBeforePickup);
        }
        if self.target_capacity > 100 {
            return Err(ValidationError::TargetCapacity(self.target_capacity));
        }
        Ok(())
    }

    pub fn with_target_capacity(mut self, percent: u8) -> Result<Self, ValidationError> {
        if percent > 100 {
            return Err(ValidationError::TargetCapacity(percent));
        }
        self.target_capacity = percent;
        Ok(self)
    }

    pub fn with_role(mut self, skill: SkillTag, count: u32) -> Self {
        self.role_requirements.insert(skill, count);
        self
    }
}

/// Type d'absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveType {
    DayOff,
    AnnualLeave,
    SickLeave,
    RosterLeave,
}

impl FromStr for LeaveType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "dayoff" | "off" => Ok(LeaveType::DayOff),
            "annualleave" | "annual" | "al" => Ok(LeaveType::AnnualLeave),
            "sickleave" | "sick" | "sl" => Ok(LeaveType::SickLeave),
            "rosterleave" | "roster" | "rl" => Ok(LeaveType::RosterLeave),
            _ => Err(ValidationError::UnknownRecord(format!("leave type {s}"))),
        }
    }
}

/// Absence d'un agent sur une plage de dates inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRecord {
    pub id: LeaveId,
    pub staff_id: StaffId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
}

impl LeaveRecord {
    pub fn new(
        staff_id: StaffId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        leave_type: LeaveType,
    ) -> Result<Self, ValidationError> {
        if end_date < start_date {
            return Err(ValidationError::DateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            id: LeaveId::random(),
            staff_id,
            start_date,
            end_date,
            leave_type,
        })
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Fin de service précédent ("incoming duty") d'un agent à une date donnée.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestLogEntry {
    pub id: RestLogId,
    pub staff_id: StaffId,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub prior_shift_end: NaiveTime,
}

impl RestLogEntry {
    pub fn new(staff_id: StaffId, date: NaiveDate, prior_shift_end: NaiveTime) -> Self {
        Self {
            id: RestLogId::random(),
            staff_id,
            date,
            prior_shift_end,
        }
    }
}

/// Jeu de données opérationnel complet de l'escale (forme persistée).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Dataset {
    #[serde(default)]
    pub flights: Vec<Flight>,
    #[serde(default)]
    pub staff: Vec<Staff>,
    #[serde(default)]
    pub slots: Vec<DutySlot>,
    #[serde(default)]
    pub leaves: Vec<LeaveRecord>,
    #[serde(default)]
    pub rest_logs: Vec<RestLogEntry>,
}
