//! Annuaire du personnel et éligibilité sur une période de programme.

use crate::error::{Advisory, ValidationError};
use crate::model::{Staff, StaffCategory, StaffId};
use crate::storage::{MemoryRepository, Repository};
use chrono::NaiveDate;

/// Éligibilité d'un agent pour la période `[period_start, period_end]`.
///
/// Local : toujours éligible. Roster : la fenêtre de contrat doit chevaucher
/// la période ; une borne manquante rend l'agent éligible (brouillon de programme).
pub fn eligibility(staff: &Staff, period_start: NaiveDate, period_end: NaiveDate) -> bool {
    match staff.category {
        StaffCategory::Local => true,
        StaffCategory::Roster {
            contract_from: Some(from),
            contract_to: Some(to),
        } => from <= period_end && to >= period_start,
        StaffCategory::Roster { .. } => true,
    }
}

#[derive(Debug, Clone, Default)]
pub struct PersonnelDirectory<R = MemoryRepository<Staff>> {
    repo: R,
}

impl<R: Repository<Staff>> PersonnelDirectory<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn into_repo(self) -> R {
        self.repo
    }

    /// Ordre d'itération de l'annuaire (ordre d'insertion).
    pub fn list(&self) -> &[Staff] {
        self.repo.list()
    }

    pub fn get(&self, id: &StaffId) -> Option<&Staff> {
        self.repo.get(id)
    }

    pub fn add(&mut self, staff: Staff) -> StaffId {
        let id = staff.id.clone();
        tracing::debug!(staff = %id.as_str(), initials = %staff.initials, "staff added");
        self.repo.insert(staff);
        id
    }

    pub fn update(&mut self, staff: Staff) -> Result<(), ValidationError> {
        self.repo.update(staff)
    }

    pub fn remove(&mut self, id: &StaffId) -> Result<Staff, ValidationError> {
        self.repo
            .remove(id)
            .ok_or_else(|| ValidationError::UnknownStaff(id.as_str().to_owned()))
    }

    /// Passe un agent en Local (contrat effacé) ou en Roster (bornes à compléter).
    pub fn set_category(&mut self, id: &StaffId, roster: bool) -> Result<(), ValidationError> {
        let staff = self
            .repo
            .get_mut(id)
            .ok_or_else(|| ValidationError::UnknownStaff(id.as_str().to_owned()))?;
        staff.set_category(roster);
        tracing::debug!(staff = %id.as_str(), roster, "category changed");
        Ok(())
    }

    pub fn find_by_initials(&self, initials: &str) -> Option<&Staff> {
        let key = initials.trim().to_uppercase();
        self.repo
            .list()
            .iter()
            .find(|s| s.initials.to_uppercase() == key)
    }

    pub fn eligible_staff(&self, period_start: NaiveDate, period_end: NaiveDate) -> Vec<&Staff> {
        self.repo
            .list()
            .iter()
            .filter(|s| eligibility(s, period_start, period_end))
            .collect()
    }

    /// Agents Roster dont la fenêtre de contrat est incomplète.
    pub fn missing_contracts(&self) -> Vec<&Staff> {
        self.repo
            .list()
            .iter()
            .filter(|s| s.category.is_roster() && s.category.contract_window().is_none())
            .collect()
    }

    /// Contrôle avant génération : un agent Roster doit avoir ses deux bornes.
    pub fn validate_for_generation(&self) -> Vec<ValidationError> {
        self.missing_contracts()
            .into_iter()
            .map(|s| ValidationError::MissingContract {
                staff: s.initials.clone(),
            })
            .collect()
    }

    pub fn contract_advisories(&self) -> Vec<Advisory> {
        self.missing_contracts()
            .into_iter()
            .map(|s| Advisory::IncompleteContract {
                staff: s.id.clone(),
            })
            .collect()
    }
}
