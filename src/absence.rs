//! Registre des absences (congés) et des fins de service précédentes (repos).
//!
//! Le registre stocke et restitue ; il n'applique aucune politique d'heures de repos.

use crate::error::ValidationError;
use crate::model::{LeaveId, LeaveRecord, LeaveType, RestLogEntry, RestLogId, StaffId};
use crate::storage::{MemoryRepository, Repository};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Vue figée du registre transmise au générateur.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerSnapshot {
    pub leaves: Vec<LeaveRecord>,
    pub rest_logs: Vec<RestLogEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct AbsenceLedger<L = MemoryRepository<LeaveRecord>, E = MemoryRepository<RestLogEntry>> {
    leaves: L,
    rest_logs: E,
}

impl<L, E> AbsenceLedger<L, E>
where
    L: Repository<LeaveRecord>,
    E: Repository<RestLogEntry>,
{
    pub fn new(leaves: L, rest_logs: E) -> Self {
        Self { leaves, rest_logs }
    }

    pub fn into_parts(self) -> (L, E) {
        (self.leaves, self.rest_logs)
    }

    pub fn leaves(&self) -> &[LeaveRecord] {
        self.leaves.list()
    }

    pub fn rest_logs(&self) -> &[RestLogEntry] {
        self.rest_logs.list()
    }

    /// Un enregistrement par agent couvrant toute la plage (pas un par jour).
    pub fn add_leave(
        &mut self,
        staff_ids: &[StaffId],
        start_date: NaiveDate,
        end_date: NaiveDate,
        leave_type: LeaveType,
    ) -> Result<Vec<LeaveRecord>, ValidationError> {
        if end_date < start_date {
            return Err(ValidationError::DateRange {
                start: start_date,
                end: end_date,
            });
        }
        let mut created = Vec::with_capacity(staff_ids.len());
        for staff in staff_ids {
            let rec = LeaveRecord::new(staff.clone(), start_date, end_date, leave_type)?;
            self.leaves.insert(rec.clone());
            created.push(rec);
        }
        tracing::debug!(count = created.len(), %start_date, %end_date, "leave recorded");
        Ok(created)
    }

    /// Une entrée par agent et par jour calendaire de `[start_date, end_date]`.
    pub fn add_rest_log(
        &mut self,
        staff_ids: &[StaffId],
        start_date: NaiveDate,
        end_date: NaiveDate,
        end_time: NaiveTime,
    ) -> Result<Vec<RestLogEntry>, ValidationError> {
        if end_date < start_date {
            return Err(ValidationError::DateRange {
                start: start_date,
                end: end_date,
            });
        }
        let mut created = Vec::new();
        for staff in staff_ids {
            for date in start_date.iter_days().take_while(|d| *d <= end_date) {
                let entry = RestLogEntry::new(staff.clone(), date, end_time);
                self.rest_logs.insert(entry.clone());
                created.push(entry);
            }
        }
        tracing::debug!(count = created.len(), %start_date, %end_date, "rest log recorded");
        Ok(created)
    }

    pub fn is_on_leave(&self, staff_id: &StaffId, date: NaiveDate) -> bool {
        self.leaves
            .list()
            .iter()
            .any(|l| &l.staff_id == staff_id && l.covers(date))
    }

    pub fn leaves_for(&self, staff_id: &StaffId) -> Vec<&LeaveRecord> {
        self.leaves
            .list()
            .iter()
            .filter(|l| &l.staff_id == staff_id)
            .collect()
    }

    pub fn rest_logs_for(&self, staff_id: &StaffId) -> Vec<&RestLogEntry> {
        let mut out: Vec<&RestLogEntry> = self
            .rest_logs
            .list()
            .iter()
            .filter(|e| &e.staff_id == staff_id)
            .collect();
        out.sort_by_key(|e| (e.date, e.prior_shift_end));
        out
    }

    /// Dernière entrée de repos datée au plus tard `date`.
    pub fn last_rest_log_before(&self, staff_id: &StaffId, date: NaiveDate) -> Option<&RestLogEntry> {
        self.rest_logs
            .list()
            .iter()
            .filter(|e| &e.staff_id == staff_id && e.date <= date)
            .max_by_key(|e| (e.date, e.prior_shift_end))
    }

    /// Instant de fin du dernier service connu, pour les contrôles de repos en aval.
    pub fn rest_until(&self, staff_id: &StaffId, date: NaiveDate) -> Option<NaiveDateTime> {
        self.last_rest_log_before(staff_id, date)
            .map(|e| e.date.and_time(e.prior_shift_end))
    }

    pub fn delete_leave(&mut self, id: &LeaveId) -> Result<LeaveRecord, ValidationError> {
        self.leaves
            .remove(id)
            .ok_or_else(|| ValidationError::UnknownRecord(id.as_str().to_owned()))
    }

    pub fn delete_rest_log(&mut self, id: &RestLogId) -> Result<RestLogEntry, ValidationError> {
        self.rest_logs
            .remove(id)
            .ok_or_else(|| ValidationError::UnknownRecord(id.as_str().to_owned()))
    }

    /// Congés chevauchant `[start, end]` et entrées de repos de la veille du début à la fin.
    pub fn snapshot(&self, start: NaiveDate, end: NaiveDate) -> LedgerSnapshot {
        let from = start.pred_opt().unwrap_or(start);
        LedgerSnapshot {
            leaves: self
                .leaves
                .list()
                .iter()
                .filter(|l| l.start_date <= end && l.end_date >= start)
                .cloned()
                .collect(),
            rest_logs: self
                .rest_logs
                .list()
                .iter()
                .filter(|e| e.date >= from && e.date <= end)
                .cloned()
                .collect(),
        }
    }
}
