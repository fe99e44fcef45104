use crate::model::{DutySlot, SkillTag};
use std::fmt;

/// Résumé des compétences requises par une vacation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSummary {
    /// Aucune exigence de spécialiste : vacation "duty only".
    DutyOnly,
    Roles(Vec<(SkillTag, u32)>),
}

impl fmt::Display for RoleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleSummary::DutyOnly => f.write_str("duty-only"),
            RoleSummary::Roles(roles) => {
                let parts: Vec<String> = roles
                    .iter()
                    .map(|(tag, count)| format!("{count}x {tag}"))
                    .collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

/// Seules les compétences avec un effectif > 0 apparaissent.
pub fn role_summary(slot: &DutySlot) -> RoleSummary {
    let roles: Vec<(SkillTag, u32)> = slot
        .role_requirements
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(tag, count)| (*tag, *count))
        .collect();
    if roles.is_empty() {
        RoleSummary::DutyOnly
    } else {
        RoleSummary::Roles(roles)
    }
}

pub fn sort_slots(slots: &mut [&DutySlot]) {
    slots.sort_by_key(|s| (s.pickup_date, s.pickup_time));
}
