use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Réglages du moteur (fichier JSON optionnel, sinon valeurs par défaut).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longueur du programme glissant, en jours.
    pub program_length_days: u32,
    /// Écart maximal en jours entre un vol et la prise de service.
    pub flight_link_days: u32,
    /// Rejette le personnel Roster sans contrat complet au lieu de le retenir.
    pub strict_contracts: bool,
    pub default_target_capacity: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program_length_days: 7,
            flight_link_days: 1,
            strict_contracts: false,
            default_target_capacity: 100,
        }
    }
}

impl EngineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
        let cfg: EngineConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.program_length_days == 0 {
            bail!("program_length_days must be > 0");
        }
        if self.default_target_capacity > 100 {
            bail!("default_target_capacity must be <= 100");
        }
        Ok(())
    }
}
