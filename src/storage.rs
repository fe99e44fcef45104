use crate::error::ValidationError;
use crate::model::{
    Dataset, DutySlot, Flight, FlightId, LeaveId, LeaveRecord, RestLogEntry, RestLogId, SlotId,
    Staff, StaffId,
};
use anyhow::Context;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Enregistrement adressable par identifiant.
pub trait Record: Clone {
    type Id: Clone + PartialEq + std::fmt::Debug;
    fn id(&self) -> &Self::Id;
    fn id_str(&self) -> &str;
}

macro_rules! record {
    ($ty:ty, $id:ty) => {
        impl Record for $ty {
            type Id = $id;
            fn id(&self) -> &$id {
                &self.id
            }
            fn id_str(&self) -> &str {
                self.id.as_str()
            }
        }
    };
}

record!(Flight, FlightId);
record!(Staff, StaffId);
record!(DutySlot, SlotId);
record!(LeaveRecord, LeaveId);
record!(RestLogEntry, RestLogId);

/// Interface CRUD par type d'entité ; le moteur n'en connaît pas le support.
pub trait Repository<T: Record> {
    /// Tous les enregistrements, dans l'ordre d'insertion.
    fn list(&self) -> &[T];
    fn get(&self, id: &T::Id) -> Option<&T>;
    fn get_mut(&mut self, id: &T::Id) -> Option<&mut T>;
    fn insert(&mut self, record: T);
    /// Remplace l'enregistrement de même identifiant.
    fn update(&mut self, record: T) -> Result<(), ValidationError>;
    fn remove(&mut self, id: &T::Id) -> Option<T>;
}

/// Dépôt en mémoire adossé à un `Vec`.
#[derive(Debug, Clone)]
pub struct MemoryRepository<T> {
    items: Vec<T>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> MemoryRepository<T> {
    pub fn from_vec(items: Vec<T>) -> Self {
        Self { items }
    }
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn list(&self) -> &[T] {
        &self.items
    }

    fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|r| r.id() == id)
    }

    fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.items.iter_mut().find(|r| r.id() == id)
    }

    fn insert(&mut self, record: T) {
        self.items.push(record);
    }

    fn update(&mut self, record: T) -> Result<(), ValidationError> {
        let slot = self
            .items
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| ValidationError::UnknownRecord(record.id_str().to_owned()))?;
        *slot = record;
        Ok(())
    }

    fn remove(&mut self, id: &T::Id) -> Option<T> {
        let pos = self.items.iter().position(|r| r.id() == id)?;
        Some(self.items.remove(pos))
    }
}

pub trait DatasetStore {
    /// Charge le jeu de données depuis un support.
    fn load(&self) -> anyhow::Result<Dataset>;
    /// Sauvegarde de manière atomique.
    fn save(&self, dataset: &Dataset) -> anyhow::Result<()>;
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetStore for JsonFileStore {
    fn load(&self) -> anyhow::Result<Dataset> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Dataset::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        let dataset: Dataset = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(dataset)
    }

    fn save(&self, dataset: &Dataset) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(dataset)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        tracing::debug!(path = %self.path.display(), "dataset saved");
        Ok(())
    }
}
