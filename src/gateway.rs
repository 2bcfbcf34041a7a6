//! Persistence gateway over the local SQLite store and the optional
//! document mirror.
//!
//! Writes are local-first: the local store must succeed, the mirror is best
//! effort and its failures come back as [`SyncStatus::MirrorFailed`] rather than
//! errors. Loads prefer the mirror, fall back to the local store, and finally to
//! demo data when nothing holds any employees.

use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::database::{Database, DatabaseError};
use crate::demo::demo_snapshot;
use crate::document::{DocumentError, DocumentStore};
use crate::models::{Backup, Snapshot};
use crate::utils::today;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("No backup found")]
    NoBackup,
}

/// A place a snapshot can be kept
pub trait Store {
    fn name(&self) -> &'static str;
    /// `None` when the store holds nothing yet
    fn load(&self) -> Result<Option<Snapshot>, StorageError>;
    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError>;
    fn delete_shift(&self, employee_id: &str, date: NaiveDate) -> Result<bool, StorageError>;
}

impl Store for Database {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        let snapshot = Database::load(self)?;
        Ok((!snapshot.employees.is_empty()).then_some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        Ok(Database::save(self, snapshot)?)
    }

    fn delete_shift(&self, employee_id: &str, date: NaiveDate) -> Result<bool, StorageError> {
        Ok(Database::delete_shift(self, employee_id, date)?)
    }
}

impl Store for DocumentStore {
    fn name(&self) -> &'static str {
        "mirror"
    }

    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        Ok(DocumentStore::load(self)?.filter(|s| !s.employees.is_empty()))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        Ok(DocumentStore::save(self, snapshot)?)
    }

    fn delete_shift(&self, employee_id: &str, date: NaiveDate) -> Result<bool, StorageError> {
        Ok(DocumentStore::delete_shift(self, employee_id, date)?)
    }
}

/// Outcome of a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// No mirror configured
    LocalOnly,
    Synced,
    /// Saved locally; the mirror write failed with this message
    MirrorFailed(String),
}

impl SyncStatus {
    pub fn warning(&self) -> Option<String> {
        match self {
            SyncStatus::MirrorFailed(message) => {
                Some(format!("Saved locally, mirror sync failed: {}", message))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Mirror,
    Local,
    Demo,
    Empty,
}

impl fmt::Display for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoadSource::Mirror => "mirror",
            LoadSource::Local => "local store",
            LoadSource::Demo => "demo data",
            LoadSource::Empty => "empty store",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub snapshot: Snapshot,
    pub source: LoadSource,
}

pub struct Gateway {
    local: Database,
    mirror: Option<Box<dyn Store>>,
    seed_demo: bool,
}

impl Gateway {
    pub fn new(local: Database) -> Self {
        Self {
            local,
            mirror: None,
            seed_demo: true,
        }
    }

    /// Open the configured local database and, when `sync_dir` is set, the mirror
    pub fn from_config(config: &Config) -> Result<Self, StorageError> {
        let db_path = config.get_database_path();
        let local = Database::new(&db_path.to_string_lossy())?;
        let mut gateway = Gateway::new(local).seed_demo(config.seed_demo_data);
        if let Some(dir) = config.get_sync_dir() {
            info!(dir = %dir.display(), "document mirror enabled");
            gateway = gateway.with_mirror(Box::new(DocumentStore::new(dir)));
        }
        Ok(gateway)
    }

    pub fn with_mirror(mut self, mirror: Box<dyn Store>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn seed_demo(mut self, seed: bool) -> Self {
        self.seed_demo = seed;
        self
    }

    pub fn has_mirror(&self) -> bool {
        self.mirror.is_some()
    }

    /// Load the best available snapshot. Only a failing local store is an error.
    pub fn load(&self) -> Result<Loaded, StorageError> {
        if let Some(mirror) = &self.mirror {
            match mirror.load() {
                Ok(Some(snapshot)) => {
                    info!(store = mirror.name(), "loaded from mirror");
                    // Keep the local copy in step with what the mirror holds
                    Store::save(&self.local, &snapshot)?;
                    return Ok(Loaded {
                        snapshot,
                        source: LoadSource::Mirror,
                    });
                }
                Ok(None) => info!(store = mirror.name(), "mirror is empty, using local store"),
                Err(e) => warn!(store = mirror.name(), error = %e, "mirror unavailable, using local store"),
            }
        }

        let stored = Database::load(&self.local)?;
        if !stored.employees.is_empty() {
            return Ok(Loaded {
                snapshot: stored,
                source: LoadSource::Local,
            });
        }

        if self.seed_demo {
            let snapshot = demo_snapshot(today());
            info!(employees = snapshot.employees.len(), "seeding demo data");
            if let Some(warning) = self.save(&snapshot)?.warning() {
                warn!("{}", warning);
            }
            return Ok(Loaded {
                snapshot,
                source: LoadSource::Demo,
            });
        }

        // Keep stored settings even when there are no employees
        Ok(Loaded {
            snapshot: stored,
            source: LoadSource::Empty,
        })
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<SyncStatus, StorageError> {
        Store::save(&self.local, snapshot)?;
        info!(employees = snapshot.employees.len(), "state saved");
        Ok(self.mirror_write(|mirror| mirror.save(snapshot)))
    }

    /// Targeted removal of one shift from every store
    pub fn delete_shift(&self, employee_id: &str, date: NaiveDate) -> Result<SyncStatus, StorageError> {
        Store::delete_shift(&self.local, employee_id, date)?;
        Ok(self.mirror_write(|mirror| mirror.delete_shift(employee_id, date).map(|_| ())))
    }

    fn mirror_write<F>(&self, write: F) -> SyncStatus
    where
        F: FnOnce(&dyn Store) -> Result<(), StorageError>,
    {
        match &self.mirror {
            None => SyncStatus::LocalOnly,
            Some(mirror) => match write(mirror.as_ref()) {
                Ok(()) => SyncStatus::Synced,
                Err(e) => {
                    warn!(store = mirror.name(), error = %e, "mirror write failed");
                    SyncStatus::MirrorFailed(e.to_string())
                }
            },
        }
    }

    /// Copy `snapshot` into the backup slot
    pub fn create_backup(&self, snapshot: &Snapshot) -> Result<Backup, StorageError> {
        let backup = Backup::new(snapshot.clone());
        self.local.save_backup(&backup)?;
        info!(date = %backup.backup_date, "backup created");
        Ok(backup)
    }

    pub fn restore_backup(&self) -> Result<Backup, StorageError> {
        self.local.load_backup()?.ok_or(StorageError::NoBackup)
    }

    pub fn clear_backup(&self) -> Result<(), StorageError> {
        Ok(self.local.clear_backup()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftType;
    use crate::state::AppState;
    use pretty_assertions::assert_eq;

    struct BrokenMirror;

    impl Store for BrokenMirror {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn load(&self) -> Result<Option<Snapshot>, StorageError> {
            Err(DocumentError::Unavailable("offline".into()).into())
        }
        fn save(&self, _: &Snapshot) -> Result<(), StorageError> {
            Err(DocumentError::Unavailable("offline".into()).into())
        }
        fn delete_shift(&self, _: &str, _: NaiveDate) -> Result<bool, StorageError> {
            Err(DocumentError::Unavailable("offline".into()).into())
        }
    }

    fn one_employee() -> Snapshot {
        let mut state = AppState::new();
        state.add_employee("Ivan Petrov", None).unwrap();
        state
            .set_shift(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), None, ShiftType::Day, "")
            .unwrap();
        state.snapshot()
    }

    #[test]
    fn empty_store_seeds_demo_data() {
        let gateway = Gateway::new(Database::open_in_memory().unwrap());
        let loaded = gateway.load().unwrap();
        assert_eq!(loaded.source, LoadSource::Demo);
        assert_eq!(loaded.snapshot.employees.len(), 3);

        // The seeded data was persisted
        let again = gateway.load().unwrap();
        assert_eq!(again.source, LoadSource::Local);
        assert_eq!(again.snapshot, loaded.snapshot);
    }

    #[test]
    fn seeding_can_be_disabled() {
        let gateway = Gateway::new(Database::open_in_memory().unwrap()).seed_demo(false);
        let loaded = gateway.load().unwrap();
        assert_eq!(loaded.source, LoadSource::Empty);
        assert!(loaded.snapshot.employees.is_empty());
    }

    #[test]
    fn local_only_save() {
        let gateway = Gateway::new(Database::open_in_memory().unwrap());
        assert!(!gateway.has_mirror());
        let snapshot = one_employee();
        assert_eq!(gateway.save(&snapshot).unwrap(), SyncStatus::LocalOnly);
        assert_eq!(gateway.load().unwrap().snapshot, snapshot);
    }

    #[test]
    fn broken_mirror_falls_back_and_warns() {
        let gateway = Gateway::new(Database::open_in_memory().unwrap())
            .with_mirror(Box::new(BrokenMirror));
        assert!(gateway.has_mirror());
        let snapshot = one_employee();

        let status = gateway.save(&snapshot).unwrap();
        assert!(matches!(status, SyncStatus::MirrorFailed(_)));
        assert!(status.warning().unwrap().starts_with("Saved locally"));

        let loaded = gateway.load().unwrap();
        assert_eq!(loaded.source, LoadSource::Local);
        assert_eq!(loaded.snapshot, snapshot);
    }

    #[test]
    fn mirror_wins_on_load_and_refreshes_local() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = one_employee();
        DocumentStore::new(dir.path()).save(&snapshot).unwrap();

        let gateway = Gateway::new(Database::open_in_memory().unwrap())
            .with_mirror(Box::new(DocumentStore::new(dir.path())));
        let loaded = gateway.load().unwrap();
        assert_eq!(loaded.source, LoadSource::Mirror);
        assert_eq!(loaded.snapshot, snapshot);
        assert_eq!(Database::load(&gateway.local).unwrap(), snapshot);
    }

    #[test]
    fn delete_shift_reaches_both_stores() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Gateway::new(Database::open_in_memory().unwrap())
            .with_mirror(Box::new(DocumentStore::new(dir.path())));
        let snapshot = one_employee();
        assert_eq!(gateway.save(&snapshot).unwrap(), SyncStatus::Synced);

        let id = snapshot.employees.keys().next().unwrap().clone();
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(gateway.delete_shift(&id, date).unwrap(), SyncStatus::Synced);

        let mirrored = DocumentStore::new(dir.path()).load().unwrap().unwrap();
        assert!(mirrored.schedules[&id].is_empty());
        assert!(Database::load(&gateway.local).unwrap().schedules[&id].is_empty());
    }

    #[test]
    fn backup_slot() {
        let gateway = Gateway::new(Database::open_in_memory().unwrap());
        assert!(matches!(gateway.restore_backup(), Err(StorageError::NoBackup)));

        let snapshot = one_employee();
        let backup = gateway.create_backup(&snapshot).unwrap();
        assert_eq!(gateway.restore_backup().unwrap(), backup);
        assert_eq!(backup.snapshot, snapshot);

        gateway.clear_backup().unwrap();
        assert!(matches!(gateway.restore_backup(), Err(StorageError::NoBackup)));
    }
}
