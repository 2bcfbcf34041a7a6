use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    Backup, Employee, Settings, ShiftRecord, ShiftType, Snapshot, TaskKey, TaskRecord,
};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Failed to encode backup: {0}")]
    BackupError(#[from] serde_json::Error),
}

const BACKUP_SLOT: &str = "workShiftBackup";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;

        let db = Database { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Database that lives only as long as the value, for tests and dry runs
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS employees (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                rate            REAL NOT NULL,
                color           TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS shifts (
                employee_id     TEXT NOT NULL,
                date            TEXT NOT NULL,
                hours           REAL NOT NULL,
                type            TEXT NOT NULL,
                notes           TEXT NOT NULL DEFAULT '',
                updated_at      TEXT NOT NULL,
                PRIMARY KEY (employee_id, date)
            );

            CREATE TABLE IF NOT EXISTS tasks (
                employee_id     TEXT NOT NULL,
                date            TEXT NOT NULL,
                position        INTEGER NOT NULL,
                text            TEXT NOT NULL,
                report          TEXT NOT NULL DEFAULT '',
                completed       INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL,
                PRIMARY KEY (employee_id, date, position)
            );

            CREATE TABLE IF NOT EXISTS settings (
                id                  INTEGER PRIMARY KEY CHECK (id = 1),
                day_shift_hours     REAL NOT NULL,
                night_shift_hours   REAL NOT NULL,
                default_hourly_rate REAL NOT NULL,
                start_of_week       INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS backups (
                name            TEXT PRIMARY KEY,
                payload         TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_shifts_date ON shifts(date);
            CREATE INDEX IF NOT EXISTS idx_tasks_date ON tasks(date);",
        )?;
        Ok(())
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Read everything. Every employee gets a schedule entry, even with no shifts.
    pub fn load(&self) -> Result<Snapshot, DatabaseError> {
        let mut snapshot = Snapshot::default();

        let mut stmt = self
            .conn
            .prepare("SELECT id, name, rate, color, created_at FROM employees")?;
        let employees = stmt
            .query_map([], Self::row_to_employee)?
            .collect::<Result<Vec<_>, _>>()?;
        for employee in employees {
            snapshot.schedules.entry(employee.id.clone()).or_default();
            snapshot.employees.insert(employee.id.clone(), employee);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT employee_id, date, hours, type, notes, updated_at FROM shifts")?;
        let shifts = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, chrono::NaiveDate>(1)?,
                Self::row_to_shift(row)?,
            ))
        })?;
        for shift in shifts {
            let (employee_id, date, record) = shift?;
            snapshot.schedules.entry(employee_id).or_default().insert(date, record);
        }

        let mut stmt = self.conn.prepare(
            "SELECT employee_id, date, text, report, completed, created_at, updated_at
             FROM tasks ORDER BY employee_id, date, position",
        )?;
        let tasks = stmt.query_map([], |row| {
            Ok((
                TaskKey::new(row.get::<_, String>(0)?, row.get(1)?),
                Self::row_to_task(row)?,
            ))
        })?;
        for task in tasks {
            let (key, record) = task?;
            snapshot.tasks.entry(key).or_default().push(record);
        }

        if let Some(settings) = self
            .conn
            .query_row(
                "SELECT day_shift_hours, night_shift_hours, default_hourly_rate, start_of_week
                 FROM settings WHERE id = 1",
                [],
                |row| {
                    Ok(Settings {
                        day_shift_hours: row.get(0)?,
                        night_shift_hours: row.get(1)?,
                        default_hourly_rate: row.get(2)?,
                        start_of_week: row.get(3)?,
                    })
                },
            )
            .optional()?
        {
            snapshot.settings = settings;
        }

        debug!(
            employees = snapshot.employees.len(),
            task_buckets = snapshot.tasks.len(),
            "loaded snapshot from sqlite"
        );
        Ok(snapshot)
    }

    /// Replace the stored state with `snapshot` in one transaction
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch("DELETE FROM employees; DELETE FROM shifts; DELETE FROM tasks;")?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO employees (id, name, rate, color, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for employee in snapshot.employees.values() {
                insert.execute(rusqlite::params![
                    employee.id,
                    employee.name,
                    employee.rate,
                    employee.color,
                    employee.created_at
                ])?;
            }

            let mut insert = tx.prepare(
                "INSERT INTO shifts (employee_id, date, hours, type, notes, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (employee_id, shifts) in &snapshot.schedules {
                for (date, shift) in shifts {
                    insert.execute(rusqlite::params![
                        employee_id,
                        date,
                        shift.hours,
                        shift.kind.as_str(),
                        shift.notes,
                        shift.updated_at
                    ])?;
                }
            }

            let mut insert = tx.prepare(
                "INSERT INTO tasks (employee_id, date, position, text, report, completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for (key, bucket) in &snapshot.tasks {
                for (position, task) in bucket.iter().enumerate() {
                    insert.execute(rusqlite::params![
                        key.employee_id,
                        key.date,
                        position as i64,
                        task.text,
                        task.report,
                        if task.completed { 1 } else { 0 },
                        task.created_at,
                        task.updated_at
                    ])?;
                }
            }
        }

        let settings = &snapshot.settings;
        tx.execute(
            "INSERT INTO settings (id, day_shift_hours, night_shift_hours, default_hourly_rate, start_of_week)
             VALUES (1, ?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                day_shift_hours = excluded.day_shift_hours,
                night_shift_hours = excluded.night_shift_hours,
                default_hourly_rate = excluded.default_hourly_rate,
                start_of_week = excluded.start_of_week",
            rusqlite::params![
                settings.day_shift_hours,
                settings.night_shift_hours,
                settings.default_hourly_rate,
                settings.start_of_week
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Remove a single shift row. Returns whether a row existed.
    pub fn delete_shift(&self, employee_id: &str, date: chrono::NaiveDate) -> Result<bool, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM shifts WHERE employee_id = ?1 AND date = ?2",
            rusqlite::params![employee_id, date],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    /// Store `backup` in the single backup slot, replacing any previous one
    pub fn save_backup(&self, backup: &Backup) -> Result<(), DatabaseError> {
        let payload = serde_json::to_string(backup)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO backups (name, payload, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![BACKUP_SLOT, payload, backup.backup_date],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn load_backup(&self) -> Result<Option<Backup>, DatabaseError> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM backups WHERE name = ?1",
                rusqlite::params![BACKUP_SLOT],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    pub fn clear_backup(&self) -> Result<(), DatabaseError> {
        self.conn.execute(
            "DELETE FROM backups WHERE name = ?1",
            rusqlite::params![BACKUP_SLOT],
        )?;
        Ok(())
    }

    fn row_to_employee(row: &rusqlite::Row) -> Result<Employee, rusqlite::Error> {
        Ok(Employee {
            id: row.get(0)?,
            name: row.get(1)?,
            rate: row.get(2)?,
            color: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// Maps columns 2..=5 of a shift row
    fn row_to_shift(row: &rusqlite::Row) -> Result<ShiftRecord, rusqlite::Error> {
        let kind: String = row.get(3)?;
        let kind = kind
            .parse::<ShiftType>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
        Ok(ShiftRecord {
            hours: row.get(2)?,
            kind,
            notes: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    /// Maps columns 2..=6 of a task row
    fn row_to_task(row: &rusqlite::Row) -> Result<TaskRecord, rusqlite::Error> {
        Ok(TaskRecord {
            text: row.get(2)?,
            report: row.get(3)?,
            completed: row.get::<_, i64>(4)? != 0,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftType;
    use crate::state::AppState;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_state() -> AppState {
        let mut state = AppState::new();
        let ivan = state.add_employee("Ivan Petrov", Some(500.0)).unwrap();
        state.add_employee("Anna Smirnova", None).unwrap();
        state.select_employee(&ivan).unwrap();
        state.set_shift(date("2024-01-05"), Some(12.0), ShiftType::Day, "").unwrap();
        state.set_shift(date("2024-01-06"), Some(8.5), ShiftType::Custom, "half day").unwrap();
        state.add_task(&ivan, date("2024-01-05"), "Open the store").unwrap();
        state.add_task(&ivan, date("2024-01-05"), "Close the store").unwrap();
        state.toggle_task(&TaskKey::new(ivan, date("2024-01-05")), 1).unwrap();
        state
    }

    #[test]
    fn empty_database_loads_empty_snapshot() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn save_then_load_reproduces_snapshot() {
        let db = Database::open_in_memory().unwrap();
        let snapshot = sample_state().snapshot();
        db.save(&snapshot).unwrap();
        assert_eq!(db.load().unwrap(), snapshot);
    }

    #[test]
    fn save_replaces_previous_contents() {
        let db = Database::open_in_memory().unwrap();
        let mut state = sample_state();
        db.save(&state.snapshot()).unwrap();

        let anna = state.find_employee("anna smirnova").unwrap().id.clone();
        state.delete_employee(&anna).unwrap();
        db.save(&state.snapshot()).unwrap();

        let loaded = db.load().unwrap();
        assert_eq!(loaded.employees.len(), 1);
        assert!(!loaded.schedules.contains_key(&anna));
    }

    #[test]
    fn task_order_survives_storage() {
        let db = Database::open_in_memory().unwrap();
        let snapshot = sample_state().snapshot();
        db.save(&snapshot).unwrap();
        let loaded = db.load().unwrap();
        let bucket = loaded.tasks.values().next().unwrap();
        assert_eq!(bucket[0].text, "Open the store");
        assert!(bucket[1].completed);
    }

    #[test]
    fn delete_shift_removes_only_that_row() {
        let db = Database::open_in_memory().unwrap();
        let state = sample_state();
        let ivan = state.selected_employee().unwrap().id.clone();
        db.save(&state.snapshot()).unwrap();

        assert!(db.delete_shift(&ivan, date("2024-01-05")).unwrap());
        assert!(!db.delete_shift(&ivan, date("2024-01-05")).unwrap());

        let loaded = db.load().unwrap();
        let shifts = &loaded.schedules[&ivan];
        assert_eq!(shifts.len(), 1);
        assert!(shifts.contains_key(&date("2024-01-06")));
    }

    #[test]
    fn backup_slot_round_trips() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_backup().unwrap(), None);

        let backup = Backup::new(sample_state().snapshot());
        db.save_backup(&backup).unwrap();
        assert_eq!(db.load_backup().unwrap(), Some(backup));

        db.clear_backup().unwrap();
        assert_eq!(db.load_backup().unwrap(), None);
    }

    #[test]
    fn settings_are_persisted() {
        let db = Database::open_in_memory().unwrap();
        let snapshot = Snapshot {
            settings: Settings {
                default_hourly_rate: 650.0,
                start_of_week: 0,
                ..Settings::default()
            },
            ..Snapshot::default()
        };
        db.save(&snapshot).unwrap();
        assert_eq!(db.load().unwrap().settings, snapshot.settings);
    }
}
