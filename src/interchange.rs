//! JSON backup files and CSV exports.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

use crate::models::{Employees, Schedules, Settings, Snapshot, TaskBuckets};

pub const EXPORT_VERSION: &str = "2.0";
const REQUIRED_KEYS: [&str; 3] = ["employees", "schedules", "tasks"];
const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("File is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Invalid file format: missing '{0}'")]
    MissingKey(&'static str),
    #[error("Invalid file format: {0}")]
    Invalid(#[source] serde_json::Error),
    #[error("Failed to serialize export: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    employees: &'a Employees,
    schedules: &'a Schedules,
    tasks: &'a TaskBuckets,
    settings: &'a Settings,
    export_date: DateTime<Utc>,
    version: &'static str,
}

/// Data read from a backup file. Settings are optional; when absent the
/// current settings are kept.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportedData {
    pub employees: Employees,
    pub schedules: Schedules,
    pub tasks: TaskBuckets,
    #[serde(default)]
    pub settings: Option<Settings>,
}

impl ImportedData {
    pub fn into_snapshot(self, current_settings: &Settings) -> Snapshot {
        Snapshot {
            employees: self.employees,
            schedules: self.schedules,
            tasks: self.tasks,
            settings: self.settings.unwrap_or_else(|| current_settings.clone()),
        }
    }
}

/// Pretty-printed JSON backup of the whole state
pub fn export_json(snapshot: &Snapshot, exported_at: DateTime<Utc>) -> Result<String, InterchangeError> {
    let document = ExportDocument {
        employees: &snapshot.employees,
        schedules: &snapshot.schedules,
        tasks: &snapshot.tasks,
        settings: &snapshot.settings,
        export_date: exported_at,
        version: EXPORT_VERSION,
    };
    serde_json::to_string_pretty(&document).map_err(InterchangeError::Serialize)
}

/// Parse a JSON backup. Nothing is applied here; the caller replaces its state
/// wholesale only when this succeeds.
pub fn import_json(text: &str) -> Result<ImportedData, InterchangeError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(InterchangeError::Parse)?;
    for key in REQUIRED_KEYS {
        if value.get(key).is_none_or(|v| v.is_null()) {
            return Err(InterchangeError::MissingKey(key));
        }
    }
    serde_json::from_value(value).map_err(InterchangeError::Invalid)
}

pub fn json_export_file_name(date: NaiveDate) -> String {
    format!("workshift-manager-backup-{}.json", date.format("%Y-%m-%d"))
}

pub fn csv_export_file_name(date: NaiveDate) -> String {
    format!("workshift-data-{}.csv", date.format("%Y-%m-%d"))
}

/// Three stacked tables (employees, shifts, tasks) prefixed with a UTF-8 BOM
/// so spreadsheet tools pick the right encoding.
pub fn export_csv(snapshot: &Snapshot) -> String {
    let mut csv = String::new();
    csv.push(UTF8_BOM);

    csv.push_str("Employees\n");
    csv.push_str("ID,Name,Rate per hour,Color\n");
    for employee in snapshot.employees.values() {
        let _ = writeln!(
            csv,
            "{},{},{},{}",
            quoted(&employee.id),
            quoted(&employee.name),
            employee.rate,
            quoted(&employee.color)
        );
    }

    csv.push_str("\n\nShifts\n");
    csv.push_str("Employee ID,Date,Hours,Type,Notes\n");
    for (employee_id, shifts) in &snapshot.schedules {
        for (date, shift) in shifts {
            let _ = writeln!(
                csv,
                "{},{},{},{},{}",
                quoted(employee_id),
                date.format("%Y-%m-%d"),
                shift.hours,
                shift.kind,
                quoted(&shift.notes)
            );
        }
    }

    csv.push_str("\n\nTasks\n");
    csv.push_str("Key,Task,Report,Completed,Created\n");
    for (key, bucket) in &snapshot.tasks {
        for task in bucket {
            let _ = writeln!(
                csv,
                "{},{},{},{},{}",
                quoted(&key.to_string()),
                quoted(&task.text),
                quoted(&task.report),
                task.completed,
                task.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
            );
        }
    }

    csv
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, ShiftRecord, ShiftType, TaskKey, TaskRecord};
    use crate::state::AppState;
    use pretty_assertions::assert_eq;

    fn sample() -> Snapshot {
        let mut state = AppState::new();
        let id = state.add_employee("Anna \"Ace\" Petrova", Some(550.0)).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        state.set_shift(day, Some(12.0), ShiftType::Day, "front desk").unwrap();
        state.add_task(&id, day, "Count the till").unwrap();
        state
            .update_task_report(&TaskKey::new(id, day), 0, "Balanced")
            .unwrap();
        state.snapshot()
    }

    #[test]
    fn json_round_trip_reproduces_state() {
        let snapshot = sample();
        let json = export_json(&snapshot, Utc::now()).unwrap();
        let imported = import_json(&json).unwrap();
        assert_eq!(imported.clone().into_snapshot(&Settings::default()), snapshot);
        assert_eq!(imported.settings, Some(snapshot.settings));
    }

    #[test]
    fn export_carries_version_and_date() {
        let json = export_json(&Snapshot::default(), Utc::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "2.0");
        assert!(value["exportDate"].is_string());
        assert!(json.contains('\n'));
    }

    #[test]
    fn import_requires_core_keys() {
        let err = import_json(r#"{"employees": {}, "tasks": {}}"#).unwrap_err();
        assert!(matches!(err, InterchangeError::MissingKey("schedules")));

        let err = import_json(r#"{"employees": null, "schedules": {}, "tasks": {}}"#).unwrap_err();
        assert!(matches!(err, InterchangeError::MissingKey("employees")));

        assert!(matches!(import_json("{not json"), Err(InterchangeError::Parse(_))));
    }

    #[test]
    fn import_without_settings_keeps_current() {
        let imported = import_json(r#"{"employees": {}, "schedules": {}, "tasks": {}}"#).unwrap();
        let current = Settings { default_hourly_rate: 700.0, ..Settings::default() };
        assert_eq!(imported.into_snapshot(&current).settings, current);
    }

    #[test]
    fn import_rejects_bad_task_keys() {
        let text = r#"{"employees": {}, "schedules": {}, "tasks": {"broken": []}}"#;
        assert!(matches!(import_json(text), Err(InterchangeError::Invalid(_))));
    }

    #[test]
    fn imports_browser_backup() {
        let text = r##"{
            "employees": {"k1": {"id": "k1", "name": "Ivan", "rate": 500, "color": "#58a6ff", "createdAt": 1704445200000}},
            "schedules": {"k1": {"2024-01-05": {"hours": 12, "type": "day", "notes": "", "updatedAt": 1704445200000}}},
            "tasks": {"k1:2024-01-05": [{"text": "Report", "report": "", "completed": false, "createdAt": 1704445200000, "updatedAt": 1704445200000}]},
            "exportDate": "2024-01-05T10:00:00.000Z",
            "version": "2.0"
        }"##;
        let data = import_json(text).unwrap();
        assert_eq!(data.employees["k1"].rate, 500.0);
        assert_eq!(data.tasks.len(), 1);
        assert!(data.settings.is_none());
    }

    #[test]
    fn csv_has_bom_and_three_tables() {
        let csv = export_csv(&sample());
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv.contains("Employees\nID,Name,Rate per hour,Color\n"));
        assert!(csv.contains("\n\n\nShifts\n"));
        assert!(csv.contains("\n\n\nTasks\n"));
        assert!(csv.contains("\"Anna \"\"Ace\"\" Petrova\",550,"));
        assert!(csv.contains(",2024-01-05,12,day,\"front desk\"\n"));
        assert!(csv.contains(",\"Count the till\",\"Balanced\",false,"));
    }

    #[test]
    fn csv_quotes_opaque_ids() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let mut snapshot = Snapshot::default();
        let employee = Employee::new("a,\"b".to_string(), "Anna".to_string(), 500.0, "#58a6ff".to_string());
        snapshot.employees.insert(employee.id.clone(), employee);
        snapshot
            .schedules
            .entry("a,\"b".to_string())
            .or_default()
            .insert(day, ShiftRecord::new(12.0, ShiftType::Day, String::new()));
        snapshot
            .tasks
            .insert(TaskKey::new("a,\"b".to_string(), day), vec![TaskRecord::new("Count the till".to_string())]);

        let csv = export_csv(&snapshot);
        assert!(csv.contains("\n\"a,\"\"b\",\"Anna\",500,"));
        assert!(csv.contains("\n\"a,\"\"b\",2024-01-05,12,day,\"\"\n"));
        assert!(csv.contains("\n\"a,\"\"b:2024-01-05\",\"Count the till\","));
    }

    #[test]
    fn file_names_use_iso_dates() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(json_export_file_name(day), "workshift-manager-backup-2024-03-09.json");
        assert_eq!(csv_export_file_name(day), "workshift-data-2024-03-09.csv");
    }
}
