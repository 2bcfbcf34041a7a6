use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;

use workshift::interchange::{export_csv, export_json, import_json, InterchangeError};
use workshift::{AppState, Settings, ShiftType, TaskKey};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn exported_json_imports_into_identical_state() {
    let mut state = AppState::new();
    let id = state.add_employee("Anna Petrova", Some(550.0)).unwrap();
    state.set_shift(date("2024-01-05"), Some(12.0), ShiftType::Night, "inventory").unwrap();
    state.add_task(&id, date("2024-01-05"), "Count stock").unwrap();
    state
        .toggle_task(&TaskKey::new(id.clone(), date("2024-01-05")), 0)
        .unwrap();

    let exported_at = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
    let json = export_json(&state.snapshot(), exported_at).unwrap();
    assert!(json.contains("\"exportDate\""));

    let imported = import_json(&json).unwrap();
    let mut restored = AppState::new();
    restored.replace(imported.into_snapshot(&Settings::default()));

    assert_eq!(restored.snapshot(), state.snapshot());
    assert_eq!(restored.selected_employee().unwrap().id, id);
}

#[test]
fn import_without_settings_keeps_current_ones() {
    let json = r#"{"employees": {}, "schedules": {}, "tasks": {}}"#;
    let current = Settings {
        day_shift_hours: 10.0,
        ..Settings::default()
    };
    let snapshot = import_json(json).unwrap().into_snapshot(&current);
    assert_eq!(snapshot.settings, current);
}

#[test]
fn failed_import_leaves_state_untouched() {
    let mut state = AppState::new();
    state.add_employee("Anna Petrova", None).unwrap();
    let before = state.snapshot();

    let result = import_json(r#"{"employees": {}, "tasks": {}}"#);
    assert!(matches!(result, Err(InterchangeError::MissingKey("schedules"))));
    if let Ok(data) = result {
        state.replace(data.into_snapshot(&Settings::default()));
    }
    assert_eq!(state.snapshot(), before);
}

#[test]
fn csv_lists_every_table() {
    let mut state = AppState::new();
    let id = state.add_employee("Anna Petrova", Some(500.0)).unwrap();
    state.set_shift(date("2024-01-05"), None, ShiftType::Day, "").unwrap();
    state.add_task(&id, date("2024-01-05"), "Sign delivery").unwrap();

    let csv = export_csv(&state.snapshot());
    assert!(csv.starts_with('\u{feff}'));
    assert!(csv.contains("Employees\n"));
    assert!(csv.contains("Anna Petrova"));
    assert!(csv.contains("2024-01-05"));
    assert!(csv.contains("Sign delivery"));
}
