use chrono::{NaiveDate, TimeDelta};

use crate::models::{
    Employee, Settings, ShiftMap, ShiftRecord, ShiftType, Snapshot, TaskKey, TaskRecord,
    EMPLOYEE_COLORS,
};
use crate::utils::generate_id;

const DEMO_EMPLOYEES: [(&str, f64); 3] = [
    ("Ivan Petrov", 500.0),
    ("Anna Smirnova", 550.0),
    ("Alexei Sidorov", 600.0),
];

const DEMO_SHIFT_DAYS: i64 = 5;

/// Starter data for a fresh install: three employees with five shifts each
/// beginning on `today`, rotating day / night / custom, and one finished task.
pub fn demo_snapshot(today: NaiveDate) -> Snapshot {
    let mut snapshot = Snapshot {
        settings: Settings::default(),
        ..Snapshot::default()
    };

    for (index, (name, rate)) in DEMO_EMPLOYEES.iter().enumerate() {
        let id = generate_id();
        let color = EMPLOYEE_COLORS[index % EMPLOYEE_COLORS.len()].to_string();
        snapshot
            .employees
            .insert(id.clone(), Employee::new(id.clone(), name.to_string(), *rate, color));

        let mut shifts = ShiftMap::new();
        for offset in 0..DEMO_SHIFT_DAYS {
            let kind = match offset % 3 {
                0 => ShiftType::Day,
                1 => ShiftType::Night,
                _ => ShiftType::Custom,
            };
            let hours = if kind == ShiftType::Custom { 8.0 } else { 12.0 };
            shifts.insert(
                today + TimeDelta::days(offset),
                ShiftRecord::new(hours, kind, format!("Demo shift {}", offset + 1)),
            );
        }
        snapshot.schedules.insert(id, shifts);
    }

    if let Some(first) = snapshot.employees.keys().next().cloned() {
        let mut task = TaskRecord::new("Prepare the weekly report".to_string());
        task.report = "Report finished and sent".to_string();
        task.completed = true;
        snapshot.tasks.insert(TaskKey::new(first, today), vec![task]);
    }

    snapshot
}
