use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::aggregate::{self, DashboardRow, DaySummary, MonthlySummary};
use crate::calendar::YearMonth;
use crate::models::{
    now_millis, Employee, EmployeeId, Employees, Schedules, Settings, ShiftMap, ShiftRecord, ShiftType,
    Snapshot, TaskBuckets, TaskKey, TaskRecord, EMPLOYEE_COLORS,
};
use crate::utils::generate_id;

pub const MIN_NAME_LEN: usize = 3;
pub const MIN_TASK_LEN: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("Employee name is required")]
    NameRequired,
    #[error("Employee name must be at least 3 characters")]
    NameTooShort,
    #[error("An employee named '{0}' already exists")]
    DuplicateName(String),
    #[error("Invalid hourly rate: {0}")]
    InvalidRate(f64),
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),
    #[error("No employee selected")]
    NoEmployeeSelected,
    #[error("Employee is required for a task")]
    TaskEmployeeRequired,
    #[error("Task text must be at least 3 characters")]
    TaskTextTooShort,
    #[error("Task #{} not found for {key}", .index + 1)]
    TaskNotFound { key: TaskKey, index: usize },
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// What a shift edit did to the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftChange {
    Saved,
    Removed,
    /// Deletion requested but no shift existed
    NothingToRemove,
}

/// Application state: employees, their schedules and tasks, settings, and the
/// currently selected employee. Every mutation goes through a method here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    employees: Employees,
    schedules: Schedules,
    tasks: TaskBuckets,
    settings: Settings,
    selected: Option<EmployeeId>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut state = Self::new();
        state.replace(snapshot);
        state
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            employees: self.employees.clone(),
            schedules: self.schedules.clone(),
            tasks: self.tasks.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Replace everything wholesale (import, backup restore). The selection is kept
    /// when the employee still exists.
    pub fn replace(&mut self, snapshot: Snapshot) {
        self.employees = snapshot.employees;
        self.schedules = snapshot.schedules;
        self.tasks = snapshot.tasks;
        self.settings = snapshot.settings;
        if !self.selected.as_ref().is_some_and(|id| self.employees.contains_key(id)) {
            self.selected = None;
        }
        self.ensure_selection();
    }

    pub fn employees(&self) -> &Employees {
        &self.employees
    }

    pub fn schedules(&self) -> &Schedules {
        &self.schedules
    }

    pub fn tasks(&self) -> &TaskBuckets {
        &self.tasks
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ----- employees -----

    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.get(id)
    }

    /// Find by exact id, then by case-insensitive name
    pub fn find_employee(&self, query: &str) -> Option<&Employee> {
        let query = query.trim();
        self.employees.get(query).or_else(|| {
            let lowered = query.to_lowercase();
            self.employees
                .values()
                .find(|e| e.name.to_lowercase() == lowered)
        })
    }

    pub fn employees_by_name(&self) -> Vec<&Employee> {
        let mut list: Vec<&Employee> = self.employees.values().collect();
        list.sort_by_key(|e| e.name.to_lowercase());
        list
    }

    pub fn add_employee(&mut self, name: &str, rate: Option<f64>) -> Result<EmployeeId, StateError> {
        let name = self.validate_name(name, None)?;
        let rate = validate_rate(rate.unwrap_or(self.settings.default_hourly_rate))?;

        let id = generate_id();
        let color = EMPLOYEE_COLORS[self.employees.len() % EMPLOYEE_COLORS.len()].to_string();
        self.employees
            .insert(id.clone(), Employee::new(id.clone(), name.clone(), rate, color));
        self.schedules.insert(id.clone(), ShiftMap::new());
        self.ensure_selection();

        info!(employee = %id, %name, rate, "employee added");
        Ok(id)
    }

    pub fn edit_employee(&mut self, id: &str, name: &str, rate: f64) -> Result<(), StateError> {
        if !self.employees.contains_key(id) {
            return Err(StateError::EmployeeNotFound(id.to_string()));
        }
        let name = self.validate_name(name, Some(id))?;
        let rate = validate_rate(rate)?;

        if let Some(employee) = self.employees.get_mut(id) {
            employee.name = name;
            employee.rate = rate;
        }
        info!(employee = %id, "employee updated");
        Ok(())
    }

    /// Delete an employee with their schedule and every task bucket they own.
    pub fn delete_employee(&mut self, id: &str) -> Result<Employee, StateError> {
        let employee = self
            .employees
            .remove(id)
            .ok_or_else(|| StateError::EmployeeNotFound(id.to_string()))?;
        self.schedules.remove(id);
        self.tasks.retain(|key, _| key.employee_id != id);

        if self.selected.as_deref() == Some(id) {
            self.selected = self.employees.keys().next().cloned();
        }
        info!(employee = %id, name = %employee.name, "employee deleted");
        Ok(employee)
    }

    pub fn selected_employee(&self) -> Option<&Employee> {
        self.selected.as_ref().and_then(|id| self.employees.get(id))
    }

    pub fn select_employee(&mut self, id: &str) -> Result<(), StateError> {
        if !self.employees.contains_key(id) {
            return Err(StateError::EmployeeNotFound(id.to_string()));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Pick the first employee by name when nothing is selected
    pub fn ensure_selection(&mut self) {
        if self.selected.is_none() {
            self.selected = self.employees_by_name().first().map(|e| e.id.clone());
        }
    }

    /// Trimmed name if it is long enough and unused by anyone but `exclude`
    pub fn validate_name(&self, name: &str, exclude: Option<&str>) -> Result<String, StateError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StateError::NameRequired);
        }
        if name.chars().count() < MIN_NAME_LEN {
            return Err(StateError::NameTooShort);
        }
        let lowered = name.to_lowercase();
        let duplicate = self
            .employees
            .values()
            .any(|e| Some(e.id.as_str()) != exclude && e.name.to_lowercase() == lowered);
        if duplicate {
            return Err(StateError::DuplicateName(name.to_string()));
        }
        Ok(name.to_string())
    }

    // ----- shifts -----

    pub fn schedule(&self, employee_id: &str) -> Option<&ShiftMap> {
        self.schedules.get(employee_id)
    }

    pub fn shift(&self, employee_id: &str, date: NaiveDate) -> Option<&ShiftRecord> {
        self.schedules.get(employee_id).and_then(|s| s.get(&date))
    }

    /// Upsert or delete the selected employee's shift on `date`.
    ///
    /// Missing hours fall back to the settings default for day and night shifts.
    /// Hours that are not a positive finite number delete the shift. Otherwise the record
    /// is replaced wholesale with a fresh timestamp.
    pub fn set_shift(
        &mut self,
        date: NaiveDate,
        hours: Option<f64>,
        kind: ShiftType,
        notes: &str,
    ) -> Result<ShiftChange, StateError> {
        let employee_id = self.selected_id()?;
        let hours = hours
            .or_else(|| self.settings.default_hours(kind))
            .unwrap_or(f64::NAN);

        // NaN fails this comparison too
        if !(hours.is_finite() && hours > 0.0) {
            return self.remove_shift(date);
        }

        self.schedules
            .entry(employee_id.clone())
            .or_default()
            .insert(date, ShiftRecord::new(hours, kind, notes.trim().to_string()));
        info!(employee = %employee_id, %date, hours, kind = %kind, "shift saved");
        Ok(ShiftChange::Saved)
    }

    /// Delete the selected employee's shift on `date`
    pub fn remove_shift(&mut self, date: NaiveDate) -> Result<ShiftChange, StateError> {
        let employee_id = self.selected_id()?;
        let removed = self
            .schedules
            .get_mut(&employee_id)
            .and_then(|s| s.remove(&date))
            .is_some();
        if removed {
            info!(employee = %employee_id, %date, "shift removed");
            Ok(ShiftChange::Removed)
        } else {
            debug!(employee = %employee_id, %date, "no shift to remove");
            Ok(ShiftChange::NothingToRemove)
        }
    }

    fn selected_id(&self) -> Result<EmployeeId, StateError> {
        self.selected_employee()
            .map(|e| e.id.clone())
            .ok_or(StateError::NoEmployeeSelected)
    }

    // ----- tasks -----

    pub fn tasks_for(&self, employee_id: &str, date: NaiveDate) -> &[TaskRecord] {
        self.tasks
            .get(&TaskKey::new(employee_id, date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append a task to the (employee, date) bucket and return its index
    pub fn add_task(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
        text: &str,
    ) -> Result<usize, StateError> {
        if employee_id.trim().is_empty() {
            return Err(StateError::TaskEmployeeRequired);
        }
        if !self.employees.contains_key(employee_id) {
            return Err(StateError::EmployeeNotFound(employee_id.to_string()));
        }
        let text = text.trim();
        if text.chars().count() < MIN_TASK_LEN {
            return Err(StateError::TaskTextTooShort);
        }

        let key = TaskKey::new(employee_id, date);
        let bucket = self.tasks.entry(key.clone()).or_default();
        bucket.push(TaskRecord::new(text.to_string()));
        info!(%key, "task added");
        Ok(bucket.len() - 1)
    }

    pub fn update_task_report(
        &mut self,
        key: &TaskKey,
        index: usize,
        report: &str,
    ) -> Result<(), StateError> {
        let task = self.task_mut(key, index)?;
        task.report = report.to_string();
        task.updated_at = now_millis();
        debug!(%key, index, "task report updated");
        Ok(())
    }

    /// Flip the completed flag and return the new value
    pub fn toggle_task(&mut self, key: &TaskKey, index: usize) -> Result<bool, StateError> {
        let task = self.task_mut(key, index)?;
        task.completed = !task.completed;
        task.updated_at = now_millis();
        let completed = task.completed;
        info!(%key, index, completed, "task toggled");
        Ok(completed)
    }

    /// Remove a task; an emptied bucket is dropped entirely
    pub fn delete_task(&mut self, key: &TaskKey, index: usize) -> Result<TaskRecord, StateError> {
        let not_found = || StateError::TaskNotFound {
            key: key.clone(),
            index,
        };
        let bucket = self.tasks.get_mut(key).ok_or_else(not_found)?;
        if index >= bucket.len() {
            return Err(not_found());
        }
        let task = bucket.remove(index);
        if bucket.is_empty() {
            self.tasks.remove(key);
        }
        info!(%key, index, "task deleted");
        Ok(task)
    }

    fn task_mut(&mut self, key: &TaskKey, index: usize) -> Result<&mut TaskRecord, StateError> {
        self.tasks
            .get_mut(key)
            .and_then(|bucket| bucket.get_mut(index))
            .ok_or_else(|| StateError::TaskNotFound {
                key: key.clone(),
                index,
            })
    }

    // ----- settings -----

    pub fn update_settings(&mut self, settings: Settings) -> Result<(), StateError> {
        let hours_ok = |h: f64| h.is_finite() && h > 0.0 && h <= 24.0;
        if !hours_ok(settings.day_shift_hours) || !hours_ok(settings.night_shift_hours) {
            return Err(StateError::InvalidSettings(
                "shift hours must be between 0 and 24".to_string(),
            ));
        }
        if !(settings.default_hourly_rate.is_finite() && settings.default_hourly_rate >= 0.0) {
            return Err(StateError::InvalidSettings(
                "default rate must be a non-negative number".to_string(),
            ));
        }
        if settings.start_of_week > 6 {
            return Err(StateError::InvalidSettings(
                "start of week must be 0 (Sunday) to 6 (Saturday)".to_string(),
            ));
        }
        self.settings = settings;
        info!("settings updated");
        Ok(())
    }

    // ----- aggregates -----

    pub fn monthly_summary(&self, employee_id: &str, month: YearMonth) -> Option<MonthlySummary> {
        let employee = self.employees.get(employee_id)?;
        Some(aggregate::monthly_summary(
            self.schedules.get(employee_id),
            employee.rate,
            month,
        ))
    }

    pub fn dashboard(&self, month: YearMonth) -> Vec<DashboardRow<'_>> {
        aggregate::dashboard(&self.employees, &self.schedules, month)
    }

    pub fn day_summary(&self, date: NaiveDate) -> DaySummary {
        aggregate::day_summary(&self.employees, &self.schedules, &self.tasks, date)
    }

    /// Employees with a shift on `date`, ordered by name
    pub fn shifts_on(&self, date: NaiveDate) -> Vec<(&Employee, &ShiftRecord)> {
        self.employees_by_name()
            .into_iter()
            .filter_map(move |e| self.shift(&e.id, date).map(|s| (e, s)))
            .collect()
    }

    /// Every task on `date` with its owner, ordered by employee name then position
    pub fn tasks_on(&self, date: NaiveDate) -> Vec<(&Employee, &TaskRecord)> {
        self.employees_by_name()
            .into_iter()
            .flat_map(move |e| self.tasks_for(&e.id, date).iter().map(move |t| (e, t)))
            .collect()
    }
}

fn validate_rate(rate: f64) -> Result<f64, StateError> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(rate)
    } else {
        Err(StateError::InvalidRate(rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn state_with(names: &[&str]) -> (AppState, Vec<EmployeeId>) {
        let mut state = AppState::new();
        let ids = names
            .iter()
            .map(|n| state.add_employee(n, Some(500.0)).unwrap())
            .collect();
        (state, ids)
    }

    #[test]
    fn add_employee_validates_name() {
        let (mut state, _) = state_with(&["Anna Petrova"]);
        assert_eq!(state.add_employee("  ", None), Err(StateError::NameRequired));
        assert_eq!(state.add_employee("Al", None), Err(StateError::NameTooShort));
        assert_eq!(
            state.add_employee("ANNA PETROVA", None),
            Err(StateError::DuplicateName("ANNA PETROVA".to_string()))
        );
        assert_eq!(state.add_employee("Bob", Some(-1.0)), Err(StateError::InvalidRate(-1.0)));
        assert_eq!(state.employees().len(), 1);
    }

    #[test]
    fn add_employee_uses_defaults_and_palette() {
        let (mut state, ids) = state_with(&["Anna", "Boris"]);
        let id = state.add_employee("Clara", None).unwrap();
        let clara = state.employee(&id).unwrap();
        assert_eq!(clara.rate, 500.0);
        assert_eq!(clara.color, EMPLOYEE_COLORS[2]);
        assert!(state.schedule(&id).unwrap().is_empty());
        // First employee by name is selected automatically
        assert_eq!(state.selected_employee().unwrap().id, ids[0]);
    }

    #[test]
    fn edit_employee_allows_own_name_but_not_others() {
        let (mut state, ids) = state_with(&["Anna", "Boris"]);
        state.edit_employee(&ids[0], "anna", 600.0).unwrap();
        assert_eq!(state.employee(&ids[0]).unwrap().name, "anna");
        assert_eq!(
            state.edit_employee(&ids[0], "Boris", 600.0),
            Err(StateError::DuplicateName("Boris".to_string()))
        );
        assert_eq!(
            state.edit_employee("missing", "Carl", 1.0),
            Err(StateError::EmployeeNotFound("missing".to_string()))
        );
    }

    #[test]
    fn zero_hours_removes_the_shift() {
        let (mut state, ids) = state_with(&["Anna"]);
        let day = date("2024-01-05");
        assert_eq!(state.set_shift(day, Some(12.0), ShiftType::Day, "").unwrap(), ShiftChange::Saved);
        assert!(state.shift(&ids[0], day).is_some());

        assert_eq!(state.set_shift(day, Some(0.0), ShiftType::Day, "").unwrap(), ShiftChange::Removed);
        assert!(state.shift(&ids[0], day).is_none());

        assert_eq!(
            state.set_shift(day, Some(f64::NAN), ShiftType::Custom, "").unwrap(),
            ShiftChange::NothingToRemove
        );
    }

    #[test]
    fn infinite_hours_remove_the_shift() {
        let (mut state, ids) = state_with(&["Anna"]);
        let day = date("2024-01-05");
        state.set_shift(day, Some(12.0), ShiftType::Day, "").unwrap();

        assert_eq!(
            state.set_shift(day, Some(f64::INFINITY), ShiftType::Custom, "").unwrap(),
            ShiftChange::Removed
        );
        assert!(state.shift(&ids[0], day).is_none());

        let overflow = crate::utils::parse_hours("1e309");
        assert_eq!(
            state.set_shift(day, Some(overflow), ShiftType::Custom, "").unwrap(),
            ShiftChange::NothingToRemove
        );
        assert!(state.schedules()[&ids[0]].is_empty());
    }

    #[test]
    fn set_shift_replaces_wholesale() {
        let (mut state, ids) = state_with(&["Anna"]);
        let day = date("2024-01-05");
        state.set_shift(day, Some(8.0), ShiftType::Custom, "inventory").unwrap();
        state.set_shift(day, None, ShiftType::Night, "").unwrap();
        let shift = state.shift(&ids[0], day).unwrap();
        assert_eq!(shift.kind, ShiftType::Night);
        assert_eq!(shift.hours, 12.0);
        assert_eq!(shift.notes, "");
    }

    #[test]
    fn custom_shift_without_hours_is_a_delete() {
        let (mut state, ids) = state_with(&["Anna"]);
        let day = date("2024-01-05");
        state.set_shift(day, Some(6.0), ShiftType::Custom, "").unwrap();
        assert_eq!(state.set_shift(day, None, ShiftType::Custom, "").unwrap(), ShiftChange::Removed);
        assert!(state.shift(&ids[0], day).is_none());
    }

    #[test]
    fn shift_edit_requires_selection() {
        let mut state = AppState::new();
        assert_eq!(
            state.set_shift(date("2024-01-05"), Some(12.0), ShiftType::Day, ""),
            Err(StateError::NoEmployeeSelected)
        );
    }

    #[test]
    fn delete_employee_cascades_only_to_own_data() {
        let (mut state, ids) = state_with(&["Anna", "Boris"]);
        let day = date("2024-01-05");
        for id in &ids {
            state.select_employee(id).unwrap();
            state.set_shift(day, Some(12.0), ShiftType::Day, "").unwrap();
            state.add_task(id, day, "Open the shop").unwrap();
            state.add_task(id, date("2024-01-06"), "Close the shop").unwrap();
        }

        state.delete_employee(&ids[0]).unwrap();

        assert!(state.schedule(&ids[0]).is_none());
        assert!(state.tasks().keys().all(|k| k.employee_id != ids[0]));
        assert_eq!(state.tasks().len(), 2);
        assert!(state.shift(&ids[1], day).is_some());
        // Boris was selected last and stays selected
        assert_eq!(state.selected_employee().unwrap().id, ids[1]);
    }

    #[test]
    fn deleting_selected_employee_falls_back() {
        let (mut state, ids) = state_with(&["Anna", "Boris"]);
        state.select_employee(&ids[0]).unwrap();
        state.delete_employee(&ids[0]).unwrap();
        assert_eq!(state.selected_employee().unwrap().id, ids[1]);
        state.delete_employee(&ids[1]).unwrap();
        assert!(state.selected_employee().is_none());
    }

    #[test]
    fn short_task_is_rejected() {
        let (mut state, ids) = state_with(&["Anna"]);
        let day = date("2024-01-05");
        assert_eq!(state.add_task(&ids[0], day, "ok"), Err(StateError::TaskTextTooShort));
        assert_eq!(state.add_task("", day, "Valid text"), Err(StateError::TaskEmployeeRequired));
        assert!(state.tasks_for(&ids[0], day).is_empty());
        assert!(state.tasks().is_empty());
    }

    #[test]
    fn task_lifecycle() {
        let (mut state, ids) = state_with(&["Anna"]);
        let day = date("2024-01-05");
        let key = TaskKey::new(ids[0].clone(), day);

        assert_eq!(state.add_task(&ids[0], day, "Count stock").unwrap(), 0);
        assert_eq!(state.add_task(&ids[0], day, "Sign delivery").unwrap(), 1);

        state.update_task_report(&key, 1, "Signed at 9:00").unwrap();
        assert!(state.toggle_task(&key, 0).unwrap());
        assert!(!state.toggle_task(&key, 0).unwrap());

        let bucket = state.tasks_for(&ids[0], day);
        assert_eq!(bucket[1].report, "Signed at 9:00");
        assert!(bucket[1].updated_at >= bucket[1].created_at);

        assert_eq!(
            state.toggle_task(&key, 5),
            Err(StateError::TaskNotFound { key: key.clone(), index: 5 })
        );

        state.delete_task(&key, 0).unwrap();
        assert_eq!(state.tasks_for(&ids[0], day)[0].text, "Sign delivery");
        state.delete_task(&key, 0).unwrap();
        assert!(!state.tasks().contains_key(&key));
    }

    #[test]
    fn replace_keeps_valid_selection_only() {
        let (mut state, ids) = state_with(&["Anna", "Boris"]);
        state.select_employee(&ids[1]).unwrap();
        let snapshot = state.snapshot();
        state.replace(snapshot.clone());
        assert_eq!(state.selected_employee().unwrap().id, ids[1]);

        state.replace(Snapshot::default());
        assert!(state.selected_employee().is_none());
    }

    #[test]
    fn settings_are_validated() {
        let mut state = AppState::new();
        let mut settings = Settings::default();
        settings.start_of_week = 9;
        assert!(matches!(state.update_settings(settings), Err(StateError::InvalidSettings(_))));

        let settings = Settings { day_shift_hours: 10.0, ..Settings::default() };
        state.update_settings(settings.clone()).unwrap();
        assert_eq!(state.settings(), &settings);
    }

    #[test]
    fn find_employee_by_id_or_name() {
        let (state, ids) = state_with(&["Anna Petrova"]);
        assert_eq!(state.find_employee(&ids[0]).unwrap().name, "Anna Petrova");
        assert_eq!(state.find_employee(" anna petrova ").unwrap().id, ids[0]);
        assert!(state.find_employee("Nobody").is_none());
    }
}
