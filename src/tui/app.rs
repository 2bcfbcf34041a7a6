use chrono::{NaiveDate, TimeDelta};
use ratatui::widgets::ListState;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, warn};

use crate::calendar::YearMonth;
use crate::gateway::{Gateway, LoadSource, SyncStatus};
use crate::models::{EmployeeId, ShiftType, TaskKey, TaskRecord};
use crate::state::{AppState, ShiftChange, StateError};
use crate::tui::widgets::editor::LineEditor;
use crate::utils::{format_number, parse_hours, today};
use crate::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Personal,
    General,
    Tasks,
    Employees,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Personal, Tab::General, Tab::Tasks, Tab::Employees];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Personal => "Personal",
            Tab::General => "General",
            Tab::Tasks => "Tasks",
            Tab::Employees => "Employees",
        }
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn is_calendar(&self) -> bool {
        matches!(self, Tab::Personal | Tab::General)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Help,
    ShiftEditor,
    DayDetail,
    Input,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftField {
    Type,
    Hours,
    Notes,
}

impl ShiftField {
    pub fn next(&self) -> Self {
        match self {
            ShiftField::Type => ShiftField::Hours,
            ShiftField::Hours => ShiftField::Notes,
            ShiftField::Notes => ShiftField::Type,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ShiftField::Type => ShiftField::Notes,
            ShiftField::Hours => ShiftField::Type,
            ShiftField::Notes => ShiftField::Hours,
        }
    }
}

/// Shift editor popup for the selected employee on one date
#[derive(Debug, Clone)]
pub struct ShiftForm {
    pub date: NaiveDate,
    pub employee_name: String,
    pub kind: ShiftType,
    pub hours: LineEditor,
    pub notes: LineEditor,
    pub current_field: ShiftField,
    /// A shift already exists, so saving replaces it
    pub existing: bool,
}

/// What the text-input popup will do with its value
#[derive(Debug, Clone, PartialEq)]
pub enum InputPurpose {
    AddEmployeeName,
    AddEmployeeRate { name: String },
    EditEmployeeName { id: EmployeeId },
    EditEmployeeRate { id: EmployeeId, name: String },
    AddTask,
    TaskReport { index: usize },
}

#[derive(Debug, Clone)]
pub struct InputState {
    pub purpose: InputPurpose,
    pub title: String,
    pub editor: LineEditor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    DeleteEmployee { id: EmployeeId, name: String },
    DeleteTask { index: usize, text: String },
    DeleteShift { date: NaiveDate },
}

impl ConfirmAction {
    pub fn message(&self) -> String {
        match self {
            ConfirmAction::DeleteEmployee { name, .. } => {
                format!("Delete {} with all of their shifts and tasks?", name)
            }
            ConfirmAction::DeleteTask { text, .. } => format!("Delete task \"{}\"?", text),
            ConfirmAction::DeleteShift { date } => {
                format!("Remove the shift on {}?", date.format("%d.%m.%Y"))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub current_tab: Tab,
    pub mode: Mode,
    pub month: YearMonth,
    /// Focused calendar day; also the date of the Tasks tab
    pub cursor: NaiveDate,
    pub employee_list: ListState,
    pub task_list: ListState,
}

impl UiState {
    fn new(today: NaiveDate) -> Self {
        Self {
            current_tab: Tab::Personal,
            mode: Mode::View,
            month: YearMonth::from_date(today),
            cursor: today,
            employee_list: ListState::default(),
            task_list: ListState::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModalState {
    pub shift_form: Option<ShiftForm>,
    pub input: Option<InputState>,
    pub confirm: Option<ConfirmAction>,
    /// 0 = confirm, 1 = cancel
    pub confirm_selection: usize,
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

pub struct App {
    // Core infrastructure
    pub config: Config,
    pub config_path: PathBuf,
    pub gateway: Gateway,

    pub state: AppState,

    // Grouped state
    pub ui: UiState,
    pub modals: ModalState,
    pub status: StatusState,
}

impl App {
    pub fn new(
        config: Config,
        config_path: PathBuf,
        gateway: Gateway,
        state: AppState,
        source: LoadSource,
    ) -> Self {
        let mut app = Self {
            config,
            config_path,
            gateway,
            state,
            ui: UiState::new(today()),
            modals: ModalState::default(),
            status: StatusState::default(),
        };
        app.state.ensure_selection();
        app.sync_employee_list();
        app.set_status_message(format!("Loaded from {}", source));
        app
    }

    // ----- status bar -----

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 3 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }

    fn report_error(&mut self, err: StateError) {
        self.set_status_message(err.to_string());
    }

    // ----- persistence -----

    fn apply_sync(&mut self, status: SyncStatus, success: String) {
        match status.warning() {
            Some(warning) => self.set_status_message(warning),
            None => self.set_status_message(success),
        }
    }

    /// Save the whole state. In-memory changes are kept even when saving fails.
    fn persist(&mut self, success: impl Into<String>) {
        match self.gateway.save(&self.state.snapshot()) {
            Ok(status) => self.apply_sync(status, success.into()),
            Err(e) => {
                error!(error = %e, "failed to save state");
                self.set_status_message(format!("Save failed: {}", e));
            }
        }
    }

    fn persist_shift_removal(&mut self, employee_id: &str, date: NaiveDate) {
        match self.gateway.delete_shift(employee_id, date) {
            Ok(status) => self.apply_sync(status, "Shift removed".to_string()),
            Err(e) => {
                error!(error = %e, "failed to delete shift");
                self.set_status_message(format!("Save failed: {}", e));
            }
        }
    }

    // ----- navigation -----

    pub fn switch_tab(&mut self, tab: Tab) {
        self.ui.current_tab = tab;
        if tab == Tab::Tasks {
            self.clamp_task_selection();
        }
        if tab == Tab::Employees {
            self.sync_employee_list();
        }
    }

    pub fn next_tab(&mut self) {
        let next = (self.ui.current_tab.index() + 1) % Tab::ALL.len();
        self.switch_tab(Tab::ALL[next]);
    }

    pub fn prev_tab(&mut self) {
        let prev = (self.ui.current_tab.index() + Tab::ALL.len() - 1) % Tab::ALL.len();
        self.switch_tab(Tab::ALL[prev]);
    }

    /// Move the focused day; the displayed month follows it
    pub fn move_cursor(&mut self, days: i64) {
        if let Some(date) = self.ui.cursor.checked_add_signed(TimeDelta::days(days)) {
            self.ui.cursor = date;
            self.ui.month = YearMonth::from_date(date);
            self.clamp_task_selection();
        }
    }

    pub fn prev_month(&mut self) {
        self.show_month(self.ui.month.prev());
    }

    pub fn next_month(&mut self) {
        self.show_month(self.ui.month.next());
    }

    fn show_month(&mut self, month: YearMonth) {
        self.ui.month = month;
        self.ui.cursor = if month.contains(today()) {
            today()
        } else {
            month.first_day()
        };
        self.clamp_task_selection();
    }

    pub fn go_today(&mut self) {
        self.ui.cursor = today();
        self.ui.month = YearMonth::from_date(self.ui.cursor);
        self.clamp_task_selection();
    }

    /// Cycle the selected employee by name order
    pub fn cycle_employee(&mut self, forward: bool) {
        let ids: Vec<EmployeeId> = self
            .state
            .employees_by_name()
            .into_iter()
            .map(|e| e.id.clone())
            .collect();
        if ids.is_empty() {
            self.set_status_message("No employees yet".to_string());
            return;
        }
        let current = self
            .state
            .selected_employee()
            .and_then(|e| ids.iter().position(|id| *id == e.id));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % ids.len(),
            (Some(i), false) => (i + ids.len() - 1) % ids.len(),
        };
        if let Err(e) = self.state.select_employee(&ids[next]) {
            self.report_error(e);
        }
        self.sync_employee_list();
        self.clamp_task_selection();
    }

    // ----- employees tab -----

    /// Point the employee list at the selected employee
    pub fn sync_employee_list(&mut self) {
        let selected = self.state.selected_employee().map(|e| e.id.clone());
        let position = selected.and_then(|id| {
            self.state
                .employees_by_name()
                .iter()
                .position(|e| e.id == id)
        });
        self.ui.employee_list.select(position.or(
            (!self.state.employees().is_empty()).then_some(0),
        ));
    }

    pub fn employee_list_move(&mut self, down: bool) {
        let count = self.state.employees().len();
        if count == 0 {
            return;
        }
        let current = self.ui.employee_list.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(count - 1)
        } else {
            current.saturating_sub(1)
        };
        self.ui.employee_list.select(Some(next));
    }

    fn highlighted_employee(&self) -> Option<(EmployeeId, String, f64)> {
        let index = self.ui.employee_list.selected()?;
        self.state
            .employees_by_name()
            .get(index)
            .map(|e| (e.id.clone(), e.name.clone(), e.rate))
    }

    pub fn select_highlighted_employee(&mut self) {
        if let Some((id, name, _)) = self.highlighted_employee() {
            match self.state.select_employee(&id) {
                Ok(()) => self.set_status_message(format!("Selected {}", name)),
                Err(e) => self.report_error(e),
            }
            self.clamp_task_selection();
        }
    }

    pub fn start_add_employee(&mut self) {
        self.open_input(InputPurpose::AddEmployeeName, "New employee: name", "");
    }

    pub fn start_edit_employee(&mut self) {
        match self.highlighted_employee() {
            Some((id, name, _)) => {
                self.open_input(InputPurpose::EditEmployeeName { id }, "Edit employee: name", &name)
            }
            None => self.set_status_message("No employee to edit".to_string()),
        }
    }

    pub fn request_delete_employee(&mut self) {
        match self.highlighted_employee() {
            Some((id, name, _)) => self.open_confirm(ConfirmAction::DeleteEmployee { id, name }),
            None => self.set_status_message("No employee to delete".to_string()),
        }
    }

    // ----- shifts -----

    /// Open the shift editor for the selected employee on the focused day
    pub fn open_shift_editor(&mut self) {
        let Some(employee) = self.state.selected_employee() else {
            self.report_error(StateError::NoEmployeeSelected);
            return;
        };
        let date = self.ui.cursor;
        let employee_name = employee.name.clone();
        let form = match self.state.shift(&employee.id, date) {
            Some(shift) => ShiftForm {
                date,
                employee_name,
                kind: shift.kind,
                hours: LineEditor::from_string(format_number(shift.hours)),
                notes: LineEditor::from_string(shift.notes.clone()),
                current_field: ShiftField::Type,
                existing: true,
            },
            None => ShiftForm {
                date,
                employee_name,
                kind: ShiftType::Day,
                hours: LineEditor::from_string(
                    self.state
                        .settings()
                        .default_hours(ShiftType::Day)
                        .map(format_number)
                        .unwrap_or_default(),
                ),
                notes: LineEditor::new(),
                current_field: ShiftField::Type,
                existing: false,
            },
        };
        self.modals.shift_form = Some(form);
        self.ui.mode = Mode::ShiftEditor;
    }

    /// Step the shift type. Day and night shifts refill the hours with their default.
    pub fn cycle_shift_type(&mut self, forward: bool) {
        let settings = self.state.settings().clone();
        if let Some(form) = self.modals.shift_form.as_mut() {
            form.kind = if forward {
                form.kind.next()
            } else {
                form.kind.next().next()
            };
            if let Some(hours) = settings.default_hours(form.kind) {
                form.hours.set_text(format_number(hours));
            }
        }
    }

    pub fn cancel_shift_editor(&mut self) {
        self.modals.shift_form = None;
        self.ui.mode = Mode::View;
    }

    /// Save the editor. Blank hours use the type's default; zero or invalid hours
    /// remove the shift.
    pub fn save_shift_form(&mut self) {
        let Some(form) = self.modals.shift_form.take() else {
            return;
        };
        self.ui.mode = Mode::View;

        let hours = if form.hours.text().trim().is_empty() {
            None
        } else {
            Some(parse_hours(form.hours.text()))
        };
        let employee_id = self.state.selected_employee().map(|e| e.id.clone());

        match self.state.set_shift(form.date, hours, form.kind, form.notes.text()) {
            Ok(ShiftChange::Saved) => self.persist(format!(
                "{} shift saved for {}",
                form.kind.label(),
                form.date.format("%d.%m")
            )),
            Ok(ShiftChange::Removed) => {
                if let Some(id) = employee_id {
                    self.persist_shift_removal(&id, form.date);
                }
            }
            Ok(ShiftChange::NothingToRemove) => {
                self.set_status_message("No shift to remove".to_string())
            }
            Err(e) => self.report_error(e),
        }
    }

    pub fn request_delete_shift(&mut self) {
        let Some(employee) = self.state.selected_employee() else {
            self.report_error(StateError::NoEmployeeSelected);
            return;
        };
        if self.state.shift(&employee.id, self.ui.cursor).is_none() {
            self.set_status_message("No shift on this day".to_string());
            return;
        }
        self.open_confirm(ConfirmAction::DeleteShift {
            date: self.ui.cursor,
        });
    }

    pub fn open_day_detail(&mut self) {
        self.ui.mode = Mode::DayDetail;
    }

    // ----- tasks -----

    /// Bucket shown on the Tasks tab: selected employee on the focused day
    pub fn current_task_key(&self) -> Option<TaskKey> {
        self.state
            .selected_employee()
            .map(|e| TaskKey::new(e.id.clone(), self.ui.cursor))
    }

    pub fn current_tasks(&self) -> &[TaskRecord] {
        match self.state.selected_employee() {
            Some(e) => self.state.tasks_for(&e.id, self.ui.cursor),
            None => &[],
        }
    }

    fn clamp_task_selection(&mut self) {
        let count = self.current_tasks().len();
        let selected = match (count, self.ui.task_list.selected()) {
            (0, _) => None,
            (n, Some(i)) => Some(i.min(n - 1)),
            (_, None) => Some(0),
        };
        self.ui.task_list.select(selected);
    }

    pub fn task_list_move(&mut self, down: bool) {
        let count = self.current_tasks().len();
        if count == 0 {
            return;
        }
        let current = self.ui.task_list.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(count - 1)
        } else {
            current.saturating_sub(1)
        };
        self.ui.task_list.select(Some(next));
    }

    pub fn start_add_task(&mut self) {
        if self.state.selected_employee().is_none() {
            self.report_error(StateError::TaskEmployeeRequired);
            return;
        }
        self.open_input(InputPurpose::AddTask, "New task", "");
    }

    pub fn start_task_report(&mut self) {
        let Some(index) = self.ui.task_list.selected() else {
            self.set_status_message("No task selected".to_string());
            return;
        };
        let Some(task) = self.current_tasks().get(index) else {
            return;
        };
        let title = format!("Report: {}", task.text);
        let report = task.report.clone();
        self.open_input(InputPurpose::TaskReport { index }, &title, &report);
    }

    pub fn toggle_selected_task(&mut self) {
        let (Some(key), Some(index)) = (self.current_task_key(), self.ui.task_list.selected()) else {
            return;
        };
        match self.state.toggle_task(&key, index) {
            Ok(true) => self.persist("Task completed"),
            Ok(false) => self.persist("Task reopened"),
            Err(e) => self.report_error(e),
        }
    }

    pub fn request_delete_task(&mut self) {
        let Some(index) = self.ui.task_list.selected() else {
            self.set_status_message("No task selected".to_string());
            return;
        };
        if let Some(task) = self.current_tasks().get(index) {
            let text = task.text.clone();
            self.open_confirm(ConfirmAction::DeleteTask { index, text });
        }
    }

    // ----- text input popup -----

    fn open_input(&mut self, purpose: InputPurpose, title: &str, initial: &str) {
        self.modals.input = Some(InputState {
            purpose,
            title: title.to_string(),
            editor: LineEditor::from_string(initial),
        });
        self.ui.mode = Mode::Input;
    }

    pub fn cancel_input(&mut self) {
        self.modals.input = None;
        self.ui.mode = Mode::View;
    }

    /// Act on the input popup's value. Validation failures keep the popup open.
    pub fn submit_input(&mut self) {
        let Some(input) = self.modals.input.take() else {
            return;
        };
        self.ui.mode = Mode::View;
        let value = input.editor.text().trim().to_string();

        let result = match input.purpose.clone() {
            InputPurpose::AddEmployeeName => {
                // Check the name now so the rate step is not wasted on a bad name
                self.state.validate_name(&value, None).map(|name| {
                    let default_rate = format_number(self.state.settings().default_hourly_rate);
                    self.open_input(
                        InputPurpose::AddEmployeeRate { name },
                        "New employee: rate per hour",
                        &default_rate,
                    );
                })
            }
            InputPurpose::AddEmployeeRate { name } => {
                let rate = if value.is_empty() { None } else { Some(parse_hours(&value)) };
                self.state.add_employee(&name, rate).map(|id| {
                    let _ = self.state.select_employee(&id);
                    self.sync_employee_list();
                    self.persist(format!("Employee {} added", name));
                })
            }
            InputPurpose::EditEmployeeName { id } => match self.state.employee(&id).map(|e| e.rate) {
                Some(rate) => self.state.validate_name(&value, Some(&id)).map(|name| {
                    self.open_input(
                        InputPurpose::EditEmployeeRate { id, name },
                        "Edit employee: rate per hour",
                        &format_number(rate),
                    );
                }),
                None => Err(StateError::EmployeeNotFound(id)),
            },
            InputPurpose::EditEmployeeRate { id, name } => self
                .state
                .edit_employee(&id, &name, parse_hours(&value))
                .map(|()| {
                    self.sync_employee_list();
                    self.persist("Employee updated");
                }),
            InputPurpose::AddTask => {
                let employee_id = self
                    .state
                    .selected_employee()
                    .map(|e| e.id.clone())
                    .unwrap_or_default();
                self.state
                    .add_task(&employee_id, self.ui.cursor, &value)
                    .map(|index| {
                        self.ui.task_list.select(Some(index));
                        self.persist("Task added");
                    })
            }
            InputPurpose::TaskReport { index } => match self.current_task_key() {
                Some(key) => self
                    .state
                    .update_task_report(&key, index, &value)
                    .map(|()| self.persist("Report saved")),
                None => Err(StateError::NoEmployeeSelected),
            },
        };

        if let Err(e) = result {
            warn!(error = %e, "input rejected");
            self.report_error(e);
            // Re-open with what was typed so it can be corrected
            if self.modals.input.is_none() {
                self.modals.input = Some(input);
                self.ui.mode = Mode::Input;
            }
        }
    }

    // ----- confirmation popup -----

    fn open_confirm(&mut self, action: ConfirmAction) {
        self.modals.confirm = Some(action);
        self.modals.confirm_selection = 0;
        self.ui.mode = Mode::Confirm;
    }

    pub fn cancel_confirm(&mut self) {
        self.modals.confirm = None;
        self.ui.mode = Mode::View;
    }

    /// Run the pending action when "confirm" is highlighted, otherwise cancel
    pub fn resolve_confirm(&mut self) {
        let Some(action) = self.modals.confirm.take() else {
            return;
        };
        self.ui.mode = Mode::View;
        if self.modals.confirm_selection != 0 {
            return;
        }

        match action {
            ConfirmAction::DeleteEmployee { id, .. } => match self.state.delete_employee(&id) {
                Ok(employee) => {
                    self.sync_employee_list();
                    self.clamp_task_selection();
                    self.persist(format!("Employee {} deleted", employee.name));
                }
                Err(e) => self.report_error(e),
            },
            ConfirmAction::DeleteTask { index, .. } => {
                let Some(key) = self.current_task_key() else {
                    return;
                };
                match self.state.delete_task(&key, index) {
                    Ok(_) => {
                        self.clamp_task_selection();
                        self.persist("Task deleted");
                    }
                    Err(e) => self.report_error(e),
                }
            }
            ConfirmAction::DeleteShift { date } => {
                let employee_id = self.state.selected_employee().map(|e| e.id.clone());
                match (self.state.remove_shift(date), employee_id) {
                    (Ok(ShiftChange::Removed), Some(id)) => self.persist_shift_removal(&id, date),
                    (Ok(_), _) => self.set_status_message("No shift to remove".to_string()),
                    (Err(e), _) => self.report_error(e),
                }
            }
        }
    }

    // ----- misc -----

    pub fn toggle_help(&mut self) {
        self.ui.mode = if self.ui.mode == Mode::Help {
            Mode::View
        } else {
            Mode::Help
        };
    }

    /// Switch between the light and dark theme and remember the choice
    pub fn toggle_theme(&mut self) {
        let theme = self.config.toggle_theme().to_string();
        match self.config.save_to(&self.config_path) {
            Ok(()) => self.set_status_message(format!("Theme: {}", theme)),
            Err(e) => {
                warn!(error = %e, "failed to save theme");
                self.set_status_message(format!("Theme: {} (not saved: {})", theme, e));
            }
        }
    }
}
