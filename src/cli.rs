use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::calendar::{week_start_from_setting, weekday_headers, YearMonth};
use crate::demo::demo_snapshot;
use crate::gateway::{Gateway, StorageError, SyncStatus};
use crate::interchange::{self, InterchangeError};
use crate::models::{Employee, EmployeeId, Settings, ShiftType, Snapshot, TaskKey};
use crate::state::{AppState, ShiftChange, StateError};
use crate::utils::{format_currency, format_hours, parse_date, parse_hours, today};

#[derive(Parser)]
#[command(name = "workshift")]
#[command(about = "WorkShift Manager - shift schedules, tasks and payroll in the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Manage employees
    Employee {
        #[command(subcommand)]
        action: EmployeeCommand,
    },
    /// Set or remove shifts
    Shift {
        #[command(subcommand)]
        action: ShiftCommand,
    },
    /// Manage per-day tasks
    Task {
        #[command(subcommand)]
        action: TaskCommand,
    },
    /// Monthly hours and salary for every employee
    Summary {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },
    /// Shifts, tasks and totals for one day
    Day {
        /// Date (YYYY-MM-DD)
        date: String,
    },
    /// Print a month calendar
    Calendar {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
        /// Show one employee's shift types instead of headcounts
        #[arg(long)]
        employee: Option<String>,
    },
    /// Export all data
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
        /// Output file, defaults to a dated file name in the current directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all data with a JSON backup file
    Import {
        file: PathBuf,
    },
    /// Local backup slot
    Backup {
        #[command(subcommand)]
        action: BackupCommand,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Wipe all data and the backup slot, then reseed demo data
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum EmployeeCommand {
    /// Add an employee
    Add {
        name: String,
        /// Hourly rate, defaults to the configured default rate
        #[arg(long)]
        rate: Option<f64>,
    },
    /// Rename an employee or change their rate
    Edit {
        /// Employee id or name
        employee: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        rate: Option<f64>,
    },
    /// Delete an employee with their shifts and tasks
    Delete {
        /// Employee id or name
        employee: String,
    },
    /// List employees
    List,
}

#[derive(Subcommand)]
pub enum ShiftCommand {
    /// Create or replace a shift; zero hours removes it
    Set {
        /// Employee id or name
        employee: String,
        /// Date (YYYY-MM-DD)
        date: String,
        /// day, night or custom
        #[arg(long = "type", default_value = "day")]
        kind: ShiftType,
        /// Hours, defaults to the configured hours for day and night shifts
        #[arg(long)]
        hours: Option<String>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Remove a shift
    Delete {
        /// Employee id or name
        employee: String,
        /// Date (YYYY-MM-DD)
        date: String,
    },
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Add a task to an employee's day
    Add {
        /// Employee id or name
        employee: String,
        /// Date (YYYY-MM-DD)
        date: String,
        text: String,
    },
    /// Write the report for a task
    Report {
        employee: String,
        date: String,
        /// Task number as shown by `task list`
        number: usize,
        report: String,
    },
    /// Flip a task's completed flag
    Toggle {
        employee: String,
        date: String,
        number: usize,
    },
    /// Delete a task
    Delete {
        employee: String,
        date: String,
        number: usize,
    },
    /// List tasks for a date, optionally for one employee
    List {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Employee id or name
        #[arg(long)]
        employee: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BackupCommand {
    /// Save the current data into the backup slot
    Create,
    /// Replace the current data with the backup slot
    Restore,
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        day_hours: Option<f64>,
        #[arg(long)]
        night_hours: Option<f64>,
        #[arg(long)]
        rate: Option<f64>,
        /// 0 = Sunday .. 6 = Saturday
        #[arg(long)]
        week_start: Option<u8>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    State(#[from] StateError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Interchange(#[from] InterchangeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Task numbers start at 1")]
    InvalidTaskNumber,
    #[error("Refusing to clear all data without --yes")]
    ConfirmationRequired,
}

fn parse_cli_date(input: &str) -> Result<NaiveDate, CliError> {
    parse_date(input)
        .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", input, e)))
}

fn parse_cli_month(input: Option<&str>) -> Result<YearMonth, CliError> {
    match input {
        Some(text) => text
            .parse()
            .map_err(|e| CliError::DateParseError(format!("{}", e))),
        None => Ok(YearMonth::current()),
    }
}

fn resolve_employee(state: &AppState, query: &str) -> Result<EmployeeId, CliError> {
    state
        .find_employee(query)
        .map(|e| e.id.clone())
        .ok_or_else(|| StateError::EmployeeNotFound(query.to_string()).into())
}

fn task_index(number: usize) -> Result<usize, CliError> {
    number.checked_sub(1).ok_or(CliError::InvalidTaskNumber)
}

fn report_sync(status: &SyncStatus) {
    if let Some(warning) = status.warning() {
        eprintln!("Warning: {}", warning);
    }
}

fn persist(state: &AppState, gateway: &Gateway) -> Result<(), CliError> {
    let status = gateway.save(&state.snapshot())?;
    report_sync(&status);
    Ok(())
}

// ----- employees -----

pub fn handle_employee(
    action: EmployeeCommand,
    state: &mut AppState,
    gateway: &Gateway,
) -> Result<(), CliError> {
    match action {
        EmployeeCommand::Add { name, rate } => {
            let id = state.add_employee(&name, rate)?;
            persist(state, gateway)?;
            println!("Employee added successfully (ID: {})", id);
        }
        EmployeeCommand::Edit { employee, name, rate } => {
            let id = resolve_employee(state, &employee)?;
            let current = state
                .employee(&id)
                .cloned()
                .ok_or_else(|| StateError::EmployeeNotFound(employee.clone()))?;
            state.edit_employee(
                &id,
                name.as_deref().unwrap_or(&current.name),
                rate.unwrap_or(current.rate),
            )?;
            persist(state, gateway)?;
            println!("Employee updated successfully");
        }
        EmployeeCommand::Delete { employee } => {
            let id = resolve_employee(state, &employee)?;
            let removed = state.delete_employee(&id)?;
            persist(state, gateway)?;
            println!("Employee '{}' deleted successfully", removed.name);
        }
        EmployeeCommand::List => {
            print!("{}", employee_table(state));
        }
    }
    Ok(())
}

pub fn employee_table(state: &AppState) -> String {
    let mut out = String::new();
    let employees = state.employees_by_name();
    if employees.is_empty() {
        out.push_str("No employees\n");
        return out;
    }
    let _ = writeln!(out, "{:<32}  {:<24}  {:>10}", "ID", "Name", "Rate/h");
    for employee in employees {
        let _ = writeln!(
            out,
            "{:<32}  {:<24}  {:>10}",
            employee.id, employee.name, employee.rate
        );
    }
    out
}

// ----- shifts -----

pub fn handle_shift(
    action: ShiftCommand,
    state: &mut AppState,
    gateway: &Gateway,
) -> Result<(), CliError> {
    match action {
        ShiftCommand::Set {
            employee,
            date,
            kind,
            hours,
            notes,
        } => {
            let id = resolve_employee(state, &employee)?;
            let date = parse_cli_date(&date)?;
            state.select_employee(&id)?;
            let hours = hours.as_deref().map(parse_hours);
            match state.set_shift(date, hours, kind, &notes)? {
                ShiftChange::Saved => {
                    persist(state, gateway)?;
                    println!("Shift saved successfully");
                }
                ShiftChange::Removed => {
                    report_sync(&gateway.delete_shift(&id, date)?);
                    println!("Shift removed successfully");
                }
                ShiftChange::NothingToRemove => println!("No shift on {}", date),
            }
        }
        ShiftCommand::Delete { employee, date } => {
            let id = resolve_employee(state, &employee)?;
            let date = parse_cli_date(&date)?;
            state.select_employee(&id)?;
            match state.remove_shift(date)? {
                ShiftChange::NothingToRemove => println!("No shift on {}", date),
                _ => {
                    report_sync(&gateway.delete_shift(&id, date)?);
                    println!("Shift removed successfully");
                }
            }
        }
    }
    Ok(())
}

// ----- tasks -----

pub fn handle_task(action: TaskCommand, state: &mut AppState, gateway: &Gateway) -> Result<(), CliError> {
    match action {
        TaskCommand::Add { employee, date, text } => {
            let id = resolve_employee(state, &employee)?;
            let date = parse_cli_date(&date)?;
            let index = state.add_task(&id, date, &text)?;
            persist(state, gateway)?;
            println!("Task #{} added successfully", index + 1);
        }
        TaskCommand::Report {
            employee,
            date,
            number,
            report,
        } => {
            let key = TaskKey::new(resolve_employee(state, &employee)?, parse_cli_date(&date)?);
            state.update_task_report(&key, task_index(number)?, &report)?;
            persist(state, gateway)?;
            println!("Report saved successfully");
        }
        TaskCommand::Toggle {
            employee,
            date,
            number,
        } => {
            let key = TaskKey::new(resolve_employee(state, &employee)?, parse_cli_date(&date)?);
            let completed = state.toggle_task(&key, task_index(number)?)?;
            persist(state, gateway)?;
            println!(
                "Task #{} marked {}",
                number,
                if completed { "completed" } else { "not completed" }
            );
        }
        TaskCommand::Delete {
            employee,
            date,
            number,
        } => {
            let key = TaskKey::new(resolve_employee(state, &employee)?, parse_cli_date(&date)?);
            let removed = state.delete_task(&key, task_index(number)?)?;
            persist(state, gateway)?;
            println!("Task '{}' deleted successfully", removed.text);
        }
        TaskCommand::List { date, employee } => {
            let date = match date {
                Some(d) => parse_cli_date(&d)?,
                None => today(),
            };
            let only = employee
                .as_deref()
                .map(|query| resolve_employee(state, query))
                .transpose()?;
            print!("{}", task_listing(state, date, only.as_deref()));
        }
    }
    Ok(())
}

pub fn task_listing(state: &AppState, date: NaiveDate, employee_id: Option<&str>) -> String {
    let mut out = String::new();
    for employee in state.employees_by_name() {
        if employee_id.is_some_and(|id| id != employee.id) {
            continue;
        }
        let tasks = state.tasks_for(&employee.id, date);
        if tasks.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{} ({})", employee.name, date);
        for (i, task) in tasks.iter().enumerate() {
            let mark = if task.completed { "x" } else { " " };
            let _ = writeln!(out, "  {}. [{}] {}", i + 1, mark, task.text);
            if !task.report.trim().is_empty() {
                let _ = writeln!(out, "       report: {}", task.report);
            }
        }
    }
    if out.is_empty() {
        let _ = writeln!(out, "No tasks on {}", date);
    }
    out
}

// ----- read-only views -----

pub fn handle_summary(month: Option<String>, state: &AppState, currency: &str) -> Result<(), CliError> {
    let month = parse_cli_month(month.as_deref())?;
    print!("{}", summary_table(state, month, currency));
    Ok(())
}

pub fn summary_table(state: &AppState, month: YearMonth, currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", month.title());
    let _ = writeln!(
        out,
        "{:<24} {:>5} {:>8} {:>8} {:>8} {:>8} {:>14}",
        "Employee", "Days", "Hours", "Day", "Night", "Custom", "Salary"
    );
    for row in state.dashboard(month) {
        let s = &row.summary;
        let _ = writeln!(
            out,
            "{:<24} {:>5} {:>8} {:>8} {:>8} {:>8} {:>14}",
            row.employee.name,
            s.worked_days,
            format_hours(s.total_hours),
            format_hours(s.day_hours),
            format_hours(s.night_hours),
            format_hours(s.custom_hours),
            format_currency(s.salary, currency)
        );
    }
    out
}

pub fn handle_day(date: String, state: &AppState) -> Result<(), CliError> {
    let date = parse_cli_date(&date)?;
    print!("{}", day_report(state, date));
    Ok(())
}

pub fn day_report(state: &AppState, date: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", date.format("%A, %d %B %Y"));

    let shifts = state.shifts_on(date);
    if shifts.is_empty() {
        out.push_str("No shifts\n");
    }
    for (employee, shift) in shifts {
        let _ = write!(
            out,
            "  {:<24} {:<7} {:>5}h",
            employee.name,
            shift.kind.label(),
            format_hours(shift.hours)
        );
        if !shift.notes.is_empty() {
            let _ = write!(out, "  {}", shift.notes);
        }
        out.push('\n');
    }

    let tasks = state.tasks_on(date);
    if !tasks.is_empty() {
        out.push_str("Tasks\n");
    }
    for (employee, task) in tasks {
        let mark = if task.completed { "x" } else { " " };
        let _ = writeln!(out, "  [{}] {}: {}", mark, employee.short_name(), task.text);
    }

    let summary = state.day_summary(date);
    let _ = writeln!(
        out,
        "On shift: {}  Hours: {}  Tasks: {}/{} addressed",
        summary.employees_on_shift,
        format_hours(summary.total_hours),
        summary.addressed_tasks,
        summary.total_tasks
    );
    out
}

pub fn handle_calendar(
    month: Option<String>,
    employee: Option<String>,
    state: &AppState,
) -> Result<(), CliError> {
    let month = parse_cli_month(month.as_deref())?;
    let employee = match employee {
        Some(query) => {
            let id = resolve_employee(state, &query)?;
            state.employee(&id)
        }
        None => None,
    };
    print!("{}", calendar_text(state, month, employee));
    Ok(())
}

/// Month grid as text. With an employee each day is marked D, N or C by
/// shift type; without one it shows how many people are on shift.
pub fn calendar_text(state: &AppState, month: YearMonth, employee: Option<&Employee>) -> String {
    let week_start = week_start_from_setting(state.settings().start_of_week);
    let mut out = String::new();
    match employee {
        Some(e) => {
            let _ = writeln!(out, "{} - {}", month.title(), e.name);
        }
        None => {
            let _ = writeln!(out, "{}", month.title());
        }
    }
    for header in weekday_headers(week_start) {
        let _ = write!(out, "{:<5}", header);
    }
    out.push('\n');

    for week in month.grid_starting(week_start).chunks(7) {
        for date in week {
            if !month.contains(*date) {
                out.push_str("  .  ");
                continue;
            }
            let marker = match employee {
                Some(e) => state
                    .shift(&e.id, *date)
                    .map(|s| match s.kind {
                        ShiftType::Day => 'D',
                        ShiftType::Night => 'N',
                        ShiftType::Custom => 'C',
                    })
                    .unwrap_or(' '),
                None => match state.shifts_on(*date).len() {
                    0 => ' ',
                    n @ 1..=9 => char::from_digit(n as u32, 10).unwrap_or('+'),
                    _ => '+',
                },
            };
            let _ = write!(out, "{:>3}{} ", date.day(), marker);
        }
        out.push('\n');
    }
    out
}

// ----- files -----

pub fn handle_export(format: ExportFormat, output: Option<PathBuf>, state: &AppState) -> Result<(), CliError> {
    let snapshot = state.snapshot();
    let (contents, default_name) = match format {
        ExportFormat::Json => (
            interchange::export_json(&snapshot, Utc::now())?,
            interchange::json_export_file_name(today()),
        ),
        ExportFormat::Csv => (
            interchange::export_csv(&snapshot),
            interchange::csv_export_file_name(today()),
        ),
    };
    let path = output.unwrap_or_else(|| PathBuf::from(default_name));
    fs::write(&path, contents)?;
    println!("Exported successfully to {}", path.display());
    Ok(())
}

pub fn handle_import(file: PathBuf, state: &mut AppState, gateway: &Gateway) -> Result<(), CliError> {
    let text = fs::read_to_string(&file)?;
    let imported = interchange::import_json(&text)?;
    let snapshot = imported.into_snapshot(state.settings());
    let (employees, buckets) = (snapshot.employees.len(), snapshot.tasks.len());
    state.replace(snapshot);
    persist(state, gateway)?;
    println!(
        "Imported successfully: {} employees, {} task days",
        employees, buckets
    );
    Ok(())
}

pub fn handle_backup(action: BackupCommand, state: &mut AppState, gateway: &Gateway) -> Result<(), CliError> {
    match action {
        BackupCommand::Create => {
            let backup = gateway.create_backup(&state.snapshot())?;
            println!(
                "Backup created successfully ({})",
                backup.backup_date.format("%Y-%m-%d %H:%M")
            );
        }
        BackupCommand::Restore => {
            let backup = gateway.restore_backup()?;
            state.replace(backup.snapshot);
            persist(state, gateway)?;
            println!(
                "Backup from {} restored successfully",
                backup.backup_date.format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}

// ----- settings -----

pub fn handle_settings(action: SettingsCommand, state: &mut AppState, gateway: &Gateway) -> Result<(), CliError> {
    match action {
        SettingsCommand::Show => print!("{}", settings_text(state.settings())),
        SettingsCommand::Set {
            day_hours,
            night_hours,
            rate,
            week_start,
        } => {
            let current = state.settings().clone();
            state.update_settings(Settings {
                day_shift_hours: day_hours.unwrap_or(current.day_shift_hours),
                night_shift_hours: night_hours.unwrap_or(current.night_shift_hours),
                default_hourly_rate: rate.unwrap_or(current.default_hourly_rate),
                start_of_week: week_start.unwrap_or(current.start_of_week),
            })?;
            persist(state, gateway)?;
            println!("Settings saved successfully");
        }
    }
    Ok(())
}

pub fn settings_text(settings: &Settings) -> String {
    format!(
        "Day shift hours:     {}\nNight shift hours:   {}\nDefault hourly rate: {}\nStart of week:       {}\n",
        settings.day_shift_hours,
        settings.night_shift_hours,
        settings.default_hourly_rate,
        week_start_from_setting(settings.start_of_week)
    )
}

pub fn handle_clear(yes: bool, state: &mut AppState, gateway: &Gateway) -> Result<(), CliError> {
    if !yes {
        return Err(CliError::ConfirmationRequired);
    }
    gateway.clear_backup()?;
    state.replace(clear_all_snapshot());
    persist(state, gateway)?;
    println!("All data cleared successfully");
    Ok(())
}

/// Fresh demo data with default settings
pub fn clear_all_snapshot() -> Snapshot {
    demo_snapshot(today())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn setup() -> (AppState, Gateway) {
        let gateway = Gateway::new(Database::open_in_memory().unwrap()).seed_demo(false);
        let mut state = AppState::new();
        handle_employee(
            EmployeeCommand::Add {
                name: "Ivan Petrov".to_string(),
                rate: Some(500.0),
            },
            &mut state,
            &gateway,
        )
        .unwrap();
        (state, gateway)
    }

    #[test]
    fn cli_parses_nested_subcommands() {
        let cli = Cli::try_parse_from([
            "workshift", "shift", "set", "Ivan", "2024-01-05", "--type", "night", "--hours", "10",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Shift {
                action: ShiftCommand::Set { kind, hours, .. },
            }) => {
                assert_eq!(kind, ShiftType::Night);
                assert_eq!(hours.as_deref(), Some("10"));
            }
            _ => panic!("expected shift set"),
        }
        assert!(Cli::try_parse_from(["workshift", "shift", "set", "Ivan", "2024-01-05", "--type", "evening"]).is_err());
    }

    #[test]
    fn shift_set_with_zero_hours_removes() {
        let (mut state, gateway) = setup();
        let set = |hours: &str| ShiftCommand::Set {
            employee: "ivan petrov".to_string(),
            date: "2024-01-05".to_string(),
            kind: ShiftType::Day,
            hours: Some(hours.to_string()),
            notes: String::new(),
        };
        handle_shift(set("12"), &mut state, &gateway).unwrap();
        let id = state.find_employee("Ivan Petrov").unwrap().id.clone();
        assert!(state.shift(&id, date("2024-01-05")).is_some());

        handle_shift(set("0"), &mut state, &gateway).unwrap();
        assert!(state.shift(&id, date("2024-01-05")).is_none());
        assert!(gateway.load().unwrap().snapshot.schedules[&id].is_empty());
    }

    #[test]
    fn task_numbers_are_one_based() {
        let (mut state, gateway) = setup();
        handle_task(
            TaskCommand::Add {
                employee: "Ivan Petrov".to_string(),
                date: "2024-01-05".to_string(),
                text: "Inventory".to_string(),
            },
            &mut state,
            &gateway,
        )
        .unwrap();

        let toggle = |number| TaskCommand::Toggle {
            employee: "Ivan Petrov".to_string(),
            date: "2024-01-05".to_string(),
            number,
        };
        assert!(matches!(
            handle_task(toggle(0), &mut state, &gateway),
            Err(CliError::InvalidTaskNumber)
        ));
        assert!(matches!(
            handle_task(toggle(2), &mut state, &gateway),
            Err(CliError::State(StateError::TaskNotFound { .. }))
        ));
        handle_task(toggle(1), &mut state, &gateway).unwrap();

        let listing = task_listing(&state, date("2024-01-05"), None);
        assert!(listing.contains("1. [x] Inventory"));
    }

    #[test]
    fn unknown_employee_is_reported() {
        let (mut state, gateway) = setup();
        let err = handle_employee(
            EmployeeCommand::Delete {
                employee: "Nobody".to_string(),
            },
            &mut state,
            &gateway,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Employee not found: Nobody");
    }

    #[test]
    fn summary_table_shows_salary() {
        let (mut state, _gateway) = setup();
        state.set_shift(date("2024-01-05"), Some(12.0), ShiftType::Day, "").unwrap();
        let table = summary_table(&state, "2024-01".parse().unwrap(), "₽");
        assert!(table.starts_with("January 2024\n"));
        assert!(table.contains("6 000 ₽"));
    }

    #[test]
    fn calendar_marks_shift_types() {
        let (mut state, _gateway) = setup();
        state.set_shift(date("2024-01-10"), Some(8.0), ShiftType::Custom, "").unwrap();
        let month: YearMonth = "2024-01".parse().unwrap();

        let employee = state.selected_employee().cloned().unwrap();
        let text = calendar_text(&state, month, Some(&employee));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1].trim_end(), "Mon  Tue  Wed  Thu  Fri  Sat  Sun");
        // 2024-01-01 is a Monday, so the 10th sits in the second week
        assert!(lines[3].contains(" 10C "));
        assert_eq!(lines.len(), 2 + 6);

        let all = calendar_text(&state, month, None);
        assert!(all.contains(" 101 "));
    }

    #[test]
    fn day_report_lists_shifts_and_totals() {
        let (mut state, _gateway) = setup();
        let id = state.selected_employee().unwrap().id.clone();
        state.set_shift(date("2024-01-05"), None, ShiftType::Night, "late").unwrap();
        state.add_task(&id, date("2024-01-05"), "Lock up").unwrap();

        let report = day_report(&state, date("2024-01-05"));
        assert!(report.starts_with("Friday, 05 January 2024\n"));
        assert!(report.contains("Night"));
        assert!(report.contains("late"));
        assert!(report.contains("On shift: 1  Hours: 12.0  Tasks: 0/1 addressed"));
    }

    #[test]
    fn import_replaces_state_and_clear_needs_confirmation() {
        let (mut state, gateway) = setup();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("backup.json");
        fs::write(&file, r#"{"employees": {}, "schedules": {}, "tasks": {}}"#).unwrap();

        handle_import(file, &mut state, &gateway).unwrap();
        assert!(state.employees().is_empty());

        assert!(matches!(
            handle_clear(false, &mut state, &gateway),
            Err(CliError::ConfirmationRequired)
        ));
        handle_clear(true, &mut state, &gateway).unwrap();
        assert_eq!(state.employees().len(), 3);
    }

    #[test]
    fn bad_import_changes_nothing() {
        let (mut state, gateway) = setup();
        let before = state.clone();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.json");
        fs::write(&file, r#"{"employees": {}}"#).unwrap();

        assert!(handle_import(file, &mut state, &gateway).is_err());
        assert_eq!(state, before);
    }
}
