use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::YearMonth;
use crate::models::{Employee, Employees, Schedules, ShiftMap, ShiftType, TaskBuckets};

/// Hours and pay for one employee over one calendar month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub worked_days: u32,
    pub total_hours: f64,
    pub day_hours: f64,
    pub night_hours: f64,
    pub custom_hours: f64,
    pub salary: i64,
}

/// Totals across all employees for a single date
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub employees_on_shift: usize,
    pub total_hours: f64,
    pub total_tasks: usize,
    /// Tasks that are completed or have a non-empty report
    pub addressed_tasks: usize,
    /// Tasks with the completed flag set
    pub completed_tasks: usize,
}

/// One dashboard line: an employee and their month
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRow<'a> {
    pub employee: &'a Employee,
    pub summary: MonthlySummary,
}

/// Sum an employee's shifts over the days of `month`.
///
/// Only days 1..=days_in_month are visited; padding days shown in a calendar
/// grid never count.
pub fn monthly_summary(shifts: Option<&ShiftMap>, rate: f64, month: YearMonth) -> MonthlySummary {
    let mut summary = MonthlySummary::default();
    let Some(shifts) = shifts else {
        return summary;
    };

    for date in month.days() {
        let Some(shift) = shifts.get(&date) else {
            continue;
        };
        summary.worked_days += 1;
        summary.total_hours += shift.hours;
        match shift.kind {
            ShiftType::Day => summary.day_hours += shift.hours,
            ShiftType::Night => summary.night_hours += shift.hours,
            ShiftType::Custom => summary.custom_hours += shift.hours,
        }
    }

    summary.salary = (summary.total_hours * rate).round() as i64;
    summary
}

/// Headcount, hours and task progress across every employee for `date`
pub fn day_summary(
    employees: &Employees,
    schedules: &Schedules,
    tasks: &TaskBuckets,
    date: NaiveDate,
) -> DaySummary {
    let mut summary = DaySummary::default();

    for employee in employees.values() {
        if let Some(shift) = schedules.get(&employee.id).and_then(|s| s.get(&date)) {
            summary.employees_on_shift += 1;
            summary.total_hours += shift.hours;
        }
    }

    for task in tasks
        .iter()
        .filter(|(key, _)| key.date == date)
        .flat_map(|(_, bucket)| bucket.iter())
    {
        summary.total_tasks += 1;
        if task.is_addressed() {
            summary.addressed_tasks += 1;
        }
        if task.completed {
            summary.completed_tasks += 1;
        }
    }

    summary
}

/// Monthly summary for every employee, ordered by name
pub fn dashboard<'a>(
    employees: &'a Employees,
    schedules: &Schedules,
    month: YearMonth,
) -> Vec<DashboardRow<'a>> {
    let mut rows: Vec<DashboardRow<'a>> = employees
        .values()
        .map(|employee| DashboardRow {
            employee,
            summary: monthly_summary(schedules.get(&employee.id), employee.rate, month),
        })
        .collect();
    rows.sort_by_key(|row| row.employee.name.to_lowercase());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, ShiftRecord, TaskKey, TaskRecord};
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn shift(hours: f64, kind: ShiftType) -> ShiftRecord {
        ShiftRecord::new(hours, kind, String::new())
    }

    fn employee(id: &str, name: &str, rate: f64) -> Employee {
        Employee::new(id.to_string(), name.to_string(), rate, "#58a6ff".to_string())
    }

    #[test]
    fn january_summary_splits_hours_by_type() {
        let mut shifts = ShiftMap::new();
        shifts.insert(date("2024-01-05"), shift(12.0, ShiftType::Day));
        shifts.insert(date("2024-01-10"), shift(8.0, ShiftType::Custom));

        let summary = monthly_summary(Some(&shifts), 550.0, YearMonth::new(2024, 0));
        assert_eq!(
            summary,
            MonthlySummary {
                worked_days: 2,
                total_hours: 20.0,
                day_hours: 12.0,
                night_hours: 0.0,
                custom_hours: 8.0,
                salary: 11_000,
            }
        );
    }

    #[test]
    fn padding_days_are_not_counted() {
        let mut shifts = ShiftMap::new();
        // Both dates appear in the January 2024 grid but outside the month
        shifts.insert(date("2024-02-01"), shift(12.0, ShiftType::Night));
        shifts.insert(date("2024-02-04"), shift(12.0, ShiftType::Night));
        shifts.insert(date("2024-01-31"), shift(6.5, ShiftType::Night));

        let summary = monthly_summary(Some(&shifts), 100.0, YearMonth::new(2024, 0));
        assert_eq!(summary.worked_days, 1);
        assert_eq!(summary.night_hours, 6.5);
        assert_eq!(summary.salary, 650);
    }

    #[test]
    fn salary_is_rounded() {
        let mut shifts = ShiftMap::new();
        shifts.insert(date("2024-03-01"), shift(7.5, ShiftType::Custom));
        let summary = monthly_summary(Some(&shifts), 333.3, YearMonth::new(2024, 2));
        // 7.5 * 333.3 = 2499.75
        assert_eq!(summary.salary, 2500);
    }

    #[test]
    fn missing_schedule_is_empty_summary() {
        assert_eq!(
            monthly_summary(None, 500.0, YearMonth::new(2024, 0)),
            MonthlySummary::default()
        );
    }

    #[test]
    fn day_summary_counts_reports_as_addressed() {
        let mut employees = Employees::new();
        employees.insert("a".to_string(), employee("a", "Anna", 500.0));
        employees.insert("b".to_string(), employee("b", "Boris", 500.0));

        let day = date("2024-01-05");
        let mut schedules = Schedules::new();
        schedules.entry("a".to_string()).or_default().insert(day, shift(12.0, ShiftType::Day));
        schedules.entry("b".to_string()).or_default().insert(day, shift(8.0, ShiftType::Custom));
        schedules
            .entry("b".to_string())
            .or_default()
            .insert(date("2024-01-06"), shift(8.0, ShiftType::Custom));

        let mut done = TaskRecord::new("Close the till".to_string());
        done.completed = true;
        let mut reported = TaskRecord::new("Restock".to_string());
        reported.report = "Half done".to_string();
        let open = TaskRecord::new("Clean floor".to_string());

        let mut tasks = TaskBuckets::new();
        tasks.insert(TaskKey::new("a", day), vec![done, reported]);
        tasks.insert(TaskKey::new("b", day), vec![open.clone()]);
        tasks.insert(TaskKey::new("b", date("2024-01-06")), vec![open]);

        let summary = day_summary(&employees, &schedules, &tasks, day);
        assert_eq!(
            summary,
            DaySummary {
                employees_on_shift: 2,
                total_hours: 20.0,
                total_tasks: 3,
                addressed_tasks: 2,
                completed_tasks: 1,
            }
        );
    }

    #[test]
    fn dashboard_is_sorted_by_name() {
        let mut employees = Employees::new();
        employees.insert("1".to_string(), employee("1", "zoe", 100.0));
        employees.insert("2".to_string(), employee("2", "Adam", 100.0));
        let rows = dashboard(&employees, &Schedules::new(), YearMonth::new(2024, 0));
        let names: Vec<&str> = rows.iter().map(|r| r.employee.name.as_str()).collect();
        assert_eq!(names, vec!["Adam", "zoe"]);
    }
}
