use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::aggregate::DashboardRow;
use crate::tui::widgets::color::parse_color;
use crate::tui::App;
use crate::utils::{format_currency, format_hours};

/// (days, hours, salary) summed over every row
pub fn totals(rows: &[DashboardRow<'_>]) -> (u32, f64, i64) {
    rows.iter().fold((0, 0.0, 0), |(days, hours, salary), row| {
        (
            days + row.summary.worked_days,
            hours + row.summary.total_hours,
            salary + row.summary.salary,
        )
    })
}

/// Side panel of the General tab: every employee's month plus the focused day
pub fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let muted = parse_color(&active_theme.muted);
    let base = Style::default().fg(fg_color).bg(bg_color);
    let currency = &app.config.currency_symbol;

    let [table_area, day_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(8)]).areas(area);

    let rows = app.state.dashboard(app.ui.month);
    let (days, hours, salary) = totals(&rows);

    let mut table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(Span::styled(
                    row.employee.short_name().to_string(),
                    Style::default().fg(parse_color(&row.employee.color)),
                )),
                Cell::from(row.summary.worked_days.to_string()),
                Cell::from(format_hours(row.summary.total_hours)),
                Cell::from(format_currency(row.summary.salary, currency)),
            ])
        })
        .collect();
    table_rows.push(
        Row::new(vec![
            Cell::from("Total"),
            Cell::from(days.to_string()),
            Cell::from(format_hours(hours)),
            Cell::from(format_currency(salary, currency)),
        ])
        .style(base.add_modifier(Modifier::BOLD)),
    );

    let table = Table::new(
        table_rows,
        [
            Constraint::Fill(2),
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Fill(2),
        ],
    )
    .header(Row::new(vec!["Name", "Days", "Hours", "Salary"]).style(Style::default().fg(muted)))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", app.ui.month.title()))
            .style(base),
    )
    .style(base);
    f.render_widget(table, table_area);

    let day = app.state.day_summary(app.ui.cursor);
    let lines = vec![
        Line::from(Span::styled(
            app.ui.cursor.format("%A, %d %B").to_string(),
            base.add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("On shift: {}", day.employees_on_shift)),
        Line::from(format!("Hours: {}", format_hours(day.total_hours))),
        Line::from(format!("Tasks: {}/{} addressed", day.addressed_tasks, day.total_tasks)),
        Line::from(Span::styled("Enter: day details", Style::default().fg(muted))),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Selected day ").style(base))
        .style(base);
    f.render_widget(paragraph, day_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MonthlySummary;
    use crate::models::Employee;

    #[test]
    fn totals_sum_every_row() {
        let anna = Employee::new("a".into(), "Anna".into(), 500.0, "#fff".into());
        let boris = Employee::new("b".into(), "Boris".into(), 550.0, "#fff".into());
        let rows = vec![
            DashboardRow {
                employee: &anna,
                summary: MonthlySummary { worked_days: 2, total_hours: 24.0, salary: 12000, ..Default::default() },
            },
            DashboardRow {
                employee: &boris,
                summary: MonthlySummary { worked_days: 1, total_hours: 7.5, salary: 4125, ..Default::default() },
            },
        ];
        assert_eq!(totals(&rows), (3, 31.5, 16125));
        assert_eq!(totals(&[]), (0, 0.0, 0));
    }
}
