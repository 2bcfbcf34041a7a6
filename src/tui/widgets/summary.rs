use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::aggregate::MonthlySummary;
use crate::tui::widgets::color::{parse_color, shift_color};
use crate::tui::App;
use crate::utils::{format_currency, format_hours};
use crate::ShiftType;

/// Label/value rows of a monthly summary
pub fn summary_rows(summary: &MonthlySummary, currency: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Worked days", summary.worked_days.to_string()),
        ("Total hours", format_hours(summary.total_hours)),
        ("Day hours", format_hours(summary.day_hours)),
        ("Night hours", format_hours(summary.night_hours)),
        ("Custom hours", format_hours(summary.custom_hours)),
        ("Salary", format_currency(summary.salary, currency)),
    ]
}

/// Side panel of the Personal tab: the selected employee's month and the focused day
pub fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let muted = parse_color(&active_theme.muted);
    let base = Style::default().fg(fg_color).bg(bg_color);

    let mut lines = Vec::new();
    match app.state.selected_employee() {
        None => lines.push(Line::from(Span::styled(
            "No employee selected. Add one on the Employees tab.",
            Style::default().fg(muted),
        ))),
        Some(employee) => {
            lines.push(Line::from(Span::styled(
                employee.name.clone(),
                base.fg(parse_color(&employee.color)).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("Rate: {}/h", format_currency(employee.rate.round() as i64, &app.config.currency_symbol)),
                Style::default().fg(muted),
            )));
            lines.push(Line::from(""));

            let summary = app
                .state
                .monthly_summary(&employee.id, app.ui.month)
                .unwrap_or_default();
            for (label, value) in summary_rows(&summary, &app.config.currency_symbol) {
                lines.push(Line::from(vec![
                    Span::styled(format!("{:<13}", label), Style::default().fg(muted)),
                    Span::styled(value, base),
                ]));
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                app.ui.cursor.format("%A, %d %B").to_string(),
                base.add_modifier(Modifier::BOLD),
            )));
            match app.state.shift(&employee.id, app.ui.cursor) {
                Some(shift) => {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!(" {} ", shift.kind.label()),
                            Style::default().fg(bg_color).bg(shift_color(shift.kind)),
                        ),
                        Span::styled(format!(" {} h", format_hours(shift.hours)), base),
                    ]));
                    if !shift.notes.is_empty() {
                        lines.push(Line::from(Span::styled(shift.notes.clone(), base)));
                    }
                }
                None => lines.push(Line::from(Span::styled("Day off", Style::default().fg(muted)))),
            }

            let tasks = app.state.tasks_for(&employee.id, app.ui.cursor);
            if !tasks.is_empty() {
                let done = tasks.iter().filter(|t| t.completed).count();
                lines.push(Line::from(Span::styled(
                    format!("Tasks: {}/{} done", done, tasks.len()),
                    base,
                )));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Legend:", Style::default().fg(muted))));
    lines.push(Line::from(
        ShiftType::ALL
            .iter()
            .flat_map(|kind| {
                [
                    Span::styled(format!(" {} ", kind.label()), Style::default().fg(bg_color).bg(shift_color(*kind))),
                    Span::raw(" "),
                ]
            })
            .collect::<Vec<_>>(),
    ));

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Month summary ").style(base))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
