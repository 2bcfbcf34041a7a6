use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::widgets::calendar::shift_label;
use crate::tui::widgets::color::{parse_color, shift_color};
use crate::tui::widgets::popup_area;
use crate::tui::widgets::task_panel::task_line;
use crate::tui::App;
use crate::utils::{format_hours, format_key_binding_for_display};

/// Everyone on shift and every task for the focused day
pub fn render_day_detail(f: &mut Frame, area: Rect, app: &App) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let muted = parse_color(&active_theme.muted);
    let base = Style::default().fg(fg_color).bg(bg_color);
    let date = app.ui.cursor;

    let popup = popup_area(area, 60, 70);
    f.render_widget(Clear, popup);

    let day = app.state.day_summary(date);
    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                "On shift: {}  Hours: {}  Tasks: {}/{} addressed",
                day.employees_on_shift,
                format_hours(day.total_hours),
                day.addressed_tasks,
                day.total_tasks
            ),
            base.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Shifts", Style::default().fg(muted))),
    ];

    let on_shift = app.state.shifts_on(date);
    if on_shift.is_empty() {
        lines.push(Line::from(Span::styled("  nobody", Style::default().fg(muted))));
    }
    for (employee, shift) in on_shift {
        let mut spans = vec![
            Span::styled("  ■ ", Style::default().fg(parse_color(&employee.color))),
            Span::styled(format!("{:<20}", employee.name), base),
            Span::styled(shift_label(shift), Style::default().fg(shift_color(shift.kind))),
        ];
        if !shift.notes.is_empty() {
            spans.push(Span::styled(format!("  {}", shift.notes), base.add_modifier(Modifier::ITALIC)));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Tasks", Style::default().fg(muted))));
    let tasks = app.state.tasks_on(date);
    if tasks.is_empty() {
        lines.push(Line::from(Span::styled("  none", Style::default().fg(muted))));
    }
    for (employee, task) in tasks {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}: ", employee.short_name()), Style::default().fg(parse_color(&employee.color))),
            Span::styled(task_line(task), base),
        ]));
        if !task.report.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("      {}", task.report),
                Style::default().fg(muted).add_modifier(Modifier::ITALIC),
            )));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", date.format("%A, %d %B %Y")))
                .title_alignment(Alignment::Center)
                .title_bottom(Line::styled(
                    format!(
                        " Esc: close • {}: edit shift of {} ",
                        format_key_binding_for_display(&app.config.key_bindings.edit),
                        app.state.selected_employee().map(|e| e.short_name()).unwrap_or("-")
                    ),
                    Style::default().fg(muted),
                ))
                .style(base),
        )
        .style(base)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, popup);
}
