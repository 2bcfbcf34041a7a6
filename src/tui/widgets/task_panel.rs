use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use crate::models::TaskRecord;
use crate::tui::widgets::color::parse_color;
use crate::tui::App;

/// "[x] text" or "[ ] text"
pub fn task_line(task: &TaskRecord) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!("[{}] {}", mark, task.text)
}

/// Tasks of the selected employee on the focused day
pub fn render_task_list(f: &mut Frame, area: Rect, app: &mut App) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let muted = parse_color(&active_theme.muted);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = parse_color(&active_theme.highlight_fg);
    let base = Style::default().fg(fg_color).bg(bg_color);

    let title = match app.state.selected_employee() {
        Some(e) => format!(" Tasks - {} - {} ", e.name, app.ui.cursor.format("%d.%m.%Y")),
        None => " Tasks ".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title).style(base);

    let tasks = app.current_tasks();
    if tasks.is_empty() {
        let hint = if app.state.selected_employee().is_some() {
            format!(
                "No tasks for this day. Press {} to add one.",
                crate::utils::format_key_binding_for_display(&app.config.key_bindings.new)
            )
        } else {
            "Add an employee first.".to_string()
        };
        f.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(muted)))
                .block(block)
                .wrap(Wrap { trim: true }),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            let text_style = if task.completed {
                base.add_modifier(Modifier::CROSSED_OUT)
            } else {
                base
            };
            let mut lines = vec![Line::from(Span::styled(task_line(task), text_style))];
            if !task.report.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("    {}", task.report),
                    Style::default().fg(muted).add_modifier(Modifier::ITALIC),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .style(base)
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));
    f.render_stateful_widget(list, area, &mut app.ui.task_list);
}

/// Every employee's tasks on the focused day
pub fn render_day_tasks(f: &mut Frame, area: Rect, app: &App) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let muted = parse_color(&active_theme.muted);
    let base = Style::default().fg(fg_color).bg(bg_color);

    let day = app.state.day_summary(app.ui.cursor);
    let mut lines = vec![
        Line::from(Span::styled(
            app.ui.cursor.format("%A, %d %B %Y").to_string(),
            base.add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "{}/{} addressed, {} completed",
            day.addressed_tasks, day.total_tasks, day.completed_tasks
        )),
        Line::from(""),
    ];

    let mut current_owner: Option<&str> = None;
    for (employee, task) in app.state.tasks_on(app.ui.cursor) {
        if current_owner != Some(employee.id.as_str()) {
            current_owner = Some(employee.id.as_str());
            lines.push(Line::from(Span::styled(
                employee.name.clone(),
                Style::default().fg(parse_color(&employee.color)).add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(Line::from(Span::styled(format!(" {}", task_line(task)), base)));
    }
    if day.total_tasks == 0 {
        lines.push(Line::from(Span::styled("Nothing planned", Style::default().fg(muted))));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Whole team ").style(base))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_line_shows_checkbox() {
        let mut task = TaskRecord::new("Count stock".to_string());
        assert_eq!(task_line(&task), "[ ] Count stock");
        task.completed = true;
        assert_eq!(task_line(&task), "[x] Count stock");
    }
}
