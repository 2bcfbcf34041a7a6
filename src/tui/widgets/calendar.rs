use chrono::{Datelike, NaiveDate};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::calendar::{week_start_from_setting, weekday_headers};
use crate::models::{Employee, ShiftRecord, ShiftType};
use crate::tui::app::Tab;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color, shift_color};
use crate::tui::App;
use crate::utils::{format_number, today};

/// Short cell label for a shift: "D 12h", "N 12h", "C 7.5h"
pub fn shift_label(shift: &ShiftRecord) -> String {
    let marker = match shift.kind {
        ShiftType::Day => "D",
        ShiftType::Night => "N",
        ShiftType::Custom => "C",
    };
    format!("{} {}h", marker, format_number(shift.hours))
}

/// One line per employee on shift, capped at `max_lines`; the last line
/// becomes "+N" when some do not fit
pub fn roster_lines<'a>(
    on_shift: &[(&'a Employee, &ShiftRecord)],
    max_lines: usize,
) -> Vec<(Option<&'a Employee>, String)> {
    if max_lines == 0 {
        return Vec::new();
    }
    if on_shift.len() <= max_lines {
        return on_shift
            .iter()
            .map(|(e, s)| (Some(*e), format!("{} {}", e.short_name(), shift_label(s))))
            .collect();
    }
    let shown = max_lines - 1;
    let mut lines: Vec<_> = on_shift[..shown]
        .iter()
        .map(|(e, s)| (Some(*e), format!("{} {}", e.short_name(), shift_label(s))))
        .collect();
    lines.push((None, format!("+{}", on_shift.len() - shown)));
    lines
}

pub fn render_calendar(f: &mut Frame, area: Rect, app: &App) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let muted = parse_color(&active_theme.muted);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = parse_color(&active_theme.highlight_fg);

    let personal = app.ui.current_tab == Tab::Personal;
    let who = if personal {
        app.state
            .selected_employee()
            .map(|e| e.name.clone())
            .unwrap_or_else(|| "no employee".to_string())
    } else {
        "all employees".to_string()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} - {} ", app.ui.month.title(), who))
        .style(Style::default().fg(fg_color).bg(bg_color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < 7 || inner.height < 7 {
        return;
    }

    let week_start = week_start_from_setting(app.state.settings().start_of_week);
    let [header_area, grid_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
    let columns = Layout::horizontal([Constraint::Ratio(1, 7); 7]);

    for (header, cell) in weekday_headers(week_start)
        .into_iter()
        .zip(columns.split(header_area).iter())
    {
        f.render_widget(
            Paragraph::new(header).style(Style::default().fg(muted).add_modifier(Modifier::BOLD)),
            *cell,
        );
    }

    let rows = Layout::vertical([Constraint::Ratio(1, 6); 6]).split(grid_area);
    let grid = app.ui.month.grid_starting(week_start);
    let today = today();

    for (week, row_area) in grid.chunks(7).zip(rows.iter()) {
        for (date, cell_area) in week.iter().zip(columns.split(*row_area).iter()) {
            let in_month = app.ui.month.contains(*date);
            let is_cursor = *date == app.ui.cursor;

            let base = if is_cursor {
                Style::default().fg(highlight_fg).bg(highlight_bg)
            } else if in_month {
                Style::default().fg(fg_color).bg(bg_color)
            } else {
                Style::default().fg(muted).bg(bg_color)
            };

            let number_style = if *date == today {
                base.add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                base
            };
            let cell = Cell {
                date: *date,
                height: cell_area.height as usize,
                base,
                number_style,
                in_month,
            };

            let lines = if personal {
                personal_cell(app, &cell)
            } else {
                general_cell(app, &cell)
            };
            f.render_widget(Paragraph::new(lines).style(base), *cell_area);
        }
    }
}

struct Cell {
    date: NaiveDate,
    height: usize,
    base: Style,
    number_style: Style,
    in_month: bool,
}

/// Day number, with a dot when the day has tasks
fn day_number_line(cell: &Cell, has_tasks: bool) -> Line<'static> {
    let marker = if has_tasks { "•" } else { "" };
    Line::from(vec![
        Span::styled(format!("{:>2}", cell.date.day()), cell.number_style),
        Span::styled(marker, cell.base),
    ])
}

/// Colored chip style for a shift or employee color; muted outside the month
fn chip_style(color: Color, base: Style, in_month: bool) -> Style {
    if in_month {
        base.fg(get_contrast_text_color(color)).bg(color)
    } else {
        base
    }
}

fn personal_cell(app: &App, cell: &Cell) -> Vec<Line<'static>> {
    let Some(employee) = app.state.selected_employee() else {
        return vec![day_number_line(cell, false)];
    };
    let has_tasks = !app.state.tasks_for(&employee.id, cell.date).is_empty();
    let mut lines = vec![day_number_line(cell, has_tasks)];

    if let Some(shift) = app.state.shift(&employee.id, cell.date) {
        lines.push(Line::from(Span::styled(
            shift_label(shift),
            chip_style(shift_color(shift.kind), cell.base, cell.in_month),
        )));
        if cell.height > 2 && !shift.notes.is_empty() {
            lines.push(Line::from(Span::styled(
                shift.notes.clone(),
                cell.base.add_modifier(Modifier::ITALIC),
            )));
        }
    }
    lines
}

fn general_cell(app: &App, cell: &Cell) -> Vec<Line<'static>> {
    let has_tasks = !app.state.tasks_on(cell.date).is_empty();
    let on_shift = app.state.shifts_on(cell.date);
    let mut lines = vec![day_number_line(cell, has_tasks)];

    for (employee, text) in roster_lines(&on_shift, cell.height.saturating_sub(1)) {
        let style = match employee {
            Some(e) => chip_style(parse_color(&e.color), cell.base, cell.in_month),
            None => cell.base,
        };
        lines.push(Line::from(Span::styled(text, style)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn employee(name: &str) -> Employee {
        Employee::new(name.to_lowercase(), name.to_string(), 500.0, "#58a6ff".to_string())
    }

    #[test]
    fn labels_show_type_and_hours() {
        let day = ShiftRecord::new(12.0, ShiftType::Day, String::new());
        let custom = ShiftRecord::new(7.5, ShiftType::Custom, String::new());
        assert_eq!(shift_label(&day), "D 12h");
        assert_eq!(shift_label(&custom), "C 7.5h");
    }

    #[test]
    fn roster_collapses_overflow() {
        let people = [employee("Anna Petrova"), employee("Boris"), employee("Clara")];
        let shift = ShiftRecord::new(12.0, ShiftType::Night, String::new());
        let on_shift: Vec<_> = people.iter().map(|e| (e, &shift)).collect();

        let lines = roster_lines(&on_shift, 3);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].1, "Anna N 12h");

        let lines = roster_lines(&on_shift, 2);
        assert_eq!(lines[1], (None, "+2".to_string()));
        assert!(roster_lines(&on_shift, 0).is_empty());
    }
}
