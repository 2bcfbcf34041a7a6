use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::summary::summary_rows;
use crate::tui::App;
use crate::utils::{format_currency, format_key_binding_for_display};

pub fn render_employee_list(f: &mut Frame, area: Rect, app: &mut App) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let muted = parse_color(&active_theme.muted);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = parse_color(&active_theme.highlight_fg);
    let base = Style::default().fg(fg_color).bg(bg_color);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Employees ({}) ", app.state.employees().len()))
        .style(base);

    let employees = app.state.employees_by_name();
    if employees.is_empty() {
        let hint = format!(
            "No employees yet. Press {} to add one.",
            format_key_binding_for_display(&app.config.key_bindings.new)
        );
        f.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(muted))).block(block),
            area,
        );
        return;
    }

    let selected_id = app.state.selected_employee().map(|e| e.id.clone());
    let currency = app.config.currency_symbol.clone();
    let items: Vec<ListItem> = employees
        .iter()
        .map(|employee| {
            let marker = if selected_id.as_deref() == Some(employee.id.as_str()) {
                "● "
            } else {
                "  "
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, base),
                Span::styled("■ ", Style::default().fg(parse_color(&employee.color))),
                Span::styled(employee.name.clone(), base),
                Span::styled(
                    format!("  {}/h", format_currency(employee.rate.round() as i64, &currency)),
                    Style::default().fg(muted),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .style(base)
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));
    f.render_stateful_widget(list, area, &mut app.ui.employee_list);
}

/// Details of the highlighted employee
pub fn render_employee_details(f: &mut Frame, area: Rect, app: &App) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let muted = parse_color(&active_theme.muted);
    let base = Style::default().fg(fg_color).bg(bg_color);

    let employees = app.state.employees_by_name();
    let highlighted = app
        .ui
        .employee_list
        .selected()
        .and_then(|i| employees.get(i).copied());

    let mut lines = Vec::new();
    if let Some(employee) = highlighted {
        lines.push(Line::from(Span::styled(
            employee.name.clone(),
            base.fg(parse_color(&employee.color)).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("Since {}", employee.created_at.format("%d.%m.%Y")),
            Style::default().fg(muted),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(app.ui.month.title(), base.add_modifier(Modifier::BOLD))));
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
        let task_count: usize = app
            .state
            .tasks()
            .iter()
            .filter(|(key, _)| key.employee_id == employee.id)
            .map(|(_, bucket)| bucket.len())
            .sum();
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Tasks on record: {}", task_count)));
    }

    let kb = &app.config.key_bindings;
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "{}: select  {}: add  {}: edit  {}: delete",
            format_key_binding_for_display(&kb.select),
            format_key_binding_for_display(&kb.new),
            format_key_binding_for_display(&kb.edit),
            format_key_binding_for_display(&kb.delete)
        ),
        Style::default().fg(muted),
    )));

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Details ").style(base))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
