use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::models::ShiftType;
use crate::tui::app::{ShiftField, ShiftForm};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color, shift_color};
use crate::tui::widgets::fixed_popup_area;
use crate::Config;

pub fn render_shift_editor(f: &mut Frame, area: Rect, form: &ShiftForm, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let muted = parse_color(&active_theme.muted);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let base = Style::default().fg(fg_color).bg(bg_color);

    let popup = fixed_popup_area(area, 50, 14);
    f.render_widget(Clear, popup);

    let title = format!(
        " {} shift - {} - {} ",
        if form.existing { "Edit" } else { "New" },
        form.employee_name,
        form.date.format("%d.%m.%Y")
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .style(base);
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let [type_area, hours_area, notes_area, _, hint_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let field_block = |label: &'static str, field: ShiftField| {
        let border = if form.current_field == field {
            Style::default().fg(highlight_bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(muted)
        };
        Block::default().borders(Borders::ALL).title(label).border_style(border)
    };

    // Type: every option, the chosen one as a colored chip
    let options: Vec<Span> = ShiftType::ALL
        .iter()
        .flat_map(|kind| {
            let style = if *kind == form.kind {
                let color = shift_color(*kind);
                Style::default().fg(get_contrast_text_color(color)).bg(color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(muted)
            };
            [Span::styled(format!(" {} ", kind.label()), style), Span::raw(" ")]
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(options)).block(field_block("Type (←/→)", ShiftField::Type)),
        type_area,
    );

    for (editor, label, field, field_area) in [
        (&form.hours, "Hours (0 removes)", ShiftField::Hours, hours_area),
        (&form.notes, "Notes", ShiftField::Notes, notes_area),
    ] {
        let block = field_block(label, field);
        let text_area = block.inner(field_area);
        let (shown, cursor_col) = editor.visible(text_area.width.saturating_sub(1) as usize);
        f.render_widget(Paragraph::new(shown).style(base).block(block), field_area);
        if form.current_field == field {
            f.set_cursor_position(Position::new(text_area.x + cursor_col as u16, text_area.y));
        }
    }

    f.render_widget(
        Paragraph::new("Tab: next field • Enter: save • Esc: cancel").style(Style::default().fg(muted)),
        hint_area,
    );
}
