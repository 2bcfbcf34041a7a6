use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::app::InputState;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::fixed_popup_area;
use crate::Config;

/// One-line text prompt
pub fn render_input(f: &mut Frame, area: Rect, input: &InputState, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let muted = parse_color(&active_theme.muted);

    let width = (area.width * 6 / 10).max(30);
    let popup = fixed_popup_area(area, width, 3);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", input.title))
        .title_alignment(Alignment::Left)
        .title_bottom(ratatui::text::Line::styled(" Enter: ok • Esc: cancel ", Style::default().fg(muted)))
        .style(Style::default().fg(fg_color).bg(bg_color));
    let text_area = block.inner(popup);

    let (shown, cursor_col) = input.editor.visible(text_area.width.saturating_sub(1) as usize);
    f.render_widget(Paragraph::new(shown).block(block), popup);
    f.set_cursor_position(Position::new(text_area.x + cursor_col as u16, text_area.y));
}
