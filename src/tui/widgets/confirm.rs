use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::app::ConfirmAction;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::fixed_popup_area;
use crate::Config;

const OPTIONS: [&str; 2] = ["Delete", "Cancel"];

pub fn render_confirm(f: &mut Frame, area: Rect, action: &ConfirmAction, selection: usize, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);
    let base = Style::default().fg(fg_color).bg(bg_color);

    let popup_area = fixed_popup_area(area, 56, 10);
    f.render_widget(Clear, popup_area);

    let mut lines = vec![Line::from(Span::styled(action.message(), base)), Line::from("")];

    for (index, option) in OPTIONS.iter().enumerate() {
        let selected = index == selection;
        let prefix = if selected { "> " } else { "  " };
        let style = if selected {
            Style::default().fg(highlight_fg).bg(highlight_bg)
        } else {
            base
        };
        lines.push(Line::from(Span::styled(format!("{}{}", prefix, option), style)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("←→ choose • Enter confirm • y/n • Esc cancel", base)));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm")
                .title_alignment(Alignment::Center)
                .style(base),
        )
        .style(base)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
