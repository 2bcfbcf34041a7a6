use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;
use ratatui::Frame;

use crate::tui::app::Tab;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::Config;

pub fn render_tabs(f: &mut Frame, area: Rect, current_tab: Tab, config: &Config) {
    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let tab_bg = parse_color(&active_theme.tab_bg);

    // Non-selected tabs read against tab_bg whatever gray the terminal picks
    let tab_fg = get_contrast_text_color(tab_bg);

    let shortcuts = [
        &config.key_bindings.tab_1,
        &config.key_bindings.tab_2,
        &config.key_bindings.tab_3,
        &config.key_bindings.tab_4,
    ];

    // Padded spans give each tab a box look
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .zip(shortcuts)
        .map(|(tab, shortcut)| {
            Line::from(vec![
                Span::styled(" ", Style::default().bg(tab_bg)),
                Span::styled(
                    format!("{} {}", shortcut, tab.title()),
                    Style::default().fg(tab_fg).bg(tab_bg),
                ),
                Span::styled(" ", Style::default().bg(tab_bg)),
            ])
        })
        .collect();

    let highlight_fg = get_contrast_text_color(highlight_bg);

    let tabs = Tabs::new(titles)
        .select(current_tab.index())
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" ")
        .padding("", "");

    f.render_widget(tabs, area);
}
