use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as display;
use crate::Config;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 80);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

pub fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!(
        "  {} / {} / {} / {}: Personal, General, Tasks, Employees\n",
        display(&kb.tab_1),
        display(&kb.tab_2),
        display(&kb.tab_3),
        display(&kb.tab_4)
    ));
    text.push_str(&format!("  {} / {}: Next / previous tab\n", display(&kb.next_tab), display(&kb.prev_tab)));
    text.push_str(&format!(
        "  {} / {}: Previous / next employee\n",
        display(&kb.prev_employee),
        display(&kb.next_employee)
    ));
    text.push('\n');

    text.push_str("Calendar:\n");
    text.push_str("  Arrow keys: Move the selected day\n");
    text.push_str(&format!(
        "  {} / {}: Previous / next month\n",
        display(&kb.prev_month),
        display(&kb.next_month)
    ));
    text.push_str(&format!("  {}: Jump to today\n", display(&kb.today)));
    text.push_str(&format!(
        "  {}: Edit shift (Personal) or show the day (General)\n",
        display(&kb.select)
    ));
    text.push_str(&format!("  {}: Edit shift\n", display(&kb.edit)));
    text.push_str(&format!("  {}: Remove shift\n", display(&kb.delete)));
    text.push('\n');

    text.push_str("Tasks and employees:\n");
    text.push_str(&format!("  {} / {}: Move in list\n", display(&kb.list_up), display(&kb.list_down)));
    text.push_str(&format!("  {}: Add task or employee\n", display(&kb.new)));
    text.push_str(&format!("  {}: Write report / edit employee\n", display(&kb.edit)));
    text.push_str(&format!("  {}: Mark task done or open\n", display(&kb.toggle)));
    text.push_str(&format!("  {}: Delete\n", display(&kb.delete)));
    text.push_str(&format!("  {}: Select employee (Employees tab)\n", display(&kb.select)));
    text.push('\n');

    text.push_str("Shift editor:\n");
    text.push_str("  Tab / Shift+Tab: Next / previous field\n");
    text.push_str("  Left / Right: Change shift type\n");
    text.push_str("  Enter: Save (hours 0 removes the shift)\n");
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Switch light / dark theme\n", display(&kb.toggle_theme)));
    text.push_str(&format!("  {}: Show/hide help\n", display(&kb.help)));
    text.push_str(&format!("  {}: Quit\n", display(&kb.quit)));

    text
}
