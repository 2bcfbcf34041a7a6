pub mod calendar;
pub mod color;
pub mod confirm;
pub mod dashboard;
pub mod day_detail;
pub mod editor;
pub mod employee_list;
pub mod help;
pub mod input;
pub mod shift_editor;
pub mod status_bar;
pub mod summary;
pub mod tabs;
pub mod task_panel;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Centered rect taking a percentage of `area`, as in the ratatui popup example
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Centered rect of a fixed size, clamped to `area`
pub fn fixed_popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height.min(area.height))]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Length(width.min(area.width))]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popups_are_centered() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(popup_area(area, 50, 50), Rect::new(25, 10, 50, 20));
        assert_eq!(fixed_popup_area(area, 40, 10), Rect::new(30, 15, 40, 10));
        assert_eq!(fixed_popup_area(Rect::new(0, 0, 20, 5), 40, 10), Rect::new(0, 0, 20, 5));
    }
}
