use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub tabs_area: Rect,
    pub main_area: Rect,
    pub side_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Width: 7 calendar columns of 6 cells plus borders, and a side panel
    /// Height: tabs + 6 calendar weeks of 2 lines + header, borders and status
    pub const MIN_WIDTH: u16 = 72;
    pub const MIN_HEIGHT: u16 = 20;

    /// Side panel takes this share of the width, never less than SIDE_MIN_WIDTH
    const SIDE_PERCENT: u16 = 34;
    const SIDE_MIN_WIDTH: u16 = 28;

    pub fn calculate(size: Rect) -> Self {
        let min_width_with_border = Self::MIN_WIDTH + 2;
        let min_height_with_border = Self::MIN_HEIGHT + 2;
        let width = size.width.max(min_width_with_border);
        let height = size.height.max(min_height_with_border);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Tabs
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        let side_width = ((inner_area.width * Self::SIDE_PERCENT) / 100)
            .max(Self::SIDE_MIN_WIDTH)
            .min(inner_area.width.saturating_sub(Self::SIDE_MIN_WIDTH));

        let horizontal = RatLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(side_width)])
            .split(vertical[1]);

        Self {
            inner_area,
            tabs_area: vertical[0],
            main_area: horizontal[0],
            side_area: horizontal[1],
            status_area: vertical[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn areas_fit_inside_the_border() {
        let layout = Layout::calculate(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.tabs_area.height, 1);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.main_area.width + layout.side_area.width, 118);
        assert!(layout.side_area.width >= 28);
    }

    #[test]
    fn small_terminals_are_padded_to_minimum() {
        let layout = Layout::calculate(Rect::new(0, 0, 10, 5));
        assert_eq!(layout.inner_area.width, Layout::MIN_WIDTH);
        assert_eq!(layout.inner_area.height, Layout::MIN_HEIGHT);
    }
}
