use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Centered modal area of the given height, clipped to the screen
pub fn create_modal_area(area: Rect, height: u16) -> Rect {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(15),
            Constraint::Percentage(70),
            Constraint::Percentage(15),
        ])
        .split(vertical_chunks[1]);

    horizontal_chunks[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_modal_area() {
        let area = Rect::new(0, 0, 100, 50);
        let modal = create_modal_area(area, 16);

        assert!(modal.width < area.width);
        assert_eq!(modal.height, 16);
        assert!(modal.y > 0);
    }

    #[test]
    fn test_modal_area_clipped_to_screen() {
        let area = Rect::new(0, 0, 80, 10);
        let modal = create_modal_area(area, 22);

        assert_eq!(modal.height, 10);
    }
}
