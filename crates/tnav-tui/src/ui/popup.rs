use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// A rectangle `width` columns wide and `height` rows tall, centered
/// horizontally within `area` and clamped to it.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(width),
            Constraint::Fill(1),
        ])
        .split(vertical[1])[1]
}

/// Like [`centered_rect`] but anchored to the bottom edge of `area`.
pub fn bottom_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + area.height - height,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_centered() {
        let rect = centered_rect(20, 4, Rect::new(0, 0, 80, 24));
        assert_eq!(rect.width, 20);
        assert_eq!(rect.height, 4);
        assert_eq!(rect.x, 30);
        assert_eq!(rect.y, 10);
    }

    #[test]
    fn rects_are_clamped_to_area() {
        let area = Rect::new(2, 3, 10, 5);
        let rect = centered_rect(40, 40, area);
        assert_eq!(rect, area);

        let rect = bottom_rect(4, 2, area);
        assert_eq!(rect, Rect::new(5, 6, 4, 2));
    }
}
