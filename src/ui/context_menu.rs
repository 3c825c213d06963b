use crate::models::operation::FileAction;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Shifts `position` so a menu of `menu` size stays inside `viewport`.
/// A menu larger than the viewport is pinned to the top-left corner.
pub fn clamp(position: Point, menu: Size, viewport: Size) -> Point {
    let max_x = (viewport.width - menu.width).max(0.0);
    let max_y = (viewport.height - menu.height).max(0.0);
    Point {
        x: position.x.clamp(0.0, max_x),
        y: position.y.clamp(0.0, max_y),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub target: String,
    pub position: Point,
    pub actions: Vec<FileAction>,
    laid_out: bool,
}

impl ContextMenu {
    pub fn new(target: impl Into<String>, position: Point, actions: Vec<FileAction>) -> Self {
        Self {
            target: target.into(),
            position,
            actions,
            laid_out: false,
        }
    }

    /// Repositions once, after the menu's rendered size is known. Returns
    /// whether the position was recomputed.
    pub fn apply_layout(&mut self, menu: Size, viewport: Size) -> bool {
        if self.laid_out {
            return false;
        }
        self.position = clamp(self.position, menu, viewport);
        self.laid_out = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size {
        width: 1280.0,
        height: 720.0,
    };
    const MENU: Size = Size {
        width: 200.0,
        height: 300.0,
    };

    #[test]
    fn inside_positions_are_unchanged() {
        let p = Point { x: 100.0, y: 100.0 };
        assert_eq!(clamp(p, MENU, VIEWPORT), p);
    }

    #[test]
    fn overflow_is_pulled_back_into_view() {
        let p = clamp(Point { x: 1250.0, y: 700.0 }, MENU, VIEWPORT);
        assert_eq!(p, Point { x: 1080.0, y: 420.0 });
    }

    #[test]
    fn negative_positions_clamp_to_origin() {
        let p = clamp(Point { x: -5.0, y: -40.0 }, MENU, VIEWPORT);
        assert_eq!(p, Point { x: 0.0, y: 0.0 });
    }

    #[test]
    fn oversized_menu_pins_to_corner() {
        let small = Size {
            width: 100.0,
            height: 100.0,
        };
        assert_eq!(clamp(Point { x: 50.0, y: 50.0 }, MENU, small), Point::default());
    }

    #[test]
    fn layout_is_applied_once() {
        let mut menu = ContextMenu::new("a.txt", Point { x: 1270.0, y: 10.0 }, vec![FileAction::Delete]);
        assert!(menu.apply_layout(MENU, VIEWPORT));
        assert_eq!(menu.position.x, 1080.0);
        assert!(!menu.apply_layout(MENU, Size { width: 300.0, height: 300.0 }));
        assert_eq!(menu.position.x, 1080.0);
    }
}
