//! Multi-display placement

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::types::{Dimensions, Position};

/// One monitor as the host reports it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub bounds: Rect,
    /// Usable area without docks and panels; the bounds when absent
    #[serde(default)]
    pub work_area: Option<Rect>,
    #[serde(default)]
    pub primary: bool,
}

impl DisplayInfo {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            work_area: None,
            primary: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn work_area(&self) -> Rect {
        self.work_area.unwrap_or(self.bounds)
    }

    /// Whether the widget's top-left corner lies on this display
    pub fn holds(&self, position: Position) -> bool {
        let b = self.bounds;
        position.x >= b.x
            && position.x < b.x + b.width
            && position.y >= b.y
            && position.y < b.y + b.height
    }
}

/// The display flagged primary, else the first one
pub fn primary_display(displays: &[DisplayInfo]) -> Option<&DisplayInfo> {
    displays.iter().find(|d| d.primary).or_else(|| displays.first())
}

/// Top-right of the primary work area for a widget stranded off every display
///
/// `None` with fewer than two displays or when some display holds the widget.
pub fn rehome(
    position: Position,
    size: Dimensions,
    displays: &[DisplayInfo],
    inset: f64,
) -> Option<Position> {
    if displays.len() <= 1 || displays.iter().any(|d| d.holds(position)) {
        return None;
    }
    let area = primary_display(displays)?.work_area();
    Some(Position::new(
        area.x + area.width - size.width - inset,
        area.y + inset,
    ))
}
