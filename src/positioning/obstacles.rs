//! Obstacle detection for smart positioning

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::positioning::{CURSOR_PRIORITY, ELEMENT_PRIORITY};
use crate::geometry::Rect;
use crate::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Cursor,
    Element,
    Window,
}

/// A screen region the widget should not cover
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub kind: ObstacleKind,
    pub priority: i32,
}

impl ObstacleRect {
    pub fn new(rect: Rect, kind: ObstacleKind, priority: i32) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            kind,
            priority,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Host elements marked as obstacles, keyed by a host-chosen id
///
/// Iteration follows id order so detection is deterministic.
#[derive(Debug, Clone, Default)]
pub struct ObstacleRegistry {
    elements: BTreeMap<String, Rect>,
}

impl ObstacleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or move an element; returns the previous bounds if it was known
    pub fn register(&mut self, id: impl Into<String>, bounds: Rect) -> Option<Rect> {
        self.elements.insert(id.into(), bounds)
    }

    pub fn remove(&mut self, id: &str) -> Option<Rect> {
        self.elements.remove(id)
    }

    /// Replace the whole set, as when the host re-scans its view
    pub fn replace_all(&mut self, elements: impl IntoIterator<Item = (String, Rect)>) {
        self.elements = elements.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn bounds(&self) -> impl Iterator<Item = &Rect> {
        self.elements.values()
    }
}

/// Build the obstacle list for one positioning cycle
///
/// The cursor zone only exists once the pointer has been seen.
pub fn detect_obstacles(
    cursor: Option<Point>,
    cursor_buffer: f64,
    registry: &ObstacleRegistry,
) -> Vec<ObstacleRect> {
    let cursor_zone = cursor.map(|point| {
        ObstacleRect::new(
            Rect::around(point, cursor_buffer),
            ObstacleKind::Cursor,
            CURSOR_PRIORITY,
        )
    });
    let elements = registry
        .bounds()
        .map(|bounds| ObstacleRect::new(*bounds, ObstacleKind::Element, ELEMENT_PRIORITY));

    cursor_zone.into_iter().chain(elements).collect()
}

/// Whether `rect` overlaps any obstacle
pub fn conflicts(rect: &Rect, obstacles: &[ObstacleRect]) -> bool {
    obstacles.iter().any(|obstacle| rect.overlaps(&obstacle.rect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_zone() {
        let registry = ObstacleRegistry::new();
        let obstacles = detect_obstacles(Some(Point::new(500.0, 300.0)), 100.0, &registry);
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].kind, ObstacleKind::Cursor);
        assert_eq!(obstacles[0].priority, 1);
        assert_eq!(obstacles[0].rect(), Rect::new(400.0, 200.0, 200.0, 200.0));
    }

    #[test]
    fn test_no_cursor_before_first_move() {
        let mut registry = ObstacleRegistry::new();
        registry.register("toolbar", Rect::new(0.0, 0.0, 1920.0, 40.0));
        let obstacles = detect_obstacles(None, 100.0, &registry);
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].kind, ObstacleKind::Element);
        assert_eq!(obstacles[0].priority, 2);
    }

    #[test]
    fn test_registry_register_and_remove() {
        let mut registry = ObstacleRegistry::new();
        assert!(registry.register("a", Rect::new(0.0, 0.0, 10.0, 10.0)).is_none());
        assert!(registry.register("a", Rect::new(5.0, 0.0, 10.0, 10.0)).is_some());
        assert_eq!(registry.len(), 1);
        assert!(registry.remove("a").is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_conflicts() {
        let window = Rect::new(100.0, 100.0, 50.0, 50.0);
        let obstacles = [ObstacleRect::new(window, ObstacleKind::Window, 3)];
        assert!(conflicts(&Rect::new(120.0, 120.0, 10.0, 10.0), &obstacles));
        assert!(!conflicts(&Rect::new(150.0, 100.0, 10.0, 10.0), &obstacles));
        assert!(!conflicts(&Rect::new(0.0, 0.0, 10.0, 10.0), &[]));
    }
}
