//! Geometry helpers shared by gesture matching and positioning

use serde::{Deserialize, Serialize};

use crate::constants::gesture::{NORMALIZED_DURATION, NORMALIZED_EXTENT};
use crate::types::{Dimensions, GesturePoint, Point, Position, ScreenSize};

/// Axis-aligned rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covered by a widget of `size` placed at `position`
    pub fn at(position: Position, size: Dimensions) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    /// Square of half-side `half` centered on `center`
    pub fn around(center: Point, half: f64) -> Self {
        Self::new(center.x - half, center.y - half, half * 2.0, half * 2.0)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Strict overlap test: rectangles that only share an edge do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Inclusive containment test
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Grow the rectangle by `amount` on all four sides
    pub fn inflate(&self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }
}

/// Euclidean distance between two points
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Rescale a trace into a 100x100 box with a 0..1000 time axis
///
/// Degenerate axes (zero extent) divide by 1 instead, so a purely
/// horizontal trace keeps y = 0. Traces with fewer than two points are
/// returned unchanged.
pub fn normalize_trace(points: &[GesturePoint]) -> Vec<GesturePoint> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    if points.len() < 2 {
        return points.to_vec();
    }

    let (mut min_x, mut max_x) = (first.x, first.x);
    let (mut min_y, mut max_y) = (first.y, first.y);
    let (mut min_t, mut max_t) = (first.timestamp, first.timestamp);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
        min_t = min_t.min(p.timestamp);
        max_t = max_t.max(p.timestamp);
    }

    let width = non_zero(max_x - min_x);
    let height = non_zero(max_y - min_y);
    let duration = non_zero(max_t - min_t);

    points
        .iter()
        .map(|p| GesturePoint {
            x: (p.x - min_x) / width * NORMALIZED_EXTENT,
            y: (p.y - min_y) / height * NORMALIZED_EXTENT,
            timestamp: (p.timestamp - min_t) / duration * NORMALIZED_DURATION,
        })
        .collect()
}

fn non_zero(extent: f64) -> f64 {
    if extent == 0.0 { 1.0 } else { extent }
}

/// Clamp a position so the widget stays `buffer` pixels inside the screen
///
/// When the screen is too small to honor the buffer on both sides the
/// lower bound wins.
pub fn clamp_to_screen(
    position: Position,
    size: Dimensions,
    screen: ScreenSize,
    buffer: f64,
) -> Position {
    let max_x = screen.width - size.width - buffer;
    let max_y = screen.height - size.height - buffer;
    Position::new(
        position.x.min(max_x).max(buffer),
        position.y.min(max_y).max(buffer),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(Point::new(1.0, 1.0), Point::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_overlap_strict_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let crossing = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&crossing));
        assert!(crossing.overlaps(&a));
    }

    #[test]
    fn test_inflate_and_contains() {
        let r = Rect::new(100.0, 100.0, 60.0, 60.0).inflate(100.0);
        assert_eq!(r, Rect::new(0.0, 0.0, 260.0, 260.0));
        assert!(r.contains(Point::new(0.0, 260.0)));
        assert!(!r.contains(Point::new(-0.5, 10.0)));
    }

    #[test]
    fn test_around() {
        let r = Rect::around(Point::new(500.0, 300.0), 100.0);
        assert_eq!(r, Rect::new(400.0, 200.0, 200.0, 200.0));
    }

    #[test]
    fn test_normalize_horizontal_trace() {
        let trace = [
            GesturePoint::new(40.0, 70.0, 1000.0),
            GesturePoint::new(240.0, 70.0, 1300.0),
        ];
        let normalized = normalize_trace(&trace);
        assert_eq!(normalized[0], GesturePoint::new(0.0, 0.0, 0.0));
        assert_eq!(normalized[1], GesturePoint::new(100.0, 0.0, 1000.0));
    }

    #[test]
    fn test_normalize_short_trace_unchanged() {
        let trace = [GesturePoint::new(5.0, 6.0, 7.0)];
        assert_eq!(normalize_trace(&trace), trace.to_vec());
        assert!(normalize_trace(&[]).is_empty());
    }

    #[test]
    fn test_clamp_to_screen() {
        let screen = ScreenSize::new(800.0, 600.0);
        let size = Dimensions::new(60.0, 60.0);
        assert_eq!(
            clamp_to_screen(Position::new(-50.0, 900.0), size, screen, 10.0),
            Position::new(10.0, 530.0)
        );
        assert_eq!(
            clamp_to_screen(Position::new(300.0, 200.0), size, screen, 10.0),
            Position::new(300.0, 200.0)
        );
    }
}
