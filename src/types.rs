//! Core value types shared by the engines
//!
//! Screen coordinates: origin top-left, unit = pixels.

use serde::{Deserialize, Serialize};

/// A point in screen space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One sample of a pointer/touch trace
/// `timestamp` is milliseconds since the trace started
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GesturePoint {
    pub x: f64,
    pub y: f64,
    pub timestamp: f64,
}

impl GesturePoint {
    pub const fn new(x: f64, y: f64, timestamp: f64) -> Self {
        Self { x, y, timestamp }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Top-left corner of the widget
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position
    pub fn distance_to(&self, other: Position) -> f64 {
        crate::geometry::distance(Point::new(self.x, self.y), Point::new(other.x, other.y))
    }
}

/// Widget footprint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl From<(f64, f64)> for Dimensions {
    fn from((width, height): (f64, f64)) -> Self {
        Self { width, height }
    }
}

/// Size of the host viewport the widget lives in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        use crate::constants::defaults;
        Self::new(defaults::SCREEN_WIDTH, defaults::SCREEN_HEIGHT)
    }
}
