//! Seam between the engines and whatever draws the widget

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::io::Write;

use crate::types::{Dimensions, Position};

/// The widget container as the host exposes it
///
/// Writes may fail while the container is detached; callers treat that as
/// non-fatal and keep their own state advancing.
pub trait RenderSurface {
    fn apply_opacity(&mut self, opacity: f64) -> Result<()>;
    fn apply_bounds(&mut self, position: Position, size: Dimensions) -> Result<()>;
    /// Keep the container stacked above other windows
    fn apply_always_on_top(&mut self, on_top: bool) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "write", rename_all = "snake_case")]
pub enum SurfaceWrite {
    Opacity { value: f64 },
    Bounds { position: Position, size: Dimensions },
    AlwaysOnTop { value: bool },
}

/// Surface that remembers every write; used by the CLI host and tests
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub writes: Vec<SurfaceWrite>,
    detached: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the container disappearing from (or returning to) the view
    pub fn set_detached(&mut self, detached: bool) {
        self.detached = detached;
    }

    pub fn last_opacity(&self) -> Option<f64> {
        self.writes.iter().rev().find_map(|w| match w {
            SurfaceWrite::Opacity { value } => Some(*value),
            _ => None,
        })
    }

    pub fn last_bounds(&self) -> Option<(Position, Dimensions)> {
        self.writes.iter().rev().find_map(|w| match w {
            SurfaceWrite::Bounds { position, size } => Some((*position, *size)),
            _ => None,
        })
    }

    pub fn last_always_on_top(&self) -> Option<bool> {
        self.writes.iter().rev().find_map(|w| match w {
            SurfaceWrite::AlwaysOnTop { value } => Some(*value),
            _ => None,
        })
    }
}

impl RenderSurface for RecordingSurface {
    fn apply_opacity(&mut self, opacity: f64) -> Result<()> {
        if self.detached {
            bail!("widget container not attached");
        }
        self.writes.push(SurfaceWrite::Opacity { value: opacity });
        Ok(())
    }

    fn apply_bounds(&mut self, position: Position, size: Dimensions) -> Result<()> {
        if self.detached {
            bail!("widget container not attached");
        }
        self.writes.push(SurfaceWrite::Bounds { position, size });
        Ok(())
    }

    fn apply_always_on_top(&mut self, on_top: bool) -> Result<()> {
        if self.detached {
            bail!("widget container not attached");
        }
        self.writes.push(SurfaceWrite::AlwaysOnTop { value: on_top });
        Ok(())
    }
}

/// Surface that streams every write as one JSON line
#[derive(Debug)]
pub struct JsonLinesSurface<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, write: SurfaceWrite) -> Result<()> {
        serde_json::to_writer(&mut self.out, &write).context("Failed to encode surface write")?;
        self.out
            .write_all(b"\n")
            .and_then(|()| self.out.flush())
            .context("Failed to emit surface write")
    }
}

impl<W: Write> RenderSurface for JsonLinesSurface<W> {
    fn apply_opacity(&mut self, opacity: f64) -> Result<()> {
        self.emit(SurfaceWrite::Opacity { value: opacity })
    }

    fn apply_bounds(&mut self, position: Position, size: Dimensions) -> Result<()> {
        self.emit(SurfaceWrite::Bounds { position, size })
    }

    fn apply_always_on_top(&mut self, on_top: bool) -> Result<()> {
        self.emit(SurfaceWrite::AlwaysOnTop { value: on_top })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_surface_rejects_writes() {
        let mut surface = RecordingSurface::new();
        surface.set_detached(true);
        assert!(surface.apply_opacity(0.5).is_err());
        surface.set_detached(false);
        surface.apply_opacity(0.7).unwrap();
        assert_eq!(surface.last_opacity(), Some(0.7));
        assert_eq!(surface.last_bounds(), None);
    }

    #[test]
    fn test_json_lines_surface() {
        let mut surface = JsonLinesSurface::new(Vec::new());
        surface.apply_opacity(0.5).unwrap();
        surface
            .apply_bounds(Position::new(10.0, 20.0), Dimensions::new(60.0, 60.0))
            .unwrap();
        surface.apply_always_on_top(true).unwrap();
        let text = String::from_utf8(surface.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], r#"{"write":"opacity","value":0.5}"#);
        assert_eq!(
            lines[1],
            concat!(
                r#"{"write":"bounds","position":{"x":10.0,"y":20.0},"#,
                r#""size":{"width":60.0,"height":60.0}}"#
            )
        );
        assert_eq!(lines[2], r#"{"write":"always_on_top","value":true}"#);
    }
}
