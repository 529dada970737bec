//! Behavior engine for a floating assistant widget
//!
//! Gesture recognition, adaptive transparency, smart positioning and context
//! awareness around a single observable store. The host owns the clock and
//! the drawing surface; see [`widget::Widget`] for the entry point.

#![forbid(unsafe_code)]

pub mod commands;
pub mod config;
pub mod constants;
pub mod context;
pub mod events;
pub mod geometry;
pub mod gesture;
pub mod performance;
pub mod personality;
pub mod positioning;
pub mod render;
pub mod replay;
pub mod scheduler;
pub mod shortcuts;
pub mod store;
pub mod transparency;
pub mod types;
pub mod widget;

pub use config::EngineConfig;
pub use events::{HostEvent, TimedEvent};
pub use render::RenderSurface;
pub use widget::{Widget, WidgetSnapshot};
