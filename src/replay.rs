//! Deterministic replay of recorded host events

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::events::TimedEvent;
use crate::render::RenderSurface;
use crate::scheduler::Millis;
use crate::widget::Widget;

/// Read a JSON array of timestamped events
pub fn load_events(path: &Path) -> Result<Vec<TimedEvent>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read event script {}", path.display()))?;
    parse_events(&contents).with_context(|| format!("Invalid event script {}", path.display()))
}

/// Parse an event script; timestamps must never go backwards
pub fn parse_events(contents: &str) -> Result<Vec<TimedEvent>> {
    let events: Vec<TimedEvent> = serde_json::from_str(contents).context("Failed to parse events")?;
    if let Some(index) = events.windows(2).position(|pair| pair[1].at < pair[0].at) {
        bail!(
            "event {} at {} ms goes back in time (previous at {} ms)",
            index + 1,
            events[index + 1].at,
            events[index].at
        );
    }
    Ok(events)
}

/// Run every task and frame that falls due up to and including `until`
pub fn run_until(
    widget: &mut Widget,
    surface: &mut dyn RenderSurface,
    mut now: Millis,
    until: Millis,
) -> Millis {
    while let Some(wake) = widget.next_wake(now)
        && wake <= until
    {
        now = wake.max(now);
        widget.advance(now, surface);
    }
    until.max(now)
}

/// Mount, feed the script on a virtual clock, then let things settle
///
/// The widget is left mounted so the caller can snapshot it. Returns the
/// virtual time at which the replay stopped.
pub fn replay(
    widget: &mut Widget,
    events: &[TimedEvent],
    surface: &mut dyn RenderSurface,
    settle_ms: Millis,
) -> Millis {
    let start = events.first().map_or(0, |e| e.at);
    widget.mount(start, surface);

    let mut now = start;
    for timed in events {
        now = run_until(widget, surface, now, timed.at);
        widget.handle(now, &timed.event);
        widget.advance(now, surface);
    }
    let end = now.saturating_add(settle_ms);
    let now = run_until(widget, surface, now, end);

    info!(events = events.len(), end = now, "Replay finished");
    now
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::context::{ContextMonitor, ContextSettings};
    use crate::personality::PersonalityMode;
    use crate::render::RecordingSurface;
    use crate::store::WidgetState;

    fn widget() -> Widget {
        let monitor = ContextMonitor::with_hour_source(ContextSettings::default(), || 14);
        Widget::with_context_monitor(&EngineConfig::default(), monitor)
    }

    #[test]
    fn test_out_of_order_script_rejected() {
        let script = r#"[{"at": 50, "type": "tick"}, {"at": 10, "type": "tick"}]"#;
        let err = parse_events(script).unwrap_err();
        assert!(err.to_string().contains("goes back in time"));
    }

    #[test]
    fn test_replay_script() {
        let events = parse_events(
            r#"[
                {"at": 0, "type": "key", "key": "3", "alt": true},
                {"at": 100, "type": "click"},
                {"at": 200, "type": "key", "key": " "},
                {"at": 5000, "type": "key", "key": "Escape"}
            ]"#,
        )
        .unwrap();

        let mut widget = widget();
        let mut surface = RecordingSurface::new();
        let end = replay(&mut widget, &events, &mut surface, 1000);

        assert_eq!(end, 6000);
        let snapshot = widget.snapshot();
        assert_eq!(snapshot.personality, PersonalityMode::Creative);
        assert_eq!(snapshot.state, WidgetState::Collapsed);
        assert!(snapshot.voice.is_listening);
        assert!(!widget.transparency().is_animating());
        assert_eq!(surface.last_opacity(), Some(snapshot.opacity));
    }
}
