//! Shape scoring against the template library

use crate::constants::gesture::{MIN_TRACE_POINTS, NORMALIZED_EXTENT};
use crate::geometry::{distance, normalize_trace};
use crate::types::GesturePoint;

use super::templates::GestureTemplate;

/// Score in [0, 1] of how closely `recorded` follows `pattern`
///
/// Both traces are normalized, then walked index by index over the longer
/// of the two with the shorter one's index clamped at its last point. This
/// is a crude alignment rather than dynamic time warping; traces of very
/// different lengths are compared against the shorter one's endpoint.
pub fn similarity(recorded: &[GesturePoint], pattern: &[GesturePoint]) -> f64 {
    if recorded.is_empty() || pattern.is_empty() {
        return 0.0;
    }

    let recorded = normalize_trace(recorded);
    let pattern = normalize_trace(pattern);
    let len = recorded.len().max(pattern.len());

    let total: f64 = (0..len)
        .map(|i| {
            let r = recorded[i.min(recorded.len() - 1)];
            let t = pattern[i.min(pattern.len() - 1)];
            distance(r.point(), t.point())
        })
        .sum();

    let average = total / len as f64;
    let diagonal = (2.0 * NORMALIZED_EXTENT * NORMALIZED_EXTENT).sqrt();
    (1.0 - average / diagonal).max(0.0)
}

/// Best shape template strictly above its threshold
///
/// Ties keep the earlier template since a later one must score strictly
/// higher to replace it.
pub fn recognize<'a>(
    points: &[GesturePoint],
    templates: &'a [GestureTemplate],
) -> Option<(&'a GestureTemplate, f64)> {
    if points.len() < MIN_TRACE_POINTS {
        return None;
    }

    let mut best: Option<(&GestureTemplate, f64)> = None;
    for template in templates.iter().filter(|t| t.is_shape()) {
        let score = similarity(points, &template.pattern);
        let beats_best = best.is_none_or(|(_, best_score)| score > best_score);
        if score > template.threshold && beats_best {
            best = Some((template, score));
        }
    }
    best
}
