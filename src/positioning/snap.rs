use crate::types::{Dimensions, Position, ScreenSize};

#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisSnap {
    value: f64,
}

/// Find the edge-snapped position for a widget dropped at `dropped`
/// Returns the snapped position if either axis is within `threshold` of an
/// edge, None otherwise
pub fn find_edge_snap(
    dropped: Position,
    size: Dimensions,
    screen: ScreenSize,
    threshold: f64,
    buffer: f64,
) -> Option<Position> {
    let snap_x = check_axis(dropped.x, size.width, screen.width, threshold, buffer);
    let snap_y = check_axis(dropped.y, size.height, screen.height, threshold, buffer);

    match (snap_x, snap_y) {
        (Some(x), Some(y)) => Some(Position::new(x.value, y.value)),
        (Some(x), None) => Some(Position::new(x.value, dropped.y)),
        (None, Some(y)) => Some(Position::new(dropped.x, y.value)),
        (None, None) => None,
    }
}

fn check_axis(coord: f64, extent: f64, span: f64, threshold: f64, buffer: f64) -> Option<AxisSnap> {
    let far = span - extent;
    if coord < threshold {
        // Near edge
        Some(AxisSnap { value: buffer })
    } else if coord > far - threshold {
        // Far edge
        Some(AxisSnap { value: far - buffer })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: ScreenSize = ScreenSize::new(1920.0, 1080.0);
    const SIZE: Dimensions = Dimensions::new(60.0, 60.0);

    #[test]
    fn test_snap_near_left_edge() {
        let snapped = find_edge_snap(Position::new(30.0, 500.0), SIZE, SCREEN, 50.0, 10.0);
        assert_eq!(snapped, Some(Position::new(10.0, 500.0)));
    }

    #[test]
    fn test_snap_bottom_right_corner() {
        let snapped = find_edge_snap(Position::new(1830.0, 990.0), SIZE, SCREEN, 50.0, 10.0);
        assert_eq!(snapped, Some(Position::new(1850.0, 1010.0)));
    }

    #[test]
    fn test_no_snap_in_middle() {
        assert_eq!(
            find_edge_snap(Position::new(900.0, 500.0), SIZE, SCREEN, 50.0, 10.0),
            None
        );
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // Exactly on the threshold stays where it was dropped
        assert_eq!(
            find_edge_snap(Position::new(50.0, 500.0), SIZE, SCREEN, 50.0, 10.0),
            None
        );
        assert_eq!(
            find_edge_snap(Position::new(1810.0, 500.0), SIZE, SCREEN, 50.0, 10.0),
            None
        );
    }
}
