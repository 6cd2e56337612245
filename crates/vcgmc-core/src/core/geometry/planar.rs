use nalgebra::{Point2, Rotation2, Vector2};

/// Returns `true` when `p` lies strictly on the left of the directed line `s -> e`.
#[inline]
pub fn on_left(p: &Point2<f64>, s: &Point2<f64>, e: &Point2<f64>) -> bool {
    (e - s).perp(&(p - s)) > 0.0
}

/// Shift that moves a coordinate difference `delta` onto its nearest periodic
/// image along an axis of length `size`. Zero when the direct image is closest.
#[inline]
pub fn nearest_image_shift(delta: f64, size: f64) -> f64 {
    let shift = if delta < 0.0 { size } else { -size };
    if (delta + shift).abs() < delta.abs() {
        shift
    } else {
        0.0
    }
}

#[inline]
pub fn rotate_offset(offset: &Vector2<f64>, angle: f64) -> Vector2<f64> {
    Rotation2::new(angle) * offset
}

pub fn segment_distance(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f64::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn on_left_distinguishes_sides_of_a_directed_line() {
        let s = Point2::new(0.0, 0.0);
        let e = Point2::new(1.0, 0.0);
        assert!(on_left(&Point2::new(0.5, 1.0), &s, &e));
        assert!(!on_left(&Point2::new(0.5, -1.0), &s, &e));
        assert!(!on_left(&Point2::new(2.0, 0.0), &s, &e));
    }

    #[test]
    fn nearest_image_shift_wraps_only_when_closer() {
        assert_eq!(nearest_image_shift(9.0, 10.0), -10.0);
        assert_eq!(nearest_image_shift(-9.0, 10.0), 10.0);
        assert_eq!(nearest_image_shift(4.0, 10.0), 0.0);
        assert_eq!(nearest_image_shift(-4.0, 10.0), 0.0);
    }

    #[test]
    fn rotate_offset_turns_counter_clockwise() {
        let rotated = rotate_offset(&Vector2::new(1.0, 0.0), FRAC_PI_2);
        assert!(rotated.x.abs() < TOLERANCE);
        assert!((rotated.y - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 0.0);
        assert!((segment_distance(&Point2::new(1.0, 3.0), &a, &b) - 3.0).abs() < TOLERANCE);
        assert!((segment_distance(&Point2::new(5.0, 4.0), &a, &b) - 5.0).abs() < TOLERANCE);
    }
}
