/// Linear repulsive core: `big_energy` at contact, doubling as the
/// penetration reaches the full contact distance.
#[inline]
pub fn hard_core(penetration: f64, contact: f64, big_energy: f64) -> f64 {
    big_energy * (1.0 - penetration / contact)
}

/// Triangular tail decaying from `well` at contact to zero at `length`.
#[inline]
pub fn linear_tail(separation: f64, length: f64, well: f64) -> f64 {
    well * (1.0 - separation / length)
}

/// Ramp rising up to `barrier` at separation `barrier`, then a plateau.
#[inline]
pub fn barrier_ramp(separation: f64, barrier: f64, cut_off: f64) -> f64 {
    let half_cut = cut_off / 2.0;
    if separation < barrier {
        (barrier / half_cut) * separation
    } else {
        barrier * (1.0 + 1.0 / half_cut)
    }
}

/// Penalty for an atom of radius `radius` whose centre lies `distance` from
/// a wall (negative when outside).
#[inline]
pub fn wall_penalty(distance: f64, radius: f64, big_energy: f64) -> f64 {
    if distance < radius && radius > 0.0 {
        hard_core(distance - radius, radius, big_energy)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn hard_core_is_big_energy_at_contact_and_grows_with_overlap() {
        assert!(f64_approx_equal(hard_core(0.0, 1.0, 100.0), 100.0));
        assert!(f64_approx_equal(hard_core(-0.5, 1.0, 100.0), 150.0));
        assert!(f64_approx_equal(hard_core(-1.0, 1.0, 100.0), 200.0));
    }

    #[test]
    fn linear_tail_reaches_zero_at_length() {
        assert!(f64_approx_equal(linear_tail(0.0, 2.0, -3.0), -3.0));
        assert!(f64_approx_equal(linear_tail(1.0, 2.0, -3.0), -1.5));
        assert!(f64_approx_equal(linear_tail(2.0, 2.0, -3.0), 0.0));
    }

    #[test]
    fn barrier_ramp_rises_then_plateaus() {
        assert!(f64_approx_equal(barrier_ramp(0.0, 0.5, 2.0), 0.0));
        assert!(f64_approx_equal(barrier_ramp(0.25, 0.5, 2.0), 0.125));
        assert!(f64_approx_equal(barrier_ramp(0.8, 0.5, 2.0), 1.0));
    }

    #[test]
    fn wall_penalty_applies_only_within_radius() {
        assert_eq!(wall_penalty(2.0, 1.0, 100.0), 0.0);
        assert!(f64_approx_equal(wall_penalty(0.5, 1.0, 100.0), 150.0));
        assert!(wall_penalty(-0.5, 1.0, 100.0) > 200.0);
    }
}
