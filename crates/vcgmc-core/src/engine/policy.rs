use crate::core::models::object::MobilityStats;

/// How an object's next move is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePolicy {
    /// Translation scaled by the integrator's global step bound, plus a free
    /// rotation when rotations are enabled.
    Bootstrap,
    /// Step length from the object's own bound, with the translate/rotate
    /// choice and rotation spread driven by its acceptance history.
    Adaptive,
}

impl MovePolicy {
    /// Objects stay in [`MovePolicy::Bootstrap`] until they have made `n_try`
    /// attempts.
    pub fn for_object(stats: &MobilityStats, n_try: u64) -> Self {
        if stats.attempts() < n_try {
            Self::Bootstrap
        } else {
            Self::Adaptive
        }
    }
}
