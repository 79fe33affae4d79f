//! Linear move planning
//!
//! A move is split into a number of increments. Every joint travels its own
//! distance in the same number of increments, so all joints start and
//! arrive together.

use super::position::PulsePosition;

/// Number of increments for a move that picks its own granularity
///
/// One increment per `speed` microseconds of the largest joint travel,
/// never fewer than one. A larger `speed` gives coarser, faster moves.
pub fn increments_for(max_abs_delta: u32, speed: u32) -> u32 {
    (max_abs_delta / speed.max(1)).max(1)
}

/// Pulse for increment `i` of `increments` between `previous` and `target`
///
/// `previous + floor(delta / increments * i)`, computed exactly in integers.
/// For `i < increments` this never reaches `target` when the move is
/// uneven; [`MovePlan::point`] lands the last increment on the target.
pub fn interpolate(previous: i32, target: i32, i: u32, increments: u32) -> i32 {
    let delta = target as i64 - previous as i64;
    let offset = (delta * i as i64).div_euclid(increments.max(1) as i64);
    (previous as i64 + offset) as i32
}

/// A planned move between two pulse-space positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MovePlan {
    pub from: PulsePosition,
    pub to: PulsePosition,
    /// Number of increments, at least one
    pub increments: u32,
}

impl MovePlan {
    /// Plan a move
    ///
    /// `steps > 0` fixes the increment count; `0` derives it from the
    /// largest joint travel and `speed`.
    pub fn new(from: PulsePosition, to: PulsePosition, steps: u32, speed: u32) -> Self {
        let increments = if steps > 0 {
            steps
        } else {
            increments_for(from.max_abs_delta(&to), speed)
        };
        Self {
            from,
            to,
            increments,
        }
    }

    /// Position written at increment `i`
    ///
    /// Increments run `0..increments`; the last one is the exact target.
    pub fn point(&self, i: u32) -> PulsePosition {
        if i + 1 >= self.increments {
            return self.to;
        }
        PulsePosition::from_fn(|joint| {
            interpolate(self.from.get(joint), self.to.get(joint), i, self.increments)
        })
    }

    /// Every position of the move in order
    pub fn points(&self) -> impl Iterator<Item = PulsePosition> + '_ {
        (0..self.increments).map(move |i| self.point(i))
    }

    /// Check if the move has no travel
    pub fn is_stationary(&self) -> bool {
        self.from == self.to
    }
}
