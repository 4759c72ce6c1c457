//! Air and contact duration bookkeeping.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Absolute tolerance when comparing a duration against one timestep.
const FIRST_STEP_TOL: f64 = 1e-8;

/// Durations of the current and previous air/contact phases of one element.
///
/// All values are in seconds and zero after [`AirTimeTracker::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AirTimeTracker {
    /// Time since the element last left contact; zero while in contact.
    pub current_air_time: f64,
    /// Time since the element last made contact; zero while airborne.
    pub current_contact_time: f64,
    /// Length of the most recently completed air phase.
    pub last_air_time: f64,
    /// Length of the most recently completed contact phase.
    pub last_contact_time: f64,
}

impl AirTimeTracker {
    /// Advance by one step of length `dt`.
    ///
    /// On a transition the phase that just ended is latched into
    /// `last_air_time` or `last_contact_time`.
    pub fn update(&mut self, in_contact: bool, dt: f64) {
        if in_contact {
            if self.current_air_time > 0.0 {
                self.last_air_time = self.current_air_time;
            }
            self.current_air_time = 0.0;
            self.current_contact_time += dt;
        } else {
            if self.current_contact_time > 0.0 {
                self.last_contact_time = self.current_contact_time;
            }
            self.current_contact_time = 0.0;
            self.current_air_time += dt;
        }
    }

    /// Check if contact was made during the last step of length `dt`.
    #[must_use]
    pub fn compute_first_contact(&self, dt: f64) -> bool {
        self.current_contact_time > 0.0 && self.current_contact_time < dt + FIRST_STEP_TOL
    }

    /// Check if contact was lost during the last step of length `dt`.
    #[must_use]
    pub fn compute_first_air(&self, dt: f64) -> bool {
        self.current_air_time > 0.0 && self.current_air_time < dt + FIRST_STEP_TOL
    }

    /// Zero every duration.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f64 = 0.02;

    #[test]
    fn test_air_time_accumulates_while_airborne() {
        let mut t = AirTimeTracker::default();
        let mut previous = 0.0;
        for _ in 0..10 {
            t.update(false, DT);
            assert!(t.current_air_time > previous);
            previous = t.current_air_time;
        }
        assert_relative_eq!(t.current_air_time, 10.0 * DT, epsilon = 1e-12);
        assert_eq!(t.current_contact_time, 0.0);
    }

    #[test]
    fn test_touchdown_latches_air_phase() {
        let mut t = AirTimeTracker::default();
        for _ in 0..5 {
            t.update(false, DT);
        }
        t.update(true, DT);
        assert_relative_eq!(t.last_air_time, 5.0 * DT, epsilon = 1e-12);
        assert_eq!(t.current_air_time, 0.0);
        assert!(t.compute_first_contact(DT));

        t.update(true, DT);
        assert!(!t.compute_first_contact(DT));
    }

    #[test]
    fn test_liftoff_latches_contact_phase() {
        let mut t = AirTimeTracker::default();
        for _ in 0..3 {
            t.update(true, DT);
        }
        t.update(false, DT);
        assert_relative_eq!(t.last_contact_time, 3.0 * DT, epsilon = 1e-12);
        assert!(t.compute_first_air(DT));
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut t = AirTimeTracker::default();
        t.update(false, DT);
        t.update(true, DT);
        t.update(false, DT);
        t.reset();
        assert_eq!(t, AirTimeTracker::default());
        assert!(!t.compute_first_air(DT));
    }
}
