//! Time-boxed linear interpolation of the orbit target toward a picked
//! point, modeled as an explicit two-state machine with a single owner.

use glam::Vec3;
use std::time::{Duration, Instant};

/// Fixed duration of a click-to-look retarget.
pub const LOOK_DURATION: Duration = Duration::from_millis(250);

/// Retarget animation state, queried once per render tick.
///
/// There is no queue: a new `begin` while interpolating simply
/// overwrites the slot (last write wins).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LookTransition {
    Idle,
    Interpolating {
        start: Vec3,
        end: Vec3,
        started: Instant,
        duration: Duration,
    },
}

impl LookTransition {
    pub fn begin(&mut self, start: Vec3, end: Vec3, now: Instant) {
        *self = Self::Interpolating {
            start,
            end,
            started: now,
            duration: LOOK_DURATION,
        };
    }

    /// Advance to `now`, returning the target to push into the orbit
    /// controller, or `None` when idle. Reaching the end point flips
    /// the state back to `Idle` in the same call.
    pub fn sample(&mut self, now: Instant) -> Option<Vec3> {
        match *self {
            Self::Idle => None,
            Self::Interpolating {
                start,
                end,
                started,
                duration,
            } => {
                let elapsed = now.saturating_duration_since(started).as_secs_f32();
                let t = (elapsed / duration.as_secs_f32()).clamp(0.0, 1.0);
                if t >= 1.0 {
                    *self = Self::Idle;
                    Some(end)
                } else {
                    Some(start.lerp(end, t))
                }
            }
        }
    }

    /// Force `Idle`. The recenter shortcut calls this so a running
    /// interpolation cannot clobber the reset on the next tick.
    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Interpolating { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    const END: Vec3 = Vec3::new(4.0, 1.0, -2.0);

    #[test]
    fn sample_at_start_returns_start() {
        let t0 = Instant::now();
        let mut look = LookTransition::Idle;
        look.begin(START, END, t0);
        assert_eq!(look.sample(t0), Some(START));
        assert!(look.is_active());
    }

    #[test]
    fn midpoint_lies_on_the_segment() {
        let t0 = Instant::now();
        let mut look = LookTransition::Idle;
        look.begin(START, END, t0);
        let mid = look.sample(t0 + Duration::from_millis(125)).unwrap();
        // Collinear with the endpoints and strictly between them.
        let along = (mid - START).dot((END - START).normalize());
        let off_axis = (mid - START).cross(END - START).length();
        assert!(off_axis < 1e-4);
        assert!(along > 0.0 && along < (END - START).length());
    }

    #[test]
    fn completion_returns_end_and_goes_idle() {
        let t0 = Instant::now();
        let mut look = LookTransition::Idle;
        look.begin(START, END, t0);
        assert_eq!(look.sample(t0 + LOOK_DURATION), Some(END));
        assert!(!look.is_active());
        assert_eq!(look.sample(t0 + LOOK_DURATION), None);
    }

    #[test]
    fn late_sample_still_lands_on_end() {
        let t0 = Instant::now();
        let mut look = LookTransition::Idle;
        look.begin(START, END, t0);
        assert_eq!(look.sample(t0 + Duration::from_secs(5)), Some(END));
    }

    #[test]
    fn new_begin_overrides_active_interpolation() {
        let t0 = Instant::now();
        let mut look = LookTransition::Idle;
        look.begin(START, END, t0);
        look.sample(t0 + Duration::from_millis(100));

        let newer_end = Vec3::new(-8.0, 0.0, 3.0);
        let t1 = t0 + Duration::from_millis(120);
        look.begin(START, newer_end, t1);
        assert_eq!(look.sample(t1 + LOOK_DURATION), Some(newer_end));
    }

    #[test]
    fn cancel_forces_idle() {
        let t0 = Instant::now();
        let mut look = LookTransition::Idle;
        look.begin(START, END, t0);
        look.cancel();
        assert!(!look.is_active());
        assert_eq!(look.sample(t0 + Duration::from_millis(10)), None);
    }
}
