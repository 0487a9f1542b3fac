//! Scripted pointer used to exercise avoidance and collision headlessly.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wander_motion::Vec2;

/// Seconds the pointer hovers over the viewport before leaving.
const HOVER_SECONDS: f64 = 6.0;
/// Seconds the pointer stays away between hovers.
const AWAY_SECONDS: f64 = 4.0;
const JITTER_PX: f64 = 3.0;

/// Pointer that sweeps a Lissajous path around the viewport centre,
/// leaving and returning on a fixed cadence.
#[derive(Debug, Clone)]
pub struct SyntheticPointer {
    rng: ChaCha8Rng,
    last: Option<(f64, Vec2)>,
}

/// Pointer reading for a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl SyntheticPointer {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            last: None,
        }
    }

    /// Pointer position at `time`, or `None` while it is off the viewport.
    pub fn sample(&mut self, width: f64, height: f64, time: f64) -> Option<PointerSample> {
        if !Self::hovering(time) {
            self.last = None;
            return None;
        }

        let center = Vec2::new(width * 0.5, height * 0.5);
        let reach = Vec2::new(width * 0.35, height * 0.35);
        let jitter = Vec2::new(
            self.rng.gen_range(-JITTER_PX..=JITTER_PX),
            self.rng.gen_range(-JITTER_PX..=JITTER_PX),
        );
        let position = Vec2::new(
            (time * 0.7).sin().mul_add(reach.x, center.x),
            (time * 0.45).sin().mul_add(reach.y, center.y),
        ) + jitter;

        let velocity = match self.last {
            Some((last_time, last_position)) if time > last_time => {
                (position - last_position) * (1.0 / (time - last_time))
            }
            _ => Vec2::ZERO,
        };
        self.last = Some((time, position));
        Some(PointerSample { position, velocity })
    }

    fn hovering(time: f64) -> bool {
        time.rem_euclid(HOVER_SECONDS + AWAY_SECONDS) < HOVER_SECONDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_leaves_and_returns() {
        let mut pointer = SyntheticPointer::new(1);
        assert!(pointer.sample(800.0, 600.0, 0.5).is_some());
        assert!(pointer.sample(800.0, 600.0, 7.0).is_none());
        assert!(pointer.sample(800.0, 600.0, 10.5).is_some());
    }

    #[test]
    fn pointer_stays_near_its_path() {
        let mut pointer = SyntheticPointer::new(9);
        for i in 0..300 {
            let t = f64::from(i) / 60.0;
            let sample = pointer.sample(800.0, 600.0, t).unwrap();
            assert!((0.0..=800.0).contains(&sample.position.x));
            assert!((0.0..=600.0).contains(&sample.position.y));
        }
    }

    #[test]
    fn first_sample_after_entry_has_no_velocity() {
        let mut pointer = SyntheticPointer::new(3);
        let first = pointer.sample(800.0, 600.0, 0.0).unwrap();
        assert_eq!(first.velocity, Vec2::ZERO);
        let second = pointer.sample(800.0, 600.0, 1.0 / 60.0).unwrap();
        assert!(second.velocity.length() > 0.0);
    }

    #[test]
    fn same_seed_replays_the_same_path() {
        let mut a = SyntheticPointer::new(5);
        let mut b = SyntheticPointer::new(5);
        for i in 0..120 {
            let t = f64::from(i) / 60.0;
            assert_eq!(a.sample(640.0, 360.0, t), b.sample(640.0, 360.0, t));
        }
    }
}
