use crate::geometry::Camera;
use std::time::{Duration, Instant};

/// Cubic ease-out over `t` in `[0, 1]`.
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Time-boxed eased transition between two cameras.
///
/// The clock starts at the first [`sample`](Self::sample) so an animation
/// created between frames does not skip ahead.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraAnimation {
    from: Camera,
    to: Camera,
    duration: Duration,
    started: Option<Instant>,
}

impl CameraAnimation {
    pub fn new(from: Camera, to: Camera, duration: Duration) -> Self {
        Self { from, to, duration, started: None }
    }

    pub fn target(&self) -> Camera {
        self.to
    }

    /// Camera at `now` and whether the animation has finished.
    pub fn sample(&mut self, now: Instant) -> (Camera, bool) {
        let started = *self.started.get_or_insert(now);
        if self.duration.is_zero() {
            return (self.to, true);
        }
        let elapsed = now.saturating_duration_since(started);
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        if t >= 1.0 {
            (self.to, true)
        } else {
            (self.from.lerp(&self.to, ease_out_cubic(t)), false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_cubic_endpoints_and_shape() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
        assert_eq!(ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn test_animation_starts_on_first_sample() {
        let from = Camera::new(0.0, 0.0, 1.0);
        let to = Camera::new(100.0, 0.0, 2.0);
        let mut anim = CameraAnimation::new(from, to, Duration::from_millis(300));
        let t0 = Instant::now();

        assert_eq!(anim.sample(t0), (from, false));
        let (mid, done) = anim.sample(t0 + Duration::from_millis(150));
        assert!(!done);
        assert!(mid.x > 50.0 && mid.x < 100.0);
        assert_eq!(anim.sample(t0 + Duration::from_millis(300)), (to, true));
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let to = Camera::new(1.0, 2.0, 3.0);
        let mut anim = CameraAnimation::new(Camera::default(), to, Duration::ZERO);
        assert_eq!(anim.sample(Instant::now()), (to, true));
    }
}
