/// Time values handed to one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since attach.
    pub elapsed: f32,
    /// Seconds since the previous frame (zero for the first).
    pub delta: f32,
    /// Speed-scaled elapsed time.
    pub phase: f32,
}

/// Wall-clock derived elapsed time for one canvas.
///
/// The origin is captured at attach on the scheduler's clock. Frame
/// timestamps can land slightly before that origin (a frame that started
/// before attach ran), and hosts may deliver out-of-order stamps; neither may
/// move time backwards, so elapsed is clamped at zero and at the previous
/// value.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin_ms: f64,
    elapsed: f64,
    phase: f64,
}

impl FrameClock {
    pub fn new(origin_ms: f64) -> Self {
        Self {
            origin_ms,
            elapsed: 0.0,
            phase: 0.0,
        }
    }

    pub fn advance(&mut self, now_ms: f64, speed: f32) -> FrameTime {
        let raw = ((now_ms - self.origin_ms) / 1000.0).max(0.0);
        let elapsed = if raw.is_finite() {
            raw.max(self.elapsed)
        } else {
            self.elapsed
        };
        let delta = elapsed - self.elapsed;
        self.phase += delta * f64::from(speed);
        self.elapsed = elapsed;
        FrameTime {
            elapsed: elapsed as f32,
            delta: delta as f32,
            phase: self.phase as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_seconds_since_origin() {
        let mut clock = FrameClock::new(1_000.0);
        let time = clock.advance(2_500.0, 1.0);
        assert!((time.elapsed - 1.5).abs() < 1e-6);
        assert!((time.delta - 1.5).abs() < 1e-6);
    }

    #[test]
    fn never_moves_backwards() {
        let mut clock = FrameClock::new(100.0);
        let first = clock.advance(50.0, 1.0);
        assert_eq!(first.elapsed, 0.0);

        let mut last = 0.0;
        for stamp in [400.0, 1_100.0, 900.0, 1_100.0, 2_000.0, f64::NAN] {
            let time = clock.advance(stamp, 1.0);
            assert!(time.elapsed >= last);
            assert!(time.delta >= 0.0);
            last = time.elapsed;
        }
        assert!((last - 1.9).abs() < 1e-6);
    }

    #[test]
    fn phase_scales_with_speed() {
        let mut slow = FrameClock::new(0.0);
        let mut fast = FrameClock::new(0.0);
        let (mut slow_time, mut fast_time) = (None, None);
        for frame in 1..=120 {
            let stamp = frame as f64 * 16.6;
            slow_time = Some(slow.advance(stamp, 0.3));
            fast_time = Some(fast.advance(stamp, 0.7));
        }
        let (slow_time, fast_time) = (slow_time.unwrap(), fast_time.unwrap());
        let ratio = slow_time.phase / fast_time.phase;
        assert!((ratio - 0.3 / 0.7).abs() < 1e-4);
        assert_eq!(slow_time.elapsed, fast_time.elapsed);
    }

    #[test]
    fn frame_rate_does_not_change_elapsed() {
        let mut sparse = FrameClock::new(0.0);
        let mut dense = FrameClock::new(0.0);
        let sparse_last = (1..=30)
            .map(|frame| sparse.advance(frame as f64 * 33.3, 1.0))
            .last()
            .unwrap();
        let dense_last = (1..=60)
            .map(|frame| dense.advance(frame as f64 * 16.65, 1.0))
            .last()
            .unwrap();
        assert!((sparse_last.elapsed - dense_last.elapsed).abs() < 1e-4);
        assert!((sparse_last.delta - 0.0333).abs() < 1e-4);
        assert!((dense_last.delta - 0.01665).abs() < 1e-4);
    }
}
