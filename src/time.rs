use std::time::Duration;

/// Frame time is capped so a stall does not fast-forward the run.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(250);

/// Fixed-timestep accumulator: wall-clock time in, whole simulation steps out.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: Duration,
    max_frame: Duration,
    accumulator: Duration,
}

impl FixedStep {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            step: Duration::from_secs(1) / tick_rate.max(1),
            max_frame: MAX_FRAME_TIME,
            accumulator: Duration::ZERO,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Feeds `dt` and returns how many steps are due.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        let dt = if dt > self.max_frame {
            log::warn!(
                "Frame took {:.1}ms, capping to {}ms",
                dt.as_secs_f64() * 1000.0,
                self.max_frame.as_millis()
            );
            self.max_frame
        } else {
            dt
        };

        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_per_tick() {
        let mut clock = FixedStep::new(60);
        let step = clock.step();
        assert_eq!(clock.advance(step), 1);
        assert_eq!(clock.advance(step * 3), 3);
    }

    #[test]
    fn remainder_carries_over() {
        let mut clock = FixedStep::new(60);
        let half = clock.step() / 2;
        assert_eq!(clock.advance(half), 0);
        assert_eq!(clock.advance(half), 1);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut clock = FixedStep::new(60);
        let steps = clock.advance(Duration::from_secs(5));
        assert_eq!(steps, 15);
    }
}
