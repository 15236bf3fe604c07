use rand::Rng;

use crate::collision::Aabb;
use crate::config::Config;

/// A solid log standing on the ground line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Log {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Log {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }
}

/// A stretch of floor, either walkable or a hole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSegment {
    pub x: f64,
    pub width: f64,
    pub is_gap: bool,
}

/// Anything that scrolls left with the world.
pub trait Scrolling {
    fn x_mut(&mut self) -> &mut f64;
    fn right(&self) -> f64;
}

impl Scrolling for Log {
    fn x_mut(&mut self) -> &mut f64 {
        &mut self.x
    }

    fn right(&self) -> f64 {
        self.x + self.width
    }
}

impl Scrolling for GroundSegment {
    fn x_mut(&mut self) -> &mut f64 {
        &mut self.x
    }

    fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Move everything left by `speed` and drop what has fully left the playfield.
/// An item whose right edge sits exactly at 0 is gone.
pub fn scroll<T: Scrolling>(items: &mut Vec<T>, speed: f64) {
    for item in items.iter_mut() {
        *item.x_mut() -= speed;
    }
    items.retain(|item| item.right() > 0.0);
}

pub fn new_log(config: &Config, rng: &mut impl Rng) -> Log {
    let width = sample(rng, config.log_width_min, config.log_width_max);
    Log {
        x: config.width,
        y: config.ground_y - config.log_height,
        width,
        height: config.log_height,
    }
}

pub fn new_ground_segment(config: &Config, rng: &mut impl Rng, x: f64) -> GroundSegment {
    let is_gap = rng.gen_bool(config.effective_gap_chance());
    let width = if is_gap {
        sample(rng, config.gap_width_min, config.gap_width_max)
    } else {
        sample(rng, config.solid_width_min, config.solid_width_max)
    };
    GroundSegment { x, width, is_gap }
}

fn sample(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    if max > min { rng.gen_range(min..max) } else { min }
}

/// Frame counter that fires once it exceeds its interval, then starts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnTimer {
    ticks: u32,
    interval: u32,
}

impl SpawnTimer {
    pub fn new(interval: u32) -> Self {
        Self { ticks: 0, interval }
    }

    pub fn tick(&mut self) -> bool {
        self.ticks += 1;
        if self.ticks > self.interval {
            self.ticks = 0;
            true
        } else {
            false
        }
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}

/// The floor, tiled from contiguous segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Ground {
    segments: Vec<GroundSegment>,
}

impl Ground {
    /// A single solid segment under the whole playfield.
    pub fn solid(config: &Config) -> Self {
        Self {
            segments: vec![GroundSegment {
                x: 0.0,
                width: config.width,
                is_gap: false,
            }],
        }
    }

    pub fn segments(&self) -> &[GroundSegment] {
        &self.segments
    }

    /// Scroll, cull, then extend at the right edge until the playfield is covered.
    pub fn advance(&mut self, speed: f64, config: &Config, rng: &mut impl Rng) {
        scroll(&mut self.segments, speed);
        loop {
            let edge = self.segments.last().map_or(0.0, GroundSegment::right);
            if edge > config.width {
                break;
            }
            let segment = new_ground_segment(config, rng, edge);
            if segment.is_gap {
                log::trace!("Gap of {:.0} at {:.0}", segment.width, segment.x);
            }
            self.segments.push(segment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn log_spawns_at_right_edge_on_the_ground() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let log = new_log(&config, &mut rng);
            assert_eq!(log.x, config.width);
            assert_eq!(log.y + log.height, config.ground_y);
            assert!(log.width >= config.log_width_min && log.width < config.log_width_max);
        }
    }

    #[test]
    fn no_gaps_when_disabled() {
        let config = Config {
            gaps: false,
            ..Config::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let seg = new_ground_segment(&config, &mut rng, 0.0);
            assert!(!seg.is_gap);
            assert!(seg.width >= config.solid_width_min);
        }
    }

    #[test]
    fn gap_ratio_is_roughly_a_quarter() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(99);
        let gaps = (0..4000)
            .filter(|_| new_ground_segment(&config, &mut rng, 0.0).is_gap)
            .count();
        assert!((800..1200).contains(&gaps), "gaps = {gaps}");
    }

    #[test]
    fn scroll_removes_at_exactly_zero() {
        let mut logs = vec![
            Log { x: 10.0, y: 0.0, width: 4.0, height: 1.0 },
            Log { x: 10.0, y: 0.0, width: 5.0, height: 1.0 },
            Log { x: 30.0, y: 0.0, width: 5.0, height: 1.0 },
        ];
        scroll(&mut logs, 14.0);
        // right edges: 0.0 (removed), 1.0, 21.0
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].width, 5.0);
        assert_eq!(logs[1].x, 16.0);
    }

    #[test]
    fn timer_fires_after_exceeding_interval() {
        let mut timer = SpawnTimer::new(90);
        for _ in 0..90 {
            assert!(!timer.tick());
        }
        assert!(timer.tick(), "91st tick fires");
        assert_eq!(timer.ticks(), 0);
    }

    #[test]
    fn ground_stays_contiguous_and_covers_playfield() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut ground = Ground::solid(&config);
        for _ in 0..2000 {
            ground.advance(9.0, &config, &mut rng);
            let segs = ground.segments();
            assert!(segs[0].right() > 0.0);
            assert!(segs[segs.len() - 1].right() > config.width);
            for pair in segs.windows(2) {
                assert!((pair[0].right() - pair[1].x).abs() < 1e-9);
            }
        }
    }
}
