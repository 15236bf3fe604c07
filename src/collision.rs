use crate::avatar::Avatar;
use crate::obstacle::{GroundSegment, Log, Scrolling};

/// Axis-aligned box anchored at its top-left corner, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Aabb {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Strict overlap on both axes; touching edges do not count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

/// Ways a run can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fatal {
    HitLog,
    FellIntoGap,
}

impl Fatal {
    pub fn message(self) -> &'static str {
        match self {
            Fatal::HitLog => "GAME OVER",
            Fatal::FellIntoGap => "YOU FELL INTO THE ABYSS",
        }
    }
}

pub fn hits_any_log(avatar: &Avatar, logs: &[Log]) -> bool {
    let body = avatar.bounds();
    logs.iter().any(|log| body.overlaps(&log.bounds()))
}

/// Whether a solid segment catches the avatar this frame.
///
/// The avatar must be horizontally over solid ground, falling or at rest, at
/// or below the ground line, and must have started the frame no deeper than
/// `band` below it. Checking the band on the pre-step position keeps a fast
/// fall from passing through the floor.
pub fn supported_by(avatar: &Avatar, segments: &[GroundSegment], ground_y: f64, band: f64) -> bool {
    if avatar.vy < 0.0 || avatar.bottom() < ground_y {
        return false;
    }
    let previous_bottom = avatar.bottom() - avatar.vy;
    if previous_bottom > ground_y + band {
        return false;
    }
    segments
        .iter()
        .filter(|seg| !seg.is_gap)
        .any(|seg| avatar.right() > seg.x && avatar.x < seg.right())
}

pub fn fell_out(avatar: &Avatar, playfield_height: f64) -> bool {
    avatar.y > playfield_height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn solid(x: f64, width: f64) -> GroundSegment {
        GroundSegment { x, width, is_gap: false }
    }

    fn gap(x: f64, width: f64) -> GroundSegment {
        GroundSegment { x, width, is_gap: true }
    }

    #[test]
    fn overlap_requires_all_four_conditions() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Aabb::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Aabb::new(10.0, 0.0, 5.0, 5.0)), "touching on x");
        assert!(!a.overlaps(&Aabb::new(0.0, 10.0, 5.0, 5.0)), "touching on y");
        assert!(!a.overlaps(&Aabb::new(-6.0, 0.0, 5.0, 5.0)));
        assert!(!a.overlaps(&Aabb::new(0.0, -6.0, 5.0, 5.0)));
    }

    #[test]
    fn log_hit_detected() {
        let config = Config::default();
        let avatar = Avatar::grounded(&config);
        let log = Log {
            x: avatar.right() - 1.0,
            y: config.ground_y - 40.0,
            width: 30.0,
            height: 40.0,
        };
        assert!(hits_any_log(&avatar, &[log]));

        let cleared = Log { x: avatar.right(), ..log };
        assert!(!hits_any_log(&avatar, &[cleared]));
    }

    #[test]
    fn supported_over_solid_segment() {
        let config = Config::default();
        let mut avatar = Avatar::grounded(&config);
        avatar.y += 3.0;
        avatar.vy = 3.0;
        let ground = [solid(0.0, 200.0)];
        assert!(supported_by(&avatar, &ground, config.ground_y, config.support_band));
    }

    #[test]
    fn not_supported_over_gap() {
        let config = Config::default();
        let mut avatar = Avatar::grounded(&config);
        avatar.y += 3.0;
        avatar.vy = 3.0;
        let ground = [solid(0.0, 50.0), gap(50.0, 200.0)];
        assert!(!supported_by(&avatar, &ground, config.ground_y, config.support_band));
    }

    #[test]
    fn not_supported_while_rising() {
        let config = Config::default();
        let mut avatar = Avatar::grounded(&config);
        avatar.vy = -2.0;
        let ground = [solid(0.0, 800.0)];
        assert!(!supported_by(&avatar, &ground, config.ground_y, config.support_band));
    }

    #[test]
    fn fast_fall_is_still_caught() {
        let config = Config::default();
        let mut avatar = Avatar::grounded(&config);
        // Crossed the ground line by 23 units in a single frame.
        avatar.vy = 24.0;
        avatar.y += 23.0;
        let ground = [solid(0.0, 800.0)];
        assert!(supported_by(&avatar, &ground, config.ground_y, config.support_band));
    }

    #[test]
    fn sunk_below_band_stays_unsupported() {
        let config = Config::default();
        let mut avatar = Avatar::grounded(&config);
        avatar.y += 40.0;
        avatar.vy = 5.0;
        let ground = [solid(0.0, 800.0)];
        assert!(!supported_by(&avatar, &ground, config.ground_y, config.support_band));
    }

    #[test]
    fn falling_out_is_strictly_below_playfield() {
        let config = Config::default();
        let mut avatar = Avatar::grounded(&config);
        avatar.y = config.height;
        assert!(!fell_out(&avatar, config.height));
        avatar.y += 0.1;
        assert!(fell_out(&avatar, config.height));
    }
}
