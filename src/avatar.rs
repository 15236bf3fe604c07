use crate::collision::Aabb;
use crate::config::Config;

/// The dinosaur. It never moves horizontally; the world scrolls past it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Avatar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub vy: f64,
    pub on_ground: bool,
}

impl Avatar {
    /// Standing on the ground line, at rest.
    pub fn grounded(config: &Config) -> Self {
        Self {
            x: config.avatar_x,
            y: config.ground_y - config.avatar_size,
            width: config.avatar_size,
            height: config.avatar_size,
            vy: 0.0,
            on_ground: true,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    /// One frame of gravity. Contact is re-established by the ground pass.
    pub fn integrate(&mut self, gravity: f64) {
        self.vy += gravity;
        self.y += self.vy;
        self.on_ground = false;
    }

    pub fn land(&mut self, ground_y: f64) {
        self.y = ground_y - self.height;
        self.vy = 0.0;
        self.on_ground = true;
    }

    /// Flat floor: anything at or below the ground line snaps onto it.
    pub fn resolve_flat_ground(&mut self, ground_y: f64) {
        if self.bottom() >= ground_y {
            self.land(ground_y);
        }
    }

    pub fn launch(&mut self, impulse: f64) {
        self.vy = -impulse;
        self.on_ground = false;
    }
}
