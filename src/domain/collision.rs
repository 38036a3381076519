/// Spatial collision utility.
///
/// Everything in the arena is a circle: the player, enemies, projectiles,
/// pickups and keys. Passage triggers are the one exception and use an
/// axis-aligned rectangle.
///
/// Queries here are pure: no world access, no allocation.

use std::ops::{Add, AddAssign, Mul, Sub};

/// A point or direction in arena coordinates (origin top-left, y down).
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Unit vector at `angle` radians.
    pub fn from_angle(angle: f32) -> Self {
        Vec2 { x: angle.cos(), y: angle.sin() }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len <= f32::EPSILON {
            Vec2::ZERO
        } else {
            Vec2 { x: self.x / len, y: self.y / len }
        }
    }

    /// Direction from `self` to `target` scaled to `speed`.
    pub fn velocity_toward(self, target: Vec2, speed: f32) -> Vec2 {
        (target - self).normalized() * speed
    }

    /// Move up to `step` units toward `target` without overshooting.
    pub fn step_toward(self, target: Vec2, step: f32) -> Vec2 {
        let d = self.distance(target);
        if d <= step {
            target
        } else {
            self + self.velocity_toward(target, step)
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, k: f32) -> Vec2 {
        Vec2 { x: self.x * k, y: self.y * k }
    }
}

/// Axis-aligned rectangle, `(x, y)` is the top-left corner.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// Strict containment: a point on the border is outside.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x > self.x && p.x < self.x + self.w && p.y > self.y && p.y < self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

// ══════════════════════════════════════════════════════════════
// Queries
// ══════════════════════════════════════════════════════════════

/// Circle-circle overlap. Touching circles do not overlap.
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Is `p` within `radius` of `center`? (area effects)
pub fn within_radius(center: Vec2, p: Vec2, radius: f32) -> bool {
    center.distance(p) < radius
}

/// Keep a circle of `radius` fully inside a `w` x `h` arena.
pub fn clamp_to_arena(p: Vec2, radius: f32, w: f32, h: f32) -> Vec2 {
    Vec2 {
        x: p.x.max(radius).min((w - radius).max(radius)),
        y: p.y.max(radius).min((h - radius).max(radius)),
    }
}

/// Has a point left the arena?
pub fn out_of_bounds(p: Vec2, w: f32, h: f32) -> bool {
    p.x < 0.0 || p.x > w || p.y < 0.0 || p.y > h
}

/// Shortest distance from `p` to the segment `a..b`.
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
