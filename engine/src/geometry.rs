use std::f32::consts::PI;

use glam::Vec2;
use turborand::TurboRand;

/// Normalizes any angle (including negative or multi-turn values) into
/// `[0, 360)`.
pub fn normalize_angle(angle: f32) -> f32 {
  let angle = angle.rem_euclid(360.0);

  // `rem_euclid` can round up to exactly 360 for tiny negative inputs.
  if angle >= 360.0 { 0.0 } else { angle }
}

/// Moves a point along a heading using the standard trigonometric
/// convention: 0 degrees points along +x and angles grow towards +y.
pub fn move_point(point: Vec2, degrees: f32, length: f32) -> Vec2 {
  point + Vec2::from_angle(degrees.to_radians()) * length
}

pub fn random_range(rng: &mut impl TurboRand, min: f32, max: f32) -> f32 {
  if max <= min {
    min
  } else {
    min + rng.f32() * (max - min)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
  pub min: Vec2,
  pub max: Vec2,
}

impl Bounds {
  pub fn new(min: Vec2, max: Vec2) -> Self {
    Self { min, max }
  }

  pub fn contains(&self, point: Vec2) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
  }

  /// Shrinks the bounds by `margin` on every side. A margin larger than half
  /// the extent collapses that axis onto its center.
  pub fn shrink(&self, margin: f32) -> Self {
    let center = (self.min + self.max) * 0.5;
    let min = (self.min + Vec2::splat(margin)).min(center);
    let max = (self.max - Vec2::splat(margin)).max(center);

    Self { min, max }
  }

  pub fn random_point(&self, rng: &mut impl TurboRand) -> Vec2 {
    Vec2::new(
      random_range(rng, self.min.x, self.max.x),
      random_range(rng, self.min.y, self.max.y),
    )
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CirclePoint {
  pub position: Vec2,
  pub angle: f32,
}

pub fn get_random_point_on_circle(
  center: Vec2,
  radius: f32,
  rng: &mut impl TurboRand,
) -> CirclePoint {
  // Generate a random angle in radians
  let random_angle = rng.f32() * 2.0 * PI;

  let offset = Vec2::from_angle(random_angle) * radius;
  let position = center + offset;

  CirclePoint {
    position,
    angle: random_angle,
  }
}
