use glam::Vec2;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StormZone {
  #[ts(as = "(f32, f32)")]
  pub center: Vec2,
  pub radius: f32,
  /// Ticks left before the storm dissipates.
  pub lifetime: u32,
}

impl StormZone {
  pub fn new(center: Vec2, radius: f32, lifetime: u32) -> Self {
    Self {
      center,
      radius: radius.max(0.0),
      lifetime,
    }
  }

  pub fn contains(&self, point: Vec2) -> bool {
    point.distance(self.center) < self.radius
  }

  pub fn tick(&mut self) {
    self.lifetime = self.lifetime.saturating_sub(1);
  }

  pub fn is_expired(&self) -> bool {
    self.lifetime == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_contains_is_strict() {
    let storm = StormZone::new(Vec2::ZERO, 10.0, 5);
    assert!(storm.contains(Vec2::new(9.9, 0.0)));
    assert!(!storm.contains(Vec2::new(10.0, 0.0)));
    assert!(!storm.contains(Vec2::new(0.0, -12.0)));
  }

  #[test]
  fn test_tick_expires() {
    let mut storm = StormZone::new(Vec2::ZERO, 10.0, 2);
    storm.tick();
    assert!(!storm.is_expired());
    storm.tick();
    assert!(storm.is_expired());
    storm.tick();
    assert_eq!(storm.lifetime, 0);
  }
}
