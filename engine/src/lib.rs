use turborand::TurboRand;

pub mod command;
pub mod config;
pub mod engine;
pub mod entities;
pub mod geometry;
pub mod log;

pub const DEFAULT_TICK_RATE_TPS: usize = 10;

/// Rolls a weighted coin. Chances at or below zero (or NaN) never succeed and
/// chances above one always do.
pub fn roll(rng: &mut impl TurboRand, chance: f64) -> bool {
  if chance.is_nan() || chance <= 0.0 {
    false
  } else {
    rng.chance(chance.min(1.0))
  }
}

#[cfg(test)]
mod tests {
  use turborand::{SeededCore, rng::Rng};

  use super::roll;

  #[test]
  fn test_roll_extremes() {
    let mut rng = Rng::with_seed(0);
    for _ in 0..100 {
      assert!(!roll(&mut rng, 0.0));
      assert!(!roll(&mut rng, -1.0));
      assert!(!roll(&mut rng, f64::NAN));
      assert!(roll(&mut rng, 1.0));
      assert!(roll(&mut rng, 5.0));
    }
  }
}
