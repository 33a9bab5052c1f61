use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Bounds;

/// Geometry and thresholds owned by the airspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirspaceConfig {
  /// Lower-left corner of the airspace, in kilometers.
  pub min: Vec2,
  /// Upper-right corner of the airspace, in kilometers.
  pub max: Vec2,
  /// Keep-out distance from the boundary for spawned aircraft and storms.
  pub spawn_margin: f32,

  pub airport: Vec2,
  pub approach_radius: f32,
  /// Landing is only possible strictly below this altitude, in meters.
  pub approach_ceiling: f32,

  pub crash_lateral: f32,
  pub crash_altitude: f32,
  pub conflict_lateral: f32,
  pub conflict_altitude: f32,

  /// Distance from an existing aircraft at which a forced-conflict spawn is
  /// placed.
  pub conflict_ring_offset: f32,

  pub min_spawn_altitude: f32,
  pub max_spawn_altitude: f32,
  pub altitude_step: f32,

  pub min_speed: f32,
  pub max_speed: f32,
  /// Fuel percentage consumed per simulated hour.
  pub fuel_burn_rate: f32,

  pub min_storm_radius: f32,
  pub max_storm_radius: f32,
  pub min_storm_lifetime: u32,
  pub max_storm_lifetime: u32,
  pub max_storms: usize,
  /// Per-tick chance of dropping the oldest storm while over `max_storms`.
  pub storm_eviction_chance: f64,
}

impl Default for AirspaceConfig {
  fn default() -> Self {
    Self {
      min: Vec2::ZERO,
      max: Vec2::splat(800.0),
      spawn_margin: 50.0,

      airport: Vec2::splat(400.0),
      approach_radius: 30.0,
      approach_ceiling: 3000.0,

      crash_lateral: 10.0,
      crash_altitude: 300.0,
      conflict_lateral: 50.0,
      conflict_altitude: 1000.0,

      conflict_ring_offset: 40.0,

      min_spawn_altitude: 2000.0,
      max_spawn_altitude: 10000.0,
      altitude_step: 500.0,

      min_speed: 400.0,
      max_speed: 800.0,
      fuel_burn_rate: 60.0,

      min_storm_radius: 30.0,
      max_storm_radius: 80.0,
      min_storm_lifetime: 60,
      max_storm_lifetime: 240,
      max_storms: 3,
      storm_eviction_chance: 0.1,
    }
  }
}

impl AirspaceConfig {
  pub fn bounds(&self) -> Bounds {
    Bounds::new(self.min, self.max)
  }

  pub fn spawn_bounds(&self) -> Bounds {
    self.bounds().shrink(self.spawn_margin)
  }
}

/// Scoring weights applied to the ledger after every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
  pub landing: i64,
  pub resolution: i64,
  pub loss: i64,
}

impl Default for ScoreWeights {
  fn default() -> Self {
    Self {
      landing: 100,
      resolution: 50,
      loss: 150,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  pub airspace: AirspaceConfig,
  pub score: ScoreWeights,

  /// Wall-clock seconds represented by one tick at a 1x multiplier.
  pub tick_seconds: f32,
  /// Aircraft placed on construction and on every reset.
  pub seed_aircraft: usize,
  pub spawn_interval_ticks: u64,
  pub max_aircraft: usize,
  pub forced_conflict_chance: f64,

  pub storm_spawn_chance: f64,
  /// Seconds of continuous storm exposure an aircraft survives.
  pub storm_exposure_limit: f32,
  /// Exposure seconds shed per second spent outside a storm.
  pub storm_exposure_decay: f32,

  /// Per-aircraft, per-tick chance of a random incident.
  pub incident_chance: f64,
  pub low_fuel_threshold: f32,

  pub event_log_capacity: usize,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      airspace: AirspaceConfig::default(),
      score: ScoreWeights::default(),

      tick_seconds: 1.0,
      seed_aircraft: 4,
      spawn_interval_ticks: 20,
      max_aircraft: 12,
      forced_conflict_chance: 0.1,

      storm_spawn_chance: 0.01,
      storm_exposure_limit: 10.0,
      storm_exposure_decay: 1.0,

      incident_chance: 0.0005,
      low_fuel_threshold: 10.0,

      event_log_capacity: 256,
    }
  }
}

impl EngineConfig {
  /// A configuration with every random hazard switched off, for scripted
  /// scenarios.
  pub fn quiet() -> Self {
    Self {
      seed_aircraft: 0,
      forced_conflict_chance: 0.0,
      storm_spawn_chance: 0.0,
      incident_chance: 0.0,
      ..Self::default()
    }
  }
}
