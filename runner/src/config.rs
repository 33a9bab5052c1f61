use std::path::Path;

use engine::{
  command::Command, config::EngineConfig, engine::Engine,
  entities::aircraft::Aircraft,
};
use glam::Vec2;
use internment::Intern;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use turborand::rng::Rng;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file '{path}': {source}")]
  Read {
    path: String,
    source: std::io::Error,
  },
  #[error("failed to parse config file: {0}")]
  Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub engine: EngineConfig,
  pub runner: RunnerConfig,
  /// Aircraft placed in the airspace before the first tick.
  pub aircraft: Vec<AircraftConfig>,
  pub script: Vec<ScriptEntry>,
}

impl Config {
  pub fn from_path<T>(path: T) -> Result<Self, ConfigError>
  where
    T: AsRef<Path>,
  {
    let path = path.as_ref();
    let config =
      std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
      })?;

    Self::from_toml(&config)
  }

  pub fn from_toml(string: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(string)?)
  }

  /// Builds an engine with the configured aircraft in place. Without a
  /// script the engine is started right away; a script is expected to issue
  /// its own start command.
  pub fn build_engine(&self, rng: Rng) -> Engine {
    let mut engine = Engine::new(self.engine.clone(), rng);

    if let Some(speed) = self.runner.speed_multiplier {
      engine.set_speed_multiplier(speed);
    }

    for aircraft in self.aircraft.iter() {
      engine.add_aircraft(aircraft.to_aircraft());
    }

    if self.script.is_empty() {
      engine.start();
    }

    engine
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
  pub seed: Option<u64>,
  pub ticks: Option<u64>,
  pub tick_rate: Option<usize>,
  pub speed_multiplier: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftConfig {
  pub id: String,
  pub x: f32,
  pub y: f32,
  pub altitude: f32,
  #[serde(default)]
  pub heading: f32,
  #[serde(default = "default_speed")]
  pub speed: f32,
  pub fuel: Option<f32>,
  #[serde(default)]
  pub landing_requested: bool,
}

fn default_speed() -> f32 {
  600.0
}

impl AircraftConfig {
  pub fn to_aircraft(&self) -> Aircraft {
    let mut aircraft = Aircraft::new(
      Intern::from(self.id.clone()),
      Vec2::new(self.x, self.y),
      self.altitude,
      self.heading,
      self.speed,
    );

    if let Some(fuel) = self.fuel {
      aircraft = aircraft.with_fuel(fuel);
    }

    if self.landing_requested {
      aircraft.request_landing();
    }

    aircraft
  }
}

/// A command applied right before the given driver step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
  pub at: u64,
  pub command: Command,
}
