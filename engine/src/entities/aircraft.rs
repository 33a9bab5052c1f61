use core::fmt;

use glam::Vec2;
use internment::Intern;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use turborand::TurboRand;

use crate::{
  config::AirspaceConfig,
  geometry::{move_point, normalize_angle, random_range},
};

pub const MAX_FUEL: f32 = 100.0;
pub const LOW_FUEL: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum IncidentKind {
  Medical,
  EngineFailure,
  Pressurization,
  BirdStrike,
}

impl IncidentKind {
  pub const ALL: [IncidentKind; 4] = [
    IncidentKind::Medical,
    IncidentKind::EngineFailure,
    IncidentKind::Pressurization,
    IncidentKind::BirdStrike,
  ];
}

impl fmt::Display for IncidentKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Medical => write!(f, "medical emergency"),
      Self::EngineFailure => write!(f, "engine failure"),
      Self::Pressurization => write!(f, "cabin pressurization loss"),
      Self::BirdStrike => write!(f, "bird strike"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Aircraft {
  #[ts(as = "String")]
  pub id: Intern<String>,

  /// Position in kilometers.
  #[ts(as = "(f32, f32)")]
  pub pos: Vec2,
  /// Altitude in meters.
  pub altitude: f32,
  /// Heading in degrees, always within `[0, 360)`.
  pub heading: f32,
  /// Ground speed in km/h.
  pub speed: f32,
  /// Remaining fuel as a percentage.
  pub fuel: f32,
  /// Fuel percentage consumed per simulated hour.
  pub fuel_burn_rate: f32,

  pub airborne: bool,
  pub landed: bool,
  pub landing_requested: bool,
  pub incident: Option<IncidentKind>,
  pub collision_alert: bool,
  /// Seconds of continuous storm exposure.
  pub storm_exposure: f32,
}

impl Aircraft {
  pub fn new(
    id: impl Into<Intern<String>>,
    pos: Vec2,
    altitude: f32,
    heading: f32,
    speed: f32,
  ) -> Self {
    Self {
      id: id.into(),

      pos,
      altitude: altitude.max(0.0),
      heading: normalize_angle(heading),
      speed: speed.max(0.0),
      fuel: MAX_FUEL,
      fuel_burn_rate: AirspaceConfig::default().fuel_burn_rate,

      airborne: true,
      landed: false,
      landing_requested: false,
      incident: None,
      collision_alert: false,
      storm_exposure: 0.0,
    }
  }

  /// Creates an aircraft with a random heading and a speed drawn from the
  /// configured range.
  pub fn random(
    id: Intern<String>,
    pos: Vec2,
    altitude: f32,
    config: &AirspaceConfig,
    rng: &mut impl TurboRand,
  ) -> Self {
    let heading = rng.f32() * 360.0;
    let speed = random_range(rng, config.min_speed, config.max_speed).round();

    Self::new(id, pos, altitude, heading, speed)
      .with_fuel_burn_rate(config.fuel_burn_rate)
  }

  pub fn with_fuel(mut self, fuel: f32) -> Self {
    self.fuel = fuel.clamp(0.0, MAX_FUEL);
    self
  }

  pub fn with_fuel_burn_rate(mut self, rate: f32) -> Self {
    self.fuel_burn_rate = rate.max(0.0);
    self
  }

  pub fn random_callsign(rng: &mut impl TurboRand) -> String {
    let mut string = String::new();
    let airlines = ["AAL", "SKW", "JBU", "AFR", "DAL", "UAL"];

    let airline = rng.sample(&airlines).unwrap_or(&"AAL");

    string.push_str(airline);
    for _ in 0..4 {
      string.push_str(&rng.u8(0..=9).to_string());
    }

    string
  }
}

// Mutators
impl Aircraft {
  /// Moves the aircraft along its heading and burns fuel for the given
  /// amount of simulated time.
  pub fn advance(&mut self, elapsed_hours: f32) {
    if !self.airborne || elapsed_hours <= 0.0 || !elapsed_hours.is_finite() {
      return;
    }

    self.pos = move_point(self.pos, self.heading, self.speed * elapsed_hours);
    self.fuel = (self.fuel - self.fuel_burn_rate * elapsed_hours).max(0.0);
    self.heading = normalize_angle(self.heading);
  }

  pub fn set_heading(&mut self, degrees: f32) {
    if degrees.is_finite() {
      self.heading = normalize_angle(degrees);
    }
  }

  pub fn climb(&mut self, delta: f32) {
    if delta.is_finite() {
      self.altitude += delta.abs();
    }
  }

  pub fn descend(&mut self, delta: f32) {
    if delta.is_finite() {
      self.altitude = (self.altitude - delta.abs()).max(0.0);
    }
  }

  /// Climbs for a positive delta and descends for a negative one.
  pub fn change_altitude(&mut self, delta: f32) {
    if delta >= 0.0 {
      self.climb(delta);
    } else {
      self.descend(-delta);
    }
  }

  pub fn request_landing(&mut self) {
    self.landing_requested = true;
  }

  /// Declares an incident unless one is already active. Returns whether the
  /// incident was recorded.
  pub fn declare_incident(&mut self, kind: IncidentKind) -> bool {
    if self.incident.is_some() {
      return false;
    }

    self.incident = Some(kind);
    true
  }
}

// Queries
impl Aircraft {
  pub fn incident_declared(&self) -> bool {
    self.incident.is_some()
  }

  pub fn is_low_on_fuel(&self) -> bool {
    self.fuel < LOW_FUEL
  }

  pub fn is_in_emergency(&self) -> bool {
    self.is_low_on_fuel() || self.collision_alert || self.incident_declared()
  }

  pub fn is_out_of_fuel(&self) -> bool {
    self.fuel <= 0.0
  }
}
