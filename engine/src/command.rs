use core::fmt;

use internment::Intern;
use serde::{Deserialize, Serialize};

/// A mutating request from the driver or presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[serde(tag = "type", content = "value")]
pub enum Command {
  Start,
  Stop,
  Reset,
  AddAircraft,
  SpeedMultiplier(f32),

  Land(Intern<String>),
  Heading { id: Intern<String>, degrees: f32 },
  /// Positive values climb, negative values descend.
  Altitude { id: Intern<String>, delta: f32 },
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Start => write!(f, "start"),
      Self::Stop => write!(f, "stop"),
      Self::Reset => write!(f, "reset"),
      Self::AddAircraft => write!(f, "add aircraft"),
      Self::SpeedMultiplier(x) => write!(f, "speed x{x}"),
      Self::Land(id) => write!(f, "{id}, cleared to land"),
      Self::Heading { id, degrees } => {
        write!(f, "{id}, turn heading {degrees:03.0}")
      }
      Self::Altitude { id, delta } if *delta >= 0.0 => {
        write!(f, "{id}, climb {delta}m")
      }
      Self::Altitude { id, delta } => {
        write!(f, "{id}, descend {}m", delta.abs())
      }
    }
  }
}
