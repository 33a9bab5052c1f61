use core::fmt;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
  Info,
  Warning,
  Danger,
  Success,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Info => write!(f, "INFO"),
      Self::Warning => write!(f, "WARNING"),
      Self::Danger => write!(f, "DANGER"),
      Self::Success => write!(f, "SUCCESS"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LogEvent {
  pub tick: u64,
  pub severity: Severity,
  pub message: String,
}

impl fmt::Display for LogEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {}", self.severity, self.message)
  }
}

/// A bounded queue of events waiting to be consumed by the presentation
/// layer. Once full, the oldest undrained event is dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventLog {
  capacity: usize,
  vec: VecDeque<LogEvent>,
}

impl EventLog {
  pub fn new(capacity: usize) -> Self {
    let capacity = capacity.max(1);
    Self {
      capacity,
      vec: VecDeque::with_capacity(capacity),
    }
  }

  pub fn push(
    &mut self,
    tick: u64,
    severity: Severity,
    message: impl Into<String>,
  ) {
    let event = LogEvent {
      tick,
      severity,
      message: message.into(),
    };

    match severity {
      Severity::Danger | Severity::Warning => tracing::warn!(tick, "{event}"),
      Severity::Info | Severity::Success => tracing::info!(tick, "{event}"),
    }

    if self.vec.len() >= self.capacity {
      self.vec.pop_front();
    }

    self.vec.push_back(event);
  }

  pub fn info(&mut self, tick: u64, message: impl Into<String>) {
    self.push(tick, Severity::Info, message);
  }

  pub fn warning(&mut self, tick: u64, message: impl Into<String>) {
    self.push(tick, Severity::Warning, message);
  }

  pub fn danger(&mut self, tick: u64, message: impl Into<String>) {
    self.push(tick, Severity::Danger, message);
  }

  pub fn success(&mut self, tick: u64, message: impl Into<String>) {
    self.push(tick, Severity::Success, message);
  }

  /// Takes every pending event, oldest first.
  pub fn drain(&mut self) -> Vec<LogEvent> {
    self.vec.drain(..).collect()
  }
}
