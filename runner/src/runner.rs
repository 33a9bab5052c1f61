use std::{
  collections::BTreeMap,
  thread,
  time::{Duration, Instant},
};

use engine::{
  engine::{Engine, Stats},
  entities::{aircraft::Aircraft, storm::StormZone},
  log::{LogEvent, Severity},
};
use serde::{Deserialize, Serialize};

use crate::config::ScriptEntry;

/// Final state of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
  pub stats: Stats,
  pub events: BTreeMap<String, usize>,
  pub aircraft: Vec<Aircraft>,
  pub storms: Vec<StormZone>,
}

#[derive(Debug)]
pub struct Runner {
  pub engine: Engine,
  pub script: Vec<ScriptEntry>,

  /// Ticks per second; `0` runs as fast as possible.
  rate: usize,
  events: BTreeMap<String, usize>,
}

impl Runner {
  pub fn new(
    engine: Engine,
    mut script: Vec<ScriptEntry>,
    rate: usize,
  ) -> Self {
    script.sort_by_key(|entry| entry.at);

    Self {
      engine,
      script,
      rate,
      events: BTreeMap::new(),
    }
  }

  /// Drives the engine for `steps` ticks, applying scripted commands before
  /// the step they are scheduled for.
  pub fn run(&mut self, steps: u64) -> Summary {
    let period = (self.rate > 0)
      .then(|| Duration::from_secs_f32(1.0 / self.rate as f32));
    let mut script = std::mem::take(&mut self.script).into_iter().peekable();

    for step in 0..steps {
      let started = Instant::now();

      while let Some(entry) = script.next_if(|entry| entry.at <= step) {
        self.engine.execute_command(entry.command);
      }

      self.engine.tick();
      self.consume_events();

      if let Some(period) = period {
        if let Some(remaining) = period.checked_sub(started.elapsed()) {
          thread::sleep(remaining);
        }
      }
    }

    self.script = script.collect();
    self.consume_events();
    self.summary()
  }

  fn consume_events(&mut self) {
    for LogEvent { severity, .. } in self.engine.drain_events() {
      *self.events.entry(severity.to_string()).or_default() += 1;
    }
  }

  pub fn event_count(&self, severity: Severity) -> usize {
    self
      .events
      .get(&severity.to_string())
      .copied()
      .unwrap_or_default()
  }

  pub fn summary(&self) -> Summary {
    Summary {
      stats: self.engine.stats(),
      events: self.events.clone(),
      aircraft: self.engine.aircraft().to_vec(),
      storms: self.engine.storms(),
    }
  }
}
