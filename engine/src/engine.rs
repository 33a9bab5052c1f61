use core::fmt;
use std::collections::HashMap;

use internment::Intern;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use turborand::{TurboRand, rng::Rng};

use crate::{
  command::Command,
  config::EngineConfig,
  entities::{
    aircraft::{Aircraft, IncidentKind},
    airspace::Airspace,
    storm::StormZone,
  },
  log::{EventLog, LogEvent},
  roll,
};

const SECONDS_PER_HOUR: f32 = 3600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum RunState {
  Running,
  #[default]
  Stopped,
}

/// Why an aircraft left the airspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
  Landed,
  Storm,
  Fuel,
  Collision,
}

impl fmt::Display for Removal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Landed => write!(f, "landed safely"),
      Self::Storm => write!(f, "was destroyed by a storm"),
      Self::Fuel => write!(f, "ran out of fuel"),
      Self::Collision => write!(f, "was lost in a mid-air collision"),
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Ledger {
  pub entered: u64,
  pub landed: u64,
  pub destroyed_by_storm: u64,
  pub fuel_exhausted: u64,
  pub collisions: u64,
  pub score: u64,
}

impl Ledger {
  pub fn lost(&self) -> u64 {
    self.destroyed_by_storm + self.fuel_exhausted + self.collisions
  }
}

/// A read-only snapshot of the simulation counters.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Stats {
  pub tick: u64,
  pub score: u64,
  pub entered: u64,
  pub landed: u64,
  pub lost: u64,
  pub destroyed_by_storm: u64,
  pub fuel_exhausted: u64,
  pub collisions: u64,
  pub conflicts_resolved: u64,
  pub active_aircraft: usize,
  pub active_storms: usize,
}

#[derive(Debug)]
pub struct Engine {
  pub config: EngineConfig,

  airspace: Airspace,
  ledger: Ledger,
  log: EventLog,
  rng: Rng,

  state: RunState,
  speed_multiplier: f32,
  tick: u64,
}

impl Engine {
  pub fn new(config: EngineConfig, rng: Rng) -> Self {
    let mut engine = Self {
      airspace: Airspace::new(config.airspace.clone()),
      ledger: Ledger::default(),
      log: EventLog::new(config.event_log_capacity),
      rng,

      state: RunState::Stopped,
      speed_multiplier: 1.0,
      tick: 0,

      config,
    };

    engine.seed_aircraft();
    engine
  }

  fn seed_aircraft(&mut self) {
    for _ in 0..self.config.seed_aircraft {
      self.airspace.spawn_random_aircraft(&mut self.rng, false);
      self.ledger.entered += 1;
    }
  }

  pub fn start(&mut self) {
    if self.state == RunState::Running {
      return;
    }

    self.state = RunState::Running;
    self.log.info(self.tick, "Simulation started");
  }

  pub fn stop(&mut self) {
    if self.state == RunState::Stopped {
      return;
    }

    self.state = RunState::Stopped;
    self.log.info(self.tick, "Simulation stopped");
  }

  /// Discards the airspace and ledger and reseeds the initial population.
  /// The run state, speed multiplier and undrained events are kept.
  pub fn reset(&mut self) {
    self.airspace = Airspace::new(self.config.airspace.clone());
    self.ledger = Ledger::default();
    self.tick = 0;

    self.log.info(self.tick, "Simulation reset");
    self.seed_aircraft();
  }

  pub fn set_speed_multiplier(&mut self, multiplier: f32) {
    self.speed_multiplier = if multiplier.is_finite() {
      multiplier.max(1.0)
    } else {
      1.0
    };
  }

  pub fn add_aircraft(&mut self, aircraft: Aircraft) -> bool {
    let id = aircraft.id;
    if !self.airspace.add_aircraft(aircraft) {
      return false;
    }

    self.ledger.entered += 1;
    self.log.info(self.tick, format!("{id} entered the airspace"));

    true
  }

  /// Spawns one random aircraft unless the airspace is at capacity.
  pub fn add_random_aircraft(&mut self) -> Option<Intern<String>> {
    self.spawn_aircraft(false)
  }

  fn spawn_aircraft(&mut self, force_conflict: bool) -> Option<Intern<String>> {
    if self.airspace.aircraft().len() >= self.config.max_aircraft {
      self.log.info(
        self.tick,
        format!(
          "Airspace at capacity ({} aircraft), spawn dropped",
          self.config.max_aircraft
        ),
      );
      return None;
    }

    let id = self
      .airspace
      .spawn_random_aircraft(&mut self.rng, force_conflict);
    self.ledger.entered += 1;
    self.log.info(self.tick, format!("{id} entered the airspace"));

    Some(id)
  }

  fn airborne_mut(&mut self, id: Intern<String>) -> Option<&mut Aircraft> {
    self.airspace.find_mut(id).filter(|a| a.airborne)
  }

  pub fn request_landing(&mut self, id: Intern<String>) {
    let tick = self.tick;
    if let Some(aircraft) = self.airborne_mut(id) {
      if !aircraft.landing_requested {
        aircraft.request_landing();
        self.log.info(tick, format!("{id} requested landing clearance"));
      }
    }
  }

  pub fn set_heading(&mut self, id: Intern<String>, degrees: f32) {
    if let Some(aircraft) = self.airborne_mut(id) {
      aircraft.set_heading(degrees);
    }
  }

  pub fn change_altitude(&mut self, id: Intern<String>, delta: f32) {
    if let Some(aircraft) = self.airborne_mut(id) {
      aircraft.change_altitude(delta);
    }
  }

  pub fn execute_command(&mut self, command: Command) {
    tracing::debug!("executing command: {command}");

    match command {
      Command::Start => self.start(),
      Command::Stop => self.stop(),
      Command::Reset => self.reset(),
      Command::AddAircraft => {
        self.add_random_aircraft();
      }
      Command::SpeedMultiplier(multiplier) => {
        self.set_speed_multiplier(multiplier)
      }
      Command::Land(id) => self.request_landing(id),
      Command::Heading { id, degrees } => self.set_heading(id, degrees),
      Command::Altitude { id, delta } => self.change_altitude(id, delta),
    }
  }
}

// Tick
impl Engine {
  pub fn tick(&mut self) {
    if self.state != RunState::Running {
      return;
    }

    let tick_seconds = self.config.tick_seconds.max(0.0);
    let elapsed_hours = tick_seconds * self.speed_multiplier / SECONDS_PER_HOUR;
    self.tick += 1;

    self.update_storms();
    let mut removals = self.update_aircraft(elapsed_hours, tick_seconds);
    self.update_collisions(&mut removals);
    self.apply_removals(removals);

    if self.config.spawn_interval_ticks > 0
      && self.tick % self.config.spawn_interval_ticks == 0
    {
      let forced = roll(&mut self.rng, self.config.forced_conflict_chance);
      self.spawn_aircraft(forced);
    }

    self.update_score();
  }

  fn update_storms(&mut self) {
    if roll(&mut self.rng, self.config.storm_spawn_chance) {
      let storm = self.airspace.spawn_storm(&mut self.rng);
      let message = format!(
        "Storm forming at ({:.0}, {:.0}), radius {:.0}km",
        storm.center.x, storm.center.y, storm.radius
      );
      self.log.warning(self.tick, message);
    }

    let removed = self.airspace.tick_storms(&mut self.rng);
    if removed > 0 {
      tracing::debug!("{removed} storm(s) dissipated");
    }
  }

  fn update_aircraft(
    &mut self,
    elapsed_hours: f32,
    tick_seconds: f32,
  ) -> HashMap<Intern<String>, Removal> {
    let mut removals: HashMap<Intern<String>, Removal> = HashMap::new();

    // Aircraft are taken out so the airspace can be queried while each one
    // is mutated.
    let mut fleet = std::mem::take(&mut self.airspace.aircraft);
    let low_fuel = self.config.low_fuel_threshold;

    for aircraft in fleet.iter_mut().filter(|a| a.airborne) {
      let was_low_on_fuel = aircraft.fuel < low_fuel;
      aircraft.advance(elapsed_hours);

      if self.airspace.is_in_storm(aircraft) {
        aircraft.storm_exposure += tick_seconds;
      } else {
        aircraft.storm_exposure = (aircraft.storm_exposure
          - self.config.storm_exposure_decay * tick_seconds)
          .max(0.0);
      }

      if aircraft.storm_exposure > self.config.storm_exposure_limit {
        removals.entry(aircraft.id).or_insert(Removal::Storm);
      }

      if !aircraft.incident_declared()
        && !aircraft.landed
        && roll(&mut self.rng, self.config.incident_chance)
      {
        let kind = *self
          .rng
          .sample(&IncidentKind::ALL)
          .unwrap_or(&IncidentKind::Medical);
        aircraft.declare_incident(kind);
        self.log.warning(
          self.tick,
          format!("{} declared an emergency: {kind}", aircraft.id),
        );
      }

      if !was_low_on_fuel
        && aircraft.fuel < low_fuel
        && !aircraft.is_out_of_fuel()
      {
        self.log.warning(
          self.tick,
          format!("{} is low on fuel ({:.0}%)", aircraft.id, aircraft.fuel),
        );
      }

      if aircraft.landing_requested && self.airspace.attempt_landing(aircraft) {
        removals.entry(aircraft.id).or_insert(Removal::Landed);
        continue;
      }

      if aircraft.is_out_of_fuel() {
        removals.entry(aircraft.id).or_insert(Removal::Fuel);
      }
    }

    self.airspace.aircraft = fleet;

    removals
  }

  fn update_collisions(
    &mut self,
    removals: &mut HashMap<Intern<String>, Removal>,
  ) {
    let report = self.airspace.detect_collisions();

    for pair in report.resolved {
      self.log.success(
        self.tick,
        format!(
          "Conflict between {} and {} resolved",
          pair.first(),
          pair.second()
        ),
      );
    }

    for id in report.crashed {
      removals.entry(id).or_insert(Removal::Collision);
    }
  }

  fn apply_removals(&mut self, mut removals: HashMap<Intern<String>, Removal>) {
    if removals.is_empty() {
      return;
    }

    // Walk the fleet so removals are applied in a stable order.
    let ordered = self
      .airspace
      .aircraft()
      .iter()
      .filter_map(|a| removals.remove(&a.id).map(|reason| (a.id, reason)))
      .collect::<Vec<_>>();

    for (id, reason) in ordered {
      self.airspace.remove_aircraft(id);

      match reason {
        Removal::Landed => self.ledger.landed += 1,
        Removal::Storm => self.ledger.destroyed_by_storm += 1,
        Removal::Fuel => self.ledger.fuel_exhausted += 1,
        Removal::Collision => self.ledger.collisions += 1,
      }

      let message = format!("{id} {reason}");
      match reason {
        Removal::Landed => self.log.success(self.tick, message),
        _ => self.log.danger(self.tick, message),
      }
    }
  }

  fn update_score(&mut self) {
    let weights = self.config.score;
    let gained = self.ledger.landed as i64 * weights.landing
      + self.airspace.resolved_conflicts() as i64 * weights.resolution;
    let penalty = self.ledger.lost() as i64 * weights.loss;

    self.ledger.score = (gained - penalty).max(0) as u64;
  }
}

// Queries
impl Engine {
  pub fn airspace(&self) -> &Airspace {
    &self.airspace
  }

  pub fn aircraft(&self) -> &[Aircraft] {
    self.airspace.aircraft()
  }

  pub fn find_aircraft(&self, id: Intern<String>) -> Option<&Aircraft> {
    self.airspace.find(id)
  }

  pub fn storms(&self) -> Vec<StormZone> {
    self.airspace.storms().cloned().collect()
  }

  pub fn ledger(&self) -> &Ledger {
    &self.ledger
  }

  pub fn stats(&self) -> Stats {
    Stats {
      tick: self.tick,
      score: self.ledger.score,
      entered: self.ledger.entered,
      landed: self.ledger.landed,
      lost: self.ledger.lost(),
      destroyed_by_storm: self.ledger.destroyed_by_storm,
      fuel_exhausted: self.ledger.fuel_exhausted,
      collisions: self.ledger.collisions,
      conflicts_resolved: self.airspace.resolved_conflicts(),
      active_aircraft: self.airspace.aircraft().len(),
      active_storms: self.airspace.storm_count(),
    }
  }

  pub fn drain_events(&mut self) -> Vec<LogEvent> {
    self.log.drain()
  }

  pub fn tick_count(&self) -> u64 {
    self.tick
  }

  pub fn is_running(&self) -> bool {
    self.state == RunState::Running
  }

  pub fn speed_multiplier(&self) -> f32 {
    self.speed_multiplier
  }
}

impl Default for Engine {
  fn default() -> Self {
    Self::new(EngineConfig::default(), Rng::new())
  }
}

#[cfg(test)]
mod tests {
  use glam::Vec2;

  use super::*;
  use turborand::SeededCore;
  use crate::log::Severity;

  fn quiet_engine() -> Engine {
    Engine::new(EngineConfig::quiet(), Rng::with_seed(0))
  }

  fn aircraft(id: &str, x: f32, y: f32, altitude: f32) -> Aircraft {
    Aircraft::new(Intern::from_ref(id), Vec2::new(x, y), altitude, 0.0, 600.0)
  }

  #[test]
  fn test_seeds_initial_population() {
    let engine = Engine::new(EngineConfig::default(), Rng::with_seed(1));
    assert_eq!(engine.aircraft().len(), 4);
    assert_eq!(engine.stats().entered, 4);
    assert!(!engine.is_running());
  }

  #[test]
  fn test_start_stop_keep_counters() {
    let mut engine = quiet_engine();
    engine.add_aircraft(aircraft("A", 100.0, 100.0, 5000.0));
    engine.start();
    engine.tick();
    engine.stop();
    engine.start();

    assert_eq!(engine.tick_count(), 1);
    assert_eq!(engine.stats().entered, 1);

    let events = engine.drain_events();
    let started = events
      .iter()
      .filter(|e| e.message == "Simulation started")
      .count();
    assert_eq!(started, 2);
  }

  #[test]
  fn test_speed_multiplier_is_clamped() {
    let mut engine = quiet_engine();
    engine.set_speed_multiplier(0.25);
    assert_eq!(engine.speed_multiplier(), 1.0);
    engine.set_speed_multiplier(f32::NAN);
    assert_eq!(engine.speed_multiplier(), 1.0);
    engine.set_speed_multiplier(4.0);
    assert_eq!(engine.speed_multiplier(), 4.0);
  }

  #[test]
  fn test_speed_multiplier_scales_motion() {
    let mut engine = quiet_engine();
    engine.add_aircraft(aircraft("A", 100.0, 100.0, 5000.0));
    engine.set_speed_multiplier(3600.0);
    engine.start();
    engine.tick();

    // One simulated hour at 600 km/h heading east.
    let a = engine.find_aircraft(Intern::from_ref("A")).unwrap();
    assert!((a.pos.x - 700.0).abs() < 1e-2);
    assert!((a.fuel - 40.0).abs() < 1e-3);
  }

  #[test]
  fn test_commands_ignore_unknown_and_grounded_targets() {
    let mut engine = quiet_engine();
    let mut grounded = aircraft("G", 400.0, 400.0, 0.0);
    grounded.airborne = false;
    grounded.landed = true;
    engine.add_aircraft(grounded.clone());
    engine.drain_events();

    engine.request_landing(Intern::from_ref("NOPE"));
    engine.set_heading(Intern::from_ref("NOPE"), 90.0);
    engine.request_landing(grounded.id);
    engine.change_altitude(grounded.id, 1000.0);

    assert!(engine.drain_events().is_empty());
    assert_eq!(engine.find_aircraft(grounded.id), Some(&grounded));
  }

  #[test]
  fn test_execute_command_dispatch() {
    let mut engine = quiet_engine();
    let id = Intern::from_ref("A");
    engine.add_aircraft(aircraft("A", 100.0, 100.0, 5000.0));

    engine.execute_command(Command::Heading { id, degrees: -90.0 });
    engine.execute_command(Command::Altitude { id, delta: -6000.0 });
    engine.execute_command(Command::Land(id));
    engine.execute_command(Command::SpeedMultiplier(2.0));
    engine.execute_command(Command::Start);

    let a = engine.find_aircraft(id).unwrap();
    assert_eq!(a.heading, 270.0);
    assert_eq!(a.altitude, 0.0);
    assert!(a.landing_requested);
    assert_eq!(engine.speed_multiplier(), 2.0);
    assert!(engine.is_running());
  }

  #[test]
  fn test_landing_is_counted_and_scored() {
    let mut engine = quiet_engine();
    let id = Intern::from_ref("A");
    engine.add_aircraft(aircraft("A", 400.0, 400.0, 1000.0));
    engine.request_landing(id);
    engine.start();
    engine.tick();

    let stats = engine.stats();
    assert_eq!(stats.landed, 1);
    assert_eq!(stats.active_aircraft, 0);
    assert_eq!(stats.score, 100);
  }

  #[test]
  fn test_fuel_exhaustion_removes_aircraft() {
    let mut engine = quiet_engine();
    engine.add_aircraft(aircraft("A", 100.0, 100.0, 5000.0).with_fuel(0.01));
    engine.start();
    engine.tick();

    let stats = engine.stats();
    assert_eq!(stats.fuel_exhausted, 1);
    assert_eq!(stats.lost, 1);
    assert_eq!(stats.active_aircraft, 0);
    assert_eq!(stats.score, 0);
  }

  #[test]
  fn test_low_fuel_warning_fires_once() {
    let mut engine = quiet_engine();
    engine.add_aircraft(aircraft("A", 100.0, 100.0, 5000.0).with_fuel(10.01));
    engine.start();
    for _ in 0..3 {
      engine.tick();
    }

    let warnings = engine
      .drain_events()
      .into_iter()
      .filter(|e| e.message.contains("low on fuel"))
      .count();
    assert_eq!(warnings, 1);
  }

  #[test]
  fn test_storm_exposure_destroys_aircraft() {
    let mut engine = Engine::new(
      EngineConfig {
        storm_exposure_limit: 2.5,
        ..EngineConfig::quiet()
      },
      Rng::with_seed(0),
    );
    engine.add_aircraft(aircraft("A", 300.0, 300.0, 5000.0));
    engine
      .airspace
      .add_storm(StormZone::new(Vec2::new(300.0, 300.0), 50.0, 100));
    engine.start();

    for _ in 0..2 {
      engine.tick();
    }
    let a = engine.find_aircraft(Intern::from_ref("A")).unwrap();
    assert_eq!(a.storm_exposure, 2.0);

    engine.tick();
    assert_eq!(engine.stats().destroyed_by_storm, 1);
    assert!(engine.aircraft().is_empty());
  }

  #[test]
  fn test_reused_callsign_cannot_resolve_old_conflict() {
    let mut engine = Engine::new(
      EngineConfig {
        storm_exposure_limit: 0.5,
        ..EngineConfig::quiet()
      },
      Rng::with_seed(0),
    );
    engine.add_aircraft(aircraft("A", 300.0, 300.0, 5000.0));
    engine.add_aircraft(aircraft("B", 330.0, 300.0, 5000.0));
    engine
      .airspace
      .add_storm(StormZone::new(Vec2::new(290.0, 300.0), 15.0, 100));
    engine.start();

    // A is in conflict with B and destroyed by the storm on the same tick.
    engine.tick();
    assert_eq!(engine.stats().destroyed_by_storm, 1);
    assert!(engine.airspace().active_conflicts().is_empty());

    assert!(!engine.add_aircraft(aircraft("A", 700.0, 700.0, 5000.0)));
    engine.tick();

    assert_eq!(engine.stats().conflicts_resolved, 0);
    assert!(
      engine
        .drain_events()
        .iter()
        .all(|e| e.severity != Severity::Success)
    );
  }

  #[test]
  fn test_added_aircraft_use_configured_burn_rate() {
    let mut config = EngineConfig::quiet();
    config.airspace.fuel_burn_rate = 3600.0;
    let mut engine = Engine::new(config, Rng::with_seed(0));
    engine.add_aircraft(aircraft("A", 100.0, 100.0, 5000.0));
    engine.start();
    engine.tick();

    let a = engine.find_aircraft(Intern::from_ref("A")).unwrap();
    assert!((a.fuel - 99.0).abs() < 1e-3);
  }

  #[test]
  fn test_storm_exposure_decays_outside() {
    let mut engine = quiet_engine();
    let mut a = aircraft("A", 300.0, 300.0, 5000.0);
    a.storm_exposure = 5.0;
    engine.add_aircraft(a);
    engine.start();
    engine.tick();

    let a = engine.find_aircraft(Intern::from_ref("A")).unwrap();
    assert_eq!(a.storm_exposure, 4.0);
  }

  #[test]
  fn test_periodic_spawn_and_capacity() {
    let mut engine = Engine::new(
      EngineConfig {
        spawn_interval_ticks: 2,
        max_aircraft: 1,
        ..EngineConfig::quiet()
      },
      Rng::with_seed(3),
    );
    engine.start();

    engine.tick();
    assert_eq!(engine.aircraft().len(), 0);
    engine.tick();
    assert_eq!(engine.aircraft().len(), 1);
    engine.tick();
    engine.tick();
    assert_eq!(engine.aircraft().len(), 1);
    assert_eq!(engine.stats().entered, 1);

    let dropped = engine
      .drain_events()
      .into_iter()
      .any(|e| e.message.contains("spawn dropped"));
    assert!(dropped);
  }

  #[test]
  fn test_random_incident_is_declared() {
    let mut engine = Engine::new(
      EngineConfig {
        incident_chance: 1.0,
        ..EngineConfig::quiet()
      },
      Rng::with_seed(8),
    );
    engine.add_aircraft(aircraft("A", 100.0, 100.0, 5000.0));
    engine.start();
    engine.tick();
    engine.tick();

    let a = engine.find_aircraft(Intern::from_ref("A")).unwrap();
    assert!(a.incident_declared());
    assert!(a.is_in_emergency());

    let declared = engine
      .drain_events()
      .into_iter()
      .filter(|e| e.message.contains("declared"))
      .count();
    assert_eq!(declared, 1);
  }

  #[test]
  fn test_score_is_floored_at_zero() {
    let mut engine = quiet_engine();
    engine.add_aircraft(aircraft("A", 100.0, 100.0, 5000.0));
    engine.add_aircraft(aircraft("B", 100.0, 100.0, 5000.0));
    engine.start();
    engine.tick();

    assert_eq!(engine.stats().lost, 2);
    assert_eq!(engine.stats().score, 0);
  }

  #[test]
  fn test_reset_replaces_airspace_and_ledger() {
    let mut engine = Engine::new(
      EngineConfig {
        seed_aircraft: 2,
        ..EngineConfig::quiet()
      },
      Rng::with_seed(4),
    );
    engine.add_aircraft(aircraft("A", 100.0, 100.0, 5000.0));
    engine.start();
    engine.tick();
    engine.reset();

    let stats = engine.stats();
    assert_eq!(stats.tick, 0);
    assert_eq!(stats.entered, 2);
    assert_eq!(stats.active_aircraft, 2);
    assert!(engine.find_aircraft(Intern::from_ref("A")).is_none());
    assert!(engine.is_running());
  }

  #[test]
  fn test_reset_keeps_undrained_events() {
    let mut engine = quiet_engine();
    engine.add_aircraft(aircraft("A", 100.0, 100.0, 5000.0));
    engine.add_aircraft(aircraft("B", 100.0, 100.0, 5000.0));
    engine.start();
    engine.tick();
    engine.reset();

    let events = engine.drain_events();
    let danger = events
      .iter()
      .filter(|e| e.severity == Severity::Danger)
      .count();
    assert_eq!(danger, 2);

    let last = events.last().unwrap();
    assert_eq!(last.message, "Simulation reset");
    assert_eq!(last.tick, 0);
  }
}
