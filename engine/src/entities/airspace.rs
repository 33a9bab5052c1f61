use std::collections::{HashSet, VecDeque};

use glam::Vec2;
use internment::Intern;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use turborand::TurboRand;

use crate::{
  config::AirspaceConfig,
  geometry::{get_random_point_on_circle, random_range},
  roll,
};

use super::{aircraft::Aircraft, storm::StormZone};

/// An unordered pair of aircraft identifiers, stored in sorted order so that
/// `(a, b)` and `(b, a)` compare and hash the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictPair(Intern<String>, Intern<String>);

impl ConflictPair {
  pub fn new(a: Intern<String>, b: Intern<String>) -> Self {
    if a.as_str() <= b.as_str() {
      Self(a, b)
    } else {
      Self(b, a)
    }
  }

  pub fn first(&self) -> Intern<String> {
    self.0
  }

  pub fn second(&self) -> Intern<String> {
    self.1
  }

  pub fn contains(&self, id: Intern<String>) -> bool {
    self.0 == id || self.1 == id
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
  /// Inside the crash box; both aircraft are lost.
  Crash,
  /// Inside the near-miss box but still recoverable.
  Conflict,
  Clear,
}

/// Outcome of one collision scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
  pub crashed: HashSet<Intern<String>>,
  /// Pairs that were in conflict on the previous scan and separated without
  /// crashing, sorted by identifier.
  pub resolved: Vec<ConflictPair>,
}

#[derive(Debug, Clone, Default)]
pub struct Airspace {
  pub config: AirspaceConfig,

  pub(crate) aircraft: Vec<Aircraft>,
  /// Oldest first.
  pub(crate) storms: VecDeque<StormZone>,

  conflicts: HashSet<ConflictPair>,
  resolved_conflicts: u64,
  issued: HashSet<Intern<String>>,
}

impl Airspace {
  pub fn new(config: AirspaceConfig) -> Self {
    Self {
      config,
      ..Default::default()
    }
  }

  pub fn aircraft(&self) -> &[Aircraft] {
    &self.aircraft
  }

  pub fn storms(&self) -> impl Iterator<Item = &StormZone> {
    self.storms.iter()
  }

  pub fn storm_count(&self) -> usize {
    self.storms.len()
  }

  pub fn find(&self, id: Intern<String>) -> Option<&Aircraft> {
    self.aircraft.iter().find(|a| a.id == id)
  }

  pub fn find_mut(&mut self, id: Intern<String>) -> Option<&mut Aircraft> {
    self.aircraft.iter_mut().find(|a| a.id == id)
  }

  pub fn active_conflicts(&self) -> &HashSet<ConflictPair> {
    &self.conflicts
  }

  pub fn resolved_conflicts(&self) -> u64 {
    self.resolved_conflicts
  }

  /// Adds an aircraft unless its identifier has already been used in this
  /// airspace. The aircraft takes on the airspace's fuel burn rate.
  pub fn add_aircraft(&mut self, mut aircraft: Aircraft) -> bool {
    if !self.issued.insert(aircraft.id) {
      tracing::warn!("ignoring reused callsign {}", aircraft.id);
      return false;
    }

    aircraft.fuel_burn_rate = self.config.fuel_burn_rate.max(0.0);
    self.aircraft.push(aircraft);

    true
  }

  /// Removes an aircraft along with any conflict it was part of.
  pub fn remove_aircraft(&mut self, id: Intern<String>) -> Option<Aircraft> {
    let index = self.aircraft.iter().position(|a| a.id == id)?;
    self.conflicts.retain(|pair| !pair.contains(id));

    Some(self.aircraft.remove(index))
  }

  pub fn add_storm(&mut self, storm: StormZone) {
    self.storms.push_back(storm);
  }

  /// Issues a callsign that has not been used in this airspace before.
  pub fn issue_callsign(&mut self, rng: &mut impl TurboRand) -> Intern<String> {
    for _ in 0..64 {
      let id = Intern::from(Aircraft::random_callsign(rng));
      if self.issued.insert(id) {
        return id;
      }
    }

    // The random space is nearly exhausted; fall back to a counter suffix.
    let mut n = self.issued.len();
    loop {
      let id = Intern::from(format!("ZZZ{n}"));
      if self.issued.insert(id) {
        return id;
      }

      n += 1;
    }
  }

  pub fn random_altitude(&self, rng: &mut impl TurboRand) -> f32 {
    let AirspaceConfig {
      min_spawn_altitude: min,
      max_spawn_altitude: max,
      altitude_step: step,
      ..
    } = self.config;

    if step <= 0.0 || max <= min {
      return min.max(0.0);
    }

    let steps = ((max - min) / step).floor() as u32;
    min + rng.u32(0..=steps) as f32 * step
  }

  /// Spawns an aircraft at a random position. With `force_conflict`, the
  /// aircraft is instead placed on a ring around a random airborne aircraft at
  /// the same altitude, provided that point is inside the airspace.
  pub fn spawn_random_aircraft(
    &mut self,
    rng: &mut impl TurboRand,
    force_conflict: bool,
  ) -> Intern<String> {
    let id = self.issue_callsign(rng);

    let forced = if force_conflict {
      self.forced_conflict_position(rng)
    } else {
      None
    };

    let (pos, altitude) = match forced {
      Some(placement) => placement,
      None => {
        let pos = self.config.spawn_bounds().random_point(rng);
        (pos, self.random_altitude(rng))
      }
    };

    let aircraft = Aircraft::random(id, pos, altitude, &self.config, rng);
    tracing::debug!(
      "spawned {} at ({:.1}, {:.1}) {}m heading {:.0}{}",
      aircraft.id,
      aircraft.pos.x,
      aircraft.pos.y,
      aircraft.altitude,
      aircraft.heading,
      if forced.is_some() { " (forced)" } else { "" }
    );
    self.aircraft.push(aircraft);

    id
  }

  fn forced_conflict_position(
    &self,
    rng: &mut impl TurboRand,
  ) -> Option<(Vec2, f32)> {
    let candidates = self
      .aircraft
      .iter()
      .filter(|a| a.airborne)
      .collect::<Vec<_>>();
    let anchor = rng.sample(&candidates)?;

    let point = get_random_point_on_circle(
      anchor.pos,
      self.config.conflict_ring_offset,
      rng,
    );

    self
      .config
      .bounds()
      .contains(point.position)
      .then_some((point.position, anchor.altitude))
  }

  pub fn spawn_storm(&mut self, rng: &mut impl TurboRand) -> &StormZone {
    let config = &self.config;
    let center = config.spawn_bounds().random_point(rng);
    let radius =
      random_range(rng, config.min_storm_radius, config.max_storm_radius);
    let lifetime = rng.u32(
      config.min_storm_lifetime
        ..=config.max_storm_lifetime.max(config.min_storm_lifetime),
    );

    self.storms.push_back(StormZone::new(center, radius, lifetime));
    &self.storms[self.storms.len() - 1]
  }

  /// Evicts the oldest storm (by chance) while over capacity, then ages every
  /// storm and prunes the ones that dissipated. Returns how many were removed.
  pub fn tick_storms(&mut self, rng: &mut impl TurboRand) -> usize {
    let mut removed = 0;

    if self.storms.len() > self.config.max_storms
      && roll(rng, self.config.storm_eviction_chance)
    {
      self.storms.pop_front();
      removed += 1;
    }

    for storm in self.storms.iter_mut() {
      storm.tick();
    }

    let before = self.storms.len();
    self.storms.retain(|s| !s.is_expired());
    removed += before - self.storms.len();

    removed
  }

  pub fn is_in_storm(&self, aircraft: &Aircraft) -> bool {
    self.storms.iter().any(|s| s.contains(aircraft.pos))
  }

  pub fn lateral_distance(a: &Aircraft, b: &Aircraft) -> f32 {
    a.pos.distance(b.pos)
  }

  pub fn can_land(&self, aircraft: &Aircraft) -> bool {
    aircraft.airborne
      && aircraft.landing_requested
      && aircraft.pos.distance(self.config.airport)
        <= self.config.approach_radius
      && aircraft.altitude < self.config.approach_ceiling
  }

  /// Lands the aircraft if it requested landing and is inside the approach
  /// zone. Leaves it untouched otherwise.
  pub fn attempt_landing(&self, aircraft: &mut Aircraft) -> bool {
    if !self.can_land(aircraft) {
      return false;
    }

    aircraft.airborne = false;
    aircraft.landed = true;
    aircraft.collision_alert = false;

    true
  }

  pub fn classify(&self, a: &Aircraft, b: &Aircraft) -> Proximity {
    let lateral = Self::lateral_distance(a, b);
    let vertical = (a.altitude - b.altitude).abs();

    if lateral < self.config.crash_lateral
      && vertical < self.config.crash_altitude
    {
      Proximity::Crash
    } else if lateral < self.config.conflict_lateral
      && vertical < self.config.conflict_altitude
    {
      Proximity::Conflict
    } else {
      Proximity::Clear
    }
  }

  /// Scans every unordered pair of airborne aircraft, raising collision
  /// alerts for conflicts and collecting crashes. Conflicts that were active
  /// on the previous scan and have cleared without a crash are counted as
  /// resolved.
  pub fn detect_collisions(&mut self) -> CollisionReport {
    let mut crashed: HashSet<Intern<String>> = HashSet::new();
    let mut conflicts: HashSet<ConflictPair> = HashSet::new();

    for (a, b) in self
      .aircraft
      .iter()
      .filter(|a| a.airborne)
      .tuple_combinations()
    {
      match self.classify(a, b) {
        Proximity::Crash => {
          crashed.insert(a.id);
          crashed.insert(b.id);
        }
        Proximity::Conflict => {
          conflicts.insert(ConflictPair::new(a.id, b.id));
        }
        Proximity::Clear => {}
      }
    }

    for aircraft in self.aircraft.iter_mut() {
      aircraft.collision_alert =
        conflicts.iter().any(|pair| pair.contains(aircraft.id));
    }

    let previous = std::mem::replace(&mut self.conflicts, conflicts);
    let resolved = previous
      .into_iter()
      .filter(|pair| {
        !self.conflicts.contains(pair)
          && !crashed.contains(&pair.0)
          && !crashed.contains(&pair.1)
          && self.is_airborne(pair.0)
          && self.is_airborne(pair.1)
      })
      .sorted_by(|a, b| {
        (a.0.as_str(), a.1.as_str()).cmp(&(b.0.as_str(), b.1.as_str()))
      })
      .collect::<Vec<_>>();

    self.resolved_conflicts += resolved.len() as u64;

    CollisionReport { crashed, resolved }
  }

  fn is_airborne(&self, id: Intern<String>) -> bool {
    self.find(id).is_some_and(|a| a.airborne)
  }
}
