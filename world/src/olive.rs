//! Olive tree state machine: a growth track crossed with a health track.

use std::time::Duration;

use olive_grove_core::{
    HealthStatus, Rect, SessionConfig, Stage, Timestamp, TileCoord, TreeId, TreeRef,
    TreeSnapshot,
};
use thiserror::Error;

/// Reasons a tree refused an operation. Refusals never mutate the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Watering an already growing tree has no further effect.
    #[error("growth has already started")]
    AlreadyGrowing,
    /// The operation requires a healthy tree.
    #[error("tree is not healthy")]
    NotHealthy,
    /// Protection shields the tree from this infection.
    #[error("tree is protected")]
    Protected,
    /// A protection has already been spent on the tree.
    #[error("tree is already protected")]
    AlreadyProtected,
    /// There is nothing to harvest.
    #[error("no fruit is ready")]
    NoFruit,
    /// Dead trees cannot be harvested.
    #[error("tree is dead")]
    Dead,
}

/// Observable change produced while advancing a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Transition {
    /// The growth stage moved forward.
    Stage(Stage),
    /// Fruit became available.
    FruitReady,
    /// One step along the health track.
    Health {
        from: HealthStatus,
        to: HealthStatus,
    },
}

/// Period, in seconds, over which an infection progresses at `weather`.
///
/// The rate formula is clamped against both configured bounds before use,
/// which keeps every temperature inside the weather range at the slow end.
pub(crate) fn infection_rate_seconds(config: &SessionConfig, weather: i32) -> f64 {
    let fastest = config.infection_rate_fastest_ms as f64;
    let slowest = config.infection_rate_slowest_ms as f64;
    let distance = f64::from(weather.abs_diff(config.optimal_weather));
    let closeness = 1.0 - distance / f64::from(config.weather_tolerance);
    let rate = slowest - (slowest - fastest) * closeness;
    fastest.max(slowest).max(rate) / 1_000.0
}

/// Single planted olive tree.
#[derive(Clone, Debug)]
pub(crate) struct Olive {
    id: TreeId,
    tile: TileCoord,
    hitbox: Rect,
    stage: Stage,
    health: HealthStatus,
    growth_started_at: Option<Timestamp>,
    infected_at: Option<Timestamp>,
    protected_since: Option<Timestamp>,
    last_production: Timestamp,
    fruit_ready: bool,
    weather: i32,
    infection_rate_seconds: f64,
}

impl Olive {
    /// Plants a seed on `tile` at time `now`.
    pub(crate) fn new(
        id: TreeId,
        tile: TileCoord,
        now: Timestamp,
        weather: i32,
        config: &SessionConfig,
    ) -> Self {
        Self {
            id,
            tile,
            hitbox: tile.rect(config.tile_size),
            stage: Stage::Seed,
            health: HealthStatus::Healthy,
            growth_started_at: None,
            infected_at: None,
            protected_since: None,
            last_production: now,
            fruit_ready: false,
            weather,
            infection_rate_seconds: infection_rate_seconds(config, weather),
        }
    }

    pub(crate) fn reference(&self) -> TreeRef {
        TreeRef::new(self.tile, self.id)
    }

    pub(crate) fn id(&self) -> TreeId {
        self.id
    }

    pub(crate) fn hitbox(&self) -> Rect {
        self.hitbox
    }

    pub(crate) fn health(&self) -> HealthStatus {
        self.health
    }

    pub(crate) fn growth_started(&self) -> bool {
        self.growth_started_at.is_some()
    }

    pub(crate) fn is_protected(&self) -> bool {
        self.protected_since.is_some()
    }

    /// Watering: starts the growth clock of a healthy, dormant seed.
    pub(crate) fn start_growth(&mut self, now: Timestamp) -> Result<(), TreeError> {
        if self.growth_started() {
            return Err(TreeError::AlreadyGrowing);
        }
        if self.health != HealthStatus::Healthy {
            return Err(TreeError::NotHealthy);
        }
        self.growth_started_at = Some(now);
        self.last_production = now;
        Ok(())
    }

    /// Infects a healthy tree. `respects_protection` decides whether a
    /// protection keeps the infection out.
    pub(crate) fn infect(
        &mut self,
        now: Timestamp,
        respects_protection: bool,
    ) -> Result<(), TreeError> {
        if self.health != HealthStatus::Healthy {
            return Err(TreeError::NotHealthy);
        }
        if respects_protection && self.is_protected() {
            return Err(TreeError::Protected);
        }
        self.health = HealthStatus::Unhealthy;
        self.infected_at = Some(now);
        // Infected trees keep a crop on the branch until they recover.
        self.fruit_ready = true;
        Ok(())
    }

    pub(crate) fn protect(&mut self, now: Timestamp) -> Result<(), TreeError> {
        if self.is_protected() {
            return Err(TreeError::AlreadyProtected);
        }
        self.protected_since = Some(now);
        Ok(())
    }

    pub(crate) fn harvest(&mut self, now: Timestamp) -> Result<(), TreeError> {
        if self.health == HealthStatus::Dead {
            return Err(TreeError::Dead);
        }
        if !self.fruit_ready {
            return Err(TreeError::NoFruit);
        }
        self.fruit_ready = false;
        self.last_production = now;
        Ok(())
    }

    /// Reports whether the tree has grown tall enough to block the player.
    pub(crate) fn is_obstacle(&self, now: Timestamp, config: &SessionConfig) -> bool {
        self.growth_started_at.map_or(false, |started| {
            now.since(started) >= Duration::from_millis(config.obstacle_after_ms)
        })
    }

    /// Recomputes the infection rate for a new temperature.
    pub(crate) fn update_weather(&mut self, weather: i32, config: &SessionConfig) {
        if self.weather == weather {
            return;
        }
        self.weather = weather;
        self.infection_rate_seconds = infection_rate_seconds(config, weather);
    }

    /// Brings the tree up to date with `now`, recording every transition in order.
    ///
    /// Several health steps may be taken in one call when a long interval has
    /// elapsed, so no intermediate status is ever skipped.
    pub(crate) fn advance(
        &mut self,
        now: Timestamp,
        config: &SessionConfig,
        transitions: &mut Vec<Transition>,
    ) {
        let Some(started) = self.growth_started_at else {
            return;
        };

        let stage = stage_after(now.since(started), config);
        if stage != self.stage {
            self.stage = stage;
            transitions.push(Transition::Stage(stage));
        }

        while let Some(next) = self.next_health(now, config) {
            let from = self.health;
            self.health = next;
            match (self.protected_since.is_some(), next) {
                (_, HealthStatus::Dead) => self.fruit_ready = false,
                (true, _) => {
                    if !self.fruit_ready {
                        transitions.push(Transition::FruitReady);
                    }
                    self.fruit_ready = true;
                }
                (false, _) => {}
            }
            transitions.push(Transition::Health { from, to: next });
        }

        if self.health == HealthStatus::Healthy
            && self.stage == Stage::Adult
            && !self.fruit_ready
            && now.since(self.last_production)
                >= Duration::from_millis(config.production_interval_ms)
        {
            self.fruit_ready = true;
            transitions.push(Transition::FruitReady);
        }
    }

    fn next_health(&self, now: Timestamp, config: &SessionConfig) -> Option<HealthStatus> {
        if let Some(since) = self.protected_since {
            let dwell = now.since(since);
            let required = match self.health {
                HealthStatus::Healthy => return None,
                HealthStatus::Unhealthy => config.recover_unhealthy_ms,
                HealthStatus::Sick => config.recover_sick_ms,
                HealthStatus::Dead => config.recover_dead_ms,
            };
            return (dwell >= Duration::from_millis(required))
                .then(|| self.health.recovered())
                .flatten();
        }

        let infected = now.since(self.infected_at?);
        // The sick threshold is half the rate, floored to whole seconds.
        let rate = self.infection_rate_seconds;
        let required_seconds = match self.health {
            HealthStatus::Unhealthy => (rate / 2.0).floor(),
            HealthStatus::Sick => rate,
            HealthStatus::Healthy | HealthStatus::Dead => return None,
        };
        (infected.as_millis() as f64 >= required_seconds * 1_000.0)
            .then(|| self.health.worsened())
            .flatten()
    }

    pub(crate) fn snapshot(&self, now: Timestamp, config: &SessionConfig) -> TreeSnapshot {
        TreeSnapshot {
            tree: self.reference(),
            hitbox: self.hitbox,
            growth_started: self.growth_started(),
            stage: self.stage,
            health: self.health,
            fruit_ready: self.fruit_ready,
            protected: self.is_protected(),
            obstacle: self.is_obstacle(now, config),
            infection_rate_seconds: self.infection_rate_seconds,
        }
    }
}

fn stage_after(grown: Duration, config: &SessionConfig) -> Stage {
    if grown < Duration::from_millis(config.teen_after_ms) {
        Stage::Seed
    } else if grown < Duration::from_millis(config.adult_after_ms) {
        Stage::Teen
    } else {
        Stage::Adult
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: u64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    fn planted(config: &SessionConfig) -> Olive {
        Olive::new(TreeId::new(0), TileCoord::new(2, 3), at(0), 80, config)
    }

    fn health_path(transitions: &[Transition]) -> Vec<(HealthStatus, HealthStatus)> {
        transitions
            .iter()
            .filter_map(|transition| match transition {
                Transition::Health { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn infection_rate_stays_at_slow_bound_across_weather_range() {
        let config = SessionConfig::default();
        for weather in config.weather_min..=config.weather_max {
            let rate = infection_rate_seconds(&config, weather);
            assert!((rate - 10.0).abs() < f64::EPSILON, "weather {weather} gave {rate}");
        }
    }

    #[test]
    fn dormant_seed_never_changes() {
        let config = SessionConfig::default();
        let mut olive = planted(&config);
        let mut transitions = Vec::new();
        olive.advance(at(60_000), &config, &mut transitions);
        assert!(transitions.is_empty());
        assert!(!olive.is_obstacle(at(60_000), &config));
    }

    #[test]
    fn growth_moves_through_every_stage() {
        let config = SessionConfig::default();
        let mut olive = planted(&config);
        olive.start_growth(at(1_000)).expect("start growth");

        let mut transitions = Vec::new();
        olive.advance(at(4_999), &config, &mut transitions);
        assert!(transitions.is_empty());
        olive.advance(at(5_000), &config, &mut transitions);
        assert_eq!(transitions, vec![Transition::Stage(Stage::Teen)]);

        transitions.clear();
        olive.advance(at(11_000), &config, &mut transitions);
        assert_eq!(
            transitions,
            vec![Transition::Stage(Stage::Adult), Transition::FruitReady]
        );
    }

    #[test]
    fn watering_twice_is_refused() {
        let config = SessionConfig::default();
        let mut olive = planted(&config);
        assert_eq!(olive.start_growth(at(0)), Ok(()));
        assert_eq!(olive.start_growth(at(10)), Err(TreeError::AlreadyGrowing));
    }

    #[test]
    fn obstacle_after_two_seconds_of_growth() {
        let config = SessionConfig::default();
        let mut olive = planted(&config);
        olive.start_growth(at(500)).expect("start growth");
        assert!(!olive.is_obstacle(at(2_499), &config));
        assert!(olive.is_obstacle(at(2_500), &config));
    }

    #[test]
    fn harvest_requires_fruit_and_life() {
        let config = SessionConfig::default();
        let mut olive = planted(&config);
        assert_eq!(olive.harvest(at(0)), Err(TreeError::NoFruit));

        olive.start_growth(at(0)).expect("start growth");
        let mut transitions = Vec::new();
        olive.advance(at(10_000), &config, &mut transitions);
        assert_eq!(olive.harvest(at(10_000)), Ok(()));
        assert_eq!(olive.harvest(at(10_001)), Err(TreeError::NoFruit));

        transitions.clear();
        olive.advance(at(12_999), &config, &mut transitions);
        assert!(!transitions.contains(&Transition::FruitReady));
        olive.advance(at(13_000), &config, &mut transitions);
        assert!(transitions.contains(&Transition::FruitReady));
    }

    #[test]
    fn unprotected_infection_walks_every_step_to_death() {
        let config = SessionConfig::default();
        let mut olive = planted(&config);
        olive.start_growth(at(0)).expect("start growth");
        olive.infect(at(1_000), true).expect("infect");
        assert_eq!(olive.harvest(at(1_000)), Ok(()));

        let mut transitions = Vec::new();
        olive.advance(at(30_000), &config, &mut transitions);
        assert_eq!(
            health_path(&transitions),
            vec![
                (HealthStatus::Unhealthy, HealthStatus::Sick),
                (HealthStatus::Sick, HealthStatus::Dead),
            ]
        );
        assert_eq!(olive.harvest(at(30_000)), Err(TreeError::Dead));
    }

    #[test]
    fn sick_at_half_rate_and_dead_at_full_rate() {
        let config = SessionConfig::default();
        let mut olive = planted(&config);
        olive.start_growth(at(0)).expect("start growth");
        olive.infect(at(0), true).expect("infect");

        let mut transitions = Vec::new();
        olive.advance(at(4_999), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Unhealthy);
        olive.advance(at(5_000), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Sick);
        olive.advance(at(9_999), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Sick);
        olive.advance(at(10_000), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Dead);
    }

    #[test]
    fn sick_threshold_floors_to_whole_seconds() {
        let config = SessionConfig {
            infection_rate_slowest_ms: 7_500,
            ..SessionConfig::default()
        };
        let mut olive = planted(&config);
        olive.start_growth(at(0)).expect("start growth");
        olive.infect(at(0), true).expect("infect");

        let mut transitions = Vec::new();
        olive.advance(at(2_999), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Unhealthy);
        olive.advance(at(3_000), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Sick);
        olive.advance(at(7_499), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Sick);
        olive.advance(at(7_500), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Dead);
    }

    #[test]
    fn protection_blocks_only_respectful_infections() {
        let config = SessionConfig::default();
        let mut olive = planted(&config);
        olive.protect(at(0)).expect("protect");
        assert_eq!(olive.protect(at(1)), Err(TreeError::AlreadyProtected));
        assert_eq!(olive.infect(at(0), true), Err(TreeError::Protected));
        assert_eq!(olive.health(), HealthStatus::Healthy);
        assert_eq!(olive.infect(at(0), false), Ok(()));
        assert_eq!(olive.health(), HealthStatus::Unhealthy);
    }

    #[test]
    fn protected_dead_tree_recovers_one_step_at_a_time() {
        let config = SessionConfig::default();
        let mut olive = planted(&config);
        olive.start_growth(at(0)).expect("start growth");
        olive.infect(at(0), true).expect("infect");
        let mut transitions = Vec::new();
        olive.advance(at(10_000), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Dead);

        olive.protect(at(10_000)).expect("protect");
        transitions.clear();
        olive.advance(at(11_999), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Dead);
        olive.advance(at(12_000), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Sick);
        olive.advance(at(14_000), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Unhealthy);
        olive.advance(at(16_000), &config, &mut transitions);
        assert_eq!(olive.health(), HealthStatus::Healthy);
        assert_eq!(olive.harvest(at(16_000)), Ok(()));
    }

    #[test]
    fn stale_protection_reverses_several_steps_in_one_advance() {
        let config = SessionConfig::default();
        let mut olive = planted(&config);
        olive.start_growth(at(0)).expect("start growth");
        olive.infect(at(0), true).expect("infect");
        let mut transitions = Vec::new();
        olive.advance(at(10_000), &config, &mut transitions);
        olive.protect(at(10_000)).expect("protect");

        transitions.clear();
        olive.advance(at(20_000), &config, &mut transitions);
        assert_eq!(
            health_path(&transitions),
            vec![
                (HealthStatus::Dead, HealthStatus::Sick),
                (HealthStatus::Sick, HealthStatus::Unhealthy),
                (HealthStatus::Unhealthy, HealthStatus::Healthy),
            ]
        );
    }

    #[test]
    fn infection_ignores_sick_trees() {
        let config = SessionConfig::default();
        let mut olive = planted(&config);
        olive.infect(at(0), false).expect("infect");
        assert_eq!(olive.infect(at(1), false), Err(TreeError::NotHealthy));
        assert_eq!(olive.start_growth(at(1)), Err(TreeError::NotHealthy));
    }
}
