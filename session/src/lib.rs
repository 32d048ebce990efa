#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestrator: owns the world and every system, and runs one tick
//! of the simulation in a fixed order.
//!
//! Each tick the clock advances first, then weather drifts, player actions
//! are applied, pests spawn, due removals resolve, the player moves, and
//! finally every tree and pest state machine advances.

use std::time::Duration;

use olive_grove_core::{Command, ConfigError, Event, SessionConfig, SessionSnapshot};
use olive_grove_system_interaction::Interaction;
use olive_grove_system_spawning::Spawning;
use olive_grove_system_weather::Weather;
use olive_grove_world::{self as world, query, World};
use tracing::{info, trace};

pub use olive_grove_system_interaction::FrameInput;

/// A running game session.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    world: World,
    weather: Weather,
    spawning: Spawning,
    interaction: Interaction,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl Session {
    /// Validates the configuration and starts a fresh session.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            seed = config.seed,
            duration_ms = config.session_duration_ms,
            "session started"
        );
        Ok(Self::build(config))
    }

    fn build(config: SessionConfig) -> Self {
        Self {
            world: World::new(config.clone()),
            weather: Weather::new(&config),
            spawning: Spawning::new(&config),
            interaction: Interaction::new(),
            events: Vec::new(),
            commands: Vec::new(),
            config,
        }
    }

    /// Discards all state and starts over with the same configuration.
    pub fn restart(&mut self) {
        info!(score = query::score(&self.world), "session restarted");
        *self = Self::build(self.config.clone());
    }

    /// Configuration the session runs with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Reports whether the session reached its terminal state.
    #[must_use]
    pub fn has_ended(&self) -> bool {
        query::has_ended(&self.world)
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u32 {
        query::score(&self.world)
    }

    /// Read-only view of everything a renderer needs.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        query::snapshot(&self.world)
    }

    /// Advances the session by `dt`, applying the frame's input.
    ///
    /// Returns every event the world emitted during the tick. Once the session
    /// has ended the returned slice is always empty.
    pub fn step(&mut self, input: &FrameInput, dt: Duration) -> &[Event] {
        self.events.clear();
        if self.has_ended() {
            return &self.events;
        }

        self.commands.push(Command::Tick { dt });
        self.flush();

        self.weather.handle(
            &self.events,
            query::weather(&self.world),
            &mut self.commands,
        );
        self.flush();

        self.interaction
            .handle(input, query::player(&self.world).mode, &mut self.commands);
        self.flush();

        self.spawning.handle(
            &self.events,
            &query::tree_view(&self.world),
            &mut self.commands,
        );
        self.flush();

        self.commands.push(Command::ResolvePendingRemovals);
        self.flush();

        self.interaction.steer(input, &mut self.commands);
        self.flush();

        self.commands.push(Command::AdvanceTrees);
        self.commands.push(Command::AdvancePests);
        self.flush();

        trace!(
            now = query::now(&self.world).as_millis(),
            events = self.events.len(),
            "tick complete"
        );
        &self.events
    }

    fn flush(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}
