#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Olive Grove.

mod olive;
mod pest;
mod player;

use std::{collections::BTreeMap, time::Duration};

use olive_grove_core::{
    ActionError, Command, Edge, Event, HealthStatus, PestId, PestKind, PlayerMode, Rect,
    SessionConfig, Steering, Timestamp, TileCoord, ToolAction, TreeId, TreeRef, Vec2, Wobble,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

pub use olive::TreeError;

use olive::{Olive, Transition};
use pest::{Pest, PestStep};
use player::Player;

/// Seed offset for the world's own draws: initial weather and exit points.
const WORLD_STREAM: u64 = 0x6578_6974_5f73_7472;

#[derive(Clone, Copy, Debug)]
struct PendingRemoval {
    tree: TreeRef,
    due: Timestamp,
}

/// Represents the authoritative Olive Grove session state.
#[derive(Debug)]
pub struct World {
    config: SessionConfig,
    elapsed: Duration,
    now: Timestamp,
    ended: bool,
    trees: BTreeMap<TileCoord, Olive>,
    next_tree_id: u32,
    pests: Vec<Pest>,
    next_pest_id: u32,
    player: Player,
    pending_removals: Vec<PendingRemoval>,
    weather: i32,
    score: u32,
    protections: u32,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a fresh session from the provided configuration.
    ///
    /// The configuration is expected to have passed [`SessionConfig::validate`].
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed ^ WORLD_STREAM);
        let weather = rng.gen_range(config.weather_min..=config.weather_max);
        Self {
            elapsed: Duration::ZERO,
            now: Timestamp::ZERO,
            ended: false,
            trees: BTreeMap::new(),
            next_tree_id: 0,
            pests: Vec::new(),
            next_pest_id: 0,
            player: Player::new(&config),
            pending_removals: Vec::new(),
            weather,
            score: 0,
            protections: config.initial_protections,
            rng,
            config,
        }
    }

    fn remaining(&self) -> Duration {
        self.config.session_duration().saturating_sub(self.elapsed)
    }

    fn selected_tile(&self) -> TileCoord {
        self.player.selected_tile(self.config.tile_size)
    }

    /// Trees whose square overlaps the selection, in tile order.
    fn selected_trees(&self) -> Vec<TileCoord> {
        let selection = self.player.selection();
        self.trees
            .iter()
            .filter(|(_, olive)| olive.hitbox().intersects(&selection))
            .map(|(tile, _)| *tile)
            .collect()
    }

    fn obstacles(&self) -> Vec<Rect> {
        self.trees
            .values()
            .filter(|olive| olive.is_obstacle(self.now, &self.config))
            .map(Olive::hitbox)
            .collect()
    }

    fn tree(&self, tree: TreeRef) -> Option<&Olive> {
        self.trees.get(&tree.tile).filter(|olive| olive.id() == tree.id)
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        // Sub-millisecond remainders carry over between ticks.
        self.elapsed = self.elapsed.saturating_add(dt);
        let millis = u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX);
        self.now = Timestamp::from_millis(millis);
        let remaining = self.remaining();
        out_events.push(Event::TimeAdvanced {
            dt,
            now: self.now,
            remaining,
        });
        if remaining.is_zero() {
            self.ended = true;
            info!(score = self.score, "session ended");
            out_events.push(Event::SessionEnded { score: self.score });
        }
    }

    fn set_weather(&mut self, temperature: i32, out_events: &mut Vec<Event>) {
        let temperature = temperature.clamp(self.config.weather_min, self.config.weather_max);
        if temperature == self.weather {
            return;
        }
        self.weather = temperature;
        for olive in self.trees.values_mut() {
            olive.update_weather(temperature, &self.config);
        }
        debug!(temperature, "weather changed");
        out_events.push(Event::WeatherChanged { temperature });
    }

    fn steer_player(&mut self, steering: Steering, out_events: &mut Vec<Event>) {
        let before = self.selected_tile();
        let obstacles = self.obstacles();
        self.player.steer(steering, &obstacles, &self.config);
        let after = self.selected_tile();
        if after != before {
            out_events.push(Event::SelectionChanged { tile: after });
        }
        if self.player.expire_mode(self.now, &self.config) {
            out_events.push(Event::PlayerModeChanged {
                mode: self.player.mode(),
            });
        }
    }

    fn enter_mode(&mut self, mode: PlayerMode, out_events: &mut Vec<Event>) {
        if self.player.enter_mode(mode, self.now) {
            out_events.push(Event::PlayerModeChanged { mode });
        }
    }

    fn tool_action(&mut self, action: ToolAction, out_events: &mut Vec<Event>) {
        if self.player.mode() != PlayerMode::Normal {
            reject(action, ActionError::PlayerBusy, out_events);
            return;
        }
        let outcome = match action {
            ToolAction::Plant => self.plant(out_events),
            ToolAction::Water => self.water(out_events),
            ToolAction::Harvest => self.harvest(out_events),
            ToolAction::Protect => self.protect(out_events),
            ToolAction::Remove => self.schedule_removal(out_events),
        };
        if let Err(reason) = outcome {
            reject(action, reason, out_events);
        }
    }

    fn plant(&mut self, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
        let tile = self.selected_tile();
        if !self.config.contains_tile(tile) {
            return Err(ActionError::OutOfBounds);
        }
        if self.trees.contains_key(&tile) {
            return Err(ActionError::Occupied);
        }
        let id = TreeId::new(self.next_tree_id);
        self.next_tree_id = self.next_tree_id.wrapping_add(1);
        let olive = Olive::new(id, tile, self.now, self.weather, &self.config);
        let tree = olive.reference();
        let _ = self.trees.insert(tile, olive);
        debug!(?tree, "tree planted");
        out_events.push(Event::TreePlanted { tree });
        Ok(())
    }

    fn water(&mut self, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
        let mut started = false;
        for tile in self.selected_trees() {
            let Some(olive) = self.trees.get_mut(&tile) else {
                continue;
            };
            if olive.start_growth(self.now).is_ok() {
                started = true;
                out_events.push(Event::GrowthStarted {
                    tree: olive.reference(),
                });
            }
        }
        self.enter_mode(PlayerMode::Watering, out_events);
        if started {
            Ok(())
        } else {
            Err(ActionError::NoTree)
        }
    }

    fn harvest(&mut self, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
        let mut harvested = false;
        for tile in self.selected_trees() {
            let Some(olive) = self.trees.get_mut(&tile) else {
                continue;
            };
            if olive.harvest(self.now).is_ok() {
                harvested = true;
                self.score = self.score.saturating_add(self.config.harvest_reward);
                out_events.push(Event::TreeHarvested {
                    tree: olive.reference(),
                });
                out_events.push(Event::ScoreChanged { score: self.score });
            }
        }
        if harvested {
            Ok(())
        } else {
            Err(ActionError::NoTree)
        }
    }

    fn protect(&mut self, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
        let tiles = self.selected_trees();
        if tiles.is_empty() {
            return Err(ActionError::NoTree);
        }
        for tile in tiles {
            if self.protections == 0 {
                return Err(ActionError::NoProtectionsLeft);
            }
            let Some(olive) = self.trees.get_mut(&tile) else {
                continue;
            };
            // The protection is spent even when the tree was already covered.
            let applied = olive.protect(self.now).is_ok();
            self.protections -= 1;
            if applied {
                out_events.push(Event::TreeProtected {
                    tree: olive.reference(),
                });
            }
            out_events.push(Event::ProtectionConsumed {
                remaining: self.protections,
            });
        }
        Ok(())
    }

    fn schedule_removal(&mut self, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
        let target = self
            .selected_trees()
            .first()
            .and_then(|tile| self.trees.get(tile))
            .map(Olive::reference);
        let scheduled = target.map(|tree| {
            let due = self
                .now
                .saturating_add(Duration::from_millis(self.config.removal_delay_ms));
            self.pending_removals.push(PendingRemoval { tree, due });
            out_events.push(Event::RemovalScheduled {
                tile: tree.tile,
                due,
            });
        });
        self.enter_mode(PlayerMode::Removing, out_events);
        scheduled.ok_or(ActionError::NoTree)
    }

    fn click(&mut self, point: Vec2, out_events: &mut Vec<Event>) {
        self.pests.retain(|pest| {
            if pest.hitbox().contains_point(point) {
                debug!(pest = pest.id().get(), "pest squashed");
                out_events.push(Event::PestSquashed { pest: pest.id() });
                false
            } else {
                true
            }
        });
    }

    fn spawn_pest(
        &mut self,
        kind: PestKind,
        origin: Vec2,
        wobble: Wobble,
        target: Option<TreeRef>,
        out_events: &mut Vec<Event>,
    ) {
        let id = PestId::new(self.next_pest_id);
        self.next_pest_id = self.next_pest_id.wrapping_add(1);
        let profile = self.config.pest_profile(kind);
        self.pests.push(Pest::new(
            id,
            kind,
            origin,
            self.config.pest_size,
            profile.speed,
            wobble,
            self.now,
            target,
        ));
        debug!(pest = id.get(), ?kind, ?target, "pest spawned");
        out_events.push(Event::PestSpawned {
            pest: id,
            kind,
            target,
        });
    }

    fn resolve_pending_removals(&mut self, out_events: &mut Vec<Event>) {
        let now = self.now;
        let (due, pending): (Vec<_>, Vec<_>) = self
            .pending_removals
            .drain(..)
            .partition(|removal| removal.due <= now);
        self.pending_removals = pending;
        for removal in due {
            // A replanted tile keeps its new tree.
            if self.tree(removal.tree).is_none() {
                continue;
            }
            if let Some(olive) = self.trees.remove(&removal.tree.tile) {
                debug!(tree = ?olive.reference(), "tree removed");
                out_events.push(Event::TreeRemoved {
                    tree: olive.reference(),
                });
            }
        }
    }

    fn advance_trees(&mut self, out_events: &mut Vec<Event>) {
        let mut transitions = Vec::new();
        for olive in self.trees.values_mut() {
            transitions.clear();
            olive.advance(self.now, &self.config, &mut transitions);
            let tree = olive.reference();
            for transition in &transitions {
                debug!(?tree, ?transition, "tree transition");
                out_events.push(match *transition {
                    Transition::Stage(stage) => Event::TreeStageChanged { tree, stage },
                    Transition::FruitReady => Event::FruitReady { tree },
                    Transition::Health { from, to } => Event::TreeHealthChanged { tree, from, to },
                });
            }
        }
    }

    fn advance_pests(&mut self, out_events: &mut Vec<Event>) {
        let dwell = Duration::from_millis(self.config.pest_dwell_ms);
        let mut exited = Vec::new();
        for index in 0..self.pests.len() {
            let target_center = self.pests[index]
                .target()
                .and_then(|target| self.tree(target))
                .map(|olive| olive.hitbox().center());
            let now = self.now;
            let pest = &mut self.pests[index];
            match pest.tick(now, target_center, dwell) {
                PestStep::Flying | PestStep::Stalled | PestStep::Waiting => {}
                PestStep::Arrived(tree) => {
                    let (id, kind) = (pest.id(), pest.kind());
                    debug!(pest = id.get(), ?tree, "pest arrived");
                    out_events.push(Event::PestArrived { pest: id, tree });
                    self.infect(tree, kind, out_events);
                }
                PestStep::ReadyToDepart => {
                    let edge = Edge::ALL[self.rng.gen_range(0..Edge::ALL.len())];
                    let along = self.rng.gen_range(0..=edge.span(&self.config) as i32) as f32;
                    let exit = edge.exit_point(along, &self.config);
                    let pest = &mut self.pests[index];
                    pest.depart(exit, now);
                    debug!(pest = pest.id().get(), ?edge, "pest departing");
                    out_events.push(Event::PestDeparting { pest: pest.id() });
                }
                PestStep::Exited => {
                    trace!(pest = pest.id().get(), "pest left the grove");
                    out_events.push(Event::PestExited { pest: pest.id() });
                    exited.push(pest.id());
                }
            }
        }
        if !exited.is_empty() {
            self.pests.retain(|pest| !exited.contains(&pest.id()));
        }
    }

    fn infect(&mut self, tree: TreeRef, kind: PestKind, out_events: &mut Vec<Event>) {
        let respects_protection = self.config.pest_profile(kind).respects_protection;
        let Some(olive) = self
            .trees
            .get_mut(&tree.tile)
            .filter(|olive| olive.id() == tree.id)
        else {
            return;
        };
        match olive.infect(self.now, respects_protection) {
            Ok(()) => {
                debug!(?tree, ?kind, "tree infected");
                out_events.push(Event::TreeInfected { tree, by: kind });
                out_events.push(Event::TreeHealthChanged {
                    tree,
                    from: HealthStatus::Healthy,
                    to: olive.health(),
                });
            }
            Err(error) => trace!(?tree, %error, "infection had no effect"),
        }
    }
}

fn reject(action: ToolAction, reason: ActionError, out_events: &mut Vec<Event>) {
    trace!(?action, %reason, "action rejected");
    out_events.push(Event::ActionRejected { action, reason });
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the session has ended every command is ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.ended {
        return;
    }
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SetWeather { temperature } => world.set_weather(temperature, out_events),
        Command::SteerPlayer { steering } => world.steer_player(steering, out_events),
        Command::PlantTree => world.tool_action(ToolAction::Plant, out_events),
        Command::WaterTile => world.tool_action(ToolAction::Water, out_events),
        Command::HarvestTile => world.tool_action(ToolAction::Harvest, out_events),
        Command::ProtectTile => world.tool_action(ToolAction::Protect, out_events),
        Command::RemoveTile => world.tool_action(ToolAction::Remove, out_events),
        Command::Click { point } => world.click(point, out_events),
        Command::SpawnPest {
            kind,
            origin,
            wobble,
            target,
        } => world.spawn_pest(kind, origin, wobble, target, out_events),
        Command::ResolvePendingRemovals => world.resolve_pending_removals(out_events),
        Command::AdvanceTrees => world.advance_trees(out_events),
        Command::AdvancePests => world.advance_pests(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use olive_grove_core::{
        PestView, PlayerSnapshot, SessionConfig, SessionSnapshot, Timestamp, TreeView,
    };

    /// Configuration the session runs with.
    #[must_use]
    pub fn config(world: &World) -> &SessionConfig {
        &world.config
    }

    /// Current clock reading.
    #[must_use]
    pub fn now(world: &World) -> Timestamp {
        world.now
    }

    /// Time left before the session ends.
    #[must_use]
    pub fn remaining(world: &World) -> Duration {
        world.remaining()
    }

    /// Reports whether the session reached its terminal state.
    #[must_use]
    pub fn has_ended(world: &World) -> bool {
        world.ended
    }

    /// Ambient temperature.
    #[must_use]
    pub fn weather(world: &World) -> i32 {
        world.weather
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Protections left to spend.
    #[must_use]
    pub fn protections(world: &World) -> u32 {
        world.protections
    }

    /// Captures a read-only view of every planted tree.
    #[must_use]
    pub fn tree_view(world: &World) -> TreeView {
        TreeView::from_snapshots(
            world
                .trees
                .values()
                .map(|olive| olive.snapshot(world.now, &world.config))
                .collect(),
        )
    }

    /// Captures a read-only view of every live pest.
    #[must_use]
    pub fn pest_view(world: &World) -> PestView {
        PestView::from_snapshots(world.pests.iter().map(|pest| pest.snapshot()).collect())
    }

    /// Captures the player's position, mode and selection.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot(world.config.tile_size)
    }

    /// Captures everything a renderer needs for one frame.
    #[must_use]
    pub fn snapshot(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            now: world.now,
            trees: tree_view(world),
            pests: pest_view(world),
            player: player(world),
            score: world.score,
            remaining: world.remaining(),
            weather: world.weather,
            protections: world.protections,
            ended: world.ended,
        }
    }
}
