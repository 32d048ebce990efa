#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Olive Grove simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches.

mod config;
mod geometry;

use std::time::Duration;

pub use config::{ConfigError, PestProfile, SessionConfig};
pub use geometry::Rect;
pub use glam::Vec2;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed simulation rate adapters are expected to drive the world at.
pub const TICKS_PER_SECOND: u32 = 60;

/// Duration of a single fixed simulation step.
pub const TICK: Duration = Duration::from_nanos(16_666_667);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Replaces the ambient temperature and recomputes every infection rate.
    SetWeather {
        /// New temperature value, already clamped by the caller.
        temperature: i32,
    },
    /// Moves the player one step along each held axis.
    SteerPlayer {
        /// Directions held on this tick.
        steering: Steering,
    },
    /// Plants a tree on the player's selected tile.
    PlantTree,
    /// Starts growth of any tree under the selected tile and enters watering mode.
    WaterTile,
    /// Harvests any ready tree under the selected tile.
    HarvestTile,
    /// Spends a protection on the tree under the selected tile.
    ProtectTile,
    /// Schedules the tree under the selected tile for delayed removal and enters removing mode.
    RemoveTile,
    /// Removes every pest whose hitbox contains the point.
    Click {
        /// Pointer location expressed in world units.
        point: Vec2,
    },
    /// Adds a pest to the session.
    SpawnPest {
        /// Kind of pest to create.
        kind: PestKind,
        /// Top-left position the pest starts from.
        origin: Vec2,
        /// Lateral weave applied while flying.
        wobble: Wobble,
        /// Tree the pest flies toward, if any was eligible.
        target: Option<TreeRef>,
    },
    /// Deletes every tree whose scheduled removal time has passed.
    ResolvePendingRemovals,
    /// Advances every tree state machine to the current time.
    AdvanceTrees,
    /// Advances every pest state machine by one tick.
    AdvancePests,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Clock reading after the advance.
        now: Timestamp,
        /// Time left before the session ends.
        remaining: Duration,
    },
    /// Announces the terminal state of the session. Emitted exactly once.
    SessionEnded {
        /// Final score.
        score: u32,
    },
    /// Reports a new ambient temperature.
    WeatherChanged {
        /// Temperature now in effect.
        temperature: i32,
    },
    /// Confirms that the player's selected tile changed.
    SelectionChanged {
        /// Tile now targeted by tool actions.
        tile: TileCoord,
    },
    /// Confirms that the player entered or left a tool mode.
    PlayerModeChanged {
        /// Mode now active.
        mode: PlayerMode,
    },
    /// Confirms that a tree was planted.
    TreePlanted {
        /// Reference to the new tree.
        tree: TreeRef,
    },
    /// Confirms that a tree began growing.
    GrowthStarted {
        /// Tree that started growing.
        tree: TreeRef,
    },
    /// Reports that a tree reached a new growth stage.
    TreeStageChanged {
        /// Tree that grew.
        tree: TreeRef,
        /// Stage reached.
        stage: Stage,
    },
    /// Reports that a tree has fruit ready for harvest.
    FruitReady {
        /// Tree bearing fruit.
        tree: TreeRef,
    },
    /// Confirms a successful harvest.
    TreeHarvested {
        /// Harvested tree.
        tree: TreeRef,
    },
    /// Reports the session score after it changed.
    ScoreChanged {
        /// Score after the change.
        score: u32,
    },
    /// Confirms that a tree became protected.
    TreeProtected {
        /// Protected tree.
        tree: TreeRef,
    },
    /// Reports that a protection was spent.
    ProtectionConsumed {
        /// Protections left after spending one.
        remaining: u32,
    },
    /// Confirms that a tree was queued for delayed removal.
    RemovalScheduled {
        /// Tile whose tree will be removed.
        tile: TileCoord,
        /// Time at which the removal takes effect.
        due: Timestamp,
    },
    /// Confirms that a tree left the session.
    TreeRemoved {
        /// Removed tree.
        tree: TreeRef,
    },
    /// Reports that a pest infected a tree.
    TreeInfected {
        /// Infected tree.
        tree: TreeRef,
        /// Kind of pest responsible.
        by: PestKind,
    },
    /// Reports a single step along the health track.
    TreeHealthChanged {
        /// Tree whose health changed.
        tree: TreeRef,
        /// Status before the step.
        from: HealthStatus,
        /// Status after the step.
        to: HealthStatus,
    },
    /// Confirms that a pest entered the session.
    PestSpawned {
        /// Identifier assigned to the pest.
        pest: PestId,
        /// Kind of pest.
        kind: PestKind,
        /// Tree the pest flies toward, if any.
        target: Option<TreeRef>,
    },
    /// Reports that a pest reached its target tree.
    PestArrived {
        /// Pest that arrived.
        pest: PestId,
        /// Tree the pest landed on.
        tree: TreeRef,
    },
    /// Reports that a pest finished dwelling and is flying off-screen.
    PestDeparting {
        /// Departing pest.
        pest: PestId,
    },
    /// Reports that a pest reached its exit point and left the session.
    PestExited {
        /// Pest that left.
        pest: PestId,
    },
    /// Reports that a pest was removed by a pointer click.
    PestSquashed {
        /// Pest that was removed.
        pest: PestId,
    },
    /// Reports that a tool action had no effect.
    ActionRejected {
        /// Action that was attempted.
        action: ToolAction,
        /// Reason the action was refused.
        reason: ActionError,
    },
}

/// Monotonic reading of the session clock, in milliseconds since the session started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Clock reading at session start.
    pub const ZERO: Self = Self(0);

    /// Creates a timestamp from whole milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds elapsed since session start.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the timestamp shifted forward by `duration`, saturating on overflow.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// Time elapsed since `earlier`, zero when `earlier` lies in the future.
    #[must_use]
    pub fn since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Integer tile position on the playfield grid.
///
/// Ordering is column-major, which also fixes the order in which trees are
/// visited when several candidates match a tool action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: i32,
    row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the tile.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Tile containing the provided world-space point.
    #[must_use]
    pub fn containing(point: Vec2, tile_size: f32) -> Self {
        Self::new(
            (point.x / tile_size).floor() as i32,
            (point.y / tile_size).floor() as i32,
        )
    }

    /// Returns the neighbouring tile one step in `direction`.
    #[must_use]
    pub const fn neighbour(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.column.saturating_add(dx), self.row.saturating_add(dy))
    }

    /// World-space position of the tile's top-left corner.
    #[must_use]
    pub fn origin(&self, tile_size: f32) -> Vec2 {
        Vec2::new(self.column as f32 * tile_size, self.row as f32 * tile_size)
    }

    /// World-space square covered by the tile.
    #[must_use]
    pub fn rect(&self, tile_size: f32) -> Rect {
        Rect::square(self.origin(tile_size), tile_size)
    }
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Column and row delta of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Movement keys held during a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Steering {
    /// Move toward decreasing x.
    pub left: bool,
    /// Move toward increasing x.
    pub right: bool,
    /// Move toward decreasing y.
    pub up: bool,
    /// Move toward increasing y.
    pub down: bool,
}

impl Steering {
    /// Steering with a single held direction.
    #[must_use]
    pub const fn toward(direction: Direction) -> Self {
        Self {
            left: matches!(direction, Direction::West),
            right: matches!(direction, Direction::East),
            up: matches!(direction, Direction::North),
            down: matches!(direction, Direction::South),
        }
    }

    /// Reports whether any direction is held.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        !(self.left || self.right || self.up || self.down)
    }
}

/// Unique identifier assigned to a planted tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u32);

impl TreeId {
    /// Creates a new tree identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Non-owning reference to a tree: the tile it occupies plus its identity.
///
/// The tree may be removed at any time; holders must look it up again before
/// every use and treat a mismatch as "gone".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeRef {
    /// Tile the tree occupies.
    pub tile: TileCoord,
    /// Identity of the tree on that tile.
    pub id: TreeId,
}

impl TreeRef {
    /// Creates a reference to the tree `id` planted on `tile`.
    #[must_use]
    pub const fn new(tile: TileCoord, id: TreeId) -> Self {
        Self { tile, id }
    }
}

/// Unique identifier assigned to a pest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PestId(u32);

impl PestId {
    /// Creates a new pest identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Growth track of a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Freshly planted or recently watered.
    Seed,
    /// Half-grown.
    Teen,
    /// Fully grown and eligible to fruit.
    Adult,
}

/// Health track of a tree, ordered from best to worst.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HealthStatus {
    /// Uninfected.
    Healthy,
    /// Freshly infected.
    Unhealthy,
    /// Infection has worsened.
    Sick,
    /// Terminal on the unprotected path.
    Dead,
}

impl HealthStatus {
    /// Next stage along the unprotected path, if any.
    #[must_use]
    pub const fn worsened(self) -> Option<Self> {
        match self {
            Self::Healthy => Some(Self::Unhealthy),
            Self::Unhealthy => Some(Self::Sick),
            Self::Sick => Some(Self::Dead),
            Self::Dead => None,
        }
    }

    /// Previous stage along the protected recovery path, if any.
    #[must_use]
    pub const fn recovered(self) -> Option<Self> {
        match self {
            Self::Healthy => None,
            Self::Unhealthy => Some(Self::Healthy),
            Self::Sick => Some(Self::Unhealthy),
            Self::Dead => Some(Self::Sick),
        }
    }
}

/// Kinds of pests that can enter the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PestKind {
    /// Ordinary insect, blocked by protection and only drawn to growing trees.
    Basic,
    /// Late-session variant that ignores protection and targets any tree.
    Mutant,
}

/// Phase of a pest's one-directional lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PestPhase {
    /// Flying toward its target, or hovering when it has none.
    Approaching,
    /// Sitting on its target until the dwell elapses.
    Waiting,
    /// Flying toward an off-screen exit point.
    Departing,
}

/// Playfield edge a pest enters from or leaves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Beyond the left border.
    Left,
    /// Beyond the right border.
    Right,
    /// Above the top border.
    Top,
    /// Below the bottom border.
    Bottom,
}

impl Edge {
    /// Every edge, in the order random draws index into.
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    /// Extent of the border along which the free coordinate is drawn.
    #[must_use]
    pub fn span(self, config: &SessionConfig) -> f32 {
        match self {
            Self::Left | Self::Right => config.height(),
            Self::Top | Self::Bottom => config.width(),
        }
    }

    /// Off-screen top-left position a pest spawns at, `along` units down or across the edge.
    #[must_use]
    pub fn spawn_point(self, along: f32, config: &SessionConfig) -> Vec2 {
        match self {
            Self::Left => Vec2::new(-config.pest_size, along),
            Self::Right => Vec2::new(config.width(), along),
            Self::Top => Vec2::new(along, -config.pest_size),
            Self::Bottom => Vec2::new(along, config.height()),
        }
    }

    /// Off-screen point a departing pest flies to, fully clear of the playfield.
    #[must_use]
    pub fn exit_point(self, along: f32, config: &SessionConfig) -> Vec2 {
        match self {
            Self::Left => Vec2::new(-config.pest_size, along),
            Self::Right => Vec2::new(config.width() + config.pest_size, along),
            Self::Top => Vec2::new(along, -config.pest_size),
            Self::Bottom => Vec2::new(along, config.height() + config.pest_size),
        }
    }
}

/// Sinusoidal lateral weave applied to a pest's flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wobble {
    /// Peak lateral offset per tick.
    pub amplitude: f32,
    /// Angular frequency in radians per second.
    pub frequency: f32,
}

impl Wobble {
    /// Creates a new wobble description.
    #[must_use]
    pub const fn new(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
        }
    }

    /// Lateral offset after `elapsed` seconds of flight.
    #[must_use]
    pub fn offset_at(&self, elapsed_seconds: f32) -> f32 {
        self.amplitude * (elapsed_seconds * self.frequency).sin()
    }
}

/// Exclusive tool modes the player can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerMode {
    /// Free to move and act.
    Normal,
    /// Watering a tile; input is ignored.
    Watering,
    /// Digging up a tree; input is ignored.
    Removing,
}

/// Tile-targeted actions the player can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolAction {
    /// Plant a seed.
    Plant,
    /// Water to start growth.
    Water,
    /// Collect fruit.
    Harvest,
    /// Spend a protection.
    Protect,
    /// Dig up a tree.
    Remove,
}

/// Reasons a tool action had no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ActionError {
    /// The selected tile already holds a tree.
    #[error("selected tile is already planted")]
    Occupied,
    /// The selected tile lies outside the playfield. Planting there is refused
    /// outright so no tree can exist beyond the grid that pests and tools cover.
    #[error("selected tile lies outside the playfield")]
    OutOfBounds,
    /// No tree qualifies under the selected tile.
    #[error("no eligible tree under the selected tile")]
    NoTree,
    /// Every protection has been spent.
    #[error("no protections left")]
    NoProtectionsLeft,
    /// A tool mode is active and blocks input.
    #[error("player is busy with a tool")]
    PlayerBusy,
}

/// Immutable representation of a single tree's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeSnapshot {
    /// Reference to the tree.
    pub tree: TreeRef,
    /// Square the tree occupies.
    pub hitbox: Rect,
    /// Whether growth has been started by watering.
    pub growth_started: bool,
    /// Growth stage.
    pub stage: Stage,
    /// Health stage.
    pub health: HealthStatus,
    /// Whether fruit can be harvested.
    pub fruit_ready: bool,
    /// Whether a protection has been spent on the tree.
    pub protected: bool,
    /// Whether the tree blocks player movement.
    pub obstacle: bool,
    /// Current infection progression period in seconds.
    pub infection_rate_seconds: f64,
}

/// Read-only snapshot describing all trees in the session.
#[derive(Clone, Debug, Default)]
pub struct TreeView {
    snapshots: Vec<TreeSnapshot>,
}

impl TreeView {
    /// Creates a new tree view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TreeSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tree.tile);
        Self { snapshots }
    }

    /// Iterator over the captured tree snapshots in tile order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeSnapshot> {
        self.snapshots.iter()
    }

    /// Number of trees captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no tree was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Looks up the snapshot of the tree planted on `tile`.
    #[must_use]
    pub fn at(&self, tile: TileCoord) -> Option<&TreeSnapshot> {
        self.snapshots
            .binary_search_by_key(&tile, |snapshot| snapshot.tree.tile)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TreeSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single pest's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PestSnapshot {
    /// Unique identifier assigned to the pest.
    pub id: PestId,
    /// Kind of pest.
    pub kind: PestKind,
    /// Exact top-left position.
    pub position: Vec2,
    /// Clickable square.
    pub hitbox: Rect,
    /// Lifecycle phase.
    pub phase: PestPhase,
    /// Tree the pest is bound to, if any.
    pub target: Option<TreeRef>,
}

/// Read-only snapshot describing all pests in the session.
#[derive(Clone, Debug, Default)]
pub struct PestView {
    snapshots: Vec<PestSnapshot>,
}

impl PestView {
    /// Creates a new pest view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PestSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured pest snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &PestSnapshot> {
        self.snapshots.iter()
    }

    /// Number of pests captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no pest was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<PestSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Square the player occupies.
    pub rect: Rect,
    /// Active tool mode.
    pub mode: PlayerMode,
    /// Tile targeted by tool actions.
    pub selected_tile: TileCoord,
    /// Square covered by the selected tile.
    pub selection: Rect,
}

/// Everything a render collaborator needs to draw one frame.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    /// Clock reading.
    pub now: Timestamp,
    /// Every planted tree.
    pub trees: TreeView,
    /// Every live pest.
    pub pests: PestView,
    /// The player.
    pub player: PlayerSnapshot,
    /// Current score.
    pub score: u32,
    /// Time left before the session ends.
    pub remaining: Duration,
    /// Ambient temperature.
    pub weather: i32,
    /// Protections left to spend.
    pub protections: u32,
    /// Whether the session reached its terminal state.
    pub ended: bool,
}

impl SessionSnapshot {
    /// Remaining time formatted as `mm:ss`.
    #[must_use]
    pub fn remaining_clock(&self) -> String {
        format_clock(self.remaining)
    }
}

/// Formats a duration as `mm:ss`, truncating partial seconds.
#[must_use]
pub fn format_clock(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_clock_truncates_partial_seconds() {
        assert_eq!(format_clock(Duration::from_millis(120_000)), "02:00");
        assert_eq!(format_clock(Duration::from_millis(59_999)), "00:59");
        assert_eq!(format_clock(Duration::ZERO), "00:00");
    }

    #[test]
    fn timestamp_since_saturates_for_future_reference() {
        let earlier = Timestamp::from_millis(500);
        let later = Timestamp::from_millis(2_000);
        assert_eq!(later.since(earlier), Duration::from_millis(1_500));
        assert_eq!(earlier.since(later), Duration::ZERO);
    }

    #[test]
    fn health_tracks_are_exact_inverses() {
        for status in [
            HealthStatus::Healthy,
            HealthStatus::Unhealthy,
            HealthStatus::Sick,
            HealthStatus::Dead,
        ] {
            if let Some(worse) = status.worsened() {
                assert_eq!(worse.recovered(), Some(status));
            }
        }
        assert_eq!(HealthStatus::Dead.worsened(), None);
        assert_eq!(HealthStatus::Healthy.recovered(), None);
    }

    #[test]
    fn tile_containing_floors_negative_positions() {
        assert_eq!(
            TileCoord::containing(Vec2::new(-1.0, 65.0), 64.0),
            TileCoord::new(-1, 1)
        );
    }

    #[test]
    fn tree_view_lookup_finds_tile() {
        let tile = TileCoord::new(3, 4);
        let snapshot = TreeSnapshot {
            tree: TreeRef::new(tile, TreeId::new(9)),
            hitbox: tile.rect(64.0),
            growth_started: false,
            stage: Stage::Seed,
            health: HealthStatus::Healthy,
            fruit_ready: false,
            protected: false,
            obstacle: false,
            infection_rate_seconds: 10.0,
        };
        let view = TreeView::from_snapshots(vec![snapshot]);
        assert_eq!(view.at(tile).map(|tree| tree.tree.id), Some(TreeId::new(9)));
        assert!(view.at(TileCoord::new(0, 0)).is_none());
    }

    #[test]
    fn exit_points_clear_the_playfield() {
        let config = SessionConfig::default();
        let size = config.pest_size;
        for edge in Edge::ALL {
            let exit = Rect::square(edge.exit_point(100.0, &config), size);
            let field = Rect::new(0.0, 0.0, config.width(), config.height());
            assert!(!exit.intersects(&field), "{edge:?} exit overlaps the playfield");
        }
    }

    #[test]
    fn wobble_offset_follows_sine() {
        let wobble = Wobble::new(4.0, 2.0);
        assert!(wobble.offset_at(0.0).abs() < f32::EPSILON);
        let quarter_period = std::f32::consts::FRAC_PI_2 / 2.0;
        assert!((wobble.offset_at(quarter_period) - 4.0).abs() < 1e-4);
    }
}
