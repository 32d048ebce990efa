#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Olive Grove adapters.
//!
//! Nothing in this crate draws. It turns a [`SessionSnapshot`] into a
//! declarative [`Scene`] that a backend can paint however it likes.

use anyhow::Result as AnyResult;
use glam::Vec2;
use olive_grove_core::{
    format_clock, HealthStatus, PestId, PestKind, PestPhase, PestSnapshot, PlayerMode, Rect,
    SessionConfig, SessionSnapshot, Stage, TileCoord, TreeRef, TreeSnapshot,
};
use std::{error::Error, fmt, time::Duration};

pub use olive_grove_system_interaction::FrameInput;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Describes the square tile grid the grove is planted on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single tile expressed in world units.
    pub tile_length: f32,
    /// Color used when filling the soil.
    pub soil_color: Color,
}

impl TileGridPresentation {
    /// Soil color used by [`Scene::from_snapshot`].
    pub const SOIL: Color = Color::from_rgb_u8(121, 92, 52);

    /// Creates a new tile grid descriptor.
    ///
    /// Returns an error when `tile_length` is not a positive number.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_length: f32,
        soil_color: Color,
    ) -> Result<Self, RenderingError> {
        if !(tile_length > 0.0) {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns,
            rows,
            tile_length,
            soil_color,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// Tile under a world-space position, or `None` outside the grid.
    #[must_use]
    pub fn tile_at(&self, position: Vec2) -> Option<TileCoord> {
        if position.x < 0.0
            || position.y < 0.0
            || position.x >= self.width()
            || position.y >= self.height()
        {
            return None;
        }
        Some(TileCoord::containing(position, self.tile_length))
    }
}

/// Image a tree is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeSprite {
    /// Freshly planted or young seedling.
    Seed,
    /// Half-grown tree.
    Teen,
    /// Fully grown tree without fruit.
    Adult,
    /// Tree carrying harvestable fruit.
    Fruiting,
    /// Sick tree.
    Sick,
    /// Dead tree.
    Dead,
}

impl TreeSprite {
    /// Picks the sprite for a tree snapshot.
    ///
    /// Health overrides growth: sick and dead trees always show their
    /// condition, and fruit shows on any living tree that carries it.
    #[must_use]
    pub fn for_tree(tree: &TreeSnapshot) -> Self {
        match tree.health {
            HealthStatus::Dead => Self::Dead,
            HealthStatus::Sick => Self::Sick,
            HealthStatus::Healthy | HealthStatus::Unhealthy if tree.fruit_ready => Self::Fruiting,
            HealthStatus::Healthy | HealthStatus::Unhealthy => match tree.stage {
                Stage::Seed => Self::Seed,
                Stage::Teen => Self::Teen,
                Stage::Adult => Self::Adult,
            },
        }
    }
}

/// Tree drawn inside the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreePresentation {
    /// Tree being drawn.
    pub tree: TreeRef,
    /// Square the sprite covers.
    pub rect: Rect,
    /// Sprite to draw.
    pub sprite: TreeSprite,
    /// Whether the tree has been watered.
    pub growing: bool,
    /// Whether a protection marker should be drawn.
    pub protected: bool,
}

impl TreePresentation {
    fn from_snapshot(tree: &TreeSnapshot) -> Self {
        Self {
            tree: tree.tree,
            rect: tree.hitbox,
            sprite: TreeSprite::for_tree(tree),
            growing: tree.growth_started,
            protected: tree.protected,
        }
    }
}

/// Pest drawn on top of the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PestPresentation {
    /// Identifier of the pest.
    pub id: PestId,
    /// Square the sprite covers.
    pub rect: Rect,
    /// Kind of pest.
    pub kind: PestKind,
    /// Lifecycle phase.
    pub phase: PestPhase,
    /// Fill color.
    pub color: Color,
}

impl PestPresentation {
    /// Basic pest fill color.
    pub const BASIC: Color = Color::from_rgb_u8(40, 40, 40);
    /// Mutant pest fill color.
    pub const MUTANT: Color = Color::from_rgb_u8(150, 30, 160);

    fn from_snapshot(pest: &PestSnapshot) -> Self {
        let base = match pest.kind {
            PestKind::Basic => Self::BASIC,
            PestKind::Mutant => Self::MUTANT,
        };
        // Departing pests fade so players can tell they are leaving.
        let color = if pest.phase == PestPhase::Departing {
            base.lighten(0.5)
        } else {
            base
        };
        Self {
            id: pest.id,
            rect: pest.hitbox,
            kind: pest.kind,
            phase: pest.phase,
            color,
        }
    }
}

/// Player avatar and the selection outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Square the avatar covers.
    pub rect: Rect,
    /// Outline of the selected tile.
    pub selection: Rect,
    /// Active tool mode, which selects the avatar image.
    pub mode: PlayerMode,
}

/// Heads-up display values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hud {
    /// Current score.
    pub score: u32,
    /// Remaining time as `mm:ss`.
    pub clock: String,
    /// Ambient temperature.
    pub weather: i32,
    /// Protections left to spend.
    pub protections: u32,
}

/// Scene description combining the grid and everything standing on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile grid that composes the play area.
    pub tile_grid: TileGridPresentation,
    /// Trees in tile order.
    pub trees: Vec<TreePresentation>,
    /// Pests in spawn order.
    pub pests: Vec<PestPresentation>,
    /// The player.
    pub player: PlayerPresentation,
    /// Heads-up display.
    pub hud: Hud,
    /// Whether the session reached its terminal state.
    pub ended: bool,
}

impl Scene {
    /// Builds a scene from a session snapshot.
    pub fn from_snapshot(
        snapshot: &SessionSnapshot,
        config: &SessionConfig,
    ) -> Result<Self, RenderingError> {
        let tile_grid = TileGridPresentation::new(
            config.columns,
            config.rows,
            config.tile_size,
            TileGridPresentation::SOIL,
        )?;

        Ok(Self {
            tile_grid,
            trees: snapshot
                .trees
                .iter()
                .map(TreePresentation::from_snapshot)
                .collect(),
            pests: snapshot
                .pests
                .iter()
                .map(PestPresentation::from_snapshot)
                .collect(),
            player: PlayerPresentation {
                rect: snapshot.player.rect,
                selection: snapshot.player.selection,
                mode: snapshot.player.mode,
            },
            hud: Hud {
                score: snapshot.score,
                clock: format_clock(snapshot.remaining),
                weather: snapshot.weather,
                protections: snapshot.protections,
            },
            ended: snapshot.ended,
        })
    }

    /// Tree planted on the provided tile, if any.
    #[must_use]
    pub fn tree_at(&self, tile: TileCoord) -> Option<&TreePresentation> {
        self.trees.iter().find(|tree| tree.tree.tile == tile)
    }

    /// Tile currently selected by the player.
    #[must_use]
    pub fn selected_tile(&self) -> TileCoord {
        TileCoord::containing(self.player.selection.center(), self.tile_grid.tile_length)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Olive Grove scenes.
pub trait RenderingBackend {
    /// Runs the backend until the scene ends or it is asked to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured for the frame, and refreshes the scene before it is
    /// presented.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tile length must be positive to produce a visible grid.
    InvalidTileLength {
        /// Provided tile length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(f, "tile_length must be positive (received {tile_length})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use olive_grove_core::{PestView, PlayerSnapshot, Timestamp, TreeId, TreeView};

    fn tree(health: HealthStatus, stage: Stage, fruit_ready: bool) -> TreeSnapshot {
        TreeSnapshot {
            tree: TreeRef::new(TileCoord::new(2, 3), TreeId::new(0)),
            hitbox: Rect::new(128.0, 192.0, 64.0, 64.0),
            growth_started: true,
            stage,
            health,
            fruit_ready,
            protected: false,
            obstacle: true,
            infection_rate_seconds: 10.0,
        }
    }

    fn snapshot(trees: Vec<TreeSnapshot>, pests: Vec<PestSnapshot>) -> SessionSnapshot {
        SessionSnapshot {
            now: Timestamp::from_millis(1_500),
            trees: TreeView::from_snapshots(trees),
            pests: PestView::from_snapshots(pests),
            player: PlayerSnapshot {
                rect: Rect::new(448.0, 320.0, 64.0, 64.0),
                mode: PlayerMode::Watering,
                selected_tile: TileCoord::new(8, 5),
                selection: Rect::new(512.0, 320.0, 64.0, 64.0),
            },
            score: 3_000,
            remaining: Duration::from_millis(75_900),
            weather: 72,
            protections: 1,
            ended: false,
        }
    }

    #[test]
    fn tile_grid_rejects_non_positive_tile_length() {
        let result = TileGridPresentation::new(15, 11, 0.0, TileGridPresentation::SOIL);
        assert_eq!(
            result,
            Err(RenderingError::InvalidTileLength { tile_length: 0.0 })
        );
    }

    #[test]
    fn tile_at_ignores_positions_outside_the_grid() {
        let grid = TileGridPresentation::new(15, 11, 64.0, TileGridPresentation::SOIL)
            .expect("positive tile length");
        assert_eq!(grid.tile_at(Vec2::new(70.0, 10.0)), Some(TileCoord::new(1, 0)));
        assert_eq!(grid.tile_at(Vec2::new(-1.0, 10.0)), None);
        assert_eq!(grid.tile_at(Vec2::new(960.0, 10.0)), None);
    }

    #[test]
    fn health_overrides_growth_when_picking_sprites() {
        assert_eq!(
            TreeSprite::for_tree(&tree(HealthStatus::Healthy, Stage::Teen, false)),
            TreeSprite::Teen
        );
        assert_eq!(
            TreeSprite::for_tree(&tree(HealthStatus::Unhealthy, Stage::Adult, true)),
            TreeSprite::Fruiting
        );
        assert_eq!(
            TreeSprite::for_tree(&tree(HealthStatus::Sick, Stage::Adult, true)),
            TreeSprite::Sick
        );
        assert_eq!(
            TreeSprite::for_tree(&tree(HealthStatus::Dead, Stage::Adult, false)),
            TreeSprite::Dead
        );
    }

    #[test]
    fn scene_mirrors_the_snapshot() {
        let pest = PestSnapshot {
            id: PestId::new(4),
            kind: PestKind::Mutant,
            position: Vec2::new(10.5, 20.25),
            hitbox: Rect::new(10.0, 20.0, 32.0, 32.0),
            phase: PestPhase::Departing,
            target: None,
        };
        let scene = Scene::from_snapshot(
            &snapshot(vec![tree(HealthStatus::Healthy, Stage::Seed, false)], vec![pest]),
            &SessionConfig::default(),
        )
        .expect("default config renders");

        assert_eq!(scene.hud.clock, "01:15");
        assert_eq!(scene.hud.score, 3_000);
        assert_eq!(scene.player.mode, PlayerMode::Watering);
        assert_eq!(scene.selected_tile(), TileCoord::new(8, 5));
        assert_eq!(
            scene.tree_at(TileCoord::new(2, 3)).map(|tree| tree.sprite),
            Some(TreeSprite::Seed)
        );
        assert!(scene.tree_at(TileCoord::new(0, 0)).is_none());
        assert_eq!(scene.pests.len(), 1);
        assert_eq!(
            scene.pests[0].color,
            PestPresentation::MUTANT.lighten(0.5)
        );
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::new(0.0, 0.5, 1.0, 0.25).lighten(0.5);
        assert_eq!(color, Color::new(0.5, 0.75, 1.0, 0.25));
    }
}
