//! Player avatar: collision-aware movement, tile selection and tool modes.

use std::time::Duration;

use olive_grove_core::{
    Direction, PlayerMode, PlayerSnapshot, Rect, SessionConfig, Steering, Timestamp, TileCoord,
    Vec2,
};

/// Share of the player's area an obstacle must cover before it pushes the player out.
const UNSTUCK_OVERLAP: f32 = 0.5;

#[derive(Clone, Debug)]
pub(crate) struct Player {
    rect: Rect,
    selection: Rect,
    mode: PlayerMode,
    mode_started_at: Timestamp,
}

impl Player {
    pub(crate) fn new(config: &SessionConfig) -> Self {
        let rect = Rect::square(config.player_start(), config.tile_size);
        Self {
            selection: rect.translated(Vec2::new(config.tile_size, 0.0)),
            rect,
            mode: PlayerMode::Normal,
            mode_started_at: Timestamp::ZERO,
        }
    }

    pub(crate) fn mode(&self) -> PlayerMode {
        self.mode
    }

    /// Tile targeted by tool actions, rounded from the selection square.
    pub(crate) fn selected_tile(&self, tile_size: f32) -> TileCoord {
        TileCoord::containing(self.selection.center(), tile_size)
    }

    pub(crate) fn selection(&self) -> Rect {
        self.selection
    }

    /// Attempts one step along each held axis, horizontal first.
    ///
    /// Every held key re-targets the selection even when the step is blocked.
    /// Nothing happens while a tool mode is active.
    pub(crate) fn steer(&mut self, steering: Steering, obstacles: &[Rect], config: &SessionConfig) {
        if self.mode != PlayerMode::Normal {
            return;
        }
        let speed = config.player_speed;

        let mut ahead = self.rect;
        if steering.left && self.rect.left() > 0.0 {
            ahead = ahead.translated(Vec2::new(-speed, 0.0));
            self.select(Direction::West, config.tile_size);
            if !blocked(ahead.center(), obstacles) {
                self.rect = self.rect.translated(Vec2::new(-speed, 0.0));
            }
        }
        if steering.right && self.rect.left() < config.width() - self.rect.width() {
            ahead = ahead.translated(Vec2::new(speed, 0.0));
            self.select(Direction::East, config.tile_size);
            if !blocked(ahead.center(), obstacles) {
                self.rect = self.rect.translated(Vec2::new(speed, 0.0));
            }
        }

        let mut ahead = self.rect;
        if steering.up && self.rect.top() > 0.0 {
            ahead = ahead.translated(Vec2::new(0.0, -speed));
            self.select(Direction::North, config.tile_size);
            if !blocked(ahead.center(), obstacles) {
                self.rect = self.rect.translated(Vec2::new(0.0, -speed));
            }
        }
        if steering.down && self.rect.top() < config.height() - self.rect.height() {
            ahead = ahead.translated(Vec2::new(0.0, speed));
            self.select(Direction::South, config.tile_size);
            if !blocked(ahead.center(), obstacles) {
                self.rect = self.rect.translated(Vec2::new(0.0, speed));
            }
        }

        self.unstuck(obstacles);
    }

    fn select(&mut self, direction: Direction, tile_size: f32) {
        let current = TileCoord::containing(self.rect.center(), tile_size);
        self.selection = current.neighbour(direction).rect(tile_size);
    }

    /// Pushes the player out of any obstacle covering at least half of it.
    fn unstuck(&mut self, obstacles: &[Rect]) {
        for obstacle in obstacles {
            let overlap = self.rect.overlap_area(obstacle);
            if overlap < self.rect.area() * UNSTUCK_OVERLAP {
                continue;
            }
            let rect = self.rect;
            let origin = if rect.bottom() > obstacle.top() && rect.top() < obstacle.top() {
                Vec2::new(rect.left(), obstacle.top() - rect.height())
            } else if rect.top() < obstacle.bottom() && rect.bottom() > obstacle.bottom() {
                Vec2::new(rect.left(), obstacle.bottom())
            } else if rect.right() > obstacle.left() && rect.left() < obstacle.left() {
                Vec2::new(obstacle.left() - rect.width(), rect.top())
            } else if rect.left() < obstacle.right() && rect.right() > obstacle.right() {
                Vec2::new(obstacle.right(), rect.top())
            } else {
                continue;
            };
            self.rect = rect.moved_to(origin);
        }
    }

    /// Enters a tool mode. Returns `false` when another mode is already active.
    pub(crate) fn enter_mode(&mut self, mode: PlayerMode, now: Timestamp) -> bool {
        if self.mode != PlayerMode::Normal {
            return false;
        }
        self.mode = mode;
        self.mode_started_at = now;
        true
    }

    /// Returns to normal once the active mode has run strictly longer than its duration.
    pub(crate) fn expire_mode(&mut self, now: Timestamp, config: &SessionConfig) -> bool {
        let duration = match self.mode {
            PlayerMode::Normal => return false,
            PlayerMode::Watering => Duration::from_millis(config.watering_ms),
            PlayerMode::Removing => Duration::from_millis(config.removing_ms),
        };
        if now.since(self.mode_started_at) > duration {
            self.mode = PlayerMode::Normal;
            return true;
        }
        false
    }

    pub(crate) fn snapshot(&self, tile_size: f32) -> PlayerSnapshot {
        PlayerSnapshot {
            rect: self.rect,
            mode: self.mode,
            selected_tile: self.selected_tile(tile_size),
            selection: self.selection,
        }
    }
}

fn blocked(point: Vec2, obstacles: &[Rect]) -> bool {
    obstacles
        .iter()
        .any(|obstacle| obstacle.contains_point(point))
}
