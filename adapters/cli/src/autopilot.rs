//! Scripted player used by the headless backend.

use glam::Vec2;
use olive_grove_core::{Direction, PestPhase, PlayerMode, Steering};
use olive_grove_rendering::{FrameInput, Scene, TreeSprite};

/// Frames between two tool decisions while standing still.
const ACTION_PERIOD: u64 = 15;
/// Frames between two swats at a pest.
const CLICK_PERIOD: u64 = 20;
/// Frames spent on one leg of the walking route.
const LEG_PERIOD: u64 = 120;
/// Frames of each leg spent moving; roughly one tile at default speed.
const LEG_STEPS: u64 = 13;

const ROUTE: [Direction; 4] = [
    Direction::East,
    Direction::South,
    Direction::West,
    Direction::North,
];

/// Derives frame input from the visible scene alone.
#[derive(Clone, Debug, Default)]
pub(crate) struct Autopilot {
    frame: u64,
}

impl Autopilot {
    pub(crate) const fn new() -> Self {
        Self { frame: 0 }
    }

    /// Produces the input for the next frame.
    pub(crate) fn next_input(&mut self, scene: &Scene) -> FrameInput {
        let frame = self.frame;
        self.frame = self.frame.saturating_add(1);

        let steering = Self::steering(frame);
        let mut input = FrameInput::steering(steering);
        if steering.is_idle()
            && frame % ACTION_PERIOD == 0
            && scene.player.mode == PlayerMode::Normal
        {
            Self::tend_selected_tile(scene, &mut input);
        }
        if frame % CLICK_PERIOD == 0 {
            input.clicks.extend(Self::swat(scene));
        }
        input
    }

    fn steering(frame: u64) -> Steering {
        if frame % LEG_PERIOD >= LEG_STEPS {
            return Steering::default();
        }
        let leg = (frame / LEG_PERIOD) % ROUTE.len() as u64;
        ROUTE
            .get(leg as usize)
            .map_or_else(Steering::default, |direction| Steering::toward(*direction))
    }

    fn tend_selected_tile(scene: &Scene, input: &mut FrameInput) {
        let tile = scene.selected_tile();
        let Some(tree) = scene.tree_at(tile) else {
            input.plant = scene
                .tile_grid
                .tile_at(scene.player.selection.center())
                .is_some();
            return;
        };

        let can_protect = scene.hud.protections > 0 && !tree.protected;
        match tree.sprite {
            _ if !tree.growing => input.water = true,
            TreeSprite::Fruiting => input.harvest = true,
            TreeSprite::Sick if can_protect => input.protect = true,
            TreeSprite::Dead if can_protect => input.protect = true,
            TreeSprite::Dead => input.remove = true,
            _ => {}
        }
    }

    /// Center of the first pest still heading for or feeding on a tree.
    fn swat(scene: &Scene) -> Option<Vec2> {
        scene
            .pests
            .iter()
            .filter(|pest| pest.phase != PestPhase::Departing)
            .map(|pest| pest.rect.center())
            .find(|center| scene.tile_grid.tile_at(*center).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use olive_grove_core::SessionConfig;
    use olive_grove_session::Session;

    fn scene(session: &Session) -> Scene {
        Scene::from_snapshot(&session.snapshot(), session.config()).expect("valid scene")
    }

    #[test]
    fn stops_then_plants_and_waters_the_selected_tile() {
        let mut session = Session::new(SessionConfig::default()).expect("valid config");
        let mut autopilot = Autopilot::new();

        let mut inputs = Vec::new();
        for _ in 0..=2 * ACTION_PERIOD {
            let input = autopilot.next_input(&scene(&session));
            let _ = session.step(&input, olive_grove_core::TICK);
            inputs.push(input);
        }

        let (walking, standing) = inputs.split_at(ACTION_PERIOD as usize);
        assert!(walking.iter().all(|input| !input.plant && !input.water));
        assert!(standing[0].plant);
        assert!(standing[ACTION_PERIOD as usize].water, "a dormant tree gets watered");
        assert_eq!(
            session.snapshot().trees.iter().next().map(|tree| tree.tree.tile),
            Some(olive_grove_core::TileCoord::new(9, 5))
        );
    }

    #[test]
    fn walks_one_short_leg_then_idles() {
        assert_eq!(Autopilot::steering(0), Steering::toward(Direction::East));
        assert_eq!(
            Autopilot::steering(LEG_STEPS - 1),
            Steering::toward(Direction::East)
        );
        assert!(Autopilot::steering(LEG_STEPS).is_idle());
        assert_eq!(
            Autopilot::steering(LEG_PERIOD * 3),
            Steering::toward(Direction::North)
        );
    }

    #[test]
    fn idle_grove_produces_no_clicks() {
        let session = Session::new(SessionConfig::default()).expect("valid config");
        let mut autopilot = Autopilot::new();
        assert!(autopilot.next_input(&scene(&session)).clicks.is_empty());
    }
}
