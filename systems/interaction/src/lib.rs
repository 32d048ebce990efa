#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure interaction system translating player input into world commands.

use olive_grove_core::{Command, PlayerMode, Steering, Vec2};

/// Input snapshot distilled from adapter-provided frame input data.
///
/// Movement keys are level-triggered: they report what is held this frame.
/// Tool keys and clicks are edge-triggered: they report presses that happened
/// since the previous frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Movement keys held this frame (`W`, `A`, `S`, `D`).
    pub steering: Steering,
    /// Plant a seed on the selected tile (`P`).
    pub plant: bool,
    /// Water the selected tile (`O`).
    pub water: bool,
    /// Harvest the selected tile (`SPACE`).
    pub harvest: bool,
    /// Spend a protection on the selected tile (`L`).
    pub protect: bool,
    /// Dig up the tree on the selected tile (`R`).
    pub remove: bool,
    /// Pointer clicks in world coordinates, oldest first.
    pub clicks: Vec<Vec2>,
}

impl FrameInput {
    /// Input holding only the provided steering.
    #[must_use]
    pub fn steering(steering: Steering) -> Self {
        Self {
            steering,
            ..Self::default()
        }
    }
}

/// System that gates tool actions on the player's mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct Interaction;

impl Interaction {
    /// Creates a new interaction system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits tool and click commands for the frame.
    ///
    /// Tool keys are dropped while a tool mode is active. Clicks are always
    /// forwarded so pests can be squashed mid-action.
    pub fn handle(&self, input: &FrameInput, mode: PlayerMode, out: &mut Vec<Command>) {
        if mode == PlayerMode::Normal {
            let actions = [
                (input.plant, Command::PlantTree),
                (input.water, Command::WaterTile),
                (input.harvest, Command::HarvestTile),
                (input.protect, Command::ProtectTile),
                (input.remove, Command::RemoveTile),
            ];
            out.extend(
                actions
                    .into_iter()
                    .filter_map(|(pressed, command)| pressed.then_some(command)),
            );
        }

        out.extend(
            input
                .clicks
                .iter()
                .map(|point| Command::Click { point: *point }),
        );
    }

    /// Emits the per-tick movement command. Sent every tick, even when idle,
    /// so the world can expire tool modes.
    pub fn steer(&self, input: &FrameInput, out: &mut Vec<Command>) {
        out.push(Command::SteerPlayer {
            steering: input.steering,
        });
    }
}
