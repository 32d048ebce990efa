use olive_grove_core::{
    Command, Direction, Event, PlayerMode, SessionConfig, Steering, TileCoord, Vec2,
};
use olive_grove_system_interaction::{FrameInput, Interaction};
use olive_grove_world::{self as world, query, World};

fn all_tools() -> FrameInput {
    FrameInput {
        plant: true,
        water: true,
        harvest: true,
        protect: true,
        remove: true,
        clicks: vec![Vec2::new(10.0, 10.0)],
        ..FrameInput::default()
    }
}

#[test]
fn normal_mode_forwards_every_action_in_key_order() {
    let interaction = Interaction::new();
    let mut commands = Vec::new();
    interaction.handle(&all_tools(), PlayerMode::Normal, &mut commands);
    assert_eq!(
        commands,
        vec![
            Command::PlantTree,
            Command::WaterTile,
            Command::HarvestTile,
            Command::ProtectTile,
            Command::RemoveTile,
            Command::Click {
                point: Vec2::new(10.0, 10.0)
            },
        ]
    );
}

#[test]
fn busy_player_only_clicks() {
    let interaction = Interaction::new();
    for mode in [PlayerMode::Watering, PlayerMode::Removing] {
        let mut commands = Vec::new();
        interaction.handle(&all_tools(), mode, &mut commands);
        assert_eq!(
            commands,
            vec![Command::Click {
                point: Vec2::new(10.0, 10.0)
            }],
            "mode {mode:?} should suppress tools"
        );
    }
}

#[test]
fn idle_frames_still_steer() {
    let interaction = Interaction::new();
    let mut commands = Vec::new();
    interaction.steer(&FrameInput::default(), &mut commands);
    assert_eq!(
        commands,
        vec![Command::SteerPlayer {
            steering: Steering::default()
        }]
    );
}

#[test]
fn planting_through_the_world_follows_selection() {
    let mut world = World::new(SessionConfig::default());
    let interaction = Interaction::new();

    let mut commands = Vec::new();
    interaction.steer(
        &FrameInput::steering(Steering::toward(Direction::North)),
        &mut commands,
    );
    interaction.handle(
        &FrameInput {
            plant: true,
            ..FrameInput::default()
        },
        query::player(&world).mode,
        &mut commands,
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    let planted: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::TreePlanted { tree } => Some(tree.tile),
            _ => None,
        })
        .collect();
    assert_eq!(planted, vec![TileCoord::new(7, 4)]);
}
