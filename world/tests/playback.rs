use bricklayer_core::{BondKind, BuildPass, Command, Event, OrderStrategy};
use bricklayer_world::{apply, query, Wall, World, WorldConfig};

fn play(bond: BondKind, seed: u64, strategy: OrderStrategy) -> Vec<Event> {
    let mut world = World::with_config(WorldConfig {
        strategy,
        ..WorldConfig::default()
    });
    let mut events = Vec::new();
    apply(&mut world, Command::SelectBond { bond, seed }, &mut events);
    loop {
        let before = events.len();
        apply(&mut world, Command::AdvanceBuild, &mut events);
        if events.len() == before {
            break;
        }
    }
    events
}

#[test]
fn advance_after_completion_changes_nothing() {
    let mut wall = Wall::plan(BondKind::Stretcher, &WorldConfig::default(), 0).expect("wall");
    while wall.advance() {}
    let finished = wall.progress();
    assert_eq!(finished, (wall.len(), wall.len()));
    assert!(wall.is_complete());

    for _ in 0..3 {
        assert!(!wall.advance());
        assert_eq!(wall.progress(), finished);
    }
    assert!(wall.rows().iter().flatten().all(|unit| unit.is_complete()));
}

#[test]
fn english_playback_emits_one_event_per_action() {
    let events = play(BondKind::English, 0, OrderStrategy::MinimumMovement);
    let Some(Event::WallPlanned { units, .. }) = events.first().cloned() else {
        panic!("wall was not planned: {events:?}");
    };

    let firsts = events
        .iter()
        .filter(|event| matches!(event, Event::UnitLaid { pass: BuildPass::First, .. }))
        .count();
    let seconds = events
        .iter()
        .filter(|event| matches!(event, Event::UnitLaid { pass: BuildPass::Second, .. }))
        .count();
    assert_eq!(firsts, units);
    assert!(seconds > 0);
    assert!(seconds < units);
    assert_eq!(
        events.last(),
        Some(&Event::WallCompleted {
            bond: BondKind::English,
            units,
        })
    );
}

#[test]
fn second_pass_follows_first_pass_immediately() {
    let events = play(BondKind::English, 0, OrderStrategy::ZoneSorted);
    for pair in events.windows(2) {
        if let Event::UnitLaid {
            unit,
            pass: BuildPass::Second,
        } = pair[1]
        {
            assert_eq!(
                pair[0],
                Event::UnitLaid {
                    unit,
                    pass: BuildPass::First
                }
            );
        }
    }
}

#[test]
fn unit_views_reflect_build_progress() {
    let mut world = World::new();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::SelectBond {
            bond: BondKind::Flemish,
            seed: 0,
        },
        &mut events,
    );
    for _ in 0..5 {
        apply(&mut world, Command::AdvanceBuild, &mut events);
    }

    let wall = query::wall(&world).expect("flemish wall");
    let order = query::build_order(&world).to_vec();
    let views = query::unit_views(&world);
    assert_eq!(views.len(), order.len());
    for view in &views {
        let laid = order[..5].contains(&view.coord);
        assert_eq!(view.complete, laid, "{}", view.coord);
        assert!(view.zone.is_some());
        let length = wall.unit(view.coord).map(|unit| unit.length());
        assert_eq!(Some(view.extent.right() - view.extent.left()), length);
    }
}

#[test]
fn replaying_the_same_commands_is_deterministic() {
    for bond in BondKind::ALL {
        let first = play(bond, 0x5eed, OrderStrategy::MinimumMovement);
        let second = play(bond, 0x5eed, OrderStrategy::MinimumMovement);
        assert_eq!(first, second, "{bond}");
    }
}
