use super::{tick, World};
use crate::config::SimConfig;
use crate::levels::{
    builtin_levels, Environment, Goal, LevelConfig, LevelMeta, Obstacle, ObstacleKind,
};
use crate::store::GameStore;
use crate::vec2::Vec2;

fn test_level(initial_sheep: usize, obstacles: Vec<Obstacle>) -> LevelConfig {
    LevelConfig {
        id: "test".to_string(),
        meta: LevelMeta {
            number: 0,
            title: "Test".to_string(),
        },
        environment: Environment::Field,
        goal: Goal {
            x: 800.0,
            y: 270.0,
            r: 60.0,
        },
        obstacles,
        initial_sheep,
        shepherd_start: Vec2::new(120.0, 270.0),
    }
}

fn make_world(level: &LevelConfig) -> World {
    let mut world = World::new(SimConfig::default(), GameStore::default());
    world.load_level(level);
    world
}

#[test]
fn step_without_level_is_a_noop() {
    let mut world = World::new(SimConfig::default(), GameStore::default());
    world.step(0.016);
    assert_eq!(world.tick_index(), 0);
}

#[test]
fn pause_short_circuits_the_tick() {
    let level = test_level(2, vec![]);
    let mut world = make_world(&level);
    let before: Vec<Vec2> = world.sheep.iter().map(|s| s.body.position).collect();
    world.toggle_pause();
    assert!(world.is_paused());
    world.step(0.016);
    assert_eq!(world.tick_index(), 0);
    let after: Vec<Vec2> = world.sheep.iter().map(|s| s.body.position).collect();
    assert_eq!(before, after);
    world.toggle_pause();
    assert!(!world.is_paused());
}

#[test]
fn load_level_spawns_sheep_on_the_start_grid() {
    let level = test_level(5, vec![]);
    let world = make_world(&level);
    assert_eq!(world.sheep_count(), 5);
    assert_eq!(world.alive_sheep_count(), 5);
    assert_eq!(world.shepherd.body.position, Vec2::new(120.0, 270.0));
    // 3-wide grid centered on (W/4, H/2) with a 16 px pitch.
    assert_eq!(world.sheep[0].body.position, Vec2::new(224.0, 254.0));
    assert_eq!(world.sheep[1].body.position, Vec2::new(240.0, 254.0));
    assert_eq!(world.sheep[3].body.position, Vec2::new(224.0, 270.0));
}

#[test]
fn reloading_a_level_discards_previous_agents() {
    let levels = builtin_levels();
    let mut world = make_world(&levels[1]);
    world.spawn_dog();
    world.sheep[0].lost = true;
    world.load_level(&levels[0]);
    assert_eq!(world.sheep_count(), levels[0].initial_sheep);
    assert!(world.dogs.is_empty());
    assert_eq!(world.alive_sheep_count(), levels[0].initial_sheep);
}

#[test]
fn shepherd_snaps_onto_a_reachable_target() {
    let level = test_level(0, vec![]);
    let mut world = make_world(&level);
    world.set_shepherd_target(Some(Vec2::new(130.0, 270.0)));
    // speed * dt = 12 >= 10: one tick lands exactly on the target.
    world.step(0.1);
    assert_eq!(world.shepherd.body.position, Vec2::new(130.0, 270.0));
    assert_eq!(world.shepherd.body.velocity, Vec2::zero());
    assert!(world.shepherd.body.target.is_none());
}

#[test]
fn separation_resolves_an_overlapping_pair() {
    let level = test_level(2, vec![]);
    let mut world = make_world(&level);
    world.sheep[0].body.set_position(Vec2::new(100.0, 100.0));
    world.sheep[1].body.set_position(Vec2::new(110.0, 100.0));
    // dt = 0 isolates the positional push from sheep movement.
    world.step(0.0);
    let d = world.sheep[0]
        .body
        .position
        .distance(world.sheep[1].body.position);
    // Push-out is symmetric: half the penetration to each side, ending at
    // exactly the contact distance r1 + r2 + 2.
    assert!((d - 20.0).abs() < 1e-9);
    assert_eq!(world.sheep[0].body.position.y, 100.0);
    assert_eq!(world.sheep[1].body.position.y, 100.0);
    assert!(world.sheep[0].body.position.x < 100.0);
    assert!(world.sheep[1].body.position.x > 110.0);
}

#[test]
fn separation_never_increases_overlap() {
    let level = test_level(3, vec![]);
    let mut world = make_world(&level);
    world.sheep[0].body.set_position(Vec2::new(100.0, 100.0));
    world.sheep[1].body.set_position(Vec2::new(104.0, 100.0));
    world.sheep[2].body.set_position(Vec2::new(102.0, 103.0));
    let pairwise_min = |world: &World| {
        let mut min = f64::INFINITY;
        for i in 0..world.sheep.len() {
            for j in (i + 1)..world.sheep.len() {
                min = min.min(
                    world.sheep[i]
                        .body
                        .position
                        .distance(world.sheep[j].body.position),
                );
            }
        }
        min
    };
    let before = pairwise_min(&world);
    world.step(0.0);
    assert!(pairwise_min(&world) >= before);
}

#[test]
fn sheep_keep_clear_of_the_shepherd() {
    let level = test_level(1, vec![]);
    let mut world = make_world(&level);
    world.sheep[0].body.set_position(Vec2::new(125.0, 270.0));
    world.step(0.0);
    let d = world.sheep[0]
        .body
        .position
        .distance(world.shepherd.body.position);
    // Minimum distance is sheep radius + shepherd radius + 6.
    assert!(d >= 27.0 - 1e-9);
}

#[test]
fn hole_loss_is_permanent_and_freezes_position() {
    let hole = Obstacle {
        kind: ObstacleKind::Hole,
        x: 400.0,
        y: 300.0,
        r: 25.0,
    };
    let level = test_level(1, vec![hole]);
    let mut world = make_world(&level);
    world.sheep[0].body.set_position(Vec2::new(400.0, 300.0));
    world.step(0.016);
    assert!(world.sheep[0].lost);
    assert_eq!(world.alive_sheep_count(), 0);
    let frozen = world.sheep[0].body.position;
    for _ in 0..200 {
        world.step(0.016);
    }
    assert_eq!(world.sheep[0].body.position, frozen);
    // With no alive sheep the win check never fires.
    assert_eq!(world.completions(), 0);
}

#[test]
fn hole_needs_the_center_past_the_inner_rim() {
    let hole = Obstacle {
        kind: ObstacleKind::Hole,
        x: 400.0,
        y: 300.0,
        r: 25.0,
    };
    let level = test_level(1, vec![hole]);
    let mut world = make_world(&level);
    // 24 px out: outside r - 2 = 23, so the sheep survives the check.
    world.sheep[0].body.set_position(Vec2::new(424.0, 300.0));
    world.step(0.0);
    assert!(!world.sheep[0].lost);
}

#[test]
fn stones_repel_instead_of_swallowing() {
    let stone = Obstacle {
        kind: ObstacleKind::Stone,
        x: 400.0,
        y: 300.0,
        r: 25.0,
    };
    let level = test_level(1, vec![stone]);
    let mut world = make_world(&level);
    world.sheep[0].body.set_position(Vec2::new(405.0, 300.0));
    world.step(0.016);
    assert!(!world.sheep[0].lost);
    let d = world.sheep[0]
        .body
        .position
        .distance(Vec2::new(400.0, 300.0));
    assert!(d > 5.0);
}

#[test]
fn win_resets_positions_and_restores_whistles() {
    let level = test_level(3, vec![]);
    let mut world = make_world(&level);
    assert!(world.whistle());
    assert_eq!(world.store().whistles, 2);
    world.sheep[0].body.set_position(Vec2::new(800.0, 270.0));
    world.sheep[1].body.set_position(Vec2::new(820.0, 270.0));
    world.sheep[2].body.set_position(Vec2::new(780.0, 270.0));
    world.step(0.016);
    assert_eq!(world.completions(), 1);
    assert_eq!(world.store().whistles, 3);
    assert_eq!(world.shepherd.body.position, Vec2::new(120.0, 270.0));
    assert_eq!(world.sheep[0].body.position, Vec2::new(224.0, 254.0));
    assert_eq!(world.sheep[1].body.position, Vec2::new(240.0, 254.0));
    assert_eq!(world.sheep[2].body.position, Vec2::new(256.0, 254.0));
    for sheep in &world.sheep {
        assert_eq!(sheep.current_speed, 0.0);
        assert_eq!(sheep.body.velocity, Vec2::zero());
    }
}

#[test]
fn win_requires_every_alive_sheep_inside() {
    let level = test_level(2, vec![]);
    let mut world = make_world(&level);
    world.sheep[0].body.set_position(Vec2::new(800.0, 270.0));
    world.sheep[1].body.set_position(Vec2::new(500.0, 100.0));
    world.step(0.016);
    assert_eq!(world.completions(), 0);
}

#[test]
fn lost_sheep_are_excluded_from_the_win_check() {
    let hole = Obstacle {
        kind: ObstacleKind::Hole,
        x: 200.0,
        y: 100.0,
        r: 25.0,
    };
    let level = test_level(2, vec![hole]);
    let mut world = make_world(&level);
    world.sheep[0].body.set_position(Vec2::new(200.0, 100.0));
    world.step(0.016);
    assert!(world.sheep[0].lost);
    // Only the remaining alive sheep has to reach the goal.
    world.sheep[1].body.set_position(Vec2::new(800.0, 270.0));
    world.step(0.016);
    assert_eq!(world.completions(), 1);
}

#[test]
fn empty_level_never_completes() {
    let level = test_level(0, vec![]);
    let mut world = make_world(&level);
    for _ in 0..50 {
        world.step(0.016);
    }
    assert_eq!(world.completions(), 0);
}

#[test]
fn reset_positions_is_idempotent() {
    let level = test_level(4, vec![]);
    let mut world = make_world(&level);
    world.set_shepherd_target(Some(Vec2::new(600.0, 400.0)));
    for _ in 0..300 {
        world.step(0.016);
    }
    world.reset_positions();
    let snapshot: Vec<(Vec2, Vec2, f64)> = world
        .sheep
        .iter()
        .map(|s| (s.body.position, s.body.velocity, s.current_speed))
        .collect();
    let shepherd_snapshot = (world.shepherd.body.position, world.shepherd.body.velocity);
    world.reset_positions();
    let again: Vec<(Vec2, Vec2, f64)> = world
        .sheep
        .iter()
        .map(|s| (s.body.position, s.body.velocity, s.current_speed))
        .collect();
    assert_eq!(snapshot, again);
    assert_eq!(
        shepherd_snapshot,
        (world.shepherd.body.position, world.shepherd.body.velocity)
    );
    assert!(world.shepherd.body.target.is_none());
}

#[test]
fn whistle_spends_stock_and_boosts_attention() {
    let level = test_level(3, vec![]);
    let mut world = make_world(&level);
    // Out of the shepherd's influence, so the boost is what the whistle did.
    world.sheep[0].body.set_position(Vec2::new(700.0, 100.0));
    world.sheep[1].body.set_position(Vec2::new(700.0, 200.0));
    world.sheep[2].body.set_position(Vec2::new(700.0, 300.0));
    assert!(world.whistle());
    assert_eq!(world.store().whistles, 2);
    // First impulse lands once the 0.5 s cadence elapses.
    world.step(0.5);
    for sheep in &world.sheep {
        assert_eq!(sheep.attention(), 10);
        assert!(sheep.current_speed > 0.0);
    }
}

#[test]
fn whistle_fails_with_empty_stock() {
    let level = test_level(1, vec![]);
    let mut world = make_world(&level);
    world.store_mut().whistles = 0;
    assert!(!world.whistle());
}

#[test]
fn dog_pressure_nudges_sheep_toward_the_shepherd() {
    let level = test_level(1, vec![]);
    let mut world = make_world(&level);
    world.sheep[0].body.set_position(Vec2::new(500.0, 100.0));
    world.spawn_dog();
    world.dogs[0].body.set_position(Vec2::new(510.0, 100.0));
    world.step(0.0);
    // One nearby dog adds one accel * 0.3 speed impulse.
    assert!((world.sheep[0].current_speed - 6.0).abs() < 1e-9);
}

#[test]
fn distant_dogs_exert_no_pressure() {
    let level = test_level(1, vec![]);
    let mut world = make_world(&level);
    world.sheep[0].body.set_position(Vec2::new(500.0, 100.0));
    world.spawn_dog();
    world.dogs[0].body.set_position(Vec2::new(700.0, 400.0));
    world.step(0.0);
    assert_eq!(world.sheep[0].current_speed, 0.0);
}

#[test]
fn spawn_dog_places_it_next_to_the_shepherd() {
    let level = test_level(0, vec![]);
    let mut world = make_world(&level);
    world.spawn_dog();
    assert_eq!(world.dogs.len(), 1);
    assert_eq!(world.dogs[0].body.position, Vec2::new(140.0, 290.0));
}

#[test]
fn dog_selection_is_exclusive() {
    let level = test_level(0, vec![]);
    let mut world = make_world(&level);
    world.spawn_dog();
    world.spawn_dog();
    world.select_dog(Some(1));
    assert_eq!(world.selected_dog(), Some(1));
    world.select_dog(Some(0));
    assert_eq!(world.selected_dog(), Some(0));
    world.select_dog(None);
    assert_eq!(world.selected_dog(), None);
}

#[test]
fn sheep_stay_inside_world_bounds() {
    let level = test_level(6, vec![]);
    let mut world = make_world(&level);
    // Park the shepherd near the left edge to pull the flock against it.
    world.set_shepherd_target(Some(Vec2::new(20.0, 270.0)));
    for _ in 0..2_000 {
        world.step(0.016);
        for sheep in world.sheep.iter().filter(|s| !s.lost) {
            // Separation push-out of a crowded pair runs after that pair's
            // own clamp, so positions may transiently overshoot the margin
            // by a penetration depth; they must never leave the world.
            assert!(sheep.body.position.x.is_finite() && sheep.body.position.y.is_finite());
            assert!((-40.0..=1000.0).contains(&sheep.body.position.x));
            assert!((-40.0..=580.0).contains(&sheep.body.position.y));
        }
    }
    // The last sheep in index order is clamped after every push that can
    // reach it, so the strict margin holds for it unconditionally.
    let last = world.sheep.last().unwrap();
    assert!(last.body.position.x >= last.body.radius + 2.0 - 1e-9);
    assert!(last.body.position.y >= last.body.radius + 2.0 - 1e-9);
    assert!(last.body.position.x <= 960.0 - last.body.radius - 2.0 + 1e-9);
    assert!(last.body.position.y <= 540.0 - last.body.radius - 2.0 + 1e-9);
}

#[test]
fn left_edge_pin_cancels_outward_drag() {
    use crate::sheep::Sheep;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    let cfg = SimConfig::default();
    let mut rng = ChaCha12Rng::seed_from_u64(1);

    // Shepherd far enough left of a sheep sitting at the boundary: the
    // leftward drag is cancelled and the sheep re-clamped to the margin.
    let mut sheep = Sheep::new(&cfg.sheep, &mut rng);
    sheep.body.set_position(Vec2::new(10.0, 270.0));
    sheep.body.velocity = Vec2::new(-30.0, 5.0);
    tick::pin_left_edge(&mut sheep, 3.0);
    assert_eq!(sheep.body.position.x, 11.0);
    assert_eq!(sheep.body.velocity.x, 0.0);
    assert_eq!(sheep.body.velocity.y, 5.0);

    // Shepherd to the right: the pin must not fire.
    let mut sheep = Sheep::new(&cfg.sheep, &mut rng);
    sheep.body.set_position(Vec2::new(10.0, 270.0));
    sheep.body.velocity = Vec2::new(-30.0, 0.0);
    tick::pin_left_edge(&mut sheep, 120.0);
    assert_eq!(sheep.body.position.x, 10.0);
    assert_eq!(sheep.body.velocity.x, -30.0);

    // Sheep clear of the boundary: no re-clamp either.
    let mut sheep = Sheep::new(&cfg.sheep, &mut rng);
    sheep.body.set_position(Vec2::new(40.0, 270.0));
    sheep.body.velocity = Vec2::new(-30.0, 0.0);
    tick::pin_left_edge(&mut sheep, 3.0);
    assert_eq!(sheep.body.position.x, 40.0);
    assert_eq!(sheep.body.velocity.x, -30.0);
}

#[test]
fn advance_derives_and_clamps_the_delta() {
    let level = test_level(0, vec![]);
    let mut world = make_world(&level);
    world.set_shepherd_target(Some(Vec2::new(900.0, 270.0)));
    // First call only establishes the baseline timestamp.
    world.advance(100.0);
    assert_eq!(world.shepherd.body.position, Vec2::new(120.0, 270.0));
    // A ten-second gap is simulated as a single max_dt tick: the shepherd
    // stalls instead of teleporting.
    world.advance(110.0);
    let moved = world.shepherd.body.position.x - 120.0;
    assert!((moved - 120.0 * 0.033).abs() < 1e-9);
}

#[test]
fn advance_ignores_non_monotonic_timestamps() {
    let level = test_level(0, vec![]);
    let mut world = make_world(&level);
    world.set_shepherd_target(Some(Vec2::new(900.0, 270.0)));
    world.advance(100.0);
    world.advance(99.0);
    assert_eq!(world.shepherd.body.position, Vec2::new(120.0, 270.0));
}

#[test]
fn paused_advance_still_tracks_time() {
    let level = test_level(1, vec![]);
    let mut world = make_world(&level);
    world.advance(100.0);
    world.toggle_pause();
    world.advance(200.0);
    world.toggle_pause();
    // Unpausing must not replay the paused gap as one big delta.
    world.advance(200.016);
    assert_eq!(world.tick_index(), 2);
}

#[test]
fn set_all_sheep_speed_zeroes_velocity() {
    let level = test_level(3, vec![]);
    let mut world = make_world(&level);
    for _ in 0..100 {
        world.step(0.016);
    }
    world.set_all_sheep_speed(0.0);
    for sheep in &world.sheep {
        assert_eq!(sheep.current_speed, 0.0);
        assert_eq!(sheep.body.velocity, Vec2::zero());
    }
}

#[test]
fn identical_seeds_reproduce_identical_runs() {
    let level = test_level(5, vec![]);
    let mut a = make_world(&level);
    let mut b = make_world(&level);
    a.set_shepherd_target(Some(Vec2::new(700.0, 300.0)));
    b.set_shepherd_target(Some(Vec2::new(700.0, 300.0)));
    for _ in 0..500 {
        a.step(0.016);
        b.step(0.016);
    }
    for (sa, sb) in a.sheep.iter().zip(b.sheep.iter()) {
        assert_eq!(sa.body.position, sb.body.position);
        assert_eq!(sa.attention(), sb.attention());
        assert_eq!(sa.current_speed, sb.current_speed);
    }
}

#[test]
fn headless_run_samples_on_cadence() {
    let level = test_level(3, vec![]);
    let mut world = make_world(&level);
    let summary = world
        .try_run_headless(10, 0.016, 5)
        .expect("valid headless run");
    assert_eq!(summary.schema_version, 1);
    assert_eq!(summary.steps, 10);
    assert_eq!(summary.samples.len(), 2);
    assert_eq!(summary.samples[0].tick, 5);
    assert_eq!(summary.samples[1].tick, 10);
    assert_eq!(summary.samples[1].sheep_total, 3);
}

#[test]
fn headless_run_rejects_invalid_arguments() {
    use crate::world::ExperimentError;
    let level = test_level(1, vec![]);
    let mut world = make_world(&level);
    assert_eq!(
        world.try_run_headless(10, 0.016, 0),
        Err(ExperimentError::InvalidSampleEvery)
    );
    assert_eq!(
        world.try_run_headless(10, f64::NAN, 1),
        Err(ExperimentError::InvalidDt)
    );
    assert!(matches!(
        world.try_run_headless(World::MAX_HEADLESS_STEPS + 1, 0.016, 1),
        Err(ExperimentError::TooManySteps { .. })
    ));
    assert!(matches!(
        world.try_run_headless(World::MAX_HEADLESS_STEPS, 0.016, 1),
        Err(ExperimentError::TooManySamples { .. })
    ));
}

#[test]
fn try_new_rejects_invalid_config() {
    use crate::config::SimConfigError;
    let cfg = SimConfig {
        world_width: -1.0,
        ..SimConfig::default()
    };
    assert!(matches!(
        World::try_new(cfg, GameStore::default()),
        Err(SimConfigError::InvalidWorldSize)
    ));
}
