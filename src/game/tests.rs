use std::thread;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::error::{MapError, MoveError, PlantError};
use crate::game::entities::{EntityId, Registry, blast_cells};
use crate::game::grid::map::parse_map;
use crate::game::grid::{Grid, load_map};
use crate::game::health::Health;
use crate::game::state::{World, WorldState};
use crate::game::systems::{
    Behavior, EnemyAction, Fuse, choose_behavior, evaluate, pursuit_steps, render_frame,
};
use crate::game::types::{Direction, Outcome, Position, Role, Tile};

const FUSE: Duration = Duration::from_millis(3000);
const LIFETIME: Duration = Duration::from_millis(500);

fn state_from(text: &str) -> WorldState {
    WorldState::from_map(parse_map(text).expect("test map should parse"))
}

fn world_from(text: &str) -> World {
    World::new(parse_map(text).expect("test map should parse"), GameConfig::default())
}

fn pos(x: usize, y: usize) -> Position {
    Position::new(x, y)
}

fn enemy_at(state: &WorldState, at: Position) -> EntityId {
    state
        .registry()
        .enemies()
        .find(|e| e.pos == at)
        .map(|e| e.id)
        .expect("no enemy there")
}

fn step(state: &mut WorldState, id: EntityId, direction: Direction) -> Result<Position, MoveError> {
    let (dx, dy) = direction.delta();
    state.move_entity(id, dx, dy).map(|report| report.to)
}

// --- map loading -----------------------------------------------------------

#[test]
fn test_parse_map_symbols_and_spawns() {
    let map = parse_map("▤▤▤▤\n▤☺♣▤\n▤♥☠▤\n▤▤▤▤\n").unwrap();
    assert_eq!(map.grid.width(), 4);
    assert_eq!(map.grid.height(), 4);
    assert_eq!(map.player, pos(1, 1));
    assert_eq!(map.enemies, vec![pos(2, 2)]);
    assert_eq!(map.grid.get(pos(0, 0)), Some(Tile::Wall));
    assert_eq!(map.grid.get(pos(2, 1)), Some(Tile::Vegetation));
    assert_eq!(map.grid.get(pos(1, 2)), Some(Tile::Pickup));

    // Spawn cells are empty terrain under their entity.
    let state = WorldState::from_map(map);
    assert_eq!(state.terrain_at(pos(1, 1)), Some(Tile::Empty));
    assert_eq!(state.terrain_at(pos(2, 2)), Some(Tile::Empty));
    assert_eq!(state.pickups_left(), 1);
}

#[test]
fn test_parse_map_ascii_aliases_and_padding() {
    let map = parse_map("#P\n%+E..\nx").unwrap();
    assert_eq!(map.grid.width(), 5);
    assert_eq!(map.grid.get(pos(0, 0)), Some(Tile::Wall));
    assert_eq!(map.grid.get(pos(4, 0)), Some(Tile::Empty));
    assert_eq!(map.grid.get(pos(0, 2)), Some(Tile::Empty));
    assert_eq!(map.enemies, vec![pos(2, 1)]);
}

#[test]
fn test_parse_map_errors() {
    assert!(matches!(parse_map(""), Err(MapError::Empty)));
    assert!(matches!(parse_map("\n\n"), Err(MapError::Empty)));
    assert!(matches!(parse_map("..E.."), Err(MapError::NoPlayer)));
    assert!(matches!(parse_map("P..P"), Err(MapError::MultiplePlayers(p)) if p == pos(3, 0)));
}

#[test]
fn test_load_missing_map_is_fatal() {
    let err = load_map("/definitely/not/here/mapa.txt").unwrap_err();
    assert!(matches!(err, MapError::Read { .. }));
}

// --- registry ----------------------------------------------------------------

#[test]
fn test_removed_id_never_aliases_new_entity() {
    let mut registry = Registry::new();
    let player = registry.insert(Role::Player, pos(0, 0), Tile::Empty);
    let enemy = registry.insert(Role::Enemy, pos(1, 0), Tile::Empty);
    assert!(registry.remove(enemy).is_some());

    let newcomer = registry.insert(Role::Enemy, pos(2, 0), Tile::Empty);
    assert_eq!(format!("{enemy}"), "#1v0");
    assert_eq!(format!("{newcomer}"), "#1v1");
    assert_ne!(newcomer, enemy);
    assert!(registry.get(enemy).is_none());
    assert!(registry.remove(enemy).is_none());
    let ids: Vec<EntityId> = registry.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![player, newcomer]);
}

// --- movement ----------------------------------------------------------------

#[test]
fn test_memo_carries_over_multi_step_moves() {
    let mut state = state_from("P♣♣..");
    let player = state.player_id();
    let original = state.grid().clone();

    assert_eq!(step(&mut state, player, Direction::Right), Ok(pos(1, 0)));
    assert_eq!(state.grid().get(pos(0, 0)), Some(Tile::Empty));
    assert_eq!(state.registry().get(player).unwrap().memo, Tile::Vegetation);

    assert_eq!(step(&mut state, player, Direction::Right), Ok(pos(2, 0)));
    assert_eq!(state.grid().get(pos(1, 0)), Some(Tile::Vegetation));
    assert_eq!(state.registry().get(player).unwrap().memo, Tile::Vegetation);

    assert_eq!(step(&mut state, player, Direction::Right), Ok(pos(3, 0)));
    assert_eq!(state.grid().get(pos(2, 0)), Some(Tile::Vegetation));
    assert_eq!(state.registry().get(player).unwrap().memo, Tile::Empty);

    for _ in 0..3 {
        step(&mut state, player, Direction::Left).unwrap();
    }
    assert_eq!(state.grid(), &original);
}

#[test]
fn test_round_trip_restores_terrain() {
    let mut state = state_from("..\nP♣\n..");
    let player = state.player_id();
    let before = state.grid().clone();

    step(&mut state, player, Direction::Right).unwrap();
    assert_eq!(state.grid().get(pos(1, 1)), Some(Tile::Player));
    step(&mut state, player, Direction::Left).unwrap();

    assert_eq!(state.grid(), &before);
    assert_eq!(state.terrain_at(pos(1, 1)), Some(Tile::Vegetation));
}

#[test]
fn test_move_rejections() {
    let mut state = state_from("P▤\nEE");
    let player = state.player_id();
    let left_enemy = enemy_at(&state, pos(0, 1));

    assert_eq!(step(&mut state, player, Direction::Up), Err(MoveError::OutOfBounds));
    assert_eq!(step(&mut state, player, Direction::Left), Err(MoveError::OutOfBounds));
    assert_eq!(step(&mut state, player, Direction::Right), Err(MoveError::Blocked));
    assert_eq!(step(&mut state, left_enemy, Direction::Right), Err(MoveError::Occupied));
    assert_eq!(state.position_of(player), Some(pos(0, 0)));
    assert_eq!(state.position_of(left_enemy), Some(pos(0, 1)));
}

#[test]
fn test_player_and_enemy_share_cells_without_ghosts() {
    let mut state = state_from("PE.");
    let player = state.player_id();
    let enemy = enemy_at(&state, pos(1, 0));

    // Player walks onto the enemy.
    assert_eq!(step(&mut state, player, Direction::Right), Ok(pos(1, 0)));
    assert_eq!(state.grid().get(pos(0, 0)), Some(Tile::Empty));
    assert_eq!(state.terrain_at(pos(1, 0)), Some(Tile::Empty));

    // Enemy leaves; the player is still drawn there.
    assert_eq!(step(&mut state, enemy, Direction::Right), Ok(pos(2, 0)));
    assert_eq!(state.grid().get(pos(1, 0)), Some(Tile::Player));

    // Player leaves; nothing of either is left behind.
    assert_eq!(step(&mut state, player, Direction::Left), Ok(pos(0, 0)));
    assert_eq!(state.grid().get(pos(1, 0)), Some(Tile::Empty));
    assert_eq!(state.grid().count(Tile::Enemy), 1);
    assert_eq!(state.grid().count(Tile::Player), 1);
}

#[test]
fn test_player_consumes_pickup() {
    let mut state = state_from("P♥.");
    let player = state.player_id();

    let report = state.move_entity(player, 1, 0).unwrap();
    assert!(report.picked_up);
    assert_eq!(state.pickups_left(), 0);

    step(&mut state, player, Direction::Right).unwrap();
    assert_eq!(state.grid().get(pos(1, 0)), Some(Tile::Empty));
}

#[test]
fn test_enemy_walks_over_pickup_without_eating_it() {
    let mut state = state_from("P..\nE♥.");
    let enemy = enemy_at(&state, pos(0, 1));

    step(&mut state, enemy, Direction::Right).unwrap();
    step(&mut state, enemy, Direction::Right).unwrap();
    assert_eq!(state.grid().get(pos(1, 1)), Some(Tile::Pickup));
    assert_eq!(state.pickups_left(), 1);
}

#[test]
fn test_pickup_under_enemy_is_consumed_once() {
    let mut state = state_from("P♥E");
    let player = state.player_id();
    let enemy = enemy_at(&state, pos(2, 0));

    step(&mut state, enemy, Direction::Left).unwrap();
    let report = state.move_entity(player, 1, 0).unwrap();
    assert!(report.picked_up);

    step(&mut state, enemy, Direction::Right).unwrap();
    assert_eq!(state.grid().get(pos(1, 0)), Some(Tile::Player));
    step(&mut state, player, Direction::Left).unwrap();
    assert_eq!(state.grid().get(pos(1, 0)), Some(Tile::Empty));
    assert_eq!(state.grid().count(Tile::Pickup), 0);
}

// --- bombs and explosions ------------------------------------------------------

#[test]
fn test_blast_cells_follow_manhattan_radius() {
    let grid = Grid::filled(7, 7, Tile::Empty);
    let cells = blast_cells(&grid, pos(3, 3), 2, |p| grid.get(p));
    assert_eq!(cells.len(), 13);
    assert!(cells.iter().all(|c| c.manhattan(pos(3, 3)) <= 2));

    // Near a corner the area is clipped to the grid.
    let corner = blast_cells(&grid, pos(0, 0), 2, |p| grid.get(p));
    assert_eq!(corner.len(), 6);
}

#[test]
fn test_walls_only_shield_themselves() {
    let state = state_from("P▤.\n...");
    let cells = blast_cells(state.grid(), pos(0, 0), 2, |p| state.terrain_at(p));
    assert!(!cells.contains(&pos(1, 0)));
    assert!(cells.contains(&pos(2, 0)));
    assert!(cells.contains(&pos(0, 0)));
}

#[test]
fn test_plant_rejections() {
    let t0 = Instant::now();
    let mut state = state_from("P..");
    let player = state.player_id();

    let bomb = state.plant_bomb(player, t0, false).unwrap();
    assert_eq!(bomb.pos, pos(0, 0));
    assert!(bomb.armed);
    assert!(matches!(
        state.plant_bomb(player, t0, false),
        Err(PlantError::CellTaken(p)) if p == pos(0, 0)
    ));

    step(&mut state, player, Direction::Right).unwrap();
    assert_eq!(state.plant_bomb(player, t0, true).map(|b| b.pos), Err(PlantError::BombOutstanding));
    assert_eq!(state.status(), "Wait for your bomb to go off");
    assert!(state.plant_bomb(player, t0, false).is_ok());
    assert_eq!(state.bombs().len(), 2);
}

#[test]
fn test_bomb_detonates_once_at_fuse() {
    let t0 = Instant::now();
    let mut state = state_from("P.E");
    let player = state.player_id();
    let bomb = state.plant_bomb(player, t0, true).unwrap();

    match state.detonate(bomb.id, t0 + Duration::from_millis(2900), FUSE, 2) {
        Fuse::Pending(rest) => assert_eq!(rest, Duration::from_millis(100)),
        other => panic!("expected pending, got {other:?}"),
    }
    let Fuse::Blasted(report) = state.detonate(bomb.id, t0 + FUSE, FUSE, 2) else {
        panic!("bomb should go off at the fuse");
    };
    assert_eq!(report.killed.len(), 1);
    assert!(report.player_hit);
    assert!(state.bombs().is_empty());
    assert_eq!(state.detonate(bomb.id, t0 + FUSE * 2, FUSE, 2), Fuse::Gone);

    // The planter may plant again once the bomb is gone.
    assert!(state.plant_bomb(player, t0 + FUSE, true).is_ok());
}

#[test]
fn test_blast_removes_enemy_and_its_log_in_lockstep() {
    let t0 = Instant::now();
    let mut state = state_from("E.......\n........\n...P.E..\n........\n.......E");
    let player = state.player_id();
    let (a, b, c) = (enemy_at(&state, pos(0, 0)), enemy_at(&state, pos(5, 2)), enemy_at(&state, pos(7, 4)));
    state.set_log(a, "a".into());
    state.set_log(b, "b".into());
    state.set_log(c, "c".into());

    let bomb = state.plant_bomb(player, t0, true).unwrap();
    for _ in 0..3 {
        step(&mut state, player, Direction::Left).unwrap();
    }

    let Fuse::Blasted(report) = state.detonate(bomb.id, t0 + FUSE, FUSE, 2) else {
        panic!("bomb should go off");
    };
    assert_eq!(report.killed, vec![b]);
    assert!(!report.player_hit);
    assert_eq!(state.enemy_ids(), vec![a, c]);
    assert_eq!(state.enemy_logs(), vec!["a".to_string(), "c".to_string()]);
    assert_eq!(state.grid().get(pos(5, 2)), Some(Tile::Empty));
    assert_eq!(state.move_entity(b, 1, 0), Err(MoveError::Stale));
}

#[test]
fn test_blast_kills_every_enemy_in_range_once() {
    let t0 = Instant::now();
    let mut state = state_from("E.E.P.E.E");
    let player = state.player_id();
    let bomb = state.plant_bomb(player, t0, true).unwrap();

    let Fuse::Blasted(report) = state.detonate(bomb.id, t0 + FUSE, FUSE, 2) else {
        panic!("bomb should go off");
    };
    let mut killed = report.killed.clone();
    killed.dedup();
    assert_eq!(killed.len(), 2);
    assert_eq!(state.enemy_count(), 2);
    assert_eq!(state.registry().enemies().map(|e| e.pos).collect::<Vec<_>>(), vec![pos(0, 0), pos(8, 0)]);
}

#[test]
fn test_explosions_expire_after_lifetime() {
    let t0 = Instant::now();
    let mut state = state_from("P....");
    let player = state.player_id();
    let bomb = state.plant_bomb(player, t0, true).unwrap();
    let boom = t0 + FUSE;
    state.detonate(bomb.id, boom, FUSE, 2);
    assert_eq!(state.explosions().len(), 3);
    assert!(state.explosions().iter().all(|e| e.armed));

    assert_eq!(state.sweep_explosions(boom + Duration::from_millis(499), LIFETIME), 0);
    assert_eq!(state.sweep_explosions(boom + LIFETIME, LIFETIME), 3);
    assert!(state.explosions().is_empty());
}

// --- enemies -------------------------------------------------------------------

#[test]
fn test_enemy_pursues_player_in_range() {
    let mut state = state_from("P....\n.....\n.....\n.....\n....E");
    let enemy = enemy_at(&state, pos(4, 4));
    let player_pos = pos(0, 0);
    let before = pos(4, 4).manhattan(player_pos);
    let mut rng = StdRng::seed_from_u64(7);

    let tick = state.enemy_tick(enemy, Some(player_pos), 10, &mut rng).unwrap();
    assert!(matches!(tick.action, EnemyAction::Pursued { moved: true, .. }));
    assert!(tick.pos.manhattan(player_pos) < before);
    assert_eq!(tick.pos, pos(3, 3));
    assert!(!tick.contact);
    assert!(state.enemy_logs()[0].contains("chasing"));
}

#[test]
fn test_enemy_wanders_without_sample_or_out_of_range() {
    assert_eq!(choose_behavior(pos(0, 0), None, 10), Behavior::Wander);
    assert_eq!(choose_behavior(pos(0, 0), Some(pos(6, 5)), 10), Behavior::Wander);
    assert_eq!(choose_behavior(pos(0, 0), Some(pos(5, 5)), 10), Behavior::Pursue(pos(5, 5)));

    let mut state = state_from("...\n.E.\n..P");
    let enemy = enemy_at(&state, pos(1, 1));
    let mut rng = StdRng::seed_from_u64(42);
    let tick = state.enemy_tick(enemy, None, 10, &mut rng).unwrap();
    assert!(matches!(tick.action, EnemyAction::Wandered { moved: true, .. }));
    assert_eq!(tick.pos.manhattan(pos(1, 1)), 1);
}

#[test]
fn test_pursuit_steps_move_both_axes() {
    assert_eq!(pursuit_steps(pos(4, 4), pos(0, 0)), (-1, -1));
    assert_eq!(pursuit_steps(pos(2, 0), pos(2, 5)), (0, 1));
    assert_eq!(pursuit_steps(pos(2, 2), pos(2, 2)), (0, 0));
}

#[test]
fn test_enemy_contact_when_reaching_player() {
    let mut state = state_from("PE");
    let enemy = enemy_at(&state, pos(1, 0));
    let mut rng = StdRng::seed_from_u64(1);

    let tick = state.enemy_tick(enemy, Some(pos(0, 0)), 10, &mut rng).unwrap();
    assert!(tick.contact);
    assert_eq!(tick.pos, pos(0, 0));
    assert!(state.enemy_logs()[0].contains("attacking"));
}

#[test]
fn test_removed_enemy_tick_is_stale() {
    let mut state = state_from("P.E");
    let enemy = enemy_at(&state, pos(2, 0));
    state.remove_entity(enemy).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(state.enemy_tick(enemy, Some(pos(0, 0)), 10, &mut rng), Err(MoveError::Stale));
    assert_eq!(state.grid().get(pos(2, 0)), Some(Tile::Empty));
}

// --- health and outcome --------------------------------------------------------

#[test]
fn test_health_clamps() {
    let mut health = Health::full(3);
    assert_eq!(health.apply(1), 3);
    assert_eq!(health.apply(-2), 1);
    assert_eq!(health.apply(-5), 0);
    assert_eq!(health.apply(i32::MIN), 0);
    assert_eq!(health.apply(2), 2);
}

#[test]
fn test_evaluate_rules() {
    assert_eq!(evaluate(2, 3), None);
    assert_eq!(evaluate(0, 3), Some(Outcome::Win));
    assert_eq!(evaluate(2, 0), Some(Outcome::Loss));
    assert_eq!(evaluate(0, 0), Some(Outcome::Loss));
}

#[test]
fn test_loss_latch_survives_healing() {
    let world = world_from("P.E");
    world.store_health(1);
    assert_eq!(world.settle(), None);

    world.store_health(0);
    assert_eq!(world.settle(), Some(Outcome::Loss));
    world.store_health(3);
    assert_eq!(world.settle(), None);
    assert_eq!(world.outcome(), Some(Outcome::Loss));
}

#[test]
fn test_win_latches_when_last_enemy_dies() {
    let world = world_from("P.E..");
    let t0 = Instant::now();
    let bomb = world.plant_bomb(world.player_id(), t0).unwrap();
    assert!(matches!(world.detonate(bomb.id, t0 + FUSE), Fuse::Blasted(_)));

    assert_eq!(world.settle(), Some(Outcome::Win));
    world.store_health(0);
    assert_eq!(world.settle(), None);
    assert_eq!(world.outcome(), Some(Outcome::Win));
    assert!(matches!(world.plant_bomb(world.player_id(), t0), Err(PlantError::GameOver)));
}

#[test]
fn test_blast_on_player_counts_before_health_lands() {
    let config = GameConfig { max_health: 1, ..GameConfig::default() };
    let world = World::new(parse_map("P.E").unwrap(), config);
    let t0 = Instant::now();
    let bomb = world.plant_bomb(world.player_id(), t0).unwrap();
    let Fuse::Blasted(report) = world.detonate(bomb.id, t0 + FUSE) else {
        panic!("bomb should go off");
    };
    assert!(report.player_hit);
    assert_eq!(world.gate().enemy_count(), 0);

    // The session settles before the keeper has stored the damage.
    assert_eq!(world.health(), 1);
    assert_eq!(world.settle(), Some(Outcome::Loss));
    world.commit_health(0, 1);
    assert_eq!(world.settle(), None);
    assert_eq!(world.outcome(), Some(Outcome::Loss));
}

#[test]
fn test_landed_blast_is_no_longer_pending() {
    let config = GameConfig { max_health: 2, ..GameConfig::default() };
    let world = World::new(parse_map("P.E").unwrap(), config);
    let t0 = Instant::now();
    let bomb = world.plant_bomb(world.player_id(), t0).unwrap();
    assert!(matches!(world.detonate(bomb.id, t0 + FUSE), Fuse::Blasted(_)));

    world.commit_health(1, 1);
    assert_eq!(world.settle(), Some(Outcome::Win));
    assert_eq!(world.health(), 1);
}

#[test]
fn test_player_position_is_published_lock_free() {
    let world = world_from("P..\n...");
    assert_eq!(world.player_position(), pos(0, 0));
    world.move_player(Direction::Down).unwrap();
    world.move_player(Direction::Right).unwrap();
    assert_eq!(world.player_position(), pos(1, 1));
    assert!(world.move_player(Direction::Down).is_err());
    assert_eq!(world.player_position(), pos(1, 1));
}

#[test]
fn test_facing_follows_attempted_moves() {
    let world = world_from("..▤\n.PE\n...");
    assert_eq!(world.gate().facing(), Direction::Right);
    // An enemy in front hides the indicator.
    assert_eq!(world.gate().facing_cell(), None);

    world.move_player(Direction::Up).unwrap();
    assert_eq!(world.gate().facing_cell(), None);

    // A refused move still turns the player.
    assert!(world.move_player(Direction::Right).is_err());
    assert_eq!(world.player_position(), pos(1, 0));
    assert_eq!(world.gate().facing(), Direction::Right);
    assert_eq!(world.gate().facing_cell(), None);

    assert!(world.move_player(Direction::Left).is_ok());
    assert_eq!(world.gate().facing_cell(), None);
    world.move_player(Direction::Down).unwrap();
    assert_eq!(world.gate().facing_cell(), Some(pos(0, 2)));
    assert_eq!(world.snapshot().indicator, Some(pos(0, 2)));
}

#[test]
fn test_interact_reports_the_player_cell() {
    let world = world_from(".P.\n..E");
    assert_eq!(world.interact(), pos(1, 0));
    assert_eq!(world.gate().status(), "Interacting at (1, 0)");
}

#[test]
fn test_snapshot_and_render() {
    let world = world_from("P♥E");
    world.set_status("hello");
    let snapshot = world.snapshot();
    assert_eq!(snapshot.enemy_count(), 1);
    assert_eq!(snapshot.health, 3);
    assert_eq!(snapshot.enemy_logs.len(), 1);
    assert!(snapshot.outcome.is_none());

    let mut out = Vec::new();
    render_frame(&mut out, &snapshot).unwrap();
    let frame = String::from_utf8_lossy(&out);
    assert!(frame.contains('☺'));
    assert!(frame.contains('☠'));
    assert!(frame.contains("Enemy 1:"));
    assert!(frame.contains("hello"));
    assert!(frame.contains("(3/3)"));
}

// --- concurrency ---------------------------------------------------------------

const STRESS_MAP: &str = "E.....▤.....E\n..♣......♥...\n...▤..P..▤...\nE....♣.......\n......▤....E.\n.♥.........E.";

fn assert_consistent(state: &WorldState, walls: usize) {
    let grid = state.grid();
    assert_eq!(grid.count(Tile::Wall), walls);

    let mut occupied: Vec<Position> = Vec::new();
    for entity in state.registry().iter() {
        assert!(grid.in_bounds(entity.pos));
        assert!(!entity.memo.is_sprite());
        assert_ne!(state.terrain_at(entity.pos), Some(Tile::Wall));
        assert!(grid.get(entity.pos).is_some_and(Tile::is_sprite));
        if !occupied.contains(&entity.pos) {
            occupied.push(entity.pos);
        }
    }
    // No sprite is left on a cell nobody stands on.
    assert_eq!(grid.count(Tile::Player) + grid.count(Tile::Enemy), occupied.len());

    // The player sprite shows unless an enemy shares its cell and was drawn last.
    let player = state.player_position().unwrap();
    assert!(grid.count(Tile::Player) <= 1);
    if grid.get(player) != Some(Tile::Player) {
        assert!(state.registry().at(player, None).any(|e| e.role == Role::Enemy));
    }

    let enemies: Vec<Position> = state.registry().enemies().map(|e| e.pos).collect();
    for (i, cell) in enemies.iter().enumerate() {
        assert!(!enemies[i + 1..].contains(cell), "two enemies on {cell}");
    }
    assert_eq!(state.enemy_logs().len(), state.enemy_count());
}

#[test]
fn test_concurrent_agents_keep_the_world_consistent() {
    let world = world_from(STRESS_MAP);
    let walls = world.gate().grid().count(Tile::Wall);
    let enemies = world.enemy_ids();
    let player = world.player_id();
    let fuse = world.config().bomb_fuse();
    let t0 = Instant::now();

    thread::scope(|scope| {
        for (worker, chunk) in enemies.chunks(2).enumerate() {
            let world = &world;
            scope.spawn(move || {
                let mut rng = StdRng::seed_from_u64(worker as u64);
                for _ in 0..300 {
                    for &id in chunk {
                        // Enemies removed by a blast answer with an error.
                        let _ = world.enemy_tick(id, Some(world.player_position()), &mut rng);
                    }
                }
            });
        }

        let world = &world;
        let enemies = &enemies;
        scope.spawn(move || {
            for i in 0..300usize {
                let _ = world.move_player(Direction::ALL[(i * 7 / 3) % 4]);
                if i % 40 == 0 {
                    if let Ok(bomb) = world.plant_bomb(player, t0) {
                        world.detonate(bomb.id, t0 + fuse);
                    }
                }
                if i == 150 {
                    let _ = world.gate().remove_entity(enemies[0]);
                }
            }
        });

        scope.spawn(move || {
            for _ in 0..200 {
                assert_consistent(&world.gate(), walls);
                thread::yield_now();
            }
        });
    });

    let state = world.gate();
    assert_consistent(&state, walls);
    assert!(state.registry().get(enemies[0]).is_none());
    assert!(state.enemy_count() < enemies.len());
}

// --- properties ----------------------------------------------------------------

const PROPERTY_MAP: &str = ".....▤..\n.▤♣..▤..\n.▤.P.♥..\n.....▤▤.\n♣..E....\n......E.";

proptest! {
    #[test]
    fn prop_player_never_enters_wall_or_leaves_grid(moves in prop::collection::vec(0usize..4, 0..80)) {
        let mut state = state_from(PROPERTY_MAP);
        let player = state.player_id();
        let walls = state.grid().count(Tile::Wall);

        for m in moves {
            let _ = step(&mut state, player, Direction::ALL[m]);
            let at = state.position_of(player).unwrap();
            prop_assert!(state.grid().in_bounds(at));
            prop_assert_ne!(state.terrain_at(at), Some(Tile::Wall));
            prop_assert_eq!(state.grid().count(Tile::Wall), walls);
            prop_assert_eq!(state.grid().count(Tile::Player), 1);
        }
    }

    #[test]
    fn prop_enemies_never_stack(seed in any::<u64>(), ticks in 1usize..60) {
        let mut state = state_from(PROPERTY_MAP);
        let enemies = state.enemy_ids();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..ticks {
            for &enemy in &enemies {
                let sample = state.player_position();
                state.enemy_tick(enemy, sample, 10, &mut rng).unwrap();
            }
            let positions: Vec<Position> = state.registry().enemies().map(|e| e.pos).collect();
            prop_assert_ne!(positions[0], positions[1]);
            prop_assert!(positions.iter().all(|p| state.terrain_at(*p) != Some(Tile::Wall)));
        }
    }

    #[test]
    fn prop_health_stays_clamped_and_sequential(deltas in prop::collection::vec(-3i32..=3, 0..100), max in 1i32..=5) {
        let mut health = Health::full(max);
        let mut expected = max;
        for delta in deltas {
            expected = (expected + delta).clamp(0, max);
            let value = health.apply(delta);
            prop_assert!((0..=max).contains(&value));
            prop_assert_eq!(value, expected);
        }
    }
}
