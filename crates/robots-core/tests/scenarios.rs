//! Concrete scenario tests for robot programs and world ticking.

use rand::SeedableRng;
use rand::rngs::StdRng;
use robots_core::instruction::Instruction;
use robots_core::value::Value;
use robots_core::world::World;

fn world(width: u32, height: u32) -> World {
    World::with_rng(width, height, StdRng::seed_from_u64(0))
}

#[test]
fn s1_move_into_empty_cell() {
    // go $right, on a grid large enough that the destination is always free.
    let mut w = world(5, 5);
    let program = vec![Instruction::Go { dir: Value::Constant(1) }];
    let id = w.spawn_random(1, program).unwrap();
    let start = w.robot(id).unwrap().position;
    let expected = w.p_sum(start, (1, 0));

    for _ in 0..10 {
        w.tick();
    }

    let robot = w.robot(id).unwrap();
    assert_eq!(robot.position, expected);
    assert_eq!(robot.current_thread().locals[0], 1, "L0 should report success");
}

#[test]
fn s2_move_into_wall_is_self_collision_on_a_torus() {
    // A 1x1 world: going right always lands back on the mover's own cell,
    // which is passable because the mover was removed from the occupancy
    // index for the duration of its own turn.
    let mut w = world(1, 1);
    let program = vec![Instruction::Go { dir: Value::Constant(1) }];
    let id = w.spawn_random(1, program).unwrap();
    let start = w.robot(id).unwrap().position;

    for _ in 0..10 {
        w.tick();
    }

    let robot = w.robot(id).unwrap();
    assert_eq!(robot.position, start, "position unchanged on a 1x1 torus");
    assert_eq!(robot.current_thread().locals[0], 1, "mover excluded from its own occupancy check");
}

#[test]
fn s3_division_by_zero_is_fatal() {
    let mut w = world(5, 5);
    let program = vec![
        Instruction::Set { dst: Value::Register(0), src: Value::Constant(1) },
        Instruction::Set { dst: Value::Register(1), src: Value::Constant(0) },
        Instruction::Div { dst: Value::Register(0), src: Value::Register(1) },
    ];
    let id = w.spawn_random(1, program).unwrap();

    for _ in 0..3 {
        w.tick();
    }

    assert!(w.robot(id).is_none(), "robot should be dead and removed from the live set");
    let dead = w.dead().last().expect("a dead robot should be logged");
    assert_eq!(dead.id, id);
    assert!(
        dead.murder_weapon.as_deref().unwrap_or_default().contains("division"),
        "murder_weapon should mention division by zero, got {:?}",
        dead.murder_weapon
    );
}

#[test]
fn s4_fork_and_exit_leaves_only_the_parent() {
    // fork; if eq L0 $child; exit; jump 0
    let program = vec![
        Instruction::Fork,
        Instruction::If { cmp: Value::Constant(0), a: Value::Register(0), b: Value::Constant(2) },
        Instruction::Exit,
        Instruction::Jump { target: Value::Constant(0) },
    ];
    // The parent re-forks every three ticks (fork, if/exit-check, jump);
    // the child always exits on its second tick alive. Sampling at a
    // multiple of the three-tick cycle catches the thread list right
    // after the child has been pruned and before the next fork.
    let mut w = world(5, 5);
    let id = w.spawn_random(1, program).unwrap();

    for _ in 0..21 {
        w.tick();
    }

    let robot = w.robot(id).expect("robot should survive");
    assert_eq!(robot.threads.len(), 1, "only the parent thread should remain");
}

#[test]
fn s5_transfer_overwrites_neighbor() {
    // A 2x1 world has exactly two cells; whichever two cells the attacker
    // and victim land on, they're each other's east/west neighbor on the
    // torus, so the scenario doesn't depend on the placement RNG.
    let mut w = World::with_rng(2, 1, StdRng::seed_from_u64(7));

    let payload = Instruction::Jump { target: Value::Constant(99) };
    let attacker_program = vec![
        Instruction::Xfer {
            dir: Value::Constant(1),
            src_idx: Value::Constant(3),
            dst_idx: Value::Constant(0),
        },
        Instruction::Exit,
        Instruction::Exit,
        payload.clone(),
    ];
    let victim_program = vec![Instruction::Exit];

    let attacker = w.spawn_random(1, attacker_program).unwrap();
    let victim = w.spawn_random(2, victim_program).unwrap();

    // xfer has duration 2: one tick to accrue progress, one to fire.
    for _ in 0..2 {
        w.tick();
    }

    let victim_robot = w.robot(victim).expect("victim should survive the transfer");
    assert_eq!(
        victim_robot.program[0], payload,
        "victim's program[0] should now be the attacker's program[3]"
    );
    assert!(w.robot(attacker).is_some());
}

#[test]
fn build_spawns_a_same_team_clone_that_spins_until_reprogrammed() {
    // build $right, on a grid large enough that the destination is always
    // free. Build has duration 100, and a single thread accrues 1/100
    // progress per tick, so it fires on the 100th tick.
    let mut w = world(5, 5);
    let program = vec![Instruction::Build { dir: Value::Constant(1) }];
    let parent_id = w.spawn_random(3, program).unwrap();
    let parent_start = w.robot(parent_id).unwrap().position;
    let clone_cell = w.p_sum(parent_start, (1, 0));

    for _ in 0..100 {
        w.tick();
    }

    let parent = w.robot(parent_id).unwrap();
    assert_eq!(parent.position, parent_start, "build doesn't move the builder");
    assert_eq!(parent.current_thread().locals[0], 1, "L0 should report success");

    let clone_id = w.at(clone_cell).expect("a clone should occupy the destination cell");
    assert_ne!(clone_id, parent_id, "the clone must have its own id");

    let clone = w.robot(clone_id).expect("the clone should be a live robot");
    assert_eq!(clone.team, parent.team, "the clone inherits its parent's team");
    assert_eq!(clone.position, clone_cell);
    assert_eq!(
        clone.program,
        vec![Instruction::spin()],
        "an unprogrammed clone just spins until reprogrammed"
    );
}

#[test]
fn s6_match_ends_on_team_elimination() {
    let mut w = world(5, 5);
    let a = w.spawn_random(1, vec![Instruction::Exit]).unwrap();
    let b = w.spawn_random(2, vec![
        Instruction::Set { dst: Value::Register(0), src: Value::Constant(1) },
        Instruction::Set { dst: Value::Register(1), src: Value::Constant(0) },
        Instruction::Div { dst: Value::Register(0), src: Value::Register(1) },
    ])
    .unwrap();

    assert!(!w.is_over());
    for _ in 0..3 {
        w.tick();
    }
    assert!(w.robot(b).is_none(), "b should have died from division by zero");
    assert!(w.robot(a).is_some());
    assert!(w.is_over(), "match should be over once only one team has live robots");
}
