use rand::SeedableRng;
use rand::rngs::StdRng;
use robots_asm::{ParseError, parse, pretty_print};
use robots_core::instruction::Instruction;
use robots_core::value::Value;
use robots_core::world::World;

#[test]
fn parses_named_constants_and_registers() {
    let program = parse("go $right\nset L0 42\nset G1 L0\n").unwrap();
    assert_eq!(
        program,
        vec![
            Instruction::Go { dir: Value::Constant(1) },
            Instruction::Set { dst: Value::Register(0), src: Value::Constant(42) },
            Instruction::Set { dst: Value::Global(1), src: Value::Register(0) },
        ]
    );
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let program = parse("' a header comment\n\nfork ' spawn a helper\n\nexit\n").unwrap();
    assert_eq!(program, vec![Instruction::Fork, Instruction::Exit]);
}

#[test]
fn forward_label_reference_resolves_to_absolute_index() {
    // jump :loop; exit; :loop  -- loop is declared after its use.
    let program = parse("jump :loop\nexit\n:loop\nfork\n").unwrap();
    assert_eq!(
        program,
        vec![
            Instruction::Jump { target: Value::Label("loop".into(), 2) },
            Instruction::Exit,
            Instruction::Fork,
        ]
    );
}

#[test]
fn relative_wrapped_label_becomes_pc_relative_offset() {
    // exit; jump (:loop); :loop; fork
    // the jump sits at instruction index 1, loop resolves to index 2,
    // so the wrapped label's target becomes 2 - 1 = 1.
    let program = parse("exit\njump (:loop)\n:loop\nfork\n").unwrap();
    assert_eq!(
        program[1],
        Instruction::Jump { target: Value::Relative(Box::new(Value::Label("loop".into(), 1))) }
    );
}

#[test]
fn duplicate_labels_are_a_parse_error() {
    let result = parse(":loop\nexit\n:loop\nfork\n");
    assert!(matches!(result, Err(ParseError { .. })));
}

#[test]
fn undeclared_label_is_a_parse_error() {
    let result = parse("jump :nowhere\n");
    assert!(result.is_err());
}

#[test]
fn wrong_arity_is_a_parse_error() {
    assert!(parse("go\n").is_err());
    assert!(parse("fork L0\n").is_err());
}

#[test]
fn pretty_print_round_trips_behaviorally() {
    let source = "go $right\nif $eq L0 1\nfork\nexit\n";
    let program = parse(source).unwrap();
    let printed = pretty_print(&program);
    let reparsed = parse(&printed).unwrap();
    assert_eq!(program, reparsed);
}

#[test]
fn pretty_print_round_trips_behaviorally_through_labels() {
    // A label declaration has no line of its own in pretty-printed output
    // (labels resolve to plain integers), so this exercises the case the
    // label-free round-trip test above can't: jump :label and a
    // relative-wrapped jump (:label), both forward references.
    let source = "jump :loop\nexit\n:loop\nfork\njump (:loop)\n";
    let program = parse(source).unwrap();
    let printed = pretty_print(&program);
    let reparsed = parse(&printed).unwrap();

    // The reparsed program no longer carries named Label values (they've
    // become plain Constants), so compare behavior instead of structure:
    // run both in lockstep and check they end up in the same state.
    let mut original_world = World::with_rng(3, 3, StdRng::seed_from_u64(1));
    let original_id = original_world.spawn_random(1, program).unwrap();
    let mut reparsed_world = World::with_rng(3, 3, StdRng::seed_from_u64(1));
    let reparsed_id = reparsed_world.spawn_random(1, reparsed).unwrap();

    for _ in 0..6 {
        original_world.tick();
        reparsed_world.tick();
    }

    let original_robot = original_world.robot(original_id).unwrap();
    let reparsed_robot = reparsed_world.robot(reparsed_id).unwrap();
    let pcs = |robot: &robots_core::robot::Robot| {
        robot.threads.iter().flatten().map(|t| t.pc).collect::<Vec<_>>()
    };
    assert_eq!(original_robot.threads.len(), reparsed_robot.threads.len());
    assert_eq!(pcs(original_robot), pcs(reparsed_robot));
}

#[test]
fn special_reads_parse_to_their_own_value_variants() {
    let program = parse("set L0 $id\nset L1 $team\nset G0 $pc\n").unwrap();
    assert_eq!(
        program,
        vec![
            Instruction::Set { dst: Value::Register(0), src: Value::Identifier },
            Instruction::Set { dst: Value::Register(1), src: Value::Team },
            Instruction::Set { dst: Value::Global(0), src: Value::ProgramCounter },
        ]
    );
}
