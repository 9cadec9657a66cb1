//! Render a parsed program back to text. Named-constant sugar (`$right`,
//! `$eq`, ...) is not reconstructed — values print as their resolved
//! integers or register/global/variable/label forms — so the output is
//! behaviorally equivalent to the input, not textually identical.

use robots_core::instruction::Instruction;
use robots_core::value::Value;

#[must_use]
pub fn pretty_print(program: &[Instruction]) -> String {
    program.iter().map(pretty_instruction).collect::<Vec<_>>().join("\n")
}

fn pretty_instruction(instr: &Instruction) -> String {
    match instr {
        Instruction::Go { dir } => format!("go {}", pretty_value(dir)),
        Instruction::Build { dir } => format!("build {}", pretty_value(dir)),
        Instruction::Jump { target } => format!("jump {}", pretty_value(target)),
        Instruction::Fork => "fork".to_string(),
        Instruction::Exit => "exit".to_string(),
        Instruction::If { cmp, a, b } => {
            format!("if {} {} {}", pretty_value(cmp), pretty_value(a), pretty_value(b))
        }
        Instruction::Set { dst, src } => format!("set {} {}", pretty_value(dst), pretty_value(src)),
        Instruction::Add { dst, src } => format!("add {} {}", pretty_value(dst), pretty_value(src)),
        Instruction::Sub { dst, src } => format!("sub {} {}", pretty_value(dst), pretty_value(src)),
        Instruction::Mul { dst, src } => format!("mul {} {}", pretty_value(dst), pretty_value(src)),
        Instruction::Div { dst, src } => format!("div {} {}", pretty_value(dst), pretty_value(src)),
        Instruction::Xfer { dir, src_idx, dst_idx } => {
            format!("xfer {} {} {}", pretty_value(dir), pretty_value(src_idx), pretty_value(dst_idx))
        }
        Instruction::Scan { dir } => format!("scan {}", pretty_value(dir)),
        Instruction::Save { value, loc } => format!("save {} {}", pretty_value(value), pretty_value(loc)),
        Instruction::Load { dst, loc } => format!("load {} {}", pretty_value(dst), pretty_value(loc)),
    }
}

fn pretty_value(value: &Value) -> String {
    match value {
        Value::Constant(n) => n.to_string(),
        Value::Register(i) => format!("L{i}"),
        Value::Global(i) => format!("G{i}"),
        Value::Variable(name) => format!("%{name}"),
        Value::Label(_, target) => target.to_string(),
        Value::Relative(inner) => format!("({})", pretty_value(inner)),
        Value::Team => "$team".to_string(),
        Value::Identifier => "$id".to_string(),
        Value::ProgramCounter => "$pc".to_string(),
    }
}
