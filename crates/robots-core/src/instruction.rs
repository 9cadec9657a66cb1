//! The instruction set: one opcode per variant, dispatched through a
//! single `execute` method instead of virtual calls.

use crate::fault::Fault;
use crate::value::Value;
use crate::world::{Direction, ExecCtx};

/// A comparison mode for `if`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq = 0,
    Ne = 1,
    Lt = 2,
    Le = 3,
    Gt = 4,
    Ge = 5,
}

impl Comparison {
    #[must_use]
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Comparison::Eq),
            1 => Some(Comparison::Ne),
            2 => Some(Comparison::Lt),
            3 => Some(Comparison::Le),
            4 => Some(Comparison::Gt),
            5 => Some(Comparison::Ge),
            _ => None,
        }
    }

    #[must_use]
    pub fn apply(self, a: i64, b: i64) -> bool {
        match self {
            Comparison::Eq => a == b,
            Comparison::Ne => a != b,
            Comparison::Lt => a < b,
            Comparison::Le => a <= b,
            Comparison::Gt => a > b,
            Comparison::Ge => a >= b,
        }
    }
}

/// One instruction. Each variant carries exactly the operands its row in
/// the instruction table needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Go { dir: Value },
    Build { dir: Value },
    Jump { target: Value },
    Fork,
    Exit,
    If { cmp: Value, a: Value, b: Value },
    Set { dst: Value, src: Value },
    Add { dst: Value, src: Value },
    Sub { dst: Value, src: Value },
    Mul { dst: Value, src: Value },
    Div { dst: Value, src: Value },
    Xfer { dir: Value, src_idx: Value, dst_idx: Value },
    Scan { dir: Value },
    Save { value: Value, loc: Value },
    Load { dst: Value, loc: Value },
}

impl Instruction {
    /// The program every freshly `build`-spawned robot starts with: spin
    /// on instruction 0 until reprogrammed by a transfer.
    #[must_use]
    pub fn spin() -> Self {
        Instruction::Jump { target: Value::Constant(0) }
    }

    #[must_use]
    pub fn duration(&self) -> u32 {
        match self {
            Instruction::Go { .. } => 10,
            Instruction::Build { .. } => 100,
            Instruction::Jump { .. }
            | Instruction::Exit
            | Instruction::If { .. }
            | Instruction::Set { .. }
            | Instruction::Add { .. }
            | Instruction::Sub { .. }
            | Instruction::Mul { .. }
            | Instruction::Div { .. } => 0,
            Instruction::Fork => 1,
            Instruction::Xfer { .. } => 2,
            Instruction::Scan { .. } => 1,
            Instruction::Save { .. } => 1,
            Instruction::Load { .. } => 1,
        }
    }

    /// Run this instruction's effect against `ctx`. The caller is
    /// responsible for the generic `pc += 1` that follows a successful
    /// execute; `Jump`, `If`, and `Fork` account for that rule in how
    /// they set `pc` here.
    pub fn execute(&self, ctx: &mut ExecCtx) -> Result<(), Fault> {
        match self {
            Instruction::Go { dir } => {
                let dest = destination(ctx, dir)?;
                if ctx.world.passable(dest) {
                    ctx.robot.position = dest;
                    ctx.robot.set_result(true);
                } else {
                    ctx.robot.set_result(false);
                }
                Ok(())
            }
            Instruction::Build { dir } => {
                let dest = destination(ctx, dir)?;
                if ctx.world.passable(dest) {
                    ctx.world.spawn_clone_at(ctx.robot.team, dest);
                    ctx.robot.set_result(true);
                } else {
                    ctx.robot.set_result(false);
                }
                Ok(())
            }
            Instruction::Jump { target } => {
                let target = target.read(&ctx.robot)?;
                ctx.robot.current_thread_mut().pc = target - 1;
                Ok(())
            }
            Instruction::Fork => {
                let parent_pc = ctx.robot.current_thread().pc;
                let mut child = ctx.robot.current_thread().clone();
                child.pc = parent_pc + 1;
                child.locals[0] = 2; // CHILD
                ctx.robot.threads.push(Some(child));
                ctx.robot.set_result(true); // PARENT
                Ok(())
            }
            Instruction::Exit => {
                if ctx.robot.live_thread_count() > 1 {
                    let idx = ctx.robot.current_thread_index;
                    ctx.robot.threads[idx] = None;
                } else {
                    ctx.robot.set_result(false);
                }
                Ok(())
            }
            Instruction::If { cmp, a, b } => {
                let mode = cmp.read(&ctx.robot)?;
                let mode = Comparison::from_i64(mode).ok_or(Fault::BadComparison(mode))?;
                let lhs = a.read(&ctx.robot)?;
                let rhs = b.read(&ctx.robot)?;
                if !mode.apply(lhs, rhs) {
                    ctx.robot.current_thread_mut().pc += 1;
                }
                Ok(())
            }
            Instruction::Set { dst, src } => {
                let value = src.read(&ctx.robot)?;
                dst.write(&mut ctx.robot, value)
            }
            Instruction::Add { dst, src } => binop(ctx, dst, src, |a, b| Ok(a.wrapping_add(b))),
            Instruction::Sub { dst, src } => binop(ctx, dst, src, |a, b| Ok(a.wrapping_sub(b))),
            Instruction::Mul { dst, src } => binop(ctx, dst, src, |a, b| Ok(a.wrapping_mul(b))),
            Instruction::Div { dst, src } => binop(ctx, dst, src, |a, b| {
                if b == 0 {
                    Err(Fault::DivisionByZero)
                } else {
                    Ok(floor_div(a, b))
                }
            }),
            Instruction::Xfer { dir, src_idx, dst_idx } => {
                let dest = destination(ctx, dir)?;
                let Some(target_id) = ctx.world.at(dest) else {
                    ctx.robot.set_result(false);
                    return Ok(());
                };
                let src_idx = src_idx.read(&ctx.robot)?;
                let dst_idx = dst_idx.read(&ctx.robot)?;
                if dst_idx < 0 {
                    return Err(Fault::NegativeTransferDestination(dst_idx));
                }
                let Ok(src_pos) = usize::try_from(src_idx) else {
                    return Err(Fault::ProgramIndexOutOfBounds(src_idx));
                };
                let Some(instr) = ctx.robot.program.get(src_pos) else {
                    return Err(Fault::ProgramIndexOutOfBounds(src_idx));
                };
                ctx.world.transfer_instruction(target_id, dst_idx as usize, instr.clone());
                ctx.robot.set_result(true);
                Ok(())
            }
            Instruction::Scan { dir } => {
                let dest = destination(ctx, dir)?;
                match ctx.world.at(dest) {
                    Some(id) => {
                        let target = ctx.world.robot(id).expect("scanned id must be live");
                        let team = i64::from(target.team);
                        let ident = target.id as i64;
                        ctx.robot.current_thread_mut().locals = [team, ident];
                    }
                    None => ctx.robot.set_result(false),
                }
                Ok(())
            }
            Instruction::Save { value, loc } => {
                let key = loc.memory_key(&ctx.robot)?;
                let value = value.read(&ctx.robot)?;
                ctx.robot.memory.insert(key, value);
                Ok(())
            }
            Instruction::Load { dst, loc } => {
                let key = loc.memory_key(&ctx.robot)?;
                let value = *ctx
                    .robot
                    .memory
                    .get(&key)
                    .ok_or_else(|| Fault::MissingMemoryKey(key.clone()))?;
                dst.write(&mut ctx.robot, value)
            }
        }
    }
}

fn destination(ctx: &ExecCtx, dir: &Value) -> Result<crate::position::Position, Fault> {
    let dir = dir.read(&ctx.robot)?;
    let dir = Direction::from_i64(dir).ok_or(Fault::BadDirection(dir))?;
    Ok(ctx.world.p_sum(ctx.robot.position, dir.offset()))
}

fn binop(
    ctx: &mut ExecCtx,
    dst: &Value,
    src: &Value,
    op: impl FnOnce(i64, i64) -> Result<i64, Fault>,
) -> Result<(), Fault> {
    let a = dst.read(&ctx.robot)?;
    let b = src.read(&ctx.robot)?;
    let result = op(a, b)?;
    dst.write(&mut ctx.robot, result)
}

/// Integer division truncated toward negative infinity, matching the
/// reference implementation's platform (Rust's `/` truncates toward
/// zero, which disagrees with it for mixed-sign operands).
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if (r != 0) && ((r < 0) != (b < 0)) { q - 1 } else { q }
}
