//! Readable/writable operands.
//!
//! A [`Value`] is a polymorphic cell: some variants are readable only,
//! some are both readable and writable, and `Variable` is neither — it is
//! a *reference* (a memory key), consumed directly by `save`/`load`
//! rather than through `read`/`write`. Writing a non-writable variant is
//! a fatal fault.

use crate::fault::Fault;
use crate::robot::Robot;

/// A polymorphic read/write operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A literal integer. Readable only.
    Constant(i64),
    /// Thread-local register `L0` or `L1`.
    Register(u8),
    /// Robot-wide register `G0`, `G1`, or `G2`.
    Global(u8),
    /// A memory key, used only by `save`/`load` (never through
    /// `read`/`write`).
    Variable(String),
    /// A named program position. `target` is `-1` until the parser
    /// resolves it at `finalize()`; reading an unresolved label is a
    /// fatal fault.
    Label(String, i64),
    /// A wrapper that reads as `inner.read() + current_pc`, used to build
    /// jump targets relative to their own instruction.
    Relative(Box<Value>),
    /// The executing robot's team. Readable only.
    Team,
    /// The executing robot's id. Readable only.
    Identifier,
    /// The current thread's program counter. Readable only.
    ProgramCounter,
}

impl Value {
    /// Read this operand's current value.
    pub fn read(&self, robot: &Robot) -> Result<i64, Fault> {
        match self {
            Value::Constant(n) => Ok(*n),
            Value::Register(id) => {
                let locals = &robot.current_thread().locals;
                locals
                    .get(usize::from(*id))
                    .copied()
                    .ok_or(Fault::InvalidRegister(i64::from(*id)))
            }
            Value::Global(id) => robot
                .globals
                .get(usize::from(*id))
                .copied()
                .ok_or(Fault::InvalidGlobal(i64::from(*id))),
            Value::Variable(_) => Err(Fault::NonWritable),
            Value::Label(name, target) => {
                if *target < 0 {
                    Err(Fault::UnresolvedLabel(name.clone()))
                } else {
                    Ok(*target)
                }
            }
            Value::Relative(inner) => {
                Ok(inner.read(robot)? + robot.current_thread().pc)
            }
            Value::Team => Ok(i64::from(robot.team)),
            Value::Identifier => Ok(robot.id as i64),
            Value::ProgramCounter => Ok(robot.current_thread().pc),
        }
    }

    /// Write a value into this operand, if it's writable.
    pub fn write(&self, robot: &mut Robot, value: i64) -> Result<(), Fault> {
        match self {
            Value::Register(id) => {
                let locals = &mut robot.current_thread_mut().locals;
                let slot = locals
                    .get_mut(usize::from(*id))
                    .ok_or(Fault::InvalidRegister(i64::from(*id)))?;
                *slot = value;
                Ok(())
            }
            Value::Global(id) => {
                let slot = robot
                    .globals
                    .get_mut(usize::from(*id))
                    .ok_or(Fault::InvalidGlobal(i64::from(*id)))?;
                *slot = value;
                Ok(())
            }
            Value::Constant(_)
            | Value::Variable(_)
            | Value::Label(..)
            | Value::Relative(_)
            | Value::Team
            | Value::Identifier
            | Value::ProgramCounter => Err(Fault::NonWritable),
        }
    }

    /// The memory key this operand denotes when used as a `save`/`load`
    /// location: `"%name"` for a `Variable` (by name, never evaluated),
    /// or the decimal string of its read value otherwise. Preserving this
    /// asymmetry means `save 7 %k` and `save 7 7` address different keys.
    pub fn memory_key(&self, robot: &Robot) -> Result<String, Fault> {
        match self {
            Value::Variable(name) => Ok(format!("%{name}")),
            other => Ok(other.read(robot)?.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::Robot;
    use crate::position::Position;

    fn robot() -> Robot {
        Robot::new(1, 1, Position::new(0, 0), Vec::new())
    }

    #[test]
    fn constant_reads_but_does_not_write() {
        let r = robot();
        assert_eq!(Value::Constant(42).read(&r).unwrap(), 42);
        let mut r = r;
        assert_eq!(Value::Constant(42).write(&mut r, 1), Err(Fault::NonWritable));
    }

    #[test]
    fn register_round_trips() {
        let mut r = robot();
        Value::Register(1).write(&mut r, 9).unwrap();
        assert_eq!(Value::Register(1).read(&r).unwrap(), 9);
    }

    #[test]
    fn global_round_trips() {
        let mut r = robot();
        Value::Global(2).write(&mut r, -5).unwrap();
        assert_eq!(Value::Global(2).read(&r).unwrap(), -5);
    }

    #[test]
    fn relative_adds_current_pc() {
        let mut r = robot();
        r.current_thread_mut().pc = 10;
        assert_eq!(
            Value::Relative(Box::new(Value::Constant(5))).read(&r).unwrap(),
            15
        );
    }

    #[test]
    fn unresolved_label_faults() {
        let r = robot();
        assert_eq!(
            Value::Label("loop".into(), -1).read(&r),
            Err(Fault::UnresolvedLabel("loop".into()))
        );
    }

    #[test]
    fn variable_key_differs_from_numeric_key() {
        let r = robot();
        let variable = Value::Variable("k".into());
        let numeric = Value::Constant(7);
        assert_ne!(
            variable.memory_key(&r).unwrap(),
            numeric.memory_key(&r).unwrap()
        );
        assert_eq!(variable.memory_key(&r).unwrap(), "%k");
        assert_eq!(numeric.memory_key(&r).unwrap(), "7");
    }
}
