//! The error raised when a robot's instruction execution goes fatally wrong.

use std::fmt;

/// A fatal instruction fault.
///
/// Raising a `Fault` during a robot's turn kills that robot: the world
/// records the fault as the robot's `murder_weapon`, removes it from the
/// live set, and moves on to the next robot. A fault never aborts any
/// other robot's turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The thread's program counter pointed outside `0..program.len()`.
    OutOfBoundsPc(i64),
    /// A value that isn't writable (`Constant`, `Label`, `Relative`, `Team`,
    /// `Identifier`, `ProgramCounter`, `Variable`) was used as a write target.
    NonWritable,
    /// `div` with a zero divisor.
    DivisionByZero,
    /// `xfer` with a negative destination index.
    NegativeTransferDestination(i64),
    /// `xfer` with a source index outside the sending robot's program.
    ProgramIndexOutOfBounds(i64),
    /// `load` of a memory key that was never `save`d.
    MissingMemoryKey(String),
    /// A direction operand outside `{0, 1, 2, 3}`.
    BadDirection(i64),
    /// An `if` comparison mode outside `{0..=5}`.
    BadComparison(i64),
    /// A `Label` was read before its target was resolved by the parser.
    UnresolvedLabel(String),
    /// A `Register` index outside `{0, 1}`.
    InvalidRegister(i64),
    /// A `Global` index outside `{0, 1, 2}`.
    InvalidGlobal(i64),
    /// Execution reached a no-op placeholder instruction.
    InvalidInstruction,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::OutOfBoundsPc(pc) => write!(f, "out of program bounds (pc={pc})"),
            Fault::NonWritable => write!(f, "value not writable"),
            Fault::DivisionByZero => write!(f, "division by zero"),
            Fault::NegativeTransferDestination(dst) => {
                write!(f, "cannot transfer before start of memory (dst={dst})")
            }
            Fault::ProgramIndexOutOfBounds(idx) => {
                write!(f, "transfer source out of program bounds (src={idx})")
            }
            Fault::MissingMemoryKey(key) => write!(f, "no such memory key: {key}"),
            Fault::BadDirection(d) => write!(f, "invalid direction: {d}"),
            Fault::BadComparison(m) => write!(f, "invalid comparison mode: {m}"),
            Fault::UnresolvedLabel(name) => write!(f, "unresolved label: {name}"),
            Fault::InvalidRegister(id) => write!(f, "invalid local register: {id}"),
            Fault::InvalidGlobal(id) => write!(f, "invalid global register: {id}"),
            Fault::InvalidInstruction => write!(f, "invalid instruction"),
        }
    }
}

impl std::error::Error for Fault {}
