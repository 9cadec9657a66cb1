//! A robot's per-thread execution context.

use crate::progress::Progress;

/// One thread of execution within a robot.
///
/// Each thread has its own program counter and pair of local registers;
/// the program and the three global registers are shared with the owning
/// robot's other threads.
#[derive(Debug, Clone)]
pub struct Thread {
    /// Index into the owning robot's `program`. Signed so that `jump`'s
    /// `target - 1` trick can transiently go negative right before the
    /// post-execute increment lands it back in range.
    pub pc: i64,
    /// The two thread-local registers, `L0` and `L1`. `L0` doubles as the
    /// result register for instructions that report success/failure.
    pub locals: [i64; 2],
    /// Accumulated progress toward the current instruction's duration.
    pub progress: Progress,
}

impl Thread {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pc: 0,
            locals: [0, 0],
            progress: Progress::ZERO,
        }
    }
}

impl Default for Thread {
    fn default() -> Self {
        Self::new()
    }
}
