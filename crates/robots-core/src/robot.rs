//! A robot: a program, its threads, registers, memory, and position.

use std::collections::HashMap;

use crate::instruction::Instruction;
use crate::position::Position;
use crate::thread::Thread;

/// A robot's unique, monotonically assigned id.
pub type RobotId = u64;

/// A team number. Must be positive; `0` is reserved and rejected at
/// spawn time.
pub type TeamId = u32;

/// A robot: program, threads, registers, memory, and position.
///
/// `threads` holds `None` for a slot nulled by `exit` mid-tick; those
/// slots are pruned at the end of the robot's tick. Between ticks the
/// vector never contains a `None`, and is never empty (the last thread
/// can't exit itself; `exit` on the last thread fails instead).
#[derive(Debug, Clone)]
pub struct Robot {
    pub id: RobotId,
    pub team: TeamId,
    pub position: Position,
    pub program: Vec<Instruction>,
    pub threads: Vec<Option<Thread>>,
    pub current_thread_index: usize,
    pub globals: [i64; 3],
    pub memory: HashMap<String, i64>,
    pub dead: bool,
    /// Short fault description, populated only once `dead`.
    pub murder_weapon: Option<String>,
    /// Longer diagnostic captured at the fault site, populated only in
    /// debug mode.
    pub murder_weapon_long: Option<String>,
}

impl Robot {
    #[must_use]
    pub fn new(id: RobotId, team: TeamId, position: Position, program: Vec<Instruction>) -> Self {
        Self {
            id,
            team,
            position,
            program,
            threads: vec![Some(Thread::new())],
            current_thread_index: 0,
            globals: [0; 3],
            memory: HashMap::new(),
            dead: false,
            murder_weapon: None,
            murder_weapon_long: None,
        }
    }

    /// A freshly spawned `build` clone: one thread, no registers or
    /// memory, a program that spins in place until reprogrammed.
    #[must_use]
    pub fn spawn_empty(id: RobotId, team: TeamId, position: Position) -> Self {
        Self::new(id, team, position, vec![Instruction::spin()])
    }

    /// The currently executing thread.
    ///
    /// # Panics
    ///
    /// Panics if `current_thread_index` doesn't name a live thread; the
    /// world never schedules a robot onto a nulled or out-of-range slot.
    #[must_use]
    pub fn current_thread(&self) -> &Thread {
        self.threads[self.current_thread_index]
            .as_ref()
            .expect("current thread slot must be live while scheduled")
    }

    /// Mutable access to the currently executing thread. See
    /// [`Robot::current_thread`] for the panic condition.
    pub fn current_thread_mut(&mut self) -> &mut Thread {
        self.threads[self.current_thread_index]
            .as_mut()
            .expect("current thread slot must be live while scheduled")
    }

    /// Set the result register (`L0`) of the current thread.
    pub fn set_result(&mut self, success: bool) {
        self.current_thread_mut().locals[0] = i64::from(success);
    }

    /// Number of threads still running (not nulled by `exit` this tick).
    #[must_use]
    pub fn live_thread_count(&self) -> usize {
        self.threads.iter().filter(|t| t.is_some()).count()
    }

    /// A one-line human-readable snapshot for `debug` mode: id, team,
    /// position, and each live thread's pc and locals.
    #[must_use]
    pub fn debug_dump(&self) -> String {
        let threads: Vec<String> = self
            .threads
            .iter()
            .flatten()
            .map(|t| format!("pc={} L={:?}", t.pc, t.locals))
            .collect();
        format!(
            "#{} team={} pos={} globals={:?} threads=[{}]",
            self.id,
            self.team,
            self.position,
            self.globals,
            threads.join(", ")
        )
    }
}
