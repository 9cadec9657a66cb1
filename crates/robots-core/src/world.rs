//! The grid, robot registry, and tick scheduler.

use std::collections::{HashMap, HashSet};

use rand::RngCore;

use crate::fault::Fault;
use crate::instruction::Instruction;
use crate::position::Position;
use crate::robot::{Robot, RobotId, TeamId};

/// A robot was rejected before it ever entered the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// Team `0` is reserved and may not be used.
    InvalidTeam,
    /// The grid has no unoccupied cell left to place a robot on.
    WorldFull,
}

impl std::fmt::Display for SpawnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpawnError::InvalidTeam => write!(f, "team number must not be 0"),
            SpawnError::WorldFull => write!(f, "no unoccupied cell to place a robot"),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Directions, indexed `up=0, right=1, down=2, left=3`. `y` grows
/// downward, matching the original convention.
const DIRS: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// A direction operand, resolved from an integer in `{0, 1, 2, 3}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    #[must_use]
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Direction::Up),
            1 => Some(Direction::Right),
            2 => Some(Direction::Down),
            3 => Some(Direction::Left),
            _ => None,
        }
    }

    #[must_use]
    pub fn offset(self) -> (i64, i64) {
        DIRS[self as usize]
    }
}

/// Live robots, team membership, and the toroidal grid they occupy.
pub struct World {
    pub width: u32,
    pub height: u32,
    robots: HashMap<RobotId, Robot>,
    /// Insertion order, for the deterministic tick iteration spec.md §4.4
    /// requires. A robot is appended when it's born and never removed
    /// from here until it dies (dead robots are simply skipped).
    order: Vec<RobotId>,
    position_index: HashMap<Position, RobotId>,
    teams: HashMap<TeamId, HashSet<RobotId>>,
    dead: Vec<Robot>,
    next_id: RobotId,
    debug: bool,
    rng: Box<dyn RngCore>,
}

impl World {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_rng(width, height, rand::rng())
    }

    /// Build a world with a caller-supplied RNG, for deterministic tests
    /// or reproducible placement.
    pub fn with_rng(width: u32, height: u32, rng: impl RngCore + 'static) -> Self {
        assert!(width > 0 && height > 0, "world dimensions must be positive");
        Self {
            width,
            height,
            robots: HashMap::new(),
            order: Vec::new(),
            position_index: HashMap::new(),
            teams: HashMap::new(),
            dead: Vec::new(),
            next_id: 0,
            debug: false,
            rng: Box::new(rng),
        }
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Modular grid arithmetic: `((p.x+d.x) mod width, (p.y+d.y) mod
    /// height)`, always normalized to non-negative coordinates.
    #[must_use]
    pub fn p_sum(&self, pos: Position, offset: (i64, i64)) -> Position {
        let w = i64::from(self.width);
        let h = i64::from(self.height);
        Position::new((pos.x + offset.0).rem_euclid(w), (pos.y + offset.1).rem_euclid(h))
    }

    /// Is `pos` free of any live robot? Note: during a robot's own turn
    /// it has been temporarily removed from the index (see
    /// [`World::tick_robot`]), so a robot's own cell always reads as
    /// passable to itself.
    #[must_use]
    pub fn passable(&self, pos: Position) -> bool {
        !self.position_index.contains_key(&pos)
    }

    /// The id of the robot occupying `pos`, if any.
    #[must_use]
    pub fn at(&self, pos: Position) -> Option<RobotId> {
        self.position_index.get(&pos).copied()
    }

    #[must_use]
    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.robots.get(&id)
    }

    /// Live robots in insertion order.
    pub fn robots(&self) -> impl Iterator<Item = &Robot> {
        self.order.iter().filter_map(|id| self.robots.get(id))
    }

    #[must_use]
    pub fn dead(&self) -> &[Robot] {
        &self.dead
    }

    /// Place a new robot on a uniformly random unoccupied cell.
    ///
    /// Unlike the reference implementation this never retries a
    /// random guess against the occupancy set (that loop can stall
    /// forever and, with an off-by-one bound, can even land outside the
    /// grid) — it enumerates the actually-free cells and samples one
    /// directly.
    pub fn spawn_random(
        &mut self,
        team: TeamId,
        program: Vec<Instruction>,
    ) -> Result<RobotId, SpawnError> {
        if team == 0 {
            return Err(SpawnError::InvalidTeam);
        }
        let free: Vec<Position> = (0..i64::from(self.height))
            .flat_map(|y| (0..i64::from(self.width)).map(move |x| Position::new(x, y)))
            .filter(|p| self.passable(*p))
            .collect();
        if free.is_empty() {
            return Err(SpawnError::WorldFull);
        }
        let idx = (self.rng.next_u64() as usize) % free.len();
        let position = free[idx];
        let id = self.next_id();
        let robot = Robot::new(id, team, position, program);
        self.insert(robot);
        Ok(id)
    }

    /// Spawn an empty `build` clone at `position`, which must already be
    /// known to be passable.
    pub(crate) fn spawn_clone_at(&mut self, team: TeamId, position: Position) -> RobotId {
        let id = self.next_id();
        let robot = Robot::spawn_empty(id, team, position);
        self.insert(robot);
        id
    }

    fn next_id(&mut self) -> RobotId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert(&mut self, robot: Robot) {
        let id = robot.id;
        self.position_index.insert(robot.position, id);
        self.teams.entry(robot.team).or_default().insert(id);
        self.order.push(id);
        self.robots.insert(id, robot);
    }

    /// Copy one instruction from `src_idx` in the caller's program into
    /// `target`'s program at `dst_idx`, extending `target`'s program with
    /// no-op placeholders if needed.
    pub(crate) fn transfer_instruction(&mut self, target: RobotId, dst_idx: usize, instr: Instruction) {
        let target = self.robots.get_mut(&target).expect("target robot must exist");
        if dst_idx >= target.program.len() {
            target.program.resize(dst_idx + 1, Instruction::spin());
        }
        target.program[dst_idx] = instr;
    }

    /// `is_over` is true iff at most one robot is alive, or at most one
    /// team still has a live member.
    #[must_use]
    pub fn is_over(&self) -> bool {
        if self.robots.len() <= 1 {
            return true;
        }
        self.teams.values().filter(|members| !members.is_empty()).count() <= 1
    }

    /// Advance the world by one tick: every robot alive at tick start is
    /// ticked exactly once, in insertion order. A fault in one robot's
    /// turn never affects another robot's turn this tick.
    pub fn tick(&mut self) {
        let snapshot: Vec<RobotId> = self.order.iter().filter(|id| self.robots.contains_key(id)).copied().collect();
        for id in snapshot {
            if self.robots.contains_key(&id) {
                self.tick_robot(id);
            }
        }
    }

    fn tick_robot(&mut self, id: RobotId) {
        let mut robot = self.robots.remove(&id).expect("robot must be live");
        self.position_index.remove(&robot.position);

        let thread_count = robot.threads.len() as u64;
        for idx in 0..robot.threads.len() {
            let Some(thread) = robot.threads[idx].as_mut() else { continue };
            let pc = thread.pc;
            if pc < 0 || pc as usize >= robot.program.len() {
                self.kill(robot, Fault::OutOfBoundsPc(pc));
                return;
            }

            robot.current_thread_index = idx;
            let op = robot.program[pc as usize].clone();
            let duration = op.duration();

            let thread = robot.threads[idx].as_mut().expect("checked Some above");
            thread.progress.add_one_over(thread_count);
            if !thread.progress.at_least(duration) {
                continue;
            }
            thread.progress.reset();

            let mut ctx = ExecCtx { robot, world: self };
            match op.execute(&mut ctx) {
                Ok(()) => {
                    robot = ctx.robot;
                    if let Some(t) = robot.threads.get_mut(idx).and_then(Option::as_mut) {
                        t.pc += 1;
                    }
                }
                Err(fault) => {
                    robot = ctx.robot;
                    self.kill(robot, fault);
                    return;
                }
            }
        }

        robot.threads.retain(Option::is_some);
        self.position_index.insert(robot.position, robot.id);
        self.robots.insert(robot.id, robot);
    }

    fn kill(&mut self, mut robot: Robot, fault: Fault) {
        if self.debug {
            robot.murder_weapon_long = Some(format!("{fault:?}"));
        }
        robot.murder_weapon = Some(fault.to_string());
        robot.dead = true;
        if let Some(members) = self.teams.get_mut(&robot.team) {
            members.remove(&robot.id);
        }
        self.dead.push(robot);
    }
}

/// The mediating context an [`Instruction`] executes against: the
/// executing robot (temporarily removed from the world so it can be
/// mutated freely, including having its position change) plus the world
/// it can still query and mutate other robots through.
pub struct ExecCtx<'w> {
    pub robot: Robot,
    pub world: &'w mut World,
}
