//! Round-robin cooperative scheduler
//!
//! Picks the next Ready task in registration order, starting right after
//! the task that ran last. No priorities, no preemption: a picked task
//! runs until its function returns.
//!
//! The scheduler does not call task functions itself. [`Scheduler::select_next`]
//! hands out the entry and [`Scheduler::finish`] closes the invocation, so
//! the caller can run the task outside any lock (see [`crate::kernel`]).
//!
//! Author: Moroya Sakamoto

use crate::error::Result;
use crate::registry::TaskRegistry;
use crate::task::{Task, TaskEntry, TaskId, TaskState, DEFAULT_MAX_TASKS};
use crate::timer::SysTimer;

/// Round-robin scheduler
///
/// Static task table, no dynamic allocation.
pub struct Scheduler<const N: usize = DEFAULT_MAX_TASKS> {
    /// Task table
    registry: TaskRegistry<N>,
    /// Task picked by the last selection (None = startup or idle)
    current_task: Option<TaskId>,
    /// Task whose function is executing (between select and finish)
    in_flight: Option<TaskId>,
    /// System tick counter
    timer: SysTimer,
    /// Task of the previous dispatch, for switch counting
    last_run: Option<TaskId>,
    /// Tasks dispatched
    pub dispatches: u32,
    /// Selections that found nothing Ready
    pub idle_cycles: u32,
    /// Dispatches that picked a different task than the previous one
    pub context_switches: u32,
}

impl<const N: usize> Scheduler<N> {
    /// Create empty scheduler
    pub const fn new(tick_hz: u32) -> Self {
        Self {
            registry: TaskRegistry::new(),
            current_task: None,
            in_flight: None,
            timer: SysTimer::new(tick_hz),
            last_run: None,
            dispatches: 0,
            idle_cycles: 0,
            context_switches: 0,
        }
    }

    /// Reset tasks, cursor, tick counter and statistics
    pub fn initialize(&mut self) {
        self.registry.initialize();
        self.current_task = None;
        self.in_flight = None;
        self.timer.reset();
        self.last_run = None;
        self.dispatches = 0;
        self.idle_cycles = 0;
        self.context_switches = 0;
    }

    /// Register a task, returns its id
    pub fn register(&mut self, func: TaskEntry) -> Result<TaskId> {
        self.registry.register(func)
    }

    /// Forget the last selection so the next scan starts at the first task
    pub fn reset_cursor(&mut self) {
        self.current_task = None;
    }

    /// Pick the next Ready task and mark it Running
    ///
    /// Scans at most `len()` entries, starting after the current task and
    /// wrapping around. Returns None when every task is Blocked (idle); the
    /// cursor is then cleared and the next scan starts at the first task.
    pub fn select_next(&mut self) -> Option<(TaskId, TaskEntry)> {
        debug_assert!(
            self.running_task().is_none(),
            "selection while a task is still running"
        );

        let count = self.registry.len();
        let start = self.current_task.map_or(0, |id| id.index() + 1);

        for offset in 0..count {
            let id = TaskId((start + offset) % count);
            let Some(task) = self.registry.get_mut(id) else {
                continue;
            };
            if !task.is_ready() {
                continue;
            }
            let Some(entry) = task.func else {
                continue;
            };

            task.state = TaskState::Running;
            self.current_task = Some(id);
            self.in_flight = Some(id);
            self.dispatches = self.dispatches.wrapping_add(1);
            if self.last_run != Some(id) {
                self.context_switches = self.context_switches.wrapping_add(1);
                self.last_run = Some(id);
            }
            return Some((id, entry));
        }

        self.current_task = None;
        self.idle_cycles = self.idle_cycles.wrapping_add(1);
        None
    }

    /// Close an invocation started by [`select_next`](Self::select_next)
    ///
    /// A task still Running goes back to Ready. A task that blocked itself
    /// (or was already woken by a tick while it ran) keeps its state.
    pub fn finish(&mut self, id: TaskId) {
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
        if let Some(task) = self.registry.get_mut(id) {
            task.run_count = task.run_count.wrapping_add(1);
            if task.state == TaskState::Running {
                task.state = TaskState::Ready;
            }
        }
    }

    /// Block the executing task for `ticks` ticks
    ///
    /// The target is the task between [`select_next`](Self::select_next)
    /// and [`finish`](Self::finish), whatever its state: a later request
    /// in the same invocation replaces an earlier one, and re-blocks a task
    /// a tick already woke. Returns false (and changes nothing) when no
    /// task is executing.
    pub fn request_delay(&mut self, ticks: u32) -> bool {
        match self.in_flight {
            Some(id) => {
                self.registry.mark_blocked(id, ticks);
                true
            }
            None => false,
        }
    }

    /// Give up the rest of the turn
    ///
    /// No effect: the task already gives up the CPU by returning, and the
    /// dispatcher moves on to the next task either way.
    #[inline]
    pub fn request_yield(&self) {}

    /// Count one tick and wake tasks whose delay ran out
    ///
    /// Bounded O(N), never waits. Returns how many tasks were woken.
    pub fn on_tick(&mut self) -> usize {
        self.timer.tick();
        self.registry.advance_tick()
    }

    /// Task whose function is currently executing, if any
    pub fn running_task(&self) -> Option<TaskId> {
        self.in_flight
    }

    /// Task picked by the last selection (None at startup and after idle)
    pub fn current_task(&self) -> Option<TaskId> {
        self.current_task
    }

    /// Get task by id
    pub fn get_task(&self, id: TaskId) -> Option<&Task> {
        self.registry.get(id)
    }

    /// Task table
    pub fn registry(&self) -> &TaskRegistry<N> {
        &self.registry
    }

    /// Number of registered tasks
    pub fn task_count(&self) -> usize {
        self.registry.len()
    }

    /// Tick counter
    pub fn timer(&self) -> &SysTimer {
        &self.timer
    }

    /// Ticks since start
    pub fn ticks(&self) -> u32 {
        self.timer.now_ticks()
    }
}
