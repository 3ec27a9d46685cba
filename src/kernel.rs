//! Kernel — top-level RTOS manager
//!
//! Owns the scheduler behind a `critical_section::Mutex` so the tick
//! interrupt and the dispatch loop can share it. Entry point for
//! application code:
//!
//! ```ignore
//! static KERNEL: Kernel = Kernel::new(1_000);
//!
//! fn blink() {
//!     led_toggle();
//!     KERNEL.request_delay_ms(500);
//! }
//!
//! #[exception]
//! fn SysTick() {
//!     KERNEL.on_tick();
//! }
//!
//! #[entry]
//! fn main() -> ! {
//!     KERNEL.initialize();
//!     KERNEL.register(blink).ok();
//!     KERNEL.start();
//!     loop {}
//! }
//! ```
//!
//! Task functions always run with the lock released: a dispatch cycle
//! takes it once to pick a task and once to close the invocation.
//!
//! Author: Moroya Sakamoto

use core::cell::RefCell;

use critical_section::Mutex;
use log::{debug, info, trace, warn};

use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::task::{TaskEntry, TaskFn, TaskId, TaskState, DEFAULT_MAX_TASKS};
use crate::timer::DEFAULT_TICK_HZ;

/// Cooperative RTOS kernel
///
/// Meant to live in a `static`; every method takes `&self`.
pub struct Kernel<const N: usize = DEFAULT_MAX_TASKS> {
    scheduler: Mutex<RefCell<Scheduler<N>>>,
}

impl<const N: usize> Kernel<N> {
    /// Create kernel for a tick source firing `tick_hz` times per second
    pub const fn new(tick_hz: u32) -> Self {
        Self {
            scheduler: Mutex::new(RefCell::new(Scheduler::new(tick_hz))),
        }
    }

    /// Create kernel for testing (1 kHz software ticks)
    pub const fn testing() -> Self {
        Self::new(DEFAULT_TICK_HZ)
    }

    /// Run `f` on the scheduler inside a critical section
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut Scheduler<N>) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.scheduler.borrow_ref_mut(cs)))
    }

    /// Clear all tasks, the cursor and the tick counter
    ///
    /// Call once before registering tasks.
    pub fn initialize(&self) {
        self.with(|s| s.initialize());
        debug!("kernel initialized ({} slots)", N);
    }

    /// Register a task
    ///
    /// Registration order is scheduling order. Must happen before
    /// [`start`](Self::start).
    pub fn register(&self, func: TaskFn) -> Result<TaskId> {
        self.register_entry(TaskEntry::Native(func))
    }

    /// Register any task entry (Rust or C)
    pub fn register_entry(&self, entry: TaskEntry) -> Result<TaskId> {
        let result = self.with(|s| s.register(entry));
        match result {
            Ok(id) => debug!("registered {}", id),
            Err(e) => warn!("register rejected: {}", e),
        }
        result
    }

    /// Run the dispatch loop forever
    ///
    /// Returns immediately, without looping, when no task is registered.
    pub fn start(&self) {
        let count = self.with(|s| {
            s.reset_cursor();
            s.task_count()
        });
        if count == 0 {
            info!("no tasks registered, scheduler not started");
            return;
        }

        info!("starting scheduler with {} tasks", count);
        loop {
            self.dispatch();
        }
    }

    /// Run one iteration of the dispatch loop
    ///
    /// Picks the next Ready task, calls it, and puts it back to Ready unless
    /// it blocked itself. Returns the task that ran, or None on an idle cycle.
    pub fn dispatch(&self) -> Option<TaskId> {
        let Some((id, entry)) = self.with(|s| s.select_next()) else {
            trace!("idle");
            core::hint::spin_loop();
            return None;
        };

        trace!("dispatch {}", id);
        entry.call();

        self.with(|s| s.finish(id));
        Some(id)
    }

    /// Tick handler; call from the periodic timer interrupt
    pub fn on_tick(&self) {
        self.with(|s| {
            s.on_tick();
        });
    }

    /// Block the calling task for `ticks` ticks
    ///
    /// Precondition: called from inside a task function. The target is
    /// whatever task the dispatcher is currently executing; the last request
    /// of an invocation wins. Called from anywhere else this is a no-op and
    /// logs a warning.
    ///
    /// A delay of 0 still blocks until the next tick.
    pub fn request_delay(&self, ticks: u32) {
        if !self.with(|s| s.request_delay(ticks)) {
            warn!("delay of {} ticks requested outside a task", ticks);
        }
    }

    /// Block the calling task for at least `ms` milliseconds
    ///
    /// Same precondition as [`request_delay`](Self::request_delay).
    pub fn request_delay_ms(&self, ms: u32) {
        let ticks = self.with(|s| s.timer().ms_to_ticks(ms));
        self.request_delay(ticks);
    }

    /// Give up the rest of the turn
    ///
    /// No effect beyond returning from the task function: the dispatcher
    /// rotates to the next task either way.
    pub fn request_yield(&self) {
        self.with(|s| s.request_yield());
    }

    /// Run a bounded number of dispatch cycles (testing)
    pub fn run_for(&self, cycles: u32) -> KernelStats {
        for _ in 0..cycles {
            self.dispatch();
        }
        self.stats()
    }

    /// Ticks since initialization
    pub fn ticks(&self) -> u32 {
        self.with(|s| s.ticks())
    }

    /// Milliseconds since initialization
    pub fn now_ms(&self) -> u64 {
        self.with(|s| s.timer().now_ms())
    }

    /// State of a registered task
    pub fn task_state(&self, id: TaskId) -> Option<TaskState> {
        self.with(|s| s.get_task(id).map(|t| t.state))
    }

    /// Task picked by the last dispatch (None at startup and after idle)
    pub fn current_task(&self) -> Option<TaskId> {
        self.with(|s| s.current_task())
    }

    /// Number of registered tasks
    pub fn task_count(&self) -> usize {
        self.with(|s| s.task_count())
    }

    /// Snapshot of scheduler counters
    pub fn stats(&self) -> KernelStats {
        self.with(|s| KernelStats {
            ticks: s.ticks(),
            task_count: s.task_count(),
            blocked: s.registry().count_in(TaskState::Blocked),
            dispatches: s.dispatches,
            idle_cycles: s.idle_cycles,
            context_switches: s.context_switches,
        })
    }

    /// Memory footprint estimate
    pub fn memory_footprint(&self) -> usize {
        core::mem::size_of::<Self>()
    }
}

/// Kernel execution statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelStats {
    /// Ticks since initialization
    pub ticks: u32,
    /// Registered tasks
    pub task_count: usize,
    /// Tasks currently blocked
    pub blocked: usize,
    /// Task invocations
    pub dispatches: u32,
    /// Cycles with nothing to run
    pub idle_cycles: u32,
    /// Context switches
    pub context_switches: u32,
}
