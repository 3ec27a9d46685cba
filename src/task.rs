//! Task control entries — static, no-alloc task descriptors
//!
//! Each task is a plain function that runs to completion every time the
//! dispatcher picks it. Scheduling state lives next to the function
//! pointer in a fixed-size control entry.
//!
//! Author: Moroya Sakamoto

use core::fmt;

/// Default number of task slots
pub const DEFAULT_MAX_TASKS: usize = 4;

/// Reserved stack words per task (32-bit words)
pub const STACK_WORDS: usize = 256;

/// Task function — called once per dispatch
pub type TaskFn = fn();

/// C task function, registered through the C ABI
#[cfg(feature = "ffi")]
pub type ForeignTaskFn = extern "C" fn();

/// Callable stored in a task slot
#[derive(Clone, Copy)]
pub enum TaskEntry {
    /// Rust function
    Native(TaskFn),
    /// C function
    #[cfg(feature = "ffi")]
    Foreign(ForeignTaskFn),
}

impl TaskEntry {
    /// Invoke the task body
    #[inline]
    pub fn call(self) {
        match self {
            TaskEntry::Native(f) => f(),
            #[cfg(feature = "ffi")]
            TaskEntry::Foreign(f) => f(),
        }
    }
}

impl fmt::Debug for TaskEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskEntry::Native(func) => write!(f, "Native({:p})", *func as *const ()),
            #[cfg(feature = "ffi")]
            TaskEntry::Foreign(func) => write!(f, "Foreign({:p})", *func as *const ()),
        }
    }
}

/// Registry slot index; registration order is scheduling order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    /// Slot index in the registry
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Task scheduling state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting to be picked by the dispatcher
    Ready,
    /// Function is executing right now
    Running,
    /// Waiting for `delay_ticks` to run out
    Blocked,
}

/// Task control entry
///
/// The stack area is reserved space only. Tasks return to the dispatcher
/// instead of being switched out, so nothing is ever saved there.
#[derive(Clone, Copy)]
pub struct Task {
    /// Task function (None in unused slots)
    pub func: Option<TaskEntry>,
    /// Current state
    pub state: TaskState,
    /// Ticks left while blocked
    pub delay_ticks: u32,
    /// Completed invocations
    pub run_count: u32,
    /// Reserved execution stack
    stack: [u32; STACK_WORDS],
}

impl Task {
    /// Inert slot: no function, Ready, no delay
    pub const fn empty() -> Self {
        Self {
            func: None,
            state: TaskState::Ready,
            delay_ticks: 0,
            run_count: 0,
            stack: [0u32; STACK_WORDS],
        }
    }

    /// Fresh entry for a newly registered function
    pub const fn new(func: TaskEntry) -> Self {
        Self {
            func: Some(func),
            state: TaskState::Ready,
            delay_ticks: 0,
            run_count: 0,
            stack: [0u32; STACK_WORDS],
        }
    }

    /// Can the dispatcher pick this task?
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state == TaskState::Ready
    }

    /// Is this task waiting on a delay?
    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.state == TaskState::Blocked
    }

    /// Reserved stack area
    pub fn reserved_stack(&self) -> &[u32] {
        &self.stack
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("func", &self.func)
            .field("state", &self.state)
            .field("delay_ticks", &self.delay_ticks)
            .field("run_count", &self.run_count)
            .finish_non_exhaustive()
    }
}
