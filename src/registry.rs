//! Task registry — fixed-capacity table of task control entries
//!
//! Slots are filled in registration order and never removed. Slots past
//! `count` are inert: nothing scans them, ticks skip them.
//!
//! Author: Moroya Sakamoto

use crate::error::{Result, RtosError};
use crate::task::{Task, TaskEntry, TaskId, TaskState, DEFAULT_MAX_TASKS};

/// Static task table, no dynamic allocation
///
/// Size: N × sizeof(Task) ≈ N × 1 KB (reserved stacks dominate)
pub struct TaskRegistry<const N: usize = DEFAULT_MAX_TASKS> {
    /// Task slots
    tasks: [Task; N],
    /// Number of registered tasks
    count: usize,
}

impl<const N: usize> TaskRegistry<N> {
    /// Create empty registry
    pub const fn new() -> Self {
        Self {
            tasks: [Task::empty(); N],
            count: 0,
        }
    }

    /// Reset every slot and forget all registrations
    ///
    /// Only valid before the dispatch loop starts.
    pub fn initialize(&mut self) {
        self.tasks = [Task::empty(); N];
        self.count = 0;
    }

    /// Append a task, returns its id
    ///
    /// Registration order is the round-robin scan order.
    pub fn register(&mut self, func: TaskEntry) -> Result<TaskId> {
        if self.count >= N {
            return Err(RtosError::CapacityExceeded { capacity: N });
        }
        let id = TaskId(self.count);
        self.tasks[id.index()] = Task::new(func);
        self.count += 1;
        Ok(id)
    }

    /// Block a task for `ticks` ticks
    ///
    /// `ticks == 0` still blocks: the task wakes on the next tick.
    pub fn mark_blocked(&mut self, id: TaskId, ticks: u32) {
        if let Some(task) = self.get_mut(id) {
            task.delay_ticks = ticks;
            task.state = TaskState::Blocked;
        }
    }

    /// Count one tick down on every blocked task
    ///
    /// A blocked task whose counter is (or becomes) zero is made Ready.
    /// Returns how many tasks were unblocked.
    pub fn advance_tick(&mut self) -> usize {
        let mut woken = 0;
        for task in self.tasks[..self.count].iter_mut() {
            if task.state != TaskState::Blocked {
                continue;
            }
            if task.delay_ticks > 0 {
                task.delay_ticks -= 1;
            }
            if task.delay_ticks == 0 {
                task.state = TaskState::Ready;
                woken += 1;
            }
        }
        woken
    }

    /// Get task by id
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks[..self.count].get(id.index())
    }

    /// Get mutable task by id
    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks[..self.count].get_mut(id.index())
    }

    /// Registered tasks, in registration order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks[..self.count]
    }

    /// Number of registered tasks
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// No tasks registered?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Slot count
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of tasks in `state`
    pub fn count_in(&self, state: TaskState) -> usize {
        self.tasks().iter().filter(|t| t.state == state).count()
    }
}

impl<const N: usize> Default for TaskRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_task() {}

    fn entry() -> TaskEntry {
        TaskEntry::Native(dummy_task)
    }

    #[test]
    fn test_registry_empty() {
        let reg: TaskRegistry = TaskRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.capacity(), DEFAULT_MAX_TASKS);
        assert!(reg.get(TaskId(0)).is_none());
    }

    #[test]
    fn test_register_in_order() {
        let mut reg: TaskRegistry = TaskRegistry::new();
        assert_eq!(reg.register(entry()), Ok(TaskId(0)));
        assert_eq!(reg.register(entry()), Ok(TaskId(1)));
        assert_eq!(reg.len(), 2);
        assert!(reg.tasks().iter().all(|t| t.is_ready()));
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut reg: TaskRegistry<2> = TaskRegistry::new();
        reg.register(entry()).unwrap();
        reg.register(entry()).unwrap();

        let err = reg.register(entry());
        assert_eq!(err, Err(RtosError::CapacityExceeded { capacity: 2 }));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_initialize_resets() {
        let mut reg: TaskRegistry = TaskRegistry::new();
        let id = reg.register(entry()).unwrap();
        reg.mark_blocked(id, 5);

        reg.initialize();
        assert!(reg.is_empty());
        assert_eq!(reg.register(entry()), Ok(TaskId(0)));
        let task = reg.get(TaskId(0)).unwrap();
        assert_eq!(task.state, TaskState::Ready);
        assert_eq!(task.delay_ticks, 0);
    }

    #[test]
    fn test_delay_counts_down() {
        let mut reg: TaskRegistry = TaskRegistry::new();
        let id = reg.register(entry()).unwrap();
        reg.mark_blocked(id, 3);

        assert_eq!(reg.advance_tick(), 0);
        assert_eq!(reg.get(id).unwrap().delay_ticks, 2);
        assert_eq!(reg.advance_tick(), 0);
        assert!(reg.get(id).unwrap().is_blocked());
        assert_eq!(reg.advance_tick(), 1);
        assert!(reg.get(id).unwrap().is_ready());
    }

    #[test]
    fn test_zero_delay_wakes_on_next_tick() {
        let mut reg: TaskRegistry = TaskRegistry::new();
        let id = reg.register(entry()).unwrap();
        reg.mark_blocked(id, 0);
        assert!(reg.get(id).unwrap().is_blocked());

        assert_eq!(reg.advance_tick(), 1);
        assert!(reg.get(id).unwrap().is_ready());
    }

    #[test]
    fn test_tick_ignores_ready_and_running() {
        let mut reg: TaskRegistry = TaskRegistry::new();
        let a = reg.register(entry()).unwrap();
        let b = reg.register(entry()).unwrap();
        reg.get_mut(b).unwrap().state = TaskState::Running;

        reg.advance_tick();
        assert_eq!(reg.get(a).unwrap().state, TaskState::Ready);
        assert_eq!(reg.get(b).unwrap().state, TaskState::Running);
    }

    #[test]
    fn test_unregistered_slot_is_inert() {
        let mut reg: TaskRegistry = TaskRegistry::new();
        reg.register(entry()).unwrap();
        reg.mark_blocked(TaskId(2), 1);
        assert!(reg.get(TaskId(2)).is_none());
        assert_eq!(reg.count_in(TaskState::Blocked), 0);
    }
}
