//! C ABI — drop-in entry points for C firmware
//!
//! Wraps one process-wide [`Kernel`] so an existing C main loop keeps its
//! shape: `rtos_init`, `rtos_create_task`, `rtos_start`, and
//! `rtos_tick_handler` called from the SysTick ISR.
//!
//! Author: Moroya Sakamoto

use crate::kernel::Kernel;
use crate::task::{ForeignTaskFn, TaskEntry};
use crate::timer::DEFAULT_TICK_HZ;

/// `rtos_create_task` result: every slot is taken
pub const RTOS_ERR_CAPACITY: i32 = -1;
/// `rtos_create_task` result: null task function
pub const RTOS_ERR_NULL: i32 = -2;

static KERNEL: Kernel = Kernel::new(DEFAULT_TICK_HZ);

/// Kernel behind the C entry points
pub fn kernel() -> &'static Kernel {
    &KERNEL
}

/// Reset the kernel; call once before creating tasks
#[no_mangle]
pub extern "C" fn rtos_init() {
    KERNEL.initialize();
}

/// Register a task, returns its slot index or a negative error code
#[no_mangle]
pub extern "C" fn rtos_create_task(task: Option<ForeignTaskFn>) -> i32 {
    let Some(func) = task else {
        return RTOS_ERR_NULL;
    };
    match KERNEL.register_entry(TaskEntry::Foreign(func)) {
        Ok(id) => id.index() as i32,
        Err(_) => RTOS_ERR_CAPACITY,
    }
}

/// Run the dispatch loop; returns only if no task was created
#[no_mangle]
pub extern "C" fn rtos_start() {
    KERNEL.start();
}

/// Block the calling task for `ticks` ticks (task context only)
#[no_mangle]
pub extern "C" fn rtos_delay(ticks: u32) {
    KERNEL.request_delay(ticks);
}

/// Give up the rest of the turn (no effect)
#[no_mangle]
pub extern "C" fn rtos_yield() {
    KERNEL.request_yield();
}

/// Tick entry point for the periodic timer interrupt
#[no_mangle]
pub extern "C" fn rtos_tick_handler() {
    KERNEL.on_tick();
}

/// Ticks since `rtos_init`
#[no_mangle]
pub extern "C" fn rtos_get_ticks() -> u32 {
    KERNEL.ticks()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskState;
    use crate::TaskId;
    use core::sync::atomic::{AtomicU32, Ordering};

    static CALLS: AtomicU32 = AtomicU32::new(0);

    extern "C" fn c_task() {
        CALLS.fetch_add(1, Ordering::SeqCst);
        rtos_delay(2);
    }

    extern "C" fn c_idle_task() {}

    #[test]
    fn test_c_api_lifecycle() {
        rtos_init();
        assert_eq!(rtos_create_task(None), RTOS_ERR_NULL);
        assert_eq!(rtos_create_task(Some(c_task)), 0);
        for _ in 1..4 {
            assert!(rtos_create_task(Some(c_idle_task)) > 0);
        }
        assert_eq!(rtos_create_task(Some(c_idle_task)), RTOS_ERR_CAPACITY);

        assert_eq!(kernel().dispatch(), Some(TaskId(0)));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(kernel().task_state(TaskId(0)), Some(TaskState::Blocked));

        rtos_tick_handler();
        rtos_tick_handler();
        assert_eq!(rtos_get_ticks(), 2);
        assert_eq!(kernel().task_state(TaskId(0)), Some(TaskState::Ready));

        rtos_init();
        assert_eq!(kernel().task_count(), 0);
        rtos_start();
    }
}
