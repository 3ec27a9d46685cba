//! Cooperative RTOS — round-robin task scheduler for one core
//!
//! Minimal kernel for small microcontrollers:
//! - Static task table (no heap, no allocation)
//! - Tick-driven delays: a task blocks for N ticks, the timer ISR wakes it
//! - Round-robin dispatch in registration order, no priorities
//! - Tasks run to completion; nothing is preempted
//!
//! Author: Moroya Sakamoto

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod error;
pub mod task;
pub mod registry;
pub mod scheduler;
pub mod timer;
pub mod kernel;
#[cfg(feature = "ffi")]
pub mod ffi;

// critical-section implementations
#[cfg(feature = "cortex-m")]
use cortex_m as _;
#[cfg(feature = "riscv")]
use riscv as _;

pub use error::{Result, RtosError};
pub use task::{Task, TaskEntry, TaskFn, TaskId, TaskState, DEFAULT_MAX_TASKS, STACK_WORDS};
pub use registry::TaskRegistry;
pub use scheduler::Scheduler;
pub use timer::SysTimer;
pub use kernel::{Kernel, KernelStats};
