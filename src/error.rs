//! Kernel error types
//!
//! The only runtime failure is running out of task slots. Idle is not an
//! error, and a delay requested outside a task is a caller bug.
//!
//! Author: Moroya Sakamoto

use core::fmt;

/// Result type for kernel operations
pub type Result<T> = core::result::Result<T, RtosError>;

/// Kernel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtosError {
    /// Every task slot is taken; the registry was not modified
    CapacityExceeded {
        /// Slot count of the registry
        capacity: usize,
    },
}

impl fmt::Display for RtosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtosError::CapacityExceeded { capacity } => {
                write!(f, "task capacity exceeded ({capacity} slots)")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RtosError {}
