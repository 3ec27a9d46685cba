//! System tick counter
//!
//! Counts ticks delivered by the external periodic timer (SysTick on
//! Cortex-M, MTIME on RISC-V). The tick rate is only used to convert
//! milliseconds to ticks; scheduling itself works in whole ticks.
//!
//! Author: Moroya Sakamoto

/// Default tick rate (1 kHz, one tick per millisecond)
pub const DEFAULT_TICK_HZ: u32 = 1_000;

/// System tick counter
///
/// Size: 12 bytes
pub struct SysTimer {
    /// Ticks since start (wraps)
    ticks: u32,
    /// Tick rate in Hz
    tick_hz: u32,
    /// Overflow count
    overflows: u32,
}

impl SysTimer {
    /// Create a tick counter for a timer firing `tick_hz` times per second
    ///
    /// A rate of zero is treated as 1 Hz.
    pub const fn new(tick_hz: u32) -> Self {
        Self {
            ticks: 0,
            tick_hz: if tick_hz == 0 { 1 } else { tick_hz },
            overflows: 0,
        }
    }

    /// Count one tick
    #[inline]
    pub fn tick(&mut self) {
        let new = self.ticks.wrapping_add(1);
        if new < self.ticks {
            self.overflows = self.overflows.wrapping_add(1);
        }
        self.ticks = new;
    }

    /// Ticks since start
    #[inline]
    pub fn now_ticks(&self) -> u32 {
        self.ticks
    }

    /// Milliseconds since start, overflow-aware
    pub fn now_ms(&self) -> u64 {
        let total = ((self.overflows as u64) << 32) | self.ticks as u64;
        total.saturating_mul(1000) / self.tick_hz as u64
    }

    /// Ticks covering at least `ms` milliseconds (rounded up)
    pub fn ms_to_ticks(&self, ms: u32) -> u32 {
        let ticks = (ms as u64 * self.tick_hz as u64).div_ceil(1000);
        ticks.min(u32::MAX as u64) as u32
    }

    /// Reset counter
    pub fn reset(&mut self) {
        self.ticks = 0;
        self.overflows = 0;
    }

    /// Tick rate in Hz
    pub fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    /// Number of overflows
    pub fn overflows(&self) -> u32 {
        self.overflows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate_timer() {
        let mut timer = SysTimer::new(DEFAULT_TICK_HZ);
        assert_eq!(timer.now_ticks(), 0);
        for _ in 0..1500 {
            timer.tick();
        }
        assert_eq!(timer.now_ticks(), 1500);
        assert_eq!(timer.now_ms(), 1500);
    }

    #[test]
    fn test_ms_to_ticks_rounds_up() {
        let timer = SysTimer::new(100);
        assert_eq!(timer.ms_to_ticks(0), 0);
        assert_eq!(timer.ms_to_ticks(10), 1);
        assert_eq!(timer.ms_to_ticks(11), 2);
        assert_eq!(timer.ms_to_ticks(1000), 100);
    }

    #[test]
    fn test_zero_rate_clamped() {
        let timer = SysTimer::new(0);
        assert_eq!(timer.tick_hz(), 1);
    }

    #[test]
    fn test_wraparound() {
        let mut timer = SysTimer::new(DEFAULT_TICK_HZ);
        timer.ticks = u32::MAX;
        timer.tick();
        assert_eq!(timer.now_ticks(), 0);
        assert_eq!(timer.overflows(), 1);
    }

    #[test]
    fn test_timer_reset() {
        let mut timer = SysTimer::new(DEFAULT_TICK_HZ);
        timer.tick();
        timer.reset();
        assert_eq!(timer.now_ticks(), 0);
        assert_eq!(timer.overflows(), 0);
    }
}
