//! System configuration constants shared with the target toolchain.
//!
//! These values are part of the guest binary interface and must not be
//! changed independently of the cross-compiled runtime.

/// Total size of the flat simulated memory.
pub const MEMORY_SIZE: usize = 0x1000_0000;

/// Minimum number of vector lanes an implementation may expose.
pub const VLEN_MIN: usize = 4;

/// Maximum number of vector lanes.
pub const VLEN_MAX: usize = 32;

/// Number of flag registers per vector lane.
pub const NUM_FLAG_REGS: usize = 8;

/// COP0 pseudo-register numbers.
pub mod cop0 {
    pub const COUNT_LO: u32 = 9;
    pub const COUNT_HI: u32 = 25;
    pub const CORE_ID: u32 = 17;
    pub const TID_MASK: u32 = 18;
    pub const TID_STOP: u32 = 19;
    pub const STATS_EN: u32 = 21;
    pub const TOHOST: u32 = 30;
    pub const FROMHOST: u32 = 31;
}

/// Syscall numbers the target runtime uses (recorded, not emulated).
pub mod syscall {
    pub const EXIT: u32 = 1;
    pub const READ: u32 = 2;
    pub const WRITE: u32 = 3;
    pub const OPEN: u32 = 4;
    pub const CLOSE: u32 = 5;
}
