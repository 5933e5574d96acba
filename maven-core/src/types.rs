//! Primitive architectural types.

/// A 32-bit general purpose register value.
pub type Reg = u32;

/// A 32-bit physical address in the flat simulated address space.
pub type Addr = u32;

/// Processor run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

impl Default for RunState {
    fn default() -> Self {
        RunState::Stopped
    }
}
