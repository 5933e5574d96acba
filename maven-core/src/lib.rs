//! Shared value types, error taxonomies, memory image and simulation
//! context for the Maven instruction-set simulator.

pub mod config;
pub mod context;
pub mod error;
pub mod mem;
pub mod syscfg;
pub mod types;

pub use config::{PvfbPolicy, SimConfig};
pub use context::SimContext;
pub use error::{Exception, MemError};
pub use mem::{MemoryImage, SharedMem};
pub use types::{Addr, Reg, RunState};

/// Convenience re-exports for downstream crates.
pub mod api {
    pub use super::config::{PvfbPolicy, SimConfig};
    pub use super::context::SimContext;
    pub use super::error::{Exception, MemError};
    pub use super::mem::{MemoryImage, SharedMem};
    pub use super::types::{Addr, Reg, RunState};
}
