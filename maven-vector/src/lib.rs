//! Maven vector unit: lanes, the pending-fragment divergence scheduler,
//! vector arithmetic/memory commands, and instrumentation.

pub mod frag;
pub mod lane;
pub mod pvfb;
pub mod scoreboard;
pub mod stats;
pub mod varray;

pub use frag::VectorFragment;
pub use lane::Lane;
pub use pvfb::{make_pvfb, Pvfb, PvfbDualStack, PvfbQueue, PvfbStack};
pub use scoreboard::{Scoreboard, ScoreboardStats};
pub use stats::DivergenceData;
pub use varray::{ElemWidth, VpArray};
