//! Maven machine simulator: control processors with attached vector
//! lane arrays over one shared memory image.

pub mod cp;
pub mod maven_table;
pub mod simulator;

pub use cp::Cp;
pub use maven_table::build_cp_table;
pub use simulator::{SimError, Simulator};
