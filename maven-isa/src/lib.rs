//! MIPS32 instruction decoding, dispatch and execution for the Maven
//! simulator. The handlers are generic over [`state::Core`], so the
//! control processor and the vector lanes share one implementation.

pub mod dispatch;
pub mod fpu;
pub mod handlers;
pub mod insn;
pub mod names;
pub mod opcodes;
pub mod state;
pub mod table;

pub use dispatch::{DisasmFn, DispatchTable, Entry, ExecFn};
pub use insn::InstructionWord;
pub use state::{step, AluClass, Core, CoreState, UarchNote};
pub use table::{add_misc_ops, build_mips32_table};
