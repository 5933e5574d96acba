//! Error taxonomies for the simulator core.

use thiserror::Error;

/// Synchronous architectural exceptions, recorded on processor state.
///
/// The numeric codes are visible to guest code through the exception
/// register, so they are part of the binary interface.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    #[error("address misaligned on load")]
    AddrMisalignedLoad,
    #[error("address misaligned on store")]
    AddrMisalignedStore,
    #[error("address misaligned on fetch")]
    AddrMisalignedFetch,
    #[error("system call")]
    Syscall,
    #[error("reserved instruction")]
    ReservedInstruction,
    #[error("integer overflow")]
    AluOverflow,
    #[error("trap")]
    Trap,
    #[error("misaligned floating point register pair")]
    FpMisaligned,
    #[error("IEEE 754 floating point exception")]
    FpIeee754,
}

impl Exception {
    /// Architectural cause code.
    pub fn code(self) -> u32 {
        match self {
            Exception::AddrMisalignedLoad => 4,
            Exception::AddrMisalignedStore => 5,
            Exception::AddrMisalignedFetch => 6,
            Exception::Syscall => 8,
            Exception::ReservedInstruction => 10,
            Exception::AluOverflow => 12,
            Exception::Trap => 13,
            Exception::FpMisaligned => 14,
            Exception::FpIeee754 => 15,
        }
    }
}

/// Memory port error taxonomy.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemError {
    #[error("access to protected address")]
    Protected,
    #[error("misaligned access")]
    Misaligned,
    #[error("invalid address")]
    Invalid,
    #[error("internal memory system error")]
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_codes_are_stable() {
        assert_eq!(Exception::AddrMisalignedLoad.code(), 4);
        assert_eq!(Exception::AddrMisalignedStore.code(), 5);
        assert_eq!(Exception::AddrMisalignedFetch.code(), 6);
        assert_eq!(Exception::Syscall.code(), 8);
        assert_eq!(Exception::ReservedInstruction.code(), 10);
        assert_eq!(Exception::AluOverflow.code(), 12);
    }
}
