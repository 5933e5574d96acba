//! The scalar control processor of one core.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use maven_core::config::PvfbPolicy;
use maven_core::context::SimContext;
use maven_core::error::Exception;
use maven_core::mem::SharedMem;
use maven_core::types::{Addr, Reg, RunState};
use maven_isa::{Core, CoreState};
use maven_vector::VpArray;

/// Control processor state: the scalar core, the exception pc, the COP0
/// identity registers, and the vector lane array it commands.
pub struct Cp {
    pub core: CoreState,
    pub vparray: VpArray,
    pub epc: Addr,
    pub proc_id: u32,
    pub stats_en: bool,
    /// Host channel registers, written by the guest via mtc0.
    pub tohost: u32,
    pub fromhost: u32,
    tid_mask: Arc<AtomicU32>,
    ctx: Arc<SimContext>,
}

impl Cp {
    pub fn new(
        mem: SharedMem,
        ctx: Arc<SimContext>,
        tid_mask: Arc<AtomicU32>,
        proc_id: u32,
        policy: PvfbPolicy,
    ) -> Self {
        Self {
            core: CoreState::new(mem.clone()),
            vparray: VpArray::new(mem, policy),
            epc: 0,
            proc_id,
            stats_en: false,
            tohost: 0,
            fromhost: 0,
            tid_mask,
            ctx,
        }
    }

    /// Points the processor at an entry point and marks it runnable.
    pub fn go(&mut self, entry: Addr) {
        self.core.pc = entry;
        self.core.npc = entry.wrapping_add(4);
        self.core.branch = false;
        self.core.nullify = false;
        self.core.runstate = RunState::Running;
    }

    pub fn is_running(&self) -> bool {
        self.core.runstate == RunState::Running
    }

    pub fn cop0_count(&self) -> u64 {
        self.ctx.cop0_count()
    }

    pub fn tid_mask(&self) -> u32 {
        self.tid_mask.load(Ordering::Relaxed)
    }

    /// mtc0 to the thread mask; bit 0 stays set so core 0 cannot park
    /// itself.
    pub fn set_tid_mask(&self, val: u32) {
        self.tid_mask.store(val | 0x1, Ordering::Relaxed);
    }

    /// mtc0 to the stop register clears this core's own mask bit. Core 0
    /// is not stoppable this way.
    pub fn tid_stop(&self) -> bool {
        if self.proc_id == 0 {
            return false;
        }
        self.tid_mask
            .fetch_and(!(1 << self.proc_id), Ordering::Relaxed);
        true
    }

    pub fn set_stats_en(&mut self, en: bool) {
        self.stats_en = en;
        self.vparray.set_stats(en);
    }

    /// Exit value convention: v0 at stop.
    pub fn exit_value(&self) -> Reg {
        self.core.read_register(2)
    }
}

impl Core for Cp {
    fn state(&self) -> &CoreState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut CoreState {
        &mut self.core
    }

    /// Saves the resume point so eret continues after the syscall.
    fn syscall(&mut self) {
        self.epc = self.core.pc.wrapping_add(4);
        self.core.raise(Exception::Syscall);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maven_core::mem::MemoryImage;

    fn cp() -> Cp {
        Cp::new(
            MemoryImage::shared(1024),
            SimContext::new(),
            Arc::new(AtomicU32::new(0x1)),
            1,
            PvfbPolicy::Stack,
        )
    }

    #[test]
    fn syscall_saves_resume_pc() {
        let mut c = cp();
        c.core.pc = 0x40;
        c.syscall();
        assert_eq!(c.epc, 0x44);
        assert_eq!(c.core.exception, Some(Exception::Syscall));
    }

    #[test]
    fn tid_mask_keeps_bit_zero() {
        let c = cp();
        c.set_tid_mask(0x6);
        assert_eq!(c.tid_mask(), 0x7);
        assert!(c.tid_stop());
        assert_eq!(c.tid_mask(), 0x5);
    }

    #[test]
    fn core_zero_ignores_tid_stop() {
        let mut c = cp();
        c.proc_id = 0;
        c.set_tid_mask(0x3);
        assert!(!c.tid_stop());
        assert_eq!(c.tid_mask(), 0x3);
    }
}
