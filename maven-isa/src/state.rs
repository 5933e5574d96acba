//! Scalar processor core state and the fetch/execute step loop.

use log::{error, trace};
use maven_core::error::{Exception, MemError};
use maven_core::mem::SharedMem;
use maven_core::types::{Addr, Reg, RunState};

use crate::dispatch::DispatchTable;
use crate::fpu::Fpu;
use crate::insn::InstructionWord;

/// Functional unit classes noted by handlers for the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluClass {
    Int,
    IDivRem,
    IMul,
    FAddSub,
    FDiv,
    FMul,
    FSqrt,
    Ld,
    St,
    VLd,
    VSt,
}

/// Per-instruction microarchitectural notes, instrumentation only.
#[derive(Debug, Clone, Copy, Default)]
pub struct UarchNote {
    pub inst_branch: bool,
    pub inst_jump: bool,
    pub alu: Option<AluClass>,
    pub rs: usize,
    pub rt: usize,
    pub rd: usize,
    pub b_rs: bool,
    pub b_rt: bool,
    pub b_rd: bool,
}

/// Architectural state common to the control processor and vector lanes.
///
/// FP values share the general register file: a single occupies one
/// register, a double the even/odd pair with the low word at the even
/// index.
pub struct CoreState {
    pub r: [Reg; 32],
    pub pc: Addr,
    pub npc: Addr,
    pub hi: Reg,
    pub lo: Reg,
    pub branch: bool,
    pub nullify: bool,
    pub exception: Option<Exception>,
    pub runstate: RunState,
    /// FP compares write a lane flag register instead of a GPR when set.
    pub flag_mode: bool,
    pub fpu: Fpu,
    pub mem: SharedMem,
    pub note: UarchNote,
}

impl CoreState {
    pub fn new(mem: SharedMem) -> Self {
        Self {
            r: [0; 32],
            pc: 0,
            npc: 4,
            hi: 0,
            lo: 0,
            branch: false,
            nullify: false,
            exception: None,
            runstate: RunState::Stopped,
            flag_mode: false,
            fpu: Fpu::new(),
            mem,
            note: UarchNote::default(),
        }
    }

    pub fn reset(&mut self) {
        self.r = [0; 32];
        self.pc = 0;
        self.npc = 4;
        self.hi = 0;
        self.lo = 0;
        self.branch = false;
        self.nullify = false;
        self.exception = None;
        self.runstate = RunState::Stopped;
        self.fpu = Fpu::new();
        self.note = UarchNote::default();
    }

    pub fn read_register(&self, idx: usize) -> Reg {
        if idx == 0 {
            0
        } else {
            self.r[idx]
        }
    }

    pub fn write_register(&mut self, idx: usize, val: Reg) {
        if idx != 0 {
            self.r[idx] = val;
        }
    }

    pub fn read_register_s(&self, idx: usize) -> f32 {
        f32::from_bits(self.read_register(idx))
    }

    pub fn write_register_s(&mut self, idx: usize, val: f32) {
        self.write_register(idx, val.to_bits());
    }

    pub fn read_register_d(&self, idx: usize) -> f64 {
        let lo = self.read_register(idx) as u64;
        let hi = self.read_register(idx + 1) as u64;
        f64::from_bits((hi << 32) | lo)
    }

    pub fn write_register_d(&mut self, idx: usize, val: f64) {
        let bits = val.to_bits();
        self.write_register(idx, bits as u32);
        self.write_register(idx + 1, (bits >> 32) as u32);
    }

    pub fn read_register_w(&self, idx: usize) -> i32 {
        self.read_register(idx) as i32
    }

    pub fn write_register_w(&mut self, idx: usize, val: i32) {
        self.write_register(idx, val as u32);
    }

    /// Records a pending exception. The core keeps running; only eret
    /// redirects control.
    pub fn raise(&mut self, cause: Exception) {
        trace!("exception {:?} at pc {:#010x}", cause, self.pc);
        self.exception = Some(cause);
    }

    pub fn stop(&mut self) {
        self.runstate = RunState::Stopped;
    }

    /// Taken branch: the delay slot executes next, the target after it.
    /// The offset is in instruction words relative to the delay slot.
    pub fn take_branch(&mut self, offset: i32) {
        self.branch = true;
        self.pc = self.npc;
        self.npc = self.npc.wrapping_add((offset << 2) as u32);
    }

    /// Taken jump to an absolute target, same delay mechanics.
    pub fn jump_to(&mut self, target: Addr) {
        self.branch = true;
        self.pc = self.npc;
        self.npc = target;
    }

    fn mem_fault(&mut self, what: &str, addr: Addr, err: MemError) {
        error!("{} at {:#010x} failed: {}", what, addr, err);
    }

    pub fn load_u8(&mut self, addr: Addr) -> Option<u8> {
        match self.mem.clone().read().read_u8(addr) {
            Ok(v) => Some(v),
            Err(e) => {
                self.mem_fault("load", addr, e);
                None
            }
        }
    }

    pub fn load_u16(&mut self, addr: Addr) -> Option<u16> {
        if addr & 0x1 != 0 {
            self.raise(Exception::AddrMisalignedLoad);
            return None;
        }
        match self.mem.clone().read().read_u16(addr) {
            Ok(v) => Some(v),
            Err(e) => {
                self.mem_fault("load", addr, e);
                None
            }
        }
    }

    pub fn load_u32(&mut self, addr: Addr) -> Option<u32> {
        if addr & 0x3 != 0 {
            self.raise(Exception::AddrMisalignedLoad);
            return None;
        }
        match self.mem.clone().read().read_u32(addr) {
            Ok(v) => Some(v),
            Err(e) => {
                self.mem_fault("load", addr, e);
                None
            }
        }
    }

    pub fn store_u8(&mut self, addr: Addr, val: u8) {
        if let Err(e) = self.mem.clone().write().write_u8(addr, val) {
            self.mem_fault("store", addr, e);
        }
    }

    pub fn store_u16(&mut self, addr: Addr, val: u16) {
        if addr & 0x1 != 0 {
            self.raise(Exception::AddrMisalignedStore);
            return;
        }
        if let Err(e) = self.mem.clone().write().write_u16(addr, val) {
            self.mem_fault("store", addr, e);
        }
    }

    pub fn store_u32(&mut self, addr: Addr, val: u32) {
        if addr & 0x3 != 0 {
            self.raise(Exception::AddrMisalignedStore);
            return;
        }
        if let Err(e) = self.mem.clone().write().write_u32(addr, val) {
            self.mem_fault("store", addr, e);
        }
    }
}

/// Interface the generic instruction handlers run against. The control
/// processor and the vector lanes both implement it; lane-only facilities
/// have scalar-core defaults.
pub trait Core {
    fn state(&self) -> &CoreState;
    fn state_mut(&mut self) -> &mut CoreState;

    /// Lane index; control processors report -1 like the hardware.
    fn vp_index(&self) -> i32 {
        -1
    }

    /// Vector lane flag registers. Scalar cores have none.
    fn read_flag(&self, _idx: usize) -> bool {
        false
    }

    fn write_flag(&mut self, _idx: usize, _val: bool) {}

    /// Syscall hook; the control processor saves the exception pc.
    fn syscall(&mut self) {
        self.state_mut().raise(Exception::Syscall);
    }
}

impl Core for CoreState {
    fn state(&self) -> &CoreState {
        self
    }

    fn state_mut(&mut self) -> &mut CoreState {
        self
    }
}

/// Executes one instruction: fetch at pc, dispatch, advance. A taken
/// branch has already advanced pc into the delay slot, so the loop only
/// advances when the handler did not.
pub fn step<C: Core>(core: &mut C, table: &DispatchTable<C>) {
    let fetch = {
        let s = core.state_mut();
        s.branch = false;
        s.note = UarchNote::default();
        if s.pc & 0x3 != 0 {
            s.raise(Exception::AddrMisalignedFetch);
            s.stop();
            return;
        }
        let pc = s.pc;
        s.mem.clone().read().read_u32(pc)
    };
    let word = match fetch {
        Ok(bits) => InstructionWord::new(bits),
        Err(e) => {
            let s = core.state_mut();
            error!("fetch at {:#010x} failed: {}", s.pc, e);
            s.raise(Exception::AddrMisalignedFetch);
            s.stop();
            return;
        }
    };

    if core.state().nullify {
        // Likely branch fell through: skip the delay slot's effects.
        core.state_mut().nullify = false;
    } else {
        table.execute(word, core);
    }

    let s = core.state_mut();
    if !s.branch {
        s.pc = s.npc;
        s.npc = s.npc.wrapping_add(4);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maven_core::mem::MemoryImage;

    fn state() -> CoreState {
        CoreState::new(MemoryImage::shared(4096))
    }

    #[test]
    fn register_zero_is_wired() {
        let mut s = state();
        s.write_register(0, 123);
        assert_eq!(s.read_register(0), 0);
        s.write_register(5, 123);
        assert_eq!(s.read_register(5), 123);
    }

    #[test]
    fn double_register_pair_layout() {
        let mut s = state();
        s.write_register_d(2, 1.5f64);
        let bits = 1.5f64.to_bits();
        assert_eq!(s.read_register(2), bits as u32);
        assert_eq!(s.read_register(3), (bits >> 32) as u32);
        assert_eq!(s.read_register_d(2), 1.5f64);
    }

    #[test]
    fn take_branch_enters_delay_slot() {
        let mut s = state();
        s.pc = 0;
        s.npc = 4;
        s.take_branch(2);
        assert!(s.branch);
        assert_eq!(s.pc, 4);
        assert_eq!(s.npc, 12);
    }

    #[test]
    fn misaligned_load_raises() {
        let mut s = state();
        assert_eq!(s.load_u32(2), None);
        assert_eq!(s.exception, Some(Exception::AddrMisalignedLoad));
    }
}
