//! One vector lane: a scalar core plus flag registers and a lane index.

use maven_core::mem::SharedMem;
use maven_core::syscfg::NUM_FLAG_REGS;
use maven_core::types::{Addr, Reg, RunState};
use maven_isa::{Core, CoreState};

/// Vector lane state. Lanes run the scalar instruction set over private
/// registers; flag registers hold predicate bits, with flag 0 wired true
/// so unpredicated encodings always execute.
pub struct Lane {
    pub core: CoreState,
    flags: [bool; NUM_FLAG_REGS],
    index: i32,
    nregs: usize,
}

impl Lane {
    pub fn new(mem: SharedMem, index: usize) -> Self {
        let mut flags = [false; NUM_FLAG_REGS];
        flags[0] = true;
        Self {
            core: CoreState::new(mem),
            flags,
            index: index as i32,
            nregs: 32,
        }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Reconfigures the visible register-file size.
    pub fn vcfg(&mut self, nregs: usize) {
        self.nregs = nregs;
    }

    pub fn nregs(&self) -> usize {
        self.nregs
    }

    pub fn is_running(&self) -> bool {
        self.core.runstate == RunState::Running
    }

    /// Points the lane at a vector-fetched block and marks it runnable.
    pub fn start(&mut self, entry: Addr) {
        self.core.pc = entry;
        self.core.npc = entry.wrapping_add(4);
        self.core.branch = false;
        self.core.nullify = false;
        self.core.runstate = RunState::Running;
    }

    pub fn read_register(&self, idx: usize) -> Reg {
        self.core.read_register(idx)
    }

    pub fn write_register(&mut self, idx: usize, val: Reg) {
        self.core.write_register(idx, val);
    }
}

impl Core for Lane {
    fn state(&self) -> &CoreState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut CoreState {
        &mut self.core
    }

    fn vp_index(&self) -> i32 {
        self.index
    }

    fn read_flag(&self, idx: usize) -> bool {
        if idx == 0 {
            return true;
        }
        self.flags.get(idx).copied().unwrap_or(false)
    }

    fn write_flag(&mut self, idx: usize, val: bool) {
        if idx != 0 && idx < NUM_FLAG_REGS {
            self.flags[idx] = val;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maven_core::mem::MemoryImage;

    #[test]
    fn flag_zero_is_wired_true() {
        let mut lane = Lane::new(MemoryImage::shared(64), 3);
        assert!(lane.read_flag(0));
        lane.write_flag(0, false);
        assert!(lane.read_flag(0));
        lane.write_flag(2, true);
        assert!(lane.read_flag(2));
    }

    #[test]
    fn lane_reports_its_index() {
        let lane = Lane::new(MemoryImage::shared(64), 5);
        assert_eq!(lane.vp_index(), 5);
    }
}
