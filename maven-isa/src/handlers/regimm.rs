//! REGIMM rt-field handlers: compare-against-zero branches and the
//! trap-immediate group.

use maven_core::error::Exception;

use crate::insn::InstructionWord;
use crate::names::REG_NAMES;
use crate::state::Core;

use super::note_branch;

pub fn bltz<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if (s.read_register(w.rs()) as i32) < 0 {
        s.take_branch(w.simm());
    }
    note_branch(c, w.rs(), 0, false);
}

pub fn bltz_dis(w: InstructionWord) -> String {
    format!("bltz {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn bgez<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if (s.read_register(w.rs()) as i32) >= 0 {
        s.take_branch(w.simm());
    }
    note_branch(c, w.rs(), 0, false);
}

pub fn bgez_dis(w: InstructionWord) -> String {
    format!("bgez {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn bltzl<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if (s.read_register(w.rs()) as i32) < 0 {
        s.take_branch(w.simm());
    } else {
        s.nullify = true;
    }
}

pub fn bltzl_dis(w: InstructionWord) -> String {
    format!("bltzl {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn bgezl<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if (s.read_register(w.rs()) as i32) >= 0 {
        s.take_branch(w.simm());
    } else {
        s.nullify = true;
    }
}

pub fn bgezl_dis(w: InstructionWord) -> String {
    format!("bgezl {},{}", REG_NAMES[w.rs()], w.simm())
}

/// Linked variants only write ra on the taken path.
pub fn bltzal<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if (s.read_register(w.rs()) as i32) < 0 {
        let link = s.pc.wrapping_add(8);
        s.write_register(31, link);
        s.take_branch(w.simm());
    }
}

pub fn bltzal_dis(w: InstructionWord) -> String {
    format!("bltzal {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn bgezal<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if (s.read_register(w.rs()) as i32) >= 0 {
        let link = s.pc.wrapping_add(8);
        s.write_register(31, link);
        s.take_branch(w.simm());
    }
}

pub fn bgezal_dis(w: InstructionWord) -> String {
    format!("bgezal {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn bltzall<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if (s.read_register(w.rs()) as i32) < 0 {
        let link = s.pc.wrapping_add(8);
        s.write_register(31, link);
        s.take_branch(w.simm());
    } else {
        s.nullify = true;
    }
}

pub fn bltzall_dis(w: InstructionWord) -> String {
    format!("bltzall {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn bgezall<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if (s.read_register(w.rs()) as i32) >= 0 {
        let link = s.pc.wrapping_add(8);
        s.write_register(31, link);
        s.take_branch(w.simm());
    } else {
        s.nullify = true;
    }
}

pub fn bgezall_dis(w: InstructionWord) -> String {
    format!("bgezall {},{}", REG_NAMES[w.rs()], w.simm())
}

fn trap_if<C: Core>(c: &mut C, cond: bool) {
    if cond {
        c.state_mut().raise(Exception::Trap);
    }
}

pub fn tgei<C: Core>(w: InstructionWord, c: &mut C) {
    let cond = (c.state().read_register(w.rs()) as i32) >= w.simm();
    trap_if(c, cond);
}

pub fn tgei_dis(w: InstructionWord) -> String {
    format!("tgei {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn tgeiu<C: Core>(w: InstructionWord, c: &mut C) {
    let cond = c.state().read_register(w.rs()) >= w.simm() as u32;
    trap_if(c, cond);
}

pub fn tgeiu_dis(w: InstructionWord) -> String {
    format!("tgeiu {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn tlti<C: Core>(w: InstructionWord, c: &mut C) {
    let cond = (c.state().read_register(w.rs()) as i32) < w.simm();
    trap_if(c, cond);
}

pub fn tlti_dis(w: InstructionWord) -> String {
    format!("tlti {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn tltiu<C: Core>(w: InstructionWord, c: &mut C) {
    let cond = c.state().read_register(w.rs()) < w.simm() as u32;
    trap_if(c, cond);
}

pub fn tltiu_dis(w: InstructionWord) -> String {
    format!("tltiu {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn teqi<C: Core>(w: InstructionWord, c: &mut C) {
    let cond = (c.state().read_register(w.rs()) as i32) == w.simm();
    trap_if(c, cond);
}

pub fn teqi_dis(w: InstructionWord) -> String {
    format!("teqi {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn tnei<C: Core>(w: InstructionWord, c: &mut C) {
    let cond = (c.state().read_register(w.rs()) as i32) != w.simm();
    trap_if(c, cond);
}

pub fn tnei_dis(w: InstructionWord) -> String {
    format!("tnei {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn synci_dis(w: InstructionWord) -> String {
    format!("synci {}({})", w.simm(), REG_NAMES[w.rs()])
}
