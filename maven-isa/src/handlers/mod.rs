//! Generic instruction handlers.
//!
//! Every handler is a free function over `C: Core`, so the same code
//! drives the control processor and the vector lanes. Handlers record
//! microarchitectural notes for the issue-timing model as a side effect.

pub mod cop1;
pub mod misc;
pub mod opcode;
pub mod regimm;
pub mod special;
pub mod special2;

use maven_core::error::Exception;

use crate::dispatch::Entry;
use crate::insn::InstructionWord;
use crate::state::{AluClass, Core};

pub fn reserved<C: Core>(_w: InstructionWord, c: &mut C) {
    c.state_mut().raise(Exception::ReservedInstruction);
}

pub fn reserved_dis(w: InstructionWord) -> String {
    format!(".word {:#010x}", w.bits())
}

/// Fallback leaf installed in every fresh dispatch slot.
pub fn fallback<C: Core>() -> Entry<C> {
    Entry {
        execute: reserved::<C>,
        disassemble: reserved_dis,
    }
}

/// Base-plus-offset effective address.
pub(crate) fn ea<C: Core>(w: InstructionWord, c: &C) -> u32 {
    c.state()
        .read_register(w.rs())
        .wrapping_add(w.simm() as u32)
}

pub(crate) fn note_rrr<C: Core>(c: &mut C, alu: AluClass, rs: usize, rt: usize, rd: usize) {
    let n = &mut c.state_mut().note;
    n.alu = Some(alu);
    n.rs = rs;
    n.rt = rt;
    n.rd = rd;
    n.b_rs = true;
    n.b_rt = true;
    n.b_rd = true;
}

pub(crate) fn note_rd<C: Core>(c: &mut C, alu: AluClass, rs: usize, rd: usize) {
    let n = &mut c.state_mut().note;
    n.alu = Some(alu);
    n.rs = rs;
    n.rd = rd;
    n.b_rs = true;
    n.b_rd = true;
}

pub(crate) fn note_load<C: Core>(c: &mut C, rs: usize, rt: usize) {
    let n = &mut c.state_mut().note;
    n.alu = Some(AluClass::Ld);
    n.rs = rs;
    n.rd = rt;
    n.b_rs = true;
    n.b_rd = true;
}

pub(crate) fn note_store<C: Core>(c: &mut C, rs: usize, rt: usize) {
    let n = &mut c.state_mut().note;
    n.alu = Some(AluClass::St);
    n.rs = rs;
    n.rt = rt;
    n.b_rs = true;
    n.b_rt = true;
}

pub(crate) fn note_branch<C: Core>(c: &mut C, rs: usize, rt: usize, uses_rt: bool) {
    let n = &mut c.state_mut().note;
    n.inst_branch = true;
    n.alu = Some(AluClass::Int);
    n.rs = rs;
    n.rt = rt;
    n.b_rs = true;
    n.b_rt = uses_rt;
}

pub(crate) fn note_jump<C: Core>(c: &mut C) {
    let n = &mut c.state_mut().note;
    n.inst_jump = true;
    n.alu = Some(AluClass::Int);
}
