//! SPECIAL2 function-field handlers. Only mul, clz and clo are
//! implemented; the multiply-accumulate group decodes but traps.

use maven_core::error::Exception;

use crate::insn::InstructionWord;
use crate::names::REG_NAMES;
use crate::state::{AluClass, Core};

use super::note_rrr;

pub fn mul<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let product = s.read_register(w.rs()).wrapping_mul(s.read_register(w.rt()));
        s.write_register(w.rd(), product);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::IMul, w.rs(), w.rt(), w.rd());
}

pub fn mul_dis(w: InstructionWord) -> String {
    format!(
        "mul {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

/// Count leading zeros. The encoding repeats the destination in rt.
pub fn clz<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rt() == w.rd() {
        let val = s.read_register(w.rs()).leading_zeros();
        s.write_register(w.rd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn clz_dis(w: InstructionWord) -> String {
    format!("clz {},{}", REG_NAMES[w.rd()], REG_NAMES[w.rs()])
}

pub fn clo<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rt() == w.rd() {
        let val = s.read_register(w.rs()).leading_ones();
        s.write_register(w.rd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn clo_dis(w: InstructionWord) -> String {
    format!("clo {},{}", REG_NAMES[w.rd()], REG_NAMES[w.rs()])
}

pub fn madd_dis(_w: InstructionWord) -> String {
    "madd".to_string()
}

pub fn maddu_dis(_w: InstructionWord) -> String {
    "maddu".to_string()
}

pub fn msub_dis(_w: InstructionWord) -> String {
    "msub".to_string()
}

pub fn msubu_dis(_w: InstructionWord) -> String {
    "msubu".to_string()
}
