//! MISC opcode handlers: run control, atomic memory ops and the extra
//! scalar arithmetic shared by the control processor and the lanes.

use log::warn;
use maven_core::error::Exception;

use crate::insn::InstructionWord;
use crate::names::REG_NAMES;
use crate::state::{AluClass, Core};

use super::{note_rd, note_rrr};

/// Halts the executing core. The lanes use this to retire from a
/// vector-fetched block.
pub fn stop<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rs() == 0 && w.rt() == 0 && w.rd() == 0 && w.sa() == 0 {
        s.stop();
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn stop_dis(_w: InstructionWord) -> String {
    "stop".to_string()
}

/// Memory is sequentially consistent here, so the line sync has nothing
/// to order.
pub fn sync_l<C: Core>(_w: InstructionWord, _c: &mut C) {}

pub fn sync_l_dis(_w: InstructionWord) -> String {
    "sync.l".to_string()
}

fn amo<C: Core>(w: InstructionWord, c: &mut C, op: fn(u32, u32) -> u32) {
    let s = c.state_mut();
    let addr = s.read_register(w.rs());
    if addr & 0x3 != 0 {
        s.raise(Exception::AddrMisalignedLoad);
        return;
    }
    if let Some(old) = s.load_u32(addr) {
        let update = op(old, s.read_register(w.rt()));
        s.store_u32(addr, update);
        s.write_register(w.rd(), old);
    }
}

pub fn amo_add<C: Core>(w: InstructionWord, c: &mut C) {
    amo(w, c, u32::wrapping_add);
}

pub fn amo_add_dis(w: InstructionWord) -> String {
    format!(
        "amo.add {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn amo_and<C: Core>(w: InstructionWord, c: &mut C) {
    amo(w, c, |a, b| a & b);
}

pub fn amo_and_dis(w: InstructionWord) -> String {
    format!(
        "amo.and {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn amo_or<C: Core>(w: InstructionWord, c: &mut C) {
    amo(w, c, |a, b| a | b);
}

pub fn amo_or_dis(w: InstructionWord) -> String {
    format!(
        "amo.or {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

/// Three-operand signed divide. A zero divisor writes zero instead of
/// trapping.
pub fn div<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let x = s.read_register(w.rs()) as i32;
    let y = s.read_register(w.rt()) as i32;
    let q = if y == 0 {
        warn!("divide by zero");
        0
    } else {
        x.wrapping_div(y)
    };
    s.write_register(w.rd(), q as u32);
    note_rrr(c, AluClass::IDivRem, w.rs(), w.rt(), w.rd());
}

pub fn div_dis(w: InstructionWord) -> String {
    format!(
        "div {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn rem<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let x = s.read_register(w.rs()) as i32;
    let y = s.read_register(w.rt()) as i32;
    let r = if y == 0 {
        warn!("divide by zero");
        0
    } else {
        x.wrapping_rem(y)
    };
    s.write_register(w.rd(), r as u32);
    note_rrr(c, AluClass::IDivRem, w.rs(), w.rt(), w.rd());
}

pub fn rem_dis(w: InstructionWord) -> String {
    format!(
        "rem {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn divu<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let x = s.read_register(w.rs());
    let y = s.read_register(w.rt());
    let q = if y == 0 {
        warn!("divide by zero");
        0
    } else {
        x / y
    };
    s.write_register(w.rd(), q);
    note_rrr(c, AluClass::IDivRem, w.rs(), w.rt(), w.rd());
}

pub fn divu_dis(w: InstructionWord) -> String {
    format!(
        "divu {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn remu<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let x = s.read_register(w.rs());
    let y = s.read_register(w.rt());
    let r = if y == 0 {
        warn!("divide by zero");
        0
    } else {
        x % y
    };
    s.write_register(w.rd(), r);
    note_rrr(c, AluClass::IDivRem, w.rs(), w.rt(), w.rd());
}

pub fn remu_dis(w: InstructionWord) -> String {
    format!(
        "remu {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

/// Lane index of the executing core; the control processor reads -1.
pub fn vpidx<C: Core>(w: InstructionWord, c: &mut C) {
    let idx = c.vp_index();
    let s = c.state_mut();
    s.write_register(w.rd(), idx as u32);
    note_rd(c, AluClass::Int, 0, w.rd());
}

pub fn vpidx_dis(w: InstructionWord) -> String {
    format!("vpidx {}", REG_NAMES[w.rd()])
}

pub fn mulhi<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let product = (s.read_register(w.rs()) as u64) * (s.read_register(w.rt()) as u64);
    s.write_register(w.rd(), (product >> 32) as u32);
    note_rrr(c, AluClass::IMul, w.rs(), w.rt(), w.rd());
}

pub fn mulhi_dis(w: InstructionWord) -> String {
    format!(
        "mulhi {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn clz<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let val = s.read_register(w.rs()).leading_zeros();
    s.write_register(w.rd(), val);
    note_rd(c, AluClass::Int, w.rs(), w.rd());
}

pub fn clz_dis(w: InstructionWord) -> String {
    format!("clz {},{}", REG_NAMES[w.rd()], REG_NAMES[w.rs()])
}

pub fn bitrev<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let val = s.read_register(w.rs()).reverse_bits();
    s.write_register(w.rd(), val);
    note_rd(c, AluClass::Int, w.rs(), w.rd());
}

pub fn bitrev_dis(w: InstructionWord) -> String {
    format!("bitrev {},{}", REG_NAMES[w.rd()], REG_NAMES[w.rs()])
}
