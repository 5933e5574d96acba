//! SPECIAL function-field handlers: shifts, register jumps, conditional
//! moves, hi/lo arithmetic, three-operand ALU ops and traps.

use log::warn;
use maven_core::error::Exception;

use crate::insn::InstructionWord;
use crate::names::REG_NAMES;
use crate::state::{AluClass, Core};

use super::{note_jump, note_rd, note_rrr};

pub fn sll<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rs() == 0 {
        let val = s.read_register(w.rt()) << w.sa();
        s.write_register(w.rd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rd(c, AluClass::Int, w.rt(), w.rd());
}

pub fn sll_dis(w: InstructionWord) -> String {
    if w.rt() == 0 && w.rd() == 0 {
        match w.sa() {
            0 => return "nop".to_string(),
            1 => return "ssnop".to_string(),
            _ => {}
        }
    }
    format!("sll {},{},{}", REG_NAMES[w.rd()], REG_NAMES[w.rt()], w.sa())
}

pub fn srl<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rs() == 0 {
        let val = s.read_register(w.rt()) >> w.sa();
        s.write_register(w.rd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rd(c, AluClass::Int, w.rt(), w.rd());
}

pub fn srl_dis(w: InstructionWord) -> String {
    format!("srl {},{},{}", REG_NAMES[w.rd()], REG_NAMES[w.rt()], w.sa())
}

pub fn sra<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rs() == 0 {
        let val = (s.read_register(w.rt()) as i32) >> w.sa();
        s.write_register(w.rd(), val as u32);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rd(c, AluClass::Int, w.rt(), w.rd());
}

pub fn sra_dis(w: InstructionWord) -> String {
    format!("sra {},{},{}", REG_NAMES[w.rd()], REG_NAMES[w.rt()], w.sa())
}

pub fn sllv<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let sh = s.read_register(w.rs()) & 0x1f;
        let val = s.read_register(w.rt()) << sh;
        s.write_register(w.rd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn sllv_dis(w: InstructionWord) -> String {
    format!(
        "sllv {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rt()],
        REG_NAMES[w.rs()]
    )
}

pub fn srlv<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let sh = s.read_register(w.rs()) & 0x1f;
        let val = s.read_register(w.rt()) >> sh;
        s.write_register(w.rd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn srlv_dis(w: InstructionWord) -> String {
    format!(
        "srlv {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rt()],
        REG_NAMES[w.rs()]
    )
}

pub fn srav<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let sh = s.read_register(w.rs()) & 0x1f;
        let val = (s.read_register(w.rt()) as i32) >> sh;
        s.write_register(w.rd(), val as u32);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn srav_dis(w: InstructionWord) -> String {
    format!(
        "srav {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rt()],
        REG_NAMES[w.rs()]
    )
}

pub fn jr<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let target = s.read_register(w.rs());
    s.jump_to(target);
    note_jump(c);
}

pub fn jr_dis(w: InstructionWord) -> String {
    format!("jr {}", REG_NAMES[w.rs()])
}

/// Links the delay slot address like [`super::opcode::jal`].
pub fn jalr<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let link = s.pc.wrapping_add(4);
    s.write_register(w.rd(), link);
    let target = s.read_register(w.rs());
    s.jump_to(target);
    note_jump(c);
}

pub fn jalr_dis(w: InstructionWord) -> String {
    format!("jalr {},{}", REG_NAMES[w.rd()], REG_NAMES[w.rs()])
}

pub fn movz<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let val = s.read_register(w.rs());
    if s.read_register(w.rt()) == 0 {
        s.write_register(w.rd(), val);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn movz_dis(w: InstructionWord) -> String {
    format!(
        "movz {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn movn<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let val = s.read_register(w.rs());
    if s.read_register(w.rt()) != 0 {
        s.write_register(w.rd(), val);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn movn_dis(w: InstructionWord) -> String {
    format!(
        "movn {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

/// Conditional move on FP condition, false sense. For a nonzero cc field
/// the hardware shifts the packed fcc bits by cc-1 and tests the whole
/// word against zero.
pub fn movf<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let cc = w.cc();
        let fcc = s.fpu.fcsr.fcc();
        if (cc != 0 && (fcc << (cc - 1)) == 0) || s.fpu.fcsr.fcc0() == 0 {
            let val = s.read_register(w.rs());
            s.write_register(w.rd(), val);
        }
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn movf_dis(w: InstructionWord) -> String {
    format!(
        "movf {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        w.cc()
    )
}

/// Conditional move on FP condition, true sense.
pub fn movt<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let cc = w.cc();
        let fcc = s.fpu.fcsr.fcc();
        if (cc != 0 && (fcc << (cc - 1)) != 0) || s.fpu.fcsr.fcc0() == 1 {
            let val = s.read_register(w.rs());
            s.write_register(w.rd(), val);
        }
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn movt_dis(w: InstructionWord) -> String {
    format!(
        "movt {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        w.cc()
    )
}

pub fn syscall<C: Core>(_w: InstructionWord, c: &mut C) {
    c.syscall();
}

pub fn syscall_dis(_w: InstructionWord) -> String {
    "syscall".to_string()
}

pub fn brk<C: Core>(_w: InstructionWord, c: &mut C) {
    c.state_mut().raise(Exception::ReservedInstruction);
}

pub fn brk_dis(_w: InstructionWord) -> String {
    "break".to_string()
}

pub fn sync<C: Core>(_w: InstructionWord, _c: &mut C) {}

pub fn sync_dis(w: InstructionWord) -> String {
    format!("sync {}", w.sa())
}

pub fn mfhi<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rs() == 0 && w.rt() == 0 && w.sa() == 0 {
        let hi = s.hi;
        s.write_register(w.rd(), hi);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn mfhi_dis(w: InstructionWord) -> String {
    format!("mfhi {}", REG_NAMES[w.rd()])
}

pub fn mthi<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rt() == 0 && w.rd() == 0 && w.sa() == 0 {
        s.hi = s.read_register(w.rs());
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn mthi_dis(w: InstructionWord) -> String {
    format!("mthi {}", REG_NAMES[w.rs()])
}

pub fn mflo<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rs() == 0 && w.rt() == 0 && w.sa() == 0 {
        let lo = s.lo;
        s.write_register(w.rd(), lo);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn mflo_dis(w: InstructionWord) -> String {
    format!("mflo {}", REG_NAMES[w.rd()])
}

pub fn mtlo<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rt() == 0 && w.rd() == 0 && w.sa() == 0 {
        s.lo = s.read_register(w.rs());
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn mtlo_dis(w: InstructionWord) -> String {
    format!("mtlo {}", REG_NAMES[w.rs()])
}

/// Both multiplies form the product from zero-extended operands, so the
/// signed variant produces the same hi/lo pair as the unsigned one.
pub fn mult<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rd() == 0 && w.sa() == 0 {
        let product =
            (s.read_register(w.rs()) as u64).wrapping_mul(s.read_register(w.rt()) as u64);
        s.hi = (product >> 32) as u32;
        s.lo = product as u32;
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::IMul, w.rs(), w.rt(), 0);
    c.state_mut().note.b_rd = false;
}

pub fn mult_dis(w: InstructionWord) -> String {
    format!("mult {},{}", REG_NAMES[w.rs()], REG_NAMES[w.rt()])
}

pub fn multu<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rd() == 0 && w.sa() == 0 {
        let product =
            (s.read_register(w.rs()) as u64).wrapping_mul(s.read_register(w.rt()) as u64);
        s.hi = (product >> 32) as u32;
        s.lo = product as u32;
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::IMul, w.rs(), w.rt(), 0);
    c.state_mut().note.b_rd = false;
}

pub fn multu_dis(w: InstructionWord) -> String {
    format!("multu {},{}", REG_NAMES[w.rs()], REG_NAMES[w.rt()])
}

/// Signed divide into hi/lo. A zero divisor and the INT_MIN by -1 case
/// write fixed sentinel values instead of trapping.
pub fn div<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rd() == 0 && w.sa() == 0 {
        let rs = s.read_register(w.rs()) as i32;
        let rt = s.read_register(w.rt()) as i32;
        if rt == 0 {
            s.lo = if rs >= 0 { -1i32 } else { 1 } as u32;
            s.hi = rs as u32;
            warn!("divide by zero");
        } else if rs == i32::MIN && rt == -1 {
            s.lo = i32::MIN as u32;
            s.hi = 0;
        } else {
            s.lo = (rs / rt) as u32;
            s.hi = (rs % rt) as u32;
        }
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::IDivRem, w.rs(), w.rt(), 0);
    c.state_mut().note.b_rd = false;
}

pub fn div_dis(w: InstructionWord) -> String {
    format!("div {},{}", REG_NAMES[w.rs()], REG_NAMES[w.rt()])
}

pub fn divu<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.rd() == 0 && w.sa() == 0 {
        let rs = s.read_register(w.rs());
        let rt = s.read_register(w.rt());
        if rt == 0 {
            s.lo = u32::MAX;
            s.hi = rs;
            warn!("divide by zero");
        } else {
            s.lo = rs / rt;
            s.hi = rs % rt;
        }
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::IDivRem, w.rs(), w.rt(), 0);
    c.state_mut().note.b_rd = false;
}

pub fn divu_dis(w: InstructionWord) -> String {
    format!("divu {},{}", REG_NAMES[w.rs()], REG_NAMES[w.rt()])
}

pub fn add<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let rs = s.read_register(w.rs()) as i32;
        let rt = s.read_register(w.rt()) as i32;
        match rs.checked_add(rt) {
            Some(sum) => s.write_register(w.rd(), sum as u32),
            None => s.raise(Exception::AluOverflow),
        }
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn add_dis(w: InstructionWord) -> String {
    format!(
        "add {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn addu<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let sum = s.read_register(w.rs()).wrapping_add(s.read_register(w.rt()));
        s.write_register(w.rd(), sum);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn addu_dis(w: InstructionWord) -> String {
    format!(
        "addu {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn sub<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let rs = s.read_register(w.rs()) as i32;
        let rt = s.read_register(w.rt()) as i32;
        match rs.checked_sub(rt) {
            Some(diff) => s.write_register(w.rd(), diff as u32),
            None => s.raise(Exception::AluOverflow),
        }
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn sub_dis(w: InstructionWord) -> String {
    format!(
        "sub {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn subu<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let diff = s.read_register(w.rs()).wrapping_sub(s.read_register(w.rt()));
        s.write_register(w.rd(), diff);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn subu_dis(w: InstructionWord) -> String {
    format!(
        "subu {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn and<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let val = s.read_register(w.rs()) & s.read_register(w.rt());
        s.write_register(w.rd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn and_dis(w: InstructionWord) -> String {
    format!(
        "and {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn or<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let val = s.read_register(w.rs()) | s.read_register(w.rt());
        s.write_register(w.rd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn or_dis(w: InstructionWord) -> String {
    format!(
        "or {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn xor<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let val = s.read_register(w.rs()) ^ s.read_register(w.rt());
        s.write_register(w.rd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn xor_dis(w: InstructionWord) -> String {
    format!(
        "xor {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn nor<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let val = !(s.read_register(w.rs()) | s.read_register(w.rt()));
        s.write_register(w.rd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn nor_dis(w: InstructionWord) -> String {
    format!(
        "nor {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn slt<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let val = ((s.read_register(w.rs()) as i32) < (s.read_register(w.rt()) as i32)) as u32;
        s.write_register(w.rd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn slt_dis(w: InstructionWord) -> String {
    format!(
        "slt {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

pub fn sltu<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.sa() == 0 {
        let val = (s.read_register(w.rs()) < s.read_register(w.rt())) as u32;
        s.write_register(w.rd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
    note_rrr(c, AluClass::Int, w.rs(), w.rt(), w.rd());
}

pub fn sltu_dis(w: InstructionWord) -> String {
    format!(
        "sltu {},{},{}",
        REG_NAMES[w.rd()],
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

fn trap_if<C: Core>(c: &mut C, cond: bool) {
    if cond {
        c.state_mut().raise(Exception::Trap);
    }
}

pub fn tge<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state();
    let cond = (s.read_register(w.rs()) as i32) >= (s.read_register(w.rt()) as i32);
    trap_if(c, cond);
}

pub fn tge_dis(w: InstructionWord) -> String {
    format!("tge {},{}", REG_NAMES[w.rs()], REG_NAMES[w.rt()])
}

pub fn tgeu<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state();
    let cond = s.read_register(w.rs()) >= s.read_register(w.rt());
    trap_if(c, cond);
}

pub fn tgeu_dis(w: InstructionWord) -> String {
    format!("tgeu {},{}", REG_NAMES[w.rs()], REG_NAMES[w.rt()])
}

pub fn tlt<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state();
    let cond = (s.read_register(w.rs()) as i32) < (s.read_register(w.rt()) as i32);
    trap_if(c, cond);
}

pub fn tlt_dis(w: InstructionWord) -> String {
    format!("tlt {},{}", REG_NAMES[w.rs()], REG_NAMES[w.rt()])
}

pub fn tltu<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state();
    let cond = s.read_register(w.rs()) < s.read_register(w.rt());
    trap_if(c, cond);
}

pub fn tltu_dis(w: InstructionWord) -> String {
    format!("tltu {},{}", REG_NAMES[w.rs()], REG_NAMES[w.rt()])
}

pub fn teq<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state();
    let cond = s.read_register(w.rs()) == s.read_register(w.rt());
    trap_if(c, cond);
}

pub fn teq_dis(w: InstructionWord) -> String {
    format!("teq {},{}", REG_NAMES[w.rs()], REG_NAMES[w.rt()])
}

pub fn tne<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state();
    let cond = s.read_register(w.rs()) != s.read_register(w.rt());
    trap_if(c, cond);
}

pub fn tne_dis(w: InstructionWord) -> String {
    format!("tne {},{}", REG_NAMES[w.rs()], REG_NAMES[w.rt()])
}
