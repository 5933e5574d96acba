//! Top-level opcode handlers: jumps, branches, immediate arithmetic and
//! the scalar memory instructions.

use maven_core::error::Exception;

use crate::insn::InstructionWord;
use crate::names::{FP_REG_NAMES, REG_NAMES};
use crate::state::{AluClass, Core};

use super::{ea, note_branch, note_jump, note_load, note_rd, note_store};

pub fn j<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let target = (s.npc & 0xf000_0000) | (w.jump() << 2);
    s.jump_to(target);
    note_jump(c);
}

pub fn j_dis(w: InstructionWord) -> String {
    format!("j {:#x}", w.jump() << 2)
}

/// The link register receives the delay slot address, not the return
/// point after it.
pub fn jal<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let link = s.pc.wrapping_add(4);
    s.write_register(31, link);
    let target = (s.npc & 0xf000_0000) | (w.jump() << 2);
    s.jump_to(target);
    note_jump(c);
}

pub fn jal_dis(w: InstructionWord) -> String {
    format!("jal {:#x}", w.jump() << 2)
}

pub fn beq<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if s.read_register(w.rs()) == s.read_register(w.rt()) {
        s.take_branch(w.simm());
    }
    note_branch(c, w.rs(), w.rt(), true);
}

pub fn beq_dis(w: InstructionWord) -> String {
    format!(
        "beq {},{},{}",
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()],
        w.simm()
    )
}

pub fn bne<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if s.read_register(w.rs()) != s.read_register(w.rt()) {
        s.take_branch(w.simm());
    }
    note_branch(c, w.rs(), w.rt(), true);
}

pub fn bne_dis(w: InstructionWord) -> String {
    format!(
        "bne {},{},{}",
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()],
        w.simm()
    )
}

pub fn blez<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if (s.read_register(w.rs()) as i32) <= 0 {
        s.take_branch(w.simm());
    }
    note_branch(c, w.rs(), 0, false);
}

pub fn blez_dis(w: InstructionWord) -> String {
    format!("blez {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn bgtz<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if (s.read_register(w.rs()) as i32) > 0 {
        s.take_branch(w.simm());
    }
    note_branch(c, w.rs(), 0, false);
}

pub fn bgtz_dis(w: InstructionWord) -> String {
    format!("bgtz {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn beql<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if s.read_register(w.rs()) == s.read_register(w.rt()) {
        s.take_branch(w.simm());
    } else {
        s.nullify = true;
    }
}

pub fn beql_dis(w: InstructionWord) -> String {
    format!(
        "beql {},{},{}",
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()],
        w.simm()
    )
}

pub fn bnel<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if s.read_register(w.rs()) != s.read_register(w.rt()) {
        s.take_branch(w.simm());
    } else {
        s.nullify = true;
    }
}

pub fn bnel_dis(w: InstructionWord) -> String {
    format!(
        "bnel {},{},{}",
        REG_NAMES[w.rs()],
        REG_NAMES[w.rt()],
        w.simm()
    )
}

pub fn blezl<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if (s.read_register(w.rs()) as i32) <= 0 {
        s.take_branch(w.simm());
    } else {
        s.nullify = true;
    }
}

pub fn blezl_dis(w: InstructionWord) -> String {
    format!("blezl {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn bgtzl<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if (s.read_register(w.rs()) as i32) > 0 {
        s.take_branch(w.simm());
    } else {
        s.nullify = true;
    }
}

pub fn bgtzl_dis(w: InstructionWord) -> String {
    format!("bgtzl {},{}", REG_NAMES[w.rs()], w.simm())
}

pub fn addi<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let rs = s.read_register(w.rs()) as i32;
    match rs.checked_add(w.simm()) {
        Some(sum) => s.write_register(w.rt(), sum as u32),
        None => s.raise(Exception::AluOverflow),
    }
    note_rd(c, AluClass::Int, w.rs(), w.rt());
}

pub fn addi_dis(w: InstructionWord) -> String {
    format!(
        "addi {},{},{}",
        REG_NAMES[w.rt()],
        REG_NAMES[w.rs()],
        w.simm()
    )
}

pub fn addiu<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let sum = s.read_register(w.rs()).wrapping_add(w.simm() as u32);
    s.write_register(w.rt(), sum);
    note_rd(c, AluClass::Int, w.rs(), w.rt());
}

pub fn addiu_dis(w: InstructionWord) -> String {
    format!(
        "addiu {},{},{}",
        REG_NAMES[w.rt()],
        REG_NAMES[w.rs()],
        w.simm()
    )
}

pub fn slti<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let val = ((s.read_register(w.rs()) as i32) < w.simm()) as u32;
    s.write_register(w.rt(), val);
    note_rd(c, AluClass::Int, w.rs(), w.rt());
}

pub fn slti_dis(w: InstructionWord) -> String {
    format!(
        "slti {},{},{}",
        REG_NAMES[w.rt()],
        REG_NAMES[w.rs()],
        w.simm()
    )
}

pub fn sltiu<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let val = (s.read_register(w.rs()) < w.simm() as u32) as u32;
    s.write_register(w.rt(), val);
    note_rd(c, AluClass::Int, w.rs(), w.rt());
}

pub fn sltiu_dis(w: InstructionWord) -> String {
    format!(
        "sltiu {},{},{}",
        REG_NAMES[w.rt()],
        REG_NAMES[w.rs()],
        w.simm()
    )
}

pub fn andi<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let val = s.read_register(w.rs()) & w.immediate();
    s.write_register(w.rt(), val);
    note_rd(c, AluClass::Int, w.rs(), w.rt());
}

pub fn andi_dis(w: InstructionWord) -> String {
    format!(
        "andi {},{},{:#x}",
        REG_NAMES[w.rt()],
        REG_NAMES[w.rs()],
        w.immediate()
    )
}

pub fn ori<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let val = s.read_register(w.rs()) | w.immediate();
    s.write_register(w.rt(), val);
    note_rd(c, AluClass::Int, w.rs(), w.rt());
}

pub fn ori_dis(w: InstructionWord) -> String {
    format!(
        "ori {},{},{:#x}",
        REG_NAMES[w.rt()],
        REG_NAMES[w.rs()],
        w.immediate()
    )
}

pub fn xori<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let val = s.read_register(w.rs()) ^ w.immediate();
    s.write_register(w.rt(), val);
    note_rd(c, AluClass::Int, w.rs(), w.rt());
}

pub fn xori_dis(w: InstructionWord) -> String {
    format!(
        "xori {},{},{:#x}",
        REG_NAMES[w.rt()],
        REG_NAMES[w.rs()],
        w.immediate()
    )
}

pub fn lui<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    s.write_register(w.rt(), w.immediate() << 16);
    note_rd(c, AluClass::Int, 0, w.rt());
}

pub fn lui_dis(w: InstructionWord) -> String {
    format!("lui {},{:#x}", REG_NAMES[w.rt()], w.immediate())
}

pub fn lb<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    if let Some(v) = s.load_u8(addr) {
        s.write_register(w.rt(), v as i8 as i32 as u32);
    }
    note_load(c, w.rs(), w.rt());
}

pub fn lb_dis(w: InstructionWord) -> String {
    format!(
        "lb {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

pub fn lbu<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    if let Some(v) = s.load_u8(addr) {
        s.write_register(w.rt(), v as u32);
    }
    note_load(c, w.rs(), w.rt());
}

pub fn lbu_dis(w: InstructionWord) -> String {
    format!(
        "lbu {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

pub fn lh<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    if let Some(v) = s.load_u16(addr) {
        s.write_register(w.rt(), v as i16 as i32 as u32);
    }
    note_load(c, w.rs(), w.rt());
}

pub fn lh_dis(w: InstructionWord) -> String {
    format!(
        "lh {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

pub fn lhu<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    if let Some(v) = s.load_u16(addr) {
        s.write_register(w.rt(), v as u32);
    }
    note_load(c, w.rs(), w.rt());
}

pub fn lhu_dis(w: InstructionWord) -> String {
    format!(
        "lhu {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

pub fn lw<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    if let Some(v) = s.load_u32(addr) {
        s.write_register(w.rt(), v);
    }
    note_load(c, w.rs(), w.rt());
}

pub fn lw_dis(w: InstructionWord) -> String {
    format!(
        "lw {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

/// Unaligned load, left part: merges the bytes from the address down to
/// the enclosing word boundary into the high end of rt.
pub fn lwl<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    if let Some(mval) = s.load_u32(addr & !0x3) {
        let shift = 8 * (addr % 4);
        let mask = u32::MAX << shift;
        let rval = (s.read_register(w.rt()) & !mask) | (mval << shift);
        s.write_register(w.rt(), rval);
    }
    note_load(c, w.rs(), w.rt());
}

pub fn lwl_dis(w: InstructionWord) -> String {
    format!(
        "lwl {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

/// Unaligned load, right part: merges the bytes from the address up to
/// the enclosing word boundary into the low end of rt.
pub fn lwr<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    if let Some(mval) = s.load_u32(addr & !0x3) {
        let shift = 8 * (3 - addr % 4);
        let mask = u32::MAX >> shift;
        let rval = (s.read_register(w.rt()) & !mask) | (mval >> shift);
        s.write_register(w.rt(), rval);
    }
    note_load(c, w.rs(), w.rt());
}

pub fn lwr_dis(w: InstructionWord) -> String {
    format!(
        "lwr {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

pub fn sb<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    let val = s.read_register(w.rt()) as u8;
    s.store_u8(addr, val);
    note_store(c, w.rs(), w.rt());
}

pub fn sb_dis(w: InstructionWord) -> String {
    format!(
        "sb {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

pub fn sh<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    let val = s.read_register(w.rt()) as u16;
    s.store_u16(addr, val);
    note_store(c, w.rs(), w.rt());
}

pub fn sh_dis(w: InstructionWord) -> String {
    format!(
        "sh {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

pub fn sw<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    let val = s.read_register(w.rt());
    s.store_u32(addr, val);
    note_store(c, w.rs(), w.rt());
}

pub fn sw_dis(w: InstructionWord) -> String {
    format!(
        "sw {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

/// Unaligned store, left part.
pub fn swl<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    if let Some(mval) = s.load_u32(addr & !0x3) {
        let shift = 8 * (addr % 4);
        let mask = u32::MAX >> shift;
        let merged = (mval & !mask) | (s.read_register(w.rt()) >> shift);
        s.store_u32(addr & !0x3, merged);
    }
    note_store(c, w.rs(), w.rt());
}

pub fn swl_dis(w: InstructionWord) -> String {
    format!(
        "swl {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

/// Unaligned store, right part.
pub fn swr<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    if let Some(mval) = s.load_u32(addr & !0x3) {
        let shift = 8 * (3 - addr % 4);
        let mask = u32::MAX << shift;
        let merged = (mval & !mask) | (s.read_register(w.rt()) << shift);
        s.store_u32(addr & !0x3, merged);
    }
    note_store(c, w.rs(), w.rt());
}

pub fn swr_dis(w: InstructionWord) -> String {
    format!(
        "swr {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

pub fn cache_dis(w: InstructionWord) -> String {
    format!("cache {},{}({})", w.rt(), w.simm(), REG_NAMES[w.rs()])
}

pub fn pref_dis(w: InstructionWord) -> String {
    format!("pref {},{}({})", w.rt(), w.simm(), REG_NAMES[w.rs()])
}

pub fn ll_dis(w: InstructionWord) -> String {
    format!(
        "ll {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

pub fn sc_dis(w: InstructionWord) -> String {
    format!(
        "sc {},{}({})",
        REG_NAMES[w.rt()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

pub fn lwc1<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    if let Some(v) = s.load_u32(addr) {
        s.write_register(w.ft(), v);
    }
    note_load(c, w.rs(), w.ft());
}

pub fn lwc1_dis(w: InstructionWord) -> String {
    format!(
        "lwc1 {},{}({})",
        FP_REG_NAMES[w.ft()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

/// Double load. The even register takes the word at addr+4, the odd one
/// the word at addr.
pub fn ldc1<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    if addr & 0x7 != 0 || w.ft() & 0x1 != 0 {
        s.raise(Exception::AddrMisalignedLoad);
    } else if let (Some(hi), Some(lo)) = (s.load_u32(addr.wrapping_add(4)), s.load_u32(addr)) {
        s.write_register(w.ft(), hi);
        s.write_register(w.ft() + 1, lo);
    }
    note_load(c, w.rs(), w.ft());
}

pub fn ldc1_dis(w: InstructionWord) -> String {
    format!(
        "ldc1 {},{}({})",
        FP_REG_NAMES[w.ft()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

pub fn swc1<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    let val = s.read_register(w.ft());
    s.store_u32(addr, val);
    note_store(c, w.rs(), w.ft());
}

pub fn swc1_dis(w: InstructionWord) -> String {
    format!(
        "swc1 {},{}({})",
        FP_REG_NAMES[w.ft()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}

/// Double store, mirror image of [`ldc1`].
pub fn sdc1<C: Core>(w: InstructionWord, c: &mut C) {
    let addr = ea(w, c);
    let s = c.state_mut();
    if addr & 0x7 != 0 || w.ft() & 0x1 != 0 {
        s.raise(Exception::AddrMisalignedStore);
    } else {
        let odd = s.read_register(w.ft() + 1);
        let even = s.read_register(w.ft());
        s.store_u32(addr, odd);
        s.store_u32(addr.wrapping_add(4), even);
    }
    note_store(c, w.rs(), w.ft());
}

pub fn sdc1_dis(w: InstructionWord) -> String {
    format!(
        "sdc1 {},{}({})",
        FP_REG_NAMES[w.ft()],
        w.simm(),
        REG_NAMES[w.rs()]
    )
}
