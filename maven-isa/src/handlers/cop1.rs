//! COP1 handlers: FP register moves, condition branches, and the S, D
//! and W format operation groups.
//!
//! Operand values live in the shared register file. Every computational
//! op runs the same protocol: clean the per-op cause bits, compute,
//! classify the raised IEEE exceptions, and either commit the result or
//! abort with an FP exception.

use maven_core::error::Exception;

use crate::fpu::{flag, rm, Fpu, FP_ABORT};
use crate::insn::InstructionWord;
use crate::names::{FP_COND_NAMES, FP_REG_NAMES, REG_NAMES};
use crate::state::{AluClass, Core};

fn is_snan32(bits: u32) -> bool {
    (bits & 0x7f80_0000) == 0x7f80_0000 && (bits & 0x007f_ffff) != 0 && (bits & 0x0040_0000) == 0
}

fn is_snan64(bits: u64) -> bool {
    (bits & 0x7ff0_0000_0000_0000) == 0x7ff0_0000_0000_0000
        && (bits & 0x000f_ffff_ffff_ffff) != 0
        && (bits & 0x0008_0000_0000_0000) == 0
}

/// Flags the IEEE exceptions a two-operand computation raised.
fn signal_flags32(fpu: &mut Fpu, a: f32, b: f32, r: f32, div: bool) {
    if is_snan32(a.to_bits())
        || is_snan32(b.to_bits())
        || (r.is_nan() && !a.is_nan() && !b.is_nan())
    {
        fpu.signal_exception(flag::INVALID);
    }
    if div && b == 0.0 && a != 0.0 && a.is_finite() {
        fpu.signal_exception(flag::DIV0);
    }
    if r.is_infinite() && a.is_finite() && b.is_finite() && !(div && b == 0.0) {
        fpu.signal_exception(flag::OVERFLOW | flag::INEXACT);
    }
}

fn signal_flags64(fpu: &mut Fpu, a: f64, b: f64, r: f64, div: bool) {
    if is_snan64(a.to_bits())
        || is_snan64(b.to_bits())
        || (r.is_nan() && !a.is_nan() && !b.is_nan())
    {
        fpu.signal_exception(flag::INVALID);
    }
    if div && b == 0.0 && a != 0.0 && a.is_finite() {
        fpu.signal_exception(flag::DIV0);
    }
    if r.is_infinite() && a.is_finite() && b.is_finite() && !(div && b == 0.0) {
        fpu.signal_exception(flag::OVERFLOW | flag::INEXACT);
    }
}

/// Converts under an explicit rounding mode, saturating out-of-range
/// values and flagging invalid/inexact.
fn f64_to_i32(fpu: &mut Fpu, f: f64, mode: u32) -> i32 {
    if f.is_nan() {
        fpu.signal_exception(flag::INVALID);
        return i32::MAX;
    }
    let r = match mode {
        rm::TOWARD_ZERO => f.trunc(),
        rm::UP => f.ceil(),
        rm::DOWN => f.floor(),
        _ => f.round_ties_even(),
    };
    if r > i32::MAX as f64 {
        fpu.signal_exception(flag::INVALID);
        return i32::MAX;
    }
    if r < i32::MIN as f64 {
        fpu.signal_exception(flag::INVALID);
        return i32::MIN;
    }
    if r != f {
        fpu.signal_exception(flag::INEXACT);
    }
    r as i32
}

fn f32_to_i32(fpu: &mut Fpu, f: f32, mode: u32) -> i32 {
    f64_to_i32(fpu, f as f64, mode)
}

/// Shared body of the ordered/unordered compares. The op encodes the
/// condition: bit 2 is less, bit 1 equal, bit 0 unordered, bit 3 makes
/// quiet NaNs signal. The result lands in a lane flag when the core is
/// in flag mode, otherwise in the general register the fcc field names.
fn compare32<C: Core>(c: &mut C, fs: usize, ft: usize, op: u32, fcc: usize) {
    if !c.state_mut().fpu.cleanup_state() {
        return;
    }
    let f1 = c.state().read_register_s(fs);
    let f2 = c.state().read_register_s(ft);
    let f1snan = is_snan32(f1.to_bits());
    let f2snan = is_snan32(f2.to_bits());
    let f1qnan = f1.is_nan() && !f1snan;
    let f2qnan = f2.is_nan() && !f2snan;

    let (less, equal, unordered);
    if f1.is_nan() || f2.is_nan() {
        less = false;
        equal = false;
        unordered = true;
        if (f1snan || f2snan) || (op & 0x8 != 0 && (f1qnan || f2qnan)) {
            let s = c.state_mut();
            s.fpu.signal_exception(flag::INVALID);
            if !s.fpu.handle_exceptions(flag::INVALID) {
                s.raise(FP_ABORT);
                return;
            }
        }
    } else {
        less = f1 < f2;
        equal = f1 == f2;
        unordered = false;
    }

    let condition =
        ((op & 0x4 != 0 && less) || (op & 0x2 != 0 && equal) || (op & 0x1 != 0 && unordered))
            as u32;
    if c.state().flag_mode {
        c.write_flag(fcc, condition != 0);
    } else {
        c.state_mut().write_register(fcc, condition);
    }
}

fn compare64<C: Core>(c: &mut C, fs: usize, ft: usize, op: u32, fcc: usize) {
    if !c.state_mut().fpu.cleanup_state() {
        return;
    }
    {
        let s = c.state_mut();
        if !s.fpu.check_double_aligned(fs) || !s.fpu.check_double_aligned(ft) {
            s.raise(Exception::FpMisaligned);
            return;
        }
    }
    let f1 = c.state().read_register_d(fs);
    let f2 = c.state().read_register_d(ft);
    let f1snan = is_snan64(f1.to_bits());
    let f2snan = is_snan64(f2.to_bits());
    let f1qnan = f1.is_nan() && !f1snan;
    let f2qnan = f2.is_nan() && !f2snan;

    let (less, equal, unordered);
    if f1.is_nan() || f2.is_nan() {
        less = false;
        equal = false;
        unordered = true;
        if (f1snan || f2snan) || (op & 0x8 != 0 && (f1qnan || f2qnan)) {
            let s = c.state_mut();
            s.fpu.signal_exception(flag::INVALID);
            if !s.fpu.handle_exceptions(flag::INVALID) {
                s.raise(FP_ABORT);
                return;
            }
        }
    } else {
        less = f1 < f2;
        equal = f1 == f2;
        unordered = false;
    }

    let condition =
        ((op & 0x4 != 0 && less) || (op & 0x2 != 0 && equal) || (op & 0x1 != 0 && unordered))
            as u32;
    if c.state().flag_mode {
        c.write_flag(fcc, condition != 0);
    } else {
        c.state_mut().write_register(fcc, condition);
    }
}

fn note_fp<C: Core>(c: &mut C, alu: AluClass, w: InstructionWord) {
    let n = &mut c.state_mut().note;
    n.alu = Some(alu);
    n.rs = w.fs();
    n.rt = w.ft();
    n.rd = w.fd();
    n.b_rs = true;
    n.b_rt = true;
    n.b_rd = true;
}

//
// Register moves.
//

pub fn mfc1<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.fd() == 0 && w.func() == 0 {
        let val = s.read_register(w.fs());
        s.write_register(w.rt(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn mfc1_dis(w: InstructionWord) -> String {
    format!("mfc1 {},{}", REG_NAMES[w.rt()], FP_REG_NAMES[w.fs()])
}

pub fn cfc1<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    match s.fpu.read_ctl(w.fs()) {
        Some(val) => s.write_register(w.rt(), val),
        None => s.raise(Exception::ReservedInstruction),
    }
}

pub fn cfc1_dis(w: InstructionWord) -> String {
    format!("cfc1 {},${}", REG_NAMES[w.rt()], w.fs())
}

pub fn mtc1<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.fd() == 0 && w.func() == 0 {
        let val = s.read_register(w.rt());
        s.write_register(w.fs(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn mtc1_dis(w: InstructionWord) -> String {
    format!("mtc1 {},{}", REG_NAMES[w.rt()], FP_REG_NAMES[w.fs()])
}

pub fn ctc1<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let val = s.read_register(w.rt());
    if s.fpu.write_ctl(w.fs(), val).is_none() {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn ctc1_dis(w: InstructionWord) -> String {
    format!("ctc1 {},${}", REG_NAMES[w.rt()], w.fs())
}

//
// Condition branches. A zero cc field tests the dedicated fcc0 bit; a
// nonzero one indexes the packed fcc bits with the shift amount taken
// from the fcc field value itself, as the hardware does.
//

fn fcc_bit_set(fpu: &Fpu) -> bool {
    let fcc = fpu.fcsr.fcc();
    fcc & 1u32.checked_shl(fcc.wrapping_sub(1)).unwrap_or(0) != 0
}

pub fn bc1<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    let cond = if w.cc() == 0 {
        s.fpu.fcsr.fcc0() == 1
    } else {
        fcc_bit_set(&s.fpu)
    };
    let sense = w.td() == 1;
    let likely = w.nd() == 1;
    if cond == sense {
        s.take_branch(w.simm());
    } else if likely {
        s.nullify = true;
    }
    s.note.inst_branch = true;
}

pub fn bc1_dis(w: InstructionWord) -> String {
    let mnem = match (w.nd(), w.td()) {
        (0, 0) => "bc1f",
        (0, 1) => "bc1t",
        (1, 0) => "bc1fl",
        _ => "bc1tl",
    };
    if w.cc() == 0 {
        format!("{} {}", mnem, w.simm())
    } else {
        format!("{} {},{}", mnem, w.cc(), w.simm())
    }
}

//
// Single precision.
//

const ARITH_ALLOWED: u32 = flag::INEXACT | flag::UNDERFLOW | flag::OVERFLOW | flag::INVALID;

fn binop_s<C: Core>(
    w: InstructionWord,
    c: &mut C,
    op: fn(f32, f32) -> f32,
    div: bool,
    allowed: u32,
    alu: AluClass,
) {
    let s = c.state_mut();
    if !s.fpu.cleanup_state() {
        return;
    }
    let f1 = s.read_register_s(w.fs());
    let f2 = s.read_register_s(w.ft());
    let f = op(f1, f2);
    signal_flags32(&mut s.fpu, f1, f2, f, div);
    if !s.fpu.handle_exceptions(allowed) {
        s.raise(FP_ABORT);
        return;
    }
    s.write_register_s(w.fd(), f);
    note_fp(c, alu, w);
}

pub fn add_s<C: Core>(w: InstructionWord, c: &mut C) {
    binop_s(w, c, |a, b| a + b, false, ARITH_ALLOWED, AluClass::FAddSub);
}

pub fn add_s_dis(w: InstructionWord) -> String {
    format!(
        "add.s {},{},{}",
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        FP_REG_NAMES[w.ft()]
    )
}

pub fn sub_s<C: Core>(w: InstructionWord, c: &mut C) {
    binop_s(w, c, |a, b| a - b, false, ARITH_ALLOWED, AluClass::FAddSub);
}

pub fn sub_s_dis(w: InstructionWord) -> String {
    format!(
        "sub.s {},{},{}",
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        FP_REG_NAMES[w.ft()]
    )
}

pub fn mul_s<C: Core>(w: InstructionWord, c: &mut C) {
    binop_s(w, c, |a, b| a * b, false, ARITH_ALLOWED, AluClass::FMul);
}

pub fn mul_s_dis(w: InstructionWord) -> String {
    format!(
        "mul.s {},{},{}",
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        FP_REG_NAMES[w.ft()]
    )
}

pub fn div_s<C: Core>(w: InstructionWord, c: &mut C) {
    binop_s(
        w,
        c,
        |a, b| a / b,
        true,
        ARITH_ALLOWED | flag::DIV0,
        AluClass::FDiv,
    );
}

pub fn div_s_dis(w: InstructionWord) -> String {
    format!(
        "div.s {},{},{}",
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        FP_REG_NAMES[w.ft()]
    )
}

pub fn sqrt_s<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    let f1 = s.read_register_s(w.fs());
    let f = f1.sqrt();
    if is_snan32(f1.to_bits()) || (f.is_nan() && !f1.is_nan()) {
        s.fpu.signal_exception(flag::INVALID);
    }
    if !s.fpu.handle_exceptions(flag::INEXACT | flag::INVALID) {
        s.raise(FP_ABORT);
        return;
    }
    s.write_register_s(w.fd(), f);
    note_fp(c, AluClass::FSqrt, w);
}

pub fn sqrt_s_dis(w: InstructionWord) -> String {
    format!("sqrt.s {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

/// Sign-bit ops work on the raw encoding and never quiet a NaN.
pub fn abs_s<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() == 0 {
        if !s.fpu.cleanup_state() {
            return;
        }
        let bits = s.read_register(w.fs()) & !0x8000_0000;
        s.write_register(w.fd(), bits);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn abs_s_dis(w: InstructionWord) -> String {
    format!("abs.s {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn mov_s<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() == 0 {
        if !s.fpu.cleanup_state() {
            return;
        }
        let val = s.read_register(w.fs());
        s.write_register(w.fd(), val);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn mov_s_dis(w: InstructionWord) -> String {
    format!("mov.s {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn neg_s<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() == 0 {
        if !s.fpu.cleanup_state() {
            return;
        }
        let bits = s.read_register(w.fs()) ^ 0x8000_0000;
        s.write_register(w.fd(), bits);
    } else {
        s.raise(Exception::ReservedInstruction);
    }
}

pub fn neg_s_dis(w: InstructionWord) -> String {
    format!("neg.s {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

fn convert_s_to_w<C: Core>(w: InstructionWord, c: &mut C, mode: u32) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.set_rounding_mode(mode) {
        return;
    }
    let f = s.read_register_s(w.fs());
    let i = f32_to_i32(&mut s.fpu, f, mode);
    if !s.fpu.handle_exceptions(flag::INEXACT | flag::INVALID) {
        s.raise(FP_ABORT);
        return;
    }
    s.write_register_w(w.fd(), i);
}

pub fn round_w_s<C: Core>(w: InstructionWord, c: &mut C) {
    convert_s_to_w(w, c, rm::NEAREST);
}

pub fn round_w_s_dis(w: InstructionWord) -> String {
    format!("round.w.s {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn trunc_w_s<C: Core>(w: InstructionWord, c: &mut C) {
    convert_s_to_w(w, c, rm::TOWARD_ZERO);
}

pub fn trunc_w_s_dis(w: InstructionWord) -> String {
    format!("trunc.w.s {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn ceil_w_s<C: Core>(w: InstructionWord, c: &mut C) {
    convert_s_to_w(w, c, rm::UP);
}

pub fn ceil_w_s_dis(w: InstructionWord) -> String {
    format!("ceil.w.s {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn floor_w_s<C: Core>(w: InstructionWord, c: &mut C) {
    convert_s_to_w(w, c, rm::DOWN);
}

pub fn floor_w_s_dis(w: InstructionWord) -> String {
    format!("floor.w.s {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

/// movf.s / movt.s, selected by the tf bit. Same packed-fcc shift rule
/// as the integer conditional moves.
pub fn movcf_s<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if !s.fpu.cleanup_state() {
        return;
    }
    let cc = w.cc();
    let fcc = s.fpu.fcsr.fcc();
    let cond = if w.td() == 1 {
        (cc != 0 && (fcc << (cc - 1)) != 0) || s.fpu.fcsr.fcc0() == 1
    } else {
        (cc != 0 && (fcc << (cc - 1)) == 0) || s.fpu.fcsr.fcc0() == 0
    };
    if cond {
        let val = s.read_register(w.fs());
        s.write_register(w.fd(), val);
    }
}

pub fn movcf_s_dis(w: InstructionWord) -> String {
    let mnem = if w.td() == 1 { "movt.s" } else { "movf.s" };
    format!(
        "{} {},{},{}",
        mnem,
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        w.cc()
    )
}

pub fn movz_s<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if !s.fpu.cleanup_state() {
        return;
    }
    if s.read_register(w.rt()) == 0 {
        let val = s.read_register(w.fs());
        s.write_register(w.fd(), val);
    }
}

pub fn movz_s_dis(w: InstructionWord) -> String {
    format!(
        "movz.s {},{},{}",
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        REG_NAMES[w.rt()]
    )
}

pub fn movn_s<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if !s.fpu.cleanup_state() {
        return;
    }
    if s.read_register(w.rt()) != 0 {
        let val = s.read_register(w.fs());
        s.write_register(w.fd(), val);
    }
}

pub fn movn_s_dis(w: InstructionWord) -> String {
    format!(
        "movn.s {},{},{}",
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        REG_NAMES[w.rt()]
    )
}

pub fn cvt_d_s<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.check_double_aligned(w.fd()) {
        s.raise(Exception::FpMisaligned);
        return;
    }
    let f1 = s.read_register_s(w.fs());
    if is_snan32(f1.to_bits()) {
        s.fpu.signal_exception(flag::INVALID);
    }
    let f = f1 as f64;
    if !s.fpu.handle_exceptions(flag::INVALID) {
        s.raise(FP_ABORT);
        return;
    }
    s.write_register_d(w.fd(), f);
}

pub fn cvt_d_s_dis(w: InstructionWord) -> String {
    format!("cvt.d.s {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

/// cvt.w.s rounds in the current mode rather than an explicit one.
pub fn cvt_w_s<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    let f = s.read_register_s(w.fs());
    let mode = s.fpu.fcsr.rm();
    let i = f32_to_i32(&mut s.fpu, f, mode);
    if !s.fpu.handle_exceptions(flag::INEXACT | flag::INVALID) {
        s.raise(FP_ABORT);
        return;
    }
    s.write_register_w(w.fd(), i);
}

pub fn cvt_w_s_dis(w: InstructionWord) -> String {
    format!("cvt.w.s {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

/// All sixteen c.cond.s encodings; the low condition bits pick the
/// predicate.
pub fn c_cond_s<C: Core>(w: InstructionWord, c: &mut C) {
    compare32(c, w.fs(), w.ft(), w.cond(), w.fcc());
}

pub fn c_cond_s_dis(w: InstructionWord) -> String {
    let cond = FP_COND_NAMES[w.cond() as usize];
    if w.fcc() == 0 {
        format!(
            "c.{}.s {},{}",
            cond,
            FP_REG_NAMES[w.fs()],
            FP_REG_NAMES[w.ft()]
        )
    } else {
        format!(
            "c.{}.s {},{},{}",
            cond,
            w.fcc(),
            FP_REG_NAMES[w.fs()],
            FP_REG_NAMES[w.ft()]
        )
    }
}

//
// Double precision. Same protocol as S plus the even-register pair
// checks.
//

fn binop_d<C: Core>(
    w: InstructionWord,
    c: &mut C,
    op: fn(f64, f64) -> f64,
    div: bool,
    allowed: u32,
    alu: AluClass,
) {
    let s = c.state_mut();
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.check_double_aligned(w.fs())
        || !s.fpu.check_double_aligned(w.ft())
        || !s.fpu.check_double_aligned(w.fd())
    {
        s.raise(Exception::FpMisaligned);
        return;
    }
    let f1 = s.read_register_d(w.fs());
    let f2 = s.read_register_d(w.ft());
    let f = op(f1, f2);
    signal_flags64(&mut s.fpu, f1, f2, f, div);
    if !s.fpu.handle_exceptions(allowed) {
        s.raise(FP_ABORT);
        return;
    }
    s.write_register_d(w.fd(), f);
    note_fp(c, alu, w);
}

pub fn add_d<C: Core>(w: InstructionWord, c: &mut C) {
    binop_d(w, c, |a, b| a + b, false, ARITH_ALLOWED, AluClass::FAddSub);
}

pub fn add_d_dis(w: InstructionWord) -> String {
    format!(
        "add.d {},{},{}",
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        FP_REG_NAMES[w.ft()]
    )
}

pub fn sub_d<C: Core>(w: InstructionWord, c: &mut C) {
    binop_d(w, c, |a, b| a - b, false, ARITH_ALLOWED, AluClass::FAddSub);
}

pub fn sub_d_dis(w: InstructionWord) -> String {
    format!(
        "sub.d {},{},{}",
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        FP_REG_NAMES[w.ft()]
    )
}

pub fn mul_d<C: Core>(w: InstructionWord, c: &mut C) {
    binop_d(w, c, |a, b| a * b, false, ARITH_ALLOWED, AluClass::FMul);
}

pub fn mul_d_dis(w: InstructionWord) -> String {
    format!(
        "mul.d {},{},{}",
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        FP_REG_NAMES[w.ft()]
    )
}

pub fn div_d<C: Core>(w: InstructionWord, c: &mut C) {
    binop_d(
        w,
        c,
        |a, b| a / b,
        true,
        ARITH_ALLOWED | flag::DIV0,
        AluClass::FDiv,
    );
}

pub fn div_d_dis(w: InstructionWord) -> String {
    format!(
        "div.d {},{},{}",
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        FP_REG_NAMES[w.ft()]
    )
}

pub fn sqrt_d<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.check_double_aligned(w.fs()) || !s.fpu.check_double_aligned(w.fd()) {
        s.raise(Exception::FpMisaligned);
        return;
    }
    let f1 = s.read_register_d(w.fs());
    let f = f1.sqrt();
    if is_snan64(f1.to_bits()) || (f.is_nan() && !f1.is_nan()) {
        s.fpu.signal_exception(flag::INVALID);
    }
    if !s.fpu.handle_exceptions(flag::INEXACT | flag::INVALID) {
        s.raise(FP_ABORT);
        return;
    }
    s.write_register_d(w.fd(), f);
    note_fp(c, AluClass::FSqrt, w);
}

pub fn sqrt_d_dis(w: InstructionWord) -> String {
    format!("sqrt.d {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn abs_d<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.check_double_aligned(w.fs()) || !s.fpu.check_double_aligned(w.fd()) {
        s.raise(Exception::FpMisaligned);
        return;
    }
    let bits = s.read_register_d(w.fs()).to_bits() & !0x8000_0000_0000_0000;
    s.write_register_d(w.fd(), f64::from_bits(bits));
}

pub fn abs_d_dis(w: InstructionWord) -> String {
    format!("abs.d {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn mov_d<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.check_double_aligned(w.fs()) || !s.fpu.check_double_aligned(w.fd()) {
        s.raise(Exception::FpMisaligned);
        return;
    }
    let val = s.read_register_d(w.fs());
    s.write_register_d(w.fd(), val);
}

pub fn mov_d_dis(w: InstructionWord) -> String {
    format!("mov.d {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn neg_d<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.check_double_aligned(w.fs()) || !s.fpu.check_double_aligned(w.fd()) {
        s.raise(Exception::FpMisaligned);
        return;
    }
    let bits = s.read_register_d(w.fs()).to_bits() ^ 0x8000_0000_0000_0000;
    s.write_register_d(w.fd(), f64::from_bits(bits));
}

pub fn neg_d_dis(w: InstructionWord) -> String {
    format!("neg.d {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

fn convert_d_to_w<C: Core>(w: InstructionWord, c: &mut C, mode: u32) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.set_rounding_mode(mode) {
        return;
    }
    if !s.fpu.check_double_aligned(w.fs()) {
        s.raise(Exception::FpMisaligned);
        return;
    }
    let f = s.read_register_d(w.fs());
    let i = f64_to_i32(&mut s.fpu, f, mode);
    if !s.fpu.handle_exceptions(flag::INEXACT | flag::INVALID) {
        s.raise(FP_ABORT);
        return;
    }
    s.write_register_w(w.fd(), i);
}

pub fn round_w_d<C: Core>(w: InstructionWord, c: &mut C) {
    convert_d_to_w(w, c, rm::NEAREST);
}

pub fn round_w_d_dis(w: InstructionWord) -> String {
    format!("round.w.d {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn trunc_w_d<C: Core>(w: InstructionWord, c: &mut C) {
    convert_d_to_w(w, c, rm::TOWARD_ZERO);
}

pub fn trunc_w_d_dis(w: InstructionWord) -> String {
    format!("trunc.w.d {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn ceil_w_d<C: Core>(w: InstructionWord, c: &mut C) {
    convert_d_to_w(w, c, rm::UP);
}

pub fn ceil_w_d_dis(w: InstructionWord) -> String {
    format!("ceil.w.d {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn floor_w_d<C: Core>(w: InstructionWord, c: &mut C) {
    convert_d_to_w(w, c, rm::DOWN);
}

pub fn floor_w_d_dis(w: InstructionWord) -> String {
    format!("floor.w.d {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn movcf_d<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.check_double_aligned(w.fs()) || !s.fpu.check_double_aligned(w.fd()) {
        s.raise(Exception::FpMisaligned);
        return;
    }
    let cc = w.cc();
    let fcc = s.fpu.fcsr.fcc();
    let cond = if w.td() == 1 {
        (cc != 0 && (fcc << (cc - 1)) != 0) || s.fpu.fcsr.fcc0() == 1
    } else {
        (cc != 0 && (fcc << (cc - 1)) == 0) || s.fpu.fcsr.fcc0() == 0
    };
    if cond {
        let val = s.read_register_d(w.fs());
        s.write_register_d(w.fd(), val);
    }
}

pub fn movcf_d_dis(w: InstructionWord) -> String {
    let mnem = if w.td() == 1 { "movt.d" } else { "movf.d" };
    format!(
        "{} {},{},{}",
        mnem,
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        w.cc()
    )
}

pub fn movz_d<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.check_double_aligned(w.fs()) || !s.fpu.check_double_aligned(w.fd()) {
        s.raise(Exception::FpMisaligned);
        return;
    }
    if s.read_register(w.rt()) == 0 {
        let val = s.read_register_d(w.fs());
        s.write_register_d(w.fd(), val);
    }
}

pub fn movz_d_dis(w: InstructionWord) -> String {
    format!(
        "movz.d {},{},{}",
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        REG_NAMES[w.rt()]
    )
}

pub fn movn_d<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.check_double_aligned(w.fs()) || !s.fpu.check_double_aligned(w.fd()) {
        s.raise(Exception::FpMisaligned);
        return;
    }
    if s.read_register(w.rt()) != 0 {
        let val = s.read_register_d(w.fs());
        s.write_register_d(w.fd(), val);
    }
}

pub fn movn_d_dis(w: InstructionWord) -> String {
    format!(
        "movn.d {},{},{}",
        FP_REG_NAMES[w.fd()],
        FP_REG_NAMES[w.fs()],
        REG_NAMES[w.rt()]
    )
}

pub fn cvt_s_d<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.check_double_aligned(w.fs()) {
        s.raise(Exception::FpMisaligned);
        return;
    }
    let f1 = s.read_register_d(w.fs());
    if is_snan64(f1.to_bits()) {
        s.fpu.signal_exception(flag::INVALID);
    }
    let f = f1 as f32;
    if f.is_infinite() && f1.is_finite() {
        s.fpu.signal_exception(flag::OVERFLOW | flag::INEXACT);
    }
    if !s.fpu.handle_exceptions(ARITH_ALLOWED) {
        s.raise(FP_ABORT);
        return;
    }
    s.write_register_s(w.fd(), f);
}

pub fn cvt_s_d_dis(w: InstructionWord) -> String {
    format!("cvt.s.d {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn cvt_w_d<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.check_double_aligned(w.fs()) {
        s.raise(Exception::FpMisaligned);
        return;
    }
    let f = s.read_register_d(w.fs());
    let mode = s.fpu.fcsr.rm();
    let i = f64_to_i32(&mut s.fpu, f, mode);
    if !s.fpu.handle_exceptions(flag::INEXACT | flag::INVALID) {
        s.raise(FP_ABORT);
        return;
    }
    s.write_register_w(w.fd(), i);
}

pub fn cvt_w_d_dis(w: InstructionWord) -> String {
    format!("cvt.w.d {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn c_cond_d<C: Core>(w: InstructionWord, c: &mut C) {
    compare64(c, w.fs(), w.ft(), w.cond(), w.fcc());
}

pub fn c_cond_d_dis(w: InstructionWord) -> String {
    let cond = FP_COND_NAMES[w.cond() as usize];
    if w.fcc() == 0 {
        format!(
            "c.{}.d {},{}",
            cond,
            FP_REG_NAMES[w.fs()],
            FP_REG_NAMES[w.ft()]
        )
    } else {
        format!(
            "c.{}.d {},{},{}",
            cond,
            w.fcc(),
            FP_REG_NAMES[w.fs()],
            FP_REG_NAMES[w.ft()]
        )
    }
}

//
// Word format: integer-to-float conversions.
//

pub fn cvt_s_w<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    let i = s.read_register_w(w.fs());
    let f = i as f32;
    if f as f64 != i as f64 {
        s.fpu.signal_exception(flag::INEXACT);
    }
    if !s.fpu.handle_exceptions(flag::INEXACT) {
        s.raise(FP_ABORT);
        return;
    }
    s.write_register_s(w.fd(), f);
}

pub fn cvt_s_w_dis(w: InstructionWord) -> String {
    format!("cvt.s.w {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}

pub fn cvt_d_w<C: Core>(w: InstructionWord, c: &mut C) {
    let s = c.state_mut();
    if w.ft() != 0 {
        s.raise(Exception::ReservedInstruction);
        return;
    }
    if !s.fpu.cleanup_state() {
        return;
    }
    if !s.fpu.check_double_aligned(w.fd()) {
        s.raise(Exception::FpMisaligned);
        return;
    }
    let i = s.read_register_w(w.fs());
    s.write_register_d(w.fd(), i as f64);
}

pub fn cvt_d_w_dis(w: InstructionWord) -> String {
    format!("cvt.d.w {},{}", FP_REG_NAMES[w.fd()], FP_REG_NAMES[w.fs()])
}
