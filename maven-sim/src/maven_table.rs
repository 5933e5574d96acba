//! Control processor dispatch: the scalar MIPS32 base plus the COP0
//! system registers and the Maven vector command set.

use maven_core::error::Exception;
use maven_core::syscfg::cop0 as cop0_regs;
use maven_isa::handlers::fallback;
use maven_isa::names::{FLAG_NAMES, FP_COND_NAMES, REG_NAMES, VREG_NAMES};
use maven_isa::opcodes::{cop0, cop2, maven, op};
use maven_isa::{
    add_misc_ops, build_mips32_table, AluClass, DisasmFn, DispatchTable, Entry, ExecFn,
    InstructionWord,
};
use maven_vector::ElemWidth;

use crate::cp::Cp;

fn leaf(execute: ExecFn<Cp>, disassemble: DisasmFn) -> Entry<Cp> {
    Entry {
        execute,
        disassemble,
    }
}

//------------------------------------------------------------------------
// COP0
//------------------------------------------------------------------------

fn mfc0(w: InstructionWord, c: &mut Cp) {
    let val = match w.rd() as u32 {
        cop0_regs::CORE_ID => c.proc_id,
        cop0_regs::COUNT_LO => c.cop0_count() as u32,
        cop0_regs::COUNT_HI => (c.cop0_count() >> 32) as u32,
        cop0_regs::STATS_EN => c.stats_en as u32,
        cop0_regs::TID_MASK => c.tid_mask(),
        cop0_regs::TOHOST => c.tohost,
        cop0_regs::FROMHOST => c.fromhost,
        _ => {
            c.core.raise(Exception::ReservedInstruction);
            return;
        }
    };
    c.core.write_register(w.rt(), val);
}

fn mfc0_dis(w: InstructionWord) -> String {
    format!("mfc0 {},${}", REG_NAMES[w.rt()], w.rd())
}

fn mtc0(w: InstructionWord, c: &mut Cp) {
    match w.rd() as u32 {
        cop0_regs::STATS_EN => {
            let en = c.core.read_register(w.rt()) != 0;
            c.set_stats_en(en);
        }
        cop0_regs::TID_MASK => {
            let mask = c.core.read_register(w.rt());
            c.set_tid_mask(mask);
        }
        cop0_regs::TID_STOP => {
            c.tid_stop();
        }
        cop0_regs::TOHOST => c.tohost = c.core.read_register(w.rt()),
        cop0_regs::FROMHOST => c.fromhost = c.core.read_register(w.rt()),
        _ => c.core.raise(Exception::ReservedInstruction),
    }
}

fn mtc0_dis(w: InstructionWord) -> String {
    format!("mtc0 {},${}", REG_NAMES[w.rt()], w.rd())
}

/// The only trap redirect: control resumes at the saved exception pc.
fn eret(_w: InstructionWord, c: &mut Cp) {
    c.core.npc = c.epc;
}

fn eret_dis(_w: InstructionWord) -> String {
    "eret".to_string()
}

//------------------------------------------------------------------------
// VTU configuration and vector fetch
//------------------------------------------------------------------------

fn vcfgivl(w: InstructionWord, c: &mut Cp) {
    let nregs = w.immediate() as usize + 1;
    c.vparray.vcfg(nregs);
    let request = c.core.read_register(w.rs());
    let granted = c.vparray.setvl(request);
    c.core.write_register(w.rt(), granted);
}

fn vcfgivl_dis(w: InstructionWord) -> String {
    format!(
        "vcfgivl {},{},{}",
        REG_NAMES[w.rt()],
        REG_NAMES[w.rs()],
        w.immediate() + 1
    )
}

fn setvl_cmd(w: InstructionWord, c: &mut Cp) {
    let request = c.core.read_register(w.rs());
    let granted = c.vparray.setvl(request);
    c.core.write_register(w.rd(), granted);
}

fn setvl_dis(w: InstructionWord) -> String {
    format!("setvl {},{}", REG_NAMES[w.rd()], REG_NAMES[w.rs()])
}

/// Lane execution runs to completion before the next CP command, so the
/// vector syncs only validate their encodings.
fn sync_v(w: InstructionWord, c: &mut Cp) {
    if w.rs() > 1 {
        c.core.raise(Exception::ReservedInstruction);
    }
}

fn sync_v_dis(_w: InstructionWord) -> String {
    "sync.v".to_string()
}

fn sync_cv_dis(_w: InstructionWord) -> String {
    "sync.cv".to_string()
}

/// Vector fetch: the lane array runs a block and the CP waits for it.
fn vf(w: InstructionWord, c: &mut Cp) {
    if w.rs() != 0 || w.rt() != 0 {
        c.core.raise(Exception::ReservedInstruction);
        return;
    }
    let target = c.core.npc.wrapping_add((w.simm() << 2) as u32);
    c.vparray.go(target);
}

fn vf_dis(w: InstructionWord) -> String {
    format!("vf {}", w.simm())
}

//------------------------------------------------------------------------
// Vector memory
//------------------------------------------------------------------------

fn vmem_note_load(w: InstructionWord, c: &mut Cp) {
    c.core.note.alu = Some(AluClass::VLd);
    c.core.note.rs = w.rt();
    c.core.note.rd = w.rv();
    c.core.note.b_rs = true;
    c.core.note.b_rd = true;
}

fn vmem_note_store(w: InstructionWord, c: &mut Cp) {
    c.core.note.alu = Some(AluClass::VSt);
    c.core.note.rt = w.rv();
    c.core.note.b_rt = true;
}

fn vload(w: InstructionWord, c: &mut Cp) {
    let addr = c.core.read_register(w.rt());
    let n_elm = w.n() as usize + 1;
    match ElemWidth::decode(w.s(), w.u()) {
        Some(width) => {
            let stride = if w.opcode() == maven::CP_VLOAD_ST {
                c.core.read_register(w.rs())
            } else {
                n_elm as u32 * width.size()
            };
            c.vparray.vload(addr, w.rv(), stride, n_elm, width);
        }
        None => c.core.raise(Exception::ReservedInstruction),
    }
    vmem_note_load(w, c);
}

fn vload_dis(w: InstructionWord) -> String {
    let strided = w.opcode() == maven::CP_VLOAD_ST;
    let root = match (w.s(), w.u()) {
        (0x0, _) => "lw",
        (0x1, 0) => "lh",
        (0x1, _) => "lhu",
        (0x3, 0) => "lb",
        (0x3, _) => "lbu",
        _ => "l???",
    };
    if strided {
        format!(
            "{}st.v {},{},{}",
            root,
            VREG_NAMES[w.rv()],
            REG_NAMES[w.rt()],
            REG_NAMES[w.rs()]
        )
    } else {
        format!("{}.v {},{}", root, VREG_NAMES[w.rv()], REG_NAMES[w.rt()])
    }
}

fn vstore(w: InstructionWord, c: &mut Cp) {
    let addr = c.core.read_register(w.rt());
    let n_elm = w.n() as usize + 1;
    if w.u() != 1 {
        c.core.raise(Exception::ReservedInstruction);
        vmem_note_store(w, c);
        return;
    }
    match ElemWidth::decode(w.s(), 1) {
        Some(width) => {
            let stride = if w.opcode() == maven::CP_VSTORE_ST {
                c.core.read_register(w.rs())
            } else {
                n_elm as u32 * width.size()
            };
            c.vparray.vstore(addr, w.rv(), stride, n_elm, width);
        }
        None => c.core.raise(Exception::ReservedInstruction),
    }
    vmem_note_store(w, c);
}

fn vstore_dis(w: InstructionWord) -> String {
    let strided = w.opcode() == maven::CP_VSTORE_ST;
    let root = match w.s() {
        0x0 => "sw",
        0x1 => "sh",
        0x3 => "sb",
        _ => "s???",
    };
    if strided {
        format!(
            "{}st.v {},{},{}",
            root,
            VREG_NAMES[w.rv()],
            REG_NAMES[w.rt()],
            REG_NAMES[w.rs()]
        )
    } else {
        format!("{}.v {},{}", root, VREG_NAMES[w.rv()], REG_NAMES[w.rt()])
    }
}

fn vload_x(w: InstructionWord, c: &mut Cp) {
    let base = c.core.read_register(w.rt());
    match ElemWidth::decode(w.s(), w.u()) {
        Some(width) => c.vparray.vload_x(w.rd(), base, w.rs(), width),
        None => c.core.raise(Exception::ReservedInstruction),
    }
    c.core.note.alu = Some(AluClass::Ld);
    c.core.note.rs = w.rt();
    c.core.note.rd = w.rv();
    c.core.note.b_rs = true;
    c.core.note.b_rd = true;
}

fn vload_x_dis(w: InstructionWord) -> String {
    let root = match (w.s(), w.u()) {
        (0x0, _) => "lwx",
        (0x1, 0) => "lhx",
        (0x1, _) => "lhux",
        (0x3, 0) => "lbx",
        (0x3, _) => "lbux",
        _ => "l???x",
    };
    format!(
        "{}.v {},{},{}",
        root,
        VREG_NAMES[w.rd()],
        REG_NAMES[w.rt()],
        VREG_NAMES[w.rs()]
    )
}

fn vstore_x(w: InstructionWord, c: &mut Cp) {
    let base = c.core.read_register(w.rt());
    if w.u() != 1 {
        c.core.raise(Exception::ReservedInstruction);
        return;
    }
    match ElemWidth::decode(w.s(), 1) {
        Some(width) => c.vparray.vstore_x(w.rd(), base, w.rs(), width),
        None => c.core.raise(Exception::ReservedInstruction),
    }
    c.core.note.alu = Some(AluClass::St);
    c.core.note.rs = w.rt();
    c.core.note.rt = w.rv();
    c.core.note.b_rs = true;
    c.core.note.b_rt = true;
}

fn vstore_x_dis(w: InstructionWord) -> String {
    let root = match w.s() {
        0x0 => "swx",
        0x1 => "shx",
        0x3 => "sbx",
        _ => "s???x",
    };
    format!(
        "{}.v {},{},{}",
        root,
        VREG_NAMES[w.rd()],
        REG_NAMES[w.rt()],
        VREG_NAMES[w.rs()]
    )
}

//------------------------------------------------------------------------
// Cross-VP moves
//------------------------------------------------------------------------

fn mtvp(w: InstructionWord, c: &mut Cp) {
    let vp_id = c.core.read_register(w.rs()) as usize;
    let value = c.core.read_register(w.rt());
    c.vparray.mtvp(vp_id, w.rd(), value);
}

fn mtvp_dis(w: InstructionWord) -> String {
    format!(
        "mtvp {},{},{}",
        REG_NAMES[w.rs()],
        VREG_NAMES[w.rd()],
        REG_NAMES[w.rt()]
    )
}

fn mfvp(w: InstructionWord, c: &mut Cp) {
    let vp_id = c.core.read_register(w.rs()) as usize;
    let value = c.vparray.mfvp(vp_id, w.rd());
    c.core.write_register(w.rt(), value);
}

fn mfvp_dis(w: InstructionWord) -> String {
    format!(
        "mfvp {},{},{}",
        REG_NAMES[w.rt()],
        REG_NAMES[w.rs()],
        VREG_NAMES[w.rd()]
    )
}

fn mtvps(w: InstructionWord, c: &mut Cp) {
    let value = c.core.read_register(w.rt());
    c.vparray.mtvps(w.rd(), value);
}

fn mtvps_dis(w: InstructionWord) -> String {
    format!("mtvps {},{}", VREG_NAMES[w.rd()], REG_NAMES[w.rt()])
}

fn mtmfvpsf(w: InstructionWord, c: &mut Cp) {
    c.vparray.mtmfvpsf(w.rd(), w.rs(), w.cmd());
}

fn mtmfvpsf_dis(w: InstructionWord) -> String {
    if w.cmd() == cop2::MTVPS_F {
        format!("mtvps.f {},{}", VREG_NAMES[w.rd()], FLAG_NAMES[w.rs() & 0x7])
    } else {
        format!("mfvps.f {},{}", FLAG_NAMES[w.rd() & 0x7], VREG_NAMES[w.rs()])
    }
}

fn popcf(w: InstructionWord, c: &mut Cp) {
    let count = c.vparray.popcf(w.rs());
    c.core.write_register(w.rd(), count);
}

fn popcf_dis(w: InstructionWord) -> String {
    format!("popc.f {},{}", REG_NAMES[w.rd()], FLAG_NAMES[w.rs() & 0x7])
}

fn findfonef(w: InstructionWord, c: &mut Cp) {
    let idx = c.vparray.findfonef(w.rs());
    c.core.write_register(w.rd(), idx);
}

fn findfonef_dis(w: InstructionWord) -> String {
    format!("findfone.f {},{}", REG_NAMES[w.rd()], FLAG_NAMES[w.rs() & 0x7])
}

//------------------------------------------------------------------------
// Vector arithmetic and flags
//------------------------------------------------------------------------

/// Mnemonic for a vector command code, for disassembly only.
fn cmd_name(cmd: u32) -> &'static str {
    match cmd {
        cop2::ADDU_VV => "addu.vv",
        cop2::ADDU_VS => "addu.vs",
        cop2::SUBU_VV => "subu.vv",
        cop2::SUBU_VS => "subu.vs",
        cop2::SUBU_SV => "subu.sv",
        cop2::MUL_VV => "mul.vv",
        cop2::MUL_VS => "mul.vs",
        cop2::MULHI_VV => "mulhi.vv",
        cop2::MULHI_VS => "mulhi.vs",
        cop2::DIV_VV => "div.vv",
        cop2::DIV_VS => "div.vs",
        cop2::DIV_SV => "div.sv",
        cop2::REM_VV => "rem.vv",
        cop2::REM_VS => "rem.vs",
        cop2::REM_SV => "rem.sv",
        cop2::DIVU_VV => "divu.vv",
        cop2::DIVU_VS => "divu.vs",
        cop2::DIVU_SV => "divu.sv",
        cop2::REMU_VV => "remu.vv",
        cop2::REMU_VS => "remu.vs",
        cop2::REMU_SV => "remu.sv",
        cop2::SLL_VV => "sll.vv",
        cop2::SLL_VS => "sll.vs",
        cop2::SLL_SV => "sll.sv",
        cop2::SRL_VV => "srl.vv",
        cop2::SRL_VS => "srl.vs",
        cop2::SRL_SV => "srl.sv",
        cop2::SRA_VV => "sra.vv",
        cop2::SRA_VS => "sra.vs",
        cop2::SRA_SV => "sra.sv",
        cop2::AND_VV => "and.vv",
        cop2::AND_VS => "and.vs",
        cop2::OR_VV => "or.vv",
        cop2::OR_VS => "or.vs",
        cop2::XOR_VV => "xor.vv",
        cop2::XOR_VS => "xor.vs",
        cop2::NOR_VV => "nor.vv",
        cop2::NOR_VS => "nor.vs",
        cop2::BITREV_V => "bitrev.v",
        cop2::ADD_S_VV => "add.s.vv",
        cop2::ADD_S_VS => "add.s.vs",
        cop2::ADD_S_SV => "add.s.sv",
        cop2::SUB_S_VV => "sub.s.vv",
        cop2::SUB_S_VS => "sub.s.vs",
        cop2::SUB_S_SV => "sub.s.sv",
        cop2::MUL_S_VV => "mul.s.vv",
        cop2::MUL_S_VS => "mul.s.vs",
        cop2::MUL_S_SV => "mul.s.sv",
        cop2::DIV_S_VV => "div.s.vv",
        cop2::DIV_S_VS => "div.s.vs",
        cop2::DIV_S_SV => "div.s.sv",
        cop2::ABS_S_V => "abs.s.v",
        cop2::NEG_S_V => "neg.s.v",
        cop2::ROUND_W_S_V => "round.w.s.v",
        cop2::TRUNC_W_S_V => "trunc.w.s.v",
        cop2::CEIL_W_S_V => "ceil.w.s.v",
        cop2::FLOOR_W_S_V => "floor.w.s.v",
        cop2::RECIP_S_V => "recip.s.v",
        cop2::RSQRT_S_V => "rsqrt.s.v",
        cop2::SQRT_S_V => "sqrt.s.v",
        cop2::CVT_S_W_V => "cvt.s.w.v",
        cop2::CVT_W_S_V => "cvt.w.s.v",
        cop2::SEQ_F_VV => "seq.f.vv",
        cop2::SLT_F_VV => "slt.f.vv",
        cop2::SLTU_F_VV => "sltu.f.vv",
        cop2::NOT_F => "not.f",
        cop2::MOV_F => "mov.f",
        cop2::OR_F => "or.f",
        cop2::AND_F => "and.f",
        cop2::UTIDX_V => "utidx.v",
        cop2::AMO_ADD_VV => "amo.add.vv",
        cop2::AMO_AND_VV => "amo.and.vv",
        cop2::AMO_OR_VV => "amo.or.vv",
        _ => ".cop2",
    }
}

fn mask_suffix(w: InstructionWord) -> String {
    if w.msk() != 0 {
        format!(",{}", FLAG_NAMES[w.msk() & 0x7])
    } else {
        String::new()
    }
}

fn arith_vv(w: InstructionWord, c: &mut Cp) {
    c.vparray.arith_vv(w.rd(), w.rs(), w.rt(), w.msk(), w.cmd());
}

fn arith_vv_dis(w: InstructionWord) -> String {
    format!(
        "{} {},{},{}{}",
        cmd_name(w.cmd()),
        VREG_NAMES[w.rd()],
        VREG_NAMES[w.rs()],
        VREG_NAMES[w.rt()],
        mask_suffix(w)
    )
}

/// Covers both .vs and .sv encodings; the scalar always rides in rs.
fn arith_vs(w: InstructionWord, c: &mut Cp) {
    let sdata = c.core.read_register(w.rs());
    c.vparray.arith_vs(w.rd(), sdata, w.rt(), w.msk(), w.cmd());
}

fn arith_vs_dis(w: InstructionWord) -> String {
    format!(
        "{} {},{},{}{}",
        cmd_name(w.cmd()),
        VREG_NAMES[w.rd()],
        VREG_NAMES[w.rt()],
        REG_NAMES[w.rs()],
        mask_suffix(w)
    )
}

fn arith_v(w: InstructionWord, c: &mut Cp) {
    c.vparray.arith_v(w.rd(), w.rt(), w.msk(), w.cmd());
}

fn arith_v_dis(w: InstructionWord) -> String {
    format!(
        "{} {},{}{}",
        cmd_name(w.cmd()),
        VREG_NAMES[w.rd()],
        VREG_NAMES[w.rt()],
        mask_suffix(w)
    )
}

fn arith_s_vv(w: InstructionWord, c: &mut Cp) {
    c.vparray.arith_s_vv(w.rd(), w.rs(), w.rt(), w.msk(), w.cmd());
}

fn arith_s_vs(w: InstructionWord, c: &mut Cp) {
    let sdata = c.core.read_register(w.rs());
    c.vparray.arith_s_vs(w.rd(), sdata, w.rt(), w.msk(), w.cmd());
}

fn arith_s_v(w: InstructionWord, c: &mut Cp) {
    c.vparray.arith_s_v(w.rd(), w.rt(), w.msk(), w.cmd());
}

fn setflag(w: InstructionWord, c: &mut Cp) {
    c.vparray.setflag(w.rd(), w.rs(), w.rt(), w.cmd());
}

fn setflag_dis(w: InstructionWord) -> String {
    format!(
        "{} {},{},{}",
        cmd_name(w.cmd()),
        FLAG_NAMES[w.rd() & 0x7],
        VREG_NAMES[w.rs()],
        VREG_NAMES[w.rt()]
    )
}

fn sf_setflag_vv(w: InstructionWord, c: &mut Cp) {
    c.vparray.sf_setflag_vv(w.rd(), w.rs(), w.rt(), w.cmd());
}

fn sf_setflag_vv_dis(w: InstructionWord) -> String {
    format!(
        "c.{}.s.f.vv {},{},{}",
        FP_COND_NAMES[(w.cmd() & 0xf) as usize],
        FLAG_NAMES[w.rd() & 0x7],
        VREG_NAMES[w.rs()],
        VREG_NAMES[w.rt()]
    )
}

fn sf_setflag_vs(w: InstructionWord, c: &mut Cp) {
    let rsrc = c.core.read_register(w.rt());
    c.vparray.sf_setflag_vs(w.rd(), w.rs(), rsrc, w.cmd());
}

fn sf_setflag_vs_dis(w: InstructionWord) -> String {
    format!(
        "c.{}.s.f.vs {},{},{}",
        FP_COND_NAMES[(w.cmd() & 0xf) as usize],
        FLAG_NAMES[w.rd() & 0x7],
        VREG_NAMES[w.rs()],
        REG_NAMES[w.rt()]
    )
}

fn sf_setflag_sv(w: InstructionWord, c: &mut Cp) {
    let rsrc = c.core.read_register(w.rs());
    c.vparray.sf_setflag_sv(w.rd(), rsrc, w.rt(), w.cmd());
}

fn sf_setflag_sv_dis(w: InstructionWord) -> String {
    format!(
        "c.{}.s.f.sv {},{},{}",
        FP_COND_NAMES[(w.cmd() & 0xf) as usize],
        FLAG_NAMES[w.rd() & 0x7],
        REG_NAMES[w.rs()],
        VREG_NAMES[w.rt()]
    )
}

fn flagops(w: InstructionWord, c: &mut Cp) {
    c.vparray.flagops(w.rd(), w.rs(), w.rt(), w.cmd());
}

fn flagops_dis(w: InstructionWord) -> String {
    match w.cmd() {
        cop2::NOT_F | cop2::MOV_F => format!(
            "{} {},{}",
            cmd_name(w.cmd()),
            FLAG_NAMES[w.rd() & 0x7],
            FLAG_NAMES[w.rs() & 0x7]
        ),
        _ => format!(
            "{} {},{},{}",
            cmd_name(w.cmd()),
            FLAG_NAMES[w.rd() & 0x7],
            FLAG_NAMES[w.rs() & 0x7],
            FLAG_NAMES[w.rt() & 0x7]
        ),
    }
}

fn amo_vv(w: InstructionWord, c: &mut Cp) {
    c.vparray.amo_vv(w.rd(), w.rs(), w.rt(), w.msk(), w.cmd());
}

fn amo_vv_dis(w: InstructionWord) -> String {
    format!(
        "{} {},{},{}{}",
        cmd_name(w.cmd()),
        VREG_NAMES[w.rd()],
        VREG_NAMES[w.rs()],
        VREG_NAMES[w.rt()],
        mask_suffix(w)
    )
}

fn utidx_v(w: InstructionWord, c: &mut Cp) {
    c.vparray.utidx_v(w.rd(), w.cmd());
}

fn utidx_v_dis(w: InstructionWord) -> String {
    format!("utidx.v {}{}", VREG_NAMES[w.rd()], mask_suffix(w))
}

//------------------------------------------------------------------------
// Table assembly
//------------------------------------------------------------------------

fn build_cop0_table() -> DispatchTable<Cp> {
    let mut t = DispatchTable::new(21, 0x1f, fallback());
    t.register(cop0::MFC0, leaf(mfc0, mfc0_dis));
    t.register(cop0::MTC0, leaf(mtc0, mtc0_dis));
    let mut co = DispatchTable::new(0, 0x3f, fallback());
    co.register(0x18, leaf(eret, eret_dis));
    t.register_subtable(cop0::ERET, co);
    t
}

fn build_cop2_table() -> DispatchTable<Cp> {
    let mut t = DispatchTable::new(0, 0xff, fallback());

    t.register(cop2::SETVL, leaf(setvl_cmd, setvl_dis));
    t.register(cop2::SYNC_V, leaf(sync_v, sync_v_dis));
    t.register(cop2::SYNC_CV, leaf(sync_v, sync_cv_dis));
    t.register(cop2::MTVP, leaf(mtvp, mtvp_dis));
    t.register(cop2::MTVPS, leaf(mtvps, mtvps_dis));
    t.register(cop2::MFVP, leaf(mfvp, mfvp_dis));

    for cmd in [
        cop2::ADDU_VV,
        cop2::SUBU_VV,
        cop2::MUL_VV,
        cop2::MULHI_VV,
        cop2::DIV_VV,
        cop2::REM_VV,
        cop2::DIVU_VV,
        cop2::REMU_VV,
        cop2::SLL_VV,
        cop2::SRL_VV,
        cop2::SRA_VV,
        cop2::AND_VV,
        cop2::OR_VV,
        cop2::XOR_VV,
        cop2::NOR_VV,
    ] {
        t.register(cmd, leaf(arith_vv, arith_vv_dis));
    }
    for cmd in [
        cop2::ADDU_VS,
        cop2::SUBU_VS,
        cop2::SUBU_SV,
        cop2::MUL_VS,
        cop2::MULHI_VS,
        cop2::DIV_VS,
        cop2::DIV_SV,
        cop2::REM_VS,
        cop2::REM_SV,
        cop2::DIVU_VS,
        cop2::DIVU_SV,
        cop2::REMU_VS,
        cop2::REMU_SV,
        cop2::SLL_VS,
        cop2::SLL_SV,
        cop2::SRL_VS,
        cop2::SRL_SV,
        cop2::SRA_VS,
        cop2::SRA_SV,
        cop2::AND_VS,
        cop2::OR_VS,
        cop2::XOR_VS,
        cop2::NOR_VS,
    ] {
        t.register(cmd, leaf(arith_vs, arith_vs_dis));
    }
    t.register(cop2::BITREV_V, leaf(arith_v, arith_v_dis));
    t.register(cop2::UTIDX_V, leaf(utidx_v, utidx_v_dis));

    for cmd in [
        cop2::ADD_S_VV,
        cop2::SUB_S_VV,
        cop2::MUL_S_VV,
        cop2::DIV_S_VV,
    ] {
        t.register(cmd, leaf(arith_s_vv, arith_vv_dis));
    }
    for cmd in [
        cop2::ADD_S_VS,
        cop2::ADD_S_SV,
        cop2::SUB_S_VS,
        cop2::SUB_S_SV,
        cop2::MUL_S_VS,
        cop2::MUL_S_SV,
        cop2::DIV_S_VS,
        cop2::DIV_S_SV,
    ] {
        t.register(cmd, leaf(arith_s_vs, arith_vs_dis));
    }
    for cmd in [
        cop2::ABS_S_V,
        cop2::NEG_S_V,
        cop2::ROUND_W_S_V,
        cop2::TRUNC_W_S_V,
        cop2::CEIL_W_S_V,
        cop2::FLOOR_W_S_V,
        cop2::RECIP_S_V,
        cop2::RSQRT_S_V,
        cop2::SQRT_S_V,
        cop2::CVT_S_W_V,
        cop2::CVT_W_S_V,
    ] {
        t.register(cmd, leaf(arith_s_v, arith_v_dis));
    }

    for cmd in [cop2::SEQ_F_VV, cop2::SLT_F_VV, cop2::SLTU_F_VV] {
        t.register(cmd, leaf(setflag, setflag_dis));
    }
    for cond in 0..16 {
        t.register(cop2::C_F_VV_BASE + cond, leaf(sf_setflag_vv, sf_setflag_vv_dis));
        t.register(cop2::C_F_VS_BASE + cond, leaf(sf_setflag_vs, sf_setflag_vs_dis));
        t.register(cop2::C_F_SV_BASE + cond, leaf(sf_setflag_sv, sf_setflag_sv_dis));
    }
    for cmd in [cop2::NOT_F, cop2::MOV_F, cop2::OR_F, cop2::AND_F] {
        t.register(cmd, leaf(flagops, flagops_dis));
    }

    t.register(cop2::MTVPS_F, leaf(mtmfvpsf, mtmfvpsf_dis));
    t.register(cop2::MFVPS_F, leaf(mtmfvpsf, mtmfvpsf_dis));
    t.register(cop2::POPC_F, leaf(popcf, popcf_dis));
    t.register(cop2::FINDFONE_F, leaf(findfonef, findfonef_dis));

    for cmd in [cop2::AMO_ADD_VV, cop2::AMO_AND_VV, cop2::AMO_OR_VV] {
        t.register(cmd, leaf(amo_vv, amo_vv_dis));
    }

    t
}

/// The full control processor dispatch table.
pub fn build_cp_table() -> DispatchTable<Cp> {
    let mut t = build_mips32_table::<Cp>();
    add_misc_ops(&mut t);

    t.register_subtable(op::COP0, build_cop0_table());
    t.register_subtable(op::COP2, build_cop2_table());

    t.register(maven::CP_VCFGIVL, leaf(vcfgivl, vcfgivl_dis));
    t.register(maven::CP_VF, leaf(vf, vf_dis));
    t.register(maven::CP_VLOAD, leaf(vload, vload_dis));
    t.register(maven::CP_VLOAD_ST, leaf(vload, vload_dis));
    t.register(maven::CP_VLOAD_X, leaf(vload_x, vload_x_dis));
    t.register(maven::CP_VSTORE, leaf(vstore, vstore_dis));
    t.register(maven::CP_VSTORE_ST, leaf(vstore, vstore_dis));
    t.register(maven::CP_VSTORE_X, leaf(vstore_x, vstore_x_dis));
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    use maven_core::config::PvfbPolicy;
    use maven_core::context::SimContext;
    use maven_core::mem::MemoryImage;
    use maven_isa::insn::{encode_cmd, encode_i_type};

    fn cp() -> Cp {
        Cp::new(
            MemoryImage::shared(4096),
            SimContext::new(),
            Arc::new(AtomicU32::new(0x1)),
            0,
            PvfbPolicy::Stack,
        )
    }

    #[test]
    fn setvl_command_clamps_and_writes_back() {
        let table = build_cp_table();
        let mut c = cp();
        c.core.write_register(8, 100);
        let w = encode_cmd(op::COP2, 8, 0, 9, 0, cop2::SETVL);
        table.execute(w, &mut c);
        assert_eq!(c.core.read_register(9), 32);
        assert_eq!(c.vparray.vl(), 32);
    }

    #[test]
    fn vector_addu_through_dispatch() {
        let table = build_cp_table();
        let mut c = cp();
        c.vparray.setvl(2);
        c.vparray.mtvp(0, 1, 4);
        c.vparray.mtvp(1, 1, 5);
        c.vparray.mtvp(0, 2, 10);
        c.vparray.mtvp(1, 2, 10);
        let w = encode_cmd(op::COP2, 1, 2, 3, 0, cop2::ADDU_VV);
        table.execute(w, &mut c);
        assert_eq!(c.vparray.mfvp(0, 3), 14);
        assert_eq!(c.vparray.mfvp(1, 3), 15);
        assert_eq!(table.disassemble(w), "addu.vv vr3,vr1,vr2");
    }

    #[test]
    fn mfc0_reads_core_id_and_reserved_raises() {
        let table = build_cp_table();
        let mut c = cp();
        c.proc_id = 3;
        let mut w = InstructionWord::new(op::COP0 << 26);
        w.set_rs(cop0::MFC0).set_rt(5).set_rd(17);
        table.execute(w, &mut c);
        assert_eq!(c.core.read_register(5), 3);

        let mut bad = InstructionWord::new(op::COP0 << 26);
        bad.set_rs(cop0::MFC0).set_rt(5).set_rd(12);
        table.execute(bad, &mut c);
        assert_eq!(c.core.exception, Some(Exception::ReservedInstruction));
    }

    #[test]
    fn eret_redirects_npc_only() {
        let table = build_cp_table();
        let mut c = cp();
        c.epc = 0x1234_5678;
        let mut w = InstructionWord::new(op::COP0 << 26);
        w.set_rs(cop0::ERET).set_func(0x18);
        table.execute(w, &mut c);
        assert_eq!(c.core.npc, 0x1234_5678);
        assert!(!c.core.branch);
    }

    #[test]
    fn vcfgivl_configures_and_grants() {
        let table = build_cp_table();
        let mut c = cp();
        c.vparray.set_num_physical_regs(256);
        c.core.write_register(8, 100);
        // 32 registers per lane: 8 lanes fit.
        let w = encode_i_type(maven::CP_VCFGIVL, 8, 9, 31);
        table.execute(w, &mut c);
        assert_eq!(c.core.read_register(9), 8);
        assert_eq!(c.vparray.vl(), 8);
    }

    #[test]
    fn vstore_requires_unsigned_encoding() {
        let table = build_cp_table();
        let mut c = cp();
        let mut w = InstructionWord::new(maven::CP_VSTORE << 26);
        w.set_rt(0).set_rv(1).set_u(0).set_s(0);
        table.execute(w, &mut c);
        assert_eq!(c.core.exception, Some(Exception::ReservedInstruction));
    }

    #[test]
    fn malformed_vf_raises() {
        let table = build_cp_table();
        let mut c = cp();
        let mut w = InstructionWord::new(maven::CP_VF << 26);
        w.set_rs(1);
        table.execute(w, &mut c);
        assert_eq!(c.core.exception, Some(Exception::ReservedInstruction));
    }
}
