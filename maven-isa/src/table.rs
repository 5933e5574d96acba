//! Dispatch table construction for the base MIPS32 set and the extra
//! MISC group shared by the control processor and the vector lanes.

use crate::dispatch::{DisasmFn, DispatchTable, Entry, ExecFn};
use crate::handlers::{cop1, fallback, misc, opcode, regimm, reserved, special, special2};
use crate::opcodes::{cop1 as c1, fpfunc, misc as mi, op, regimm as ri, special as sp, special2 as sp2};
use crate::state::Core;

fn leaf<C: Core>(execute: ExecFn<C>, disassemble: DisasmFn) -> Entry<C> {
    Entry {
        execute,
        disassemble,
    }
}

fn build_special<C: Core>() -> DispatchTable<C> {
    let mut t = DispatchTable::new(0, 0x3f, fallback::<C>());

    // movf/movt share a function code, split on the tf bit.
    let mut movci = DispatchTable::new(16, 0x1, fallback::<C>());
    movci.register(0, leaf(special::movf::<C>, special::movf_dis));
    movci.register(1, leaf(special::movt::<C>, special::movt_dis));
    t.register_subtable(sp::MOVCI, movci);

    t.register(sp::SLL, leaf(special::sll::<C>, special::sll_dis));
    t.register(sp::SRL, leaf(special::srl::<C>, special::srl_dis));
    t.register(sp::SRA, leaf(special::sra::<C>, special::sra_dis));
    t.register(sp::SLLV, leaf(special::sllv::<C>, special::sllv_dis));
    t.register(sp::SRLV, leaf(special::srlv::<C>, special::srlv_dis));
    t.register(sp::SRAV, leaf(special::srav::<C>, special::srav_dis));
    t.register(sp::JR, leaf(special::jr::<C>, special::jr_dis));
    t.register(sp::JALR, leaf(special::jalr::<C>, special::jalr_dis));
    t.register(sp::MOVZ, leaf(special::movz::<C>, special::movz_dis));
    t.register(sp::MOVN, leaf(special::movn::<C>, special::movn_dis));
    t.register(sp::SYSCALL, leaf(special::syscall::<C>, special::syscall_dis));
    t.register(sp::BREAK, leaf(special::brk::<C>, special::brk_dis));
    t.register(sp::SYNC, leaf(special::sync::<C>, special::sync_dis));
    t.register(sp::MFHI, leaf(special::mfhi::<C>, special::mfhi_dis));
    t.register(sp::MTHI, leaf(special::mthi::<C>, special::mthi_dis));
    t.register(sp::MFLO, leaf(special::mflo::<C>, special::mflo_dis));
    t.register(sp::MTLO, leaf(special::mtlo::<C>, special::mtlo_dis));
    t.register(sp::MULT, leaf(special::mult::<C>, special::mult_dis));
    t.register(sp::MULTU, leaf(special::multu::<C>, special::multu_dis));
    t.register(sp::DIV, leaf(special::div::<C>, special::div_dis));
    t.register(sp::DIVU, leaf(special::divu::<C>, special::divu_dis));
    t.register(sp::ADD, leaf(special::add::<C>, special::add_dis));
    t.register(sp::ADDU, leaf(special::addu::<C>, special::addu_dis));
    t.register(sp::SUB, leaf(special::sub::<C>, special::sub_dis));
    t.register(sp::SUBU, leaf(special::subu::<C>, special::subu_dis));
    t.register(sp::AND, leaf(special::and::<C>, special::and_dis));
    t.register(sp::OR, leaf(special::or::<C>, special::or_dis));
    t.register(sp::XOR, leaf(special::xor::<C>, special::xor_dis));
    t.register(sp::NOR, leaf(special::nor::<C>, special::nor_dis));
    t.register(sp::SLT, leaf(special::slt::<C>, special::slt_dis));
    t.register(sp::SLTU, leaf(special::sltu::<C>, special::sltu_dis));
    t.register(sp::TGE, leaf(special::tge::<C>, special::tge_dis));
    t.register(sp::TGEU, leaf(special::tgeu::<C>, special::tgeu_dis));
    t.register(sp::TLT, leaf(special::tlt::<C>, special::tlt_dis));
    t.register(sp::TLTU, leaf(special::tltu::<C>, special::tltu_dis));
    t.register(sp::TEQ, leaf(special::teq::<C>, special::teq_dis));
    t.register(sp::TNE, leaf(special::tne::<C>, special::tne_dis));
    t
}

fn build_regimm<C: Core>() -> DispatchTable<C> {
    let mut t = DispatchTable::new(16, 0x1f, fallback::<C>());
    t.register(ri::BLTZ, leaf(regimm::bltz::<C>, regimm::bltz_dis));
    t.register(ri::BGEZ, leaf(regimm::bgez::<C>, regimm::bgez_dis));
    t.register(ri::BLTZL, leaf(regimm::bltzl::<C>, regimm::bltzl_dis));
    t.register(ri::BGEZL, leaf(regimm::bgezl::<C>, regimm::bgezl_dis));
    t.register(ri::TGEI, leaf(regimm::tgei::<C>, regimm::tgei_dis));
    t.register(ri::TGEIU, leaf(regimm::tgeiu::<C>, regimm::tgeiu_dis));
    t.register(ri::TLTI, leaf(regimm::tlti::<C>, regimm::tlti_dis));
    t.register(ri::TLTIU, leaf(regimm::tltiu::<C>, regimm::tltiu_dis));
    t.register(ri::TEQI, leaf(regimm::teqi::<C>, regimm::teqi_dis));
    t.register(ri::TNEI, leaf(regimm::tnei::<C>, regimm::tnei_dis));
    t.register(ri::BLTZAL, leaf(regimm::bltzal::<C>, regimm::bltzal_dis));
    t.register(ri::BGEZAL, leaf(regimm::bgezal::<C>, regimm::bgezal_dis));
    t.register(ri::BLTZALL, leaf(regimm::bltzall::<C>, regimm::bltzall_dis));
    t.register(ri::BGEZALL, leaf(regimm::bgezall::<C>, regimm::bgezall_dis));
    t.register(ri::SYNCI, leaf(reserved::<C>, regimm::synci_dis));
    t
}

fn build_special2<C: Core>() -> DispatchTable<C> {
    let mut t = DispatchTable::new(0, 0x3f, fallback::<C>());
    t.register(sp2::MADD, leaf(reserved::<C>, special2::madd_dis));
    t.register(sp2::MADDU, leaf(reserved::<C>, special2::maddu_dis));
    t.register(sp2::MUL, leaf(special2::mul::<C>, special2::mul_dis));
    t.register(sp2::MSUB, leaf(reserved::<C>, special2::msub_dis));
    t.register(sp2::MSUBU, leaf(reserved::<C>, special2::msubu_dis));
    t.register(sp2::CLZ, leaf(special2::clz::<C>, special2::clz_dis));
    t.register(sp2::CLO, leaf(special2::clo::<C>, special2::clo_dis));
    t
}

fn build_fmt_s<C: Core>() -> DispatchTable<C> {
    let mut t = DispatchTable::new(0, 0x3f, fallback::<C>());
    t.register(fpfunc::ADD, leaf(cop1::add_s::<C>, cop1::add_s_dis));
    t.register(fpfunc::SUB, leaf(cop1::sub_s::<C>, cop1::sub_s_dis));
    t.register(fpfunc::MUL, leaf(cop1::mul_s::<C>, cop1::mul_s_dis));
    t.register(fpfunc::DIV, leaf(cop1::div_s::<C>, cop1::div_s_dis));
    t.register(fpfunc::SQRT, leaf(cop1::sqrt_s::<C>, cop1::sqrt_s_dis));
    t.register(fpfunc::ABS, leaf(cop1::abs_s::<C>, cop1::abs_s_dis));
    t.register(fpfunc::MOV, leaf(cop1::mov_s::<C>, cop1::mov_s_dis));
    t.register(fpfunc::NEG, leaf(cop1::neg_s::<C>, cop1::neg_s_dis));
    t.register(fpfunc::ROUND_W, leaf(cop1::round_w_s::<C>, cop1::round_w_s_dis));
    t.register(fpfunc::TRUNC_W, leaf(cop1::trunc_w_s::<C>, cop1::trunc_w_s_dis));
    t.register(fpfunc::CEIL_W, leaf(cop1::ceil_w_s::<C>, cop1::ceil_w_s_dis));
    t.register(fpfunc::FLOOR_W, leaf(cop1::floor_w_s::<C>, cop1::floor_w_s_dis));
    t.register(fpfunc::MOVCF, leaf(cop1::movcf_s::<C>, cop1::movcf_s_dis));
    t.register(fpfunc::MOVZ, leaf(cop1::movz_s::<C>, cop1::movz_s_dis));
    t.register(fpfunc::MOVN, leaf(cop1::movn_s::<C>, cop1::movn_s_dis));
    t.register(fpfunc::CVT_D, leaf(cop1::cvt_d_s::<C>, cop1::cvt_d_s_dis));
    t.register(fpfunc::CVT_W, leaf(cop1::cvt_w_s::<C>, cop1::cvt_w_s_dis));
    for cond in 0..16 {
        t.register(
            fpfunc::C_COND_BASE + cond,
            leaf(cop1::c_cond_s::<C>, cop1::c_cond_s_dis),
        );
    }
    t
}

fn build_fmt_d<C: Core>() -> DispatchTable<C> {
    let mut t = DispatchTable::new(0, 0x3f, fallback::<C>());
    t.register(fpfunc::ADD, leaf(cop1::add_d::<C>, cop1::add_d_dis));
    t.register(fpfunc::SUB, leaf(cop1::sub_d::<C>, cop1::sub_d_dis));
    t.register(fpfunc::MUL, leaf(cop1::mul_d::<C>, cop1::mul_d_dis));
    t.register(fpfunc::DIV, leaf(cop1::div_d::<C>, cop1::div_d_dis));
    t.register(fpfunc::SQRT, leaf(cop1::sqrt_d::<C>, cop1::sqrt_d_dis));
    t.register(fpfunc::ABS, leaf(cop1::abs_d::<C>, cop1::abs_d_dis));
    t.register(fpfunc::MOV, leaf(cop1::mov_d::<C>, cop1::mov_d_dis));
    t.register(fpfunc::NEG, leaf(cop1::neg_d::<C>, cop1::neg_d_dis));
    t.register(fpfunc::ROUND_W, leaf(cop1::round_w_d::<C>, cop1::round_w_d_dis));
    t.register(fpfunc::TRUNC_W, leaf(cop1::trunc_w_d::<C>, cop1::trunc_w_d_dis));
    t.register(fpfunc::CEIL_W, leaf(cop1::ceil_w_d::<C>, cop1::ceil_w_d_dis));
    t.register(fpfunc::FLOOR_W, leaf(cop1::floor_w_d::<C>, cop1::floor_w_d_dis));
    t.register(fpfunc::MOVCF, leaf(cop1::movcf_d::<C>, cop1::movcf_d_dis));
    t.register(fpfunc::MOVZ, leaf(cop1::movz_d::<C>, cop1::movz_d_dis));
    t.register(fpfunc::MOVN, leaf(cop1::movn_d::<C>, cop1::movn_d_dis));
    t.register(fpfunc::CVT_S, leaf(cop1::cvt_s_d::<C>, cop1::cvt_s_d_dis));
    t.register(fpfunc::CVT_W, leaf(cop1::cvt_w_d::<C>, cop1::cvt_w_d_dis));
    for cond in 0..16 {
        t.register(
            fpfunc::C_COND_BASE + cond,
            leaf(cop1::c_cond_d::<C>, cop1::c_cond_d_dis),
        );
    }
    t
}

fn build_fmt_w<C: Core>() -> DispatchTable<C> {
    let mut t = DispatchTable::new(0, 0x3f, fallback::<C>());
    t.register(fpfunc::CVT_S, leaf(cop1::cvt_s_w::<C>, cop1::cvt_s_w_dis));
    t.register(fpfunc::CVT_D, leaf(cop1::cvt_d_w::<C>, cop1::cvt_d_w_dis));
    t
}

fn build_cop1<C: Core>() -> DispatchTable<C> {
    let mut t = DispatchTable::new(21, 0x1f, fallback::<C>());
    t.register(c1::MFC1, leaf(cop1::mfc1::<C>, cop1::mfc1_dis));
    t.register(c1::CFC1, leaf(cop1::cfc1::<C>, cop1::cfc1_dis));
    t.register(c1::MTC1, leaf(cop1::mtc1::<C>, cop1::mtc1_dis));
    t.register(c1::CTC1, leaf(cop1::ctc1::<C>, cop1::ctc1_dis));
    t.register(c1::BC1, leaf(cop1::bc1::<C>, cop1::bc1_dis));
    t.register_subtable(c1::FMT_S, build_fmt_s());
    t.register_subtable(c1::FMT_D, build_fmt_d());
    t.register_subtable(c1::FMT_W, build_fmt_w());
    t
}

/// The base MIPS32 decode tree. Coprocessor 0 and 2 slots stay on the
/// illegal fallback; processor-specific tables overlay them.
pub fn build_mips32_table<C: Core>() -> DispatchTable<C> {
    let mut t = DispatchTable::new(26, 0x3f, fallback::<C>());
    t.register_subtable(op::SPECIAL, build_special());
    t.register_subtable(op::REGIMM, build_regimm());
    t.register_subtable(op::SPECIAL2, build_special2());
    t.register_subtable(op::COP1, build_cop1());

    t.register(op::J, leaf(opcode::j::<C>, opcode::j_dis));
    t.register(op::JAL, leaf(opcode::jal::<C>, opcode::jal_dis));
    t.register(op::BEQ, leaf(opcode::beq::<C>, opcode::beq_dis));
    t.register(op::BNE, leaf(opcode::bne::<C>, opcode::bne_dis));
    t.register(op::BLEZ, leaf(opcode::blez::<C>, opcode::blez_dis));
    t.register(op::BGTZ, leaf(opcode::bgtz::<C>, opcode::bgtz_dis));
    t.register(op::BEQL, leaf(opcode::beql::<C>, opcode::beql_dis));
    t.register(op::BNEL, leaf(opcode::bnel::<C>, opcode::bnel_dis));
    t.register(op::BLEZL, leaf(opcode::blezl::<C>, opcode::blezl_dis));
    t.register(op::BGTZL, leaf(opcode::bgtzl::<C>, opcode::bgtzl_dis));

    t.register(op::ADDI, leaf(opcode::addi::<C>, opcode::addi_dis));
    t.register(op::ADDIU, leaf(opcode::addiu::<C>, opcode::addiu_dis));
    t.register(op::SLTI, leaf(opcode::slti::<C>, opcode::slti_dis));
    t.register(op::SLTIU, leaf(opcode::sltiu::<C>, opcode::sltiu_dis));
    t.register(op::ANDI, leaf(opcode::andi::<C>, opcode::andi_dis));
    t.register(op::ORI, leaf(opcode::ori::<C>, opcode::ori_dis));
    t.register(op::XORI, leaf(opcode::xori::<C>, opcode::xori_dis));
    t.register(op::LUI, leaf(opcode::lui::<C>, opcode::lui_dis));

    t.register(op::LB, leaf(opcode::lb::<C>, opcode::lb_dis));
    t.register(op::LBU, leaf(opcode::lbu::<C>, opcode::lbu_dis));
    t.register(op::LH, leaf(opcode::lh::<C>, opcode::lh_dis));
    t.register(op::LHU, leaf(opcode::lhu::<C>, opcode::lhu_dis));
    t.register(op::LW, leaf(opcode::lw::<C>, opcode::lw_dis));
    t.register(op::LWL, leaf(opcode::lwl::<C>, opcode::lwl_dis));
    t.register(op::LWR, leaf(opcode::lwr::<C>, opcode::lwr_dis));
    t.register(op::SB, leaf(opcode::sb::<C>, opcode::sb_dis));
    t.register(op::SH, leaf(opcode::sh::<C>, opcode::sh_dis));
    t.register(op::SW, leaf(opcode::sw::<C>, opcode::sw_dis));
    t.register(op::SWL, leaf(opcode::swl::<C>, opcode::swl_dis));
    t.register(op::SWR, leaf(opcode::swr::<C>, opcode::swr_dis));

    // Cache control and the load-linked pair decode but trap.
    t.register(op::CACHE, leaf(reserved::<C>, opcode::cache_dis));
    t.register(op::PREF, leaf(reserved::<C>, opcode::pref_dis));
    t.register(op::LL, leaf(reserved::<C>, opcode::ll_dis));
    t.register(op::SC, leaf(reserved::<C>, opcode::sc_dis));

    t.register(op::LWC1, leaf(opcode::lwc1::<C>, opcode::lwc1_dis));
    t.register(op::LDC1, leaf(opcode::ldc1::<C>, opcode::ldc1_dis));
    t.register(op::SWC1, leaf(opcode::swc1::<C>, opcode::swc1_dis));
    t.register(op::SDC1, leaf(opcode::sdc1::<C>, opcode::sdc1_dis));
    t
}

/// Overlays the MISC group. Both the control processor and the lane
/// tables carry these.
pub fn add_misc_ops<C: Core>(t: &mut DispatchTable<C>) {
    let mut m = DispatchTable::new(0, 0x3f, fallback::<C>());
    m.register(mi::STOP, leaf(misc::stop::<C>, misc::stop_dis));
    m.register(mi::SYNC_L, leaf(misc::sync_l::<C>, misc::sync_l_dis));
    m.register(mi::AMO_ADD, leaf(misc::amo_add::<C>, misc::amo_add_dis));
    m.register(mi::AMO_AND, leaf(misc::amo_and::<C>, misc::amo_and_dis));
    m.register(mi::AMO_OR, leaf(misc::amo_or::<C>, misc::amo_or_dis));
    m.register(mi::DIV, leaf(misc::div::<C>, misc::div_dis));
    m.register(mi::REM, leaf(misc::rem::<C>, misc::rem_dis));
    m.register(mi::DIVU, leaf(misc::divu::<C>, misc::divu_dis));
    m.register(mi::REMU, leaf(misc::remu::<C>, misc::remu_dis));
    m.register(mi::VPIDX, leaf(misc::vpidx::<C>, misc::vpidx_dis));
    m.register(mi::MULHI, leaf(misc::mulhi::<C>, misc::mulhi_dis));
    m.register(mi::CLZ, leaf(misc::clz::<C>, misc::clz_dis));
    m.register(mi::BITREV, leaf(misc::bitrev::<C>, misc::bitrev_dis));
    t.register_subtable(crate::opcodes::maven::MISC, m);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insn::{encode_i_type, encode_r_type};
    use crate::state::{step, CoreState};
    use maven_core::error::Exception;
    use maven_core::mem::MemoryImage;

    fn core_with_program(words: &[u32]) -> CoreState {
        let mem = MemoryImage::shared(4096);
        {
            let mut m = mem.write();
            for (i, w) in words.iter().enumerate() {
                m.write_u32((i * 4) as u32, *w).expect("program fits");
            }
        }
        CoreState::new(mem)
    }

    #[test]
    fn addu_adds_registers() {
        let table = build_mips32_table::<CoreState>();
        let mut c = core_with_program(&[encode_r_type(1, 2, 3, 0, sp::ADDU).bits()]);
        c.write_register(1, 40);
        c.write_register(2, 2);
        step(&mut c, &table);
        assert_eq!(c.read_register(3), 42);
        assert_eq!(c.pc, 4);
    }

    #[test]
    fn add_overflow_skips_writeback() {
        let table = build_mips32_table::<CoreState>();
        let mut c = core_with_program(&[encode_r_type(1, 2, 3, 0, sp::ADD).bits()]);
        c.write_register(1, i32::MAX as u32);
        c.write_register(2, 1);
        c.write_register(3, 7);
        step(&mut c, &table);
        assert_eq!(c.exception, Some(Exception::AluOverflow));
        assert_eq!(c.read_register(3), 7);
    }

    #[test]
    fn taken_branch_runs_delay_slot_then_target() {
        // beq $0,$0,+2 ; addiu $1,$0,5 (delay slot) ; then target
        let table = build_mips32_table::<CoreState>();
        let mut c = core_with_program(&[
            encode_i_type(op::BEQ, 0, 0, 2).bits(),
            encode_i_type(op::ADDIU, 0, 1, 5).bits(),
        ]);
        step(&mut c, &table);
        assert_eq!(c.pc, 4);
        assert_eq!(c.npc, 12);
        step(&mut c, &table);
        assert_eq!(c.read_register(1), 5);
        assert_eq!(c.pc, 12);
    }

    #[test]
    fn likely_branch_nullifies_delay_slot_on_fallthrough() {
        let table = build_mips32_table::<CoreState>();
        let mut c = core_with_program(&[
            encode_i_type(op::BNEL, 0, 0, 2).bits(),
            encode_i_type(op::ADDIU, 0, 1, 5).bits(),
        ]);
        step(&mut c, &table);
        assert!(c.nullify);
        step(&mut c, &table);
        assert_eq!(c.read_register(1), 0);
        assert_eq!(c.pc, 8);
    }

    #[test]
    fn div_by_zero_writes_sentinels() {
        let table = build_mips32_table::<CoreState>();
        let mut c = core_with_program(&[encode_r_type(1, 2, 0, 0, sp::DIV).bits()]);
        c.write_register(1, 9);
        step(&mut c, &table);
        assert_eq!(c.lo, (-1i32) as u32);
        assert_eq!(c.hi, 9);
        assert_eq!(c.exception, None);
    }

    #[test]
    fn jal_links_delay_slot_address() {
        let table = build_mips32_table::<CoreState>();
        let mut c = core_with_program(&[0x0c00_0010]); // jal 0x40
        step(&mut c, &table);
        assert_eq!(c.read_register(31), 4);
        assert_eq!(c.npc, 0x40);
    }

    #[test]
    fn ll_and_sc_are_reserved() {
        let table = build_mips32_table::<CoreState>();
        let mut c = core_with_program(&[encode_i_type(op::LL, 1, 2, 0).bits()]);
        step(&mut c, &table);
        assert_eq!(c.exception, Some(Exception::ReservedInstruction));
    }

    #[test]
    fn misc_bitrev_reverses() {
        let mut table = build_mips32_table::<CoreState>();
        add_misc_ops(&mut table);
        let mut w = crate::insn::InstructionWord::new(0);
        w.set_opcode(crate::opcodes::maven::MISC)
            .set_rs(1)
            .set_rd(2)
            .set_func(mi::BITREV);
        let mut c = core_with_program(&[w.bits()]);
        c.write_register(1, 0x8000_0001);
        step(&mut c, &table);
        assert_eq!(c.read_register(2), 0x8000_0001);
        c.write_register(1, 0x0000_0001);
        c.pc = 0;
        c.npc = 4;
        step(&mut c, &table);
        assert_eq!(c.read_register(2), 0x8000_0000);
    }

    #[test]
    fn disassembles_common_forms() {
        let table = build_mips32_table::<CoreState>();
        let w = encode_r_type(1, 2, 3, 0, sp::ADDU);
        assert_eq!(table.disassemble(w), "addu v1,at,v0");
        let nop = crate::insn::InstructionWord::new(0);
        assert_eq!(table.disassemble(nop), "nop");
    }
}
