//! Packed 32-bit instruction word with explicit field views.
//!
//! The hardware description packs these fields as C bit-fields; here every
//! accessor is an explicit shift/mask so the layout is host-independent.
//! Nine overlapping layouts share the word; which one is meaningful depends
//! on the opcode. Fields that should be zero for a given instruction are
//! deliberately not validated on the hot path; only fields that change
//! behavior are checked by the handlers.
//!
//! Layouts (LSB first):
//! - R-type:      func[5:0] sa[10:6] rd[15:11] rt[20:16] rs[25:21] op[31:26]
//! - code form:   func[5:0] code[25:6] op[31:26]
//! - cc form:     func[5:0] sa[10:6] rd[15:11] td[16] nd[17] cc[20:18]
//!                rs[25:21] op[31:26]
//! - command:     cmd[7:0] _[10:8] rd[15:11] rt[20:16] rs[25:21] op[31:26]
//! - vector mem:  n[4:0] s[6:5] u[7] msk[10:8] rv[15:11] rt[20:16]
//!                rs[25:21] op[31:26]
//! - I-type:      imm[15:0] rt[20:16] rs[25:21] op[31:26]
//! - J-type:      jump[25:0] op[31:26]
//! - FP R-type:   func[5:0] fd[10:6] fs[15:11] ft[20:16] fmt[25:21]
//!                op[31:26]
//! - FP compare:  cond[3:0] fc[5:4] fcc[10:6] fs[15:11] ft[20:16]
//!                fmt[25:21] op[31:26]

/// A raw instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstructionWord(pub u32);

impl InstructionWord {
    pub fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    fn field(self, shift: u32, width: u32) -> u32 {
        (self.0 >> shift) & ((1 << width) - 1)
    }

    fn set_field(&mut self, shift: u32, width: u32, val: u32) {
        let mask = ((1u32 << width) - 1) << shift;
        self.0 = (self.0 & !mask) | ((val << shift) & mask);
    }

    // Common fields.

    pub fn opcode(self) -> u32 {
        self.field(26, 6)
    }

    pub fn rs(self) -> usize {
        self.field(21, 5) as usize
    }

    pub fn rt(self) -> usize {
        self.field(16, 5) as usize
    }

    pub fn rd(self) -> usize {
        self.field(11, 5) as usize
    }

    pub fn sa(self) -> u32 {
        self.field(6, 5)
    }

    pub fn func(self) -> u32 {
        self.field(0, 6)
    }

    // code form (syscall/break).

    pub fn code(self) -> u32 {
        self.field(6, 20)
    }

    // cc form (movci, bc1).

    pub fn td(self) -> u32 {
        self.field(16, 1)
    }

    pub fn nd(self) -> u32 {
        self.field(17, 1)
    }

    pub fn cc(self) -> u32 {
        self.field(18, 3)
    }

    // command form (COP2).

    pub fn cmd(self) -> u32 {
        self.field(0, 8)
    }

    // vector memory form.

    pub fn n(self) -> u32 {
        self.field(0, 5)
    }

    pub fn s(self) -> u32 {
        self.field(5, 2)
    }

    pub fn u(self) -> u32 {
        self.field(7, 1)
    }

    pub fn msk(self) -> usize {
        self.field(8, 3) as usize
    }

    pub fn rv(self) -> usize {
        self.field(11, 5) as usize
    }

    // I-type.

    pub fn immediate(self) -> u32 {
        self.field(0, 16)
    }

    /// Sign-extended immediate.
    pub fn simm(self) -> i32 {
        self.immediate() as u16 as i16 as i32
    }

    // J-type.

    pub fn jump(self) -> u32 {
        self.field(0, 26)
    }

    // FP R-type.

    pub fn fmt(self) -> u32 {
        self.field(21, 5)
    }

    pub fn ft(self) -> usize {
        self.field(16, 5) as usize
    }

    pub fn fs(self) -> usize {
        self.field(11, 5) as usize
    }

    pub fn fd(self) -> usize {
        self.field(6, 5) as usize
    }

    // FP compare form.

    pub fn cond(self) -> u32 {
        self.field(0, 4)
    }

    pub fn fc(self) -> u32 {
        self.field(4, 2)
    }

    pub fn fcc(self) -> usize {
        self.field(6, 5) as usize
    }

    // Field writers, used by the encode helpers and test harnesses only.

    pub fn set_opcode(&mut self, v: u32) -> &mut Self {
        self.set_field(26, 6, v);
        self
    }

    pub fn set_rs(&mut self, v: u32) -> &mut Self {
        self.set_field(21, 5, v);
        self
    }

    pub fn set_rt(&mut self, v: u32) -> &mut Self {
        self.set_field(16, 5, v);
        self
    }

    pub fn set_rd(&mut self, v: u32) -> &mut Self {
        self.set_field(11, 5, v);
        self
    }

    pub fn set_sa(&mut self, v: u32) -> &mut Self {
        self.set_field(6, 5, v);
        self
    }

    pub fn set_func(&mut self, v: u32) -> &mut Self {
        self.set_field(0, 6, v);
        self
    }

    pub fn set_code(&mut self, v: u32) -> &mut Self {
        self.set_field(6, 20, v);
        self
    }

    pub fn set_td(&mut self, v: u32) -> &mut Self {
        self.set_field(16, 1, v);
        self
    }

    pub fn set_nd(&mut self, v: u32) -> &mut Self {
        self.set_field(17, 1, v);
        self
    }

    pub fn set_cc(&mut self, v: u32) -> &mut Self {
        self.set_field(18, 3, v);
        self
    }

    pub fn set_cmd(&mut self, v: u32) -> &mut Self {
        self.set_field(0, 8, v);
        self
    }

    pub fn set_n(&mut self, v: u32) -> &mut Self {
        self.set_field(0, 5, v);
        self
    }

    pub fn set_s(&mut self, v: u32) -> &mut Self {
        self.set_field(5, 2, v);
        self
    }

    pub fn set_u(&mut self, v: u32) -> &mut Self {
        self.set_field(7, 1, v);
        self
    }

    pub fn set_msk(&mut self, v: u32) -> &mut Self {
        self.set_field(8, 3, v);
        self
    }

    pub fn set_rv(&mut self, v: u32) -> &mut Self {
        self.set_field(11, 5, v);
        self
    }

    pub fn set_immediate(&mut self, v: u32) -> &mut Self {
        self.set_field(0, 16, v);
        self
    }

    pub fn set_jump(&mut self, v: u32) -> &mut Self {
        self.set_field(0, 26, v);
        self
    }

    pub fn set_fmt(&mut self, v: u32) -> &mut Self {
        self.set_field(21, 5, v);
        self
    }

    pub fn set_ft(&mut self, v: u32) -> &mut Self {
        self.set_field(16, 5, v);
        self
    }

    pub fn set_fs(&mut self, v: u32) -> &mut Self {
        self.set_field(11, 5, v);
        self
    }

    pub fn set_fd(&mut self, v: u32) -> &mut Self {
        self.set_field(6, 5, v);
        self
    }

    pub fn set_cond(&mut self, v: u32) -> &mut Self {
        self.set_field(0, 4, v);
        self
    }

    pub fn set_fc(&mut self, v: u32) -> &mut Self {
        self.set_field(4, 2, v);
        self
    }

    pub fn set_fcc(&mut self, v: u32) -> &mut Self {
        self.set_field(6, 5, v);
        self
    }
}

// Encode helpers for tests and embedded assemblers.

pub fn encode_r_type(rs: u32, rt: u32, rd: u32, sa: u32, func: u32) -> InstructionWord {
    let mut w = InstructionWord::default();
    w.set_opcode(0)
        .set_rs(rs)
        .set_rt(rt)
        .set_rd(rd)
        .set_sa(sa)
        .set_func(func);
    w
}

pub fn encode_i_type(opcode: u32, rs: u32, rt: u32, imm: u32) -> InstructionWord {
    let mut w = InstructionWord::default();
    w.set_opcode(opcode).set_rs(rs).set_rt(rt).set_immediate(imm);
    w
}

pub fn encode_j_type(opcode: u32, target: u32) -> InstructionWord {
    let mut w = InstructionWord::default();
    w.set_opcode(opcode).set_jump(target);
    w
}

pub fn encode_fp_r(opcode: u32, fmt: u32, ft: u32, fs: u32, fd: u32, func: u32) -> InstructionWord {
    let mut w = InstructionWord::default();
    w.set_opcode(opcode)
        .set_fmt(fmt)
        .set_ft(ft)
        .set_fs(fs)
        .set_fd(fd)
        .set_func(func);
    w
}

/// FP compare encoding. The fc field is architecturally fixed at 0x3.
pub fn encode_fp_compare(opcode: u32, fmt: u32, ft: u32, fs: u32, fcc: u32, cond: u32) -> InstructionWord {
    let mut w = InstructionWord::default();
    w.set_opcode(opcode)
        .set_fmt(fmt)
        .set_ft(ft)
        .set_fs(fs)
        .set_fcc(fcc)
        .set_fc(0x3)
        .set_cond(cond);
    w
}

pub fn encode_cmd(opcode: u32, rs: u32, rt: u32, rd: u32, msk: u32, cmd: u32) -> InstructionWord {
    let mut w = InstructionWord::default();
    w.set_opcode(opcode)
        .set_rs(rs)
        .set_rt(rt)
        .set_rd(rd)
        .set_msk(msk)
        .set_cmd(cmd);
    w
}

pub fn encode_vmem(opcode: u32, rs: u32, rt: u32, rv: u32, msk: u32, u: u32, s: u32, n: u32) -> InstructionWord {
    let mut w = InstructionWord::default();
    w.set_opcode(opcode)
        .set_rs(rs)
        .set_rt(rt)
        .set_rv(rv)
        .set_msk(msk)
        .set_u(u)
        .set_s(s)
        .set_n(n);
    w
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn r_type_fields() {
        // addu $3, $1, $2
        let w = encode_r_type(1, 2, 3, 0, 0x21);
        assert_eq!(w.opcode(), 0);
        assert_eq!(w.rs(), 1);
        assert_eq!(w.rt(), 2);
        assert_eq!(w.rd(), 3);
        assert_eq!(w.sa(), 0);
        assert_eq!(w.func(), 0x21);
    }

    #[test]
    fn i_type_sign_extension() {
        let w = encode_i_type(0x08, 0, 1, 0xfffe);
        assert_eq!(w.simm(), -2);
        let w = encode_i_type(0x08, 0, 1, 0x7fff);
        assert_eq!(w.simm(), 32767);
    }

    #[test]
    fn fp_compare_fixes_fc() {
        let w = encode_fp_compare(0x11, 0x10, 2, 1, 0, 0x2);
        assert_eq!(w.fc(), 0x3);
        assert_eq!(w.cond(), 0x2);
        assert_eq!(w.fcc(), 0);
    }

    #[test]
    fn overlapping_views_agree() {
        // The command-form rd and the FP fs occupy the same bits.
        let w = encode_cmd(0x12, 4, 5, 6, 2, 0x81);
        assert_eq!(w.rd(), 6);
        assert_eq!(w.fs(), 6);
        assert_eq!(w.msk(), 2);
        assert_eq!(w.cmd(), 0x81);
    }

    proptest! {
        #[test]
        fn r_type_round_trip(rs in 0u32..32, rt in 0u32..32, rd in 0u32..32,
                             sa in 0u32..32, func in 0u32..64) {
            let w = encode_r_type(rs, rt, rd, sa, func);
            prop_assert_eq!(w.rs() as u32, rs);
            prop_assert_eq!(w.rt() as u32, rt);
            prop_assert_eq!(w.rd() as u32, rd);
            prop_assert_eq!(w.sa(), sa);
            prop_assert_eq!(w.func(), func);
            let rebuilt = encode_r_type(w.rs() as u32, w.rt() as u32,
                                        w.rd() as u32, w.sa(), w.func());
            prop_assert_eq!(rebuilt.bits(), w.bits());
        }

        #[test]
        fn i_type_round_trip(op in 0u32..64, rs in 0u32..32, rt in 0u32..32,
                             imm in 0u32..0x1_0000) {
            let w = encode_i_type(op, rs, rt, imm);
            let rebuilt = encode_i_type(w.opcode(), w.rs() as u32,
                                        w.rt() as u32, w.immediate());
            prop_assert_eq!(rebuilt.bits(), w.bits());
        }

        #[test]
        fn j_type_round_trip(op in 0u32..64, target in 0u32..0x400_0000) {
            let w = encode_j_type(op, target);
            prop_assert_eq!(w.opcode(), op);
            prop_assert_eq!(w.jump(), target);
            prop_assert_eq!(encode_j_type(w.opcode(), w.jump()).bits(), w.bits());
        }

        #[test]
        fn vmem_round_trip(op in 0u32..64, rs in 0u32..32, rt in 0u32..32,
                           rv in 0u32..32, msk in 0u32..8, u in 0u32..2,
                           s in 0u32..4, n in 0u32..32) {
            let w = encode_vmem(op, rs, rt, rv, msk, u, s, n);
            let rebuilt = encode_vmem(w.opcode(), w.rs() as u32, w.rt() as u32,
                                      w.rv() as u32, w.msk() as u32, w.u(),
                                      w.s(), w.n());
            prop_assert_eq!(rebuilt.bits(), w.bits());
        }

        #[test]
        fn fp_r_round_trip(fmt in 0u32..32, ft in 0u32..32, fs in 0u32..32,
                           fd in 0u32..32, func in 0u32..64) {
            let w = encode_fp_r(0x11, fmt, ft, fs, fd, func);
            let rebuilt = encode_fp_r(w.opcode(), w.fmt(), w.ft() as u32,
                                      w.fs() as u32, w.fd() as u32, w.func());
            prop_assert_eq!(rebuilt.bits(), w.bits());
        }
    }
}
