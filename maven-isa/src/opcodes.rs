//! Numeric opcode, function and command code maps.

/// Top-level opcode field values (bits 31:26).
pub mod op {
    pub const SPECIAL: u32 = 0x00;
    pub const REGIMM: u32 = 0x01;
    pub const J: u32 = 0x02;
    pub const JAL: u32 = 0x03;
    pub const BEQ: u32 = 0x04;
    pub const BNE: u32 = 0x05;
    pub const BLEZ: u32 = 0x06;
    pub const BGTZ: u32 = 0x07;
    pub const ADDI: u32 = 0x08;
    pub const ADDIU: u32 = 0x09;
    pub const SLTI: u32 = 0x0a;
    pub const SLTIU: u32 = 0x0b;
    pub const ANDI: u32 = 0x0c;
    pub const ORI: u32 = 0x0d;
    pub const XORI: u32 = 0x0e;
    pub const LUI: u32 = 0x0f;
    pub const COP0: u32 = 0x10;
    pub const COP1: u32 = 0x11;
    pub const COP2: u32 = 0x12;
    pub const BEQL: u32 = 0x14;
    pub const BNEL: u32 = 0x15;
    pub const BLEZL: u32 = 0x16;
    pub const BGTZL: u32 = 0x17;
    pub const SPECIAL2: u32 = 0x1c;
    pub const LB: u32 = 0x20;
    pub const LH: u32 = 0x21;
    pub const LWL: u32 = 0x22;
    pub const LW: u32 = 0x23;
    pub const LBU: u32 = 0x24;
    pub const LHU: u32 = 0x25;
    pub const LWR: u32 = 0x26;
    pub const SB: u32 = 0x28;
    pub const SH: u32 = 0x29;
    pub const SWL: u32 = 0x2a;
    pub const SW: u32 = 0x2b;
    pub const SWR: u32 = 0x2e;
    pub const CACHE: u32 = 0x2f;
    pub const LL: u32 = 0x30;
    pub const LWC1: u32 = 0x31;
    pub const PREF: u32 = 0x33;
    pub const LDC1: u32 = 0x35;
    pub const SC: u32 = 0x38;
    pub const SWC1: u32 = 0x39;
    pub const SDC1: u32 = 0x3d;
}

/// SPECIAL function field values (bits 5:0 when opcode == 0).
pub mod special {
    pub const SLL: u32 = 0x00;
    pub const MOVCI: u32 = 0x01;
    pub const SRL: u32 = 0x02;
    pub const SRA: u32 = 0x03;
    pub const SLLV: u32 = 0x04;
    pub const SRLV: u32 = 0x06;
    pub const SRAV: u32 = 0x07;
    pub const JR: u32 = 0x08;
    pub const JALR: u32 = 0x09;
    pub const MOVZ: u32 = 0x0a;
    pub const MOVN: u32 = 0x0b;
    pub const SYSCALL: u32 = 0x0c;
    pub const BREAK: u32 = 0x0d;
    pub const SYNC: u32 = 0x0f;
    pub const MFHI: u32 = 0x10;
    pub const MTHI: u32 = 0x11;
    pub const MFLO: u32 = 0x12;
    pub const MTLO: u32 = 0x13;
    pub const MULT: u32 = 0x18;
    pub const MULTU: u32 = 0x19;
    pub const DIV: u32 = 0x1a;
    pub const DIVU: u32 = 0x1b;
    pub const ADD: u32 = 0x20;
    pub const ADDU: u32 = 0x21;
    pub const SUB: u32 = 0x22;
    pub const SUBU: u32 = 0x23;
    pub const AND: u32 = 0x24;
    pub const OR: u32 = 0x25;
    pub const XOR: u32 = 0x26;
    pub const NOR: u32 = 0x27;
    pub const SLT: u32 = 0x2a;
    pub const SLTU: u32 = 0x2b;
    pub const TGE: u32 = 0x30;
    pub const TGEU: u32 = 0x31;
    pub const TLT: u32 = 0x32;
    pub const TLTU: u32 = 0x33;
    pub const TEQ: u32 = 0x34;
    pub const TNE: u32 = 0x36;
}

/// REGIMM rt field values (bits 20:16 when opcode == 0x01).
pub mod regimm {
    pub const BLTZ: u32 = 0x00;
    pub const BGEZ: u32 = 0x01;
    pub const BLTZL: u32 = 0x02;
    pub const BGEZL: u32 = 0x03;
    pub const TGEI: u32 = 0x08;
    pub const TGEIU: u32 = 0x09;
    pub const TLTI: u32 = 0x0a;
    pub const TLTIU: u32 = 0x0b;
    pub const TEQI: u32 = 0x0c;
    pub const TNEI: u32 = 0x0e;
    pub const BLTZAL: u32 = 0x10;
    pub const BGEZAL: u32 = 0x11;
    pub const BLTZALL: u32 = 0x12;
    pub const BGEZALL: u32 = 0x13;
    pub const SYNCI: u32 = 0x1f;
}

/// SPECIAL2 function field values (bits 5:0 when opcode == 0x1c).
pub mod special2 {
    pub const MADD: u32 = 0x00;
    pub const MADDU: u32 = 0x01;
    pub const MUL: u32 = 0x02;
    pub const MSUB: u32 = 0x04;
    pub const MSUBU: u32 = 0x05;
    pub const CLZ: u32 = 0x20;
    pub const CLO: u32 = 0x21;
}

/// COP1 fmt field values (bits 25:21 when opcode == 0x11).
pub mod cop1 {
    pub const MFC1: u32 = 0x00;
    pub const CFC1: u32 = 0x02;
    pub const MTC1: u32 = 0x04;
    pub const CTC1: u32 = 0x06;
    pub const BC1: u32 = 0x08;
    pub const FMT_S: u32 = 0x10;
    pub const FMT_D: u32 = 0x11;
    pub const FMT_W: u32 = 0x14;
}

/// COP1 function field values for the S and D formats.
pub mod fpfunc {
    pub const ADD: u32 = 0x00;
    pub const SUB: u32 = 0x01;
    pub const MUL: u32 = 0x02;
    pub const DIV: u32 = 0x03;
    pub const SQRT: u32 = 0x04;
    pub const ABS: u32 = 0x05;
    pub const MOV: u32 = 0x06;
    pub const NEG: u32 = 0x07;
    pub const ROUND_W: u32 = 0x0c;
    pub const TRUNC_W: u32 = 0x0d;
    pub const CEIL_W: u32 = 0x0e;
    pub const FLOOR_W: u32 = 0x0f;
    pub const MOVCF: u32 = 0x11;
    pub const MOVZ: u32 = 0x12;
    pub const MOVN: u32 = 0x13;
    pub const CVT_S: u32 = 0x20;
    pub const CVT_D: u32 = 0x21;
    pub const CVT_W: u32 = 0x24;
    /// c.cond functions occupy 0x30..=0x3f; the low 4 bits are the cond.
    pub const C_COND_BASE: u32 = 0x30;
}

/// Maven extension opcodes.
pub mod maven {
    pub const CP_COP0: u32 = 0x10;
    pub const CP_COP2: u32 = 0x12;
    pub const CP_VCFGIVL: u32 = 0x37;
    pub const CP_VF: u32 = 0x34;
    pub const CP_VLOAD: u32 = 0x18;
    pub const CP_VLOAD_ST: u32 = 0x19;
    pub const CP_VLOAD_X: u32 = 0x2c;
    pub const CP_VSTORE: u32 = 0x1a;
    pub const CP_VSTORE_ST: u32 = 0x1b;
    pub const CP_VSTORE_X: u32 = 0x2d;
    pub const MISC: u32 = 0x27;
}

/// COP0 rs field values.
pub mod cop0 {
    pub const MFC0: u32 = 0x00;
    pub const MTC0: u32 = 0x04;
    pub const ERET: u32 = 0x10;
}

/// Maven MISC function field values.
pub mod misc {
    pub const STOP: u32 = 0x00;
    pub const SYNC_L: u32 = 0x01;
    pub const AMO_ADD: u32 = 0x02;
    pub const AMO_AND: u32 = 0x03;
    pub const AMO_OR: u32 = 0x04;
    pub const DIV: u32 = 0x05;
    pub const REM: u32 = 0x06;
    pub const DIVU: u32 = 0x07;
    pub const REMU: u32 = 0x08;
    pub const VPIDX: u32 = 0x09;
    pub const MULHI: u32 = 0x0a;
    pub const CLZ: u32 = 0x0b;
    pub const BITREV: u32 = 0x0c;
}

/// Maven COP2 command codes (bits 7:0 when opcode == 0x12).
pub mod cop2 {
    pub const SETVL: u32 = 0x02;
    pub const SYNC_V: u32 = 0x05;
    pub const SYNC_CV: u32 = 0x06;
    pub const MTVP: u32 = 0x07;
    pub const MTVPS: u32 = 0x08;
    pub const MFVP: u32 = 0x09;

    pub const DIVU_VV: u32 = 0x80;
    pub const ADDU_VV: u32 = 0x81;
    pub const ADDU_VS: u32 = 0x82;
    pub const SUBU_VV: u32 = 0x83;
    pub const SUBU_VS: u32 = 0x84;
    pub const SUBU_SV: u32 = 0x85;
    pub const MUL_VV: u32 = 0x86;
    pub const MUL_VS: u32 = 0x87;
    pub const DIV_VV: u32 = 0x88;
    pub const DIV_VS: u32 = 0x89;
    pub const DIV_SV: u32 = 0x8a;
    pub const REM_VV: u32 = 0x8b;
    pub const REM_VS: u32 = 0x8c;
    pub const REM_SV: u32 = 0x8d;
    pub const SLL_VV: u32 = 0x8e;
    pub const SLL_VS: u32 = 0x8f;
    pub const SLL_SV: u32 = 0x90;
    pub const SRL_VV: u32 = 0x91;
    pub const SRL_VS: u32 = 0x92;
    pub const SRL_SV: u32 = 0x93;
    pub const SRA_VV: u32 = 0x94;
    pub const SRA_VS: u32 = 0x95;
    pub const SRA_SV: u32 = 0x96;
    pub const AND_VV: u32 = 0x97;
    pub const AND_VS: u32 = 0x98;
    pub const OR_VV: u32 = 0x99;
    pub const OR_VS: u32 = 0x9a;
    pub const XOR_VV: u32 = 0x9b;
    pub const XOR_VS: u32 = 0x9c;
    pub const NOR_VV: u32 = 0x9d;
    pub const NOR_VS: u32 = 0x9e;
    pub const DIVU_VS: u32 = 0x9f;
    pub const DIVU_SV: u32 = 0xbd;
    pub const REMU_VV: u32 = 0xbe;
    pub const REMU_VS: u32 = 0xbf;
    pub const REMU_SV: u32 = 0xf0;
    pub const MULHI_VV: u32 = 0xfe;
    pub const MULHI_VS: u32 = 0xff;
    pub const BITREV_V: u32 = 0xfd;

    pub const ADD_S_VV: u32 = 0xa0;
    pub const ADD_S_VS: u32 = 0xa1;
    pub const ADD_S_SV: u32 = 0xa2;
    pub const SUB_S_VV: u32 = 0xa3;
    pub const SUB_S_VS: u32 = 0xa4;
    pub const SUB_S_SV: u32 = 0xa5;
    pub const MUL_S_VV: u32 = 0xa6;
    pub const MUL_S_VS: u32 = 0xa7;
    pub const MUL_S_SV: u32 = 0xa8;
    pub const DIV_S_VV: u32 = 0xa9;
    pub const DIV_S_VS: u32 = 0xaa;
    pub const DIV_S_SV: u32 = 0xab;
    pub const ABS_S_V: u32 = 0xac;
    pub const NEG_S_V: u32 = 0xad;
    pub const ROUND_W_S_V: u32 = 0xae;
    pub const TRUNC_W_S_V: u32 = 0xaf;
    pub const CEIL_W_S_V: u32 = 0xb0;
    pub const FLOOR_W_S_V: u32 = 0xb1;
    pub const RECIP_S_V: u32 = 0xb2;
    pub const RSQRT_S_V: u32 = 0xb3;
    pub const SQRT_S_V: u32 = 0xb4;
    pub const CVT_S_W_V: u32 = 0xb5;
    pub const CVT_W_S_V: u32 = 0xb6;
    pub const SEQ_F_VV: u32 = 0xb7;
    pub const SLT_F_VV: u32 = 0xb8;
    pub const SLTU_F_VV: u32 = 0xf6;

    pub const MTVPS_F: u32 = 0xb9;
    pub const MFVPS_F: u32 = 0xba;
    pub const POPC_F: u32 = 0xbb;
    pub const FINDFONE_F: u32 = 0xbc;

    /// Single-precision vector compares writing flags. Three banks of 16
    /// cond codes: vv at 0xc0, vs at 0xd0, sv at 0xe0.
    pub const C_F_VV_BASE: u32 = 0xc0;
    pub const C_F_VS_BASE: u32 = 0xd0;
    pub const C_F_SV_BASE: u32 = 0xe0;

    pub const AND_F: u32 = 0xf1;
    pub const MOV_F: u32 = 0xf3;
    pub const OR_F: u32 = 0xf7;
    pub const NOT_F: u32 = 0xfc;

    pub const UTIDX_V: u32 = 0xf8;
    pub const AMO_OR_VV: u32 = 0xf9;
    pub const AMO_AND_VV: u32 = 0xfa;
    pub const AMO_ADD_VV: u32 = 0xfb;
}

/// Vector memory element widths. The upper nibble is the unsigned bit.
pub mod elem {
    pub const WORD: u32 = 0x00;
    pub const HWORD: u32 = 0x01;
    pub const UHWORD: u32 = 0x11;
    pub const BYTE: u32 = 0x03;
    pub const UBYTE: u32 = 0x13;
}
