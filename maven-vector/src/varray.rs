//! The vector lane array and its divergence scheduler.
//!
//! The control processor issues whole-vector commands here. Vector
//! fetches (`go`) run lanes in fragments: every lane of a fragment
//! executes the same instruction, a branch that splits the cohort
//! produces two fragments, and fragments that meet at one pc merge back
//! together. Memory is instantaneous and atomic, so sequential lane
//! execution is indistinguishable from the parallel machine.

use log::{debug, warn};
use maven_core::config::PvfbPolicy;
use maven_core::mem::SharedMem;
use maven_core::syscfg::{VLEN_MAX, VLEN_MIN};
use maven_core::types::{Addr, Reg};
use maven_isa::opcodes::cop2;
use maven_isa::{add_misc_ops, build_mips32_table, step, Core, DispatchTable};

use crate::frag::VectorFragment;
use crate::lane::Lane;
use crate::pvfb::{make_pvfb, Pvfb};
use crate::scoreboard::Scoreboard;
use crate::stats::DivergenceData;

/// Vector memory element widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemWidth {
    Word,
    Hword,
    Uhword,
    Byte,
    Ubyte,
}

impl ElemWidth {
    /// Decodes the s/u fields of a vector memory instruction.
    pub fn decode(s: u32, unsigned: u32) -> Option<Self> {
        match (s, unsigned) {
            (0x0, _) => Some(ElemWidth::Word),
            (0x1, 0) => Some(ElemWidth::Hword),
            (0x1, _) => Some(ElemWidth::Uhword),
            (0x3, 0) => Some(ElemWidth::Byte),
            (0x3, _) => Some(ElemWidth::Ubyte),
            _ => None,
        }
    }

    pub fn size(self) -> u32 {
        match self {
            ElemWidth::Word => 4,
            ElemWidth::Hword | ElemWidth::Uhword => 2,
            ElemWidth::Byte | ElemWidth::Ubyte => 1,
        }
    }
}

fn load_elem(lane: &mut Lane, addr: Addr, width: ElemWidth) -> Option<Reg> {
    match width {
        ElemWidth::Word => lane.core.load_u32(addr),
        ElemWidth::Hword => lane.core.load_u16(addr).map(|v| v as i16 as i32 as u32),
        ElemWidth::Uhword => lane.core.load_u16(addr).map(u32::from),
        ElemWidth::Byte => lane.core.load_u8(addr).map(|v| v as i8 as i32 as u32),
        ElemWidth::Ubyte => lane.core.load_u8(addr).map(u32::from),
    }
}

fn store_elem(lane: &mut Lane, addr: Addr, val: Reg, width: ElemWidth) {
    match width {
        ElemWidth::Word => lane.core.store_u32(addr, val),
        ElemWidth::Hword | ElemWidth::Uhword => lane.core.store_u16(addr, val as u16),
        ElemWidth::Byte | ElemWidth::Ubyte => lane.core.store_u8(addr, val as u8),
    }
}

/// Integer vector op over already-ordered operands. None means the
/// command code is not an integer op.
fn int_binop(cmd: u32, a: u32, b: u32) -> Option<u32> {
    Some(match cmd {
        cop2::ADDU_VV | cop2::ADDU_VS => a.wrapping_add(b),
        cop2::SUBU_VV | cop2::SUBU_VS | cop2::SUBU_SV => a.wrapping_sub(b),
        cop2::MUL_VV | cop2::MUL_VS => a.wrapping_mul(b),
        cop2::MULHI_VV | cop2::MULHI_VS => ((u64::from(a) * u64::from(b)) >> 32) as u32,
        cop2::DIV_VV | cop2::DIV_VS | cop2::DIV_SV => {
            if b == 0 {
                warn!("vector divide by zero");
                0
            } else {
                (a as i32).wrapping_div(b as i32) as u32
            }
        }
        cop2::REM_VV | cop2::REM_VS | cop2::REM_SV => {
            if b == 0 {
                warn!("vector divide by zero");
                0
            } else {
                (a as i32).wrapping_rem(b as i32) as u32
            }
        }
        cop2::DIVU_VV | cop2::DIVU_VS | cop2::DIVU_SV => {
            if b == 0 {
                warn!("vector divide by zero");
                0
            } else {
                a / b
            }
        }
        cop2::REMU_VV | cop2::REMU_VS | cop2::REMU_SV => {
            if b == 0 {
                warn!("vector divide by zero");
                0
            } else {
                a % b
            }
        }
        cop2::SLL_VV | cop2::SLL_VS | cop2::SLL_SV => a << (b & 0x1f),
        cop2::SRL_VV | cop2::SRL_VS | cop2::SRL_SV => a >> (b & 0x1f),
        cop2::SRA_VV | cop2::SRA_VS | cop2::SRA_SV => ((a as i32) >> (b & 0x1f)) as u32,
        cop2::AND_VV | cop2::AND_VS => a & b,
        cop2::OR_VV | cop2::OR_VS => a | b,
        cop2::XOR_VV | cop2::XOR_VS => a ^ b,
        cop2::NOR_VV | cop2::NOR_VS => !(a | b),
        _ => return None,
    })
}

/// Scalar-vector command codes, where the scalar is the left operand.
fn scalar_is_left(cmd: u32) -> bool {
    matches!(
        cmd,
        cop2::SUBU_SV
            | cop2::DIV_SV
            | cop2::REM_SV
            | cop2::DIVU_SV
            | cop2::REMU_SV
            | cop2::SLL_SV
            | cop2::SRL_SV
            | cop2::SRA_SV
            | cop2::SUB_S_SV
            | cop2::DIV_S_SV
            | cop2::ADD_S_SV
            | cop2::MUL_S_SV
    )
}

fn f32_binop(cmd: u32, a: f32, b: f32) -> Option<f32> {
    Some(match cmd {
        cop2::ADD_S_VV | cop2::ADD_S_VS | cop2::ADD_S_SV => a + b,
        cop2::SUB_S_VV | cop2::SUB_S_VS | cop2::SUB_S_SV => a - b,
        cop2::MUL_S_VV | cop2::MUL_S_VS | cop2::MUL_S_SV => a * b,
        cop2::DIV_S_VV | cop2::DIV_S_VS | cop2::DIV_S_SV => a / b,
        _ => return None,
    })
}

fn f32_to_i32(f: f32, round: fn(f32) -> f32) -> u32 {
    if f.is_nan() {
        return i32::MAX as u32;
    }
    let r = round(f);
    if r >= 2_147_483_648.0 {
        i32::MAX as u32
    } else if r < -2_147_483_648.0 {
        i32::MIN as u32
    } else {
        (r as i32) as u32
    }
}

/// Condition sense shared by the vector single-precision compares.
fn f32_cond(cond: u32, a: f32, b: f32) -> bool {
    let unordered = a.is_nan() || b.is_nan();
    let less = !unordered && a < b;
    let equal = !unordered && a == b;
    (cond & 0x4 != 0 && less) || (cond & 0x2 != 0 && equal) || (cond & 0x1 != 0 && unordered)
}

/// The lane array. Owns the lanes, the fragment buffer, the scoreboard
/// and the divergence statistics.
pub struct VpArray {
    table: DispatchTable<Lane>,
    pvfb: Box<dyn Pvfb>,
    sb: Scoreboard,
    lanes: Vec<Lane>,
    vl: usize,
    vlmax: usize,
    num_physical_regs: usize,
    stats_en: bool,
    scoreboard_en: bool,
    stats: DivergenceData,
}

impl VpArray {
    pub fn new(mem: SharedMem, policy: PvfbPolicy) -> Self {
        let mut table = build_mips32_table::<Lane>();
        add_misc_ops(&mut table);
        let lanes = (0..VLEN_MAX).map(|i| Lane::new(mem.clone(), i)).collect();
        Self {
            table,
            pvfb: make_pvfb(policy),
            sb: Scoreboard::new(),
            lanes,
            vl: VLEN_MAX,
            vlmax: VLEN_MAX,
            num_physical_regs: VLEN_MAX * 32,
            stats_en: false,
            scoreboard_en: false,
            stats: DivergenceData::new(),
        }
    }

    pub fn vl(&self) -> usize {
        self.vl
    }

    pub fn vlmax(&self) -> usize {
        self.vlmax
    }

    pub fn set_vlmax(&mut self, vlmax: usize) {
        self.vlmax = vlmax.clamp(VLEN_MIN, VLEN_MAX);
        self.vl = self.vl.min(self.vlmax);
    }

    pub fn set_num_physical_regs(&mut self, nregs: usize) {
        self.num_physical_regs = nregs;
    }

    pub fn set_stats(&mut self, en: bool) {
        self.stats_en = en;
    }

    pub fn set_scoreboard(&mut self, en: bool) {
        self.scoreboard_en = en;
    }

    pub fn stats(&self) -> &DivergenceData {
        &self.stats
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.sb
    }

    /// Lane register read for move-from and the test harness.
    pub fn lane_register(&self, lane: usize, idx: usize) -> Reg {
        self.lanes.get(lane).map_or(0, |l| l.read_register(idx))
    }

    /// Reconfigures the per-lane register file. Fewer architectural
    /// registers per lane let the fixed physical file hold more lanes.
    pub fn vcfg(&mut self, nregs: usize) {
        let nregs = nregs.max(1);
        for lane in &mut self.lanes {
            lane.vcfg(nregs);
        }
        // One lane occupies nregs entries of the physical file.
        let lanes_fit = (self.num_physical_regs / nregs).max(1);
        self.vlmax = lanes_fit.clamp(VLEN_MIN, VLEN_MAX);
        self.vl = self.vl.min(self.vlmax);
    }

    /// Clamps the requested vector length and returns the granted one.
    pub fn setvl(&mut self, request: u32) -> u32 {
        self.vl = (request as usize).min(self.vlmax);
        self.vl as u32
    }

    //--------------------------------------------------------------------
    // Vector fetch
    //--------------------------------------------------------------------

    /// Runs a vector-fetched block: every lane below vl starts at
    /// `entry` and executes until it stops, splitting and merging at
    /// divergent branches. Returns when no fragment remains.
    pub fn go(&mut self, entry: Addr) {
        if self.vl == 0 {
            return;
        }
        let mask = if self.vl >= 32 {
            u32::MAX
        } else {
            (1u32 << self.vl) - 1
        };
        for lane in &mut self.lanes[..self.vl] {
            lane.start(entry);
        }
        if self.stats_en {
            self.stats.begin_vf();
        }
        debug!("vf entry={:#010x} vl={}", entry, self.vl);
        self.pvfb.push_front(VectorFragment::new(entry, mask));
        while let Some(frag) = self.pvfb.pop() {
            self.run_fragment(frag);
        }
        if self.scoreboard_en && self.stats_en {
            self.sb.flush();
        }
    }

    /// Executes one fragment until it dies, diverges, or merges into a
    /// buffered fragment.
    fn run_fragment(&mut self, mut frag: VectorFragment) {
        loop {
            if frag.is_dead() {
                return;
            }
            let pc = frag.pc;
            if self.stats_en {
                self.stats.step(&frag);
            }

            let mut saw_branch = false;
            let mut rep_note = None;
            for i in frag.lanes() {
                step(&mut self.lanes[i], &self.table);
                let note = self.lanes[i].core.note;
                if rep_note.is_none() {
                    rep_note = Some(note);
                }
                saw_branch |= note.inst_branch;
            }
            if self.scoreboard_en && self.stats_en {
                if let Some(note) = &rep_note {
                    self.sb.execute(frag.size, note);
                }
            }

            // Stopped lanes retire from the mask permanently.
            let mut live = 0u32;
            for i in frag.lanes() {
                if self.lanes[i].is_running() {
                    live |= 1 << i;
                }
            }
            frag.mask = live;
            frag.size = live.count_ones() as usize;
            if frag.is_dead() {
                return;
            }

            // Partition the survivors by their next pc. One instruction
            // yields at most two distinct successors.
            let first_lane = frag.mask.trailing_zeros() as usize;
            let pc0 = self.lanes[first_lane].core.pc;
            let mut mask0 = 0u32;
            let mut mask1 = 0u32;
            let mut pc1 = pc0;
            for i in frag.lanes() {
                let lane_pc = self.lanes[i].core.pc;
                if lane_pc == pc0 {
                    mask0 |= 1 << i;
                } else {
                    pc1 = lane_pc;
                    mask1 |= 1 << i;
                }
            }

            if mask1 == 0 {
                // Cohort stayed together.
                frag.pc = pc0;
                if saw_branch {
                    frag.numbranches += 1;
                    if self.stats_en {
                        self.stats.branch();
                    }
                }
                if let Some(existing) = self.pvfb.member_pc(pc0) {
                    existing.mask |= frag.mask;
                    existing.size = existing.mask.count_ones() as usize;
                    if self.stats_en {
                        self.stats.merge();
                    }
                    return;
                }
                continue;
            }

            // Diverged. Both children inherit the parent's history.
            let mut frag0 = VectorFragment::new(pc0, mask0);
            let mut frag1 = VectorFragment::new(pc1, mask1);
            frag0.copy_stats(&frag);
            frag1.copy_stats(&frag);
            frag0.numsplits = frag.numsplits + 1;
            frag1.numsplits = frag.numsplits + 1;
            frag0.start_cycle = self.stats.vf_cycle;
            frag1.start_cycle = self.stats.vf_cycle;
            if self.stats_en {
                self.stats.branch();
                self.stats.split(pc);
            }
            debug!(
                "split at {:#010x}: {:#010x}/{:#010x} and {:#010x}/{:#010x}",
                pc, pc0, mask0, pc1, mask1
            );
            self.pvfb.insert_frags(pc, frag0, frag1);
            return;
        }
    }

    //--------------------------------------------------------------------
    // Vector memory
    //--------------------------------------------------------------------

    /// Strided load: lane i reads `n_elm` consecutive elements starting
    /// at `addr + i*stride` into registers rv, rv+1, ...
    pub fn vload(&mut self, addr: Addr, rv: usize, stride: u32, n_elm: usize, width: ElemWidth) {
        for (i, lane) in self.lanes[..self.vl].iter_mut().enumerate() {
            let base = addr.wrapping_add((i as u32).wrapping_mul(stride));
            for e in 0..n_elm {
                let a = base.wrapping_add(e as u32 * width.size());
                if let Some(v) = load_elem(lane, a, width) {
                    lane.write_register(rv + e, v);
                }
            }
        }
    }

    pub fn vstore(&mut self, addr: Addr, rv: usize, stride: u32, n_elm: usize, width: ElemWidth) {
        for (i, lane) in self.lanes[..self.vl].iter_mut().enumerate() {
            let base = addr.wrapping_add((i as u32).wrapping_mul(stride));
            for e in 0..n_elm {
                let a = base.wrapping_add(e as u32 * width.size());
                let v = lane.read_register(rv + e);
                store_elem(lane, a, v, width);
            }
        }
    }

    /// Gather: lane i reads `base + lane[r_voff]`.
    pub fn vload_x(&mut self, r_vdst: usize, base: Addr, r_voff: usize, width: ElemWidth) {
        for lane in &mut self.lanes[..self.vl] {
            let a = base.wrapping_add(lane.read_register(r_voff));
            if let Some(v) = load_elem(lane, a, width) {
                lane.write_register(r_vdst, v);
            }
        }
    }

    /// Scatter: lane i writes `base + lane[r_voff]`.
    pub fn vstore_x(&mut self, r_vsrc: usize, base: Addr, r_voff: usize, width: ElemWidth) {
        for lane in &mut self.lanes[..self.vl] {
            let a = base.wrapping_add(lane.read_register(r_voff));
            let v = lane.read_register(r_vsrc);
            store_elem(lane, a, v, width);
        }
    }

    /// Per-lane atomic read-modify-write; inactive lanes are skipped.
    pub fn amo_vv(&mut self, r_vdst: usize, r_vaddr: usize, r_vsrc: usize, r_mask: usize, cmd: u32) {
        for lane in &mut self.lanes[..self.vl] {
            if !lane.read_flag(r_mask) {
                continue;
            }
            let addr = lane.read_register(r_vaddr);
            if addr & 0x3 != 0 {
                lane.core.raise(maven_core::error::Exception::AddrMisalignedLoad);
                continue;
            }
            let old = match lane.core.load_u32(addr) {
                Some(v) => v,
                None => continue,
            };
            let rhs = lane.read_register(r_vsrc);
            let update = match cmd {
                cop2::AMO_ADD_VV => old.wrapping_add(rhs),
                cop2::AMO_AND_VV => old & rhs,
                cop2::AMO_OR_VV => old | rhs,
                _ => {
                    warn!("unknown vector amo command {:#04x}", cmd);
                    continue;
                }
            };
            lane.core.store_u32(addr, update);
            lane.write_register(r_vdst, old);
        }
    }

    //--------------------------------------------------------------------
    // Cross-VP moves
    //--------------------------------------------------------------------

    pub fn mtvp(&mut self, vp_id: usize, r_vdst: usize, value: Reg) {
        match self.lanes.get_mut(vp_id) {
            Some(lane) => lane.write_register(r_vdst, value),
            None => warn!("mtvp to out-of-range lane {}", vp_id),
        }
    }

    pub fn mfvp(&self, vp_id: usize, r_vsrc: usize) -> Reg {
        match self.lanes.get(vp_id) {
            Some(lane) => lane.read_register(r_vsrc),
            None => {
                warn!("mfvp from out-of-range lane {}", vp_id);
                0
            }
        }
    }

    /// Broadcast write to every active lane.
    pub fn mtvps(&mut self, r_vdst: usize, value: Reg) {
        for lane in &mut self.lanes[..self.vl] {
            lane.write_register(r_vdst, value);
        }
    }

    /// Flag/register moves: mtvps.f copies a flag into a vector
    /// register, mfvps.f sets a flag from a vector register.
    pub fn mtmfvpsf(&mut self, r_dst: usize, r_src: usize, cmd: u32) {
        match cmd {
            cop2::MTVPS_F => {
                for lane in &mut self.lanes[..self.vl] {
                    let f = lane.read_flag(r_src);
                    lane.write_register(r_dst, f as u32);
                }
            }
            cop2::MFVPS_F => {
                for lane in &mut self.lanes[..self.vl] {
                    let v = lane.read_register(r_src) != 0;
                    lane.write_flag(r_dst, v);
                }
            }
            _ => warn!("unknown flag move command {:#04x}", cmd),
        }
    }

    //--------------------------------------------------------------------
    // Vector arithmetic
    //--------------------------------------------------------------------

    pub fn arith_vv(&mut self, r_vdst: usize, r_vsrc1: usize, r_vsrc2: usize, r_mask: usize, cmd: u32) {
        for lane in &mut self.lanes[..self.vl] {
            if !lane.read_flag(r_mask) {
                continue;
            }
            let a = lane.read_register(r_vsrc1);
            let b = lane.read_register(r_vsrc2);
            match int_binop(cmd, a, b) {
                Some(v) => lane.write_register(r_vdst, v),
                None => warn!("unknown vector integer command {:#04x}", cmd),
            }
        }
    }

    /// Vector-scalar and scalar-vector forms share this entry; the
    /// command code fixes the operand order.
    pub fn arith_vs(&mut self, r_vdst: usize, sdata: Reg, r_vsrc: usize, r_mask: usize, cmd: u32) {
        for lane in &mut self.lanes[..self.vl] {
            if !lane.read_flag(r_mask) {
                continue;
            }
            let v = lane.read_register(r_vsrc);
            let (a, b) = if scalar_is_left(cmd) { (sdata, v) } else { (v, sdata) };
            match int_binop(cmd, a, b) {
                Some(v) => lane.write_register(r_vdst, v),
                None => warn!("unknown vector integer command {:#04x}", cmd),
            }
        }
    }

    pub fn arith_v(&mut self, r_vdst: usize, r_vsrc: usize, r_mask: usize, cmd: u32) {
        for lane in &mut self.lanes[..self.vl] {
            if !lane.read_flag(r_mask) {
                continue;
            }
            let v = lane.read_register(r_vsrc);
            match cmd {
                cop2::BITREV_V => lane.write_register(r_vdst, v.reverse_bits()),
                _ => warn!("unknown vector unary command {:#04x}", cmd),
            }
        }
    }

    pub fn utidx_v(&mut self, r_vdst: usize, cmd: u32) {
        if cmd != cop2::UTIDX_V {
            warn!("unknown index command {:#04x}", cmd);
            return;
        }
        for (i, lane) in self.lanes[..self.vl].iter_mut().enumerate() {
            lane.write_register(r_vdst, i as u32);
        }
    }

    pub fn arith_s_vv(&mut self, r_vdst: usize, r_vsrc1: usize, r_vsrc2: usize, r_mask: usize, cmd: u32) {
        for lane in &mut self.lanes[..self.vl] {
            if !lane.read_flag(r_mask) {
                continue;
            }
            let a = f32::from_bits(lane.read_register(r_vsrc1));
            let b = f32::from_bits(lane.read_register(r_vsrc2));
            match f32_binop(cmd, a, b) {
                Some(v) => lane.write_register(r_vdst, v.to_bits()),
                None => warn!("unknown vector fp command {:#04x}", cmd),
            }
        }
    }

    pub fn arith_s_vs(&mut self, r_vdst: usize, sdata: Reg, r_vsrc: usize, r_mask: usize, cmd: u32) {
        let s = f32::from_bits(sdata);
        for lane in &mut self.lanes[..self.vl] {
            if !lane.read_flag(r_mask) {
                continue;
            }
            let v = f32::from_bits(lane.read_register(r_vsrc));
            let (a, b) = if scalar_is_left(cmd) { (s, v) } else { (v, s) };
            match f32_binop(cmd, a, b) {
                Some(v) => lane.write_register(r_vdst, v.to_bits()),
                None => warn!("unknown vector fp command {:#04x}", cmd),
            }
        }
    }

    pub fn arith_s_v(&mut self, r_vdst: usize, r_vsrc: usize, r_mask: usize, cmd: u32) {
        for lane in &mut self.lanes[..self.vl] {
            if !lane.read_flag(r_mask) {
                continue;
            }
            let bits = lane.read_register(r_vsrc);
            let f = f32::from_bits(bits);
            let out = match cmd {
                // abs and neg are raw sign-bit operations.
                cop2::ABS_S_V => bits & 0x7fff_ffff,
                cop2::NEG_S_V => bits ^ 0x8000_0000,
                cop2::ROUND_W_S_V => f32_to_i32(f, f32::round_ties_even),
                cop2::TRUNC_W_S_V => f32_to_i32(f, f32::trunc),
                cop2::CEIL_W_S_V => f32_to_i32(f, f32::ceil),
                cop2::FLOOR_W_S_V => f32_to_i32(f, f32::floor),
                cop2::RECIP_S_V => (1.0 / f).to_bits(),
                cop2::RSQRT_S_V => (1.0 / f.sqrt()).to_bits(),
                cop2::SQRT_S_V => f.sqrt().to_bits(),
                cop2::CVT_S_W_V => ((bits as i32) as f32).to_bits(),
                cop2::CVT_W_S_V => f32_to_i32(f, f32::round_ties_even),
                _ => {
                    warn!("unknown vector fp unary command {:#04x}", cmd);
                    continue;
                }
            };
            lane.write_register(r_vdst, out);
        }
    }

    //--------------------------------------------------------------------
    // Flags
    //--------------------------------------------------------------------

    /// Integer compares writing a flag register.
    pub fn setflag(&mut self, r_fdst: usize, r_vsrc1: usize, r_vsrc2: usize, cmd: u32) {
        for lane in &mut self.lanes[..self.vl] {
            let a = lane.read_register(r_vsrc1);
            let b = lane.read_register(r_vsrc2);
            let cond = match cmd {
                cop2::SEQ_F_VV => a == b,
                cop2::SLT_F_VV => (a as i32) < (b as i32),
                cop2::SLTU_F_VV => a < b,
                _ => {
                    warn!("unknown setflag command {:#04x}", cmd);
                    continue;
                }
            };
            lane.write_flag(r_fdst, cond);
        }
    }

    pub fn sf_setflag_vv(&mut self, r_fdst: usize, r_vsrc1: usize, r_vsrc2: usize, cmd: u32) {
        let cond = cmd & 0xf;
        for lane in &mut self.lanes[..self.vl] {
            let a = f32::from_bits(lane.read_register(r_vsrc1));
            let b = f32::from_bits(lane.read_register(r_vsrc2));
            lane.write_flag(r_fdst, f32_cond(cond, a, b));
        }
    }

    pub fn sf_setflag_vs(&mut self, r_fdst: usize, r_vsrc: usize, rsrc: Reg, cmd: u32) {
        let cond = cmd & 0xf;
        let b = f32::from_bits(rsrc);
        for lane in &mut self.lanes[..self.vl] {
            let a = f32::from_bits(lane.read_register(r_vsrc));
            lane.write_flag(r_fdst, f32_cond(cond, a, b));
        }
    }

    pub fn sf_setflag_sv(&mut self, r_fdst: usize, rsrc: Reg, r_vsrc: usize, cmd: u32) {
        let cond = cmd & 0xf;
        let a = f32::from_bits(rsrc);
        for lane in &mut self.lanes[..self.vl] {
            let b = f32::from_bits(lane.read_register(r_vsrc));
            lane.write_flag(r_fdst, f32_cond(cond, a, b));
        }
    }

    /// Logical operations over flag registers.
    pub fn flagops(&mut self, r_fdst: usize, r_fsrc1: usize, r_fsrc2: usize, cmd: u32) {
        for lane in &mut self.lanes[..self.vl] {
            let f1 = lane.read_flag(r_fsrc1);
            let f2 = lane.read_flag(r_fsrc2);
            let out = match cmd {
                cop2::NOT_F => !f1,
                cop2::MOV_F => f1,
                cop2::OR_F => f1 | f2,
                cop2::AND_F => f1 & f2,
                _ => {
                    warn!("unknown flag command {:#04x}", cmd);
                    continue;
                }
            };
            lane.write_flag(r_fdst, out);
        }
    }

    /// Population count of a flag across active lanes.
    pub fn popcf(&self, r_fsrc: usize) -> Reg {
        self.lanes[..self.vl]
            .iter()
            .filter(|l| l.read_flag(r_fsrc))
            .count() as u32
    }

    /// Index of the first active lane with the flag set, or all-ones.
    pub fn findfonef(&self, r_fsrc: usize) -> Reg {
        self.lanes[..self.vl]
            .iter()
            .position(|l| l.read_flag(r_fsrc))
            .map_or(u32::MAX, |i| i as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maven_core::mem::MemoryImage;

    fn varray(vl: usize) -> VpArray {
        let mut va = VpArray::new(MemoryImage::shared(4096), PvfbPolicy::Stack);
        va.setvl(vl as u32);
        va
    }

    #[test]
    fn setvl_clamps_to_vlmax() {
        let mut va = varray(4);
        assert_eq!(va.setvl(100), 32);
        assert_eq!(va.vl(), 32);
        assert_eq!(va.setvl(0), 0);
    }

    #[test]
    fn vcfg_trades_registers_for_lanes() {
        let mut va = varray(32);
        va.set_num_physical_regs(256);
        va.vcfg(32);
        assert_eq!(va.vlmax(), 8);
        assert_eq!(va.vl(), 8);
        va.vcfg(8);
        assert_eq!(va.vlmax(), 32);
    }

    #[test]
    fn arith_vv_addu_per_lane() {
        let mut va = varray(4);
        for i in 0..4 {
            va.mtvp(i, 1, 10 * i as u32);
            va.mtvp(i, 2, 3);
        }
        va.arith_vv(3, 1, 2, 0, cop2::ADDU_VV);
        for i in 0..4 {
            assert_eq!(va.mfvp(i, 3), 10 * i as u32 + 3);
        }
    }

    #[test]
    fn masked_lane_is_skipped() {
        let mut va = varray(2);
        va.mtvp(0, 1, 5);
        va.mtvp(1, 1, 5);
        va.setflag(2, 0, 0, cop2::SEQ_F_VV); // flag 2 true on every lane
        va.mtvp(1, 9, 1);
        va.setflag(2, 9, 0, cop2::SEQ_F_VV); // now false on lane 1
        va.arith_vs(4, 7, 1, 2, cop2::ADDU_VS);
        assert_eq!(va.mfvp(0, 4), 12);
        assert_eq!(va.mfvp(1, 4), 0);
    }

    #[test]
    fn scalar_left_operand_order() {
        let mut va = varray(1);
        va.mtvp(0, 1, 3);
        va.arith_vs(2, 10, 1, 0, cop2::SUBU_SV);
        assert_eq!(va.mfvp(0, 2), 7);
        va.arith_vs(2, 10, 1, 0, cop2::SUBU_VS);
        assert_eq!(va.mfvp(0, 2), 3u32.wrapping_sub(10));
    }

    #[test]
    fn unit_stride_load_store_round_trip() {
        let mem = MemoryImage::shared(4096);
        for i in 0..4u32 {
            mem.write().write_u32(0x100 + i * 4, 100 + i).unwrap();
        }
        let mut va = VpArray::new(mem.clone(), PvfbPolicy::Queue);
        va.setvl(4);
        va.vload(0x100, 5, 4, 1, ElemWidth::Word);
        for i in 0..4 {
            assert_eq!(va.mfvp(i, 5), 100 + i as u32);
        }
        va.arith_vs(5, 1, 5, 0, cop2::ADDU_VS);
        va.vstore(0x200, 5, 4, 1, ElemWidth::Word);
        for i in 0..4u32 {
            assert_eq!(mem.read().read_u32(0x200 + i * 4).unwrap(), 101 + i);
        }
    }

    #[test]
    fn signed_halfword_gather_sign_extends() {
        let mem = MemoryImage::shared(4096);
        mem.write().write_u16(0x40, 0xffff).unwrap();
        mem.write().write_u16(0x42, 0x0002).unwrap();
        let mut va = VpArray::new(mem, PvfbPolicy::Queue);
        va.setvl(2);
        va.mtvp(0, 1, 0);
        va.mtvp(1, 1, 2);
        va.vload_x(3, 0x40, 1, ElemWidth::Hword);
        assert_eq!(va.mfvp(0, 3), 0xffff_ffff);
        assert_eq!(va.mfvp(1, 3), 2);
    }

    #[test]
    fn flag_reductions() {
        let mut va = varray(4);
        va.mtvp(1, 1, 1);
        va.mtvp(3, 1, 1);
        va.mtmfvpsf(2, 1, cop2::MFVPS_F); // flag2 = reg1 != 0
        assert_eq!(va.popcf(2), 2);
        assert_eq!(va.findfonef(2), 1);
        va.flagops(3, 2, 2, cop2::NOT_F);
        assert_eq!(va.popcf(3), 2);
        assert_eq!(va.findfonef(3), 0);
        assert_eq!(va.findfonef(4), u32::MAX);
    }

    #[test]
    fn utidx_writes_lane_indices() {
        let mut va = varray(3);
        va.utidx_v(6, cop2::UTIDX_V);
        for i in 0..3 {
            assert_eq!(va.mfvp(i, 6), i as u32);
        }
    }

    #[test]
    fn fp_unary_saturating_convert() {
        let mut va = varray(1);
        va.mtvp(0, 1, 2.75f32.to_bits());
        va.arith_s_v(2, 1, 0, cop2::TRUNC_W_S_V);
        assert_eq!(va.mfvp(0, 2), 2);
        va.mtvp(0, 1, f32::NAN.to_bits());
        va.arith_s_v(2, 1, 0, cop2::CVT_W_S_V);
        assert_eq!(va.mfvp(0, 2), i32::MAX as u32);
    }
}
