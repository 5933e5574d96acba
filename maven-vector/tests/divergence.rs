//! End-to-end vector-fetch scenarios through the lane array.

use maven_core::config::PvfbPolicy;
use maven_core::mem::{MemoryImage, SharedMem};
use maven_vector::{ElemWidth, VpArray};

use maven_isa::insn::{encode_i_type, encode_r_type};
use maven_isa::opcodes::{maven, misc, op};

fn misc_op(func: u32, rs: u32, rt: u32, rd: u32) -> u32 {
    (maven::MISC << 26) | (rs << 21) | (rt << 16) | (rd << 11) | func
}

fn write_program(mem: &SharedMem, base: u32, words: &[u32]) {
    let mut m = mem.write();
    for (i, w) in words.iter().enumerate() {
        m.write_u32(base + 4 * i as u32, *w).unwrap();
    }
}

/// Lanes 0 and 1 take the branch, lanes 2 and 3 fall through; both
/// cohorts stop and the fetch returns with per-cohort results.
#[test]
fn four_lane_branch_divergence() {
    let mem = MemoryImage::shared(4096);
    let program = [
        misc_op(misc::VPIDX, 0, 0, 2),                // vpidx $2
        encode_i_type(op::SLTIU, 2, 3, 2).bits(),     // sltiu $3,$2,2
        encode_i_type(op::BNE, 3, 0, 3).bits(),       // bne $3,$0,taken
        0,                                            // nop (delay slot)
        encode_i_type(op::ADDIU, 0, 4, 7).bits(),     // addiu $4,$0,7
        misc_op(misc::STOP, 0, 0, 0),                 // stop
        encode_i_type(op::ADDIU, 0, 4, 9).bits(),     // taken: addiu $4,$0,9
        misc_op(misc::STOP, 0, 0, 0),                 // stop
    ];
    write_program(&mem, 0, &program);

    for policy in [PvfbPolicy::Queue, PvfbPolicy::Stack, PvfbPolicy::DualStack] {
        let mut va = VpArray::new(mem.clone(), policy);
        va.setvl(4);
        va.set_stats(true);
        va.go(0);

        assert_eq!(va.mfvp(0, 4), 9, "{:?}", policy);
        assert_eq!(va.mfvp(1, 4), 9, "{:?}", policy);
        assert_eq!(va.mfvp(2, 4), 7, "{:?}", policy);
        assert_eq!(va.mfvp(3, 4), 7, "{:?}", policy);
        assert_eq!(va.stats().numvfs, 1);
        assert_eq!(va.stats().split_total, 1);
    }
}

/// A uniform block never splits and writes the same result everywhere.
#[test]
fn uniform_block_runs_without_splitting() {
    let mem = MemoryImage::shared(4096);
    let program = [
        encode_i_type(op::ADDIU, 0, 2, 21).bits(),
        encode_r_type(2, 2, 3, 0, 0x21).bits(), // addu $3,$2,$2
        misc_op(misc::STOP, 0, 0, 0),
    ];
    write_program(&mem, 0x100, &program);

    let mut va = VpArray::new(mem, PvfbPolicy::Stack);
    va.setvl(8);
    va.set_stats(true);
    va.go(0x100);

    for i in 0..8 {
        assert_eq!(va.mfvp(i, 3), 42);
    }
    assert_eq!(va.stats().split_total, 0);
    assert_eq!(va.stats().vl_freq[8], 3);
}

/// Diverged cohorts that run into the same join block merge back before
/// retiring, for the stack and queue policies alike. The branch sense
/// picks which cohort waits in the buffer while the other catches up.
fn reconverge_program(mem: &SharedMem, branch: u32) {
    let program = [
        misc_op(misc::VPIDX, 0, 0, 2),            // vpidx $2
        encode_i_type(op::SLTIU, 2, 3, 1).bits(), // sltiu $3,$2,1
        encode_i_type(branch, 3, 0, 2).bits(),    // b?? $3,$0,+2
        0,                                        // nop (delay slot)
        0,                                        // nop (fallthrough path)
        encode_i_type(op::ADDIU, 0, 5, 1).bits(), // join: addiu $5,$0,1
        misc_op(misc::STOP, 0, 0, 0),
    ];
    write_program(mem, 0, &program);
}

#[test]
fn cohorts_reconverge_at_common_block() {
    // Stack pops the cohort split off last; bne sends lane 0 to the
    // join first, so the fallthrough lanes catch it there. Queue pops
    // the lane-0 cohort first, so beq makes lane 0 the catcher-up.
    for (policy, branch) in [(PvfbPolicy::Stack, op::BNE), (PvfbPolicy::Queue, op::BEQ)] {
        let mem = MemoryImage::shared(4096);
        reconverge_program(&mem, branch);
        let mut va = VpArray::new(mem, policy);
        va.setvl(4);
        va.set_stats(true);
        va.go(0);
        for i in 0..4 {
            assert_eq!(va.mfvp(i, 5), 1, "{:?}", policy);
        }
        assert_eq!(va.stats().merge_total, 1, "{:?}", policy);
    }
}

/// Vector fetch combined with CP-side vector memory commands.
#[test]
fn gather_square_scatter() {
    let mem = MemoryImage::shared(4096);
    for i in 0..4u32 {
        mem.write().write_u32(0x200 + 4 * i, i + 2).unwrap();
    }
    // Square $6 into $7 on every lane.
    let program = [
        misc_op(misc::MULHI, 6, 6, 8),          // mulhi $8,$6,$6 (high word, zero here)
        encode_r_type(6, 6, 7, 0, 0x21).bits(), // addu $7,$6,$6
        misc_op(misc::STOP, 0, 0, 0),
    ];
    write_program(&mem, 0, &program);

    let mut va = VpArray::new(mem.clone(), PvfbPolicy::Stack);
    va.setvl(4);
    va.vload(0x200, 6, 4, 1, ElemWidth::Word);
    va.go(0);
    va.vstore(0x300, 7, 4, 1, ElemWidth::Word);

    for i in 0..4u32 {
        assert_eq!(mem.read().read_u32(0x300 + 4 * i).unwrap(), 2 * (i + 2));
        assert_eq!(va.mfvp(i as usize, 8), 0);
    }
}
