//! Whole-machine runs through the simulator facade.

use maven_core::config::SimConfig;
use maven_isa::insn::{encode_i_type, encode_r_type, encode_vmem, InstructionWord};
use maven_isa::opcodes::{cop0, cop2, maven, misc, op};
use maven_sim::Simulator;

fn misc_op(func: u32, rs: u32, rt: u32, rd: u32) -> u32 {
    (maven::MISC << 26) | (rs << 21) | (rt << 16) | (rd << 11) | func
}

fn mfc0(rt: u32, rd: u32) -> u32 {
    let mut w = InstructionWord::new(op::COP0 << 26);
    w.set_rs(cop0::MFC0).set_rt(rt).set_rd(rd);
    w.bits()
}

fn mtc0(rt: u32, rd: u32) -> u32 {
    let mut w = InstructionWord::new(op::COP0 << 26);
    w.set_rs(cop0::MTC0).set_rt(rt).set_rd(rd);
    w.bits()
}

fn cop2_cmd(rs: u32, rt: u32, rd: u32, cmd: u32) -> u32 {
    let mut w = InstructionWord::new(op::COP2 << 26);
    w.set_rs(rs).set_rt(rt).set_rd(rd).set_cmd(cmd);
    w.bits()
}

fn simm(v: i32) -> u32 {
    (v as u32) & 0xffff
}

fn load_words(sim: &Simulator, base: u32, words: &[u32]) {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for w in words {
        bytes.extend_from_slice(&w.to_le_bytes());
    }
    sim.load_image(base, &bytes).unwrap();
}

fn small_sim(num_cores: usize) -> Simulator {
    Simulator::new(SimConfig {
        num_cores,
        memory_size: 64 * 1024,
        ..SimConfig::default()
    })
}

#[test]
fn scalar_program_exits_with_value() {
    let mut sim = small_sim(1);
    load_words(
        &sim,
        0,
        &[
            encode_i_type(op::ADDIU, 0, 2, 42).bits(),
            misc_op(misc::STOP, 0, 0, 0),
        ],
    );
    assert_eq!(sim.run(0).unwrap(), 42);
}

/// vcfgivl, a vector fetch, and a unit-stride store driven end to end.
#[test]
fn vector_fetch_end_to_end() {
    let mut sim = small_sim(1);
    let program = [
        encode_i_type(op::ADDIU, 0, 4, 8).bits(), // request vl 8
        encode_i_type(maven::CP_VCFGIVL, 4, 4, 31).bits(),
        encode_i_type(op::ADDIU, 0, 6, 0x200).bits(),
        // vf +4: block at 0x20
        encode_i_type(maven::CP_VF, 0, 0, simm(4)).bits(),
        encode_vmem(maven::CP_VSTORE, 0, 6, 9, 0, 1, 0, 0).bits(), // sw.v vr9,$6
        encode_i_type(op::ADDIU, 0, 2, 42).bits(),
        misc_op(misc::STOP, 0, 0, 0),
        0, // padding
        // vector-fetched block
        misc_op(misc::VPIDX, 0, 0, 8),              // vpidx $8
        encode_i_type(op::ADDIU, 8, 9, 100).bits(), // addiu $9,$8,100
        misc_op(misc::STOP, 0, 0, 0),
    ];
    load_words(&sim, 0, &program);

    assert_eq!(sim.run(0).unwrap(), 42);
    assert_eq!(sim.core(0).vparray.vl(), 8);
    for i in 0..8u32 {
        assert_eq!(
            sim.mem().read().read_u32(0x200 + 4 * i).unwrap(),
            100 + i,
            "lane {}",
            i
        );
    }
}

#[test]
fn cross_vp_move_through_cop2() {
    let mut sim = small_sim(1);
    let program = [
        encode_i_type(op::ADDIU, 0, 8, 2).bits(),  // vp id 2
        encode_i_type(op::ADDIU, 0, 9, 77).bits(), // value
        cop2_cmd(8, 9, 5, cop2::MTVP),             // mtvp $8,vr5,$9
        cop2_cmd(8, 2, 5, cop2::MFVP),             // mfvp $2,$8,vr5
        misc_op(misc::STOP, 0, 0, 0),
    ];
    load_words(&sim, 0, &program);
    assert_eq!(sim.run(0).unwrap(), 77);
}

/// Core 0 wakes core 1 through the thread mask; core 1 signals through
/// memory and parks itself with a TID_STOP write.
#[test]
fn multicore_tid_mask_handoff() {
    let mut sim = small_sim(2);
    let program = [
        mfc0(8, 17), // $8 = core id
        encode_i_type(op::BNE, 8, 0, simm(8)).bits(),
        0,
        // core 0: wake core 1, wait for the flag word
        encode_i_type(op::ADDIU, 0, 9, 3).bits(),
        mtc0(9, 18), // TID_MASK = 0b11
        encode_i_type(op::LW, 0, 10, 0x100).bits(),
        encode_i_type(op::BEQ, 10, 0, simm(-2)).bits(),
        0,
        encode_r_type(10, 0, 2, 0, 0x21).bits(), // addu $2,$10,$0
        misc_op(misc::STOP, 0, 0, 0),
        // core 1 at 0x28: post the flag, park
        encode_i_type(op::ADDIU, 0, 11, 7).bits(),
        encode_i_type(op::SW, 0, 11, 0x100).bits(),
        mtc0(0, 19), // TID_STOP
        misc_op(misc::STOP, 0, 0, 0),
    ];
    load_words(&sim, 0, &program);

    assert_eq!(sim.run(0).unwrap(), 7);
    assert_eq!(sim.core(0).tid_mask(), 0b01);
}

/// The guest-visible cycle counter advances while a spin loop runs.
#[test]
fn count_register_advances() {
    let mut sim = small_sim(1);
    let program = [
        mfc0(8, 9), // COUNT_LO
        0,
        0,
        0,
        mfc0(9, 9),
        encode_r_type(9, 8, 2, 0, 0x23).bits(), // subu $2,$9,$8
        misc_op(misc::STOP, 0, 0, 0),
    ];
    load_words(&sim, 0, &program);
    assert_eq!(sim.run(0).unwrap(), 4);
}

/// mtc0 to the host channel becomes visible through run_to_tohost.
#[test]
fn tohost_write_stops_run_to_tohost() {
    let mut sim = small_sim(1);
    let program = [
        encode_i_type(op::ADDIU, 0, 8, 0x55).bits(),
        mtc0(8, 30), // TOHOST
        encode_i_type(op::BEQ, 0, 0, simm(-1)).bits(), // spin
        0,
    ];
    load_words(&sim, 0, &program);
    sim.core_mut(0).go(0);
    sim.set_cycle_limit(1_000);
    assert_eq!(sim.run_to_tohost(0).unwrap(), 0x55);
}
