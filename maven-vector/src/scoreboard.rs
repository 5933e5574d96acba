//! Hazard-tracking scoreboard, instrumentation only.
//!
//! Models a single-issue vector unit with five functional units and a
//! per-register writeback tag, and accumulates the stall cycles a real
//! in-order issue stage would see. It never blocks or reorders anything;
//! correctness is entirely the executors' business.

use serde::Serialize;

use maven_isa::{AluClass, UarchNote};

/// Functional unit classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Vau0 = 0,
    Vau1 = 1,
    Vru = 2,
    Vlu = 3,
    Vsu = 4,
}

const NUM_UNITS: usize = 5;

fn unit_of(alu: AluClass) -> Unit {
    match alu {
        AluClass::Int | AluClass::IDivRem | AluClass::IMul => Unit::Vau0,
        AluClass::FAddSub | AluClass::FDiv | AluClass::FMul | AluClass::FSqrt => Unit::Vau1,
        AluClass::Ld | AluClass::VLd => Unit::Vlu,
        AluClass::St | AluClass::VSt => Unit::Vsu,
    }
}

/// Issue-to-writeback latency in cycles.
fn latency_of(alu: AluClass) -> u64 {
    match alu {
        AluClass::Int => 1,
        AluClass::IMul => 4,
        AluClass::IDivRem => 12,
        AluClass::FAddSub => 4,
        AluClass::FMul => 4,
        AluClass::FDiv => 12,
        AluClass::FSqrt => 16,
        AluClass::Ld | AluClass::VLd => 2,
        AluClass::St | AluClass::VSt => 1,
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScoreboardStats {
    pub issued: u64,
    pub stall_cycles: u64,
    pub unit_busy: [u64; NUM_UNITS],
}

/// Tracks issue timing for one vector unit.
pub struct Scoreboard {
    branch_chain: bool,
    cycle: u64,
    cp_cycle: u64,
    /// Cycle each register's pending write completes.
    dep: [u64; 32],
    /// Cycle each unit's read/write port frees up.
    rport: [u64; NUM_UNITS],
    wport: [u64; NUM_UNITS],
    stats: ScoreboardStats,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self {
            branch_chain: false,
            cycle: 0,
            cp_cycle: 0,
            dep: [0; 32],
            rport: [0; NUM_UNITS],
            wport: [0; NUM_UNITS],
            stats: ScoreboardStats::default(),
        }
    }

    /// Advances the control-processor clock by one cycle.
    pub fn step_cycle(&mut self) {
        self.cp_cycle += 1;
    }

    pub fn step(&mut self, delta: u64) {
        self.cp_cycle += delta;
    }

    /// Accounts one vector instruction over `vl` elements using the
    /// microarch note the handler left behind.
    pub fn execute(&mut self, vl: usize, note: &UarchNote) {
        let alu = match note.alu {
            Some(alu) => alu,
            None => return,
        };
        // Vector issue never runs ahead of the control processor.
        let mut issue = self.cycle.max(self.cp_cycle);

        if note.b_rs {
            issue = issue.max(self.dep[note.rs]);
        }
        if note.b_rt {
            issue = issue.max(self.dep[note.rt]);
        }
        let unit = unit_of(alu) as usize;
        issue = issue.max(self.rport[unit]).max(self.wport[unit]);
        if note.inst_branch && self.branch_chain {
            // Back-to-back branches resteer the fragment sequencer.
            issue += 1;
        }

        let occupancy = vl.max(1) as u64;
        self.stats.stall_cycles += issue - self.cycle.max(self.cp_cycle);
        self.stats.issued += 1;
        self.stats.unit_busy[unit] += occupancy;

        self.rport[unit] = issue + occupancy;
        self.wport[unit] = issue + occupancy;
        if note.b_rd {
            self.dep[note.rd] = issue + occupancy + latency_of(alu);
        }
        self.cycle = issue + 1;
        self.branch_chain = note.inst_branch || note.inst_jump;
    }

    /// Waits out every outstanding write, as a sync instruction would.
    pub fn flush(&mut self) {
        let drained = self
            .dep
            .iter()
            .chain(self.wport.iter())
            .copied()
            .fold(self.cycle, u64::max);
        self.cycle = drained;
        self.dep = [drained; 32];
        self.rport = [drained; NUM_UNITS];
        self.wport = [drained; NUM_UNITS];
        self.branch_chain = false;
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn stats(&self) -> ScoreboardStats {
        self.stats
    }
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(alu: AluClass, rs: usize, rt: usize, rd: usize) -> UarchNote {
        UarchNote {
            alu: Some(alu),
            rs,
            rt,
            rd,
            b_rs: true,
            b_rt: true,
            b_rd: true,
            ..UarchNote::default()
        }
    }

    #[test]
    fn independent_ops_do_not_stall() {
        let mut sb = Scoreboard::new();
        sb.execute(4, &note(AluClass::Int, 1, 2, 3));
        sb.execute(4, &note(AluClass::FMul, 4, 5, 6));
        assert_eq!(sb.stats().stall_cycles, 0);
        assert_eq!(sb.stats().issued, 2);
    }

    #[test]
    fn raw_dependency_stalls_issue() {
        let mut sb = Scoreboard::new();
        sb.execute(4, &note(AluClass::IDivRem, 1, 2, 3));
        // Consumes r3 before the divide writes back.
        sb.execute(4, &note(AluClass::Int, 3, 0, 5));
        assert!(sb.stats().stall_cycles > 0);
    }

    #[test]
    fn flush_clears_outstanding_writes() {
        let mut sb = Scoreboard::new();
        sb.execute(8, &note(AluClass::FDiv, 1, 2, 3));
        sb.flush();
        let before = sb.stats().stall_cycles;
        sb.execute(8, &note(AluClass::Int, 3, 0, 4));
        assert_eq!(sb.stats().stall_cycles, before);
    }
}
