//! Whole-machine simulator: shared memory, one control processor per
//! core, and the interleaved run loop.

use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use log::{info, trace};
use thiserror::Error;

use maven_core::config::SimConfig;
use maven_core::context::SimContext;
use maven_core::error::MemError;
use maven_core::mem::{MemoryImage, SharedMem};
use maven_core::types::Addr;
use maven_isa::{step, DispatchTable, InstructionWord};

use crate::cp::Cp;
use crate::maven_table::build_cp_table;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("cycle limit of {0} exceeded")]
    CycleLimit(u64),
    #[error("memory error: {0}")]
    Mem(#[from] MemError),
}

pub struct Simulator {
    cfg: SimConfig,
    mem: SharedMem,
    ctx: Arc<SimContext>,
    tid_mask: Arc<AtomicU32>,
    table: DispatchTable<Cp>,
    cores: Vec<Cp>,
    cycle_limit: u64,
}

impl Simulator {
    pub fn new(cfg: SimConfig) -> Self {
        let mem = MemoryImage::shared(cfg.memory_size);
        let ctx = SimContext::new();
        let tid_mask = Arc::new(AtomicU32::new(0x1));
        let cores = Self::build_cores(&cfg, &mem, &ctx, &tid_mask);
        Self {
            cfg,
            mem,
            ctx,
            tid_mask,
            table: build_cp_table(),
            cores,
            cycle_limit: u64::MAX,
        }
    }

    fn build_cores(
        cfg: &SimConfig,
        mem: &SharedMem,
        ctx: &Arc<SimContext>,
        tid_mask: &Arc<AtomicU32>,
    ) -> Vec<Cp> {
        (0..cfg.num_cores)
            .map(|i| {
                let mut cp = Cp::new(
                    mem.clone(),
                    ctx.clone(),
                    tid_mask.clone(),
                    i as u32,
                    cfg.pvfb_policy,
                );
                cp.vparray.set_vlmax(cfg.vlmax);
                if cfg.stats {
                    cp.set_stats_en(true);
                    cp.vparray.set_scoreboard(true);
                }
                cp
            })
            .collect()
    }

    pub fn load_image(&self, addr: Addr, bytes: &[u8]) -> Result<(), SimError> {
        self.mem.write().load(addr, bytes)?;
        Ok(())
    }

    /// Drops all processor state and counters; memory contents survive.
    pub fn reset(&mut self) {
        self.ctx.reset();
        self.tid_mask
            .store(0x1, std::sync::atomic::Ordering::Relaxed);
        self.cores = Self::build_cores(&self.cfg, &self.mem, &self.ctx, &self.tid_mask);
    }

    pub fn set_cycle_limit(&mut self, limit: u64) {
        self.cycle_limit = limit;
    }

    pub fn cycle(&self) -> u64 {
        self.ctx.cop0_count()
    }

    pub fn mem(&self) -> &SharedMem {
        &self.mem
    }

    pub fn core(&self, idx: usize) -> &Cp {
        &self.cores[idx]
    }

    pub fn core_mut(&mut self, idx: usize) -> &mut Cp {
        &mut self.cores[idx]
    }

    pub fn tohost(&self) -> u32 {
        self.cores[0].tohost
    }

    pub fn set_fromhost(&mut self, val: u32) {
        self.cores[0].fromhost = val;
    }

    /// One global cycle: every core whose thread mask bit is set steps
    /// one instruction.
    pub fn step(&mut self) {
        let mask = self.tid_mask.load(std::sync::atomic::Ordering::Relaxed);
        for (i, cp) in self.cores.iter_mut().enumerate() {
            if mask & (1 << i) == 0 || !cp.is_running() {
                continue;
            }
            if self.cfg.trace {
                let pc = cp.core.pc;
                if let Ok(bits) = self.mem.read().read_u32(pc) {
                    trace!(
                        "core{} {:#010x}: {}",
                        i,
                        pc,
                        self.table.disassemble(InstructionWord::new(bits))
                    );
                }
            }
            step(cp, &self.table);
        }
        self.ctx.tick();
        if self.cfg.stats {
            self.ctx.stat_tick();
        }
    }

    /// Runs every core from `entry` until core 0 stops. Returns core 0's
    /// exit value.
    pub fn run(&mut self, entry: Addr) -> Result<u32, SimError> {
        info!("starting {} core(s) at {:#010x}", self.cores.len(), entry);
        for cp in &mut self.cores {
            cp.go(entry);
        }
        while self.cores[0].is_running() {
            if self.ctx.cop0_count() >= self.cycle_limit {
                return Err(SimError::CycleLimit(self.cycle_limit));
            }
            self.step();
        }
        let exit = self.cores[0].exit_value();
        info!("core 0 stopped after {} cycles, exit {}", self.cycle(), exit);
        Ok(exit)
    }

    /// Runs until core 0's tohost register changes from `orig` or the
    /// processor stops. Returns the new tohost value.
    pub fn run_to_tohost(&mut self, orig: u32) -> Result<u32, SimError> {
        while self.cores[0].is_running() && self.cores[0].tohost == orig {
            if self.ctx.cop0_count() >= self.cycle_limit {
                return Err(SimError::CycleLimit(self.cycle_limit));
            }
            self.step();
        }
        Ok(self.cores[0].tohost)
    }

    /// Divergence and scoreboard statistics for every core, as JSON.
    pub fn stats_report(&self) -> serde_json::Value {
        let cores: Vec<serde_json::Value> = self
            .cores
            .iter()
            .enumerate()
            .map(|(i, cp)| {
                serde_json::json!({
                    "core": i,
                    "divergence": cp.vparray.stats(),
                    "scoreboard": cp.vparray.scoreboard().stats(),
                })
            })
            .collect();
        serde_json::json!({
            "cycles": self.cycle(),
            "stat_cycles": self.ctx.stat_cycles(),
            "cores": cores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_limit_reports_error() {
        let mut sim = Simulator::new(SimConfig {
            memory_size: 4096,
            ..SimConfig::default()
        });
        // An empty image spins on nops until the limit trips.
        sim.set_cycle_limit(16);
        match sim.run(0) {
            Err(SimError::CycleLimit(16)) => {}
            other => panic!("expected cycle limit, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn reset_preserves_memory() {
        let mut sim = Simulator::new(SimConfig {
            memory_size: 4096,
            ..SimConfig::default()
        });
        sim.load_image(0x80, &[1, 2, 3, 4]).unwrap();
        sim.reset();
        assert_eq!(sim.mem().read().read_u8(0x80).unwrap(), 1);
        assert_eq!(sim.cycle(), 0);
    }
}
