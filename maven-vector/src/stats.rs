//! Divergence statistics for vector-fetched blocks.

use std::collections::BTreeMap;

use serde::Serialize;

use maven_core::syscfg::VLEN_MAX;
use maven_core::types::Addr;

use crate::frag::VectorFragment;

/// Counters describing how fragments split, merge and retire across a
/// run. Serialized as-is for the stats dump.
#[derive(Debug, Clone, Serialize)]
pub struct DivergenceData {
    /// Vector fetches executed.
    pub numvfs: u32,
    /// Fragment-step cycles over the whole run.
    pub total_cycles: u32,
    /// Fragment-step cycles within the current vector fetch.
    pub vf_cycle: u32,
    /// Branches executed by fragments, split or not.
    pub total_branches: u32,
    /// Cycles spent at each fragment size, index = active lanes.
    pub vl_freq: Vec<u32>,
    /// Fragment splits over the whole run.
    pub split_total: u32,
    /// Splits per branch pc.
    pub splits: BTreeMap<Addr, u32>,
    /// Fragment pairs rejoined at a common pc.
    pub merge_total: u32,
}

impl DivergenceData {
    pub fn new() -> Self {
        Self {
            numvfs: 0,
            total_cycles: 0,
            vf_cycle: 0,
            total_branches: 0,
            vl_freq: vec![0; VLEN_MAX + 1],
            split_total: 0,
            splits: BTreeMap::new(),
            merge_total: 0,
        }
    }

    /// Called once per vector fetch, before any fragment runs.
    pub fn begin_vf(&mut self) {
        self.numvfs += 1;
        self.vf_cycle = 0;
    }

    /// Called once per fragment step.
    pub fn step(&mut self, frag: &VectorFragment) {
        self.total_cycles += 1;
        self.vf_cycle += 1;
        if frag.size < self.vl_freq.len() {
            self.vl_freq[frag.size] += 1;
        }
    }

    pub fn branch(&mut self) {
        self.total_branches += 1;
    }

    pub fn split(&mut self, branch_pc: Addr) {
        self.split_total += 1;
        *self.splits.entry(branch_pc).or_insert(0) += 1;
    }

    pub fn merge(&mut self) {
        self.merge_total += 1;
    }
}

impl Default for DivergenceData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_buckets_by_fragment_size() {
        let mut d = DivergenceData::new();
        d.begin_vf();
        d.step(&VectorFragment::new(0x100, 0xf));
        d.step(&VectorFragment::new(0x104, 0xf));
        d.step(&VectorFragment::new(0x108, 0x3));
        assert_eq!(d.vl_freq[4], 2);
        assert_eq!(d.vl_freq[2], 1);
        assert_eq!(d.total_cycles, 3);
        assert_eq!(d.vf_cycle, 3);
        assert_eq!(d.numvfs, 1);
    }

    #[test]
    fn splits_count_per_branch_pc() {
        let mut d = DivergenceData::new();
        d.split(0x40);
        d.split(0x40);
        d.split(0x80);
        assert_eq!(d.split_total, 3);
        assert_eq!(d.splits[&0x40], 2);
        assert_eq!(d.splits[&0x80], 1);
    }

    #[test]
    fn serializes_to_json() {
        let d = DivergenceData::new();
        let text = serde_json::to_string(&d).unwrap();
        assert!(text.contains("\"numvfs\":0"));
    }
}
