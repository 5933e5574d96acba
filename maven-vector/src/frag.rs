//! Vector fragments: a cohort of lanes sharing one pc and an active-lane
//! mask. Fragments are the unit the divergence scheduler works in.

use maven_core::types::Addr;

/// One scheduled cohort. The mask has one bit per lane; bit i set means
/// lane i executes with this fragment. The counters feed the divergence
/// statistics and never affect execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorFragment {
    pub pc: Addr,
    pub mask: u32,
    /// Number of set mask bits, cached for the stats collector.
    pub size: usize,
    /// Vector-fetch cycle this fragment was formed on.
    pub start_cycle: u32,
    /// Branches this fragment survived without splitting.
    pub numbranches: u32,
    /// Times this fragment has split.
    pub numsplits: u32,
}

impl VectorFragment {
    pub fn new(pc: Addr, mask: u32) -> Self {
        Self {
            pc,
            mask,
            size: mask.count_ones() as usize,
            start_cycle: 0,
            numbranches: 0,
            numsplits: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.mask == 0
    }

    /// Lane indices with a set mask bit, ascending.
    pub fn lanes(&self) -> impl Iterator<Item = usize> + '_ {
        let mask = self.mask;
        (0..32).filter(move |i| mask & (1 << i) != 0)
    }

    pub fn reset_stats(&mut self) {
        self.numbranches = 0;
        self.numsplits = 0;
    }

    pub fn copy_stats(&mut self, other: &VectorFragment) {
        self.numbranches = other.numbranches;
        self.numsplits = other.numsplits;
    }
}

impl Default for VectorFragment {
    fn default() -> Self {
        Self::new(Addr::MAX, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_tracks_mask_population() {
        let f = VectorFragment::new(0x100, 0b1011);
        assert_eq!(f.size, 3);
        assert_eq!(f.lanes().collect::<Vec<_>>(), vec![0, 1, 3]);
    }

    #[test]
    fn default_fragment_is_dead() {
        assert!(VectorFragment::default().is_dead());
    }
}
