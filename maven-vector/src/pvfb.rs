//! Pending vector fragment buffer.
//!
//! The scheduling policy decides which fragment runs next after a
//! divergence. All policies merge a freshly inserted fragment into a
//! buffered one at the same pc, so two cohorts that reconverge are
//! rejoined instead of being scheduled separately.

use std::collections::VecDeque;

use log::debug;
use maven_core::config::PvfbPolicy;
use maven_core::types::Addr;

use crate::frag::VectorFragment;

/// Buffer of fragments waiting to execute.
///
/// `insert_frags` takes the pc of the branch that caused the split; only
/// the dual-stack policy looks at it. Dead fragments (empty mask) are
/// dropped silently on insert, which is the normal lane-retirement path.
pub trait Pvfb {
    fn insert_frags(&mut self, branch_pc: Addr, frag0: VectorFragment, frag1: VectorFragment);
    fn pop(&mut self) -> Option<VectorFragment>;
    fn is_empty(&self) -> bool;
    /// Buffered fragment already waiting at the given pc, if any.
    fn member_pc(&mut self, pc: Addr) -> Option<&mut VectorFragment>;
    fn push_front(&mut self, frag: VectorFragment);
    fn push_end(&mut self, frag: VectorFragment) {
        self.push_front(frag);
    }
    fn dump(&self);
}

pub fn make_pvfb(policy: PvfbPolicy) -> Box<dyn Pvfb> {
    match policy {
        PvfbPolicy::Queue => Box::new(PvfbQueue::new()),
        PvfbPolicy::Stack => Box::new(PvfbStack::new()),
        PvfbPolicy::DualStack => Box::new(PvfbDualStack::new()),
    }
}

/// Merges `frag` into a same-pc resident, or hands it back for insertion.
fn merge_or_keep(buf: &mut dyn Pvfb, frag: VectorFragment) -> Option<VectorFragment> {
    if frag.is_dead() {
        return None;
    }
    if let Some(existing) = buf.member_pc(frag.pc) {
        existing.mask |= frag.mask;
        existing.size = existing.mask.count_ones() as usize;
        return None;
    }
    Some(frag)
}

//------------------------------------------------------------------------
// FIFO
//------------------------------------------------------------------------

/// Round-robin policy: fragments run in split order.
pub struct PvfbQueue {
    fragments: VecDeque<VectorFragment>,
}

impl PvfbQueue {
    pub fn new() -> Self {
        Self {
            fragments: VecDeque::new(),
        }
    }
}

impl Default for PvfbQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Pvfb for PvfbQueue {
    fn insert_frags(&mut self, _branch_pc: Addr, frag0: VectorFragment, frag1: VectorFragment) {
        for frag in [frag0, frag1] {
            if let Some(frag) = merge_or_keep(self, frag) {
                self.fragments.push_back(frag);
            }
        }
    }

    fn pop(&mut self) -> Option<VectorFragment> {
        self.fragments.pop_front()
    }

    fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn member_pc(&mut self, pc: Addr) -> Option<&mut VectorFragment> {
        self.fragments.iter_mut().find(|f| f.pc == pc)
    }

    fn push_front(&mut self, frag: VectorFragment) {
        self.fragments.push_front(frag);
    }

    fn push_end(&mut self, frag: VectorFragment) {
        self.fragments.push_back(frag);
    }

    fn dump(&self) {
        for f in &self.fragments {
            debug!("pvfb queue pc={:#010x} mask={:#010x}", f.pc, f.mask);
        }
    }
}

//------------------------------------------------------------------------
// LIFO
//------------------------------------------------------------------------

/// Depth-first policy: the most recent split runs to completion first,
/// which drains loop bodies before their exits.
pub struct PvfbStack {
    fragments: Vec<VectorFragment>,
}

impl PvfbStack {
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }
}

impl Default for PvfbStack {
    fn default() -> Self {
        Self::new()
    }
}

impl Pvfb for PvfbStack {
    fn insert_frags(&mut self, _branch_pc: Addr, frag0: VectorFragment, frag1: VectorFragment) {
        for frag in [frag0, frag1] {
            if let Some(frag) = merge_or_keep(self, frag) {
                self.fragments.push(frag);
            }
        }
    }

    fn pop(&mut self) -> Option<VectorFragment> {
        self.fragments.pop()
    }

    fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn member_pc(&mut self, pc: Addr) -> Option<&mut VectorFragment> {
        self.fragments.iter_mut().find(|f| f.pc == pc)
    }

    fn push_front(&mut self, frag: VectorFragment) {
        self.fragments.push(frag);
    }

    fn dump(&self) {
        for f in &self.fragments {
            debug!("pvfb stack pc={:#010x} mask={:#010x}", f.pc, f.mask);
        }
    }
}

//------------------------------------------------------------------------
// Dual stack
//------------------------------------------------------------------------

/// Two stacks for loop structures. A fragment produced by a backward
/// branch goes to the inactive stack; the active stack drains completely
/// before the stacks swap. Fragments from the same loop iteration thus
/// finish before the next iteration starts, limiting re-divergence.
pub struct PvfbDualStack {
    stacks: [Vec<VectorFragment>; 2],
    current: usize,
}

impl PvfbDualStack {
    pub fn new() -> Self {
        Self {
            stacks: [Vec::new(), Vec::new()],
            current: 0,
        }
    }

    fn insert(&mut self, frag: VectorFragment, next_stack: bool) {
        let idx = if next_stack {
            1 - self.current
        } else {
            self.current
        };
        self.stacks[idx].push(frag);
    }
}

impl Default for PvfbDualStack {
    fn default() -> Self {
        Self::new()
    }
}

impl Pvfb for PvfbDualStack {
    fn insert_frags(&mut self, branch_pc: Addr, frag0: VectorFragment, frag1: VectorFragment) {
        for frag in [frag0, frag1] {
            if let Some(frag) = merge_or_keep(self, frag) {
                // Backward target means the fragment starts the next trip
                // around a loop.
                let backward = frag.pc <= branch_pc;
                self.insert(frag, backward);
            }
        }
    }

    fn pop(&mut self) -> Option<VectorFragment> {
        if self.stacks[self.current].is_empty() {
            self.current = 1 - self.current;
        }
        self.stacks[self.current].pop()
    }

    fn is_empty(&self) -> bool {
        self.stacks[0].is_empty() && self.stacks[1].is_empty()
    }

    fn member_pc(&mut self, pc: Addr) -> Option<&mut VectorFragment> {
        self.stacks
            .iter_mut()
            .flat_map(|s| s.iter_mut())
            .find(|f| f.pc == pc)
    }

    fn push_front(&mut self, frag: VectorFragment) {
        self.stacks[self.current].push(frag);
    }

    fn dump(&self) {
        for (i, stack) in self.stacks.iter().enumerate() {
            for f in stack {
                debug!(
                    "pvfb stack[{}]{} pc={:#010x} mask={:#010x}",
                    i,
                    if i == self.current { "*" } else { "" },
                    f.pc,
                    f.mask
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(pc: Addr, mask: u32) -> VectorFragment {
        VectorFragment::new(pc, mask)
    }

    #[test]
    fn queue_pops_in_insert_order() {
        let mut q = PvfbQueue::new();
        q.insert_frags(0, frag(0x10, 0x1), frag(0x20, 0x2));
        assert_eq!(q.pop().map(|f| f.pc), Some(0x10));
        assert_eq!(q.pop().map(|f| f.pc), Some(0x20));
        assert!(q.is_empty());
    }

    #[test]
    fn stack_pops_most_recent_first() {
        let mut s = PvfbStack::new();
        s.insert_frags(0, frag(0x10, 0x1), frag(0x20, 0x2));
        assert_eq!(s.pop().map(|f| f.pc), Some(0x20));
        assert_eq!(s.pop().map(|f| f.pc), Some(0x10));
    }

    #[test]
    fn dead_fragments_are_dropped() {
        let mut s = PvfbStack::new();
        s.insert_frags(0, frag(0x10, 0x3), frag(0x20, 0));
        assert_eq!(s.pop().map(|f| f.pc), Some(0x10));
        assert!(s.is_empty());
    }

    #[test]
    fn same_pc_fragments_merge_masks() {
        let mut q = PvfbQueue::new();
        q.insert_frags(0, frag(0x10, 0x3), frag(0x20, 0x4));
        q.insert_frags(0, frag(0x10, 0x8), frag(0x30, 0x10));
        let merged = q.pop().map(|f| (f.pc, f.mask, f.size));
        assert_eq!(merged, Some((0x10, 0xb, 3)));
        assert_eq!(q.pop().map(|f| f.pc), Some(0x20));
        assert_eq!(q.pop().map(|f| f.pc), Some(0x30));
        assert!(q.is_empty());
    }

    #[test]
    fn dual_stack_routes_backward_targets_to_next_stack() {
        let mut d = PvfbDualStack::new();
        // Branch at 0x40: forward target 0x50 stays current, backward
        // target 0x10 waits on the other stack.
        d.insert_frags(0x40, frag(0x50, 0x1), frag(0x10, 0x2));
        d.insert_frags(0x40, frag(0x44, 0x4), frag(0x10, 0x8));
        assert_eq!(d.pop().map(|f| f.pc), Some(0x44));
        assert_eq!(d.pop().map(|f| f.pc), Some(0x50));
        // Current stack drained, the loop-back fragment (masks merged)
        // comes out last.
        assert_eq!(d.pop().map(|f| (f.pc, f.mask)), Some((0x10, 0xa)));
        assert!(d.is_empty());
    }

    #[test]
    fn policy_factory_matches_config() {
        assert!(make_pvfb(PvfbPolicy::Queue).is_empty());
        assert!(make_pvfb(PvfbPolicy::DualStack).is_empty());
    }
}
