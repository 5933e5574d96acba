//! Hierarchical opcode dispatch.
//!
//! One table indexes a (shift, mask) slice of the instruction word. A slot
//! is either a leaf handler pair or a delegation to a sub-table, never
//! both. Every slot of a fresh table starts out as the illegal-instruction
//! leaf, so resolution always terminates with a handler.

use crate::insn::InstructionWord;

/// Architectural effect of one instruction.
pub type ExecFn<S> = fn(InstructionWord, &mut S);

/// Renders a text mnemonic for one instruction.
pub type DisasmFn = fn(InstructionWord) -> String;

/// A leaf handler pair.
pub struct Entry<S> {
    pub execute: ExecFn<S>,
    pub disassemble: DisasmFn,
}

impl<S> Clone for Entry<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Entry<S> {}

enum Slot<S> {
    Leaf(Entry<S>),
    Sub(Box<DispatchTable<S>>),
}

pub struct DispatchTable<S> {
    shift: u32,
    mask: u32,
    slots: Vec<Slot<S>>,
}

impl<S> DispatchTable<S> {
    /// Creates a table with every slot holding the given fallback leaf.
    pub fn new(shift: u32, mask: u32, fallback: Entry<S>) -> Self {
        let slots = (0..=mask).map(|_| Slot::Leaf(fallback)).collect();
        Self { shift, mask, slots }
    }

    fn index(&self, word: InstructionWord) -> usize {
        ((word.bits() >> self.shift) & self.mask) as usize
    }

    /// Installs a leaf handler pair.
    pub fn register(&mut self, index: u32, entry: Entry<S>) {
        debug_assert!(index <= self.mask);
        self.slots[index as usize] = Slot::Leaf(entry);
    }

    /// Installs a delegation to a sub-table.
    pub fn register_subtable(&mut self, index: u32, table: DispatchTable<S>) {
        debug_assert!(index <= self.mask);
        self.slots[index as usize] = Slot::Sub(Box::new(table));
    }

    /// Walks sub-tables until a leaf resolves.
    pub fn resolve(&self, word: InstructionWord) -> &Entry<S> {
        let mut table = self;
        loop {
            match &table.slots[table.index(word)] {
                Slot::Leaf(entry) => return entry,
                Slot::Sub(sub) => table = sub,
            }
        }
    }

    pub fn execute(&self, word: InstructionWord, state: &mut S) {
        (self.resolve(word).execute)(word, state);
    }

    pub fn disassemble(&self, word: InstructionWord) -> String {
        (self.resolve(word).disassemble)(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        hits: Vec<&'static str>,
    }

    fn fallback_exec(_w: InstructionWord, s: &mut Probe) {
        s.hits.push("illegal");
    }

    fn fallback_dis(_w: InstructionWord) -> String {
        "illegal".to_string()
    }

    fn leaf_exec(_w: InstructionWord, s: &mut Probe) {
        s.hits.push("leaf");
    }

    fn leaf_dis(_w: InstructionWord) -> String {
        "leaf".to_string()
    }

    fn sub_exec(_w: InstructionWord, s: &mut Probe) {
        s.hits.push("sub");
    }

    fn sub_dis(_w: InstructionWord) -> String {
        "sub".to_string()
    }

    fn fallback() -> Entry<Probe> {
        Entry {
            execute: fallback_exec,
            disassemble: fallback_dis,
        }
    }

    #[test]
    fn unregistered_slot_falls_back() {
        let table: DispatchTable<Probe> = DispatchTable::new(26, 0x3f, fallback());
        let mut probe = Probe::default();
        table.execute(InstructionWord::new(0xffff_ffff), &mut probe);
        assert_eq!(probe.hits, vec!["illegal"]);
        assert_eq!(table.disassemble(InstructionWord::new(0)), "illegal");
    }

    #[test]
    fn leaf_dispatch_hits_exactly_one_handler() {
        let mut table = DispatchTable::new(26, 0x3f, fallback());
        table.register(
            0x08,
            Entry {
                execute: leaf_exec,
                disassemble: leaf_dis,
            },
        );
        let w = InstructionWord::new(0x08 << 26);
        let mut probe = Probe::default();
        table.execute(w, &mut probe);
        table.execute(w, &mut probe);
        assert_eq!(probe.hits, vec!["leaf", "leaf"]);
    }

    #[test]
    fn subtable_delegation_resolves_on_inner_field() {
        let mut inner = DispatchTable::new(0, 0x3f, fallback());
        inner.register(
            0x21,
            Entry {
                execute: sub_exec,
                disassemble: sub_dis,
            },
        );
        let mut table = DispatchTable::new(26, 0x3f, fallback());
        table.register_subtable(0x00, inner);

        let mut probe = Probe::default();
        // opcode 0, func 0x21 resolves through the sub-table.
        table.execute(InstructionWord::new(0x21), &mut probe);
        // opcode 0, func 0x3f falls back inside the sub-table.
        table.execute(InstructionWord::new(0x3f), &mut probe);
        assert_eq!(probe.hits, vec!["sub", "illegal"]);
    }
}
