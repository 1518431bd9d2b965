//! Binary min-heap with keyed decrease-priority.
//!
//! Keys are tile indices. An auxiliary key -> slot map keeps
//! `decrease_priority` logarithmic. Equal priorities pop in insertion
//! order.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct Entry {
    key: usize,
    priority: f64,
    seq: u64,
}

impl Entry {
    fn before(&self, other: &Entry) -> bool {
        match self.priority.total_cmp(&other.priority) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => self.seq < other.seq,
        }
    }
}

/// Min-heap over `(key, priority)` pairs with stable ties.
#[derive(Debug, Default)]
pub struct IndexedMinHeap {
    entries: Vec<Entry>,
    slot_of: HashMap<usize, usize>,
    next_seq: u64,
}

impl IndexedMinHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: usize) -> bool {
        self.slot_of.contains_key(&key)
    }

    /// Insert a key. A no-op when the key is already queued.
    pub fn push(&mut self, key: usize, priority: f64) {
        if self.contains(key) {
            return;
        }
        let entry = Entry { key, priority, seq: self.next_seq };
        self.next_seq += 1;
        self.entries.push(entry);
        self.slot_of.insert(key, self.entries.len() - 1);
        self.sift_up(self.entries.len() - 1);
    }

    /// Remove and return the smallest-priority key.
    pub fn pop(&mut self) -> Option<(usize, f64)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let top = self.entries.pop().expect("non-empty checked above");
        self.slot_of.remove(&top.key);
        if !self.entries.is_empty() {
            self.slot_of.insert(self.entries[0].key, 0);
            self.sift_down(0);
        }
        Some((top.key, top.priority))
    }

    /// Lower a key's priority, or insert it when absent. Raising a
    /// priority is a no-op.
    pub fn decrease_priority(&mut self, key: usize, priority: f64) {
        let Some(&slot) = self.slot_of.get(&key) else {
            self.push(key, priority);
            return;
        };
        if priority < self.entries[slot].priority {
            self.entries[slot].priority = priority;
            self.sift_up(slot);
        }
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.entries[slot].before(&self.entries[parent]) {
                self.swap_slots(slot, parent);
                slot = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        loop {
            let mut smallest = slot;
            for child in [2 * slot + 1, 2 * slot + 2] {
                if child < self.entries.len() && self.entries[child].before(&self.entries[smallest])
                {
                    smallest = child;
                }
            }
            if smallest == slot {
                break;
            }
            self.swap_slots(slot, smallest);
            slot = smallest;
        }
    }

    fn swap_slots(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.slot_of.insert(self.entries[a].key, a);
        self.slot_of.insert(self.entries[b].key, b);
    }
}
