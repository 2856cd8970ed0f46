//! Recency List Module
//!
//! Owns every stored record in an arena and keeps them in least- to
//! most-recently-used order through an intrusive doubly-linked list of
//! handles. The indices refer to records by handle only.

use crate::cache::record::StoredRecord;

// == Handle ==
/// Stable address of a record in the arena. Valid until the record is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Handle(usize);

#[derive(Debug)]
struct Node {
    record: StoredRecord,
    prev: Option<Handle>,
    next: Option<Handle>,
}

// == Recency List ==
/// Records ordered from least recently used (head) to most recently used (tail).
///
/// Slots freed by removals are reused by later pushes.
#[derive(Debug, Default)]
pub(crate) struct RecencyList {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl RecencyList {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Push Back ==
    /// Stores a record as the most recently used one.
    pub fn push_back(&mut self, record: StoredRecord) -> Handle {
        let node = Node {
            record,
            prev: self.tail,
            next: None,
        };
        let handle = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                Handle(slot)
            }
            None => {
                self.slots.push(Some(node));
                Handle(self.slots.len() - 1)
            }
        };

        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        self.len += 1;
        handle
    }

    pub fn get(&self, handle: Handle) -> Option<&StoredRecord> {
        self.slots
            .get(handle.0)
            .and_then(Option::as_ref)
            .map(|node| &node.record)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut StoredRecord> {
        self.slots
            .get_mut(handle.0)
            .and_then(Option::as_mut)
            .map(|node| &mut node.record)
    }

    // == Move To Back ==
    /// Marks a record as the most recently used one.
    pub fn move_to_back(&mut self, handle: Handle) {
        if self.tail == Some(handle) || !self.contains(handle) {
            return;
        }
        self.unlink(handle);

        let old_tail = self.tail;
        let node = self.node_mut(handle);
        node.prev = old_tail;
        node.next = None;
        match old_tail {
            Some(tail) => self.node_mut(tail).next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
    }

    // == Remove ==
    /// Removes a record and frees its slot.
    pub fn remove(&mut self, handle: Handle) -> Option<StoredRecord> {
        if !self.contains(handle) {
            return None;
        }
        self.unlink(handle);
        let node = self.slots[handle.0].take()?;
        self.free.push(handle.0);
        self.len -= 1;
        Some(node.record)
    }

    // == Front ==
    /// Least recently used record, the eviction candidate.
    #[cfg(test)]
    pub fn front(&self) -> Option<Handle> {
        self.head
    }

    // == Pop Front ==
    pub fn pop_front(&mut self) -> Option<StoredRecord> {
        let head = self.head?;
        self.remove(head)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Records from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = &StoredRecord> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.slots.get(cursor?.0)?.as_ref()?;
            cursor = node.next;
            Some(&node.record)
        })
    }

    fn contains(&self, handle: Handle) -> bool {
        matches!(self.slots.get(handle.0), Some(Some(_)))
    }

    /// Detaches a node from its neighbours, leaving its own links stale.
    fn unlink(&mut self, handle: Handle) {
        let (prev, next) = {
            let node = self.node_mut(handle);
            (node.prev, node.next)
        };
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }

    /// Callers only pass handles of occupied slots.
    fn node_mut(&mut self, handle: Handle) -> &mut Node {
        match self.slots.get_mut(handle.0) {
            Some(Some(node)) => node,
            _ => unreachable!("recency list handle {} points to an empty slot", handle.0),
        }
    }
}
