use std::cmp::Ordering;

/// The objects that we store in the priority queue
#[derive(Clone, Copy, Debug)]
struct Entry {
    index: usize,
    priority: f64,
    /// Stamped on insertion and on every priority change, breaks ties
    seq: u64,
}

impl Entry {
    fn cmp_key(&self, other: &Entry) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Indexed binary min-heap over cell indices.
///
/// Every cell is in the queue at most once. `positions` maps a cell index to
/// its slot in `heap`, which makes membership checks O(1) and lets a priority
/// change move the entry in place instead of re-sorting. Among equal
/// priorities the cell stamped first comes out first. A cell is stamped when it
/// is inserted and again when its priority changes, so an updated cell queues
/// behind everything already waiting at its new priority.
///
/// [`Frontier::update_all`] stamps a batch of updates in the order their old
/// keys had, which keeps the queue in the order a stable sort by priority
/// would give after every expansion.
#[derive(Clone, Debug, Default)]
pub struct Frontier {
    heap: Vec<Entry>,
    positions: Vec<Option<usize>>,
    next_seq: u64,
}

impl Frontier {
    /// Creates a queue that can hold the cell indices `0..cells`
    pub fn with_capacity(cells: usize) -> Self {
        Self {
            heap: Vec::new(),
            positions: vec![None; cells],
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        matches!(self.positions.get(index), Some(Some(_)))
    }

    pub fn priority_of(&self, index: usize) -> Option<f64> {
        self.slot(index).map(|slot| self.heap[slot].priority)
    }

    /// Inserts `index`, returns `false` (and changes nothing) if it is already queued
    pub fn push(&mut self, index: usize, priority: f64) -> bool {
        if self.contains(index) {
            return false;
        }
        if index >= self.positions.len() {
            self.positions.resize(index + 1, None);
        }

        let slot = self.heap.len();
        self.heap.push(Entry {
            index,
            priority,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        self.positions[index] = Some(slot);
        self.sift_up(slot);
        true
    }

    /// Changes the priority of a queued index, returns `false` if it is not queued.
    /// An unchanged priority keeps the entry's place among its ties.
    pub fn update(&mut self, index: usize, priority: f64) -> bool {
        let Some(slot) = self.slot(index) else {
            return false;
        };

        let entry = &mut self.heap[slot];
        let order = priority.total_cmp(&entry.priority);
        if order != Ordering::Equal {
            entry.priority = priority;
            entry.seq = self.next_seq;
            self.next_seq += 1;
        }
        match order {
            Ordering::Less => self.sift_up(slot),
            Ordering::Greater => self.sift_down(slot),
            Ordering::Equal => {}
        }
        true
    }

    /// Applies several updates, stamping them in the order of their current
    /// keys. Indices that are not queued are skipped.
    pub fn update_all(&mut self, updates: &mut [(usize, f64)]) {
        updates.sort_by(|a, b| match (self.slot(a.0), self.slot(b.0)) {
            (Some(x), Some(y)) => self.heap[x].cmp_key(&self.heap[y]),
            (x, y) => x.is_some().cmp(&y.is_some()),
        });
        for &(index, priority) in updates.iter() {
            self.update(index, priority);
        }
    }

    /// Removes the entry with the lowest priority
    pub fn pop(&mut self) -> Option<(usize, f64)> {
        if self.heap.is_empty() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.swap(0, last);
        let entry = self.heap.pop()?;
        self.positions[entry.index] = None;

        if !self.heap.is_empty() {
            self.sift_down(0);
        }

        Some((entry.index, entry.priority))
    }

    pub fn peek(&self) -> Option<usize> {
        self.heap.first().map(|e| e.index)
    }

    /// Queued indices in heap order (not sorted)
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.heap.iter().map(|e| e.index)
    }

    fn slot(&self, index: usize) -> Option<usize> {
        self.positions.get(index).copied().flatten()
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions[self.heap[a].index] = Some(a);
        self.positions[self.heap[b].index] = Some(b);
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.heap[slot].cmp_key(&self.heap[parent]) == Ordering::Less {
                self.swap(slot, parent);
                slot = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let n = self.heap.len();
        loop {
            let mut smallest = slot;
            let left = 2 * slot + 1;
            let right = 2 * slot + 2;

            if left < n && self.heap[left].cmp_key(&self.heap[smallest]) == Ordering::Less {
                smallest = left;
            }
            if right < n && self.heap[right].cmp_key(&self.heap[smallest]) == Ordering::Less {
                smallest = right;
            }

            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }
}
