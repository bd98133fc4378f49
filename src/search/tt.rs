use crate::search::movegen::Ply;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

/// What an entry may be used for. `ScoreOnly` entries live under the
/// symmetry-canonical key: their score is valid for every mirrored position
/// but a stored move index would not be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Full { best: Option<Ply> },
    ScoreOnly,
}

#[derive(Clone, Copy, Debug)]
pub struct Entry {
    pub key: u64,
    pub depth: u32,
    pub score: f64,
    pub bound: Bound,
    pub kind: EntryKind,
    pub gen: u32,
}

impl Entry {
    pub fn best(&self) -> Option<Ply> {
        match self.kind {
            EntryKind::Full { best } => best,
            EntryKind::ScoreOnly => None,
        }
    }
}

const DEFAULT_WAYS: usize = 4;
pub const DEFAULT_CAPACITY: usize = 1 << 16;

#[derive(Default, Clone, Copy)]
struct Slot(Option<Entry>);

#[derive(Default, Clone)]
struct Bucket {
    slots: [Slot; DEFAULT_WAYS],
}

/// Set-associative table owned by a single search; no locking.
#[derive(Default)]
pub struct Tt {
    buckets: Vec<Bucket>,
    gen: u32,
}

impl Tt {
    pub fn new() -> Self {
        let mut t = Self { buckets: Vec::new(), gen: 0 };
        t.set_capacity_entries(DEFAULT_CAPACITY);
        t
    }

    pub fn clear(&mut self) {
        for b in &mut self.buckets {
            *b = Bucket::default();
        }
    }

    fn bucket_index(&self, key: u64) -> usize {
        let mixed = key ^ (key >> 32);
        (mixed as usize) % self.buckets.len().max(1)
    }

    pub fn get(&self, key: u64) -> Option<Entry> {
        if self.buckets.is_empty() { return None; }
        let b = &self.buckets[self.bucket_index(key)];
        b.slots.iter().filter_map(|s| s.0).find(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().flat_map(|b| b.slots.iter()).filter(|s| s.0.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_capacity_entries(&mut self, cap: usize) {
        let entries = cap.max(DEFAULT_WAYS);
        let buckets = (entries + DEFAULT_WAYS - 1) / DEFAULT_WAYS;
        self.buckets.clear();
        self.buckets.resize_with(buckets, Bucket::default);
    }

    /// Stores `e`. An existing entry for the same key is only replaced by one
    /// of equal or greater depth.
    pub fn put(&mut self, mut e: Entry) {
        if self.buckets.is_empty() { return; }
        e.gen = self.gen;
        let idx = self.bucket_index(e.key);
        let bucket = &mut self.buckets[idx];
        for slot in &mut bucket.slots {
            if let Some(cur) = slot.0 {
                if cur.key == e.key {
                    if e.depth >= cur.depth { slot.0 = Some(e); }
                    return;
                }
            }
        }
        if let Some(slot) = bucket.slots.iter_mut().find(|s| s.0.is_none()) {
            slot.0 = Some(e);
            return;
        }
        // Evict lowest depth, then oldest generation
        let mut victim = 0usize;
        let mut best_key = (u32::MAX, u32::MAX);
        for (i, slot) in bucket.slots.iter().enumerate() {
            if let Some(cur) = slot.0 {
                let key = (cur.depth, cur.gen);
                if key < best_key { best_key = key; victim = i; }
            }
        }
        bucket.slots[victim].0 = Some(e);
    }

    pub fn bump_generation(&mut self) { self.gen = self.gen.wrapping_add(1); }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: u64, depth: u32, score: f64) -> Entry {
        Entry { key, depth, score, bound: Bound::Exact, kind: EntryKind::ScoreOnly, gen: 0 }
    }

    #[test]
    fn shallower_store_does_not_replace() {
        let mut tt = Tt::new();
        tt.put(entry(42, 3, 1.0));
        tt.put(entry(42, 1, 9.0));
        let e = tt.get(42).unwrap();
        assert_eq!(e.depth, 3);
        assert_eq!(e.score, 1.0);
        tt.put(entry(42, 3, 2.0));
        assert_eq!(tt.get(42).unwrap().score, 2.0);
    }

    #[test]
    fn full_bucket_evicts_shallowest() {
        let mut tt = Tt::new();
        tt.set_capacity_entries(DEFAULT_WAYS);
        for k in 0..DEFAULT_WAYS as u64 {
            tt.put(entry(k, 5 + k as u32, 0.0));
        }
        tt.put(entry(99, 7, 0.0));
        assert!(tt.get(0).is_none(), "depth-5 entry should have been evicted");
        assert!(tt.get(99).is_some());
        assert_eq!(tt.len(), DEFAULT_WAYS);
    }
}
