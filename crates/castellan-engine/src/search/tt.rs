//! Transposition table: a fixed-capacity cache from position hash to prior
//! search result.
//!
//! Plain indexed slots with depth-preferred replacement. The table is
//! private to one engine instance and accessed from one thread at a time;
//! sharing it across threads would need external synchronization.

use castellan_core::Move;

/// How a stored score bounds the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// The score is exact (a PV node).
    Exact,
    /// The score is a lower bound (fail high).
    Lower,
    /// The score is an upper bound (fail low).
    Upper,
}

/// One cached search result.
#[derive(Debug, Clone, Copy)]
pub struct TtEntry {
    /// Full position hash, compared on retrieve to reject slot collisions.
    pub key: u64,
    /// Depth the entry was searched to.
    pub depth: u8,
    /// Score from the stored search.
    pub score: i32,
    /// How `score` bounds the true value.
    pub bound: BoundKind,
    /// Best move found, kept as an ordering hint even on shallow hits.
    pub best_move: Move,
}

/// Fixed-capacity transposition table addressed by `hash mod capacity`.
pub struct TranspositionTable {
    slots: Vec<Option<TtEntry>>,
}

/// Approximate slot footprint, for sizing the table from megabytes.
const SLOT_BYTES: usize = std::mem::size_of::<Option<TtEntry>>();

impl TranspositionTable {
    /// A table with exactly `capacity` slots (at least one).
    pub fn with_capacity(capacity: usize) -> TranspositionTable {
        TranspositionTable {
            slots: vec![None; capacity.max(1)],
        }
    }

    /// A table sized to roughly `megabytes` of memory.
    pub fn new(megabytes: usize) -> TranspositionTable {
        let bytes = megabytes.max(1) * 1024 * 1024;
        TranspositionTable::with_capacity(bytes / SLOT_BYTES)
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key % self.slots.len() as u64) as usize
    }

    /// Store a result, keeping deeper existing entries.
    ///
    /// The slot is overwritten only when empty or holding a result searched
    /// no deeper than this one.
    pub fn save(&mut self, key: u64, depth: u8, score: i32, bound: BoundKind, best_move: Move) {
        let index = self.index(key);
        match self.slots[index] {
            Some(existing) if existing.depth > depth => {}
            _ => {
                self.slots[index] = Some(TtEntry {
                    key,
                    depth,
                    score,
                    bound,
                    best_move,
                });
            }
        }
    }

    /// Look up a position. Returns `None` on a miss or when the slot holds a
    /// different position (hash collision into the same slot).
    pub fn retrieve(&self, key: u64) -> Option<TtEntry> {
        let entry = self.slots[self.index(key)]?;
        if entry.key == key { Some(entry) } else { None }
    }

    /// Invalidate every slot. O(capacity).
    pub fn clear(&mut self) {
        self.slots.fill(None);
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("capacity", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use castellan_core::{Move, Square};

    use super::{BoundKind, TranspositionTable};

    fn any_move() -> Move {
        Move::new(Square::E2, Square::E4)
    }

    #[test]
    fn save_then_retrieve_roundtrip() {
        let mut tt = TranspositionTable::with_capacity(1024);
        tt.save(0xDEAD_BEEF, 5, 42, BoundKind::Exact, any_move());

        let entry = tt.retrieve(0xDEAD_BEEF).expect("entry should be present");
        assert!(entry.depth >= 5);
        assert_eq!(entry.score, 42);
        assert_eq!(entry.bound, BoundKind::Exact);
        assert_eq!(entry.best_move, any_move());
    }

    #[test]
    fn miss_returns_none() {
        let tt = TranspositionTable::with_capacity(1024);
        assert!(tt.retrieve(0x1234).is_none());
    }

    #[test]
    fn colliding_key_is_a_miss() {
        let mut tt = TranspositionTable::with_capacity(1024);
        let key = 0x10_0000;
        tt.save(key, 5, 42, BoundKind::Exact, any_move());

        // Same slot (capacity divides the difference), different position.
        let colliding = key + 1024;
        assert!(tt.retrieve(colliding).is_none());
    }

    #[test]
    fn shallower_save_never_evicts_deeper_entry() {
        let mut tt = TranspositionTable::with_capacity(1024);
        let key = 7u64;
        tt.save(key, 9, 100, BoundKind::Exact, any_move());
        tt.save(key + 1024, 3, -50, BoundKind::Lower, Move::NULL);

        let entry = tt.retrieve(key).expect("deep entry survives");
        assert_eq!(entry.depth, 9);
        assert_eq!(entry.score, 100);
    }

    #[test]
    fn equal_depth_overwrites() {
        let mut tt = TranspositionTable::with_capacity(1024);
        let key = 7u64;
        tt.save(key, 5, 100, BoundKind::Upper, Move::NULL);
        tt.save(key, 5, 120, BoundKind::Exact, any_move());

        let entry = tt.retrieve(key).unwrap();
        assert_eq!(entry.score, 120);
        assert_eq!(entry.bound, BoundKind::Exact);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut tt = TranspositionTable::with_capacity(64);
        for key in 0..64u64 {
            tt.save(key, 1, key as i32, BoundKind::Exact, any_move());
        }
        tt.clear();
        for key in 0..64u64 {
            assert!(tt.retrieve(key).is_none());
        }
    }

    #[test]
    fn capacity_is_never_zero() {
        let tt = TranspositionTable::with_capacity(0);
        assert_eq!(tt.capacity(), 1);
    }
}
