//! Transposition table: one slot per `hash & mask`, overwritten on every store

use super::search::{MATE_BOUND, MAX_PLY};
use crate::eval::Score;
use crate::moves::{Move, NULL_MOVE};

/// Node type for transposition table entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Exact,
    LowerBound,
    UpperBound,
}

/// Single TT entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u64,
    pub best_move: Move,
    pub score: Score,
    pub depth: i32,
    pub node_type: NodeType,
}

impl TTEntry {
    /// Score usable as a cutoff at `depth` within `[alpha, beta]`, if any
    pub fn cutoff(&self, depth: i32, alpha: Score, beta: Score, ply: usize) -> Option<Score> {
        if self.depth < depth {
            return None;
        }
        let score = score_from_tt(self.score, ply);
        match self.node_type {
            NodeType::Exact => Some(score),
            NodeType::LowerBound if score >= beta => Some(score),
            NodeType::UpperBound if score <= alpha => Some(score),
            _ => None,
        }
    }
}

/// Mate scores are stored relative to the node, not the root
#[inline]
pub fn score_to_tt(score: Score, ply: usize) -> Score {
    if score >= MATE_BOUND {
        score + ply as Score
    } else if score <= -MATE_BOUND {
        score - ply as Score
    } else {
        score
    }
}

#[inline]
pub fn score_from_tt(score: Score, ply: usize) -> Score {
    if score >= MATE_BOUND {
        score - ply as Score
    } else if score <= -MATE_BOUND {
        score + ply as Score
    } else {
        score
    }
}

const MIN_ENTRIES: usize = 1024;

pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    mask: u64,
}

impl TranspositionTable {
    /// Create a TT with approximately `size_mb` megabytes, rounded down to a power of two entries
    pub fn new(size_mb: usize) -> Self {
        let entry_size = std::mem::size_of::<Option<TTEntry>>();
        let wanted = (size_mb.saturating_mul(1024 * 1024) / entry_size).max(MIN_ENTRIES);
        // Largest power of two not above `wanted`
        let count = 1usize << (usize::BITS - 1 - wanted.leading_zeros());
        Self {
            entries: vec![None; count],
            mask: (count - 1) as u64,
        }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key & self.mask) as usize
    }

    /// Entry stored under exactly this key
    #[inline]
    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        self.entries[self.index(key)].filter(|e| e.key == key)
    }

    /// Best move remembered for this key, or the null move
    #[inline]
    pub fn best_move(&self, key: u64) -> Move {
        self.probe(key).map_or(NULL_MOVE, |e| e.best_move)
    }

    /// Unconditional overwrite; `score` is root-relative and converted here
    pub fn store(
        &mut self,
        key: u64,
        best_move: Move,
        score: Score,
        depth: i32,
        node_type: NodeType,
        ply: usize,
    ) {
        debug_assert!(ply < MAX_PLY);
        let idx = self.index(key);
        self.entries[idx] = Some(TTEntry {
            key,
            best_move,
            score: score_to_tt(score, ply),
            depth,
            node_type,
        });
    }

    /// Occupied slots per thousand, sampled over the first thousand slots
    pub fn hashfull(&self) -> u32 {
        let sample = self.entries.len().min(1000);
        let used = self.entries[..sample].iter().filter(|e| e.is_some()).count();
        (used * 1000 / sample) as u32
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::search::MATE;

    #[test]
    fn test_tt_basic_store_probe() {
        let mut tt = TranspositionTable::new(1);
        tt.store(0x1111, 0xAAAA, 42, 3, NodeType::Exact, 0);

        let entry = tt.probe(0x1111).expect("Entry should exist");
        assert_eq!(entry.score, 42);
        assert_eq!(entry.depth, 3);
        assert_eq!(entry.node_type, NodeType::Exact);
        assert_eq!(entry.best_move, 0xAAAA);
        assert!(tt.probe(0x9999).is_none());
    }

    #[test]
    fn size_is_power_of_two() {
        for mb in [0, 1, 3, 16] {
            let tt = TranspositionTable::new(mb);
            assert!(tt.size().is_power_of_two());
            assert!(tt.size() >= MIN_ENTRIES);
            assert!(mb == 0 || tt.size() * std::mem::size_of::<Option<TTEntry>>() <= mb << 20);
        }
    }

    #[test]
    fn colliding_key_overwrites_deeper_entry() {
        let mut tt = TranspositionTable::new(1);
        let other = 0x5678 + tt.size() as u64;
        tt.store(0x5678, 1, 100, 10, NodeType::Exact, 0);
        tt.store(other, 2, 200, 1, NodeType::UpperBound, 0);
        assert!(tt.probe(0x5678).is_none());
        assert_eq!(tt.probe(other).map(|e| e.depth), Some(1));
        assert_eq!(tt.best_move(0x5678), NULL_MOVE);
    }

    #[test]
    fn mate_scores_are_ply_adjusted() {
        let mut tt = TranspositionTable::new(1);
        // Mate in 3 plies from the root, found at ply 2
        tt.store(7, 0, MATE - 3, 4, NodeType::Exact, 2);
        assert_eq!(tt.probe(7).map(|e| e.score), Some(MATE - 1));
        // Reached again at ply 4: mate is now 5 plies from the root
        let entry = tt.probe(7).expect("stored");
        assert_eq!(entry.cutoff(4, -10, 10, 4), Some(MATE - 5));
        assert_eq!(entry.cutoff(5, -10, 10, 4), None);
    }

    #[test]
    fn bounds_only_cut_outside_window() {
        let lower = TTEntry {
            key: 1,
            best_move: 0,
            score: 50,
            depth: 3,
            node_type: NodeType::LowerBound,
        };
        assert_eq!(lower.cutoff(3, 0, 40, 0), Some(50));
        assert_eq!(lower.cutoff(3, 0, 60, 0), None);
        let upper = TTEntry {
            node_type: NodeType::UpperBound,
            ..lower
        };
        assert_eq!(upper.cutoff(2, 60, 100, 0), Some(50));
        assert_eq!(upper.cutoff(2, 40, 100, 0), None);
    }

    #[test]
    fn clear_empties_table() {
        let mut tt = TranspositionTable::new(1);
        for k in 0..500u64 {
            tt.store(k, 0, 0, 1, NodeType::Exact, 0);
        }
        assert_eq!(tt.hashfull(), 500);
        tt.clear();
        assert_eq!(tt.hashfull(), 0);
    }
}
