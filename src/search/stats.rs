//! Search statistics and the progress snapshot handed to callers
//!
//! `SearchStats` counts what happens inside one `think` call;
//! `SearchInfo` is the read-only view of the last completed iteration.

use crate::eval::Score;
use crate::moves::{move_to_uci, Move};
use std::time::{Duration, Instant};

/// Search statistics
#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    /// Total nodes searched, quiescence included
    pub nodes: u64,

    /// Quiescence nodes searched
    pub qsearch_nodes: u64,

    /// Transposition table probes that found the key
    pub tt_hits: u64,

    /// Transposition table hits that ended the node
    pub tt_cutoffs: u64,

    /// Beta cutoffs
    pub cutoffs: u64,

    /// Null-window probes that had to be searched again
    pub pvs_researches: u64,

    /// Search start time
    pub start_time: Option<Instant>,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset and start timing
    pub fn start(&mut self) {
        *self = Self {
            start_time: Some(Instant::now()),
            ..Self::default()
        };
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.map_or(Duration::ZERO, |t| t.elapsed())
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    pub fn nps(&self) -> u64 {
        let ms = self.elapsed_ms();
        if ms == 0 {
            0
        } else {
            self.nodes * 1000 / ms
        }
    }

    #[inline]
    pub fn inc_node(&mut self) {
        self.nodes += 1;
    }

    #[inline]
    pub fn inc_qsearch_node(&mut self) {
        self.qsearch_nodes += 1;
    }

    #[inline]
    pub fn inc_tt_hit(&mut self) {
        self.tt_hits += 1;
    }

    #[inline]
    pub fn inc_tt_cutoff(&mut self) {
        self.tt_cutoffs += 1;
    }

    #[inline]
    pub fn inc_cutoff(&mut self) {
        self.cutoffs += 1;
    }

    #[inline]
    pub fn inc_pvs_research(&mut self) {
        self.pvs_researches += 1;
    }

    /// Log a one-line summary at debug level
    pub fn log_summary(&self) {
        log::debug!(
            "search stats: nodes={} qnodes={} tt_hits={} tt_cutoffs={} cutoffs={} researches={} time={}ms nps={}",
            self.nodes,
            self.qsearch_nodes,
            self.tt_hits,
            self.tt_cutoffs,
            self.cutoffs,
            self.pvs_researches,
            self.elapsed_ms(),
            self.nps()
        );
    }
}

/// Snapshot of the deepest completed iteration
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: u8,
    pub seldepth: u8,
    pub score: Score,
    pub nodes: u64,
    pub time_ms: u64,
    pub nps: u64,
    /// Transposition table fill, per mille
    pub hashfull: u32,
    pub pv: Vec<Move>,
}

impl SearchInfo {
    pub fn best_move(&self) -> Option<Move> {
        self.pv.first().copied()
    }

    pub fn pv_string(&self) -> String {
        self.pv
            .iter()
            .map(|&m| move_to_uci(m))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PieceKind;
    use crate::moves::{new_move, FLAG_NONE};

    #[test]
    fn start_resets_counters() {
        let mut stats = SearchStats::new();
        stats.inc_node();
        stats.inc_cutoff();
        stats.start();
        assert_eq!(stats.nodes, 0);
        assert_eq!(stats.cutoffs, 0);
        assert!(stats.start_time.is_some());
    }

    #[test]
    fn pv_string_joins_moves() {
        let info = SearchInfo {
            pv: vec![
                new_move(12, 28, PieceKind::Pawn, None, None, FLAG_NONE),
                new_move(52, 36, PieceKind::Pawn, None, None, FLAG_NONE),
            ],
            ..SearchInfo::default()
        };
        assert_eq!(info.pv_string(), "e2e4 e7e5");
        assert_eq!(info.best_move(), info.pv.first().copied());
        assert_eq!(SearchInfo::default().best_move(), None);
    }
}
