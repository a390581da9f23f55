//! Main search engine implementation
//!
//! Iterative deepening over a principal-variation negamax with a capture-only
//! quiescence search at the leaves and a transposition table. Only completed
//! iterations are reported; an interrupted iteration is thrown away.

use super::params::{SearchParams, MAX_DEPTH};
use super::stats::{SearchInfo, SearchStats};
use super::tt::{NodeType, TranspositionTable};
use crate::board::Board;
use crate::eval::{piece_value, Evaluator, PsqtEvaluator, Score};
use crate::moves::{is_capture, move_captured, move_piece, move_to_uci, Move, NULL_MOVE};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const MATE: Score = 30000;
pub const INFINITE: Score = 32000;
pub const DRAW: Score = 0;

/// Hard ceiling on recursion, quiescence included
pub const MAX_PLY: usize = 128;

/// Scores at or beyond this magnitude are mates
pub const MATE_BOUND: Score = MATE - MAX_PLY as Score;

/// Nodes between two looks at the clock and node budget
const CHECK_INTERVAL: u64 = 2048;

/// Called once per completed iteration
pub type IterationCallback = Box<dyn FnMut(&SearchInfo) + Send>;

/// Main search engine
pub struct Search<E: Evaluator = PsqtEvaluator> {
    /// The current board position (mutable during search)
    board: Board,

    /// Transposition table for caching
    tt: TranspositionTable,

    params: SearchParams,
    evaluator: E,
    stats: SearchStats,

    /// Last completed iteration
    info: SearchInfo,

    /// Stop requests from outside the search
    stop_flag: Arc<AtomicBool>,

    /// Set once this `think` call must unwind
    stopped: bool,

    time_limit_ms: u64,
    infinite: bool,

    /// Triangular PV table, row `ply` holds the line from that ply
    pv_table: Vec<[Move; MAX_PLY]>,
    pv_len: [usize; MAX_PLY],
    seldepth: usize,

    on_iteration: Option<IterationCallback>,
}

impl Search<PsqtEvaluator> {
    /// Create new search engine
    ///
    /// # Arguments
    /// * `board` - initial board position
    /// * `tt_size_mb` - transposition table size in MB
    /// * `params` - search parameters
    pub fn new(board: Board, tt_size_mb: usize, params: SearchParams) -> Self {
        Self::with_evaluator(board, tt_size_mb, params, PsqtEvaluator)
    }

    /// Create search with reasonable defaults
    pub fn with_board(board: Board) -> Self {
        Self::new(board, 16, SearchParams::default())
    }
}

impl<E: Evaluator> Search<E> {
    pub fn with_evaluator(board: Board, tt_size_mb: usize, params: SearchParams, evaluator: E) -> Self {
        Self {
            board,
            tt: TranspositionTable::new(tt_size_mb),
            params,
            evaluator,
            stats: SearchStats::new(),
            info: SearchInfo::default(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            stopped: false,
            time_limit_ms: 0,
            infinite: false,
            pv_table: vec![[NULL_MOVE; MAX_PLY]; MAX_PLY],
            pv_len: [0; MAX_PLY],
            seldepth: 0,
            on_iteration: None,
        }
    }

    /// Set new board position
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn set_params(&mut self, params: SearchParams) {
        self.params = params;
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Deepest completed iteration of the last `think`
    pub fn info(&self) -> &SearchInfo {
        &self.info
    }

    /// Shared stop request. Setting it makes a running `think` unwind within
    /// a node; it is never cleared by the search itself.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    pub fn set_on_iteration(&mut self, callback: IterationCallback) {
        self.on_iteration = Some(callback);
    }

    pub fn clear_on_iteration(&mut self) {
        self.on_iteration = None;
    }

    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    pub fn resize_tt(&mut self, size_mb: usize) {
        self.tt = TranspositionTable::new(size_mb);
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Search with the budgets in `params`
    pub fn think_with_params(&mut self) -> Option<Move> {
        let (depth, ms, infinite) = (
            self.params.max_depth,
            self.params.time_limit_ms,
            self.params.infinite,
        );
        self.think(depth, ms, infinite)
    }

    /// Iterative deepening to `max_depth`, within `time_limit_ms` (0 = none)
    /// unless `infinite`. Returns the best move of the deepest completed
    /// iteration, or None if depth 1 never completed or there is no legal move.
    pub fn think(&mut self, max_depth: u8, time_limit_ms: u64, infinite: bool) -> Option<Move> {
        self.stats.start();
        self.stopped = false;
        self.info = SearchInfo::default();
        self.time_limit_ms = time_limit_ms;
        self.infinite = infinite;

        let max_depth = max_depth.clamp(1, MAX_DEPTH);
        let mut best_move = None;

        for depth in 1..=max_depth {
            self.seldepth = 0;
            let score = self.alpha_beta(depth as i32, -INFINITE, INFINITE, 0);
            if self.stopped {
                log::debug!("iteration {} interrupted, keeping depth {}", depth, self.info.depth);
                break;
            }

            let pv = self.pv_table[0][..self.pv_len[0]].to_vec();
            best_move = pv.first().copied();
            self.info = SearchInfo {
                depth,
                seldepth: self.seldepth.min(u8::MAX as usize) as u8,
                score,
                nodes: self.stats.nodes,
                time_ms: self.stats.elapsed_ms(),
                nps: self.stats.nps(),
                hashfull: self.tt.hashfull(),
                pv,
            };
            log::debug!(
                "depth {} score {} nodes {} pv {}",
                depth,
                score,
                self.info.nodes,
                self.info.pv_string()
            );
            if let Some(callback) = self.on_iteration.as_mut() {
                callback(&self.info);
            }

            if best_move.is_none() || self.budget_exhausted() {
                break;
            }
        }

        self.stats.log_summary();
        if let Some(mv) = best_move {
            log::info!(
                "best move {} at depth {} (score {})",
                move_to_uci(mv),
                self.info.depth,
                self.info.score
            );
        }
        best_move
    }

    /// One fixed-depth search from the root with an explicit window
    pub fn search_window(&mut self, depth: u8, alpha: Score, beta: Score) -> Score {
        self.stats.start();
        self.stopped = false;
        self.time_limit_ms = 0;
        self.infinite = false;
        self.seldepth = 0;
        self.alpha_beta(depth as i32, alpha, beta, 0)
    }

    fn budget_exhausted(&self) -> bool {
        if self.params.node_limit > 0 && self.stats.nodes >= self.params.node_limit {
            return true;
        }
        !self.infinite && self.time_limit_ms > 0 && self.stats.elapsed_ms() >= self.time_limit_ms
    }

    /// Count a node and decide whether to unwind
    #[inline]
    fn enter_node(&mut self, ply: usize) -> bool {
        self.stats.inc_node();
        self.pv_len[ply] = ply;
        if self.stopped {
            return true;
        }
        if self.stop_flag.load(Ordering::Relaxed) {
            self.stopped = true;
        } else if self.stats.nodes % CHECK_INTERVAL == 0 && self.budget_exhausted() {
            self.stopped = true;
        }
        if ply > self.seldepth {
            self.seldepth = ply;
        }
        self.stopped
    }

    fn alpha_beta(&mut self, depth: i32, mut alpha: Score, beta: Score, ply: usize) -> Score {
        if self.enter_node(ply) {
            return 0;
        }

        let root = ply == 0;
        if !root && self.board.is_draw() {
            return DRAW;
        }
        if ply >= MAX_PLY - 1 {
            return self.evaluator.evaluate(&self.board);
        }

        let key = self.board.hash();
        let entry = self.tt.probe(key);
        if let Some(entry) = entry {
            self.stats.inc_tt_hit();
            if !root {
                if let Some(score) = entry.cutoff(depth, alpha, beta, ply) {
                    self.stats.inc_tt_cutoff();
                    return score;
                }
            }
        }

        if depth <= 0 {
            return self.quiescence(alpha, beta, ply);
        }

        let mut moves = self.board.generate_moves();
        if moves.is_empty() {
            return if self.board.is_in_check(self.board.side()) {
                -MATE + ply as Score
            } else {
                DRAW
            };
        }
        order_moves(&mut moves, entry.map_or(NULL_MOVE, |e| e.best_move));

        let alpha_orig = alpha;
        let mut best_score = -INFINITE;
        let mut best_move = NULL_MOVE;

        for (i, &mv) in moves.iter().enumerate() {
            self.board.make_move(mv);
            let score = if i == 0 {
                -self.alpha_beta(depth - 1, -beta, -alpha, ply + 1)
            } else {
                let probe = -self.alpha_beta(depth - 1, -alpha - 1, -alpha, ply + 1);
                if probe > alpha && probe < beta && !self.stopped {
                    self.stats.inc_pvs_research();
                    -self.alpha_beta(depth - 1, -beta, -alpha, ply + 1)
                } else {
                    probe
                }
            };
            self.board.unmake_move(mv);

            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                if score > alpha {
                    alpha = score;
                    self.update_pv(ply, mv);
                    if score >= beta {
                        self.stats.inc_cutoff();
                        self.tt.store(key, mv, score, depth, NodeType::LowerBound, ply);
                        return score;
                    }
                }
            }
        }

        let node_type = if best_score > alpha_orig {
            NodeType::Exact
        } else {
            NodeType::UpperBound
        };
        self.tt.store(key, best_move, best_score, depth, node_type, ply);
        best_score
    }

    fn quiescence(&mut self, mut alpha: Score, beta: Score, ply: usize) -> Score {
        if self.enter_node(ply) {
            return 0;
        }
        self.stats.inc_qsearch_node();

        let stand_pat = self.evaluator.evaluate(&self.board);
        if ply >= MAX_PLY - 1 {
            return stand_pat;
        }
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut captures = self.board.generate_captures();
        captures.sort_by_key(|&mv| -mvv_lva(mv));

        for mv in captures {
            self.board.make_move(mv);
            let score = -self.quiescence(-beta, -alpha, ply + 1);
            self.board.unmake_move(mv);

            if self.stopped {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }
        alpha
    }

    fn update_pv(&mut self, ply: usize, mv: Move) {
        let child_len = self.pv_len[ply + 1].max(ply + 1);
        self.pv_table[ply][ply] = mv;
        for i in (ply + 1)..child_len {
            self.pv_table[ply][i] = self.pv_table[ply + 1][i];
        }
        self.pv_len[ply] = child_len;
    }
}

/// Most valuable victim, least valuable attacker
#[inline]
pub fn mvv_lva(mv: Move) -> Score {
    match move_captured(mv) {
        Some(victim) if is_capture(mv) => piece_value(victim) - piece_value(move_piece(mv)) / 10,
        _ => 0,
    }
}

/// TT move, then captures by MVV-LVA, then everything else in generator order
pub fn order_moves(moves: &mut [Move], tt_move: Move) {
    moves.sort_by_key(|&mv| {
        if mv == tt_move && mv != NULL_MOVE {
            (0, 0)
        } else if is_capture(mv) {
            (1, -mvv_lva(mv))
        } else {
            (2, 0)
        }
    });
}
