//! Move generation.
//!
//! Two interchangeable strategies produce pseudo-legal moves: [`ScanGenerator`]
//! walks the 64 cells with fixed deltas and rays, [`TableGenerator`] reads
//! precomputed leaper tables and magic slider lookups. Legality is always the
//! same filter, [`Board::is_legal_move`], applied by the default trait methods.
//! Neither strategy orders its output; callers impose their own ordering.

mod scan;
mod table;

pub use scan::ScanGenerator;
pub use table::TableGenerator;

use crate::board::{Board, Color, PieceKind, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
use crate::moves::{
    new_move, Move, FLAG_CAPTURE, FLAG_CASTLE_KING, FLAG_CASTLE_QUEEN, FLAG_NONE, FLAG_PROMOTION,
};
use crate::utils::{rank_of, square_bb};

pub trait MoveGenerator {
    /// Every pseudo-legal move for the side to move, appended to `out`
    fn pseudo_moves(&self, board: &Board, out: &mut Vec<Move>);

    /// Captures, en-passant and capture-promotions only
    fn pseudo_captures(&self, board: &Board, out: &mut Vec<Move>);

    fn legal_moves(&self, board: &mut Board) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.pseudo_moves(board, &mut moves);
        moves.retain(|&mv| board.is_legal_move(mv));
        moves
    }

    fn legal_captures(&self, board: &mut Board) -> Vec<Move> {
        let mut moves = Vec::with_capacity(16);
        self.pseudo_captures(board, &mut moves);
        moves.retain(|&mv| board.is_legal_move(mv));
        moves
    }
}

/// Which generator backs a caller-selected strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    Scan,
    #[default]
    Table,
}

impl MoveGenerator for Strategy {
    fn pseudo_moves(&self, board: &Board, out: &mut Vec<Move>) {
        match self {
            Strategy::Scan => ScanGenerator.pseudo_moves(board, out),
            Strategy::Table => TableGenerator.pseudo_moves(board, out),
        }
    }

    fn pseudo_captures(&self, board: &Board, out: &mut Vec<Move>) {
        match self {
            Strategy::Scan => ScanGenerator.pseudo_captures(board, out),
            Strategy::Table => TableGenerator.pseudo_captures(board, out),
        }
    }
}

#[inline]
fn last_rank(color: Color) -> usize {
    match color {
        Color::White => 7,
        Color::Black => 0,
    }
}

/// Push a pawn move, expanding it into one move per promotion piece on the last rank
fn push_pawn_move(
    from: usize,
    to: usize,
    us: Color,
    captured: Option<PieceKind>,
    out: &mut Vec<Move>,
) {
    let capture_flag = if captured.is_some() { FLAG_CAPTURE } else { FLAG_NONE };
    if rank_of(to) == last_rank(us) {
        for promo in PieceKind::PROMOTIONS {
            out.push(new_move(
                from,
                to,
                PieceKind::Pawn,
                captured,
                Some(promo),
                FLAG_PROMOTION | capture_flag,
            ));
        }
    } else {
        out.push(new_move(from, to, PieceKind::Pawn, captured, None, capture_flag));
    }
}

struct CastleRule {
    right: u8,
    king_from: usize,
    king_to: usize,
    rook_from: usize,
    flag: u32,
    /// Cells between king and rook
    empty: &'static [usize],
    /// Cells the king crosses, excluding its origin
    safe: &'static [usize],
}

const CASTLE_RULES: [[CastleRule; 2]; 2] = [
    [
        CastleRule {
            right: CASTLE_WK,
            king_from: 4,
            king_to: 6,
            rook_from: 7,
            flag: FLAG_CASTLE_KING,
            empty: &[5, 6],
            safe: &[5, 6],
        },
        CastleRule {
            right: CASTLE_WQ,
            king_from: 4,
            king_to: 2,
            rook_from: 0,
            flag: FLAG_CASTLE_QUEEN,
            empty: &[1, 2, 3],
            safe: &[3, 2],
        },
    ],
    [
        CastleRule {
            right: CASTLE_BK,
            king_from: 60,
            king_to: 62,
            rook_from: 63,
            flag: FLAG_CASTLE_KING,
            empty: &[61, 62],
            safe: &[61, 62],
        },
        CastleRule {
            right: CASTLE_BQ,
            king_from: 60,
            king_to: 58,
            rook_from: 56,
            flag: FLAG_CASTLE_QUEEN,
            empty: &[57, 58, 59],
            safe: &[59, 58],
        },
    ],
];

/// Castling moves for the side to move; shared by both strategies
fn generate_castling(board: &Board, out: &mut Vec<Move>) {
    let us = board.side();
    let rules = &CASTLE_RULES[us as usize];
    if board.castling() & (rules[0].right | rules[1].right) == 0 {
        return;
    }
    let king_home = rules[0].king_from;
    if board.piece_bb(PieceKind::King, us) & square_bb(king_home) == 0 {
        return;
    }
    if board.is_square_attacked(king_home, !us) {
        return;
    }

    let occ = board.occupancy();
    let rooks = board.piece_bb(PieceKind::Rook, us);
    for rule in rules {
        if board.castling() & rule.right == 0 || rooks & square_bb(rule.rook_from) == 0 {
            continue;
        }
        if rule.empty.iter().any(|&sq| occ & square_bb(sq) != 0) {
            continue;
        }
        if rule.safe.iter().any(|&sq| board.is_square_attacked(sq, !us)) {
            continue;
        }
        out.push(new_move(
            rule.king_from,
            rule.king_to,
            PieceKind::King,
            None,
            None,
            rule.flag,
        ));
    }
}
