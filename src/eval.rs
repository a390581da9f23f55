//! Modulo di valutazione - material plus piece-square tables
//!
//! The search only sees the [`Evaluator`] trait. [`PsqtEvaluator`] is the
//! default: material in centipawns plus a per-square bonus for each piece,
//! with a separate king table once the queens are gone.

use crate::board::{Board, Color, PieceKind};
use crate::utils::iter_bits;

/// Centipawn score, positive favours the side to move
pub type Score = i32;

/// Static evaluation called at search leaves.
///
/// Implementations must be pure functions of the position, from the point of
/// view of the side to move.
pub trait Evaluator: Send {
    fn evaluate(&self, board: &Board) -> Score;
}

// ============================================================================
// VALORI MATERIALI (in centipawn)
// ============================================================================
pub const PAWN_VALUE: Score = 100;
pub const KNIGHT_VALUE: Score = 320;
pub const BISHOP_VALUE: Score = 330;
pub const ROOK_VALUE: Score = 500;
pub const QUEEN_VALUE: Score = 900;
/// Only used for move ordering; kings are never captured
pub const KING_VALUE: Score = 10000;

#[inline]
pub fn piece_value(kind: PieceKind) -> Score {
    match kind {
        PieceKind::Pawn => PAWN_VALUE,
        PieceKind::Knight => KNIGHT_VALUE,
        PieceKind::Bishop => BISHOP_VALUE,
        PieceKind::Rook => ROOK_VALUE,
        PieceKind::Queen => QUEEN_VALUE,
        PieceKind::King => KING_VALUE,
    }
}

// ============================================================================
// PIECE-SQUARE TABLES (dal punto di vista del BIANCO)
// ============================================================================
// Indici: rank 0 = prima traversa (A1..H1), rank 7 = ottava traversa (A8..H8)
// Per il Nero, specchiamo verticalmente: flip_sq = sq XOR 56

/// PSQT per i pedoni: centre pawns forward, shelter in front of the castled king
const PAWN_PSQT: [Score; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, // Rank 1
    5, 10, 10, -20, -20, 10, 10, 5, // Rank 2
    5, -5, -10, 0, 0, -10, -5, 5, // Rank 3
    0, 0, 0, 20, 20, 0, 0, 0, // Rank 4
    5, 5, 10, 25, 25, 10, 5, 5, // Rank 5
    10, 10, 20, 30, 30, 20, 10, 10, // Rank 6
    50, 50, 50, 50, 50, 50, 50, 50, // Rank 7
    0, 0, 0, 0, 0, 0, 0, 0, // Rank 8
];

/// PSQT per i cavalieri: centre good, rim bad
const KNIGHT_PSQT: [Score; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50, -40, -20, 0, 5, 5, 0, -20, -40, -30, 5, 10, 15, 15, 10,
    5, -30, -30, 0, 15, 20, 20, 15, 0, -30, -30, 5, 15, 20, 20, 15, 5, -30, -30, 0, 10, 15, 15, 10,
    0, -30, -40, -20, 0, 0, 0, 0, -20, -40, -50, -40, -30, -30, -30, -30, -40, -50,
];

/// PSQT per gli alfieri
const BISHOP_PSQT: [Score; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20, -10, 5, 0, 0, 0, 0, 5, -10, -10, 10, 10, 10, 10, 10,
    10, -10, -10, 0, 10, 10, 10, 10, 0, -10, -10, 5, 5, 10, 10, 5, 5, -10, -10, 0, 5, 10, 10, 5, 0,
    -10, -10, 0, 0, 0, 0, 0, 0, -10, -20, -10, -10, -10, -10, -10, -10, -20,
];

/// PSQT per le torri
const ROOK_PSQT: [Score; 64] = [
    0, 0, 0, 5, 5, 0, 0, 0, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0, 0,
    0, -5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, 5, 10, 10, 10, 10, 10, 10,
    5, // Settima traversa
    0, 0, 0, 0, 0, 0, 0, 0,
];

/// PSQT per la regina
const QUEEN_PSQT: [Score; 64] = [
    -20, -10, -10, -5, -5, -10, -10, -20, -10, 0, 5, 0, 0, 0, 0, -10, -10, 5, 5, 5, 5, 5, 0, -10,
    0, 0, 5, 5, 5, 5, 0, -5, -5, 0, 5, 5, 5, 5, 0, -5, -10, 0, 5, 5, 5, 5, 0, -10, -10, 0, 0, 0, 0,
    0, 0, -10, -20, -10, -10, -5, -5, -10, -10, -20,
];

/// Re in mediogioco: stay behind the pawns
const KING_MIDGAME_PSQT: [Score; 64] = [
    20, 30, 10, 0, 0, 10, 30, 20, // Rank 1: bonus arrocco
    20, 20, 0, 0, 0, 0, 20, 20, -10, -20, -20, -20, -20, -20, -20, -10, -20, -30, -30, -40, -40,
    -30, -30, -20, -30, -40, -40, -50, -50, -40, -40, -30, -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30, -30, -40, -40, -50, -50, -40, -40, -30,
];

/// Re in finale: centralise
const KING_ENDGAME_PSQT: [Score; 64] = [
    -50, -30, -30, -30, -30, -30, -30, -50, -30, -30, 0, 0, 0, 0, -30, -30, -30, -10, 20, 30, 30,
    20, -10, -30, -30, -10, 30, 40, 40, 30, -10, -30, -30, -10, 30, 40, 40, 30, -10, -30, -30, -10,
    20, 30, 30, 20, -10, -30, -30, -20, -10, 0, 0, -10, -20, -30, -50, -40, -30, -20, -20, -30,
    -40, -50,
];

/// Endgame once no queens remain, or each side has at most a minor piece beside its queen
fn is_endgame(board: &Board) -> bool {
    let queens = board.piece_bb(PieceKind::Queen, Color::White)
        | board.piece_bb(PieceKind::Queen, Color::Black);
    if queens == 0 {
        return true;
    }
    [Color::White, Color::Black].into_iter().all(|color| {
        let minors = board.piece_bb(PieceKind::Knight, color) | board.piece_bb(PieceKind::Bishop, color);
        board.piece_bb(PieceKind::Rook, color) == 0 && minors.count_ones() <= 1
    })
}

fn psqt(kind: PieceKind, endgame: bool) -> &'static [Score; 64] {
    match kind {
        PieceKind::Pawn => &PAWN_PSQT,
        PieceKind::Knight => &KNIGHT_PSQT,
        PieceKind::Bishop => &BISHOP_PSQT,
        PieceKind::Rook => &ROOK_PSQT,
        PieceKind::Queen => &QUEEN_PSQT,
        PieceKind::King if endgame => &KING_ENDGAME_PSQT,
        PieceKind::King => &KING_MIDGAME_PSQT,
    }
}

/// Material + piece-square evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PsqtEvaluator;

impl Evaluator for PsqtEvaluator {
    fn evaluate(&self, board: &Board) -> Score {
        evaluate(board)
    }
}

/// Score in centipawn dal punto di vista del side-to-move
pub fn evaluate(board: &Board) -> Score {
    let endgame = is_endgame(board);
    let mut white_minus_black: Score = 0;

    for kind in PieceKind::ALL {
        let table = psqt(kind, endgame);
        let material = if kind == PieceKind::King { 0 } else { piece_value(kind) };

        for sq in iter_bits(board.piece_bb(kind, Color::White)) {
            white_minus_black += material + table[sq];
        }
        // Flip verticale per il Nero
        for sq in iter_bits(board.piece_bb(kind, Color::Black)) {
            white_minus_black -= material + table[sq ^ 56];
        }
    }

    match board.side() {
        Color::White => white_minus_black,
        Color::Black => -white_minus_black,
    }
}
