// Mapping di quadrati: A1=0, B1=1, ..., H8=63
// The twelve piece bitboards are the only stored placement; everything else is derived.

use crate::magic;
use crate::movegen::{MoveGenerator, TableGenerator};
use crate::moves::{
    move_captured, move_flag, move_from_sq, move_piece, move_promotion, move_to_sq,
    Move, FLAG_CASTLE_KING, FLAG_CASTLE_QUEEN, FLAG_EN_PASSANT,
};
use crate::utils::{
    iter_bits, king_attacks, knight_attacks, lsb_index, parse_square, pawn_attacks, square_bb,
    square_name, RANK_1, RANK_8,
};
use crate::zobrist::{default_keys, ZobristKeys};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    #[inline]
    fn not(self) -> Color {
        self.opposite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Promotion choices, strongest first
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    #[inline]
    pub fn from_index(i: usize) -> Option<PieceKind> {
        Self::ALL.get(i).copied()
    }

    /// Case-insensitive letter ('n' / 'N' -> Knight)
    pub fn from_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Lowercase letter
    pub fn to_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

// Indice nel piece_bb array: white piece = kind as usize; black piece = 6 + kind as usize
#[inline]
pub fn piece_index(kind: PieceKind, color: Color) -> usize {
    (color as usize) * 6 + (kind as usize)
}

fn fen_char(kind: PieceKind, color: Color) -> char {
    match color {
        Color::White => kind.to_char().to_ascii_uppercase(),
        Color::Black => kind.to_char(),
    }
}

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// Castling bits: bit 3 = K, bit 2 = Q, bit 1 = k, bit 0 = q
pub const CASTLE_WK: u8 = 0b1000;
pub const CASTLE_WQ: u8 = 0b0100;
pub const CASTLE_BK: u8 = 0b0010;
pub const CASTLE_BQ: u8 = 0b0001;

/// Rights that survive a move touching each square: `rights &= MASK[from] & MASK[to]`
const CASTLE_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    mask[0] = 0b1111 & !CASTLE_WQ;
    mask[4] = 0b1111 & !(CASTLE_WK | CASTLE_WQ);
    mask[7] = 0b1111 & !CASTLE_WK;
    mask[56] = 0b1111 & !CASTLE_BQ;
    mask[60] = 0b1111 & !(CASTLE_BK | CASTLE_BQ);
    mask[63] = 0b1111 & !CASTLE_BK;
    mask
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("missing FEN field: {0}")]
    MissingField(&'static str),
    #[error("piece placement must have 8 ranks of 8 squares: {0:?}")]
    BadPlacement(String),
    #[error("invalid piece character {0:?}")]
    InvalidPiece(char),
    #[error("invalid side to move {0:?}")]
    InvalidSide(String),
    #[error("invalid castling character {0:?}")]
    InvalidCastling(char),
    #[error("invalid en-passant square {0:?}")]
    InvalidEnPassant(String),
    #[error("invalid move clock {0:?}")]
    InvalidClock(String),
    #[error("{0:?} must have exactly one king")]
    KingCount(Color),
    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(String),
}

// Undo entry per rollback
#[derive(Debug, Clone, Copy)]
struct Undo {
    mv: Move,
    captured: Option<PieceKind>,
    prev_castling: u8,
    prev_ep: Option<u8>,
    prev_halfmove: u16,
    prev_fullmove: u16,
    prev_zobrist: u64,
}

#[derive(Clone)]
pub struct Board {
    // 12 bitboard: 0-5 = white p,n,b,r,q,k; 6-11 = black p,n,b,r,q,k
    piece_bb: [u64; 12],
    color_occ: [u64; 2],
    occ: u64,
    side: Color,
    castling: u8,
    ep: Option<u8>,
    halfmove: u16,
    fullmove: u16,
    zobrist: u64,
    keys: Arc<ZobristKeys>,
    // Undo stack per unmake; capacità per centinaia di plies
    undo_stack: Vec<Undo>,
    // Hash of every position since setup, current one last
    hash_history: Vec<u64>,
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Board {
    // Board vuota
    pub fn new() -> Self {
        Self::with_keys(default_keys())
    }

    /// Empty board hashing with a caller-supplied key set
    pub fn with_keys(keys: Arc<ZobristKeys>) -> Self {
        let mut board = Self {
            piece_bb: [0; 12],
            color_occ: [0; 2],
            occ: 0,
            side: Color::White,
            castling: 0,
            ep: None,
            halfmove: 0,
            fullmove: 1,
            zobrist: 0,
            keys,
            undo_stack: Vec::with_capacity(256),
            hash_history: Vec::with_capacity(256),
        };
        board.zobrist = board.recalc_zobrist();
        board.hash_history.push(board.zobrist);
        board
    }

    pub fn startpos() -> Self {
        let mut board = Self::new();
        if let Err(e) = board.set_from_fen(START_FEN) {
            log::error!("start position rejected: {}", e);
        }
        board
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Self::new();
        board.set_from_fen(fen)?;
        Ok(board)
    }

    // Accessors --------------------------------------------------
    #[inline]
    pub fn piece_bb(&self, kind: PieceKind, color: Color) -> u64 {
        self.piece_bb[piece_index(kind, color)]
    }

    #[inline]
    pub fn color_occ(&self, color: Color) -> u64 {
        self.color_occ[color as usize]
    }

    #[inline]
    pub fn occupancy(&self) -> u64 {
        self.occ
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn castling(&self) -> u8 {
        self.castling
    }

    #[inline]
    pub fn ep(&self) -> Option<u8> {
        self.ep
    }

    #[inline]
    pub fn halfmove(&self) -> u16 {
        self.halfmove
    }

    #[inline]
    pub fn fullmove(&self) -> u16 {
        self.fullmove
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.zobrist
    }

    pub fn keys(&self) -> &Arc<ZobristKeys> {
        &self.keys
    }

    /// Number of moves applied since setup
    #[inline]
    pub fn ply(&self) -> usize {
        self.undo_stack.len()
    }

    // Restituisce piece (kind,color) su square idx o None
    pub fn piece_on(&self, sq: usize) -> Option<(PieceKind, Color)> {
        let mask = square_bb(sq);
        if self.occ & mask == 0 {
            return None;
        }
        (0..12).find(|&i| self.piece_bb[i] & mask != 0).map(|i| {
            let color = if i < 6 { Color::White } else { Color::Black };
            (PieceKind::ALL[i % 6], color)
        })
    }

    /// 64-cell view of the bitboards
    pub fn mailbox(&self) -> [Option<(PieceKind, Color)>; 64] {
        let mut cells = [None; 64];
        for color in [Color::White, Color::Black] {
            for kind in PieceKind::ALL {
                for sq in iter_bits(self.piece_bb(kind, color)) {
                    cells[sq] = Some((kind, color));
                }
            }
        }
        cells
    }

    pub fn king_sq(&self, color: Color) -> Option<usize> {
        lsb_index(self.piece_bb(PieceKind::King, color))
    }

    /// Hash recomputed from scratch
    pub fn recalc_zobrist(&self) -> u64 {
        self.keys.full_hash(self)
    }

    // Placement helpers ------------------------------------------
    #[inline]
    fn xor_piece(&mut self, kind: PieceKind, color: Color, sq: usize) {
        let bb = square_bb(sq);
        self.piece_bb[piece_index(kind, color)] ^= bb;
        self.color_occ[color as usize] ^= bb;
        self.occ ^= bb;
    }

    #[inline]
    fn toggle_piece(&mut self, kind: PieceKind, color: Color, sq: usize) {
        self.xor_piece(kind, color, sq);
        self.zobrist ^= self.keys.piece(kind, color, sq);
    }

    fn clear(&mut self) {
        self.piece_bb = [0; 12];
        self.color_occ = [0; 2];
        self.occ = 0;
        self.side = Color::White;
        self.castling = 0;
        self.ep = None;
        self.halfmove = 0;
        self.fullmove = 1;
        self.undo_stack.clear();
        self.hash_history.clear();
        self.zobrist = self.recalc_zobrist();
        self.hash_history.push(self.zobrist);
    }

    // Make / unmake ----------------------------------------------
    /// Apply a pseudo-legal move for the side to move. No legality check.
    pub fn make_move(&mut self, mv: Move) {
        let from = move_from_sq(mv);
        let to = move_to_sq(mv);
        let piece = move_piece(mv);
        let us = self.side;
        let them = !us;
        let captured = move_captured(mv);

        self.undo_stack.push(Undo {
            mv,
            captured,
            prev_castling: self.castling,
            prev_ep: self.ep,
            prev_halfmove: self.halfmove,
            prev_fullmove: self.fullmove,
            prev_zobrist: self.zobrist,
        });

        if let Some(victim) = captured {
            let cap_sq = if move_flag(mv, FLAG_EN_PASSANT) {
                ep_victim_square(to, us)
            } else {
                to
            };
            debug_assert_eq!(self.piece_on(cap_sq), Some((victim, them)));
            self.toggle_piece(victim, them, cap_sq);
        }

        self.toggle_piece(piece, us, from);
        self.toggle_piece(move_promotion(mv).unwrap_or(piece), us, to);

        if let Some((rook_from, rook_to)) = castle_rook_squares(mv) {
            self.toggle_piece(PieceKind::Rook, us, rook_from);
            self.toggle_piece(PieceKind::Rook, us, rook_to);
        }

        let new_rights = self.castling & CASTLE_MASK[from] & CASTLE_MASK[to];
        if new_rights != self.castling {
            self.zobrist ^= self.keys.castling_key(self.castling ^ new_rights);
            self.castling = new_rights;
        }

        self.zobrist ^= self.keys.ep_key(self.ep);
        self.ep = if piece == PieceKind::Pawn && to.abs_diff(from) == 16 {
            Some(((from + to) / 2) as u8)
        } else {
            None
        };
        self.zobrist ^= self.keys.ep_key(self.ep);

        if piece == PieceKind::Pawn || captured.is_some() {
            self.halfmove = 0;
        } else {
            self.halfmove = self.halfmove.saturating_add(1);
        }
        if us == Color::Black {
            self.fullmove = self.fullmove.saturating_add(1);
        }

        self.side = them;
        self.zobrist ^= self.keys.side;
        self.hash_history.push(self.zobrist);
    }

    /// Revert the most recent `make_move`, which must have been called with `mv`.
    pub fn unmake_move(&mut self, mv: Move) {
        let Some(undo) = self.undo_stack.pop() else {
            debug_assert!(false, "unmake_move without a matching make_move");
            return;
        };
        debug_assert_eq!(undo.mv, mv, "unmake_move out of LIFO order");
        self.hash_history.pop();

        let from = move_from_sq(mv);
        let to = move_to_sq(mv);
        let piece = move_piece(mv);
        let us = !self.side;

        if let Some((rook_from, rook_to)) = castle_rook_squares(mv) {
            self.xor_piece(PieceKind::Rook, us, rook_to);
            self.xor_piece(PieceKind::Rook, us, rook_from);
        }

        self.xor_piece(move_promotion(mv).unwrap_or(piece), us, to);
        self.xor_piece(piece, us, from);

        if let Some(victim) = undo.captured {
            let cap_sq = if move_flag(mv, FLAG_EN_PASSANT) {
                ep_victim_square(to, us)
            } else {
                to
            };
            self.xor_piece(victim, !us, cap_sq);
        }

        self.side = us;
        self.castling = undo.prev_castling;
        self.ep = undo.prev_ep;
        self.halfmove = undo.prev_halfmove;
        self.fullmove = undo.prev_fullmove;
        self.zobrist = undo.prev_zobrist;
    }

    /// True iff `mv` does not leave the mover's king attacked
    pub fn is_legal_move(&mut self, mv: Move) -> bool {
        let us = self.side;
        self.make_move(mv);
        let legal = !self.is_in_check(us);
        self.unmake_move(mv);
        legal
    }

    // Legality helpers -------------------------------------------
    pub fn is_square_attacked(&self, sq: usize, by: Color) -> bool {
        // A pawn of `by` attacks sq iff a pawn of the other colour on sq would attack it back
        if pawn_attacks(!by, sq) & self.piece_bb(PieceKind::Pawn, by) != 0 {
            return true;
        }
        if knight_attacks(sq) & self.piece_bb(PieceKind::Knight, by) != 0 {
            return true;
        }
        if king_attacks(sq) & self.piece_bb(PieceKind::King, by) != 0 {
            return true;
        }
        let queens = self.piece_bb(PieceKind::Queen, by);
        let diagonal = self.piece_bb(PieceKind::Bishop, by) | queens;
        if diagonal != 0 && magic::bishop_attacks(sq, self.occ) & diagonal != 0 {
            return true;
        }
        let orthogonal = self.piece_bb(PieceKind::Rook, by) | queens;
        orthogonal != 0 && magic::rook_attacks(sq, self.occ) & orthogonal != 0
    }

    /// A side without a king is never in check
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_sq(color)
            .map_or(false, |k| self.is_square_attacked(k, !color))
    }

    // Draw rules -------------------------------------------------
    /// Current position seen at least twice before with the same side to move
    pub fn is_draw_by_repetition(&self) -> bool {
        let len = self.hash_history.len();
        if len < 9 {
            return false;
        }
        let current = self.zobrist;
        // Positions before the last capture or pawn move cannot recur
        let oldest = len.saturating_sub(1 + self.halfmove as usize);
        let mut count = 0;
        let mut i = len - 3;
        loop {
            if i < oldest {
                break;
            }
            if self.hash_history[i] == current {
                count += 1;
                if count >= 2 {
                    return true;
                }
            }
            if i < 2 {
                break;
            }
            i -= 2;
        }
        false
    }

    pub fn is_draw_by_fifty_moves(&self) -> bool {
        self.halfmove >= 100
    }

    pub fn is_draw(&self) -> bool {
        self.is_draw_by_fifty_moves() || self.is_draw_by_repetition()
    }

    // Generate moves APIs -----------------------------------------
    pub fn generate_moves(&mut self) -> Vec<Move> {
        TableGenerator.legal_moves(self)
    }

    /// Legal captures, en-passant and capture-promotions only
    pub fn generate_captures(&mut self) -> Vec<Move> {
        TableGenerator.legal_captures(self)
    }

    // FEN ----------------------------------------------------------
    /// Reset from a FEN string. On error the board is left empty.
    pub fn set_from_fen(&mut self, fen: &str) -> Result<(), FenError> {
        self.clear();
        let result = self.parse_fen(fen);
        if result.is_err() {
            self.clear();
        }
        result
    }

    fn parse_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let mut parts = fen.split_whitespace();
        let piece_part = parts.next().ok_or(FenError::MissingField("placement"))?;
        let side_part = parts.next().ok_or(FenError::MissingField("side to move"))?;
        let castle_part = parts.next().ok_or(FenError::MissingField("castling"))?;
        let ep_part = parts.next().ok_or(FenError::MissingField("en passant"))?;
        let halfmove_part = parts.next().unwrap_or("0");
        let fullmove_part = parts.next().unwrap_or("1");

        // Parse pieces: rank8 .. rank1
        let ranks: Vec<&str> = piece_part.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::BadPlacement(piece_part.to_string()));
        }
        for (i, rank_part) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for ch in rank_part.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as usize;
                } else {
                    let kind = PieceKind::from_char(ch).ok_or(FenError::InvalidPiece(ch))?;
                    let color = if ch.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    if file >= 8 {
                        return Err(FenError::BadPlacement(piece_part.to_string()));
                    }
                    self.xor_piece(kind, color, rank * 8 + file);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::BadPlacement(piece_part.to_string()));
            }
        }
        for color in [Color::White, Color::Black] {
            if self.piece_bb(PieceKind::King, color).count_ones() != 1 {
                return Err(FenError::KingCount(color));
            }
        }
        let pawns = self.piece_bb(PieceKind::Pawn, Color::White) | self.piece_bb(PieceKind::Pawn, Color::Black);
        if let Some(sq) = iter_bits(pawns & (RANK_1 | RANK_8)).next() {
            return Err(FenError::PawnOnBackRank(square_name(sq)));
        }

        self.side = match side_part {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSide(other.to_string())),
        };

        self.castling = 0;
        if castle_part != "-" {
            for ch in castle_part.chars() {
                self.castling |= match ch {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(FenError::InvalidCastling(ch)),
                };
            }
        }

        self.ep = match ep_part {
            "-" => None,
            s => match parse_square(s) {
                Some(sq) if self.ep_target_is_consistent(sq) => Some(sq as u8),
                _ => return Err(FenError::InvalidEnPassant(s.to_string())),
            },
        };

        self.halfmove = halfmove_part
            .parse()
            .map_err(|_| FenError::InvalidClock(halfmove_part.to_string()))?;
        self.fullmove = fullmove_part
            .parse()
            .map_err(|_| FenError::InvalidClock(fullmove_part.to_string()))?;

        self.zobrist = self.recalc_zobrist();
        self.hash_history.clear();
        self.hash_history.push(self.zobrist);
        Ok(())
    }

    /// The passed cell must sit behind a just-double-pushed enemy pawn with its origin empty
    fn ep_target_is_consistent(&self, sq: usize) -> bool {
        let them = !self.side;
        let expected_rank = match self.side {
            Color::White => 5,
            Color::Black => 2,
        };
        if sq / 8 != expected_rank {
            return false;
        }
        let victim = ep_victim_square(sq, self.side);
        let origin = match self.side {
            Color::White => sq + 8,
            Color::Black => sq - 8,
        };
        self.piece_on(victim) == Some((PieceKind::Pawn, them))
            && self.piece_on(sq).is_none()
            && self.piece_on(origin).is_none()
    }

    pub fn to_fen(&self) -> String {
        let cells = self.mailbox();
        let mut fen = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match cells[rank * 8 + file] {
                    Some((kind, color)) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(fen_char(kind, color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.side == Color::White { 'w' } else { 'b' });
        fen.push(' ');
        if self.castling == 0 {
            fen.push('-');
        } else {
            for (bit, ch) in [(CASTLE_WK, 'K'), (CASTLE_WQ, 'Q'), (CASTLE_BK, 'k'), (CASTLE_BQ, 'q')] {
                if self.castling & bit != 0 {
                    fen.push(ch);
                }
            }
        }
        fen.push(' ');
        match self.ep {
            Some(sq) => fen.push_str(&square_name(sq as usize)),
            None => fen.push('-'),
        }
        fen.push_str(&format!(" {} {}", self.halfmove, self.fullmove));
        fen
    }
}

/// Square of the pawn removed by an en-passant capture landing on `to`
#[inline]
fn ep_victim_square(to: usize, mover: Color) -> usize {
    match mover {
        Color::White => to - 8,
        Color::Black => to + 8,
    }
}

/// Rook (from, to) for a castling move, None otherwise
#[inline]
fn castle_rook_squares(mv: Move) -> Option<(usize, usize)> {
    let from = move_from_sq(mv);
    if move_flag(mv, FLAG_CASTLE_KING) {
        Some((from + 3, from + 1))
    } else if move_flag(mv, FLAG_CASTLE_QUEEN) {
        Some((from - 4, from - 1))
    } else {
        None
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self.mailbox();
        writeln!(f, "  +-----------------+")?;
        for rank in (0..8).rev() {
            write!(f, "{} | ", rank + 1)?;
            for file in 0..8 {
                match cells[rank * 8 + file] {
                    Some((kind, color)) => write!(f, "{} ", fen_char(kind, color))?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "  +-----------------+")?;
        writeln!(f, "    a b c d e f g h")?;
        writeln!(f)?;
        writeln!(f, "Fen: {}", self.to_fen())?;
        write!(f, "Key: {:016X}", self.zobrist)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_fen())
    }
}
