//! Compact move encoding and its coordinate-text round trip.

use crate::board::{Board, PieceKind};
use crate::utils::{parse_square, square_name};
use thiserror::Error;

pub type Move = u32;

/// The "no move" value; never produced by a generator.
pub const NULL_MOVE: Move = 0;

// Codifica mosse: 32-bit layout
// Bits 0-5: from (0-63)
// Bits 6-11: to (0-63)
// Bits 12-15: piece (0-5)
// Bits 16-19: captured (0-5, 0xF = none)
// Bits 20-23: promotion (0-5, 0xF = none)
// Bits 24-31: flags
pub const FLAG_NONE: u32 = 0;
pub const FLAG_EN_PASSANT: u32 = 1 << 24;
pub const FLAG_CASTLE_KING: u32 = 1 << 25;
pub const FLAG_CASTLE_QUEEN: u32 = 1 << 26;
pub const FLAG_PROMOTION: u32 = 1 << 27;
pub const FLAG_CAPTURE: u32 = 1 << 28;

const NO_KIND: u32 = 0xF;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("move text too short: {0:?}")]
    TooShort(String),
    #[error("invalid square in move text: {0:?}")]
    InvalidSquare(String),
    #[error("invalid promotion piece: {0:?}")]
    InvalidPromotion(char),
    #[error("move {0} is not legal in this position")]
    NotLegal(String),
}

#[inline]
pub fn move_from_sq(m: Move) -> usize {
    (m & 0x3F) as usize
}

#[inline]
pub fn move_to_sq(m: Move) -> usize {
    ((m >> 6) & 0x3F) as usize
}

#[inline]
pub fn move_piece(m: Move) -> PieceKind {
    PieceKind::from_index(((m >> 12) & 0xF) as usize).unwrap_or(PieceKind::Pawn)
}

#[inline]
pub fn move_captured(m: Move) -> Option<PieceKind> {
    PieceKind::from_index(((m >> 16) & 0xF) as usize)
}

#[inline]
pub fn move_promotion(m: Move) -> Option<PieceKind> {
    PieceKind::from_index(((m >> 20) & 0xF) as usize)
}

#[inline]
pub fn move_flag(m: Move, flag: u32) -> bool {
    (m & flag) != 0
}

#[inline]
pub fn is_capture(m: Move) -> bool {
    move_flag(m, FLAG_CAPTURE)
}

#[inline]
pub fn is_castle(m: Move) -> bool {
    move_flag(m, FLAG_CASTLE_KING | FLAG_CASTLE_QUEEN)
}

// Costruzione mossa
pub fn new_move(
    from: usize,
    to: usize,
    piece: PieceKind,
    captured: Option<PieceKind>,
    promotion: Option<PieceKind>,
    flags: u32,
) -> Move {
    let cap = captured.map(|p| p as u32).unwrap_or(NO_KIND);
    let prom = promotion.map(|p| p as u32).unwrap_or(NO_KIND);
    (from as u32 & 0x3F)
        | ((to as u32 & 0x3F) << 6)
        | ((piece as u32 & 0xF) << 12)
        | ((cap & 0xF) << 16)
        | ((prom & 0xF) << 20)
        | flags
}

/// Convert a Move to coordinate notation (e.g., "e2e4" or "e7e8q")
pub fn move_to_uci(m: Move) -> String {
    if m == NULL_MOVE {
        return "0000".to_string();
    }

    let mut uci = format!(
        "{}{}",
        square_name(move_from_sq(m)),
        square_name(move_to_sq(m))
    );
    if let Some(promo) = move_promotion(m) {
        uci.push(promo.to_char());
    }
    uci
}

/// Split move text into (from, to, promotion) without consulting a position.
pub fn parse_uci_squares(
    uci: &str,
) -> Result<(usize, usize, Option<PieceKind>), MoveParseError> {
    if uci.len() < 4 || !uci.is_ascii() {
        return Err(MoveParseError::TooShort(uci.to_string()));
    }
    let from = parse_square(&uci[0..2]).ok_or_else(|| MoveParseError::InvalidSquare(uci.into()))?;
    let to = parse_square(&uci[2..4]).ok_or_else(|| MoveParseError::InvalidSquare(uci.into()))?;

    let promotion = match uci[4..].chars().next() {
        None => None,
        Some(c @ ('q' | 'r' | 'b' | 'n')) => PieceKind::from_char(c),
        Some(other) => return Err(MoveParseError::InvalidPromotion(other)),
    };
    Ok((from, to, promotion))
}

/// Resolve move text against the legal moves of `board`.
pub fn parse_uci_move(board: &mut Board, uci: &str) -> Result<Move, MoveParseError> {
    let (from, to, promotion) = parse_uci_squares(uci)?;

    board
        .generate_moves()
        .into_iter()
        .find(|&mv| {
            move_from_sq(mv) == from && move_to_sq(mv) == to && move_promotion(mv) == promotion
        })
        .ok_or_else(|| MoveParseError::NotLegal(uci.to_string()))
}
