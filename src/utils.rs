// Bitboard masks, iterators and leaper attack tables shared by the board and both generators

use crate::board::Color;
use std::sync::OnceLock;

// File masks (A is column 0, H column 7)
pub const FILE_A: u64 = 0x0101010101010101;
pub const FILE_H: u64 = 0x8080808080808080;

pub const NOT_FILE_A: u64 = !FILE_A;
pub const NOT_FILE_H: u64 = !FILE_H;

// Rank masks (A1 is square 0)
pub const RANK_1: u64 = 0x00000000000000FF;
pub const RANK_2: u64 = 0x000000000000FF00;
pub const RANK_7: u64 = 0x00FF000000000000;
pub const RANK_8: u64 = 0xFF00000000000000;

#[inline]
pub fn square_bb(sq: usize) -> u64 {
    1u64 << sq
}

#[inline]
pub fn file_of(sq: usize) -> usize {
    sq & 7
}

#[inline]
pub fn rank_of(sq: usize) -> usize {
    sq >> 3
}

// Bit operations
#[inline]
pub fn pop_lsb(bb: &mut u64) -> Option<usize> {
    if *bb == 0 {
        return None;
    }
    let lsb = bb.trailing_zeros() as usize;
    *bb &= *bb - 1;
    Some(lsb)
}

#[inline]
pub fn lsb_index(bb: u64) -> Option<usize> {
    if bb == 0 {
        None
    } else {
        Some(bb.trailing_zeros() as usize)
    }
}

pub struct BitIter {
    bb: u64,
}

impl Iterator for BitIter {
    type Item = usize;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        pop_lsb(&mut self.bb)
    }
}

#[inline]
pub fn iter_bits(bb: u64) -> BitIter {
    BitIter { bb }
}

/// Square name in coordinate notation (0 -> "a1", 63 -> "h8")
pub fn square_name(sq: usize) -> String {
    let file = (b'a' + file_of(sq) as u8) as char;
    let rank = (b'1' + rank_of(sq) as u8) as char;
    format!("{}{}", file, rank)
}

/// Parse a coordinate square ("e2" -> 12)
pub fn parse_square(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let (file, rank) = (bytes[0], bytes[1]);
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some((rank - b'1') as usize * 8 + (file - b'a') as usize)
}

// Precomputed attack tables using OnceLock for thread safety
static KNIGHT_ATTACKS: OnceLock<[u64; 64]> = OnceLock::new();
static KING_ATTACKS: OnceLock<[u64; 64]> = OnceLock::new();
static PAWN_ATTACKS: OnceLock<[[u64; 64]; 2]> = OnceLock::new();

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Square reached from `sq` by a (file, rank) step, or None when it leaves the board
#[inline]
pub fn offset_square(sq: usize, df: i8, dr: i8) -> Option<usize> {
    let f = file_of(sq) as i8 + df;
    let r = rank_of(sq) as i8 + dr;
    if (0..8).contains(&f) && (0..8).contains(&r) {
        Some(r as usize * 8 + f as usize)
    } else {
        None
    }
}

fn leaper_table(offsets: &[(i8, i8)]) -> [u64; 64] {
    let mut attacks = [0u64; 64];
    for (sq, mask) in attacks.iter_mut().enumerate() {
        for &(df, dr) in offsets {
            if let Some(to) = offset_square(sq, df, dr) {
                *mask |= square_bb(to);
            }
        }
    }
    attacks
}

fn init_pawn_attacks() -> [[u64; 64]; 2] {
    let mut attacks = [[0u64; 64]; 2];
    for sq in 0..64 {
        let bb = square_bb(sq);
        attacks[Color::White as usize][sq] = ((bb & NOT_FILE_A) << 7) | ((bb & NOT_FILE_H) << 9);
        attacks[Color::Black as usize][sq] = ((bb & NOT_FILE_A) >> 9) | ((bb & NOT_FILE_H) >> 7);
    }
    attacks
}

#[inline(always)]
pub fn init_attack_tables() {
    KNIGHT_ATTACKS.get_or_init(|| leaper_table(&KNIGHT_OFFSETS));
    KING_ATTACKS.get_or_init(|| leaper_table(&KING_OFFSETS));
    PAWN_ATTACKS.get_or_init(init_pawn_attacks);
}

#[inline]
pub fn knight_attacks(sq: usize) -> u64 {
    KNIGHT_ATTACKS.get_or_init(|| leaper_table(&KNIGHT_OFFSETS))[sq]
}

#[inline]
pub fn king_attacks(sq: usize) -> u64 {
    KING_ATTACKS.get_or_init(|| leaper_table(&KING_OFFSETS))[sq]
}

/// Squares a pawn of `color` standing on `sq` attacks
#[inline]
pub fn pawn_attacks(color: Color, sq: usize) -> u64 {
    PAWN_ATTACKS.get_or_init(init_pawn_attacks)[color as usize][sq]
}
