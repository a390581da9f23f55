// Zobrist hashing keys, built from an explicit seeded generator
use crate::board::{piece_index, Board, Color, PieceKind};
use crate::utils::iter_bits;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, OnceLock};

/// Seed used when no other seed is requested; fixed so hashes are reproducible.
pub const DEFAULT_ZOBRIST_SEED: u64 = 0x5EED_A77C_0CC0_2024;

/// One independent random key per hashed fact.
#[derive(Debug, Clone)]
pub struct ZobristKeys {
    pub pieces: [[u64; 64]; 12],
    /// Indexed by castling bit (0 = black queenside .. 3 = white kingside)
    pub castling: [u64; 4],
    pub ep_file: [u64; 8],
    pub side: u64,
}

impl ZobristKeys {
    pub fn new(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut pieces = [[0u64; 64]; 12];
        for table in pieces.iter_mut() {
            for key in table.iter_mut() {
                *key = rng.gen();
            }
        }
        let mut castling = [0u64; 4];
        for key in castling.iter_mut() {
            *key = rng.gen();
        }
        let mut ep_file = [0u64; 8];
        for key in ep_file.iter_mut() {
            *key = rng.gen();
        }
        let side = rng.gen();

        ZobristKeys {
            pieces,
            castling,
            ep_file,
            side,
        }
    }

    #[inline]
    pub fn piece(&self, kind: PieceKind, color: Color, sq: usize) -> u64 {
        self.pieces[piece_index(kind, color)][sq]
    }

    /// Combined key of every right set in the 4-bit `rights` mask
    #[inline]
    pub fn castling_key(&self, rights: u8) -> u64 {
        iter_bits(u64::from(rights & 0xF)).fold(0, |h, bit| h ^ self.castling[bit])
    }

    #[inline]
    pub fn ep_key(&self, ep: Option<u8>) -> u64 {
        ep.map(|sq| self.ep_file[(sq % 8) as usize]).unwrap_or(0)
    }

    /// Hash of `board` computed from scratch, ignoring its incremental value
    pub fn full_hash(&self, board: &Board) -> u64 {
        let mut h = 0u64;
        for color in [Color::White, Color::Black] {
            for kind in PieceKind::ALL {
                for sq in iter_bits(board.piece_bb(kind, color)) {
                    h ^= self.piece(kind, color, sq);
                }
            }
        }
        if board.side() == Color::Black {
            h ^= self.side;
        }
        h ^= self.castling_key(board.castling());
        h ^= self.ep_key(board.ep());
        h
    }
}

static DEFAULT_KEYS: OnceLock<Arc<ZobristKeys>> = OnceLock::new();

/// Key set built from `DEFAULT_ZOBRIST_SEED`, shared by every board that was
/// not handed its own keys.
pub fn default_keys() -> Arc<ZobristKeys> {
    Arc::clone(DEFAULT_KEYS.get_or_init(|| Arc::new(ZobristKeys::default())))
}

impl Default for ZobristKeys {
    fn default() -> Self {
        ZobristKeys::new(DEFAULT_ZOBRIST_SEED)
    }
}
