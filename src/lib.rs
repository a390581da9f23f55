//! arrocco: a bitboard chess engine core with a UCI front end.

pub mod board;
pub mod eval;
pub mod magic;
pub mod movegen;
pub mod moves;
pub mod perft;
pub mod search;
pub mod time;
pub mod uci;
pub mod utils;
pub mod zobrist;

/// Build the shared lookup tables up front instead of on first use
pub fn init() {
    utils::init_attack_tables();
    magic::init();
    let _ = zobrist::default_keys();
}
