//! Leaf counting over the legal move tree, the reference check for move generation.

use crate::board::Board;
use crate::movegen::{MoveGenerator, TableGenerator};
use crate::moves::Move;

/// Leaf count at `depth` using the engine's generator
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    perft_with(board, depth, &TableGenerator)
}

/// Leaf count at `depth` using an explicit generator strategy
pub fn perft_with<G: MoveGenerator + ?Sized>(board: &mut Board, depth: u32, generator: &G) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generator.legal_moves(board);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for mv in moves {
        board.make_move(mv);
        nodes += perft_with(board, depth - 1, generator);
        board.unmake_move(mv);
    }
    nodes
}

/// Per-root-move leaf counts, in generator order
pub fn divide(board: &mut Board, depth: u32) -> Vec<(Move, u64)> {
    divide_with(board, depth, &TableGenerator)
}

pub fn divide_with<G: MoveGenerator + ?Sized>(
    board: &mut Board,
    depth: u32,
    generator: &G,
) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    generator
        .legal_moves(board)
        .into_iter()
        .map(|mv| {
            board.make_move(mv);
            let nodes = perft_with(board, depth - 1, generator);
            board.unmake_move(mv);
            (mv, nodes)
        })
        .collect()
}
