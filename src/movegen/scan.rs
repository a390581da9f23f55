// Per-cell scan: fixed deltas for leapers and pawns, ray walking for sliders

use super::{generate_castling, push_pawn_move, MoveGenerator};
use crate::board::{Board, Color, PieceKind};
use crate::moves::{new_move, Move, FLAG_CAPTURE, FLAG_EN_PASSANT, FLAG_NONE};
use crate::utils::{offset_square, rank_of, KING_OFFSETS, KNIGHT_OFFSETS};

type Mailbox = [Option<(PieceKind, Color)>; 64];

const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Straightforward generator over the derived 64-cell view of the board.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanGenerator;

impl MoveGenerator for ScanGenerator {
    fn pseudo_moves(&self, board: &Board, out: &mut Vec<Move>) {
        generate(board, false, out);
        generate_castling(board, out);
    }

    fn pseudo_captures(&self, board: &Board, out: &mut Vec<Move>) {
        generate(board, true, out);
    }
}

fn generate(board: &Board, captures_only: bool, out: &mut Vec<Move>) {
    let cells = board.mailbox();
    let us = board.side();
    for from in 0..64 {
        let Some((kind, color)) = cells[from] else {
            continue;
        };
        if color != us {
            continue;
        }
        match kind {
            PieceKind::Pawn => pawn_moves(board, &cells, from, us, captures_only, out),
            PieceKind::Knight => step_moves(&cells, from, kind, us, &KNIGHT_OFFSETS, captures_only, out),
            PieceKind::King => step_moves(&cells, from, kind, us, &KING_OFFSETS, captures_only, out),
            PieceKind::Bishop => ray_moves(&cells, from, kind, us, &BISHOP_DIRS, captures_only, out),
            PieceKind::Rook => ray_moves(&cells, from, kind, us, &ROOK_DIRS, captures_only, out),
            PieceKind::Queen => {
                ray_moves(&cells, from, kind, us, &BISHOP_DIRS, captures_only, out);
                ray_moves(&cells, from, kind, us, &ROOK_DIRS, captures_only, out);
            }
        }
    }
}

fn pawn_moves(
    board: &Board,
    cells: &Mailbox,
    from: usize,
    us: Color,
    captures_only: bool,
    out: &mut Vec<Move>,
) {
    let (dir, start_rank) = match us {
        Color::White => (1i8, 1),
        Color::Black => (-1i8, 6),
    };

    if !captures_only {
        if let Some(one) = offset_square(from, 0, dir) {
            if cells[one].is_none() {
                push_pawn_move(from, one, us, None, out);
                if rank_of(from) == start_rank {
                    if let Some(two) = offset_square(from, 0, 2 * dir) {
                        if cells[two].is_none() {
                            out.push(new_move(from, two, PieceKind::Pawn, None, None, FLAG_NONE));
                        }
                    }
                }
            }
        }
    }

    for df in [-1i8, 1] {
        let Some(to) = offset_square(from, df, dir) else {
            continue;
        };
        match cells[to] {
            Some((victim, color)) if color != us => {
                push_pawn_move(from, to, us, Some(victim), out);
            }
            None if board.ep() == Some(to as u8) => {
                out.push(new_move(
                    from,
                    to,
                    PieceKind::Pawn,
                    Some(PieceKind::Pawn),
                    None,
                    FLAG_EN_PASSANT | FLAG_CAPTURE,
                ));
            }
            _ => {}
        }
    }
}

fn step_moves(
    cells: &Mailbox,
    from: usize,
    kind: PieceKind,
    us: Color,
    offsets: &[(i8, i8)],
    captures_only: bool,
    out: &mut Vec<Move>,
) {
    for &(df, dr) in offsets {
        if let Some(to) = offset_square(from, df, dr) {
            push_target(cells, from, to, kind, us, captures_only, out);
        }
    }
}

fn ray_moves(
    cells: &Mailbox,
    from: usize,
    kind: PieceKind,
    us: Color,
    dirs: &[(i8, i8)],
    captures_only: bool,
    out: &mut Vec<Move>,
) {
    for &(df, dr) in dirs {
        let mut sq = from;
        while let Some(to) = offset_square(sq, df, dr) {
            push_target(cells, from, to, kind, us, captures_only, out);
            if cells[to].is_some() {
                break;
            }
            sq = to;
        }
    }
}

/// Quiet move to an empty cell, capture of an enemy piece, nothing on a friendly one
#[inline]
fn push_target(
    cells: &Mailbox,
    from: usize,
    to: usize,
    kind: PieceKind,
    us: Color,
    captures_only: bool,
    out: &mut Vec<Move>,
) {
    match cells[to] {
        None if !captures_only => out.push(new_move(from, to, kind, None, None, FLAG_NONE)),
        Some((victim, color)) if color != us => {
            out.push(new_move(from, to, kind, Some(victim), None, FLAG_CAPTURE))
        }
        _ => {}
    }
}
