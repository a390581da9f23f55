// Attack-table generator: leaper tables, magic sliders, split into captures and quiets

use super::{generate_castling, push_pawn_move, MoveGenerator};
use crate::board::{Board, Color, PieceKind};
use crate::magic::{bishop_attacks, queen_attacks, rook_attacks};
use crate::moves::{new_move, Move, FLAG_CAPTURE, FLAG_EN_PASSANT, FLAG_NONE};
use crate::utils::{iter_bits, king_attacks, knight_attacks, pawn_attacks, square_bb, RANK_2, RANK_7};

/// Generator backed by precomputed attack masks. This is the one the engine uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableGenerator;

impl MoveGenerator for TableGenerator {
    fn pseudo_moves(&self, board: &Board, out: &mut Vec<Move>) {
        generate(board, false, out);
        generate_castling(board, out);
    }

    fn pseudo_captures(&self, board: &Board, out: &mut Vec<Move>) {
        generate(board, true, out);
    }
}

#[inline]
fn victim_on(board: &Board, them: Color, sq: usize) -> Option<PieceKind> {
    let bb = square_bb(sq);
    PieceKind::ALL
        .into_iter()
        .find(|&kind| board.piece_bb(kind, them) & bb != 0)
}

fn generate(board: &Board, captures_only: bool, out: &mut Vec<Move>) {
    let us = board.side();
    let them = !us;
    let own = board.color_occ(us);
    let enemy = board.color_occ(them);
    let occ = board.occupancy();

    pawn_moves(board, us, enemy, occ, captures_only, out);

    for kind in [PieceKind::Knight, PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen, PieceKind::King] {
        for from in iter_bits(board.piece_bb(kind, us)) {
            let targets = match kind {
                PieceKind::Knight => knight_attacks(from),
                PieceKind::Bishop => bishop_attacks(from, occ),
                PieceKind::Rook => rook_attacks(from, occ),
                PieceKind::Queen => queen_attacks(from, occ),
                _ => king_attacks(from),
            } & !own;

            for to in iter_bits(targets & enemy) {
                out.push(new_move(from, to, kind, victim_on(board, them, to), None, FLAG_CAPTURE));
            }
            if !captures_only {
                for to in iter_bits(targets & !occ) {
                    out.push(new_move(from, to, kind, None, None, FLAG_NONE));
                }
            }
        }
    }
}

fn pawn_moves(
    board: &Board,
    us: Color,
    enemy: u64,
    occ: u64,
    captures_only: bool,
    out: &mut Vec<Move>,
) {
    let them = !us;
    let ep_bb = board.ep().map_or(0, |sq| square_bb(sq as usize));
    let (start_rank, forward): (u64, i32) = match us {
        Color::White => (RANK_2, 8),
        Color::Black => (RANK_7, -8),
    };

    for from in iter_bits(board.piece_bb(PieceKind::Pawn, us)) {
        let attacks = pawn_attacks(us, from);
        for to in iter_bits(attacks & enemy) {
            push_pawn_move(from, to, us, victim_on(board, them, to), out);
        }
        if let Some(to) = iter_bits(attacks & ep_bb).next() {
            out.push(new_move(
                from,
                to,
                PieceKind::Pawn,
                Some(PieceKind::Pawn),
                None,
                FLAG_EN_PASSANT | FLAG_CAPTURE,
            ));
        }

        if captures_only {
            continue;
        }
        // Runtime push check; a pawn never stands on its last rank
        let one = (from as i32 + forward) as usize;
        if occ & square_bb(one) != 0 {
            continue;
        }
        push_pawn_move(from, one, us, None, out);
        if square_bb(from) & start_rank != 0 {
            let two = (one as i32 + forward) as usize;
            if occ & square_bb(two) == 0 {
                out.push(new_move(from, two, PieceKind::Pawn, None, None, FLAG_NONE));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::move_to_uci;

    #[test]
    fn en_passant_is_a_capture() {
        let mut board = Board::from_fen(
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        )
        .unwrap();
        let captures: Vec<String> = TableGenerator
            .legal_captures(&mut board)
            .into_iter()
            .map(move_to_uci)
            .collect();
        assert_eq!(captures, vec!["e5d6"]);
    }

    #[test]
    fn pinned_piece_moves_are_filtered() {
        // Knight on e2 pinned by the rook on e8
        let mut board = Board::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let mut pseudo = Vec::new();
        TableGenerator.pseudo_moves(&board, &mut pseudo);
        let legal = TableGenerator.legal_moves(&mut board);
        assert!(pseudo.len() > legal.len());
        assert!(legal.iter().all(|&mv| move_to_uci(mv).starts_with("e1")));
    }
}
