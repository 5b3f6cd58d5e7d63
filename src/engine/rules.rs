//! Per-piece movement geometry.
//!
//! These predicates look only at the two squares involved. Occupancy and
//! obstruction are the board's business (`Position::path_clear`), and
//! castling is handled by the match controller.

use crate::engine::types::{Color, PieceType, Square};

#[inline]
fn deltas(src: Square, dst: Square) -> (i8, i8) {
    (
        dst.rank() as i8 - src.rank() as i8,
        dst.file() as i8 - src.file() as i8,
    )
}

#[inline]
fn knight(dr: i8, df: i8) -> bool {
    matches!((dr.abs(), df.abs()), (1, 2) | (2, 1))
}

#[inline]
fn bishop(dr: i8, df: i8) -> bool {
    dr != 0 && dr.abs() == df.abs()
}

#[inline]
fn rook(dr: i8, df: i8) -> bool {
    (dr == 0) != (df == 0)
}

#[inline]
fn king(dr: i8, df: i8) -> bool {
    dr.abs().max(df.abs()) == 1
}

/// Can a piece of `kind` step from `src` to an empty `dst`?
///
/// `moved` only changes the answer for pawns (no double step once moved).
pub fn can_move(kind: PieceType, color: Color, moved: bool, src: Square, dst: Square) -> bool {
    let (dr, df) = deltas(src, dst);
    match kind {
        PieceType::Pawn => {
            let fwd = color.forward();
            df == 0 && (dr == fwd || (!moved && dr == 2 * fwd))
        }
        PieceType::Knight => knight(dr, df),
        PieceType::Bishop => bishop(dr, df),
        PieceType::Rook => rook(dr, df),
        PieceType::Queen => bishop(dr, df) || rook(dr, df),
        PieceType::King => king(dr, df),
    }
}

/// Can a piece of `kind` on `src` take an enemy piece on `dst`?
pub fn can_capture(kind: PieceType, color: Color, src: Square, dst: Square) -> bool {
    match kind {
        PieceType::Pawn => {
            let (dr, df) = deltas(src, dst);
            dr == color.forward() && df.abs() == 1
        }
        // Everything else captures the way it moves; `moved` is irrelevant.
        _ => can_move(kind, color, true, src, dst),
    }
}

/// Squares strictly between `src` and `dst` on a shared rank, file or diagonal.
///
/// Empty when the two squares are not aligned or are adjacent.
pub fn between(src: Square, dst: Square) -> Vec<Square> {
    let (dr, df) = deltas(src, dst);
    if !(rook(dr, df) || bishop(dr, df)) {
        return Vec::new();
    }
    let (sr, sf) = (dr.signum(), df.signum());
    let steps = dr.abs().max(df.abs());
    (1..steps)
        .filter_map(|i| src.offset(sr * i, sf * i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(rank: u8, file: u8) -> Square {
        Square::new(rank, file)
    }

    #[test]
    fn knight_geometry() {
        let from = sq(4, 4);
        let targets: Vec<Square> = Square::all()
            .filter(|&to| can_move(PieceType::Knight, Color::White, false, from, to))
            .collect();
        assert_eq!(targets.len(), 8);
        assert!(targets.contains(&sq(2, 3)));
        assert!(targets.contains(&sq(5, 6)));
        assert!(!targets.contains(&sq(5, 5)));
    }

    #[test]
    fn bishop_geometry() {
        assert!(can_move(PieceType::Bishop, Color::Black, false, sq(0, 2), sq(5, 7)));
        assert!(!can_move(PieceType::Bishop, Color::Black, false, sq(0, 2), sq(0, 5)));
        assert!(!can_move(PieceType::Bishop, Color::Black, false, sq(3, 3), sq(3, 3)));
    }

    #[test]
    fn rook_geometry() {
        assert!(can_move(PieceType::Rook, Color::White, false, sq(7, 0), sq(2, 0)));
        assert!(can_move(PieceType::Rook, Color::White, false, sq(7, 0), sq(7, 6)));
        assert!(!can_move(PieceType::Rook, Color::White, false, sq(7, 0), sq(6, 1)));
        assert!(!can_move(PieceType::Rook, Color::White, false, sq(7, 0), sq(7, 0)));
    }

    #[test]
    fn queen_is_rook_or_bishop() {
        for to in Square::all() {
            let from = sq(3, 4);
            let expected = can_move(PieceType::Rook, Color::White, true, from, to)
                || can_move(PieceType::Bishop, Color::White, true, from, to);
            assert_eq!(can_move(PieceType::Queen, Color::White, true, from, to), expected);
        }
    }

    #[test]
    fn king_single_step() {
        let from = sq(4, 4);
        let count = Square::all()
            .filter(|&to| can_move(PieceType::King, Color::Black, false, from, to))
            .count();
        assert_eq!(count, 8);
        // Castling is not a king step.
        assert!(!can_move(PieceType::King, Color::Black, false, sq(0, 4), sq(0, 6)));
    }

    #[test]
    fn white_pawn_advances_toward_rank_zero() {
        let from = sq(6, 4);
        assert!(can_move(PieceType::Pawn, Color::White, false, from, sq(5, 4)));
        assert!(can_move(PieceType::Pawn, Color::White, false, from, sq(4, 4)));
        assert!(!can_move(PieceType::Pawn, Color::White, true, from, sq(4, 4)));
        assert!(!can_move(PieceType::Pawn, Color::White, false, from, sq(7, 4)));
        assert!(!can_move(PieceType::Pawn, Color::White, false, from, sq(5, 5)));
    }

    #[test]
    fn black_pawn_advances_toward_rank_seven() {
        let from = sq(1, 4);
        assert!(can_move(PieceType::Pawn, Color::Black, false, from, sq(2, 4)));
        assert!(can_move(PieceType::Pawn, Color::Black, false, from, sq(3, 4)));
        assert!(!can_move(PieceType::Pawn, Color::Black, false, from, sq(0, 4)));
        assert!(!can_move(PieceType::Pawn, Color::Black, false, from, sq(4, 4)));
    }

    #[test]
    fn pawn_capture_differs_from_move() {
        let from = sq(6, 4);
        assert!(can_capture(PieceType::Pawn, Color::White, from, sq(5, 3)));
        assert!(can_capture(PieceType::Pawn, Color::White, from, sq(5, 5)));
        assert!(!can_capture(PieceType::Pawn, Color::White, from, sq(5, 4)));
        assert!(!can_capture(PieceType::Pawn, Color::White, from, sq(7, 5)));
        assert!(!can_move(PieceType::Pawn, Color::White, false, from, sq(5, 5)));

        assert!(can_capture(PieceType::Pawn, Color::Black, sq(1, 0), sq(2, 1)));
        assert!(!can_capture(PieceType::Pawn, Color::Black, sq(1, 0), sq(0, 1)));
    }

    #[test]
    fn capture_matches_move_for_non_pawns() {
        let from = sq(3, 3);
        for kind in [
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
            PieceType::King,
        ] {
            for to in Square::all() {
                assert_eq!(
                    can_capture(kind, Color::Black, from, to),
                    can_move(kind, Color::Black, true, from, to),
                    "{kind} {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn predicates_are_pure() {
        for kind in PieceType::ALL {
            for to in Square::all() {
                let from = sq(4, 2);
                let a = can_move(kind, Color::White, false, from, to);
                let b = can_move(kind, Color::White, false, from, to);
                assert_eq!(a, b);
                assert_eq!(
                    can_capture(kind, Color::White, from, to),
                    can_capture(kind, Color::White, from, to)
                );
            }
        }
    }

    #[test]
    fn between_lines() {
        assert_eq!(between(sq(0, 0), sq(0, 3)), vec![sq(0, 1), sq(0, 2)]);
        assert_eq!(between(sq(5, 5), sq(2, 2)), vec![sq(4, 4), sq(3, 3)]);
        assert_eq!(between(sq(7, 4), sq(4, 4)), vec![sq(6, 4), sq(5, 4)]);
        assert!(between(sq(0, 0), sq(1, 1)).is_empty());
        assert!(between(sq(0, 0), sq(2, 1)).is_empty());
    }
}
