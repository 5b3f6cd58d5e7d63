//! Mailbox chess position.
//!
//! `Position` is an 8×8 grid of optional pieces indexed by (rank, file). It
//! answers occupancy and obstruction queries and offers the raw execution
//! primitives the match controller commits moves with. None of the
//! primitives check legality.

use std::fmt;

use crate::engine::rules;
use crate::engine::types::{ChessError, Color, Piece, PieceType, Promotion, Square};

/// Back-rank layout shared by both sides, file 0 first.
const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// File the King starts on.
pub const KING_FILE: u8 = 4;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A chess position: each square holds at most one piece.
///
/// `Clone` is a deep copy, so a clone can be mutated freely to test a move
/// before it is played for real.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    cells: [[Option<Piece>; 8]; 8],
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

impl Position {
    /// Create an empty board with no pieces.
    pub fn empty() -> Self {
        Position {
            cells: [[None; 8]; 8],
        }
    }

    /// Standard starting position. Black occupies ranks 0 and 1.
    pub fn starting() -> Self {
        let mut pos = Position::empty();
        for file in 0..8u8 {
            let kind = BACK_RANK[file as usize];
            pos.put(Square::new(0, file), Piece::new(kind, Color::Black));
            pos.put(Square::new(1, file), Piece::new(PieceType::Pawn, Color::Black));
            pos.put(Square::new(6, file), Piece::new(PieceType::Pawn, Color::White));
            pos.put(Square::new(7, file), Piece::new(kind, Color::White));
        }
        pos
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    /// Place a piece on a square, replacing whatever was there.
    #[inline]
    pub fn put(&mut self, sq: Square, piece: Piece) {
        self.cells[sq.rank() as usize][sq.file() as usize] = Some(piece);
    }

    /// Take the piece off a square.
    #[inline]
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.cells[sq.rank() as usize][sq.file() as usize].take()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.rank() as usize][sq.file() as usize]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    #[inline]
    pub fn color_at(&self, sq: Square) -> Option<Color> {
        self.piece_at(sq).map(|p| p.color)
    }

    #[inline]
    pub fn is_pawn(&self, sq: Square) -> bool {
        self.is_kind(sq, PieceType::Pawn)
    }

    #[inline]
    pub fn is_king(&self, sq: Square) -> bool {
        self.is_kind(sq, PieceType::King)
    }

    #[inline]
    fn is_kind(&self, sq: Square, kind: PieceType) -> bool {
        self.piece_at(sq).is_some_and(|p| p.kind == kind)
    }

    /// Every piece of `color` with its square, rank 0 first.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| {
            self.piece_at(sq)
                .filter(|p| p.color == color)
                .map(|p| (sq, p))
        })
    }

    /// Locate the King of `color`.
    pub fn king_square(&self, color: Color) -> Result<Square, ChessError> {
        self.pieces(color)
            .find(|(_, p)| p.kind == PieceType::King)
            .map(|(sq, _)| sq)
            .ok_or(ChessError::MissingKing(color))
    }

    // -----------------------------------------------------------------------
    // Obstruction and attack detection
    // -----------------------------------------------------------------------

    /// Are all squares strictly between `src` and `dst` empty?
    pub fn path_clear(&self, src: Square, dst: Square) -> bool {
        rules::between(src, dst)
            .into_iter()
            .all(|sq| self.is_empty(sq))
    }

    /// Could the piece on `src` take whatever stands on `target`?
    ///
    /// Geometry plus obstruction; the target's color is not looked at.
    fn reaches(&self, src: Square, piece: Piece, target: Square) -> bool {
        rules::can_capture(piece.kind, piece.color, src, target)
            && (piece.kind.floats() || self.path_clear(src, target))
    }

    /// Non-King pieces of `by` that could capture on `target`.
    pub fn threats(&self, target: Square, by: Color) -> Vec<Square> {
        self.pieces(by)
            .filter(|&(src, p)| p.kind != PieceType::King && self.reaches(src, p, target))
            .map(|(src, _)| src)
            .collect()
    }

    /// Is `target` covered by any piece of `by`, the King included?
    pub fn is_attacked(&self, target: Square, by: Color) -> bool {
        self.pieces(by).any(|(src, p)| self.reaches(src, p, target))
    }

    /// Pieces currently threatening the King of `color`.
    pub fn king_threats(&self, color: Color) -> Result<Vec<Square>, ChessError> {
        let king = self.king_square(color)?;
        Ok(self.threats(king, !color))
    }

    // -----------------------------------------------------------------------
    // Castling eligibility
    // -----------------------------------------------------------------------

    /// Squares of the King and castling Rook for one side: (king, rook).
    pub fn castle_home(color: Color, queenside: bool) -> (Square, Square) {
        let rank = color.back_rank();
        let rook_file = if queenside { 0 } else { 7 };
        (Square::new(rank, KING_FILE), Square::new(rank, rook_file))
    }

    /// King and Rook unmoved on their home squares with nothing between them.
    ///
    /// Whether the King would cross an attacked square is left to the caller.
    pub fn can_castle(&self, color: Color, queenside: bool) -> bool {
        let (king_sq, rook_sq) = Self::castle_home(color, queenside);
        let unmoved = |sq: Square, kind: PieceType| {
            self.piece_at(sq)
                .is_some_and(|p| p.kind == kind && p.color == color && !p.moved)
        };
        unmoved(king_sq, PieceType::King)
            && unmoved(rook_sq, PieceType::Rook)
            && self.path_clear(king_sq, rook_sq)
    }

    // -----------------------------------------------------------------------
    // Execution primitives
    // -----------------------------------------------------------------------

    /// Move whatever is on `src` to `dst`, overwriting `dst`.
    pub fn execute_move(&mut self, src: Square, dst: Square) {
        if let Some(mut piece) = self.remove(src) {
            piece.moved = true;
            self.put(dst, piece);
        }
    }

    /// Pawn capture en passant: the taken pawn sits one rank behind `dst`.
    pub fn execute_en_passant(&mut self, src: Square, dst: Square) {
        self.execute_move(src, dst);
        if let Some(color) = self.color_at(dst) {
            if let Some(taken) = dst.offset(-color.forward(), 0) {
                self.remove(taken);
            }
        }
    }

    /// King two files toward the chosen Rook, Rook onto the skipped square.
    pub fn execute_castle(&mut self, color: Color, queenside: bool) {
        let (king_sq, rook_sq) = Self::castle_home(color, queenside);
        let rank = color.back_rank();
        let (king_to, rook_to) = if queenside { (2, 3) } else { (6, 5) };
        self.execute_move(king_sq, Square::new(rank, king_to));
        self.execute_move(rook_sq, Square::new(rank, rook_to));
    }

    /// Replace the piece on `sq` with a freshly promoted one of the same color.
    pub fn promote(&mut self, sq: Square, kind: Promotion) {
        if let Some(color) = self.color_at(sq) {
            self.put(
                sq,
                Piece {
                    kind: kind.piece_type(),
                    color,
                    moved: true,
                },
            );
        }
    }

    // -----------------------------------------------------------------------
    // Encodings
    // -----------------------------------------------------------------------

    /// Canonical 64-character encoding, rank 0 first: `' '` for an empty
    /// square, otherwise the piece glyph. Equal snapshots mean equal
    /// placement regardless of history.
    pub fn snapshot(&self) -> String {
        Square::all()
            .map(|sq| self.piece_at(sq).map_or(' ', Piece::glyph))
            .collect()
    }

    /// Render the board as an 8-line string (rank 0 at top), useful for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in 0..8u8 {
            s.push((b'8' - rank) as char);
            s.push(' ');
            for file in 0..8u8 {
                let ch = match self.piece_at(Square::new(rank, file)) {
                    Some(p) => p.kind.to_char(p.color),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
