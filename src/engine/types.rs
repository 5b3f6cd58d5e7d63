use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Rank delta of a pawn step. White advances toward rank 0, Black toward rank 7.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Rank holding this side's King and Rooks at the start.
    #[inline]
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Rank on which this side's pawns promote.
    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Rank a pawn of this side lands on when capturing en passant.
    #[inline]
    pub const fn en_passant_rank(self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 5,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// All piece types in order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Knights and Kings jump; everything else needs an open path.
    #[inline]
    pub const fn floats(self) -> bool {
        matches!(self, PieceType::Knight | PieceType::King)
    }

    /// Single uppercase letter for white, lowercase for black.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Unicode chess glyph. Black glyphs sit six code points after white ones.
    pub fn glyph(self, color: Color) -> char {
        let white = match self {
            PieceType::King => 0x2654,
            PieceType::Queen => 0x2655,
            PieceType::Rook => 0x2656,
            PieceType::Bishop => 0x2657,
            PieceType::Knight => 0x2658,
            PieceType::Pawn => 0x2659,
        };
        let offset = match color {
            Color::White => 0,
            Color::Black => 6,
        };
        char::from_u32(white + offset).unwrap_or('?')
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A piece as it sits on the board. `moved` only matters for pawns, rooks and kings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
    pub moved: bool,
}

impl Piece {
    /// A piece that has never moved.
    pub const fn new(kind: PieceType, color: Color) -> Self {
        Piece {
            kind,
            color,
            moved: false,
        }
    }

    #[inline]
    pub fn glyph(self) -> char {
        self.kind.glyph(self.color)
    }
}

// ---------------------------------------------------------------------------
// Promotion
// ---------------------------------------------------------------------------

/// Kinds a pawn may promote to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Promotion {
    Knight,
    Bishop,
    Rook,
    Queen,
}

impl Promotion {
    pub fn piece_type(self) -> PieceType {
        match self {
            Promotion::Knight => PieceType::Knight,
            Promotion::Bishop => PieceType::Bishop,
            Promotion::Rook => PieceType::Rook,
            Promotion::Queen => PieceType::Queen,
        }
    }

    /// Parse `n`, `b`, `r` or `q` (either case).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'n' => Some(Promotion::Knight),
            'b' => Some(Promotion::Bishop),
            'r' => Some(Promotion::Rook),
            'q' => Some(Promotion::Queen),
            _ => None,
        }
    }
}

impl From<Promotion> for PieceType {
    fn from(p: Promotion) -> Self {
        p.piece_type()
    }
}

impl fmt::Display for Promotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.piece_type())
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square as (rank, file), both in 0..8. Rank 0 is Black's back rank.
///
/// The fields are private so every square that reaches the grid is on the
/// board; deserialization goes through the same range check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSquare")]
pub struct Square {
    rank: u8,
    file: u8,
}

/// Unchecked wire form of a `Square`.
#[derive(Deserialize)]
struct RawSquare {
    rank: u8,
    file: u8,
}

impl TryFrom<RawSquare> for Square {
    type Error = ChessError;

    fn try_from(raw: RawSquare) -> Result<Self, Self::Error> {
        if raw.rank < 8 && raw.file < 8 {
            Ok(Square {
                rank: raw.rank,
                file: raw.file,
            })
        } else {
            Err(ChessError::InvalidSquare(format!("({}, {})", raw.rank, raw.file)))
        }
    }
}

impl Square {
    #[inline]
    pub fn new(rank: u8, file: u8) -> Self {
        debug_assert!(rank < 8 && file < 8, "square out of range: ({rank}, {file})");
        Square { rank, file }
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self.rank
    }

    #[inline]
    pub const fn file(self) -> u8 {
        self.file
    }

    /// Checked constructor for signed coordinates.
    #[inline]
    pub fn try_new(rank: i8, file: i8) -> Option<Self> {
        if (0..8).contains(&rank) && (0..8).contains(&file) {
            Some(Square {
                rank: rank as u8,
                file: file as u8,
            })
        } else {
            None
        }
    }

    /// The square `dr` ranks and `df` files away, if still on the board.
    #[inline]
    pub fn offset(self, dr: i8, df: i8) -> Option<Self> {
        Square::try_new(self.rank as i8 + dr, self.file as i8 + df)
    }

    /// All 64 squares, rank 0 first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square { rank, file }))
    }

    /// Parse algebraic notation like "e4". Rank 0 is "8", rank 7 is "1".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].wrapping_sub(b'a');
        let row = bytes[1].wrapping_sub(b'1');
        if file < 8 && row < 8 {
            Some(Square::new(7 - row, file))
        } else {
            None
        }
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.file) as char;
        let rank = (b'8' - self.rank) as char;
        format!("{file}{rank}")
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

// ---------------------------------------------------------------------------
// MoveKind
// ---------------------------------------------------------------------------

/// The shape of a committed move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveKind {
    Normal,
    Capture,
    Castle { queenside: bool },
    EnPassant,
}

impl MoveKind {
    pub fn is_capture(self) -> bool {
        matches!(self, MoveKind::Capture | MoveKind::EnPassant)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// State of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    InProgress,
    Win(Color),
    DrawFiftyMove,
    DrawRepetition,
    DrawStalemate,
}

impl Outcome {
    pub fn as_str(&self) -> &str {
        match self {
            Outcome::InProgress => "in_progress",
            Outcome::Win(Color::White) => "white_wins",
            Outcome::Win(Color::Black) => "black_wins",
            Outcome::DrawFiftyMove => "fifty_move_rule",
            Outcome::DrawRepetition => "threefold_repetition",
            Outcome::DrawStalemate => "stalemate",
        }
    }

    pub fn is_over(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Broken invariants and bad external input.
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("no {0} king on the board")]
    MissingKing(Color),

    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Reasons a proposed move is refused. The message is shown to the player as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("no piece at source")]
    NoPiece,

    #[error("not your piece")]
    NotYourPiece,

    #[error("cannot capture own piece")]
    OwnPiece,

    #[error("this piece cannot move that way")]
    BadGeometry,

    #[error("another piece is in the way")]
    Blocked,

    #[error("move would leave your king in check")]
    SelfCheck,

    #[error("choose a piece to promote to")]
    PromotionRequired,

    #[error("the match is over: {0}")]
    MatchOver(Outcome),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_toggle() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(!Color::Black, Color::White);
    }

    #[test]
    fn color_orientation() {
        assert_eq!(Color::White.forward(), -1);
        assert_eq!(Color::Black.forward(), 1);
        assert_eq!(Color::White.back_rank(), 7);
        assert_eq!(Color::Black.back_rank(), 0);
        assert_eq!(Color::White.promotion_rank(), 0);
        assert_eq!(Color::Black.promotion_rank(), 7);
    }

    #[test]
    fn glyphs_distinguish_color_and_kind() {
        assert_eq!(PieceType::King.glyph(Color::White), '♔');
        assert_eq!(PieceType::Pawn.glyph(Color::White), '♙');
        assert_eq!(PieceType::King.glyph(Color::Black), '♚');
        assert_eq!(PieceType::Pawn.glyph(Color::Black), '♟');

        let mut seen = std::collections::HashSet::new();
        for color in [Color::White, Color::Black] {
            for pt in PieceType::ALL {
                assert!(seen.insert(pt.glyph(color)));
            }
        }
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn floating_pieces() {
        assert!(PieceType::Knight.floats());
        assert!(PieceType::King.floats());
        assert!(!PieceType::Queen.floats());
        assert!(!PieceType::Pawn.floats());
    }

    #[test]
    fn promotion_parsing() {
        assert_eq!(Promotion::from_char('q'), Some(Promotion::Queen));
        assert_eq!(Promotion::from_char('N'), Some(Promotion::Knight));
        assert_eq!(Promotion::from_char('k'), None);
        assert_eq!(PieceType::from(Promotion::Rook), PieceType::Rook);
    }

    #[test]
    fn square_algebraic_orientation() {
        // Black's back rank is rank 0, printed as "8".
        assert_eq!(Square::from_algebraic("a8"), Some(Square::new(0, 0)));
        assert_eq!(Square::from_algebraic("h1"), Some(Square::new(7, 7)));
        assert_eq!(Square::from_algebraic("e2"), Some(Square::new(6, 4)));
        assert_eq!(Square::new(1, 4).to_algebraic(), "e7");
    }

    #[test]
    fn square_algebraic_invalid() {
        assert_eq!(Square::from_algebraic(""), None);
        assert_eq!(Square::from_algebraic("a9"), None);
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("abc"), None);
    }

    #[test]
    fn square_offset_stays_on_board() {
        let corner = Square::new(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(1, 2), Some(Square::new(1, 2)));
        assert_eq!(Square::new(7, 7).offset(0, 1), None);
    }

    #[test]
    fn square_deserialize_checks_range() {
        let sq: Square = serde_json::from_str(r#"{"rank":1,"file":4}"#).unwrap();
        assert_eq!(sq, Square::new(1, 4));
        assert_eq!((sq.rank(), sq.file()), (1, 4));

        let err = serde_json::from_str::<Square>(r#"{"rank":9,"file":0}"#).unwrap_err();
        assert!(err.to_string().contains("invalid square notation: (9, 0)"));
        assert!(serde_json::from_str::<Square>(r#"{"rank":0,"file":8}"#).is_err());
        assert!(serde_json::from_str::<Square>(r#"{"rank":-1,"file":0}"#).is_err());
    }

    #[test]
    fn all_squares() {
        let squares: Vec<Square> = Square::all().collect();
        assert_eq!(squares.len(), 64);
        assert_eq!(squares[0], Square::new(0, 0));
        assert_eq!(squares[9], Square::new(1, 1));
        assert_eq!(squares[63], Square::new(7, 7));
    }

    #[test]
    fn outcome_strings() {
        assert_eq!(Outcome::InProgress.as_str(), "in_progress");
        assert_eq!(Outcome::Win(Color::Black).as_str(), "black_wins");
        assert!(Outcome::DrawStalemate.is_over());
        assert!(!Outcome::InProgress.is_over());
    }

    #[test]
    fn move_error_messages() {
        assert_eq!(MoveError::NoPiece.to_string(), "no piece at source");
        assert_eq!(MoveError::OwnPiece.to_string(), "cannot capture own piece");
        assert_eq!(
            MoveError::MatchOver(Outcome::DrawRepetition).to_string(),
            "the match is over: threefold_repetition"
        );
    }
}
