//! Value types shared by the whole rules engine.
//!
//! Coordinates, sides and pieces are small `Copy` values: copying a piece
//! never shares state with the original, and a coordinate is always on the
//! 8x8 grid once constructed.

use std::fmt;

/// Side to move / owner of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    White,
    Black,
}

impl Side {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }

    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Rank direction pawns of this side advance in.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }

    /// Rank index of this side's pieces in the initial setup.
    #[inline]
    pub const fn back_rank(self) -> u8 {
        match self {
            Side::White => 0,
            Side::Black => 7,
        }
    }

    #[inline]
    pub const fn pawn_start_rank(self) -> u8 {
        match self {
            Side::White => 1,
            Side::Black => 6,
        }
    }

    /// Rank a pawn of this side promotes on.
    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Side::White => 7,
            Side::Black => 0,
        }
    }

    /// Rank a pawn of this side must stand on to capture en passant.
    #[inline]
    pub const fn en_passant_rank(self) -> u8 {
        match self {
            Side::White => 4,
            Side::Black => 3,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    /// Material weight used by the static evaluation. The king weight only
    /// biases the search and is not a real material count.
    #[inline]
    pub const fn material_value(self) -> i32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight => 3,
            PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 1000,
        }
    }

    #[inline]
    pub const fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }

    /// Upper-case letter used in notation; pawns have none.
    pub const fn notation_letter(self) -> Option<char> {
        match self {
            PieceKind::Pawn => None,
            PieceKind::Knight => Some('N'),
            PieceKind::Bishop => Some('B'),
            PieceKind::Rook => Some('R'),
            PieceKind::Queen => Some('Q'),
            PieceKind::King => Some('K'),
        }
    }

    pub const fn fen_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_fen_char(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// Promotion choices in the order they are generated.
pub const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// A piece standing on a square.
///
/// `en_passant` is only ever set on a pawn that just made a double step;
/// `in_check` is only ever set on a king and is display bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
    pub moved: bool,
    pub en_passant: bool,
    pub in_check: bool,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceKind, side: Side) -> Self {
        Self {
            kind,
            side,
            moved: false,
            en_passant: false,
            in_check: false,
        }
    }

    #[inline]
    pub const fn with_moved(mut self) -> Self {
        self.moved = true;
        self
    }

    #[inline]
    pub fn is(&self, kind: PieceKind, side: Side) -> bool {
        self.kind == kind && self.side == side
    }

    /// Signed material value: White positive, Black negative.
    #[inline]
    pub const fn signed_value(&self) -> i32 {
        match self.side {
            Side::White => self.kind.material_value(),
            Side::Black => -self.kind.material_value(),
        }
    }

    pub const fn fen_char(&self) -> char {
        let c = self.kind.fen_char();
        match self.side {
            Side::White => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }

    pub fn from_fen_char(ch: char) -> Option<Self> {
        let side = if ch.is_ascii_uppercase() {
            Side::White
        } else if ch.is_ascii_lowercase() {
            Side::Black
        } else {
            return None;
        };
        PieceKind::from_fen_char(ch).map(|kind| Piece::new(kind, side))
    }
}

/// A square on the board: `file` 0 is the a-file, `rank` 0 is rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    file: u8,
    rank: u8,
}

impl Coordinate {
    /// Panics when either component lies outside `0..8`: an off-board
    /// coordinate is a caller bug, never a recoverable condition.
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Self {
        assert!(file < 8 && rank < 8, "coordinate out of bounds");
        Self { file, rank }
    }

    #[inline]
    pub fn try_new(file: i8, rank: i8) -> Option<Self> {
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Self {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    #[inline]
    pub const fn from_index(index: usize) -> Self {
        assert!(index < 64, "square index out of bounds");
        Self {
            file: (index % 8) as u8,
            rank: (index / 8) as u8,
        }
    }

    #[inline]
    pub const fn file(self) -> u8 {
        self.file
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// `0 == a1`, `7 == h1`, `63 == h8`.
    #[inline]
    pub const fn index(self) -> usize {
        self.rank as usize * 8 + self.file as usize
    }

    /// Step by `(d_file, d_rank)`; `None` when the result leaves the board.
    #[inline]
    pub fn offset(self, d_file: i8, d_rank: i8) -> Option<Self> {
        Self::try_new(self.file as i8 + d_file, self.rank as i8 + d_rank)
    }

    #[inline]
    pub fn is_light(self) -> bool {
        (self.file + self.rank) % 2 == 1
    }

    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..64).map(Coordinate::from_index)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            char::from(b'a' + self.file),
            char::from(b'1' + self.rank)
        )
    }
}
