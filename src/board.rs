//! 象棋棋盘
//!
//! 使用定长数组存储 90 个格子，每格至多一个棋子。

use crate::types::{Piece, PieceKind, Side, Square, FILES, RANKS};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 格子总数 (10行 x 9列)
pub const SQUARE_COUNT: usize = (FILES as usize) * (RANKS as usize);

/// 底线棋子排列（从 a 列到 i 列）
const BACK_RANK: [PieceKind; 9] = [
    PieceKind::Chariot,
    PieceKind::Horse,
    PieceKind::Elephant,
    PieceKind::Advisor,
    PieceKind::General,
    PieceKind::Advisor,
    PieceKind::Elephant,
    PieceKind::Horse,
    PieceKind::Chariot,
];

lazy_static! {
    static ref STANDARD_LAYOUT: Board = build_standard_layout();
}

fn build_standard_layout() -> Board {
    let mut board = Board::empty();

    for (side, back, cannon, soldier) in [(Side::Black, 0, 2, 3), (Side::Red, 9, 7, 6)] {
        for (file, kind) in BACK_RANK.iter().enumerate() {
            board.set(Square::new(file as i8, back), Some(Piece::new(side, *kind)));
        }
        for file in [1, 7] {
            board.set(
                Square::new(file, cannon),
                Some(Piece::new(side, PieceKind::Cannon)),
            );
        }
        for file in (0..FILES).step_by(2) {
            board.set(
                Square::new(file, soldier),
                Some(Piece::new(side, PieceKind::Soldier)),
            );
        }
    }

    board
}

/// 棋盘
///
/// 序列化时使用 FEN 的棋子排布部分（见 `fen` 模块）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Board {
    squares: [Option<Piece>; SQUARE_COUNT],
}

impl Board {
    /// 空棋盘
    pub fn empty() -> Board {
        Board {
            squares: [None; SQUARE_COUNT],
        }
    }

    /// 标准开局：双方各 16 子
    pub fn standard_layout() -> Board {
        STANDARD_LAYOUT.clone()
    }

    /// 获取某格的棋子，越界视为空
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        if !sq.is_valid() {
            return None;
        }
        self.squares[sq.to_index()]
    }

    /// 写入某格，越界写入被忽略
    #[inline]
    pub(crate) fn set(&mut self, sq: Square, piece: Option<Piece>) {
        debug_assert!(sq.is_valid(), "set on off-board square {:?}", sq);
        if sq.is_valid() {
            self.squares[sq.to_index()] = piece;
        }
    }

    /// 检查某格是否有棋子
    #[inline]
    pub fn has_piece(&self, sq: Square) -> bool {
        self.get(sq).is_some()
    }

    /// 遍历所有棋子
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|piece| (Square::from_index(i), piece)))
    }

    /// 棋子数量，`side` 为 None 时统计双方
    pub fn count(&self, side: Option<Side>) -> usize {
        self.pieces()
            .filter(|(_, p)| side.map_or(true, |s| p.side() == s))
            .count()
    }

    /// 查找某方的将/帅
    pub fn find_general(&self, side: Side) -> Option<Square> {
        let general = Piece::new(side, PieceKind::General);
        self.pieces()
            .find(|(_, p)| *p == general)
            .map(|(sq, _)| sq)
    }

    /// 统计同一直线上两点之间（不含端点）的棋子数
    ///
    /// 两点不在同一行或同一列时返回 None。
    pub fn count_between(&self, from: Square, to: Square) -> Option<usize> {
        let squares: Vec<Square> = if from.file == to.file {
            let (lo, hi) = (from.rank.min(to.rank), from.rank.max(to.rank));
            ((lo + 1)..hi).map(|rank| Square::new(from.file, rank)).collect()
        } else if from.rank == to.rank {
            let (lo, hi) = (from.file.min(to.file), from.file.max(to.file));
            ((lo + 1)..hi).map(|file| Square::new(file, from.rank)).collect()
        } else {
            return None;
        };

        Some(squares.into_iter().filter(|sq| self.has_piece(*sq)).count())
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::standard_layout()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   a  b  c  d  e  f  g  h  i")?;
        for rank in 0..RANKS {
            write!(f, "{} ", rank)?;
            for file in 0..FILES {
                match self.get(Square::new(file, rank)) {
                    Some(piece) => write!(f, "{} ", piece.glyph())?,
                    None => write!(f, " · ")?,
                }
            }
            writeln!(f)?;
            if rank == 4 {
                writeln!(f, "  ~~~~~~~~~~~~~~~~~~~~~~~~~~")?;
            }
        }
        Ok(())
    }
}
