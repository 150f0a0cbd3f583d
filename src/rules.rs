//! 走法合法性判定
//!
//! 给定棋盘、走子方和起止坐标，按棋子种类逐一校验走法。
//! 本模块只读棋盘，不做任何修改。
//!
//! 规则为简化版：不判断将军、困毙和长将，也没有飞将，
//! 只有将/帅被吃掉时对局才结束（见 `game` 模块）。

use crate::board::Board;
use crate::types::{Move, Piece, PieceKind, Side, Square};
use std::fmt;

/// 非法走法的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    /// 对局已结束
    GameOver(Side),
    /// 坐标越界
    OffBoard(Square),
    /// 起点没有棋子
    EmptySource(Square),
    /// 起点的棋子不属于走子方
    WrongSide(Square),
    /// 终点是己方棋子
    OwnPieceCapture(Square),
    /// 走法形状不符合该棋子
    BadGeometry(PieceKind),
    /// 直线路径上有阻挡
    PathBlocked,
    /// 蹩马腿或塞象眼
    LegBlocked(Square),
    /// 象过河
    CrossesRiver,
    /// 将/士出九宫
    OutsidePalace,
    /// 炮吃子时炮架数量不为 1
    NoScreen(usize),
}

impl fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalMove::GameOver(winner) => write!(f, "game is over, {} won", winner),
            IllegalMove::OffBoard(sq) => write!(f, "square {} is off the board", sq),
            IllegalMove::EmptySource(sq) => write!(f, "no piece on {}", sq),
            IllegalMove::WrongSide(sq) => write!(f, "piece on {} belongs to the opponent", sq),
            IllegalMove::OwnPieceCapture(sq) => write!(f, "cannot capture own piece on {}", sq),
            IllegalMove::BadGeometry(kind) => write!(f, "{} cannot move that way", kind),
            IllegalMove::PathBlocked => write!(f, "path is blocked"),
            IllegalMove::LegBlocked(sq) => write!(f, "blocked by piece on {}", sq),
            IllegalMove::CrossesRiver => write!(f, "elephant cannot cross the river"),
            IllegalMove::OutsidePalace => write!(f, "destination is outside the palace"),
            IllegalMove::NoScreen(n) => {
                write!(f, "cannon capture needs exactly one screen, found {}", n)
            }
        }
    }
}

impl std::error::Error for IllegalMove {}

/// 判断走法是否合法
#[inline]
pub fn is_legal(board: &Board, side: Side, from: Square, to: Square) -> bool {
    check_move(board, side, from, to).is_ok()
}

/// 校验走法，合法时返回走动的棋子，否则返回原因
pub fn check_move(
    board: &Board,
    side: Side,
    from: Square,
    to: Square,
) -> Result<Piece, IllegalMove> {
    if !to.is_valid() {
        return Err(IllegalMove::OffBoard(to));
    }
    if !from.is_valid() {
        return Err(IllegalMove::OffBoard(from));
    }

    let piece = board.get(from).ok_or(IllegalMove::EmptySource(from))?;
    if piece.side() != side {
        return Err(IllegalMove::WrongSide(from));
    }

    let target = board.get(to);
    if let Some(t) = target {
        if t.side() == side {
            return Err(IllegalMove::OwnPieceCapture(to));
        }
    }

    match piece.kind() {
        PieceKind::General => check_general(side, from, to),
        PieceKind::Advisor => check_advisor(side, from, to),
        PieceKind::Elephant => check_elephant(board, side, from, to),
        PieceKind::Horse => check_horse(board, from, to),
        PieceKind::Chariot => check_chariot(board, from, to),
        PieceKind::Cannon => check_cannon(board, from, to, target.is_some()),
        PieceKind::Soldier => check_soldier(side, from, to),
    }?;

    Ok(piece)
}

/// 列出某方所有合法走法
pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for (from, piece) in board.pieces() {
        if piece.side() == side {
            moves.extend(legal_moves_from(board, side, from));
        }
    }
    moves
}

/// 列出从某格出发的所有合法走法
pub fn legal_moves_from(board: &Board, side: Side, from: Square) -> Vec<Move> {
    (0..crate::board::SQUARE_COUNT)
        .map(Square::from_index)
        .filter(|to| is_legal(board, side, from, *to))
        .map(|to| Move::new(from, to))
        .collect()
}

fn check_general(side: Side, from: Square, to: Square) -> Result<(), IllegalMove> {
    let (dx, dy) = ((to.file - from.file).abs(), (to.rank - from.rank).abs());
    if dx + dy != 1 {
        return Err(IllegalMove::BadGeometry(PieceKind::General));
    }
    if !to.is_in_palace(side) {
        return Err(IllegalMove::OutsidePalace);
    }
    Ok(())
}

fn check_advisor(side: Side, from: Square, to: Square) -> Result<(), IllegalMove> {
    let (dx, dy) = ((to.file - from.file).abs(), (to.rank - from.rank).abs());
    if dx != 1 || dy != 1 {
        return Err(IllegalMove::BadGeometry(PieceKind::Advisor));
    }
    if !to.is_in_palace(side) {
        return Err(IllegalMove::OutsidePalace);
    }
    Ok(())
}

fn check_elephant(
    board: &Board,
    side: Side,
    from: Square,
    to: Square,
) -> Result<(), IllegalMove> {
    let (dx, dy) = (to.file - from.file, to.rank - from.rank);
    if dx.abs() != 2 || dy.abs() != 2 {
        return Err(IllegalMove::BadGeometry(PieceKind::Elephant));
    }
    if !to.is_on_own_side(side) {
        return Err(IllegalMove::CrossesRiver);
    }
    // 象眼
    let eye = from.offset(dx / 2, dy / 2);
    if board.has_piece(eye) {
        return Err(IllegalMove::LegBlocked(eye));
    }
    Ok(())
}

fn check_horse(board: &Board, from: Square, to: Square) -> Result<(), IllegalMove> {
    let (dx, dy) = (to.file - from.file, to.rank - from.rank);
    let leg = match (dx.abs(), dy.abs()) {
        (2, 1) => from.offset(dx.signum(), 0),
        (1, 2) => from.offset(0, dy.signum()),
        _ => return Err(IllegalMove::BadGeometry(PieceKind::Horse)),
    };
    // 马腿
    if board.has_piece(leg) {
        return Err(IllegalMove::LegBlocked(leg));
    }
    Ok(())
}

fn check_chariot(board: &Board, from: Square, to: Square) -> Result<(), IllegalMove> {
    match board.count_between(from, to) {
        None => Err(IllegalMove::BadGeometry(PieceKind::Chariot)),
        Some(0) => Ok(()),
        Some(_) => Err(IllegalMove::PathBlocked),
    }
}

fn check_cannon(
    board: &Board,
    from: Square,
    to: Square,
    capture: bool,
) -> Result<(), IllegalMove> {
    let between = board
        .count_between(from, to)
        .ok_or(IllegalMove::BadGeometry(PieceKind::Cannon))?;

    match (capture, between) {
        (true, 1) | (false, 0) => Ok(()),
        (true, n) => Err(IllegalMove::NoScreen(n)),
        (false, _) => Err(IllegalMove::PathBlocked),
    }
}

fn check_soldier(side: Side, from: Square, to: Square) -> Result<(), IllegalMove> {
    let (dx, dy) = (to.file - from.file, to.rank - from.rank);

    // 红兵向 rank 减小的方向走，黑卒相反
    let (forward, crossed) = match side {
        Side::Red => (-1, from.rank <= 4),
        Side::Black => (1, from.rank >= 5),
    };

    let advance = dx == 0 && dy == forward;
    let sideways = crossed && dx.abs() == 1 && dy == 0;
    if advance || sideways {
        Ok(())
    } else {
        Err(IllegalMove::BadGeometry(PieceKind::Soldier))
    }
}
