//! 对局状态机
//!
//! 持有棋盘、当前回合与对局结果。唯一的修改入口是走棋：
//! 先用 `rules` 校验，再落子、判断胜负、交换回合。

use crate::board::Board;
use crate::rules::{check_move, IllegalMove};
use crate::types::{Move, Outcome, Piece, PieceKind, Side, Square};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// 根据棋盘判断胜负：某方的将/帅不在棋盘上即告负
pub fn evaluate_outcome(board: &Board) -> Outcome {
    let mut red_general = false;
    let mut black_general = false;
    for (_, piece) in board.pieces() {
        match piece {
            Piece::RedGeneral => red_general = true,
            Piece::BlackGeneral => black_general = true,
            _ => {}
        }
    }

    if !red_general {
        Outcome::Won(Side::Black)
    } else if !black_general {
        Outcome::Won(Side::Red)
    } else {
        Outcome::Ongoing
    }
}

/// 对局状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameStateRecord")]
pub struct GameState {
    board: Board,
    turn: Side,
    outcome: Outcome,
}

/// 反序列化时的原始字段，校验后再转成 `GameState`
#[derive(Deserialize)]
struct GameStateRecord {
    board: Board,
    turn: Side,
    outcome: Outcome,
}

impl TryFrom<GameStateRecord> for GameState {
    type Error = String;

    fn try_from(record: GameStateRecord) -> Result<Self, Self::Error> {
        GameState::from_parts(record.board, record.turn, record.outcome)
    }
}

impl GameState {
    /// 新对局：标准开局，红方先走
    pub fn reset() -> GameState {
        GameState {
            board: Board::standard_layout(),
            turn: Side::Red,
            outcome: Outcome::Ongoing,
        }
    }

    /// 由各部分组装状态，结果必须与棋盘一致
    pub fn from_parts(board: Board, turn: Side, outcome: Outcome) -> Result<GameState, String> {
        // 一步最多吃掉一个将/帅
        if board.find_general(Side::Red).is_none() && board.find_general(Side::Black).is_none() {
            return Err("Both generals are missing".to_string());
        }
        let expected = evaluate_outcome(&board);
        if expected != outcome {
            return Err(format!(
                "Outcome '{}' does not match board, expected '{}'",
                outcome, expected
            ));
        }
        Ok(GameState {
            board,
            turn,
            outcome,
        })
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// 当前走子方；对局结束后停留在走出最后一步的一方
    #[inline]
    pub fn turn(&self) -> Side {
        self.turn
    }

    #[inline]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.outcome != Outcome::Ongoing
    }

    /// 原地走棋，成功时返回被吃的棋子
    ///
    /// 失败时状态不变。
    pub fn try_move(&mut self, mv: Move) -> Result<Option<Piece>, IllegalMove> {
        if let Outcome::Won(winner) = self.outcome {
            return Err(IllegalMove::GameOver(winner));
        }

        let piece = check_move(&self.board, self.turn, mv.from, mv.to)?;

        let captured = self.board.get(mv.to);
        self.board.set(mv.from, None);
        self.board.set(mv.to, Some(piece));

        self.outcome = evaluate_outcome(&self.board);
        match self.outcome {
            Outcome::Ongoing => self.turn = self.turn.opposite(),
            Outcome::Won(winner) => {
                info!("{} captured the {} general, {} wins", mv, winner.opposite(), winner)
            }
        }

        Ok(captured)
    }

    /// 走棋，返回新状态和是否成功
    ///
    /// 不修改 `self`；失败时返回的状态与原状态相同。
    pub fn apply_move(&self, from: Square, to: Square) -> (GameState, bool) {
        let mut next = self.clone();
        match next.try_move(Move::new(from, to)) {
            Ok(_) => (next, true),
            Err(e) => {
                debug!("rejected {}{} for {}: {}", from, to, self.turn, e);
                (self.clone(), false)
            }
        }
    }

    /// 被吃掉的棋子种类统计（相对开局缺少的棋子）
    pub fn missing_pieces(&self, side: Side) -> Vec<PieceKind> {
        let start = Board::standard_layout();
        let mut missing = Vec::new();
        for kind in PieceKind::ALL {
            let piece = Piece::new(side, kind);
            let initial = start.pieces().filter(|(_, p)| *p == piece).count();
            let current = self.board.pieces().filter(|(_, p)| *p == piece).count();
            for _ in current..initial {
                missing.push(kind);
            }
        }
        missing
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::reset()
    }
}
