//! FEN 解析和生成
//!
//! 对局状态的单行文本表示，供持久化与命令行使用。
//!
//! 格式: `<棋盘> <回合> <结果>`
//!
//! 棋盘从 rank 0（黑方底线）写到 rank 9（红方底线），行之间用 `/` 分隔：
//! - 红方：K(帅) A(仕) E(相) H(马) R(车) C(炮) P(兵)
//! - 黑方：k a e h r c p
//! - 空格：数字 (1-9)
//!
//! 回合为 `r` 或 `b`；结果为 `-`（进行中）、`r`（红胜）或 `b`（黑胜）。

use crate::board::Board;
use crate::game::GameState;
use crate::types::{Outcome, Piece, Side, Square, FILES, RANKS};

/// 标准开局
pub const START_FEN: &str =
    "rheakaehr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RHEAKAEHR r -";

/// 解析 FEN 字符串
pub fn parse_fen(fen: &str) -> Result<GameState, String> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(format!(
            "Invalid FEN format: expected '<board> <turn> <outcome>', got: {}",
            fen
        ));
    }

    let board = parse_placement(parts[0])?;
    let turn = single_char(parts[1])
        .and_then(Side::from_fen_char)
        .ok_or_else(|| format!("Invalid turn: {}", parts[1]))?;
    let outcome = single_char(parts[2])
        .and_then(Outcome::from_fen_char)
        .ok_or_else(|| format!("Invalid outcome: {}", parts[2]))?;

    GameState::from_parts(board, turn, outcome)
}

/// 生成 FEN 字符串
pub fn to_fen(state: &GameState) -> String {
    format!(
        "{} {} {}",
        placement_to_string(state.board()),
        state.turn().to_fen_char(),
        state.outcome().to_fen_char()
    )
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// 解析棋盘字符串
pub fn parse_placement(board_str: &str) -> Result<Board, String> {
    let rows: Vec<&str> = board_str.split('/').collect();
    if rows.len() != RANKS as usize {
        return Err(format!(
            "Invalid board: expected {} rows, got {}",
            RANKS,
            rows.len()
        ));
    }

    let mut board = Board::empty();

    for (rank, row_str) in rows.iter().enumerate() {
        let rank = rank as i8;
        let mut file: i8 = 0;

        for ch in row_str.chars() {
            if file >= FILES {
                return Err(format!("Row {} has more than {} columns", rank, FILES));
            }

            if let Some(n) = ch.to_digit(10) {
                if n == 0 {
                    return Err(format!("Invalid empty run in row {}", rank));
                }
                file += n as i8;
            } else {
                let piece =
                    Piece::from_fen_char(ch).ok_or_else(|| format!("Invalid piece char: {}", ch))?;
                board.set(Square::new(file, rank), Some(piece));
                file += 1;
            }
        }

        if file != FILES {
            return Err(format!(
                "Row {} has {} columns, expected {}",
                rank, file, FILES
            ));
        }
    }

    Ok(board)
}

/// 生成棋盘字符串
pub fn placement_to_string(board: &Board) -> String {
    let mut rows = Vec::with_capacity(RANKS as usize);

    for rank in 0..RANKS {
        let mut row_str = String::new();
        let mut empty_count = 0;

        for file in 0..FILES {
            match board.get(Square::new(file, rank)) {
                Some(piece) => {
                    if empty_count > 0 {
                        row_str.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    row_str.push(piece.to_fen_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            row_str.push_str(&empty_count.to_string());
        }

        rows.push(row_str);
    }

    rows.join("/")
}

impl TryFrom<String> for Board {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_placement(&value)
    }
}

impl From<Board> for String {
    fn from(board: Board) -> Self {
        placement_to_string(&board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    #[test]
    fn test_start_fen_matches_layout() {
        let state = parse_fen(START_FEN).unwrap();
        assert_eq!(state, GameState::reset());
        assert_eq!(to_fen(&GameState::reset()), START_FEN);
    }

    #[test]
    fn test_parse_placement() {
        let board = parse_placement("r3k4/9/9/9/9/P8/9/9/9/C3K4").unwrap();
        assert_eq!(board.count(None), 5);
        assert_eq!(board.get(Square::new(0, 0)), Some(Piece::BlackChariot));
        assert_eq!(board.get(Square::new(4, 0)), Some(Piece::BlackGeneral));
        assert_eq!(board.get(Square::new(0, 5)), Some(Piece::RedSoldier));
        assert_eq!(
            board.get(Square::new(0, 9)).map(|p| p.kind()),
            Some(PieceKind::Cannon)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_fen("9/9 r -").is_err());
        assert!(parse_fen(START_FEN.trim_end_matches(" -")).is_err());
        assert!(parse_placement("rheakaehr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RHEAKAEH").is_err());
        assert!(parse_placement("rheakaehrr/9/9/9/9/9/9/9/9/4K4").is_err());
        assert!(parse_placement("4k4/9/9/9/9/9/9/9/9/4X4").is_err());
        assert!(parse_placement("4k4/9/9/9/9/9/9/9/9/04K4").is_err());
        assert!(parse_fen("4k4/9/9/9/9/9/9/9/9/4K4 x -").is_err());
        assert!(parse_fen("4k4/9/9/9/9/9/9/9/9/4K4 r ?").is_err());
        assert!(parse_fen("4k4/9/9/9/9/9/9/9/9/4K4 rb -").is_err());
    }

    #[test]
    fn test_outcome_must_match_board() {
        // 黑将已不在棋盘上，结果必须是红胜
        assert!(parse_fen("9/9/9/9/9/9/9/9/9/4K4 r -").is_err());
        let state = parse_fen("9/9/9/9/9/9/9/9/9/4K4 r r").unwrap();
        assert_eq!(state.outcome(), Outcome::Won(Side::Red));
        // 双将都在时不能标记为结束
        assert!(parse_fen("4k4/9/9/9/9/9/9/9/9/4K4 b b").is_err());
    }

    #[test]
    fn test_fen_roundtrip() {
        let fen = "r3k4/9/9/9/9/P8/9/9/9/C3K4 b -";
        let state = parse_fen(fen).unwrap();
        assert_eq!(state.turn(), Side::Black);
        assert_eq!(to_fen(&state), fen);
    }
}
