//! Xiangqi Rule Engine
//!
//! 中国象棋规则引擎 - 棋盘、走法校验、对局状态与存档
//!
//! 胜负只看将/帅是否被吃，不判断将军、困毙和长将。

pub mod ai;
pub mod board;
pub mod fen;
pub mod game;
pub mod rules;
pub mod server;
pub mod session;
pub mod test_positions;
pub mod types;

pub use ai::RandomAI;
pub use board::Board;
pub use fen::{parse_fen, to_fen, START_FEN};
pub use game::{evaluate_outcome, GameState};
pub use rules::{check_move, is_legal, legal_moves, legal_moves_from, IllegalMove};
pub use server::{Server, ServerConfig, ServerRequest, ServerResponse};
pub use session::{GameStore, JsonFileStore, MemoryStore, SessionManager};
pub use types::{Move, Outcome, Piece, PieceKind, Side, Square};
