//! Server 模式请求处理
//!
//! 每行一个 JSON 请求，返回一个 JSON 响应。界面层（网页、终端等）
//! 通过它读取局面、提交走法；状态由 `SessionManager` 加载和保存。

use crate::ai::RandomAI;
use crate::fen::to_fen;
use crate::game::GameState;
use crate::rules::legal_moves;
use crate::session::{GameStore, JsonFileStore, MemoryStore, SessionManager};
use crate::types::{Move, Outcome, Side};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// 默认会话 ID
pub const DEFAULT_SESSION: &str = "default";

/// Server 配置
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// 存档目录，None 时只保存在内存中
    pub store_dir: Option<PathBuf>,
    /// 红方走完后由随机 AI 代走黑方
    pub auto_reply: bool,
    /// 随机种子
    pub seed: Option<u64>,
}

fn default_session() -> String {
    DEFAULT_SESSION.to_string()
}

/// 请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRequest {
    pub cmd: String,
    #[serde(default = "default_session")]
    pub session: String,
    #[serde(default)]
    pub mv: Option<String>,
}

impl ServerRequest {
    /// 结束 server 循环的请求
    pub fn is_quit(&self) -> bool {
        self.cmd == "quit"
    }
}

/// 响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    pub ok: bool,
    /// 走法是否被接受（仅 move 命令）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_moves: Option<Vec<String>>,
    /// AI 代走的一步
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerResponse {
    fn state(state: &GameState) -> Self {
        Self {
            ok: true,
            fen: Some(to_fen(state)),
            turn: Some(state.turn()),
            outcome: Some(state.outcome()),
            ..Default::default()
        }
    }

    fn moved(state: &GameState, success: bool, reply: Option<Move>) -> Self {
        Self {
            success: Some(success),
            reply: reply.map(|mv| mv.to_string()),
            ..Self::state(state)
        }
    }

    /// 对局结束后没有可走的步
    fn with_legal_moves(state: &GameState) -> Self {
        let moves = if state.is_over() {
            Vec::new()
        } else {
            legal_moves(state.board(), state.turn())
                .iter()
                .map(|mv| mv.to_string())
                .collect()
        };
        Self {
            legal_moves: Some(moves),
            ..Self::state(state)
        }
    }

    pub fn error(msg: &str) -> Self {
        Self {
            ok: false,
            error: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

/// 请求处理器
pub struct Server {
    sessions: SessionManager,
    ai: Mutex<RandomAI>,
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Result<Self, String> {
        let store: Box<dyn GameStore> = match &config.store_dir {
            Some(dir) => {
                info!("storing games under {}", dir.display());
                Box::new(JsonFileStore::new(dir)?)
            }
            None => Box::new(MemoryStore::new()),
        };
        Ok(Server {
            sessions: SessionManager::new(store),
            ai: Mutex::new(RandomAI::new(config.seed)),
            config,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// 处理一个请求
    pub fn handle(&self, request: &ServerRequest) -> ServerResponse {
        debug!("request {:?}", request);
        let result = match request.cmd.as_str() {
            "reset" => self
                .sessions
                .reset(&request.session)
                .map(|state| ServerResponse::state(&state)),
            "state" => self
                .sessions
                .state(&request.session)
                .map(|state| ServerResponse::state(&state)),
            "moves" => self
                .sessions
                .state(&request.session)
                .map(|state| ServerResponse::with_legal_moves(&state)),
            "move" => self.handle_move(request),
            "quit" => Ok(ServerResponse {
                ok: true,
                ..Default::default()
            }),
            _ => Err(format!("Unknown command: {}", request.cmd)),
        };

        result.unwrap_or_else(|e| ServerResponse::error(&e))
    }

    /// 处理一行文本请求
    pub fn handle_line(&self, line: &str) -> ServerResponse {
        match serde_json::from_str::<ServerRequest>(line) {
            Ok(request) => self.handle(&request),
            Err(e) => ServerResponse::error(&format!("Invalid JSON: {}", e)),
        }
    }

    fn handle_move(&self, request: &ServerRequest) -> Result<ServerResponse, String> {
        let text = request.mv.as_deref().ok_or("Missing field: mv")?;
        let mv = Move::from_notation(text).ok_or_else(|| format!("Invalid move string: {}", text))?;

        let auto_reply = self.config.auto_reply;

        let (state, (success, reply)) = self.sessions.transact(&request.session, |state| {
            let (next, ok) = state.apply_move(mv.from, mv.to);
            if !ok || !auto_reply || next.is_over() || next.turn() != Side::Black {
                return (next, (ok, None));
            }
            let mut ai = self.ai.lock().unwrap_or_else(PoisonError::into_inner);
            match ai.play(&next) {
                Some((replied, reply)) => (replied, (true, Some(reply))),
                None => (next, (true, None)),
            }
        })?;

        Ok(ServerResponse::moved(&state, success, reply))
    }
}
