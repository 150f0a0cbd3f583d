//! Xiangqi CLI
//!
//! 命令行界面，用于查看局面、列出合法走法和走棋
//!
//! 支持两种模式：
//! 1. 单次命令模式：每次执行一个命令
//! 2. Server 模式：长驻进程，通过 stdin/stdout 通信

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use xiangqi_rules::{
    legal_moves, legal_moves_from, parse_fen, test_positions, to_fen, GameState, Move, Outcome,
    Server, ServerConfig, ServerRequest, ServerResponse, Side, Square, START_FEN,
};

#[derive(Parser)]
#[command(name = "xiangqi")]
#[command(about = "Xiangqi rule engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 输出开局 FEN
    Start,

    /// 显示局面
    Show {
        /// FEN 字符串或命名局面（如 START）
        #[arg(long, default_value = START_FEN)]
        fen: String,
    },

    /// 获取合法走法
    Moves {
        /// FEN 字符串或命名局面
        #[arg(long, default_value = START_FEN)]
        fen: String,

        /// 只列出从该格出发的走法（如 b9）
        #[arg(long)]
        from: Option<String>,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 依次执行走法
    Play {
        /// 起始 FEN 字符串或命名局面
        #[arg(long, default_value = START_FEN)]
        fen: String,

        /// 走法列表（如 h7e7 h0g2）
        moves: Vec<String>,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 启动 server 模式（stdin/stdout 通信）
    Server {
        /// 存档目录，不指定时只保存在内存中
        #[arg(long)]
        store: Option<PathBuf>,

        /// 红方走完后由随机 AI 代走黑方
        #[arg(long)]
        auto_reply: bool,

        /// 随机种子
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Serialize)]
struct PlayResult {
    fen: String,
    turn: Side,
    outcome: Outcome,
    applied: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected: Option<String>,
}

/// 解析 FEN，也接受命名局面
fn load_state(fen: &str) -> Result<GameState, String> {
    let fen = test_positions::by_name(fen).unwrap_or(fen);
    parse_fen(fen)
}

fn exit_with(e: &str) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

fn print_state(state: &GameState) {
    print!("{}", state.board());
    match state.outcome() {
        Outcome::Ongoing => println!("Turn: {}", state.turn()),
        Outcome::Won(side) => println!("Game over: {} won", side),
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start => {
            println!("{}", START_FEN);
        }

        Commands::Show { fen } => match load_state(&fen) {
            Ok(state) => print_state(&state),
            Err(e) => exit_with(&e),
        },

        Commands::Moves { fen, from, json } => {
            let state = load_state(&fen).unwrap_or_else(|e| exit_with(&e));
            let moves: Vec<Move> = match from.as_deref() {
                Some(text) => {
                    let from = Square::from_notation(text)
                        .unwrap_or_else(|| exit_with(&format!("Invalid square: {}", text)));
                    legal_moves_from(state.board(), state.turn(), from)
                }
                None => legal_moves(state.board(), state.turn()),
            };
            let moves: Vec<String> = if state.is_over() {
                Vec::new()
            } else {
                moves.iter().map(|mv| mv.to_string()).collect()
            };

            if json {
                match serde_json::to_string_pretty(&moves) {
                    Ok(text) => println!("{}", text),
                    Err(e) => exit_with(&e.to_string()),
                }
            } else {
                println!("Legal moves ({}):", moves.len());
                for mv in &moves {
                    println!("  {}", mv);
                }
            }
        }

        Commands::Play { fen, moves, json } => {
            let mut state = load_state(&fen).unwrap_or_else(|e| exit_with(&e));
            let mut applied = Vec::new();
            let mut rejected = None;

            for text in &moves {
                let mv = match Move::from_notation(text) {
                    Some(mv) => mv,
                    None => exit_with(&format!("Invalid move string: {}", text)),
                };
                let (next, ok) = state.apply_move(mv.from, mv.to);
                if !ok {
                    rejected = Some(text.clone());
                    break;
                }
                applied.push(text.clone());
                state = next;
            }

            if json {
                let result = PlayResult {
                    fen: to_fen(&state),
                    turn: state.turn(),
                    outcome: state.outcome(),
                    applied,
                    rejected: rejected.clone(),
                };
                match serde_json::to_string_pretty(&result) {
                    Ok(text) => println!("{}", text),
                    Err(e) => exit_with(&e.to_string()),
                }
            } else {
                print_state(&state);
                println!("{}", to_fen(&state));
                if let Some(mv) = &rejected {
                    eprintln!("Illegal move: {}", mv);
                }
            }

            if rejected.is_some() {
                std::process::exit(1);
            }
        }

        Commands::Server {
            store,
            auto_reply,
            seed,
        } => {
            let config = ServerConfig {
                store_dir: store,
                auto_reply,
                seed,
            };
            match Server::new(config) {
                Ok(server) => run_server(&server),
                Err(e) => exit_with(&e),
            }
        }
    }
}

/// Server 模式主循环
/// 从 stdin 读取 JSON 请求，返回 JSON 响应到 stdout
fn run_server(server: &Server) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        // 空行跳过
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (response, quit) = match serde_json::from_str::<ServerRequest>(line) {
            Ok(request) => (server.handle(&request), request.is_quit()),
            Err(e) => (ServerResponse::error(&format!("Invalid JSON: {}", e)), false),
        };

        match serde_json::to_string(&response) {
            Ok(text) => println!("{}", text),
            Err(e) => println!("{{\"ok\":false,\"error\":{:?}}}", e.to_string()),
        }
        let _ = stdout.flush();

        if quit {
            break;
        }
    }
}
