//! 对局持久化
//!
//! 规则引擎本身无状态，每次请求都要 加载 → 走棋 → 保存。
//! `GameStore` 负责存取，`SessionManager` 为同一局加锁，
//! 保证同一局的请求依次执行，不同局之间互不阻塞。

use crate::game::GameState;
use crate::types::Square;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// 会话 ID 最大长度
pub const MAX_SESSION_ID_LEN: usize = 64;

/// 对局存储
pub trait GameStore: Send + Sync {
    /// 读取对局，不存在时返回 None
    fn load(&self, session: &str) -> Result<Option<GameState>, String>;

    /// 保存对局，覆盖旧状态
    fn save(&self, session: &str, state: &GameState) -> Result<(), String>;

    /// 删除对局，不存在时不报错
    fn remove(&self, session: &str) -> Result<(), String>;
}

/// 校验会话 ID：1-64 个字母、数字、`_` 或 `-`
pub fn validate_session_id(session: &str) -> Result<(), String> {
    if session.is_empty() || session.len() > MAX_SESSION_ID_LEN {
        return Err(format!(
            "Invalid session id length {}, expected 1-{}",
            session.len(),
            MAX_SESSION_ID_LEN
        ));
    }
    if !session
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(format!("Invalid session id: {:?}", session));
    }
    Ok(())
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: Mutex<HashMap<String, GameState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    fn load(&self, session: &str) -> Result<Option<GameState>, String> {
        let games = self.games.lock().map_err(|_| "Memory store lock poisoned")?;
        Ok(games.get(session).cloned())
    }

    fn save(&self, session: &str, state: &GameState) -> Result<(), String> {
        let mut games = self.games.lock().map_err(|_| "Memory store lock poisoned")?;
        games.insert(session.to_string(), state.clone());
        Ok(())
    }

    fn remove(&self, session: &str) -> Result<(), String> {
        let mut games = self.games.lock().map_err(|_| "Memory store lock poisoned")?;
        games.remove(session);
        Ok(())
    }
}

/// JSON 文件存储，每局一个 `<dir>/<session>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// 打开存储目录，不存在时创建
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, String> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| format!("Cannot create store dir {}: {}", dir.display(), e))?;
        Ok(JsonFileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, session: &str) -> Result<PathBuf, String> {
        validate_session_id(session)?;
        Ok(self.dir.join(format!("{}.json", session)))
    }
}

impl GameStore for JsonFileStore {
    fn load(&self, session: &str) -> Result<Option<GameState>, String> {
        let path = self.path(session)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("Cannot read {}: {}", path.display(), e)),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| format!("Corrupt game file {}: {}", path.display(), e))
    }

    fn save(&self, session: &str, state: &GameState) -> Result<(), String> {
        let path = self.path(session)?;
        let text = serde_json::to_string_pretty(state)
            .map_err(|e| format!("Cannot serialize game state: {}", e))?;

        // 先写临时文件再改名，避免留下写了一半的文件
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(|e| format!("Cannot write {}: {}", tmp.display(), e))?;
        fs::rename(&tmp, &path).map_err(|e| format!("Cannot replace {}: {}", path.display(), e))
    }

    fn remove(&self, session: &str) -> Result<(), String> {
        let path = self.path(session)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("Cannot remove {}: {}", path.display(), e)),
        }
    }
}

/// 会话管理：按会话加锁执行 加载 → 修改 → 保存
pub struct SessionManager {
    store: Box<dyn GameStore>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionManager {
    pub fn new(store: Box<dyn GameStore>) -> Self {
        SessionManager {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// 使用内存存储
    pub fn in_memory() -> Self {
        SessionManager::new(Box::new(MemoryStore::new()))
    }

    fn session_lock(&self, session: &str) -> Result<Arc<Mutex<()>>, String> {
        let mut locks = self.locks.lock().map_err(|_| "Session table lock poisoned")?;
        Ok(locks
            .entry(session.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    /// 没有其他请求持有或等待该锁时，从表中移除
    fn release_lock(&self, session: &str, lock: &Arc<Mutex<()>>) {
        let Ok(mut locks) = self.locks.lock() else {
            return;
        };
        let ours = locks
            .get(session)
            .map_or(false, |held| Arc::ptr_eq(held, lock));
        // 表里一份，当前调用一份
        if ours && Arc::strong_count(lock) == 2 {
            locks.remove(session);
        }
    }

    /// 在会话锁内执行 `f`
    fn with_session<T>(
        &self,
        session: &str,
        f: impl FnOnce() -> Result<T, String>,
    ) -> Result<T, String> {
        validate_session_id(session)?;

        let lock = self.session_lock(session)?;
        let result = match lock.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(format!("Session {} lock poisoned", session)),
        };
        self.release_lock(session, &lock);
        result
    }

    fn save(&self, session: &str, state: &GameState) -> Result<(), String> {
        self.store.save(session, state).map_err(|e| {
            warn!("session {}: save failed: {}", session, e);
            e
        })
    }

    /// 在会话锁内执行一次完整的状态转换
    ///
    /// 没有存档时先用开局状态初始化。`f` 返回的新状态会被保存。
    pub fn transact<T>(
        &self,
        session: &str,
        f: impl FnOnce(GameState) -> (GameState, T),
    ) -> Result<(GameState, T), String> {
        self.with_session(session, || {
            let state = match self.store.load(session) {
                Ok(Some(state)) => state,
                Ok(None) => {
                    info!("session {}: starting new game", session);
                    GameState::reset()
                }
                Err(e) => {
                    warn!("session {}: load failed: {}", session, e);
                    return Err(e);
                }
            };

            let (next, value) = f(state);
            self.save(session, &next)?;
            Ok((next, value))
        })
    }

    /// 读取当前状态
    pub fn state(&self, session: &str) -> Result<GameState, String> {
        self.transact(session, |state| (state, ()))
            .map(|(state, _)| state)
    }

    /// 开新局，丢弃旧状态
    ///
    /// 不读取旧存档，损坏的存档也会被覆盖。
    pub fn reset(&self, session: &str) -> Result<GameState, String> {
        self.with_session(session, || {
            info!("session {}: reset", session);
            let state = GameState::reset();
            self.save(session, &state)?;
            Ok(state)
        })
    }

    /// 在会话上走一步，返回新状态与是否成功
    pub fn apply_move(
        &self,
        session: &str,
        from: Square,
        to: Square,
    ) -> Result<(GameState, bool), String> {
        let (state, ok) = self.transact(session, |state| state.apply_move(from, to))?;
        debug!("session {}: {}{} -> {}", session, from, to, ok);
        Ok((state, ok))
    }

    /// 删除会话存档
    pub fn remove(&self, session: &str) -> Result<(), String> {
        self.with_session(session, || {
            info!("session {}: removed", session);
            self.store.remove(session)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Outcome, Side};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn sq(notation: &str) -> Square {
        Square::from_notation(notation).unwrap()
    }

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("xiangqi-{}-{}-{}", name, std::process::id(), nanos))
    }

    #[test]
    fn test_validate_session_id() {
        assert!(validate_session_id("game-1_A").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("../etc/passwd").is_err());
        assert!(validate_session_id("a b").is_err());
        assert!(validate_session_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.load("g1").unwrap(), None);

        let (state, _) = GameState::reset().apply_move(sq("b9"), sq("c7"));
        store.save("g1", &state).unwrap();
        assert_eq!(store.load("g1").unwrap(), Some(state));

        store.remove("g1").unwrap();
        assert_eq!(store.load("g1").unwrap(), None);
    }

    #[test]
    fn test_json_file_store_roundtrip() {
        let dir = temp_dir("store");
        let store = JsonFileStore::new(&dir).unwrap();
        assert_eq!(store.load("g1").unwrap(), None);

        let mut state = GameState::reset();
        for (from, to) in [("h7", "e7"), ("h0", "g2"), ("e7", "e3")] {
            let (next, ok) = state.apply_move(sq(from), sq(to));
            assert!(ok);
            state = next;
        }
        store.save("g1", &state).unwrap();

        let restored = store.load("g1").unwrap().unwrap();
        assert_eq!(restored.board(), state.board());
        assert_eq!(restored.turn(), state.turn());
        assert_eq!(restored.outcome(), state.outcome());

        assert!(store.load("../g1").is_err());
        store.remove("g1").unwrap();
        store.remove("g1").unwrap();
        assert_eq!(store.load("g1").unwrap(), None);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_json_file_store_rejects_corrupt_file() {
        let dir = temp_dir("corrupt");
        let store = JsonFileStore::new(&dir).unwrap();
        fs::write(dir.join("bad.json"), "{not json").unwrap();
        assert!(store.load("bad").is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_manager_initializes_and_persists() {
        let manager = SessionManager::in_memory();
        let state = manager.state("g1").unwrap();
        assert_eq!(state, GameState::reset());

        let (state, ok) = manager.apply_move("g1", sq("b9"), sq("c7")).unwrap();
        assert!(ok);
        assert_eq!(state.turn(), Side::Black);
        assert_eq!(manager.state("g1").unwrap(), state);

        // 非法走法不改变存档
        let (after, ok) = manager.apply_move("g1", sq("c7"), sq("d5")).unwrap();
        assert!(!ok);
        assert_eq!(after, state);

        // 不同会话互不影响
        assert_eq!(manager.state("g2").unwrap(), GameState::reset());

        let state = manager.reset("g1").unwrap();
        assert_eq!(state, GameState::reset());
        assert_eq!(state.outcome(), Outcome::Ongoing);
    }

    #[test]
    fn test_manager_serializes_same_session() {
        let manager = SessionManager::in_memory();
        let results: Vec<bool> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| manager.apply_move("shared", sq("b9"), sq("c7")).unwrap().1))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        // 同一步只能成功一次，之后轮到黑方
        assert_eq!(results.iter().filter(|ok| **ok).count(), 1);
        assert_eq!(manager.state("shared").unwrap().turn(), Side::Black);
    }

    #[test]
    fn test_manager_rejects_bad_session_id() {
        let manager = SessionManager::in_memory();
        assert!(manager.state("no/slash").is_err());
        assert!(manager.remove("").is_err());
    }

    #[test]
    fn test_reset_overwrites_corrupt_save() {
        let dir = temp_dir("reset");
        let manager = SessionManager::new(Box::new(JsonFileStore::new(&dir).unwrap()));
        fs::write(dir.join("g.json"), "{not json").unwrap();
        assert!(manager.state("g").is_err());

        let state = manager.reset("g").unwrap();
        assert_eq!(state, GameState::reset());
        assert_eq!(manager.state("g").unwrap(), GameState::reset());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_lock_table_is_released() {
        let manager = SessionManager::in_memory();
        manager.apply_move("g1", sq("b9"), sq("c7")).unwrap();
        manager.state("g2").unwrap();
        assert!(manager.locks.lock().unwrap().is_empty());

        manager.remove("g1").unwrap();
        assert!(manager.locks.lock().unwrap().is_empty());
        assert_eq!(manager.state("g1").unwrap(), GameState::reset());
    }

    #[test]
    fn test_remove_waits_for_running_transition() {
        let manager = SessionManager::in_memory();
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let manager = &manager;
        std::thread::scope(|s| {
            let mover = s.spawn(move || {
                manager
                    .transact("g", |state| {
                        entered_tx.send(()).unwrap();
                        std::thread::sleep(std::time::Duration::from_millis(50));
                        state.apply_move(sq("b9"), sq("c7"))
                    })
                    .unwrap()
            });
            entered_rx.recv().unwrap();
            // 走棋持有锁期间开始删除，删除在保存之后执行
            manager.remove("g").unwrap();
            assert!(mover.join().unwrap().1);
        });

        assert_eq!(manager.store.load("g").unwrap(), None);
        assert!(manager.locks.lock().unwrap().is_empty());
    }
}
