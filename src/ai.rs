//! 随机对手
//!
//! 从当前走子方的合法走法中随机挑一步。

use crate::game::GameState;
use crate::rules::legal_moves;
use crate::types::Move;
use rand::prelude::*;

/// 随机 AI - 随机选择合法走法
#[derive(Debug, Clone)]
pub struct RandomAI {
    rng: StdRng,
}

impl RandomAI {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        RandomAI { rng }
    }

    /// 为当前走子方选一步，对局结束或无子可走时返回 None
    pub fn select_move(&mut self, state: &GameState) -> Option<Move> {
        if state.is_over() {
            return None;
        }
        let moves = legal_moves(state.board(), state.turn());
        moves.choose(&mut self.rng).copied()
    }

    /// 选一步并走出，返回新状态与所走的步
    pub fn play(&mut self, state: &GameState) -> Option<(GameState, Move)> {
        let mv = self.select_move(state)?;
        let (next, ok) = state.apply_move(mv.from, mv.to);
        debug_assert!(ok, "random move {} must be legal", mv);
        ok.then_some((next, mv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::parse_fen;
    use crate::rules::is_legal;

    #[test]
    fn test_random_move_is_legal() {
        let mut ai = RandomAI::new(Some(7));
        let state = GameState::reset();
        for _ in 0..20 {
            let mv = ai.select_move(&state).unwrap();
            assert!(is_legal(state.board(), state.turn(), mv.from, mv.to));
        }
    }

    #[test]
    fn test_seed_is_deterministic() {
        let mut a = RandomAI::new(Some(42));
        let mut b = RandomAI::new(Some(42));
        let mut state_a = GameState::reset();
        let mut state_b = GameState::reset();
        for _ in 0..30 {
            match (a.play(&state_a), b.play(&state_b)) {
                (Some((next_a, mv_a)), Some((next_b, mv_b))) => {
                    assert_eq!(mv_a, mv_b);
                    state_a = next_a;
                    state_b = next_b;
                }
                (None, None) => break,
                _ => panic!("seeded players diverged"),
            }
        }
        assert_eq!(state_a, state_b);
    }

    #[test]
    fn test_random_game_keeps_invariants() {
        let mut ai = RandomAI::new(Some(2024));
        let mut state = GameState::reset();
        for _ in 0..300 {
            let before = state.turn();
            match ai.play(&state) {
                Some((next, _)) => {
                    if !next.is_over() {
                        assert_eq!(next.turn(), before.opposite());
                    }
                    for (sq, piece) in next.board().pieces() {
                        if piece.kind() == crate::types::PieceKind::General {
                            assert!(sq.is_in_palace(piece.side()));
                        }
                    }
                    state = next;
                }
                None => break,
            }
        }
        assert!(state.board().count(None) <= 32);
    }

    #[test]
    fn test_no_move_after_game_over() {
        let mut ai = RandomAI::new(Some(1));
        let state = parse_fen("9/9/9/9/9/9/9/9/9/4K4 r r").unwrap();
        assert!(ai.select_move(&state).is_none());
        assert!(ai.play(&state).is_none());
    }
}
