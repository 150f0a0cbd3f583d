//! 象棋测试局面库
//!
//! 提供命名的 FEN 局面，方便测试、基准和调试
//!
//! 命名规范:
//! - START: 初始局面
//! - OPENING_n: 开局后几步
//! - RULE_*: 单条规则的示例局面
//! - END_*: 对局已结束的局面

use crate::fen::START_FEN;

// =============================================================================
// 开局
// =============================================================================

/// 初始局面
pub const START: &str = START_FEN;

/// 红方第一步: 炮二平五
pub const OPENING_1: &str =
    "rheakaehr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C4/9/RHEAKAEHR b -";

/// 黑方回应: 马8进7
pub const OPENING_2: &str =
    "rheakae1r/9/1c4hc1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C4/9/RHEAKAEHR r -";

/// 中炮打中卒之后
pub const OPENING_3: &str =
    "rheakae1r/9/1c4hc1/p1p1C1p1p/9/9/P1P1P1P1P/1C7/9/RHEAKAEHR b -";

// =============================================================================
// 规则示例
// =============================================================================

/// 炮 a9 隔 a5 一子打 a0 的车
pub const RULE_CANNON_SCREEN: &str = "r3k4/9/9/9/9/P8/9/9/9/C3K4 r -";

/// 马 b9 被 b8 蹩腿
pub const RULE_HORSE_BLOCKED: &str = "4k4/9/9/9/9/9/9/2p6/1P7/1H2K4 r -";

/// 相 c5 在河边，不能过河
pub const RULE_ELEPHANT_AT_RIVER: &str = "4k4/9/9/9/9/2E6/9/9/9/4K4 r -";

/// 过河兵可以横走
pub const RULE_SOLDIERS_CROSSED: &str = "4k4/9/9/9/4P4/4p4/9/9/9/4K4 r -";

/// 红车一步可以吃掉黑将
pub const RULE_GENERAL_HANGING: &str = "R3k4/9/9/9/9/9/9/9/9/4K4 r -";

// =============================================================================
// 终局
// =============================================================================

/// 黑将已被吃，红胜
pub const END_RED_WON: &str = "R8/9/9/9/9/9/9/9/9/4K4 r r";

/// 帅已被吃，黑胜
pub const END_BLACK_WON: &str = "4k4/9/9/9/9/9/9/9/9/3r5 b b";

/// 所有命名局面
pub const ALL: [(&str, &str); 11] = [
    ("START", START),
    ("OPENING_1", OPENING_1),
    ("OPENING_2", OPENING_2),
    ("OPENING_3", OPENING_3),
    ("RULE_CANNON_SCREEN", RULE_CANNON_SCREEN),
    ("RULE_HORSE_BLOCKED", RULE_HORSE_BLOCKED),
    ("RULE_ELEPHANT_AT_RIVER", RULE_ELEPHANT_AT_RIVER),
    ("RULE_SOLDIERS_CROSSED", RULE_SOLDIERS_CROSSED),
    ("RULE_GENERAL_HANGING", RULE_GENERAL_HANGING),
    ("END_RED_WON", END_RED_WON),
    ("END_BLACK_WON", END_BLACK_WON),
];

/// 按名字查找局面
pub fn by_name(name: &str) -> Option<&'static str> {
    ALL.iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, fen)| *fen)
}
