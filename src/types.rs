//! 象棋核心类型定义
//!
//! 定义阵营、棋子、坐标、走法与对局结果等基础数据类型

use serde::{Deserialize, Serialize};
use std::fmt;

/// 棋盘列数
pub const FILES: i8 = 9;
/// 棋盘行数
pub const RANKS: i8 = 10;

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Red,
    Black,
}

impl Side {
    /// 获取对方阵营
    pub fn opposite(&self) -> Side {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Side> {
        match c {
            'r' => Some(Side::Red),
            'b' => Some(Side::Black),
            _ => None,
        }
    }

    /// 转换为 FEN 字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Side::Red => 'r',
            Side::Black => 'b',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Red => write!(f, "red"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// 棋子种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// 将/帅
    General,
    /// 士/仕
    Advisor,
    /// 象/相
    Elephant,
    /// 马
    Horse,
    /// 车
    Chariot,
    /// 炮
    Cannon,
    /// 卒/兵
    Soldier,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::General,
        PieceKind::Advisor,
        PieceKind::Elephant,
        PieceKind::Horse,
        PieceKind::Chariot,
        PieceKind::Cannon,
        PieceKind::Soldier,
    ];

    /// 从 FEN 字符解析（不区分大小写）
    pub fn from_fen_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'k' => Some(PieceKind::General),
            'a' => Some(PieceKind::Advisor),
            'e' => Some(PieceKind::Elephant),
            'h' => Some(PieceKind::Horse),
            'r' => Some(PieceKind::Chariot),
            'c' => Some(PieceKind::Cannon),
            'p' => Some(PieceKind::Soldier),
            _ => None,
        }
    }

    /// 转换为 FEN 字符（小写）
    pub fn to_fen_char(&self) -> char {
        match self {
            PieceKind::General => 'k',
            PieceKind::Advisor => 'a',
            PieceKind::Elephant => 'e',
            PieceKind::Horse => 'h',
            PieceKind::Chariot => 'r',
            PieceKind::Cannon => 'c',
            PieceKind::Soldier => 'p',
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::General => "General",
            PieceKind::Advisor => "Advisor",
            PieceKind::Elephant => "Elephant",
            PieceKind::Horse => "Horse",
            PieceKind::Chariot => "Chariot",
            PieceKind::Cannon => "Cannon",
            PieceKind::Soldier => "Soldier",
        };
        write!(f, "{}", name)
    }
}

/// 棋子
///
/// 14 种取值，阵营与种类都由枚举标签本身决定，棋盘上不另存阵营。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Piece {
    RedGeneral,
    RedAdvisor,
    RedElephant,
    RedHorse,
    RedChariot,
    RedCannon,
    RedSoldier,
    BlackGeneral,
    BlackAdvisor,
    BlackElephant,
    BlackHorse,
    BlackChariot,
    BlackCannon,
    BlackSoldier,
}

impl Piece {
    pub fn new(side: Side, kind: PieceKind) -> Piece {
        match (side, kind) {
            (Side::Red, PieceKind::General) => Piece::RedGeneral,
            (Side::Red, PieceKind::Advisor) => Piece::RedAdvisor,
            (Side::Red, PieceKind::Elephant) => Piece::RedElephant,
            (Side::Red, PieceKind::Horse) => Piece::RedHorse,
            (Side::Red, PieceKind::Chariot) => Piece::RedChariot,
            (Side::Red, PieceKind::Cannon) => Piece::RedCannon,
            (Side::Red, PieceKind::Soldier) => Piece::RedSoldier,
            (Side::Black, PieceKind::General) => Piece::BlackGeneral,
            (Side::Black, PieceKind::Advisor) => Piece::BlackAdvisor,
            (Side::Black, PieceKind::Elephant) => Piece::BlackElephant,
            (Side::Black, PieceKind::Horse) => Piece::BlackHorse,
            (Side::Black, PieceKind::Chariot) => Piece::BlackChariot,
            (Side::Black, PieceKind::Cannon) => Piece::BlackCannon,
            (Side::Black, PieceKind::Soldier) => Piece::BlackSoldier,
        }
    }

    /// 所属阵营
    #[inline]
    pub fn side(&self) -> Side {
        match self {
            Piece::RedGeneral
            | Piece::RedAdvisor
            | Piece::RedElephant
            | Piece::RedHorse
            | Piece::RedChariot
            | Piece::RedCannon
            | Piece::RedSoldier => Side::Red,
            Piece::BlackGeneral
            | Piece::BlackAdvisor
            | Piece::BlackElephant
            | Piece::BlackHorse
            | Piece::BlackChariot
            | Piece::BlackCannon
            | Piece::BlackSoldier => Side::Black,
        }
    }

    /// 棋子种类
    #[inline]
    pub fn kind(&self) -> PieceKind {
        match self {
            Piece::RedGeneral | Piece::BlackGeneral => PieceKind::General,
            Piece::RedAdvisor | Piece::BlackAdvisor => PieceKind::Advisor,
            Piece::RedElephant | Piece::BlackElephant => PieceKind::Elephant,
            Piece::RedHorse | Piece::BlackHorse => PieceKind::Horse,
            Piece::RedChariot | Piece::BlackChariot => PieceKind::Chariot,
            Piece::RedCannon | Piece::BlackCannon => PieceKind::Cannon,
            Piece::RedSoldier | Piece::BlackSoldier => PieceKind::Soldier,
        }
    }

    /// 从 FEN 字符解析：红方大写，黑方小写
    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = PieceKind::from_fen_char(c)?;
        let side = if c.is_ascii_uppercase() {
            Side::Red
        } else {
            Side::Black
        };
        Some(Piece::new(side, kind))
    }

    /// 转换为 FEN 字符
    pub fn to_fen_char(&self) -> char {
        let ch = self.kind().to_fen_char();
        match self.side() {
            Side::Red => ch.to_ascii_uppercase(),
            Side::Black => ch,
        }
    }

    /// 棋子的汉字
    pub fn glyph(&self) -> char {
        match self {
            Piece::RedGeneral => '帅',
            Piece::RedAdvisor => '仕',
            Piece::RedElephant => '相',
            Piece::RedHorse => '马',
            Piece::RedChariot => '车',
            Piece::RedCannon => '炮',
            Piece::RedSoldier => '兵',
            Piece::BlackGeneral => '将',
            Piece::BlackAdvisor => '士',
            Piece::BlackElephant => '象',
            Piece::BlackHorse => '马',
            Piece::BlackChariot => '车',
            Piece::BlackCannon => '炮',
            Piece::BlackSoldier => '卒',
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// 棋盘坐标 (file, rank)
///
/// file: 0-8 (从左到右)
/// rank: 0-9 (0 是黑方底线，9 是红方底线)
///
/// 使用有符号整数，越界坐标可以表示，由走法校验负责拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub file: i8,
    pub rank: i8,
}

impl Square {
    pub fn new(file: i8, rank: i8) -> Self {
        Square { file, rank }
    }

    /// 检查坐标是否在棋盘范围内
    #[inline]
    pub fn is_valid(&self) -> bool {
        (0..FILES).contains(&self.file) && (0..RANKS).contains(&self.rank)
    }

    /// 检查坐标是否在该方九宫内
    pub fn is_in_palace(&self, side: Side) -> bool {
        if !(3..=5).contains(&self.file) {
            return false;
        }
        match side {
            Side::Red => (7..=9).contains(&self.rank),
            Side::Black => (0..=2).contains(&self.rank),
        }
    }

    /// 检查坐标是否在己方半场（未过河）
    pub fn is_on_own_side(&self, side: Side) -> bool {
        match side {
            Side::Red => (5..=9).contains(&self.rank),
            Side::Black => (0..=4).contains(&self.rank),
        }
    }

    /// 坐标加偏移量
    pub fn offset(&self, file_delta: i8, rank_delta: i8) -> Square {
        Square {
            file: self.file + file_delta,
            rank: self.rank + rank_delta,
        }
    }

    /// 数组下标，调用方需保证坐标有效
    #[inline]
    pub fn to_index(&self) -> usize {
        self.rank as usize * FILES as usize + self.file as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Square {
        Square {
            file: (index % FILES as usize) as i8,
            rank: (index / FILES as usize) as i8,
        }
    }

    /// 从记谱坐标解析（如 "b9"）
    pub fn from_notation(s: &str) -> Option<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = match bytes[0] {
            b'a'..=b'i' => (bytes[0] - b'a') as i8,
            _ => return None,
        };
        let rank = match bytes[1] {
            b'0'..=b'9' => (bytes[1] - b'0') as i8,
            _ => return None,
        };
        Some(Square { file, rank })
    }

    /// 转换为记谱坐标（如 "b9"），越界坐标输出为 "(file,rank)"
    pub fn to_notation(&self) -> String {
        if !self.is_valid() {
            return format!("({},{})", self.file, self.rank);
        }
        let file_char = (b'a' + self.file as u8) as char;
        format!("{}{}", file_char, self.rank)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

/// 走法：起点与终点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }

    /// 从走法字符串解析，格式：`b9c7`
    pub fn from_notation(s: &str) -> Option<Move> {
        let s = s.trim();
        if s.len() != 4 || !s.is_ascii() {
            return None;
        }
        let from = Square::from_notation(&s[0..2])?;
        let to = Square::from_notation(&s[2..4])?;
        Some(Move { from, to })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Ongoing,
    Won(Side),
}

impl Outcome {
    /// 胜方，未结束时为 None
    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::Ongoing => None,
            Outcome::Won(side) => Some(*side),
        }
    }

    pub fn from_fen_char(c: char) -> Option<Outcome> {
        match c {
            '-' => Some(Outcome::Ongoing),
            _ => Side::from_fen_char(c).map(Outcome::Won),
        }
    }

    pub fn to_fen_char(&self) -> char {
        match self {
            Outcome::Ongoing => '-',
            Outcome::Won(side) => side.to_fen_char(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ongoing => write!(f, "ongoing"),
            Outcome::Won(side) => write!(f, "{} won", side),
        }
    }
}
