use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 骰子面数
pub const FACE_COUNT: usize = 6;

/// 骰子的一个面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Face {
    #[default]
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
}

impl Face {
    pub const ALL: [Face; FACE_COUNT] = [
        Face::One,
        Face::Two,
        Face::Three,
        Face::Four,
        Face::Five,
        Face::Six,
    ];

    /// 由 0..=5 的下标得到面
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// 稳定标识 1..=6，0 留给"没有保存值"
    pub fn id(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_id(id: u32) -> Option<Self> {
        id.checked_sub(1)
            .and_then(|index| Self::from_index(index as usize))
    }

    pub fn glyph(self) -> char {
        ['⚀', '⚁', '⚂', '⚃', '⚄', '⚅'][self.index()]
    }

    /// 3x3 点阵，true 表示该位置有点
    pub fn pips(self) -> [[bool; 3]; 3] {
        const O: bool = false;
        const X: bool = true;
        match self {
            Face::One => [[O, O, O], [O, X, O], [O, O, O]],
            Face::Two => [[X, O, O], [O, O, O], [O, O, X]],
            Face::Three => [[X, O, O], [O, X, O], [O, O, X]],
            Face::Four => [[X, O, X], [O, O, O], [X, O, X]],
            Face::Five => [[X, O, X], [O, X, O], [X, O, X]],
            Face::Six => [[X, O, X], [X, O, X], [X, O, X]],
        }
    }
}

/// 单个骰子
#[derive(Debug, Clone, PartialEq)]
pub struct Dice {
    pub position: usize,
    pub key: String,
    pub face: Face,
}

impl Dice {
    pub fn new(position: usize) -> Self {
        Self {
            position,
            key: state_key(position),
            face: Face::default(),
        }
    }
}

/// 状态文件中骰子的键
pub fn state_key(position: usize) -> String {
    format!("dice_{position}")
}

/// TOML文件结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedState {
    pub meta: StateMeta,
    #[serde(default)]
    pub dice: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMeta {
    pub version: String,
    pub saved_at: DateTime<Local>,
}

impl Default for SavedState {
    fn default() -> Self {
        Self {
            meta: StateMeta {
                version: "1.0".to_string(),
                saved_at: Local::now(),
            },
            dice: BTreeMap::new(),
        }
    }
}

/// 一排骰子（运行时结构）
#[derive(Debug, Clone)]
pub struct DiceRow {
    pub dice: Vec<Dice>,
    pub dirty: bool,
}

impl DiceRow {
    pub fn new(count: usize) -> Self {
        Self {
            dice: (0..count).map(Dice::new).collect(),
            dirty: false,
        }
    }

    pub fn len(&self) -> usize {
        self.dice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    /// 显示新的点数，位置越界时返回 false
    pub fn set_face(&mut self, position: usize, face: Face) -> bool {
        match self.dice.get_mut(position) {
            Some(dice) => {
                dice.face = face;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// 以 键 -> 面标识 的形式导出当前状态
    pub fn capture(&self) -> BTreeMap<String, u32> {
        self.dice
            .iter()
            .map(|dice| {
                tracing::debug!(key = %dice.key, value = dice.face.id(), "capture dice state");
                (dice.key.clone(), dice.face.id())
            })
            .collect()
    }

    pub fn to_state(&self) -> SavedState {
        SavedState {
            meta: StateMeta {
                version: "1.0".to_string(),
                saved_at: Local::now(),
            },
            dice: self.capture(),
        }
    }

    /// 恢复保存的点数
    ///
    /// 只有存在且非零的值才会被应用，其余骰子保持默认面。
    /// 返回实际恢复的骰子数量。
    pub fn restore(&mut self, saved: &BTreeMap<String, u32>) -> usize {
        let mut restored = 0;
        for dice in &mut self.dice {
            let Some(&id) = saved.get(&dice.key) else {
                continue;
            };
            if id == 0 {
                continue;
            }
            match Face::from_id(id) {
                Some(face) => {
                    tracing::debug!(position = dice.position, key = %dice.key, value = id, "restore dice state");
                    dice.face = face;
                    restored += 1;
                }
                None => {
                    tracing::warn!(key = %dice.key, value = id, "ignoring unknown face id");
                }
            }
        }
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_ids_are_one_to_one() {
        let ids: Vec<u32> = Face::ALL.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        for face in Face::ALL {
            assert_eq!(Face::from_id(face.id()), Some(face));
            assert_eq!(Face::from_index(face.index()), Some(face));
        }
        assert_eq!(Face::from_id(0), None);
        assert_eq!(Face::from_id(7), None);
        assert_eq!(Face::from_index(6), None);
    }

    #[test]
    fn test_pip_count_matches_face() {
        for face in Face::ALL {
            let pips = face.pips().iter().flatten().filter(|p| **p).count();
            assert_eq!(pips, face.index() + 1);
        }
    }

    #[test]
    fn test_restore_nonzero_value() {
        let mut row = DiceRow::new(3);
        let mut saved = BTreeMap::new();
        saved.insert("dice_1".to_string(), Face::Five.id());

        assert_eq!(row.restore(&saved), 1);
        assert_eq!(row.dice[0].face, Face::One);
        assert_eq!(row.dice[1].face, Face::Five);
        assert_eq!(row.dice[2].face, Face::One);
        assert!(!row.dirty);
    }

    #[test]
    fn test_restore_zero_or_absent_keeps_default() {
        let mut row = DiceRow::new(2);
        let mut saved = BTreeMap::new();
        saved.insert("dice_0".to_string(), 0);
        saved.insert("dice_9".to_string(), 4);

        assert_eq!(row.restore(&saved), 0);
        assert!(row.dice.iter().all(|d| d.face == Face::default()));
    }

    #[test]
    fn test_restore_ignores_unknown_id() {
        let mut row = DiceRow::new(1);
        let mut saved = BTreeMap::new();
        saved.insert("dice_0".to_string(), 42);

        assert_eq!(row.restore(&saved), 0);
        assert_eq!(row.dice[0].face, Face::One);
    }

    #[test]
    fn test_capture_then_restore() {
        let mut row = DiceRow::new(5);
        row.set_face(0, Face::Six);
        row.set_face(4, Face::Three);
        let saved = row.capture();
        assert_eq!(saved.get("dice_0"), Some(&6));
        assert_eq!(saved.get("dice_4"), Some(&3));

        let mut recreated = DiceRow::new(5);
        assert_eq!(recreated.restore(&saved), 5);
        assert_eq!(recreated.dice[0].face, Face::Six);
        assert_eq!(recreated.dice[4].face, Face::Three);
    }

    #[test]
    fn test_set_face_out_of_range() {
        let mut row = DiceRow::new(2);
        assert!(!row.set_face(2, Face::Two));
        assert!(!row.dirty);
        assert!(row.set_face(1, Face::Two));
        assert!(row.dirty);
    }
}
