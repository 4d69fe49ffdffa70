use std::fs;
use std::path::Path;

use crate::error::StoreError;
use crate::models::{DiceRow, SavedState};

/// 从TOML文件加载上次保存的点数
pub fn load_state(path: &Path) -> Result<SavedState, StoreError> {
    if !path.exists() {
        return Ok(SavedState::default());
    }

    let content = fs::read_to_string(path)?;
    let state: SavedState = toml::from_str(&content)?;
    Ok(state)
}

/// 保存点数到TOML文件
pub fn save_state(row: &mut DiceRow, path: &Path) -> Result<(), StoreError> {
    if !row.dirty {
        return Ok(());
    }

    let content = toml::to_string_pretty(&row.to_state())?;
    fs::write(path, content)?;

    row.dirty = false;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Face;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dicebox-{}-{}.toml", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_missing_file_is_empty_state() {
        let state = load_state(&temp_path("missing")).unwrap();
        assert!(state.dice.is_empty());
    }

    #[test]
    fn test_save_and_restore() {
        let path = temp_path("save");
        let mut row = DiceRow::new(3);
        row.set_face(2, Face::Four);
        save_state(&mut row, &path).unwrap();
        assert!(!row.dirty);

        let state = load_state(&path).unwrap();
        let mut recreated = DiceRow::new(3);
        recreated.restore(&state.dice);
        assert_eq!(recreated.dice[2].face, Face::Four);
        assert_eq!(recreated.dice[0].face, Face::One);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_clean_row_is_not_written() {
        let path = temp_path("clean");
        let mut row = DiceRow::new(2);
        save_state(&mut row, &path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let path = temp_path("invalid");
        fs::write(&path, "meta = 3\n[[[").unwrap();
        assert!(matches!(load_state(&path), Err(StoreError::Decode(_))));
        fs::remove_file(&path).unwrap();
    }
}
