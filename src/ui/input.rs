//! 键盘事件映射 (Input -> Action)
//!
//! 将按键事件转换为 Action

use crossterm::event::KeyCode;

use super::actions::Action;
use super::state::App;

/// 获取按键对应的 Action
pub fn get_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') | KeyCode::Char('r') | KeyCode::Enter => Some(Action::Rotate),
        _ => None,
    }
}

/// 处理按键事件，返回 true 表示退出
pub fn handle_key_event(app: &mut App, key: KeyCode) -> bool {
    match get_action(key) {
        Some(action) => app.dispatch(action),
        None => false,
    }
}
