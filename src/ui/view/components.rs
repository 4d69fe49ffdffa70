//! 通用 UI 组件
//!
//! 骰子、按钮等通用组件

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

use crate::models::Dice;

/// 骰子方块的宽高（含边框）
pub const DICE_WIDTH: u16 = 11;
pub const DICE_HEIGHT: u16 = 5;

/// 3x3 点阵的文本行
pub fn pip_lines(dice: &Dice) -> Vec<Line<'static>> {
    dice.face
        .pips()
        .iter()
        .map(|row| {
            let text: String = row
                .iter()
                .map(|&on| if on { " ● " } else { "   " })
                .collect();
            Line::from(text)
        })
        .collect()
}

/// [组件] 单个骰子
pub fn render_dice(frame: &mut Frame, area: Rect, dice: &Dice, rotating: bool) {
    let color = if rotating { Color::Yellow } else { Color::White };
    let widget = Paragraph::new(pip_lines(dice))
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .title(format!(" {} ", dice.face.glyph()))
                .borders(Borders::ALL),
        );
    frame.render_widget(widget, area);
}

/// [组件] 按钮，不可用时变暗
pub fn render_button(frame: &mut Frame, area: Rect, label: &str, enabled: bool) {
    let style = if enabled {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM)
    };

    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(button, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Face;

    #[test]
    fn test_pip_lines_fit_dice_box() {
        let mut dice = Dice::new(0);
        dice.face = Face::Five;
        let lines = pip_lines(&dice);
        assert_eq!(lines.len() as u16, DICE_HEIGHT - 2);
        assert!(lines.iter().all(|l| l.width() as u16 <= DICE_WIDTH - 2));
    }
}
