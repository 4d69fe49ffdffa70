//! 视图层模块
//!
//! 包含主渲染入口和各种视图组件

pub mod components;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};

use super::state::App;
use components::{DICE_HEIGHT, DICE_WIDTH, render_button, render_dice};

/// 渲染 UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),            // 标题
            Constraint::Min(DICE_HEIGHT + 2), // 骰子
            Constraint::Length(3),            // 按钮
            Constraint::Length(3),            // 帮助
        ])
        .split(frame.area());

    render_title(frame, chunks[0]);
    render_dice_row(frame, app, chunks[1]);
    render_trigger(frame, app, chunks[2]);
    render_help(frame, app, chunks[3]);
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new("🎲 掷骰子")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn render_dice_row(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title("骰子").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.dice.is_empty() {
        frame.render_widget(Paragraph::new("没有骰子"), inner);
        return;
    }

    let [row] = Layout::vertical([Constraint::Length(DICE_HEIGHT)])
        .flex(Flex::Center)
        .areas(inner);
    let slots = Layout::horizontal(vec![Constraint::Length(DICE_WIDTH); app.dice.len()])
        .flex(Flex::Center)
        .spacing(1)
        .split(row);

    let rotating = !app.trigger_enabled();
    for (dice, slot) in app.dice.dice.iter().zip(slots.iter()) {
        render_dice(frame, *slot, dice, rotating);
    }
}

fn render_trigger(frame: &mut Frame, app: &App, area: Rect) {
    let [button] = Layout::horizontal([Constraint::Length(20)])
        .flex(Flex::Center)
        .areas(area);
    render_button(frame, button, app.button_label(), app.trigger_enabled());
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.trigger_enabled() {
        "[空格/r/Enter] 掷骰子  [q] 退出".to_string()
    } else {
        format!(
            "旋转中，最长约 {:.1} 秒  [q] 退出",
            app.sequencer().worst_case().as_secs_f32()
        )
    };

    let message = app.message.as_deref().unwrap_or("");
    let text = if message.is_empty() {
        format!("{}  |  已掷 {} 次", help_text, app.rolls)
    } else {
        format!("{}  |  已掷 {} 次  |  {}", help_text, app.rolls, message)
    };

    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, area);
}
