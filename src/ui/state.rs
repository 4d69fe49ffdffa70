//! App 状态定义 (Model)
//!
//! 包含应用状态结构体及按钮状态

use crossbeam_channel::Receiver;

use crate::models::DiceRow;
use crate::sequencer::{RotationEvent, RunId, Sequencer};

/// 应用状态
pub struct App {
    pub dice: DiceRow,
    pub trigger: TriggerState,
    pub message: Option<String>,
    pub rolls: u32, // 已完成的轮数
    pub(super) sequencer: Sequencer,
    pub(super) events: Receiver<RotationEvent>,
}

/// 掷骰按钮状态
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerState {
    Idle,
    Rotating(RunId),
}

impl App {
    /// 创建新的应用实例
    pub fn new(dice: DiceRow, sequencer: Sequencer, events: Receiver<RotationEvent>) -> Self {
        Self {
            dice,
            trigger: TriggerState::Idle,
            message: None,
            rolls: 0,
            sequencer,
            events,
        }
    }

    /// 按钮是否可用：当且仅当没有正在进行的动画
    pub fn trigger_enabled(&self) -> bool {
        self.trigger == TriggerState::Idle
    }

    pub fn button_label(&self) -> &'static str {
        match self.trigger {
            TriggerState::Idle => "掷骰子",
            TriggerState::Rotating(_) => "旋转中…",
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// 当前点数之和
    pub fn total(&self) -> usize {
        self.dice.dice.iter().map(|d| d.face.index() + 1).sum()
    }
}
