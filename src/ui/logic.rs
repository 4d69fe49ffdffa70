//! 业务逻辑处理 (Update/Dispatch)
//!
//! 按键分发，以及在 UI 线程上应用动画消息

use super::actions::Action;
use super::state::{App, TriggerState};
use crate::sequencer::{RotationEvent, RunId};

impl App {
    /// 核心逻辑分发
    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::Rotate => self.rotate(),
        }
        false
    }

    /// 开始一轮动画，按钮不可用时忽略
    pub fn rotate(&mut self) {
        if !self.trigger_enabled() {
            tracing::debug!("rotate ignored while dice are rotating");
            return;
        }

        match self.sequencer.start(self.dice.len()) {
            Ok(run) => {
                self.trigger = TriggerState::Rotating(run);
                self.message = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "rotation rejected");
                self.message = Some(format!("无法开始：{err}"));
            }
        }
    }

    /// 取出所有待处理的动画消息，返回处理的数量
    pub fn process_rotation_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event);
            handled += 1;
        }
        handled
    }

    pub fn apply_event(&mut self, event: RotationEvent) {
        match event {
            // rotate() 已在发出 Started 之前禁用按钮
            RotationEvent::Started { run, dice } => {
                tracing::debug!(%run, dice, "rotation started");
            }
            RotationEvent::Face { run, dice, face } => {
                if self.is_current(run) && !self.dice.set_face(dice, face) {
                    tracing::warn!(%run, dice, "face update for unknown dice");
                }
            }
            RotationEvent::Finished { run } => {
                if !self.is_current(run) {
                    tracing::debug!(%run, "ignoring finish of stale run");
                    return;
                }
                self.trigger = TriggerState::Idle;
                self.rolls += 1;
                let faces: String = self.dice.dice.iter().map(|d| d.face.glyph()).collect();
                self.message = Some(format!("{faces}  合计 {}", self.total()));
            }
        }
    }

    fn is_current(&self, run: RunId) -> bool {
        self.trigger == TriggerState::Rotating(run)
    }
}
