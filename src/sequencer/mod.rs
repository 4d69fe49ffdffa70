//! 骰子动画调度
//!
//! 一轮动画 = 一个协调者 + 每个骰子一个独立的序列。
//! 序列只通过 [`RotationEvent`] 把中间结果发给 UI 线程，由 UI 线程写入显示状态；
//! 协调者等待全部序列结束后才发送 `Finished`，按钮随之恢复。

mod plan;
mod tasks;
mod threads;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::Sender;
use uuid::Uuid;

use crate::config::Settings;
use crate::error::RotateError;
use crate::models::Face;

pub use plan::{CycleRange, DicePlan, RandomSource, ThreadRngSource};

#[cfg(test)]
pub use plan::FixedSource;

/// 一轮动画的标识
pub type RunId = Uuid;

/// 发送给 UI 线程的消息
#[derive(Debug, Clone, PartialEq)]
pub enum RotationEvent {
    Started { run: RunId, dice: usize },
    Face { run: RunId, dice: usize, face: Face },
    Finished { run: RunId },
}

/// 动画的执行方式
#[derive(Debug, Clone)]
pub enum Backend {
    /// 协调线程 + 每个骰子一个线程
    Threads,
    /// 在给定运行时上用 JoinSet 管理的任务
    Tasks(tokio::runtime::Handle),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Threads => "threads",
            Backend::Tasks(_) => "tasks",
        }
    }
}

/// 一轮动画需要的全部上下文，显式传给每个序列
#[derive(Clone)]
pub struct RunContext {
    pub run: RunId,
    pub dice_count: usize,
    pub cycles: CycleRange,
    pub step: Duration,
    pub rng: Arc<dyn RandomSource>,
    pub events: Sender<RotationEvent>,
}

impl RunContext {
    /// UI 端已关闭时返回 false
    fn publish(&self, event: RotationEvent) -> bool {
        self.events.send(event).is_ok()
    }

    fn plan(&self, dice: usize) -> DicePlan {
        let plan = DicePlan::draw(dice, self.cycles, self.step, self.rng.as_ref());
        tracing::debug!(
            run = %self.run,
            dice = plan.dice,
            cycles = plan.cycles,
            total_ms = plan.total_delay().as_millis() as u64,
            "dice sequence planned"
        );
        plan
    }

    fn finish(&self, guard: BusyGuard) {
        drop(guard);
        tracing::info!(run = %self.run, "rotation finished");
        if !self.publish(RotationEvent::Finished { run: self.run }) {
            tracing::debug!(run = %self.run, "display closed before rotation finished");
        }
    }
}

/// 存在期间表示有一轮动画正在进行，drop 时释放
pub(crate) struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Sequencer {
    cycles: CycleRange,
    step: Duration,
    rng: Arc<dyn RandomSource>,
    events: Sender<RotationEvent>,
    busy: Arc<AtomicBool>,
    backend: Backend,
}

impl Sequencer {
    pub fn new(
        settings: &Settings,
        backend: Backend,
        rng: Arc<dyn RandomSource>,
        events: Sender<RotationEvent>,
    ) -> Self {
        Self {
            cycles: settings.cycles,
            step: settings.step,
            rng,
            events,
            busy: Arc::new(AtomicBool::new(false)),
            backend,
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// 单个骰子最长的动画时间，溢出时取 Duration::MAX
    pub fn worst_case(&self) -> Duration {
        u32::try_from(self.cycles.worst_case_steps())
            .ok()
            .and_then(|steps| self.step.checked_mul(steps))
            .unwrap_or(Duration::MAX)
    }

    /// 开始一轮动画
    ///
    /// 上一轮尚未结束时拒绝，不会排队。
    pub fn start(&self, dice_count: usize) -> Result<RunId, RotateError> {
        if dice_count == 0 {
            return Err(RotateError::NoDice);
        }
        let guard = BusyGuard::acquire(&self.busy).ok_or(RotateError::AlreadyRotating)?;

        let ctx = RunContext {
            run: Uuid::new_v4(),
            dice_count,
            cycles: self.cycles,
            step: self.step,
            rng: Arc::clone(&self.rng),
            events: self.events.clone(),
        };
        let run = ctx.run;
        tracing::info!(%run, dice = dice_count, backend = self.backend.name(), "rotation started");
        ctx.publish(RotationEvent::Started {
            run,
            dice: dice_count,
        });

        match &self.backend {
            Backend::Threads => threads::launch(ctx, guard),
            Backend::Tasks(handle) => tasks::launch(handle, ctx, guard),
        }
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Receiver, unbounded};

    fn settings(min: u32, max: u32, step_ms: u64) -> Settings {
        Settings {
            cycles: CycleRange { min, max },
            step: Duration::from_millis(step_ms),
            ..Settings::default()
        }
    }

    async fn wait_finished(rx: &Receiver<RotationEvent>) -> Vec<RotationEvent> {
        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    let done = matches!(event, RotationEvent::Finished { .. });
                    events.push(event);
                    if done {
                        return events;
                    }
                }
                Err(_) => tokio::time::sleep(Duration::from_millis(1)).await,
            }
        }
    }

    #[test]
    fn test_busy_guard_releases_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = BusyGuard::acquire(&flag).unwrap();
        assert!(flag.load(Ordering::SeqCst));
        assert!(BusyGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(!flag.load(Ordering::SeqCst));
        assert!(BusyGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_zero_dice_rejected() {
        let (tx, rx) = unbounded();
        let sequencer = Sequencer::new(
            &Settings::default(),
            Backend::Threads,
            Arc::new(ThreadRngSource),
            tx,
        );
        assert_eq!(sequencer.start(0), Err(RotateError::NoDice));
        assert!(!sequencer.is_rotating());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_worst_case() {
        let (tx, _rx) = unbounded();
        let sequencer = Sequencer::new(
            &Settings::default(),
            Backend::Threads,
            Arc::new(ThreadRngSource),
            tx,
        );
        // 10ms * (1 + ... + 29)
        assert_eq!(sequencer.worst_case(), Duration::from_millis(4350));
    }

    #[test]
    fn test_worst_case_saturates() {
        let (tx, _rx) = unbounded();
        let huge_step = Settings {
            step: Duration::from_millis(u64::MAX),
            cycles: CycleRange { min: 1, max: 100 },
            ..Settings::default()
        };
        let sequencer = Sequencer::new(&huge_step, Backend::Threads, Arc::new(ThreadRngSource), tx);
        assert_eq!(sequencer.worst_case(), Duration::MAX);

        let (tx, _rx) = unbounded();
        let huge_range = Settings {
            cycles: CycleRange { min: 1, max: u32::MAX },
            ..Settings::default()
        };
        let sequencer = Sequencer::new(&huge_range, Backend::Threads, Arc::new(ThreadRngSource), tx);
        assert_eq!(sequencer.worst_case(), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_start_rejected() {
        let (tx, rx) = unbounded();
        let sequencer = Sequencer::new(
            &settings(10, 30, 10),
            Backend::Tasks(tokio::runtime::Handle::current()),
            Arc::new(ThreadRngSource),
            tx,
        );

        let run = sequencer.start(5).unwrap();
        assert!(sequencer.is_rotating());
        assert_eq!(sequencer.start(5), Err(RotateError::AlreadyRotating));

        let events = wait_finished(&rx).await;
        assert_eq!(events.first(), Some(&RotationEvent::Started { run, dice: 5 }));
        assert_eq!(events.last(), Some(&RotationEvent::Finished { run }));
        assert!(events.iter().all(|e| match e {
            RotationEvent::Started { run: r, .. }
            | RotationEvent::Face { run: r, .. }
            | RotationEvent::Finished { run: r } => *r == run,
        }));
        assert!(!sequencer.is_rotating());

        let next = sequencer.start(5).unwrap();
        assert_ne!(next, run);
        wait_finished(&rx).await;
    }
}
