//! 单个骰子的动画计划
//!
//! 每个骰子先抽取循环次数，再为第 i 步（从 1 开始）抽取一个面，
//! 并在显示前等待 `step * i`，越往后停顿越长。

use std::time::Duration;

use rand::Rng;

use crate::models::{FACE_COUNT, Face};

/// 随机数来源，方便测试时替换为固定序列
pub trait RandomSource: Send + Sync {
    /// 在 [lo, hi] 闭区间内均匀取值
    fn range_inclusive(&self, lo: u32, hi: u32) -> u32;
}

/// 基于线程本地 RNG 的随机源
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn range_inclusive(&self, lo: u32, hi: u32) -> u32 {
        rand::rng().random_range(lo..=hi)
    }
}

/// 循环次数的闭区间 [min, max]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleRange {
    pub min: u32,
    pub max: u32,
}

impl CycleRange {
    pub const QUICK: CycleRange = CycleRange { min: 10, max: 30 };
    pub const LONG: CycleRange = CycleRange { min: 50, max: 70 };

    pub fn is_valid(&self) -> bool {
        self.min >= 1 && self.min <= self.max
    }

    pub fn draw(&self, rng: &dyn RandomSource) -> u32 {
        rng.range_inclusive(self.min, self.max)
    }

    /// 单个骰子最坏情况下的总等待步数：1 + 2 + ... + (max - 1)
    pub fn worst_case_steps(&self) -> u64 {
        let n = u64::from(self.max.saturating_sub(1));
        n * (n + 1) / 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub delay: Duration,
    pub face: Face,
}

/// 某个骰子在一轮动画中的全部步骤
#[derive(Debug, Clone)]
pub struct DicePlan {
    pub dice: usize,
    pub cycles: u32,
    pub steps: Vec<Step>,
}

impl DicePlan {
    /// 抽取循环次数 n，生成 n - 1 个步骤
    pub fn draw(dice: usize, range: CycleRange, step: Duration, rng: &dyn RandomSource) -> Self {
        let cycles = range.draw(rng);
        let steps = (1..cycles)
            .map(|i| {
                let index = rng.range_inclusive(0, FACE_COUNT as u32 - 1) as usize;
                Step {
                    delay: step * i,
                    face: Face::from_index(index).unwrap_or_default(),
                }
            })
            .collect();
        Self {
            dice,
            cycles,
            steps,
        }
    }

    pub fn total_delay(&self) -> Duration {
        self.steps.iter().map(|s| s.delay).sum()
    }

    /// 动画结束后骰子停留的面
    pub fn final_face(&self) -> Option<Face> {
        self.steps.last().map(|s| s.face)
    }
}

/// 按给定序列循环返回的随机源（结果会被限制在请求区间内）
#[cfg(test)]
#[derive(Debug)]
pub struct FixedSource {
    values: Vec<u32>,
    index: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl FixedSource {
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values,
            index: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
impl RandomSource for FixedSource {
    fn range_inclusive(&self, lo: u32, hi: u32) -> u32 {
        let idx = self
            .index
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.values[idx % self.values.len()].clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(10);

    #[test]
    fn test_iteration_count_within_range() {
        let rng = ThreadRngSource;
        for _ in 0..200 {
            let plan = DicePlan::draw(0, CycleRange::QUICK, STEP, &rng);
            assert!((10..=30).contains(&plan.cycles));
            assert_eq!(plan.steps.len() as u32, plan.cycles - 1);
            assert!((9..=29).contains(&plan.steps.len()));
        }
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        // 第一个值决定循环次数，超出区间会被限制到边界
        let low = FixedSource::new(vec![0]);
        assert_eq!(DicePlan::draw(0, CycleRange::QUICK, STEP, &low).steps.len(), 9);

        let high = FixedSource::new(vec![1000, 2]);
        assert_eq!(DicePlan::draw(0, CycleRange::QUICK, STEP, &high).steps.len(), 29);

        let long = FixedSource::new(vec![50]);
        assert_eq!(DicePlan::draw(0, CycleRange::LONG, STEP, &long).steps.len(), 49);
    }

    #[test]
    fn test_delays_grow_by_step() {
        let plan = DicePlan::draw(3, CycleRange::QUICK, STEP, &ThreadRngSource);
        for (i, step) in plan.steps.iter().enumerate() {
            assert_eq!(step.delay, STEP * (i as u32 + 1));
        }
        assert!(plan.steps.windows(2).all(|w| w[0].delay < w[1].delay));
    }

    #[test]
    fn test_faces_follow_source() {
        let rng = FixedSource::new(vec![4, 0, 5, 2]);
        let plan = DicePlan::draw(1, CycleRange { min: 4, max: 4 }, STEP, &rng);
        let faces: Vec<Face> = plan.steps.iter().map(|s| s.face).collect();
        assert_eq!(faces, vec![Face::One, Face::Six, Face::Three]);
        assert_eq!(plan.final_face(), Some(Face::Three));
    }

    #[test]
    fn test_total_delay() {
        let rng = FixedSource::new(vec![5, 1]);
        let plan = DicePlan::draw(0, CycleRange { min: 1, max: 10 }, STEP, &rng);
        // 10 + 20 + 30 + 40
        assert_eq!(plan.total_delay(), Duration::from_millis(100));
        assert_eq!(CycleRange { min: 1, max: 5 }.worst_case_steps(), 10);
    }

    #[test]
    fn test_single_cycle_has_no_steps() {
        let plan = DicePlan::draw(0, CycleRange { min: 1, max: 1 }, STEP, &ThreadRngSource);
        assert!(plan.steps.is_empty());
        assert_eq!(plan.final_face(), None);
        assert_eq!(plan.total_delay(), Duration::ZERO);
    }
}
