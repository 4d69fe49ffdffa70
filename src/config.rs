//! 配置加载
//!
//! 优先级：默认值 < config.toml < 环境变量 < 命令行

use std::fs;
use std::path::Path;
use std::time::Duration;

use clap::{Args, ValueEnum};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::sequencer::CycleRange;

/// 最多显示的骰子数量
pub const MAX_DICE: usize = 12;

/// 循环次数上限
pub const MAX_CYCLE: u32 = 1000;

/// 单步基础延迟上限（毫秒）
pub const MAX_STEP_MS: u64 = 1000;

/// 动画的并发实现方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// 每个骰子一个线程，通过消息通知 UI
    Threads,
    /// 单线程运行时上的协作任务
    #[default]
    Tasks,
}

/// 预设的循环次数区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CyclePreset {
    /// 10..=30
    Quick,
    /// 50..=70
    Long,
}

impl CyclePreset {
    pub fn range(self) -> CycleRange {
        match self {
            CyclePreset::Quick => CycleRange::QUICK,
            CyclePreset::Long => CycleRange::LONG,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub dice_count: usize,
    pub cycles: CycleRange,
    pub step: Duration,
    pub strategy: Strategy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dice_count: 5,
            cycles: CycleRange::QUICK,
            step: Duration::from_millis(10),
            strategy: Strategy::default(),
        }
    }
}

/// config.toml 的内容，所有字段均可省略
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub dice: Option<usize>,
    pub cycles: Option<CyclePreset>,
    pub min_cycle: Option<u32>,
    pub max_cycle: Option<u32>,
    pub step_ms: Option<u64>,
    pub strategy: Option<Strategy>,
}

/// 命令行覆盖项
#[derive(Debug, Default, Clone, Args)]
pub struct Overrides {
    /// 骰子数量
    #[arg(long = "dice")]
    pub dice: Option<usize>,
    /// 循环次数预设
    #[arg(long, value_enum)]
    pub cycles: Option<CyclePreset>,
    /// 最少循环次数
    #[arg(long)]
    pub min_cycle: Option<u32>,
    /// 最多循环次数
    #[arg(long)]
    pub max_cycle: Option<u32>,
    /// 每一步的基础延迟（毫秒）
    #[arg(long)]
    pub step_ms: Option<u64>,
    /// 并发实现方式
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,
}

impl Settings {
    fn apply(
        &mut self,
        dice: Option<usize>,
        cycles: Option<CyclePreset>,
        min_cycle: Option<u32>,
        max_cycle: Option<u32>,
        step_ms: Option<u64>,
        strategy: Option<Strategy>,
    ) {
        if let Some(v) = dice {
            self.dice_count = v;
        }
        if let Some(preset) = cycles {
            self.cycles = preset.range();
        }
        if let Some(v) = min_cycle {
            self.cycles.min = v;
        }
        if let Some(v) = max_cycle {
            self.cycles.max = v;
        }
        if let Some(v) = step_ms {
            self.step = Duration::from_millis(v);
        }
        if let Some(v) = strategy {
            self.strategy = v;
        }
    }

    pub fn apply_file(&mut self, file: FileSettings) {
        self.apply(
            file.dice,
            file.cycles,
            file.min_cycle,
            file.max_cycle,
            file.step_ms,
            file.strategy,
        );
    }

    /// 读取 DICEBOX_* 环境变量，`lookup` 便于测试时替换
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dice = parse_env(&lookup, "DICEBOX_DICE")?;
        let min_cycle = parse_env(&lookup, "DICEBOX_MIN_CYCLE")?;
        let max_cycle = parse_env(&lookup, "DICEBOX_MAX_CYCLE")?;
        let step_ms = parse_env(&lookup, "DICEBOX_STEP_MS")?;
        let strategy = match lookup("DICEBOX_STRATEGY") {
            Some(v) => Some(Strategy::from_str(&v, true).map_err(|_| ConfigError::Env {
                name: "DICEBOX_STRATEGY",
                value: v,
            })?),
            None => None,
        };
        self.apply(dice, None, min_cycle, max_cycle, step_ms, strategy);
        Ok(())
    }

    pub fn apply_overrides(&mut self, o: &Overrides) {
        self.apply(
            o.dice,
            o.cycles,
            o.min_cycle,
            o.max_cycle,
            o.step_ms,
            o.strategy,
        );
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dice_count == 0 || self.dice_count > MAX_DICE {
            return Err(ConfigError::DiceCount {
                got: self.dice_count,
                max: MAX_DICE,
            });
        }
        if !self.cycles.is_valid() {
            return Err(ConfigError::CycleRange {
                min: self.cycles.min,
                max: self.cycles.max,
            });
        }
        if self.cycles.max > MAX_CYCLE {
            return Err(ConfigError::CycleTooLong {
                got: self.cycles.max,
                limit: MAX_CYCLE,
            });
        }
        if self.step < Duration::from_millis(1) {
            return Err(ConfigError::Step);
        }
        if self.step > Duration::from_millis(MAX_STEP_MS) {
            return Err(ConfigError::StepTooLong {
                got_ms: self.step.as_millis(),
                limit_ms: MAX_STEP_MS,
            });
        }
        Ok(())
    }
}

fn parse_env<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { name, value }),
        None => Ok(None),
    }
}

/// 按优先级合并所有配置来源
pub fn load_settings(config_path: &Path, overrides: &Overrides) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    if config_path.exists() {
        let raw = fs::read_to_string(config_path)?;
        let file: FileSettings = toml::from_str(&raw)?;
        settings.apply_file(file);
    }

    settings.apply_env(|name| std::env::var(name).ok())?;
    settings.apply_overrides(overrides);
    settings.validate()?;

    tracing::info!(
        dice = settings.dice_count,
        min_cycle = settings.cycles.min,
        max_cycle = settings.cycles.max,
        step_ms = settings.step.as_millis() as u64,
        strategy = ?settings.strategy,
        "settings loaded"
    );
    Ok(settings)
}
