use std::io;

use thiserror::Error;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("dice count must be between 1 and {max}, got {got}")]
    DiceCount { got: usize, max: usize },
    #[error("invalid cycle range {min}..={max}: need 1 <= min <= max")]
    CycleRange { min: u32, max: u32 },
    #[error("max cycle {got} exceeds the limit of {limit}")]
    CycleTooLong { got: u32, limit: u32 },
    #[error("step must be at least 1ms")]
    Step,
    #[error("step of {got_ms}ms exceeds the limit of {limit_ms}ms")]
    StepTooLong { got_ms: u128, limit_ms: u64 },
    #[error("invalid value for {name}: {value}")]
    Env { name: &'static str, value: String },
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Decode(#[from] toml::de::Error),
}

/// 状态文件读写错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file io: {0}")]
    Io(#[from] io::Error),
    #[error("state file is not valid toml: {0}")]
    Decode(#[from] toml::de::Error),
    #[error("failed to encode state: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// 启动一轮旋转失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotateError {
    #[error("dice are already rotating")]
    AlreadyRotating,
    #[error("there are no dice to rotate")]
    NoDice,
}
