mod config;
mod error;
mod models;
mod sequencer;
mod storage;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::{Overrides, Strategy, load_settings};
use crate::models::DiceRow;
use crate::sequencer::{Backend, Sequencer, ThreadRngSource};
use crate::storage::{load_state, save_state};
use crate::ui::{App, render};

/// 两帧之间等待按键的时间
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "dicebox", version, about = "在终端里掷一排骰子")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    /// 数据目录，默认 ~/.local/share/dicebox/
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

/// 获取数据目录路径 (~/.local/share/dicebox/)
fn get_data_dir(custom: Option<PathBuf>) -> io::Result<PathBuf> {
    let data_dir = match custom {
        Some(dir) => dir,
        None => dirs::data_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "无法获取用户数据目录"))?
            .join("dicebox"),
    };

    fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// 日志写入数据目录下的文件，避免干扰终端画面
fn init_logging(data_dir: &Path) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("dicebox.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = get_data_dir(cli.data_dir).context("failed to prepare data directory")?;
    init_logging(&data_dir).context("failed to open log file")?;

    let settings = load_settings(&data_dir.join("config.toml"), &cli.overrides)
        .context("invalid configuration")?;

    // 恢复上次的点数 (~/.local/share/dicebox/state.toml)
    let state_path = data_dir.join("state.toml");
    let saved = load_state(&state_path).unwrap_or_else(|err| {
        tracing::warn!(error = %err, path = %state_path.display(), "discarding unreadable state");
        Default::default()
    });
    let mut dice = DiceRow::new(settings.dice_count);
    let restored = dice.restore(&saved.dice);
    tracing::info!(restored, "dice state restored");

    // 任务模式使用单工作线程的运行时
    let runtime = match settings.strategy {
        Strategy::Tasks => Some(
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("dice-tasks")
                .enable_time()
                .build()
                .context("failed to build task runtime")?,
        ),
        Strategy::Threads => None,
    };
    let backend = match &runtime {
        Some(rt) => Backend::Tasks(rt.handle().clone()),
        None => Backend::Threads,
    };

    let (events_tx, events_rx) = crossbeam_channel::unbounded();
    let sequencer = Sequencer::new(&settings, backend, Arc::new(ThreadRngSource), events_tx);

    // 创建应用状态
    let mut app = App::new(dice, sequencer, events_rx);

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // 未完成的动画直接丢弃
    if app.sequencer().is_rotating() {
        tracing::info!("discarding unfinished rotation");
    }
    if let Some(rt) = runtime {
        rt.shutdown_background();
    }
    app.process_rotation_events();

    // 保存数据
    save_state(&mut app.dice, &state_path).context("failed to save dice state")?;
    println!("点数已保存到 {}", state_path.display());

    result.map_err(Into::into)
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        app.process_rotation_events();
        terminal.draw(|f| render(f, app))?;

        if event::poll(FRAME)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && ui::handle_key_event(app, key.code) {
                    break;
                }
            }
        }
    }
    Ok(())
}
