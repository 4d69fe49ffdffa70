//! 任务实现：协调任务把每个骰子的序列放进 JoinSet，全部完成后再通知 UI

use tokio::runtime::Handle;
use tokio::task::JoinSet;

use super::{BusyGuard, RotationEvent, RunContext};

pub(crate) fn launch(handle: &Handle, ctx: RunContext, guard: BusyGuard) {
    handle.spawn(coordinate(ctx, guard));
}

pub(crate) async fn coordinate(ctx: RunContext, guard: BusyGuard) {
    let mut set = JoinSet::new();
    for dice in 0..ctx.dice_count {
        let worker = ctx.clone();
        set.spawn(async move { rotate_dice(&worker, dice).await });
    }

    while let Some(result) = set.join_next().await {
        if let Err(err) = result {
            tracing::warn!(run = %ctx.run, error = %err, "dice task interrupted");
        }
    }

    ctx.finish(guard);
}

async fn rotate_dice(ctx: &RunContext, dice: usize) {
    let plan = ctx.plan(dice);
    for step in &plan.steps {
        tokio::time::sleep(step.delay).await;
        let event = RotationEvent::Face {
            run: ctx.run,
            dice,
            face: step.face,
        };
        if !ctx.publish(event) {
            tracing::debug!(run = %ctx.run, dice, "display closed, stopping dice task");
            return;
        }
    }
    tracing::debug!(run = %ctx.run, dice, face = ?plan.final_face(), "dice settled");
}
