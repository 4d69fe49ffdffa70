//! 线程实现：协调线程为每个骰子开一个线程，全部 join 后再通知 UI

use std::thread;

use crossbeam_channel::Sender;

use super::{BusyGuard, RotationEvent, RunContext, RunId};

pub(crate) fn launch(ctx: RunContext, guard: BusyGuard) {
    let run = ctx.run;
    let events = ctx.events.clone();
    let spawned = thread::Builder::new()
        .name("dice-rotate".to_string())
        .spawn(move || coordinate(ctx, guard));

    // 闭包随失败的 spawn 一起被丢弃，guard 也随之释放
    if let Err(err) = spawned {
        tracing::error!(%run, error = %err, "failed to spawn rotation thread");
        abandon(&events, run);
    }
}

/// 协调线程没能启动时直接结束这一轮，让按钮恢复
fn abandon(events: &Sender<RotationEvent>, run: RunId) {
    if events.send(RotationEvent::Finished { run }).is_err() {
        tracing::debug!(%run, "display closed before rotation finished");
    }
}

fn coordinate(ctx: RunContext, guard: BusyGuard) {
    let handles: Vec<_> = (0..ctx.dice_count)
        .filter_map(|dice| {
            let worker = ctx.clone();
            thread::Builder::new()
                .name(format!("dice-{dice}"))
                .spawn(move || rotate_dice(&worker, dice))
                .map_err(|err| {
                    tracing::warn!(run = %ctx.run, dice, error = %err, "failed to spawn dice thread");
                })
                .ok()
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            tracing::warn!(run = %ctx.run, "dice thread panicked");
        }
    }

    ctx.finish(guard);
}

fn rotate_dice(ctx: &RunContext, dice: usize) {
    let plan = ctx.plan(dice);
    for step in &plan.steps {
        thread::sleep(step.delay);
        let event = RotationEvent::Face {
            run: ctx.run,
            dice,
            face: step.face,
        };
        if !ctx.publish(event) {
            tracing::debug!(run = %ctx.run, dice, "display closed, stopping dice thread");
            return;
        }
    }
    tracing::debug!(run = %ctx.run, dice, face = ?plan.final_face(), "dice settled");
}
