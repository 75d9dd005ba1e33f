use anyhow::Context;
use reel_core::ids::TaskId;
use reel_tracker::{Tracker, notices};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::WatchArgs;
use crate::commands::shared::interrupt::InterruptGuard;
use crate::commands::shared::track::follow;
use crate::context::AppContext;
use crate::progress::Progress;

/// Handle `reel watch`.
pub async fn handle(args: &WatchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let task_id = TaskId::new(args.task_id.as_str()).context("invalid task id")?;
    let spinner = Progress::spinner(&notices::watching(task_id.as_str()));

    let mut tracker = Tracker::new(ctx.client.clone(), &ctx.config);
    tracker.watch(task_id)?;

    let interrupt = InterruptGuard::install();
    follow(&mut tracker, interrupt.token(), &spinner, flags).await
}
