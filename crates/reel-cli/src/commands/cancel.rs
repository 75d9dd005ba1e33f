use anyhow::Context;
use reel_core::ids::TaskId;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CancelArgs;
use crate::context::AppContext;
use crate::output::{CancelReport, output};

/// Handle `reel cancel`.
///
/// Only a 2xx response counts as acknowledged; anything else is an error.
pub async fn handle(args: &CancelArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let task_id = TaskId::new(args.task_id.as_str()).context("invalid task id")?;
    let ack = ctx
        .client
        .cancel(&task_id)
        .await
        .with_context(|| format!("failed to cancel {task_id}"))?;

    output(
        &CancelReport {
            task_id: task_id.to_string(),
            acknowledged: true,
            message: ack.message,
        },
        flags.output,
    )
}
