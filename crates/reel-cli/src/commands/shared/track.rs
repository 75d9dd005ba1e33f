use anyhow::{Context, bail};
use reel_tracker::{TaskApi, Tracker};
use tokio_util::sync::CancellationToken;

use crate::cli::GlobalFlags;
use crate::output::{JobReport, output};
use crate::progress::Progress;

/// Poll the tracked task to a terminal state and print the report.
///
/// Fails after printing when the generation did not succeed, so the exit
/// status reflects the outcome.
pub async fn follow<A: TaskApi>(
    tracker: &mut Tracker<A>,
    cancel: &CancellationToken,
    spinner: &Progress,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let outcome = tracker
        .run(cancel, |entry| spinner.set_message(entry.content()))
        .await;
    spinner.finish_clear();
    let outcome = outcome.context("tracking failed")?;

    let entry = tracker
        .engine()
        .linked_entry()
        .context("tracked entry missing from the log")?;
    let report = JobReport::from_entry(entry, outcome);
    output(&report, flags.output)?;

    if !outcome.is_success() {
        bail!("generation ended: {outcome}");
    }
    Ok(())
}
