use anyhow::{Context, bail};
use reel_config::RenderConfig;
use reel_core::enums::TerminalOutcome;
use reel_core::ids::SessionId;
use reel_tracker::{RenderOptions, Tracker, TrackerError, notices};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RenderArgs;
use crate::commands::shared::interrupt::InterruptGuard;
use crate::commands::shared::track::follow;
use crate::context::AppContext;
use crate::output::{JobReport, output};
use crate::progress::Progress;

/// Handle `reel render`.
pub async fn handle(args: &RenderArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut tracker = Tracker::new(ctx.client.clone(), &ctx.config);
    tracker.set_options(render_options(args, &ctx.config.render));
    if let Some(session) = &args.session {
        let session = SessionId::new(session.as_str()).context("invalid --session")?;
        tracker.continue_session(session);
    }

    let interrupt = InterruptGuard::install();
    let spinner = Progress::spinner(notices::PLACEHOLDER);

    match tracker.submit(&args.query, interrupt.token()).await {
        Ok(task_id) => {
            tracing::debug!(%task_id, "render submitted");
            spinner.set_message(&notices::watching(task_id.as_str()));
        }
        Err(TrackerError::Abandoned) => {
            spinner.finish_clear();
            if let Some(entry) = tracker.log().last() {
                output(
                    &JobReport::from_entry(entry, TerminalOutcome::CancelledLocally),
                    flags.output,
                )?;
            }
            bail!("render cancelled before the server accepted it");
        }
        Err(error) => {
            spinner.finish_err(&notices::submit_failed(&error.to_string()));
            return Err(error).context("render submission failed");
        }
    }

    follow(&mut tracker, interrupt.token(), &spinner, flags).await
}

fn render_options(args: &RenderArgs, defaults: &RenderConfig) -> RenderOptions {
    let mut options = RenderOptions::from(defaults);
    if let Some(format) = &args.format {
        options.format.clone_from(format);
    }
    if let Some(quality) = &args.quality {
        options.quality.clone_from(quality);
    }
    if let Some(resolution) = &args.resolution {
        options.resolution.clone_from(resolution);
    }
    options
}
