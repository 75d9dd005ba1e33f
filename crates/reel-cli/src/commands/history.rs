use anyhow::Context;
use reel_tracker::Tracker;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::HistoryArgs;
use crate::commands::shared::limit::with_page_limit;
use crate::context::AppContext;
use crate::output::{HistoryView, output};

/// Handle `reel history`.
pub async fn handle(args: &HistoryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = with_page_limit(&ctx.config, args.limit);
    let tracker = Tracker::new(ctx.client.clone(), &config);
    let listing = tracker
        .load_history(args.page)
        .await
        .context("failed to load history")?;
    output(&HistoryView::new(listing, args.page.max(1)), flags.output)
}
