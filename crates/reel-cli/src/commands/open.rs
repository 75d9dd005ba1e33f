use anyhow::Context;
use reel_core::ids::SessionId;
use reel_tracker::Tracker;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::OpenArgs;
use crate::commands::shared::limit::with_page_limit;
use crate::context::AppContext;
use crate::output::{ConversationView, output};

/// Handle `reel open`.
pub async fn handle(args: &OpenArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session_id = SessionId::new(args.session_id.as_str()).context("invalid session id")?;
    let config = with_page_limit(&ctx.config, args.limit);
    let mut tracker = Tracker::new(ctx.client.clone(), &config);

    let session = tracker
        .open_session(&session_id, args.page)
        .await
        .with_context(|| format!("failed to open session {session_id}"))?;

    output(
        &ConversationView {
            session_id: session.id.to_string(),
            chat_name: session.chat_name,
            entries: tracker.log().entries().to_vec(),
        },
        flags.output,
    )
}
