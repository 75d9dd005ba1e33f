use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Submit a render job and track it to completion. Ctrl-C cancels.
    Render(RenderArgs),
    /// Track a job that was already submitted.
    Watch(WatchArgs),
    /// Ask the server to revoke a job.
    Cancel(CancelArgs),
    /// List stored sessions.
    History(HistoryArgs),
    /// Show a stored session as a conversation.
    Open(OpenArgs),
}

#[derive(Clone, Debug, Args)]
pub struct RenderArgs {
    /// Natural-language description of the animation.
    pub query: String,

    /// Output container (defaults to `render.format`).
    #[arg(long)]
    pub format: Option<String>,

    /// Render quality: low, medium, high (defaults to `render.quality`).
    #[arg(long)]
    pub quality: Option<String>,

    /// Output resolution, e.g. 1280x720 (defaults to `render.resolution`).
    #[arg(long)]
    pub resolution: Option<String>,

    /// Append the result to an existing session.
    #[arg(long)]
    pub session: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct WatchArgs {
    /// Server-assigned task id.
    pub task_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct CancelArgs {
    /// Server-assigned task id.
    pub task_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct HistoryArgs {
    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Sessions per page (defaults to `history.page_size`, max 100).
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Args)]
pub struct OpenArgs {
    /// Session id as shown by `reel history`.
    pub session_id: String,

    /// Page to start searching from.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Sessions per page (defaults to `history.page_size`, max 100).
    #[arg(long)]
    pub limit: Option<u32>,
}
