use serde::Serialize;

use crate::cli::OutputFormat;

mod views;

pub use views::{CancelReport, ConversationView, HistoryView, JobReport};

/// A response that also has a human-readable rendering.
pub trait TextView: Serialize {
    fn to_text(&self) -> String;
}

/// Render a response to a string in the requested format.
pub fn render<T: TextView>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Text => Ok(value.to_text()),
    }
}

/// Print a response in the requested format.
pub fn output<T: TextView>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}
