//! Default render options and history paging.

use serde::{Deserialize, Serialize};

fn default_format() -> String {
    "mp4".to_string()
}

fn default_quality() -> String {
    "medium".to_string()
}

fn default_resolution() -> String {
    "1920x1080".to_string()
}

/// Default history page size.
const fn default_page_size() -> u32 {
    5
}

/// Largest page the history endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Options sent with every submission unless overridden on the command line.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default = "default_quality")]
    pub quality: String,

    #[serde(default = "default_resolution")]
    pub resolution: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            quality: default_quality(),
            resolution: default_resolution(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl HistoryConfig {
    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let render = RenderConfig::default();
        assert_eq!(render.format, "mp4");
        assert_eq!(render.quality, "medium");
        assert_eq!(render.resolution, "1920x1080");
        assert_eq!(HistoryConfig::default().page_size, 5);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(HistoryConfig { page_size: 0 }.effective_page_size(), 1);
        assert_eq!(HistoryConfig { page_size: 500 }.effective_page_size(), 100);
        assert_eq!(HistoryConfig { page_size: 15 }.effective_page_size(), 15);
    }
}
