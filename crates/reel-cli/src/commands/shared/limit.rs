use reel_config::ReelConfig;

/// Configuration with the history page size overridden by `--limit`.
#[must_use]
pub fn with_page_limit(config: &ReelConfig, limit: Option<u32>) -> ReelConfig {
    let mut config = config.clone();
    if let Some(limit) = limit {
        config.history.page_size = limit;
    }
    config
}
