use anyhow::Context;
use reel_client::ApiClient;
use reel_config::ReelConfig;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: ReelConfig,
    pub client: ApiClient,
}

impl AppContext {
    pub fn init(config: ReelConfig) -> anyhow::Result<Self> {
        let client = ApiClient::new(&config.api).context("failed to build HTTP client")?;
        tracing::debug!(base_url = client.base_url(), "render service client ready");
        Ok(Self { config, client })
    }
}

/// Load `.env` and the layered configuration.
pub fn load_config() -> anyhow::Result<ReelConfig> {
    ReelConfig::load_with_dotenv().context("failed to load reel configuration")
}

pub fn warn_unconfigured(config: &ReelConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &ReelConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.api.is_configured() {
        if has_single_underscore_prefix(&env_keys, "REEL_API_") {
            warnings.push(
                "API token appears unset while REEL_API* env vars exist. Use double underscores (example: REEL_API__ACCESS_TOKEN)."
                    .to_string(),
            );
        } else {
            warnings.push(
                "No API access token configured; requests are sent unauthenticated. Set REEL_API__ACCESS_TOKEN or api.access_token."
                    .to_string(),
            );
        }
    }

    if has_single_underscore_prefix(&env_keys, "REEL_POLLING_") {
        warnings.push(
            "REEL_POLLING* env vars use a single underscore and are ignored. Use double underscores (example: REEL_POLLING__MAX_ATTEMPTS)."
                .to_string(),
        );
    }

    warnings
}

/// `prefix` must end in `_`; keys using the `__` section separator don't match.
fn has_single_underscore_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter()
        .any(|key| key.starts_with(prefix) && !key.starts_with(&format!("{prefix}_")))
}
