use figment::Jail;
use reel_config::ReelConfig;

#[test]
fn env_fills_api_section() {
    Jail::expect_with(|jail| {
        jail.set_env("REEL_API__BASE_URL", "https://render.internal");
        jail.set_env("REEL_API__ACCESS_TOKEN", "tok-from-env");

        let config = ReelConfig::load().expect("config loads");
        assert_eq!(config.api.base_url(), "https://render.internal");
        assert_eq!(config.api.access_token, "tok-from-env");
        Ok(())
    });
}

#[test]
fn env_overrides_render_defaults() {
    Jail::expect_with(|jail| {
        jail.set_env("REEL_RENDER__FORMAT", "gif");
        jail.set_env("REEL_RENDER__RESOLUTION", "1280x720");

        let config = ReelConfig::load().expect("config loads");
        assert_eq!(config.render.format, "gif");
        assert_eq!(config.render.resolution, "1280x720");
        assert_eq!(config.render.quality, "medium");
        Ok(())
    });
}

#[test]
fn unprefixed_env_is_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("POLLING__MAX_ATTEMPTS", "1");

        let config = ReelConfig::load().expect("config loads");
        assert_eq!(config.polling.max_attempts, 300);
        Ok(())
    });
}
