//! Checks run before the runtime binds anything.

use super::error::{ConfigError, ConfigResult};
use super::schema::{HookcordConfig, PlatformConfig, ServerConfig, StreamingConfig};

/// Validates the whole configuration, stopping at the first problem.
pub fn validate_config(config: &HookcordConfig) -> ConfigResult<()> {
    check_server(&config.server)?;
    check_platform(&config.platform)?;
    check_streaming(&config.streaming)
}

fn check_server(server: &ServerConfig) -> ConfigResult<()> {
    if server.host.trim().is_empty() {
        return Err(ConfigError::missing("server.host"));
    }
    if !server.path.starts_with('/') {
        return Err(ConfigError::invalid("server.path", "must start with '/'"));
    }
    Ok(())
}

fn check_platform(platform: &PlatformConfig) -> ConfigResult<()> {
    if platform.application_id.is_empty() {
        return Err(ConfigError::missing("platform.application_id"));
    }
    if platform.public_key.is_empty() {
        return Err(ConfigError::missing("platform.public_key"));
    }
    let key = platform.public_key.trim();
    if key.len() != 64 || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConfigError::invalid(
            "platform.public_key",
            "must be 64 hexadecimal characters",
        ));
    }

    let base = &platform.api_base;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl {
            key: "platform.api_base",
            url: base.clone(),
            reason: "expected an http:// or https:// root".into(),
        });
    }

    positive("platform.timeout_ms", platform.timeout_ms)
}

fn check_streaming(streaming: &StreamingConfig) -> ConfigResult<()> {
    positive("streaming.rate_limit_ms", streaming.rate_limit_ms)?;
    positive("streaming.character_limit", streaming.character_limit as u64)?;
    positive("streaming.channel_capacity", streaming.channel_capacity as u64)
}

fn positive(key: &'static str, value: u64) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::invalid(key, "must be greater than 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> HookcordConfig {
        let mut config = HookcordConfig::default();
        config.platform.application_id = "42".into();
        config.platform.public_key = "ab".repeat(32);
        config
    }

    fn rejected_key(config: &HookcordConfig) -> Option<&'static str> {
        validate_config(config).err().and_then(|e| e.key())
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_defaults_lack_credentials() {
        let result = validate_config(&HookcordConfig::default());
        assert!(matches!(
            result,
            Err(ConfigError::MissingField { key: "platform.application_id" })
        ));
    }

    #[test]
    fn test_rejections_name_the_key() {
        let mut config = valid();
        config.platform.public_key = "zz".repeat(32);
        assert_eq!(rejected_key(&config), Some("platform.public_key"));

        let mut config = valid();
        config.platform.public_key = "ab".repeat(31);
        assert_eq!(rejected_key(&config), Some("platform.public_key"));

        let mut config = valid();
        config.streaming.rate_limit_ms = 0;
        assert_eq!(rejected_key(&config), Some("streaming.rate_limit_ms"));

        let mut config = valid();
        config.streaming.character_limit = 0;
        assert_eq!(rejected_key(&config), Some("streaming.character_limit"));

        let mut config = valid();
        config.server.path = "interactions".into();
        assert_eq!(rejected_key(&config), Some("server.path"));
    }

    #[test]
    fn test_api_base_must_be_http() {
        let mut config = valid();
        config.platform.api_base = "ftp://x".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { key: "platform.api_base", .. })
        ));
    }
}
