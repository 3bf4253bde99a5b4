use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::error::ApiClientError;

pub const DEFAULT_SETTINGS_FILE: &str = "crowd_client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    /// Zero disables the per-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000/api".into(),
            request_timeout_secs: 30,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `crowd_client.toml` in the working directory, then the environment.
pub fn load_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();

    match read_settings_file(Path::new(DEFAULT_SETTINGS_FILE)) {
        Ok(Some(file_cfg)) => apply_file_settings(&mut settings, file_cfg),
        Ok(None) => {}
        Err(error) => warn!(%error, "ignoring unreadable client settings file"),
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings
}

fn read_settings_file(path: &Path) -> anyhow::Result<Option<FileSettings>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let parsed = toml::from_str::<FileSettings>(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
    Ok(Some(parsed))
}

fn apply_file_settings(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
}

fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CROWD_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(error) => warn!(value = %v, %error, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }
}

/// Validates the base URL and strips trailing slashes so route paths can be appended.
pub fn normalize_api_base_url(raw: &str) -> Result<String, ApiClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| ApiClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiClientError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn default_settings_point_at_local_api() {
        let settings = ClientSettings::default();
        assert_eq!(settings.api_base_url, "http://127.0.0.1:5000/api");
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn zero_timeout_disables_request_timeout() {
        let settings = ClientSettings {
            request_timeout_secs: 0,
            ..ClientSettings::default()
        };
        assert_eq!(settings.request_timeout(), None);
    }

    #[test]
    fn app_prefixed_env_var_wins_over_short_name() {
        let vars = HashMap::from([
            ("CROWD_API_URL", "http://short:1/api"),
            ("APP__API_BASE_URL", "http://prefixed:2/api"),
            ("APP__REQUEST_TIMEOUT_SECS", "5"),
        ]);
        let mut settings = ClientSettings::default();
        apply_env_overrides(&mut settings, |name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(settings.api_base_url, "http://prefixed:2/api");
        assert_eq!(settings.request_timeout_secs, 5);
    }

    #[test]
    fn invalid_timeout_env_var_keeps_previous_value() {
        let mut settings = ClientSettings::default();
        apply_env_overrides(&mut settings, |name| {
            (name == "APP__REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn reads_settings_file_fields() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let temp_root = env::temp_dir().join(format!("crowd_client_settings_test_{suffix}"));
        fs::create_dir_all(&temp_root).expect("temp root");
        let path = temp_root.join(DEFAULT_SETTINGS_FILE);
        fs::write(
            &path,
            "api_base_url = \"http://gym.local:8080/api\"\nrequest_timeout_secs = 0\n",
        )
        .expect("write settings");

        let file_cfg = read_settings_file(&path)
            .expect("read settings")
            .expect("settings present");
        let mut settings = ClientSettings::default();
        apply_file_settings(&mut settings, file_cfg);
        assert_eq!(settings.api_base_url, "http://gym.local:8080/api");
        assert_eq!(settings.request_timeout_secs, 0);

        fs::remove_dir_all(temp_root).expect("cleanup");
    }

    #[test]
    fn missing_settings_file_is_not_an_error() {
        let path = env::temp_dir().join("crowd_client_settings_does_not_exist.toml");
        assert!(read_settings_file(&path).expect("read").is_none());
    }

    #[test]
    fn normalizes_trailing_slash() {
        assert_eq!(
            normalize_api_base_url("http://127.0.0.1:5000/api/").expect("url"),
            "http://127.0.0.1:5000/api"
        );
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(matches!(
            normalize_api_base_url("ftp://example.com/api"),
            Err(ApiClientError::InvalidBaseUrl { .. })
        ));
        assert!(normalize_api_base_url("not a url").is_err());
    }
}
