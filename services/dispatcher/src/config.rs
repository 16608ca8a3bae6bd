//! Configuration types and loading
//!
//! Config file path precedence: CLI `--config` > CONFIG_PATH env var >
//! `./prompt-dispatcher.toml`. API keys are never stored in the TOML; they
//! live in a separate line-oriented file named by `[sources]`.

use std::path::{Path, PathBuf};

use common::{Error, Result};
use serde::Deserialize;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
}

/// Completion API settings
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model identifiers, rotated round-robin in listed order.
    pub models: Vec<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Line-oriented input files
#[derive(Debug, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_keys_file")]
    pub keys_file: PathBuf,
    #[serde(default = "default_prompts_file")]
    pub prompts_file: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            keys_file: default_keys_file(),
            prompts_file: default_prompts_file(),
        }
    }
}

/// Randomized delay between successive dispatches, in seconds.
/// The sampled delay falls in the closed interval [min, max].
#[derive(Debug, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_min_delay")]
    pub min_delay_secs: f64,
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: default_min_delay(),
            max_delay_secs: default_max_delay(),
        }
    }
}

fn default_endpoint() -> String {
    "https://inference-api.nousresearch.com/v1/chat/completions".into()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    0.9
}

fn default_timeout() -> u64 {
    30
}

fn default_keys_file() -> PathBuf {
    PathBuf::from("api_keys.txt")
}

fn default_prompts_file() -> PathBuf {
    PathBuf::from("questions.txt")
}

fn default_min_delay() -> f64 {
    280.0
}

fn default_max_delay() -> f64 {
    580.0
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        if !config.api.endpoint.starts_with("http://")
            && !config.api.endpoint.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "endpoint must start with http:// or https://, got: {}",
                config.api.endpoint
            )));
        }

        if config.api.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".into()));
        }

        if config.pacing.min_delay_secs < 0.0 {
            return Err(Error::Config("min_delay_secs must not be negative".into()));
        }

        if config.pacing.min_delay_secs > config.pacing.max_delay_secs {
            return Err(Error::Config(format!(
                "min_delay_secs ({}) must not exceed max_delay_secs ({})",
                config.pacing.min_delay_secs, config.pacing.max_delay_secs
            )));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("prompt-dispatcher.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn minimal_toml() -> &'static str {
        r#"
[api]
models = ["Hermes-4-70B", "Hermes-4-405B"]
"#
    }

    #[test]
    fn minimal_config_applies_defaults() {
        let (_dir, path) = write_config(minimal_toml());

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.api.endpoint,
            "https://inference-api.nousresearch.com/v1/chat/completions"
        );
        assert_eq!(config.api.models, vec!["Hermes-4-70B", "Hermes-4-405B"]);
        assert_eq!(config.api.max_tokens, 4096);
        assert_eq!(config.api.temperature, 0.7);
        assert_eq!(config.api.top_p, 0.9);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.sources.keys_file, PathBuf::from("api_keys.txt"));
        assert_eq!(config.sources.prompts_file, PathBuf::from("questions.txt"));
        assert_eq!(config.pacing.min_delay_secs, 280.0);
        assert_eq!(config.pacing.max_delay_secs, 580.0);
    }

    #[test]
    fn custom_values_override_defaults() {
        let (_dir, path) = write_config(
            r#"
[api]
endpoint = "http://localhost:9000/v1/chat/completions"
models = ["test-model"]
max_tokens = 128
temperature = 0.2
top_p = 0.5
timeout_secs = 5

[sources]
keys_file = "/etc/dispatcher/keys"
prompts_file = "/etc/dispatcher/prompts"

[pacing]
min_delay_secs = 1.5
max_delay_secs = 3.0
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.endpoint, "http://localhost:9000/v1/chat/completions");
        assert_eq!(config.api.max_tokens, 128);
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.sources.keys_file, PathBuf::from("/etc/dispatcher/keys"));
        assert_eq!(config.pacing.min_delay_secs, 1.5);
        assert_eq!(config.pacing.max_delay_secs, 3.0);
    }

    #[test]
    fn missing_file_is_rejected() {
        let result = Config::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let (_dir, path) = write_config("not valid {{{{ toml");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn missing_models_field_is_rejected() {
        let (_dir, path) = write_config("[api]\n");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn endpoint_without_scheme_is_rejected() {
        let (_dir, path) = write_config(
            r#"
[api]
endpoint = "inference-api.nousresearch.com/v1/chat/completions"
models = ["m"]
"#,
        );

        let err = Config::load(&path).unwrap_err();
        assert!(
            err.to_string().contains("endpoint must start with http"),
            "error message should explain the issue, got: {err}"
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let (_dir, path) = write_config(
            r#"
[api]
models = ["m"]
timeout_secs = 0
"#,
        );
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn negative_min_delay_is_rejected() {
        let (_dir, path) = write_config(
            r#"
[api]
models = ["m"]

[pacing]
min_delay_secs = -1.0
max_delay_secs = 10.0
"#,
        );
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn inverted_delay_range_is_rejected() {
        let (_dir, path) = write_config(
            r#"
[api]
models = ["m"]

[pacing]
min_delay_secs = 30.0
max_delay_secs = 10.0
"#,
        );

        let err = Config::load(&path).unwrap_err();
        assert!(
            err.to_string().contains("must not exceed"),
            "got: {err}"
        );
    }

    #[test]
    fn equal_delay_bounds_are_accepted() {
        let (_dir, path) = write_config(
            r#"
[api]
models = ["m"]

[pacing]
min_delay_secs = 5.0
max_delay_secs = 5.0
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.pacing.min_delay_secs, config.pacing.max_delay_secs);
    }

    #[test]
    fn resolve_path_cli_arg() {
        let path = Config::resolve_path(Some("/custom/path.toml"));
        assert_eq!(path, PathBuf::from("/custom/path.toml"));
    }

    #[test]
    fn resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("/env/path.toml"));
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("prompt-dispatcher.toml"));
    }

    #[test]
    fn resolve_path_cli_overrides_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/should-lose.toml") };
        let path = Config::resolve_path(Some("/cli/wins.toml"));
        assert_eq!(
            path,
            PathBuf::from("/cli/wins.toml"),
            "CLI arg must take precedence over CONFIG_PATH env var"
        );
        unsafe { remove_env("CONFIG_PATH") };
    }
}
