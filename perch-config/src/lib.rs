//! Loader for bot configuration with YAML + environment overlays.
//!
//! The schema covers the four posting credentials, the dataset and scratch
//! file locations, logging, and whether a failed credential check aborts the
//! run. Credential fields default to `${VAR}` placeholders so a deployment
//! with no config file at all can run purely off environment variables.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct PerchConfig {
    #[serde(default)]
    pub credentials: TwitterCredentials,
    /// CSV of candidate page URLs, one `BIRD URLs` column.
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,
    /// Where the downloaded image briefly lives between download and post.
    #[serde(default = "default_scratch_path")]
    pub scratch_path: String,
    /// Log directory; `None` falls back to `PERCH_LOG_DIR` or `./logs`.
    #[serde(default)]
    pub log_dir: Option<String>,
    /// Abort the run when credential verification fails. The historical
    /// behavior is advisory-only, so this defaults to `false`.
    #[serde(default)]
    pub auth_failure_fatal: bool,
}

impl Default for PerchConfig {
    fn default() -> Self {
        Self {
            credentials: TwitterCredentials::default(),
            dataset_path: default_dataset_path(),
            scratch_path: default_scratch_path(),
            log_dir: None,
            auth_failure_fatal: false,
        }
    }
}

/// The four opaque OAuth 1.0a credential strings for the posting service.
#[derive(Debug, Deserialize)]
pub struct TwitterCredentials {
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_api_secret_key")]
    pub api_secret_key: String,
    #[serde(default = "default_access_token")]
    pub access_token: String,
    #[serde(default = "default_access_token_secret")]
    pub access_token_secret: String,
}

impl Default for TwitterCredentials {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            api_secret_key: default_api_secret_key(),
            access_token: default_access_token(),
            access_token_secret: default_access_token_secret(),
        }
    }
}

fn default_dataset_path() -> String {
    "bird_data/bird_urls.csv".into()
}
fn default_scratch_path() -> String {
    "bird_data/bird.jpg".into()
}
fn default_api_key() -> String {
    "${TWITTER_API_KEY}".into()
}
fn default_api_secret_key() -> String {
    "${TWITTER_API_SECRET_KEY}".into()
}
fn default_access_token() -> String {
    "${TWITTER_API_TOKEN}".into()
}
fn default_access_token_secret() -> String {
    "${TWITTER_API_SECRET_TOKEN}".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct PerchConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PerchConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PerchConfigLoader {
    /// Start with sensible defaults: YAML file + `PERCH_` env overrides.
    ///
    /// ```
    /// use perch_config::PerchConfigLoader;
    ///
    /// let config = PerchConfigLoader::new()
    ///     .with_yaml_str("dataset_path: birds.csv")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.dataset_path, "birds.csv");
    /// assert!(!config.auth_failure_fatal);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("PERCH").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by
    /// suffix. The file is optional so headless deployments can rely purely
    /// on environment variables and the schema defaults.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly
    /// typed config.
    ///
    /// The loader combines YAML snippets with `PERCH_`-prefixed environment
    /// variables and expands `${VAR}` placeholders before materialising the
    /// typed struct.
    ///
    /// ```
    /// use perch_config::PerchConfigLoader;
    ///
    /// unsafe { std::env::set_var("DEMO_BIRD_TOKEN", "injected-from-env"); }
    ///
    /// let config = PerchConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// credentials:
    ///   api_key: "demo-key"
    ///   api_secret_key: "demo-secret"
    ///   access_token: "${DEMO_BIRD_TOKEN}"
    ///   access_token_secret: "demo-token-secret"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.credentials.access_token, "injected-from-env");
    /// assert_eq!(config.dataset_path, "bird_data/bird_urls.csv");
    ///
    /// unsafe { std::env::remove_var("DEMO_BIRD_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<PerchConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        // Recursively expand environment variables
        expand_env_in_value(&mut v);

        let typed: PerchConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temp_env;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_nested_credentials_object() {
        temp_env::with_vars(
            [
                ("TW_KEY", Some("k")),
                ("TW_SECRET", Some("s")),
            ],
            || {
                let mut v = json!({
                    "credentials": {
                        "api_key": "${TW_KEY}",
                        "api_secret_key": "${TW_SECRET}"
                    }
                });
                expand_env_in_value(&mut v);
                assert_eq!(v["credentials"]["api_key"], json!("k"));
                assert_eq!(v["credentials"]["api_secret_key"], json!("s"));
            },
        );
    }

    #[test]
    fn stops_on_cycles_and_leaves_value_reasonable() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            // With the depth cap this terminates rather than looping forever.
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }
}
