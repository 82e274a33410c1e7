use crate::cli::{LoadOptions, StressOptions, TargetArgs};
use crate::engine::parse_base_url;
use crate::error::ConfigError;
use crate::types::{
    DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_ERROR_THRESHOLD, DEFAULT_INCREMENT,
    DEFAULT_LOAD_DURATION, DEFAULT_MAX_CONCURRENCY, DEFAULT_RPS, DEFAULT_TIMEOUT, EngineConfig,
    LoadSettings, StatusPolicy, StressSettings,
};
use regex_lite::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub load: LoadSection,
    #[serde(default)]
    pub stress: StressSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct TargetConfig {
    pub base_url: Option<String>,
    #[serde(default)]
    pub routes: Vec<String>,
    #[serde(default, with = "humantime_serde::option")]
    pub timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    pub connect_timeout: Option<Duration>,
    #[serde(default)]
    pub strict_status: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoadSection {
    #[serde(default, with = "humantime_serde::option")]
    pub duration: Option<Duration>,
    pub rps: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StressSection {
    pub max_concurrency: Option<u32>,
    pub increment: Option<u32>,
    pub error_threshold: Option<f64>,
}

pub fn load_config(path: &Path) -> Result<TomlConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let content = interpolate_env_vars(&content)?;

    Ok(toml::from_str(&content)?)
}

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Expand `${VAR}` and `${VAR:-default}`.
fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in ENV_VAR.captures_iter(content) {
        let (Some(full_match), Some(var_expr)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let var_expr = var_expr.as_str();

        let (var_name, default) = match var_expr.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (var_expr, None),
        };

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => return Err(ConfigError::MissingEnvVar(var_name.to_string())),
            },
        };

        result = result.replace(full_match.as_str(), &value);
    }

    Ok(result)
}

fn parse_routes_json(raw: &str) -> Result<Vec<String>, ConfigError> {
    serde_json::from_str(raw).map_err(ConfigError::RoutesJson)
}

/// Merge command line, config file and defaults, in that order of precedence.
pub fn merge_config(
    target: &TargetArgs,
    load: Option<&LoadOptions>,
    stress: Option<&StressOptions>,
    toml: Option<TomlConfig>,
) -> Result<EngineConfig, ConfigError> {
    let toml = toml.unwrap_or_default();

    let base_url = target
        .base_url
        .clone()
        .or(toml.target.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let candidate_routes = if !target.routes.is_empty() {
        target.routes.clone()
    } else if let Some(raw) = &target.routes_json {
        parse_routes_json(raw)?
    } else {
        toml.target.routes
    };

    let timeout = target
        .timeout
        .or(toml.target.timeout)
        .unwrap_or(DEFAULT_TIMEOUT);
    let connect_timeout = target
        .connect_timeout
        .or(toml.target.connect_timeout)
        .unwrap_or(DEFAULT_CONNECT_TIMEOUT);

    let status_policy = if target.strict_status || toml.target.strict_status {
        StatusPolicy::Strict
    } else {
        StatusPolicy::Lenient
    };

    let load = LoadSettings {
        duration: load
            .and_then(|l| l.duration)
            .or(toml.load.duration)
            .unwrap_or(DEFAULT_LOAD_DURATION),
        rps: load
            .and_then(|l| l.rps)
            .or(toml.load.rps)
            .unwrap_or(DEFAULT_RPS),
    };

    let stress = StressSettings {
        max_concurrency: stress
            .and_then(|s| s.max_concurrency)
            .or(toml.stress.max_concurrency)
            .unwrap_or(DEFAULT_MAX_CONCURRENCY),
        increment: stress
            .and_then(|s| s.increment)
            .or(toml.stress.increment)
            .unwrap_or(DEFAULT_INCREMENT),
        error_threshold: stress
            .and_then(|s| s.error_threshold)
            .or(toml.stress.error_threshold)
            .unwrap_or(DEFAULT_ERROR_THRESHOLD),
    };

    let config = EngineConfig {
        base_url,
        candidate_routes,
        timeout,
        connect_timeout,
        status_policy,
        load,
        stress,
    };
    validate(&config)?;
    Ok(config)
}

pub fn build_config(
    target: &TargetArgs,
    load: Option<&LoadOptions>,
    stress: Option<&StressOptions>,
) -> Result<EngineConfig, ConfigError> {
    let toml = match &target.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    merge_config(target, load, stress, toml)
}

pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    parse_base_url(&config.base_url)?;

    if config.timeout.is_zero() {
        return Err(ConfigError::ZeroTimeout);
    }
    if config.load.rps == 0 {
        return Err(ConfigError::ZeroRps);
    }
    if config.load.duration < Duration::from_secs(1) {
        return Err(ConfigError::ZeroDuration);
    }
    if config.stress.max_concurrency == 0 {
        return Err(ConfigError::ZeroConcurrency);
    }
    if config.stress.increment == 0 {
        return Err(ConfigError::ZeroIncrement);
    }

    let threshold = config.stress.error_threshold;
    if !(0.0..=100.0).contains(&threshold) {
        return Err(ConfigError::ThresholdOutOfRange(threshold));
    }

    Ok(())
}
