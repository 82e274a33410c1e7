use std::path::PathBuf;

/// Rejected input. Raised before any probe is sent.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("unsupported URL scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),

    #[error("`rps` must be a positive integer")]
    ZeroRps,

    #[error("load duration must be at least one second")]
    ZeroDuration,

    #[error("`max_concurrency` must be a positive integer")]
    ZeroConcurrency,

    #[error("`increment` must be a positive integer")]
    ZeroIncrement,

    #[error("error threshold must be between 0 and 100 (got {0})")]
    ThresholdOutOfRange(f64),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable `{0}` not set")]
    MissingEnvVar(String),

    #[error("invalid routes JSON (expected an array of strings): {0}")]
    RoutesJson(#[source] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("file '{}' already exists, use --force to overwrite", .0.display())]
    FileExists(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
