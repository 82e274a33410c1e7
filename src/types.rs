use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_ROUTE: &str = "/api/health";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_LOAD_DURATION: Duration = Duration::from_secs(10);
pub const DEFAULT_RPS: u32 = 10;
pub const DEFAULT_MAX_CONCURRENCY: u32 = 100;
pub const DEFAULT_INCREMENT: u32 = 10;
pub const DEFAULT_ERROR_THRESHOLD: f64 = 30.0;

// ============================================================================
// Probe Outcome
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Timeout,
    Connection,
    ServerError,
    Other,
}

impl ErrorKind {
    pub fn from_reqwest_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection
        } else {
            ErrorKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Connection => "connection",
            ErrorKind::ServerError => "serverError",
            ErrorKind::Other => "other",
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "try increasing --timeout",
            ErrorKind::Connection => "is the server running?",
            ErrorKind::ServerError => "check the server logs",
            ErrorKind::Other => "",
        }
    }
}

/// Result of one timed GET against the target route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOutcome {
    pub succeeded: bool,
    pub latency_ms: f64,
    pub status: Option<u16>,
    pub error: Option<ErrorKind>,
}

impl ProbeOutcome {
    pub fn success(latency_ms: f64, status: u16) -> Self {
        Self {
            succeeded: true,
            latency_ms,
            status: Some(status),
            error: None,
        }
    }

    pub fn failure(latency_ms: f64, status: Option<u16>, kind: ErrorKind) -> Self {
        Self {
            succeeded: false,
            latency_ms,
            status,
            error: Some(kind),
        }
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Rates travel as `"x.xx%"` strings in the report document.
mod percent {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(rate: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::engine::format_rate(*rate))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim_end_matches('%')
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub timestamp: DateTime<Utc>,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Percentage, rounded to two decimals.
    #[serde(with = "percent")]
    pub error_rate: f64,
    pub avg_latency: f64,
    pub min_latency: f64,
    pub max_latency: f64,
    pub p95: f64,
    pub p99: f64,
    #[serde(default)]
    pub status_codes: BTreeMap<u16, u64>,
    /// Failure counts by kind.
    #[serde(default)]
    pub errors: BTreeMap<ErrorKind, u64>,
    pub requests_per_second: f64,
    pub duration_seconds: f64,
    pub interrupted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveSummary {
    pub concurrency_level: u32,
    pub successful: u64,
    pub failed: u64,
    #[serde(with = "percent")]
    pub error_rate: f64,
    pub avg_latency: f64,
    pub max_latency: f64,
    pub min_latency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StressOutcome {
    LimitReached,
    #[default]
    MaxLoadExhausted,
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressAnalysis {
    pub breaking_point: Option<u32>,
    pub verdict: String,
    #[serde(with = "percent")]
    pub max_error_rate: f64,
    pub average_latency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressReport {
    pub timestamp: DateTime<Utc>,
    pub waves: Vec<WaveSummary>,
    pub max_concurrency_reached: u32,
    pub breaking_point_hit: bool,
    pub outcome: StressOutcome,
    pub duration_seconds: f64,
    pub interrupted: bool,
    pub analysis: StressAnalysis,
}

/// One entry of the combined report document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PhaseReport {
    #[serde(rename = "LOAD_TEST")]
    Load(LoadReport),
    #[serde(rename = "STRESS_TEST")]
    Stress(StressReport),
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// 401, 403 and 404 count as success: the server answered.
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadSettings {
    pub duration: Duration,
    pub rps: u32,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            duration: DEFAULT_LOAD_DURATION,
            rps: DEFAULT_RPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StressSettings {
    pub max_concurrency: u32,
    pub increment: u32,
    pub error_threshold: f64,
}

impl Default for StressSettings {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            increment: DEFAULT_INCREMENT,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub base_url: String,
    pub candidate_routes: Vec<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub status_policy: StatusPolicy,
    pub load: LoadSettings,
    pub stress: StressSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            candidate_routes: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            status_policy: StatusPolicy::default(),
            load: LoadSettings::default(),
            stress: StressSettings::default(),
        }
    }
}

// ============================================================================
// Progress
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Progress {
    #[default]
    Idle,
    LoadBatch {
        second: u64,
        total_seconds: u64,
        sent: u64,
        failed: u64,
    },
    StressWave {
        wave: usize,
        concurrency: u32,
        error_rate: f64,
    },
    Finished,
}
