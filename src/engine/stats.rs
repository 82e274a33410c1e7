use crate::types::{ErrorKind, LoadReport, ProbeOutcome, WaveSummary};
use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Duration;

/// Reduction of a set of probe outcomes. Input order does not matter.
///
/// Every rate degrades to zero on empty input so an instantly failing phase
/// still produces a finite, well-formed report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub error_rate: f64,
    pub avg_latency: f64,
    pub min_latency: f64,
    pub max_latency: f64,
    pub p95: f64,
    pub p99: f64,
    pub status_codes: BTreeMap<u16, u64>,
    pub errors: BTreeMap<ErrorKind, u64>,
}

impl Stats {
    pub fn from_outcomes(outcomes: &[ProbeOutcome]) -> Self {
        let mut latencies: Vec<f64> = outcomes
            .iter()
            .filter(|o| o.succeeded)
            .map(|o| o.latency_ms)
            .collect();
        latencies.sort_by(f64::total_cmp);

        let mut status_codes = BTreeMap::new();
        let mut errors = BTreeMap::new();
        for outcome in outcomes {
            if let Some(status) = outcome.status {
                *status_codes.entry(status).or_insert(0) += 1;
            }
            if let Some(kind) = outcome.error {
                *errors.entry(kind).or_insert(0) += 1;
            }
        }

        let total = outcomes.len() as u64;
        let successful = latencies.len() as u64;
        let failed = total - successful;

        Self {
            total,
            successful,
            failed,
            error_rate: error_rate(failed, total),
            avg_latency: mean(&latencies),
            min_latency: round2(latencies.first().copied().unwrap_or(0.0)),
            max_latency: round2(latencies.last().copied().unwrap_or(0.0)),
            p95: round2(percentile(&latencies, 0.95)),
            p99: round2(percentile(&latencies, 0.99)),
            status_codes,
            errors,
        }
    }

    pub fn requests_per_sec(&self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            round2(self.total as f64 / secs)
        } else {
            0.0
        }
    }

    pub fn into_load_report(self, elapsed: Duration, interrupted: bool) -> LoadReport {
        LoadReport {
            timestamp: Utc::now(),
            requests_per_second: self.requests_per_sec(elapsed),
            total_requests: self.total,
            successful_requests: self.successful,
            failed_requests: self.failed,
            error_rate: self.error_rate,
            avg_latency: self.avg_latency,
            min_latency: self.min_latency,
            max_latency: self.max_latency,
            p95: self.p95,
            p99: self.p99,
            status_codes: self.status_codes,
            errors: self.errors,
            duration_seconds: round2(elapsed.as_secs_f64()),
            interrupted,
        }
    }

    pub fn into_wave_summary(self, concurrency_level: u32) -> WaveSummary {
        WaveSummary {
            concurrency_level,
            successful: self.successful,
            failed: self.failed,
            error_rate: self.error_rate,
            avg_latency: self.avg_latency,
            max_latency: self.max_latency,
            min_latency: self.min_latency,
        }
    }
}

/// Failed share in percent, two decimals.
pub fn error_rate(failed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(failed as f64 / total as f64 * 100.0)
}

/// Nearest-rank on ascending input: index `floor(p * n)`.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((p * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    round2(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate)
}
