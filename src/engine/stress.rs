use crate::engine::Stats;
use crate::engine::probe::{Probe, fire};
use crate::engine::stats::round2;
use crate::types::{Progress, StressAnalysis, StressOutcome, StressReport, StressSettings, WaveSummary};
use chrono::Utc;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Escalating-concurrency sweep.
///
/// Waves run at `increment`, `2 * increment`, ... up to `max_concurrency`.
/// Each wave is fully joined before the next starts, so observed concurrency
/// equals the wave's level. The sweep stops on the first wave whose error
/// rate exceeds the threshold; the check is per wave, never cumulative.
pub struct StressPhase<'a, P> {
    probe: &'a P,
    settings: &'a StressSettings,
    progress_tx: &'a watch::Sender<Progress>,
    cancel_token: CancellationToken,
}

impl<'a, P: Probe> StressPhase<'a, P> {
    pub fn new(
        probe: &'a P,
        settings: &'a StressSettings,
        progress_tx: &'a watch::Sender<Progress>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            probe,
            settings,
            progress_tx,
            cancel_token,
        }
    }

    pub async fn run(self) -> StressReport {
        let StressSettings {
            max_concurrency,
            increment,
            error_threshold,
        } = *self.settings;

        tracing::info!(
            "Starting stress phase: up to {} concurrent, step {}",
            max_concurrency,
            increment
        );

        let start = Instant::now();
        let mut waves: Vec<WaveSummary> = Vec::new();
        let mut level = increment;

        let outcome = loop {
            if level == 0 || level > max_concurrency {
                break StressOutcome::MaxLoadExhausted;
            }
            if self.cancel_token.is_cancelled() {
                tracing::info!("Cancellation requested, stopping stress phase");
                break StressOutcome::Cancelled;
            }

            let results = fire(self.probe, level).await;
            let summary = Stats::from_outcomes(&results).into_wave_summary(level);
            let error_rate = summary.error_rate;
            waves.push(summary);

            tracing::info!(
                "Wave {}: {} concurrent, {:.2}% errors",
                waves.len(),
                level,
                error_rate
            );
            self.progress_tx.send_replace(Progress::StressWave {
                wave: waves.len(),
                concurrency: level,
                error_rate,
            });

            if error_rate > error_threshold {
                tracing::warn!(
                    "High error rate ({:.2}%) at {} concurrent requests, stopping",
                    error_rate,
                    level
                );
                break StressOutcome::LimitReached;
            }

            level = match level.checked_add(increment) {
                Some(next) => next,
                None => break StressOutcome::MaxLoadExhausted,
            };
        };

        build_report(waves, outcome, start.elapsed().as_secs_f64())
    }
}

fn build_report(waves: Vec<WaveSummary>, outcome: StressOutcome, elapsed_secs: f64) -> StressReport {
    let max_concurrency_reached = waves.last().map(|w| w.concurrency_level).unwrap_or(0);
    let breaking_point_hit = outcome == StressOutcome::LimitReached;

    let analysis = StressAnalysis {
        breaking_point: breaking_point_hit.then_some(max_concurrency_reached),
        verdict: verdict(outcome, max_concurrency_reached, waves.len()),
        max_error_rate: waves.iter().map(|w| w.error_rate).fold(0.0, f64::max),
        average_latency: if waves.is_empty() {
            0.0
        } else {
            round2(waves.iter().map(|w| w.avg_latency).sum::<f64>() / waves.len() as f64)
        },
    };

    StressReport {
        timestamp: Utc::now(),
        waves,
        max_concurrency_reached,
        breaking_point_hit,
        outcome,
        duration_seconds: round2(elapsed_secs),
        interrupted: outcome == StressOutcome::Cancelled,
        analysis,
    }
}

fn verdict(outcome: StressOutcome, level: u32, wave_count: usize) -> String {
    match outcome {
        StressOutcome::LimitReached => {
            format!("Failure detected at {} concurrent requests", level)
        }
        StressOutcome::MaxLoadExhausted if wave_count == 0 => {
            "No waves fit under the configured maximum".to_string()
        }
        StressOutcome::MaxLoadExhausted => {
            format!("System withstood the full sweep up to {} concurrent requests", level)
        }
        StressOutcome::Cancelled => format!("Sweep cancelled after {} waves", wave_count),
    }
}
