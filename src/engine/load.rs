use crate::engine::Stats;
use crate::engine::probe::{Probe, fire};
use crate::types::{LoadReport, LoadSettings, Progress};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Constant-rate phase: one burst of `rps` probes per second for the
/// configured duration, each burst fully settled before the next tick.
pub struct LoadPhase<'a, P> {
    probe: &'a P,
    settings: &'a LoadSettings,
    progress_tx: &'a watch::Sender<Progress>,
    cancel_token: CancellationToken,
}

impl<'a, P: Probe> LoadPhase<'a, P> {
    pub fn new(
        probe: &'a P,
        settings: &'a LoadSettings,
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

    pub async fn run(self) -> LoadReport {
        let total_seconds = self.settings.duration.as_secs();
        tracing::info!(
            "Starting load phase: {}s at {} req/s",
            total_seconds,
            self.settings.rps
        );

        let start = Instant::now();
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut outcomes = Vec::new();
        let mut failed = 0u64;
        let mut second = 0u64;
        let mut interrupted = false;

        loop {
            tokio::select! {
                biased;

                _ = self.cancel_token.cancelled() => {
                    tracing::info!("Cancellation requested, stopping load phase");
                    interrupted = true;
                    break;
                }
                _ = ticker.tick() => {}
            }

            if start.elapsed() >= self.settings.duration {
                break;
            }

            let batch = fire(self.probe, self.settings.rps).await;
            second += 1;
            failed += batch.iter().filter(|o| !o.succeeded).count() as u64;
            outcomes.extend(batch);

            tracing::debug!("Load batch {} settled ({} sent)", second, outcomes.len());
            self.progress_tx.send_replace(Progress::LoadBatch {
                second,
                total_seconds,
                sent: outcomes.len() as u64,
                failed,
            });
        }

        let elapsed = start.elapsed();
        let report = Stats::from_outcomes(&outcomes).into_load_report(elapsed, interrupted);
        tracing::info!(
            "Load phase finished: {} requests, {:.2}% errors",
            report.total_requests,
            report.error_rate
        );
        report
    }
}
