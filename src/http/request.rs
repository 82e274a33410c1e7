use crate::http::classify::{Classification, classify_status};
use crate::types::{ErrorKind, ProbeOutcome, StatusPolicy};
use reqwest::Client;
use std::time::Instant;

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Issue one GET and classify it. Never retries.
pub async fn execute_probe(client: &Client, url: &str, policy: StatusPolicy) -> ProbeOutcome {
    let start = Instant::now();

    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            // Consume body to allow connection reuse
            let drained = response.bytes().await;
            let latency_ms = elapsed_ms(start);

            if let Err(err) = drained {
                return ProbeOutcome::failure(
                    latency_ms,
                    Some(status),
                    ErrorKind::from_reqwest_error(&err),
                );
            }

            match classify_status(status, policy) {
                Classification::Success => ProbeOutcome::success(latency_ms, status),
                Classification::Tolerated(code) => {
                    tracing::trace!("{} answered {}, counted as reachable", url, code);
                    ProbeOutcome::success(latency_ms, status)
                }
                Classification::Failed(kind) => {
                    ProbeOutcome::failure(latency_ms, Some(status), kind)
                }
            }
        }
        Err(err) => {
            let latency_ms = elapsed_ms(start);
            ProbeOutcome::failure(latency_ms, None, ErrorKind::from_reqwest_error(&err))
        }
    }
}
