use crate::http::execute_probe;
use crate::types::{ProbeOutcome, StatusPolicy};
use futures_util::future::join_all;
use reqwest::Client;
use std::future::Future;

/// One timed request against the fixed target.
pub trait Probe {
    fn probe(&self) -> impl Future<Output = ProbeOutcome> + Send;
}

pub struct HttpProbe {
    client: Client,
    url: String,
    policy: StatusPolicy,
}

impl HttpProbe {
    pub fn new(client: Client, url: String, policy: StatusPolicy) -> Self {
        Self {
            client,
            url,
            policy,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Probe for HttpProbe {
    fn probe(&self) -> impl Future<Output = ProbeOutcome> + Send {
        execute_probe(&self.client, &self.url, self.policy)
    }
}

/// Launch `count` probes together and wait for every one of them to settle.
///
/// All probes are polled on the calling task; outcomes come back as owned
/// values and are only merged once the whole group has completed.
pub async fn fire<P: Probe>(probe: &P, count: u32) -> Vec<ProbeOutcome> {
    tracing::debug!("Firing {} probes", count);
    join_all((0..count).map(|_| probe.probe())).await
}
