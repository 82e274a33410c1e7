use crate::engine::load::LoadPhase;
use crate::engine::probe::HttpProbe;
use crate::engine::route::select_route;
use crate::engine::stress::StressPhase;
use crate::error::{ConfigError, Error, Result};
use crate::http::create_client;
use crate::types::{EngineConfig, LoadReport, Progress, StressReport};
use reqwest::Url;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Owns the probe target for the lifetime of a run.
///
/// The route is selected once at construction; every batch and wave of both
/// phases hits the same URL.
pub struct Engine {
    config: EngineConfig,
    route: String,
    probe: HttpProbe,
    cancel_token: CancellationToken,
    state_tx: watch::Sender<RunState>,
    progress_tx: watch::Sender<Progress>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let base = parse_base_url(&config.base_url)?;
        let route = select_route(&config.candidate_routes);
        let url = target_url(&base, &route)?;

        let max_in_flight = config.load.rps.max(config.stress.max_concurrency);
        let client = create_client(max_in_flight, config.timeout, config.connect_timeout)
            .map_err(Error::Client)?;

        tracing::info!("Probe target: {}", url);

        let (state_tx, _) = watch::channel(RunState::Idle);
        let (progress_tx, _) = watch::channel(Progress::Idle);

        Ok(Self {
            probe: HttpProbe::new(client, url, config.status_policy),
            config,
            route,
            cancel_token: CancellationToken::new(),
            state_tx,
            progress_tx,
        })
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn progress_rx(&self) -> watch::Receiver<Progress> {
        self.progress_tx.subscribe()
    }

    pub fn state_rx(&self) -> watch::Receiver<RunState> {
        self.state_tx.subscribe()
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn target_url(&self) -> &str {
        self.probe.url()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn run_load(&self) -> LoadReport {
        self.state_tx.send_replace(RunState::Running);
        let report = LoadPhase::new(
            &self.probe,
            &self.config.load,
            &self.progress_tx,
            self.cancel_token.clone(),
        )
        .run()
        .await;
        self.finish();
        report
    }

    pub async fn run_stress(&self) -> StressReport {
        self.state_tx.send_replace(RunState::Running);
        let report = StressPhase::new(
            &self.probe,
            &self.config.stress,
            &self.progress_tx,
            self.cancel_token.clone(),
        )
        .run()
        .await;
        self.finish();
        report
    }

    fn finish(&self) {
        self.progress_tx.send_replace(Progress::Finished);
        let final_state = if self.cancel_token.is_cancelled() {
            RunState::Cancelled
        } else {
            RunState::Completed
        };
        self.state_tx.send_replace(final_state);
    }
}

pub fn parse_base_url(raw: &str) -> std::result::Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

/// Append `route` to the base URL, keeping any path prefix the base carries.
pub fn target_url(base: &Url, route: &str) -> std::result::Result<String, ConfigError> {
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), route);
    Url::parse(&joined)
        .map(String::from)
        .map_err(|e| ConfigError::InvalidBaseUrl {
            url: joined,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stats::format_rate;
    use crate::types::{LoadSettings, StressOutcome, StressSettings};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str, routes: &[&str]) -> EngineConfig {
        EngineConfig {
            base_url: base_url.to_string(),
            candidate_routes: routes.iter().map(|s| s.to_string()).collect(),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_route_fixed_at_construction() {
        let engine = Engine::new(config(
            "http://localhost:3001",
            &["/api/health", "/api/products", "/api/auth/login"],
        ))
        .unwrap();

        assert_eq!(engine.route(), "/api/health");
        assert_eq!(engine.target_url(), "http://localhost:3001/api/health");
    }

    #[test]
    fn test_base_path_is_kept() {
        let base = parse_base_url("http://localhost:8080/v1/").unwrap();
        assert_eq!(
            target_url(&base, "/health").unwrap(),
            "http://localhost:8080/v1/health"
        );
    }

    #[test]
    fn test_malformed_base_url_is_rejected() {
        let err = Engine::new(config("not a url", &[])).err().unwrap();
        assert!(matches!(err, Error::Config(ConfigError::InvalidBaseUrl { .. })));

        let err = Engine::new(config("ftp://example.com", &[])).err().unwrap();
        assert!(matches!(err, Error::Config(ConfigError::UnsupportedScheme(_))));
    }

    #[tokio::test]
    async fn test_load_against_steady_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(10)))
            .mount(&server)
            .await;

        let mut cfg = config(&server.uri(), &["/api/health", "/api/products"]);
        cfg.load = LoadSettings {
            duration: Duration::from_secs(2),
            rps: 5,
        };
        let engine = Engine::new(cfg).unwrap();
        let state_rx = engine.state_rx();

        let report = engine.run_load().await;

        assert!((10..=15).contains(&report.total_requests));
        assert_eq!(report.failed_requests, 0);
        assert_eq!(format_rate(report.error_rate), "0.00%");
        assert!(report.p95 >= 10.0 && report.p95 < 500.0);
        assert!(report.p99 >= report.p95);
        assert_eq!(*state_rx.borrow(), RunState::Completed);
    }

    #[tokio::test]
    async fn test_stress_against_missing_route_is_tolerated() {
        let server = MockServer::start().await;

        let mut cfg = config(&server.uri(), &["/api/products"]);
        cfg.stress = StressSettings {
            max_concurrency: 20,
            increment: 10,
            error_threshold: 30.0,
        };
        let engine = Engine::new(cfg).unwrap();
        let report = engine.run_stress().await;

        // wiremock answers 404 for unmatched routes
        assert_eq!(report.waves.len(), 2);
        assert!(!report.breaking_point_hit);
        assert_eq!(report.outcome, StressOutcome::MaxLoadExhausted);
        assert!(report.waves.iter().all(|w| w.failed == 0));
    }

    #[tokio::test]
    async fn test_stress_against_failing_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut cfg = config(&server.uri(), &[]);
        cfg.stress = StressSettings {
            max_concurrency: 50,
            increment: 10,
            error_threshold: 30.0,
        };
        let engine = Engine::new(cfg).unwrap();
        let report = engine.run_stress().await;

        assert_eq!(report.waves.len(), 1);
        assert!(report.breaking_point_hit);
        assert_eq!(report.max_concurrency_reached, 10);
    }
}
