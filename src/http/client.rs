use reqwest::Client;
use std::time::Duration;

pub fn create_client(
    max_in_flight: u32,
    timeout: Duration,
    connect_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(timeout)
        .tcp_nodelay(true)
        .gzip(true)
        .brotli(true)
        .user_agent(format!(
            "breakpoint/{} (load-stress-probe)",
            env!("CARGO_PKG_VERSION")
        ))
        // Keep enough idle connections around for the widest batch or wave
        .pool_max_idle_per_host(max_in_flight as usize)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
}
