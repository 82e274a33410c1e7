use crate::engine::Engine;
use crate::types::{PhaseReport, StatusPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput {
    pub metadata: Metadata,
    pub reports: Vec<PhaseReport>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    pub tool: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub target: Target,
    pub env: Environment,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Target {
    pub base_url: String,
    pub route: String,
    pub url: String,
    pub candidate_routes: Vec<String>,
    pub status_policy: StatusPolicy,
    pub timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Environment {
    pub hostname: String,
    pub os: String,
    pub cpus: usize,
}

pub fn create_output(
    engine: &Engine,
    started_at: DateTime<Utc>,
    reports: Vec<PhaseReport>,
) -> JsonOutput {
    let config = engine.config();

    JsonOutput {
        metadata: Metadata {
            tool: "breakpoint".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at,
            ended_at: Utc::now(),
            target: Target {
                base_url: config.base_url.clone(),
                route: engine.route().to_string(),
                url: engine.target_url().to_string(),
                candidate_routes: config.candidate_routes.clone(),
                status_policy: config.status_policy,
                timeout_ms: config.timeout.as_millis() as u64,
            },
            env: Environment {
                hostname: hostname::get()
                    .map(|h| h.to_string_lossy().to_string())
                    .unwrap_or_else(|_| "unknown".to_string()),
                os: std::env::consts::OS.to_string(),
                cpus: num_cpus(),
            },
        },
        reports,
    }
}

pub fn write_json(output: &JsonOutput, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, output)?;
    writer.flush()
}

pub fn print_json(output: &JsonOutput) -> io::Result<()> {
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    serde_json::to_writer_pretty(&mut writer, output)?;
    writeln!(writer)?;
    writer.flush()
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}
