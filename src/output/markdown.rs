use crate::engine::format_rate;
use crate::output::json::JsonOutput;
use crate::types::{LoadReport, PhaseReport, StressReport};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub fn write_markdown(output: &JsonOutput, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_markdown_content(&mut writer, output)
}

pub fn print_markdown(output: &JsonOutput) -> io::Result<()> {
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_markdown_content(&mut writer, output)
}

fn write_markdown_content<W: Write>(writer: &mut W, output: &JsonOutput) -> io::Result<()> {
    let target = &output.metadata.target;

    writeln!(writer, "# Load & Stress Results")?;
    writeln!(writer)?;

    // Configuration
    writeln!(writer, "## Configuration")?;
    writeln!(writer)?;
    writeln!(writer, "| Parameter | Value |")?;
    writeln!(writer, "|-----------|-------|")?;
    writeln!(writer, "| Base URL | `{}` |", target.base_url)?;
    writeln!(writer, "| Route | `{}` |", target.route)?;
    writeln!(writer, "| Candidate Routes | {} |", target.candidate_routes.len())?;
    writeln!(writer, "| Timeout | {}ms |", target.timeout_ms)?;
    writeln!(writer, "| Started | {} |", output.metadata.started_at.to_rfc3339())?;
    writeln!(writer)?;

    for report in &output.reports {
        match report {
            PhaseReport::Load(load) => write_load_section(writer, load)?,
            PhaseReport::Stress(stress) => write_stress_section(writer, stress)?,
        }
    }

    writer.flush()
}

fn write_load_section<W: Write>(writer: &mut W, report: &LoadReport) -> io::Result<()> {
    writeln!(writer, "## Load Test")?;
    writeln!(writer)?;
    if report.interrupted {
        writeln!(writer, "> Interrupted before the full duration elapsed.")?;
        writeln!(writer)?;
    }
    writeln!(writer, "| Metric | Value |")?;
    writeln!(writer, "|--------|-------|")?;
    writeln!(writer, "| Total Requests | {} |", report.total_requests)?;
    writeln!(writer, "| Successful | {} |", report.successful_requests)?;
    writeln!(writer, "| Failed | {} |", report.failed_requests)?;
    writeln!(writer, "| Error Rate | {} |", format_rate(report.error_rate))?;
    writeln!(writer, "| Requests/sec | {:.2} |", report.requests_per_second)?;
    writeln!(writer, "| Duration | {:.2}s |", report.duration_seconds)?;
    writeln!(writer)?;

    writeln!(writer, "| Latency | ms |")?;
    writeln!(writer, "|---------|----|")?;
    writeln!(writer, "| Min | {:.2} |", report.min_latency)?;
    writeln!(writer, "| Avg | {:.2} |", report.avg_latency)?;
    writeln!(writer, "| p95 | {:.2} |", report.p95)?;
    writeln!(writer, "| p99 | {:.2} |", report.p99)?;
    writeln!(writer, "| Max | {:.2} |", report.max_latency)?;
    writeln!(writer)?;

    if !report.status_codes.is_empty() {
        writeln!(writer, "| Status Code | Count |")?;
        writeln!(writer, "|-------------|-------|")?;
        for (code, count) in &report.status_codes {
            writeln!(writer, "| {} | {} |", code, count)?;
        }
        writeln!(writer)?;
    }

    if !report.errors.is_empty() {
        writeln!(writer, "| Error | Count |")?;
        writeln!(writer, "|-------|-------|")?;
        for (kind, count) in &report.errors {
            writeln!(writer, "| {} | {} |", kind.as_str(), count)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn write_stress_section<W: Write>(writer: &mut W, report: &StressReport) -> io::Result<()> {
    writeln!(writer, "## Stress Test")?;
    writeln!(writer)?;
    if report.interrupted {
        writeln!(writer, "> Interrupted before the sweep finished.")?;
        writeln!(writer)?;
    }

    if report.waves.is_empty() {
        writeln!(writer, "No waves were run.")?;
        writeln!(writer)?;
    } else {
        writeln!(
            writer,
            "| Concurrency | Successful | Failed | Error Rate | Avg (ms) | Min (ms) | Max (ms) |"
        )?;
        writeln!(
            writer,
            "|-------------|------------|--------|------------|----------|----------|----------|"
        )?;
        for wave in &report.waves {
            writeln!(
                writer,
                "| {} | {} | {} | {} | {:.2} | {:.2} | {:.2} |",
                wave.concurrency_level,
                wave.successful,
                wave.failed,
                format_rate(wave.error_rate),
                wave.avg_latency,
                wave.min_latency,
                wave.max_latency,
            )?;
        }
        writeln!(writer)?;
    }

    let analysis = &report.analysis;
    writeln!(writer, "### Analysis")?;
    writeln!(writer)?;
    writeln!(writer, "| Metric | Value |")?;
    writeln!(writer, "|--------|-------|")?;
    writeln!(writer, "| Max Concurrency Reached | {} |", report.max_concurrency_reached)?;
    match analysis.breaking_point {
        Some(level) => writeln!(writer, "| Breaking Point | {} |", level)?,
        None => writeln!(writer, "| Breaking Point | none |")?,
    }
    writeln!(writer, "| Max Error Rate | {} |", format_rate(analysis.max_error_rate))?;
    writeln!(writer, "| Average Latency | {:.2}ms |", analysis.average_latency)?;
    writeln!(writer)?;
    writeln!(writer, "{}", analysis.verdict)?;
    writeln!(writer)?;

    Ok(())
}
