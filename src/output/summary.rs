use crate::engine::format_rate;
use crate::types::{LoadReport, PhaseReport, StressReport};

pub fn print_summary(reports: &[PhaseReport]) {
    for report in reports {
        match report {
            PhaseReport::Load(load) => print_load_summary(load),
            PhaseReport::Stress(stress) => print_stress_summary(stress),
        }
    }
    println!("\n{}", "=".repeat(50));
}

fn print_header(title: &str, interrupted: bool) {
    println!("\n{}", "=".repeat(50));
    println!("{:^50}", title);
    println!("{}", "=".repeat(50));
    if interrupted {
        println!("  (interrupted)");
    }
}

fn print_load_summary(report: &LoadReport) {
    print_header("LOAD TEST", report.interrupted);

    println!("\nThroughput:");
    println!("  Total Requests:  {:>12}", report.total_requests);
    println!("  Successful:      {:>12}", report.successful_requests);
    println!("  Failed:          {:>12}", report.failed_requests);
    println!("  Requests/sec:    {:>12.2}", report.requests_per_second);
    println!("  Error Rate:      {:>12}", format_rate(report.error_rate));

    println!("\nLatency (ms):");
    println!("  Min:             {:>12.2}", report.min_latency);
    println!("  Avg:             {:>12.2}", report.avg_latency);
    println!("  p95:             {:>12.2}", report.p95);
    println!("  p99:             {:>12.2}", report.p99);
    println!("  Max:             {:>12.2}", report.max_latency);

    if !report.status_codes.is_empty() {
        println!("\nStatus Codes:");
        for (code, count) in &report.status_codes {
            println!("  {}:              {:>12}", code, count);
        }
    }

    if !report.errors.is_empty() {
        println!("\nErrors:");
        for (kind, count) in &report.errors {
            let suggestion = kind.suggestion();
            if suggestion.is_empty() {
                println!("  {:15} {:>12}", format!("{}:", kind.as_str()), count);
            } else {
                println!(
                    "  {:15} {:>12}  ({})",
                    format!("{}:", kind.as_str()),
                    count,
                    suggestion
                );
            }
        }
    }
}

fn print_stress_summary(report: &StressReport) {
    print_header("STRESS TEST", report.interrupted);

    if report.waves.is_empty() {
        println!("\n  No waves were run.");
    } else {
        println!(
            "\n  {:>11}  {:>8}  {:>8}  {:>10}  {:>10}",
            "Concurrency", "OK", "Failed", "Errors", "Avg (ms)"
        );
        for wave in &report.waves {
            println!(
                "  {:>11}  {:>8}  {:>8}  {:>10}  {:>10.2}",
                wave.concurrency_level,
                wave.successful,
                wave.failed,
                format_rate(wave.error_rate),
                wave.avg_latency
            );
        }
    }

    let analysis = &report.analysis;
    println!("\nAnalysis:");
    println!("  Max Concurrency: {:>12}", report.max_concurrency_reached);
    match analysis.breaking_point {
        Some(level) => println!("  Breaking Point:  {:>12}", level),
        None => println!("  Breaking Point:  {:>12}", "none"),
    }
    println!("  Max Error Rate:  {:>12}", format_rate(analysis.max_error_rate));
    println!("  Avg Latency:     {:>10.2}ms", analysis.average_latency);
    println!("\n  {}", analysis.verdict);
}
