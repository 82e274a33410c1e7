mod cli;
mod config;
mod engine;
mod error;
mod http;
mod output;
mod progress;
mod types;

use clap::Parser;
use cli::{Cli, Commands, LoadOptions, OutputArgs, OutputFormat, StressOptions, TargetArgs};
use config::build_config;
use engine::{Engine, RunState};
use error::Error;
use output::{create_output, print_json, print_markdown, print_summary, write_json, write_markdown};
use progress::spawn_progress_printer;
use types::PhaseReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phases {
    Load,
    Stress,
    All,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32, Error> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Load(args) => {
            run_phases(Phases::Load, &args.target, Some(&args.load), None, &args.output).await
        }
        Commands::Stress(args) => {
            run_phases(
                Phases::Stress,
                &args.target,
                None,
                Some(&args.stress),
                &args.output,
            )
            .await
        }
        Commands::All(args) => {
            run_phases(
                Phases::All,
                &args.target,
                Some(&args.load),
                Some(&args.stress),
                &args.output,
            )
            .await
        }
        Commands::Init(args) => run_init(&args),
        Commands::Completions(args) => {
            cli::generate_completions(args.shell);
            Ok(0)
        }
        Commands::Man => {
            cli::generate_man_page()?;
            Ok(0)
        }
    }
}

async fn run_phases(
    phases: Phases,
    target: &TargetArgs,
    load: Option<&LoadOptions>,
    stress: Option<&StressOptions>,
    output: &OutputArgs,
) -> Result<i32, Error> {
    let config = build_config(target, load, stress)?;
    let engine = Engine::new(config)?;

    if output.dry_run {
        print_dry_run(&engine, phases);
        return Ok(0);
    }

    let show_progress = !output.quiet && !output.json;
    let printer = show_progress.then(|| spawn_progress_printer(engine.progress_rx()));
    let state_rx = engine.state_rx();

    let cancel_token = engine.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_token.cancel();
        }
    });

    let started_at = chrono::Utc::now();
    let mut reports = Vec::new();

    if matches!(phases, Phases::Load | Phases::All) {
        reports.push(PhaseReport::Load(engine.run_load().await));
    }
    if matches!(phases, Phases::Stress | Phases::All) && !engine.cancel_token().is_cancelled() {
        reports.push(PhaseReport::Stress(engine.run_stress().await));
    }

    let cancelled = *state_rx.borrow() == RunState::Cancelled;
    let result = create_output(&engine, started_at, reports);

    // The printer exits once the progress sender is gone.
    drop(engine);
    if let Some(handle) = printer {
        let _ = handle.await;
    }

    if cancelled && !output.quiet {
        eprintln!("Interrupted, reporting partial results");
    }

    if output.json {
        print_json(&result)?;
    } else if !output.quiet {
        match output.format {
            OutputFormat::Md => print_markdown(&result)?,
            OutputFormat::Json => print_summary(&result.reports),
        }
    }

    if let Some(path) = &output.output {
        match output.format {
            OutputFormat::Json => write_json(&result, path)?,
            OutputFormat::Md => write_markdown(&result, path)?,
        }

        if !output.quiet {
            eprintln!("Results written to: {}", path.display());
        }
    }

    let breaking_point_hit = result.reports.iter().any(|r| match r {
        PhaseReport::Stress(s) => s.breaking_point_hit,
        PhaseReport::Load(_) => false,
    });
    let fail_on_breaking_point = stress.is_some_and(|s| s.fail_on_breaking_point);

    if fail_on_breaking_point && breaking_point_hit {
        Ok(4)
    } else {
        Ok(0)
    }
}

fn print_dry_run(engine: &Engine, phases: Phases) {
    let config = engine.config();

    println!("Configuration valid");
    println!("  Base URL:         {}", config.base_url);
    println!("  Candidate routes: {}", config.candidate_routes.len());
    println!("  Selected route:   {}", engine.route());
    println!("  Target URL:       {}", engine.target_url());
    println!("  Timeout:          {}", humantime::format_duration(config.timeout));
    println!("  Status policy:    {:?}", config.status_policy);

    if matches!(phases, Phases::Load | Phases::All) {
        println!(
            "  Load:             {} req/s for {}",
            config.load.rps,
            humantime::format_duration(config.load.duration)
        );
    }
    if matches!(phases, Phases::Stress | Phases::All) {
        println!(
            "  Stress:           +{} per wave up to {}, threshold {}%",
            config.stress.increment, config.stress.max_concurrency, config.stress.error_threshold
        );
    }
}

fn run_init(args: &cli::InitArgs) -> Result<i32, Error> {
    use std::fs;

    if args.output.exists() && !args.force {
        return Err(Error::FileExists(args.output.clone()));
    }

    let url = args.url.as_deref().unwrap_or(types::DEFAULT_BASE_URL);

    let config = format!(
        r#"# breakpoint configuration

[target]
base_url = "{url}"
# Candidate routes; the probe target is picked from these
routes = ["/api/health"]
timeout = "5s"
connect_timeout = "2s"
# Count 401, 403 and 404 as failures
# strict_status = false

[load]
duration = "10s"
rps = 10

[stress]
max_concurrency = 100
increment = 10
error_threshold = 30.0

# Environment variables are expanded anywhere in this file:
#   base_url = "${{BASE_URL:-http://localhost:3001}}"
"#,
        url = url
    );

    fs::write(&args.output, config)?;

    eprintln!("Created config file: {}", args.output.display());
    eprintln!("\nRun with: breakpoint all -f {}", args.output.display());

    Ok(0)
}
