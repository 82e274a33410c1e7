use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

fn parse_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(s)
}

#[derive(Parser, Debug)]
#[command(
    name = "breakpoint",
    author,
    version,
    about = "HTTP load and stress probe that escalates concurrency until the target breaks",
    long_about = "breakpoint measures a single HTTP GET endpoint in two phases:\n\
                  a constant-rate load test and an escalating-concurrency stress sweep\n\
                  that stops at the first wave whose error rate crosses the threshold."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a fixed burst of requests every second for a fixed duration
    Load(LoadArgs),

    /// Escalate concurrency wave by wave until the error rate breaks the threshold
    Stress(StressArgs),

    /// Run the load phase, then the stress phase, into one report
    All(AllArgs),

    /// Generate a starter config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Generate man page
    Man,
}

#[derive(Args, Debug, Default, Clone)]
pub struct TargetArgs {
    /// Base URL of the server under test
    #[arg(env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Candidate route (repeatable or comma separated); the probe target is picked from these
    #[arg(short = 'R', long = "route", value_name = "PATH", value_delimiter = ',')]
    pub routes: Vec<String>,

    /// Candidate routes as a JSON array of strings
    #[arg(long, value_name = "JSON", env = "DETECTED_ROUTES")]
    pub routes_json: Option<String>,

    /// Per-request timeout (e.g., 5s, 500ms)
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Connection timeout (e.g., 2s)
    #[arg(long, value_parser = parse_duration)]
    pub connect_timeout: Option<Duration>,

    /// Count 401, 403 and 404 responses as failures
    #[arg(long)]
    pub strict_status: bool,

    /// Config file path (TOML)
    #[arg(short = 'f', long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct LoadOptions {
    /// Load phase duration (e.g., 10s, 1m)
    #[arg(short = 'd', long, value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Requests sent in each one-second burst
    #[arg(short = 'r', long)]
    pub rps: Option<u32>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct StressOptions {
    /// Highest concurrency level to try
    #[arg(short = 'm', long)]
    pub max_concurrency: Option<u32>,

    /// Concurrency added per wave
    #[arg(short = 'i', long)]
    pub increment: Option<u32>,

    /// Error rate (percent) above which a wave ends the sweep
    #[arg(long, value_name = "PERCENT")]
    pub error_threshold: Option<f64>,

    /// Exit with code 4 when the breaking point is hit
    #[arg(long)]
    pub fail_on_breaking_point: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    #[value(alias = "markdown")]
    Md,
}

#[derive(Args, Debug, Default, Clone)]
pub struct OutputArgs {
    /// Output file path for the report
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Print the JSON report to stdout instead of the summary
    #[arg(long)]
    pub json: bool,

    /// Suppress progress and summary output (for CI)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Validate config, print the selected target and exit
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub load: LoadOptions,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct StressArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub stress: StressOptions,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct AllArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub load: LoadOptions,

    #[command(flatten)]
    pub stress: StressOptions,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output file path (default: breakpoint.toml)
    #[arg(short, long, default_value = "breakpoint.toml")]
    pub output: PathBuf,

    /// Base URL to include in config
    #[arg(short, long)]
    pub url: Option<String>,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "breakpoint", &mut std::io::stdout());
}

pub fn generate_man_page() -> Result<(), std::io::Error> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    man.render(&mut std::io::stdout())
}
