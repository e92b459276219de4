mod cmd;

use clap::Parser;
use sweep_core::aws::DEFAULT_REGION;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stack-sweep",
    about = "Remove CloudFormation stacks whose GitHub branch no longer exists",
    version
)]
struct Cli {
    /// GitHub repository to check (owner/name)
    repo: String,

    /// AWS region name
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,
}

/// `RUST_LOG` when it parses, `info` otherwise.
fn log_filter(spec: Option<&str>) -> EnvFilter {
    spec.and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() {
    let cli = Cli::parse();

    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cmd::sweep::run(&cli.repo, &cli.region) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
