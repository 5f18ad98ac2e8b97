//! Researchbench - Research Agent Comparison Harness
//!
//! Main entry point for the CLI application.

use anyhow::Context;
use clap::Parser;
use researchbench::bench::ResponseShape;
use researchbench::{create_adapter, BackendKind, ComparisonReport, Config, TaskRunner};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Researchbench - compare research agents on the same question
#[derive(Parser, Debug)]
#[command(name = "researchbench")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Research question to send to every backend
    #[arg(long, short = 't')]
    task: Option<String>,

    /// Backend to run, in order (repeatable): http-agent-service, in-process-browser-agent
    #[arg(long = "backend", short = 'b')]
    backends: Vec<BackendKind>,

    /// Agent service root URL
    #[arg(long)]
    service_url: Option<String>,

    /// Model requested from the agent service
    #[arg(long)]
    service_model: Option<String>,

    /// Model driving the browser agent
    #[arg(long)]
    browser_model: Option<String>,

    /// Run the browser without a visible window
    #[arg(long, conflicts_with = "headed")]
    headless: bool,

    /// Show the browser window even if the config file sets headless
    #[arg(long)]
    headed: bool,

    /// Attach page screenshots to the browser agent's LLM requests
    #[arg(long, conflicts_with = "no_vision")]
    vision: bool,

    /// Disable screenshots even if the config file enables vision
    #[arg(long)]
    no_vision: bool,

    /// Where the service answer lives: responses, chat_completion, or a JSON pointer
    #[arg(long)]
    response_shape: Option<String>,

    /// Per-run timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Do not clear the agent service cache before running
    #[arg(long)]
    keep_cache: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Print the default configuration file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", Config::default_config_toml());
        return Ok(());
    }

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Build configuration
    let mut config = Config::load().context("failed to load configuration")?;

    apply_overrides(&args, &mut config)?;
    config.validate()?;

    let task = config.research_task();
    let runner = TaskRunner::from_config(&config.bench);

    // Construction failures are configuration problems, not run outcomes
    let adapters = config
        .bench
        .backends
        .iter()
        .map(|kind| {
            create_adapter(*kind, &config)
                .with_context(|| format!("failed to set up backend {}", kind))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    println!("Starting research task comparison...");
    println!("Task: {}\n", task);

    let mut report = ComparisonReport::new();
    for adapter in &adapters {
        println!("Running with {}...", adapter.kind());
        let result = runner.run(adapter.as_ref(), &task).await;
        println!(
            "{} completed in {:.2} seconds\n",
            result.backend_kind(),
            result.elapsed_seconds()
        );
        report.add(result);
    }

    info!(runs = report.len(), "comparison finished");

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.render());
    }

    Ok(())
}

/// Apply command-line flags on top of the loaded configuration
fn apply_overrides(args: &Args, config: &mut Config) -> anyhow::Result<()> {
    if let Some(ref task) = args.task {
        config.task = task.clone();
    }

    if !args.backends.is_empty() {
        config.bench.backends = args.backends.clone();
    }

    if let Some(ref url) = args.service_url {
        config.http_service.base_url = Some(url.clone());
    }

    if let Some(ref model) = args.service_model {
        config.http_service.model = model.clone();
    }

    if let Some(ref model) = args.browser_model {
        config.browser_agent.model = model.clone();
    }

    if args.headless {
        config.browser_agent.headless = true;
    } else if args.headed {
        config.browser_agent.headless = false;
    }

    if args.vision {
        config.browser_agent.use_vision = true;
    } else if args.no_vision {
        config.browser_agent.use_vision = false;
    }

    if let Some(ref shape) = args.response_shape {
        shape
            .parse::<ResponseShape>()
            .map_err(anyhow::Error::msg)
            .context("invalid --response-shape")?;
        config.http_service.response_shape = shape.clone();
    }

    if args.timeout.is_some() {
        config.bench.timeout_secs = args.timeout;
    }

    if args.keep_cache {
        config.http_service.clear_cache = false;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(toml: &str) -> Config {
        Config::from_toml(toml).unwrap()
    }

    #[test]
    fn test_headed_overrides_config_file() {
        let mut config = config_from("[browser_agent]\nheadless = true\nuse_vision = true\n");
        let args = Args::try_parse_from(["researchbench", "--headed", "--no-vision"]).unwrap();

        apply_overrides(&args, &mut config).unwrap();
        assert!(!config.browser_agent.headless);
        assert!(!config.browser_agent.use_vision);
    }

    #[test]
    fn test_headless_and_vision_enable() {
        let mut config = config_from("[browser_agent]\nheadless = false\nuse_vision = false\n");
        let args = Args::try_parse_from(["researchbench", "--headless", "--vision"]).unwrap();

        apply_overrides(&args, &mut config).unwrap();
        assert!(config.browser_agent.headless);
        assert!(config.browser_agent.use_vision);
    }

    #[test]
    fn test_absent_flags_keep_config_file() {
        let mut config = config_from("[browser_agent]\nheadless = true\n");
        let args = Args::try_parse_from(["researchbench"]).unwrap();

        apply_overrides(&args, &mut config).unwrap();
        assert!(config.browser_agent.headless);
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        assert!(Args::try_parse_from(["researchbench", "--headless", "--headed"]).is_err());
        assert!(Args::try_parse_from(["researchbench", "--vision", "--no-vision"]).is_err());
    }

    #[test]
    fn test_invalid_response_shape_rejected() {
        let mut config = Config::default();
        let args =
            Args::try_parse_from(["researchbench", "--response-shape", "answer"]).unwrap();
        assert!(apply_overrides(&args, &mut config).is_err());
    }
}
