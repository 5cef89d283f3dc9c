//! E2E test harness entry point
//!
//! Runs the blog scenarios against a live app. Nothing runs unless `BLOG_E2E=1`
//! is set, so a plain `cargo test` does not need a browser or an app.
//!
//! Run with: BLOG_E2E=1 cargo test --package blog-e2e --test e2e -- --base-url http://localhost:5173

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use blog_e2e::backend::BackendConfig;
use blog_e2e::playwright::{Browser, PlaywrightConfig};
use blog_e2e::runner::RunnerConfig;
use blog_e2e::server::AppConfig;
use blog_e2e::{E2eResult, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "blog-e2e")]
#[command(about = "E2E test runner for the blog app")]
struct Args {
    /// URL the app and its API are served from
    #[arg(long, env = "BLOG_E2E_BASE_URL", default_value = "http://localhost:5173")]
    base_url: String,

    /// Command that starts the app; omit when it is already running
    #[arg(long, env = "BLOG_E2E_APP_COMMAND")]
    app_command: Option<String>,

    /// Working directory for the app command
    #[arg(long, env = "BLOG_E2E_APP_DIR")]
    app_dir: Option<PathBuf>,

    /// Directory with extra YAML scenarios
    #[arg(short, long, env = "BLOG_E2E_SPECS")]
    specs: Option<PathBuf>,

    /// Run only scenarios carrying this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only scenarios whose name contains this text
    #[arg(short, long)]
    name: Option<String>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, env = "BLOG_E2E_BROWSER", default_value = "chromium")]
    browser: Browser,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Timeout for each assertion, in milliseconds
    #[arg(long, default_value = "5000")]
    expect_timeout_ms: u64,

    /// `node_modules` directory with Playwright installed
    #[arg(long, env = "BLOG_E2E_NODE_MODULES", default_value = "node_modules")]
    node_modules: PathBuf,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,
}

fn main() {
    if std::env::var("BLOG_E2E").map(|v| v != "1").unwrap_or(true) {
        eprintln!("blog-e2e: set BLOG_E2E=1 to run the browser scenarios, skipping");
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let app = args.app_command.as_deref().map(|line| AppConfig {
        working_dir: args.app_dir.clone(),
        env: vec![("NODE_ENV".to_string(), "test".to_string())],
        ..AppConfig::from_command_line(line)
    });

    let config = RunnerConfig {
        backend: BackendConfig {
            base_url: args.base_url,
            ready_timeout: Duration::from_secs(60),
            ..Default::default()
        },
        playwright: PlaywrightConfig {
            browser: args.browser,
            headless: !args.headed,
            expect_timeout_ms: args.expect_timeout_ms,
            screenshot_dir: args.output.join("screenshots"),
            node_modules: args.node_modules,
            ..Default::default()
        },
        app,
        specs_dir: args.specs,
        output_dir: args.output,
    };

    let mut runner = TestRunner::with_config(config)?;

    let results = if let Some(name) = args.name {
        runner.run_matching(&name).await?
    } else if let Some(tag) = args.tag {
        runner.run_tagged(&tag).await?
    } else {
        runner.run_all().await?
    };

    runner.write_results(&results)?;

    Ok(results.failed == 0)
}
