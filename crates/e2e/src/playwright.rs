//! Playwright browser automation
//!
//! A scenario is compiled into a single Node.js script so that one browser
//! context lives for the whole scenario. The script reports progress as JSON
//! lines on stdout, one `step` event per completed step, then either `done`
//! or `failed`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::process::Command as TokioCommand;
use tracing::{debug, warn};

use crate::error::{E2eError, E2eResult};
use crate::locator::js_str;
use crate::spec::{Scenario, TestStep};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(format!("unknown browser '{}'", other)),
        }
    }
}

/// Result of executing a scenario step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub index: usize,
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot_path: Option<PathBuf>,
}

/// Progress line printed by a generated script
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ScriptEvent {
    Step {
        index: usize,
        ms: u64,
    },
    Failed {
        index: usize,
        ms: u64,
        error: String,
        #[serde(default)]
        screenshot: Option<PathBuf>,
    },
    Done,
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    /// App URL; relative navigations resolve against it
    pub base_url: String,
    pub screenshot_dir: PathBuf,
    pub browser: Browser,
    pub headless: bool,
    /// Timeout for every `expect` assertion
    pub expect_timeout_ms: u64,
    /// Default timeout for actions and waits
    pub action_timeout_ms: u64,
    /// Upper bound for a whole scenario script
    pub script_timeout: Duration,
    /// `node_modules` holding `playwright` and `@playwright/test`
    pub node_modules: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            browser: Browser::Chromium,
            headless: true,
            expect_timeout_ms: 5000,
            action_timeout_ms: 5000,
            script_timeout: Duration::from_secs(120),
            node_modules: PathBuf::from("node_modules"),
        }
    }
}

/// Playwright browser handle
pub struct PlaywrightHandle {
    config: PlaywrightConfig,
}

impl PlaywrightHandle {
    /// Create a new Playwright handle
    pub fn new(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;
        std::fs::create_dir_all(&config.screenshot_dir)?;
        Ok(Self { config })
    }

    /// Check if Node and Playwright are installed
    fn check_playwright_installed() -> E2eResult<()> {
        for (program, args) in [("node", &["--version"][..]), ("npx", &["playwright", "--version"][..])] {
            let status = Command::new(program)
                .args(args)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();

            match status {
                Ok(status) if status.success() => {}
                _ => return Err(E2eError::PlaywrightNotFound),
            }
        }
        Ok(())
    }

    /// Run a scenario and report every step that was attempted.
    ///
    /// Steps after a failure are not attempted and not reported.
    pub async fn run_scenario(&self, scenario: &Scenario) -> E2eResult<Vec<StepResult>> {
        let script = build_script(&self.config, scenario);
        let output = self.run_script(&script).await?;
        Ok(collect_results(scenario, &self.config.screenshot_dir, &output))
    }

    async fn run_script(&self, script: &str) -> E2eResult<ScriptOutput> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.js");
        std::fs::write(&script_path, script)?;

        let node_path = absolute(&self.config.node_modules)?;
        debug!("Running Playwright script: {}", script_path.display());

        let child = TokioCommand::new("node")
            .arg(&script_path)
            .env("NODE_PATH", &node_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(self.config.script_timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                E2eError::Timeout(format!(
                    "scenario script after {}s",
                    self.config.script_timeout.as_secs()
                ))
            })??;

        Ok(ScriptOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn absolute(path: &Path) -> E2eResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Raw outcome of a script run
#[derive(Debug, Clone, Default)]
struct ScriptOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

/// Build the Playwright script for a whole scenario
pub fn build_script(config: &PlaywrightConfig, scenario: &Scenario) -> String {
    let mut script = String::new();

    script.push_str(&format!(
        r#"// {name}
const {{ chromium, firefox, webkit }} = require('playwright');
const {{ expect }} = require('@playwright/test');

const check = expect.configure({{ timeout: {expect_timeout} }});
const emit = (event) => console.log(JSON.stringify(event));

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    baseURL: {base_url},
    viewport: {{ width: {width}, height: {height} }}
  }});
  context.setDefaultTimeout({action_timeout});
  const page = await context.newPage();
  let current = 0;
  let started = Date.now();

  try {{
"#,
        name = scenario.full_name().replace('\n', " "),
        expect_timeout = config.expect_timeout_ms,
        browser = config.browser.as_str(),
        headless = config.headless,
        base_url = js_str(&config.base_url),
        width = scenario.viewport.width,
        height = scenario.viewport.height,
        action_timeout = config.action_timeout_ms,
    ));

    for (i, step) in scenario.steps.iter().enumerate() {
        script.push_str(&format!(
            "\n    // Step {}: {}\n    current = {}; started = Date.now();\n",
            i + 1,
            step.name().replace('\n', " "),
            i
        ));
        script.push_str(&step_to_js(step, &config.screenshot_dir));
        script.push_str(&format!(
            "\n    emit({{ event: 'step', index: {}, ms: Date.now() - started }});\n",
            i
        ));
    }

    let failure_shot = config
        .screenshot_dir
        .join(format!("{}-failure.png", slug(&scenario.full_name())));

    script.push_str(&format!(
        r#"
    emit({{ event: 'done' }});
  }} catch (error) {{
    const failure = {{
      event: 'failed',
      index: current,
      ms: Date.now() - started,
      error: String((error && error.message) || error)
    }};
    try {{
      await page.screenshot({{ path: {shot}, fullPage: true }});
      failure.screenshot = {shot};
    }} catch (_) {{}}
    emit(failure);
    process.exitCode = 1;
  }} finally {{
    await browser.close();
  }}
}})();
"#,
        shot = js_str(&failure_shot.to_string_lossy()),
    ));

    script
}

/// Convert a step to JavaScript code
fn step_to_js(step: &TestStep, screenshot_dir: &Path) -> String {
    match step {
        TestStep::Navigate { url } => format!("    await page.goto({});", js_str(url)),
        TestStep::Click { target } => format!("    await {}.click();", target.to_js()),
        TestStep::Fill { target, value } => {
            format!("    await {}.fill({});", target.to_js(), js_str(value))
        }
        TestStep::Wait { target, state, timeout_ms, .. } => match timeout_ms {
            Some(ms) => format!(
                "    await {}.waitFor({{ state: '{}', timeout: {} }});",
                target.to_js(),
                state.as_str(),
                ms
            ),
            None => format!(
                "    await {}.waitFor({{ state: '{}' }});",
                target.to_js(),
                state.as_str()
            ),
        },
        TestStep::AssertVisible { target } => {
            format!("    await check({}).toBeVisible();", target.to_js())
        }
        TestStep::AssertHidden { target } => {
            format!("    await check({}).toBeHidden();", target.to_js())
        }
        TestStep::AssertText { target, contains } => format!(
            "    await check({}).toContainText({});",
            target.to_js(),
            js_str(contains)
        ),
        TestStep::AssertCss { target, property, value } => format!(
            "    await check({}).toHaveCSS({}, {});",
            target.to_js(),
            js_str(property),
            js_str(value)
        ),
        TestStep::AssertCount { target, count } => {
            format!("    await check({}).toHaveCount({});", target.to_js(), count)
        }
        TestStep::AcceptDialogs => "    page.on('dialog', (dialog) => dialog.accept());".to_string(),
        TestStep::Sleep { ms } => format!("    await page.waitForTimeout({});", ms),
        TestStep::Screenshot { name, full_page } => {
            let path = screenshot_path(screenshot_dir, name);
            format!(
                "    await page.screenshot({{ path: {}, fullPage: {} }});",
                js_str(&path.to_string_lossy()),
                full_page
            )
        }
        TestStep::Log { message } => format!("    console.log({});", js_str(&format!("[TEST] {}", message))),
    }
}

fn screenshot_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.png", slug(name)))
}

/// File-name safe form of a scenario or screenshot name
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

fn strip_ansi(s: &str) -> String {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    ANSI.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid ANSI pattern"))
        .replace_all(s, "")
        .into_owned()
}

fn parse_events(stdout: &str) -> Vec<ScriptEvent> {
    stdout
        .lines()
        .filter(|l| l.trim_start().starts_with('{'))
        .filter_map(|l| serde_json::from_str(l.trim()).ok())
        .collect()
}

/// Turn script events into step results
fn collect_results(scenario: &Scenario, screenshot_dir: &Path, output: &ScriptOutput) -> Vec<StepResult> {
    let name_of = |index: usize| {
        scenario
            .steps
            .get(index)
            .map(TestStep::name)
            .unwrap_or_else(|| format!("step:{}", index))
    };

    let mut results = Vec::new();
    let mut finished = false;

    for event in parse_events(&output.stdout) {
        match event {
            ScriptEvent::Step { index, ms } => {
                let screenshot_path = match scenario.steps.get(index) {
                    Some(TestStep::Screenshot { name, .. }) => Some(screenshot_path(screenshot_dir, name)),
                    _ => None,
                };
                results.push(StepResult {
                    index,
                    success: true,
                    step_name: name_of(index),
                    duration_ms: ms,
                    error: None,
                    screenshot_path,
                });
            }
            ScriptEvent::Failed { index, ms, error, screenshot } => {
                results.push(StepResult {
                    index,
                    success: false,
                    step_name: name_of(index),
                    duration_ms: ms,
                    error: Some(strip_ansi(&error)),
                    screenshot_path: screenshot,
                });
                finished = true;
            }
            ScriptEvent::Done => finished = true,
        }
    }

    if !finished || (!output.success && results.iter().all(|r| r.success)) {
        // The script died outside the step loop (syntax error, crashed browser).
        let index = results.len();
        let stderr = strip_ansi(output.stderr.trim());
        warn!("Playwright script ended without a result at step {}", index);
        results.push(StepResult {
            index,
            success: false,
            step_name: name_of(index),
            duration_ms: 0,
            error: Some(if stderr.is_empty() {
                "script exited without reporting a result".to_string()
            } else {
                stderr
            }),
            screenshot_path: None,
        });
    }

    results
}
