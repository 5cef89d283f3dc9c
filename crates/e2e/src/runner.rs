//! Main test runner that orchestrates the app, backend seeding and Playwright

use std::path::PathBuf;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::backend::{Backend, BackendConfig};
use crate::error::{E2eError, E2eResult};
use crate::fixtures::initial_users;
use crate::playwright::{PlaywrightConfig, PlaywrightHandle, StepResult};
use crate::scenarios::blog_app;
use crate::server::{AppConfig, AppHandle};
use crate::spec::Scenario;

/// Drives a browser through one scenario
#[async_trait(?Send)]
pub trait ScenarioDriver {
    async fn run_scenario(&self, scenario: &Scenario) -> E2eResult<Vec<StepResult>>;
}

#[async_trait(?Send)]
impl ScenarioDriver for PlaywrightHandle {
    async fn run_scenario(&self, scenario: &Scenario) -> E2eResult<Vec<StepResult>> {
        PlaywrightHandle::run_scenario(self, scenario).await
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub tags: Vec<String>,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub backend: BackendConfig,
    pub playwright: PlaywrightConfig,
    /// Start the app ourselves; `None` expects it to be running already
    pub app: Option<AppConfig>,
    /// Extra YAML scenarios to run after the built-in ones
    pub specs_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            playwright: PlaywrightConfig::default(),
            app: None,
            specs_dir: None,
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Main E2E test runner.
///
/// Scenarios run one after another against a single backend, which is reset
/// and reseeded before each of them.
pub struct TestRunner {
    backend: Backend,
    driver: Box<dyn ScenarioDriver>,
    app_config: Option<AppConfig>,
    app: Option<AppHandle>,
    specs_dir: Option<PathBuf>,
    output_dir: PathBuf,
}

impl TestRunner {
    /// Create a runner that drives Playwright
    pub fn with_config(mut config: RunnerConfig) -> E2eResult<Self> {
        config.playwright.base_url = config.backend.base_url.clone();
        let driver = PlaywrightHandle::new(config.playwright.clone())?;
        Self::with_driver(config, Box::new(driver))
    }

    /// Create a runner with a custom driver
    pub fn with_driver(config: RunnerConfig, driver: Box<dyn ScenarioDriver>) -> E2eResult<Self> {
        Ok(Self {
            backend: Backend::new(config.backend)?,
            driver,
            app_config: config.app,
            app: None,
            specs_dir: config.specs_dir,
            output_dir: config.output_dir,
        })
    }

    /// Start the app if configured, otherwise wait for the external one
    pub async fn start_app(&mut self) -> E2eResult<()> {
        if self.app.is_some() {
            return Ok(()); // Already running
        }

        match &self.app_config {
            Some(config) => {
                self.app = Some(AppHandle::spawn(config, &self.backend).await?);
            }
            None => self.backend.wait_until_ready().await?,
        }
        Ok(())
    }

    /// Stop the app if we started it
    pub fn stop_app(&mut self) -> E2eResult<()> {
        if let Some(mut app) = self.app.take() {
            app.stop()?;
        }
        Ok(())
    }

    /// Built-in scenarios followed by any YAML ones
    pub fn scenarios(&self) -> E2eResult<Vec<Scenario>> {
        let mut scenarios = blog_app();
        if let Some(dir) = &self.specs_dir {
            let extra = Scenario::load_all(dir)?;
            debug!("Loaded {} scenario(s) from {}", extra.len(), dir.display());
            scenarios.extend(extra);
        }
        Ok(scenarios)
    }

    /// Run every scenario
    pub async fn run_all(&mut self) -> E2eResult<TestSuiteResult> {
        let scenarios = self.scenarios()?;
        self.run_scenarios(&scenarios).await
    }

    /// Run scenarios carrying a tag
    pub async fn run_tagged(&mut self, tag: &str) -> E2eResult<TestSuiteResult> {
        let scenarios = self.scenarios()?;
        let filtered: Vec<Scenario> = Scenario::filter_by_tag(&scenarios, tag)
            .into_iter()
            .cloned()
            .collect();
        self.run_scenarios(&filtered).await
    }

    /// Run scenarios whose name or full name contains `name`
    pub async fn run_matching(&mut self, name: &str) -> E2eResult<TestSuiteResult> {
        let matching: Vec<Scenario> = self
            .scenarios()?
            .into_iter()
            .filter(|s| s.full_name().contains(name))
            .collect();
        if matching.is_empty() {
            return Err(E2eError::ScenarioNotFound(name.to_string()));
        }
        self.run_scenarios(&matching).await
    }

    /// Run a list of scenarios
    pub async fn run_scenarios(&mut self, scenarios: &[Scenario]) -> E2eResult<TestSuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());
        let mut passed = 0;
        let mut failed = 0;

        self.start_app().await?;

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await;
            if result.success {
                passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        Ok(TestSuiteResult {
            started_at,
            finished_at: Utc::now(),
            total: scenarios.len(),
            passed,
            failed,
            duration_ms,
            results,
        })
    }

    /// Run a single scenario. Errors become a failed result.
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.full_name());

        let outcome = self.execute(scenario).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let (steps, error) = match outcome {
            Ok(steps) => {
                let error = steps.iter().find(|s| !s.success).map(|s| {
                    format!(
                        "{} - {}",
                        s.step_name,
                        s.error.as_deref().unwrap_or("step failed")
                    )
                });
                (steps, error)
            }
            Err(e) => (Vec::new(), Some(e.to_string())),
        };

        TestResult {
            name: scenario.full_name(),
            description: scenario.description.clone(),
            tags: scenario.tags.clone(),
            success: error.is_none(),
            duration_ms,
            steps,
            error,
        }
    }

    async fn execute(&self, scenario: &Scenario) -> E2eResult<Vec<StepResult>> {
        // Every scenario starts from a wiped backend, seeded or not
        self.backend.reset().await?;
        if scenario.seed_users {
            self.backend.seed_users(&initial_users()).await?;
        }
        self.driver.run_scenario(scenario).await
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Drop for TestRunner {
    fn drop(&mut self) {
        let _ = self.stop_app();
    }
}
