//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("App failed to start: {0}")]
    AppStartup(String),

    #[error("App not reachable at {url} after {attempts} attempts")]
    AppNotReady { url: String, attempts: usize },

    #[error("Backend request {method} {path} returned {status}")]
    BackendStatus {
        method: &'static str,
        path: String,
        status: u16,
    },

    #[error("Playwright not found. Install with: npm i -D @playwright/test && npx playwright install")]
    PlaywrightNotFound,

    #[error("Scenario parse error: {0}")]
    SpecParse(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
