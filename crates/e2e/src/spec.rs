//! Scenario and step definitions
//!
//! Built-in scenarios are assembled in Rust (see `scenarios`), extra ones can
//! be written as YAML using the same step vocabulary.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

/// One behavioural test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Name of the case within its suite
    pub name: String,

    /// Enclosing describe blocks, outermost first
    #[serde(default)]
    pub suite: Vec<String>,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Reset the backend and create the seed users before running
    #[serde(default = "default_seed_users")]
    pub seed_users: bool,

    /// Viewport size for the browser
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,

    /// Steps to execute in order
    pub steps: Vec<TestStep>,
}

fn default_seed_users() -> bool {
    true
}

fn default_viewport() -> Viewport {
    Viewport { width: 1280, height: 720 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// A single step in a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Navigate to a path relative to the base URL
    Navigate { url: String },

    /// Click an element
    Click { target: Locator },

    /// Fill an input field
    Fill { target: Locator, value: String },

    /// Wait for an element to reach a state
    Wait {
        target: Locator,
        #[serde(default)]
        state: WaitState,
        #[serde(default)]
        timeout_ms: Option<u64>,
        /// Shown instead of the generated step name when the wait fails
        #[serde(default)]
        label: Option<String>,
    },

    /// Expect the element to be visible
    AssertVisible { target: Locator },

    /// Expect the element to be hidden or absent
    AssertHidden { target: Locator },

    /// Expect the element text to contain a string
    AssertText { target: Locator, contains: String },

    /// Expect a computed CSS property value
    AssertCss {
        target: Locator,
        property: String,
        value: String,
    },

    /// Expect a number of matching elements
    AssertCount { target: Locator, count: usize },

    /// Accept every native dialog (confirm, alert) from now on
    AcceptDialogs,

    /// Wait for a fixed amount of time (use sparingly)
    Sleep { ms: u64 },

    /// Take a screenshot
    Screenshot {
        name: String,
        #[serde(default)]
        full_page: bool,
    },

    /// Log a message (for debugging)
    Log { message: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

impl TestStep {
    /// Short name used in logs and results
    pub fn name(&self) -> String {
        match self {
            TestStep::Navigate { url } => format!("navigate:/{}", url.trim_start_matches('/')),
            TestStep::Click { target } => format!("click:{}", target),
            TestStep::Fill { target, .. } => format!("fill:{}", target),
            TestStep::Wait { label: Some(label), .. } => format!("wait:{}", label),
            TestStep::Wait { target, state, .. } => format!("wait:{}:{}", target, state.as_str()),
            TestStep::AssertVisible { target } => format!("assert-visible:{}", target),
            TestStep::AssertHidden { target } => format!("assert-hidden:{}", target),
            TestStep::AssertText { target, .. } => format!("assert-text:{}", target),
            TestStep::AssertCss { target, property, .. } => {
                format!("assert-css:{}:{}", target, property)
            }
            TestStep::AssertCount { target, count } => format!("assert-count:{}={}", target, count),
            TestStep::AcceptDialogs => "accept-dialogs".to_string(),
            TestStep::Sleep { ms } => format!("sleep:{}ms", ms),
            TestStep::Screenshot { name, .. } => format!("screenshot:{}", name),
            TestStep::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }

    pub fn wait_for(target: Locator) -> Self {
        TestStep::Wait {
            target,
            state: WaitState::Visible,
            timeout_ms: None,
            label: None,
        }
    }
}

impl Scenario {
    /// A scenario that resets and seeds the backend, with no steps yet
    pub fn new(suite: &[&str], name: &str) -> Self {
        Self {
            name: name.to_string(),
            suite: suite.iter().map(|s| s.to_string()).collect(),
            description: String::new(),
            tags: Vec::new(),
            seed_users: true,
            viewport: default_viewport(),
            steps: Vec::new(),
        }
    }

    pub fn tagged(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn with_steps(mut self, steps: Vec<TestStep>) -> Self {
        self.steps = steps;
        self
    }

    /// Suite path and name, e.g. `Blog app › Login › succeeds`
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = self.suite.iter().map(String::as_str).collect();
        parts.push(&self.name);
        parts.join(" › ")
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let scenario: Self = serde_yaml::from_str(yaml)?;
        if scenario.steps.is_empty() {
            return Err(E2eError::SpecParse(format!(
                "scenario '{}' has no steps",
                scenario.name
            )));
        }
        Ok(scenario)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            E2eError::SpecParse(reason) => {
                E2eError::SpecParse(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }

    /// Load all scenarios from a directory, in path order
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        paths.iter().map(|p| Self::from_file(p)).collect()
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(scenarios: &'a [Self], tag: &str) -> Vec<&'a Self> {
        scenarios.iter().filter(|s| s.has_tag(tag)).collect()
    }
}
