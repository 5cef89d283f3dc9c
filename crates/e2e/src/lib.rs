//! Blog app E2E suite
//!
//! This crate drives the blog application through a real browser:
//! - Resets the backend and seeds users over HTTP before every scenario
//! - Compiles each scenario into a Playwright script and runs it with Node
//! - Ships the blog scenario tree and the helpers it is built from
//! - Loads extra declarative scenarios from YAML
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── start_app() -> AppHandle (optional)                  │
//! │    ├── Backend::seed(users)   POST /api/testing/reset       │
//! │    │                          POST /api/users               │
//! │    └── ScenarioDriver::run_scenario(&Scenario)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario                                                   │
//! │    ├── suite path, name, tags                               │
//! │    └── steps: [TestStep]                                    │
//! │          ├── navigate / click / fill / wait                 │
//! │          ├── assert_visible / assert_hidden / assert_text   │
//! │          ├── assert_css / assert_count                      │
//! │          └── accept_dialogs / screenshot / log              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod error;
pub mod fixtures;
pub mod helpers;
pub mod locator;
pub mod playwright;
pub mod runner;
pub mod scenarios;
pub mod server;
pub mod spec;

pub use error::{E2eError, E2eResult};
pub use fixtures::{Blog, User};
pub use locator::Locator;
pub use runner::{RunnerConfig, TestRunner};
pub use spec::{Scenario, TestStep};
