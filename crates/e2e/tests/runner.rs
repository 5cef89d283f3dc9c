//! Runner tests against an in-process stub backend
//!
//! The browser is replaced by a recording driver, so these run without Node.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tempfile::TempDir;

use blog_e2e::backend::BackendConfig;
use blog_e2e::playwright::StepResult;
use blog_e2e::runner::{RunnerConfig, ScenarioDriver};
use blog_e2e::{E2eError, E2eResult, Scenario, TestRunner, User};

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Clone)]
struct StubState {
    calls: Log,
    users_status: StatusCode,
}

async fn reset(State(state): State<StubState>) -> StatusCode {
    state.calls.lock().unwrap().push("reset".to_string());
    StatusCode::NO_CONTENT
}

async fn create_user(State(state): State<StubState>, Json(user): Json<User>) -> StatusCode {
    state.calls.lock().unwrap().push(format!("user:{}", user.username));
    state.users_status
}

async fn start_stub(users_status: StatusCode) -> (String, Log) {
    let calls = Log::default();
    let app = Router::new()
        .route("/", get(|| async { "blog" }))
        .route("/api/testing/reset", post(reset))
        .route("/api/users", post(create_user))
        .with_state(StubState {
            calls: calls.clone(),
            users_status,
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), calls)
}

/// Records every scenario it is asked to run and fails the second step of
/// the scenario named `fail`.
struct RecordingDriver {
    seen: Log,
    calls: Log,
    fail: Option<String>,
}

#[async_trait(?Send)]
impl ScenarioDriver for RecordingDriver {
    async fn run_scenario(&self, scenario: &Scenario) -> E2eResult<Vec<StepResult>> {
        self.seen.lock().unwrap().push(scenario.full_name());
        self.calls.lock().unwrap().push("run".to_string());

        let failing = self.fail.as_deref() == Some(scenario.name.as_str());
        let mut results = Vec::new();
        for (index, step) in scenario.steps.iter().enumerate() {
            let success = !(failing && index == 1);
            results.push(StepResult {
                index,
                success,
                step_name: step.name(),
                duration_ms: 1,
                error: (!success).then(|| "Timeout 5000ms exceeded".to_string()),
                screenshot_path: None,
            });
            if !success {
                break;
            }
        }
        Ok(results)
    }
}

fn runner_with_specs(
    base_url: &str,
    calls: &Log,
    fail: Option<&str>,
    specs_dir: Option<PathBuf>,
) -> (TestRunner, Log, TempDir) {
    let seen = Log::default();
    let driver = RecordingDriver {
        seen: seen.clone(),
        calls: calls.clone(),
        fail: fail.map(String::from),
    };
    let output = tempfile::tempdir().unwrap();
    let config = RunnerConfig {
        backend: BackendConfig {
            base_url: base_url.to_string(),
            request_timeout: Duration::from_secs(2),
            ready_timeout: Duration::from_secs(5),
        },
        specs_dir,
        output_dir: output.path().to_path_buf(),
        ..Default::default()
    };
    (TestRunner::with_driver(config, Box::new(driver)).unwrap(), seen, output)
}

fn runner(base_url: &str, calls: &Log, fail: Option<&str>) -> (TestRunner, Log, TempDir) {
    runner_with_specs(base_url, calls, fail, None)
}

#[tokio::test]
async fn every_scenario_runs_on_a_freshly_seeded_backend() {
    let (url, calls) = start_stub(StatusCode::CREATED).await;
    let (mut runner, seen, _output) = runner(&url, &calls, None);

    let results = runner.run_all().await.unwrap();

    assert_eq!(results.total, 14);
    assert_eq!(results.passed, 14);
    assert_eq!(results.failed, 0);
    assert_eq!(seen.lock().unwrap().len(), 14);

    let calls = calls.lock().unwrap();
    for chunk in calls.chunks(4) {
        assert_eq!(chunk, ["reset", "user:root", "user:test", "run"]);
    }
    assert_eq!(calls.len(), 14 * 4);
}

#[tokio::test]
async fn failed_step_is_named_in_the_result() {
    let (url, calls) = start_stub(StatusCode::CREATED).await;
    let (mut runner, _, _output) = runner(&url, &calls, Some("fails with wrong credentials"));

    let results = runner.run_tagged("login").await.unwrap();

    assert_eq!(results.failed, 1);
    let failed = results.results.iter().find(|r| !r.success).unwrap();
    assert_eq!(failed.name, "Blog app › Login › fails with wrong credentials");
    assert_eq!(failed.steps.len(), 2);
    assert_eq!(
        failed.error.as_deref(),
        Some("fill:testid=inputUsername - Timeout 5000ms exceeded")
    );
}

#[tokio::test]
async fn seeding_failure_fails_the_scenario_without_driving_the_browser() {
    let (url, calls) = start_stub(StatusCode::BAD_REQUEST).await;
    let (mut runner, seen, _output) = runner(&url, &calls, None);

    let results = runner.run_tagged("delete").await.unwrap();

    assert_eq!(results.total, 2);
    assert_eq!(results.failed, 2);
    assert!(seen.lock().unwrap().is_empty());
    for result in &results.results {
        assert!(result.steps.is_empty());
        assert_eq!(
            result.error.as_deref(),
            Some("Backend request POST /api/users returned 400")
        );
    }
}

#[tokio::test]
async fn run_matching_selects_by_full_name() {
    let (url, calls) = start_stub(StatusCode::CREATED).await;
    let (mut runner, seen, _output) = runner(&url, &calls, None);

    let results = runner.run_matching("Like blog").await.unwrap();
    assert_eq!(results.total, 2);
    assert!(seen.lock().unwrap().iter().all(|n| n.contains("› Like blog ›")));

    let err = runner.run_matching("no such scenario").await.unwrap_err();
    assert!(matches!(err, E2eError::ScenarioNotFound(_)));
}

#[tokio::test]
async fn unseeded_yaml_scenarios_still_start_from_a_reset() {
    let (url, calls) = start_stub(StatusCode::CREATED).await;
    let specs = tempfile::tempdir().unwrap();
    std::fs::write(
        specs.path().join("smoke.yaml"),
        r#"
name: root page answers
description: The login form renders on an empty backend
tags: [extra, smoke]
seed_users: false
steps:
  - action: navigate
    url: ""
  - action: assert_visible
    target: { by: test_id, id: loginHeader }
"#,
    )
    .unwrap();

    let (mut runner, seen, _output) =
        runner_with_specs(&url, &calls, None, Some(specs.path().to_path_buf()));

    // A seeded built-in first, so the unseeded scenario follows a dirty backend
    let results = runner.run_tagged("smoke").await.unwrap();

    assert_eq!(results.total, 3);
    assert_eq!(results.passed, 3);
    assert_eq!(
        *calls.lock().unwrap(),
        [
            "reset", "user:root", "user:test", "run",
            "reset", "user:root", "user:test", "run",
            "reset", "run",
        ]
    );
    assert_eq!(seen.lock().unwrap().last().map(String::as_str), Some("root page answers"));

    let unseeded = results.results.last().unwrap();
    assert_eq!(unseeded.description, "The login form renders on an empty backend");
    assert!(results.results[0].description.is_empty());
}

#[tokio::test]
async fn results_are_written_as_json() {
    let (url, calls) = start_stub(StatusCode::CREATED).await;
    let (mut runner, _, _output) = runner(&url, &calls, None);

    let results = runner.run_tagged("smoke").await.unwrap();
    let path = runner.write_results(&results).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(written["total"], 2);
    assert_eq!(written["passed"], 2);
    assert_eq!(written["results"][0]["name"], "Blog app › Login form is shown");
    // Built-in scenarios carry no description, so the key is left out
    assert!(written["results"][0].get("description").is_none());
}
