//! HTTP access to the blog backend: readiness, reset and seeding

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::fixtures::User;

const RESET_PATH: &str = "/api/testing/reset";
const USERS_PATH: &str = "/api/users";

/// Configuration for the backend client
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL the app (and its `/api` routes) is served from
    pub base_url: String,

    /// Timeout for a single request
    pub request_timeout: Duration,

    /// How long to wait for the app to answer at all
    pub ready_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            request_timeout: Duration::from_secs(10),
            ready_timeout: Duration::from_secs(30),
        }
    }
}

/// Client for the test-seeding endpoints
#[derive(Debug, Clone)]
pub struct Backend {
    client: reqwest::Client,
    base_url: String,
    ready_timeout: Duration,
}

impl Backend {
    pub fn new(config: BackendConfig) -> E2eResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ready_timeout: config.ready_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Poll the app root until it answers with a success status
    pub async fn wait_until_ready(&self) -> E2eResult<()> {
        let url = format!("{}/", self.base_url);
        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < self.ready_timeout {
            attempts += 1;

            match self.client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    info!("App is ready at {}", self.base_url);
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Readiness check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for app at {}...", self.base_url);
                    }
                    // Connection refused is expected while the app is starting
                    if !e.is_connect() {
                        warn!("Readiness check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(200)).await;
        }

        Err(E2eError::AppNotReady {
            url,
            attempts,
        })
    }

    /// Wipe all backend state
    pub async fn reset(&self) -> E2eResult<()> {
        self.post::<()>(RESET_PATH, None).await
    }

    pub async fn create_user(&self, user: &User) -> E2eResult<()> {
        self.post(USERS_PATH, Some(user)).await
    }

    /// Create `users` in order
    pub async fn seed_users(&self, users: &[User]) -> E2eResult<()> {
        for user in users {
            self.create_user(user).await?;
        }
        debug!("Seeded {} user(s)", users.len());
        Ok(())
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: Option<&T>) -> E2eResult<()> {
        let mut request = self.client.post(format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(E2eError::BackendStatus {
                method: "POST",
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
