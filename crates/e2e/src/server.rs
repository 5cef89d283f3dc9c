//! App process management - spawning the blog app for a suite run

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tracing::info;

use crate::backend::Backend;
use crate::error::{E2eError, E2eResult};

/// Handle to a running app process
pub struct AppHandle {
    /// `None` once stopped
    child: Option<Child>,
}

impl AppHandle {
    /// Spawn the app and wait until `backend` answers
    pub async fn spawn(config: &AppConfig, backend: &Backend) -> E2eResult<Self> {
        let (program, args) = config
            .command
            .split_first()
            .ok_or_else(|| E2eError::AppStartup("empty app command".to_string()))?;

        info!("Spawning app: {}", config.command.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        // The app's own output would interleave with the runner's
        cmd.stdout(Stdio::null()).stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            E2eError::AppStartup(format!("Failed to spawn {}: {}", program, e))
        })?;

        let handle = AppHandle { child: Some(child) };
        backend.wait_until_ready().await?;
        Ok(handle)
    }

    /// Stop the app. Later calls do nothing.
    pub fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        info!("Stopping app (pid: {})", child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        // Force kill if still running
        let _ = child.kill();
        let _ = child.wait();

        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }
}

impl Drop for AppHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// How to start the app under test
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Program and arguments, e.g. `["npm", "run", "start:test"]`
    pub command: Vec<String>,

    /// Directory to run the command in
    pub working_dir: Option<PathBuf>,

    /// Extra environment, e.g. `NODE_ENV=test` to enable the reset route
    pub env: Vec<(String, String)>,
}

impl AppConfig {
    /// Split a shell-like command line on whitespace
    pub fn from_command_line(line: &str) -> Self {
        Self {
            command: line.split_whitespace().map(String::from).collect(),
            ..Default::default()
        }
    }
}
