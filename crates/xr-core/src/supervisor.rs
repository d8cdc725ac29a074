//! Engine process supervisor.
//!
//! An explicit state machine, one await per transition:
//!
//! ```text
//! Idle → Spawning → Running → Exited → (delay) → Spawning → …
//!            └──── spawn failed ───────┘
//! ```
//!
//! There is no terminal state. Clean exits, crashes and spawn failures all
//! take the same path: log, wait [`RESTART_DELAY`], spawn again. Only the
//! owner dropping the future (signal handling in the binary) ends the loop,
//! and dropping kills the running child.

use std::convert::Infallible;
use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{error, info, warn};

use crate::error::LauncherError;

/// Fixed delay between an exit and the next spawn. No backoff growth.
pub const RESTART_DELAY: Duration = Duration::from_secs(3);

/// Exit code of a finished engine; `None` when it was killed by a signal.
pub type ExitCode = Option<i32>;

pub type WaitFuture<'a> = Pin<Box<dyn Future<Output = io::Result<ExitCode>> + Send + 'a>>;

/// A running engine process.
pub trait EngineHandle: Send {
    fn id(&self) -> Option<u32>;
    /// Resolve when the process exits. Must not busy-poll.
    fn wait(&mut self) -> WaitFuture<'_>;
}

/// Something that can start the engine.
pub trait EngineLauncher: Send + Sync {
    fn program(&self) -> &Path;
    fn spawn(&self) -> io::Result<Box<dyn EngineHandle>>;
}

/// Launches a real OS process.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    quiet: bool,
}

impl CommandLauncher {
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            current_dir: None,
            quiet: false,
        }
    }

    /// `<engine> run -c <config>`
    pub fn engine(engine: &Path, config: &Path) -> Self {
        Self::new(
            engine,
            [OsString::from("run"), OsString::from("-c"), config.as_os_str().to_owned()],
        )
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Discard the child's stdout/stderr instead of inheriting them.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

struct ChildHandle(Child);

impl EngineHandle for ChildHandle {
    fn id(&self) -> Option<u32> {
        self.0.id()
    }

    fn wait(&mut self) -> WaitFuture<'_> {
        Box::pin(async move { self.0.wait().await.map(|status| status.code()) })
    }
}

impl EngineLauncher for CommandLauncher {
    fn program(&self) -> &Path {
        &self.program
    }

    fn spawn(&self) -> io::Result<Box<dyn EngineHandle>> {
        let output = || if self.quiet { Stdio::null() } else { Stdio::inherit() };
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(output())
            .stderr(output())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        let child = cmd.spawn()?;
        Ok(Box::new(ChildHandle(child)))
    }
}

/// Why the last run ended.
#[derive(Debug)]
pub enum ExitReason {
    Exited(ExitCode),
    WaitFailed(io::Error),
    SpawnFailed(LauncherError),
}

enum State {
    Idle,
    Spawning,
    Running(Box<dyn EngineHandle>),
    Exited(ExitReason),
}

pub struct Supervisor<L> {
    launcher: L,
    restart_delay: Duration,
    restarts: u64,
    state: State,
}

impl<L: EngineLauncher> Supervisor<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            restart_delay: RESTART_DELAY,
            restarts: 0,
            state: State::Idle,
        }
    }

    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    /// Supervise forever.
    pub async fn run(mut self) -> Infallible {
        loop {
            self.advance().await;
        }
    }

    async fn advance(&mut self) {
        let next = match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {
                info!(engine = %self.launcher.program().display(), "starting engine");
                State::Spawning
            }
            State::Spawning => match self.launcher.spawn() {
                Ok(handle) => {
                    info!(pid = ?handle.id(), restarts = self.restarts, "engine running");
                    State::Running(handle)
                }
                Err(source) => State::Exited(ExitReason::SpawnFailed(
                    LauncherError::EngineSpawnFailed {
                        program: self.launcher.program().to_path_buf(),
                        source,
                    },
                )),
            },
            State::Running(mut handle) => match handle.wait().await {
                Ok(code) => State::Exited(ExitReason::Exited(code)),
                Err(e) => State::Exited(ExitReason::WaitFailed(e)),
            },
            State::Exited(reason) => {
                let delay = self.restart_delay.as_secs_f64();
                match &reason {
                    ExitReason::Exited(Some(code)) => {
                        warn!(code, "engine exited, restarting in {delay}s")
                    }
                    ExitReason::Exited(None) => {
                        warn!("engine killed by signal, restarting in {delay}s")
                    }
                    ExitReason::WaitFailed(e) => {
                        error!(error = %e, "lost track of engine, restarting in {delay}s")
                    }
                    ExitReason::SpawnFailed(e) => {
                        error!(error = %e, "engine failed to start, retrying in {delay}s")
                    }
                }
                tokio::time::sleep(self.restart_delay).await;
                self.restarts += 1;
                State::Spawning
            }
        };
        self.state = next;
    }
}
