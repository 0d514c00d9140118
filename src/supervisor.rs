// File: supervisor.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

//! Repeats cycles on an interval until cancelled.
//!
//! Each cycle runs in an isolated unit (a child process or a spawned task) so
//! that a fault inside it only shows up as a failed result. Cycles never
//! overlap. Cancellation is only observed while sleeping between cycles; a
//! running cycle always finishes and flushes its ledger first.

use log::{debug, error, info, warn};
use std::ffi::OsString;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, Isolation};
use crate::errors::SupervisorError;
use crate::pidfile::PidFile;
use crate::pipeline::{run_cycle, CycleReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Starting,
    Running,
    Terminating,
    Exited,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Terminating => "terminating",
            Self::Exited => "exited",
        };
        f.write_str(name)
    }
}

/// An isolated unit of execution for one cycle.
pub trait CycleIsolation {
    fn run(&self) -> impl Future<Output = Result<CycleReport, SupervisorError>> + Send;
}

/// Runs the cycle in a child process: the current executable re-invoked with
/// the hidden `cycle` subcommand, which prints its report as JSON.
#[derive(Debug, Clone)]
pub struct ProcessCycle {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessCycle {
    pub fn new(program: impl Into<PathBuf>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn current_exe(config_path: &Path, log_level: &str) -> Result<Self, SupervisorError> {
        let program = std::env::current_exe().map_err(SupervisorError::Spawn)?;
        let args = vec![
            OsString::from("--config"),
            config_path.as_os_str().to_os_string(),
            OsString::from("--log-level"),
            OsString::from(log_level),
            OsString::from("cycle"),
        ];
        Ok(Self::new(program, args))
    }
}

impl CycleIsolation for ProcessCycle {
    async fn run(&self) -> Result<CycleReport, SupervisorError> {
        let mut command = std::process::Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        // A terminal interrupt must not reach an in-flight cycle.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let output = Command::from(command)
            .output()
            .await
            .map_err(SupervisorError::Spawn)?;
        if !output.status.success() {
            return Err(SupervisorError::CycleFailed(describe_exit(output.status)));
        }
        parse_report(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Runs the cycle on a spawned tokio task. A panic inside the cycle is
/// reported as a failed cycle.
#[derive(Debug, Clone)]
pub struct TaskCycle {
    config: Config,
}

impl TaskCycle {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl CycleIsolation for TaskCycle {
    async fn run(&self) -> Result<CycleReport, SupervisorError> {
        let config = self.config.clone();
        contain(async move { run_cycle(&config).await }).await
    }
}

async fn contain<F>(cycle: F) -> Result<CycleReport, SupervisorError>
where
    F: Future<Output = anyhow::Result<CycleReport>> + Send + 'static,
{
    match tokio::spawn(cycle).await {
        Ok(Ok(report)) => Ok(report),
        Ok(Err(e)) => Err(SupervisorError::CycleFailed(format!("{:#}", e))),
        Err(e) => Err(SupervisorError::CycleFailed(format!("cycle task aborted: {}", e))),
    }
}

#[derive(Debug, Clone)]
pub enum CycleRunner {
    Process(ProcessCycle),
    Task(TaskCycle),
}

impl CycleRunner {
    pub fn for_config(
        config: &Config,
        config_path: &Path,
    ) -> Result<Self, SupervisorError> {
        match config.isolation() {
            Isolation::Process => Ok(Self::Process(ProcessCycle::current_exe(
                config_path,
                config.log_level(),
            )?)),
            Isolation::Task => Ok(Self::Task(TaskCycle::new(config.clone()))),
        }
    }
}

impl CycleIsolation for CycleRunner {
    async fn run(&self) -> Result<CycleReport, SupervisorError> {
        match self {
            Self::Process(cycle) => cycle.run().await,
            Self::Task(cycle) => cycle.run().await,
        }
    }
}

/// The report is the last non-empty line the child printed.
pub fn parse_report(stdout: &str) -> Result<CycleReport, SupervisorError> {
    let line = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| SupervisorError::CycleFailed("cycle produced no report".to_string()))?;
    serde_json::from_str(line)
        .map_err(|e| SupervisorError::CycleFailed(format!("unreadable cycle report: {}", e)))
}

fn describe_exit(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("cycle exited with status {}", code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("cycle killed by signal {}", signal);
        }
    }
    "cycle terminated abnormally".to_string()
}

pub struct Supervisor<C> {
    cycle: C,
    interval: Duration,
    pid_file: Option<PathBuf>,
    cancel: CancellationToken,
    state: SupervisorState,
}

impl<C: CycleIsolation> Supervisor<C> {
    pub fn new(cycle: C, interval: Duration, cancel: CancellationToken) -> Self {
        Self {
            cycle,
            interval,
            pid_file: None,
            cancel,
            state: SupervisorState::Starting,
        }
    }

    pub fn with_pid_file(mut self, pid_file: Option<PathBuf>) -> Self {
        self.pid_file = pid_file;
        self
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    fn transition(&mut self, next: SupervisorState) {
        info!("Supervisor {} -> {}.", self.state, next);
        self.state = next;
    }

    /// Runs cycles until the token is cancelled. Returns the number of
    /// cycles started.
    pub async fn run(&mut self) -> Result<usize, SupervisorError> {
        info!("Supervisor {} (pid {}).", self.state, std::process::id());
        let marker = match &self.pid_file {
            Some(path) => Some(PidFile::create(path)?),
            None => None,
        };

        self.transition(SupervisorState::Running);
        let mut cycles = 0;
        loop {
            cycles += 1;
            let started = Instant::now();
            debug!("Spawning cycle {}.", cycles);

            match self.cycle.run().await {
                Ok(report) => info!(
                    "Cycle {} done: {} new, {} already seen, {} failed, {} history records.",
                    cycles,
                    report.stored,
                    report.already_seen,
                    report.fetch_failures + report.store_failures,
                    report.ledger_records
                ),
                Err(e) => error!("Cycle {} failed: {}", cycles, e),
            }

            if self.cancel.is_cancelled() {
                break;
            }

            let pause = self.interval.saturating_sub(started.elapsed());
            debug!("Next cycle in {} s.", pause.as_secs());
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        self.transition(SupervisorState::Terminating);
        if let Some(marker) = marker {
            if let Err(e) = marker.remove() {
                warn!("{}", e);
            }
        }
        self.transition(SupervisorState::Exited);
        Ok(cycles)
    }
}

/// Cancels `token` on SIGINT or SIGTERM. On unix the handlers are installed
/// before this returns.
#[cfg(unix)]
pub fn cancel_on_signals(token: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    let streams = signal(SignalKind::interrupt())
        .and_then(|int| signal(SignalKind::terminate()).map(|term| (int, term)));
    let (mut int, mut term) = match streams {
        Ok(streams) => streams,
        Err(e) => {
            warn!("Cannot install signal handlers: {}", e);
            return;
        }
    };

    tokio::spawn(async move {
        tokio::select! {
            _ = int.recv() => {}
            _ = term.recv() => {}
        }
        info!("Termination requested.");
        token.cancel();
    });
}

#[cfg(not(unix))]
pub fn cancel_on_signals(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Termination requested.");
            token.cancel();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct ScriptedCycle {
        runs: Arc<AtomicUsize>,
        fail_first: usize,
        cancel_after: Option<usize>,
        cancel: CancellationToken,
    }

    impl ScriptedCycle {
        fn new(cancel: &CancellationToken) -> Self {
            Self {
                runs: Arc::new(AtomicUsize::new(0)),
                fail_first: 0,
                cancel_after: None,
                cancel: cancel.clone(),
            }
        }
    }

    impl CycleIsolation for ScriptedCycle {
        async fn run(&self) -> Result<CycleReport, SupervisorError> {
            let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            if Some(run) == self.cancel_after {
                self.cancel.cancel();
            }
            if run <= self.fail_first {
                return Err(SupervisorError::CycleFailed("scripted".to_string()));
            }
            Ok(CycleReport::default())
        }
    }

    #[tokio::test]
    async fn test_cancel_during_cycle_finishes_that_cycle() {
        let cancel = CancellationToken::new();
        let mut cycle = ScriptedCycle::new(&cancel);
        cycle.cancel_after = Some(1);
        let runs = Arc::clone(&cycle.runs);

        let mut supervisor = Supervisor::new(cycle, Duration::from_secs(3600), cancel);
        let cycles = supervisor.run().await.unwrap();

        assert_eq!(cycles, 1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(supervisor.state(), SupervisorState::Exited);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_sleep() {
        let cancel = CancellationToken::new();
        let cycle = ScriptedCycle::new(&cancel);
        let runs = Arc::clone(&cycle.runs);

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let mut supervisor = Supervisor::new(cycle, Duration::from_secs(3600), cancel);
        let started = Instant::now();
        let cycles = supervisor.run().await.unwrap();

        assert_eq!(cycles, 1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_failed_cycles_do_not_stop_the_loop() {
        let cancel = CancellationToken::new();
        let mut cycle = ScriptedCycle::new(&cancel);
        cycle.fail_first = 2;
        cycle.cancel_after = Some(3);

        let mut supervisor = Supervisor::new(cycle, Duration::ZERO, cancel);
        assert_eq!(supervisor.run().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_pid_marker_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let pid_path = temp_dir.path().join("feedhound.pid");
        let cancel = CancellationToken::new();

        let observed = Arc::new(AtomicUsize::new(0));
        struct MarkerCheck {
            path: PathBuf,
            observed: Arc<AtomicUsize>,
            cancel: CancellationToken,
        }
        impl CycleIsolation for MarkerCheck {
            async fn run(&self) -> Result<CycleReport, SupervisorError> {
                if PidFile::read_pid(&self.path) == Some(std::process::id()) {
                    self.observed.fetch_add(1, Ordering::SeqCst);
                }
                self.cancel.cancel();
                Ok(CycleReport::default())
            }
        }

        let cycle = MarkerCheck {
            path: pid_path.clone(),
            observed: Arc::clone(&observed),
            cancel: cancel.clone(),
        };
        let mut supervisor = Supervisor::new(cycle, Duration::from_secs(3600), cancel)
            .with_pid_file(Some(pid_path.clone()));
        supervisor.run().await.unwrap();

        assert_eq!(observed.load(Ordering::SeqCst), 1);
        assert!(!pid_path.exists());
    }

    #[tokio::test]
    async fn test_existing_marker_refuses_start() {
        let temp_dir = TempDir::new().unwrap();
        let pid_path = temp_dir.path().join("feedhound.pid");
        std::fs::write(&pid_path, "12345\n").unwrap();

        let cancel = CancellationToken::new();
        let cycle = ScriptedCycle::new(&cancel);
        let runs = Arc::clone(&cycle.runs);
        let mut supervisor = Supervisor::new(cycle, Duration::ZERO, cancel)
            .with_pid_file(Some(pid_path.clone()));

        let result = supervisor.run().await;

        assert!(matches!(result, Err(SupervisorError::AlreadyRunning(_))));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_to_string(&pid_path).unwrap(), "12345\n");
    }

    #[test]
    fn test_parse_report_takes_last_line() {
        let report = CycleReport {
            stored: 2,
            already_seen: 5,
            ..Default::default()
        };
        let stdout = format!("noise\n{}\n\n", serde_json::to_string(&report).unwrap());

        assert_eq!(parse_report(&stdout).unwrap(), report);
        assert!(parse_report("").is_err());
        assert!(parse_report("not json").is_err());
    }

    #[tokio::test]
    async fn test_task_cycle_reports_fatal_cycle_errors() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::new(
            vec![],
            temp_dir.path().join("missing"),
            temp_dir.path().join("history"),
            temp_dir.path().join("log"),
        );

        let result = TaskCycle::new(config).run().await;

        assert!(matches!(result, Err(SupervisorError::CycleFailed(_))));
    }

    #[tokio::test]
    async fn test_panicking_task_is_contained() {
        let result = contain(async {
            if CycleReport::default().stored == 0 {
                panic!("cycle blew up");
            }
            Ok(CycleReport::default())
        })
        .await;

        match result {
            Err(SupervisorError::CycleFailed(msg)) => assert!(msg.contains("aborted"), "{}", msg),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_cycle_protocol() {
        let report = CycleReport {
            stored: 1,
            ..Default::default()
        };
        let script = format!("echo '{}'", serde_json::to_string(&report).unwrap());
        let ok = ProcessCycle::new("sh", vec!["-c".into(), script.into()]);
        assert_eq!(ok.run().await.unwrap(), report);

        let failing = ProcessCycle::new("sh", vec!["-c".into(), "exit 3".into()]);
        match failing.run().await {
            Err(SupervisorError::CycleFailed(msg)) => assert!(msg.contains("status 3")),
            other => panic!("unexpected {:?}", other),
        }

        let killed = ProcessCycle::new("sh", vec!["-c".into(), "kill -9 $$".into()]);
        match killed.run().await {
            Err(SupervisorError::CycleFailed(msg)) => assert!(msg.contains("signal 9")),
            other => panic!("unexpected {:?}", other),
        }

        let missing = ProcessCycle::new("/nonexistent/feedhound", vec![]);
        assert!(matches!(missing.run().await, Err(SupervisorError::Spawn(_))));
    }
}
