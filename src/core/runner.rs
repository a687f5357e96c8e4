use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::Child;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use crate::core::ShellCommand;
use crate::error::{AppError, AppResult};

const REAP_INTERVAL: Duration = Duration::from_millis(20);

pub type RunId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerEventKind {
    Output(String),
    Exited { code: Option<i32> },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerEvent {
    pub run: RunId,
    pub kind: RunnerEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped(RunId),
    NotRunning,
}

/// Child process shared between the supervisor thread and `stop()`.
///
/// `exited` only changes while `child` is locked, so a kill is never sent to
/// a process that has already been reaped.
#[derive(Debug)]
struct ProcessHandle {
    child: Mutex<Child>,
    exited: AtomicBool,
}

impl ProcessHandle {
    fn new(child: Child) -> Self {
        Self {
            child: Mutex::new(child),
            exited: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Child> {
        self.child
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_alive(&self) -> bool {
        !self.exited.load(Ordering::SeqCst)
    }

    /// Kills the child unless it has already exited. Returns false when
    /// there was nothing left to kill.
    fn kill(&self) -> bool {
        let mut child = self.lock();
        if !self.is_alive() {
            return false;
        }
        if let Ok(Some(_)) = child.try_wait() {
            self.exited.store(true, Ordering::SeqCst);
            return false;
        }
        if let Err(error) = child.kill() {
            tracing::warn!(%error, pid = child.id(), "failed to kill process");
        }
        true
    }

    fn try_reap(&self) -> Option<Option<i32>> {
        let mut child = self.lock();
        match child.try_wait() {
            Ok(Some(status)) => {
                self.exited.store(true, Ordering::SeqCst);
                Some(status.code())
            }
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(%error, pid = child.id(), "failed to wait for process");
                self.exited.store(true, Ordering::SeqCst);
                Some(None)
            }
        }
    }
}

#[derive(Debug)]
pub struct RunningProcess {
    pub run: RunId,
    pub command: String,
    pub started: Instant,
    handle: Arc<ProcessHandle>,
}

#[derive(Debug)]
pub enum RunnerState {
    Idle,
    Running(RunningProcess),
}

#[derive(Debug)]
pub struct CommandRunner {
    state: RunnerState,
    event_tx: Sender<RunnerEvent>,
    event_rx: Receiver<RunnerEvent>,
    pending: VecDeque<RunnerEvent>,
    next_run: RunId,
}

impl CommandRunner {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel::<RunnerEvent>();
        Self {
            state: RunnerState::Idle,
            event_tx,
            event_rx,
            pending: VecDeque::new(),
            next_run: 0,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &RunnerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunnerState::Running(_))
    }

    pub fn current(&self) -> Option<&RunningProcess> {
        match &self.state {
            RunnerState::Running(process) => Some(process),
            RunnerState::Idle => None,
        }
    }

    /// Starts `raw` through the host shell in `cwd`. Rejected while another
    /// command is still running.
    pub fn execute(&mut self, raw: &str, cwd: &Path) -> AppResult<RunId> {
        if self.is_running() {
            return Err(AppError::CommandBusy);
        }
        let shell = ShellCommand::new(cwd, raw)?;
        let mut child = shell
            .build()
            .spawn()
            .map_err(|source| AppError::ProcessSpawn {
                command: shell.raw_command.clone(),
                source,
            })?;

        self.next_run += 1;
        let run = self.next_run;
        let readers: Vec<thread::JoinHandle<()>> = [
            child
                .stdout
                .take()
                .map(|stdout| spawn_reader(stdout, run, self.event_tx.clone())),
            child
                .stderr
                .take()
                .map(|stderr| spawn_reader(stderr, run, self.event_tx.clone())),
        ]
        .into_iter()
        .flatten()
        .collect();

        tracing::info!(run, pid = child.id(), command = %shell.raw_command, cwd = %cwd.display(), "process started");
        let handle = Arc::new(ProcessHandle::new(child));
        spawn_supervisor(Arc::clone(&handle), readers, run, self.event_tx.clone());
        self.state = RunnerState::Running(RunningProcess {
            run,
            command: shell.raw_command,
            started: Instant::now(),
            handle,
        });
        Ok(run)
    }

    /// Force-kills the running process and returns to Idle at once.
    ///
    /// Output the run already produced stays deliverable and is followed by
    /// `Cancelled`. A process that exited on its own is left for `poll` to
    /// report, and the result is `NotRunning`.
    pub fn stop(&mut self) -> StopOutcome {
        let RunnerState::Running(process) = &self.state else {
            return StopOutcome::NotRunning;
        };
        let run = process.run;
        if !process.handle.kill() {
            tracing::debug!(run, "process exited before it was stopped");
            return StopOutcome::NotRunning;
        }
        tracing::info!(run, command = %process.command, "process stopped");
        while let Ok(event) = self.event_rx.try_recv() {
            if event.run == run && matches!(event.kind, RunnerEventKind::Output(_)) {
                self.pending.push_back(event);
            }
        }
        self.pending.push_back(RunnerEvent {
            run,
            kind: RunnerEventKind::Cancelled,
        });
        self.state = RunnerState::Idle;
        StopOutcome::Stopped(run)
    }

    /// Next event for the current run, if any. Events a stopped run produces
    /// after it was killed are discarded.
    pub fn poll(&mut self) -> Option<RunnerEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        loop {
            let event = self.event_rx.try_recv().ok()?;
            let current = match &self.state {
                RunnerState::Running(process) => process.run,
                RunnerState::Idle => continue,
            };
            if event.run != current {
                continue;
            }
            if let RunnerEventKind::Exited { code } = event.kind {
                tracing::info!(run = event.run, ?code, "process exited");
                self.state = RunnerState::Idle;
            }
            return Some(event);
        }
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CommandRunner {
    fn drop(&mut self) {
        if let RunnerState::Running(process) = &self.state {
            process.handle.kill();
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    reader: R,
    run: RunId,
    event_tx: Sender<RunnerEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let text = String::from_utf8_lossy(&line)
                .trim_end_matches(['\n', '\r'])
                .to_string();
            let event = RunnerEvent {
                run,
                kind: RunnerEventKind::Output(text),
            };
            if event_tx.send(event).is_err() {
                break;
            }
        }
    })
}

fn spawn_supervisor(
    handle: Arc<ProcessHandle>,
    readers: Vec<thread::JoinHandle<()>>,
    run: RunId,
    event_tx: Sender<RunnerEvent>,
) {
    thread::spawn(move || {
        for reader in readers {
            let _ = reader.join();
        }
        let code = loop {
            if let Some(code) = handle.try_reap() {
                break code;
            }
            thread::sleep(REAP_INTERVAL);
        };
        let _ = event_tx.send(RunnerEvent {
            run,
            kind: RunnerEventKind::Exited { code },
        });
    });
}

#[cfg(all(test, not(target_os = "windows")))]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    fn collect_until_exit(runner: &mut CommandRunner) -> (Vec<String>, Option<i32>) {
        let mut lines = Vec::new();
        let start = Instant::now();
        while start.elapsed() < WAIT {
            match runner.poll() {
                Some(RunnerEvent {
                    kind: RunnerEventKind::Output(line),
                    ..
                }) => lines.push(line),
                Some(RunnerEvent {
                    kind: RunnerEventKind::Exited { code },
                    ..
                }) => return (lines, code),
                Some(event) => panic!("unexpected event {event:?}"),
                None => thread::sleep(Duration::from_millis(10)),
            }
        }
        panic!("process did not exit in time");
    }

    #[test]
    fn execute_streams_lines_in_order_then_exit() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new();

        runner
            .execute("printf 'one\\ntwo\\nthree\\n'", temp_dir.path())
            .unwrap();
        assert!(runner.is_running());
        let (lines, code) = collect_until_exit(&mut runner);

        assert_eq!(lines, vec!["one", "two", "three"]);
        assert_eq!(code, Some(0));
        assert!(!runner.is_running());
    }

    #[test]
    fn execute_reports_nonzero_exit_code() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new();

        runner.execute("exit 3", temp_dir.path()).unwrap();
        let (lines, code) = collect_until_exit(&mut runner);

        assert!(lines.is_empty());
        assert_eq!(code, Some(3));
        assert!(matches!(runner.state(), RunnerState::Idle));
    }

    #[test]
    fn execute_merges_stderr_into_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new();

        runner.execute("echo oops 1>&2", temp_dir.path()).unwrap();
        let (lines, _) = collect_until_exit(&mut runner);

        assert_eq!(lines, vec!["oops"]);
    }

    #[test]
    fn execute_while_running_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new();
        let first = runner.execute("sleep 5", temp_dir.path()).unwrap();

        let second = runner.execute("echo hi", temp_dir.path());

        assert!(matches!(second, Err(AppError::CommandBusy)));
        assert_eq!(runner.current().map(|process| process.run), Some(first));
        assert_eq!(runner.stop(), StopOutcome::Stopped(first));
    }

    fn drain(runner: &mut CommandRunner) -> Vec<RunnerEvent> {
        std::iter::from_fn(|| runner.poll()).collect()
    }

    #[test]
    fn stop_immediately_after_execute_leaves_runner_idle() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new();
        let run = runner.execute("echo hi; sleep 30", temp_dir.path()).unwrap();

        let outcome = runner.stop();

        assert_eq!(outcome, StopOutcome::Stopped(run));
        assert!(!runner.is_running());
        thread::sleep(Duration::from_millis(200));
        let events = drain(&mut runner);
        let (last, earlier) = events.split_last().unwrap();
        assert_eq!(last.kind, RunnerEventKind::Cancelled);
        assert!(earlier.iter().all(|event| event.run == run
            && event.kind == RunnerEventKind::Output("hi".to_string())));
    }

    #[test]
    fn stop_after_exit_keeps_output_and_completion() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new();
        let run = runner.execute("echo arrived", temp_dir.path()).unwrap();
        thread::sleep(Duration::from_millis(500));

        let outcome = runner.stop();

        assert_eq!(outcome, StopOutcome::NotRunning);
        let events = drain(&mut runner);
        assert_eq!(
            events,
            vec![
                RunnerEvent {
                    run,
                    kind: RunnerEventKind::Output("arrived".to_string()),
                },
                RunnerEvent {
                    run,
                    kind: RunnerEventKind::Exited { code: Some(0) },
                },
            ]
        );
        assert!(!runner.is_running());
    }

    #[test]
    fn stop_delivers_output_queued_before_kill() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new();
        let run = runner
            .execute("echo early; sleep 30", temp_dir.path())
            .unwrap();
        thread::sleep(Duration::from_millis(500));

        assert_eq!(runner.stop(), StopOutcome::Stopped(run));

        assert_eq!(
            drain(&mut runner),
            vec![
                RunnerEvent {
                    run,
                    kind: RunnerEventKind::Output("early".to_string()),
                },
                RunnerEvent {
                    run,
                    kind: RunnerEventKind::Cancelled,
                },
            ]
        );
    }

    #[test]
    fn late_output_from_stopped_run_is_not_delivered_to_next_run() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new();
        let first = runner
            .execute("(sleep 0.3; echo late) & sleep 30", temp_dir.path())
            .unwrap();
        runner.stop();
        drain(&mut runner);

        let second = runner
            .execute("sleep 1; echo next", temp_dir.path())
            .unwrap();
        let mut events = Vec::new();
        let start = Instant::now();
        while !events
            .iter()
            .any(|event: &RunnerEvent| matches!(event.kind, RunnerEventKind::Exited { .. }))
        {
            assert!(start.elapsed() < WAIT, "second command did not finish");
            match runner.poll() {
                Some(event) => events.push(event),
                None => thread::sleep(Duration::from_millis(10)),
            }
        }

        assert_ne!(first, second);
        assert!(events.iter().all(|event| event.run == second));
        assert_eq!(
            events[0].kind,
            RunnerEventKind::Output("next".to_string())
        );
    }

    #[test]
    fn stop_kills_long_running_process_and_allows_next_command() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new();
        runner.execute("sleep 30", temp_dir.path()).unwrap();

        runner.stop();
        runner.execute("echo next", temp_dir.path()).unwrap();
        let mut lines = Vec::new();
        let start = Instant::now();
        let code = loop {
            assert!(start.elapsed() < WAIT, "second command did not finish");
            match runner.poll() {
                Some(RunnerEvent {
                    kind: RunnerEventKind::Output(line),
                    ..
                }) => lines.push(line),
                Some(RunnerEvent {
                    kind: RunnerEventKind::Exited { code },
                    ..
                }) => break code,
                Some(_) => {}
                None => thread::sleep(Duration::from_millis(10)),
            }
        };

        assert_eq!(lines, vec!["next"]);
        assert_eq!(code, Some(0));
    }

    #[test]
    fn stop_when_idle_is_noop() {
        let mut runner = CommandRunner::new();

        assert_eq!(runner.stop(), StopOutcome::NotRunning);
        assert!(runner.poll().is_none());
    }

    #[test]
    fn execute_in_missing_directory_fails_to_spawn() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new();

        let result = runner.execute("echo hi", &temp_dir.path().join("missing"));

        assert!(matches!(result, Err(AppError::ProcessSpawn { .. })));
        assert!(!runner.is_running());
    }

    #[test]
    fn execute_rejects_blank_command() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new();

        let result = runner.execute("  ", temp_dir.path());

        assert!(matches!(result, Err(AppError::EmptyCommand)));
    }
}
