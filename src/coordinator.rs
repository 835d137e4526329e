/// Startup, steady state and shutdown of the clock.
///
/// Owns the shared state and the screen, installs the signal listener,
/// takes over the terminal, spawns both loops and waits for a carriage
/// return on stdin before stopping them.
use crate::ansi;
use crate::clock::{ClockLoop, ClockSettings, SystemTimeSource};
use crate::config::{ClockConfig, ConfigError};
use crate::screen::Screen;
use crate::signals::{SignalError, SignalListener};
use crate::state::SharedState;
use crate::stats::{ProcessUsage, StatsLoop};
use crate::terminal::{TerminalError, TerminalGuard};
use crate::worker::WorkerError;
use std::io::Read;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const PROMPT_LINES: [&str; 3] = [
    "Press Ctrl-C to change clock color.",
    "Press Ctrl-\\ to change clock time format.",
    "Press CR to Exit.",
];

/// Setup or input failure. Any of these ends the process with a nonzero
/// status.
#[derive(Debug)]
pub enum ClockError {
    Config(ConfigError),
    Signal(SignalError),
    Terminal(TerminalError),
    /// Drawing the prompt failed.
    Screen(std::io::Error),
    /// Reading stdin failed.
    Input(std::io::Error),
    /// Stdin reached EOF before a carriage return.
    InputClosed,
}

impl std::fmt::Display for ClockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockError::Config(e) => write!(f, "{e}"),
            ClockError::Signal(e) => write!(f, "{e}"),
            ClockError::Terminal(e) => write!(f, "{e}"),
            ClockError::Screen(e) => write!(f, "failed to draw prompt: {e}"),
            ClockError::Input(e) => write!(f, "failed to read stdin: {e}"),
            ClockError::InputClosed => write!(f, "stdin closed before a carriage return"),
        }
    }
}

impl std::error::Error for ClockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClockError::Config(e) => Some(e),
            ClockError::Signal(e) => Some(e),
            ClockError::Terminal(e) => Some(e),
            ClockError::Screen(e) | ClockError::Input(e) => Some(e),
            ClockError::InputClosed => None,
        }
    }
}

impl From<ConfigError> for ClockError {
    fn from(e: ConfigError) -> Self {
        ClockError::Config(e)
    }
}

impl From<SignalError> for ClockError {
    fn from(e: SignalError) -> Self {
        ClockError::Signal(e)
    }
}

impl From<TerminalError> for ClockError {
    fn from(e: TerminalError) -> Self {
        ClockError::Terminal(e)
    }
}

/// A worker loop that ended with an error before shutdown.
#[derive(Debug)]
pub struct WorkerFailure {
    pub worker: &'static str,
    pub error: WorkerError,
}

impl std::fmt::Display for WorkerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} loop stopped early: {}", self.worker, self.error)
    }
}

/// Escape sequences for the help prompt, one line per row from (`row`, `col`).
pub fn render_prompt(row: u16, col: u16) -> String {
    let mut out = String::from(ansi::RESET_COLOR);
    for (offset, line) in (0u16..).zip(PROMPT_LINES) {
        ansi::move_cursor(&mut out, row.saturating_add(offset), col);
        out.push_str(ansi::CLEAR_LINE);
        out.push_str(line);
    }
    out
}

/// Block until `input` yields a carriage return or newline.
pub fn read_until_return<R: Read>(input: R) -> Result<(), ClockError> {
    for byte in input.bytes() {
        match byte.map_err(ClockError::Input)? {
            b'\r' | b'\n' => return Ok(()),
            _ => {}
        }
    }
    Err(ClockError::InputClosed)
}

async fn wait_for_return() -> Result<(), ClockError> {
    tokio::task::spawn_blocking(|| read_until_return(std::io::stdin().lock()))
        .await
        .map_err(|e| ClockError::Input(std::io::Error::other(e)))?
}

async fn join_worker(
    worker: &'static str,
    handle: JoinHandle<Result<u64, WorkerError>>,
) -> Option<WorkerFailure> {
    match handle.await {
        Ok(Ok(iterations)) => {
            tracing::info!(worker, iterations, "worker joined");
            None
        }
        Ok(Err(error)) => Some(WorkerFailure { worker, error }),
        Err(e) => {
            tracing::error!(worker, error = %e, "worker task panicked");
            Some(WorkerFailure {
                worker,
                error: WorkerError::Panicked(e.to_string()),
            })
        }
    }
}

/// Run the clock until the user presses return.
///
/// Returns the loops that failed along the way; those do not make the run
/// fail. The terminal is restored before this returns.
pub async fn run(config: &ClockConfig) -> Result<Vec<WorkerFailure>, ClockError> {
    let screen = Arc::new(Screen::stdout());
    let state = Arc::new(SharedState::new(config.clock.color, config.clock.use_24h));
    let interval = config.refresh_interval();
    let layout = &config.layout;

    let listener = SignalListener::install()?;
    let terminal = TerminalGuard::enter(Arc::clone(&screen))?;

    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let signal_task = tokio::spawn(listener.run(commands_tx));

    let clock = ClockLoop::new(
        Arc::clone(&state),
        Arc::clone(&screen),
        commands_rx,
        SystemTimeSource,
        ClockSettings {
            row: layout.clock_row,
            col: layout.clock_col,
            dst_offset_hours: config.clock.dst_offset_hours,
            interval,
        },
    );
    let stats = StatsLoop::new(
        Arc::clone(&state),
        Arc::clone(&screen),
        ProcessUsage,
        (layout.stats_row, layout.stats_col),
        interval,
    );
    let clock_task = tokio::spawn(clock.run());
    let stats_task = tokio::spawn(stats.run());
    tracing::info!(interval_ms = config.clock.refresh_interval_ms, "clock started");

    let outcome = match screen.draw(&render_prompt(layout.prompt_row, layout.prompt_col)) {
        Ok(()) => wait_for_return().await,
        Err(e) => Err(ClockError::Screen(e)),
    };

    // Stop and join the loops on every path so nothing draws after restore.
    state.finished.set();
    let mut failures = Vec::new();
    failures.extend(join_worker("clock", clock_task).await);
    failures.extend(join_worker("stats", stats_task).await);
    signal_task.abort();
    drop(terminal);

    tracing::info!(failed_workers = failures.len(), "clock stopped");
    outcome.map(|()| failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_layout() {
        let out = render_prompt(18, 1);
        assert!(
            out.starts_with("\x1b[0m\x1b[18;1H\x1b[2KPress Ctrl-C to change clock color.")
        );
        assert!(out.contains("\x1b[19;1H\x1b[2KPress Ctrl-\\ to change clock time format."));
        assert!(out.ends_with("\x1b[20;1H\x1b[2KPress CR to Exit."));
    }

    #[test]
    fn test_return_ends_wait() {
        assert!(read_until_return(Cursor::new(b"abc\nrest".to_vec())).is_ok());
        assert!(read_until_return(Cursor::new(b"\r".to_vec())).is_ok());
    }

    #[test]
    fn test_eof_without_return_is_error() {
        let err = read_until_return(Cursor::new(b"no newline".to_vec())).unwrap_err();
        assert!(matches!(err, ClockError::InputClosed));
        let err = read_until_return(Cursor::new(Vec::new())).unwrap_err();
        assert!(matches!(err, ClockError::InputClosed));
    }

    #[test]
    fn test_read_error_is_reported() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("device gone"))
            }
        }
        let err = read_until_return(Broken).unwrap_err();
        assert!(err.to_string().contains("device gone"));
    }

    #[tokio::test]
    async fn test_join_worker_reports_failure() {
        let failed = tokio::spawn(async { Err(WorkerError::Time("bad clock".to_string())) });
        let failure = join_worker("clock", failed).await.unwrap();
        assert_eq!(
            failure.to_string(),
            "clock loop stopped early: failed to read current time: bad clock"
        );

        let ok = tokio::spawn(async { Ok(3) });
        assert!(join_worker("stats", ok).await.is_none());
    }

    async fn exploding_worker() -> Result<u64, WorkerError> {
        panic!("stats source blew up")
    }

    #[tokio::test]
    async fn test_join_worker_reports_panic() {
        let failure = join_worker("stats", tokio::spawn(exploding_worker()))
            .await
            .unwrap();
        assert_eq!(failure.worker, "stats");
        assert!(matches!(failure.error, WorkerError::Panicked(_)));
        assert!(failure.to_string().starts_with("stats loop stopped early: worker panicked:"));
    }
}
