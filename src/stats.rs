/// The stats loop: reports this process's user and system CPU time on two
/// fixed terminal lines.
use crate::ansi;
use crate::screen::Screen;
use crate::state::SharedState;
use crate::worker::{self, WorkerError};
use nix::sys::resource::{getrusage, UsageWho};
use std::sync::Arc;
use std::time::Duration;

/// CPU time split into whole seconds and microseconds, as `getrusage`
/// reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTime {
    pub secs: i64,
    pub micros: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuUsage {
    pub user: CpuTime,
    pub system: CpuTime,
}

/// Where the stats loop gets resource usage from.
pub trait UsageSource: Send {
    fn cpu_usage(&self) -> Result<CpuUsage, WorkerError>;
}

/// `getrusage(RUSAGE_SELF)`.
pub struct ProcessUsage;

impl UsageSource for ProcessUsage {
    fn cpu_usage(&self) -> Result<CpuUsage, WorkerError> {
        let usage = getrusage(UsageWho::RUSAGE_SELF).map_err(WorkerError::Usage)?;
        let user = usage.user_time();
        let system = usage.system_time();
        Ok(CpuUsage {
            user: CpuTime {
                secs: user.tv_sec().into(),
                micros: user.tv_usec().into(),
            },
            system: CpuTime {
                secs: system.tv_sec().into(),
                micros: system.tv_usec().into(),
            },
        })
    }
}

/// Escape sequences that clear and rewrite the two stats lines at
/// (`row`, `col`). Always drawn in the default color.
pub fn render_stats(row: u16, col: u16, usage: &CpuUsage) -> String {
    let mut out = String::with_capacity(160);
    out.push_str(ansi::RESET_COLOR);
    ansi::move_cursor(&mut out, row, col);
    out.push_str(ansi::CLEAR_LINE);
    out.push_str(&format!(
        "User CPU time    : {} sec., {} microsec.",
        usage.user.secs, usage.user.micros
    ));
    ansi::move_cursor(&mut out, row.saturating_add(1), col);
    out.push_str(ansi::CLEAR_LINE);
    out.push_str(&format!(
        "System CPU time  : {} sec., {} microsec.",
        usage.system.secs, usage.system.micros
    ));
    out
}

pub struct StatsLoop<U: UsageSource> {
    state: Arc<SharedState>,
    screen: Arc<Screen>,
    usage: U,
    row: u16,
    col: u16,
    interval: Duration,
}

impl<U: UsageSource> StatsLoop<U> {
    pub fn new(
        state: Arc<SharedState>,
        screen: Arc<Screen>,
        usage: U,
        (row, col): (u16, u16),
        interval: Duration,
    ) -> Self {
        Self {
            state,
            screen,
            usage,
            row,
            col,
            interval,
        }
    }

    pub fn tick(&mut self) -> Result<(), WorkerError> {
        let usage = self.usage.cpu_usage()?;
        self.screen.draw(&render_stats(self.row, self.col, &usage))?;
        Ok(())
    }

    pub async fn run(mut self) -> Result<u64, WorkerError> {
        let state = Arc::clone(&self.state);
        let interval = self.interval;
        worker::poll_until_finished("stats", &state, interval, || self.tick()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::CaptureBuffer;
    use crate::state::ClockColor;

    struct FixedUsage(Option<CpuUsage>);

    impl UsageSource for FixedUsage {
        fn cpu_usage(&self) -> Result<CpuUsage, WorkerError> {
            self.0.ok_or(WorkerError::Usage(nix::errno::Errno::EINVAL))
        }
    }

    fn sample() -> CpuUsage {
        CpuUsage {
            user: CpuTime {
                secs: 3,
                micros: 141_592,
            },
            system: CpuTime {
                secs: 0,
                micros: 2_718,
            },
        }
    }

    #[test]
    fn test_render_stats_lines() {
        let out = render_stats(12, 1, &sample());
        assert_eq!(
            out,
            "\x1b[0m\x1b[12;1H\x1b[2KUser CPU time    : 3 sec., 141592 microsec.\
             \x1b[13;1H\x1b[2KSystem CPU time  : 0 sec., 2718 microsec."
        );
    }

    #[test]
    fn test_process_usage_is_sane() {
        let usage = ProcessUsage.cpu_usage().unwrap();
        assert!(usage.user.secs >= 0);
        assert!((0..1_000_000).contains(&usage.user.micros));
        assert!((0..1_000_000).contains(&usage.system.micros));
    }

    #[test]
    fn test_tick_draws_current_usage() {
        let buf = CaptureBuffer::default();
        let screen = Arc::new(Screen::new(Box::new(buf.clone())));
        let state = Arc::new(SharedState::new(ClockColor::Default, true));
        let mut stats = StatsLoop::new(
            state,
            screen,
            FixedUsage(Some(sample())),
            (12, 1),
            Duration::from_millis(1),
        );
        stats.tick().unwrap();
        assert_eq!(buf.contents(), render_stats(12, 1, &sample()));
    }

    #[tokio::test]
    async fn test_usage_failure_ends_loop_without_drawing() {
        let buf = CaptureBuffer::default();
        let screen = Arc::new(Screen::new(Box::new(buf.clone())));
        let state = Arc::new(SharedState::new(ClockColor::Default, true));
        let stats = StatsLoop::new(
            Arc::clone(&state),
            screen,
            FixedUsage(None),
            (12, 1),
            Duration::from_millis(1),
        );

        let err = stats.run().await.unwrap_err();
        assert!(matches!(err, WorkerError::Usage(_)));
        assert!(buf.contents().is_empty());
        assert!(!state.finished.is_set());
    }
}
