/// Process-wide display state shared between the coordinator, the signal
/// listener and both worker loops.
///
/// The coordinator owns a single `SharedState` and hands each worker an
/// `Arc` clone at spawn time. All fields are atomics: the flags are
/// single-writer and readers tolerate seeing an update one iteration late.
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// Clock foreground color, cycled by SIGINT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockColor {
    #[default]
    Default,
    Red,
    Green,
}

impl ClockColor {
    /// Next color in the cycle default -> red -> green -> default.
    pub fn next(self) -> Self {
        Self::from_index((self.index() + 1) % 3)
    }

    fn index(self) -> u8 {
        match self {
            ClockColor::Default => 0,
            ClockColor::Red => 1,
            ClockColor::Green => 2,
        }
    }

    fn from_index(index: u8) -> Self {
        match index % 3 {
            1 => ClockColor::Red,
            2 => ClockColor::Green,
            _ => ClockColor::Default,
        }
    }
}

impl std::fmt::Display for ClockColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockColor::Default => write!(f, "default"),
            ClockColor::Red => write!(f, "red"),
            ClockColor::Green => write!(f, "green"),
        }
    }
}

impl std::str::FromStr for ClockColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(ClockColor::Default),
            "red" => Ok(ClockColor::Red),
            "green" => Ok(ClockColor::Green),
            other => Err(format!(
                "unknown color '{other}' (expected default, red or green)"
            )),
        }
    }
}

/// Hour format used when rendering the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    TwentyFourHour,
    TwelveHour,
}

/// Update posted by the signal listener and applied by the clock loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCommand {
    CycleColor,
    ToggleFormat,
}

/// Color index and 12/24-hour flag.
#[derive(Debug)]
pub struct DisplayState {
    color: AtomicU8,
    use_24h: AtomicBool,
}

impl DisplayState {
    pub fn new(color: ClockColor, use_24h: bool) -> Self {
        Self {
            color: AtomicU8::new(color.index()),
            use_24h: AtomicBool::new(use_24h),
        }
    }

    pub fn color(&self) -> ClockColor {
        ClockColor::from_index(self.color.load(Ordering::Relaxed))
    }

    pub fn format(&self) -> TimeFormat {
        if self.use_24h.load(Ordering::Relaxed) {
            TimeFormat::TwentyFourHour
        } else {
            TimeFormat::TwelveHour
        }
    }

    pub fn apply(&self, command: DisplayCommand) {
        match command {
            DisplayCommand::CycleColor => {
                // Only the clock loop writes, so load-then-store cannot race.
                let next = self.color().next();
                self.color.store(next.index(), Ordering::Relaxed);
                tracing::debug!(color = %next, "clock color changed");
            }
            DisplayCommand::ToggleFormat => {
                let was_24h = self.use_24h.fetch_xor(true, Ordering::Relaxed);
                tracing::debug!(use_24h = !was_24h, "clock format toggled");
            }
        }
    }
}

/// Cooperative stop signal polled by the worker loops.
///
/// Setting the flag also wakes any loop parked in `sleep`, so shutdown
/// never waits out a full refresh interval.
#[derive(Debug, Default)]
pub struct TerminationFlag {
    finished: AtomicBool,
    wake: Notify,
}

impl TerminationFlag {
    pub fn set(&self) {
        self.finished.store(true, Ordering::Release);
        self.wake.notify_waiters();
    }

    pub fn is_set(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Sleep for `duration`, returning early once the flag is set.
    pub async fn sleep(&self, duration: Duration) {
        let woken = self.wake.notified();
        tokio::pin!(woken);
        // Register before checking the flag so a concurrent `set` is not missed.
        woken.as_mut().enable();
        if self.is_set() {
            return;
        }
        tokio::select! {
            () = tokio::time::sleep(duration) => {}
            () = woken => {}
        }
    }
}

/// Everything the workers share, injected as one `Arc` handle.
#[derive(Debug)]
pub struct SharedState {
    pub display: DisplayState,
    pub finished: TerminationFlag,
}

impl SharedState {
    pub fn new(color: ClockColor, use_24h: bool) -> Self {
        Self {
            display: DisplayState::new(color, use_24h),
            finished: TerminationFlag::default(),
        }
    }
}
