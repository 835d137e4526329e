/// The clock loop: turns epoch time into a local hour and minute, applies
/// display commands from the signal listener and redraws the large face.
use crate::display;
use crate::screen::Screen;
use crate::state::{DisplayCommand, SharedState, TimeFormat};
use crate::worker::{self, WorkerError};
use chrono::TimeZone;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc::UnboundedReceiver;

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_MIN: i64 = 60;
const HOURS_PER_DAY: i64 = 24;

/// Epoch seconds paired with the local UTC offset in effect at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalInstant {
    pub epoch_secs: i64,
    /// Seconds east of UTC, daylight saving included.
    pub utc_offset_secs: i64,
}

/// Where the clock loop gets the time from.
pub trait TimeSource: Send {
    fn now(&self) -> Result<LocalInstant, WorkerError>;
}

/// The system clock and the host's local timezone.
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Result<LocalInstant, WorkerError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| WorkerError::Time(e.to_string()))?;
        let epoch_secs = i64::try_from(since_epoch.as_secs())
            .map_err(|e| WorkerError::Time(e.to_string()))?;
        let local = chrono::Local
            .timestamp_opt(epoch_secs, 0)
            .single()
            .ok_or_else(|| WorkerError::Time(format!("no local time for epoch {epoch_secs}")))?;
        Ok(LocalInstant {
            epoch_secs,
            utc_offset_secs: i64::from(local.offset().local_minus_utc()),
        })
    }
}

/// Local hour (0..=23) and minute (0..=59).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    pub hours: u32,
    pub mins: u32,
}

/// Compute local wall time, wrapping the hour explicitly into 0..=23 for
/// every input including negative offsets and corrections.
pub fn wall_time(instant: LocalInstant, dst_offset_hours: i64) -> WallTime {
    let adjusted = instant.epoch_secs.saturating_add(instant.utc_offset_secs);
    let hours = adjusted.rem_euclid(SECS_PER_DAY) / SECS_PER_HOUR + dst_offset_hours;
    let mins = adjusted.rem_euclid(SECS_PER_HOUR) / SECS_PER_MIN;
    WallTime {
        // Both values are bounded by the rem_euclid above.
        hours: hours.rem_euclid(HOURS_PER_DAY) as u32,
        mins: mins as u32,
    }
}

/// Hour to draw for `hours` (0..=23) in `format`.
///
/// 12-hour mode maps 0 to 12 and 13..=23 to 1..=11. Anything outside
/// 0..=23 passes through so the renderer can blank it.
pub fn display_hour(hours: u32, format: TimeFormat) -> u32 {
    match format {
        TimeFormat::TwentyFourHour => hours,
        TimeFormat::TwelveHour => match hours {
            0 => 12,
            13..=23 => hours - 12,
            _ => hours,
        },
    }
}

/// Placement and timing for the clock loop.
#[derive(Debug, Clone, Copy)]
pub struct ClockSettings {
    pub row: u16,
    pub col: u16,
    pub dst_offset_hours: i64,
    pub interval: Duration,
}

pub struct ClockLoop<T: TimeSource> {
    state: Arc<SharedState>,
    screen: Arc<Screen>,
    commands: UnboundedReceiver<DisplayCommand>,
    time: T,
    settings: ClockSettings,
}

impl<T: TimeSource> ClockLoop<T> {
    pub fn new(
        state: Arc<SharedState>,
        screen: Arc<Screen>,
        commands: UnboundedReceiver<DisplayCommand>,
        time: T,
        settings: ClockSettings,
    ) -> Self {
        Self {
            state,
            screen,
            commands,
            time,
            settings,
        }
    }

    /// One iteration: apply pending commands, read the time, redraw.
    pub fn tick(&mut self) -> Result<(), WorkerError> {
        while let Ok(command) = self.commands.try_recv() {
            self.state.display.apply(command);
        }

        let now = wall_time(self.time.now()?, self.settings.dst_offset_hours);
        let format = self.state.display.format();
        let face = display::clock_face(display_hour(now.hours, format), now.mins, format);
        tracing::trace!(face = %display::face_text(&face), "redrawing clock");
        let frame = display::render_clock(
            self.settings.row,
            self.settings.col,
            &face,
            self.state.display.color(),
        );
        self.screen.draw(&frame)?;
        Ok(())
    }

    pub async fn run(mut self) -> Result<u64, WorkerError> {
        let state = Arc::clone(&self.state);
        let interval = self.settings.interval;
        worker::poll_until_finished("clock", &state, interval, || self.tick()).await
    }
}
