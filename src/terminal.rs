/// Terminal mode for the lifetime of the clock: echo off, cursor hidden,
/// screen cleared. Restored when the guard drops, on every exit path.
use crate::ansi;
use crate::screen::Screen;
use nix::sys::termios::{tcgetattr, tcsetattr, LocalFlags, SetArg, Termios};
use std::os::fd::AsFd;
use std::sync::Arc;

#[derive(Debug)]
pub enum TerminalError {
    /// Reading or changing terminal attributes failed.
    Attributes {
        action: &'static str,
        source: nix::Error,
    },
    /// Writing the setup sequences failed.
    Write(std::io::Error),
}

impl std::fmt::Display for TerminalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalError::Attributes { action, source } => {
                write!(f, "failed to {action}: {source}")
            }
            TerminalError::Write(e) => write!(f, "failed to prepare terminal: {e}"),
        }
    }
}

impl std::error::Error for TerminalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TerminalError::Attributes { source, .. } => Some(source),
            TerminalError::Write(e) => Some(e),
        }
    }
}

/// Sequences written when the clock takes over the screen.
pub fn setup_sequence() -> String {
    format!("{}{}", ansi::HIDE_CURSOR, ansi::CLEAR_SCREEN)
}

/// Sequences that hand the screen back: default color, visible cursor,
/// cleared screen, cursor at the top-left.
pub fn restore_sequence() -> String {
    let mut out = String::new();
    out.push_str(ansi::RESET_COLOR);
    out.push_str(ansi::SHOW_CURSOR);
    out.push_str(ansi::CLEAR_SCREEN);
    ansi::move_cursor(&mut out, 1, 1);
    out
}

fn without_echo(original: &Termios) -> Termios {
    let mut quiet = original.clone();
    quiet.local_flags.remove(LocalFlags::ECHO);
    quiet
}

pub struct TerminalGuard {
    saved: Termios,
    screen: Arc<Screen>,
}

impl TerminalGuard {
    /// Disable echo on stdin and clear the screen.
    pub fn enter(screen: Arc<Screen>) -> Result<Self, TerminalError> {
        let stdin = std::io::stdin();
        let saved = tcgetattr(stdin.as_fd()).map_err(|source| TerminalError::Attributes {
            action: "read terminal attributes",
            source,
        })?;
        tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &without_echo(&saved)).map_err(|source| {
            TerminalError::Attributes {
                action: "disable echo",
                source,
            }
        })?;

        // Constructed before drawing so a failed write still restores echo.
        let guard = Self { saved, screen };
        guard
            .screen
            .draw(&setup_sequence())
            .map_err(TerminalError::Write)?;
        tracing::debug!("terminal echo disabled, cursor hidden");
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = self.screen.draw(&restore_sequence()) {
            tracing::warn!(error = %e, "failed to restore screen");
        }
        if let Err(e) = tcsetattr(std::io::stdin().as_fd(), SetArg::TCSANOW, &self.saved) {
            tracing::warn!(error = %e, "failed to re-enable terminal echo");
        }
        tracing::debug!("terminal restored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_hides_cursor_and_clears() {
        assert_eq!(setup_sequence(), "\x1b[?25l\x1b[2J");
    }

    #[test]
    fn test_restore_resets_everything() {
        assert_eq!(restore_sequence(), "\x1b[0m\x1b[?25h\x1b[2J\x1b[1;1H");
    }

    #[test]
    fn test_error_display() {
        let err = TerminalError::Attributes {
            action: "disable echo",
            source: nix::errno::Errno::ENOTTY,
        };
        assert!(err.to_string().starts_with("failed to disable echo:"));
    }
}
