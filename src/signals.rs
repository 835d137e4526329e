/// Signal listener: turns SIGINT and SIGQUIT into display commands.
///
/// SIGINT (Ctrl-C): cycle the clock color default -> red -> green.
/// SIGQUIT (Ctrl-\): toggle between 12- and 24-hour format.
///
/// The listener never touches display state itself. It posts a
/// `DisplayCommand` to the clock loop, which applies it on its next tick.
use crate::state::DisplayCommand;
use nix::sys::signal::Signal as NixSignal;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::mpsc::UnboundedSender;

/// Failed to register a handler.
#[derive(Debug)]
pub struct SignalError {
    pub signal: NixSignal,
    pub source: std::io::Error,
}

impl std::fmt::Display for SignalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to register {} handler: {}",
            self.signal.as_str(),
            self.source
        )
    }
}

impl std::error::Error for SignalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Display command triggered by `sig`, if any.
pub fn command_for(sig: NixSignal) -> Option<DisplayCommand> {
    match sig {
        NixSignal::SIGINT => Some(DisplayCommand::CycleColor),
        NixSignal::SIGQUIT => Some(DisplayCommand::ToggleFormat),
        _ => None,
    }
}

pub struct SignalListener {
    interrupt: Signal,
    quit: Signal,
}

impl SignalListener {
    /// Register handlers. Must be called from within the tokio runtime.
    ///
    /// Once registered, SIGINT and SIGQUIT no longer terminate the process.
    pub fn install() -> Result<Self, SignalError> {
        let register = |sig: NixSignal| {
            signal(SignalKind::from_raw(sig as i32)).map_err(|source| SignalError {
                signal: sig,
                source,
            })
        };
        let interrupt = register(NixSignal::SIGINT)?;
        let quit = register(NixSignal::SIGQUIT)?;
        tracing::debug!("SIGINT and SIGQUIT handlers installed");
        Ok(Self { interrupt, quit })
    }

    /// Forward signals as commands until the receiver goes away.
    pub async fn run(mut self, commands: UnboundedSender<DisplayCommand>) {
        loop {
            let sig = tokio::select! {
                Some(()) = self.interrupt.recv() => NixSignal::SIGINT,
                Some(()) = self.quit.recv() => NixSignal::SIGQUIT,
                else => break,
            };
            let Some(command) = command_for(sig) else {
                continue;
            };
            tracing::debug!(signal = sig.as_str(), ?command, "signal received");
            if commands.send(command).is_err() {
                break;
            }
        }
        tracing::debug!("signal listener stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[test]
    fn test_signal_mapping() {
        assert_eq!(
            command_for(NixSignal::SIGINT),
            Some(DisplayCommand::CycleColor)
        );
        assert_eq!(
            command_for(NixSignal::SIGQUIT),
            Some(DisplayCommand::ToggleFormat)
        );
        assert_eq!(command_for(NixSignal::SIGTERM), None);
    }

    #[test]
    fn test_error_names_signal() {
        let err = SignalError {
            signal: NixSignal::SIGQUIT,
            source: std::io::Error::other("boom"),
        };
        assert_eq!(err.to_string(), "failed to register SIGQUIT handler: boom");
    }

    #[tokio::test]
    async fn test_raised_signals_become_commands() {
        let listener = SignalListener::install().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(listener.run(tx));

        nix::sys::signal::raise(NixSignal::SIGQUIT).unwrap();
        let got = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(got, Some(DisplayCommand::ToggleFormat));

        nix::sys::signal::raise(NixSignal::SIGINT).unwrap();
        let got = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(got, Some(DisplayCommand::CycleColor));

        // Dropping the receiver ends the listener on its next signal.
        drop(rx);
        nix::sys::signal::raise(NixSignal::SIGINT).unwrap();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }
}
