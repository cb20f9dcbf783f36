use std::io;

/// What the process was asked to do from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// SIGHUP: re-read the settings file.
    Reload,
    /// Ctrl-C or SIGTERM.
    Shutdown,
}

/// Process signals mapped to [`Control`] requests.
#[derive(Debug)]
pub struct ControlSignals {
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ControlSignals {
    /// Must be called from within a tokio runtime.
    pub fn install() -> io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                hangup: signal(SignalKind::hangup())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    pub async fn next(&mut self) -> Control {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.hangup.recv() => Control::Reload,
                _ = self.terminate.recv() => Control::Shutdown,
                _ = tokio::signal::ctrl_c() => Control::Shutdown,
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            Control::Shutdown
        }
    }
}
