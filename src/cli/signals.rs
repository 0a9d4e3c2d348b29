//! Signal handling for the recording session
//!
//! The terminal runs in raw mode during recording, so Ctrl-C from the
//! keyboard arrives as a key event. This handler covers SIGINT delivered
//! from outside the terminal (e.g. `kill -INT`); both paths stop the
//! session and save whatever was captured.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};

/// Shutdown signal for the recording session
pub struct ShutdownSignal {
    shutdown: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create a handler that sets the caller's flag on SIGINT
    pub fn with_flag(flag: Arc<AtomicBool>) -> Self {
        Self { shutdown: flag }
    }

    /// Setup signal handler
    pub async fn setup(&self) -> Result<(), std::io::Error> {
        let shutdown = Arc::clone(&self.shutdown);

        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            sigint.recv().await;
            shutdown.store(true, Ordering::SeqCst);
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn setup_registers_without_tripping_the_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let signal = ShutdownSignal::with_flag(Arc::clone(&flag));
        signal.setup().await.unwrap();
        assert!(!flag.load(Ordering::SeqCst));
    }
}
