use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Receiver, Sender},
};

use log::debug;
use thiserror::Error;

/// Errors that can happen while installing the termination handler
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// The SIGINT/SIGTERM handler could not be registered
    #[error("failed to install termination handler: {0}")]
    Install(#[from] ctrlc::Error),
}

/// Wakes a [`ShutdownSignal`] from another thread or a signal handler.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
    notify: Sender<()>,
}

impl ShutdownHandle {
    /// Requests shutdown and wakes the waiting thread.
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        // the receiver is gone once the waiter returned
        let _ = self.notify.send(());
    }
}

/// A termination request observed by a blocking wait.
///
/// The flag is set asynchronously (by the SIGINT/SIGTERM handler installed
/// with [`ShutdownSignal::install`], or by any [`ShutdownHandle`]) and the
/// waiter is woken through a channel, so [`ShutdownSignal::wait`] never polls.
#[derive(Debug)]
pub struct ShutdownSignal {
    handle: ShutdownHandle,
    wakeups: Receiver<()>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Creates a signal that is only triggered through [`ShutdownSignal::handle`].
    pub fn new() -> Self {
        let (notify, wakeups) = mpsc::channel();
        ShutdownSignal {
            handle: ShutdownHandle {
                requested: Arc::new(AtomicBool::new(false)),
                notify,
            },
            wakeups,
        }
    }

    /// Creates a signal triggered by SIGINT and SIGTERM.
    ///
    /// SIGHUP is caught as well, so closing the controlling terminal also
    /// ends the wait and the process exits through the normal cleanup path.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler was already registered for this process.
    pub fn install() -> Result<Self, ShutdownError> {
        let signal = Self::new();
        let handle = signal.handle();
        ctrlc::set_handler(move || handle.trigger())?;
        debug!("Installed SIGINT/SIGTERM handler");
        Ok(signal)
    }

    /// Returns a handle that can trigger this signal.
    pub fn handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }

    /// Checks whether shutdown was requested.
    pub fn requested(&self) -> bool {
        self.handle.requested.load(Ordering::SeqCst)
    }

    /// Blocks until shutdown is requested.
    pub fn wait(&self) {
        while !self.requested() {
            // we hold a sender ourselves, so recv only returns on a wakeup
            if self.wakeups.recv().is_err() {
                break;
            }
        }
    }
}
