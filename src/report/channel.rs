//! Failure channels shared between a phase's producers and the classifier.
//!
//! A channel is created with a number of *slots*: one per item the phase
//! attempts (a hook command or a configured path). The slot count is the
//! denominator of the phase's failure rate. The channel itself is unbounded,
//! since a top-level hook split into several `&` sub-commands may emit more
//! than one error and nothing drains the channel until the phase is over.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::models::BackupError;

/// Create a failure channel with `slots` attempted items.
pub fn error_channel(slots: usize) -> (ErrorSender, ErrorStream) {
    let (tx, rx) = mpsc::channel();
    (ErrorSender { tx }, ErrorStream { slots, rx })
}

/// Producer half. Cloned into every concurrent task of a phase.
#[derive(Debug, Clone)]
pub struct ErrorSender {
    tx: Sender<BackupError>,
}

impl ErrorSender {
    /// Record a failure. Never blocks.
    pub fn send(&self, error: BackupError) {
        tracing::debug!("Recorded failure: {error}");
        if let Err(e) = self.tx.send(error) {
            tracing::warn!("Failure dropped, stream already drained: {}", e.0);
        }
    }
}

/// Consumer half, handed to the classifier once the phase is over.
#[derive(Debug)]
pub struct ErrorStream {
    slots: usize,
    rx: Receiver<BackupError>,
}

impl ErrorStream {
    /// A stream for a phase that attempted `slots` items and recorded nothing.
    pub fn closed(slots: usize) -> Self {
        let (_, stream) = error_channel(slots);
        stream
    }

    /// Collect every failure, blocking until all senders have been dropped.
    pub fn drain(self) -> PhaseErrors {
        PhaseErrors {
            slots: self.slots,
            errors: self.rx.iter().collect(),
        }
    }
}

/// The failures of one phase after its stream was closed and drained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseErrors {
    pub slots: usize,
    pub errors: Vec<BackupError>,
}

impl PhaseErrors {
    pub fn count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
