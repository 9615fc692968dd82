//! Inbox
//!
//! The only channel from background workers back to the interactive thread.
//! Unbounded and FIFO; any number of workers may hold an [`InboxSender`], the
//! presenter owns the single [`Inbox`] receiver.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Result of one search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Matched paths, in the order locate printed them
    Results(Vec<String>),
    /// Human-readable reason the search did not produce results
    Failure(String),
}

/// Result of one "show in Explorer" request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    Revealed { wsl_path: String, host_path: String },
    Failed { wsl_path: String, message: String },
}

/// Message types for background operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxMessage {
    Search { seq: u64, outcome: SearchOutcome },
    Reveal(RevealOutcome),
}

/// Producer half, cloned into every worker
#[derive(Debug, Clone)]
pub struct InboxSender {
    tx: Sender<InboxMessage>,
}

impl InboxSender {
    /// Post a message. The receiver lives for the whole process, so a failed
    /// send only happens during shutdown and is dropped.
    pub fn post(&self, message: InboxMessage) {
        let _ = self.tx.send(message);
    }
}

/// Consumer half
#[derive(Debug)]
pub struct Inbox {
    tx: Sender<InboxMessage>,
    rx: Receiver<InboxMessage>,
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Inbox {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> InboxSender {
        InboxSender { tx: self.tx.clone() }
    }

    /// Take everything currently queued without waiting
    pub fn drain(&self) -> Vec<InboxMessage> {
        let mut messages = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(message) => messages.push(message),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        messages
    }

    /// Wait up to `timeout` for the next message (used by the command line, never by the GUI)
    pub fn recv_timeout(&self, timeout: Duration) -> Option<InboxMessage> {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
