//! Request gating: a newer request supersedes every older one.
//!
//! The gate hands out monotonically increasing tickets. A build run under a
//! ticket is dropped (with all of its outstanding fetches) as soon as a newer
//! ticket is issued, and a result that finishes after being superseded is
//! discarded rather than returned.

use std::future::Future;

use tokio::sync::watch;

use crate::error::EngineError;

#[derive(Debug)]
pub struct RequestGate {
    latest: watch::Sender<u64>,
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestGate {
    #[must_use]
    pub fn new() -> Self {
        let (latest, _) = watch::channel(0);
        Self { latest }
    }

    /// Issue a ticket, superseding all earlier ones.
    pub fn issue(&self) -> RequestTicket {
        let mut id = 0;
        self.latest.send_modify(|current| {
            *current += 1;
            id = *current;
        });
        RequestTicket {
            id,
            latest: self.latest.subscribe(),
        }
    }

    /// Id of the most recently issued ticket.
    #[must_use]
    pub fn current(&self) -> u64 {
        *self.latest.borrow()
    }
}

#[derive(Debug)]
pub struct RequestTicket {
    id: u64,
    latest: watch::Receiver<u64>,
}

impl RequestTicket {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Whether no newer ticket has been issued.
    #[must_use]
    pub fn is_current(&self) -> bool {
        *self.latest.borrow() == self.id
    }

    /// Drive `work` unless, or until, this ticket is superseded.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Superseded` if a newer ticket exists before or
    /// after `work` completes; otherwise `work`'s own result.
    pub async fn run<T, F>(self, work: F) -> Result<T, EngineError>
    where
        F: Future<Output = Result<T, EngineError>>,
    {
        if !self.is_current() {
            return Err(EngineError::Superseded);
        }
        let mut watcher = self.latest.clone();
        tokio::select! {
            biased;
            () = superseded(&mut watcher, self.id) => {
                tracing::debug!(ticket = self.id, "request superseded, dropping build");
                Err(EngineError::Superseded)
            }
            result = work => {
                if self.is_current() { result } else { Err(EngineError::Superseded) }
            }
        }
    }
}

/// Resolves once the gate moves past `id`. Never resolves if the gate is gone.
async fn superseded(latest: &mut watch::Receiver<u64>, id: u64) {
    loop {
        if *latest.borrow_and_update() != id {
            return;
        }
        if latest.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
