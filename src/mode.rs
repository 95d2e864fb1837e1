//! Edit-mode gate.
//!
//! A single reactive boolean seeded from the host's navigation mode. Every
//! gesture checks it before starting; nothing interactive happens while it
//! is closed.

#[cfg(test)]
#[path = "mode_test.rs"]
mod mode_test;

use tokio::sync::watch;

/// Whether the host's navigation mode string means edit mode. Only the
/// exact string `"edit"` counts.
#[must_use]
pub fn is_edit_mode(mode: &str) -> bool {
    mode == "edit"
}

#[derive(Debug)]
pub struct EditModeGate {
    tx: watch::Sender<bool>,
}

impl EditModeGate {
    #[must_use]
    pub fn new(open: bool) -> Self {
        let (tx, _) = watch::channel(open);
        Self { tx }
    }

    /// Seed from the host's navigation mode string.
    #[must_use]
    pub fn from_mode(mode: &str) -> Self {
        Self::new(is_edit_mode(mode))
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    /// Update the gate. Returns true if the value changed.
    pub fn set(&self, open: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == open {
                return false;
            }
            *current = open;
            true
        })
    }

    /// Observe gate changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
