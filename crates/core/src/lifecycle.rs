// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Enable/disable state machine of a background message ingester.
//!
//! ```text
//! Disabled --enable--> Enabling --started--> Enabled
//!    ^                    |                     |
//!    |                 disable               disable
//!    |                    v                     v
//!    +------stopped--- Disabling <---enable-----+ (enable flips back to Enabled)
//! ```
//!
//! The owner keeps one [`IngestLifecycle`] under the same lock as the
//! message buffer. Only a transition out of `Disabled` starts a new
//! ingester; every other call just moves the state.

use std::fmt;

/// Observable ingester state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestState {
    #[default]
    Disabled,
    Enabling,
    Enabled,
    Disabling,
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestState::Disabled => "disabled",
            IngestState::Enabling => "enabling",
            IngestState::Enabled => "enabled",
            IngestState::Disabling => "disabling",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngestLifecycle {
    state: IngestState,
}

impl IngestLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> IngestState {
        self.state
    }

    /// `Enabling` or `Enabled`.
    pub fn is_enabled(&self) -> bool {
        matches!(self.state, IngestState::Enabling | IngestState::Enabled)
    }

    /// An ingester exists (possibly winding down).
    pub fn is_running(&self) -> bool {
        self.state != IngestState::Disabled
    }

    /// Requests ingestion. Returns true if the caller must start a new ingester.
    pub fn request_enable(&mut self) -> bool {
        match self.state {
            IngestState::Disabled => {
                self.state = IngestState::Enabling;
                true
            }
            IngestState::Disabling => {
                self.state = IngestState::Enabled;
                false
            }
            IngestState::Enabling | IngestState::Enabled => false,
        }
    }

    /// Requests the ingester to stop. Returns false if it was not enabled.
    pub fn request_disable(&mut self) -> bool {
        match self.state {
            IngestState::Enabling | IngestState::Enabled => {
                self.state = IngestState::Disabling;
                true
            }
            IngestState::Disabled | IngestState::Disabling => false,
        }
    }

    /// Called by a new ingester once it has subscribed.
    pub fn ingester_started(&mut self) {
        if self.state == IngestState::Enabling {
            self.state = IngestState::Enabled;
        }
    }

    /// Checked by the ingester before each receive.
    pub fn should_continue(&self) -> bool {
        self.is_enabled()
    }

    /// Called by the ingester after it unsubscribed.
    ///
    /// Returns true if it may exit. Returns false if ingestion was
    /// re-enabled while it was winding down, in which case it resubscribes
    /// and keeps the buffer.
    pub fn try_stop(&mut self) -> bool {
        match self.state {
            IngestState::Enabling | IngestState::Enabled => false,
            IngestState::Disabling | IngestState::Disabled => {
                self.state = IngestState::Disabled;
                true
            }
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
