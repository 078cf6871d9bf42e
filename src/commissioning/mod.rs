// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device commissioning.
//!
//! [`CommissioningEngine`] takes an onboarding payload through transport
//! selection, pairing and post-pairing introspection. Exactly one session
//! runs at a time; starting another finishes the current one first.
//!
//! # Session lifecycle
//!
//! ```text
//! Idle -> PayloadParsed -> TransportSelection
//!      -> AwaitingWiFiCredentials | Pairing -> Introspecting
//!      -> Succeeded | Failed
//! ```
//!
//! Progress is reported through the [`CommissioningEvents`] returned when
//! the session starts and through [`CommissioningEngine::watch_state`].
//!
//! # Examples
//!
//! ```ignore
//! let mut session = engine.start_commissioning("MT:Y.K9042C00KA0648G00")?;
//!
//! while let Some(event) = session.recv().await {
//!     match event {
//!         CommissioningEvent::WiFiCredentialsRequired { device_id } => {
//!             engine.continue_commissioning(device_id, WiFiCredentials::new("home", "secret"))?;
//!         }
//!         CommissioningEvent::Succeeded(identity) => break,
//!         CommissioningEvent::Failed(error) => return Err(error.into()),
//!         _ => {}
//!     }
//! }
//! ```

mod engine;

pub use engine::CommissioningEngine;

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::{CommissioningError, CommissioningErrorCode};
use crate::types::{DeviceIdentity, NodeId};

/// Commissioning session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommissioningState {
    /// No session has run yet, or the last one was replaced.
    Idle,
    /// The onboarding payload was accepted.
    PayloadParsed,
    /// Looking for the device on the available transports.
    TransportSelection,
    /// Waiting for the caller to supply Wi-Fi credentials.
    AwaitingWiFiCredentials,
    /// Native pairing is in progress.
    Pairing,
    /// Reading device type and identity after pairing.
    Introspecting,
    /// The device was commissioned.
    Succeeded,
    /// The session ended in failure.
    Failed,
}

impl CommissioningState {
    /// Whether the session has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Identifier of one commissioning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Progress of a commissioning session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommissioningEvent {
    /// The session moved to a new state.
    StateChanged(CommissioningState),
    /// The caller must call
    /// [`continue_commissioning`](CommissioningEngine::continue_commissioning).
    WiFiCredentialsRequired {
        /// Device id of the session.
        device_id: NodeId,
    },
    /// Device attestation failed and the session is paused until
    /// [`continue_after_attestation`](CommissioningEngine::continue_after_attestation)
    /// is called.
    AttestationFailure {
        /// Native device pointer to pass back.
        device_ptr: u64,
        /// Native attestation error.
        error_code: i64,
    },
    /// The device was commissioned.
    Succeeded(DeviceIdentity),
    /// The session failed.
    Failed(CommissioningError),
}

/// Event stream of one commissioning session.
///
/// The stream ends after [`CommissioningEvent::Succeeded`] or
/// [`CommissioningEvent::Failed`], or when the session is replaced.
#[derive(Debug)]
pub struct CommissioningEvents {
    session_id: SessionId,
    device_id: NodeId,
    events: mpsc::UnboundedReceiver<CommissioningEvent>,
}

impl CommissioningEvents {
    pub(crate) fn new(
        session_id: SessionId,
        device_id: NodeId,
        events: mpsc::UnboundedReceiver<CommissioningEvent>,
    ) -> Self {
        Self {
            session_id,
            device_id,
            events,
        }
    }

    /// Session this stream belongs to.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Device id assigned to the device being commissioned.
    #[must_use]
    pub fn device_id(&self) -> NodeId {
        self.device_id
    }

    /// Waits for the next event.
    pub async fn recv(&mut self) -> Option<CommissioningEvent> {
        self.events.recv().await
    }

    /// Waits for the session's terminal result, skipping other events.
    ///
    /// # Errors
    ///
    /// Returns the session failure, or `Unknown` if the session was
    /// replaced before it finished.
    pub async fn outcome(mut self) -> Result<DeviceIdentity, CommissioningError> {
        while let Some(event) = self.events.recv().await {
            match event {
                CommissioningEvent::Succeeded(identity) => return Ok(identity),
                CommissioningEvent::Failed(error) => return Err(error),
                _ => {}
            }
        }
        Err(CommissioningError::new(
            CommissioningErrorCode::Unknown,
            "Commissioning session ended without a result",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(CommissioningState::Succeeded.is_terminal());
        assert!(CommissioningState::Failed.is_terminal());
        assert!(!CommissioningState::Pairing.is_terminal());
        assert!(!CommissioningState::Idle.is_terminal());
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[tokio::test]
    async fn outcome_without_result_is_unknown() {
        let (tx, rx) = mpsc::unbounded_channel();
        let events = CommissioningEvents::new(SessionId::new(), NodeId::generate(), rx);
        tx.send(CommissioningEvent::StateChanged(CommissioningState::Pairing))
            .unwrap();
        drop(tx);

        let err = events.outcome().await.unwrap_err();
        assert_eq!(err.code, CommissioningErrorCode::Unknown);
    }
}
