// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deferred message buses.
//!
//! Structural changes (device resets, shutdown requests, window geometry)
//! are queued here and applied from inside an update tick, never from
//! arbitrary call stacks, and never during a draw. The engine owns two
//! buses: a system-level one carrying [`SystemEvent`] and an
//! application-level one carrying the host's own message type.

use flume::{Receiver, Sender, TryIter};

/// System-level messages drained once per update tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemEvent {
    /// The application window was resized.
    WindowResized { width: u32, height: u32 },

    /// The render backend should rebuild its device-level state.
    BackendResetRequested,

    /// A signal to initiate engine shutdown.
    ShutdownRequested,
}

/// FIFO message queue over an unbounded channel.
///
/// Senders are cheap to clone and may be handed to any collaborator; the
/// receiving side is drained exclusively by the loop controller.
#[derive(Debug)]
pub struct MessageBus<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T> MessageBus<T> {
    /// Creates a new bus with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Attempts to send a message, logging an error if the receiver is
    /// disconnected.
    pub fn publish(&self, message: T) {
        if self.sender.send(message).is_err() {
            log::error!("failed to publish message: receiver disconnected");
        }
    }

    /// Returns a clone of the sender end of the channel.
    pub fn sender(&self) -> Sender<T> {
        self.sender.clone()
    }

    /// Whether any messages are waiting to be drained.
    pub fn has_pending(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Drains every message currently queued, in FIFO order, without
    /// blocking.
    pub fn drain(&self) -> TryIter<'_, T> {
        self.receiver.try_iter()
    }
}

impl<T> Default for MessageBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
