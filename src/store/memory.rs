// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory [`Store`] over a watch channel.

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::Store;
use crate::error::Result;

/// Keeps the value in memory. Nothing survives the process.
#[derive(Debug)]
pub struct MemoryStore<T> {
    sender: watch::Sender<T>,
}

impl<T> MemoryStore<T> {
    /// Creates a store holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }
}

impl<T: Default> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Store<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self) -> Result<T> {
        Ok(self.sender.borrow().clone())
    }

    async fn set(&self, value: T) -> Result<()> {
        self.sender.send_replace(value);
        Ok(())
    }

    async fn update<F>(&self, modify: F) -> Result<()>
    where
        F: FnOnce(&mut T) + Send,
    {
        self.sender.send_modify(modify);
        Ok(())
    }

    fn changes(&self) -> WatchStream<T> {
        WatchStream::new(self.sender.subscribe())
    }
}
