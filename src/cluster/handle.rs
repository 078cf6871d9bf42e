// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scoped connected device handles.

use std::sync::Arc;

use crate::controller::{DeviceController, DeviceHandle};
use crate::types::NodeId;

/// A connected device handle released when dropped.
///
/// Each cluster operation resolves its own handle. A live subscription
/// keeps the handle it was made through until it is replaced or stopped.
#[derive(Debug)]
pub struct ConnectedDevice<C: DeviceController> {
    controller: Arc<C>,
    node_id: NodeId,
    handle: DeviceHandle,
}

impl<C: DeviceController> ConnectedDevice<C> {
    pub(crate) fn new(controller: Arc<C>, node_id: NodeId, handle: DeviceHandle) -> Self {
        Self {
            controller,
            node_id,
            handle,
        }
    }

    /// Node this handle refers to.
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// The native handle.
    #[must_use]
    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }
}

impl<C: DeviceController> Drop for ConnectedDevice<C> {
    fn drop(&mut self) {
        tracing::trace!(node_id = %self.node_id, handle = ?self.handle, "Releasing device handle");
        self.controller.release_device(self.handle);
    }
}
