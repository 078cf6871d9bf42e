// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operational node identifier type.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Operational node id of a commissioned device.
///
/// Node ids assigned by this library are drawn from the OS-seeded thread
/// RNG and are always in `1..=i64::MAX`, so they stay positive for
/// callers that store them as signed integers.
///
/// # Examples
///
/// ```
/// use matter_link::types::NodeId;
///
/// let id = NodeId::generate();
/// assert!(id.value() > 0);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Largest node id handed out by [`NodeId::generate`].
    pub const MAX_GENERATED: u64 = 0x7FFF_FFFF_FFFF_FFFF;

    /// Generates a new random node id.
    #[must_use]
    pub fn generate() -> Self {
        Self(rand::thread_rng().gen_range(1..=Self::MAX_GENERATED))
    }

    /// Wraps a raw node id.
    ///
    /// Returns `None` for zero, which Matter reserves as "unspecified".
    #[must_use]
    pub const fn new(value: u64) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({:#018x})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
