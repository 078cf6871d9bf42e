// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw attribute data and interaction model paths.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ValueError;

/// Endpoint number on a node.
pub type EndpointId = u16;
/// Cluster id.
pub type ClusterId = u32;
/// Attribute id within a cluster.
pub type AttributeId = u32;
/// Command id within a cluster.
pub type CommandId = u32;

/// Concrete path to one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributePath {
    /// Endpoint.
    pub endpoint: EndpointId,
    /// Cluster.
    pub cluster: ClusterId,
    /// Attribute.
    pub attribute: AttributeId,
}

impl AttributePath {
    /// Creates a new attribute path.
    #[must_use]
    pub const fn new(endpoint: EndpointId, cluster: ClusterId, attribute: AttributeId) -> Self {
        Self {
            endpoint,
            cluster,
            attribute,
        }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{:#06x}/{:#06x}",
            self.endpoint, self.cluster, self.attribute
        )
    }
}

/// Attribute path where any component may be a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributePathPattern {
    /// Endpoint, or every endpoint.
    pub endpoint: Option<EndpointId>,
    /// Cluster, or every cluster.
    pub cluster: Option<ClusterId>,
    /// Attribute, or every attribute.
    pub attribute: Option<AttributeId>,
}

impl AttributePathPattern {
    /// Every attribute of every cluster on one endpoint.
    #[must_use]
    pub const fn endpoint(endpoint: EndpointId) -> Self {
        Self {
            endpoint: Some(endpoint),
            cluster: None,
            attribute: None,
        }
    }

    /// Exactly one attribute.
    #[must_use]
    pub const fn exact(path: AttributePath) -> Self {
        Self {
            endpoint: Some(path.endpoint),
            cluster: Some(path.cluster),
            attribute: Some(path.attribute),
        }
    }

    /// Whether a concrete path matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &AttributePath) -> bool {
        self.endpoint.is_none_or(|e| e == path.endpoint)
            && self.cluster.is_none_or(|c| c == path.cluster)
            && self.attribute.is_none_or(|a| a == path.attribute)
    }
}

/// Path to a cluster command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandPath {
    /// Endpoint.
    pub endpoint: EndpointId,
    /// Cluster.
    pub cluster: ClusterId,
    /// Command.
    pub command: CommandId,
}

impl CommandPath {
    /// Creates a new command path.
    #[must_use]
    pub const fn new(endpoint: EndpointId, cluster: ClusterId, command: CommandId) -> Self {
        Self {
            endpoint,
            cluster,
            command,
        }
    }
}

/// Attribute or command field data as exchanged with the native layer.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    /// Null value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Unsigned integer of any width.
    UInt(u64),
    /// Signed integer of any width.
    Int(i64),
    /// UTF-8 string.
    Utf8(String),
    /// Octet string.
    Bytes(Vec<u8>),
    /// List (array) of values.
    List(Vec<AttributeData>),
    /// Structure keyed by context tag.
    Struct(BTreeMap<u8, AttributeData>),
}

impl AttributeData {
    /// Returns the boolean value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnexpectedData` for any other variant.
    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match self {
            Self::Bool(v) => Ok(*v),
            _ => Err(ValueError::UnexpectedData("bool")),
        }
    }

    /// Returns a non-negative integer value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnexpectedData` for non-integers and negative
    /// values.
    pub fn as_u64(&self) -> Result<u64, ValueError> {
        match self {
            Self::UInt(v) => Ok(*v),
            Self::Int(v) => u64::try_from(*v).map_err(|_| ValueError::UnexpectedData("unsigned")),
            _ => Err(ValueError::UnexpectedData("unsigned")),
        }
    }

    /// Returns an integer value narrowed to `T`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnexpectedData` if the value is not an
    /// integer or does not fit.
    pub fn as_uint<T: TryFrom<u64>>(&self) -> Result<T, ValueError> {
        T::try_from(self.as_u64()?).map_err(|_| ValueError::UnexpectedData("narrower unsigned"))
    }

    /// Returns the string value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnexpectedData` for any other variant.
    pub fn as_str(&self) -> Result<&str, ValueError> {
        match self {
            Self::Utf8(v) => Ok(v),
            _ => Err(ValueError::UnexpectedData("string")),
        }
    }

    /// Returns the list items.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnexpectedData` for any other variant.
    pub fn as_list(&self) -> Result<&[AttributeData], ValueError> {
        match self {
            Self::List(v) => Ok(v),
            _ => Err(ValueError::UnexpectedData("list")),
        }
    }

    /// Returns a structure field.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnexpectedData` if this is not a structure or
    /// the field is missing.
    pub fn field(&self, tag: u8) -> Result<&AttributeData, ValueError> {
        match self {
            Self::Struct(fields) => fields
                .get(&tag)
                .ok_or(ValueError::UnexpectedData("structure field")),
            _ => Err(ValueError::UnexpectedData("structure")),
        }
    }

    /// Builds a structure from `(tag, value)` pairs.
    #[must_use]
    pub fn structure<I: IntoIterator<Item = (u8, AttributeData)>>(fields: I) -> Self {
        Self::Struct(fields.into_iter().collect())
    }
}

impl From<bool> for AttributeData {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u8> for AttributeData {
    fn from(value: u8) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<u16> for AttributeData {
    fn from(value: u16) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<u32> for AttributeData {
    fn from(value: u32) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<&str> for AttributeData {
    fn from(value: &str) -> Self {
        Self::Utf8(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_matching() {
        let path = AttributePath::new(1, 0x0006, 0);
        assert!(AttributePathPattern::endpoint(1).matches(&path));
        assert!(!AttributePathPattern::endpoint(0).matches(&path));
        assert!(AttributePathPattern::exact(path).matches(&path));
    }

    #[test]
    fn typed_accessors() {
        assert_eq!(AttributeData::UInt(5).as_uint::<u8>(), Ok(5));
        assert!(AttributeData::UInt(300).as_uint::<u8>().is_err());
        assert_eq!(AttributeData::Int(7).as_u64(), Ok(7));
        assert!(AttributeData::Int(-1).as_u64().is_err());
        assert_eq!(AttributeData::from("x").as_str(), Ok("x"));
        assert!(AttributeData::Null.as_bool().is_err());
    }

    #[test]
    fn structure_fields() {
        let s = AttributeData::structure([(0, AttributeData::UInt(256)), (1, 1u8.into())]);
        assert_eq!(s.field(0).and_then(AttributeData::as_u64), Ok(256));
        assert!(s.field(2).is_err());
    }
}
