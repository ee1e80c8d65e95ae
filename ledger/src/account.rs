//! # Account Identifiers
//!
//! Every party the ledger deals with -- depositors, the owning identity,
//! the ledger component itself, the custody vault -- is named by an
//! [`AccountId`]. The ledger does not interpret the string beyond equality:
//! authorization is an explicit comparison against a stored identifier,
//! never an ambient "whoever calls me" assumption.
//!
//! Identifiers serialize as plain strings, so maps keyed by `AccountId`
//! round-trip through JSON without any helper shims.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque identity string for an account or component.
///
/// Equality on `AccountId` is the entire trust model of this system: the
/// vault releases funds only to a caller whose id matches its configured
/// `allowed_caller`, and the ledger gates privileged operations on an
/// exact match against its `owner`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Creates an account id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
