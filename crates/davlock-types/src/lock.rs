//! Lock descriptions exchanged between callers, the facade, and backends.

use serde::Deserialize;
use serde::Serialize;

/// How long a lock lives before the expiration sweep may collect it.
///
/// The persisted encoding is a signed whole-second count where any negative
/// value means "never expires"; [`LockDuration::as_secs`] and
/// [`LockDuration::from_secs`] convert to and from that form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockDuration {
    /// The lock never expires.
    Infinite,
    /// The lock expires this many seconds after the operation's `now`.
    Seconds(u64),
}

impl LockDuration {
    /// Decode the signed whole-second wire form.
    pub fn from_secs(secs: i64) -> Self {
        if secs < 0 {
            LockDuration::Infinite
        } else {
            LockDuration::Seconds(secs as u64)
        }
    }

    /// Encode as the signed whole-second wire form (`-1` for infinite).
    pub fn as_secs(self) -> i64 {
        match self {
            LockDuration::Infinite => -1,
            LockDuration::Seconds(secs) => secs as i64,
        }
    }

    /// Whether the lock participates in the expiry index.
    pub fn is_finite(self) -> bool {
        matches!(self, LockDuration::Seconds(_))
    }
}

/// Unique identifier of a lock instance.
///
/// Tokens are the decimal form of a monotonic counter allocated by the store,
/// so they are unique per namespace for the lifetime of the counter key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockToken(String);

impl LockToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for LockToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for LockToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl std::fmt::Display for LockToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Public description of a lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockDetails {
    /// The path the lock is anchored at.
    pub root: String,
    /// Lifetime of the lock.
    pub duration: LockDuration,
    /// Opaque owner blob supplied by the protocol layer.
    pub owner_xml: String,
    /// True if the lock covers only `root`; false if it also covers every
    /// descendant of `root`.
    pub zero_depth: bool,
}

impl LockDetails {
    /// A lock description with an empty owner and infinite depth.
    pub fn new(root: impl Into<String>, duration: LockDuration) -> Self {
        Self {
            root: root.into(),
            duration,
            owner_xml: String::new(),
            zero_depth: false,
        }
    }
}

/// One precondition supplied to a confirm call.
///
/// Only the token is evaluated; negation and entity tags are carried for the
/// protocol layer's benefit and ignored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Negates the condition. Ignored.
    pub not: bool,
    /// Candidate lock token.
    pub token: String,
    /// Entity tag. Ignored.
    pub etag: String,
}

impl Condition {
    /// A condition carrying only a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }
}
