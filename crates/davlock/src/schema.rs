//! Persisted key and field layout.
//!
//! The layout is stable: any two implementations sharing a prefix must
//! interoperate on it byte-for-byte. All keys carry a caller-supplied prefix
//! so namespaces can share one store.
//!
//! | Key | Value | Meaning |
//! |---|---|---|
//! | `<p>nt` | integer | Next-token counter, incremented per new lock. |
//! | `<p>e` | sorted index of path -> expiry second | Expiration index. |
//! | `<p>n:<path>` | hash | A node on the path tree. |
//! | `<p>t:<token>` | path string | Reverse lookup from token to locked node. |
//!
//! Node hashes always carry `n`, `r`, `h`, `c`; the lock fields `t`, `d`,
//! `o`, `z`, `e` exist only on the locked node itself, not on ancestors that
//! merely carry a refcount.

/// Key prefix for node hashes.
pub const NAME_KEY_PREFIX: &str = "n:";
/// Key prefix for token reverse pointers.
pub const TOKEN_KEY_PREFIX: &str = "t:";
/// Key of the expiration index.
pub const EXPIRY_INDEX_KEY: &str = "e";
/// Key of the next-token counter.
pub const NEXT_TOKEN_KEY: &str = "nt";

/// Node hash field names.
pub mod field {
    /// The node's own path.
    pub const NAME: &str = "n";
    /// The lock root path (equals the node's path).
    pub const ROOT: &str = "r";
    /// Signed whole-second duration; negative means never expires.
    pub const DURATION: &str = "d";
    /// Opaque owner blob from the protocol layer.
    pub const OWNER_XML: &str = "o";
    /// Whether the lock covers only its root.
    pub const ZERO_DEPTH: &str = "z";
    /// The lock token; absent on refcount-only nodes.
    pub const TOKEN: &str = "t";
    /// Count of locked nodes at or below this path.
    pub const REF_COUNT: &str = "c";
    /// Absolute unix-second expiry; 0 when the duration is negative.
    pub const EXPIRY: &str = "e";
    /// Whether a confirm currently pins the lock.
    pub const HELD: &str = "h";
}

/// Stored form of boolean true.
pub const TRUE_VALUE: &str = "t";
/// Stored form of boolean false.
pub const FALSE_VALUE: &str = "f";

/// Wire sentinel for a conflicting or held lock.
pub const ERR_LOCKED: &str = "ERR_LOCKED";
/// Wire sentinel for a token that resolves to no lock.
pub const ERR_NO_SUCH_LOCK: &str = "ERR_NO_SUCH_LOCK";
/// Wire sentinel for a failed confirmation.
pub const ERR_CONFIRMATION_FAILED: &str = "ERR_CONFIRMATION_FAILED";

/// Encode a boolean as its stored sentinel.
pub fn encode_bool(value: bool) -> &'static str {
    if value { TRUE_VALUE } else { FALSE_VALUE }
}

/// Decode a stored boolean sentinel; anything but `"t"` is false.
pub fn decode_bool(raw: &str) -> bool {
    raw == TRUE_VALUE
}

/// Builds the namespaced keys of the layout above.
#[derive(Debug, Clone)]
pub struct KeySchema {
    prefix: String,
}

impl KeySchema {
    /// A schema for the given namespace prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// The namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key of the node hash at `name`.
    pub fn node_key(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, NAME_KEY_PREFIX, name)
    }

    /// Key of the reverse pointer for `token`.
    pub fn token_key(&self, token: &str) -> String {
        format!("{}{}{}", self.prefix, TOKEN_KEY_PREFIX, token)
    }

    /// Key of the expiration index.
    pub fn expiry_index_key(&self) -> String {
        format!("{}{}", self.prefix, EXPIRY_INDEX_KEY)
    }

    /// Key of the next-token counter.
    pub fn next_token_key(&self) -> String {
        format!("{}{}", self.prefix, NEXT_TOKEN_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_carry_the_prefix() {
        let keys = KeySchema::new("webdav:");
        assert_eq!(keys.node_key("/p1/p2"), "webdav:n:/p1/p2");
        assert_eq!(keys.token_key("17"), "webdav:t:17");
        assert_eq!(keys.expiry_index_key(), "webdav:e");
        assert_eq!(keys.next_token_key(), "webdav:nt");
    }

    #[test]
    fn empty_prefix_is_allowed() {
        let keys = KeySchema::new("");
        assert_eq!(keys.node_key("/"), "n:/");
        assert_eq!(keys.next_token_key(), "nt");
    }

    #[test]
    fn bool_sentinels_round_trip() {
        assert_eq!(encode_bool(true), "t");
        assert_eq!(encode_bool(false), "f");
        assert!(decode_bool("t"));
        assert!(!decode_bool("f"));
        assert!(!decode_bool(""));
        assert!(!decode_bool("true"));
    }
}
