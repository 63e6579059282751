//! Client identity for quota keys

use sha2::{Digest, Sha256};
use std::fmt;

/// Who a request is charged to, in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientIdentity {
    /// SHA-256 of the API key; the raw key is never kept
    ApiKey(String),
    User(String),
    Address(String),
    Unknown,
}

impl ClientIdentity {
    /// API key > user id > remote address > unknown. Blank values count as absent.
    pub fn resolve(api_key: Option<&str>, user_id: Option<&str>, address: Option<&str>) -> Self {
        if let Some(key) = present(api_key) {
            ClientIdentity::ApiKey(hash_api_key(key))
        } else if let Some(user) = present(user_id) {
            ClientIdentity::User(user.to_string())
        } else if let Some(addr) = present(address) {
            ClientIdentity::Address(addr.to_string())
        } else {
            ClientIdentity::Unknown
        }
    }

    pub fn has_api_key(&self) -> bool {
        matches!(self, ClientIdentity::ApiKey(_))
    }

    /// Store key fragment, e.g. `user:42`
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientIdentity::ApiKey(hash) => write!(f, "apikey:{}", hash),
            ClientIdentity::User(id) => write!(f, "user:{}", id),
            ClientIdentity::Address(addr) => write!(f, "ip:{}", addr),
            ClientIdentity::Unknown => f.write_str("unknown"),
        }
    }
}

/// Trimmed value, or `None` when blank
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Hex SHA-256 of an API key, truncated to 32 characters
pub fn hash_api_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(32);
    encoded
}
