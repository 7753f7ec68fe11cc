/// Protocol addresses. Every party (user, group, server) is addressed by a
/// jid of the form `local@domain`; groups live under the group-server domain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain every group and the group server itself live under.
pub const GROUP_DOMAIN: &str = "g.arbor";

/// A protocol address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Jid(String);

impl Jid {
    pub fn new(raw: impl Into<String>) -> Self {
        Jid(raw.into())
    }

    /// The fixed group-server address, target of operations that are not
    /// scoped to one existing group (creation, leave, invite redemption,
    /// bulk fetch).
    pub fn group_server() -> Self {
        Jid(GROUP_DOMAIN.to_string())
    }

    /// Canonical group address for a raw identifier. An identifier that
    /// already carries a domain separator is taken verbatim; a bare one is
    /// qualified with the group-server domain.
    pub fn group(id: &str) -> Self {
        if id.contains('@') {
            Jid(id.to_string())
        } else {
            Jid(format!("{id}@{GROUP_DOMAIN}"))
        }
    }

    /// Stable form of a user address: any `:device` suffix on the local part
    /// is dropped, so every session of a user maps to the same jid.
    pub fn normalized(&self) -> Jid {
        let (local, domain) = match self.0.split_once('@') {
            Some((local, domain)) => (local, Some(domain)),
            None => (self.0.as_str(), None),
        };
        let local = local.split(':').next().unwrap_or(local);
        match domain {
            Some(domain) => Jid(format!("{local}@{domain}")),
            None => Jid(local.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Jid {
    fn from(raw: &str) -> Self {
        Jid::new(raw)
    }
}
