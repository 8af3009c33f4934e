//! Access Kinds.
//!
//! This module defines the classification of bus transactions used by the
//! permission check. Every transaction requests exactly one kind of access,
//! and a protection entry grants or withholds each kind independently.

use serde::Deserialize;
use std::fmt;

/// Kind of access requested by a bus transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    /// Data read. Requires the R permission.
    Read,

    /// Data write. Requires the W permission.
    Write,

    /// Instruction fetch on behalf of the initiator. Requires the X permission.
    #[serde(alias = "exec", alias = "fetch")]
    Execute,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Execute => write!(f, "execute"),
        }
    }
}
