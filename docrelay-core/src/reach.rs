//! Consistency/visibility levels negotiated per operation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The minimum consistency guarantee the caller requires for an operation
/// to be considered complete.
///
/// Levels are totally ordered: `Local < Server < Global`. An adapter asked
/// for a level above what it can guarantee must either upgrade internally or
/// fail with [`DatabaseError::Capability`](crate::error::DatabaseError::Capability);
/// it must never silently downgrade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reach {
    /// Visible to subsequent operations issued through the same adapter chain.
    #[default]
    Local,
    /// Durably acknowledged by the backing service.
    Server,
    /// Propagated to every replica of the backing service.
    Global,
}

impl fmt::Display for Reach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reach::Local => write!(f, "local"),
            Reach::Server => write!(f, "server"),
            Reach::Global => write!(f, "global"),
        }
    }
}
