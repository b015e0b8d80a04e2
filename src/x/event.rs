//! Data types for the synthetic events sent to clients
use crate::Xid;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A client message that needs to be sent to a given client.
///
/// Only 32 bit formatted messages are sent by trellis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientMessage {
    /// The ID of the window this message is intended for
    pub id: Xid,
    /// The data type being set
    pub dtype: String,
    /// The data itself
    pub data: [u32; 5],
}

impl ClientMessage {
    /// Create a new [ClientMessage].
    pub fn new(id: Xid, dtype: impl Into<String>, data: [u32; 5]) -> Self {
        Self {
            id,
            dtype: dtype.into(),
            data,
        }
    }
}
