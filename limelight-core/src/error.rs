use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Identity, RoomId};

/// Metadata blob could not be read. Always recovered locally as "no flags set".
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("metadata is not a JSON object")]
    NotAnObject,
}

/// Failures a stage change can surface to its caller.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageError {
    /// The room was still being created on every attempt.
    #[error("room {room} was not ready after {attempts} attempts")]
    RoomNotReady { room: RoomId, attempts: u32 },

    /// The request carried no credential, or one this server never issued for the room.
    #[error("missing or unknown credential")]
    Unauthenticated,

    #[error("{caller} is not allowed to change stage membership")]
    Unauthorized { caller: Identity },

    #[error("transport failure: {message}")]
    Transport { message: String },

    /// No room handle is available to act on.
    #[error("not connected to a room")]
    NoRoom,
}

impl StageError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
