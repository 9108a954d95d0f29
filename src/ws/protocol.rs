//! WebSocket protocol message definitions
//! These are the wire types streamed to rendering adapters

use serde::{Deserialize, Serialize};

use crate::game::snapshot::BoardSnapshot;
use crate::game::tick::TickReport;

/// Messages sent from a rendering adapter to the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Ask for the current board right away
    RequestSnapshot,

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },
}

/// Messages sent from server to adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection
    Welcome {
        server_time: u64,
    },

    /// Board state after a mutation
    Snapshot {
        snapshot: BoardSnapshot,
    },

    /// The daily tick ran
    Tick {
        report: TickReport,
    },

    /// A player ran out of health and joined the jury
    Eliminated {
        participant: String,
        name: String,
    },

    /// One player is left standing
    Winner {
        participant: String,
        name: String,
    },

    /// Error message
    Error {
        code: String,
        message: String,
    },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}
