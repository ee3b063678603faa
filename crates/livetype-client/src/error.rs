//! Client error types.

use livetype_proto::RoomId;
use thiserror::Error;

/// Errors returned by [`Client::handle`](crate::Client::handle).
///
/// An error never leaves the client in a partially updated state: the event
/// that caused it had no effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Operation needs a signed-in session.
    #[error("cannot {operation} before signing in")]
    NotSignedIn {
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// Operation needs room membership.
    #[error("not in a room")]
    NotInRoom,

    /// Server confirmed a join that is not the one we are waiting for.
    #[error("unexpected join confirmation for room {room_id} (pending: {pending:?})")]
    UnexpectedRoomJoined {
        /// Room named by the confirmation.
        room_id: RoomId,
        /// Join we were waiting for, if any.
        pending: Option<RoomId>,
    },

    /// Server sent a message that makes no sense in the current state.
    #[error("unexpected {event:?}: {reason}")]
    UnexpectedMessage {
        /// Event name.
        event: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ClientError {
    /// Returns true if the server misbehaved.
    ///
    /// Anomalies are logged as warnings. Other errors are the result of a
    /// request the user should not have made and only need a usage hint.
    pub fn is_anomaly(&self) -> bool {
        matches!(self, Self::UnexpectedRoomJoined { .. } | Self::UnexpectedMessage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anomaly_classification() {
        assert!(!ClientError::NotInRoom.is_anomaly());
        assert!(!ClientError::NotSignedIn { operation: "join a room" }.is_anomaly());
        assert!(
            ClientError::UnexpectedRoomJoined { room_id: "7".into(), pending: None }.is_anomaly()
        );
    }

    #[test]
    fn messages_read_naturally() {
        let err = ClientError::NotSignedIn { operation: "list rooms" };
        assert_eq!(err.to_string(), "cannot list rooms before signing in");
    }
}
