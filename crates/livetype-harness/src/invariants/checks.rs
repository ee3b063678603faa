//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::BTreeSet;

use livetype_client::SessionState;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// Buffers exist only inside a room.
///
/// Leaving, switching rooms or losing the connection must clear every
/// buffer; a client in the lobby that still holds text would render ghosts.
pub struct BuffersRequireRoom;

impl Invariant for BuffersRequireRoom {
    fn name(&self) -> &'static str {
        "BuffersRequireRoom"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (label, client) in &state.clients {
            if !matches!(client.state, SessionState::InRoom(_)) && !client.buffers.is_empty() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {label} in {:?} holds {} buffers",
                        client.state,
                        client.buffers.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Signed-in states always carry a connection id.
pub struct SessionRequiresIdentity;

impl Invariant for SessionRequiresIdentity {
    fn name(&self) -> &'static str {
        "SessionRequiresIdentity"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (label, client) in &state.clients {
            let signed_in = !matches!(client.state, SessionState::Unauthenticated);
            if signed_in != client.connection_id.is_some() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {label} in {:?} with connection id {:?}",
                        client.state, client.connection_id
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Each author owns at most one buffer.
pub struct UniqueBufferOwners;

impl Invariant for UniqueBufferOwners {
    fn name(&self) -> &'static str {
        "UniqueBufferOwners"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (label, client) in &state.clients {
            let mut seen = BTreeSet::new();
            for (owner, _) in &client.buffers {
                if !seen.insert(owner) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!("client {label} has two buffers for {owner}"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Once all messages are delivered, every client in a room shows exactly the
/// server's text for each member, and no buffer for anyone else.
///
/// A member the client has no buffer for counts as showing empty text.
pub struct PeerConvergence;

impl Invariant for PeerConvergence {
    fn name(&self) -> &'static str {
        "PeerConvergence"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (label, client) in &state.clients {
            let SessionState::InRoom(room_id) = &client.state else {
                continue;
            };
            let Some(room) = state.room(room_id) else {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("client {label} in room {room_id} the server does not know"),
                });
            };

            for (owner, expected) in &room.texts {
                let shown = client
                    .buffers
                    .iter()
                    .find(|(o, _)| o == owner)
                    .map_or("", |(_, text)| text.as_str());
                if shown != expected {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "client {label} room {room_id}: {owner} shows {shown:?}, server has {expected:?}"
                        ),
                    });
                }
            }

            if let Some((ghost, _)) =
                client.buffers.iter().find(|(owner, _)| !room.texts.contains_key(owner))
            {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {label} room {room_id}: buffer for non-member {ghost}"
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use livetype_client::ClientSnapshot;

    use super::*;
    use crate::RoomSnapshot;

    fn client(state: SessionState, buffers: &[(&str, &str)]) -> ClientSnapshot {
        ClientSnapshot {
            connection_id: (!matches!(state, SessionState::Unauthenticated)).then(|| "me".into()),
            state,
            pending_join: None,
            buffers: buffers.iter().map(|(o, t)| ((*o).to_string(), (*t).to_string())).collect(),
        }
    }

    fn room(texts: &[(&str, &str)]) -> RoomSnapshot {
        RoomSnapshot {
            room_id: "1".into(),
            texts: texts
                .iter()
                .map(|(o, t)| ((*o).to_string(), (*t).to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn lobby_buffers_violate() {
        let snapshot = SystemSnapshot::single("a", client(SessionState::Lobby, &[("x", "hi")]));
        assert!(BuffersRequireRoom.check(&snapshot).is_err());
    }

    #[test]
    fn identity_tracks_sign_in() {
        let mut bad = client(SessionState::Lobby, &[]);
        bad.connection_id = None;
        assert!(SessionRequiresIdentity.check(&SystemSnapshot::single("a", bad)).is_err());

        let good = client(SessionState::Unauthenticated, &[]);
        assert!(SessionRequiresIdentity.check(&SystemSnapshot::single("a", good)).is_ok());
    }

    #[test]
    fn duplicate_owner_violates() {
        let snapshot = SystemSnapshot::single(
            "a",
            client(SessionState::InRoom("1".into()), &[("x", "a"), ("x", "b")]),
        );
        assert!(UniqueBufferOwners.check(&snapshot).is_err());
    }

    #[test]
    fn convergence_compares_against_server() {
        let mut snapshot =
            SystemSnapshot::single("a", client(SessionState::InRoom("1".into()), &[("me", "hi")]));
        snapshot.rooms.push(room(&[("me", "hi"), ("bob", "")]));
        assert!(PeerConvergence.check(&snapshot).is_ok());

        snapshot.rooms[0] = room(&[("me", "hi"), ("bob", "yo")]);
        assert!(PeerConvergence.check(&snapshot).is_err());

        snapshot.rooms[0] = room(&[("bob", "")]);
        assert!(PeerConvergence.check(&snapshot).is_err());
    }
}
