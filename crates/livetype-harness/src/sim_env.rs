//! Simulated environment.
//!
//! The clock only moves when a test advances it, and clones share it, so a
//! whole cluster observes one timeline. `sleep` advances instead of waiting.

pub use livetype_core::env::test_utils::{MockEnv as SimEnv, MockInstant as SimInstant};

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use livetype_client::{
        Client, ClientAction, ClientEvent, Environment, Profile, ROOM_ACTION_TIMEOUT,
    };
    use livetype_proto::{ServerMessage, SigninStatus};

    use super::*;

    #[test]
    fn shared_clock_drives_client_timeouts() {
        let env = SimEnv::new();
        let mut client = Client::new(env.clone(), Profile::new("ann", "Oslo"));
        let _ = client.handle(ClientEvent::Connected);
        let _ = client.handle(ClientEvent::Received(ServerMessage::SigninStatus(SigninStatus {
            is_signed_in: true,
            user_id: Some("me".into()),
        })));
        let _ = client.handle(ClientEvent::JoinRoom { room_id: "9".into(), access_code: None });

        env.advance(ROOM_ACTION_TIMEOUT - Duration::from_secs(1));
        let early = client.handle(ClientEvent::Tick { now: env.now() });
        assert!(matches!(early, Ok(ref actions) if actions.is_empty()));

        env.advance(Duration::from_secs(1));
        let late = client.handle(ClientEvent::Tick { now: env.now() });
        assert!(matches!(
            late.as_deref(),
            Ok([ClientAction::Notice { message }]) if message.contains("Timed out")
        ));
    }
}
