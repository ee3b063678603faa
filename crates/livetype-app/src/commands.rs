//! Line command parsing.
//!
//! A submitted line is a command when its first word names one,
//! case-insensitively. Anything else is chat content, which has already been
//! streamed keystroke by keystroke.

use livetype_proto::RoomId;

/// Parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `rooms`: ask for the lobby catalog.
    Rooms,
    /// `join <room_id> [code]`.
    Join {
        /// Room to join.
        room_id: RoomId,
        /// Access code for semi-private rooms.
        access_code: Option<String>,
    },
    /// `create <name>`: public room. The name may contain spaces.
    Create {
        /// Room name.
        name: String,
    },
    /// `createp <name> <code>`: semi-private room. The last word is the code.
    CreatePrivate {
        /// Room name.
        name: String,
        /// Access code.
        access_code: String,
    },
    /// `leave`.
    Leave,
    /// `help`.
    Help,
    /// `quit`.
    Quit,
}

/// Malformed command. The message is shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Bad `join` arguments.
    #[error("Invalid join command. Usage: join <room_id> [access_code]")]
    Join,
    /// Bad `create` arguments.
    #[error("Invalid create command. Usage: create <name>")]
    Create,
    /// Bad `createp` arguments.
    #[error("Invalid createp command. Usage: createp <name> <access_code>")]
    CreatePrivate,
    /// Arguments given to a command that takes none.
    #[error("Unknown command. Type 'help' for available commands.")]
    Unknown,
}

/// Parse a submitted line.
///
/// Returns `Ok(None)` when the line is not a command.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "rooms" => bare(rest, Command::Rooms)?,
        "leave" => bare(rest, Command::Leave)?,
        "help" => bare(rest, Command::Help)?,
        "quit" => bare(rest, Command::Quit)?,
        "join" => parse_join(rest)?,
        "create" => {
            if rest.is_empty() {
                return Err(CommandError::Create);
            }
            Command::Create { name: rest.to_string() }
        },
        "createp" => parse_create_private(rest)?,
        _ => return Ok(None),
    };

    Ok(Some(command))
}

fn bare(rest: &str, command: Command) -> Result<Command, CommandError> {
    if rest.is_empty() { Ok(command) } else { Err(CommandError::Unknown) }
}

fn parse_join(rest: &str) -> Result<Command, CommandError> {
    let mut words = rest.split_whitespace();
    let room_id = words.next().ok_or(CommandError::Join)?;
    let access_code = words.next().map(str::to_string);
    if words.next().is_some() {
        return Err(CommandError::Join);
    }

    Ok(Command::Join { room_id: room_id.to_string(), access_code })
}

fn parse_create_private(rest: &str) -> Result<Command, CommandError> {
    let (name, code) = rest.rsplit_once(char::is_whitespace).ok_or(CommandError::CreatePrivate)?;
    let name = name.trim();
    if name.is_empty() || code.is_empty() {
        return Err(CommandError::CreatePrivate);
    }

    Ok(Command::CreatePrivate { name: name.to_string(), access_code: code.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_commands() {
        assert_eq!(parse("rooms"), Ok(Some(Command::Rooms)));
        assert_eq!(parse("  LEAVE "), Ok(Some(Command::Leave)));
        assert_eq!(parse("Help"), Ok(Some(Command::Help)));
        assert_eq!(parse("quit"), Ok(Some(Command::Quit)));
        assert_eq!(parse("quit now"), Err(CommandError::Unknown));
    }

    #[test]
    fn join_with_and_without_code() {
        assert_eq!(
            parse("join 123"),
            Ok(Some(Command::Join { room_id: "123".into(), access_code: None }))
        );
        assert_eq!(
            parse("JOIN 123 secret"),
            Ok(Some(Command::Join { room_id: "123".into(), access_code: Some("secret".into()) }))
        );
        assert_eq!(parse("join"), Err(CommandError::Join));
        assert_eq!(parse("join 1 2 3"), Err(CommandError::Join));
    }

    #[test]
    fn create_keeps_spaces_in_name() {
        assert_eq!(
            parse("create night owls"),
            Ok(Some(Command::Create { name: "night owls".into() }))
        );
        assert_eq!(parse("create"), Err(CommandError::Create));
    }

    #[test]
    fn createp_takes_last_word_as_code() {
        assert_eq!(
            parse("createp night owls 4242"),
            Ok(Some(Command::CreatePrivate {
                name: "night owls".into(),
                access_code: "4242".into()
            }))
        );
        assert_eq!(parse("createp lonely"), Err(CommandError::CreatePrivate));
        assert_eq!(parse("createp"), Err(CommandError::CreatePrivate));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse("hello there"), Ok(None));
        assert_eq!(parse("roomsy"), Ok(None));
        assert_eq!(parse(""), Ok(None));
    }
}
