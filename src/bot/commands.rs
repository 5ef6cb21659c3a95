//! Slash-command parsing for the operator console.

/// Commands understood by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start`, greeting plus the main menu.
    Start,
    /// `/help`, command overview.
    Help,
    /// `/menu`, main menu keyboard.
    Menu,
    /// `/status`, deployment status report.
    Status,
    /// `/login <password>`.
    Login,
    /// `/logout`.
    Logout,
    /// `/done`, closes the options-collection loop.
    Done,
    /// `/cancel`, aborts the active flow.
    Cancel,
    /// `/add_face`, starts or programmatically submits a face question.
    AddFace,
    /// `/add_melody`.
    AddMelody,
    /// `/add_voice`.
    AddVoice,
    /// `/add_quote`.
    AddQuote,
    /// `/add_icon`.
    AddIcon,
}

/// A parsed slash command with its trailing argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// The recognized command.
    pub command: Command,
    /// Text after the command name, trimmed; empty when absent.
    pub argument: String,
}

/// Parse a message text into a command, tolerating a `@botname` suffix.
///
/// Returns `None` for plain text and for unknown slash commands.
pub fn parse(text: &str) -> Option<ParsedCommand> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }

    let (head, tail) = match text.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (text, ""),
    };
    let name = head.split('@').next().unwrap_or(head);

    let command = match name {
        "/start" => Command::Start,
        "/help" => Command::Help,
        "/menu" => Command::Menu,
        "/status" => Command::Status,
        "/login" => Command::Login,
        "/logout" => Command::Logout,
        "/done" => Command::Done,
        "/cancel" => Command::Cancel,
        "/add_face" => Command::AddFace,
        "/add_melody" => Command::AddMelody,
        "/add_voice" => Command::AddVoice,
        "/add_quote" => Command::AddQuote,
        "/add_icon" => Command::AddIcon,
        _ => return None,
    };

    Some(ParsedCommand {
        command,
        argument: tail.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_commands_with_and_without_arguments() {
        let parsed = parse("/login hunter2").unwrap();
        assert_eq!(parsed.command, Command::Login);
        assert_eq!(parsed.argument, "hunter2");

        let parsed = parse("/done").unwrap();
        assert_eq!(parsed.command, Command::Done);
        assert!(parsed.argument.is_empty());
    }

    #[test]
    fn strips_the_bot_name_suffix() {
        let parsed = parse("/add_quote@MysteriesBot").unwrap();
        assert_eq!(parsed.command, Command::AddQuote);
    }

    #[test]
    fn keeps_json_payload_arguments_verbatim() {
        let parsed = parse(r#"/add_quote {"quote":"x","options":["a","b"]}"#).unwrap();
        assert_eq!(parsed.command, Command::AddQuote);
        assert!(parsed.argument.starts_with('{'));
    }

    #[test]
    fn plain_text_and_unknown_commands_are_not_commands() {
        assert!(parse("Bethlehem").is_none());
        assert!(parse("/frobnicate").is_none());
        assert!(parse("").is_none());
    }
}
