#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Help,
    Files,
    Open(FileTarget),
    New { name: String },
    Remove(Option<FileTarget>),
    Clear,
    Model(Option<String>),
    System(Option<String>),
    Key { key: String },
    Trace,
    Quit,
}

/// A file picked by its 1-based position in `/files` or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FileTarget {
    Position(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParseError {
    message: String,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

pub(crate) const HELP_TEXT: &str = "Available commands:\n  /help                Show this command list\n  /files               List workspace files\n  /open <name|n>       Make a file active\n  /new <name>          Create an empty file and open it\n  /rm [name|n]         Remove a file (the active one by default)\n  /clear               Clear the chat history and timeline\n  /model [name]        Show or change the Gemini model\n  /system [prompt]     Show or change the system prompt\n  /key <api-key>       Use a different Gemini API key\n  /trace               Show path to the current trace file\n  /quit                Leave the editor\nKeys: Tab switches chat/editor, Ctrl-N/Ctrl-P change file, Ctrl-C quits.";

pub(crate) fn parse_command(line: &str) -> Result<Command, ParseError> {
    if !line.starts_with('/') {
        return Err(ParseError::new("not a command"));
    }

    let trimmed = line.trim();
    let command_text = &trimmed[1..];
    let mut parts = command_text.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("").to_ascii_lowercase();
    if name.is_empty() {
        return Err(ParseError::new("empty command. Try /help"));
    }
    let rest = parts.next().map(str::trim).unwrap_or("");

    match name.as_str() {
        "help" => expect_no_args(rest, Command::Help, "usage: /help"),
        "files" | "ls" => expect_no_args(rest, Command::Files, "usage: /files"),
        "open" => parse_required_text_arg(rest, "usage: /open <name|n>")
            .map(|arg| Command::Open(parse_target(&arg))),
        "new" => {
            parse_required_text_arg(rest, "usage: /new <name>").map(|name| Command::New { name })
        }
        "rm" => Ok(Command::Remove(optional_arg(rest).map(|arg| parse_target(&arg)))),
        "clear" => expect_no_args(rest, Command::Clear, "usage: /clear"),
        "model" => Ok(Command::Model(optional_arg(rest))),
        "system" => Ok(Command::System(optional_arg(rest))),
        "key" => parse_required_text_arg(rest, "usage: /key <api-key>").and_then(|key| {
            if key.contains(char::is_whitespace) {
                Err(ParseError::new("usage: /key <api-key>"))
            } else {
                Ok(Command::Key { key })
            }
        }),
        "trace" => expect_no_args(rest, Command::Trace, "usage: /trace"),
        "quit" | "exit" => expect_no_args(rest, Command::Quit, "usage: /quit"),
        _ => Err(ParseError::new(format!(
            "unknown command '/{name}'. Try /help"
        ))),
    }
}

pub(crate) fn is_command_line(line: &str) -> bool {
    line.starts_with('/')
}

fn expect_no_args(rest: &str, command: Command, usage: &str) -> Result<Command, ParseError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(ParseError::new(usage))
    }
}

fn optional_arg(rest: &str) -> Option<String> {
    (!rest.is_empty()).then(|| rest.to_string())
}

fn parse_target(arg: &str) -> FileTarget {
    match arg.parse::<usize>() {
        Ok(position) if position >= 1 => FileTarget::Position(position),
        _ => FileTarget::Name(arg.to_string()),
    }
}

fn parse_required_text_arg(rest: &str, usage: &str) -> Result<String, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::new(usage));
    }
    Ok(rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::{Command, FileTarget, HELP_TEXT, is_command_line, parse_command};

    #[test]
    fn help_text_lists_all_supported_commands() {
        for needle in [
            "/help",
            "/files",
            "/open <name|n>",
            "/new <name>",
            "/rm [name|n]",
            "/clear",
            "/model [name]",
            "/system [prompt]",
            "/key <api-key>",
            "/trace",
            "/quit",
        ] {
            assert!(HELP_TEXT.contains(needle), "missing help entry: {needle}");
        }
    }

    #[test]
    fn parse_simple_commands() {
        assert_eq!(parse_command("/help").expect("help"), Command::Help);
        assert_eq!(parse_command("/files").expect("files"), Command::Files);
        assert_eq!(parse_command("/ls").expect("ls alias"), Command::Files);
        assert_eq!(parse_command("/clear").expect("clear"), Command::Clear);
        assert_eq!(parse_command("/trace").expect("trace"), Command::Trace);
        assert_eq!(parse_command("/QUIT").expect("quit"), Command::Quit);
        assert_eq!(parse_command("/exit").expect("exit alias"), Command::Quit);
    }

    #[test]
    fn parse_file_targets_by_position_or_name() {
        assert_eq!(
            parse_command("/open 2").expect("open by position"),
            Command::Open(FileTarget::Position(2))
        );
        assert_eq!(
            parse_command("/open src/App.tsx").expect("open by name"),
            Command::Open(FileTarget::Name("src/App.tsx".to_string()))
        );
        assert_eq!(
            parse_command("/open 0").expect("zero is a name"),
            Command::Open(FileTarget::Name("0".to_string()))
        );
        assert_eq!(parse_command("/rm").expect("rm active"), Command::Remove(None));
        assert_eq!(
            parse_command("/rm  styles.css ").expect("rm by name"),
            Command::Remove(Some(FileTarget::Name("styles.css".to_string())))
        );
    }

    #[test]
    fn parse_optional_settings_arguments() {
        assert_eq!(parse_command("/model").expect("model"), Command::Model(None));
        assert_eq!(
            parse_command("/model gemini-1.5-pro").expect("model set"),
            Command::Model(Some("gemini-1.5-pro".to_string()))
        );
        assert_eq!(
            parse_command("/system Reply in French.").expect("system set"),
            Command::System(Some("Reply in French.".to_string()))
        );
        assert_eq!(
            parse_command("/key abc123").expect("key"),
            Command::Key {
                key: "abc123".to_string()
            }
        );
        assert_eq!(
            parse_command("/new Button.tsx").expect("new"),
            Command::New {
                name: "Button.tsx".to_string()
            }
        );
    }

    #[test]
    fn parse_reports_usage_for_invalid_arguments() {
        assert_eq!(
            parse_command("/open").expect_err("missing open").message(),
            "usage: /open <name|n>"
        );
        assert_eq!(
            parse_command("/new").expect_err("missing name").message(),
            "usage: /new <name>"
        );
        assert_eq!(
            parse_command("/key a b").expect_err("spaces in key").message(),
            "usage: /key <api-key>"
        );
        assert_eq!(
            parse_command("/files now").expect_err("extra args").message(),
            "usage: /files"
        );
    }

    #[test]
    fn parse_reports_unknown_and_empty_commands() {
        assert_eq!(
            parse_command("/bogus")
                .expect_err("unknown command")
                .message(),
            "unknown command '/bogus'. Try /help"
        );
        assert_eq!(
            parse_command("/").expect_err("bare slash").message(),
            "empty command. Try /help"
        );
        assert_eq!(
            parse_command("/ help")
                .expect_err("missing command name")
                .message(),
            "empty command. Try /help"
        );
    }

    #[test]
    fn command_line_detection_is_prefix_based() {
        assert!(is_command_line("/help"));
        assert!(!is_command_line(" /help"));
        assert!(!is_command_line("make a /help page"));
    }
}
