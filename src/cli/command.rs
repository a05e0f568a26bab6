//! Interactive line commands

use std::str::FromStr;

use crate::domain::recorder::Action;

/// One line typed at the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Action(Action),
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        match line.trim().to_ascii_lowercase().as_str() {
            "record" | "r" => Ok(Self::Action(Action::Record)),
            "stop" | "s" => Ok(Self::Action(Action::Stop)),
            "play" | "p" => Ok(Self::Action(Action::Play)),
            "clear" | "c" => Ok(Self::Action(Action::Clear)),
            "status" => Ok(Self::Status),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command '{}' (type 'help')", other)),
        }
    }
}

/// Help text, one `(usage, description)` pair per command
pub const HELP: &[(&str, &str)] = &[
    ("record, r", "start a new recording (discards the current one)"),
    ("stop, s", "finish the recording"),
    ("play, p", "play the finished recording"),
    ("clear, c", "discard the finished recording"),
    ("status", "show state and available actions"),
    ("help, h", "show this help"),
    ("quit, q", "exit (Ctrl-C and Ctrl-D work too)"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_forms() {
        assert_eq!("record".parse::<Command>(), Ok(Command::Action(Action::Record)));
        assert_eq!("r".parse::<Command>(), Ok(Command::Action(Action::Record)));
        assert_eq!("s".parse::<Command>(), Ok(Command::Action(Action::Stop)));
        assert_eq!("play".parse::<Command>(), Ok(Command::Action(Action::Play)));
        assert_eq!("c".parse::<Command>(), Ok(Command::Action(Action::Clear)));
        assert_eq!("status".parse::<Command>(), Ok(Command::Status));
        assert_eq!("h".parse::<Command>(), Ok(Command::Help));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn ignores_case_and_whitespace() {
        assert_eq!("  STOP \n".parse::<Command>(), Ok(Command::Action(Action::Stop)));
    }

    #[test]
    fn rejects_unknown_input() {
        let err = "rewind".parse::<Command>().unwrap_err();
        assert!(err.contains("rewind"));
    }
}
