//! Console input: one command per line.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    File(String),
    Drop(Vec<String>),
    Clear,
    Count(String),
    Name(String),
    Dir(String),
    Browse,
    Start,
    Cancel,
    Confirm,
    Keep,
    Dismiss,
    /// 1-based index into the recovery menu.
    Recover(usize),
    Reset,
    Retry,
    Reload,
    Report,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a menu number")]
    NotANumber(String),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let required = |name: &'static str| {
        if rest.is_empty() {
            Err(CommandError::MissingArgument(name))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "file" => Command::File(required("file")?),
        "drop" => Command::Drop(rest.split_whitespace().map(str::to_owned).collect()),
        "clear" => Command::Clear,
        "count" => Command::Count(rest.to_string()),
        "name" => Command::Name(rest.to_string()),
        "dir" => Command::Dir(rest.to_string()),
        "browse" => Command::Browse,
        "start" => Command::Start,
        "cancel" => Command::Cancel,
        "confirm" => Command::Confirm,
        "keep" => Command::Keep,
        "dismiss" => Command::Dismiss,
        "recover" => {
            let raw = required("recover")?;
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => Command::Recover(n),
                _ => return Err(CommandError::NotANumber(raw)),
            }
        }
        "reset" => Command::Reset,
        "retry" => Command::Retry,
        "reload" => Command::Reload,
        "report" => Command::Report,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}
