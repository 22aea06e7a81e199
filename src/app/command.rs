//! Command parsing and execution for the command line

use std::path::PathBuf;

/// Parsed command from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a question by id: :open <question-id>
    Open(String),
    /// List loaded questions: :list
    List,
    /// Sign in: :login <name> <email>
    Login { name: String, email: String },
    /// Sign out: :logout
    Logout,
    /// Enroll in a course: :enroll <course-id>
    Enroll(String),
    /// Write a backup of all persisted records: :backup <path>
    Backup(PathBuf),
    /// Restore records from a backup file: :restore <path>
    Restore(PathBuf),
    /// Export attempt history as CSV: :export <path>
    Export(PathBuf),
    /// Clear progress and history: :reset
    Reset,
    /// Quit the application: :q or :quit
    Quit,
    /// Show help: :help or :h
    Help,
    /// Clear message: (empty command)
    Nop,
}

/// Result of parsing a command
#[derive(Debug)]
pub enum ParseResult {
    /// Successfully parsed command
    Ok(Command),
    /// Unknown command
    UnknownCommand(String),
    /// Command needs an argument
    MissingArgument(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> ParseResult {
    let input = input.trim();

    if input.is_empty() {
        return ParseResult::Ok(Command::Nop);
    }

    let mut parts = input.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().map(|s| s.trim()).unwrap_or("");

    match cmd.to_lowercase().as_str() {
        "open" | "o" => {
            if args.is_empty() {
                ParseResult::MissingArgument("open".to_string())
            } else {
                ParseResult::Ok(Command::Open(args.to_string()))
            }
        }
        "list" | "ls" | "l" => ParseResult::Ok(Command::List),
        "login" => {
            let mut words = args.split_whitespace();
            match (words.next(), words.next()) {
                (Some(name), Some(email)) => ParseResult::Ok(Command::Login {
                    name: name.to_string(),
                    email: email.to_string(),
                }),
                _ => ParseResult::MissingArgument("login".to_string()),
            }
        }
        "logout" => ParseResult::Ok(Command::Logout),
        "enroll" => {
            if args.is_empty() {
                ParseResult::MissingArgument("enroll".to_string())
            } else {
                ParseResult::Ok(Command::Enroll(args.to_string()))
            }
        }
        "backup" | "b" => {
            if args.is_empty() {
                ParseResult::MissingArgument("backup".to_string())
            } else {
                ParseResult::Ok(Command::Backup(PathBuf::from(args)))
            }
        }
        "restore" => {
            if args.is_empty() {
                ParseResult::MissingArgument("restore".to_string())
            } else {
                ParseResult::Ok(Command::Restore(PathBuf::from(args)))
            }
        }
        "export" | "csv" => {
            if args.is_empty() {
                ParseResult::MissingArgument("export".to_string())
            } else {
                ParseResult::Ok(Command::Export(PathBuf::from(args)))
            }
        }
        "reset" => ParseResult::Ok(Command::Reset),
        "quit" | "q" => ParseResult::Ok(Command::Quit),
        "help" | "h" | "?" => ParseResult::Ok(Command::Help),
        _ => ParseResult::UnknownCommand(cmd.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_open_with_argument() {
        let ParseResult::Ok(cmd) = parse_command("open wfd-001") else {
            panic!("expected ok");
        };
        assert_eq!(cmd, Command::Open("wfd-001".into()));
    }

    #[test]
    fn open_without_argument_is_missing() {
        assert!(matches!(parse_command("open"), ParseResult::MissingArgument(_)));
    }

    #[test]
    fn login_needs_name_and_email() {
        assert!(matches!(parse_command("login ada"), ParseResult::MissingArgument(_)));
        let ParseResult::Ok(cmd) = parse_command("login ada ada@example.com") else {
            panic!("expected ok");
        };
        assert_eq!(
            cmd,
            Command::Login { name: "ada".into(), email: "ada@example.com".into() }
        );
    }

    #[test]
    fn aliases_resolve() {
        assert!(matches!(parse_command("q"), ParseResult::Ok(Command::Quit)));
        assert!(matches!(parse_command("ls"), ParseResult::Ok(Command::List)));
        assert!(matches!(parse_command("csv out.csv"), ParseResult::Ok(Command::Export(_))));
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert!(matches!(parse_command("frobnicate"), ParseResult::UnknownCommand(_)));
    }

    #[test]
    fn empty_input_is_a_nop() {
        assert!(matches!(parse_command("   "), ParseResult::Ok(Command::Nop)));
    }
}
