use super::{Reply, Surface};
use crate::error::RouteError;
use crate::router::{CommandArgs, MatchResult, Matcher};
use serde::Serialize;

/// Exit code for an unknown command, as shells report it
const EXIT_NOT_FOUND: i32 = 127;
/// Exit code for a usage error
const EXIT_USAGE: i32 = 2;
const EXIT_FAILURE: i32 = 1;

/// Already tokenized command invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandInput {
    pub name: String,
    pub args: CommandArgs,
}

impl CommandInput {
    #[must_use]
    pub fn new(name: impl Into<String>, args: CommandArgs) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// First token is the command name, the rest are its arguments
    pub fn parse<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut tokens = tokens.into_iter();
        let name = tokens
            .next()
            .map(|t| t.as_ref().to_string())
            .unwrap_or_default();
        Self {
            name,
            args: CommandArgs::parse(tokens),
        }
    }
}

/// Result of running a command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    #[must_use]
    pub fn error(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Command-line front end: matches on the command name
#[derive(Debug, Clone, Copy, Default)]
pub struct Console;

impl Surface for Console {
    type Input = CommandInput;
    type Output = CommandOutput;

    const NAME: &'static str = "console";

    fn key(input: &CommandInput) -> &str {
        &input.name
    }

    fn match_input(matcher: &Matcher, input: &CommandInput) -> Result<MatchResult, RouteError> {
        matcher.match_command(&input.name, &input.args)
    }

    fn coerce(reply: Reply) -> Result<CommandOutput, RouteError> {
        match reply {
            Reply::Command(output) => Ok(output),
            Reply::Text(text) => Ok(CommandOutput::success(text)),
            Reply::Json(value) => serde_json::to_string_pretty(&value)
                .map(CommandOutput::success)
                .map_err(|e| RouteError::ContractViolation(e.to_string())),
            Reply::Empty => Ok(CommandOutput::success("")),
            Reply::Http(_) => Err(RouteError::ContractViolation(
                "console route returned http response".to_string(),
            )),
        }
    }

    fn not_found(input: &CommandInput) -> CommandOutput {
        CommandOutput::error(
            EXIT_NOT_FOUND,
            format!("command '{}' is not defined", input.name),
        )
    }

    fn client_error(_input: &CommandInput, error: &RouteError) -> CommandOutput {
        CommandOutput::error(EXIT_USAGE, error.to_string())
    }

    fn failure(_input: &CommandInput, error: &RouteError) -> CommandOutput {
        CommandOutput::error(EXIT_FAILURE, format!("error: {error}"))
    }
}
