//! # Surface Module
//!
//! The seam between the routing engine and a front end. A [`Surface`] tells
//! the [`crate::engine::Router`] how to match its input, how to turn a
//! target's [`Reply`] into its output type, and what to produce when nothing
//! matched or something failed.
//!
//! Two surfaces ship with the crate:
//!
//! | Surface | Input | Output | Not found | Client error | Failure |
//! |---------|-------|--------|-----------|--------------|---------|
//! | [`Http`] | [`HttpRequest`] | [`HttpResponse`] | 404 | 400 | 500 |
//! | [`Console`] | [`CommandInput`] | [`CommandOutput`] | exit 127 | exit 2 | exit 1 |
//!
//! Neither surface is a transport: requests and commands arrive already
//! parsed.

mod console;
mod http;

pub use self::console::{CommandInput, CommandOutput, Console};
pub use self::http::{HeaderVec, Http, HttpRequest, HttpResponse, QueryVec, MAX_INLINE_HEADERS};

use crate::error::RouteError;
use crate::ids::InvocationId;
use crate::router::{MatchResult, Matcher};
use serde_json::Value;

/// Value produced by a dispatch target.
///
/// Each surface coerces a reply into its own output type; a reply meant for
/// the other surface is a contract violation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Http(HttpResponse),
    Command(CommandOutput),
    Json(Value),
    Text(String),
    Empty,
}

impl Reply {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    #[must_use]
    pub fn json(value: Value) -> Self {
        Reply::Json(value)
    }

    /// Variant name used in contract violation messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Http(_) => "http response",
            Reply::Command(_) => "command output",
            Reply::Json(_) => "json",
            Reply::Text(_) => "text",
            Reply::Empty => "empty",
        }
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Json(value)
    }
}

impl From<HttpResponse> for Reply {
    fn from(response: HttpResponse) -> Self {
        Reply::Http(response)
    }
}

impl From<CommandOutput> for Reply {
    fn from(output: CommandOutput) -> Self {
        Reply::Command(output)
    }
}

/// A front end served by the router.
///
/// Implementations are marker types; every method is an associated function.
pub trait Surface: Send + Sync + 'static {
    type Input: Send + Sync + 'static;
    type Output: Clone + Send + Sync + 'static;

    /// Short name recorded on the invocation span
    const NAME: &'static str;

    /// Path or command name, for logs
    fn key(input: &Self::Input) -> &str;

    /// Id of one invocation; surfaces may honour a caller supplied id
    fn invocation_id(_input: &Self::Input) -> InvocationId {
        InvocationId::new()
    }

    /// Match the input and bind its parameters
    ///
    /// # Errors
    ///
    /// Whatever the matcher raises for this input.
    fn match_input(matcher: &Matcher, input: &Self::Input) -> Result<MatchResult, RouteError>;

    /// Turn a target's reply into output
    ///
    /// # Errors
    ///
    /// [`RouteError::ContractViolation`] for a reply this surface cannot carry.
    fn coerce(reply: Reply) -> Result<Self::Output, RouteError>;

    /// Output when no route matched
    fn not_found(input: &Self::Input) -> Self::Output;

    /// Output for an error caused by the caller's input
    fn client_error(input: &Self::Input, error: &RouteError) -> Self::Output;

    /// Output for an error nothing handled.
    ///
    /// Last resort of [`crate::engine::Router::handle`]; it must not panic.
    fn failure(input: &Self::Input, error: &RouteError) -> Self::Output;
}
