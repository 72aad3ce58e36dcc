//! Error types for the Hookcord framework.

use thiserror::Error;

/// Errors raised while parsing a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The pattern is blank.
    #[error("route pattern is empty")]
    EmptyPattern,

    /// The pattern does not start with `/`.
    #[error("route pattern must start with '/': {0}")]
    MissingLeadingSlash(String),

    /// A path segment between two slashes is empty.
    #[error("empty path segment in route pattern: {0}")]
    EmptySegment(String),

    /// A `:` placeholder has no name.
    #[error("parameter without a name in route pattern: {0}")]
    EmptyParameterName(String),

    /// Parentheses of an inline constraint do not balance.
    #[error("unbalanced parenthesis in route pattern: {0}")]
    UnbalancedParenthesis(String),

    /// An inline constraint is not a valid regular expression.
    #[error("invalid constraint for parameter '{name}': {reason}")]
    InvalidConstraint {
        /// Parameter carrying the constraint.
        name: String,
        /// Regex compiler message.
        reason: String,
    },
}

/// Errors raised while resolving an interaction into a handler request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The interaction carried neither a command name nor a custom id.
    #[error("interaction names no command or component")]
    MissingName,

    /// No route is registered under the command name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// No route matches a component's custom id.
    #[error("no route matches component '{0}'")]
    UnknownComponent(String),

    /// A required path parameter was not supplied.
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    /// A supplied value does not satisfy the parameter's inline constraint.
    #[error("value '{value}' does not satisfy the constraint of '{name}'")]
    ConstraintMismatch {
        /// Parameter name.
        name: String,
        /// Rejected value.
        value: String,
    },

    /// The synthetic request URL could not be built.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Result type for route parsing.
pub type RouteResult<T> = Result<T, RouteError>;

/// Result type for interaction resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;
