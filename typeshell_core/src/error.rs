//! Error types of the dispatch core.
//!
//! Each stage reports its own error family. Everything that can go wrong with
//! a typed-in line is folded into [`InputError`] before it leaves the invoker;
//! errors raised by command handlers travel separately and unchanged inside
//! [`InvokeError::Handler`].

use thiserror::Error;

/// Error type returned by command handlers.
pub type HandlerError = anyhow::Error;

/// Failure of the delimiter-aware splitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// Input ended while some delimiters were still open.
    #[error("text contains unmatched delimiters: {pending} (text = {text})")]
    Unmatched {
        /// Closing delimiters still expected, innermost last.
        pending: String,
        /// The text being split.
        text: String,
    },

    /// A delimiter character also satisfies the separator predicate.
    #[error("delimiter {0:?} is not supported as a separator")]
    DelimiterIsSeparator(char),
}

/// Failure of turning text into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructError {
    /// A list or tuple value could not be split into elements.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// A tuple value has a different number of elements than its type.
    #[error("mismatched lengths: {got} values, {expected} tuple types")]
    ArityMismatch {
        /// Number of element types.
        expected: usize,
        /// Number of elements found in the text.
        got: usize,
    },

    /// The text is not a valid representation of the type.
    #[error("cannot construct {type_name} from {text:?}: {reason}")]
    Invalid {
        /// Display name of the target type.
        type_name: String,
        /// Offending text.
        text: String,
        /// What was wrong with it.
        reason: String,
    },

    /// None of the alternatives of a union accepted the text.
    #[error("{text:?} does not match any alternative of {type_name}")]
    NoAlternative {
        /// Display name of the union type.
        type_name: String,
        /// Offending text.
        text: String,
    },

    /// Type descriptors nested deeper than the configured limit.
    #[error("type nested deeper than {limit} levels")]
    TooDeep {
        /// Configured nesting limit.
        limit: usize,
    },
}

impl ConstructError {
    /// Shorthand for [`ConstructError::Invalid`], meant for custom parse hooks.
    pub fn invalid(type_name: impl Into<String>, text: &str, reason: impl Into<String>) -> Self {
        ConstructError::Invalid {
            type_name: type_name.into(),
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

/// A typed-in line cannot be turned into a call (the "invalid input" umbrella).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Quotes or brackets of the line are unbalanced.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// No command matches the typed name.
    #[error("no such command: {0}")]
    UnknownCommand(String),

    /// More than one command matches the typed name.
    #[error("ambiguous command: {name} (possible: {})", .matches.join(" "))]
    AmbiguousCommand {
        /// Name as typed.
        name: String,
        /// Every command of the winning match tier.
        matches: Vec<String>,
    },

    /// The same parameter received two values.
    #[error("cannot assign named argument to {0}: argument already present")]
    DuplicateArgument(String),

    /// A positional value arrived after all parameters were bound.
    #[error("cannot assign positional argument {0:?}: no more expected parameters")]
    TooManyArguments(String),

    /// A parameter without default received no value.
    #[error("missing value for argument: {0}")]
    MissingArgument(String),

    /// A value could not be converted to its parameter's type.
    #[error("invalid value for argument {param}: {source}")]
    InvalidArgument {
        /// Parameter name.
        param: String,
        /// Why construction failed.
        #[source]
        source: ConstructError,
    },
}

/// A [`Value`](crate::Value) does not fit the Rust type a handler asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value has a different shape.
    #[error("expected {expected}, got {found}")]
    Mismatch {
        /// Requested type.
        expected: String,
        /// The value actually present.
        found: String,
    },

    /// A number does not fit the requested integer type.
    #[error("{value} out of range for {target}")]
    OutOfRange {
        /// The number.
        value: String,
        /// Requested integer type.
        target: &'static str,
    },
}

/// Typed access to a constructed argument failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The command has no such parameter.
    #[error("no argument named {0}")]
    Missing(String),

    /// The argument exists but holds a value of another type.
    #[error("argument {name}: {source}")]
    Value {
        /// Parameter name.
        name: String,
        /// Conversion failure.
        #[source]
        source: ValueError,
    },
}

/// A command table violates the registration rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// Command names must be non-empty and free of whitespace and quotes.
    #[error("invalid command name: {0:?}")]
    InvalidCommandName(String),

    /// Two commands share a name.
    #[error("command {0} registered twice")]
    DuplicateCommand(String),

    /// Parameter names must be non-empty runs of letters, digits and underscores.
    #[error("command {command}: invalid parameter name {param:?}")]
    InvalidParameterName {
        /// Command name.
        command: String,
        /// Offending parameter name.
        param: String,
    },

    /// Two parameters of one command share a name.
    #[error("command {command}: parameter {param} declared twice")]
    DuplicateParameter {
        /// Command name.
        command: String,
        /// Repeated parameter name.
        param: String,
    },
}

/// Failure of [`Invoker::invoke`](crate::Invoker::invoke).
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The line could not be turned into a call; the handler did not run.
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    /// The handler ran and failed.
    #[error(transparent)]
    Handler(HandlerError),
}
