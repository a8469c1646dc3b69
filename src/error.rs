//! Error types for schema construction, engine-level parsing, and typed
//! reconstruction.
//!
//! The split mirrors where failures occur:
//! - [`SchemaError`]: the record type itself is not a valid schema (caught at
//!   wrapper-build time, always a programming error);
//! - [`UsageError`]: the command line was malformed (the engine owns the
//!   usage text and the exit-code policy; help requests travel this path too);
//! - [`ValueError`]: a parsed value could not be coerced into the declared
//!   field type;
//! - [`ParseError`]: everything `parse_args` can return, wrapping the above.
//!
//! Nothing here retries or recovers: every failure either raises to the
//! caller or, at the thin CLI surface, terminates with a diagnostic.

use std::fmt;

// ============================================================================
// SchemaError
// ============================================================================

/// A record type could not be used as a command-line schema.
#[derive(Clone)]
pub struct SchemaError {
    /// Name of the offending record type.
    pub type_name: String,
    /// What was wrong with it.
    pub message: String,
}

impl SchemaError {
    /// Create a schema error for the named record type.
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid schema for `{}`: {}", self.type_name, self.message)
    }
}

impl fmt::Debug for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for SchemaError {}

// ============================================================================
// UsageError
// ============================================================================

/// An engine-level parse failure (or an explicit help request, which uses
/// the error path so it can short-circuit parsing).
#[derive(Clone)]
#[non_exhaustive]
pub enum UsageError {
    /// Help was requested via `--help` or `-h`.
    ///
    /// Not really an error; carries the rendered help text so the CLI
    /// surface can print it and exit 0.
    HelpRequested {
        /// The generated help text.
        text: String,
    },

    /// An option name that matches no declaration.
    UnknownOption {
        /// The flag as typed, e.g. `--sedd`.
        flag: String,
    },

    /// An option that needs a value reached the end of the argument list.
    MissingValue {
        /// The flag missing its value.
        flag: String,
    },

    /// A token could not be converted by the option's value parser.
    InvalidValue {
        /// The flag being parsed.
        flag: String,
        /// The offending token.
        token: String,
        /// What the parser expected ("a boolean", "an integer", ...).
        expected: String,
    },

    /// One or more required options were never supplied.
    MissingRequired {
        /// Display flags of every missing option.
        flags: Vec<String>,
    },

    /// A bare token that is neither a value for a pending option nor a
    /// known subcommand.
    UnexpectedArgument {
        /// The offending token.
        token: String,
    },

    /// A subcommand name that matches no registered alternative.
    UnknownSubcommand {
        /// The name as typed.
        given: String,
        /// The valid alternatives.
        expected: Vec<String>,
    },

    /// A required subcommand was never chosen.
    MissingSubcommand {
        /// Destination of the subcommand group.
        dest: String,
        /// The valid alternatives.
        expected: Vec<String>,
    },

    /// Two option declarations registered the same flag.
    DuplicateOption {
        /// The conflicting flag.
        flag: String,
    },
}

impl UsageError {
    /// True if this is a help request rather than a real error.
    pub fn is_help_request(&self) -> bool {
        matches!(self, UsageError::HelpRequested { .. })
    }

    /// If this is a help request, the rendered help text.
    pub fn help_text(&self) -> Option<&str> {
        match self {
            UsageError::HelpRequested { text } => Some(text),
            _ => None,
        }
    }

    /// Process exit status for this error at the CLI surface.
    pub fn exit_code(&self) -> i32 {
        if self.is_help_request() {
            0
        } else {
            2
        }
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::HelpRequested { text } => write!(f, "{text}"),
            UsageError::UnknownOption { flag } => write!(f, "unrecognized option: {flag}"),
            UsageError::MissingValue { flag } => write!(f, "option {flag} requires a value"),
            UsageError::InvalidValue {
                flag,
                token,
                expected,
            } => write!(f, "option {flag}: expected {expected}, got {token:?}"),
            UsageError::MissingRequired { flags } => {
                write!(f, "the following options are required: {}", flags.join(", "))
            }
            UsageError::UnexpectedArgument { token } => {
                write!(f, "unexpected argument: {token:?}")
            }
            UsageError::UnknownSubcommand { given, expected } => write!(
                f,
                "unknown command {given:?} (choose from {})",
                expected.join(", ")
            ),
            UsageError::MissingSubcommand { dest, expected } => write!(
                f,
                "a command is required for {dest:?} (choose from {})",
                expected.join(", ")
            ),
            UsageError::DuplicateOption { flag } => {
                write!(f, "conflicting option: {flag} registered twice")
            }
        }
    }
}

impl fmt::Debug for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for UsageError {}

// ============================================================================
// ValueError
// ============================================================================

/// A parsed value could not be coerced into the declared field type.
#[derive(Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValueError {
    /// The value had the wrong shape entirely.
    TypeMismatch {
        /// What the field type expected.
        expected: &'static str,
        /// What was found (a [`Value::type_label`]).
        ///
        /// [`Value::type_label`]: crate::Value::type_label
        found: &'static str,
    },

    /// An enumeration name with no matching variant.
    UnknownVariant {
        /// The enumeration type name.
        type_name: &'static str,
        /// The name that was given.
        given: String,
        /// Valid variant names.
        variants: Vec<String>,
    },

    /// A record map with no entry for a field.
    MissingField {
        /// The record type name.
        type_name: &'static str,
        /// The missing field.
        field: &'static str,
    },

    /// An integer that does not fit the target type.
    IntegerRange {
        /// The out-of-range value.
        value: i64,
        /// The target type name.
        target: &'static str,
    },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ValueError::UnknownVariant {
                type_name,
                given,
                variants,
            } => write!(
                f,
                "{given:?} is not a variant of {type_name} (choose from {})",
                variants.join(", ")
            ),
            ValueError::MissingField { type_name, field } => {
                write!(f, "missing value for field `{field}` of {type_name}")
            }
            ValueError::IntegerRange { value, target } => {
                write!(f, "{value} is out of range for {target}")
            }
        }
    }
}

impl fmt::Debug for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for ValueError {}

// ============================================================================
// ParseError
// ============================================================================

/// Everything [`ArgumentParser::parse_args`] can fail with.
///
/// [`ArgumentParser::parse_args`]: crate::ArgumentParser::parse_args
#[non_exhaustive]
pub enum ParseError {
    /// The schema itself was invalid.
    Schema(SchemaError),

    /// The engine rejected the command line (or help was requested).
    Usage(UsageError),

    /// A field type combination the wrapper cannot expose, e.g. a sequence
    /// of nested records. Surfaced at wrapper-build time, never degraded.
    UnsupportedType {
        /// Dotted path of the offending field.
        field: String,
        /// Why it is unsupported.
        reason: String,
    },

    /// A multi-instance field received a value count that is neither 1 nor
    /// the number of requested instances.
    InconsistentArguments {
        /// The field name.
        field: String,
        /// How many values were supplied.
        actual: usize,
        /// How many instances were requested.
        expected: usize,
    },

    /// A parsed value failed the reconstruction-time coercion for its field
    /// (e.g. a boolean field holding something that is neither the bare
    /// sentinel nor a boolean literal).
    ArgumentType {
        /// Dotted path of the field.
        field: String,
        /// What went wrong.
        message: String,
    },

    /// Constructing a typed record instance from its value map failed.
    Build {
        /// Destination the instance was meant for.
        dest: String,
        /// The underlying coercion error.
        source: ValueError,
    },

    /// A default mapping or instance carried keys that match no field or
    /// child of the record type.
    UnknownDefaultKeys {
        /// The unmatched keys, sorted.
        keys: Vec<String>,
        /// The record type name.
        type_name: String,
        /// Destination path of the wrapper the default was applied to.
        dest: String,
    },
}

impl ParseError {
    /// True if this wraps a help request.
    pub fn is_help_request(&self) -> bool {
        matches!(self, ParseError::Usage(u) if u.is_help_request())
    }

    /// If this wraps a help request, the rendered help text.
    pub fn help_text(&self) -> Option<&str> {
        match self {
            ParseError::Usage(u) => u.help_text(),
            _ => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Schema(e) => write!(f, "{e}"),
            ParseError::Usage(e) => write!(f, "{e}"),
            ParseError::UnsupportedType { field, reason } => {
                write!(f, "field `{field}` is not supported: {reason}")
            }
            ParseError::InconsistentArguments {
                field,
                actual,
                expected,
            } => write!(
                f,
                "the field '{field}' contains {actual} values, but either 1 or {expected} \
                 values were expected"
            ),
            ParseError::ArgumentType { field, message } => {
                write!(f, "field `{field}`: {message}")
            }
            ParseError::Build { dest, source } => {
                write!(f, "could not build record at {dest:?}: {source}")
            }
            ParseError::UnknownDefaultKeys {
                keys,
                type_name,
                dest,
            } => write!(
                f,
                "{keys:?} are not fields of {type_name} at path {dest:?}"
            ),
        }
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Schema(e) => Some(e),
            ParseError::Usage(e) => Some(e),
            ParseError::Build { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SchemaError> for ParseError {
    fn from(e: SchemaError) -> Self {
        ParseError::Schema(e)
    }
}

impl From<UsageError> for ParseError {
    fn from(e: UsageError) -> Self {
        ParseError::Usage(e)
    }
}
