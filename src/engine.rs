//! The underlying option engine: the declaration model record wrappers
//! compile themselves into, and the GNU-style long-flag implementation that
//! turns an argument vector into flat values.
//!
//! The engine knows nothing about record types. It sees [`OptionDecl`]s
//! grouped into [`OptionGroup`]s, plus [`SubparserGroup`]s for
//! subcommand-style dispatch, and produces a [`FlatValues`] map keyed by
//! destination. Everything type-shaped happens before (wrapper
//! compilation) or after (typed reconstruction).

use indexmap::IndexMap;

use crate::error::UsageError;
use crate::help;
use crate::macros::{debug, trace};
use crate::schema::ScalarKind;
use crate::value::Value;

// ============================================================================
// Declaration model
// ============================================================================

/// How many value tokens an option consumes per occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one value token.
    ExactlyOne,
    /// Zero or one value token; a bare occurrence yields the sentinel.
    ZeroOrOne,
    /// Any number of value tokens, collected into a list.
    ZeroOrMore,
    /// At least one value token, collected into a list.
    OneOrMore,
}

/// Token-to-value conversion for one option.
#[derive(Debug, Clone)]
pub enum ValueParser {
    /// Boolean literals (`yes`/`no`, `true`/`false`, `t`/`f`, `y`/`n`,
    /// `1`/`0`, case-insensitive).
    Bool,
    /// A single scalar token.
    Scalar(ScalarKind),
    /// One name out of a closed set.
    Choice(Vec<String>),
    /// Each token is one element of a list.
    Items(Box<ValueParser>),
    /// Each token is a whole list: either `[1,2,3]` or a
    /// whitespace-separated `1 2 3`.
    Packed(Box<ValueParser>),
}

impl ValueParser {
    /// Convert one token. `Items` converts the element (the engine builds
    /// the list); `Packed` converts a whole container.
    pub fn parse_token(&self, token: &str) -> Result<Value, String> {
        match self {
            ValueParser::Bool => str2bool(token)
                .map(Value::Bool)
                .ok_or_else(|| "a boolean".to_string()),
            ValueParser::Scalar(ScalarKind::Integer) => token
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| "an integer".to_string()),
            ValueParser::Scalar(ScalarKind::Float) => token
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| "a float".to_string()),
            ValueParser::Scalar(ScalarKind::String) | ValueParser::Scalar(ScalarKind::Other) => {
                Ok(Value::String(token.to_string()))
            }
            ValueParser::Choice(names) => {
                if names.iter().any(|n| n == token) {
                    Ok(Value::String(token.to_string()))
                } else {
                    Err(format!("one of: {}", names.join(", ")))
                }
            }
            ValueParser::Items(element) => element.parse_token(token),
            ValueParser::Packed(element) => {
                let inner = token.trim();
                let inner = inner
                    .strip_prefix('[')
                    .and_then(|s| s.strip_suffix(']'))
                    .unwrap_or(inner);
                let mut items = Vec::new();
                for piece in inner.split(|c: char| c == ',' || c.is_whitespace()) {
                    let piece = piece.trim();
                    if piece.is_empty() {
                        continue;
                    }
                    items.push(element.parse_token(piece)?);
                }
                Ok(Value::List(items))
            }
        }
    }

    /// Uppercase placeholder for help text.
    pub fn metavar(&self) -> String {
        match self {
            ValueParser::Bool => "BOOL".to_string(),
            ValueParser::Scalar(kind) => kind.metavar().to_string(),
            ValueParser::Choice(names) => format!("{{{}}}", names.join(",")),
            ValueParser::Items(element) | ValueParser::Packed(element) => element.metavar(),
        }
    }
}

/// One command-line option, fully compiled: where its value lands, how it
/// is spelled, and how tokens convert.
#[derive(Debug, Clone)]
pub struct OptionDecl {
    /// Dotted destination path the parsed value is stored under.
    pub dest: String,
    /// Display flag, `--kebab-case` with dots between nesting segments.
    pub flag: String,
    /// Tokens consumed per occurrence.
    pub arity: Arity,
    /// Token conversion.
    pub parser: ValueParser,
    /// Value used when the option never appears.
    pub default: Option<Value>,
    /// Whether omission is an error.
    pub required: bool,
    /// One-line help text.
    pub help: Option<String>,
}

/// A titled group of options, one per record wrapper.
#[derive(Debug, Clone)]
pub struct OptionGroup {
    /// Group title, `TypeName ['dest']`.
    pub title: String,
    /// Longer description under the title.
    pub description: Option<String>,
    /// The options in declaration order.
    pub options: Vec<OptionDecl>,
}

/// One alternative of a subcommand group.
#[derive(Debug, Clone)]
pub struct SubcommandDecl {
    /// The name typed on the command line.
    pub name: String,
    /// One-line help text.
    pub help: Option<String>,
    /// Option groups activated when this alternative is chosen.
    pub groups: Vec<OptionGroup>,
}

/// A subcommand-dispatched group: the first bare token selects one
/// alternative and splices its options in.
#[derive(Debug, Clone)]
pub struct SubparserGroup {
    /// Destination the chosen alternative's name is stored under.
    pub dest: String,
    /// Whether a choice must be made.
    pub required: bool,
    /// One-line help text.
    pub help: Option<String>,
    /// The alternatives in declaration order.
    pub commands: Vec<SubcommandDecl>,
}

impl SubparserGroup {
    /// The alternative names, for help and error text.
    pub fn command_names(&self) -> Vec<String> {
        self.commands.iter().map(|c| c.name.clone()).collect()
    }
}

/// Everything an engine needs to parse one command line.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// Program name for the usage line.
    pub prog: String,
    /// Program description for help text.
    pub description: Option<String>,
    /// Always-active option groups.
    pub groups: Vec<OptionGroup>,
    /// Subcommand groups, dispatched in declaration order.
    pub subparsers: Vec<SubparserGroup>,
}

// ============================================================================
// FlatValues
// ============================================================================

/// Parsed values keyed by destination, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FlatValues {
    values: IndexMap<String, Value>,
}

impl FlatValues {
    /// Look up the value stored for a destination.
    pub fn get(&self, dest: &str) -> Option<&Value> {
        self.values.get(dest)
    }

    /// Store a value, replacing any earlier one for the same destination.
    pub fn insert(&mut self, dest: impl Into<String>, value: Value) {
        self.values.insert(dest.into(), value);
    }

    /// Remove and return the value for a destination.
    pub fn remove(&mut self, dest: &str) -> Option<Value> {
        self.values.shift_remove(dest)
    }

    /// Iterate over `(dest, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of stored destinations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing was stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// The pluggable parsing backend.
///
/// Implementations own flag syntax, help rendering and the exit-code
/// policy; the wrapper layer only ever sees [`FlatValues`].
pub trait Engine {
    /// Parse an argument vector against a compiled command spec.
    fn parse(&self, spec: &CommandSpec, argv: &[String]) -> Result<FlatValues, UsageError>;
}

/// The default engine: GNU-style `--long-flag` options with `=`-attached
/// or space-separated values, `--` ending option parsing, and `--help`/
/// `-h` short-circuiting with rendered help text.
#[derive(Debug, Clone)]
pub struct GnuEngine {
    help_width: usize,
}

impl Default for GnuEngine {
    fn default() -> Self {
        Self { help_width: 80 }
    }
}

impl GnuEngine {
    /// An engine with the default help width.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the wrap width for help text.
    pub fn help_width(mut self, width: usize) -> Self {
        self.help_width = width;
        self
    }
}

impl Engine for GnuEngine {
    fn parse(&self, spec: &CommandSpec, argv: &[String]) -> Result<FlatValues, UsageError> {
        trace!("parsing {} tokens", argv.len());
        let mut options = IndexMap::new();
        collect_options(&spec.groups, &mut options)?;

        let mut values = FlatValues::default();
        let mut next_subparser = 0usize;
        let mut options_end = false;
        let mut i = 0usize;

        while i < argv.len() {
            let token = argv[i].as_str();
            i += 1;

            if !options_end {
                if token == "--help" || token == "-h" {
                    return Err(UsageError::HelpRequested {
                        text: help::render(spec, self.help_width),
                    });
                }
                if token == "--" {
                    options_end = true;
                    continue;
                }
            }

            if !options_end && token.starts_with("--") {
                let (flag, inline) = match token.split_once('=') {
                    Some((flag, value)) => (flag, Some(value)),
                    None => (token, None),
                };
                let decl = options
                    .get(flag)
                    .cloned()
                    .ok_or_else(|| UsageError::UnknownOption {
                        flag: flag.to_string(),
                    })?;
                let value = parse_occurrence(&decl, inline, argv, &mut i)?;
                values.insert(decl.dest.clone(), value);
                continue;
            }

            // A bare token selects the next pending subcommand.
            let Some(group) = spec.subparsers.get(next_subparser) else {
                return Err(UsageError::UnexpectedArgument {
                    token: token.to_string(),
                });
            };
            let Some(command) = group.commands.iter().find(|c| c.name == token) else {
                return Err(UsageError::UnknownSubcommand {
                    given: token.to_string(),
                    expected: group.command_names(),
                });
            };
            debug!("subcommand {} selected for {}", command.name, group.dest);
            values.insert(group.dest.clone(), Value::String(command.name.clone()));
            collect_options(&command.groups, &mut options)?;
            next_subparser += 1;
        }

        for group in &spec.subparsers[next_subparser..] {
            if group.required {
                return Err(UsageError::MissingSubcommand {
                    dest: group.dest.clone(),
                    expected: group.command_names(),
                });
            }
        }

        // Fill declared defaults and collect every missing required flag
        // into a single report. Options that are absent and have no default
        // stay out of the result, which is how later stages tell "never
        // supplied" from "supplied bare".
        let mut missing = Vec::new();
        for decl in options.values() {
            if values.get(&decl.dest).is_some() {
                continue;
            }
            match (&decl.default, decl.required) {
                (Some(default), _) => {
                    values.insert(decl.dest.clone(), default.clone());
                }
                (None, true) => missing.push(decl.flag.clone()),
                (None, false) => {}
            }
        }
        if !missing.is_empty() {
            return Err(UsageError::MissingRequired { flags: missing });
        }

        Ok(values)
    }
}

/// Register every option of `groups` by flag, rejecting collisions.
fn collect_options(
    groups: &[OptionGroup],
    into: &mut IndexMap<String, OptionDecl>,
) -> Result<(), UsageError> {
    for group in groups {
        for decl in &group.options {
            if into.insert(decl.flag.clone(), decl.clone()).is_some() {
                return Err(UsageError::DuplicateOption {
                    flag: decl.flag.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Consume the value tokens for one occurrence of `decl`, starting at
/// `argv[*i]`, and convert them.
fn parse_occurrence(
    decl: &OptionDecl,
    inline: Option<&str>,
    argv: &[String],
    i: &mut usize,
) -> Result<Value, UsageError> {
    let convert = |token: &str| {
        decl.parser
            .parse_token(token)
            .map_err(|expected| UsageError::InvalidValue {
                flag: decl.flag.clone(),
                token: token.to_string(),
                expected,
            })
    };

    match decl.arity {
        Arity::ExactlyOne => {
            let token = match inline {
                Some(token) => token.to_string(),
                None => take_value_token(argv, i).ok_or_else(|| UsageError::MissingValue {
                    flag: decl.flag.clone(),
                })?,
            };
            convert(&token)
        }
        Arity::ZeroOrOne => match inline {
            Some(token) => convert(token),
            None => match take_value_token(argv, i) {
                Some(token) => convert(&token),
                None => Ok(Value::None),
            },
        },
        Arity::ZeroOrMore | Arity::OneOrMore => {
            let mut items = Vec::new();
            if let Some(token) = inline {
                items.push(convert(token)?);
            } else {
                while let Some(token) = take_value_token(argv, i) {
                    items.push(convert(&token)?);
                }
            }
            if items.is_empty() {
                if decl.arity == Arity::OneOrMore {
                    return Err(UsageError::MissingValue {
                        flag: decl.flag.clone(),
                    });
                }
                // A bare boolean flag yields the sentinel; anything else
                // yields an empty list.
                if matches!(decl.parser, ValueParser::Bool) {
                    return Ok(Value::None);
                }
                return Ok(Value::List(Vec::new()));
            }
            if matches!(decl.parser, ValueParser::Bool) && items.len() == 1 {
                // A single boolean literal applies everywhere.
                return Ok(items.into_iter().next().unwrap_or(Value::None));
            }
            Ok(Value::List(items))
        }
    }
}

/// Take the next token if it is a value rather than an option or the
/// option terminator.
fn take_value_token(argv: &[String], i: &mut usize) -> Option<String> {
    let token = argv.get(*i)?;
    if token.starts_with("--") || token == "-h" {
        return None;
    }
    *i += 1;
    Some(token.clone())
}

/// The boolean literal set: `yes`/`no`, `true`/`false`, `t`/`f`, `y`/`n`,
/// `1`/`0`, case-insensitive.
fn str2bool(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Some(true),
        "no" | "false" | "f" | "n" | "0" => Some(false),
        _ => None,
    }
}
