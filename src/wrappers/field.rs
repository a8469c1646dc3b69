//! Field wrappers: the per-field compilation step from a [`FieldSchema`]
//! to the engine's [`OptionDecl`].
//!
//! A field wrapper owns the field's destination path, its display flag and
//! any per-instance default overlays applied by `set_default`. The actual
//! compilation happens in [`FieldWrapper::to_decl`], an exhaustive match
//! over the field's classification.

use heck::ToKebabCase;

use crate::engine::{Arity, OptionDecl, ValueParser};
use crate::error::ParseError;
use crate::schema::{classify, Classification, Docs, FieldSchema, ValueKind};
use crate::value::Value;

/// Display flag for a field path: each segment kebab-cased, segments
/// joined with dots. The path is relative to the registered record type,
/// so destinations never leak into flag names.
pub(crate) fn flag_for(path: &[String]) -> String {
    let kebab: Vec<String> = path.iter().map(|s| s.to_kebab_case()).collect();
    format!("--{}", kebab.join("."))
}

/// Destination key for a field path: snake segments joined with dots.
pub(crate) fn dest_for(path: &[String]) -> String {
    path.join(".")
}

/// One leaf field of a record wrapper.
#[derive(Debug, Clone)]
pub struct FieldWrapper {
    schema: FieldSchema,
    dest: String,
    flag: String,
    /// Per-instance default overrides, parallel to the owning wrapper's
    /// destinations. An entry wins over the schema default.
    overlays: Vec<Option<Value>>,
}

impl FieldWrapper {
    pub(crate) fn new(schema: FieldSchema, path: &[String], instances: usize) -> Self {
        Self {
            dest: dest_for(path),
            flag: flag_for(path),
            schema,
            overlays: vec![None; instances],
        }
    }

    /// The destination key this field's value is stored under.
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// The display flag.
    pub fn flag(&self) -> &str {
        &self.flag
    }

    /// The declared field name.
    pub fn name(&self) -> &'static str {
        self.schema.name()
    }

    /// The field's documentation.
    pub fn docs(&self) -> &Docs {
        self.schema.docs()
    }

    /// Whether the field appears on the command line at all.
    pub fn from_cli(&self) -> bool {
        self.schema.from_cli()
    }

    pub(crate) fn kind(&self) -> &ValueKind {
        self.schema.kind()
    }

    pub(crate) fn instances(&self) -> usize {
        self.overlays.len()
    }

    pub(crate) fn set_overlay(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.overlays.get_mut(index) {
            *slot = Some(value);
        }
    }

    pub(crate) fn absorb(&mut self, other: FieldWrapper) {
        self.overlays.extend(other.overlays);
    }

    /// The default in force for one instance: its overlay if set, the
    /// schema default otherwise.
    pub fn effective_default(&self, index: usize) -> Option<&Value> {
        self.overlays
            .get(index)
            .and_then(Option::as_ref)
            .or_else(|| self.schema.default())
    }

    /// True if any instance is left without a default.
    fn required(&self) -> bool {
        (0..self.overlays.len()).any(|i| self.effective_default(i).is_none())
    }

    /// The default every instance agrees on, if there is one. This is the
    /// only form the engine can fill on its own.
    fn shared_default(&self) -> Option<Value> {
        let first = self.effective_default(0)?;
        for i in 1..self.overlays.len() {
            if self.effective_default(i) != Some(first) {
                return None;
            }
        }
        Some(first.clone())
    }

    /// Compile into an engine option declaration.
    ///
    /// `multiple` is true when the owning wrapper serves several
    /// destinations: list arities switch to whole-container tokens and the
    /// engine-level default is suppressed so per-instance defaults can be
    /// resolved at reconstruction. `in_optional_group` suppresses both the
    /// default and the required marker, so an untouched optional subgroup
    /// stays fully absent.
    pub(crate) fn to_decl(
        &self,
        multiple: bool,
        in_optional_group: bool,
    ) -> Result<OptionDecl, ParseError> {
        let is_optional = matches!(classify(self.schema.kind()), Classification::Optional(_));
        let required = !in_optional_group && !is_optional && self.required();
        let default = if multiple || in_optional_group {
            None
        } else {
            self.shared_default()
        };

        let (arity, parser) = match classify(self.schema.kind()) {
            Classification::Bool => {
                let arity = match (multiple, required) {
                    (false, true) => Arity::ExactlyOne,
                    (false, false) => Arity::ZeroOrOne,
                    (true, true) => Arity::OneOrMore,
                    (true, false) => Arity::ZeroOrMore,
                };
                (arity, ValueParser::Bool)
            }
            Classification::Enum { variants, .. } => {
                (self.scalar_arity(multiple, required), choice_parser(variants))
            }
            Classification::Scalar(kind) => (
                self.scalar_arity(multiple, required),
                ValueParser::Scalar(kind),
            ),
            Classification::Sequence(element) => {
                let element = element_parser(element, &self.dest)?;
                (Arity::ZeroOrMore, seq_parser(element, multiple))
            }
            Classification::Optional(inner) => match classify(inner) {
                Classification::Sequence(element) => {
                    let element = element_parser(element, &self.dest)?;
                    (Arity::ZeroOrMore, seq_parser(element, multiple))
                }
                Classification::Bool => {
                    let arity = if multiple {
                        Arity::ZeroOrMore
                    } else {
                        Arity::ZeroOrOne
                    };
                    (arity, ValueParser::Bool)
                }
                _ => (
                    self.scalar_arity(multiple, false),
                    element_parser(inner, &self.dest)?,
                ),
            },
            Classification::NestedRecord(_)
            | Classification::RecordUnion(_)
            | Classification::DiscriminatedUnion { .. } => {
                return Err(ParseError::UnsupportedType {
                    field: self.dest.clone(),
                    reason: "record-typed fields are expanded by the record wrapper".to_string(),
                });
            }
        };

        Ok(OptionDecl {
            dest: self.dest.clone(),
            flag: self.flag.clone(),
            arity,
            parser,
            default,
            required,
            help: self.help_line(),
        })
    }

    fn scalar_arity(&self, multiple: bool, required: bool) -> Arity {
        match (multiple, required) {
            (false, _) => Arity::ExactlyOne,
            (true, true) => Arity::OneOrMore,
            (true, false) => Arity::ZeroOrMore,
        }
    }

    fn help_line(&self) -> Option<String> {
        let docs = self.schema.docs();
        docs.summary()
            .map(str::to_string)
            .or_else(|| docs.details().map(str::to_string))
    }
}

fn choice_parser(variants: &[&str]) -> ValueParser {
    ValueParser::Choice(variants.iter().map(|v| v.to_string()).collect())
}

fn seq_parser(element: ValueParser, multiple: bool) -> ValueParser {
    if multiple {
        // Each token is one whole container, one per instance.
        ValueParser::Packed(Box::new(element))
    } else {
        ValueParser::Items(Box::new(element))
    }
}

/// Token parser for a list element or optional payload. Only flat value
/// kinds qualify here.
fn element_parser(kind: &ValueKind, dest: &str) -> Result<ValueParser, ParseError> {
    match classify(kind) {
        Classification::Bool => Ok(ValueParser::Bool),
        Classification::Scalar(scalar) => Ok(ValueParser::Scalar(scalar)),
        Classification::Enum { variants, .. } => Ok(choice_parser(variants)),
        Classification::Sequence(_) | Classification::Optional(_) => {
            Err(ParseError::UnsupportedType {
                field: dest.to_string(),
                reason: "nested sequence and optional combinations are not supported".to_string(),
            })
        }
        Classification::NestedRecord(_)
        | Classification::RecordUnion(_)
        | Classification::DiscriminatedUnion { .. } => Err(ParseError::UnsupportedType {
            field: dest.to_string(),
            reason: "sequences of record types are not supported".to_string(),
        }),
    }
}
