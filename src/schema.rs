//! Schema representation for record types exposed on the command line.
//!
//! A [`RecordSchema`] is the introspected form of one record type: its
//! fields in declaration order, each with a name, a [`ValueKind`], an
//! optional default, and captured documentation. Schemas are plain data
//! produced by [`Record::schema`] (normally via the [`record!`] macro) and
//! consumed by the wrapper layer.
//!
//! Nested record types appear as [`SchemaThunk`]s — a function pointer that
//! yields the child schema on demand. Thunks are forced exactly once, at
//! wrapper-build time; classification itself never resolves anything.
//!
//! [`Record::schema`]: crate::Record::schema
//! [`record!`]: crate::record

use crate::error::SchemaError;
use crate::value::Value;
use std::collections::HashSet;
use std::fmt;

/// Maximum number of description lines kept for a record's argument group
/// when its fields already carry their own documentation. Without field
/// docs the whole description is used regardless of size.
pub(crate) const MAX_DESCRIPTION_LINES: usize = 50;

// ============================================================================
// Docs
// ============================================================================

/// Documentation captured from doc comments at declaration time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Docs {
    /// Short summary (first doc line).
    summary: Option<String>,
    /// Long-form details (remaining lines).
    details: Option<String>,
}

impl Docs {
    /// Build docs from raw doc-comment lines, first line becoming the
    /// summary and the rest the details.
    pub fn from_lines(lines: &[&str]) -> Self {
        if lines.is_empty() {
            return Docs::default();
        }

        let summary = lines
            .first()
            .map(|line| line.trim().to_string())
            .filter(|s| !s.is_empty());

        let details = if lines.len() > 1 {
            let mut buf = String::new();
            for line in &lines[1..] {
                if !buf.is_empty() {
                    buf.push('\n');
                }
                buf.push_str(line.trim());
            }
            if buf.is_empty() {
                None
            } else {
                Some(buf)
            }
        } else {
            None
        };

        Docs { summary, details }
    }

    /// The summary line, if any.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// The long-form details, if any.
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// True if neither summary nor details are present.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.details.is_none()
    }

    /// Summary and details joined for group descriptions.
    pub fn full_text(&self) -> Option<String> {
        match (&self.summary, &self.details) {
            (Some(s), Some(d)) => Some(format!("{s}\n{d}")),
            (Some(s), None) => Some(s.clone()),
            (None, Some(d)) => Some(d.clone()),
            (None, None) => None,
        }
    }
}

// ============================================================================
// ValueKind: the classifier's closed tag set
// ============================================================================

/// Scalar categories the engine knows how to parse from a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// Any integer type; tokens parse through `i64`.
    Integer,
    /// `f32`/`f64`; tokens parse through `f64`.
    Float,
    /// Strings; tokens pass through unchanged.
    String,
    /// Any other string-convertible type (paths and the like); tokens pass
    /// through unchanged and coercion happens in `FieldType::from_value`.
    Other,
}

impl ScalarKind {
    /// Uppercase metavar for help text.
    pub fn metavar(&self) -> &'static str {
        match self {
            ScalarKind::Integer => "INT",
            ScalarKind::Float => "FLOAT",
            ScalarKind::String => "STRING",
            ScalarKind::Other => "VALUE",
        }
    }
}

/// Deferred reference to a nested record type's schema.
///
/// The function pointer is the Rust rendering of a deferred type
/// annotation: it lets record types nest (and a schema mention itself)
/// without evaluation-order concerns. Resolution is an explicit pass in
/// wrapper construction.
#[derive(Clone, Copy)]
pub struct SchemaThunk {
    /// The nested record type's name.
    pub type_name: &'static str,
    /// Produces the nested schema when forced.
    pub schema: fn() -> RecordSchema,
}

impl SchemaThunk {
    /// Wrap a schema function for the named record type.
    pub fn new(type_name: &'static str, schema: fn() -> RecordSchema) -> Self {
        Self { type_name, schema }
    }

    /// Force the thunk, yielding the nested schema.
    pub fn resolve(&self) -> RecordSchema {
        (self.schema)()
    }
}

impl fmt::Debug for SchemaThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaThunk")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// One alternative of a discriminated union: the command-line tag that
/// selects it and the record schema it carries.
#[derive(Debug, Clone)]
pub struct UnionVariant {
    /// The discriminant value typed on the command line.
    pub tag: String,
    /// Documentation for this alternative.
    pub docs: Docs,
    /// Schema of the record this alternative wraps.
    pub schema: SchemaThunk,
}

/// Deferred reference to a discriminated union's alternatives.
#[derive(Clone, Copy)]
pub struct UnionThunk {
    /// The union type's name.
    pub type_name: &'static str,
    /// Produces the alternatives when forced.
    pub variants: fn() -> Vec<UnionVariant>,
}

impl UnionThunk {
    /// Wrap a variants function for the named union type.
    pub fn new(type_name: &'static str, variants: fn() -> Vec<UnionVariant>) -> Self {
        Self {
            type_name,
            variants,
        }
    }

    /// Force the thunk, yielding the alternatives.
    pub fn resolve(&self) -> Vec<UnionVariant> {
        (self.variants)()
    }
}

impl fmt::Debug for UnionThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionThunk")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// The closed set of type categories a field can have.
///
/// Produced statically per field type by [`FieldType::kind`]; every
/// declared type maps to exactly one tag, and the wrapper layer matches on
/// the [`classify`] projection exhaustively.
///
/// [`FieldType::kind`]: crate::FieldType::kind
#[derive(Debug, Clone)]
pub enum ValueKind {
    /// A boolean flag.
    Bool,
    /// A single scalar value.
    Scalar(ScalarKind),
    /// An enumeration selected by variant name.
    Enum {
        /// The enumeration type's name.
        type_name: &'static str,
        /// Variant names, in declaration order.
        variants: &'static [&'static str],
    },
    /// A homogeneous sequence.
    Sequence(Box<ValueKind>),
    /// An optional value.
    Optional(Box<ValueKind>),
    /// A nested record.
    Record(SchemaThunk),
    /// A discriminated union of record alternatives.
    Union(UnionThunk),
}

// ============================================================================
// Classification
// ============================================================================

/// The classifier's verdict for one declared field type.
///
/// This is a projection of [`ValueKind`] that makes the wrapper-relevant
/// distinctions explicit: an optional nested record is a *subgroup*
/// ([`Classification::RecordUnion`]), a union is a *subparser*
/// ([`Classification::DiscriminatedUnion`]), and everything else keeps its
/// tag.
#[derive(Debug)]
pub enum Classification<'k> {
    /// A boolean flag.
    Bool,
    /// An enumeration selected by variant name.
    Enum {
        /// The enumeration type's name.
        type_name: &'static str,
        /// Variant names.
        variants: &'static [&'static str],
    },
    /// A sequence of element values.
    Sequence(&'k ValueKind),
    /// An optional non-record value.
    Optional(&'k ValueKind),
    /// A required nested record.
    NestedRecord(&'k SchemaThunk),
    /// An optional nested record chosen by presence of its options
    /// (a "subgroup").
    RecordUnion(&'k SchemaThunk),
    /// A union whose discriminant selects one alternative record schema at
    /// parse time (a "subparser").
    DiscriminatedUnion {
        /// The union's alternatives.
        union: &'k UnionThunk,
        /// Whether the field tolerates no choice being made.
        optional: bool,
    },
    /// Any other single scalar value.
    Scalar(ScalarKind),
}

/// Classify a declared field type.
///
/// Total over [`ValueKind`]; decision order matters and mirrors the
/// contract: booleans before generic scalars, enumerations before
/// sequences, and a record found inside an `Optional` wrapper becomes a
/// subgroup rather than a plain optional.
pub fn classify(kind: &ValueKind) -> Classification<'_> {
    match kind {
        ValueKind::Bool => Classification::Bool,
        ValueKind::Enum {
            type_name,
            variants,
        } => Classification::Enum {
            type_name: *type_name,
            variants: *variants,
        },
        ValueKind::Sequence(element) => Classification::Sequence(element),
        ValueKind::Optional(inner) => match inner.as_ref() {
            ValueKind::Record(thunk) => Classification::RecordUnion(thunk),
            ValueKind::Union(union) => Classification::DiscriminatedUnion {
                union,
                optional: true,
            },
            other => Classification::Optional(other),
        },
        ValueKind::Record(thunk) => Classification::NestedRecord(thunk),
        ValueKind::Union(union) => Classification::DiscriminatedUnion {
            union,
            optional: false,
        },
        ValueKind::Scalar(scalar) => Classification::Scalar(*scalar),
    }
}

// ============================================================================
// FieldSchema / RecordSchema
// ============================================================================

/// Schema for a single field of a record type.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: &'static str,
    docs: Docs,
    kind: ValueKind,
    default: Option<Value>,
    from_cli: bool,
}

impl FieldSchema {
    /// Declare a field with the given name and type category.
    pub fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            docs: Docs::default(),
            kind,
            default: None,
            from_cli: true,
        }
    }

    /// Attach doc-comment lines.
    pub fn with_docs(mut self, lines: &[&str]) -> Self {
        self.docs = Docs::from_lines(lines);
        self
    }

    /// Attach a declared default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Exclude this field from the command line entirely. Such fields must
    /// carry a default (checked by [`RecordSchema::validate`]).
    pub fn skip_cli(mut self) -> Self {
        self.from_cli = false;
        self
    }

    /// The field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Captured documentation.
    pub fn docs(&self) -> &Docs {
        &self.docs
    }

    /// The declared type category.
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// The declared default, if any. Absence means the field is required.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the field is exposed on the command line.
    pub fn from_cli(&self) -> bool {
        self.from_cli
    }
}

/// Schema for a whole record type: ordered fields plus documentation.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    type_name: &'static str,
    docs: Docs,
    fields: Vec<FieldSchema>,
}

impl RecordSchema {
    /// Start a schema for the named record type.
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            docs: Docs::default(),
            fields: Vec::new(),
        }
    }

    /// Attach doc-comment lines for the record type itself.
    pub fn with_docs(mut self, lines: &[&str]) -> Self {
        self.docs = Docs::from_lines(lines);
        self
    }

    /// Append a field, preserving declaration order.
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// The record type's name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The record type's documentation.
    pub fn docs(&self) -> &Docs {
        &self.docs
    }

    /// All fields in declaration order, including CLI-excluded ones.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Fields exposed on the command line, in declaration order.
    pub fn cli_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.from_cli)
    }

    /// Look up a field by name.
    pub fn field_named(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check structural validity: non-empty unique field names, and
    /// CLI-excluded fields carrying a default.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(SchemaError::new(self.type_name, "field with an empty name"));
            }
            if !seen.insert(field.name) {
                return Err(SchemaError::new(
                    self.type_name,
                    format!("duplicate field name `{}`", field.name),
                ));
            }
            if !field.from_cli && field.default.is_none() {
                return Err(SchemaError::new(
                    self.type_name,
                    format!(
                        "field `{}` is excluded from the command line but has no default",
                        field.name
                    ),
                ));
            }
        }
        Ok(())
    }
}
