//! The introspection seam: traits that expose a Rust type's command-line
//! schema and convert between typed instances and [`Value`] trees.
//!
//! [`FieldType`] covers anything that can sit in a record field: scalars,
//! strings, paths, sequences, optionals, enumerations, nested records and
//! discriminated unions. [`Record`] adds whole-record construction from a
//! [`ValueMap`]. [`RecordUnion`] is the tagged-alternative counterpart,
//! dispatched by the `_type_` key of its value map.
//!
//! Implementations for user types are normally generated by the
//! [`record!`], [`choice!`] and [`union!`] macros.
//!
//! [`record!`]: crate::record
//! [`choice!`]: crate::choice
//! [`union!`]: crate::union

use std::path::PathBuf;

use crate::error::ValueError;
use crate::schema::{RecordSchema, ScalarKind, SchemaThunk, UnionThunk, UnionVariant, ValueKind};
use crate::value::{Value, ValueMap};

// ============================================================================
// FieldType
// ============================================================================

/// A type that can be the value of a record field.
///
/// The three methods carry a type across the three phases: [`kind`] feeds
/// the classifier when the schema is built, [`to_value`] turns defaults and
/// whole instances into dynamic values, and [`from_value`] is the final
/// typed coercion after parsing.
///
/// [`kind`]: FieldType::kind
/// [`to_value`]: FieldType::to_value
/// [`from_value`]: FieldType::from_value
pub trait FieldType: Sized {
    /// The classification tag for this type.
    fn kind() -> ValueKind;

    /// Convert an instance into a dynamic value.
    fn to_value(&self) -> Value;

    /// Convert a dynamic value back into an instance.
    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

impl FieldType for bool {
    fn kind() -> ValueKind {
        ValueKind::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value.as_bool().ok_or(ValueError::TypeMismatch {
            expected: "a boolean",
            found: value.type_label(),
        })
    }
}

macro_rules! impl_field_type_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldType for $ty {
                fn kind() -> ValueKind {
                    ValueKind::Scalar(ScalarKind::Integer)
                }

                fn to_value(&self) -> Value {
                    Value::Integer(*self as i64)
                }

                fn from_value(value: &Value) -> Result<Self, ValueError> {
                    let raw = value.as_integer().ok_or(ValueError::TypeMismatch {
                        expected: "an integer",
                        found: value.type_label(),
                    })?;
                    <$ty>::try_from(raw).map_err(|_| ValueError::IntegerRange {
                        value: raw,
                        target: stringify!($ty),
                    })
                }
            }
        )*
    };
}

impl_field_type_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FieldType for f64 {
    fn kind() -> ValueKind {
        ValueKind::Scalar(ScalarKind::Float)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value.as_float().ok_or(ValueError::TypeMismatch {
            expected: "a float",
            found: value.type_label(),
        })
    }
}

impl FieldType for f32 {
    fn kind() -> ValueKind {
        ValueKind::Scalar(ScalarKind::Float)
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        let raw = value.as_float().ok_or(ValueError::TypeMismatch {
            expected: "a float",
            found: value.type_label(),
        })?;
        Ok(raw as f32)
    }
}

impl FieldType for String {
    fn kind() -> ValueKind {
        ValueKind::Scalar(ScalarKind::String)
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or(ValueError::TypeMismatch {
                expected: "a string",
                found: value.type_label(),
            })
    }
}

impl FieldType for PathBuf {
    fn kind() -> ValueKind {
        ValueKind::Scalar(ScalarKind::Other)
    }

    fn to_value(&self) -> Value {
        Value::String(self.display().to_string())
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value
            .as_str()
            .map(PathBuf::from)
            .ok_or(ValueError::TypeMismatch {
                expected: "a path",
                found: value.type_label(),
            })
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn kind() -> ValueKind {
        ValueKind::Sequence(Box::new(T::kind()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldType::to_value).collect())
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        let items = value.as_list().ok_or(ValueError::TypeMismatch {
            expected: "a list",
            found: value.type_label(),
        })?;
        items.iter().map(T::from_value).collect()
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn kind() -> ValueKind {
        ValueKind::Optional(Box::new(T::kind()))
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::None,
        }
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        if value.is_none() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

// ============================================================================
// Record
// ============================================================================

/// A record type whose fields become command-line options.
pub trait Record: Sized + 'static {
    /// The record's type name, as shown in group titles and errors.
    const TYPE_NAME: &'static str;

    /// The record's schema. Called once per registration; nested record
    /// fields are reached lazily through [`SchemaThunk`]s, so directly
    /// recursive types do not loop here.
    fn schema() -> RecordSchema;

    /// Build an instance from a fully resolved value map.
    ///
    /// Every command-line field is expected to be present; fields that are
    /// absent fall back to their declared default, and it is an error for a
    /// defaultless field to be missing.
    fn from_map(values: &ValueMap) -> Result<Self, ValueError>;

    /// Decompose an instance into a value map, one entry per field.
    fn to_map(&self) -> ValueMap;

    /// Deferred handle on this record's schema.
    fn thunk() -> SchemaThunk {
        SchemaThunk::new(Self::TYPE_NAME, Self::schema)
    }
}

// ============================================================================
// RecordUnion
// ============================================================================

/// Key under which a union value map stores its variant tag.
pub const UNION_TAG_KEY: &str = "_type_";

/// A closed set of tagged record alternatives, selected on the command line
/// by subcommand name.
///
/// Union values travel as [`Value::Map`]s carrying the chosen tag under
/// [`UNION_TAG_KEY`] next to the variant's own fields.
pub trait RecordUnion: Sized + 'static {
    /// The union's type name.
    const TYPE_NAME: &'static str;

    /// Every alternative, in declaration order.
    fn variants() -> Vec<UnionVariant>;

    /// Build the variant named `tag` from its field map.
    fn from_tagged(tag: &str, values: &ValueMap) -> Result<Self, ValueError>;

    /// Decompose into the active variant's tag and field map. The returned
    /// map does not include the tag entry.
    fn to_tagged(&self) -> (&'static str, ValueMap);

    /// Deferred handle on this union's variant list.
    fn union_thunk() -> UnionThunk {
        UnionThunk::new(Self::TYPE_NAME, Self::variants)
    }
}

/// Tagged-map encoding shared by every macro-generated union `FieldType`
/// impl.
pub fn union_to_value<U: RecordUnion>(union: &U) -> Value {
    let (tag, fields) = union.to_tagged();
    let mut map = ValueMap::with_capacity(fields.len() + 1);
    map.insert(UNION_TAG_KEY.to_string(), Value::String(tag.to_string()));
    map.extend(fields);
    Value::Map(map)
}

/// Inverse of [`union_to_value`].
pub fn union_from_value<U: RecordUnion>(value: &Value) -> Result<U, ValueError> {
    let map = value.as_map().ok_or(ValueError::TypeMismatch {
        expected: "a tagged record",
        found: value.type_label(),
    })?;
    let tag = map
        .get(UNION_TAG_KEY)
        .and_then(Value::as_str)
        .ok_or(ValueError::TypeMismatch {
            expected: "a tagged record",
            found: value.type_label(),
        })?;
    U::from_tagged(tag, map)
}
