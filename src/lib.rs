#![warn(missing_docs)]
#![deny(unsafe_code)]
#![doc = include_str!("../README.md")]

pub(crate) mod macros;

mod declare;
pub mod engine;
pub mod error;
pub mod help;
pub mod parser;
pub mod record;
pub mod schema;
pub mod value;
pub mod wrappers;

pub use engine::{
    Arity, CommandSpec, Engine, FlatValues, GnuEngine, OptionDecl, OptionGroup, SubcommandDecl,
    SubparserGroup, ValueParser,
};
pub use error::{ParseError, SchemaError, UsageError, ValueError};
pub use parser::{ArgumentParser, Namespace};
pub use record::{
    union_from_value, union_to_value, FieldType, Record, RecordUnion, UNION_TAG_KEY,
};
pub use schema::{
    classify, Classification, Docs, FieldSchema, RecordSchema, ScalarKind, SchemaThunk,
    UnionThunk, UnionVariant, ValueKind,
};
pub use value::{Value, ValueMap};
pub use wrappers::{FieldWrapper, RecordWrapper, WrapperArena, WrapperId};
