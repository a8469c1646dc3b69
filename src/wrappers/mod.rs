//! The wrapper layer: compiles record schemas into engine option
//! declarations, and reconstructs typed value maps from parsed results.

pub mod field;
pub mod record;

pub use field::FieldWrapper;
pub use record::{RecordWrapper, WrapperArena, WrapperId};
