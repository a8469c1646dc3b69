//! Declaration macros for command-line record types.
//!
//! [`record!`] declares a struct together with its [`Record`] and
//! [`FieldType`] impls, capturing `///` doc comments into help text and
//! `= expr` field defaults into the schema. [`choice!`] declares a plain
//! enumeration selected by variant name, and [`union!`] a discriminated
//! union of record alternatives selected by subcommand.
//!
//! ```
//! use recli::{choice, record};
//!
//! choice! {
//!     /// Activation function.
//!     pub enum Activation { Relu, Tanh }
//! }
//!
//! record! {
//!     /// Training hyper-parameters.
//!     pub struct Hparams {
//!         /// Random seed.
//!         pub seed: i64 = 13,
//!         /// Learning rate.
//!         pub rate: f64,
//!         /// Nonlinearity between layers.
//!         pub activation: Activation = Activation::Relu,
//!     }
//! }
//! ```
//!
//! [`Record`]: crate::Record
//! [`FieldType`]: crate::FieldType

/// Declare a record type: a struct whose fields become command-line
/// options.
///
/// Field syntax is `name: Type` with two optional extensions: `= expr`
/// declares a default (making the option non-required), and `#[arg(skip)]`
/// keeps the field off the command line entirely (it then must have a
/// default).
#[macro_export]
macro_rules! record {
    (
        $(#[doc = $tydoc:literal])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $fdoc:literal])*
                $(#[arg($fskip:ident)])?
                $fvis:vis $fname:ident : $fty:ty $(= $fdefault:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[doc = $tydoc])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            $(
                $(#[doc = $fdoc])*
                $fvis $fname: $fty,
            )*
        }

        impl $crate::Record for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn schema() -> $crate::RecordSchema {
                let mut __schema =
                    $crate::RecordSchema::new(stringify!($name)).with_docs(&[$($tydoc),*]);
                $(
                    let __field = $crate::FieldSchema::new(
                        stringify!($fname),
                        <$fty as $crate::FieldType>::kind(),
                    )
                    .with_docs(&[$($fdoc),*]);
                    $(
                        let __field = {
                            let __default: $fty = $fdefault;
                            __field.with_default($crate::FieldType::to_value(&__default))
                        };
                    )?
                    $(
                        $crate::__expect_skip!($fskip);
                        let __field = __field.skip_cli();
                    )?
                    __schema = __schema.field(__field);
                )*
                __schema
            }

            fn from_map(
                __values: &$crate::ValueMap,
            ) -> ::std::result::Result<Self, $crate::ValueError> {
                ::std::result::Result::Ok(Self {
                    $(
                        $fname: $crate::__field_from_map!(
                            __values, $name, $fname, $fty $(, $fdefault)?
                        ),
                    )*
                })
            }

            fn to_map(&self) -> $crate::ValueMap {
                let mut __map = $crate::ValueMap::new();
                $(
                    __map.insert(
                        stringify!($fname).to_string(),
                        $crate::FieldType::to_value(&self.$fname),
                    );
                )*
                __map
            }
        }

        impl $crate::FieldType for $name {
            fn kind() -> $crate::ValueKind {
                $crate::ValueKind::Record(<$name as $crate::Record>::thunk())
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Map(<$name as $crate::Record>::to_map(self))
            }

            fn from_value(
                __value: &$crate::Value,
            ) -> ::std::result::Result<Self, $crate::ValueError> {
                let __map = __value.as_map().ok_or($crate::ValueError::TypeMismatch {
                    expected: "a record",
                    found: __value.type_label(),
                })?;
                <$name as $crate::Record>::from_map(__map)
            }
        }
    };
}

/// Declare an enumeration whose variants are selected by name on the
/// command line.
#[macro_export]
macro_rules! choice {
    (
        $(#[doc = $tydoc:literal])*
        $vis:vis enum $name:ident {
            $(
                $(#[doc = $vdoc:literal])*
                $variant:ident
            ),+ $(,)?
        }
    ) => {
        $(#[doc = $tydoc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $(
                $(#[doc = $vdoc])*
                $variant,
            )+
        }

        impl $crate::FieldType for $name {
            fn kind() -> $crate::ValueKind {
                $crate::ValueKind::Enum {
                    type_name: stringify!($name),
                    variants: &[$(stringify!($variant)),+],
                }
            }

            fn to_value(&self) -> $crate::Value {
                match self {
                    $(
                        $name::$variant => {
                            $crate::Value::String(stringify!($variant).to_string())
                        }
                    )+
                }
            }

            fn from_value(
                __value: &$crate::Value,
            ) -> ::std::result::Result<Self, $crate::ValueError> {
                let __name = __value.as_str().ok_or($crate::ValueError::TypeMismatch {
                    expected: "a variant name",
                    found: __value.type_label(),
                })?;
                $(
                    if __name == stringify!($variant) {
                        return ::std::result::Result::Ok($name::$variant);
                    }
                )+
                ::std::result::Result::Err($crate::ValueError::UnknownVariant {
                    type_name: stringify!($name),
                    given: __name.to_string(),
                    variants: vec![$(stringify!($variant).to_string()),+],
                })
            }
        }
    };
}

/// Declare a discriminated union of record alternatives. Each alternative
/// pairs the tag typed on the command line with the record type it wraps:
///
/// ```
/// use recli::{record, union};
///
/// record! {
///     /// Fully connected model.
///     pub struct Mlp { pub hidden_dim: i64 = 64 }
/// }
/// record! {
///     /// Convolutional model.
///     pub struct Conv { pub kernel: i64 = 3 }
/// }
///
/// union! {
///     /// Which model architecture to train.
///     pub enum Model {
///         "mlp" => Mlp(Mlp),
///         "conv" => Conv(Conv),
///     }
/// }
/// ```
#[macro_export]
macro_rules! union {
    (
        $(#[doc = $tydoc:literal])*
        $vis:vis enum $name:ident {
            $(
                $(#[doc = $vdoc:literal])*
                $tag:literal => $variant:ident ( $vrec:ty )
            ),+ $(,)?
        }
    ) => {
        $(#[doc = $tydoc])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $(
                $(#[doc = $vdoc])*
                $variant($vrec),
            )+
        }

        impl $crate::RecordUnion for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn variants() -> ::std::vec::Vec<$crate::UnionVariant> {
                vec![
                    $(
                        $crate::UnionVariant {
                            tag: $tag.to_string(),
                            docs: $crate::Docs::from_lines(&[$($vdoc),*]),
                            schema: <$vrec as $crate::Record>::thunk(),
                        },
                    )+
                ]
            }

            fn from_tagged(
                __tag: &str,
                __values: &$crate::ValueMap,
            ) -> ::std::result::Result<Self, $crate::ValueError> {
                $(
                    if __tag == $tag {
                        return ::std::result::Result::Ok($name::$variant(
                            <$vrec as $crate::Record>::from_map(__values)?,
                        ));
                    }
                )+
                ::std::result::Result::Err($crate::ValueError::UnknownVariant {
                    type_name: stringify!($name),
                    given: __tag.to_string(),
                    variants: vec![$($tag.to_string()),+],
                })
            }

            fn to_tagged(&self) -> (&'static str, $crate::ValueMap) {
                match self {
                    $(
                        $name::$variant(__inner) => {
                            ($tag, <$vrec as $crate::Record>::to_map(__inner))
                        }
                    )+
                }
            }
        }

        impl $crate::FieldType for $name {
            fn kind() -> $crate::ValueKind {
                $crate::ValueKind::Union(<$name as $crate::RecordUnion>::union_thunk())
            }

            fn to_value(&self) -> $crate::Value {
                $crate::union_to_value(self)
            }

            fn from_value(
                __value: &$crate::Value,
            ) -> ::std::result::Result<Self, $crate::ValueError> {
                $crate::union_from_value(__value)
            }
        }
    };
}

/// Rejects anything but `skip` inside `#[arg(...)]`.
#[doc(hidden)]
#[macro_export]
macro_rules! __expect_skip {
    (skip) => {};
}

/// Per-field extraction for generated `from_map` impls. Fields with a
/// declared default fall back to it when the entry is absent or holds the
/// sentinel; defaultless fields must be present.
#[doc(hidden)]
#[macro_export]
macro_rules! __field_from_map {
    ($values:expr, $tyname:ident, $fname:ident, $fty:ty) => {
        match $values.get(stringify!($fname)) {
            ::std::option::Option::Some(__v) => <$fty as $crate::FieldType>::from_value(__v)?,
            ::std::option::Option::None => {
                return ::std::result::Result::Err($crate::ValueError::MissingField {
                    type_name: stringify!($tyname),
                    field: stringify!($fname),
                })
            }
        }
    };
    ($values:expr, $tyname:ident, $fname:ident, $fty:ty, $default:expr) => {
        match $values.get(stringify!($fname)) {
            ::std::option::Option::Some(__v) if !__v.is_none() => {
                <$fty as $crate::FieldType>::from_value(__v)?
            }
            _ => $default,
        }
    };
}
