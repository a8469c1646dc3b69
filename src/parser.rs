//! The parser facade: register record types against destinations, parse
//! once, read typed instances back out of a [`Namespace`].
//!
//! Registration is deferred. [`ArgumentParser::add_arguments`] only
//! records the request; wrappers are built, merged and compiled inside
//! [`ArgumentParser::parse_args`], which consumes the parser. Registering
//! the same record type against several destinations folds into one merged
//! wrapper: the options are declared once and the parsed values are
//! distributed across the destinations.

use std::any::{Any, TypeId};
use std::path::Path;

use indexmap::IndexMap;

use crate::engine::{CommandSpec, Engine, GnuEngine, OptionDecl, OptionGroup};
use crate::error::{ParseError, SchemaError, ValueError};
use crate::macros::debug;
use crate::record::Record;
use crate::schema::RecordSchema;
use crate::value::{Value, ValueMap};
use crate::wrappers::WrapperArena;

/// One deferred registration: a record type and the destinations it was
/// requested for, with an optional default instance per destination.
struct Request {
    type_id: TypeId,
    type_name: &'static str,
    schema: fn() -> RecordSchema,
    dests: Vec<String>,
    overlays: Vec<Option<ValueMap>>,
    construct: fn(&ValueMap) -> Result<Box<dyn Any>, ValueError>,
}

fn construct<T: Record>(values: &ValueMap) -> Result<Box<dyn Any>, ValueError> {
    Ok(Box::new(T::from_map(values)?))
}

/// Derives a command-line interface from registered record types.
pub struct ArgumentParser {
    prog: String,
    description: Option<String>,
    engine: Box<dyn Engine>,
    requests: Vec<Request>,
    extra_options: Vec<OptionDecl>,
}

impl Default for ArgumentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ArgumentParser {
    /// A parser named after the current executable, using the default
    /// [`GnuEngine`].
    pub fn new() -> Self {
        let prog = std::env::args()
            .next()
            .as_deref()
            .map(Path::new)
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| "program".to_string());
        Self::with_prog(prog)
    }

    /// A parser with an explicit program name.
    pub fn with_prog(prog: impl Into<String>) -> Self {
        Self {
            prog: prog.into(),
            description: None,
            engine: Box::new(GnuEngine::new()),
            requests: Vec::new(),
            extra_options: Vec::new(),
        }
    }

    /// Set the description shown at the top of the help text.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Replace the parsing engine.
    pub fn engine(mut self, engine: impl Engine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Register a record type against a destination. All fields of `T`
    /// (and of its nested records) become options; the parsed instance is
    /// stored in the namespace under `dest`.
    pub fn add_arguments<T: Record>(self, dest: impl Into<String>) -> Self {
        self.request::<T>(dest.into(), None)
    }

    /// Like [`add_arguments`], with a default instance whose field values
    /// replace the schema defaults for this destination.
    ///
    /// [`add_arguments`]: ArgumentParser::add_arguments
    pub fn add_arguments_with_default<T: Record>(
        self,
        dest: impl Into<String>,
        default: &T,
    ) -> Self {
        self.request::<T>(dest.into(), Some(default.to_map()))
    }

    fn request<T: Record>(mut self, dest: String, overlay: Option<ValueMap>) -> Self {
        let type_id = TypeId::of::<T>();
        if let Some(existing) = self.requests.iter_mut().find(|r| r.type_id == type_id) {
            existing.dests.push(dest);
            existing.overlays.push(overlay);
        } else {
            self.requests.push(Request {
                type_id,
                type_name: T::TYPE_NAME,
                schema: T::schema,
                dests: vec![dest],
                overlays: vec![overlay],
                construct: construct::<T>,
            });
        }
        self
    }

    /// Register a hand-built option outside any record type. Its parsed
    /// value lands in [`Namespace::extra`].
    pub fn add_option(mut self, decl: OptionDecl) -> Self {
        self.extra_options.push(decl);
        self
    }

    /// Build every registered wrapper, parse the arguments, and
    /// reconstruct one typed instance per destination.
    ///
    /// Consumes the parser, so nothing can be registered after parsing.
    pub fn parse_args<I, S>(self, args: I) -> Result<Namespace, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = args.into_iter().map(Into::into).collect();

        // Destinations must be unique across every registration.
        let mut seen: Vec<&str> = Vec::new();
        for request in &self.requests {
            for dest in &request.dests {
                if seen.contains(&dest.as_str()) {
                    return Err(SchemaError::new(
                        request.type_name,
                        format!("destination {dest:?} registered twice"),
                    )
                    .into());
                }
                seen.push(dest);
            }
        }

        let mut arena = WrapperArena::new();
        let mut roots = Vec::new();
        for request in &self.requests {
            let mut root = arena.build((request.schema)(), vec![request.dests[0].clone()])?;
            for dest in &request.dests[1..] {
                let other = arena.build((request.schema)(), vec![dest.clone()])?;
                root = arena.merge(root, other)?;
            }
            for (index, overlay) in request.overlays.iter().enumerate() {
                if let Some(values) = overlay {
                    arena.set_default(root, index, values)?;
                }
            }
            roots.push(root);
        }

        let mut spec = CommandSpec {
            prog: self.prog.clone(),
            description: self.description.clone(),
            groups: Vec::new(),
            subparsers: Vec::new(),
        };
        if !self.extra_options.is_empty() {
            spec.groups.push(OptionGroup {
                title: "options".to_string(),
                description: None,
                options: self.extra_options.clone(),
            });
        }
        for &root in &roots {
            arena.register(root, &mut spec)?;
        }

        let values = self.engine.parse(&spec, &argv)?;
        debug!("engine produced {} values", values.len());

        let mut namespace = Namespace::default();
        for (request, &root) in self.requests.iter().zip(&roots) {
            for (index, dest) in request.dests.iter().enumerate() {
                let map = arena.reconstruct(root, &values, index)?;
                let instance =
                    (request.construct)(&map).map_err(|source| ParseError::Build {
                        dest: dest.clone(),
                        source,
                    })?;
                namespace.records.insert(dest.clone(), instance);
            }
        }
        for decl in &self.extra_options {
            if let Some(value) = values.get(&decl.dest) {
                namespace.extras.insert(decl.dest.clone(), value.clone());
            }
        }
        Ok(namespace)
    }

    /// Parse the process arguments, printing help or a diagnostic and
    /// exiting on failure. Help exits with status 0, errors with status 2.
    pub fn parse_args_or_exit(self) -> Namespace {
        let prog = self.prog.clone();
        let argv: Vec<String> = std::env::args().skip(1).collect();
        match self.parse_args(argv) {
            Ok(namespace) => namespace,
            Err(error) => {
                if let Some(text) = error.help_text() {
                    print!("{text}");
                    std::process::exit(0);
                }
                eprintln!("{prog}: error: {error}");
                std::process::exit(2);
            }
        }
    }
}

/// The result of a parse: typed record instances by destination, plus the
/// values of hand-registered options.
#[derive(Default)]
pub struct Namespace {
    records: IndexMap<String, Box<dyn Any>>,
    extras: IndexMap<String, Value>,
}

impl Namespace {
    /// Borrow the instance parsed for a destination. `None` if the
    /// destination is unknown or holds a different type.
    pub fn get<T: Record>(&self, dest: &str) -> Option<&T> {
        self.records.get(dest)?.downcast_ref()
    }

    /// Remove and return the instance parsed for a destination.
    pub fn take<T: Record>(&mut self, dest: &str) -> Option<T> {
        let boxed = self.records.shift_remove(dest)?;
        match boxed.downcast::<T>() {
            Ok(instance) => Some(*instance),
            Err(boxed) => {
                self.records.insert(dest.to_string(), boxed);
                None
            }
        }
    }

    /// The registered destinations, in registration order.
    pub fn dests(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// The parsed value of a hand-registered option.
    pub fn extra(&self, dest: &str) -> Option<&Value> {
        self.extras.get(dest)
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespace")
            .field("dests", &self.records.keys().collect::<Vec<_>>())
            .field("extras", &self.extras)
            .finish()
    }
}
