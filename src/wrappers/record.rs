//! Record wrappers: one node per record type occurrence, held in an arena.
//!
//! Building a wrapper resolves every schema thunk exactly once and walks
//! the record tree depth-first in declaration order. Nodes reference their
//! parent and children by [`WrapperId`], so the tree is cycle-free by
//! construction and cheap to traverse in both directions.
//!
//! A wrapper serves one or more destinations. With several destinations
//! every option is declared once (same flags, list arities) and the parsed
//! values are distributed across instances at reconstruction time.

use crate::engine::{CommandSpec, FlatValues, OptionGroup, SubcommandDecl, SubparserGroup};
use crate::error::{ParseError, SchemaError};
use crate::macros::trace;
use crate::record::UNION_TAG_KEY;
use crate::schema::{classify, Classification, Docs, RecordSchema, MAX_DESCRIPTION_LINES};
use crate::value::{Value, ValueMap};
use crate::wrappers::field::FieldWrapper;

/// Index of a wrapper node in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapperId(usize);

/// A discriminated-union field: dispatched as a subcommand group, with one
/// fully built wrapper subtree per alternative.
#[derive(Debug)]
struct UnionField {
    field_name: &'static str,
    dest: String,
    docs: Docs,
    optional: bool,
    /// Tagged map used when no command is chosen, from the field default
    /// or a `set_default` overlay.
    default: Option<Value>,
    /// `(tag, docs, subtree)` per alternative, in declaration order.
    variants: Vec<(String, Docs, WrapperId)>,
}

/// One record type occurrence: its leaf fields, nested records and union
/// fields, plus the destinations it serves.
#[derive(Debug)]
pub struct RecordWrapper {
    parent: Option<WrapperId>,
    /// Name of the field this wrapper came from; `None` for roots.
    field_name: Option<&'static str>,
    field_docs: Docs,
    type_name: &'static str,
    record_docs: Docs,
    /// True inside an `Option<Record>` subtree: nothing is required and
    /// presence of any option decides whether the record exists.
    optional: bool,
    destinations: Vec<String>,
    fields: Vec<FieldWrapper>,
    unions: Vec<UnionField>,
    children: Vec<WrapperId>,
}

impl RecordWrapper {
    /// The record type's name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The wrapper this one is nested under, if any.
    pub fn parent(&self) -> Option<WrapperId> {
        self.parent
    }

    /// True when this wrapper serves several destinations.
    pub fn multiple(&self) -> bool {
        self.destinations.len() > 1
    }

    /// The leaf fields, in declaration order.
    pub fn fields(&self) -> &[FieldWrapper] {
        &self.fields
    }

    /// Group title: the type name plus the quoted destinations,
    /// `Point ['p1', 'p2']`.
    pub fn title(&self) -> String {
        let quoted: Vec<String> = self
            .destinations
            .iter()
            .map(|d| format!("'{d}'"))
            .collect();
        format!("{} [{}]", self.type_name, quoted.join(", "))
    }

    /// Group description: the originating field's docs for nested
    /// wrappers, the record type's docs otherwise. When the fields carry
    /// their own docs the description is capped at
    /// [`MAX_DESCRIPTION_LINES`] lines.
    pub fn description(&self) -> Option<String> {
        let text = if self.field_name.is_some() {
            self.field_docs
                .full_text()
                .or_else(|| self.record_docs.full_text())?
        } else {
            self.record_docs.full_text()?
        };
        if self.fields.iter().any(|f| !f.docs().is_empty()) {
            let lines: Vec<&str> = text.lines().collect();
            if lines.len() > MAX_DESCRIPTION_LINES {
                let mut capped = lines[..MAX_DESCRIPTION_LINES].join("\n");
                capped.push_str(" ...");
                return Some(capped);
            }
        }
        Some(text)
    }
}

/// Arena of wrapper nodes. All tree operations go through the arena so
/// parent and child references stay plain indices.
#[derive(Debug, Default)]
pub struct WrapperArena {
    nodes: Vec<RecordWrapper>,
}

impl WrapperArena {
    /// An empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow a wrapper node.
    pub fn get(&self, id: WrapperId) -> &RecordWrapper {
        &self.nodes[id.0]
    }

    /// Build the wrapper tree for a root record schema serving the given
    /// destinations.
    pub fn build(
        &mut self,
        schema: RecordSchema,
        destinations: Vec<String>,
    ) -> Result<WrapperId, ParseError> {
        self.build_node(BuildSite {
            schema,
            destinations,
            path: Vec::new(),
            parent: None,
            field_name: None,
            field_docs: Docs::default(),
            optional: false,
            in_union: false,
        })
    }

    fn build_node(&mut self, site: BuildSite) -> Result<WrapperId, ParseError> {
        let BuildSite {
            schema,
            destinations,
            path,
            parent,
            field_name,
            field_docs,
            optional,
            in_union,
        } = site;
        schema.validate()?;
        trace!("building wrapper for {}", schema.type_name());

        let instances = destinations.len();
        let id = WrapperId(self.nodes.len());
        self.nodes.push(RecordWrapper {
            parent,
            field_name,
            field_docs,
            type_name: schema.type_name(),
            record_docs: schema.docs().clone(),
            optional,
            destinations: destinations.clone(),
            fields: Vec::new(),
            unions: Vec::new(),
            children: Vec::new(),
        });

        let mut fields = Vec::new();
        let mut unions = Vec::new();
        let mut children = Vec::new();

        for field in schema.fields() {
            let mut field_path = path.clone();
            field_path.push(field.name().to_string());
            let field_dest = field_path.join(".");

            match classify(field.kind()) {
                Classification::NestedRecord(thunk) => {
                    let child = self.build_node(BuildSite {
                        schema: thunk.resolve(),
                        destinations: child_destinations(&destinations, field.name()),
                        path: field_path,
                        parent: Some(id),
                        field_name: Some(field.name()),
                        field_docs: field.docs().clone(),
                        optional,
                        in_union,
                    })?;
                    if let Some(Value::Map(overlay)) = field.default() {
                        let overlay = overlay.clone();
                        for index in 0..instances {
                            self.set_default(child, index, &overlay)?;
                        }
                    }
                    children.push(child);
                }
                Classification::RecordUnion(thunk) => {
                    let child = self.build_node(BuildSite {
                        schema: thunk.resolve(),
                        destinations: child_destinations(&destinations, field.name()),
                        path: field_path,
                        parent: Some(id),
                        field_name: Some(field.name()),
                        field_docs: field.docs().clone(),
                        optional: true,
                        in_union,
                    })?;
                    if let Some(Value::Map(overlay)) = field.default() {
                        let overlay = overlay.clone();
                        for index in 0..instances {
                            self.set_default(child, index, &overlay)?;
                        }
                    }
                    children.push(child);
                }
                Classification::DiscriminatedUnion {
                    union,
                    optional: field_optional,
                } => {
                    if instances > 1 {
                        return Err(ParseError::UnsupportedType {
                            field: field_dest,
                            reason: "subcommand fields cannot serve multiple destinations"
                                .to_string(),
                        });
                    }
                    if in_union {
                        return Err(ParseError::UnsupportedType {
                            field: field_dest,
                            reason: "subcommands cannot nest inside subcommands".to_string(),
                        });
                    }
                    let mut variants = Vec::new();
                    for variant in union.resolve() {
                        let subtree = self.build_node(BuildSite {
                            schema: variant.schema.resolve(),
                            destinations: child_destinations(&destinations, field.name()),
                            path: field_path.clone(),
                            parent: Some(id),
                            field_name: Some(field.name()),
                            field_docs: variant.docs.clone(),
                            optional,
                            in_union: true,
                        })?;
                        variants.push((variant.tag, variant.docs, subtree));
                    }
                    unions.push(UnionField {
                        field_name: field.name(),
                        dest: field_dest,
                        docs: field.docs().clone(),
                        optional: field_optional || optional,
                        default: field.default().cloned().filter(|d| !d.is_none()),
                        variants,
                    });
                }
                Classification::Sequence(element)
                    if matches!(
                        classify(element),
                        Classification::NestedRecord(_)
                            | Classification::RecordUnion(_)
                            | Classification::DiscriminatedUnion { .. }
                    ) =>
                {
                    return Err(ParseError::UnsupportedType {
                        field: field_dest,
                        reason: "sequences of record types are not supported".to_string(),
                    });
                }
                _ => {
                    fields.push(FieldWrapper::new(field.clone(), &field_path, instances));
                }
            }
        }

        let node = &mut self.nodes[id.0];
        node.fields = fields;
        node.unions = unions;
        node.children = children;
        Ok(id)
    }

    /// Every destination this subtree serves, the wrapper's own first and
    /// then each nested record's, depth first.
    pub fn destinations(&self, id: WrapperId) -> Vec<String> {
        let node = self.get(id);
        let mut out = node.destinations.clone();
        for &child in &node.children {
            out.extend(self.destinations(child));
        }
        out
    }

    /// Merge another wrapper of the same record type into `into`,
    /// concatenating destinations and per-instance defaults. The children
    /// of both wrappers must line up pairwise.
    pub fn merge(&mut self, into: WrapperId, from: WrapperId) -> Result<WrapperId, ParseError> {
        let (a_type, a_dests) = {
            let a = self.get(into);
            (a.type_name, a.destinations.clone())
        };
        let b = self.get(from);
        if a_type != b.type_name {
            return Err(SchemaError::new(
                a_type,
                format!("cannot merge with wrapper of type `{}`", b.type_name),
            )
            .into());
        }
        if let Some(dup) = b.destinations.iter().find(|d| a_dests.contains(d)) {
            return Err(SchemaError::new(
                a_type,
                format!("destination {dup:?} registered twice"),
            )
            .into());
        }
        if !self.get(into).unions.is_empty() || !b.unions.is_empty() {
            return Err(ParseError::UnsupportedType {
                field: a_dests.first().cloned().unwrap_or_default(),
                reason: "subcommand fields cannot serve multiple destinations".to_string(),
            });
        }
        if self.get(into).fields.len() != b.fields.len()
            || self.get(into).children.len() != b.children.len()
        {
            return Err(SchemaError::new(
                a_type,
                "wrappers to merge have diverging structure",
            )
            .into());
        }

        let from_node = &mut self.nodes[from.0];
        let b_dests = std::mem::take(&mut from_node.destinations);
        let b_fields = std::mem::take(&mut from_node.fields);
        let b_children = std::mem::take(&mut from_node.children);

        self.nodes[into.0].destinations.extend(b_dests);
        for (field, other) in self.nodes[into.0].fields.iter_mut().zip(b_fields) {
            field.absorb(other);
        }
        let a_children = self.nodes[into.0].children.clone();
        for (&a_child, b_child) in a_children.iter().zip(b_children) {
            self.merge(a_child, b_child)?;
        }
        Ok(into)
    }

    /// Apply a default mapping to instance `index`: keys naming leaf
    /// fields override their defaults, keys naming nested records recurse,
    /// the [`UNION_TAG_KEY`] entry is tolerated and dropped, and anything
    /// left over is an error.
    pub fn set_default(
        &mut self,
        id: WrapperId,
        index: usize,
        values: &ValueMap,
    ) -> Result<(), ParseError> {
        enum Target {
            Field(usize),
            Child(WrapperId),
            Union(usize),
        }

        let mut plan = Vec::new();
        let mut leftovers = Vec::new();
        {
            let node = self.get(id);
            for (key, value) in values {
                if key == UNION_TAG_KEY {
                    continue;
                }
                if let Some(fi) = node.fields.iter().position(|f| f.name() == key.as_str()) {
                    plan.push((Target::Field(fi), value.clone()));
                } else if let Some(&child) = node
                    .children
                    .iter()
                    .find(|&&c| self.get(c).field_name == Some(key.as_str()))
                {
                    plan.push((Target::Child(child), value.clone()));
                } else if let Some(ui) = node
                    .unions
                    .iter()
                    .position(|u| u.field_name == key.as_str())
                {
                    plan.push((Target::Union(ui), value.clone()));
                } else {
                    leftovers.push(key.clone());
                }
            }
            if !leftovers.is_empty() {
                leftovers.sort();
                return Err(ParseError::UnknownDefaultKeys {
                    keys: leftovers,
                    type_name: node.type_name.to_string(),
                    dest: node.destinations.get(index).cloned().unwrap_or_default(),
                });
            }
        }

        for (target, value) in plan {
            match target {
                Target::Field(fi) => self.nodes[id.0].fields[fi].set_overlay(index, value),
                Target::Child(child) => match value {
                    Value::Map(map) => self.set_default(child, index, &map)?,
                    Value::None => {}
                    other => {
                        let field = self
                            .get(child)
                            .field_name
                            .unwrap_or_default()
                            .to_string();
                        return Err(ParseError::ArgumentType {
                            field,
                            message: format!(
                                "default must be a record value, got {}",
                                other.type_label()
                            ),
                        });
                    }
                },
                Target::Union(ui) => {
                    self.nodes[id.0].unions[ui].default = Some(value);
                }
            }
        }
        Ok(())
    }

    /// Compile the subtree into engine declarations and append them to the
    /// command spec.
    pub fn register(&self, id: WrapperId, spec: &mut CommandSpec) -> Result<(), ParseError> {
        let (groups, subparsers) = self.compile(id)?;
        spec.groups.extend(groups);
        spec.subparsers.extend(subparsers);
        Ok(())
    }

    fn compile(
        &self,
        id: WrapperId,
    ) -> Result<(Vec<OptionGroup>, Vec<SubparserGroup>), ParseError> {
        let node = self.get(id);
        let multiple = node.multiple();

        let mut options = Vec::new();
        for field in &node.fields {
            if !field.from_cli() {
                continue;
            }
            options.push(field.to_decl(multiple, node.optional)?);
        }
        let mut groups = vec![OptionGroup {
            title: node.title(),
            description: node.description(),
            options,
        }];
        let mut subparsers = Vec::new();

        for &child in &node.children {
            let (child_groups, child_subparsers) = self.compile(child)?;
            groups.extend(child_groups);
            subparsers.extend(child_subparsers);
        }

        for union in &node.unions {
            let mut commands = Vec::new();
            for (tag, docs, subtree) in &union.variants {
                let (variant_groups, variant_subparsers) = self.compile(*subtree)?;
                debug_assert!(variant_subparsers.is_empty());
                commands.push(SubcommandDecl {
                    name: tag.clone(),
                    help: docs.summary().map(str::to_string),
                    groups: variant_groups,
                });
            }
            subparsers.push(SubparserGroup {
                dest: union.dest.clone(),
                required: !union.optional && union.default.is_none(),
                help: union.docs.summary().map(str::to_string),
                commands,
            });
        }

        Ok((groups, subparsers))
    }

    /// Rebuild the value map for instance `index` of this wrapper from the
    /// engine's flat values, distributing list values across instances and
    /// resolving the bare-flag sentinel.
    pub fn reconstruct(
        &self,
        id: WrapperId,
        flat: &FlatValues,
        index: usize,
    ) -> Result<ValueMap, ParseError> {
        let node = self.get(id);
        let instances = node.destinations.len();
        let mut map = ValueMap::new();

        for field in &node.fields {
            let raw = if field.from_cli() {
                flat.get(field.dest())
            } else {
                None
            };
            if let Some(value) = resolve_field(field, raw, index, instances)? {
                map.insert(field.name().to_string(), value);
            }
        }

        for &child in &node.children {
            let child_node = self.get(child);
            let Some(name) = child_node.field_name else {
                continue;
            };
            if child_node.optional && !self.subtree_supplied(child, flat) {
                map.insert(name.to_string(), Value::None);
            } else {
                let child_map = self.reconstruct(child, flat, index)?;
                map.insert(name.to_string(), Value::Map(child_map));
            }
        }

        for union in &node.unions {
            let chosen = flat.get(&union.dest).and_then(Value::as_str);
            match chosen {
                Some(tag) => {
                    let Some((_, _, subtree)) =
                        union.variants.iter().find(|(t, _, _)| t == tag)
                    else {
                        return Err(ParseError::ArgumentType {
                            field: union.dest.clone(),
                            message: format!("{tag:?} matches no known command"),
                        });
                    };
                    let fields = self.reconstruct(*subtree, flat, 0)?;
                    let mut tagged = ValueMap::with_capacity(fields.len() + 1);
                    tagged.insert(UNION_TAG_KEY.to_string(), Value::String(tag.to_string()));
                    tagged.extend(fields);
                    map.insert(union.field_name.to_string(), Value::Map(tagged));
                }
                None => {
                    if let Some(default) = &union.default {
                        map.insert(union.field_name.to_string(), default.clone());
                    } else {
                        map.insert(union.field_name.to_string(), Value::None);
                    }
                }
            }
        }

        Ok(map)
    }

    /// True if any option in the subtree was supplied on the command line.
    /// Inside optional subtrees the engine never fills defaults, so
    /// presence in the flat values means the user typed something.
    fn subtree_supplied(&self, id: WrapperId, flat: &FlatValues) -> bool {
        let node = self.get(id);
        node.fields
            .iter()
            .any(|f| f.from_cli() && flat.get(f.dest()).is_some())
            || node.unions.iter().any(|u| flat.get(&u.dest).is_some())
            || node
                .children
                .iter()
                .any(|&c| self.subtree_supplied(c, flat))
    }
}

/// Per-field inputs to [`WrapperArena::build_node`].
struct BuildSite {
    schema: RecordSchema,
    destinations: Vec<String>,
    path: Vec<String>,
    parent: Option<WrapperId>,
    field_name: Option<&'static str>,
    field_docs: Docs,
    optional: bool,
    in_union: bool,
}

fn child_destinations(destinations: &[String], field: &str) -> Vec<String> {
    destinations.iter().map(|d| format!("{d}.{field}")).collect()
}

/// Resolve the final value of one leaf field for one instance.
fn resolve_field(
    field: &FieldWrapper,
    raw: Option<&Value>,
    index: usize,
    instances: usize,
) -> Result<Option<Value>, ParseError> {
    // Distribute list values across instances first: one value is shared,
    // a matching count is positional, anything else is inconsistent.
    let value = match raw {
        None => None,
        Some(v) if instances > 1 => match v {
            Value::List(items) if !items.is_empty() => {
                if items.len() == 1 {
                    items.first().cloned()
                } else if items.len() == instances {
                    items.get(index).cloned()
                } else {
                    return Err(ParseError::InconsistentArguments {
                        field: field.name().to_string(),
                        actual: items.len(),
                        expected: instances,
                    });
                }
            }
            other => Some(other.clone()),
        },
        Some(v) => Some(v.clone()),
    };

    let classification = classify(field.kind());
    // Optional(Bool) follows the flag convention too: a bare occurrence
    // still means "flip it".
    let is_bool = match &classification {
        Classification::Bool => true,
        Classification::Optional(inner) => matches!(classify(inner), Classification::Bool),
        _ => false,
    };
    let is_optional = matches!(classification, Classification::Optional(_));
    let default = field.effective_default(index).cloned();

    let resolved = match value {
        None => match default {
            Some(d) => Some(d),
            None if is_optional => Some(Value::None),
            None => None,
        },
        Some(Value::None) if is_bool => {
            // The flag appeared bare: invert the default, or read plain
            // presence as true.
            let flipped = match &default {
                Some(Value::Bool(b)) => !b,
                _ => true,
            };
            Some(Value::Bool(flipped))
        }
        Some(Value::None) if is_optional => Some(Value::None),
        Some(Value::None) => match default {
            Some(d) => Some(d),
            None => {
                return Err(ParseError::ArgumentType {
                    field: field.dest().to_string(),
                    message: "no value was supplied and no default is declared".to_string(),
                })
            }
        },
        Some(other) if is_bool && !matches!(other, Value::Bool(_)) => {
            return Err(ParseError::ArgumentType {
                field: field.dest().to_string(),
                message: format!("expected a boolean value, got {}", other.type_label()),
            })
        }
        Some(other) => Some(other),
    };
    Ok(resolved)
}
