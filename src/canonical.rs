//! Canonicalization
//!
//! Rewrites resolved schemas into the one shape family both the mock generator
//! and the emitter understand:
//! - `type: "enum"` variant lists become `{ type, enum: [...] }`
//! - `logicalOperator: "or"` lists become a single type, a type list, or `anyOf`
//! - legacy array item lists are collapsed with the same union rule
//! - `allOf` over objects is merged into one object
//!
//! The rewrite is applied bottom-up over the whole tree.

use serde_json::{Map, Value};
use tracing::debug;

use crate::codegen::names;
use crate::fingerprint::Fingerprint;
use crate::schema::{ArrayItems, ChoiceKeyword, Leaf, ObjectSchema, Primitive, Schema, SchemaKind, TypeTag};

/// A canonical entry, ready for emission
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalSchema {
    /// Entry name as discovered
    pub entry_name: String,
    /// Derived type name (`PetSchema` -> `Pet`)
    pub type_name: String,
    pub schema: Schema,
    pub fingerprint: Fingerprint,
}

impl CanonicalSchema {
    /// Canonicalize a resolved entry and fingerprint the result
    pub fn new(entry_name: &str, resolved: Schema) -> Self {
        let schema = canonicalize(resolved);
        let fingerprint = Fingerprint::of(&schema);
        debug!(schema = %entry_name, fingerprint = %fingerprint.short(), "canonicalized");
        Self {
            entry_name: entry_name.to_string(),
            type_name: names::type_name(entry_name),
            schema,
            fingerprint,
        }
    }

    pub fn is_enumeration(&self) -> bool {
        matches!(self.schema.kind, SchemaKind::Enum { .. })
    }
}

/// Rewrite a resolved schema into canonical form
pub fn canonicalize(schema: Schema) -> Schema {
    let Schema { kind, extensions } = schema;

    match kind {
        SchemaKind::VariantList(variants) => {
            let variants: Vec<Schema> = variants.into_iter().map(canonicalize).collect();
            flatten_variants(&variants, extensions)
        }
        SchemaKind::OrList(branches) => {
            let branches = branches.into_iter().map(canonicalize).collect();
            collapse_union(branches, extensions)
        }
        SchemaKind::Array(ArrayItems::Sequence(items)) => {
            let mut items: Vec<Schema> = items.into_iter().map(canonicalize).collect();
            let items = match items.len() {
                0 => ArrayItems::Any,
                1 => ArrayItems::Single(Box::new(items.remove(0))),
                _ => ArrayItems::Single(Box::new(collapse_union(items, Map::new()))),
            };
            Schema {
                kind: SchemaKind::Array(items),
                extensions,
            }
        }
        SchemaKind::Array(ArrayItems::Tuple(items)) => Schema {
            kind: SchemaKind::Array(ArrayItems::Tuple(items.into_iter().map(canonicalize).collect())),
            extensions,
        },
        SchemaKind::Array(ArrayItems::Single(item)) => Schema {
            kind: SchemaKind::Array(ArrayItems::Single(Box::new(canonicalize(*item)))),
            extensions,
        },
        SchemaKind::AllOf(branches) => {
            let branches = branches.into_iter().map(canonicalize).collect();
            merge_all_of(branches, extensions)
        }
        SchemaKind::Object(object) => Schema {
            kind: SchemaKind::Object(canonical_object(object)),
            extensions,
        },
        SchemaKind::Choice { keyword, branches } => Schema {
            kind: SchemaKind::Choice {
                keyword,
                branches: branches.into_iter().map(canonicalize).collect(),
            },
            extensions,
        },
        kind @ (SchemaKind::Reference(_)
        | SchemaKind::Array(ArrayItems::Any)
        | SchemaKind::Enum { .. }
        | SchemaKind::Leaf(_)) => Schema { kind, extensions },
    }
}

/// True when no raw enumeration, raw union or item list remains anywhere in the tree
pub fn is_canonical(schema: &Schema) -> bool {
    let own = !matches!(
        schema.kind,
        SchemaKind::VariantList(_) | SchemaKind::OrList(_) | SchemaKind::Array(ArrayItems::Sequence(_))
    );
    own && schema.children().into_iter().all(is_canonical)
}

fn canonical_object(object: ObjectSchema) -> ObjectSchema {
    ObjectSchema {
        properties: object
            .properties
            .into_iter()
            .map(|(name, prop)| (name, canonicalize(prop)))
            .collect(),
        required: object.required,
        additional: object.additional.map(|a| Box::new(canonicalize(*a))),
    }
}

/// `[{const: "A"}, {const: "B"}]` -> `{type: "string", enum: ["A", "B"]}`
fn flatten_variants(variants: &[Schema], extensions: Map<String, Value>) -> Schema {
    let mut values = Vec::with_capacity(variants.len());
    let mut types = Vec::with_capacity(variants.len());

    for variant in variants {
        let Some(value) = variant.extensions.get("const") else {
            continue;
        };
        let declared = variant.primitive_types();
        if declared.is_empty() {
            types.extend(Primitive::of_value(value));
        } else {
            types.extend_from_slice(declared);
        }
        values.push(value.clone());
    }

    Schema {
        kind: SchemaKind::Enum {
            ty: TypeTag::from_primitives(types),
            values,
        },
        extensions,
    }
}

/// Collapse union branches.
///
/// Plain primitive leaves merge into one `type` (or a type list); anything
/// else keeps the branches as an explicit `anyOf`. Canonical enumerations
/// count as non-primitive even though they carry a type tag, so
/// `{type: string, enum: [..]} | {type: string}` stays an `anyOf` and the
/// enumerated values are not widened away.
fn collapse_union(branches: Vec<Schema>, mut extensions: Map<String, Value>) -> Schema {
    let all_primitive = !branches.is_empty()
        && branches
            .iter()
            .all(|b| matches!(&b.kind, SchemaKind::Leaf(Leaf { ty: Some(_), .. })));

    if all_primitive {
        let ty = TypeTag::from_primitives(branches.iter().flat_map(|b| b.primitive_types().iter().copied()));
        let leaf = Leaf::take(ty, &mut extensions);
        return Schema {
            kind: SchemaKind::Leaf(leaf),
            extensions,
        };
    }

    if branches.is_empty() {
        let leaf = Leaf::take(None, &mut extensions);
        return Schema {
            kind: SchemaKind::Leaf(leaf),
            extensions,
        };
    }

    Schema {
        kind: SchemaKind::Choice {
            keyword: ChoiceKeyword::AnyOf,
            branches,
        },
        extensions,
    }
}

/// Merge `allOf` branches when every one of them is an object.
///
/// Later branches win per property; `required` is the ordered union; the
/// composition node's own keywords override those of its branches.
fn merge_all_of(branches: Vec<Schema>, extensions: Map<String, Value>) -> Schema {
    if branches.is_empty() || !branches.iter().all(|b| b.as_object().is_some()) {
        return Schema {
            kind: SchemaKind::AllOf(branches),
            extensions,
        };
    }

    let mut merged = ObjectSchema::default();
    let mut merged_extensions = Map::new();

    for branch in branches {
        let Schema { kind, extensions: branch_extensions } = branch;
        let SchemaKind::Object(object) = kind else {
            continue;
        };
        for (name, prop) in object.properties {
            merged.properties.insert(name, prop);
        }
        for name in object.required {
            if !merged.required.contains(&name) {
                merged.required.push(name);
            }
        }
        if object.additional.is_some() {
            merged.additional = object.additional;
        }
        for (key, value) in branch_extensions {
            merged_extensions.entry(key).or_insert(value);
        }
    }

    for (key, value) in extensions {
        merged_extensions.insert(key, value);
    }

    Schema {
        kind: SchemaKind::Object(merged),
        extensions: merged_extensions,
    }
}
