//! Reference Resolution
//!
//! Inlines `$ref` targets so every entry becomes a self-contained tree.
//! Lookups go against the intake mapping only; targets are cloned before
//! they are inlined, so the mapping itself is never modified.
//!
//! A stack of the identifiers currently being expanded guards against
//! self- and mutually-referential schemas: re-entering an identifier fails
//! with [`BuilderError::CyclicSchema`] instead of recursing forever.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{BuilderError, Result};
use crate::graph::Diagnostics;
use crate::schema::{Schema, SchemaKind};

/// Suffix tried when a reference does not match a storage key literally
pub const SCHEMA_SUFFIX: &str = "Schema";

/// Diagnostic owner for schemas resolved outside any entry
pub const INLINE_SCHEMA: &str = "(inline)";

/// Strip a `$ref` pointer down to the identifier it names.
///
/// `#/components/schemas/Pet` becomes `Pet`; pointers that do not start
/// with `#` are taken as identifiers already.
pub fn bare_identifier(pointer: &str) -> String {
    let raw = if pointer.starts_with('#') {
        pointer.rsplit('/').next().unwrap_or(pointer)
    } else {
        pointer
    };
    raw.replace("~1", "/").replace("~0", "~")
}

/// Resolve a schema against a mapping, logging any missing targets.
pub fn resolve(schema: Schema, all_schemas: &IndexMap<String, Schema>) -> Result<Schema> {
    let mut resolver = Resolver::new(all_schemas);
    resolver.resolve(schema)
}

/// Stateful resolver over one intake mapping
pub struct Resolver<'a> {
    schemas: &'a IndexMap<String, Schema>,
    /// Entry being resolved (for diagnostics)
    entry: String,
    /// Storage keys currently being expanded
    stack: Vec<String>,
    diagnostics: Diagnostics,
}

impl<'a> Resolver<'a> {
    pub fn new(schemas: &'a IndexMap<String, Schema>) -> Self {
        Self {
            schemas,
            entry: String::new(),
            stack: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Look up a pointer: literally first, then with the `Schema` suffix.
    pub fn lookup(&self, pointer: &str) -> Option<(&'a String, &'a Schema)> {
        let schemas: &'a IndexMap<String, Schema> = self.schemas;
        let id = bare_identifier(pointer);
        schemas
            .get_key_value(&id)
            .or_else(|| schemas.get_key_value(&format!("{}{}", id, SCHEMA_SUFFIX)))
    }

    /// Resolve a top-level entry. Its own name counts as already expanded,
    /// so a reference back to it is reported as a cycle.
    pub fn resolve_entry(&mut self, name: &str, mut schema: Schema) -> Result<Schema> {
        self.entry = name.to_string();
        self.stack.clear();
        self.stack.push(name.to_string());
        debug!(schema = %name, "resolving references");
        self.report_unparsed(&schema);
        self.resolve_in_place(&mut schema)?;
        self.stack.clear();
        Ok(schema)
    }

    /// Resolve a schema that is not itself an entry of the mapping
    pub fn resolve(&mut self, mut schema: Schema) -> Result<Schema> {
        self.entry = INLINE_SCHEMA.to_string();
        self.stack.clear();
        self.report_unparsed(&schema);
        self.resolve_in_place(&mut schema)?;
        Ok(schema)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// References under keywords the model does not parse stay in place; say so.
    fn report_unparsed(&mut self, schema: &Schema) {
        for (keyword, pointer) in schema.unparsed_references() {
            warn!(schema = %self.entry, keyword = %keyword, reference = %pointer, "Reference not followed");
            self.diagnostics.unfollowed_ref(self.entry.clone(), keyword, pointer);
        }
    }

    fn resolve_in_place(&mut self, node: &mut Schema) -> Result<()> {
        if let SchemaKind::Reference(pointer) = &node.kind {
            let Some((key, target)) = self.lookup(pointer) else {
                warn!(schema = %self.entry, reference = %pointer, "Reference not found");
                self.diagnostics.unresolved_ref(self.entry.clone(), pointer);
                return Ok(());
            };

            if let Some(start) = self.stack.iter().position(|open| open == key) {
                let mut cycle = self.stack[start..].to_vec();
                cycle.push(key.clone());
                return Err(BuilderError::CyclicSchema {
                    schema: self.entry.clone(),
                    cycle,
                });
            }

            let mut resolved = target.clone();
            self.stack.push(key.clone());
            self.resolve_in_place(&mut resolved)?;
            self.stack.pop();
            *node = resolved;
            return Ok(());
        }

        for child in node.children_mut() {
            self.resolve_in_place(child)?;
        }
        Ok(())
    }
}
