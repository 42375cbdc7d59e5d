//! Code Generation
//!
//! Turns canonical entries into the builders source file.
//!
//! Architecture:
//! - EmissionPlan: built once from the canonical entries. Holds the shared
//!   constant table and one BuilderSpec per emitted entry.
//! - BuilderSpec: pure projection of naming and dedup decisions for one entry
//! - typescript: text emitter that consumes an EmissionPlan
//!
//! The emitter never looks at schema shapes itself; every decision
//! (class shape, override methods, which constant to reference) is made here.

pub mod names;
pub mod options;
pub mod typescript;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::canonical::CanonicalSchema;
use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::graph::{DiagnosticCode, DiagnosticItem, Diagnostics};
use crate::schema::{Schema, SchemaKind};

pub use options::{BuilderOptions, OptionalsProbability, OPTION_MAPPINGS};

// =============================================================================
// BuilderSpec
// =============================================================================

/// One `with<Property>` setter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideMethod {
    /// Raw property name, used as the key in the override map
    pub property: String,
    pub method_name: String,
}

/// Class shape of a builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderShape {
    /// Canonical enumeration: `setOptions` + `build()` only
    Enumeration,
    /// Object: override map, setters, merged `build()`
    Object { methods: Vec<OverrideMethod> },
    /// Anything else (arrays, leaves, unions): like an enumeration
    Value,
}

/// Per-entry emission decisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderSpec {
    pub entry_name: String,
    pub type_name: String,
    pub builder_class_name: String,
    pub factory_name: String,
    /// Key into the shared constant table (possibly another entry's)
    pub schema_constant_name: String,
    pub shape: BuilderShape,
}

impl BuilderSpec {
    pub fn is_enumeration_variant(&self) -> bool {
        matches!(self.shape, BuilderShape::Enumeration)
    }

    /// Setters, empty unless this is an object builder
    pub fn methods(&self) -> &[OverrideMethod] {
        match &self.shape {
            BuilderShape::Object { methods } => methods,
            BuilderShape::Enumeration | BuilderShape::Value => &[],
        }
    }
}

// =============================================================================
// EmissionPlan
// =============================================================================

/// Everything the text emitter needs, in output order
#[derive(Debug, Clone)]
pub struct EmissionPlan<'a> {
    /// Shared constant table: first-seen constant name per fingerprint
    pub constants: Vec<(String, &'a Schema)>,
    pub builders: Vec<BuilderSpec>,
    pub diagnostics: Diagnostics,
}

impl<'a> EmissionPlan<'a> {
    /// Plan emission for entries in discovery order.
    pub fn build(entries: &'a [CanonicalSchema]) -> Self {
        let mut constants = Vec::new();
        let mut by_fingerprint: HashMap<&'a Fingerprint, String> = HashMap::new();
        let mut type_owners: HashMap<&'a str, &'a str> = HashMap::new();
        let mut builders = Vec::with_capacity(entries.len());
        let mut diagnostics = Diagnostics::new();

        for entry in entries {
            if let Some(owner) = type_owners.get(entry.type_name.as_str()) {
                warn!(
                    schema = %entry.entry_name,
                    type_name = %entry.type_name,
                    first = %owner,
                    "Type name already taken, entry skipped"
                );
                diagnostics.push(
                    DiagnosticItem::new(
                        entry.entry_name.clone(),
                        DiagnosticCode::TypeNameCollision,
                        format!("Type name {} is already used by {}", entry.type_name, owner),
                    )
                    .with_context(format!("Kept: {}", owner)),
                );
                continue;
            }
            type_owners.insert(&entry.type_name, &entry.entry_name);

            let schema_constant_name = match by_fingerprint.get(&entry.fingerprint) {
                Some(existing) => {
                    debug!(schema = %entry.entry_name, constant = %existing, "reusing schema constant");
                    existing.clone()
                }
                None => {
                    let name = names::schema_constant_name(&entry.type_name);
                    by_fingerprint.insert(&entry.fingerprint, name.clone());
                    constants.push((name.clone(), &entry.schema));
                    name
                }
            };

            let builder_class_name = names::builder_class_name(&entry.type_name);
            builders.push(BuilderSpec {
                entry_name: entry.entry_name.clone(),
                type_name: entry.type_name.clone(),
                factory_name: names::factory_function_name(&builder_class_name),
                builder_class_name,
                schema_constant_name,
                shape: builder_shape(entry, &mut diagnostics),
            });
        }

        Self {
            constants,
            builders,
            diagnostics,
        }
    }
}

fn builder_shape(entry: &CanonicalSchema, diagnostics: &mut Diagnostics) -> BuilderShape {
    match &entry.schema.kind {
        SchemaKind::Enum { .. } => BuilderShape::Enumeration,
        SchemaKind::Object(object) => {
            let mut methods: Vec<OverrideMethod> = Vec::with_capacity(object.properties.len());
            for property in object.properties.keys() {
                if !names::is_expressible_property(property) {
                    debug!(schema = %entry.entry_name, property = %property, "bracketed property, no setter");
                    diagnostics.skipped_property(entry.entry_name.clone(), DiagnosticCode::BracketedProperty, property);
                    continue;
                }
                let Some(method_name) = names::override_method_name(property) else {
                    warn!(schema = %entry.entry_name, property = %property, "Property has no usable method name");
                    diagnostics.skipped_property(entry.entry_name.clone(), DiagnosticCode::EmptyMethodName, property);
                    continue;
                };
                if methods.iter().any(|m| m.method_name == method_name) {
                    warn!(schema = %entry.entry_name, property = %property, method = %method_name, "Duplicate override method");
                    diagnostics.skipped_property(entry.entry_name.clone(), DiagnosticCode::MethodNameCollision, property);
                    continue;
                }
                methods.push(OverrideMethod {
                    property: property.clone(),
                    method_name,
                });
            }
            BuilderShape::Object { methods }
        }
        _ => BuilderShape::Value,
    }
}

// =============================================================================
// Generated Output
// =============================================================================

/// Output from code generation
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Generated source text
    pub code: String,
    pub builder_count: usize,
    /// Entries in the shared constant table (after dedup)
    pub constant_count: usize,
    /// Warnings raised while planning
    pub diagnostics: Diagnostics,
}

// =============================================================================
// Public API
// =============================================================================

/// Emit the builders source for canonical entries, in the order given
pub fn emit(entries: &[CanonicalSchema], defaults: &BuilderOptions) -> Result<GeneratedOutput> {
    let plan = EmissionPlan::build(entries);
    let code = typescript::render(&plan, defaults)?;

    Ok(GeneratedOutput {
        code,
        builder_count: plan.builders.len(),
        constant_count: plan.constants.len(),
        diagnostics: plan.diagnostics,
    })
}
