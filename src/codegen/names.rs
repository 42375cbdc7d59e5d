//! Name Derivation
//!
//! Maps entry names and property names to the identifiers used in emitted code:
//! - Type names: entry name with surrounding whitespace and a trailing `Schema` removed
//! - Builder classes: `<TypeName>Builder`, constructed by `create<TypeName>Builder()`
//! - Override methods: `with<PascalProperty>`
//!
//! Naming is pure; collision handling lives in the emitter.

use std::sync::OnceLock;

use regex::Regex;

/// Suffix stripped from entry names to get the type name
const SCHEMA_SUFFIX: &str = "Schema";

fn separator_runs() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("separator pattern is valid"))
}

/// Type name for an entry: `" PetSchema "` -> `Pet`
pub fn type_name(entry_name: &str) -> String {
    let trimmed = entry_name.trim();
    trimmed
        .strip_suffix(SCHEMA_SUFFIX)
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

pub fn builder_class_name(type_name: &str) -> String {
    format!("{}Builder", type_name)
}

pub fn factory_function_name(builder_class_name: &str) -> String {
    format!("create{}", builder_class_name)
}

/// Key of an entry in the shared `schemas` table
pub fn schema_constant_name(type_name: &str) -> String {
    format!("{}{}", type_name, SCHEMA_SUFFIX)
}

/// Whether a property can get an override method at all
pub fn is_expressible_property(property: &str) -> bool {
    !property.contains('[') && !property.contains(']')
}

/// PascalCase suffix for an override method.
///
/// Non-alphanumeric runs are dropped; the character after each dropped run and
/// the very first character are upper-cased. Everything else keeps its case.
pub fn method_suffix(property: &str) -> String {
    let mut result = String::with_capacity(property.len());
    for run in separator_runs().split(property).filter(|run| !run.is_empty()) {
        let mut chars = run.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

/// Override method name, or `None` when the property has nothing to name it by
pub fn override_method_name(property: &str) -> Option<String> {
    if !is_expressible_property(property) {
        return None;
    }
    let suffix = method_suffix(property);
    if suffix.is_empty() {
        None
    } else {
        Some(format!("with{}", suffix))
    }
}
