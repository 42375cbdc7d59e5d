//! Schema Loading
//!
//! Reads raw `(name, schema)` pairs for the collector, either from an
//! OpenAPI document or from a directory of JSON schema files. Payloads are
//! returned untouched; shape checks happen at intake.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

/// Configuration for schema loading
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Skip files whose path (relative to the root) starts with one of these
    pub skip_prefixes: Vec<String>,
    /// Only load files matching these prefixes (empty = everything)
    pub include_prefixes: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            skip_prefixes: vec![
                "target/".to_string(),
                ".git/".to_string(),
                "node_modules/".to_string(),
            ],
            include_prefixes: Vec::new(),
        }
    }
}

impl LoadConfig {
    fn accepts(&self, relative: &str) -> bool {
        if !self.include_prefixes.is_empty() && !self.include_prefixes.iter().any(|p| relative.starts_with(p)) {
            return false;
        }
        !self.skip_prefixes.iter().any(|p| relative.starts_with(p))
    }
}

/// Load from a file (OpenAPI document) or a directory of schema files
pub fn load_path(path: &Path, config: &LoadConfig) -> anyhow::Result<Vec<(String, Value)>> {
    if path.is_dir() {
        load_directory(path, config)
    } else {
        load_openapi_file(path)
    }
}

/// Named schemas of an OpenAPI document, in document order.
///
/// Reads `/components/schemas` (OpenAPI 3) or `/definitions` (Swagger 2).
pub fn load_openapi(document: &Value) -> anyhow::Result<Vec<(String, Value)>> {
    let schemas = document
        .pointer("/components/schemas")
        .or_else(|| document.pointer("/definitions"))
        .and_then(Value::as_object)
        .context("Document has no /components/schemas or /definitions object")?;

    Ok(schemas
        .iter()
        .map(|(name, schema)| (name.clone(), schema.clone()))
        .collect())
}

pub fn load_openapi_file(path: &Path) -> anyhow::Result<Vec<(String, Value)>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let document: Value = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse JSON in {}: {}", path.display(), e))?;
    let entries = load_openapi(&document).with_context(|| format!("Invalid OpenAPI document {}", path.display()))?;
    debug!(path = %path.display(), count = entries.len(), "loaded OpenAPI schemas");
    Ok(entries)
}

/// One entry per `*.json` file, sorted by path.
///
/// The entry name is the file stem without a `.schema` suffix, so
/// `pets/Pet.schema.json` becomes `Pet`.
pub fn load_directory(schema_dir: &Path, config: &LoadConfig) -> anyhow::Result<Vec<(String, Value)>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(schema_dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", schema_dir.display()))?;
        let path = entry.path();
        if !path.is_file() || path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }

        let relative = path.strip_prefix(schema_dir)?.to_string_lossy().replace('\\', "/");
        if !config.accepts(&relative) {
            debug!(path = %relative, "skipped by prefix filter");
            continue;
        }

        let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let json: Value = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON in {}: {}", path.display(), e))?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .trim_end_matches(".schema")
            .to_string();
        entries.push((name, json));
    }

    debug!(dir = %schema_dir.display(), count = entries.len(), "loaded schema directory");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_openapi_document_order() {
        let doc = json!({
            "openapi": "3.0.0",
            "components": { "schemas": {
                "Zebra": { "type": "string" },
                "Apple": { "type": "number" }
            }}
        });
        let names: Vec<String> = load_openapi(&doc).unwrap().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Zebra", "Apple"]);
    }

    #[test]
    fn test_swagger_definitions() {
        let doc = json!({ "swagger": "2.0", "definitions": { "Pet": { "type": "object" } } });
        assert_eq!(load_openapi(&doc).unwrap()[0].0, "Pet");
        assert!(load_openapi(&json!({ "openapi": "3.0.0" })).is_err());
    }

    #[test]
    fn test_directory_loading() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pets")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("pets/Pet.schema.json"), r#"{"type":"object"}"#).unwrap();
        fs::write(dir.path().join("Order.json"), r#"{"type":"string"}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join("node_modules/Dep.json"), "{}").unwrap();

        let entries = load_directory(dir.path(), &LoadConfig::default()).unwrap();
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Order", "Pet"]);
        assert_eq!(entries[1].1, json!({ "type": "object" }));
    }

    #[test]
    fn test_invalid_json_names_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Broken.json"), "{ nope").unwrap();
        let err = load_directory(dir.path(), &LoadConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Broken.json"));
    }
}
