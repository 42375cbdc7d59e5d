//! Host Plugin Boundary
//!
//! Two-phase API for the host framework:
//! 1. [`SchemaCollector::add_schema`] once per discovered `(name, schema)` pair
//! 2. [`SchemaCollector::finalize`] once, after discovery is complete
//!
//! Finalizing runs parse, cycle check, resolution, canonicalization and
//! emission over the whole intake, then hands exactly one file to the sink.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::canonical::CanonicalSchema;
use crate::codegen::{self, BuilderOptions};
use crate::config::PluginConfig;
use crate::error::Result;
use crate::graph::{Diagnostics, ReferenceGraph};
use crate::resolve::Resolver;
use crate::schema::Schema;

// =============================================================================
// File Sink
// =============================================================================

/// One generated output unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFile {
    pub id: String,
    pub path: String,
    content: String,
}

impl GeneratedFile {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            content: String::new(),
        }
    }

    /// Append text to the file
    pub fn add(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Host side of file creation. Paths and write policy belong to the host.
pub trait FileSink {
    fn create_file(&mut self, id: &str, path: &str) -> &mut GeneratedFile;
}

/// Sink that keeps created files in memory, in creation order
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Vec<GeneratedFile>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<GeneratedFile> {
        self.files
    }
}

impl FileSink for MemorySink {
    fn create_file(&mut self, id: &str, path: &str) -> &mut GeneratedFile {
        self.files.push(GeneratedFile::new(id, path));
        let last = self.files.len() - 1;
        &mut self.files[last]
    }
}

// =============================================================================
// Collector
// =============================================================================

/// Summary of one finalized run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Entries accepted at intake
    pub schema_count: usize,
    pub builder_count: usize,
    /// Distinct schema constants after dedup
    pub constant_count: usize,
    /// Warnings from resolution and emission
    pub diagnostics: Diagnostics,
}

/// Accumulates intake events until finalization
#[derive(Debug, Default)]
pub struct SchemaCollector {
    schemas: IndexMap<String, Value>,
}

impl SchemaCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a discovered schema.
    ///
    /// Missing and non-object payloads are ignored. A repeated name replaces
    /// the earlier payload but keeps its position.
    pub fn add_schema(&mut self, name: &str, schema: Option<Value>) {
        match schema {
            Some(Value::Object(map)) => {
                self.schemas.insert(name.to_string(), Value::Object(map));
            }
            Some(other) => {
                debug!(schema = %name, kind = %json_kind(&other), "ignoring non-object schema");
            }
            None => {
                debug!(schema = %name, "ignoring empty schema");
            }
        }
    }

    /// Feed several `(name, schema)` pairs, in order
    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, Value)>) {
        for (name, schema) in entries {
            self.add_schema(&name, Some(schema));
        }
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Parse every accepted payload into the schema model
    pub fn parse(&self) -> Result<IndexMap<String, Schema>> {
        self.schemas
            .iter()
            .map(|(name, value)| Ok((name.clone(), Schema::from_value(name, value)?)))
            .collect()
    }

    /// Run the pipeline and write the result to a single file.
    pub fn finalize(
        self,
        plugin: &PluginConfig,
        defaults: &BuilderOptions,
        sink: &mut dyn FileSink,
    ) -> Result<GenerationReport> {
        let schemas = self.parse()?;
        ReferenceGraph::from_schemas(&schemas).check_acyclic()?;

        let mut resolver = Resolver::new(&schemas);
        let mut canonical = Vec::with_capacity(schemas.len());
        for (name, schema) in &schemas {
            let resolved = resolver.resolve_entry(name, schema.clone())?;
            canonical.push(CanonicalSchema::new(name, resolved));
        }
        let mut diagnostics = resolver.into_diagnostics();

        let output = codegen::emit(&canonical, defaults)?;
        diagnostics.merge(output.diagnostics);

        let file = sink.create_file(&plugin.name, &plugin.output);
        file.add(&output.code);

        if diagnostics.warning_count() > 0 {
            warn!(count = diagnostics.warning_count(), "generation finished with warnings");
        }
        info!(
            schemas = schemas.len(),
            builders = output.builder_count,
            constants = output.constant_count,
            path = %plugin.output,
            "generated builders"
        );

        Ok(GenerationReport {
            schema_count: schemas.len(),
            builder_count: output.builder_count,
            constant_count: output.constant_count,
            diagnostics,
        })
    }
}

/// Index line that re-exports the generated module
pub fn index_export_line(plugin: &PluginConfig) -> String {
    format!("export * from \"{}\";\n", plugin.module_specifier())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_intake_skips_non_objects() {
        let mut collector = SchemaCollector::new();
        collector.add_schema("Null", None);
        collector.add_schema("Number", Some(json!(42)));
        collector.add_schema("List", Some(json!([{ "type": "string" }])));
        collector.add_schema("Pet", Some(json!({ "type": "object" })));
        assert_eq!(collector.names().collect::<Vec<_>>(), vec!["Pet"]);
    }

    #[test]
    fn test_last_write_wins_in_place() {
        let mut collector = SchemaCollector::new();
        collector.add_schema("A", Some(json!({ "type": "string" })));
        collector.add_schema("B", Some(json!({ "type": "number" })));
        collector.add_schema("A", Some(json!({ "type": "boolean" })));

        assert_eq!(collector.names().collect::<Vec<_>>(), vec!["A", "B"]);
        let parsed = collector.parse().unwrap();
        assert_eq!(parsed["A"].to_value(), json!({ "type": "boolean" }));
    }

    #[test]
    fn test_finalize_creates_one_file() {
        let mut collector = SchemaCollector::new();
        collector.add_schema("TestSchema", Some(json!({ "type": "object", "properties": { "name": { "type": "string" } } })));

        let plugin = PluginConfig {
            name: "test-plugin".into(),
            output: "test-output".into(),
            export_from_index: false,
        };
        let mut sink = MemorySink::new();
        let report = collector.finalize(&plugin, &BuilderOptions::default(), &mut sink).unwrap();

        assert_eq!(sink.files().len(), 1);
        let file = &sink.files()[0];
        assert_eq!(file.id, "test-plugin");
        assert_eq!(file.path, "test-output");
        assert!(file.content().contains("export class TestBuilder {"));
        assert_eq!(report.builder_count, 1);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_malformed_nested_node_aborts_without_file() {
        let mut collector = SchemaCollector::new();
        collector.add_schema("Pet", Some(json!({ "properties": { "name": "string" } })));
        let mut sink = MemorySink::new();
        let err = collector
            .finalize(&PluginConfig::default(), &BuilderOptions::default(), &mut sink)
            .unwrap_err();
        assert_eq!(err.schema_name(), Some("Pet"));
        assert!(sink.files().is_empty());
    }

    #[test]
    fn test_index_export_line() {
        assert_eq!(index_export_line(&PluginConfig::default()), "export * from \"./builders.gen\";\n");
    }
}
